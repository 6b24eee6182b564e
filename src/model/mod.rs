//! # Report Model
//!
//! The record handed to the renderer by the storage layer, the workflow
//! status it carries, and the labeled fields the layout engine can show.
//!
//! The renderer only ever borrows a [`ReportRecord`]. Status transitions live
//! here so that the storage layer and the dashboard share one definition of
//! the workflow; the layout engine just prints the current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal shown when a report has no location.
pub const LOCATION_FALLBACK: &str = "Not specified";

/// An incident report as supplied by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// Internal database identifier.
    pub id: String,
    /// Public tracking code. Assigned once, never changed.
    pub report_id: String,
    /// Classification, e.g. `EMERGENCY` or `THEFT`.
    #[serde(rename = "type")]
    pub report_type: String,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Reference to an attached photo (usually a data URL).
    #[serde(default)]
    pub image: Option<String>,
}

impl ReportRecord {
    /// The code printed on documents and encoded into QR payloads. Older
    /// records without a tracking code fall back to the internal id.
    pub fn tracking_code(&self) -> &str {
        if self.report_id.is_empty() {
            &self.id
        } else {
            &self.report_id
        }
    }
}

// ── Workflow status ─────────────────────────────────────────────

/// Moderation workflow state.
///
/// ```text
/// PENDING → IN_PROGRESS → RESOLVED
///                       ↘ DISMISSED
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Dismissed,
}

/// A status change that the workflow does not allow.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot move report from {from} to {to}")]
pub struct TransitionError {
    pub from: ReportStatus,
    pub to: ReportStatus,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Dismissed => "DISMISSED",
        }
    }

    /// Resolved and dismissed reports are closed for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Dismissed)
    }

    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Resolved)
                | (Self::InProgress, Self::Dismissed)
        )
    }

    pub fn transition(self, next: ReportStatus) -> Result<ReportStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Rendered fields ─────────────────────────────────────────────

/// The labeled fields a document can show. Declaration order is the display
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    ReportId,
    Type,
    Status,
    Date,
    Location,
    Description,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::ReportId,
        FieldKind::Type,
        FieldKind::Status,
        FieldKind::Date,
        FieldKind::Location,
        FieldKind::Description,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ReportId => "Report ID:",
            Self::Type => "Type:",
            Self::Status => "Status:",
            Self::Date => "Date:",
            Self::Location => "Location:",
            Self::Description => "Description:",
        }
    }

    /// Extract the display value for this field.
    pub fn value(&self, report: &ReportRecord) -> String {
        match self {
            Self::ReportId => report.tracking_code().to_string(),
            Self::Type => report.report_type.clone(),
            Self::Status => report.status.as_str().to_string(),
            Self::Date => format_timestamp(&report.created_at),
            Self::Location => match report.location.as_deref() {
                Some(loc) if !loc.trim().is_empty() => loc.to_string(),
                _ => LOCATION_FALLBACK.to_string(),
            },
            Self::Description => report.description.clone().unwrap_or_default(),
        }
    }
}

/// A (label, value) pair ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderField {
    pub kind: FieldKind,
    pub label: &'static str,
    pub value: String,
}

impl RenderField {
    pub fn from_report(kind: FieldKind, report: &ReportRecord) -> Self {
        Self {
            kind,
            label: kind.label(),
            value: kind.value(report),
        }
    }
}

/// Locale-independent timestamp used on documents.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

// ── Page geometry ───────────────────────────────────────────────

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::A5 => (420.0, 595.0),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Document information dictionary contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
}
