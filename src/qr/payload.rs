//! QR payload schemas.
//!
//! Two kinds of string end up in a QR code:
//!
//! - a tracking URL, `<base>/track-report?reportId=<code>`, printed on PDFs;
//! - a compact JSON record, `{"v":1,"id":..,"type":..,"createdAt":..}`,
//!   shown on the submission confirmation screen.
//!
//! Both must be readable by a client that has nothing but the scanned string.
//! The JSON record carries exactly three fields. It is not a full report:
//! location, description and status are deliberately absent, and decoding
//! never invents them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PayloadError, RenderError};
use crate::model::ReportRecord;

/// Current payload schema version.
pub const PAYLOAD_VERSION: u64 = 1;

const TRACK_PATH: &str = "/track-report";

/// Build the tracking URL for a report.
pub fn tracking_url(base_url: &str, tracking_code: &str) -> String {
    format!(
        "{}{}?reportId={}",
        base_url.trim_end_matches('/'),
        TRACK_PATH,
        urlencoding::encode(tracking_code)
    )
}

/// The decoded contents of a v1 record payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingPayload {
    pub id: String,
    pub report_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct WirePayload<'a> {
    v: u64,
    id: &'a str,
    #[serde(rename = "type")]
    report_type: &'a str,
    #[serde(rename = "createdAt")]
    created_at: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WirePayloadV1 {
    #[allow(dead_code)]
    v: u64,
    id: String,
    #[serde(rename = "type")]
    report_type: String,
    #[serde(rename = "createdAt")]
    created_at: String,
}

impl TrackingPayload {
    pub fn from_report(report: &ReportRecord) -> Self {
        Self {
            id: report.tracking_code().to_string(),
            report_type: report.report_type.clone(),
            created_at: report.created_at,
        }
    }

    /// Serialize to compact JSON.
    pub fn encode(&self) -> Result<String, RenderError> {
        let wire = WirePayload {
            v: PAYLOAD_VERSION,
            id: &self.id,
            report_type: &self.report_type,
            created_at: self
                .created_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        };
        serde_json::to_string(&wire)
            .map_err(|e| RenderError::QrEncoding(format!("payload serialization failed: {e}")))
    }

    /// Parse and validate a scanned payload.
    ///
    /// Fails on anything that is not exactly a v1 payload: wrong JSON shape,
    /// missing or extra fields, another version, empty identifiers, or a
    /// timestamp that is not RFC 3339.
    pub fn decode(input: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(input.trim())
            .map_err(|e| PayloadError::Malformed(format!("not JSON: {e}")))?;

        let object = value
            .as_object()
            .ok_or_else(|| PayloadError::Malformed("expected a JSON object".to_string()))?;

        let version = match object.get("v") {
            None => {
                return Err(PayloadError::InvalidField {
                    field: "v",
                    reason: "is missing".to_string(),
                })
            }
            Some(v) => v.as_u64().ok_or_else(|| PayloadError::InvalidField {
                field: "v",
                reason: "must be a non-negative integer".to_string(),
            })?,
        };
        if version != PAYLOAD_VERSION {
            return Err(PayloadError::UnsupportedVersion(version));
        }

        let wire: WirePayloadV1 =
            serde_json::from_value(value).map_err(|e| PayloadError::Malformed(e.to_string()))?;

        if wire.id.trim().is_empty() {
            return Err(PayloadError::InvalidField {
                field: "id",
                reason: "must not be empty".to_string(),
            });
        }
        if wire.report_type.trim().is_empty() {
            return Err(PayloadError::InvalidField {
                field: "type",
                reason: "must not be empty".to_string(),
            });
        }
        let created_at = DateTime::parse_from_rfc3339(&wire.created_at)
            .map_err(|e| PayloadError::InvalidField {
                field: "createdAt",
                reason: format!("is not an RFC 3339 timestamp ({e})"),
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: wire.id,
            report_type: wire.report_type,
            created_at,
        })
    }
}

/// Whatever a scanner read off a report QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedCode {
    /// A tracking URL; the report must be looked up by this code.
    TrackingCode(String),
    /// A self-contained record payload.
    Payload(TrackingPayload),
}

impl ScannedCode {
    pub fn parse(input: &str) -> Result<Self, PayloadError> {
        let input = input.trim();
        if input.starts_with('{') {
            return TrackingPayload::decode(input).map(Self::Payload);
        }
        parse_tracking_url(input).map(Self::TrackingCode)
    }

    /// The tracking code, whichever form was scanned.
    pub fn tracking_code(&self) -> &str {
        match self {
            Self::TrackingCode(code) => code,
            Self::Payload(p) => &p.id,
        }
    }
}

fn parse_tracking_url(input: &str) -> Result<String, PayloadError> {
    let (path, query) = input
        .split_once('?')
        .ok_or_else(|| PayloadError::Malformed("not a tracking URL or report payload".to_string()))?;
    if !path.ends_with(TRACK_PATH) {
        return Err(PayloadError::Malformed(format!(
            "URL does not point at {TRACK_PATH}"
        )));
    }

    let raw = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("reportId="))
        .ok_or(PayloadError::InvalidField {
            field: "reportId",
            reason: "is missing".to_string(),
        })?;
    let code = urlencoding::decode(raw).map_err(|e| PayloadError::InvalidField {
        field: "reportId",
        reason: format!("is not valid UTF-8 ({e})"),
    })?;
    if code.trim().is_empty() {
        return Err(PayloadError::InvalidField {
            field: "reportId",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(code.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReportStatus;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn report() -> ReportRecord {
        ReportRecord {
            id: "cl0001".to_string(),
            report_id: "R1".to_string(),
            report_type: "THEFT".to_string(),
            status: ReportStatus::InProgress,
            title: "Stolen bike".to_string(),
            description: Some("Blue bike taken from the rack".to_string()),
            location: Some("Market St".to_string()),
            latitude: Some(37.77),
            longitude: Some(-122.41),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
            image: None,
        }
    }

    #[test]
    fn test_encode_shape() {
        let json = TrackingPayload::from_report(&report()).encode().unwrap();
        assert_eq!(
            json,
            r#"{"v":1,"id":"R1","type":"THEFT","createdAt":"2024-01-01T00:00:00Z"}"#
        );
    }

    #[test]
    fn test_round_trip_declared_fields() {
        let payload = TrackingPayload::from_report(&report());
        let decoded = TrackingPayload::decode(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.id, "R1");
        assert_eq!(decoded.report_type, "THEFT");
    }

    #[test]
    fn test_round_trip_keeps_subsecond_precision() {
        let mut r = report();
        r.created_at = Utc.timestamp_opt(1_704_067_200, 123_000_000).unwrap();
        let payload = TrackingPayload::from_report(&r);
        assert_eq!(TrackingPayload::decode(&payload.encode().unwrap()).unwrap(), payload);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            TrackingPayload::decode("not json"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            TrackingPayload::decode("[1,2,3]"),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_version() {
        let err = TrackingPayload::decode(
            r#"{"id":"R1","type":"THEFT","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PayloadError::InvalidField {
                field: "v",
                reason: "is missing".to_string()
            }
        );
    }

    #[test]
    fn test_decode_rejects_other_version() {
        let err = TrackingPayload::decode(
            r#"{"v":2,"id":"R1","type":"THEFT","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap_err();
        assert_eq!(err, PayloadError::UnsupportedVersion(2));
    }

    #[test]
    fn test_decode_rejects_partial_payload() {
        let err = TrackingPayload::decode(r#"{"v":1,"id":"R1"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)), "{err:?}");
    }

    #[test]
    fn test_decode_rejects_extra_fields() {
        // A full record is not a v1 payload.
        let err = TrackingPayload::decode(
            r#"{"v":1,"id":"R1","type":"THEFT","createdAt":"2024-01-01T00:00:00Z","location":"Market St"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let err = TrackingPayload::decode(
            r#"{"v":1,"id":"R1","type":"THEFT","createdAt":"1/1/2024"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PayloadError::InvalidField {
                field: "createdAt",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_rejects_empty_id() {
        let err = TrackingPayload::decode(
            r#"{"v":1,"id":" ","type":"THEFT","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PayloadError::InvalidField { field: "id", .. }));
    }

    #[test]
    fn test_tracking_url_encodes_code() {
        assert_eq!(
            tracking_url("https://example.org/", "A B&C"),
            "https://example.org/track-report?reportId=A%20B%26C"
        );
    }

    #[test]
    fn test_scanned_url_yields_code() {
        let url = tracking_url("https://example.org", "A B&C");
        assert_eq!(
            ScannedCode::parse(&url).unwrap(),
            ScannedCode::TrackingCode("A B&C".to_string())
        );
    }

    #[test]
    fn test_scanned_payload() {
        let json = TrackingPayload::from_report(&report()).encode().unwrap();
        let scanned = ScannedCode::parse(&json).unwrap();
        assert_eq!(scanned.tracking_code(), "R1");
        assert!(matches!(scanned, ScannedCode::Payload(_)));
    }

    #[test]
    fn test_scanned_rejects_other_urls() {
        assert!(ScannedCode::parse("https://example.org/login?next=/").is_err());
        assert!(ScannedCode::parse("https://example.org/track-report?page=2").is_err());
        assert!(ScannedCode::parse("hello").is_err());
    }
}
