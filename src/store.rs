//! Report lookup.
//!
//! The renderer never owns a database handle. Callers pass a
//! [`ReportStore`] explicitly; [`InMemoryReportStore`] backs the CLI and
//! the tests.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::model::{ReportRecord, ReportStatus, TransitionError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report store unavailable: {0}")]
    Unavailable(String),

    #[error("a report with tracking code '{0}' already exists")]
    Duplicate(String),

    #[error("no report with tracking code '{0}'")]
    Missing(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

pub trait ReportStore: Send + Sync {
    fn find_by_tracking_code(&self, code: &str) -> Result<Option<ReportRecord>, StoreError>;

    fn find_by_id(&self, id: &str) -> Result<Option<ReportRecord>, StoreError>;
}

/// Find a report by public tracking code, falling back to the internal id.
pub fn lookup(store: &dyn ReportStore, code: &str) -> Result<Option<ReportRecord>, StoreError> {
    match store.find_by_tracking_code(code)? {
        Some(report) => Ok(Some(report)),
        None => store.find_by_id(code),
    }
}

/// Reports keyed by tracking code.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<String, ReportRecord>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, report: ReportRecord) -> Result<(), StoreError> {
        let mut reports = self.write()?;
        let code = report.tracking_code().to_string();
        if reports.contains_key(&code) {
            return Err(StoreError::Duplicate(code));
        }
        reports.insert(code, report);
        Ok(())
    }

    /// Move a report to `next`. The tracking code is left untouched.
    pub fn update_status(&self, code: &str, next: ReportStatus) -> Result<ReportRecord, StoreError> {
        let mut reports = self.write()?;
        let report = reports
            .get_mut(code)
            .ok_or_else(|| StoreError::Missing(code.to_string()))?;
        report.status = report.status.transition(next)?;
        Ok(report.clone())
    }

    pub fn len(&self) -> usize {
        self.reports.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, ReportRecord>>, StoreError> {
        self.reports
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl ReportStore for InMemoryReportStore {
    fn find_by_tracking_code(&self, code: &str) -> Result<Option<ReportRecord>, StoreError> {
        let reports = self
            .reports
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(reports.get(code).cloned())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<ReportRecord>, StoreError> {
        let reports = self
            .reports
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(reports.values().find(|r| r.id == id).cloned())
    }
}
