//! Vulnerability correlation against an external advisory database
//!
//! One query per fingerprint, one attempt, no retry. Every failure mode is
//! non-fatal: it degrades to an empty advisory list with the reason attached
//! to that specific lookup, and the rest of the scan continues.

pub mod nvd;

pub use nvd::NvdClient;

use crate::fingerprint::ServiceFingerprint;
use serde::{Deserialize, Serialize};

/// Default number of advisories requested per fingerprint
pub const DEFAULT_LOOKUP_LIMIT: usize = 5;

/// Advisory summaries are truncated to this many characters
pub const SUMMARY_MAX_LEN: usize = 100;

/// A single advisory returned for a fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub summary: String,
}

/// External advisory lookup keyed by free-text product+version
#[async_trait::async_trait]
pub trait VulnDatabase: Send + Sync {
    async fn lookup(&self, query: &str, limit: usize) -> crate::Result<Vec<VulnerabilityRecord>>;
}

/// Outcome of correlating one fingerprint, keeping "no data" distinct from
/// "query failed"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// No fingerprint to query with; the lookup was never issued
    Skipped,
    /// The query succeeded but returned nothing
    NoFindings,
    /// Matching advisories, already truncated for display
    Found(Vec<VulnerabilityRecord>),
    /// The query failed; the reason is surfaced as a warning in the report
    Failed(String),
}

impl LookupOutcome {
    pub fn advisories(&self) -> &[VulnerabilityRecord] {
        match self {
            LookupOutcome::Found(records) => records,
            _ => &[],
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            LookupOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Query the database for one fingerprint. An absent fingerprint
/// short-circuits without spending a rate-limited external call.
pub async fn correlate<V: VulnDatabase + ?Sized>(
    db: &V,
    fingerprint: Option<&ServiceFingerprint>,
    limit: usize,
) -> LookupOutcome {
    let Some(fp) = fingerprint else {
        return LookupOutcome::Skipped;
    };

    let query = format!("{} {}", fp.product, fp.version);
    match db.lookup(&query, limit).await {
        Ok(records) if records.is_empty() => LookupOutcome::NoFindings,
        Ok(records) => LookupOutcome::Found(records),
        Err(e) => {
            log::warn!("vulnerability lookup failed for '{}': {}", query, e);
            LookupOutcome::Failed(e.to_string())
        }
    }
}

/// First line of an advisory description, truncated for human consumption
pub(crate) fn truncate_summary(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > SUMMARY_MAX_LEN {
        let truncated: String = first_line.chars().take(SUMMARY_MAX_LEN).collect();
        format!("{}...", truncated)
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubDb {
        records: Vec<VulnerabilityRecord>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubDb {
        fn with_records(records: Vec<VulnerabilityRecord>) -> Self {
            Self {
                records,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                records: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl VulnDatabase for StubDb {
        async fn lookup(
            &self,
            _query: &str,
            limit: usize,
        ) -> crate::Result<Vec<VulnerabilityRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::ScanError::Correlation("service unavailable".into()));
            }
            Ok(self.records.iter().take(limit).cloned().collect())
        }
    }

    fn fingerprint() -> ServiceFingerprint {
        ServiceFingerprint {
            product: "openssh".into(),
            version: "8.2".into(),
        }
    }

    #[tokio::test]
    async fn absent_fingerprint_skips_the_query() {
        let db = StubDb::with_records(vec![]);
        let outcome = correlate(&db, None, DEFAULT_LOOKUP_LIMIT).await;
        assert_eq!(outcome, LookupOutcome::Skipped);
        assert_eq!(db.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_result_set_is_no_findings_not_failure() {
        let db = StubDb::with_records(vec![]);
        let outcome = correlate(&db, Some(&fingerprint()), DEFAULT_LOOKUP_LIMIT).await;
        assert_eq!(outcome, LookupOutcome::NoFindings);
        assert!(outcome.advisories().is_empty());
        assert!(outcome.warning().is_none());
    }

    #[tokio::test]
    async fn query_failure_degrades_to_a_warning() {
        let db = StubDb::failing();
        let outcome = correlate(&db, Some(&fingerprint()), DEFAULT_LOOKUP_LIMIT).await;
        assert!(outcome.advisories().is_empty());
        let warning = outcome.warning().expect("failure should carry a reason");
        assert!(warning.contains("service unavailable"));
        assert_eq!(db.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn limit_caps_the_advisory_count() {
        let records = (0..10)
            .map(|i| VulnerabilityRecord {
                id: format!("CVE-2024-{:04}", i),
                summary: "something bad".into(),
            })
            .collect();
        let db = StubDb::with_records(records);
        let outcome = correlate(&db, Some(&fingerprint()), 3).await;
        assert_eq!(outcome.advisories().len(), 3);
    }

    #[test]
    fn summary_is_first_line_capped_at_limit() {
        assert_eq!(truncate_summary("short one\nsecond line"), "short one");

        let long = "x".repeat(SUMMARY_MAX_LEN + 20);
        let truncated = truncate_summary(&long);
        assert_eq!(truncated.chars().count(), SUMMARY_MAX_LEN + 3);
        assert!(truncated.ends_with("..."));
    }
}
