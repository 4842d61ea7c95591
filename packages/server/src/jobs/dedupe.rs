//! Dedup and exclusion filtering, scoped to one fetch session.
//!
//! Screening order matters: exclusion first (an excluded record must never
//! claim an identity key), then duplicate rejection, then the recency
//! window. Identity keys live only for the session; nothing persists.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use url::Url;

use super::normalize::{
    first_text, COMPANY_KEYS, ID_KEYS, LINK_KEYS, LOCATION_KEYS, POSITION_KEYS, POSTED_KEYS,
    PROFILE_KEYS,
};
use super::recency;
use super::RawRecord;

/// Companies relayed jobs must never come from. Substring match,
/// case-insensitive, against company name and profile host.
pub const EXCLUDED_COMPANIES: &[&str] = &["lensa", "tietalent"];

#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    entries: Vec<String>,
}

impl ExclusionList {
    /// The compiled-in list.
    pub fn compiled_in() -> Self {
        Self::from_entries(EXCLUDED_COMPANIES.iter().copied())
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| entry.trim().to_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    /// True when the company name or the profile URL's host contains any
    /// excluded substring.
    pub fn matches(&self, company_name: &str, profile_url: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let name = company_name.to_lowercase();
        let host = Url::parse(profile_url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.to_lowercase()))
            .unwrap_or_default();

        self.entries
            .iter()
            .any(|entry| name.contains(entry) || (!host.is_empty() && host.contains(entry)))
    }
}

/// Stable per-record identity: link, else id, else a composite of company,
/// title, and location.
pub fn identity_key(record: &RawRecord) -> String {
    let link = first_text(record, LINK_KEYS);
    if !link.is_empty() {
        return link;
    }
    let id = first_text(record, ID_KEYS);
    if !id.is_empty() {
        return id;
    }
    format!(
        "{}|{}|{}",
        first_text(record, COMPANY_KEYS),
        first_text(record, POSITION_KEYS),
        first_text(record, LOCATION_KEYS)
    )
}

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Excluded,
    Duplicate,
    Stale,
}

#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub exclude: ExclusionList,
    /// Active recency window in minutes; `None` disables the age check.
    pub max_age_minutes: Option<i64>,
    /// Sort accepted rows newest-first when the caller asked for recency.
    pub sort_newest_first: bool,
    pub now: DateTime<Utc>,
}

impl FilterOptions {
    /// Options for a query's recency token (`""|"day"|"week"|"month"`) with
    /// the compiled-in exclusion list.
    pub fn for_sort_token(sort_token: Option<&str>) -> Self {
        let token = sort_token.unwrap_or("");
        Self {
            exclude: ExclusionList::compiled_in(),
            max_age_minutes: recency::window_minutes(token),
            sort_newest_first: recency::window_minutes(token).is_some(),
            now: Utc::now(),
        }
    }
}

/// One fetch session's screen: exclusion, dedup, recency.
pub struct SessionFilter {
    opts: FilterOptions,
    seen: HashSet<String>,
}

impl SessionFilter {
    pub fn new(opts: FilterOptions) -> Self {
        Self {
            opts,
            seen: HashSet::new(),
        }
    }

    /// Screen one record; `Ok` admits it and claims its identity key.
    pub fn screen(&mut self, record: &RawRecord) -> Result<(), Rejection> {
        let company = first_text(record, COMPANY_KEYS);
        let profile = first_text(record, PROFILE_KEYS);
        if self.opts.exclude.matches(&company, &profile) {
            return Err(Rejection::Excluded);
        }

        let key = identity_key(record);
        if !self.seen.insert(key) {
            return Err(Rejection::Duplicate);
        }

        if let Some(max_age) = self.opts.max_age_minutes {
            let posted = first_text(record, POSTED_KEYS);
            match recency::derive_age_minutes(&posted, self.opts.now) {
                Some(age) if age <= max_age => {}
                // Unknown age counts as infinitely old.
                _ => return Err(Rejection::Stale),
            }
        }

        Ok(())
    }

    pub fn sort_newest_first(&self) -> bool {
        self.opts.sort_newest_first
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.opts.now
    }
}

/// Newest first by derived age; unknown ages sort last. The sort is stable,
/// so ties keep arrival order.
pub fn sort_newest_first(rows: &mut [super::normalize::JobRow], now: DateTime<Utc>) {
    rows.sort_by_key(|row| {
        recency::derive_age_minutes(&row.job_posting_date, now).unwrap_or(i64::MAX)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::normalize::JobRow;
    use crate::jobs::query::Combo;
    use serde_json::json;

    fn record(body: serde_json::Value) -> RawRecord {
        body.as_object().unwrap().clone()
    }

    fn open_filter() -> SessionFilter {
        SessionFilter::new(FilterOptions {
            exclude: ExclusionList::compiled_in(),
            max_age_minutes: None,
            sort_newest_first: false,
            now: Utc::now(),
        })
    }

    #[test]
    fn test_identity_prefers_link_then_id_then_composite() {
        let by_link = record(json!({"job_link": "https://x/1", "job_id": "9"}));
        assert_eq!(identity_key(&by_link), "https://x/1");

        let by_id = record(json!({"job_id": "9", "company_name": "Acme"}));
        assert_eq!(identity_key(&by_id), "9");

        let composite = record(json!({
            "company_name": "Acme",
            "job_position": "Engineer",
            "job_location": "Remote",
        }));
        assert_eq!(identity_key(&composite), "Acme|Engineer|Remote");
    }

    #[test]
    fn test_duplicates_rejected_first_instance_kept() {
        let mut filter = open_filter();
        let first = record(json!({"job_link": "https://x/1", "company_name": "A"}));
        let dupe = record(json!({"job_link": "https://x/1", "company_name": "B"}));

        assert!(filter.screen(&first).is_ok());
        assert_eq!(filter.screen(&dupe), Err(Rejection::Duplicate));
        // A distinct key still passes after the rejection.
        let other = record(json!({"job_link": "https://x/2"}));
        assert!(filter.screen(&other).is_ok());
    }

    #[test]
    fn test_exclusion_by_company_name_case_insensitive() {
        let mut filter = open_filter();
        let excluded = record(json!({
            "job_link": "https://x/1",
            "company_name": "LENSA Staffing",
        }));
        assert_eq!(filter.screen(&excluded), Err(Rejection::Excluded));
    }

    #[test]
    fn test_exclusion_by_profile_host() {
        let list = ExclusionList::from_entries(["tietalent"]);
        assert!(list.matches("Great Jobs Inc", "https://www.tietalent.com/company/42"));
        assert!(!list.matches("Great Jobs Inc", "https://example.com/tietalent"));
        assert!(!list.matches("Great Jobs Inc", "not a url"));
    }

    #[test]
    fn test_excluded_record_does_not_claim_identity() {
        let mut filter = open_filter();
        let excluded = record(json!({
            "job_link": "https://x/1",
            "company_name": "TieTalent",
        }));
        let same_link_ok = record(json!({
            "job_link": "https://x/1",
            "company_name": "Honest Co",
        }));
        assert_eq!(filter.screen(&excluded), Err(Rejection::Excluded));
        assert!(filter.screen(&same_link_ok).is_ok());
    }

    #[test]
    fn test_recency_window_rejects_old_and_unknown() {
        let mut filter = SessionFilter::new(FilterOptions {
            exclude: ExclusionList::default(),
            max_age_minutes: Some(recency::MINUTES_PER_WEEK),
            sort_newest_first: true,
            now: Utc::now(),
        });

        let fresh = record(json!({"job_link": "a", "job_posting_date": "2 days ago"}));
        let old = record(json!({"job_link": "b", "job_posting_date": "2 weeks ago"}));
        let unknown = record(json!({"job_link": "c", "job_posting_date": "a while back"}));

        assert!(filter.screen(&fresh).is_ok());
        assert_eq!(filter.screen(&old), Err(Rejection::Stale));
        assert_eq!(filter.screen(&unknown), Err(Rejection::Stale));
    }

    #[test]
    fn test_sort_newest_first_is_stable_with_unknowns_last() {
        let now = Utc::now();
        let row = |posted: &str, id: &str| {
            let raw = record(json!({"job_id": id, "job_posting_date": posted}));
            JobRow::from_raw(&raw, &Combo::any(), 1)
        };
        let mut rows = vec![
            row("3 days ago", "a"),
            row("no idea", "b"),
            row("2 hours ago", "c"),
            row("3 days ago", "d"),
        ];
        sort_newest_first(&mut rows, now);

        let order: Vec<&str> = rows.iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "d", "b"]);
    }
}
