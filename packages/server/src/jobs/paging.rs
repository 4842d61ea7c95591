//! Pagination/quota control.
//!
//! Drives a paged provider across filter combos until the target count is
//! reached, then tops up with one broad unfiltered pass. Pages within a
//! combo are strictly sequential; the remaining-needed count is read
//! between fetches, so parallel paging would race it. Collection state is
//! an explicit value — `absorb` is `(state, page) -> state` — rather than
//! counters mutated from inside nested loops.

use anyhow::Result;

use super::dedupe::{self, SessionFilter};
use super::normalize::JobRow;
use super::provider::{JobProvider, PageQuery};
use super::query::Combo;
use super::RawRecord;

#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub target_total: usize,
    pub combos: Vec<Combo>,
    pub max_pages_per_combo: u32,
    pub max_fallback_pages: u32,
}

/// Accumulated rows plus the slots still to fill.
#[derive(Debug)]
pub struct CollectState {
    pub rows: Vec<JobRow>,
    pub remaining: usize,
}

impl CollectState {
    pub fn new(target_total: usize) -> Self {
        Self {
            rows: Vec::with_capacity(target_total),
            remaining: target_total,
        }
    }

    pub fn is_full(&self) -> bool {
        self.remaining == 0
    }

    /// Fold one fetched page into the state. Every record passes the session
    /// filter, so duplicates are caught across pages and combos, not within
    /// a single page only. Returns how many records were admitted alongside
    /// the new state.
    pub fn absorb(
        mut self,
        page_items: &[RawRecord],
        combo: &Combo,
        page: u32,
        filter: &mut SessionFilter,
    ) -> (Self, usize) {
        let mut added = 0;
        for record in page_items {
            if self.remaining == 0 {
                break;
            }
            if filter.screen(record).is_err() {
                continue;
            }
            self.rows.push(JobRow::from_raw(record, combo, page));
            self.remaining -= 1;
            added += 1;
        }
        (self, added)
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub rows: Vec<JobRow>,
    pub requests_made: u32,
}

/// Run the full combo pass plus the broad fallback.
pub async fn run_search(
    provider: &dyn JobProvider,
    plan: &SearchPlan,
    filter: &mut SessionFilter,
) -> Result<SearchOutcome> {
    let mut state = CollectState::new(plan.target_total);
    let mut requests_made = 0u32;

    for (index, combo) in plan.combos.iter().enumerate() {
        if state.is_full() {
            break;
        }
        tracing::info!(
            combo = index + 1,
            combos = plan.combos.len(),
            job_type = combo.job_type.as_deref().unwrap_or("any"),
            exp_level = combo.exp_level.as_deref().unwrap_or("any"),
            "Fetching combo"
        );

        for page in 1..=plan.max_pages_per_combo {
            if state.is_full() {
                break;
            }
            let items = provider
                .fetch_page(&PageQuery {
                    combo: combo.clone(),
                    page,
                })
                .await?;
            requests_made += 1;

            if items.is_empty() {
                tracing::debug!(page, "Empty page, combo exhausted");
                break;
            }

            let (next, added) = state.absorb(&items, combo, page, filter);
            state = next;
            tracing::debug!(page, added, remaining = state.remaining, "Absorbed page");
        }
    }

    // Broad top-up: no job-type or experience filters.
    if !state.is_full() {
        let broad = Combo::any();
        tracing::info!(remaining = state.remaining, "Running broad fallback search");
        for page in 1..=plan.max_fallback_pages {
            if state.is_full() {
                break;
            }
            let items = provider
                .fetch_page(&PageQuery {
                    combo: broad.clone(),
                    page,
                })
                .await?;
            requests_made += 1;

            if items.is_empty() {
                break;
            }

            let (next, added) = state.absorb(&items, &broad, page, filter);
            state = next;
            tracing::debug!(page, added, remaining = state.remaining, "Absorbed fallback page");
        }
    }

    let mut rows = state.rows;
    if filter.sort_newest_first() {
        dedupe::sort_newest_first(&mut rows, filter.now());
    }
    rows.truncate(plan.target_total);

    Ok(SearchOutcome {
        rows,
        requests_made,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::dedupe::{ExclusionList, FilterOptions};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted provider: pops canned pages and records every query it saw.
    struct ScriptedProvider {
        pages: Mutex<Vec<Vec<RawRecord>>>,
        queries: Mutex<Vec<(Option<String>, Option<String>, u32)>>,
    }

    impl ScriptedProvider {
        fn new(pages: Vec<Vec<RawRecord>>) -> Self {
            let mut pages = pages;
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn query_log(&self) -> Vec<(Option<String>, Option<String>, u32)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobProvider for ScriptedProvider {
        async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawRecord>> {
            self.queries.lock().unwrap().push((
                query.combo.job_type.clone(),
                query.combo.exp_level.clone(),
                query.page,
            ));
            Ok(self.pages.lock().unwrap().pop().unwrap_or_default())
        }
    }

    fn records(ids: &[&str]) -> Vec<RawRecord> {
        ids.iter()
            .map(|id| {
                json!({
                    "job_link": format!("https://jobs.example/{}", id),
                    "job_position": format!("Role {}", id),
                    "company_name": "Acme",
                })
                .as_object()
                .unwrap()
                .clone()
            })
            .collect()
    }

    fn open_filter() -> SessionFilter {
        SessionFilter::new(FilterOptions {
            exclude: ExclusionList::compiled_in(),
            max_age_minutes: None,
            sort_newest_first: false,
            now: Utc::now(),
        })
    }

    fn plan(target: usize, combos: Vec<Combo>) -> SearchPlan {
        SearchPlan {
            target_total: target,
            combos,
            max_pages_per_combo: 5,
            max_fallback_pages: 8,
        }
    }

    fn combo(job_type: &str, exp_level: &str) -> Combo {
        Combo {
            job_type: Some(job_type.to_string()),
            exp_level: Some(exp_level.to_string()),
        }
    }

    #[tokio::test]
    async fn test_stops_as_soon_as_target_is_met() {
        // Two combos configured, but the first page already fills the quota.
        let provider = ScriptedProvider::new(vec![records(&["1", "2", "3", "4", "5"])]);
        let combos = vec![combo("full_time", "senior"), combo("contract", "senior")];
        let mut filter = open_filter();

        let outcome = run_search(&provider, &plan(5, combos), &mut filter)
            .await
            .unwrap();

        assert_eq!(outcome.rows.len(), 5);
        assert_eq!(outcome.requests_made, 1);
        let log = provider.query_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0], (Some("full_time".into()), Some("senior".into()), 1));
        // Every row is tagged with the producing combo and page.
        assert!(outcome
            .rows
            .iter()
            .all(|row| row.job_type == "full_time" && row.exp_level == "senior" && row.page == 1));
    }

    #[tokio::test]
    async fn test_empty_page_ends_combo_and_triggers_fallback() {
        // Combo yields 2 then goes dry; the broad pass supplies the rest.
        let provider = ScriptedProvider::new(vec![
            records(&["1", "2"]),
            vec![], // combo page 2: exhausted
            records(&["3", "4"]),
            records(&["5"]),
            vec![], // fallback page 3: exhausted early
        ]);
        let mut filter = open_filter();

        let outcome = run_search(&provider, &plan(10, vec![combo("full_time", "senior")]), &mut filter)
            .await
            .unwrap();

        assert_eq!(outcome.rows.len(), 5);
        assert_eq!(outcome.requests_made, 5);

        let log = provider.query_log();
        // Fallback pages run without filters.
        assert_eq!(log[2], (None, None, 1));
        assert_eq!(log[3], (None, None, 2));
        assert_eq!(log[4], (None, None, 3));

        // Short of the target: all available rows, no padding.
        assert!(outcome.rows.iter().take(2).all(|row| row.job_type == "full_time"));
        assert!(outcome.rows.iter().skip(2).all(|row| row.job_type.is_empty()));
    }

    #[tokio::test]
    async fn test_cross_page_duplicates_are_dropped_globally() {
        let provider = ScriptedProvider::new(vec![
            records(&["1", "2"]),
            records(&["2", "3"]), // "2" repeats across pages
            records(&["3", "4"]), // so does "3"
            records(&["5"]),
        ]);
        let combos = vec![combo("full_time", "senior"), combo("contract", "senior")];
        let mut filter = open_filter();

        let outcome = run_search(&provider, &plan(5, combos), &mut filter)
            .await
            .unwrap();

        let links: Vec<&str> = outcome.rows.iter().map(|r| r.job_link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://jobs.example/1",
                "https://jobs.example/2",
                "https://jobs.example/3",
                "https://jobs.example/4",
                "https://jobs.example/5",
            ]
        );
    }

    #[tokio::test]
    async fn test_all_pages_empty_is_an_empty_success() {
        let provider = ScriptedProvider::new(vec![]);
        let combos = vec![combo("full_time", "senior"), combo("contract", "senior")];
        let mut filter = open_filter();

        let outcome = run_search(&provider, &plan(5, combos), &mut filter)
            .await
            .unwrap();

        assert!(outcome.rows.is_empty());
        // One empty probe per combo plus one for the fallback.
        assert_eq!(outcome.requests_made, 3);
    }

    #[tokio::test]
    async fn test_result_truncated_to_exact_target() {
        let provider = ScriptedProvider::new(vec![records(&["1", "2", "3", "4", "5", "6", "7"])]);
        let mut filter = open_filter();

        let outcome = run_search(&provider, &plan(4, vec![combo("full_time", "senior")]), &mut filter)
            .await
            .unwrap();

        assert_eq!(outcome.rows.len(), 4);
    }

    #[tokio::test]
    async fn test_recency_sort_orders_final_rows() {
        let page = vec![
            json!({"job_link": "a", "job_posting_date": "3 days ago"}),
            json!({"job_link": "b", "job_posting_date": "just now"}),
            json!({"job_link": "c", "job_posting_date": "2 hours ago"}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        let provider = ScriptedProvider::new(vec![page]);

        let mut filter = SessionFilter::new(FilterOptions {
            exclude: ExclusionList::compiled_in(),
            max_age_minutes: Some(crate::jobs::recency::MINUTES_PER_WEEK),
            sort_newest_first: true,
            now: Utc::now(),
        });

        let outcome = run_search(&provider, &plan(3, vec![Combo::any()]), &mut filter)
            .await
            .unwrap();

        let links: Vec<&str> = outcome.rows.iter().map(|r| r.job_link.as_str()).collect();
        assert_eq!(links, vec!["b", "c", "a"]);
    }
}
