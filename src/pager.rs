use anyhow::Result;

use crate::domain::email::EmailSummary;
use crate::domain::filter::Filter;
use crate::mail::remote::{EmailSource, SourceError};
use crate::mailbox::EmailStore;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load emails. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PagerState {
    #[default]
    Idle,
    Loading {
        page: u32,
    },
    /// The source ran dry. Nothing is fetched any more this session.
    Exhausted,
    Failed {
        page: u32,
        message: String,
    },
}

/// Result of folding a fetch into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Merged { page: u32, count: usize },
    Exhausted,
    Failed,
    /// Completion for a page that was not in flight.
    Ignored,
}

/// Incremental page loading with duplicate suppression.
#[derive(Debug, Default)]
pub struct Pager {
    state: PagerState,
    current_page: u32,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PagerState {
        &self.state
    }

    /// Last page merged successfully; 0 before the first one.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PagerState::Loading { .. })
    }

    pub fn has_more(&self) -> bool {
        self.state != PagerState::Exhausted
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PagerState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Initial load, re-run whenever the filter changes.
    pub fn start(&mut self, filter: Filter, store: &EmailStore) -> Option<u32> {
        self.begin(1, filter, store)
    }

    /// The last rendered row came into view.
    pub fn on_sentinel_visible(&mut self, filter: Filter, store: &EmailStore) -> Option<u32> {
        self.begin(self.current_page + 1, filter, store)
    }

    /// Move to `Loading` and hand back the page to fetch, unless the request
    /// must be suppressed.
    pub fn begin(&mut self, page: u32, filter: Filter, store: &EmailStore) -> Option<u32> {
        if !filter.paginates() {
            return None;
        }
        match self.state {
            PagerState::Loading { .. } | PagerState::Exhausted => return None,
            PagerState::Idle | PagerState::Failed { .. } => {}
        }
        if store.has_fetched(page) {
            log::trace!("page {page} already fetched");
            return None;
        }
        log::debug!("loading page {page}");
        self.state = PagerState::Loading { page };
        Some(page)
    }

    /// Apply the answer for the in-flight page.
    pub fn complete(
        &mut self,
        page: u32,
        result: Result<Vec<EmailSummary>, SourceError>,
        store: &mut EmailStore,
    ) -> Result<PageOutcome> {
        if self.state != (PagerState::Loading { page }) {
            log::warn!("dropping result for page {page}, not in flight");
            return Ok(PageOutcome::Ignored);
        }

        match result {
            Ok(emails) if emails.is_empty() => {
                log::info!("page {page} is empty, no more pages");
                self.state = PagerState::Exhausted;
                Ok(PageOutcome::Exhausted)
            }
            Ok(emails) => {
                let count = emails.len();
                store.record_page(page);
                self.current_page = page;
                self.state = PagerState::Idle;
                store.merge_page(emails)?;
                Ok(PageOutcome::Merged { page, count })
            }
            Err(e) => {
                log::error!("error fetching page {page}: {e}");
                self.state = PagerState::Failed {
                    page,
                    message: LOAD_FAILED_MESSAGE.to_string(),
                };
                Ok(PageOutcome::Failed)
            }
        }
    }

    /// Fetch `page` inline. `None` when the request was suppressed.
    pub fn load_page(
        &mut self,
        page: u32,
        filter: Filter,
        source: &dyn EmailSource,
        store: &mut EmailStore,
    ) -> Result<Option<PageOutcome>> {
        let Some(page) = self.begin(page, filter, store) else {
            return Ok(None);
        };
        let result = source.fetch_page(page);
        self.complete(page, result, store).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email::EmailBody;
    use crate::mailbox::tests::{empty_store, summary};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<u32, Vec<EmailSummary>>,
        failing: Vec<u32>,
        calls: Mutex<Vec<u32>>,
    }

    impl FakeSource {
        fn page(mut self, n: u32, emails: Vec<EmailSummary>) -> Self {
            self.pages.insert(n, emails);
            self
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl EmailSource for FakeSource {
        fn fetch_page(&self, page: u32) -> Result<Vec<EmailSummary>, SourceError> {
            self.calls.lock().unwrap().push(page);
            if self.failing.contains(&page) {
                return Err(SourceError::Status(503));
            }
            Ok(self.pages.get(&page).cloned().unwrap_or_default())
        }

        fn fetch_body(&self, id: &str) -> Result<EmailBody, SourceError> {
            Err(SourceError::Decode(format!("no body for {id}")))
        }
    }

    #[test]
    fn pages_advance_on_success() {
        let source = FakeSource::default()
            .page(1, vec![summary("1", "a")])
            .page(2, vec![summary("2", "b")]);
        let mut store = empty_store();
        let mut pager = Pager::new();

        let page = pager.start(Filter::All, &store).unwrap();
        assert!(pager.is_loading());
        pager
            .complete(page, source.fetch_page(page), &mut store)
            .unwrap();
        assert_eq!(pager.current_page(), 1);

        let outcome = pager
            .load_page(pager.current_page() + 1, Filter::All, &source, &mut store)
            .unwrap();
        assert_eq!(outcome, Some(PageOutcome::Merged { page: 2, count: 1 }));
        assert_eq!(store.emails().len(), 2);
        assert!(store.has_fetched(1) && store.has_fetched(2));
    }

    #[test]
    fn fetched_page_is_not_requested_again() {
        let source = FakeSource::default().page(1, vec![summary("1", "a")]);
        let mut store = empty_store();
        let mut pager = Pager::new();

        pager.load_page(1, Filter::All, &source, &mut store).unwrap();
        let before = store.emails().to_vec();

        let again = pager.load_page(1, Filter::All, &source, &mut store).unwrap();
        assert_eq!(again, None);
        assert_eq!(source.calls(), vec![1]);
        assert_eq!(store.emails(), before.as_slice());
        assert_eq!(pager.start(Filter::Unread, &store), None);
    }

    #[test]
    fn only_one_fetch_in_flight() {
        let store = empty_store();
        let mut pager = Pager::new();

        assert_eq!(pager.start(Filter::All, &store), Some(1));
        assert_eq!(pager.on_sentinel_visible(Filter::All, &store), None);
        assert_eq!(pager.start(Filter::All, &store), None);
        assert_eq!(pager.state(), &PagerState::Loading { page: 1 });
    }

    #[test]
    fn read_and_favorites_never_paginate() {
        let store = empty_store();
        let mut pager = Pager::new();

        assert_eq!(pager.start(Filter::Read, &store), None);
        assert_eq!(pager.on_sentinel_visible(Filter::Favorites, &store), None);
        assert_eq!(pager.state(), &PagerState::Idle);
    }

    #[test]
    fn empty_page_halts_pagination() {
        let source = FakeSource::default().page(1, vec![summary("1", "a")]);
        let mut store = empty_store();
        let mut pager = Pager::new();

        pager.load_page(1, Filter::All, &source, &mut store).unwrap();
        let outcome = pager.load_page(2, Filter::All, &source, &mut store).unwrap();
        assert_eq!(outcome, Some(PageOutcome::Exhausted));
        assert!(!pager.has_more());
        assert!(!store.has_fetched(2));

        assert_eq!(pager.on_sentinel_visible(Filter::All, &store), None);
        assert_eq!(pager.on_sentinel_visible(Filter::Unread, &store), None);
        assert_eq!(source.calls(), vec![1, 2]);
    }

    #[test]
    fn failure_keeps_has_more_and_allows_retry_of_same_page() {
        let mut source = FakeSource::default().page(1, vec![summary("1", "a")]);
        source.failing.push(1);
        let mut store = empty_store();
        let mut pager = Pager::new();

        let outcome = pager.load_page(1, Filter::All, &source, &mut store).unwrap();
        assert_eq!(outcome, Some(PageOutcome::Failed));
        assert!(pager.has_more());
        assert_eq!(pager.error(), Some(LOAD_FAILED_MESSAGE));
        assert!(!store.has_fetched(1));

        source.failing.clear();
        assert_eq!(pager.on_sentinel_visible(Filter::All, &store), Some(1));
        pager
            .complete(1, source.fetch_page(1), &mut store)
            .unwrap();
        assert_eq!(pager.error(), None);
        assert_eq!(store.emails().len(), 1);
    }

    #[test]
    fn completion_for_other_page_is_ignored() {
        let mut store = empty_store();
        let mut pager = Pager::new();

        pager.start(Filter::All, &store);
        let outcome = pager
            .complete(7, Ok(vec![summary("7", "x")]), &mut store)
            .unwrap();
        assert_eq!(outcome, PageOutcome::Ignored);
        assert!(store.emails().is_empty());
        assert!(pager.is_loading());
    }

    #[test]
    fn refetch_scenario_preserves_local_state() {
        let source = FakeSource::default()
            .page(1, vec![summary("1", "A"), summary("2", "B")])
            .page(2, vec![summary("1", "A, revised"), summary("3", "C")]);
        let mut store = empty_store();
        let mut pager = Pager::new();

        pager.load_page(1, Filter::All, &source, &mut store).unwrap();
        store.mark_as_read("1").unwrap();
        store.toggle_favorite("2").unwrap();
        pager.load_page(2, Filter::All, &source, &mut store).unwrap();

        let got: Vec<_> = store
            .emails()
            .iter()
            .map(|e| (e.id.as_str(), e.subject.as_str(), e.read, e.favorite))
            .collect();
        assert_eq!(
            got,
            vec![
                ("1", "A, revised", true, false),
                ("2", "B", false, true),
                ("3", "C", false, false),
            ]
        );
    }
}
