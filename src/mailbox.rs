use anyhow::Result;
use std::collections::HashSet;

use crate::domain::email::{EmailId, EmailSummary};
use crate::domain::filter::Filter;
use crate::store::repo::KeyValueStore;

pub const DEFAULT_STORAGE_KEY: &str = "emails";

/// Single owner of the email collection.
///
/// Every mutation goes through a method here and is written through to the
/// backing [`KeyValueStore`] before it returns.
pub struct EmailStore {
    storage: Box<dyn KeyValueStore>,
    key: String,
    emails: Vec<EmailSummary>,
    fetched_pages: HashSet<u32>,
    selected: Option<EmailId>,
}

impl EmailStore {
    /// Load the persisted collection. Missing, unreadable or malformed data
    /// yields an empty collection.
    pub fn hydrate(storage: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let emails = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<EmailSummary>>(&raw) {
                Ok(list) => dedup_by_id(list),
                Err(e) => {
                    log::warn!("stored collection under {key:?} is malformed, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("could not read stored collection, starting empty: {e}");
                Vec::new()
            }
        };
        log::debug!("hydrated {} emails", emails.len());

        Self {
            storage,
            key,
            emails,
            fetched_pages: HashSet::new(),
            selected: None,
        }
    }

    pub fn emails(&self) -> &[EmailSummary] {
        &self.emails
    }

    pub fn get(&self, id: &str) -> Option<&EmailSummary> {
        self.emails.iter().find(|e| e.id == id)
    }

    pub fn filtered(&self, filter: Filter) -> Vec<&EmailSummary> {
        self.emails.iter().filter(|e| filter.matches(e)).collect()
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Fold a freshly fetched page into the collection.
    ///
    /// Remote fields win; `read`/`favorite` of an already known id are kept.
    /// Known ids keep their position, new ids are appended.
    pub fn merge_page(&mut self, page: Vec<EmailSummary>) -> Result<()> {
        for mut incoming in page {
            match self.emails.iter().position(|e| e.id == incoming.id) {
                Some(idx) => {
                    let existing = &self.emails[idx];
                    incoming.read = existing.read;
                    incoming.favorite = existing.favorite;
                    self.emails[idx] = incoming;
                }
                None => {
                    incoming.read = false;
                    incoming.favorite = false;
                    self.emails.push(incoming);
                }
            }
        }
        self.persist()
    }

    /// Flip the favorite flag. Returns the new value, or `None` if the id is unknown.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(email) = self.emails.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        email.favorite = !email.favorite;
        let now = email.favorite;
        self.persist()?;
        Ok(Some(now))
    }

    /// Set `read`; never clears it. Returns whether the id is known.
    pub fn mark_as_read(&mut self, id: &str) -> Result<bool> {
        let Some(email) = self.emails.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        email.read = true;
        self.persist()?;
        Ok(true)
    }

    pub fn set_selected_email_id(&mut self, id: Option<EmailId>) {
        self.selected = id;
    }

    pub fn selected_email_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected email, if the id still resolves.
    pub fn selected_email(&self) -> Option<&EmailSummary> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    /// List "click": mark as read, then select.
    pub fn open_email(&mut self, id: &str) -> Result<()> {
        let result = self.mark_as_read(id);
        self.set_selected_email_id(Some(id.to_string()));
        result.map(|_| ())
    }

    pub fn has_fetched(&self, page: u32) -> bool {
        self.fetched_pages.contains(&page)
    }

    pub fn record_page(&mut self, page: u32) {
        self.fetched_pages.insert(page);
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.emails)?;
        self.storage.set(&self.key, &raw)
    }
}

fn dedup_by_id(list: Vec<EmailSummary>) -> Vec<EmailSummary> {
    let mut seen = HashSet::new();
    list.into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect()
}
