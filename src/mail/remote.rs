use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::domain::email::{EmailBody, EmailSummary, Sender};

pub const DEFAULT_BASE_URL: &str = "https://flipkart-email-mock.now.sh/";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Where pages and bodies come from.
///
/// Implementations are called from worker threads, hence `Send + Sync`.
pub trait EmailSource: Send + Sync {
    /// Summaries of page `page` (1-based). An empty vec means there is nothing more.
    fn fetch_page(&self, page: u32) -> Result<Vec<EmailSummary>, SourceError>;
    fn fetch_body(&self, id: &str) -> Result<EmailBody, SourceError>;
}

/// One row of `GET ?page=n`. Carries no local flags.
#[derive(Debug, Deserialize)]
struct RemoteSummary {
    id: String,
    from: Sender,
    date: i64,
    subject: String,
    short_description: String,
}

impl From<RemoteSummary> for EmailSummary {
    fn from(r: RemoteSummary) -> Self {
        EmailSummary {
            id: r.id,
            sender: r.from,
            date: r.date,
            subject: r.subject,
            short_description: r.short_description,
            read: false,
            favorite: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    list: Vec<RemoteSummary>,
}

#[derive(Debug, Deserialize)]
struct BodyResponse {
    body: String,
}

pub struct HttpSource {
    client: Client,
    base_url: String,
    server_error_ends_list: bool,
}

impl HttpSource {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        server_error_ends_list: bool,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            server_error_ends_list,
        })
    }

    fn get_text(&self, query: &[(&str, &str)]) -> Result<(u16, String), SourceError> {
        let resp = self.client.get(&self.base_url).query(query).send()?;
        let status = resp.status().as_u16();
        let text = resp.text()?;
        Ok((status, text))
    }
}

impl EmailSource for HttpSource {
    fn fetch_page(&self, page: u32) -> Result<Vec<EmailSummary>, SourceError> {
        let page_s = page.to_string();
        let (status, text) = self.get_text(&[("page", page_s.as_str())])?;

        // The mock endpoint answers 5xx past the last page.
        if (500..600).contains(&status) && self.server_error_ends_list {
            log::info!("page {page}: server answered {status}, treating as end of list");
            return Ok(Vec::new());
        }
        if !(200..300).contains(&status) {
            return Err(SourceError::Status(status));
        }

        let parsed: PageResponse =
            serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()))?;
        log::debug!("page {page}: {} summaries", parsed.list.len());
        Ok(parsed.list.into_iter().map(EmailSummary::from).collect())
    }

    fn fetch_body(&self, id: &str) -> Result<EmailBody, SourceError> {
        let (status, text) = self.get_text(&[("id", id)])?;
        if !(200..300).contains(&status) {
            return Err(SourceError::Status(status));
        }

        let parsed: BodyResponse =
            serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(EmailBody {
            id: id.to_string(),
            body: parsed.body,
        })
    }
}
