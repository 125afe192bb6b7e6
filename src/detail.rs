use anyhow::anyhow;

use crate::domain::email::{EmailBody, EmailId, EmailSummary};
use crate::mail::remote::{EmailSource, SourceError};

pub const DETAIL_FAILED_MESSAGE: &str = "Failed to load email content. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading {
        id: EmailId,
        ticket: u64,
    },
    Loaded {
        id: EmailId,
        body: String,
    },
    Failed {
        id: EmailId,
        message: String,
    },
}

/// A body fetch to run; its answer must come back with the same ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub id: EmailId,
    pub ticket: u64,
}

/// Loads the body of whatever email is currently selected.
///
/// Bodies are not cached: every selection starts a new fetch. Answers to
/// older selections are dropped.
#[derive(Debug, Default)]
pub struct DetailLoader {
    state: DetailState,
    next_ticket: u64,
}

impl DetailLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn select(&mut self, id: impl Into<EmailId>) -> DetailRequest {
        self.next_ticket += 1;
        let id = id.into();
        self.state = DetailState::Loading {
            id: id.clone(),
            ticket: self.next_ticket,
        };
        DetailRequest {
            id,
            ticket: self.next_ticket,
        }
    }

    pub fn clear(&mut self) {
        self.state = DetailState::Idle;
    }

    /// Returns `false` when the answer was stale and dropped.
    pub fn complete(&mut self, ticket: u64, result: Result<EmailBody, SourceError>) -> bool {
        let id = match &self.state {
            DetailState::Loading { id, ticket: t } if *t == ticket => id.clone(),
            _ => {
                log::debug!("dropping stale body response (ticket {ticket})");
                return false;
            }
        };

        self.state = match result {
            Ok(body) if body.id == id => DetailState::Loaded {
                id,
                body: body.body,
            },
            Ok(body) => {
                log::error!("body for {} answered request for {id}", body.id);
                DetailState::Failed {
                    id,
                    message: DETAIL_FAILED_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                log::error!("error fetching body of {id}: {e}");
                DetailState::Failed {
                    id,
                    message: DETAIL_FAILED_MESSAGE.to_string(),
                }
            }
        };
        true
    }
}

/// Turn an HTML body into terminal-safe plain text.
///
/// The source's markup is not trusted: tags are flattened and control
/// characters (escape sequences included) are dropped.
pub fn render_body(html: &str, width: usize) -> String {
    let text = match html2text::from_read(html.as_bytes(), width.max(20)) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("could not convert body to text: {e}");
            html.to_string()
        }
    };
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Fetch a body and render it as text in one go, for non-interactive use.
pub fn fetch_body_text(source: &dyn EmailSource, id: &str, width: usize) -> anyhow::Result<String> {
    match source.fetch_body(id) {
        Ok(body) => Ok(render_body(&body.body, width)),
        Err(e) => {
            log::error!("error fetching body of {id}: {e}");
            Err(anyhow!(DETAIL_FAILED_MESSAGE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(id: &str, html: &str) -> EmailBody {
        EmailBody {
            id: id.to_string(),
            body: html.to_string(),
        }
    }

    #[test]
    fn loads_body_for_current_selection() {
        let mut loader = DetailLoader::new();
        let req = loader.select("1");

        assert!(loader.complete(req.ticket, Ok(body("1", "<p>hi</p>"))));
        assert_eq!(
            loader.state(),
            &DetailState::Loaded {
                id: "1".into(),
                body: "<p>hi</p>".into()
            }
        );
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_selection() {
        let mut loader = DetailLoader::new();
        let first = loader.select("1");
        let second = loader.select("2");

        assert!(!loader.complete(first.ticket, Ok(body("1", "old"))));
        assert_eq!(
            loader.state(),
            &DetailState::Loading {
                id: "2".into(),
                ticket: second.ticket
            }
        );

        assert!(loader.complete(second.ticket, Ok(body("2", "new"))));
        assert!(matches!(loader.state(), DetailState::Loaded { id, .. } if id == "2"));
    }

    #[test]
    fn reselecting_same_id_fetches_again() {
        let mut loader = DetailLoader::new();
        let a = loader.select("1");
        loader.complete(a.ticket, Ok(body("1", "x")));

        let b = loader.select("1");
        assert_ne!(a.ticket, b.ticket);
        assert!(matches!(loader.state(), DetailState::Loading { .. }));
    }

    #[test]
    fn failure_is_reported_inline() {
        let mut loader = DetailLoader::new();
        let req = loader.select("1");

        assert!(loader.complete(req.ticket, Err(SourceError::Status(404))));
        assert_eq!(
            loader.state(),
            &DetailState::Failed {
                id: "1".into(),
                message: DETAIL_FAILED_MESSAGE.into()
            }
        );
    }

    #[test]
    fn body_for_another_id_fails_the_request() {
        let mut loader = DetailLoader::new();
        let req = loader.select("1");

        assert!(loader.complete(req.ticket, Ok(body("2", "x"))));
        assert_eq!(
            loader.state(),
            &DetailState::Failed {
                id: "1".into(),
                message: DETAIL_FAILED_MESSAGE.into()
            }
        );
    }

    #[test]
    fn cleared_loader_ignores_late_answers() {
        let mut loader = DetailLoader::new();
        let req = loader.select("1");
        loader.clear();

        assert!(!loader.complete(req.ticket, Ok(body("1", "x"))));
        assert_eq!(loader.state(), &DetailState::Idle);
    }

    struct FixedSource(Result<&'static str, u16>);

    impl EmailSource for FixedSource {
        fn fetch_page(&self, _page: u32) -> Result<Vec<EmailSummary>, SourceError> {
            Ok(Vec::new())
        }

        fn fetch_body(&self, id: &str) -> Result<EmailBody, SourceError> {
            match self.0 {
                Ok(html) => Ok(body(id, html)),
                Err(status) => Err(SourceError::Status(status)),
            }
        }
    }

    #[test]
    fn fetch_body_text_renders_plain_text() {
        let text = fetch_body_text(&FixedSource(Ok("<p>hi there</p>")), "1", 80).unwrap();
        assert!(text.contains("hi there"));
    }

    #[test]
    fn fetch_body_text_reports_the_inline_message() {
        let err = fetch_body_text(&FixedSource(Err(502)), "1", 80).unwrap_err();
        assert_eq!(err.to_string(), DETAIL_FAILED_MESSAGE);
    }

    #[test]
    fn render_body_strips_markup_and_escapes() {
        let text = render_body(
            "<div><p>Hello <b>there</b></p><script>alert(1)</script>\u{1b}[31m</div>",
            80,
        );
        assert!(text.contains("Hello"));
        assert!(text.contains("there"));
        assert!(!text.contains("<p>"));
        assert!(!text.contains('\u{1b}'));
    }
}
