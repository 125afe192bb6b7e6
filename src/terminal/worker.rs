use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::detail::DetailRequest;
use crate::domain::email::{EmailBody, EmailSummary};
use crate::mail::remote::{EmailSource, SourceError};

/// Answers coming back to the UI thread.
#[derive(Debug)]
pub enum WorkerEvent {
    Page {
        page: u32,
        result: Result<Vec<EmailSummary>, SourceError>,
    },
    Body {
        ticket: u64,
        result: Result<EmailBody, SourceError>,
    },
}

/// Side effects the UI state asks for.
pub trait Dispatch {
    fn fetch_page(&self, page: u32);
    fn fetch_body(&self, req: DetailRequest);
}

/// Runs every request on its own thread and reports through a channel.
pub struct Fetcher {
    source: Arc<dyn EmailSource>,
    tx: Sender<WorkerEvent>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn EmailSource>) -> (Self, Receiver<WorkerEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { source, tx }, rx)
    }
}

impl Dispatch for Fetcher {
    fn fetch_page(&self, page: u32) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source.fetch_page(page);
            // receiver gone means the UI already exited
            let _ = tx.send(WorkerEvent::Page { page, result });
        });
    }

    fn fetch_body(&self, req: DetailRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source.fetch_body(&req.id);
            let _ = tx.send(WorkerEvent::Body {
                ticket: req.ticket,
                result,
            });
        });
    }
}
