use ratatui::widgets::ListState;

use crate::detail::{DetailLoader, render_body};
use crate::domain::email::{EmailId, EmailSummary};
use crate::domain::filter::Filter;
use crate::mailbox::EmailStore;
use crate::pager::{PageOutcome, Pager};
use crate::terminal::worker::{Dispatch, WorkerEvent};

/// Terminal lines taken by one list row, separator included.
pub const ITEM_HEIGHT: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    ListOnly,
    Split,
}

pub struct AppState {
    pub store: EmailStore,
    pub pager: Pager,
    pub detail: DetailLoader,
    pub filter: Filter,

    pub list_state: ListState,
    /// Inner height of the list pane at the last draw.
    pub list_rows: u16,
    /// Whether list and detail fit side by side.
    pub wide: bool,

    pub body_scroll: u16,
    /// Plain-text body keyed by email id and wrap width.
    rendered_body: Option<(EmailId, usize, String)>,

    pub focus: Focus,
    pub mode: ViewMode,
}

impl AppState {
    pub fn new(store: EmailStore) -> Self {
        let mut s = Self {
            store,
            pager: Pager::new(),
            detail: DetailLoader::new(),
            filter: Filter::All,
            list_state: ListState::default(),
            list_rows: 0,
            wide: true,
            body_scroll: 0,
            rendered_body: None,
            focus: Focus::List,
            mode: ViewMode::ListOnly,
        };
        s.clamp_selection();
        s
    }

    pub fn visible(&self) -> Vec<&EmailSummary> {
        self.store.filtered(self.filter)
    }

    pub fn start(&mut self, jobs: &dyn Dispatch) {
        if let Some(page) = self.pager.start(self.filter, &self.store) {
            jobs.fetch_page(page);
        }
    }

    pub fn set_filter(&mut self, filter: Filter, jobs: &dyn Dispatch) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.list_state.select(Some(0));
        *self.list_state.offset_mut() = 0;
        self.clamp_selection();
        self.start(jobs);
    }

    pub fn current_selected_id(&self) -> Option<EmailId> {
        let idx = self.list_state.selected()?;
        self.visible().get(idx).map(|e| e.id.clone())
    }

    pub fn move_selection(&mut self, delta: i32, jobs: &dyn Dispatch) {
        let len = self.visible().len() as i32;
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
        self.check_sentinel(jobs);
    }

    pub fn select_first(&mut self) {
        if !self.visible().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self, jobs: &dyn Dispatch) {
        let len = self.visible().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
            self.check_sentinel(jobs);
        }
    }

    /// Narrow terminals give an opened email the whole screen.
    pub fn list_shown(&self) -> bool {
        self.mode == ViewMode::ListOnly || self.wide
    }

    /// Is the last row of the filtered list on screen?
    pub fn sentinel_visible(&self) -> bool {
        if !self.list_shown() {
            return false;
        }
        let len = self.visible().len();
        if len == 0 {
            return false;
        }
        if self.list_state.selected() == Some(len - 1) {
            return true;
        }
        let per_view = (self.list_rows / ITEM_HEIGHT).max(1) as usize;
        self.list_state.offset() + per_view >= len
    }

    pub fn check_sentinel(&mut self, jobs: &dyn Dispatch) {
        if !self.sentinel_visible() {
            return;
        }
        if let Some(page) = self.pager.on_sentinel_visible(self.filter, &self.store) {
            jobs.fetch_page(page);
        }
    }

    /// Called once per loop iteration. A failed page waits for the user to retry.
    pub fn tick(&mut self, jobs: &dyn Dispatch) {
        if self.pager.error().is_none() {
            self.check_sentinel(jobs);
        }
    }

    /// Re-request the page that failed. Does nothing otherwise.
    pub fn retry(&mut self, jobs: &dyn Dispatch) {
        if self.pager.error().is_none() {
            return;
        }
        if let Some(page) = self.pager.on_sentinel_visible(self.filter, &self.store) {
            jobs.fetch_page(page);
        }
    }

    pub fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Page { page, result } => {
                match self.pager.complete(page, result, &mut self.store) {
                    Ok(PageOutcome::Merged { count, .. }) => {
                        log::debug!("merged {count} emails from page {page}")
                    }
                    Ok(_) => {}
                    Err(e) => log::error!("could not persist page {page}: {e}"),
                }
                self.clamp_selection();
            }
            WorkerEvent::Body { ticket, result } => {
                if self.detail.complete(ticket, result) {
                    self.rendered_body = None;
                }
            }
        }
    }

    pub fn open_selected(&mut self, jobs: &dyn Dispatch) {
        let Some(id) = self.current_selected_id() else {
            return;
        };
        if let Err(e) = self.store.open_email(&id) {
            log::error!("could not persist read flag for {id}: {e}");
        }
        self.mode = ViewMode::Split;
        self.focus = Focus::Body;
        self.body_scroll = 0;
        self.rendered_body = None;
        jobs.fetch_body(self.detail.select(id));
        self.clamp_selection();
    }

    pub fn close_email(&mut self) {
        self.mode = ViewMode::ListOnly;
        self.focus = Focus::List;
        self.store.set_selected_email_id(None);
        self.detail.clear();
        self.body_scroll = 0;
        self.rendered_body = None;
    }

    /// Favorite the opened email, or the highlighted row when none is open.
    pub fn toggle_favorite(&mut self) {
        let target = match self.mode {
            ViewMode::Split => self.store.selected_email_id().map(str::to_string),
            ViewMode::ListOnly => self.current_selected_id(),
        };
        let Some(id) = target else {
            return;
        };
        match self.store.toggle_favorite(&id) {
            Ok(Some(now)) => log::debug!("{id} favorite={now}"),
            Ok(None) => {}
            Err(e) => log::error!("could not persist favorite flag for {id}: {e}"),
        }
        self.clamp_selection();
    }

    pub fn toggle_focus(&mut self) {
        if self.mode != ViewMode::Split {
            return;
        }
        self.focus = match self.focus {
            Focus::List => Focus::Body,
            Focus::Body => Focus::List,
        };
    }

    pub fn scroll_body(&mut self, delta: i32) {
        if self.mode != ViewMode::Split {
            return;
        }
        if delta < 0 {
            self.body_scroll = self.body_scroll.saturating_sub((-delta) as u16);
        } else {
            self.body_scroll = self.body_scroll.saturating_add(delta as u16);
        }
    }

    /// Plain-text body for the loaded email, converted once per width.
    pub fn body_text(&mut self, id: &str, html: &str, width: usize) -> &str {
        let stale = !matches!(&self.rendered_body, Some((cached, w, _)) if cached == id && *w == width);
        if stale {
            self.rendered_body = Some((id.to_string(), width, render_body(html, width)));
        }
        self.rendered_body
            .as_ref()
            .map(|(_, _, text)| text.as_str())
            .unwrap_or_default()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            None => self.list_state.select(Some(0)),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }
}
