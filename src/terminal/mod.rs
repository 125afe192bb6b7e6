pub mod events;
pub mod state;
pub mod ui;
pub mod worker;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::mail::remote::EmailSource;
use crate::mailbox::EmailStore;
use crate::terminal::state::AppState;
use crate::terminal::worker::{Fetcher, WorkerEvent};

/// Below this many columns an opened email takes the whole screen.
pub const WIDE_LAYOUT_COLS: u16 = 100;

const TICK: Duration = Duration::from_millis(100);

pub fn run_tui(store: EmailStore, source: Arc<dyn EmailSource>) -> Result<()> {
    let (fetcher, rx) = Fetcher::new(source);
    let mut state = AppState::new(store);

    let terminal = ratatui::init();
    let result = run(terminal, &mut state, &fetcher, &rx);

    ratatui::restore();

    result
}

fn run(
    mut terminal: DefaultTerminal,
    state: &mut AppState,
    fetcher: &Fetcher,
    rx: &Receiver<WorkerEvent>,
) -> Result<()> {
    state.start(fetcher);

    loop {
        state.wide = terminal.size()?.width >= WIDE_LAYOUT_COLS;
        terminal.draw(|f| ui::render(f, state))?;

        while let Ok(ev) = rx.try_recv() {
            state.apply(ev);
        }
        state.tick(fetcher);

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && events::handle_key(key, state, fetcher)
        {
            break;
        }
    }
    Ok(())
}
