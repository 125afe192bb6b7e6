use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::Arc;

use rs_mail_browser::config::{Config, load_config, log_path, resolve_db_path};
use rs_mail_browser::detail::fetch_body_text;
use rs_mail_browser::domain::filter::Filter;
use rs_mail_browser::format::{format_date, one_line, sender_line};
use rs_mail_browser::mail::remote::{EmailSource, HttpSource};
use rs_mail_browser::mailbox::EmailStore;
use rs_mail_browser::pager::{PageOutcome, Pager};
use rs_mail_browser::store::sqlite::SqliteStore;
use rs_mail_browser::terminal::run_tui;

#[derive(Parser)]
#[command(name = "rs_mail_browser")]
#[command(about = "Paginating mail browser (TUI + headless commands)", long_about = None)]
struct Cli {
    /// Override the list/body endpoint from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Browse interactively (default)
    Tui,

    /// Load pages and print the filtered list
    List {
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,

        /// How many pages to pull before printing
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Mark an email as read and print its body as text
    Show { id: String },

    /// Mark an email as read
    Read { id: String },

    /// Toggle the favorite flag of an email
    Favorite { id: String },
}

fn init_logging(to_file: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if to_file {
        // stderr belongs to the terminal UI
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path()?)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn open_store(cfg: &Config) -> Result<EmailStore> {
    let db_path = resolve_db_path(cfg)?;
    let sqlite = SqliteStore::open(&db_path)?;
    Ok(EmailStore::hydrate(Box::new(sqlite), cfg.storage_key()))
}

fn open_source(cfg: &Config) -> Result<HttpSource> {
    Ok(HttpSource::new(
        cfg.base_url(),
        cfg.timeout(),
        cfg.server_error_ends_list(),
    )?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap_or(Command::Tui);

    init_logging(matches!(cmd, Command::Tui))?;

    let mut cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    if let Some(url) = cli.base_url {
        cfg.base_url = Some(url);
    }

    let mut store = open_store(&cfg)?;

    match cmd {
        Command::Tui => {
            let source: Arc<dyn EmailSource> = Arc::new(open_source(&cfg)?);
            run_tui(store, source)
        }

        Command::List { filter, pages } => {
            let source = open_source(&cfg)?;
            let mut pager = Pager::new();

            for page in 1..=pages {
                match pager.load_page(page, filter, &source, &mut store)? {
                    Some(PageOutcome::Merged { .. }) | None => {}
                    Some(PageOutcome::Exhausted) => break,
                    Some(PageOutcome::Failed) | Some(PageOutcome::Ignored) => {
                        if let Some(msg) = pager.error() {
                            eprintln!("{msg}");
                        }
                        break;
                    }
                }
            }

            let visible = store.filtered(filter);
            if visible.is_empty() {
                println!("No emails available for the selected filter!");
            }
            for e in visible {
                let flags = format!(
                    "{}{}",
                    if e.read { ' ' } else { '*' },
                    if e.favorite { 'F' } else { ' ' }
                );
                println!(
                    "{flags} {:>4}  {}  {}  {}",
                    e.id,
                    format_date(e.date),
                    sender_line(&e.sender),
                    one_line(&e.subject, 60)
                );
            }
            Ok(())
        }

        Command::Show { id } => {
            let source = open_source(&cfg)?;
            store.mark_as_read(&id)?;
            let text = fetch_body_text(&source, &id, 80)?;
            if let Some(e) = store.get(&id) {
                println!("Subject: {}", e.subject);
                println!("From:    {}", sender_line(&e.sender));
                println!("Date:    {}", format_date(e.date));
                println!();
            }
            print!("{text}");
            Ok(())
        }

        Command::Read { id } => {
            if !store.mark_as_read(&id)? {
                return Err(anyhow!("no email with id {id} in the local collection"));
            }
            println!("Marked {id} as read");
            Ok(())
        }

        Command::Favorite { id } => match store.toggle_favorite(&id)? {
            Some(true) => {
                println!("Added {id} to favorites");
                Ok(())
            }
            Some(false) => {
                println!("Removed {id} from favorites");
                Ok(())
            }
            None => Err(anyhow!("no email with id {id} in the local collection")),
        },
    }
}
