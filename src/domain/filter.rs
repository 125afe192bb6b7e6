use clap::ValueEnum;

use crate::domain::email::EmailSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Filter {
    #[default]
    All,
    Unread,
    Read,
    Favorites,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::All, Filter::Unread, Filter::Read, Filter::Favorites];

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Unread => "Unread",
            Filter::Read => "Read",
            Filter::Favorites => "Favorites",
        }
    }

    pub fn matches(self, email: &EmailSummary) -> bool {
        match self {
            Filter::All => true,
            Filter::Unread => !email.read,
            Filter::Read => email.read,
            Filter::Favorites => email.favorite,
        }
    }

    /// Only these filters pull new pages; the others work on what is already loaded.
    pub fn paginates(self) -> bool {
        matches!(self, Filter::All | Filter::Unread)
    }

    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Unread,
            Filter::Unread => Filter::Read,
            Filter::Read => Filter::Favorites,
            Filter::Favorites => Filter::All,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Filter::All => Filter::Favorites,
            Filter::Unread => Filter::All,
            Filter::Read => Filter::Unread,
            Filter::Favorites => Filter::Read,
        }
    }
}
