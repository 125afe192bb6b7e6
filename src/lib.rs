pub mod config;
pub mod detail;
pub mod domain;
pub mod format;
pub mod mail;
pub mod mailbox;
pub mod pager;
pub mod store;
pub mod terminal;
