//! Presentation layers for the lead dialog.

pub mod cli;

pub use cli::CliWidget;
