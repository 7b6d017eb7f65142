//! Leadbot: scripted lead-capture chat with an estimate and sales hand-off.

pub mod backend;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod error;
pub mod estimate;
pub mod notify;
pub mod server;
pub mod service;
pub mod store;
pub mod uploads;
