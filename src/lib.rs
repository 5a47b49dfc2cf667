//! Vulnerability lifecycle tracking: a centralized, pure implementation of
//! the status state machine (`unfixed → fixing → fixed → retesting →
//! completed` with rejection/ignore side branches), role/ownership guard
//! predicates, and a REST client for the backend that owns the records.
//!
//! The [`lifecycle`] module is the engine; [`service`] re-validates every
//! transition against the backend's live state before committing it.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod service;
pub mod ui;
