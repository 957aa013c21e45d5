//! Core of taskline: task tree model, execution engine, state machine and config.

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod state;
