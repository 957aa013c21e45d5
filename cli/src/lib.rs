//! taskline-cli library, exposed so commands can be unit tested.

pub mod actions;
pub mod commands;
pub mod plan;
