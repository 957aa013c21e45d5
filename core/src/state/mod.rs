//! # Task state machine
//!
//! `PENDING → IN_PROGRESS → {COMPLETED | FAILED_PARTIALLY | FAILED}`.
//!
//! Only the execution engine moves a node between states; every move is
//! checked by [`StateTransition::validate`].

pub mod transitions;
pub mod types;

pub use transitions::{NodeKind, StateTransition, TransitionError};
pub use types::TaskState;
