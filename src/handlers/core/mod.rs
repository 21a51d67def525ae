//! Core handler infrastructure.
//!
//! This module contains the fundamental types of the dispatch pipeline: the
//! handler registry, the dispatch event and its outcome, and the context
//! handed to every handler.

pub mod context;
pub mod event;
pub mod registry;

pub use context::{Context, HandlerError, HandlerResult, Services};
pub use event::{DispatchEvent, Outcome, Priority};
pub use registry::{Handler, Registry};
