//! Core types and query logic for looking up OpenERZ waste pickup dates.

/// Classification and reporting of non-fatal query problems.
pub mod diagnostics;
/// Domain models, request building, and response payloads.
pub mod model;
/// Traits describing the transport, clock, and diagnostics collaborators.
pub mod ports;
/// The stateful pickup query driving the request/response cycle.
pub mod query;

pub use diagnostics::*;
pub use model::*;
pub use ports::*;
pub use query::*;
