//! Shared value types for the openEHR RM crates.
//!
//! - [`Optional`]: the field wrapper used for every non-mandatory RM attribute. It lives in its
//!   own crate so that the record model, the storage layer and any transport agree on one
//!   representation of "absent".
//! - [`WirePath`]: the location of a value inside a wire document, shared by decode errors and
//!   validation errors so both report paths the same way.

mod optional;
mod path;

pub use optional::Optional;
pub use path::{PathSegment, WirePath};

/// Errors raised when an absent [`Optional`] is required by the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValueError {
    /// A field that the caller needs was absent.
    #[error("required value '{0}' is absent")]
    Absent(&'static str),
}
