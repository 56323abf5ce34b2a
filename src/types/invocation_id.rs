//! Invocation identifier in TypeID format.
//!
//! Tags one bridge call in the logs so the "executing" and "finished" events
//! of concurrent calls can be told apart.
//! Format: `inv_01h455vb4pex5vsknk084sn02q`

use mti::prelude::*;
use std::fmt;

/// A time-sortable, globally unique identifier for one bridge invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvocationId(MagicTypeId);

impl InvocationId {
    /// The TypeID prefix for invocation identifiers.
    pub const PREFIX: &'static str = "inv";

    /// Creates a new invocation ID with a fresh UUIDv7.
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
