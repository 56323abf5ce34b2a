//! Identity types shared across the bridge and its host.

mod invocation_id;

pub use invocation_id::InvocationId;
