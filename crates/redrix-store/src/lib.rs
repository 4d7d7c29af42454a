//! Durable conversation storage with automatic failover.
//!
//! The coordinator owns a remote document store connection and a local JSON
//! fallback.  Remote first when authenticated; any remote failure degrades to
//! the local path within the same call, without surfacing an error.

mod coordinator;
mod error;
mod local;
mod remote;

pub use coordinator::{Backend, ProbeReport, StoreCoordinator};
pub use error::StoreError;
pub use local::LocalStore;
pub use remote::RemoteStore;
