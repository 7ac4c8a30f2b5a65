//! Repository implementations module.
//!
//! - `local`: In-memory session store, one dataset per session
pub mod local;

pub use local::LocalRepository;
