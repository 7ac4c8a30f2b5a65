//! Session store for uploaded datasets.
//!
//! Sessions are kept behind the Repository pattern so the HTTP layer and the
//! tests talk to the same abstraction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, tests)                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Record ingestion and checksums                       │
//! │  - Session lifecycle                                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/mod.rs)                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```

pub mod checksum;
pub mod repositories;
pub mod repository;
pub mod services;


pub use services::{
    close_session, get_session, health_check, list_sessions, replace_dataset, session_dataset,
    upload_dataset,
};

pub use checksum::{calculate_checksum, records_checksum};
pub use repositories::LocalRepository;
pub use repository::{ErrorContext, RepositoryError, RepositoryResult, SessionRepository};
