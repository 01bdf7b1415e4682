// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod feed;
pub mod format;
pub mod metrics;
pub mod model;
pub mod search;
pub mod services;
pub mod session;
pub mod view;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::ApiConfig;
pub use crate::feed::{FeedController, FeedFilter, FeedPhase, FeedSource, PageOutcome};
pub use crate::session::SessionContext;
