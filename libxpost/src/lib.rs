//! xpost - cross-post markdown articles to blogging platforms
//!
//! This library fans one article out to Dev.to and Hashnode concurrently,
//! retries transient failures and aggregates the per-platform outcomes into
//! a single [`DispatchReport`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod logging;
pub mod markdown;
pub mod platforms;
pub mod registry;
pub mod retry;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{Dispatcher, Operation};
pub use error::{ErrorCode, PlatformError, Result, XpostError};
pub use registry::PlatformRegistry;
pub use types::{DispatchReport, PlatformPost, PlatformResult, Post, PublishStatus};
