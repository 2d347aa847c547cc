mod client;
mod condition;
mod config;
mod error;
mod model;
mod poller;

pub use client::SiaClient;
pub use condition::{FileCondition, FilePredicate};
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_USER_AGENT, Endpoints, SiaConfig,
};
pub use error::{ErrorKind, SiaError};
pub use model::{DownloadListing, DownloadRecord, FileListing, FileRecord, decode};
pub use poller::WaitOptions;
pub use tokio_util::sync::CancellationToken;
