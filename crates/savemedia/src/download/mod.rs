//! Download engine integration: probing, fetching, gating and delivery.

pub mod fetch;
pub mod files;
pub mod metadata;
pub mod request;
pub mod task;

pub use fetch::{fetch, FetchedArtifact};
pub use files::FileKind;
pub use metadata::{probe, MediaInfo};
pub use request::{DownloadMode, FetchRequest};
pub use task::{prepare_artifact, run_download, spawn_download};
