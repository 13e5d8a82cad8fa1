//! Selector forge engine: backend clients and effect execution.
mod analysis;
mod engine;
mod execution;
mod http;
mod persist;
mod types;
mod wire;

pub use analysis::{AnalysisClient, ChannelProgressSink, ProgressSink, ReqwestAnalysisClient};
pub use engine::EngineHandle;
pub use execution::{ExecutionClient, ReqwestExecutionClient, RunOutput};
pub use http::ClientSettings;
pub use persist::{ensure_output_dir, DownloadWriter, PersistError};
pub use types::{EngineEvent, FailureKind, ServiceError};
pub use wire::{decode_analyze_body, progress_status, FrameSplitter};
