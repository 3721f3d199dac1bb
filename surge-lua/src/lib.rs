pub use surge_core::{
    BoxFuture, Fetch, FetchError, FetchResponse, FetchResult, HostBridge, HttpClient,
    IterationFault, IterationResult, LogEntry, Metric, Sleep, StopSignal, TokioSleep,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("script `{name}` failed to compile: {source}")]
    Compile { name: String, source: mlua::Error },

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

mod engine;
mod environment;
mod iteration;
mod program;
mod vu;

pub use engine::{Engine, VuHandle};
pub use environment::Environment;
pub use program::Program;
pub use vu::{VuContext, run_vu};
