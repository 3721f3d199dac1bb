#![forbid(unsafe_code)]

mod bridge;
mod http;
mod result;
mod stop;

pub use bridge::{
    BoxFuture, Fetch, FetchError, FetchResponse, FetchResult, HostBridge, Sleep, TokioSleep,
};
pub use http::HttpClient;
pub use result::{IterationFault, IterationResult, LogEntry, Metric};
pub use stop::StopSignal;
