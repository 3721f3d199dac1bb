#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use surge_lua::{
    BoxFuture, Engine, Fetch, FetchError, FetchResponse, FetchResult, HostBridge, IterationResult,
    Sleep, VuHandle,
};

/// Timer stub that returns immediately regardless of the requested duration.
pub struct InstantSleep;

impl Sleep for InstantSleep {
    fn sleep(&self, _duration: Duration) -> BoxFuture<()> {
        Box::pin(async {})
    }
}

/// Fetch stub that fails every request with a transport error.
pub struct FailingFetch(pub &'static str);

impl Fetch for FailingFetch {
    fn get(&self, _url: &str) -> BoxFuture<FetchResult> {
        let msg = self.0.to_string();
        Box::pin(async move { Err(FetchError::Transport(msg)) })
    }
}

/// Fetch stub that panics instead of returning, standing in for a host-side
/// abort inside a bridged capability.
pub struct PanickingFetch(pub &'static str);

impl Fetch for PanickingFetch {
    fn get(&self, _url: &str) -> BoxFuture<FetchResult> {
        panic!("{}", self.0);
    }
}

/// Fetch stub that answers every request with a fixed response.
pub struct StaticFetch {
    pub status: u16,
    pub body: &'static str,
}

impl Fetch for StaticFetch {
    fn get(&self, _url: &str) -> BoxFuture<FetchResult> {
        let res = FetchResponse {
            status: self.status,
            body: bytes_from(self.body),
        };
        Box::pin(async move { Ok(res) })
    }
}

fn bytes_from(text: &'static str) -> bytes::Bytes {
    bytes::Bytes::from_static(text.as_bytes())
}

pub fn stub_bridge() -> HostBridge {
    HostBridge::new(
        Arc::new(InstantSleep),
        Arc::new(FailingFetch("connection refused")),
    )
}

pub fn compile_with(script: &str, bridge: HostBridge) -> Engine {
    match Engine::compile("test.lua", script, bridge) {
        Ok(v) => v,
        Err(err) => panic!("compile failed: {err}"),
    }
}

pub fn compile(script: &str) -> Engine {
    compile_with(script, stub_bridge())
}

/// Drains `n` complete iterations from a VU, then stops it and drains the
/// rest of the stream. Results are grouped per iteration, split on the
/// terminal metric each iteration is required to emit.
pub async fn collect_iterations(mut vu: VuHandle, n: usize) -> Vec<Vec<IterationResult>> {
    let mut groups: Vec<Vec<IterationResult>> = Vec::new();
    let mut current: Vec<IterationResult> = Vec::new();

    while let Some(res) = vu.recv().await {
        let is_metric = res.is_metric();
        current.push(res);
        if is_metric {
            groups.push(std::mem::take(&mut current));
            if groups.len() == n {
                // An already-started iteration still runs to completion, so
                // keep draining until the stream closes.
                vu.stop();
            }
        }
    }

    assert!(current.is_empty(), "stream ended mid-iteration");

    if let Err(err) = vu.join().await {
        panic!("vu worker failed: {err}");
    }

    groups.truncate(n);
    groups
}

pub async fn run_iterations(engine: &Engine, n: usize) -> Vec<Vec<IterationResult>> {
    collect_iterations(engine.start_vu(), n).await
}

pub fn log_texts(stream: &[IterationResult]) -> Vec<&str> {
    stream
        .iter()
        .filter_map(|res| res.as_log())
        .map(|entry| entry.text.as_str())
        .collect()
}
