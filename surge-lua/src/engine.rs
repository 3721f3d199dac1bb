use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use surge_core::{HostBridge, IterationResult, StopSignal};
use tokio::sync::mpsc;

use crate::Result;
use crate::program::Program;
use crate::vu::{self, VuContext};

/// Entry point: compiles the script once, holds the baseline bridge, and
/// spawns VU workers on demand. Cheap to share behind an `Arc`.
pub struct Engine {
    program: Arc<Program>,
    bridge: HostBridge,
    next_vu_id: AtomicU64,
}

impl Engine {
    pub fn new(program: Arc<Program>, bridge: HostBridge) -> Self {
        Self {
            program,
            bridge,
            next_vu_id: AtomicU64::new(1),
        }
    }

    /// Compiles `source` and builds an engine around it. A malformed script
    /// fails here; no VU can ever be started against it.
    pub fn compile(name: &str, source: &str, bridge: HostBridge) -> Result<Self> {
        let program = Arc::new(Program::compile(name, source)?);
        Ok(Self::new(program, bridge))
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// Spawns one VU worker and returns immediately; the caller drains the
    /// handle's stream to exhaustion to observe completion.
    pub fn start_vu(&self) -> VuHandle {
        let vu_id = self.next_vu_id.fetch_add(1, Ordering::Relaxed);
        let (out, results) = mpsc::channel(vu::RESULT_CHANNEL_CAPACITY);
        let stop = Arc::new(StopSignal::new());

        let ctx = VuContext {
            vu_id,
            program: self.program.clone(),
            bridge: self.bridge.clone(),
            out,
            stop: stop.clone(),
        };
        let task = tokio::spawn(vu::run_vu(ctx));

        VuHandle {
            vu_id,
            results,
            stop,
            task,
        }
    }
}

/// Caller-side handle to one running VU: its ordered result stream, its
/// stop signal, and the worker task itself.
pub struct VuHandle {
    vu_id: u64,
    results: mpsc::Receiver<IterationResult>,
    stop: Arc<StopSignal>,
    task: tokio::task::JoinHandle<Result<()>>,
}

impl VuHandle {
    pub fn id(&self) -> u64 {
        self.vu_id
    }

    /// Next result from this VU's stream, `None` once the worker has
    /// terminated and every buffered result has been drained.
    pub async fn recv(&mut self) -> Option<IterationResult> {
        self.results.recv().await
    }

    /// Requests termination. Observed between iterations; an iteration that
    /// has already started still runs to completion, so keep draining until
    /// the stream closes.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Waits for the worker to exit, releasing the stream first so a
    /// non-drained channel cannot hold the worker up.
    pub async fn join(self) -> Result<()> {
        drop(self.results);
        self.task.await?
    }
}
