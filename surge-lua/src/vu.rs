use std::sync::Arc;

use surge_core::{HostBridge, IterationFault, IterationResult, StopSignal};
use tokio::sync::mpsc;

use crate::Result;
use crate::environment::Environment;
use crate::iteration;
use crate::program::Program;

/// Capacity of the iteration and VU result channels. One slot keeps the
/// handoff synchronous: a producer waits until the consumer has taken the
/// previous message.
pub(crate) const RESULT_CHANNEL_CAPACITY: usize = 1;

pub struct VuContext {
    pub vu_id: u64,
    pub program: Arc<Program>,
    pub bridge: HostBridge,
    pub out: mpsc::Sender<IterationResult>,
    pub stop: Arc<StopSignal>,
}

/// Drives one VU: derives its environment once, then runs iterations
/// sequentially until stopped or until the consumer drops the stream,
/// relaying every iteration's results onto the outbound channel in order.
pub async fn run_vu(ctx: VuContext) -> Result<()> {
    let env = match Environment::derive(&ctx.bridge, &ctx.program) {
        Ok(env) => env,
        Err(err) => {
            let fault = IterationFault::Script(err.to_string());
            let _ = ctx.out.send(IterationResult::Error(fault)).await;
            return Err(err);
        }
    };

    // The stop request is inspected between iterations only; a running
    // iteration always completes or faults first.
    while !ctx.stop.is_stopped() && !ctx.out.is_closed() {
        let (tx, rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);

        let run = iteration::run(&env, tx);

        let out = ctx.out.clone();
        let relay = async move {
            let mut rx = rx;
            while let Some(res) = rx.recv().await {
                let done = res.is_metric();
                if out.send(res).await.is_err() {
                    // Consumer went away; dropping rx unblocks the iteration,
                    // which then finishes with its sends failing silently.
                    break;
                }
                // The Lua state keeps the previous `log` binding (and its
                // sender) alive until the next rebind, so channel closure
                // cannot end this loop. The terminal metric can: the runner
                // emits it exactly once, as the last message.
                if done {
                    break;
                }
            }
        };

        tokio::join!(run, relay);
    }

    Ok(())
}
