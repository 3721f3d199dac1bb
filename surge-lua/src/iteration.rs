use std::panic::AssertUnwindSafe;
use std::time::{Instant, SystemTime};

use futures_util::FutureExt as _;
use surge_core::{IterationFault, IterationResult, Metric};
use tokio::sync::mpsc;

use crate::environment::Environment;

/// Runs one iteration of the program against `env`, streaming results into
/// `out`. The terminal `Metric` is the completion signal: the `log` binding
/// left in the Lua state holds a sender clone until the next rebind, so the
/// channel itself does not close when this returns.
///
/// This is the fault boundary: script errors and host panics raised during
/// execution are converted into an `Error` result here and never cross the
/// iteration. Exactly one terminal `Metric` is emitted regardless of
/// outcome.
pub(crate) async fn run(env: &Environment, out: mpsc::Sender<IterationResult>) {
    let started = Instant::now();

    let fault = match env.bind_log(out.clone()) {
        Err(err) => Some(IterationFault::Script(err.to_string())),
        Ok(()) => match AssertUnwindSafe(env.call()).catch_unwind().await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(IterationFault::Script(err.to_string())),
            Err(payload) => Some(IterationFault::Panic(panic_text(payload))),
        },
    };

    let duration = started.elapsed();

    if let Some(fault) = fault {
        let _ = out.send(IterationResult::Error(fault)).await;
    }

    let _ = out
        .send(IterationResult::Metric(Metric {
            time: SystemTime::now(),
            duration,
        }))
        .await;
}

fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
