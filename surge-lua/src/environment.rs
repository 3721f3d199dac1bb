use std::time::{Duration, SystemTime};

use mlua::Lua;
use surge_core::{HostBridge, IterationResult, LogEntry};
use tokio::sync::mpsc;

use crate::Result;
use crate::program::Program;

/// One VU's isolated execution context: a private Lua state seeded with the
/// baseline bridge capabilities plus the instantiated program chunk.
///
/// Script globals live in this state only; mutations made by one VU are
/// never visible to another. `log` is not registered here — it closes over
/// a per-iteration channel and is rebound before every run.
pub struct Environment {
    lua: Lua,
    exec: mlua::Function,
}

impl Environment {
    pub fn derive(bridge: &HostBridge, program: &Program) -> Result<Self> {
        let lua = Lua::new();
        register_bridge(&lua, bridge)?;

        let exec = lua
            .load(program.source())
            .set_name(program.chunk_name())
            .into_function()?;

        Ok(Self { lua, exec })
    }

    /// Rebinds the `log` global to route into `out`. Called by the iteration
    /// runner at the start of every iteration so log entries land on the
    /// current iteration's stream, never a stale one.
    pub fn bind_log(&self, out: mpsc::Sender<IterationResult>) -> Result<()> {
        let log = self.lua.create_async_function(move |_lua, text: String| {
            let out = out.clone();
            async move {
                let entry = LogEntry {
                    time: SystemTime::now(),
                    text,
                };
                // A dropped consumer is not the script's problem.
                let _ = out.send(IterationResult::Log(entry)).await;
                Ok(())
            }
        })?;
        self.lua.globals().set("log", log)?;
        Ok(())
    }

    pub(crate) async fn call(&self) -> mlua::Result<()> {
        self.exec.call_async::<()>(()).await
    }
}

fn register_bridge(lua: &Lua, bridge: &HostBridge) -> Result<()> {
    // sleep(ms): suspends only the calling VU's iteration.
    let sleep = {
        let sleeper = bridge.sleep.clone();
        lua.create_async_function(move |_lua, ms: f64| {
            let sleeper = sleeper.clone();
            async move {
                let ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
                sleeper.sleep(Duration::from_secs_f64(ms / 1000.0)).await;
                Ok(())
            }
        })?
    };
    lua.globals().set("sleep", sleep)?;

    // get(url) -> { status = 200, body = "..." }. Transport failures raise a
    // script-visible fault for the iteration runner to trap.
    let get = {
        let fetch = bridge.fetch.clone();
        lua.create_async_function(move |lua, url: String| {
            let fetch = fetch.clone();
            async move {
                let res = fetch.get(&url).await.map_err(mlua::Error::external)?;

                let t = lua.create_table()?;
                t.set("status", res.status)?;
                t.set("body", res.body_utf8().unwrap_or(""))?;
                Ok(t)
            }
        })?
    };
    lua.globals().set("get", get)?;

    Ok(())
}
