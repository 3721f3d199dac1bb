use std::sync::Arc;

use mlua::Lua;

use crate::{Error, Result};

/// Compiled form of a named script.
///
/// The whole script body is one iteration; every VU runs it repeatedly.
/// Validated once at compile time, then shared read-only by all VUs for the
/// engine's lifetime. Safe mlua cannot move a compiled chunk between Lua
/// states, so each derived environment instantiates the already-validated
/// source into its own state without re-checking it.
#[derive(Debug, Clone)]
pub struct Program {
    name: Arc<str>,
    chunk_name: Arc<str>,
    source: Arc<str>,
}

impl Program {
    /// Checks the script against a scratch Lua state. A malformed script
    /// fails here, synchronously, before any VU exists.
    pub fn compile(name: &str, source: &str) -> Result<Self> {
        let chunk_name = format!("@{name}");

        let scratch = Lua::new();
        scratch
            .load(source)
            .set_name(&chunk_name)
            .into_function()
            .map_err(|err| Error::Compile {
                name: name.to_string(),
                source: err,
            })?;

        Ok(Self {
            name: Arc::from(name),
            chunk_name: Arc::from(chunk_name.as_str()),
            source: Arc::from(source),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Diagnostic chunk name (`@<name>`) used in Lua tracebacks.
    pub(crate) fn chunk_name(&self) -> &str {
        &self.chunk_name
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_accepts_well_formed_scripts() {
        let program = match Program::compile("test.lua", "local x = 1 + 1") {
            Ok(v) => v,
            Err(err) => panic!("compile should succeed: {err}"),
        };
        assert_eq!(program.name(), "test.lua");
        assert_eq!(program.chunk_name(), "@test.lua");
    }

    #[test]
    fn compile_rejects_syntax_errors() {
        let err = match Program::compile("bad.lua", "local = 3") {
            Ok(_) => panic!("expected compile failure"),
            Err(err) => err,
        };
        let msg = err.to_string();
        assert!(msg.contains("`bad.lua` failed to compile"), "{msg}");
    }

    #[test]
    fn compile_does_not_execute_the_script() {
        // Compilation must only parse; a script that faults at runtime still
        // compiles fine.
        if let Err(err) = Program::compile("boom.lua", r#"error("boom")"#) {
            panic!("compile should not run the script: {err}");
        }
    }
}
