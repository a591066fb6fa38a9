//! Command runner that records invocations instead of spawning processes

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use apk_patchkit::process::{CommandResult, CommandRunner, ProcessError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Succeeds for every command and creates the file named after `-o`,
/// so later pipeline steps see the outputs of earlier ones.
#[derive(Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandResult, ProcessError> {
        if let Some(output) = args
            .iter()
            .position(|arg| arg == "-o")
            .and_then(|i| args.get(i + 1))
        {
            std::fs::write(Path::new(output), b"").unwrap();
        }

        self.invocations.lock().unwrap().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        });
        Ok(CommandResult::ok(""))
    }
}
