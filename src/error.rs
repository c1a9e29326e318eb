use std::path::PathBuf;
use thiserror::Error;

/// Why a single step failed. Failures stay local to their step; the runner
/// records them and moves on to the next one.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{}", describe_failure(.command, .exit_code, .output))]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("timeout: `{command}` did not finish within {seconds}s")]
    CommandTimedOut { command: String, seconds: u64 },

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("anchor `{anchor}` not found in {}", .path.display())]
    AnchorNotFound { path: PathBuf, anchor: String },

    #[error("anchor `{anchor}` appears {count} times in {}, expected exactly one", .path.display())]
    AmbiguousAnchor {
        path: PathBuf,
        anchor: String,
        count: usize,
    },

    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StepError {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StepError::File {
            path: path.into(),
            source,
        }
    }
}

fn describe_failure(command: &str, exit_code: &i32, output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        format!("exit {} from `{}`", exit_code, command)
    } else {
        format!("exit {} from `{}`: {}", exit_code, command, output)
    }
}
