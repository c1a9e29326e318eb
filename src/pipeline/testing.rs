//! Fakes shared by the unit tests.

use crate::error::StepError;
use crate::process::{CommandOutput, CommandSpec, ProcessHost};
use crate::prompt::Prompter;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records every command and answers with scripted outputs, keyed by the
/// rendered command line. Unscripted commands succeed with empty output.
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<CommandSpec>>,
    outputs: Mutex<HashMap<String, CommandOutput>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, command_line: &str, exit_code: i32, stdout: &str, stderr: &str) {
        self.outputs.lock().unwrap().insert(
            command_line.to_string(),
            CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl ProcessHost for RecordingHost {
    async fn run(&self, spec: &CommandSpec, _working_dir: &Path) -> Result<CommandOutput, StepError> {
        self.calls.lock().unwrap().push(spec.clone());
        Ok(self
            .outputs
            .lock()
            .unwrap()
            .get(&spec.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

/// Answers confirmations from a queue (falling back to the default) and
/// counts how often it was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    selection: Vec<usize>,
    asked: AtomicUsize,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn selecting(selection: &[usize]) -> Self {
        Self {
            selection: selection.to_vec(),
            ..Self::default()
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _question: &str, default: bool) -> Result<bool, dialoguer::Error> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(default))
    }

    fn multi_select(&self, _question: &str, _options: &[String]) -> Result<Vec<usize>, dialoguer::Error> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.selection.clone())
    }
}
