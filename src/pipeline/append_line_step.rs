use crate::error::StepError;
use crate::pipeline::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Appends a literal line to a text file unless an identical line is present.
pub struct AppendLineStep {
    name: String,
    description: String,
    file: String,
    line: String,
}

impl AppendLineStep {
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: impl Into<String>) -> Self {
        let file = file.into();
        let line = line.into();
        Self {
            name: name.into(),
            description: format!("append `{}` to {}", line, file),
            file,
            line,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn read_optional(path: &Path) -> Result<String, StepError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(StepError::file(path, e)),
    }
}

fn has_line(content: &str, line: &str) -> bool {
    let line = line.trim_end();
    content.lines().any(|existing| existing.trim_end() == line)
}

#[async_trait]
impl Step for AppendLineStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_done(&self, ctx: &StepContext<'_>) -> bool {
        read_optional(&ctx.resolve(&self.file))
            .map(|content| has_line(&content, &self.line))
            .unwrap_or(false)
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
        let path = ctx.resolve(&self.file);
        let mut content = read_optional(&path)?;

        if has_line(&content, &self.line) {
            debug!("{} already contains `{}`", path.display(), self.line);
            return Ok(StepOutcome::Skipped);
        }

        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(self.line.trim_end());
        content.push('\n');

        std::fs::write(&path, content).map_err(|e| StepError::file(&path, e))?;
        info!("Appended `{}` to {}", self.line, path.display());
        Ok(StepOutcome::Succeeded)
    }
}
