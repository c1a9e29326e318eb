use crate::error::StepError;
use crate::pipeline::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use tracing::{debug, info};

/// Writes a file that does not exist yet. An existing file is never touched.
pub struct WriteFileStep {
    name: String,
    description: String,
    path: String,
    contents: String,
    mode: Option<u32>,
}

impl WriteFileStep {
    pub fn new(name: impl Into<String>, path: impl Into<String>, contents: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            description: format!("create {}", path),
            path,
            contents: contents.into(),
            mode: None,
        }
    }

    /// Unix permission bits applied after writing
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[cfg(unix)]
fn set_mode(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &std::path::Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl Step for WriteFileStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_done(&self, ctx: &StepContext<'_>) -> bool {
        ctx.resolve(&self.path).exists()
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
        let path = ctx.resolve(&self.path);
        if path.exists() {
            info!("{} already exists", path.display());
            return Ok(StepOutcome::Skipped);
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| StepError::file(parent, e))?;
                debug!("Created directory: {}", parent.display());
            }
        }

        std::fs::write(&path, &self.contents).map_err(|e| StepError::file(&path, e))?;
        if let Some(mode) = self.mode {
            set_mode(&path, mode).map_err(|e| StepError::file(&path, e))?;
        }

        info!("Created {}", path.display());
        Ok(StepOutcome::Succeeded)
    }
}
