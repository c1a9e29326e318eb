use crate::error::StepError;
use crate::pipeline::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPosition {
    Before,
    #[default]
    After,
}

/// Inserts text next to an anchor that must occur exactly once in the file.
/// Used to register panel plugins in a provider class.
pub struct AnchorInsertStep {
    name: String,
    description: String,
    file: String,
    anchor: String,
    text: String,
    position: AnchorPosition,
}

impl AnchorInsertStep {
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        anchor: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let file = file.into();
        Self {
            name: name.into(),
            description: format!("patch {}", file),
            file,
            anchor: anchor.into(),
            text: text.into(),
            position: AnchorPosition::default(),
        }
    }

    pub fn position(mut self, position: AnchorPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn patch(&self, content: &str, path: &std::path::Path) -> Result<String, StepError> {
        let matches: Vec<usize> = content.match_indices(&self.anchor).map(|(i, _)| i).collect();
        let start = match matches.as_slice() {
            [start] => *start,
            [] => {
                return Err(StepError::AnchorNotFound {
                    path: path.to_path_buf(),
                    anchor: self.anchor.clone(),
                })
            }
            _ => {
                return Err(StepError::AmbiguousAnchor {
                    path: path.to_path_buf(),
                    anchor: self.anchor.clone(),
                    count: matches.len(),
                })
            }
        };

        let at = match self.position {
            AnchorPosition::Before => start,
            AnchorPosition::After => start + self.anchor.len(),
        };

        let mut patched = String::with_capacity(content.len() + self.text.len());
        patched.push_str(&content[..at]);
        patched.push_str(&self.text);
        patched.push_str(&content[at..]);
        Ok(patched)
    }
}

#[async_trait]
impl Step for AnchorInsertStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_done(&self, ctx: &StepContext<'_>) -> bool {
        std::fs::read_to_string(ctx.resolve(&self.file))
            .map(|content| content.contains(&self.text))
            .unwrap_or(false)
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
        let path = ctx.resolve(&self.file);
        let content = std::fs::read_to_string(&path).map_err(|e| StepError::file(&path, e))?;

        if content.contains(&self.text) {
            debug!("{} already patched", path.display());
            return Ok(StepOutcome::Skipped);
        }

        let patched = self.patch(&content, &path)?;
        std::fs::write(&path, patched).map_err(|e| StepError::file(&path, e))?;
        info!("Patched {}", path.display());
        Ok(StepOutcome::Succeeded)
    }
}
