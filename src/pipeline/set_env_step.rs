use crate::error::StepError;
use crate::pipeline::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use std::io::ErrorKind;
use tracing::info;

/// Sets `KEY=value` in a dotenv file, replacing an existing assignment.
pub struct SetEnvStep {
    name: String,
    description: String,
    file: String,
    key: String,
    value: String,
}

impl SetEnvStep {
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let file = file.into();
        let key = key.into();
        let value = value.into();
        Self {
            name: name.into(),
            description: format!("set {}={} in {}", key, value, file),
            file,
            key,
            value,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn assignment(&self) -> String {
        format!("{}={}", self.key, self.value)
    }

    fn assigns_key(&self, line: &str) -> bool {
        line.trim_start()
            .strip_prefix(&self.key)
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    }

    fn apply(&self, content: &str) -> String {
        let assignment = self.assignment();
        let mut replaced = false;
        let mut lines: Vec<String> = content
            .lines()
            .map(|line| {
                if !replaced && self.assigns_key(line) {
                    replaced = true;
                    assignment.clone()
                } else {
                    line.to_string()
                }
            })
            .collect();
        if !replaced {
            lines.push(assignment);
        }
        let mut updated = lines.join("\n");
        updated.push('\n');
        updated
    }
}

#[async_trait]
impl Step for SetEnvStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_done(&self, ctx: &StepContext<'_>) -> bool {
        let assignment = self.assignment();
        std::fs::read_to_string(ctx.resolve(&self.file))
            .map(|content| content.lines().any(|line| line.trim() == assignment))
            .unwrap_or(false)
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
        let path = ctx.resolve(&self.file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(StepError::file(&path, e)),
        };

        std::fs::write(&path, self.apply(&content)).map_err(|e| StepError::file(&path, e))?;
        info!("Set {} in {}", self.assignment(), path.display());
        Ok(StepOutcome::Succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{RecordingHost, ScriptedPrompter};
    use crate::settings::Settings;
    use tempfile::TempDir;

    #[test]
    fn test_replaces_existing_assignment() {
        let step = SetEnvStep::new("locale", ".env", "APP_LOCALE", "hu");
        let updated = step.apply("APP_NAME=Laravel\nAPP_LOCALE=en\nAPP_LOCALE_FALLBACK=en\n");
        assert_eq!(updated, "APP_NAME=Laravel\nAPP_LOCALE=hu\nAPP_LOCALE_FALLBACK=en\n");
    }

    #[test]
    fn test_appends_missing_assignment() {
        let step = SetEnvStep::new("locale", ".env", "APP_LOCALE", "hu");
        assert_eq!(step.apply("APP_NAME=Laravel"), "APP_NAME=Laravel\nAPP_LOCALE=hu\n");
    }

    #[tokio::test]
    async fn test_is_done_after_execute() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".env"), "APP_LOCALE=en\n").unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);

        let step = SetEnvStep::new("locale", ".env", "APP_LOCALE", "hu");
        assert!(!step.is_done(&ctx));
        step.execute(&ctx).await.unwrap();
        assert!(step.is_done(&ctx));
        assert_eq!(std::fs::read_to_string(dir.path().join(".env")).unwrap(), "APP_LOCALE=hu\n");
    }
}
