use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};
use tracing::debug;

/// Source of yes/no answers and multi-select choices.
pub trait Prompter: Send + Sync {
    fn confirm(&self, question: &str, default: bool) -> Result<bool, dialoguer::Error>;

    /// Returns the indices of the chosen options, in display order
    fn multi_select(&self, question: &str, options: &[String]) -> Result<Vec<usize>, dialoguer::Error>;
}

/// Interactive prompts on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str, default: bool) -> Result<bool, dialoguer::Error> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(default)
            .interact()
    }

    fn multi_select(&self, question: &str, options: &[String]) -> Result<Vec<usize>, dialoguer::Error> {
        MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .items(options)
            .interact()
    }
}

/// Non-interactive mode: every confirmation takes its default answer and
/// multi-selects pick the options named up front.
#[derive(Debug, Default)]
pub struct DefaultsPrompter {
    preselected: Vec<String>,
}

impl DefaultsPrompter {
    pub fn new(preselected: Vec<String>) -> Self {
        Self { preselected }
    }
}

impl Prompter for DefaultsPrompter {
    fn confirm(&self, question: &str, default: bool) -> Result<bool, dialoguer::Error> {
        println!("{} [{}]", question, if default { "yes" } else { "no" });
        Ok(default)
    }

    fn multi_select(&self, question: &str, options: &[String]) -> Result<Vec<usize>, dialoguer::Error> {
        let chosen: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, option)| {
                self.preselected
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(option))
            })
            .map(|(i, _)| i)
            .collect();
        debug!("{}: preselected {:?}", question, chosen);
        Ok(chosen)
    }
}
