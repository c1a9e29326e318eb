use crate::pipeline::{BatchOutcome, StepOutcome, StepResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_results(results: &[StepResult]) -> Self {
        results.iter().fold(Summary::default(), |mut summary, result| {
            match result.outcome {
                StepOutcome::Succeeded => summary.succeeded += 1,
                StepOutcome::Skipped => summary.skipped += 1,
                StepOutcome::Failed { .. } => summary.failed += 1,
            }
            summary
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Print the end-of-run summary. Cancelled batches yield `None`.
pub fn print_summary(outcome: &BatchOutcome) -> Option<Summary> {
    let results = match outcome {
        BatchOutcome::Cancelled => return None,
        BatchOutcome::Completed(results) => results,
    };

    let summary = Summary::from_results(results);
    println!();
    println!(
        "{} succeeded, {} skipped, {} failed",
        summary.succeeded, summary.skipped, summary.failed
    );
    for result in results {
        if let StepOutcome::Failed { reason } = &result.outcome {
            println!("  ✘ {}: {}", result.name, reason);
        }
    }
    Some(summary)
}
