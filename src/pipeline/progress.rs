use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinners for the network stages of a run
#[derive(Debug, Clone, Copy)]
pub struct StageReporter {
    visible: bool,
}

impl StageReporter {
    pub fn spinners() -> Self {
        Self { visible: true }
    }

    pub fn hidden() -> Self {
        Self { visible: false }
    }

    pub fn stage(&self, message: &'static str) -> Stage {
        if !self.visible {
            return Stage {
                progress: ProgressBar::hidden(),
            };
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(100));

        Stage { progress }
    }
}

/// One running stage; finishing it leaves the final message on screen
pub struct Stage {
    progress: ProgressBar,
}

impl Stage {
    pub fn finish(self, message: &'static str) {
        self.progress.finish_with_message(message);
    }
}
