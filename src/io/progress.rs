//! Generation progress display for the command-line runner

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static GENERATION_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{prefix} {spinner} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Progress bar over the generations of one run
///
/// Hidden when the runner is quiet, so callers never need to branch.
#[derive(Debug)]
pub struct GenerationProgress {
    bar: ProgressBar,
}

impl GenerationProgress {
    /// Bar counting up to `nb_iter` generations, labelled with the strategy
    pub fn new(strategy: &str, nb_iter: u32, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(u64::from(nb_iter))
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(GENERATION_STYLE.clone());
        bar.set_prefix(strategy.to_string());
        Self { bar }
    }

    /// Spinner for runs whose generations are not observable (device offload)
    pub fn spinner(strategy: &str, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(SPINNER_STYLE.clone());
        bar.set_prefix(strategy.to_string());
        bar.set_message("running on device");
        Self { bar }
    }

    /// Record a completed generation
    pub fn update(&self, generation: u32, changed: bool) {
        self.bar.set_position(u64::from(generation));
        if !changed {
            self.bar.set_message("stable");
        }
    }

    /// Generations recorded so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Close the display with a final message
    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }
}
