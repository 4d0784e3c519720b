use indicatif::{ProgressBar, ProgressStyle};

const PROGRESS_THRESHOLD: u64 = 10;

/// Progress bar for resolving many files. Hidden for short runs.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(total: u64, enabled: bool) -> Self {
        if !enabled || total < PROGRESS_THRESHOLD {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar: Some(bar) }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    pub fn set_message(&self, msg: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(msg.to_string());
        }
    }

    /// Print a line without tearing the bar.
    pub fn println(&self, line: &str) {
        match self.bar {
            Some(ref bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
