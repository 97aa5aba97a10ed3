//! Progress reporting utilities

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a comparison run
#[derive(Debug)]
pub struct ProgressReporter {
    multi: Option<MultiProgress>,
    pub old_pb: Option<ProgressBar>,
    pub new_pb: Option<ProgressBar>,
    pub reconcile_pb: Option<ProgressBar>,
    pub render_pb: Option<ProgressBar>,
    show_progress: bool,
    start_time: std::time::Instant,
}

impl ProgressReporter {
    /// Create progress reporter for a comparison. Both inputs load at the
    /// same time, so each gets its own spinner.
    pub fn new_for_compare(old_label: &str, new_label: &str) -> Self {
        let multi = MultiProgress::new();
        let old_pb = multi.add(create_spinner(&format!("Loading {}...", old_label)));
        let new_pb = multi.add(create_spinner(&format!("Loading {}...", new_label)));

        Self {
            multi: Some(multi),
            old_pb: Some(old_pb),
            new_pb: Some(new_pb),
            reconcile_pb: None,
            render_pb: None,
            show_progress: true,
            start_time: std::time::Instant::now(),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            multi: None,
            old_pb: None,
            new_pb: None,
            reconcile_pb: None,
            render_pb: None,
            show_progress: false,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.show_progress
    }

    /// Finish the loading spinner of one side
    pub fn finish_load(&self, old_side: bool, message: &str) {
        let pb = if old_side { &self.old_pb } else { &self.new_pb };
        if let Some(pb) = pb {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Start the reconciliation spinner
    pub fn start_reconcile(&mut self) {
        if self.show_progress && self.reconcile_pb.is_none() {
            self.reconcile_pb = Some(self.add(create_spinner("Reconciling keys...")));
        }
    }

    pub fn finish_reconcile(&mut self, message: &str) {
        if let Some(pb) = self.reconcile_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Start the report writing spinner
    pub fn start_render(&mut self, message: &str) {
        if self.show_progress && self.render_pb.is_none() {
            self.render_pb = Some(self.add(create_spinner(message)));
        }
    }

    pub fn finish_render(&mut self, message: &str) {
        if let Some(pb) = self.render_pb.take() {
            let elapsed = self.start_time.elapsed();
            pb.finish_with_message(format!("{} ({:.1}s)", message, elapsed.as_secs_f64()));
        }
    }

    fn add(&self, pb: ProgressBar) -> ProgressBar {
        match &self.multi {
            Some(multi) => multi.add(pb),
            None => pb,
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Ensure all progress bars are cleaned up silently
        for pb in [
            self.old_pb.take(),
            self.new_pb.take(),
            self.reconcile_pb.take(),
            self.render_pb.take(),
        ]
        .into_iter()
        .flatten()
        {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
