//! Progress bar display for installations

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for installations
pub struct ProgressDisplay {
    /// Main progress bar for pod installation
    pod_pb: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with total pod count
    pub fn new(total_pods: u64) -> Self {
        let pod_style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-");

        let pod_pb = ProgressBar::new(total_pods);
        pod_pb.set_style(pod_style);

        Self { pod_pb }
    }

    /// Update to show current pod being installed
    pub fn update_pod(&self, pod_name: &str, current: usize, total: usize) {
        let msg = format!("({}/{}) {}", current, total, pod_name);
        self.pod_pb.set_message(msg);
    }

    /// Increment pod progress
    pub fn inc_pod(&self) {
        self.pod_pb.inc(1);
    }

    /// Finish pod progress
    pub fn finish(&self) {
        self.pod_pb.finish();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.pod_pb.abandon();
    }
}
