//! Terminal progress reporting
//!
//! One spinner per long-running phase (download, unpack, sandbox install);
//! callers finish it before the next phase starts. Hidden automatically
//! when stderr is not a terminal.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub fn phase_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
