pub mod branch_create;
pub mod branch_sync;
pub mod config;
pub mod pr_create;

use indicatif::{ProgressBar, ProgressStyle};
use std::ops::Deref;
use std::time::Duration;

/// Spinner for a sequence of git steps. Cleared when dropped, so an early
/// `?` does not leave a stale step message above the error.
pub(crate) struct Spinner(ProgressBar);

impl Deref for Spinner {
    type Target = ProgressBar;

    fn deref(&self) -> &ProgressBar {
        &self.0
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.0.is_finished() {
            self.0.finish_and_clear();
        }
    }
}

pub(crate) fn spinner() -> Spinner {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    pb.enable_steady_tick(Duration::from_millis(80));
    Spinner(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_step(pb: &Spinner) -> crate::Result<()> {
        pb.set_message("Pulling most recent changes...");
        Err(crate::Error::NotAGitRepository)
    }

    #[test]
    fn test_spinner_cleared_when_step_fails() {
        let pb = spinner();
        let bar = ProgressBar::clone(&pb);
        assert!(failing_step(&pb).is_err());
        drop(pb);
        assert!(bar.is_finished());
    }

    #[test]
    fn test_spinner_explicit_finish_is_kept() {
        let pb = spinner();
        let bar = ProgressBar::clone(&pb);
        pb.finish_with_message("done");
        drop(pb);
        assert!(bar.is_finished());
        assert_eq!(bar.message(), "done");
    }
}
