use crate::watch_set::{WatchSet, WatchedProcess};

/// Stdout progress reporting with an explicit quiet switch.
///
/// Quiet suppresses progress lines only; it never touches notification
/// delivery or tracing output.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Startup listing of everything that resolved.
    pub fn watching(&self, watch_set: &WatchSet) {
        if self.quiet {
            return;
        }
        println!("Watching {} processes:", watch_set.len());
        for handle in watch_set.handles() {
            println!("{}", handle.info());
        }
    }

    pub fn nothing_to_watch(&self) {
        if self.quiet {
            return;
        }
        println!("No processes found to watch.");
    }

    pub fn stopped(&self, handle: &WatchedProcess) {
        if self.quiet {
            return;
        }
        println!("Process stopped:");
        println!("{}", handle.info());
    }

    pub fn discovered(&self, handle: &WatchedProcess) {
        if self.quiet {
            return;
        }
        println!("{}", handle.info());
    }

    pub fn interrupted(&self) {
        if self.quiet {
            return;
        }
        println!();
    }
}
