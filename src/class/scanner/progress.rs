use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use rayon::prelude::*;

/// Progress tracker for displaying progress while categories are built
#[derive(Debug, Default)]
pub struct ProgressTracker {
    /// Draw nothing, e.g. when only one category is built
    hidden: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self { hidden: false }
    }

    pub fn hidden() -> Self {
        Self { hidden: true }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.hidden || len <= 1 {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("Invalid progress template: {}", e),
        }
        pb
    }

    /// Run `operation` over `items` one after another, stopping at the first error
    pub fn track_sequential<T, F, R, E>(
        &self,
        items: &[T],
        label: impl Fn(&T) -> String,
        mut operation: F,
    ) -> Result<Vec<R>, E>
    where
        F: FnMut(&T) -> Result<R, E>,
    {
        let pb = self.progress_bar(items.len());
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            pb.set_message(label(item));
            match operation(item) {
                Ok(result) => results.push(result),
                Err(e) => {
                    pb.abandon_with_message("failed");
                    return Err(e);
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");
        Ok(results)
    }

    /// Run `operation` over `items` on the current rayon pool
    ///
    /// Results come back in the order of `items`.
    pub fn track_parallel<T, F, R>(&self, items: &[T], label: impl Fn(&T) -> String + Sync, operation: F) -> Vec<R>
    where
        T: Sync,
        F: Fn(&T) -> R + Sync + Send,
        R: Send,
    {
        let pb = self.progress_bar(items.len());
        let processed = AtomicUsize::new(0);

        let results = items
            .par_iter()
            .map(|item| {
                let result = operation(item);
                let count = processed.fetch_add(1, Ordering::SeqCst) + 1;
                pb.set_position(count as u64);
                pb.set_message(label(item));
                result
            })
            .collect();

        pb.finish_with_message("done");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_results_keep_input_order() {
        let items: Vec<usize> = (0..50).collect();
        let doubled = ProgressTracker::hidden().track_parallel(&items, |i| i.to_string(), |i| i * 2);
        assert_eq!(doubled, items.iter().map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn sequential_stops_at_first_error() {
        let mut seen = Vec::new();
        let items = ["Likelihoods", "Processes", "Reports"];
        let result: Result<Vec<()>, String> =
            ProgressTracker::hidden().track_sequential(&items, |s| s.to_string(), |s| {
                seen.push(*s);
                if *s == "Processes" { Err(format!("{s} failed")) } else { Ok(()) }
            });
        assert_eq!(result.unwrap_err(), "Processes failed");
        assert_eq!(seen, vec!["Likelihoods", "Processes"]);
    }
}
