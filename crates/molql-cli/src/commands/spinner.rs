use indicatif::{ProgressBar, ProgressStyle};
use molql::workflows::progress::{Progress, ProgressCallback};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(80);

/// Shows the phases of a structure load on stderr, one numbered line per phase.
///
/// The running phase name is kept in the bar's prefix so the finish event can echo it.
#[derive(Clone)]
pub struct LoadSpinner {
    bar: ProgressBar,
    completed: Arc<AtomicUsize>,
}

impl LoadSpinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self::from_bar(bar)
    }

    /// A spinner that never draws, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::from_bar(ProgressBar::hidden())
    }

    fn from_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of phases that reported [`Progress::PhaseFinish`] so far.
    pub fn completed_phases(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Builds the reporter callback. Clones of the bar share one draw state.
    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        let completed = Arc::clone(&self.completed);

        Box::new(move |event| match event {
            Progress::PhaseStart { name } => {
                let step = completed.load(Ordering::Relaxed) + 1;
                bar.set_prefix(name);
                bar.set_message(format!("[{step}] {name}..."));
                bar.enable_steady_tick(TICK);
            }
            Progress::PhaseFinish => {
                completed.fetch_add(1, Ordering::Relaxed);
                let done = format!("✓ {}", bar.prefix());
                bar.println(&done);
                bar.set_message(done);
            }
            Progress::Message(text) => {
                bar.println(format!("  {text}"));
                bar.set_message(text);
            }
        })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for LoadSpinner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn phases_are_numbered_and_echoed_on_finish() {
        let spinner = LoadSpinner::hidden();
        let callback = spinner.callback();

        callback(Progress::PhaseStart { name: "Reading" });
        assert_eq!(spinner.bar.message(), "[1] Reading...");
        assert_eq!(spinner.completed_phases(), 0);

        callback(Progress::PhaseFinish);
        assert_eq!(spinner.bar.message(), "✓ Reading");

        callback(Progress::PhaseStart {
            name: "Building models",
        });
        assert_eq!(spinner.bar.message(), "[2] Building models...");
        callback(Progress::PhaseFinish);
        assert_eq!(spinner.completed_phases(), 2);

        callback(Progress::Message("Loaded 1MQL with 2 model(s)".to_string()));
        assert_eq!(spinner.bar.message(), "Loaded 1MQL with 2 model(s)");
    }

    #[test]
    fn callback_can_run_on_another_thread() {
        let spinner = LoadSpinner::hidden();
        let callback = spinner.callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Reading" });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert_eq!(spinner.completed_phases(), 1);
        assert_eq!(spinner.bar.message(), "✓ Reading");
        spinner.finish();
        assert!(spinner.bar.is_finished());
    }
}
