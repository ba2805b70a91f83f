use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Background watch on the deck file. Registration is fire-and-forget:
/// failures are logged and the presentation runs without live reload.
pub struct DeckWatcher {
    path: PathBuf,
    rx: Receiver<DebounceEventResult>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl DeckWatcher {
    /// Start watching `path`. `on_event` runs on the watcher thread after each
    /// debounced batch, typically to wake the UI.
    pub fn register(path: &Path, on_event: impl Fn() + Send + 'static) -> Option<Self> {
        match Self::try_register(path, on_event) {
            Ok(watcher) => {
                tracing::debug!("watching {} for changes", path.display());
                Some(watcher)
            }
            Err(e) => {
                tracing::warn!("deck watcher registration failed: {e}");
                None
            }
        }
    }

    fn try_register(path: &Path, on_event: impl Fn() + Send + 'static) -> anyhow::Result<Self> {
        let path = path.canonicalize()?;
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("{} has no parent directory", path.display()))?;

        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            if tx.send(result).is_ok() {
                on_event();
            }
        })?;
        // Editors often replace the file on save, so watch its directory
        debouncer.watcher().watch(dir, RecursiveMode::NonRecursive)?;
        Ok(Self {
            path,
            rx,
            _debouncer: debouncer,
        })
    }

    /// Drain pending events; true when the deck file changed since the last call.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        for result in self.rx.try_iter() {
            match result {
                Ok(events) => {
                    changed |= events
                        .iter()
                        .any(|e| e.path.file_name() == self.path.file_name());
                }
                Err(e) => tracing::warn!("deck watcher error: {e}"),
            }
        }
        changed
    }
}
