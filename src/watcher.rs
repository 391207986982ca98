use std::path::Path;

use crossbeam_channel::{Receiver, unbounded};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Polled "config changed" signal for one file.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> notify::Result<Self> {
        let (tx, rx) = unbounded();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                match event.kind {
                    EventKind::Modify(_)
                    | EventKind::Create(_)
                    | EventKind::Remove(_)
                    | EventKind::Any => {
                        let _ = tx.send(());
                    }
                    _ => {}
                }
            }
        })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        log::info!("watching {} for changes", path.display());
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// True if the file changed since the last call. Bursts of events count once.
    pub fn take_changed(&self) -> bool {
        self.rx.try_iter().count() > 0
    }
}
