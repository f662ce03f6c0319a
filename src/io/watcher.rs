use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the console event loop.
#[derive(Debug)]
pub enum FileEvent {
    /// The data file or guide.toml changed on disk.
    Changed(Vec<PathBuf>),
}

/// A file system watcher for the guide/ directory.
pub struct GuideWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

/// Only the data file and the config are worth a reload; the lock, undo
/// buffer, log and atomic-write temp files are not.
fn is_relevant(path: &Path, guide_dir: &Path, data_file: &str) -> bool {
    if !path.starts_with(guide_dir) {
        return false;
    }
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name == data_file || name == "guide.toml",
        None => false,
    }
}

impl GuideWatcher {
    /// Start watching `guide_dir`. Call `poll()` each tick.
    pub fn start(guide_dir: &Path, data_file: &str) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let guide_dir_owned = guide_dir.to_path_buf();
        let data_file = data_file.to_string();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| is_relevant(p, &guide_dir_owned, &data_file))
                    .collect();

                if !relevant.is_empty() {
                    let _ = tx.send(FileEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(guide_dir, RecursiveMode::NonRecursive)?;
        Ok(GuideWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll; returns all queued events (may be empty).
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}
