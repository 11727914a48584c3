//! Filesystem events and the watch loop
//!
//! The `notify` watcher runs on its own thread and only forwards raw
//! events into a channel. The loop drains the channel into an
//! [`EventQueue`], which keeps one pending event per path, and hands the
//! events to the [`ProjectModel`] one at a time.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;
use log::{debug, error, info, warn};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use walkdir::WalkDir;
use crate::asset::AssetKind;
use crate::config::ProjectPaths;
use crate::error::ProjectError;
use crate::project::{BuildStep, ProjectModel};

/// How long the loop waits for further events before processing a batch
const SETTLE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Add(PathBuf),
    Change(PathBuf),
    Remove(PathBuf),
    /// The initial enumeration is complete
    Ready,
}

impl WatchEvent {
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Add(path) | WatchEvent::Change(path) | WatchEvent::Remove(path) => Some(path),
            WatchEvent::Ready => None,
        }
    }
}

/// Pending events in arrival order, at most one per path. A newer event
/// for a queued path takes over the older one's place.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<WatchEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: WatchEvent) {
        if let Some(path) = event.path() {
            if let Some(slot) = self.pending.iter_mut().find(|queued| queued.path() == Some(path)) {
                *slot = event;
                return;
            }
        }
        self.pending.push_back(event);
    }

    pub fn pop(&mut self) -> Option<WatchEvent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Extend<WatchEvent> for EventQueue {
    fn extend<T: IntoIterator<Item = WatchEvent>>(&mut self, events: T) {
        for event in events {
            self.push(event);
        }
    }
}

/// Supported, non-ignored files below the project root, sorted.
pub fn enumerate(paths: &ProjectPaths) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(&paths.root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !paths.is_ignored(entry.path()))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| AssetKind::classify(path).is_ok())
        .collect();
    files.sort();
    files
}

/// Maps a raw `notify` event to watch events. Whether the path still
/// exists decides between change and removal, which also covers renames.
pub fn translate(event: notify::Event) -> Vec<WatchEvent> {
    let created = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(_) => false,
        EventKind::Remove(_) => {
            return event.paths.into_iter().map(WatchEvent::Remove).collect();
        }
        _ => return Vec::new(),
    };
    event
        .paths
        .into_iter()
        .filter(|path| !path.is_dir())
        .map(|path| {
            if !path.exists() {
                WatchEvent::Remove(path)
            } else if created {
                WatchEvent::Add(path)
            } else {
                WatchEvent::Change(path)
            }
        })
        .collect()
}

/// Services filesystem events until the watcher goes away. `report` sees
/// the model and the steps each event caused.
pub fn run(model: &mut ProjectModel, mut report: impl FnMut(&ProjectModel, &[BuildStep])) -> Result<(), ProjectError> {
    let root = model.paths().root.clone();
    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, notify::Config::default())?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("watching {}", root.display());

    let mut queue = EventQueue::new();
    let forward = |queue: &mut EventQueue, raw: notify::Result<notify::Event>| match raw {
        Ok(event) => queue.extend(translate(event)),
        Err(watch_error) => warn!("watch error: {}", watch_error),
    };

    while let Ok(raw) = rx.recv() {
        forward(&mut queue, raw);
        // Let bursts of writes to one file collapse into one event
        while let Ok(raw) = rx.recv_timeout(SETTLE) {
            forward(&mut queue, raw);
        }

        while let Some(event) = queue.pop() {
            model.clear_log();
            if let Err(event_error) = model.handle(event) {
                match event_error {
                    ProjectError::UnsupportedAssetKind { .. } => debug!("{}", event_error),
                    _ => error!("{}: {}", event_error.code(), event_error),
                }
            }
            let model: &ProjectModel = model;
            report(model, model.build_log());
        }
    }

    info!("watcher closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn add(path: &str) -> WatchEvent {
        WatchEvent::Add(PathBuf::from(path))
    }

    fn change(path: &str) -> WatchEvent {
        WatchEvent::Change(PathBuf::from(path))
    }

    fn remove(path: &str) -> WatchEvent {
        WatchEvent::Remove(PathBuf::from(path))
    }

    #[test]
    fn test_queue_coalesces_per_path() {
        let mut queue = EventQueue::new();
        queue.push(add("/game/a.ts"));
        queue.push(change("/game/b.ts"));
        queue.push(change("/game/a.ts"));
        queue.push(remove("/game/b.ts"));
        assert_eq!(queue.len(), 2);
        // The newest event keeps the first one's place
        assert_eq!(queue.pop(), Some(change("/game/a.ts")));
        assert_eq!(queue.pop(), Some(remove("/game/b.ts")));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_keeps_ready_in_order() {
        let mut queue = EventQueue::new();
        queue.extend([add("/game/a.ts"), WatchEvent::Ready, add("/game/b.ts")]);
        assert_eq!(queue.pop(), Some(add("/game/a.ts")));
        assert_eq!(queue.pop(), Some(WatchEvent::Ready));
        assert_eq!(queue.pop(), Some(add("/game/b.ts")));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_translate() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("player.ts");
        std::fs::write(&script, "let a = 1;").unwrap();
        let gone = dir.path().join("gone.ts");

        let created = notify::Event::new(EventKind::Create(CreateKind::File)).add_path(script.clone());
        assert_eq!(translate(created), vec![WatchEvent::Add(script.clone())]);

        let modified = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(script.clone())
            .add_path(gone.clone());
        assert_eq!(
            translate(modified),
            vec![WatchEvent::Change(script.clone()), WatchEvent::Remove(gone.clone())]
        );

        let removed = notify::Event::new(EventKind::Remove(RemoveKind::File)).add_path(gone.clone());
        assert_eq!(translate(removed), vec![WatchEvent::Remove(gone)]);

        // Directories are not assets
        let dir_created = notify::Event::new(EventKind::Create(CreateKind::Folder)).add_path(dir.path().to_path_buf());
        assert!(translate(dir_created).is_empty());

        let accessed = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any)).add_path(script);
        assert!(translate(accessed).is_empty());
    }

    #[test]
    fn test_enumerate() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("compiled")).unwrap();
        std::fs::create_dir_all(root.join("scenes")).unwrap();
        std::fs::write(root.join("player.ts"), "").unwrap();
        std::fs::write(root.join("engine.d.ts"), "").unwrap();
        std::fs::write(root.join("icon.png"), "").unwrap();
        std::fs::write(root.join("compiled/stale.ts"), "").unwrap();
        std::fs::write(root.join("scenes/main.tscn"), "").unwrap();

        let paths = ProjectPaths::new(root, &crate::config::Config::default());
        assert_eq!(enumerate(&paths), vec![root.join("player.ts"), root.join("scenes/main.tscn")]);
    }
}
