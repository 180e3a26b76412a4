use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebouncedEvent, Debouncer, RecommendedCache};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::processor::Processor;
use crate::models::FileProcessRequest;

/// Wait for writes to settle before reporting a new file
const DEBOUNCE: Duration = Duration::from_millis(500);

/// How many recent outputs the processing task remembers
const RECENT_OUTPUTS: usize = 128;

/// Name suffixes of files that are still being downloaded or written
const PARTIAL_SUFFIXES: &[&str] = &[".tmp", ".crdownload", ".part", ".download"];

/// System directories that should never be watched
#[cfg(windows)]
const FORBIDDEN_PREFIXES: &[&str] = &[
    "C:\\Windows",
    "C:\\Program Files",
    "C:\\Program Files (x86)",
    "C:\\ProgramData",
];

#[cfg(not(windows))]
const FORBIDDEN_PREFIXES: &[&str] = &[
    "/System", "/Library", "/usr", "/bin", "/sbin", "/etc", "/dev", "/proc", "/sys", "/boot",
];

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Invalid watch path: {0}")]
    InvalidPath(String),

    #[error("Failed to watch folder: {0}")]
    Notify(#[from] notify::Error),
}

/// A file that appeared in a watched folder
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub id: String,
    pub path: PathBuf,
    pub watched_folder: String,
}

pub type DropSender = mpsc::UnboundedSender<DroppedFile>;
pub type DropReceiver = mpsc::UnboundedReceiver<DroppedFile>;

pub(crate) struct FolderWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

/// Watcher state, one debounced watcher per folder
#[derive(Default)]
pub struct WatcherState {
    /// Canonical folder path -> watcher
    pub(crate) watchers: HashMap<String, FolderWatcher>,
    pub enabled: bool,
}

pub type WatcherHandle = Arc<Mutex<WatcherState>>;

pub fn create_watcher_handle() -> WatcherHandle {
    Arc::new(Mutex::new(WatcherState::default()))
}

fn lock(handle: &WatcherHandle) -> MutexGuard<'_, WatcherState> {
    handle.lock().unwrap_or_else(|poisoned| {
        warn!("Watcher state mutex was poisoned, recovering...");
        poisoned.into_inner()
    })
}

/// Resolve `path` to a canonical directory that is safe to watch.
pub fn validate_watch_path(path: &Path) -> Result<PathBuf, WatcherError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| WatcherError::InvalidPath(format!("Cannot resolve {}: {}", path.display(), e)))?;

    if !canonical.is_dir() {
        return Err(WatcherError::InvalidPath(format!(
            "Path is not a directory: {}",
            path.display()
        )));
    }

    if canonical.parent().is_none() {
        return Err(WatcherError::InvalidPath("Cannot watch root directory".to_string()));
    }

    let path_str = canonical.to_string_lossy();
    for forbidden in FORBIDDEN_PREFIXES {
        if path_str.starts_with(forbidden) {
            return Err(WatcherError::InvalidPath(format!(
                "Cannot watch system directory: {}",
                forbidden
            )));
        }
    }

    Ok(canonical)
}

/// Start watching `path`. Returns the canonical folder key; watching an
/// already watched folder is a no-op.
pub fn add_watched_folder(
    handle: &WatcherHandle,
    tx: DropSender,
    path: &Path,
) -> Result<String, WatcherError> {
    let canonical = validate_watch_path(path)?;
    let key = canonical.to_string_lossy().to_string();

    let mut state = lock(handle);
    if state.watchers.contains_key(&key) {
        return Ok(key);
    }

    let watched_folder = key.clone();
    let mut debouncer = new_debouncer(
        DEBOUNCE,
        None,
        move |result: Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
            Ok(events) => {
                for event in events {
                    handle_file_event(&tx, &event, &watched_folder);
                }
            }
            Err(errors) => {
                for error in errors {
                    warn!("Watcher error: {:?}", error);
                }
            }
        },
    )?;
    debouncer.watch(&canonical, RecursiveMode::NonRecursive)?;

    state.watchers.insert(key.clone(), FolderWatcher { _debouncer: debouncer });
    state.enabled = true;
    info!(folder = %key, "Watching folder");

    Ok(key)
}

/// Stop watching `path`. Returns whether it was watched.
pub fn remove_watched_folder(handle: &WatcherHandle, path: &str) -> bool {
    let key = Path::new(path)
        .canonicalize()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string());

    let mut state = lock(handle);
    let removed = state.watchers.remove(&key).is_some() || state.watchers.remove(path).is_some();
    if state.watchers.is_empty() {
        state.enabled = false;
    }
    if removed {
        info!(folder = %key, "Stopped watching folder");
    }
    removed
}

pub fn stop_watcher(handle: &WatcherHandle) {
    let mut state = lock(handle);
    state.watchers.clear();
    state.enabled = false;
}

pub fn is_watcher_running(handle: &WatcherHandle) -> bool {
    let state = lock(handle);
    state.enabled && !state.watchers.is_empty()
}

/// Watched folders, sorted
pub fn get_all_watching_paths(handle: &WatcherHandle) -> Vec<String> {
    let mut paths: Vec<String> = lock(handle).watchers.keys().cloned().collect();
    paths.sort();
    paths
}

fn is_partial_or_hidden(file_name: &str) -> bool {
    file_name.starts_with('.') || PARTIAL_SUFFIXES.iter().any(|s| file_name.ends_with(s))
}

/// Canonical path of `path` if it is a finished regular file directly
/// inside `watched_folder`.
pub fn should_process(path: &Path, watched_folder: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_string_lossy();
    if is_partial_or_hidden(&file_name) {
        return None;
    }

    // symlink_metadata so a link is never followed out of the folder
    let metadata = std::fs::symlink_metadata(path).ok()?;
    if !metadata.file_type().is_file() || metadata.len() == 0 {
        return None;
    }

    let canonical = path.canonicalize().ok()?;
    let canonical_watched = watched_folder.canonicalize().ok()?;
    if !canonical.starts_with(&canonical_watched) {
        warn!("Skipping file outside watched folder: {:?}", path);
        return None;
    }

    Some(canonical)
}

fn handle_file_event(tx: &DropSender, event: &DebouncedEvent, watched_folder: &str) {
    if !matches!(event.kind, EventKind::Create(_)) {
        return;
    }

    for path in &event.paths {
        let Some(canonical) = should_process(path, Path::new(watched_folder)) else {
            continue;
        };

        let dropped = DroppedFile {
            id: uuid::Uuid::new_v4().to_string(),
            path: canonical,
            watched_folder: watched_folder.to_string(),
        };
        debug!(file = %dropped.path.display(), folder = %watched_folder, "File dropped");

        if tx.send(dropped).is_err() {
            warn!("Processing task has stopped, dropping watcher event");
        }
    }
}

/// Outputs recently written by the processor, so they are not filed twice
#[derive(Default)]
struct RecentOutputs {
    paths: VecDeque<PathBuf>,
}

impl RecentOutputs {
    fn remember(&mut self, path: PathBuf) {
        if self.paths.len() == RECENT_OUTPUTS {
            self.paths.pop_front();
        }
        self.paths.push_back(path);
    }

    fn take(&mut self, path: &Path) -> bool {
        match self.paths.iter().position(|p| p == path) {
            Some(idx) => {
                self.paths.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Run the processor on every dropped file until all senders are gone.
pub fn spawn_processing_task(processor: Arc<Processor>, mut rx: DropReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut recent = RecentOutputs::default();

        while let Some(dropped) = rx.recv().await {
            if recent.take(&dropped.path) {
                debug!(file = %dropped.path.display(), "Skipping file written by processor");
                continue;
            }

            let req = FileProcessRequest {
                file_path: dropped.path.to_string_lossy().to_string(),
                use_ai: false,
                model: String::new(),
                rule_id: None,
            };

            match processor.process(&req).await {
                Ok(resp) => {
                    let written = PathBuf::from(&resp.destination);
                    recent.remember(written.canonicalize().unwrap_or(written));
                }
                Err(e) => warn!(
                    id = %dropped.id,
                    file = %req.file_path,
                    error = %e,
                    "Failed to process dropped file"
                ),
            }
        }
    })
}

/// Wait for the processing task to finish the files already queued.
///
/// The task ends once every sender is gone; past `grace` it is aborted.
pub async fn drain_processing(task: JoinHandle<()>, grace: Duration) {
    let abort = task.abort_handle();
    match tokio::time::timeout(grace, task).await {
        Ok(Ok(())) => debug!("Processing task drained"),
        Ok(Err(e)) => warn!(error = %e, "Processing task failed"),
        Err(_) => {
            warn!(?grace, "Processing task still busy, aborting");
            abort.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, Analyzer};
    use crate::models::AiAnalysis;
    use crate::store::Store;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct NoAi;

    #[async_trait]
    impl Analyzer for NoAi {
        async fn analyze(&self, _path: &Path, _model: Option<&str>) -> Result<AiAnalysis, AiError> {
            Err(AiError::Malformed("not used".into()))
        }
    }

    #[test]
    fn test_should_process_filters() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path();

        let good = folder.join("report.pdf");
        fs::write(&good, b"pdf").unwrap();
        assert_eq!(should_process(&good, folder), Some(good.canonicalize().unwrap()));

        for name in [".DS_Store", "movie.mkv.part", "setup.crdownload", "x.tmp", "y.download"] {
            let path = folder.join(name);
            fs::write(&path, b"data").unwrap();
            assert_eq!(should_process(&path, folder), None, "{}", name);
        }

        let empty = folder.join("empty.txt");
        fs::write(&empty, b"").unwrap();
        assert_eq!(should_process(&empty, folder), None);

        let sub = folder.join("sub");
        fs::create_dir(&sub).unwrap();
        assert_eq!(should_process(&sub, folder), None);

        assert_eq!(should_process(&folder.join("gone.txt"), folder), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_should_process_skips_symlinks_and_outside_paths() {
        let outside = TempDir::new().unwrap();
        let secret = outside.path().join("secret.txt");
        fs::write(&secret, b"secret").unwrap();

        let dir = TempDir::new().unwrap();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&secret, &link).unwrap();
        assert_eq!(should_process(&link, dir.path()), None);

        assert_eq!(should_process(&secret, dir.path()), None);
    }

    #[test]
    fn test_validate_watch_path() {
        let dir = TempDir::new().unwrap();
        assert_eq!(validate_watch_path(dir.path()).unwrap(), dir.path().canonicalize().unwrap());

        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(validate_watch_path(&file), Err(WatcherError::InvalidPath(_))));
        assert!(validate_watch_path(&dir.path().join("missing")).is_err());
        assert!(validate_watch_path(Path::new("/")).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_validate_rejects_system_dirs() {
        assert!(validate_watch_path(Path::new("/etc")).is_err());
        assert!(validate_watch_path(Path::new("/usr/bin")).is_err());
    }

    #[tokio::test]
    async fn test_add_and_remove_folders() {
        let handle = create_watcher_handle();
        let (tx, _rx) = mpsc::unbounded_channel();
        let dir = TempDir::new().unwrap();
        assert!(!is_watcher_running(&handle));

        let key = add_watched_folder(&handle, tx.clone(), dir.path()).unwrap();
        add_watched_folder(&handle, tx, dir.path()).unwrap();
        assert!(is_watcher_running(&handle));
        assert_eq!(get_all_watching_paths(&handle), vec![key.clone()]);

        assert!(remove_watched_folder(&handle, &dir.path().to_string_lossy()));
        assert!(!remove_watched_folder(&handle, &key));
        assert!(!is_watcher_running(&handle));
        assert!(get_all_watching_paths(&handle).is_empty());
    }

    #[tokio::test]
    async fn test_stop_watcher_clears_everything() {
        let handle = create_watcher_handle();
        let (tx, _rx) = mpsc::unbounded_channel();
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        add_watched_folder(&handle, tx.clone(), a.path()).unwrap();
        add_watched_folder(&handle, tx, b.path()).unwrap();
        assert_eq!(get_all_watching_paths(&handle).len(), 2);

        stop_watcher(&handle);
        assert!(!is_watcher_running(&handle));
        assert!(get_all_watching_paths(&handle).is_empty());
    }

    #[test]
    fn test_recent_outputs_are_bounded() {
        let mut recent = RecentOutputs::default();
        for i in 0..=RECENT_OUTPUTS {
            recent.remember(PathBuf::from(format!("/out/{}", i)));
        }
        assert!(!recent.take(Path::new("/out/0")));
        assert!(recent.take(Path::new("/out/1")));
        assert!(!recent.take(Path::new("/out/1")));
    }

    #[tokio::test]
    async fn test_drain_finishes_queued_files() {
        let dir = TempDir::new().unwrap();
        let inbox = dir.path().join("inbox");
        fs::create_dir(&inbox).unwrap();
        let store = Arc::new(Store::open_in_memory().unwrap());
        let processor = Arc::new(Processor::new(store.clone(), Arc::new(NoAi), dir.path().join("out")));

        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn_processing_task(processor, rx);
        for name in ["a.txt", "b.txt", "c.txt"] {
            let file = inbox.join(name);
            fs::write(&file, name).unwrap();
            tx.send(DroppedFile {
                id: name.into(),
                path: file,
                watched_folder: inbox.to_string_lossy().to_string(),
            })
            .unwrap();
        }
        drop(tx);

        drain_processing(task, Duration::from_secs(10)).await;
        assert_eq!(store.get_history().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let (tx, rx) = mpsc::unbounded_channel::<DroppedFile>();
        let store = Arc::new(Store::open_in_memory().unwrap());
        let processor = Arc::new(Processor::new(store, Arc::new(NoAi), PathBuf::from("/unused")));
        let task = spawn_processing_task(processor, rx);

        // sender still alive, so the task never ends on its own
        drain_processing(task, Duration::from_millis(50)).await;
        drop(tx);
    }

    #[tokio::test]
    async fn test_processing_task_files_dropped_files_once() {
        let dir = TempDir::new().unwrap();
        let inbox = dir.path().join("inbox");
        fs::create_dir(&inbox).unwrap();
        let store = Arc::new(Store::open_in_memory().unwrap());
        // destination inside the watched folder
        let processor = Arc::new(Processor::new(store.clone(), Arc::new(NoAi), inbox.clone()));

        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn_processing_task(processor, rx);

        let file = inbox.join("scan.txt");
        fs::write(&file, b"scan").unwrap();
        let folder = inbox.to_string_lossy().to_string();
        tx.send(DroppedFile {
            id: "1".into(),
            path: file.canonicalize().unwrap(),
            watched_folder: folder.clone(),
        })
        .unwrap();

        // yield until the first file has been processed
        for _ in 0..200 {
            if store.get_history().unwrap().len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let history = store.get_history().unwrap();
        assert_eq!(history.len(), 1);

        // the watcher would now report the copy the processor wrote
        tx.send(DroppedFile {
            id: "2".into(),
            path: PathBuf::from(&history[0].new_path).canonicalize().unwrap(),
            watched_folder: folder,
        })
        .unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(store.get_history().unwrap().len(), 1);
    }
}
