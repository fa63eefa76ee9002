use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::utils::path::absolutize;

pub(super) const DEBOUNCE_MS: u64 = 300;
pub(super) const RERUN_COOLDOWN_MS: u64 = 800;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Pure debouncer: only handles timing and event deduplication.
pub(super) struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_run: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_run: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Create/Modify → Create/Modify (file was restored)
    /// - Modify + Remove → Remove (file was deleted)
    /// - Create + Remove → dropped (never really existed)
    /// - Same type events: first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // Metadata-only changes (mtime/chmod) are noise
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        for path in &event.paths {
            self.add(path, kind);
        }
    }

    pub(super) fn add(&mut self, path: &Path, kind: ChangeKind) {
        if is_temp_file(path) {
            return;
        }

        let path = absolutize(path);
        match self.changes.get(&path).copied() {
            None => {
                crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                self.changes.insert(path, ChangeKind::Removed);
            }
            Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                self.changes.remove(&path);
            }
            Some(_) => return,
        }
        self.last_event = Some(Instant::now());
    }

    /// Take pending changes if debounce + cooldown elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;
        (!changes.is_empty()).then_some(changes)
    }

    /// Record that a run just finished; starts the cooldown.
    pub(super) fn mark_run(&mut self) {
        self.last_run = Some(Instant::now());
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_run) = self.last_run
            && last_run.elapsed() < Duration::from_millis(RERUN_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_run
            .map(|t| Duration::from_millis(RERUN_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind};
    use notify::{Event, EventKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    fn expire(debouncer: &mut Debouncer) {
        let past = Instant::now() - Duration::from_secs(5);
        debouncer.last_event = Some(past);
        if debouncer.last_run.is_some() {
            debouncer.last_run = Some(past);
        }
    }

    #[test]
    fn test_dedup_rules() {
        let mut d = Debouncer::new();
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        let remove = EventKind::Remove(RemoveKind::File);
        let create = EventKind::Create(CreateKind::File);

        d.add_event(&event(remove, "/p/a.js"));
        d.add_event(&event(create, "/p/a.js"));
        assert_eq!(d.changes[Path::new("/p/a.js")], ChangeKind::Created);

        d.add_event(&event(modify, "/p/b.js"));
        d.add_event(&event(remove, "/p/b.js"));
        assert_eq!(d.changes[Path::new("/p/b.js")], ChangeKind::Removed);

        d.add_event(&event(create, "/p/c.js"));
        d.add_event(&event(remove, "/p/c.js"));
        assert!(!d.changes.contains_key(Path::new("/p/c.js")));

        d.add_event(&event(create, "/p/d.js"));
        d.add_event(&event(modify, "/p/d.js"));
        assert_eq!(d.changes[Path::new("/p/d.js")], ChangeKind::Created);
    }

    #[test]
    fn test_ignores_noise() {
        let mut d = Debouncer::new();
        d.add_event(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            "/p/a.js",
        ));
        d.add_event(&event(EventKind::Create(CreateKind::File), "/p/.a.js.swp"));
        d.add_event(&event(EventKind::Create(CreateKind::File), "/p/a.js~"));
        assert!(d.changes.is_empty());
        assert!(d.last_event.is_none());
    }

    #[test]
    fn test_ready_after_debounce() {
        let mut d = Debouncer::new();
        d.add(Path::new("/p/a.js"), ChangeKind::Modified);
        assert!(!d.is_ready());
        assert!(d.take_if_ready().is_none());

        expire(&mut d);
        let changes = d.take_if_ready().unwrap();
        assert_eq!(changes.len(), 1);
        assert!(d.changes.is_empty());
        assert!(d.take_if_ready().is_none());
    }

    #[test]
    fn test_cooldown_after_run() {
        let mut d = Debouncer::new();
        d.mark_run();
        d.add(Path::new("/p/a.js"), ChangeKind::Modified);
        d.last_event = Some(Instant::now() - Duration::from_secs(5));

        // Debounce elapsed but the run was just now
        assert!(!d.is_ready());
        assert!(d.sleep_duration() > Duration::from_millis(1));

        expire(&mut d);
        assert!(d.is_ready());
    }

    #[test]
    fn test_sleep_duration_idle() {
        let d = Debouncer::new();
        assert_eq!(d.sleep_duration(), Duration::from_secs(86400));
    }
}
