mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage};

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::CoverageConfig;
use crate::coverage::{
    CoverageStore, EditReport, History, Part, PartId, Pass, SelectionMode, SelectionRect, Snapshot,
};
use crate::dataset::GeometryStore;
use crate::error::{PolycoverError, Result};
use crate::geometry::{LatLng, Projector};

/// Identifies one persisted progress log: a module on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub module: String,
    pub day: String,
}

impl SessionKey {
    #[must_use]
    pub fn new(module: impl Into<String>, day: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            day: day.into(),
        }
    }

    /// Storage key of one pass, e.g. `"cable:2026-10-19:draft"`.
    #[must_use]
    pub fn storage_key(&self, pass: Pass) -> String {
        let suffix = match pass {
            Pass::Draft => "draft",
            Pass::Committed => "committed",
        };
        format!("{}:{}:{suffix}", self.module, self.day)
    }
}

/// A mounted module: coverage state, its undo log, and its storage.
///
/// Mount loads both Part arrays; unmount writes them back. Every mutating
/// call records the prior draft in the history when it changes anything.
#[derive(Debug)]
pub struct CoverageSession<S: Storage> {
    key: SessionKey,
    storage: S,
    store: CoverageStore,
    history: History,
}

impl<S: Storage> CoverageSession<S> {
    /// Loads the session for `key`. Missing arrays start empty; malformed
    /// arrays are logged and start empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the storage cannot be read.
    pub fn mount(storage: S, key: SessionKey, config: CoverageConfig) -> Result<Self> {
        config.validate()?;
        let mut draft = load_parts(&storage, &key.storage_key(Pass::Draft))?;
        let committed = load_parts(&storage, &key.storage_key(Pass::Committed))?;

        // A save interrupted after the committed write leaves submitted Parts
        // in the draft as well.
        let submitted: HashSet<PartId> = committed.iter().map(|p| p.id).collect();
        let before = draft.len();
        draft.retain(|p| !submitted.contains(&p.id));
        if draft.len() < before {
            tracing::warn!(dropped = before - draft.len(), "draft parts already committed");
        }
        tracing::info!(
            module = %key.module,
            day = %key.day,
            draft = draft.len(),
            committed = committed.len(),
            "session mounted"
        );
        Ok(Self {
            key,
            storage,
            store: CoverageStore::from_parts(config, draft, committed),
            history: History::new(config.history_limit),
        })
    }

    /// Writes both Part arrays to storage, committed first.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn save(&mut self) -> Result<()> {
        for pass in [Pass::Committed, Pass::Draft] {
            let json = serde_json::to_string(self.store.parts(pass))
                .map_err(crate::error::StorageError::from)?;
            self.storage.save(&self.key.storage_key(pass), &json)?;
        }
        Ok(())
    }

    /// Saves and releases the storage backend.
    ///
    /// # Errors
    ///
    /// If saving fails the session is handed back unchanged with the error,
    /// so the caller can retry.
    pub fn unmount(mut self) -> std::result::Result<S, (Box<Self>, PolycoverError)> {
        if let Err(err) = self.save() {
            tracing::error!(module = %self.key.module, day = %self.key.day, %err, "unmount failed");
            return Err((Box::new(self), err));
        }
        tracing::info!(module = %self.key.module, day = %self.key.day, "session unmounted");
        Ok(self.storage)
    }

    #[must_use]
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Read access for renderers, counters and exporters.
    #[must_use]
    pub fn store(&self) -> &CoverageStore {
        &self.store
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Applies a selection or erase rectangle.
    pub fn apply_box<P: Projector + ?Sized>(
        &mut self,
        geometry: &GeometryStore,
        projector: &P,
        rect: &SelectionRect,
        mode: SelectionMode,
    ) -> EditReport {
        let before = self.snapshot();
        let report = self.store.apply_box(geometry, projector, rect, mode);
        self.remember(before, &report);
        report
    }

    /// Applies a click selection.
    pub fn select_click<P: Projector + ?Sized>(
        &mut self,
        geometry: &GeometryStore,
        projector: &P,
        at: LatLng,
    ) -> EditReport {
        let before = self.snapshot();
        let report = self.store.select_click(geometry, projector, at);
        self.remember(before, &report);
        report
    }

    /// Restores the draft preceding the last change. Returns `false` if there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.store.restore_draft(previous.to_vec());
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone change. Returns `false` if there is nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.store.restore_draft(next.to_vec());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Commits the draft. History is cleared so undo cannot bring committed
    /// Parts back as draft.
    pub fn submit(&mut self) -> Vec<PartId> {
        self.history.clear();
        self.store.submit()
    }

    /// External deletion hook for submitted records.
    pub fn remove_committed(&mut self, ids: impl IntoIterator<Item = PartId>) -> usize {
        self.store.remove_committed(ids)
    }

    /// Discards the draft (undoable).
    pub fn clear_draft(&mut self) {
        if self.store.draft().is_empty() {
            return;
        }
        let before = self.snapshot();
        self.history.record(before);
        self.store.clear_draft();
    }

    fn snapshot(&self) -> Snapshot {
        Arc::from(self.store.draft())
    }

    fn remember(&mut self, before: Snapshot, report: &EditReport) {
        if report.changed() {
            self.history.record(before);
        }
    }
}

fn load_parts<S: Storage>(storage: &S, key: &str) -> Result<Vec<Part>> {
    let Some(json) = storage.load(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&json) {
        Ok(parts) => Ok(parts),
        Err(err) => {
            tracing::warn!(key, %err, "discarding malformed persisted parts");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dataset::{LineKey, LineMeta};
    use crate::error::StorageError;
    use crate::geometry::{LineGeometry, LocalTangentPlane};
    use crate::math::geodesic::EARTH_RADIUS_M;

    fn deg(m: f64) -> f64 {
        (m / EARTH_RADIUS_M).to_degrees()
    }

    fn geometry() -> GeometryStore {
        let mut g = GeometryStore::new();
        g.load_feature(
            "trench-4",
            &LineGeometry::line_string(&[LatLng::new(0.0, 0.0), LatLng::new(0.0, deg(100.0))]),
            &LineMeta::default(),
        )
        .unwrap();
        g
    }

    fn rect(from: f64, to: f64) -> SelectionRect {
        SelectionRect::new(LatLng::new(-deg(2.0), deg(from)), LatLng::new(deg(2.0), deg(to)))
    }

    fn key() -> SessionKey {
        SessionKey::new("trenching", "2026-10-19")
    }

    #[test]
    fn storage_keys() {
        assert_eq!(key().storage_key(Pass::Draft), "trenching:2026-10-19:draft");
        assert_eq!(key().storage_key(Pass::Committed), "trenching:2026-10-19:committed");
    }

    #[test]
    fn mount_save_remount() {
        let g = geometry();
        let proj = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let mut session =
            CoverageSession::mount(MemoryStorage::new(), key(), CoverageConfig::default()).unwrap();
        session.apply_box(&g, &proj, &rect(10.0, 30.0), SelectionMode::Add);
        session.apply_box(&g, &proj, &rect(50.0, 60.0), SelectionMode::Add);
        session.submit();
        session.apply_box(&g, &proj, &rect(70.0, 80.0), SelectionMode::Add);
        let storage = session.unmount().unwrap();

        let session = CoverageSession::mount(storage, key(), CoverageConfig::default()).unwrap();
        assert_eq!(session.store().committed().len(), 2);
        assert_eq!(session.store().draft().len(), 1);
        assert!(session.store().draft()[0].id > session.store().committed()[1].id);
    }

    /// Memory storage whose next `failures` writes fail.
    #[derive(Debug, Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        failures: usize,
    }

    impl Storage for FlakyStorage {
        fn load(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.load(key)
        }

        fn save(&mut self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.save(key, value)
        }
    }

    #[test]
    fn failed_unmount_returns_session_and_keeps_stored_draft() {
        let g = geometry();
        let proj = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let mut seeded =
            CoverageSession::mount(MemoryStorage::new(), key(), CoverageConfig::default()).unwrap();
        seeded.apply_box(&g, &proj, &rect(10.0, 30.0), SelectionMode::Add);
        let inner = seeded.unmount().unwrap();
        let stored_draft = inner.get(&key().storage_key(Pass::Draft)).unwrap().to_owned();

        let storage = FlakyStorage { inner, failures: 1 };
        let mut session = CoverageSession::mount(storage, key(), CoverageConfig::default()).unwrap();
        assert_eq!(session.submit().len(), 1);

        let (session, err) = session.unmount().unwrap_err();
        assert!(matches!(err, PolycoverError::Storage(_)));
        assert_eq!(session.store().committed().len(), 1);
        assert_eq!(
            session.storage().inner.get(&key().storage_key(Pass::Draft)),
            Some(stored_draft.as_str())
        );

        let storage = (*session).unmount().unwrap();
        let session = CoverageSession::mount(storage, key(), CoverageConfig::default()).unwrap();
        assert_eq!(session.store().committed().len(), 1);
        assert!(session.store().draft().is_empty());
    }

    #[test]
    fn mount_drops_draft_parts_already_committed() {
        let g = geometry();
        let proj = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let mut session =
            CoverageSession::mount(MemoryStorage::new(), key(), CoverageConfig::default()).unwrap();
        session.apply_box(&g, &proj, &rect(10.0, 30.0), SelectionMode::Add);
        let mut storage = session.unmount().unwrap();
        let draft = storage.get(&key().storage_key(Pass::Draft)).unwrap().to_owned();
        storage.insert(key().storage_key(Pass::Committed), draft);

        let session = CoverageSession::mount(storage, key(), CoverageConfig::default()).unwrap();
        assert_eq!(session.store().committed().len(), 1);
        assert!(session.store().draft().is_empty());
    }

    #[test]
    fn malformed_payload_starts_empty() {
        let mut storage = MemoryStorage::new();
        storage.insert(key().storage_key(Pass::Draft), "{oops");
        let session = CoverageSession::mount(storage, key(), CoverageConfig::default()).unwrap();
        assert!(session.store().draft().is_empty());
    }

    #[test]
    fn invalid_config_fails_mount() {
        let config = CoverageConfig {
            epsilon_m: -1.0,
            ..CoverageConfig::default()
        };
        assert!(CoverageSession::mount(MemoryStorage::new(), key(), config).is_err());
    }

    #[test]
    fn undo_redo_round_trip() {
        let g = geometry();
        let proj = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let mut session =
            CoverageSession::mount(MemoryStorage::new(), key(), CoverageConfig::default()).unwrap();
        session.apply_box(&g, &proj, &rect(10.0, 40.0), SelectionMode::Add);
        session.apply_box(&g, &proj, &rect(20.0, 30.0), SelectionMode::Erase);
        assert_eq!(session.store().draft().len(), 2);

        assert!(session.undo());
        assert_eq!(session.store().draft().len(), 1);
        assert!(session.undo());
        assert!(session.store().draft().is_empty());
        assert!(!session.undo());

        assert!(session.redo());
        assert!(session.redo());
        assert_eq!(session.store().draft().len(), 2);
        assert!(!session.redo());
    }

    #[test]
    fn unchanged_action_is_not_recorded() {
        let g = geometry();
        let proj = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let mut session =
            CoverageSession::mount(MemoryStorage::new(), key(), CoverageConfig::default()).unwrap();
        session.apply_box(&g, &proj, &rect(500.0, 600.0), SelectionMode::Add);
        assert!(!session.can_undo());
    }

    #[test]
    fn submit_clears_history() {
        let g = geometry();
        let proj = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let mut session =
            CoverageSession::mount(MemoryStorage::new(), key(), CoverageConfig::default()).unwrap();
        session.apply_box(&g, &proj, &rect(10.0, 40.0), SelectionMode::Add);
        session.submit();
        assert!(!session.can_undo());
        assert!(!session.undo());
        assert_eq!(session.store().coverage(&LineKey::new("trench-4", 0)).len(), 1);
    }

    #[test]
    fn clear_draft_is_undoable() {
        let g = geometry();
        let proj = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let mut session =
            CoverageSession::mount(MemoryStorage::new(), key(), CoverageConfig::default()).unwrap();
        session.select_click(&g, &proj, LatLng::new(0.0, deg(50.0)));
        assert_eq!(session.store().draft().len(), 1);
        session.clear_draft();
        assert!(session.store().draft().is_empty());
        assert!(session.undo());
        assert_eq!(session.store().draft().len(), 1);
    }
}
