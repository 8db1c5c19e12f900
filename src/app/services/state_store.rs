//! Owns the canonical document and its round trip through storage.

use crate::app::domain::{ClockIds, Document, EntityId, IdSource};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::storage::Storage;

/// Default storage key for the document.
pub const STATE_KEY: &str = "state";

/// Snapshot used when storage is empty, shipped with the crate.
pub const DEFAULT_BOOTSTRAP: &str = include_str!("../../../assets/bootstrap_state.json");

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions<'a> {
    pub key: &'a str,
    pub snapshot: Option<&'a str>,
    /// Skip persisted data and start from the snapshot
    pub reset: bool,
}

impl Default for LoadOptions<'_> {
    fn default() -> Self {
        Self {
            key: STATE_KEY,
            snapshot: None,
            reset: false,
        }
    }
}

pub struct StateStore<S: Storage> {
    storage: S,
    key: String,
    document: Document,
    ids: Box<dyn IdSource>,
}

impl<S: Storage> StateStore<S> {
    /// Load with the default key, falling back to `snapshot`.
    pub fn load(storage: S, snapshot: Option<&str>) -> Result<Self> {
        Self::load_with(
            storage,
            &LoadOptions {
                snapshot,
                ..Default::default()
            },
        )
    }

    /// Persisted document if present and readable, else the parsed snapshot,
    /// which is written through right away.
    pub fn load_with(mut storage: S, options: &LoadOptions<'_>) -> Result<Self> {
        let mut persisted_error = None;

        if !options.reset {
            if let Some(raw) = storage.get_item(options.key)? {
                match parse_document(&raw) {
                    Ok(document) => {
                        tracing::debug!(key = options.key, bytes = raw.len(), "loaded persisted state");
                        return Ok(Self::from_parts(storage, options.key, document));
                    }
                    Err(e) => {
                        tracing::warn!(key = options.key, "persisted state unreadable: {e}");
                        let backup = format!("{}.corrupt", options.key);
                        storage.set_item(&backup, &raw)?;
                        persisted_error = Some(e);
                    }
                }
            }
        }

        let Some(snapshot) = options.snapshot else {
            return Err(match persisted_error {
                Some(e) => AppError::CorruptState(format!("{e}; no bootstrap snapshot available")),
                None => AppError::CorruptState("no persisted state and no bootstrap snapshot".to_string()),
            });
        };

        let document = parse_document(snapshot)
            .map_err(|e| AppError::CorruptState(format!("bootstrap snapshot: {e}")))?;
        tracing::info!(key = options.key, reset = options.reset, "initialized state from bootstrap snapshot");

        let mut store = Self::from_parts(storage, options.key, document);
        store.persist()?;
        Ok(store)
    }

    fn from_parts(storage: S, key: &str, document: Document) -> Self {
        Self {
            storage,
            key: key.to_string(),
            document,
            ids: Box::new(ClockIds::new()),
        }
    }

    /// Replace the id source (e.g. with `SequentialIds` for scripted runs).
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Serialize the full document and overwrite the stored value.
    pub fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.document)?;
        self.storage.set_item(&self.key, &json)?;
        tracing::debug!(key = %self.key, bytes = json.len(), "persisted state");
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Fresh id not used by any setting or formula in the document.
    pub fn next_id(&mut self) -> EntityId {
        loop {
            let id = self.ids.next_id();
            if !self.document.id_in_use(&id) {
                return id;
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

fn parse_document(raw: &str) -> Result<Document> {
    let document: Document =
        serde_json::from_str(raw).map_err(|e| AppError::CorruptState(e.to_string()))?;
    document.validate()?;
    Ok(document)
}
