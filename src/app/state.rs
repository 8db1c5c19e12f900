use super::controllers::view::View;
use super::controllers::{Outcome, open_page};
use super::domain::{AppConfig, Intent};
use super::infrastructure::error::Result;
use super::infrastructure::storage::{FileStorage, Storage};
use super::services::navigation::Route;
use super::services::state_store::{DEFAULT_BOOTSTRAP, LoadOptions, StateStore};

/// Main application coordinator: one store, one page at a time.
pub struct AppState<S: Storage> {
    store: StateStore<S>,
}

impl AppState<FileStorage> {
    /// File-backed state as described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let bootstrap = config.read_bootstrap()?;
        let storage = FileStorage::new(config.storage_dir());
        let options = LoadOptions {
            key: &config.storage_key,
            snapshot: Some(bootstrap.as_deref().unwrap_or(DEFAULT_BOOTSTRAP)),
            reset: config.reset_state,
        };
        tracing::debug!(dir = %storage.dir().display(), "opening file storage");
        Ok(Self::new(StateStore::load_with(storage, &options)?))
    }
}

impl<S: Storage> AppState<S> {
    pub fn new(store: StateStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// Open `route`, render it, then feed `intents` in order.
    ///
    /// Stops at the first intent that navigates away and returns that
    /// outcome; the page is re-rendered once at the end otherwise.
    pub fn run(
        &mut self,
        route: &Route,
        intents: Vec<Intent>,
        view: &mut dyn View,
    ) -> Result<Outcome> {
        let mut page = open_page(&mut self.store, route)?;
        page.render(view);

        for intent in intents {
            tracing::debug!(intent = intent.name(), "handling intent");
            let outcome = page.handle(intent, view)?;
            if let Outcome::Navigate(_) = outcome {
                return Ok(outcome);
            }
        }
        page.render(view);
        Ok(Outcome::Stay)
    }
}
