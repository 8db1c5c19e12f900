use super::view::{ListItem, View};
use super::{Outcome, Page};
use crate::app::domain::{EntityId, Intent, ListKind};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::storage::Storage;
use crate::app::services::list_mutator;
use crate::app::services::navigation::Route;
use crate::app::services::state_store::StateStore;

/// The index page: every setting with its status and a link to edit it.
pub struct SettingsListPage<'s, S: Storage> {
    store: &'s mut StateStore<S>,
}

impl<'s, S: Storage> SettingsListPage<'s, S> {
    pub fn open(store: &'s mut StateStore<S>) -> Self {
        Self { store }
    }

    fn remove_setting(&mut self, id: &EntityId) -> Result<()> {
        if list_mutator::remove(&mut self.store.document_mut().settings, id) {
            self.store.persist()?;
            tracing::info!(setting = %id, "removed setting");
        }
        Ok(())
    }
}

impl<S: Storage> Page for SettingsListPage<'_, S> {
    fn render(&self, view: &mut dyn View) {
        let settings = &self.store.document().settings;
        let items: Vec<ListItem> = settings
            .iter()
            .map(|s| {
                ListItem::new(s.id.clone(), s.title.clone())
                    .href(Route::SettingEdit { id: Some(s.id.clone()) }.href())
                    .badge(s.status.as_str())
                    .active(s.status.is_active())
            })
            .collect();
        view.set_empty_state(ListKind::Settings, items.is_empty());
        view.render_list(ListKind::Settings, &items);
    }

    fn handle(&mut self, intent: Intent, view: &mut dyn View) -> Result<Outcome> {
        match intent {
            Intent::RemoveItem(id) => {
                self.remove_setting(&id)?;
                self.render(view);
                Ok(Outcome::Stay)
            }
            Intent::CreateItem => Ok(Outcome::Navigate(Route::SettingEdit { id: None })),
            other => Err(AppError::UnsupportedIntent(format!(
                "{} on the settings list",
                other.name()
            ))),
        }
    }
}
