use super::view::{FieldKind, ListItem, View};
use super::{Outcome, Page};
use crate::app::domain::{EntityId, EntityKind, FieldEdit, Intent, ListKind, Setting};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::storage::Storage;
use crate::app::services::edit_buffer::EditBuffer;
use crate::app::services::list_mutator;
use crate::app::services::navigation::Route;
use crate::app::services::resolver;
use crate::app::services::state_store::StateStore;

/// Edit page of one setting.
///
/// The title goes through the edit buffer (save/discard). Status toggles and
/// formula removal are committed to the document at once.
pub struct SettingEditPage<'s, S: Storage> {
    store: &'s mut StateStore<S>,
    buffer: EditBuffer<Setting>,
}

impl<'s, S: Storage> SettingEditPage<'s, S> {
    /// Opens the setting with `id`, or creates one when `id` is `None`.
    pub fn open(store: &'s mut StateStore<S>, id: Option<&EntityId>) -> Result<Self> {
        let setting = resolver::resolve_setting(store, id)?;
        Ok(Self {
            store,
            buffer: EditBuffer::init(setting),
        })
    }

    pub fn buffer(&self) -> &EditBuffer<Setting> {
        &self.buffer
    }

    pub fn setting_id(&self) -> &EntityId {
        &self.buffer.current().id
    }

    fn toggle_status(&mut self) -> Result<()> {
        let id = self.setting_id().clone();
        let setting = self
            .store
            .document_mut()
            .setting_mut(&id)
            .ok_or_else(|| AppError::not_found(EntityKind::Setting, &id))?;
        let status = setting.status.toggled();
        setting.status = status;
        self.store.persist()?;

        self.buffer.sync_committed(|s| s.status = status);
        tracing::info!(setting = %id, status = status.as_str(), "toggled status");
        Ok(())
    }

    fn remove_formula(&mut self, formula_id: &EntityId) -> Result<()> {
        let id = self.setting_id().clone();
        let setting = self
            .store
            .document_mut()
            .setting_mut(&id)
            .ok_or_else(|| AppError::not_found(EntityKind::Setting, &id))?;
        if list_mutator::remove(&mut setting.formulas, formula_id) {
            self.store.persist()?;
            tracing::info!(setting = %id, formula = %formula_id, "removed formula");
        }
        self.buffer.sync_committed(|s| {
            list_mutator::remove(&mut s.formulas, formula_id);
        });
        Ok(())
    }

    fn render_formulas(&self, view: &mut dyn View) {
        let setting = self.buffer.current();
        let items: Vec<ListItem> = setting
            .formulas
            .iter()
            .map(|f| {
                let route = Route::FormulaEdit {
                    id: Some(f.id.clone()),
                    setting_id: Some(setting.id.clone()),
                };
                ListItem::new(f.id.clone(), f.title.clone()).href(route.href())
            })
            .collect();
        view.set_empty_state(ListKind::Formulas, items.is_empty());
        view.render_list(ListKind::Formulas, &items);
    }
}

impl<S: Storage> Page for SettingEditPage<'_, S> {
    fn render(&self, view: &mut dyn View) {
        let setting = self.buffer.current();
        view.render_field(FieldKind::SettingTitle, &setting.title);
        view.render_field(FieldKind::SettingStatus, setting.status.as_str());
        self.render_formulas(view);
        view.set_controls_enabled(self.buffer.is_dirty());
    }

    fn handle(&mut self, intent: Intent, view: &mut dyn View) -> Result<Outcome> {
        match intent {
            Intent::EditField(FieldEdit::Setting(field)) => {
                self.buffer.set_field(field)?;
                view.set_controls_enabled(self.buffer.is_dirty());
            }
            Intent::Save => {
                self.buffer.save(self.store)?;
                view.set_controls_enabled(false);
            }
            Intent::Discard => {
                self.buffer.discard();
                self.render(view);
            }
            Intent::ToggleStatus => {
                self.toggle_status()?;
                view.render_field(FieldKind::SettingStatus, self.buffer.current().status.as_str());
            }
            Intent::RemoveItem(formula_id) => {
                self.remove_formula(&formula_id)?;
                self.render_formulas(view);
            }
            Intent::CreateItem => {
                return Ok(Outcome::Navigate(Route::FormulaEdit {
                    id: None,
                    setting_id: Some(self.setting_id().clone()),
                }));
            }
            other => {
                return Err(AppError::UnsupportedIntent(format!(
                    "{} on the setting page",
                    other.name()
                )));
            }
        }
        Ok(Outcome::Stay)
    }
}
