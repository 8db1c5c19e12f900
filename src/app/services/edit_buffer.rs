//! Working copy / saved copy pair for the entity open in a page.

use crate::app::domain::{
    Document, EntityId, EntityKind, Formula, FormulaField, Identified, Setting, SettingField,
};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::storage::Storage;
use crate::app::services::state_store::StateStore;

/// An entity that can be edited field by field and written back into the
/// document.
pub trait Editable: Identified + Clone + PartialEq {
    type Field;

    const KIND: EntityKind;

    /// Apply one edit. `Ok(false)` means the edit was ignored.
    fn apply(&mut self, field: Self::Field) -> Result<bool>;

    /// The slot in `doc` this entity is stored in. `owner` is the id of the
    /// parent for nested entities.
    fn slot_mut<'d>(doc: &'d mut Document, owner: Option<&EntityId>, id: &EntityId)
    -> Option<&'d mut Self>;
}

impl Editable for Setting {
    type Field = SettingField;

    const KIND: EntityKind = EntityKind::Setting;

    fn apply(&mut self, field: SettingField) -> Result<bool> {
        match field {
            SettingField::Title(title) => {
                if title.is_empty() {
                    return Ok(false);
                }
                self.title = title;
            }
        }
        Ok(true)
    }

    fn slot_mut<'d>(
        doc: &'d mut Document,
        _owner: Option<&EntityId>,
        id: &EntityId,
    ) -> Option<&'d mut Self> {
        doc.setting_mut(id)
    }
}

impl Editable for Formula {
    type Field = FormulaField;

    const KIND: EntityKind = EntityKind::Formula;

    fn apply(&mut self, field: FormulaField) -> Result<bool> {
        match field {
            FormulaField::Title(title) => {
                if title.is_empty() {
                    return Ok(false);
                }
                self.title = title;
            }
            FormulaField::Currency(code) => {
                let code = code.trim();
                if code.is_empty() {
                    return Ok(false);
                }
                self.currency = code.to_string();
            }
            FormulaField::Expression(expression) => self.formula = expression,
            FormulaField::Frequency(0) => {
                return Err(AppError::InvalidField(
                    "frequency must be at least 1".to_string(),
                ));
            }
            FormulaField::Frequency(frequency) => self.frequency = frequency,
            FormulaField::Collections(ids) => self.targets.set_collections(ids),
            FormulaField::Products(refs) => self.targets.set_products(refs),
            FormulaField::ToggleCollection(id) => {
                self.targets.toggle_collection(id);
            }
            FormulaField::ToggleProduct(target) => {
                self.targets.toggle_product(target);
            }
        }
        Ok(true)
    }

    fn slot_mut<'d>(
        doc: &'d mut Document,
        owner: Option<&EntityId>,
        id: &EntityId,
    ) -> Option<&'d mut Self> {
        doc.setting_mut(owner?)?.formula_mut(id)
    }
}

#[derive(Debug, Clone)]
pub struct EditBuffer<T: Editable> {
    saved: T,
    current: T,
    owner: Option<EntityId>,
    dirty: bool,
}

impl<T: Editable> EditBuffer<T> {
    pub fn init(entity: T) -> Self {
        Self {
            saved: entity.clone(),
            current: entity,
            owner: None,
            dirty: false,
        }
    }

    /// Buffer for an entity nested under the parent `owner`.
    pub fn init_owned(entity: T, owner: EntityId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::init(entity)
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn saved(&self) -> &T {
        &self.saved
    }

    pub fn owner(&self) -> Option<&EntityId> {
        self.owner.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Edit the working copy only. Returns whether the edit was applied.
    pub fn set_field(&mut self, field: T::Field) -> Result<bool> {
        let applied = self.current.apply(field)?;
        if applied {
            self.dirty = true;
        }
        Ok(applied)
    }

    /// Drop unsaved edits.
    pub fn discard(&mut self) {
        self.current = self.saved.clone();
        self.dirty = false;
    }

    /// Write the working copy into the document, make it the new baseline
    /// and persist.
    pub fn save<S: Storage>(&mut self, store: &mut StateStore<S>) -> Result<()> {
        let id = self.current.id().clone();
        let slot = T::slot_mut(store.document_mut(), self.owner.as_ref(), &id)
            .ok_or_else(|| AppError::not_found(T::KIND, &id))?;
        *slot = self.current.clone();

        self.saved = self.current.clone();
        self.dirty = false;
        store.persist()?;
        let kind = T::KIND;
        tracing::info!(%kind, %id, "saved");
        Ok(())
    }

    /// Apply a change that was already committed to the document to both
    /// copies, so neither save nor discard undoes it.
    pub fn sync_committed(&mut self, change: impl Fn(&mut T)) {
        change(&mut self.current);
        change(&mut self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::{SequentialIds, Status};
    use crate::app::infrastructure::storage::MemoryStorage;
    use crate::app::services::resolver::{resolve_formula, resolve_setting};
    use crate::app::services::state_store::STATE_KEY;

    const SNAPSHOT: &str = r#"{"settings": [{"id": 1, "title": "One", "status": "draft",
        "formulas": [{"id": 7, "title": "Seven", "frequency": 1000,
                      "targets": {"collectionsIds": ["c1"], "products": []}}]}]}"#;

    fn store() -> StateStore<MemoryStorage> {
        StateStore::load(MemoryStorage::new(), Some(SNAPSHOT))
            .unwrap()
            .with_id_source(SequentialIds::starting_at(100))
    }

    fn formula_buffer(store: &mut StateStore<MemoryStorage>) -> EditBuffer<Formula> {
        let setting_id = EntityId::new("1");
        let formula = resolve_formula(store, &setting_id, Some(&EntityId::new("7"))).unwrap();
        EditBuffer::init_owned(formula, setting_id)
    }

    fn persisted(store: &StateStore<MemoryStorage>) -> Document {
        let raw = store.storage().get_item(STATE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_frequency_edit_then_discard() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);

        buffer.set_field(FormulaField::Frequency(5000)).unwrap();
        assert_eq!(buffer.current().frequency, 5000);
        assert!(buffer.is_dirty());

        buffer.discard();
        assert_eq!(buffer.current().frequency, 1000);
        assert_eq!(buffer.current(), buffer.saved());
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_discard_after_many_edits_restores_saved() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);
        let baseline = buffer.saved().clone();

        buffer.set_field(FormulaField::Title("Margin".to_string())).unwrap();
        buffer.set_field(FormulaField::Currency("ETH".to_string())).unwrap();
        buffer.set_field(FormulaField::Expression("X + 1".to_string())).unwrap();
        buffer.set_field(FormulaField::ToggleCollection(EntityId::new("c2"))).unwrap();
        buffer.set_field(FormulaField::ToggleProduct(EntityId::new("p1"))).unwrap();
        buffer.discard();

        assert_eq!(*buffer.current(), baseline);
    }

    #[test]
    fn test_nested_edits_do_not_leak_into_saved() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);

        buffer.set_field(FormulaField::ToggleCollection(EntityId::new("c1"))).unwrap();
        assert!(buffer.current().targets.collections_ids.is_empty());
        assert_eq!(buffer.saved().targets.collections_ids, vec![EntityId::new("c1")]);
    }

    #[test]
    fn test_save_commits_and_persists() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);

        buffer.set_field(FormulaField::Frequency(250)).unwrap();
        buffer.save(&mut store).unwrap();

        assert!(!buffer.is_dirty());
        assert_eq!(buffer.saved().frequency, 250);
        let doc = persisted(&store);
        assert_eq!(doc.settings[0].formulas[0].frequency, 250);
        assert_eq!(store.document().settings[0].formulas[0], *buffer.current());
    }

    #[test]
    fn test_save_is_idempotent() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);
        buffer.set_field(FormulaField::Title("Once".to_string())).unwrap();

        buffer.save(&mut store).unwrap();
        let first = store.storage().get_item(STATE_KEY).unwrap();
        let saved = buffer.saved().clone();

        buffer.save(&mut store).unwrap();
        assert_eq!(store.storage().get_item(STATE_KEY).unwrap(), first);
        assert_eq!(*buffer.saved(), saved);
        assert_eq!(*buffer.current(), saved);
    }

    #[test]
    fn test_empty_title_is_ignored() {
        let mut store = store();
        let setting = resolve_setting(&mut store, Some(&EntityId::new("1"))).unwrap();
        let mut buffer = EditBuffer::init(setting);

        assert!(!buffer.set_field(SettingField::Title(String::new())).unwrap());
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.current().title, "One");
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);
        let result = buffer.set_field(FormulaField::Frequency(0));
        assert!(matches!(result, Err(AppError::InvalidField(_))));
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.current().frequency, 1000);
    }

    #[test]
    fn test_blank_currency_ignored_and_code_trimmed() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);
        assert!(!buffer.set_field(FormulaField::Currency("  ".to_string())).unwrap());
        assert!(buffer.set_field(FormulaField::Currency(" ETH ".to_string())).unwrap());
        assert_eq!(buffer.current().currency, "ETH");
    }

    #[test]
    fn test_save_of_removed_entity_fails() {
        let mut store = store();
        let mut buffer = formula_buffer(&mut store);
        store.document_mut().settings[0].formulas.clear();

        let result = buffer.save(&mut store);
        assert!(matches!(
            result,
            Err(AppError::EntityNotFound { kind: EntityKind::Formula, .. })
        ));
    }

    #[test]
    fn test_sync_committed_survives_discard() {
        let mut store = store();
        let setting = resolve_setting(&mut store, Some(&EntityId::new("1"))).unwrap();
        let mut buffer = EditBuffer::init(setting);

        buffer.set_field(SettingField::Title("Pending".to_string())).unwrap();
        buffer.sync_committed(|s| s.status = Status::Active);
        buffer.discard();

        assert_eq!(buffer.current().status, Status::Active);
        assert_eq!(buffer.current().title, "One");
    }
}
