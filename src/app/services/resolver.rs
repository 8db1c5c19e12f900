//! Finds the entity a page is about, creating it on first visit.
//!
//! A missing id means "create": a fresh entity with default fields is
//! appended and persisted immediately, so every id-less visit creates a new
//! one. A present id must match exactly; there is no fallback creation for
//! ids that are not in the document.

use crate::app::domain::{Document, EntityId, EntityKind, Formula, Setting};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::storage::Storage;
use crate::app::services::state_store::StateStore;

pub fn resolve_setting<S: Storage>(
    store: &mut StateStore<S>,
    id: Option<&EntityId>,
) -> Result<Setting> {
    if let Some(id) = id {
        return store
            .document()
            .setting(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(EntityKind::Setting, id));
    }

    let setting = Setting::new(store.next_id());
    store.document_mut().settings.push(setting.clone());
    store.persist()?;
    tracing::info!(setting = %setting.id, "created setting");
    Ok(setting)
}

pub fn resolve_formula<S: Storage>(
    store: &mut StateStore<S>,
    setting_id: &EntityId,
    id: Option<&EntityId>,
) -> Result<Formula> {
    let setting = store
        .document()
        .setting(setting_id)
        .ok_or_else(|| AppError::not_found(EntityKind::Setting, setting_id))?;

    if let Some(id) = id {
        return setting
            .formula(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(EntityKind::Formula, id));
    }

    let formula = Formula::new(store.next_id());
    store
        .document_mut()
        .setting_mut(setting_id)
        .ok_or_else(|| AppError::not_found(EntityKind::Setting, setting_id))?
        .formulas
        .push(formula.clone());
    store.persist()?;
    tracing::info!(setting = %setting_id, formula = %formula.id, "created formula");
    Ok(formula)
}

/// Id of the setting owning `formula_id`, for formula links without a
/// `settingId` parameter.
pub fn find_formula_owner(doc: &Document, formula_id: &EntityId) -> Result<EntityId> {
    doc.formula_owner(formula_id)
        .map(|s| s.id.clone())
        .ok_or_else(|| AppError::not_found(EntityKind::Formula, formula_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::{SequentialIds, Status};
    use crate::app::infrastructure::storage::MemoryStorage;
    use crate::app::services::state_store::STATE_KEY;

    const EMPTY: &str = r#"{"settings": [], "currencies": {}, "collections": [], "products": []}"#;

    fn store_with(snapshot: &str) -> StateStore<MemoryStorage> {
        StateStore::load(MemoryStorage::new(), Some(snapshot))
            .unwrap()
            .with_id_source(SequentialIds::starting_at(100))
    }

    fn persisted(store: &StateStore<MemoryStorage>) -> Document {
        let raw = store.storage().get_item(STATE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_resolve_existing_setting() {
        let snapshot = r#"{"settings": [
            {"id": 1, "title": "One", "status": "active", "formulas": []},
            {"id": 2, "title": "Two", "status": "draft", "formulas": []}
        ]}"#;
        let mut store = store_with(snapshot);
        let writes = store.storage().writes();

        let setting = resolve_setting(&mut store, Some(&EntityId::new("2"))).unwrap();
        assert_eq!(setting.title, "Two");
        assert_eq!(store.storage().writes(), writes);
    }

    #[test]
    fn test_create_on_visit_with_empty_document() {
        let mut store = store_with(EMPTY);
        let setting = resolve_setting(&mut store, None).unwrap();

        assert_eq!(setting.status, Status::Draft);
        assert!(setting.formulas.is_empty());
        assert_eq!(store.document().settings.len(), 1);
        assert_eq!(persisted(&store).settings, vec![setting]);
    }

    #[test]
    fn test_each_visit_without_id_creates_new_setting() {
        let mut store = store_with(EMPTY);
        let first = resolve_setting(&mut store, None).unwrap();
        let second = resolve_setting(&mut store, None).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(persisted(&store).settings.len(), 2);
    }

    #[test]
    fn test_unknown_setting_id_is_not_found() {
        let mut store = store_with(EMPTY);
        let result = resolve_setting(&mut store, Some(&EntityId::new("404")));
        assert!(matches!(
            result,
            Err(AppError::EntityNotFound { kind: EntityKind::Setting, .. })
        ));
        assert!(store.document().settings.is_empty());
    }

    #[test]
    fn test_resolved_setting_is_a_copy() {
        let snapshot = r#"{"settings": [{"id": 1, "title": "One", "formulas": [{"id": 7}]}]}"#;
        let mut store = store_with(snapshot);
        let mut setting = resolve_setting(&mut store, Some(&EntityId::new("1"))).unwrap();
        setting.formulas.clear();
        assert_eq!(store.document().settings[0].formulas.len(), 1);
    }

    #[test]
    fn test_resolve_and_create_formula() {
        let snapshot = r#"{"settings": [{"id": 1, "formulas": [{"id": 7, "title": "Seven"}]}]}"#;
        let mut store = store_with(snapshot);
        let setting_id = EntityId::new("1");

        let existing = resolve_formula(&mut store, &setting_id, Some(&EntityId::new("7"))).unwrap();
        assert_eq!(existing.title, "Seven");

        let created = resolve_formula(&mut store, &setting_id, None).unwrap();
        assert_eq!(created.frequency, 1000);
        assert_eq!(created.currency, "BTC");
        assert_eq!(persisted(&store).settings[0].formulas.len(), 2);
    }

    #[test]
    fn test_formula_with_foreign_id_is_not_found() {
        let snapshot = r#"{"settings": [
            {"id": 1, "formulas": [{"id": 7}]},
            {"id": 2, "formulas": [{"id": 8}]}
        ]}"#;
        let mut store = store_with(snapshot);
        let result = resolve_formula(&mut store, &EntityId::new("1"), Some(&EntityId::new("8")));
        assert!(matches!(
            result,
            Err(AppError::EntityNotFound { kind: EntityKind::Formula, .. })
        ));
    }

    #[test]
    fn test_formula_in_missing_setting_is_not_found() {
        let mut store = store_with(EMPTY);
        let result = resolve_formula(&mut store, &EntityId::new("1"), None);
        assert!(matches!(
            result,
            Err(AppError::EntityNotFound { kind: EntityKind::Setting, .. })
        ));
    }

    #[test]
    fn test_find_formula_owner() {
        let snapshot = r#"{"settings": [
            {"id": 1, "formulas": [{"id": 7}]},
            {"id": 2, "formulas": [{"id": 8}]}
        ]}"#;
        let store = store_with(snapshot);
        let owner = find_formula_owner(store.document(), &EntityId::new("8")).unwrap();
        assert_eq!(owner, EntityId::new("2"));
        assert!(find_formula_owner(store.document(), &EntityId::new("9")).is_err());
    }
}
