use crate::app::domain::{EntityId, Identified};

/// Remove the entry with `id` from `items`, keeping the order of the rest.
///
/// Returns false and leaves `items` untouched if nothing matches. Children
/// owned by the removed entry go with it. Persisting is up to the caller.
pub fn remove<T: Identified>(items: &mut Vec<T>, id: &EntityId) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::{Formula, Setting};

    fn formula(id: &str, title: &str) -> Formula {
        let mut f = Formula::new(EntityId::new(id));
        f.title = title.to_string();
        f
    }

    #[test]
    fn test_remove_formula_by_id() {
        let mut formulas = vec![formula("1", "A"), formula("2", "B")];
        assert!(remove(&mut formulas, &EntityId::new("1")));
        assert_eq!(formulas, vec![formula("2", "B")]);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut formulas = vec![formula("1", "A"), formula("2", "B")];
        remove(&mut formulas, &EntityId::new("1"));
        let once = formulas.clone();

        assert!(!remove(&mut formulas, &EntityId::new("1")));
        assert_eq!(formulas, once);
    }

    #[test]
    fn test_missing_id_leaves_list_untouched() {
        let mut formulas = vec![formula("1", "A"), formula("2", "B")];
        assert!(!remove(&mut formulas, &EntityId::new("9")));
        assert_eq!(formulas.len(), 2);
        assert_eq!(formulas[1].title, "B");
    }

    #[test]
    fn test_remove_setting_drops_its_formulas() {
        let mut parent = Setting::new(EntityId::new("s1"));
        parent.formulas.push(formula("f1", "A"));
        let mut settings = vec![parent, Setting::new(EntityId::new("s2"))];

        assert!(remove(&mut settings, &EntityId::new("s1")));
        assert_eq!(settings.len(), 1);
        assert!(settings.iter().all(|s| s.formulas.is_empty()));
    }
}
