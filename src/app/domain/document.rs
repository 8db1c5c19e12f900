use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::EntityId;
use crate::app::infrastructure::error::{AppError, Result};

/// Opaque reference to a product or one of its variants.
pub type TargetRef = EntityId;

/// Anything that lives in an ordered list and is addressed by id.
pub trait Identified {
    fn id(&self) -> &EntityId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Setting,
    Formula,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Setting => f.write_str("Setting"),
            EntityKind::Formula => f.write_str("Formula"),
        }
    }
}

/// The whole persisted state: settings plus the read-only catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub settings: Vec<Setting>,

    /// Currency code to metadata. The metadata is never interpreted here.
    #[serde(default)]
    pub currencies: BTreeMap<String, Value>,

    #[serde(default)]
    pub collections: Vec<Collection>,

    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn setting(&self, id: &EntityId) -> Option<&Setting> {
        self.settings.iter().find(|s| &s.id == id)
    }

    pub fn setting_mut(&mut self, id: &EntityId) -> Option<&mut Setting> {
        self.settings.iter_mut().find(|s| &s.id == id)
    }

    /// Setting that owns the formula with the given id.
    pub fn formula_owner(&self, formula_id: &EntityId) -> Option<&Setting> {
        self.settings
            .iter()
            .find(|s| s.formula(formula_id).is_some())
    }

    /// True if any setting or formula already uses this id.
    pub fn id_in_use(&self, id: &EntityId) -> bool {
        self.settings
            .iter()
            .any(|s| &s.id == id || s.formula(id).is_some())
    }

    /// Checks the invariants a parsed document must satisfy.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for setting in &self.settings {
            if !seen.insert(&setting.id) {
                return Err(AppError::CorruptState(format!(
                    "duplicate setting id {}",
                    setting.id
                )));
            }
            let mut formulas = HashSet::new();
            for formula in &setting.formulas {
                if !formulas.insert(&formula.id) {
                    return Err(AppError::CorruptState(format!(
                        "duplicate formula id {} in setting {}",
                        formula.id, setting.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Active,
}

impl Status {
    pub fn toggled(self) -> Self {
        match self {
            Status::Draft => Status::Active,
            Status::Active => Status::Draft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Active => "active",
        }
    }

    pub fn is_active(&self) -> bool {
        *self == Status::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: EntityId,

    #[serde(default = "default_setting_title")]
    pub title: String,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub formulas: Vec<Formula>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_setting_title() -> String {
    "Setting title".to_string()
}

impl Setting {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            title: default_setting_title(),
            status: Status::default(),
            formulas: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn formula(&self, id: &EntityId) -> Option<&Formula> {
        self.formulas.iter().find(|f| &f.id == id)
    }

    pub fn formula_mut(&mut self, id: &EntityId) -> Option<&mut Formula> {
        self.formulas.iter_mut().find(|f| &f.id == id)
    }
}

impl Identified for Setting {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    pub id: EntityId,

    #[serde(default = "default_formula_title")]
    pub title: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Expression text. Stored verbatim, never evaluated.
    #[serde(default = "default_expression")]
    pub formula: String,

    #[serde(default = "default_frequency")]
    pub frequency: u64,

    #[serde(default)]
    pub targets: Targets,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_formula_title() -> String {
    "Formula name".to_string()
}

fn default_currency() -> String {
    "BTC".to_string()
}

fn default_expression() -> String {
    "X * Y".to_string()
}

fn default_frequency() -> u64 {
    1000
}

impl Formula {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            title: default_formula_title(),
            currency: default_currency(),
            formula: default_expression(),
            frequency: default_frequency(),
            targets: Targets::default(),
            extra: Map::new(),
        }
    }
}

impl Identified for Formula {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// What a formula applies to. Both lists behave as sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Targets {
    #[serde(default)]
    pub collections_ids: Vec<EntityId>,

    #[serde(default)]
    pub products: Vec<TargetRef>,
}

impl Targets {
    pub fn set_collections(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.collections_ids = dedup(ids);
    }

    pub fn set_products(&mut self, refs: impl IntoIterator<Item = TargetRef>) {
        self.products = dedup(refs);
    }

    /// Adds the collection if absent, removes it otherwise. Returns true if
    /// it is selected afterwards.
    pub fn toggle_collection(&mut self, id: EntityId) -> bool {
        toggle(&mut self.collections_ids, id)
    }

    pub fn toggle_product(&mut self, target: TargetRef) -> bool {
        toggle(&mut self.products, target)
    }

    pub fn has_collection(&self, id: &EntityId) -> bool {
        self.collections_ids.contains(id)
    }

    pub fn has_product(&self, target: &TargetRef) -> bool {
        self.products.contains(target)
    }
}

fn dedup(ids: impl IntoIterator<Item = EntityId>) -> Vec<EntityId> {
    let mut out: Vec<EntityId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn toggle(ids: &mut Vec<EntityId>, id: EntityId) -> bool {
    if let Some(pos) = ids.iter().position(|x| *x == id) {
        ids.remove(pos);
        false
    } else {
        ids.push(id);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: EntityId,

    #[serde(default)]
    pub title: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

impl Identified for Collection {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            variants: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants = variants;
        self
    }
}

impl Identified for Product {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: EntityId,

    #[serde(default)]
    pub title: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Variant {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

impl Identified for Variant {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_defaults() {
        let formula = Formula::new(EntityId::new("1"));
        assert_eq!(formula.title, "Formula name");
        assert_eq!(formula.currency, "BTC");
        assert_eq!(formula.formula, "X * Y");
        assert_eq!(formula.frequency, 1000);
        assert!(formula.targets.collections_ids.is_empty());
        assert!(formula.targets.products.is_empty());
    }

    #[test]
    fn test_setting_defaults() {
        let setting = Setting::new(EntityId::new("1"));
        assert_eq!(setting.title, "Setting title");
        assert_eq!(setting.status, Status::Draft);
        assert!(setting.formulas.is_empty());
    }

    #[test]
    fn test_partial_formula_uses_defaults() {
        let json = r#"{"id": 5, "title": "Margin"}"#;
        let formula: Formula = serde_json::from_str(json).unwrap();
        assert_eq!(formula.id, EntityId::new("5"));
        assert_eq!(formula.title, "Margin");
        assert_eq!(formula.frequency, 1000);
        assert_eq!(formula.currency, "BTC");
    }

    #[test]
    fn test_targets_use_camel_case() {
        let mut targets = Targets::default();
        targets.toggle_collection(EntityId::new("c1"));
        let json = serde_json::to_string(&targets).unwrap();
        assert!(json.contains("\"collectionsIds\":[\"c1\"]"));
        assert!(json.contains("\"products\":[]"));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::Active).unwrap(), "\"active\"");
        let status: Status = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(status, Status::Draft);
        assert_eq!(Status::Draft.toggled(), Status::Active);
        assert_eq!(Status::Active.toggled(), Status::Draft);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r#"{
            "settings": [{"id": 1, "title": "S", "status": "active", "formulas": [], "owner": "ops"}],
            "currencies": {"BTC": {"name": "Bitcoin"}},
            "collections": [{"id": "c1", "title": "Shoes", "handle": "shoes"}],
            "products": [],
            "version": 3
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.extra.get("version"), Some(&Value::from(3)));
        assert_eq!(doc.settings[0].extra.get("owner"), Some(&Value::from("ops")));

        let reparsed: Document =
            serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(doc, reparsed);
        assert_eq!(reparsed.collections[0].extra.get("handle"), Some(&Value::from("shoes")));
    }

    #[test]
    fn test_validate_rejects_duplicate_setting_ids() {
        let mut doc = Document::default();
        doc.settings.push(Setting::new(EntityId::new("1")));
        assert!(doc.validate().is_ok());
        doc.settings.push(Setting::new(EntityId::new("1")));
        assert!(matches!(doc.validate(), Err(AppError::CorruptState(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_formula_ids() {
        let json = r#"{"settings": [{"id": 1, "formulas": [
            {"id": 7, "title": "A"}, {"id": "7", "title": "B"}]}]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(matches!(doc.validate(), Err(AppError::CorruptState(_))));
    }

    #[test]
    fn test_same_formula_id_in_two_settings_is_allowed() {
        let mut doc = Document::default();
        for id in ["1", "2"] {
            let mut setting = Setting::new(EntityId::new(id));
            setting.formulas.push(Formula::new(EntityId::new("7")));
            doc.settings.push(setting);
        }
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_formula_owner_lookup() {
        let mut doc = Document::default();
        let mut setting = Setting::new(EntityId::new("s1"));
        setting.formulas.push(Formula::new(EntityId::new("f1")));
        doc.settings.push(Setting::new(EntityId::new("s0")));
        doc.settings.push(setting);

        let owner = doc.formula_owner(&EntityId::new("f1")).unwrap();
        assert_eq!(owner.id, EntityId::new("s1"));
        assert!(doc.formula_owner(&EntityId::new("f9")).is_none());
        assert!(doc.id_in_use(&EntityId::new("f1")));
        assert!(doc.id_in_use(&EntityId::new("s0")));
    }

    #[test]
    fn test_target_toggle_and_dedup() {
        let mut targets = Targets::default();
        assert!(targets.toggle_product(EntityId::new("p1")));
        assert!(targets.has_product(&EntityId::new("p1")));
        assert!(!targets.toggle_product(EntityId::new("p1")));
        assert!(targets.products.is_empty());

        targets.set_collections(vec![
            EntityId::new("a"),
            EntityId::new("b"),
            EntityId::new("a"),
        ]);
        assert_eq!(targets.collections_ids, vec![EntityId::new("a"), EntityId::new("b")]);
    }
}
