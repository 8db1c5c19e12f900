use super::document::TargetRef;
use super::ids::EntityId;

/// Lists a page can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Settings,
    Formulas,
    Currencies,
    Collections,
    Products,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingField {
    Title(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormulaField {
    Title(String),
    Currency(String),
    Expression(String),
    Frequency(u64),
    Collections(Vec<EntityId>),
    Products(Vec<TargetRef>),
    ToggleCollection(EntityId),
    ToggleProduct(TargetRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Setting(SettingField),
    Formula(FormulaField),
}

/// Everything a user can ask a page to do.
/// The view layer turns clicks and input events into one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    EditField(FieldEdit),
    Save,
    Discard,
    RemoveItem(EntityId),
    ToggleStatus,
    CreateItem,
    Search { list: ListKind, query: String },
    SelectAll(ListKind),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::EditField(_) => "edit-field",
            Intent::Save => "save",
            Intent::Discard => "discard",
            Intent::RemoveItem(_) => "remove-item",
            Intent::ToggleStatus => "toggle-status",
            Intent::CreateItem => "create-item",
            Intent::Search { .. } => "search",
            Intent::SelectAll(_) => "select-all",
        }
    }
}
