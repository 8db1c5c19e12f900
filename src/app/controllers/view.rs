use crate::app::domain::{EntityId, ListKind};

/// Single-value fields a page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    SettingTitle,
    SettingStatus,
    FormulaTitle,
    FormulaCurrency,
    FormulaExpression,
    FormulaFrequency,
    /// Number of selected collections
    SelectedCollections,
    /// Number of selected products and variants
    SelectedProducts,
}

/// One rendered row of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: EntityId,
    pub title: String,
    pub href: Option<String>,
    pub badge: Option<String>,
    /// Active status badge, or checked for selectable rows
    pub active: bool,
    /// 0 for top-level rows, 1 for nested rows such as variants
    pub depth: u8,
}

impl ListItem {
    pub fn new(id: EntityId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            href: None,
            badge: None,
            active: false,
            depth: 0,
        }
    }

    pub fn href(mut self, href: String) -> Self {
        self.href = Some(href);
        self
    }

    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }
}

/// Whatever draws pages. Pages only ever talk to it through these calls.
pub trait View {
    /// Replace the contents of a list.
    fn render_list(&mut self, list: ListKind, items: &[ListItem]);

    fn render_field(&mut self, field: FieldKind, value: &str);

    /// Show or hide the placeholder for an empty list.
    fn set_empty_state(&mut self, _list: ListKind, _empty: bool) {}

    /// Enable save/discard while there are unsaved edits.
    fn set_controls_enabled(&mut self, _enabled: bool) {}
}
