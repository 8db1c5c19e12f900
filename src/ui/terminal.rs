use std::io::{self, Write};

use crate::app::controllers::view::{FieldKind, ListItem, View};
use crate::app::domain::ListKind;

/// Plain-text view for the command line.
///
/// Pages may render the same field or list several times while handling
/// intents; only the latest render of each is kept, in first-render order.
#[derive(Debug, Default)]
pub struct TerminalView {
    fields: Vec<(FieldKind, String)>,
    lists: Vec<(ListKind, Vec<ListItem>)>,
    empty: Vec<ListKind>,
    unsaved: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (field, value) in &self.fields {
            writeln!(out, "{}: {}", field_label(*field), value)?;
        }
        for (list, items) in &self.lists {
            writeln!(out, "{}:", list_label(*list))?;
            if items.is_empty() {
                let placeholder = if self.empty.contains(list) {
                    "(none yet)"
                } else {
                    "(no matches)"
                };
                writeln!(out, "  {placeholder}")?;
            }
            for item in items {
                writeln!(out, "{}", format_row(*list, item))?;
            }
        }
        if self.unsaved {
            writeln!(out, "(unsaved changes)")?;
        }
        Ok(())
    }
}

impl View for TerminalView {
    fn render_list(&mut self, list: ListKind, items: &[ListItem]) {
        match self.lists.iter_mut().find(|(kind, _)| *kind == list) {
            Some((_, rows)) => *rows = items.to_vec(),
            None => self.lists.push((list, items.to_vec())),
        }
    }

    fn render_field(&mut self, field: FieldKind, value: &str) {
        match self.fields.iter_mut().find(|(kind, _)| *kind == field) {
            Some((_, current)) => *current = value.to_string(),
            None => self.fields.push((field, value.to_string())),
        }
    }

    fn set_empty_state(&mut self, list: ListKind, empty: bool) {
        self.empty.retain(|kind| *kind != list);
        if empty {
            self.empty.push(list);
        }
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.unsaved = enabled;
    }
}

fn field_label(field: FieldKind) -> &'static str {
    match field {
        FieldKind::SettingTitle => "title",
        FieldKind::SettingStatus => "status",
        FieldKind::FormulaTitle => "title",
        FieldKind::FormulaCurrency => "currency",
        FieldKind::FormulaExpression => "formula",
        FieldKind::FormulaFrequency => "frequency",
        FieldKind::SelectedCollections => "selected collections",
        FieldKind::SelectedProducts => "selected products",
    }
}

fn list_label(list: ListKind) -> &'static str {
    match list {
        ListKind::Settings => "settings",
        ListKind::Formulas => "formulas",
        ListKind::Currencies => "currencies",
        ListKind::Collections => "collections",
        ListKind::Products => "products",
    }
}

fn format_row(list: ListKind, item: &ListItem) -> String {
    let indent = "  ".repeat(usize::from(item.depth) + 1);
    let marker = match list {
        ListKind::Settings | ListKind::Formulas => "-",
        _ if item.active => "[x]",
        _ => "[ ]",
    };
    let mut row = format!("{indent}{marker} {} {}", item.id, item.title);
    if let Some(badge) = &item.badge {
        row.push_str(&format!(" ({badge})"));
    }
    if let Some(href) = &item.href {
        row.push_str(&format!("  {href}"));
    }
    row
}
