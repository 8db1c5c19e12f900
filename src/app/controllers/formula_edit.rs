use super::view::{FieldKind, ListItem, View};
use super::{Outcome, Page};
use crate::app::domain::{EntityId, FieldEdit, Formula, FormulaField, Intent, ListKind};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::storage::Storage;
use crate::app::services::catalog;
use crate::app::services::edit_buffer::EditBuffer;
use crate::app::services::resolver;
use crate::app::services::state_store::StateStore;

#[derive(Debug, Default)]
struct SearchQueries {
    currencies: String,
    collections: String,
    products: String,
}

/// Edit page of one formula plus the catalog pickers for its currency and
/// targets.
pub struct FormulaEditPage<'s, S: Storage> {
    store: &'s mut StateStore<S>,
    buffer: EditBuffer<Formula>,
    queries: SearchQueries,
}

impl<'s, S: Storage> FormulaEditPage<'s, S> {
    /// Opens formula `id` of setting `setting_id`.
    ///
    /// Without `id` a new formula is created in the setting. Without
    /// `setting_id` the owner is looked up from `id`.
    pub fn open(
        store: &'s mut StateStore<S>,
        setting_id: Option<&EntityId>,
        id: Option<&EntityId>,
    ) -> Result<Self> {
        let owner = match (setting_id, id) {
            (Some(setting_id), _) => setting_id.clone(),
            (None, Some(id)) => resolver::find_formula_owner(store.document(), id)?,
            (None, None) => return Err(AppError::MissingParameter("settingId")),
        };
        let formula = resolver::resolve_formula(store, &owner, id)?;
        Ok(Self {
            store,
            buffer: EditBuffer::init_owned(formula, owner),
            queries: SearchQueries::default(),
        })
    }

    pub fn buffer(&self) -> &EditBuffer<Formula> {
        &self.buffer
    }

    fn select_all(&mut self, list: ListKind) -> Result<()> {
        let doc = self.store.document();
        let field = match list {
            ListKind::Collections => {
                FormulaField::Collections(doc.collections.iter().map(|c| c.id.clone()).collect())
            }
            ListKind::Products => FormulaField::Products(catalog::all_product_targets(doc)),
            other => {
                return Err(AppError::UnsupportedIntent(format!(
                    "select-all on {other:?}"
                )));
            }
        };
        self.buffer.set_field(field)?;
        Ok(())
    }

    fn render_fields(&self, view: &mut dyn View) {
        let formula = self.buffer.current();
        view.render_field(FieldKind::FormulaTitle, &formula.title);
        view.render_field(FieldKind::FormulaCurrency, &formula.currency);
        view.render_field(FieldKind::FormulaExpression, &formula.formula);
        view.render_field(FieldKind::FormulaFrequency, &formula.frequency.to_string());
    }

    fn render_currencies(&self, view: &mut dyn View) {
        let selected = &self.buffer.current().currency;
        let items: Vec<ListItem> =
            catalog::search_currencies(self.store.document(), &self.queries.currencies)
                .into_iter()
                .map(|code| {
                    ListItem::new(EntityId::from(code), code).active(code == selected.as_str())
                })
                .collect();
        view.render_list(ListKind::Currencies, &items);
    }

    fn render_collections(&self, view: &mut dyn View) {
        let targets = &self.buffer.current().targets;
        let items: Vec<ListItem> =
            catalog::search_collections(self.store.document(), &self.queries.collections)
                .into_iter()
                .map(|c| {
                    ListItem::new(c.id.clone(), c.title.clone()).active(targets.has_collection(&c.id))
                })
                .collect();
        view.render_list(ListKind::Collections, &items);
        view.render_field(
            FieldKind::SelectedCollections,
            &targets.collections_ids.len().to_string(),
        );
    }

    fn render_products(&self, view: &mut dyn View) {
        let targets = &self.buffer.current().targets;
        let mut items = Vec::new();
        for hit in catalog::search_products(self.store.document(), &self.queries.products) {
            let product = hit.product;
            items.push(
                ListItem::new(product.id.clone(), product.title.clone())
                    .active(targets.has_product(&product.id)),
            );
            for variant in hit.variants {
                items.push(
                    ListItem::new(variant.id.clone(), variant.title.clone())
                        .active(targets.has_product(&variant.id))
                        .depth(1),
                );
            }
        }
        view.render_list(ListKind::Products, &items);
        view.render_field(
            FieldKind::SelectedProducts,
            &targets.products.len().to_string(),
        );
    }

    fn render_list(&self, list: ListKind, view: &mut dyn View) -> Result<()> {
        match list {
            ListKind::Currencies => self.render_currencies(view),
            ListKind::Collections => self.render_collections(view),
            ListKind::Products => self.render_products(view),
            other => {
                return Err(AppError::UnsupportedIntent(format!(
                    "search on {other:?}"
                )));
            }
        }
        Ok(())
    }
}

impl<S: Storage> Page for FormulaEditPage<'_, S> {
    fn render(&self, view: &mut dyn View) {
        self.render_fields(view);
        self.render_currencies(view);
        self.render_collections(view);
        self.render_products(view);
        view.set_controls_enabled(self.buffer.is_dirty());
    }

    fn handle(&mut self, intent: Intent, view: &mut dyn View) -> Result<Outcome> {
        match intent {
            Intent::EditField(FieldEdit::Formula(field)) => {
                self.buffer.set_field(field)?;
                self.render(view);
            }
            Intent::Save => {
                self.buffer.save(self.store)?;
                view.set_controls_enabled(false);
            }
            Intent::Discard => {
                self.buffer.discard();
                self.render(view);
            }
            Intent::Search { list, query } => {
                match list {
                    ListKind::Currencies => self.queries.currencies = query,
                    ListKind::Collections => self.queries.collections = query,
                    ListKind::Products => self.queries.products = query,
                    _ => {}
                }
                self.render_list(list, view)?;
            }
            Intent::SelectAll(list) => {
                self.select_all(list)?;
                self.render(view);
            }
            other => {
                return Err(AppError::UnsupportedIntent(format!(
                    "{} on the formula page",
                    other.name()
                )));
            }
        }
        Ok(Outcome::Stay)
    }
}
