//! Controllers layer - orchestration and coordination.
//!
//! Each page coordinates the store, the services and a `View`:
//! - Settings list (index)
//! - Setting edit
//! - Formula edit

pub mod formula_edit;
pub mod setting_edit;
pub mod settings_list;
pub mod view;

use crate::app::domain::Intent;
use crate::app::infrastructure::error::Result;
use crate::app::infrastructure::storage::Storage;
use crate::app::services::navigation::Route;
use crate::app::services::state_store::StateStore;

use formula_edit::FormulaEditPage;
use setting_edit::SettingEditPage;
use settings_list::SettingsListPage;
use view::View;

/// What the view should do after an intent was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Stay,
    Navigate(Route),
}

pub trait Page {
    /// Render everything the page shows.
    fn render(&self, view: &mut dyn View);

    fn handle(&mut self, intent: Intent, view: &mut dyn View) -> Result<Outcome>;
}

/// Open the page behind `route`. Opening an edit page without an id
/// creates the entity.
pub fn open_page<'s, S: Storage + 's>(
    store: &'s mut StateStore<S>,
    route: &Route,
) -> Result<Box<dyn Page + 's>> {
    let page: Box<dyn Page + 's> = match route {
        Route::SettingsList => Box::new(SettingsListPage::open(store)),
        Route::SettingEdit { id } => Box::new(SettingEditPage::open(store, id.as_ref())?),
        Route::FormulaEdit { id, setting_id } => Box::new(FormulaEditPage::open(
            store,
            setting_id.as_ref(),
            id.as_ref(),
        )?),
    };
    Ok(page)
}
