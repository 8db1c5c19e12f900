use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::app::domain::{
    AppConfig, Document, EntityId, FieldEdit, FormulaField, Intent, ListKind, SettingField,
};
use crate::app::infrastructure::error::Result;
use crate::app::infrastructure::storage::Storage;
use crate::app::services::catalog;
use crate::app::services::navigation::Route;
use crate::app::services::resolver;
use crate::app::{AppState, Outcome};

use super::terminal::TerminalView;

#[derive(Parser, Debug)]
#[command(
    name = "formula-settings",
    version,
    about = "Manage pricing settings and their formulas",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (default: platform config dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory the state is stored in.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON snapshot used when there is no stored state.
    #[arg(long, global = true, value_name = "PATH")]
    pub bootstrap: Option<PathBuf>,

    /// Drop stored state and start over from the bootstrap snapshot.
    #[arg(long, global = true)]
    pub reset: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all settings.
    #[command(alias = "ls")]
    List,

    /// Render the page behind a URL, e.g. "/formula.html?id=2&settingId=1".
    Show { url: String },

    /// Create a new draft setting.
    CreateSetting {
        #[arg(long)]
        title: Option<String>,
    },

    RenameSetting { id: String, title: String },

    /// Switch a setting between draft and active.
    ToggleSetting { id: String },

    RemoveSetting { id: String },

    /// Create a formula in a setting, optionally filling it in.
    CreateFormula {
        setting_id: String,
        #[command(flatten)]
        fields: FormulaArgs,
    },

    EditFormula {
        setting_id: String,
        id: String,
        #[command(flatten)]
        fields: FormulaArgs,
    },

    RemoveFormula { setting_id: String, id: String },

    /// Search one of the catalog pickers of a formula.
    Search {
        setting_id: String,
        id: String,
        #[arg(value_enum)]
        list: SearchList,
        query: String,
    },

    /// Replace stored state with the bootstrap snapshot.
    Reset,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FormulaArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub currency: Option<String>,

    /// Pricing expression, e.g. "X * Y".
    #[arg(long)]
    pub expression: Option<String>,

    /// Update interval in milliseconds.
    #[arg(long)]
    pub frequency: Option<u64>,

    /// Target collection (repeat; replaces the selection).
    #[arg(long = "collection", value_name = "ID")]
    pub collections: Vec<String>,

    /// Target product or variant (repeat; replaces the selection).
    #[arg(long = "product", value_name = "ID")]
    pub products: Vec<String>,

    #[arg(long, value_name = "ID")]
    pub toggle_collection: Vec<String>,

    #[arg(long, value_name = "ID")]
    pub toggle_product: Vec<String>,

    #[arg(long)]
    pub all_collections: bool,

    #[arg(long)]
    pub all_products: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchList {
    Currencies,
    Collections,
    Products,
}

impl From<SearchList> for ListKind {
    fn from(list: SearchList) -> Self {
        match list {
            SearchList::Currencies => ListKind::Currencies,
            SearchList::Collections => ListKind::Collections,
            SearchList::Products => ListKind::Products,
        }
    }
}

impl Cli {
    /// Config from `--config` (or the default location) with the global
    /// flags applied on top.
    pub fn load_config(&self) -> AppConfig {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from(path),
            None => AppConfig::load(),
        };
        self.apply_to(&mut config);
        config
    }

    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(path) = &self.bootstrap {
            config.bootstrap_path = Some(path.clone());
        }
        if self.reset || matches!(self.command, Commands::Reset) {
            config.reset_state = true;
        }
    }
}

impl FormulaArgs {
    fn intents(&self) -> Vec<Intent> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(FormulaField::Title(title.clone()));
        }
        if let Some(currency) = &self.currency {
            fields.push(FormulaField::Currency(currency.clone()));
        }
        if let Some(expression) = &self.expression {
            fields.push(FormulaField::Expression(expression.clone()));
        }
        if let Some(frequency) = self.frequency {
            fields.push(FormulaField::Frequency(frequency));
        }
        if !self.collections.is_empty() {
            fields.push(FormulaField::Collections(ids(&self.collections)));
        }
        if !self.products.is_empty() {
            fields.push(FormulaField::Products(ids(&self.products)));
        }
        fields.extend(
            self.toggle_collection
                .iter()
                .map(|id| FormulaField::ToggleCollection(EntityId::from(id.as_str()))),
        );
        fields.extend(
            self.toggle_product
                .iter()
                .map(|id| FormulaField::ToggleProduct(EntityId::from(id.as_str()))),
        );

        let mut intents: Vec<Intent> = fields
            .into_iter()
            .map(|field| Intent::EditField(FieldEdit::Formula(field)))
            .collect();
        if self.all_collections {
            intents.push(Intent::SelectAll(ListKind::Collections));
        }
        if self.all_products {
            intents.push(Intent::SelectAll(ListKind::Products));
        }
        if !intents.is_empty() {
            intents.push(Intent::Save);
        }
        intents
    }
}

fn ids(values: &[String]) -> Vec<EntityId> {
    values.iter().map(|v| EntityId::from(v.as_str())).collect()
}

fn setting_title(title: &str) -> Intent {
    Intent::EditField(FieldEdit::Setting(SettingField::Title(title.to_string())))
}

/// The page a command opens and the intents it feeds that page.
pub fn plan(command: &Commands) -> Result<(Route, Vec<Intent>)> {
    let planned = match command {
        Commands::List | Commands::Reset => (Route::SettingsList, Vec::new()),
        Commands::Show { url } => (Route::parse(url)?, Vec::new()),
        Commands::CreateSetting { title } => {
            let intents = match title {
                Some(title) => vec![setting_title(title), Intent::Save],
                None => Vec::new(),
            };
            (Route::SettingEdit { id: None }, intents)
        }
        Commands::RenameSetting { id, title } => (
            Route::SettingEdit { id: Some(EntityId::from(id.as_str())) },
            vec![setting_title(title), Intent::Save],
        ),
        Commands::ToggleSetting { id } => (
            Route::SettingEdit { id: Some(EntityId::from(id.as_str())) },
            vec![Intent::ToggleStatus],
        ),
        Commands::RemoveSetting { id } => (
            Route::SettingsList,
            vec![Intent::RemoveItem(EntityId::from(id.as_str()))],
        ),
        Commands::CreateFormula { setting_id, fields } => (
            Route::FormulaEdit {
                id: None,
                setting_id: Some(EntityId::from(setting_id.as_str())),
            },
            fields.intents(),
        ),
        Commands::EditFormula { setting_id, id, fields } => (
            Route::FormulaEdit {
                id: Some(EntityId::from(id.as_str())),
                setting_id: Some(EntityId::from(setting_id.as_str())),
            },
            fields.intents(),
        ),
        Commands::RemoveFormula { setting_id, id } => (
            Route::SettingEdit { id: Some(EntityId::from(setting_id.as_str())) },
            vec![Intent::RemoveItem(EntityId::from(id.as_str()))],
        ),
        Commands::Search { setting_id, id, list, query } => (
            Route::FormulaEdit {
                id: Some(EntityId::from(id.as_str())),
                setting_id: Some(EntityId::from(setting_id.as_str())),
            },
            vec![Intent::Search {
                list: (*list).into(),
                query: query.clone(),
            }],
        ),
    };
    Ok(planned)
}

/// Run `command` against `app` and print the resulting page to `out`.
pub fn execute<S: Storage, W: Write>(
    app: &mut AppState<S>,
    command: &Commands,
    out: &mut W,
) -> Result<()> {
    let (route, intents) = plan(command)?;
    let mut view = TerminalView::new();
    let outcome = app.run(&route, intents, &mut view)?;

    let created = created_route(app, &route);
    if let Some(created) = &created {
        writeln!(out, "created {}", created.href())?;
    }
    view.write_to(out)?;
    if let Route::FormulaEdit {
        id: Some(id),
        setting_id,
    } = created.as_ref().unwrap_or(&route)
    {
        let doc = app.store().document();
        let owner = match setting_id {
            Some(setting_id) => setting_id.clone(),
            None => resolver::find_formula_owner(doc, id)?,
        };
        write_targets(doc, &owner, id, out)?;
    }
    if let Outcome::Navigate(next) = outcome {
        writeln!(out, "next: {}", next.href())?;
    }
    Ok(())
}

/// Saved targets of a formula by name; dangling references show their id.
fn write_targets<W: Write>(
    doc: &Document,
    setting_id: &EntityId,
    id: &EntityId,
    out: &mut W,
) -> Result<()> {
    let Some(formula) = doc.setting(setting_id).and_then(|s| s.formula(id)) else {
        return Ok(());
    };
    let collections: Vec<String> = formula
        .targets
        .collections_ids
        .iter()
        .map(|c| catalog::collection_title(doc, c).map_or_else(|| c.to_string(), str::to_string))
        .collect();
    let products: Vec<String> = formula
        .targets
        .products
        .iter()
        .map(|p| catalog::target_label(doc, p).unwrap_or_else(|| p.to_string()))
        .collect();
    writeln!(out, "targeted collections: {}", collections.join(", "))?;
    writeln!(out, "targeted products: {}", products.join(", "))?;
    Ok(())
}

/// Route of the entity a create-on-visit route just made.
fn created_route<S: Storage>(app: &AppState<S>, route: &Route) -> Option<Route> {
    let doc = app.store().document();
    match route {
        Route::SettingEdit { id: None } => doc.settings.last().map(|s| Route::SettingEdit {
            id: Some(s.id.clone()),
        }),
        Route::FormulaEdit {
            id: None,
            setting_id: Some(setting_id),
        } => doc
            .setting(setting_id)
            .and_then(|s| s.formulas.last())
            .map(|f| Route::FormulaEdit {
                id: Some(f.id.clone()),
                setting_id: Some(setting_id.clone()),
            }),
        _ => None,
    }
}
