//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Document, Setting, Formula, Intent, AppConfig)
//! - `controllers/` - Pages and the `View` boundary
//! - `services/` - State store, resolver, edit buffer, list mutation, navigation, catalog
//! - `infrastructure/` - Storage backends and errors
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::view::{FieldKind, ListItem, View};
pub use controllers::{Outcome, Page, open_page};
pub use domain::{
    AppConfig, Document, EntityId, FieldEdit, Formula, FormulaField, Intent, ListKind, Setting,
    SettingField, Status,
};
pub use infrastructure::error::{AppError, Result};
pub use infrastructure::storage::{FileStorage, MemoryStorage, Storage};
pub use services::edit_buffer::EditBuffer;
pub use services::navigation::Route;
pub use services::state_store::{LoadOptions, StateStore};
pub use state::AppState;
