//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Document, Setting, Formula and the read-only catalog
//! - Entity ids and id sources
//! - Intents sent from the view to pages
//! - Application configuration

pub mod config;
pub mod document;
pub mod ids;
pub mod intents;

pub use config::AppConfig;
pub use document::{
    Collection, Document, EntityKind, Formula, Identified, Product, Setting, Status, TargetRef,
    Targets, Variant,
};
pub use ids::{ClockIds, EntityId, IdSource, SequentialIds};
pub use intents::{FieldEdit, FormulaField, Intent, ListKind, SettingField};
