//! Services layer - state and entity-lifecycle operations.
//!
//! This module contains the logic every page shares:
//! - Document load/persist (`state_store`)
//! - Entity lookup and create-on-visit (`resolver`)
//! - Working copy with save/discard (`edit_buffer`)
//! - Removal from ordered lists (`list_mutator`)
//! - Page URLs (`navigation`)
//! - Catalog search (`catalog`)

pub mod catalog;
pub mod edit_buffer;
pub mod list_mutator;
pub mod navigation;
pub mod resolver;
pub mod state_store;
