//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - Key/value persistent storage (memory and file backed)
//! - Error types

pub mod error;
pub mod storage;
