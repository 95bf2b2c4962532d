//! Data structures for soldier configuration.
//!
//! This module contains pure data structures deserialized from RON.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `skirmish_headless`.

mod soldier_data;

pub use soldier_data::{SoldierProfile, ARMOR, INITIAL_HEALTH, SKILL, STRENGTH};
