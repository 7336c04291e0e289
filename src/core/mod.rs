//! Core module for star system data structures and journal processing.

pub mod body;
pub mod config;
pub mod journal;
pub mod kepler;
pub mod system;
pub mod watcher;
