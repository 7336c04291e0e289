//! GUI module for the star system orrery.
//!
//! This module contains the egui-based user interface: the main
//! application window, the orrery canvas, and the body selection tree.

mod app;
mod orrery;
mod tree;

pub use app::OrreryApp;
