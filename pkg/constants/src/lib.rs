//! Centralized constants for the seekr project.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod cluster;
pub mod id;
pub mod network;
pub mod paths;
pub mod state;
