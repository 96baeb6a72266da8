//! Core building blocks: request schema (`params`), service settings
//! (`config`), region geometry, the imagery pipeline and the map renderer.
//! These are consumed by the high-level `api` module.
pub mod config;
pub mod geometry;
pub mod params;
pub mod processing;
pub mod render;
