// src/config/mod.rs

//! Configuration loading and validation for execvisor.
//!
//! - `model.rs`: the TOML-backed raw model and the validated `ConfigFile`.
//! - `loader.rs`: reading a config file from disk.
//! - `validate.rs`: raw -> validated conversion.
//! - `duration.rs`: the `"250ms"`/`"3s"` duration grammar.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, OutputSection, RawConfigFile, SupervisorSection};
