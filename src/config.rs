//! Configuration file parsing and validation

pub mod gcsafe_toml;

pub use gcsafe_toml::{ChecksConfig, Config, LocationsConfig, NamesConfig, SuppressionConfig};
