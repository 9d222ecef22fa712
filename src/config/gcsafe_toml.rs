//! Parsing and validation for gcsafe.toml configuration files
//!
//! Every section is optional; missing values fall back to the built-in
//! tables. The resulting [`Config`] is built once at startup and only ever
//! handed out by reference.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration struct for gcsafe.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version (must be "1")
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub checks: ChecksConfig,

    #[serde(default)]
    pub locations: LocationsConfig,

    #[serde(default)]
    pub names: NamesConfig,

    #[serde(default)]
    pub suppression: SuppressionConfig,
}

fn default_version() -> String {
    "1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            checks: ChecksConfig::default(),
            locations: LocationsConfig::default(),
            names: NamesConfig::default(),
            suppression: SuppressionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.version != "1" {
            return Err(ConfigError::Validation(format!(
                "Unsupported configuration version '{}'. Expected '1'",
                self.version
            )));
        }

        for dir in &self.locations.banned_directories {
            validate_dir_marker("locations.banned_directories", dir)?;
        }
        validate_dir_marker("locations.generated_marker", &self.locations.generated_marker)?;
        validate_dir_marker("locations.relaxed_root", &self.locations.relaxed_root)?;
        validate_dir_marker("locations.relaxed_exempt", &self.locations.relaxed_exempt)?;

        let name_lists = [
            ("names.managed_bases", &self.names.managed_bases),
            ("names.unique_factories", &self.names.unique_factories),
            ("names.optional_templates", &self.names.optional_templates),
            ("names.variant_templates", &self.names.variant_templates),
            ("names.member_wrappers", &self.names.member_wrappers),
        ];
        for (field, names) in name_lists {
            if names.is_empty() {
                return Err(ConfigError::Validation(format!("{} must not be empty", field)));
            }
        }

        if self.suppression.ignore_annotation.is_empty() {
            return Err(ConfigError::Validation(
                "suppression.ignore_annotation must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Directory markers are searched as substrings, so they must be delimited
fn validate_dir_marker(field: &str, dir: &str) -> Result<(), ConfigError> {
    if dir.len() < 2 || !dir.starts_with('/') || !dir.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} entry '{}' must start and end with '/'",
            field, dir
        )));
    }
    Ok(())
}

/// Which checks run and how violations are escalated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Register the managed-reference-on-stack rule
    #[serde(default)]
    pub enable_members_on_stack_check: bool,

    /// Emit violations as errors instead of warnings
    #[serde(default)]
    pub warnings_as_errors: bool,
}

/// Tables driving location classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationsConfig {
    /// Vendor and tooling directories that are out of scope
    #[serde(default = "default_banned_directories")]
    pub banned_directories: Vec<String>,

    /// Segment marking build-generated output
    #[serde(default = "default_generated_marker")]
    pub generated_marker: String,

    /// Root of the first-party subsystem with its own classification
    #[serde(default = "default_relaxed_root")]
    pub relaxed_root: String,

    /// Sub-path of the relaxed root that keeps the default classification
    #[serde(default = "default_relaxed_exempt")]
    pub relaxed_exempt: String,
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            banned_directories: default_banned_directories(),
            generated_marker: default_generated_marker(),
            relaxed_root: default_relaxed_root(),
            relaxed_exempt: default_relaxed_exempt(),
        }
    }
}

fn default_banned_directories() -> Vec<String> {
    [
        "/third_party/",
        "/native_client/",
        "/breakpad/",
        "/courgette/",
        "/ppapi/",
        "/testing/",
        "/v8/",
        "/frameworks/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_generated_marker() -> String {
    "/gen/".to_string()
}

fn default_relaxed_root() -> String {
    "/third_party/blink/".to_string()
}

fn default_relaxed_exempt() -> String {
    "/third_party/blink/browser/".to_string()
}

/// Qualified names the type predicates and rules look for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamesConfig {
    /// Base classes marking a garbage-collected type
    #[serde(default = "default_managed_bases")]
    pub managed_bases: Vec<String>,

    /// Factory functions producing sole-ownership pointers
    #[serde(default = "default_unique_factories")]
    pub unique_factories: Vec<String>,

    /// Optional-value wrapper templates
    #[serde(default = "default_optional_templates")]
    pub optional_templates: Vec<String>,

    /// Tagged-union templates
    #[serde(default = "default_variant_templates")]
    pub variant_templates: Vec<String>,

    /// Strong and weak managed-reference wrappers
    #[serde(default = "default_member_wrappers")]
    pub member_wrappers: Vec<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            managed_bases: default_managed_bases(),
            unique_factories: default_unique_factories(),
            optional_templates: default_optional_templates(),
            variant_templates: default_variant_templates(),
            member_wrappers: default_member_wrappers(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_managed_bases() -> Vec<String> {
    strings(&[
        "::blink::GarbageCollected",
        "::blink::GarbageCollectedMixin",
        "::cppgc::GarbageCollected",
        "::cppgc::GarbageCollectedMixin",
    ])
}

fn default_unique_factories() -> Vec<String> {
    strings(&["::std::make_unique", "::base::WrapUnique"])
}

fn default_optional_templates() -> Vec<String> {
    strings(&["::absl::optional", "::std::optional"])
}

fn default_variant_templates() -> Vec<String> {
    strings(&["::absl::variant", "::std::variant"])
}

fn default_member_wrappers() -> Vec<String> {
    strings(&[
        "::blink::Member",
        "::blink::WeakMember",
        "::cppgc::internal::BasicMember",
    ])
}

/// Opt-out markers and historical exemptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressionConfig {
    /// Annotation string that exempts a declaration
    #[serde(default = "default_ignore_annotation")]
    pub ignore_annotation: String,

    /// Simple names of records whose contents are never checked
    #[serde(default = "default_ignored_record_names")]
    pub ignored_record_names: Vec<String>,

    /// Qualified bases whose subclasses are never checked
    #[serde(default = "default_ignored_base_classes")]
    pub ignored_base_classes: Vec<String>,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            ignore_annotation: default_ignore_annotation(),
            ignored_record_names: default_ignored_record_names(),
            ignored_base_classes: default_ignored_base_classes(),
        }
    }
}

fn default_ignore_annotation() -> String {
    "blink_gc_plugin_ignore".to_string()
}

fn default_ignored_record_names() -> Vec<String> {
    strings(&[
        "ThreadLocalBoolean",
        "Header",
        "Validators",
        "AutocompleteController",
        "HistoryURLProvider",
        "MockTransaction",
        "TestAnimationDelegate",
        "PluginVersionInfo",
        "QuadF",
    ])
}

fn default_ignored_base_classes() -> Vec<String> {
    strings(&["IPC::NoParams"])
}
