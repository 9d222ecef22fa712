//! Initialize a gcsafe configuration
//!
//! Writes a `gcsafe.toml` listing every setting at its default value.

use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "gcsafe.toml";

/// Default content for gcsafe.toml
const DEFAULT_GCSAFE_TOML: &str = r#"version = "1"

[checks]
# Report managed-reference wrappers declared as stack variables
enable_members_on_stack_check = false
# Escalate every violation to an error
warnings_as_errors = false

[locations]
# Directory markers are matched as substrings of the normalized path
# banned_directories = ["/third_party/", "/native_client/", "/breakpad/", "/courgette/", "/ppapi/", "/testing/", "/v8/", "/frameworks/"]
# generated_marker = "/gen/"
# relaxed_root = "/third_party/blink/"
# relaxed_exempt = "/third_party/blink/browser/"

[names]
# managed_bases = ["::blink::GarbageCollected", "::blink::GarbageCollectedMixin", "::cppgc::GarbageCollected", "::cppgc::GarbageCollectedMixin"]
# unique_factories = ["::std::make_unique", "::base::WrapUnique"]
# optional_templates = ["::absl::optional", "::std::optional"]
# variant_templates = ["::absl::variant", "::std::variant"]
# member_wrappers = ["::blink::Member", "::blink::WeakMember", "::cppgc::internal::BasicMember"]

[suppression]
# ignore_annotation = "blink_gc_plugin_ignore"
# ignored_base_classes = ["IPC::NoParams"]
"#;

/// Error type for init command
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path error: {0}")]
    Path(String),
}

/// What init did
#[derive(Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Skipped,
    Overwritten,
}

/// Run the init command in the current directory
pub fn run_init(force: bool) -> Result<InitOutcome, InitError> {
    run_init_in(Path::new("."), force)
}

/// Write `gcsafe.toml` into `dir`; existing files are kept unless `force`
pub fn run_init_in(dir: &Path, force: bool) -> Result<InitOutcome, InitError> {
    if !dir.is_dir() {
        return Err(InitError::Path(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        if !force {
            return Ok(InitOutcome::Skipped);
        }
        fs::write(&path, DEFAULT_GCSAFE_TOML)?;
        return Ok(InitOutcome::Overwritten);
    }
    fs::write(&path, DEFAULT_GCSAFE_TOML)?;
    Ok(InitOutcome::Created)
}
