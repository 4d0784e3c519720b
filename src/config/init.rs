//! Template generation for `--init` command

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::file::CONFIG_FILE_NAME;

/// Template ecsync.toml with documentation
pub const ECSYNC_TOML_TEMPLATE: &str = r#"# ecsync.toml - Configuration for ecsync
#
# ecsync resolves the .editorconfig properties that apply to each file and
# previews how a focused editor session would apply them to the global
# indentation settings. Uncomment and modify settings as needed.

[resolve]
# Name of the declaration files searched for in each parent directory.
# file_name = ".editorconfig"

# Stop the upward search at the git repository root. A declaration file in
# the filesystem root is still consulted unless a file declares root = true.
# stop_at_git_root = false

[reconcile]
# Milliseconds a view must keep focus before settings are applied.
# The EDITORCONFIG_FOCUS_DELAY environment variable takes precedence.
# focus_delay_ms = 500

[settings]
# Global settings a --preview session starts from.
# tab_size = 4
# indent_size = 4
# insert_tabs = false
"#;

/// Generate ecsync.toml in the specified directory (or current directory if None).
///
/// Returns an error if ecsync.toml already exists.
pub fn generate_init_file_in(dir: Option<&Path>) -> io::Result<PathBuf> {
    let path = dir.map_or_else(
        || PathBuf::from(CONFIG_FILE_NAME),
        |d| d.join(CONFIG_FILE_NAME),
    );

    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "ecsync.toml already exists",
        ));
    }

    fs::write(&path, ECSYNC_TOML_TEMPLATE)?;
    Ok(path)
}

/// Generate ecsync.toml in the current directory.
pub fn generate_init_file() -> io::Result<PathBuf> {
    generate_init_file_in(None)
}
