use std::path::{Path, PathBuf};

/// Location of a locally built helper, relative to the workspace root.
pub const WORKSPACE_HELPER_PATH: &str = "core/triggerfish-core";

/// Locate the helper binary: `<root>/core/triggerfish-core` first, then
/// `executable` resolved against `PATH`.
pub fn find_helper_binary(
    workspace_root: Option<&Path>,
    executable: &str,
) -> Option<PathBuf> {
    if let Some(root) = workspace_root {
        let local = root.join(WORKSPACE_HELPER_PATH);
        if local.is_file() {
            return Some(local);
        }
    }

    which::which(executable).ok()
}

#[cfg(test)]
#[path = "../../tests/src/helper/discovery_tests.rs"]
mod tests;
