use crate::build::DEFAULT_BUILD_DIR_NAME;
use crate::result::{EveBuildError, Result};
use std::path::{Path, PathBuf};

pub const PROJECT_MARKER: &str = "CMakeLists.txt";

pub struct CliParser;

impl CliParser {
    /// `<cwd>/build`
    pub fn default_build_dir(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_BUILD_DIR_NAME)
    }

    /// Anchors a relative path at `cwd`; absolute paths are returned unchanged.
    pub fn resolve_dir(cwd: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        }
    }

    /// Fails with `NotFound` unless `path` is a directory holding a `CMakeLists.txt`.
    pub fn validate_project_dir(path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(EveBuildError::not_found(format!(
                "Project directory not found: {}",
                path.display()
            )));
        }

        if !path.join(PROJECT_MARKER).is_file() {
            return Err(EveBuildError::not_found(format!(
                "No {} in project directory {}",
                PROJECT_MARKER,
                path.display()
            )));
        }

        Ok(())
    }
}
