//! Resolved design export.
//!
//! Downstream generators consume the resolved graph as JSON: every media
//! type reachable by identifier (collections included), every user type and
//! every resource, with views, links and examples filled in.
//!
//! ## Safety Guarantees
//!
//! - **Validation**: Only designs whose run collected no error are exported
//! - **Atomic writes**: Output is written to a hidden sibling and renamed into place

use std::fs;
use std::path::{Path, PathBuf};

use apidsl_define::{
    Design, DesignConfig, MediaTypeDefinition, ResourceDefinition, UserTypeDefinition,
};
use apidsl_definitions::{DESIGN_NAMES, design_by_name};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::errors::GeneratorError;

/// Serializable view of a finalized design.
#[derive(Debug, Serialize)]
pub struct DesignSnapshot<'a> {
    pub config: &'a DesignConfig,
    pub media_types: Vec<&'a MediaTypeDefinition>,
    pub user_types: Vec<&'a UserTypeDefinition>,
    pub resources: Vec<&'a ResourceDefinition>,
}

impl<'a> DesignSnapshot<'a> {
    pub fn new(design: &'a Design) -> Self {
        let registry = design.registry();
        Self {
            config: design.config(),
            media_types: registry.media_types().collect(),
            user_types: registry.user_types().collect(),
            resources: registry.resources().collect(),
        }
    }
}

/// Builds the bundled design called `name`.
///
/// ## Errors
///
/// Returns `GeneratorError::UnknownDesign` when no design has that name.
pub fn load_design(name: &str, config: DesignConfig) -> Result<Design, GeneratorError> {
    design_by_name(name, config).ok_or_else(|| GeneratorError::UnknownDesign {
        name: name.to_string(),
        available: DESIGN_NAMES.join(", "),
    })
}

/// Runs the design and renders the resolved graph as pretty JSON.
///
/// ## Errors
///
/// Returns `GeneratorError::DesignFailed` with every collected error when
/// the design is invalid.
#[instrument(skip(design))]
pub fn render_json(design: &mut Design) -> Result<String, GeneratorError> {
    design.run()?;
    let snapshot = DesignSnapshot::new(design);
    debug!(
        media_types = snapshot.media_types.len(),
        user_types = snapshot.user_types.len(),
        resources = snapshot.resources.len(),
        "rendering design"
    );
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Writes a rendered design to `path` without ever leaving it half written.
///
/// The JSON goes to a hidden sibling (`.name.tmp`) that is renamed over
/// `path` once complete; a failed rename removes the sibling again. Missing
/// parent directories are created and the file always ends with a newline.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` naming the path that could not be
/// created, written or renamed.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    let write_error = |at: &Path| {
        let at = at.to_path_buf();
        move |source| GeneratorError::WriteError { path: at, source }
    };

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent).map_err(write_error(parent))?;
    }

    let temp_path = sibling_temp_path(path);
    let mut body = String::with_capacity(content.len() + 1);
    body.push_str(content);
    if !body.ends_with('\n') {
        body.push('\n');
    }
    fs::write(&temp_path, body).map_err(write_error(&temp_path))?;

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(path)(source));
    }
    Ok(())
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "design.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Runs the design and exports it.
///
/// With an output path and `dry_run` unset the JSON is written to that path;
/// in every case it is returned.
///
/// ## Errors
///
/// Returns an error if the design is invalid, cannot be serialized, or the
/// output file cannot be written.
pub fn export(
    design: &mut Design,
    output: Option<&Path>,
    dry_run: bool,
) -> Result<String, GeneratorError> {
    let json = render_json(design)?;
    match output {
        Some(path) if !dry_run => {
            write_atomic(path, &json)?;
            info!(path = %path.display(), bytes = json.len(), "wrote design");
        }
        _ => debug!("not writing design output"),
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested/deep/design.json");

        write_atomic(&file_path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}\n");
    }

    #[test]
    fn write_atomic_overwrites_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("design.json");
        fs::write(&file_path, "old").unwrap();

        write_atomic(&file_path, "new").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new\n");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_atomic_keeps_unrelated_tmp_files() {
        let temp_dir = TempDir::new().unwrap();
        let neighbour = temp_dir.path().join("design.tmp");
        fs::write(&neighbour, "keep").unwrap();

        write_atomic(&temp_dir.path().join("design.json"), "{}").unwrap();

        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "keep");
    }

    #[test]
    fn write_atomic_reports_the_failing_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("taken");
        fs::write(&blocker, "file, not a directory").unwrap();

        let err = write_atomic(&blocker.join("design.json"), "{}").unwrap_err();
        match err {
            GeneratorError::WriteError { path, .. } => assert_eq!(path, blocker),
            other => panic!("Expected WriteError, got: {:?}", other),
        }
    }

    #[test]
    fn load_design_rejects_unknown_names() {
        let err = load_design("petstore", DesignConfig::default()).err().unwrap();
        match err {
            GeneratorError::UnknownDesign { name, available } => {
                assert_eq!(name, "petstore");
                assert!(available.contains("cellar"));
            }
            other => panic!("Expected UnknownDesign, got: {:?}", other),
        }
    }

    #[test]
    fn dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("design.json");
        let mut design = load_design("cellar", DesignConfig::seeded(1)).unwrap();

        let json = export(&mut design, Some(&file_path), true).unwrap();

        assert!(json.contains("application/vnd.bottle+json"));
        assert!(!file_path.exists());
    }
}
