//! Asset import
//!
//! Importers fill a target node with children built from an external
//! source. [`ExtensionImporter`] picks a format importer by file extension
//! and resolves relative locators against the configured search paths.

pub mod obj_loader;

pub use obj_loader::{ObjError, ObjGroup, ObjImporter, ObjLoader};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ImportConfig;
use crate::scene::{NodeId, SceneError, SceneGraph, SceneResult};

/// Collaborator that adds imported children to a node
///
/// Implementations add children to `world` and never replace the node
/// itself.
pub trait SceneImporter: fmt::Debug {
    /// Import the source at `locator` under `world`
    fn import_into(&self, graph: &mut SceneGraph, world: NodeId, locator: &str) -> SceneResult<()>;
}

/// Dispatches to a format importer by file extension
pub struct ExtensionImporter {
    search_paths: Vec<PathBuf>,
    formats: HashMap<String, Box<dyn SceneImporter + Send + Sync>>,
}

impl fmt::Debug for ExtensionImporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.formats.keys().collect();
        formats.sort();
        f.debug_struct("ExtensionImporter")
            .field("search_paths", &self.search_paths)
            .field("formats", &formats)
            .finish()
    }
}

impl Default for ExtensionImporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ExtensionImporter {
    /// Create an importer without any format
    pub fn new() -> Self {
        Self { search_paths: Vec::new(), formats: HashMap::new() }
    }

    /// Importer using the default import configuration
    pub fn with_defaults() -> Self {
        Self::from_config(&ImportConfig::default())
    }

    /// Importer for the enabled formats and search paths of a configuration
    pub fn from_config(config: &ImportConfig) -> Self {
        let mut importer = Self::new();
        importer.search_paths = config.search_paths.iter().map(PathBuf::from).collect();
        if config.accepts("obj") {
            importer.register("obj", ObjImporter);
        }
        for format in config.enabled_formats.iter().filter(|f| !importer.supports(f)) {
            log::warn!("No importer available for enabled format '{format}'");
        }
        importer
    }

    /// Register an importer for a file extension (case-insensitive)
    pub fn register(&mut self, extension: &str, importer: impl SceneImporter + Send + Sync + 'static) {
        self.formats.insert(extension.to_ascii_lowercase(), Box::new(importer));
    }

    /// Whether an extension has an importer
    pub fn supports(&self, extension: &str) -> bool {
        self.formats.contains_key(&extension.to_ascii_lowercase())
    }

    /// Resolve a locator against the search paths
    ///
    /// Absolute and existing paths are kept as given; otherwise the first
    /// search path containing the file wins. Unresolvable locators are
    /// returned unchanged so the format importer reports the failure.
    pub fn resolve(&self, locator: &str) -> PathBuf {
        let path = Path::new(locator);
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        self.search_paths
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| path.to_path_buf())
    }
}

impl SceneImporter for ExtensionImporter {
    fn import_into(&self, graph: &mut SceneGraph, world: NodeId, locator: &str) -> SceneResult<()> {
        let extension = Path::new(locator)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let importer = self.formats.get(&extension).ok_or_else(|| SceneError::Import {
            locator: locator.to_string(),
            reason: format!("unsupported format '{extension}'"),
        })?;

        let resolved = self.resolve(locator);
        log::debug!("Importing '{locator}' from {}", resolved.display());
        importer.import_into(graph, world, &resolved.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension() {
        let mut graph = SceneGraph::new();
        let world = graph.create("World", "world").unwrap();
        let importer = ExtensionImporter::with_defaults();

        let err = importer.import_into(&mut graph, world, "scene.ply").unwrap_err();
        assert!(matches!(err, SceneError::Import { reason, .. } if reason.contains("ply")));
        assert!(importer.supports("OBJ"));
    }

    #[test]
    fn test_obj_file_through_search_path() {
        let dir = std::env::temp_dir().join(format!("scene_import_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let config = ImportConfig::new().with_search_paths(vec![dir.to_string_lossy().to_string()]);
        let importer = ExtensionImporter::from_config(&config);
        let mut graph = SceneGraph::new();
        let world = graph.create("World", "world").unwrap();

        importer.import_into(&mut graph, world, "tri.obj").unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(graph.get_child(world, "mesh_0").is_ok());
        assert!(!graph.bounds(world).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_import_error() {
        let mut graph = SceneGraph::new();
        let world = graph.create("World", "world").unwrap();
        let err = ExtensionImporter::with_defaults()
            .import_into(&mut graph, world, "definitely_missing_model.obj")
            .unwrap_err();
        assert!(matches!(err, SceneError::Import { .. }));
    }
}
