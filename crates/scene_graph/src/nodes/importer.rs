//! World that fills itself from an external source
//!
//! The source locator lives in the `fileName` string child. Setting it
//! raises a children-modified signal on the importer, which reacts by
//! running its import collaborator:
//!
//! - the same locator again is a no-op
//! - an empty locator is ignored
//! - a new locator before the first commit replaces the previous import
//! - a new locator after a commit fails with
//!   [`SceneError::ReimportUnsupported`] and `fileName` reverts to the
//!   committed locator

use std::any::Any;

use crate::assets::{ExtensionImporter, SceneImporter};
use crate::foundation::math::AABB;
use crate::foundation::time::TimeStamp;
use crate::render::ResourceHandle;
use crate::scene::{NodeBehavior, NodeFlags, NodeId, RenderContext, SceneError, SceneGraph, SceneResult, Value};

use super::World;

/// Name of the child holding the source locator
pub const FILE_NAME: &str = "fileName";

/// Importing world node
#[derive(Debug)]
pub struct Importer {
    stage: World,
    collaborator: Box<dyn SceneImporter>,
    loaded_source: Option<String>,
    committed_source: Option<String>,
    /// Children added by the last import
    imported: Vec<String>,
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

impl Importer {
    /// Importer dispatching by file extension with the default configuration
    pub fn new() -> Self {
        Self::with_collaborator(Box::new(ExtensionImporter::with_defaults()))
    }

    /// Importer using a specific collaborator
    pub fn with_collaborator(collaborator: Box<dyn SceneImporter>) -> Self {
        Self {
            stage: World::new(),
            collaborator,
            loaded_source: None,
            committed_source: None,
            imported: Vec::new(),
        }
    }

    /// Locator of the last successful import
    pub fn loaded_source(&self) -> Option<&str> {
        self.loaded_source.as_deref()
    }

    /// Children added by the last import
    pub fn imported(&self) -> &[String] {
        &self.imported
    }

    /// Native model of the staged world
    pub fn model(&self) -> Option<ResourceHandle> {
        self.stage.model()
    }

    fn import(&mut self, graph: &mut SceneGraph, id: NodeId, file_name: NodeId, locator: &str) -> SceneResult<()> {
        if let Some(committed) = &self.committed_source {
            // Written back without a touch so no new signal is raised
            graph.node_mut(file_name)?.value = Some(Value::String(committed.clone()));
            return Err(SceneError::ReimportUnsupported {
                node: graph.name_of(id).to_string(),
                loaded: committed.clone(),
                requested: locator.to_string(),
            });
        }

        for name in self.imported.drain(..) {
            if graph.node(id)?.child(&name).is_some() {
                graph.remove_child(id, &name)?;
            }
        }

        let before: Vec<String> = graph.node(id)?.children.iter().map(|(name, _)| name.clone()).collect();
        log::info!("Importing '{locator}' into '{}'", graph.name_of(id));
        let result = self.collaborator.import_into(graph, id, locator);

        // Track what the collaborator added, even on partial failure
        self.imported = graph
            .node(id)?
            .children
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| !before.contains(name))
            .collect();
        result?;

        self.loaded_source = Some(locator.to_string());
        Ok(())
    }
}

impl NodeBehavior for Importer {
    fn init(&mut self, graph: &mut SceneGraph, id: NodeId) -> SceneResult<()> {
        graph.create_value_child(id, FILE_NAME, "string", "", NodeFlags::empty())?;
        Ok(())
    }

    fn pre_commit(&mut self, graph: &mut SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.stage.pre_commit(graph, id, ctx)
    }

    fn post_commit(&mut self, graph: &mut SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.stage.post_commit(graph, id, ctx)?;
        if self.loaded_source.is_some() {
            self.committed_source.clone_from(&self.loaded_source);
        }
        Ok(())
    }

    fn render(&self, graph: &SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.stage.render(graph, id, ctx)
    }

    fn bounds(&self, graph: &SceneGraph, id: NodeId) -> AABB {
        self.stage.bounds(graph, id)
    }

    fn children_modified(&mut self, graph: &mut SceneGraph, id: NodeId, _timestamp: TimeStamp) -> SceneResult<()> {
        let Some(file_name) = graph.node(id)?.child(FILE_NAME) else {
            return Ok(());
        };
        let locator = graph.value(file_name)?.and_then(Value::as_str).unwrap_or_default().to_string();
        if locator.is_empty() || self.loaded_source.as_deref() == Some(locator.as_str()) {
            return Ok(());
        }
        self.import(graph, id, file_name, &locator)
    }

    fn stages_model(&self) -> bool {
        true
    }

    fn release_resources(&mut self) -> Vec<ResourceHandle> {
        self.stage.release_resources()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
