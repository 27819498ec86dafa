//! Commit and render traversals
//!
//! A [`RenderContext`] is threaded depth-first through the graph. Commit
//! runs `pre_commit` top-down and `post_commit` bottom-up over every named
//! child, skipping any subtree whose last commit is newer than all of its
//! modifications. Render walks the graph immutably and lets each node emit
//! its draw calls from already committed state.

use super::{NodeFlags, NodeId, SceneError, SceneGraph, SceneResult};
use crate::render::{Camera, RenderBackend};

/// Per-frame parameters supplied by the host
#[derive(Debug, Clone, Default)]
pub struct FrameParams {
    /// Host frame counter
    pub frame_index: u64,
    /// Viewing camera
    pub camera: Camera,
}

/// State threaded through commit and render
pub struct RenderContext<'a> {
    backend: &'a mut dyn RenderBackend,
    frame: FrameParams,
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderContext<'a> {
    /// Create a context for one frame
    pub fn new(backend: &'a mut dyn RenderBackend, frame: FrameParams) -> Self {
        Self { backend, frame }
    }

    /// Native backend
    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }

    /// Frame parameters
    pub fn frame(&self) -> &FrameParams {
        &self.frame
    }

    /// Replace the frame parameters before the next pass
    pub fn set_frame(&mut self, frame: FrameParams) {
        self.frame = frame;
    }
}

impl SceneGraph {
    /// Commit every dirty node below `root`
    ///
    /// Resources retired by destroyed nodes are released first. With
    /// fail-fast enabled (the default) the first error aborts the pass;
    /// otherwise siblings keep committing and the collected errors are
    /// returned together. A node whose subtree failed stays dirty.
    pub fn commit(&mut self, root: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.release_retired(ctx.backend());

        let mut errors = Vec::new();
        let result = self.commit_node(root, ctx, &mut errors);

        if self.fail_fast() {
            return result;
        }
        if let Err(err) = result {
            errors.push(err);
        }
        SceneError::collected(errors)
    }

    fn commit_node(
        &mut self,
        id: NodeId,
        ctx: &mut RenderContext<'_>,
        errors: &mut Vec<SceneError>,
    ) -> SceneResult<()> {
        let data = self.node(id)?;
        if !data.needs_commit() {
            return Ok(());
        }
        if data.flags().contains(NodeFlags::REQUIRED) && data.value().is_none() {
            return Err(SceneError::RequiredValueMissing(data.name().to_string()));
        }
        log::trace!("Committing {} '{}'", data.type_name(), data.name());

        self.with_behavior(id, |behavior, graph| behavior.pre_commit(graph, id, ctx))?;

        let errors_before = errors.len();
        for child in self.children(id)? {
            if let Err(err) = self.commit_node(child, ctx, errors) {
                if self.fail_fast() {
                    return Err(err);
                }
                log::warn!("Commit of '{}' failed: {err}", self.name_of(child));
                errors.push(err);
            }
        }

        self.with_behavior(id, |behavior, graph| behavior.post_commit(graph, id, ctx))?;

        if errors.len() == errors_before {
            let now = self.tick();
            self.node_mut(id)?.last_committed = now;
        }
        Ok(())
    }

    /// Render the graph rooted at `root`
    pub fn render(&self, root: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.render_node(root, ctx)
    }

    /// Render a single node, which decides whether to descend
    pub fn render_node(&self, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.node(id)?;
        match self.behavior_dyn(id) {
            Some(behavior) => behavior.render(self, id, ctx),
            None => Ok(()),
        }
    }
}
