//! Scene graph runtime
//!
//! Hierarchical, polymorphic node structure with lazy recomputation and
//! generic traversal passes.
//!
//! ## Architecture
//!
//! ```text
//! Description loader ──create──▶ Node Registry
//!        │                           │
//!        └──populate──▶ SceneGraph (arena of NodeData + NodeBehavior)
//!                           │
//!          ┌────────────────┼──────────────────┐
//!        commit           render          Serialization
//!   (pre/post, dirty)  (insertion order)  (pre-order snapshot)
//! ```
//!
//! - Values changes stamp nodes with logical timestamps and propagate a
//!   children-modified signal to every ancestor
//! - Commit skips clean subtrees, so its cost follows the dirty subset
//! - Bounds are recomputed on demand as the union over children

mod error;
mod value;
mod node;
mod graph;
pub mod registry;
pub mod description;
mod traversal;
mod serialization;

#[cfg(test)]
mod tests;

pub use error::{SceneError, SceneResult};
pub use value::{NodeFlags, Value, ValueType};
pub use node::{NodeBehavior, NodeData, NodeId};
pub use graph::{ChildPolicy, SceneGraph};
pub use registry::{NodeFactory, NodeRegistry};
pub use description::Attribute;
pub use traversal::{FrameParams, RenderContext};
pub use serialization::{NodeRecord, Serialization, SerializationMode, SerializationObject};
