//! Leaf nodes carrying a single typed value

use std::any::Any;

use crate::scene::{NodeBehavior, ValueType};

/// Node whose only state is its value
///
/// Registered for `bool`, `int`, `float`, `vec3f` and `string`, and with
/// [`ValueType::None`] as the plain `Node` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueNode {
    value_type: ValueType,
}

impl ValueNode {
    /// Create a value node of the given type
    pub fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }

    /// Structural node without a value
    pub fn untyped() -> Self {
        Self::new(ValueType::None)
    }
}

impl NodeBehavior for ValueNode {
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
