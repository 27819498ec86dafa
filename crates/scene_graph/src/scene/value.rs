//! Typed node values and node flags

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::render::ResourceHandle;

/// Semantic type of a node value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Structural node without a value
    None,
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int,
    /// 32-bit float
    Float,
    /// 3-component float vector
    Vec3f,
    /// UTF-8 string
    String,
    /// Opaque native resource handle
    Resource,
}

impl ValueType {
    /// Value type for a registry type name, `None` for structural types
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "float" => Self::Float,
            "vec3f" => Self::Vec3f,
            "string" => Self::String,
            "resource" => Self::Resource,
            _ => Self::None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec3f => "vec3f",
            Self::String => "string",
            Self::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Value payload carried by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// Vector
    Vec3f(Vec3),
    /// String
    String(String),
    /// Native resource handle
    Resource(ResourceHandle),
}

impl Value {
    /// Semantic type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Vec3f(_) => ValueType::Vec3f,
            Self::String(_) => ValueType::String,
            Self::Resource(_) => ValueType::Resource,
        }
    }

    /// Parse the textual form used by external descriptions
    ///
    /// Vectors accept three components separated by whitespace or commas,
    /// or a single component broadcast to all three.
    pub fn parse(value_type: ValueType, text: &str) -> Result<Self, String> {
        let text = text.trim();
        match value_type {
            ValueType::Bool => match text {
                "true" | "1" | "on" => Ok(Self::Bool(true)),
                "false" | "0" | "off" => Ok(Self::Bool(false)),
                _ => Err(format!("'{text}' is not a bool")),
            },
            ValueType::Int => text
                .parse()
                .map(Self::Int)
                .map_err(|_| format!("'{text}' is not an int")),
            ValueType::Float => text
                .parse()
                .map(Self::Float)
                .map_err(|_| format!("'{text}' is not a float")),
            ValueType::Vec3f => {
                let parts = text
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|s| !s.is_empty())
                    .map(str::parse::<f32>)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| format!("'{text}' is not a vec3f"))?;
                match parts.as_slice() {
                    [v] => Ok(Self::Vec3f(Vec3::repeat(*v))),
                    [x, y, z] => Ok(Self::Vec3f(Vec3::new(*x, *y, *z))),
                    _ => Err(format!("'{text}' needs 1 or 3 components")),
                }
            }
            ValueType::String => Ok(Self::String(text.to_string())),
            ValueType::Resource | ValueType::None => {
                Err(format!("{value_type} values cannot be parsed from text"))
            }
        }
    }

    /// Clamp into `[lo, hi]`, component-wise for vectors
    ///
    /// Non-numeric values and bounds of a different type are returned unchanged.
    #[must_use]
    pub fn clamped(&self, lo: &Value, hi: &Value) -> Value {
        match (self, lo, hi) {
            (Self::Int(v), Self::Int(lo), Self::Int(hi)) => Self::Int((*v).max(*lo).min(*hi)),
            (Self::Float(v), Self::Float(lo), Self::Float(hi)) => Self::Float(v.max(*lo).min(*hi)),
            (Self::Vec3f(v), Self::Vec3f(lo), Self::Vec3f(hi)) => Self::Vec3f(v.sup(lo).inf(hi)),
            _ => self.clone(),
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float payload
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Vector payload
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3f(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Resource payload
    pub fn as_resource(&self) -> Option<ResourceHandle> {
        match self {
            Self::Resource(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Self::Vec3f(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

bitflags! {
    /// Validation and UI hints attached to a node
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        /// Must carry a value at commit time
        const REQUIRED = 1 << 0;
        /// Accepts min/max bounds; values are clamped into them
        const VALID_MIN_MAX = 1 << 1;
        /// Edit with a slider
        const GUI_SLIDER = 1 << 2;
        /// Edit with a color picker
        const GUI_COLOR = 1 << 3;
    }
}
