use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a `Variable`.
///
/// Arrays are arrays of integers, which is the only element type supported so far.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum VariableType {
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "array")]
    ArrayOfInteger,
}

impl VariableType {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::ArrayOfInteger)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "int"),
            Self::ArrayOfInteger => write!(f, "array(int)"),
        }
    }
}

/// A variable descriptor.
///
/// Variables are referenced by value from statements and expressions, the name
/// identifies the variable within a control flow graph.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Variable {
    name: String,
    ty: VariableType,
    bitwidth: Option<u32>,
}

impl Variable {
    /// Create a new `Variable` with the given name, type and optional bitwidth.
    pub fn new<S>(name: S, ty: VariableType, bitwidth: Option<u32>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            ty,
            bitwidth,
        }
    }

    /// Create a new integer `Variable` with the given bitwidth.
    pub fn integer<S>(name: S, bitwidth: u32) -> Self
    where
        S: Into<String>,
    {
        Self::new(name, VariableType::Integer, Some(bitwidth))
    }

    /// Create a new integer `Variable` without bitwidth.
    pub fn integer_unbounded<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self::new(name, VariableType::Integer, None)
    }

    /// Create a new array of integers `Variable`.
    pub fn array<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self::new(name, VariableType::ArrayOfInteger, None)
    }

    /// Gets the name of the `Variable`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the type of the `Variable`.
    pub fn ty(&self) -> VariableType {
        self.ty
    }

    /// Gets the bitwidth of the `Variable` or None if it has no bitwidth.
    pub fn bitwidth(&self) -> Option<u32> {
        self.bitwidth
    }

    pub fn is_integer(&self) -> bool {
        self.ty.is_integer()
    }

    pub fn is_array(&self) -> bool {
        self.ty.is_array()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
