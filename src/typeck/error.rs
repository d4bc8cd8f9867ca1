use crate::cfg::{Label, Statement};
use std::error;
use std::fmt;

/// The kind of rule a statement violates.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TypeErrorKind {
    /// A variable expected to be an integer is not.
    NotNumeric,
    /// An integer variable has bitwidth <= 1 where a wide operand is required.
    BitwidthTooNarrow,
    /// Two values that must share a type do not.
    TypeMismatch,
    /// Two integer values that must share a bitwidth do not.
    BitwidthMismatch,
    /// A variable expected to be an array is not.
    NotAnArray,
    /// The element type of an array and a paired scalar disagree.
    ArrayScalarInconsistent,
    /// An operand is not of the required shape (constant or bare variable).
    InvalidOperand,
    /// Lower and upper index of a singleton array store differ.
    SingletonBoundMismatch,
}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNumeric => write!(f, "not numeric"),
            Self::BitwidthTooNarrow => write!(f, "bitwidth too narrow"),
            Self::TypeMismatch => write!(f, "type mismatch"),
            Self::BitwidthMismatch => write!(f, "bitwidth mismatch"),
            Self::NotAnArray => write!(f, "not an array"),
            Self::ArrayScalarInconsistent => write!(f, "inconsistent array and scalar types"),
            Self::InvalidOperand => write!(f, "invalid operand"),
            Self::SingletonBoundMismatch => write!(f, "singleton bound mismatch"),
        }
    }
}

/// A type violation, carrying the rendered offending statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeError {
    kind: TypeErrorKind,
    message: String,
    statement: String,
    block: Option<Label>,
}

impl TypeError {
    pub fn new<S>(kind: TypeErrorKind, message: S, statement: &Statement) -> Self
    where
        S: Into<String>,
    {
        Self {
            kind,
            message: message.into(),
            statement: statement.to_string(),
            block: None,
        }
    }

    /// Attaches the label of the block containing the offending statement.
    pub fn in_block(mut self, label: &Label) -> Self {
        self.block = Some(label.clone());
        self
    }

    pub fn kind(&self) -> TypeErrorKind {
        self.kind
    }

    /// Human readable cause.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending statement, rendered.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn block(&self) -> Option<&Label> {
        self.block.as_ref()
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(type checking) {} in `{}`",
            self.message, self.statement
        )?;
        if let Some(block) = &self.block {
            write!(f, " of block {}", block)?;
        }
        Ok(())
    }
}

impl error::Error for TypeError {}
