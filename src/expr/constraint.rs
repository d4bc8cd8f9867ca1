use crate::expr::{LinearExpression, Variable};
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// The relation of a `LinearConstraint` to zero.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ConstraintKind {
    /// `e = 0`
    Equality,
    /// `e != 0`
    Disequation,
    /// `e <= 0`
    Inequality,
    /// `e < 0`
    StrictInequality,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Equality => write!(f, "="),
            Self::Disequation => write!(f, "!="),
            Self::Inequality => write!(f, "<="),
            Self::StrictInequality => write!(f, "<"),
        }
    }
}

/// A linear constraint `e op 0`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct LinearConstraint {
    expression: LinearExpression,
    kind: ConstraintKind,
}

impl LinearConstraint {
    pub fn new(expression: LinearExpression, kind: ConstraintKind) -> Self {
        Self { expression, kind }
    }

    /// `lhs = rhs`
    pub fn equal(lhs: LinearExpression, rhs: LinearExpression) -> Self {
        Self::new(lhs - rhs, ConstraintKind::Equality)
    }

    /// `lhs != rhs`
    pub fn not_equal(lhs: LinearExpression, rhs: LinearExpression) -> Self {
        Self::new(lhs - rhs, ConstraintKind::Disequation)
    }

    /// `lhs <= rhs`
    pub fn less_or_equal(lhs: LinearExpression, rhs: LinearExpression) -> Self {
        Self::new(lhs - rhs, ConstraintKind::Inequality)
    }

    /// `lhs < rhs`
    pub fn less_than(lhs: LinearExpression, rhs: LinearExpression) -> Self {
        Self::new(lhs - rhs, ConstraintKind::StrictInequality)
    }

    /// `lhs >= rhs`
    pub fn greater_or_equal(lhs: LinearExpression, rhs: LinearExpression) -> Self {
        Self::less_or_equal(rhs, lhs)
    }

    /// `lhs > rhs`
    pub fn greater_than(lhs: LinearExpression, rhs: LinearExpression) -> Self {
        Self::less_than(rhs, lhs)
    }

    /// The constraint `0 = 0`.
    pub fn tautology() -> Self {
        Self::new(LinearExpression::default(), ConstraintKind::Equality)
    }

    /// The constraint `1 <= 0`.
    pub fn contradiction() -> Self {
        Self::new(
            LinearExpression::constant(BigInt::one()),
            ConstraintKind::Inequality,
        )
    }

    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Returns all variables of this constraint, ordered by variable.
    pub fn variables(&self) -> Vec<&Variable> {
        self.expression.variables()
    }

    /// Returns the truth value of a variable-free constraint, None otherwise.
    pub fn evaluate(&self) -> Option<bool> {
        if !self.expression.is_constant() {
            return None;
        }
        let value = self.expression.constant_term();
        Some(match self.kind {
            ConstraintKind::Equality => value.is_zero(),
            ConstraintKind::Disequation => !value.is_zero(),
            ConstraintKind::Inequality => !value.is_positive(),
            ConstraintKind::StrictInequality => value.is_negative(),
        })
    }

    pub fn is_tautology(&self) -> bool {
        self.evaluate() == Some(true)
    }

    pub fn is_contradiction(&self) -> bool {
        self.evaluate() == Some(false)
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.evaluate() {
            Some(true) => write!(f, "true"),
            Some(false) => write!(f, "false"),
            None => {
                let rhs = -self.expression.constant_term();
                write!(
                    f,
                    "{} {} {}",
                    self.expression.without_constant(),
                    self.kind,
                    rhs
                )
            }
        }
    }
}
