//! Variables and linear arithmetic over them.

mod constraint;
mod linear;
mod variable;

pub use self::constraint::{ConstraintKind, LinearConstraint};
pub use self::linear::LinearExpression;
pub use self::variable::{Variable, VariableType};
