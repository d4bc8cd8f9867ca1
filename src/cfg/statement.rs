use crate::error::{Error, ErrorKind};
use crate::expr::{LinearConstraint, LinearExpression, Variable};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
}

impl BinaryOperator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::SDiv => "sdiv",
            Self::UDiv => "udiv",
            Self::SRem => "srem",
            Self::URem => "urem",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::LShr => "lshr",
            Self::AShr => "ashr",
        }
    }
}

impl FromStr for BinaryOperator {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "add" => Self::Add,
            "sub" => Self::Sub,
            "mul" => Self::Mul,
            "sdiv" => Self::SDiv,
            "udiv" => Self::UDiv,
            "srem" => Self::SRem,
            "urem" => Self::URem,
            "and" => Self::And,
            "or" => Self::Or,
            "xor" => Self::Xor,
            "shl" => Self::Shl,
            "lshr" => Self::LShr,
            "ashr" => Self::AShr,
            _ => {
                return Err(
                    ErrorKind::Parser(format!("unknown binary operator `{}`", name)).into(),
                )
            }
        })
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Statement {
    /// `lhs = left op right`
    BinaryOp {
        lhs: Variable,
        op: BinaryOperator,
        left: LinearExpression,
        right: LinearExpression,
    },
    /// `lhs = rhs`
    Assign {
        lhs: Variable,
        rhs: LinearExpression,
    },
    /// Restrict the executions to those satisfying the constraint.
    Assume { constraint: LinearConstraint },
    /// Check that the constraint holds.
    Assert { constraint: LinearConstraint },
    /// `lhs = cond ? left : right`
    Select {
        lhs: Variable,
        cond: LinearConstraint,
        left: LinearExpression,
        right: LinearExpression,
    },
    /// Assign a non-deterministic value to the variable.
    Havoc { variable: Variable },
    /// `array[lb..ub] = value`
    ArrayInit {
        array: Variable,
        elem_size: LinearExpression,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
    },
    /// `array[lb..ub] = value`, where `lb == ub` if `singleton` is set.
    ArrayStore {
        array: Variable,
        elem_size: LinearExpression,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
        singleton: bool,
    },
    /// `lhs = array[index]`
    ArrayLoad {
        lhs: Variable,
        array: Variable,
        elem_size: LinearExpression,
        index: LinearExpression,
    },
    Skip,
}

impl Statement {
    pub fn binary_op(
        lhs: Variable,
        op: BinaryOperator,
        left: LinearExpression,
        right: LinearExpression,
    ) -> Self {
        Self::BinaryOp {
            lhs,
            op,
            left,
            right,
        }
    }

    pub fn assign(lhs: Variable, rhs: LinearExpression) -> Self {
        Self::Assign { lhs, rhs }
    }

    pub fn assume(constraint: LinearConstraint) -> Self {
        Self::Assume { constraint }
    }

    pub fn assert(constraint: LinearConstraint) -> Self {
        Self::Assert { constraint }
    }

    pub fn select(
        lhs: Variable,
        cond: LinearConstraint,
        left: LinearExpression,
        right: LinearExpression,
    ) -> Self {
        Self::Select {
            lhs,
            cond,
            left,
            right,
        }
    }

    pub fn havoc(variable: Variable) -> Self {
        Self::Havoc { variable }
    }

    pub fn array_init(
        array: Variable,
        elem_size: LinearExpression,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
    ) -> Self {
        Self::ArrayInit {
            array,
            elem_size,
            lb,
            ub,
            value,
        }
    }

    pub fn array_store(
        array: Variable,
        elem_size: LinearExpression,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
        singleton: bool,
    ) -> Self {
        Self::ArrayStore {
            array,
            elem_size,
            lb,
            ub,
            value,
            singleton,
        }
    }

    pub fn array_load(
        lhs: Variable,
        array: Variable,
        elem_size: LinearExpression,
        index: LinearExpression,
    ) -> Self {
        Self::ArrayLoad {
            lhs,
            array,
            elem_size,
            index,
        }
    }

    pub fn skip() -> Self {
        Self::Skip
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BinaryOp {
                lhs,
                op,
                left,
                right,
            } => write!(f, "{} = {} {}, {}", lhs, op, left, right),
            Self::Assign { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            Self::Assume { constraint } => write!(f, "assume({})", constraint),
            Self::Assert { constraint } => write!(f, "assert({})", constraint),
            Self::Select {
                lhs,
                cond,
                left,
                right,
            } => write!(f, "{} = select({}, {}, {})", lhs, cond, left, right),
            Self::Havoc { variable } => write!(f, "havoc({})", variable),
            Self::ArrayInit {
                array,
                elem_size,
                lb,
                ub,
                value,
            } => write!(
                f,
                "array_init({}, {}, {}, {}, {})",
                array, elem_size, lb, ub, value
            ),
            Self::ArrayStore {
                array,
                elem_size,
                lb,
                ub,
                value,
                singleton,
            } => {
                write!(
                    f,
                    "array_store({}, {}, {}, {}, {}",
                    array, elem_size, lb, ub, value
                )?;
                if *singleton {
                    write!(f, ", singleton")?;
                }
                write!(f, ")")
            }
            Self::ArrayLoad {
                lhs,
                array,
                elem_size,
                index,
            } => write!(
                f,
                "{} = array_load({}, {}, {})",
                lhs, array, elem_size, index
            ),
            Self::Skip => write!(f, "skip"),
        }
    }
}
