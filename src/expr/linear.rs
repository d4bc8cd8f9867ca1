use crate::expr::Variable;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A linear expression `c + a_1*x_1 + ... + a_n*x_n`.
///
/// Terms with a zero coefficient are never stored, therefore two expressions
/// are equal iff they are structurally equal.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct LinearExpression {
    constant: BigInt,
    terms: BTreeMap<Variable, BigInt>,
}

impl LinearExpression {
    /// Create a new `LinearExpression` from a constant and a list of `(coefficient, variable)` terms.
    ///
    /// Terms of the same variable are merged.
    pub fn new<I>(constant: BigInt, terms: I) -> Self
    where
        I: IntoIterator<Item = (BigInt, Variable)>,
    {
        let mut expr = Self::constant(constant);
        for (coefficient, variable) in terms {
            expr.add_term(coefficient, variable);
        }
        expr
    }

    /// Create a new constant `LinearExpression`.
    pub fn constant<N>(value: N) -> Self
    where
        N: Into<BigInt>,
    {
        Self {
            constant: value.into(),
            terms: BTreeMap::new(),
        }
    }

    /// Create a new `LinearExpression` consisting of the variable only.
    pub fn variable(variable: Variable) -> Self {
        Self::term(BigInt::one(), variable)
    }

    /// Create a new `LinearExpression` `coefficient*variable`.
    pub fn term<N>(coefficient: N, variable: Variable) -> Self
    where
        N: Into<BigInt>,
    {
        let mut expr = Self::constant(BigInt::zero());
        expr.add_term(coefficient.into(), variable);
        expr
    }

    /// Adds `coefficient*variable` to this `LinearExpression`.
    pub fn add_term(&mut self, coefficient: BigInt, variable: Variable) {
        let sum = match self.terms.remove(&variable) {
            Some(existing) => existing + coefficient,
            None => coefficient,
        };
        if !sum.is_zero() {
            self.terms.insert(variable, sum);
        }
    }

    /// Returns the constant term.
    pub fn constant_term(&self) -> &BigInt {
        &self.constant
    }

    /// Returns the coefficient of the given variable, zero if it does not occur.
    pub fn coefficient(&self, variable: &Variable) -> BigInt {
        self.terms.get(variable).cloned().unwrap_or_else(BigInt::zero)
    }

    /// Returns true if no variable occurs in this expression.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the variable if this expression is exactly `1*x + 0`.
    pub fn get_variable(&self) -> Option<&Variable> {
        if !self.constant.is_zero() || self.terms.len() != 1 {
            return None;
        }
        self.terms
            .iter()
            .next()
            .filter(|(_, coefficient)| coefficient.is_one())
            .map(|(variable, _)| variable)
    }

    /// Returns all variables of this expression, ordered by variable.
    pub fn variables(&self) -> Vec<&Variable> {
        self.terms.keys().collect()
    }

    /// Returns a copy of this expression with the constant term set to zero.
    pub(crate) fn without_constant(&self) -> Self {
        Self {
            constant: BigInt::zero(),
            terms: self.terms.clone(),
        }
    }

    /// Multiplies every coefficient and the constant by `factor`.
    pub fn scale(&self, factor: &BigInt) -> Self {
        Self::new(
            &self.constant * factor,
            self.terms
                .iter()
                .map(|(variable, coefficient)| (coefficient * factor, variable.clone())),
        )
    }
}

impl Default for LinearExpression {
    fn default() -> Self {
        Self::constant(BigInt::zero())
    }
}

impl From<Variable> for LinearExpression {
    fn from(variable: Variable) -> Self {
        Self::variable(variable)
    }
}

impl From<i64> for LinearExpression {
    fn from(value: i64) -> Self {
        Self::constant(value)
    }
}

impl Add for LinearExpression {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self.constant += other.constant;
        for (variable, coefficient) in other.terms {
            self.add_term(coefficient, variable);
        }
        self
    }
}

impl Neg for LinearExpression {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(&-BigInt::one())
    }
}

impl Sub for LinearExpression {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + (-other)
    }
}

impl Mul<BigInt> for LinearExpression {
    type Output = Self;

    fn mul(self, factor: BigInt) -> Self {
        self.scale(&factor)
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut is_first = true;
        for (variable, coefficient) in &self.terms {
            if is_first {
                if coefficient.is_negative() {
                    write!(f, "-")?;
                }
            } else if coefficient.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            let magnitude = coefficient.abs();
            if magnitude.is_one() {
                write!(f, "{}", variable)?;
            } else {
                write!(f, "{}*{}", magnitude, variable)?;
            }
            is_first = false;
        }

        if is_first {
            write!(f, "{}", self.constant)
        } else if self.constant.is_negative() {
            write!(f, " - {}", self.constant.abs())
        } else if self.constant.is_positive() {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Variable {
        Variable::integer("x", 32)
    }

    fn y() -> Variable {
        Variable::integer("y", 32)
    }

    #[test]
    fn test_get_variable_should_only_accept_a_bare_variable() {
        assert_eq!(LinearExpression::variable(x()).get_variable(), Some(&x()));
        assert_eq!(LinearExpression::term(2, x()).get_variable(), None);
        assert_eq!(
            (LinearExpression::variable(x()) + LinearExpression::constant(1)).get_variable(),
            None
        );
        assert_eq!(
            (LinearExpression::variable(x()) + LinearExpression::variable(y())).get_variable(),
            None
        );
        assert_eq!(LinearExpression::constant(5).get_variable(), None);
    }

    #[test]
    fn test_terms_cancelling_out_should_give_a_constant() {
        // Given
        let expr = LinearExpression::variable(x()) + LinearExpression::constant(3);

        // When
        let result = expr - LinearExpression::variable(x());

        // Then
        assert!(result.is_constant());
        assert_eq!(result, LinearExpression::constant(3));
    }

    #[test]
    fn test_equality_should_not_depend_on_construction_order() {
        let lhs = LinearExpression::variable(x()) + LinearExpression::term(2, y());
        let rhs = LinearExpression::new(
            BigInt::zero(),
            vec![(BigInt::from(2), y()), (BigInt::one(), x())],
        );

        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_variables_should_be_ordered_and_free_of_duplicates() {
        let expr = LinearExpression::variable(y())
            + LinearExpression::variable(x())
            + LinearExpression::term(3, y());

        assert_eq!(expr.variables(), vec![&x(), &y()]);
        assert_eq!(expr.coefficient(&y()), BigInt::from(4));
    }

    #[test]
    fn test_display() {
        let expr = LinearExpression::term(2, x()) - LinearExpression::variable(y())
            + LinearExpression::constant(-3);
        assert_eq!(format!("{}", expr), "2*x - y - 3");

        assert_eq!(format!("{}", -LinearExpression::variable(x())), "-x");
        assert_eq!(format!("{}", LinearExpression::default()), "0");
    }
}
