//! Type checking of control flow graphs.
//!
//! Every statement is checked in isolation against the rules of its kind.
//! Checking stops at the first violation.

mod error;

pub use self::error::{TypeError, TypeErrorKind};

use crate::cfg::{BasicBlock, ControlFlowGraph, Statement};
use crate::error::Result;
use crate::expr::{LinearConstraint, LinearExpression, Variable};
use crate::util::Validate;
use tracing::{debug, trace};

type CheckResult = std::result::Result<(), TypeError>;

/// Type checks every statement of the graph in block order, then statement order.
pub fn type_check(cfg: &ControlFlowGraph) -> CheckResult {
    TypeChecker::new().check_cfg(cfg)
}

impl Validate for ControlFlowGraph {
    fn validate(&self) -> Result<()> {
        Ok(type_check(self)?)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TypeChecker {}

impl TypeChecker {
    pub fn new() -> Self {
        Self {}
    }

    pub fn check_cfg(&self, cfg: &ControlFlowGraph) -> CheckResult {
        for block in cfg.blocks() {
            self.check_block(block)?;
        }
        Ok(())
    }

    pub fn check_block(&self, block: &BasicBlock) -> CheckResult {
        trace!(label = %block.label(), statements = block.len(), "type checking block");
        for statement in block.statements() {
            self.check_statement(statement).map_err(|error| {
                debug!(label = %block.label(), kind = ?error.kind(), "type error");
                error.in_block(block.label())
            })?;
        }
        Ok(())
    }

    pub fn check_statement(&self, statement: &Statement) -> CheckResult {
        let rules = Rules { statement };
        match statement {
            Statement::BinaryOp {
                lhs, left, right, ..
            } => rules.binary_op(lhs, left, right),
            Statement::Assign { lhs, rhs } => rules.assign(lhs, rhs),
            Statement::Assume { constraint } => rules.constraint(constraint, "assume"),
            Statement::Assert { constraint } => rules.constraint(constraint, "assert"),
            Statement::Select {
                lhs,
                cond,
                left,
                right,
            } => rules.select(lhs, cond, left, right),
            Statement::Havoc { .. } => Ok(()),
            Statement::ArrayInit {
                array,
                elem_size,
                lb,
                ub,
                value,
            } => rules.array_init(array, elem_size, lb, ub, value),
            Statement::ArrayStore {
                array,
                elem_size,
                lb,
                ub,
                value,
                singleton,
            } => rules.array_store(array, elem_size, lb, ub, value, *singleton),
            Statement::ArrayLoad {
                lhs,
                array,
                elem_size,
                ..
            } => rules.array_load(lhs, array, elem_size),
            Statement::Skip => Ok(()),
        }
    }
}

/// Bitwidth of a variable, zero if it has none.
fn bitwidth(variable: &Variable) -> u32 {
    variable.bitwidth().unwrap_or(0)
}

/// Primitive checks, reporting violations against `statement`.
struct Rules<'s> {
    statement: &'s Statement,
}

impl<'s> Rules<'s> {
    fn error<S>(&self, kind: TypeErrorKind, message: S) -> TypeError
    where
        S: Into<String>,
    {
        TypeError::new(kind, message, self.statement)
    }

    fn numeric(&self, variable: &Variable, what: &str) -> CheckResult {
        if variable.is_integer() {
            return Ok(());
        }
        Err(self.error(
            TypeErrorKind::NotNumeric,
            format!(
                "{} `{}` must be an integer but is {}",
                what,
                variable,
                variable.ty()
            ),
        ))
    }

    /// Applies only to integers.
    fn wide_if_integer(&self, variable: &Variable, what: &str) -> CheckResult {
        if variable.is_integer() && bitwidth(variable) <= 1 {
            return Err(self.error(
                TypeErrorKind::BitwidthTooNarrow,
                format!(
                    "{} `{}` must have bitwidth > 1 but has {}",
                    what,
                    variable,
                    bitwidth(variable)
                ),
            ));
        }
        Ok(())
    }

    fn same_type(&self, reference: &Variable, variable: &Variable, what: &str) -> CheckResult {
        if reference.ty() == variable.ty() {
            return Ok(());
        }
        Err(self.error(
            TypeErrorKind::TypeMismatch,
            format!(
                "{}: `{}` is {} but `{}` is {}",
                what,
                variable,
                variable.ty(),
                reference,
                reference.ty()
            ),
        ))
    }

    /// Only meaningful for integers, assumes both have the same type.
    fn same_bitwidth(&self, reference: &Variable, variable: &Variable, what: &str) -> CheckResult {
        if !reference.is_integer() || bitwidth(reference) == bitwidth(variable) {
            return Ok(());
        }
        Err(self.error(
            TypeErrorKind::BitwidthMismatch,
            format!(
                "{}: `{}` has bitwidth {} but `{}` has bitwidth {}",
                what,
                variable,
                bitwidth(variable),
                reference,
                bitwidth(reference)
            ),
        ))
    }

    fn same_type_and_bitwidth(
        &self,
        reference: &Variable,
        variable: &Variable,
        what: &str,
    ) -> CheckResult {
        self.same_type(reference, variable, what)?;
        self.same_bitwidth(reference, variable, what)
    }

    fn constant_or_variable(&self, expr: &LinearExpression, what: &str) -> CheckResult {
        if expr.is_constant() || expr.get_variable().is_some() {
            return Ok(());
        }
        Err(self.error(
            TypeErrorKind::InvalidOperand,
            format!("{} must be a number or a variable but is `{}`", what, expr),
        ))
    }

    fn array(&self, variable: &Variable) -> CheckResult {
        if variable.is_array() {
            return Ok(());
        }
        Err(self.error(
            TypeErrorKind::NotAnArray,
            format!("`{}` must be an array variable", variable),
        ))
    }

    /// `array` is an array whose element type matches `scalar`.
    fn array_and_scalar(&self, array: &Variable, scalar: &Variable) -> CheckResult {
        self.array(array)?;
        if scalar.is_integer() {
            return Ok(());
        }
        Err(self.error(
            TypeErrorKind::ArrayScalarInconsistent,
            format!(
                "`{}` and `{}` do not have consistent types",
                array, scalar
            ),
        ))
    }

    fn assigned(&self, lhs: &Variable) -> CheckResult {
        self.numeric(lhs, "lhs")?;
        self.wide_if_integer(lhs, "lhs")
    }

    fn binary_op(
        &self,
        lhs: &Variable,
        left: &LinearExpression,
        right: &LinearExpression,
    ) -> CheckResult {
        self.assigned(lhs)?;

        match left.get_variable() {
            Some(variable) => self.same_type_and_bitwidth(lhs, variable, "first operand")?,
            None => {
                return Err(self.error(
                    TypeErrorKind::InvalidOperand,
                    format!("first binary operand must be a variable but is `{}`", left),
                ))
            }
        }

        // A constant second operand fits any integer type.
        if let Some(variable) = right.get_variable() {
            self.same_type_and_bitwidth(lhs, variable, "second operand")?;
        }

        Ok(())
    }

    fn assign(&self, lhs: &Variable, rhs: &LinearExpression) -> CheckResult {
        self.assigned(lhs)?;
        for variable in rhs.variables() {
            self.same_type_and_bitwidth(lhs, variable, "assigned expression")?;
        }
        Ok(())
    }

    fn constraint(&self, constraint: &LinearConstraint, what: &str) -> CheckResult {
        let mut reference: Option<&Variable> = None;
        for variable in constraint.variables() {
            self.numeric(variable, &format!("{} variable", what))?;
            let reference = *reference.get_or_insert(variable);
            self.same_type_and_bitwidth(reference, variable, &format!("{} variables", what))?;
        }
        Ok(())
    }

    fn select(
        &self,
        lhs: &Variable,
        cond: &LinearConstraint,
        left: &LinearExpression,
        right: &LinearExpression,
    ) -> CheckResult {
        self.assigned(lhs)?;

        for variable in left.variables().into_iter().chain(right.variables()) {
            self.same_type_and_bitwidth(lhs, variable, "select operand")?;
        }

        // The condition may have another bitwidth than the operands.
        let mut reference: Option<&Variable> = None;
        for variable in cond.variables() {
            self.numeric(variable, "select condition variable")?;
            let reference = *reference.get_or_insert(variable);
            self.same_type(lhs, variable, "select condition")?;
            self.same_type_and_bitwidth(reference, variable, "select condition variables")?;
        }

        Ok(())
    }

    fn array_init(
        &self,
        array: &Variable,
        elem_size: &LinearExpression,
        lb: &LinearExpression,
        ub: &LinearExpression,
        value: &LinearExpression,
    ) -> CheckResult {
        self.array(array)?;
        self.constant_or_variable(elem_size, "element size")?;
        self.constant_or_variable(lb, "lower bound")?;
        self.constant_or_variable(ub, "upper bound")?;
        self.constant_or_variable(value, "array value")?;
        if let Some(variable) = value.get_variable() {
            self.array_and_scalar(array, variable)?;
        }
        Ok(())
    }

    fn array_store(
        &self,
        array: &Variable,
        elem_size: &LinearExpression,
        lb: &LinearExpression,
        ub: &LinearExpression,
        value: &LinearExpression,
        singleton: bool,
    ) -> CheckResult {
        if singleton && lb != ub {
            return Err(self.error(
                TypeErrorKind::SingletonBoundMismatch,
                format!(
                    "lower bound `{}` and upper bound `{}` must be equal because the store is a singleton",
                    lb, ub
                ),
            ));
        }
        // Indices may be arbitrary linear expressions.
        self.array(array)?;
        self.constant_or_variable(elem_size, "element size")?;
        self.constant_or_variable(value, "array value")?;
        if let Some(variable) = value.get_variable() {
            self.array_and_scalar(array, variable)?;
        }
        Ok(())
    }

    fn array_load(
        &self,
        lhs: &Variable,
        array: &Variable,
        elem_size: &LinearExpression,
    ) -> CheckResult {
        self.array(array)?;
        self.constant_or_variable(elem_size, "element size")?;
        self.array_and_scalar(array, lhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::{BinaryOperator, Label};
    use crate::error::ErrorKind;

    fn int(name: &str, bits: u32) -> Variable {
        Variable::integer(name, bits)
    }

    fn arr(name: &str) -> Variable {
        Variable::array(name)
    }

    fn var(variable: &Variable) -> LinearExpression {
        LinearExpression::variable(variable.clone())
    }

    fn num(value: i64) -> LinearExpression {
        LinearExpression::constant(value)
    }

    fn check(statement: Statement) -> CheckResult {
        TypeChecker::new().check_statement(&statement)
    }

    fn error_kind(statement: Statement) -> Option<TypeErrorKind> {
        check(statement).err().map(|error| error.kind())
    }

    fn add(lhs: &Variable, left: LinearExpression, right: LinearExpression) -> Statement {
        Statement::binary_op(lhs.clone(), BinaryOperator::Add, left, right)
    }

    #[test]
    fn test_binary_op_with_matching_operands_should_pass() {
        let (x, y) = (int("x", 32), int("y", 32));

        assert!(check(add(&x, var(&x), var(&y))).is_ok());
        assert!(check(add(&x, var(&x), num(1))).is_ok());
    }

    #[test]
    fn test_binary_op_with_array_operand_should_fail_with_type_mismatch() {
        // x = x + y, where y is an array
        let (x, y) = (int("x", 32), arr("y"));

        assert_eq!(
            error_kind(add(&x, var(&x), var(&y))),
            Some(TypeErrorKind::TypeMismatch)
        );
    }

    #[test]
    fn test_binary_op_with_non_variable_first_operand_should_fail() {
        let (x, y) = (int("x", 32), int("y", 32));

        assert_eq!(
            error_kind(add(&x, num(1), var(&y))),
            Some(TypeErrorKind::InvalidOperand)
        );
        assert_eq!(
            error_kind(add(&x, LinearExpression::term(2, y.clone()), var(&y))),
            Some(TypeErrorKind::InvalidOperand)
        );
    }

    #[test]
    fn test_binary_op_with_different_bitwidth_should_fail() {
        let (x, y) = (int("x", 32), int("y", 64));

        assert_eq!(
            error_kind(add(&x, var(&y), num(1))),
            Some(TypeErrorKind::BitwidthMismatch)
        );
        assert_eq!(
            error_kind(add(&x, var(&x), var(&y))),
            Some(TypeErrorKind::BitwidthMismatch)
        );
    }

    #[test]
    fn test_binary_op_with_narrow_or_non_numeric_lhs_should_fail() {
        let (b, a) = (int("b", 1), arr("a"));
        let unbounded = Variable::integer_unbounded("u");

        assert_eq!(
            error_kind(add(&b, var(&b), num(1))),
            Some(TypeErrorKind::BitwidthTooNarrow)
        );
        assert_eq!(
            error_kind(add(&unbounded, var(&unbounded), num(1))),
            Some(TypeErrorKind::BitwidthTooNarrow)
        );
        assert_eq!(
            error_kind(add(&a, var(&a), num(1))),
            Some(TypeErrorKind::NotNumeric)
        );
    }

    #[test]
    fn test_assign_should_require_matching_variables() {
        let (x, y, z) = (int("x", 32), int("y", 32), int("z", 8));

        assert!(check(Statement::assign(
            x.clone(),
            LinearExpression::term(2, y.clone()) + num(1)
        ))
        .is_ok());
        assert!(check(Statement::assign(x.clone(), num(5))).is_ok());
        assert_eq!(
            error_kind(Statement::assign(x.clone(), var(&y) + var(&z))),
            Some(TypeErrorKind::BitwidthMismatch)
        );
        assert_eq!(
            error_kind(Statement::assign(x.clone(), var(&arr("a")))),
            Some(TypeErrorKind::TypeMismatch)
        );
        assert_eq!(
            error_kind(Statement::assign(int("b", 1), num(0))),
            Some(TypeErrorKind::BitwidthTooNarrow)
        );
    }

    #[test]
    fn test_assume_with_different_bitwidths_should_fail() {
        // assume(x > y), x: 8 bits, y: 16 bits
        let (x, y) = (int("x", 8), int("y", 16));

        let error = check(Statement::assume(LinearConstraint::greater_than(
            var(&x),
            var(&y),
        )))
        .unwrap_err();

        assert_eq!(error.kind(), TypeErrorKind::BitwidthMismatch);
        assert_eq!(error.statement(), "assume(-x + y < 0)");
    }

    #[test]
    fn test_assume_and_assert_should_share_rules() {
        let (x, y) = (int("x", 8), int("y", 8));
        let a = arr("a");

        let consistent = LinearConstraint::less_or_equal(var(&x), var(&y) + num(3));
        assert!(check(Statement::assume(consistent.clone())).is_ok());
        assert!(check(Statement::assert(consistent)).is_ok());
        assert!(check(Statement::assume(LinearConstraint::tautology())).is_ok());

        let with_array = LinearConstraint::equal(var(&a), num(0));
        assert_eq!(
            error_kind(Statement::assume(with_array.clone())),
            Some(TypeErrorKind::NotNumeric)
        );
        let error = check(Statement::assert(with_array)).unwrap_err();
        assert_eq!(error.kind(), TypeErrorKind::NotNumeric);
        assert!(error.message().starts_with("assert variable"));

        let narrow = LinearConstraint::equal(var(&x), var(&int("w", 1)));
        assert_eq!(
            error_kind(Statement::assert(narrow)),
            Some(TypeErrorKind::BitwidthMismatch)
        );
    }

    #[test]
    fn test_select_condition_may_have_another_bitwidth_than_operands() {
        let (z, l, r) = (int("z", 32), int("l", 32), int("r", 32));
        let (c1, c2) = (int("c1", 8), int("c2", 8));
        let cond = LinearConstraint::less_than(var(&c1), var(&c2));

        assert!(check(Statement::select(z, cond, var(&l), var(&r) + num(1))).is_ok());
    }

    #[test]
    fn test_select_should_fail_on_inconsistent_operands_or_condition() {
        let (z, l, narrow) = (int("z", 32), int("l", 32), int("n", 16));
        let (c1, c2) = (int("c1", 8), int("c2", 16));
        let good_cond = LinearConstraint::less_than(var(&c1), num(0));

        assert_eq!(
            error_kind(Statement::select(
                z.clone(),
                good_cond.clone(),
                var(&l),
                var(&narrow)
            )),
            Some(TypeErrorKind::BitwidthMismatch)
        );
        assert_eq!(
            error_kind(Statement::select(
                z.clone(),
                LinearConstraint::less_than(var(&c1), var(&c2)),
                var(&l),
                var(&l)
            )),
            Some(TypeErrorKind::BitwidthMismatch)
        );
        assert_eq!(
            error_kind(Statement::select(
                z.clone(),
                LinearConstraint::equal(var(&arr("a")), num(0)),
                var(&l),
                var(&l)
            )),
            Some(TypeErrorKind::NotNumeric)
        );
        assert_eq!(
            error_kind(Statement::select(int("b", 1), good_cond, num(0), num(1))),
            Some(TypeErrorKind::BitwidthTooNarrow)
        );
    }

    #[test]
    fn test_havoc_and_skip_should_always_pass() {
        assert!(check(Statement::havoc(arr("a"))).is_ok());
        assert!(check(Statement::havoc(int("b", 1))).is_ok());
        assert!(check(Statement::skip()).is_ok());
    }

    #[test]
    fn test_array_init() {
        let (a, v, i) = (arr("a"), int("v", 32), int("i", 64));

        assert!(check(Statement::array_init(
            a.clone(),
            num(4),
            num(0),
            var(&i),
            var(&v)
        ))
        .is_ok());
        assert_eq!(
            error_kind(Statement::array_init(
                v.clone(),
                num(4),
                num(0),
                num(9),
                num(0)
            )),
            Some(TypeErrorKind::NotAnArray)
        );
        assert_eq!(
            error_kind(Statement::array_init(
                a.clone(),
                num(4),
                var(&i) + num(1),
                num(9),
                num(0)
            )),
            Some(TypeErrorKind::InvalidOperand)
        );
        assert_eq!(
            error_kind(Statement::array_init(
                a.clone(),
                LinearExpression::term(2, i.clone()),
                num(0),
                num(9),
                num(0)
            )),
            Some(TypeErrorKind::InvalidOperand)
        );
        assert_eq!(
            error_kind(Statement::array_init(
                a.clone(),
                num(4),
                num(0),
                num(9),
                var(&arr("b"))
            )),
            Some(TypeErrorKind::ArrayScalarInconsistent)
        );
    }

    #[test]
    fn test_singleton_array_store_requires_equal_bounds() {
        let (a, v) = (arr("a"), int("v", 32));

        assert!(check(Statement::array_store(
            a.clone(),
            num(4),
            num(5),
            num(5),
            var(&v),
            true
        ))
        .is_ok());
        assert_eq!(
            error_kind(Statement::array_store(
                a.clone(),
                num(4),
                num(5),
                num(6),
                var(&v),
                true
            )),
            Some(TypeErrorKind::SingletonBoundMismatch)
        );
        assert!(check(Statement::array_store(a, num(4), num(5), num(6), var(&v), false)).is_ok());
    }

    #[test]
    fn test_array_store_allows_linear_indices_but_not_linear_values() {
        let (a, v, i) = (arr("a"), int("v", 32), int("i", 64));
        let index = var(&i) + num(1);

        assert!(check(Statement::array_store(
            a.clone(),
            num(4),
            index.clone(),
            index.clone(),
            num(0),
            true
        ))
        .is_ok());
        assert_eq!(
            error_kind(Statement::array_store(
                a.clone(),
                num(4),
                index.clone(),
                index,
                var(&v) + num(1),
                false
            )),
            Some(TypeErrorKind::InvalidOperand)
        );
        assert_eq!(
            error_kind(Statement::array_store(
                v.clone(),
                num(4),
                num(0),
                num(0),
                num(0),
                false
            )),
            Some(TypeErrorKind::NotAnArray)
        );
        assert_eq!(
            error_kind(Statement::array_store(
                a,
                num(4),
                num(0),
                num(0),
                var(&arr("b")),
                false
            )),
            Some(TypeErrorKind::ArrayScalarInconsistent)
        );
    }

    #[test]
    fn test_array_load() {
        let (a, x, sz) = (arr("a"), int("x", 32), int("sz", 64));

        assert!(check(Statement::array_load(x.clone(), a.clone(), var(&sz), num(0))).is_ok());
        assert_eq!(
            error_kind(Statement::array_load(
                arr("b"),
                a.clone(),
                num(4),
                num(0)
            )),
            Some(TypeErrorKind::ArrayScalarInconsistent)
        );
        assert_eq!(
            error_kind(Statement::array_load(x.clone(), x.clone(), num(4), num(0))),
            Some(TypeErrorKind::NotAnArray)
        );
        assert_eq!(
            error_kind(Statement::array_load(x, a, var(&sz) + num(1), num(0))),
            Some(TypeErrorKind::InvalidOperand)
        );
    }

    #[test]
    fn test_type_check_should_report_first_violation_in_block_order() {
        // Given: entry is fine, bad1 and bad2 are both ill-typed
        let (x, y) = (int("x", 32), arr("y"));
        let mut cfg = ControlFlowGraph::with_exit("entry", "exit");
        cfg.insert("entry").havoc(x.clone());
        cfg.insert("bad1")
            .skip()
            .binary_op(x.clone(), BinaryOperator::Add, var(&x), var(&y));
        cfg.insert("bad2").assign(int("b", 1), num(0));

        // When
        let error = type_check(&cfg).unwrap_err();

        // Then
        assert_eq!(error.kind(), TypeErrorKind::TypeMismatch);
        assert_eq!(error.block(), Some(&Label::from("bad1")));
        assert_eq!(error.statement(), "x = add x, y");
        assert_eq!(
            error.to_string(),
            "(type checking) second operand: `y` is array(int) but `x` is int in `x = add x, y` of block bad1"
        );
    }

    #[test]
    fn test_type_check_should_pass_well_typed_cfg() {
        let (x, y, a) = (int("x", 32), int("y", 32), arr("a"));
        let mut cfg = ControlFlowGraph::with_exit("entry", "exit");
        cfg.insert("entry")
            .havoc(y.clone())
            .assign(x.clone(), var(&y) + num(1))
            .array_store(a.clone(), num(4), num(0), num(0), var(&x), true);
        cfg.insert("exit")
            .array_load(y.clone(), a, num(4), num(0))
            .assert(LinearConstraint::equal(var(&x), var(&y)));

        assert!(type_check(&cfg).is_ok());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_should_wrap_type_error() {
        let mut cfg = ControlFlowGraph::new("entry");
        cfg.insert("entry").assume(LinearConstraint::greater_than(
            var(&int("x", 8)),
            var(&int("y", 16)),
        ));

        match cfg.validate().unwrap_err().kind() {
            ErrorKind::TypeCheck(error) => {
                assert_eq!(error.kind(), TypeErrorKind::BitwidthMismatch)
            }
            kind => panic!("unexpected error {:?}", kind),
        }
    }
}
