use crate::cfg::{BinaryOperator, Label, Statement};
use crate::expr::{LinearConstraint, LinearExpression, Variable};
use std::fmt;

/// A labeled, straight-line sequence of statements.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct BasicBlock {
    /// The label of the block.
    label: Label,
    /// The statements of this block, in execution order.
    statements: Vec<Statement>,
}

impl BasicBlock {
    pub fn new<L>(label: L) -> Self
    where
        L: Into<Label>,
    {
        Self {
            label: label.into(),
            statements: Vec::new(),
        }
    }

    /// Returns the label of this `BasicBlock`
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Returns the statements of this `BasicBlock`
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the number of statements in this `BasicBlock`.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if this `BasicBlock` has no `Statement`
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Appends the statement to the end of this block.
    pub fn push(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    /// Adds a binary operation to the end of this block.
    pub fn binary_op(
        &mut self,
        lhs: Variable,
        op: BinaryOperator,
        left: LinearExpression,
        right: LinearExpression,
    ) -> &mut Self {
        self.push(Statement::binary_op(lhs, op, left, right))
    }

    /// Adds an assignment to the end of this block.
    pub fn assign(&mut self, lhs: Variable, rhs: LinearExpression) -> &mut Self {
        self.push(Statement::assign(lhs, rhs))
    }

    /// Adds an assumption to the end of this block.
    pub fn assume(&mut self, constraint: LinearConstraint) -> &mut Self {
        self.push(Statement::assume(constraint))
    }

    /// Adds an assertion to the end of this block.
    pub fn assert(&mut self, constraint: LinearConstraint) -> &mut Self {
        self.push(Statement::assert(constraint))
    }

    /// Adds a select to the end of this block.
    pub fn select(
        &mut self,
        lhs: Variable,
        cond: LinearConstraint,
        left: LinearExpression,
        right: LinearExpression,
    ) -> &mut Self {
        self.push(Statement::select(lhs, cond, left, right))
    }

    /// Adds a havoc to the end of this block.
    pub fn havoc(&mut self, variable: Variable) -> &mut Self {
        self.push(Statement::havoc(variable))
    }

    /// Adds an array initialization to the end of this block.
    pub fn array_init(
        &mut self,
        array: Variable,
        elem_size: LinearExpression,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
    ) -> &mut Self {
        self.push(Statement::array_init(array, elem_size, lb, ub, value))
    }

    /// Adds an array store to the end of this block.
    pub fn array_store(
        &mut self,
        array: Variable,
        elem_size: LinearExpression,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
        singleton: bool,
    ) -> &mut Self {
        self.push(Statement::array_store(
            array, elem_size, lb, ub, value, singleton,
        ))
    }

    /// Adds an array load to the end of this block.
    pub fn array_load(
        &mut self,
        lhs: Variable,
        array: Variable,
        elem_size: LinearExpression,
        index: LinearExpression,
    ) -> &mut Self {
        self.push(Statement::array_load(lhs, array, elem_size, index))
    }

    pub fn skip(&mut self) -> &mut Self {
        self.push(Statement::skip())
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for statement in &self.statements {
            writeln!(f, "  {};", statement)?;
        }
        Ok(())
    }
}
