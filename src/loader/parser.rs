//! Parser for the textual statement syntax, e.g. `x = add y, 1` or `assume(x <= 8)`.
//!
//! Variable names are resolved against the declared variables while parsing.

use crate::cfg::{BinaryOperator, Statement};
use crate::error::{ErrorKind, Result};
use crate::expr::{LinearConstraint, LinearExpression, Variable};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, anychar, char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, not, opt, recognize, value, verify},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use num_bigint::BigInt;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::str::FromStr;

const RESERVED: &[&str] = &[
    "add",
    "sub",
    "mul",
    "sdiv",
    "udiv",
    "srem",
    "urem",
    "and",
    "or",
    "xor",
    "shl",
    "lshr",
    "ashr",
    "select",
    "havoc",
    "assume",
    "assert",
    "array_init",
    "array_store",
    "array_load",
    "singleton",
    "skip",
    "true",
    "false",
];

/// Parses a single statement, resolving variable names through `variables`.
///
/// A trailing `;` is accepted.
pub fn parse_statement(text: &str, variables: &BTreeMap<String, Variable>) -> Result<Statement> {
    let parser = StatementParser::new(variables);
    parser.parse(text).map(|(_, statement)| statement).map_err(|_| {
        let message = match parser.unknown_variable() {
            Some(name) => format!("unknown variable `{}` in statement `{}`", name, text),
            None => format!("cannot parse statement `{}`", text),
        };
        ErrorKind::Parser(message).into()
    })
}

/// Right-hand sides of `x = ...` statements.
enum Rhs {
    BinaryOp(BinaryOperator, LinearExpression, LinearExpression),
    Select(LinearConstraint, LinearExpression, LinearExpression),
    ArrayLoad(Variable, LinearExpression, LinearExpression),
    Linear(LinearExpression),
}

impl Rhs {
    fn assign_to(self, lhs: Variable) -> Statement {
        match self {
            Self::BinaryOp(op, left, right) => Statement::binary_op(lhs, op, left, right),
            Self::Select(cond, left, right) => Statement::select(lhs, cond, left, right),
            Self::ArrayLoad(array, elem_size, index) => {
                Statement::array_load(lhs, array, elem_size, index)
            }
            Self::Linear(rhs) => Statement::assign(lhs, rhs),
        }
    }
}

type ConstraintBuilder = fn(LinearExpression, LinearExpression) -> LinearConstraint;

struct StatementParser<'v> {
    variables: &'v BTreeMap<String, Variable>,
    // First name which failed to resolve, reported if the whole parse fails.
    unknown: RefCell<Option<String>>,
}

impl<'v> StatementParser<'v> {
    fn new(variables: &'v BTreeMap<String, Variable>) -> Self {
        Self {
            variables,
            unknown: RefCell::new(None),
        }
    }

    fn unknown_variable(&self) -> Option<String> {
        self.unknown.borrow().clone()
    }

    fn parse<'a>(&self, text: &'a str) -> IResult<&'a str, Statement> {
        let statement = terminated(|i: &'a str| self.statement(i), opt(ws(char(';'))));
        all_consuming(statement)(text)
    }

    fn variable<'a>(&self, input: &'a str) -> IResult<&'a str, Variable> {
        let (rest, name) = ws(identifier)(input)?;
        self.resolve(input, rest, name)
    }

    /// Looks up `name`, remembering it if undeclared.
    ///
    /// Only call this once the surrounding syntax requires an operand here.
    fn resolve<'a>(
        &self,
        input: &'a str,
        rest: &'a str,
        name: &str,
    ) -> IResult<&'a str, Variable> {
        match self.variables.get(name) {
            Some(variable) => Ok((rest, variable.clone())),
            None => {
                self.unknown
                    .borrow_mut()
                    .get_or_insert_with(|| name.to_owned());
                Err(nom::Err::Error((input, nom::error::ErrorKind::MapOpt)))
            }
        }
    }

    fn term<'a>(&self, input: &'a str) -> IResult<&'a str, LinearExpression> {
        alt((
            map(
                tuple((ws(number), char('*'), |i: &'a str| self.variable(i))),
                |(coefficient, _, variable)| LinearExpression::term(coefficient, variable),
            ),
            map(ws(number), LinearExpression::constant::<BigInt>),
            map(|i: &'a str| self.variable(i), LinearExpression::variable),
        ))(input)
    }

    fn linear_expression<'a>(&self, input: &'a str) -> IResult<&'a str, LinearExpression> {
        let (input, negated) = opt(ws(char('-')))(input)?;
        let (input, first) = self.term(input)?;
        let (input, rest) = many0(pair(
            ws(alt((char('+'), char('-')))),
            |i: &'a str| self.term(i),
        ))(input)?;

        let mut expr = if negated.is_some() { -first } else { first };
        for (sign, term) in rest {
            expr = match sign {
                '+' => expr + term,
                _ => expr - term,
            };
        }
        Ok((input, expr))
    }

    fn constraint<'a>(&self, input: &'a str) -> IResult<&'a str, LinearConstraint> {
        alt((
            value(LinearConstraint::tautology(), keyword("true")),
            value(LinearConstraint::contradiction(), keyword("false")),
            map(
                tuple((
                    |i: &'a str| self.linear_expression(i),
                    ws(comparison),
                    |i: &'a str| self.linear_expression(i),
                )),
                |(lhs, build, rhs)| build(lhs, rhs),
            ),
        ))(input)
    }

    fn statement<'a>(&self, input: &'a str) -> IResult<&'a str, Statement> {
        alt((
            value(Statement::Skip, keyword("skip")),
            |i: &'a str| self.havoc(i),
            |i: &'a str| self.assume_or_assert(i),
            |i: &'a str| self.array_init(i),
            |i: &'a str| self.array_store(i),
            |i: &'a str| self.assignment(i),
        ))(input)
    }

    fn havoc<'a>(&self, input: &'a str) -> IResult<&'a str, Statement> {
        map(
            preceded(keyword("havoc"), parenthesized(|i: &'a str| self.variable(i))),
            Statement::havoc,
        )(input)
    }

    fn assume_or_assert<'a>(&self, input: &'a str) -> IResult<&'a str, Statement> {
        let assume = map(
            preceded(keyword("assume"), parenthesized(|i: &'a str| self.constraint(i))),
            Statement::assume,
        );
        let assert = map(
            preceded(keyword("assert"), parenthesized(|i: &'a str| self.constraint(i))),
            Statement::assert,
        );
        alt((assume, assert))(input)
    }

    fn array_init<'a>(&self, input: &'a str) -> IResult<&'a str, Statement> {
        // array_init(a, sz, lb, ub, v)
        let arguments = tuple((
            |i: &'a str| self.variable(i),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
        ));
        map(
            preceded(keyword("array_init"), parenthesized(arguments)),
            |(array, elem_size, lb, ub, value)| {
                Statement::array_init(array, elem_size, lb, ub, value)
            },
        )(input)
    }

    fn array_store<'a>(&self, input: &'a str) -> IResult<&'a str, Statement> {
        // array_store(a, sz, lb, ub, v[, singleton])
        let arguments = tuple((
            |i: &'a str| self.variable(i),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            opt(preceded(comma, keyword("singleton"))),
        ));
        map(
            preceded(keyword("array_store"), parenthesized(arguments)),
            |(array, elem_size, lb, ub, value, singleton)| {
                Statement::array_store(array, elem_size, lb, ub, value, singleton.is_some())
            },
        )(input)
    }

    fn assignment<'a>(&self, input: &'a str) -> IResult<&'a str, Statement> {
        let rhs = alt((
            |i: &'a str| self.binary_op_rhs(i),
            |i: &'a str| self.select_rhs(i),
            |i: &'a str| self.array_load_rhs(i),
            map(|i: &'a str| self.linear_expression(i), Rhs::Linear),
        ));
        // The target is only resolved after `=`, so a misspelled keyword is not
        // reported as an unknown variable.
        let (rest, name) = terminated(ws(identifier), ws(char('=')))(input)?;
        let (rest, lhs) = self.resolve(input, rest, name)?;
        let (rest, rhs) = rhs(rest)?;
        Ok((rest, rhs.assign_to(lhs)))
    }

    fn binary_op_rhs<'a>(&self, input: &'a str) -> IResult<&'a str, Rhs> {
        // add y, z
        map(
            tuple((
                ws(map_res(alpha1, BinaryOperator::from_str)),
                |i: &'a str| self.linear_expression(i),
                preceded(comma, |i: &'a str| self.linear_expression(i)),
            )),
            |(op, left, right)| Rhs::BinaryOp(op, left, right),
        )(input)
    }

    fn select_rhs<'a>(&self, input: &'a str) -> IResult<&'a str, Rhs> {
        // select(cond, l, r)
        let arguments = tuple((
            |i: &'a str| self.constraint(i),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
        ));
        map(
            preceded(keyword("select"), parenthesized(arguments)),
            |(cond, left, right)| Rhs::Select(cond, left, right),
        )(input)
    }

    fn array_load_rhs<'a>(&self, input: &'a str) -> IResult<&'a str, Rhs> {
        // array_load(a, sz, idx)
        let arguments = tuple((
            |i: &'a str| self.variable(i),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
            preceded(comma, |i: &'a str| self.linear_expression(i)),
        ));
        map(
            preceded(keyword("array_load"), parenthesized(arguments)),
            |(array, elem_size, index)| Rhs::ArrayLoad(array, elem_size, index),
        )(input)
    }
}

fn ws<'a, O, F>(inner: F) -> impl Fn(&'a str) -> IResult<&'a str, O>
where
    F: Fn(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn parenthesized<'a, O, F>(inner: F) -> impl Fn(&'a str) -> IResult<&'a str, O>
where
    F: Fn(&'a str) -> IResult<&'a str, O>,
{
    delimited(ws(char('(')), inner, ws(char(')')))
}

fn comma(input: &str) -> IResult<&str, char> {
    ws(char(','))(input)
}

fn identifier_char(input: &str) -> IResult<&str, char> {
    verify(anychar, |c: &char| c.is_alphanumeric() || *c == '_' || *c == '.')(input)
}

/// Matches `word` unless it is the prefix of a longer identifier.
fn keyword<'a>(word: &'static str) -> impl Fn(&'a str) -> IResult<&'a str, &'a str> {
    ws(terminated(tag(word), not(identifier_char)))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    verify(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_"), tag(".")))),
        )),
        |name: &str| !RESERVED.contains(&name),
    )(input)
}

fn number(input: &str) -> IResult<&str, BigInt> {
    map_res(digit1, BigInt::from_str)(input)
}

fn comparison(input: &str) -> IResult<&str, ConstraintBuilder> {
    alt((
        value(LinearConstraint::equal as ConstraintBuilder, tag("==")),
        value(LinearConstraint::not_equal as ConstraintBuilder, tag("!=")),
        value(LinearConstraint::less_or_equal as ConstraintBuilder, tag("<=")),
        value(LinearConstraint::greater_or_equal as ConstraintBuilder, tag(">=")),
        value(LinearConstraint::less_than as ConstraintBuilder, tag("<")),
        value(LinearConstraint::greater_than as ConstraintBuilder, tag(">")),
        value(LinearConstraint::equal as ConstraintBuilder, tag("=")),
    ))(input)
}
