//! Loads a `ControlFlowGraph` from its YAML description.
//!
//! ```yaml
//! entry: bb0
//! exit: bb1
//! variables:
//!   x: { type: int, bitwidth: 32 }
//!   a: { type: array }
//! blocks:
//!   - label: bb0
//!     statements: ["havoc(x)", "x = add x, 1"]
//!     successors: [bb1]
//!   - label: bb1
//! ```

use crate::cfg::{ControlFlowGraph, Label};
use crate::error::{ErrorKind, Result, ResultExt};
use crate::expr::{Variable, VariableType};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

mod parser;

pub use self::parser::parse_statement;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CfgDescription {
    entry: Label,
    #[serde(default)]
    exit: Option<Label>,
    #[serde(default)]
    variables: BTreeMap<String, VariableDescription>,
    blocks: Vec<BlockDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariableDescription {
    #[serde(rename = "type")]
    ty: VariableType,
    #[serde(default)]
    bitwidth: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockDescription {
    label: Label,
    #[serde(default)]
    statements: Vec<String>,
    #[serde(default)]
    successors: Vec<Label>,
}

pub fn load_cfg(file_path: &Path) -> Result<ControlFlowGraph> {
    let file = File::open(file_path).map_err(|_| {
        ErrorKind::Loader(format!(
            "CFG file '{}' could not be loaded",
            file_path.display()
        ))
    })?;
    let description: CfgDescription = serde_yaml::from_reader(BufReader::new(file))?;
    build_cfg(description)
}

pub fn load_cfg_from_str(source: &str) -> Result<ControlFlowGraph> {
    let description: CfgDescription = serde_yaml::from_str(source)?;
    build_cfg(description)
}

fn build_cfg(description: CfgDescription) -> Result<ControlFlowGraph> {
    let variables = declare_variables(&description.variables)?;

    let mut labels = BTreeSet::new();
    for block in &description.blocks {
        if !labels.insert(&block.label) {
            bail!(ErrorKind::Loader(format!(
                "block `{}` is described twice",
                block.label
            )));
        }
    }
    if !labels.contains(&description.entry) {
        bail!(ErrorKind::Loader(format!(
            "entry block `{}` is not described",
            description.entry
        )));
    }
    if let Some(exit) = &description.exit {
        if !labels.contains(exit) {
            bail!(ErrorKind::Loader(format!(
                "exit block `{}` is not described",
                exit
            )));
        }
    }

    let mut cfg = ControlFlowGraph::new(description.entry.clone());

    for block in &description.blocks {
        let target = cfg.insert(&block.label);
        for text in &block.statements {
            let statement = parse_statement(text, &variables).chain_err(|| {
                ErrorKind::Loader(format!("invalid statement in block `{}`", block.label))
            })?;
            target.push(statement);
        }
    }

    for block in &description.blocks {
        for successor in &block.successors {
            if !cfg.contains(successor) {
                bail!(ErrorKind::Loader(format!(
                    "unknown successor `{}` of block `{}`",
                    successor, block.label
                )));
            }
            cfg.add_edge(&block.label, successor)?;
        }
    }

    if let Some(exit) = description.exit {
        cfg.set_exit(exit)?;
    }

    debug!(
        blocks = cfg.num_blocks(),
        edges = cfg.num_edges(),
        variables = variables.len(),
        "loaded control flow graph"
    );

    Ok(cfg)
}

fn declare_variables(
    descriptions: &BTreeMap<String, VariableDescription>,
) -> Result<BTreeMap<String, Variable>> {
    descriptions
        .iter()
        .map(|(name, description)| -> Result<(String, Variable)> {
            if description.ty.is_array() && description.bitwidth.is_some() {
                bail!(ErrorKind::Loader(format!(
                    "array variable `{}` must not have a bitwidth",
                    name
                )));
            }
            let variable = Variable::new(name.as_str(), description.ty, description.bitwidth);
            Ok((name.clone(), variable))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::Statement;
    use crate::expr::LinearExpression;

    const PROGRAM: &str = r#"
entry: bb0
exit: bb2
variables:
  x: { type: int, bitwidth: 32 }
  n: { type: int }
  a: { type: array }
blocks:
  - label: bb0
    statements: ["havoc(x)", "array_init(a, 4, 0, 9, 0)"]
    successors: [bb1, bb2]
  - label: bb1
    statements: ["x = add x, 1"]
    successors: [bb1, bb2]
  - label: bb2
    statements: ["assert(x >= 0)"]
  - label: orphan
"#;

    fn assert_loader_error(source: &str, expected: &str) {
        let error = load_cfg_from_str(source).unwrap_err();
        match error.kind() {
            ErrorKind::Loader(message) => assert_eq!(message, expected),
            kind => panic!("unexpected error {:?}", kind),
        }
    }

    #[test]
    fn test_load_should_build_blocks_edges_and_exit() {
        // When
        let cfg = load_cfg_from_str(PROGRAM).unwrap();

        // Then
        assert_eq!(cfg.entry(), &Label::from("bb0"));
        assert_eq!(cfg.exit(), Some(&Label::from("bb2")));
        assert_eq!(
            cfg.labels(),
            vec![
                &Label::from("bb0"),
                &Label::from("bb1"),
                &Label::from("bb2"),
                &Label::from("orphan"),
            ]
        );
        assert_eq!(cfg.num_edges(), 4);
        assert!(cfg.has_edge(&Label::from("bb1"), &Label::from("bb1")));
        assert_eq!(
            cfg.block(&Label::from("bb1")).unwrap().statements(),
            &[Statement::binary_op(
                Variable::integer("x", 32),
                crate::cfg::BinaryOperator::Add,
                LinearExpression::variable(Variable::integer("x", 32)),
                LinearExpression::constant(1),
            )]
        );
    }

    #[test]
    fn test_integer_without_bitwidth_should_be_unbounded() {
        let source = "entry: b\nvariables:\n  n: { type: int }\nblocks:\n  - label: b\n    statements: [\"havoc(n)\"]\n";

        let cfg = load_cfg_from_str(source).unwrap();

        assert_eq!(
            cfg.block(&Label::from("b")).unwrap().statements(),
            &[Statement::havoc(Variable::integer_unbounded("n"))]
        );
        assert!(!cfg.has_exit());
    }

    #[test]
    fn test_unknown_successor_should_fail() {
        assert_loader_error(
            "entry: b\nblocks:\n  - label: b\n    successors: [c]\n",
            "unknown successor `c` of block `b`",
        );
    }

    #[test]
    fn test_undescribed_entry_or_exit_should_fail() {
        assert_loader_error(
            "entry: a\nblocks:\n  - label: b\n",
            "entry block `a` is not described",
        );
        assert_loader_error(
            "entry: b\nexit: c\nblocks:\n  - label: b\n",
            "exit block `c` is not described",
        );
    }

    #[test]
    fn test_duplicate_block_should_fail() {
        assert_loader_error(
            "entry: b\nblocks:\n  - label: b\n  - label: b\n",
            "block `b` is described twice",
        );
    }

    #[test]
    fn test_array_with_bitwidth_should_fail() {
        assert_loader_error(
            "entry: b\nvariables:\n  a: { type: array, bitwidth: 8 }\nblocks:\n  - label: b\n",
            "array variable `a` must not have a bitwidth",
        );
    }

    #[test]
    fn test_invalid_statement_should_name_block_and_statement() {
        // Given
        let source = "entry: b\nblocks:\n  - label: b\n    statements: [\"havoc(y)\"]\n";

        // When
        let error = load_cfg_from_str(source).unwrap_err();

        // Then
        assert_eq!(
            error.to_string(),
            "Loader error: invalid statement in block `b`"
        );
        let cause = error.iter().nth(1).map(|cause| cause.to_string());
        assert_eq!(
            cause.as_deref(),
            Some("Parser error: unknown variable `y` in statement `havoc(y)`")
        );
    }

    #[test]
    fn test_malformed_yaml_should_fail() {
        let error = load_cfg_from_str("entry: [b\n").unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::SerdeYAML(_)));

        let error = load_cfg_from_str("entry: b\nblocks: []\nsolver: z3\n").unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::SerdeYAML(_)));
    }

    #[test]
    fn test_missing_file_should_fail() {
        let error = load_cfg(Path::new("/nonexistent/program.yaml")).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Loader(_)));
    }
}
