//! Structural validation of a loaded graph: prune useless blocks, then type check.

use crate::cfg::transformation::RemoveUselessBlocks;
use crate::cfg::{ControlFlowGraph, Label};
use crate::environment::Environment;
use crate::error::Result;
use crate::util::{Transform, Validate};
use std::fmt;
use tracing::{debug, info};

/// Outcome of a successful `run`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Report {
    removed: Vec<Label>,
    type_checked: bool,
}

impl Report {
    /// Labels of the pruned blocks, in graph order.
    pub fn removed(&self) -> &[Label] {
        &self.removed
    }

    pub fn type_checked(&self) -> bool {
        self.type_checked
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "removed {} block(s)", self.removed.len())?;
        if !self.removed.is_empty() {
            let labels: Vec<&str> = self.removed.iter().map(Label::as_str).collect();
            write!(f, ": {}", labels.join(", "))?;
        }
        if self.type_checked {
            write!(f, ", well-typed")?;
        }
        Ok(())
    }
}

/// The transformations enabled by `env`, in application order.
pub fn transformations(env: &Environment) -> Vec<Box<dyn Transform<ControlFlowGraph>>> {
    let mut steps: Vec<Box<dyn Transform<ControlFlowGraph>>> = Vec::new();
    if env.prune {
        steps.push(Box::new(RemoveUselessBlocks::new()));
    }
    steps
}

/// Applies the enabled transformations and returns the labels they removed.
fn transform<P>(
    env: &Environment,
    cfg: &mut ControlFlowGraph,
    progress: &mut P,
) -> Result<Vec<Label>>
where
    P: FnMut(usize, usize, &str),
{
    let before: Vec<Label> = cfg.labels().into_iter().cloned().collect();

    let transformations = transformations(env);
    let total = transformations.len() + usize::from(env.type_check);
    for (idx, transformation) in transformations.iter().enumerate() {
        progress(idx + 1, total, &transformation.description());
        debug!(name = transformation.name(), "applying transformation");
        transformation.transform(cfg)?;
    }

    let removed: Vec<Label> = before
        .into_iter()
        .filter(|label| !cfg.contains(label))
        .collect();
    info!(removed = removed.len(), remaining = cfg.num_blocks(), "transformed graph");
    Ok(removed)
}

/// Prunes (if enabled) and then type checks (if enabled) `cfg`.
///
/// A type error is returned as `ErrorKind::TypeCheck`.
pub fn run(env: &Environment, cfg: &mut ControlFlowGraph) -> Result<Report> {
    run_with_progress(env, cfg, |_, _, _| {})
}

/// Like `run`, but calls `progress(step, total, description)` before each step.
pub fn run_with_progress<P>(
    env: &Environment,
    cfg: &mut ControlFlowGraph,
    mut progress: P,
) -> Result<Report>
where
    P: FnMut(usize, usize, &str),
{
    let removed = transform(env, cfg, &mut progress)?;

    if env.type_check {
        let step = transformations(env).len() + 1;
        progress(step, step, "Type check blocks");
        cfg.validate()?;
        info!("graph is well-typed");
    }

    Ok(Report {
        removed,
        type_checked: env.type_check,
    })
}
