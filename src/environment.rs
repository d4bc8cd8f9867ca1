use crate::error::Result;
use derivative::Derivative;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// What the driver does when the type checker rejects the graph.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum TypeErrorPolicy {
    #[serde(rename = "abort")]
    Abort, // stop with the type error
    #[serde(rename = "report")]
    Report, // print the error, still write the requested outputs
}

impl Default for TypeErrorPolicy {
    fn default() -> Self {
        Self::Abort
    }
}

impl fmt::Display for TypeErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Report => write!(f, "report"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Environment {
    #[serde(default = "enabled")]
    #[derivative(Default(value = "true"))]
    pub prune: bool,
    #[serde(default = "enabled")]
    #[derivative(Default(value = "true"))]
    pub type_check: bool,
    #[serde(default = "disabled")]
    pub debug: bool,
    #[serde(default)]
    pub on_type_error: TypeErrorPolicy,
}

impl Environment {
    pub fn from_file(path: &Path) -> Result<Environment> {
        let file = File::open(path)
            .map_err(|_| format!("Environment file '{}' could not be loaded", path.display()))?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Environment> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The environment file belonging to `input`, i.e. `<input>.env.yaml`.
    pub fn companion_file(input: &Path) -> PathBuf {
        let mut name = input.as_os_str().to_owned();
        name.push(".env.yaml");
        PathBuf::from(name)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yaml = serde_yaml::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml)
    }
}

fn disabled() -> bool {
    false
}

fn enabled() -> bool {
    true
}
