use crate::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

mod dump_to_file;

pub use self::dump_to_file::DumpToFile;

pub trait Validate {
    /// Checks the well-formedness of `self`, failing on the first violation.
    fn validate(&self) -> Result<()>;
}

pub trait Transform<T> {
    /// Short name of the transformation, used in logs.
    fn name(&self) -> &'static str;

    /// Concise description of the transformation.
    fn description(&self) -> String;

    /// Applies the transformation to `target`.
    fn transform(&self, target: &mut T) -> Result<()>;
}

pub trait RenderGraph {
    /// Renders `self` in Graphviz DOT format.
    fn render_to_str(&self) -> String;

    fn render_to_file(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render_to_str().as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
