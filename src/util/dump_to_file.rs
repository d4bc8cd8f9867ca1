use crate::error::Result;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Writes the textual form of a value to a file.
pub trait DumpToFile {
    fn dump_to_file(&self, path: &Path) -> Result<()>;
}

impl<T: fmt::Display> DumpToFile for T {
    fn dump_to_file(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "dumping to file");
        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_dump_to_file_should_write_display_output() {
        // Given
        let path = env::temp_dir().join(format!("cfgcheck-dump-{}.txt", std::process::id()));

        // When
        "entry:\n  skip;\n".dump_to_file(&path).unwrap();

        // Then
        assert_eq!(fs::read_to_string(&path).unwrap(), "entry:\n  skip;\n");
        fs::remove_file(&path).unwrap();
    }
}
