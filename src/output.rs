use std::fs;
use std::path::Path;

/// Persists the generated module text.
pub trait ModuleWriter {
    fn write(&mut self, path: &Path, text: &str) -> std::io::Result<()>;
}

/// Writes the module to the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileWriter;

impl ModuleWriter for FileWriter {
    fn write(&mut self, path: &Path, text: &str) -> std::io::Result<()> {
        fs::write(path, text)
    }
}
