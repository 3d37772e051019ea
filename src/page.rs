use std::fs;
use std::io;
use std::path::Path;

/// An output HTML file: its name within the output directory and its full
/// contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    pub file_name: String,
    pub contents: String,
}

impl RenderedPage {
    /// Writes the page into `output_directory`, replacing any previous
    /// version.
    pub fn write(&self, output_directory: &Path) -> io::Result<()> {
        fs::write(output_directory.join(&self.file_name), &self.contents)?;
        log::debug!("wrote {}", self.file_name);
        Ok(())
    }
}
