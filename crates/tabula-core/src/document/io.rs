use super::{Document, OutputMode};
use crate::command::parse_script;
use crate::error::{Result, TabulaError};
use log::{debug, warn};
use std::path::Path;

const MAX_SCRIPT_FILE_BYTES: u64 = 1_048_576; // 1 MiB

fn read_script_file(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_SCRIPT_FILE_BYTES {
        return Err(TabulaError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: script too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_SCRIPT_FILE_BYTES
            ),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

impl Document {
    /// Run a command script, returning the output of every printing command.
    ///
    /// The whole script is parsed before anything runs, so a syntax error
    /// leaves the document untouched. Execution stops at the first failing
    /// command; commands before it stay applied.
    pub fn run_script(&mut self, script: &str) -> Result<Vec<String>> {
        let commands = parse_script(script)?;
        let mut output = Vec::new();
        for (line, command) in &commands {
            match self.execute(command) {
                Ok(Some(text)) => output.push(text),
                Ok(None) => {}
                Err(TabulaError::Sheet(source)) => {
                    warn!("script stopped at line {}: {}", line, source);
                    return Err(TabulaError::Command {
                        line: *line,
                        source,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        debug!("ran {} commands", commands.len());
        Ok(output)
    }

    /// Run a command script from a file.
    pub fn run_script_file(&mut self, path: &Path) -> Result<Vec<String>> {
        let content = read_script_file(path)?;
        self.run_script(&content)
    }

    /// Write the rendered sheet to a file.
    pub fn export(&self, path: &Path, mode: OutputMode) -> Result<()> {
        std::fs::write(path, self.render(mode))?;
        debug!("exported {:?} to {}", mode, path.display());
        Ok(())
    }
}
