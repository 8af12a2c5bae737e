//! Standard output sink

use std::io::Write;

use crate::error::Result;
use crate::signal::SelectedFields;

/// How the console sink renders fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    /// One compact JSON object on a single line
    Json,
    /// `name: value` lines
    Text,
}

/// Prints selected fields to standard output
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    format: ConsoleFormat,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ConsoleFormat {
        self.format
    }

    /// Render the fields, including the trailing newline
    pub fn render(&self, fields: &SelectedFields) -> Result<String> {
        match self.format {
            ConsoleFormat::Json => {
                let mut out = serde_json::to_string(fields)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                out.push('\n');
                Ok(out)
            }
            ConsoleFormat::Text => Ok(fields
                .iter()
                .map(|(name, value)| format!("{}: {}\n", name, value))
                .collect()),
        }
    }

    /// Write the rendered fields to `out`
    pub fn write_to<W: Write>(&self, out: &mut W, fields: &SelectedFields) -> Result<()> {
        out.write_all(self.render(fields)?.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    pub fn emit(&self, fields: &SelectedFields) -> Result<()> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.write_to(&mut lock, fields)
    }
}
