use anyhow::Context;
use anyhow::Result;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

/// Line oriented terminal that remembers everything it printed or read
pub struct Console<R, W> {
    input: R,
    output: W,
    transcript: Vec<String>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            transcript: Vec::new(),
        }
    }

    pub fn say(&mut self, line: impl Into<String>) -> Result<()> {
        let line = line.into();
        writeln!(self.output, "{line}").context("Failed to write to console")?;
        self.output.flush()?;
        self.transcript.push(line);
        Ok(())
    }

    /// `Ok(None)` at end of input
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let n = self
            .input
            .read_line(&mut buf)
            .context("Failed to read from console")?;
        if n == 0 {
            return Ok(None);
        }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        self.transcript.push(buf.clone());
        Ok(Some(buf))
    }

    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.say(question)?;
        self.read_line()
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn save_transcript(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let mut file = BufWriter::new(file);
        for line in &self.transcript {
            writeln!(file, "{line}")?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
