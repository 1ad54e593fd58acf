//! Interactive confirmation before destructive operations

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// Asks the user whether to go ahead
pub trait Confirm: Send + Sync {
    /// Show `subject`, ask `question` and report the answer.
    fn confirm(&self, subject: &str, question: &str) -> io::Result<bool>;
}

/// Line based prompt over any reader/writer pair.
///
/// Only a bare Enter, `y` or `yes` confirms. Any other answer or end of
/// input declines.
pub struct LinePrompt<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl<R: BufRead + Send, W: Write + Send> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }
}

impl LinePrompt<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead + Send, W: Write + Send> Confirm for LinePrompt<R, W> {
    fn confirm(&self, subject: &str, question: &str) -> io::Result<bool> {
        {
            let mut out = self.output.lock().map_err(|_| poisoned())?;
            write!(out, "{}", subject)?;
            writeln!(out, "{}", question)?;
            out.flush()?;
        }

        let mut line = String::new();
        let read = self
            .input
            .lock()
            .map_err(|_| poisoned())?
            .read_line(&mut line)?;
        if read == 0 {
            return Ok(false);
        }

        let answer = line.trim().to_lowercase();
        Ok(matches!(answer.as_str(), "" | "y" | "yes"))
    }
}

/// Confirms without asking, for `--yes`
pub struct AssumeYes<W> {
    output: Mutex<W>,
}

impl<W: Write + Send> AssumeYes<W> {
    pub fn new(output: W) -> Self {
        Self {
            output: Mutex::new(output),
        }
    }
}

impl AssumeYes<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Confirm for AssumeYes<W> {
    fn confirm(&self, subject: &str, _question: &str) -> io::Result<bool> {
        let mut out = self.output.lock().map_err(|_| poisoned())?;
        write!(out, "{}", subject)?;
        out.flush()?;
        Ok(true)
    }
}

fn poisoned() -> io::Error {
    io::Error::other("prompt lock poisoned")
}
