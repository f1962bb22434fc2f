//! Line-based questions on stdin.

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Source of answers for interactive questions.
pub trait Prompter {
    /// Ask for a line of text. An empty answer yields `default`.
    fn input(&mut self, question: &str, default: &str) -> Result<String>;

    /// Ask a yes/no question. An empty or unrecognised answer yields `default`.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// Prompter reading from a buffered reader and writing questions to a writer.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn read_answer(&mut self, question: &str) -> Result<String> {
        write!(self.writer, "{}", question)?;
        self.writer.flush()?;

        let mut input = String::new();
        // EOF leaves `input` empty, which selects the default.
        self.reader.read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn input(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.read_answer(&format!("{} ({}) ", question, default))?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.read_answer(&format!("{} {} ", question, hint))?;

        Ok(match answer.to_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }
}

/// Prompter bound to the process stdin, asking on stderr.
pub fn stdin_prompter() -> LinePrompter<io::StdinLock<'static>, io::Stderr> {
    LinePrompter::new(io::stdin().lock(), io::stderr())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompter(input: &str) -> LinePrompter<&[u8], Vec<u8>> {
        LinePrompter::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn test_input_answer() {
        let mut p = prompter("my-server\n");
        let answer = p.input("What is the name of your MCP server?", "demo").unwrap();
        assert_eq!(answer, "my-server");

        let asked = String::from_utf8(p.writer).unwrap();
        assert_eq!(asked, "What is the name of your MCP server? (demo) ");
    }

    #[test]
    fn test_input_default_on_empty_and_eof() {
        let mut p = prompter("\n");
        assert_eq!(p.input("Name?", "demo").unwrap(), "demo");

        let mut p = prompter("");
        assert_eq!(p.input("Name?", "demo").unwrap(), "demo");
    }

    #[test]
    fn test_confirm() {
        let mut p = prompter("y\nno\n\nmaybe\n");
        assert!(p.confirm("Overwrite?", false).unwrap());
        assert!(!p.confirm("Overwrite?", true).unwrap());
        assert!(p.confirm("Overwrite?", true).unwrap());
        assert!(!p.confirm("Overwrite?", false).unwrap());
    }
}
