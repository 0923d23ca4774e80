//! Console answers for interactive mode.

use std::io::{self, BufRead, BufReader, Stderr, Stdin, Write};

use unlinked_core::{ChoiceSource, PromptContext};

pub(crate) const PROMPT: &str = "Remove torrent? [N(o)/r(emove)/d(ata)] ";

/// Asks on `output` and reads one line per torrent from `input`.
pub(crate) struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<BufReader<Stdin>, Stderr> {
    /// Prompts go to stderr; stdout carries only the report.
    pub(crate) fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R, W> ConsolePrompt<R, W> {
    pub(crate) const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R, W> ChoiceSource for ConsolePrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn choose(&mut self, prompt: &PromptContext<'_>) -> io::Result<String> {
        writeln!(self.output)?;
        writeln!(self.output, "{} (id {})", prompt.torrent.name, prompt.torrent.id)?;
        if prompt.verdict.is_protected() {
            writeln!(
                self.output,
                "  [CROSS-SEEDED] data is shared with another torrent and will be kept"
            )?;
        }
        if prompt.externally_linked {
            writeln!(self.output, "  still hardlinked outside this torrent")?;
        }
        write!(self.output, "{PROMPT}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(String::new());
        }
        Ok(line.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use unlinked_core::SafetyVerdict;
    use unlinked_test_support::fixtures::TorrentBuilder;

    #[test]
    fn prompt_shows_marker_and_normalises_answer() -> io::Result<()> {
        let torrent = TorrentBuilder::new(5, "Film").build();
        let context = PromptContext {
            torrent: &torrent,
            verdict: SafetyVerdict::Protected,
            externally_linked: false,
        };
        let mut output = Vec::new();
        let mut prompt = ConsolePrompt::new(Cursor::new("  D \n"), &mut output);

        let answer = prompt.choose(&context)?;

        assert_eq!(answer, "d");
        let shown = String::from_utf8_lossy(&output);
        assert!(shown.contains("Film (id 5)"));
        assert!(shown.contains("[CROSS-SEEDED]"));
        assert!(shown.contains(PROMPT));
        Ok(())
    }

    #[test]
    fn end_of_input_is_an_empty_answer() -> io::Result<()> {
        let torrent = TorrentBuilder::new(1, "Show").build();
        let context = PromptContext {
            torrent: &torrent,
            verdict: SafetyVerdict::Unprotected,
            externally_linked: true,
        };
        let mut output = Vec::new();
        let mut prompt = ConsolePrompt::new(Cursor::new(""), &mut output);

        assert_eq!(prompt.choose(&context)?, "");
        let shown = String::from_utf8_lossy(&output);
        assert!(!shown.contains("[CROSS-SEEDED]"));
        assert!(shown.contains("hardlinked"));
        Ok(())
    }
}
