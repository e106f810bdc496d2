//! Line-oriented front end: read a sentence, analyze it, print the outcome.

use std::io::{self, BufRead, Write};

use crate::controller::{Analyzer, Outcome};
use crate::provider::ModelProvider;

/// Inputs that end an interactive session (after trimming).
pub const QUIT_COMMANDS: [&str; 3] = ["quit", "exit", ":q"];

const PROMPT: &str = "Enter a sentence: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per outcome, one per line.
    Json,
}

/// Counts of outcomes over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub analyzed: usize,
    pub warnings: usize,
    pub failures: usize,
}

impl SessionSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Analyzed(_) => self.analyzed += 1,
            Outcome::Warning { .. } => self.warnings += 1,
            Outcome::Failed { .. } => self.failures += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.analyzed + self.warnings + self.failures
    }
}

/// Writes one outcome in the requested format.
pub fn render_outcome<W: Write>(out: &mut W, outcome: &Outcome, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "\n{outcome}\n"),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, outcome)?;
            writeln!(out)
        }
    }
}

/// Interactive loop over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
    format: OutputFormat,
    prompt: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            format: OutputFormat::Text,
            prompt: true,
        }
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Skip the banner and prompt, e.g. when input is piped.
    pub fn without_prompt(mut self) -> Self {
        self.prompt = false;
        self
    }

    /// Runs until a quit command or end of input.
    pub fn run<P: ModelProvider>(&mut self, analyzer: &mut Analyzer<P>) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let show_prompt = self.prompt && self.format == OutputFormat::Text;

        if show_prompt {
            writeln!(self.output, "Sentiment Analysis and Assertive Transformation")?;
            writeln!(
                self.output,
                "Enter a sentence to analyze its emotion and rewrite it in an assertive tone."
            )?;
            writeln!(self.output, "Type 'quit' to exit.\n")?;
        }

        let mut line = String::new();
        loop {
            if show_prompt {
                write!(self.output, "{PROMPT}")?;
                self.output.flush()?;
            }

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if QUIT_COMMANDS.contains(&line.trim()) {
                break;
            }

            let sentence = line.trim_end_matches(['\n', '\r']);
            let outcome = analyzer.analyze(sentence);
            summary.record(&outcome);
            render_outcome(&mut self.output, &outcome, self.format)?;
            self.output.flush()?;
        }

        tracing::info!(
            analyzed = summary.analyzed,
            warnings = summary.warnings,
            failures = summary.failures,
            "session finished"
        );
        Ok(summary)
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_kind() {
        let mut summary = SessionSummary::default();
        summary.record(&Outcome::Warning {
            message: "w".into(),
        });
        summary.record(&Outcome::Failed {
            message: "f".into(),
            retryable: false,
        });
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn json_rendering_is_one_line() {
        let mut out = Vec::new();
        render_outcome(
            &mut out,
            &Outcome::Failed {
                message: "offline".into(),
                retryable: true,
            },
            OutputFormat::Json,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "{\"status\":\"failed\",\"message\":\"offline\",\"retryable\":true}\n"
        );
    }
}
