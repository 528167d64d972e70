//! Whitespace tokenizer for command buffers: newlines and semicolons
//! separate jobs, `|` separates pipeline stages. No quoting, no
//! globbing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedJob {
    /// One token vector per pipeline stage; `stages[i][0]` is the
    /// command name.
    pub stages: Vec<Vec<String>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A stage with zero tokens, e.g. `ls ||` or `| grep x`.
    #[error("invalid pipe")]
    InvalidPipe,
}

/// Split a command buffer into jobs. Blank lines vanish; malformed
/// lines surface as errors without dropping the rest of the buffer.
pub fn parse_commands(input: &str) -> Vec<Result<ParsedJob, ParseError>> {
    input
        .split(['\n', ';'])
        .filter_map(|line| {
            if line.trim().is_empty() {
                return None;
            }
            let stages: Vec<Vec<String>> = line
                .split('|')
                .map(|stage| stage.split_whitespace().map(str::to_string).collect())
                .collect();
            if stages.iter().any(Vec::is_empty) {
                return Some(Err(ParseError::InvalidPipe));
            }
            Some(Ok(ParsedJob { stages }))
        })
        .collect()
}
