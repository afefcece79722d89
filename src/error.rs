use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::position::PositionNumberType;

/// A problem found while reading a program, located at a line and column of its text.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Diagnostic {
  pub line    : PositionNumberType,
  pub column  : PositionNumberType,
  pub message : String,
}

impl Diagnostic {
  pub fn new(line: PositionNumberType, column: PositionNumberType, message: String) -> Diagnostic {
    Diagnostic{ line, column, message }
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "({}, {}): {}", self.line, self.column, self.message)
  }
}

/**
  Errors of the host: reading files, reading the dictionary, and rejecting program text.

  Nothing a running program does produces a `HaifuError`. The machine reports those conditions
  as warnings and a halt signal instead.
*/
#[derive(Debug, Error)]
pub enum HaifuError {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed dictionary entry on line {line}: {message}")]
  Dictionary {
    line    : usize,
    message : String
  },

  #[error("program text has {} error(s), first at {}", .0.len(), first_diagnostic(.0))]
  Tokenize(Vec<Diagnostic>),

  #[error("no program has been loaded")]
  NoProgram,
}

fn first_diagnostic(diagnostics: &[Diagnostic]) -> String {
  match diagnostics.first() {
    Some(diagnostic) => diagnostic.to_string(),
    None             => "(unknown)".to_string()
  }
}

pub type Result<T> = std::result::Result<T, HaifuError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokenize_error_names_first_problem() {
    let error = HaifuError::Tokenize(vec![
      Diagnostic::new(1, 4, "dangling hyphen".to_string()),
      Diagnostic::new(2, 1, "cannot combine \"ten\" with \"ten\"".to_string()),
    ]);
    assert_eq!(
      error.to_string(),
      "program text has 2 error(s), first at (1, 4): dangling hyphen"
    );
  }
}
