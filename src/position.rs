//! Where a rung came from: a line and column of the program text, or the n-th value read from
//! the program's input stream.

use std::fmt::{Display, Formatter};

// `PositionNumberType` is `usize`, as it is naturally an index into the program text.
pub type PositionNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Position {
  /// A word of the program text.
  Source {
    line   : PositionNumberType,
    column : PositionNumberType
  },
  /// A literal synthesized by `Listen`, numbered by the input event that produced it.
  Input(PositionNumberType)
}

impl Position {

  pub fn source(line: PositionNumberType, column: PositionNumberType) -> Position {
    Position::Source{ line, column }
  }

}

impl Default for Position {
  fn default() -> Self {
    Position::Source{ line: 0, column: 0 }
  }
}

impl Display for Position {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Position::Source{ line, column } => {
        write!(f, "({}, {})", line, column)
      },
      Position::Input(event) => {
        write!(f, "(INPUT, {})", event)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_forms() {
    assert_eq!(format!("{}", Position::source(3, 14)), "(3, 14)");
    assert_eq!(format!("{}", Position::Input(2)), "(INPUT, 2)");
  }
}
