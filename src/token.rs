/*!
  The token stream is the interface between reading a program and running it. Each token is one
  word (or number, or punctuation mark) of the program text, already classified, in the order it
  appears in the source. The machine maps each token to exactly one rung when it loads a program.
*/

use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::element::Element;
use crate::position::PositionNumberType;

/// The payload of tokens that carry no value of their own.
pub const TOKEN_VALUE_DEFAULT: f64 = 0.0;

#[derive(StrumDisplay, IntoStaticStr, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum TokenKind {
  #[strum(serialize = "RESERVED_WORD")]
  ReservedWord,
  #[strum(serialize = "VARIABLE")]
  Variable,
  #[strum(serialize = "NUMBER")]
  Number,
  #[strum(serialize = "PUNCTUATION")]
  Punctuation,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
  pub line    : PositionNumberType,
  pub column  : PositionNumberType,
  pub text    : String,
  pub kind    : TokenKind,
  /// The command code of a reserved word, or the value of a number.
  pub value   : f64,
  pub element : Element,
}

impl Token {

  pub fn new(
    line    : PositionNumberType,
    column  : PositionNumberType,
    text    : &str,
    kind    : TokenKind,
    value   : f64,
    element : Element
  ) -> Token {
    Token{
      line,
      column,
      text: text.to_string(),
      kind,
      value,
      element
    }
  }

}

impl Display for Token {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "({}, {}) \"{}\" {} {} {}",
      self.line, self.column, self.text, self.kind, self.value, self.element
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_token() {
    let token = Token::new(2, 7, "dozen", TokenKind::Number, 12.0, Element::Earth);
    assert_eq!(format!("{}", token), "(2, 7) \"dozen\" NUMBER 12 earth");
  }
}
