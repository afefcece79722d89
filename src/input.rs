/*!
  The input a running program reads with `Listen`.

  Input is one line of text: the first line of a reader, or the program's command line arguments
  joined by spaces. Each read either produces a value or reports that the input is exhausted. The
  input is exhausted at the end of the text, and also when nothing but spaces and tabs remain
  before a line break, so nothing after the first line break is ever read.

  A value is either a number, an optional sign followed by digits and an optional fractional
  part, or, when the text does not start with a number, the code of a single character.
*/

use std::fmt::{Debug, Formatter};
use std::io::BufRead;

use nom::{
  character::complete::{char as one_char, digit1, one_of},
  combinator::{opt, recognize},
  sequence::{preceded, tuple},
  IResult
};
use tracing::warn;

/// One value read from the input.
#[derive(Clone, PartialEq, Debug)]
pub struct InputEvent {
  /// The text consumed to produce the value.
  pub text  : String,
  pub value : f64,
}

pub struct InputStream {
  /// Where the line comes from, until it has been read.
  source : Option<Box<dyn BufRead>>,
  line   : String,
  cursor : usize,
}

impl InputStream {

  pub fn from_text(text: &str) -> InputStream {
    InputStream{
      source : None,
      line   : text.to_string(),
      cursor : 0
    }
  }

  /// Input that is read from `reader` the first time it is needed. Reading blocks.
  pub fn from_reader(reader: Box<dyn BufRead>) -> InputStream {
    InputStream{
      source : Some(reader),
      line   : String::new(),
      cursor : 0
    }
  }

  pub fn empty() -> InputStream {
    InputStream::from_text("")
  }

  fn fill(&mut self) {
    if let Some(mut reader) = self.source.take() {
      if let Err(error) = reader.read_line(&mut self.line) {
        warn!("could not read program input: {}", error);
        self.line.clear();
      }
      self.cursor = 0;
    }
  }

  fn rest(&self) -> &str {
    &self.line[self.cursor..]
  }

  /// Skips spaces and tabs, then reports whether a value can still be read.
  pub fn is_exhausted(&mut self) -> bool {
    self.fill();

    let rest = self.rest();
    let trimmed = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
    self.cursor += rest.len() - trimmed.len();

    match self.rest().chars().next() {
      None              => true,
      Some('\n')        => true,
      Some('\r')        => true,
      Some(_)           => false
    }
  }

  /// Reads the next value, or `None` once the input is exhausted.
  pub fn read(&mut self) -> Option<InputEvent> {
    if self.is_exhausted() {
      return None;
    }

    let rest = self.rest();
    let event = match signed_decimal(rest) {
      Ok((_, text)) => {
        InputEvent{
          text  : text.to_string(),
          value : text.parse::<f64>().unwrap_or(0.0)
        }
      }
      Err(_) => {
        // `is_exhausted` guarantees a character is present.
        let c = rest.chars().next()?;
        InputEvent{
          text  : c.to_string(),
          value : c as u32 as f64
        }
      }
    };

    self.cursor += event.text.len();
    Some(event)
  }

}

impl Debug for InputStream {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("InputStream")
     .field("pending", &self.source.is_some())
     .field("rest", &self.rest())
     .finish()
  }
}

/// `[+-]digits[.digits]`, where a `.` not followed by a digit is left unconsumed.
fn signed_decimal(text: &str) -> IResult<&str, &str> {
  recognize(
    tuple((
      opt(one_of("+-")),
      digit1,
      opt(preceded(one_char('.'), digit1))
    ))
  )(text)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  fn values(input: &mut InputStream) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    while let Some(event) = input.read() {
      out.push((event.text, event.value));
    }
    out
  }

  #[test]
  fn numbers_and_characters() {
    let mut input = InputStream::from_text("12 -3.25 x+7 4.");
    assert_eq!(
      values(&mut input),
      vec![
        ("12".to_string(), 12.0),
        ("-3.25".to_string(), -3.25),
        ("x".to_string(), 120.0),
        ("+7".to_string(), 7.0),
        ("4".to_string(), 4.0),
        (".".to_string(), 46.0),
      ]
    );
    assert!(input.is_exhausted());
  }

  #[test]
  fn negative_fraction_keeps_its_sign() {
    let mut input = InputStream::from_text("-0.5");
    assert_eq!(input.read(), Some(InputEvent{ text: "-0.5".to_string(), value: -0.5 }));
  }

  #[test]
  fn lone_sign_is_a_character() {
    let mut input = InputStream::from_text("-a");
    assert_eq!(input.read().map(|e| e.value), Some('-' as u32 as f64));
    assert_eq!(input.read().map(|e| e.value), Some('a' as u32 as f64));
    assert_eq!(input.read(), None);
  }

  #[test]
  fn line_break_exhausts() {
    let mut input = InputStream::from_reader(Box::new(Cursor::new("7   \nmore text\n")));
    assert_eq!(input.read().map(|e| e.value), Some(7.0));
    assert!(input.is_exhausted());
    assert_eq!(input.read(), None);
    assert_eq!(input.read(), None);
  }

  #[test]
  fn empty_input() {
    assert!(InputStream::empty().is_exhausted());
    let mut from_reader = InputStream::from_reader(Box::new(Cursor::new("")));
    assert_eq!(from_reader.read(), None);
  }
}
