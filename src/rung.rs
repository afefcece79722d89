use std::fmt::{Display, Formatter};

use string_cache::DefaultAtom;

use crate::command::Command;
use crate::element::Element;
use crate::lexicon::WordLookup;
use crate::position::Position;
use crate::token::{Token, TokenKind};

/**
  What a rung holds. A rung's cell can change while a program runs: `Become` turns any cell it
  rewrites into `Command(Heaven)`, and the value commands overwrite a literal's value in place.
*/
#[derive(Clone, PartialEq, Debug)]
pub enum Cell {
  Command(Command),
  /// A command rung whose code names no command. Executing it only warns.
  Invalid(f64),
  /// A reference to the variable stored under the canonical name.
  Variable(DefaultAtom),
  Literal(f64),
  Punctuation,
}

impl Cell {
  pub fn kind_name(&self) -> &'static str {
    match self {
      Cell::Command(_) | Cell::Invalid(_) => "COMMAND",
      Cell::Variable(_)                   => "VARIABLE",
      Cell::Literal(_)                    => "LITERAL",
      Cell::Punctuation                   => "PUNCTUATION",
    }
  }
}

impl Display for Cell {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Cell::Command(command) => write!(f, "COMMAND {}", command),
      Cell::Invalid(code)    => write!(f, "COMMAND INVALID({})", code),
      Cell::Variable(name)   => write!(f, "VARIABLE {}", name),
      Cell::Literal(value)   => write!(f, "LITERAL {}", value),
      Cell::Punctuation      => write!(f, "PUNCTUATION"),
    }
  }
}

/// One cell of the tape.
#[derive(Clone, PartialEq, Debug)]
pub struct Rung {
  pub position : Position,
  /// The text the rung was read from.
  pub name     : String,
  pub element  : Element,
  pub cell     : Cell,
}

impl Rung {

  pub fn new(position: Position, name: &str, element: Element, cell: Cell) -> Rung {
    Rung{
      position,
      name: name.to_string(),
      element,
      cell
    }
  }

  pub fn literal(position: Position, name: &str, value: f64) -> Rung {
    Rung::new(position, name, Element::Earth, Cell::Literal(value))
  }

  pub fn command(position: Position, name: &str, command: Command) -> Rung {
    Rung::new(position, name, Element::Earth, Cell::Command(command))
  }

  /// Builds the rung for a token. Variables are keyed by the canonical form of their text.
  pub fn from_token(token: &Token, words: &dyn WordLookup) -> Rung {
    let position = Position::source(token.line, token.column);
    match token.kind {

      TokenKind::ReservedWord => {
        let cell = match Command::from_code(token.value) {
          Some(command) => Cell::Command(command),
          None          => Cell::Invalid(token.value)
        };
        Rung::new(position, &token.text, Element::Earth, cell)
      }

      TokenKind::Variable => {
        Rung::new(
          position,
          &token.text,
          token.element,
          Cell::Variable(words.canonical(&token.text))
        )
      }

      TokenKind::Number => Rung::literal(position, &token.text, token.value),

      TokenKind::Punctuation => {
        Rung::new(position, &token.text, Element::Earth, Cell::Punctuation)
      }

    }
  }

  /**
    Whether `other` closes a block named by this rung: variables match by canonical name,
    commands by code, and literals by value.
  */
  pub fn matches(&self, other: &Rung) -> bool {
    match (&self.cell, &other.cell) {
      (Cell::Variable(a), Cell::Variable(b)) => a == b,
      (Cell::Command(a), Cell::Command(b))   => a == b,
      (Cell::Invalid(a), Cell::Invalid(b))   => a == b,
      (Cell::Literal(a), Cell::Literal(b))   => a == b,
      _                                      => false
    }
  }

  pub fn variable_name(&self) -> Option<&DefaultAtom> {
    match &self.cell {
      Cell::Variable(name) => Some(name),
      _                    => None
    }
  }

  pub fn is_punctuation(&self) -> bool {
    self.cell == Cell::Punctuation
  }

}

impl Display for Rung {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} \"{}\" {} {}", self.position, self.name, self.cell, self.element)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lexicon::Lexicon;

  fn words() -> Lexicon {
    Lexicon::parse("rivers river water 2\n").unwrap()
  }

  #[test]
  fn tokens_map_one_to_one() {
    let lexicon = words();

    let heaven = Token::new(1, 1, "heaven", TokenKind::ReservedWord, 3.0, Element::None);
    let rung = Rung::from_token(&heaven, &lexicon);
    assert_eq!(rung.cell, Cell::Command(Command::Heaven));
    assert_eq!(rung.element, Element::Earth);

    let rivers = Token::new(1, 8, "rivers", TokenKind::Variable, 0.0, Element::Water);
    let rung = Rung::from_token(&rivers, &lexicon);
    assert_eq!(rung.cell, Cell::Variable(DefaultAtom::from("river")));
    assert_eq!(rung.element, Element::Water);
    assert_eq!(rung.name, "rivers");

    let five = Token::new(2, 1, "five", TokenKind::Number, 5.0, Element::Fire);
    let rung = Rung::from_token(&five, &lexicon);
    assert_eq!(rung.cell, Cell::Literal(5.0));
    assert_eq!(rung.element, Element::Earth);

    let stop = Token::new(2, 6, ".", TokenKind::Punctuation, 0.0, Element::None);
    assert!(Rung::from_token(&stop, &lexicon).is_punctuation());
  }

  #[test]
  fn unknown_command_code() {
    let token = Token::new(1, 1, "gibberish", TokenKind::ReservedWord, 42.0, Element::Earth);
    assert_eq!(Rung::from_token(&token, &words()).cell, Cell::Invalid(42.0));
  }

  #[test]
  fn block_terminators() {
    let lexicon = words();
    let river = Rung::new(Position::default(), "river", Element::Water, Cell::Variable(lexicon.canonical("river")));
    let rivers = Rung::new(Position::default(), "rivers", Element::Water, Cell::Variable(lexicon.canonical("rivers")));
    let five = Rung::literal(Position::default(), "five", 5.0);
    let also_five = Rung::literal(Position::default(), "fifth", 5.0);
    let speak = Rung::command(Position::default(), "speak", Command::Speak);
    let said = Rung::command(Position::default(), "said", Command::Speak);

    assert!(river.matches(&rivers));
    assert!(five.matches(&also_five));
    assert!(speak.matches(&said));
    assert!(!speak.matches(&five));
    assert!(!five.matches(&river));
  }

  #[test]
  fn display_rung() {
    let rung = Rung::command(Position::source(3, 5), "nirvana", Command::Heaven);
    assert_eq!(format!("{}", rung), "(3, 5) \"nirvana\" COMMAND Heaven earth");
  }
}
