/*!

This module turns program text into the token stream the machine loads.

Program text has the following lexical structure:

  * Words: runs of ASCII letters and apostrophes, read case-insensitively
  * Punctuation: any other single character that is not whitespace
  * Hyphens: a `-` joins the words on either side of it into one token
  * Comments: a `,` opens a comment and the next `,` closes it, across lines

A word is a reserved word if it spells a command, a number if it spells a number ("dozen",
"fifth", "thrice"), and otherwise names a variable. The single letter "a" is the number 1, and
every other single letter is a variable. Digits are not part of the language: they are skipped
with a warning.

A hyphen group made only of numbers is read as one number by English grammar, so that
`two-hundred-fifty` is 250 and `three-thousand-two` is 3002. Any other hyphen group is one
variable spelled with its hyphens. Errors are collected for the whole text, and a text with any
error yields no tokens at all.

*/

use std::collections::HashMap;

use nom::{bytes::complete::take_while1, IResult};
use tracing::warn;

use crate::command::Command;
use crate::element::Element;
use crate::error::{Diagnostic, HaifuError, Result};
use crate::lexicon::WordLookup;
use crate::position::PositionNumberType;
use crate::token::{Token, TokenKind, TOKEN_VALUE_DEFAULT};

type NumberType = u64;

lazy_static! {
  static ref NUMBER_WORDS: HashMap<&'static str, NumberType> = {
    let table: &[(NumberType, &[&str])] = &[
      (0, &["no", "none", "nothing", "zero", "zeroth"]),
      (1, &["a", "an", "once", "one", "first"]),
      (2, &["couple", "twice", "two", "second"]),
      (3, &["thrice", "three", "third"]),
      (4, &["four", "fourth"]),
      (5, &["five", "fifth"]),
      (6, &["six", "sixth"]),
      (7, &["seven", "seventh"]),
      (8, &["eight", "eighth"]),
      (9, &["nine", "ninth"]),
      (10, &["decade", "ten", "tenth"]),
      (11, &["eleven", "eleventh"]),
      (12, &["dozen", "twelve", "twelfth"]),
      (13, &["thirteen", "thirteenth"]),
      (14, &["fourteen", "fourteenth"]),
      (15, &["fifteen", "fifteenth"]),
      (16, &["sixteen", "sixteenth"]),
      (17, &["seventeen", "seventeenth"]),
      (18, &["eighteen", "eighteenth"]),
      (19, &["nineteen", "nineteenth"]),
      (20, &["score", "twenty", "twentieth"]),
      (30, &["thirty", "thirtieth"]),
      (40, &["forty", "fortieth"]),
      (50, &["fifty", "fiftieth"]),
      (60, &["sixty", "sixtieth"]),
      (70, &["seventy", "seventieth"]),
      (80, &["eighty", "eightieth"]),
      (90, &["ninety", "ninetieth"]),
      (100, &["century", "centurial", "centuries", "hundred", "hundredth"]),
      (1_000, &["millenium", "millenial", "millenia", "milleniums", "thousand", "thousandth"]),
      (1_000_000, &["million", "millionth"]),
      (1_000_000_000, &["billion", "billionth"]),
    ];

    let mut words = HashMap::new();
    for (value, spellings) in table {
      for spelling in spellings.iter() {
        words.insert(*spelling, *value);
      }
    }
    words
  };
}

/// Whether a word spells a number.
pub fn is_number_word(word: &str) -> bool {
  NUMBER_WORDS.contains_key(word)
}

fn is_word_char(c: char) -> bool {
  c.is_ascii_alphabetic() || c == '\''
}

fn is_whitespace(c: char) -> bool {
  c == ' ' || c == '\t' || c == '\r'
}

fn word(text: &str) -> IResult<&str, &str> {
  take_while1(is_word_char)(text)
}

// region Scanning

/// A token, or a hyphen still waiting to join its neighbours.
#[derive(Clone, Debug)]
enum Piece {
  Token(Token),
  Hyphen(PositionNumberType, PositionNumberType),
}

struct Scanner<'w> {
  words       : &'w dyn WordLookup,
  pieces      : Vec<Piece>,
  errors      : Vec<Diagnostic>,
  in_comment  : bool,
}

impl<'w> Scanner<'w> {

  fn new(words: &'w dyn WordLookup) -> Scanner<'w> {
    Scanner{
      words,
      pieces     : vec![],
      errors     : vec![],
      in_comment : false
    }
  }

  fn push(&mut self, token: Token) {
    self.pieces.push(Piece::Token(token));
  }

  fn scan_line(&mut self, line: PositionNumberType, text: &str) {
    let mut rest = text;
    let mut column: PositionNumberType = 1;

    while let Some(c) = rest.chars().next() {
      if is_whitespace(c) {
        rest = &rest[c.len_utf8()..];
        column += 1;
        continue;
      }

      let lexeme = match word(rest) {
        Ok((remaining, found)) => {
          rest = remaining;
          found
        }
        Err(_) => {
          let (found, remaining) = rest.split_at(c.len_utf8());
          rest = remaining;
          found
        }
      };

      self.classify(line, column, lexeme);
      column += lexeme.chars().count();
    }
  }

  fn classify(&mut self, line: PositionNumberType, column: PositionNumberType, lexeme: &str) {
    if self.in_comment {
      if lexeme == "," {
        self.in_comment = false;
      }
      return;
    }

    let text = lexeme.to_ascii_lowercase();
    let mut chars = text.chars();
    let first = match chars.next() {
      Some(c) => c,
      None    => return
    };
    let is_single = chars.next().is_none();

    match first {

      '-' if is_single => self.pieces.push(Piece::Hyphen(line, column)),

      ',' if is_single => self.in_comment = true,

      c if c.is_ascii_digit() => {
        warn!("({}, {}): unexpected character '{}'", line, column, c);
      }

      c if is_word_char(c) => {
        let token = self.word_token(line, column, &text, is_single);
        self.push(token);
      }

      _ => {
        self.push(
          Token::new(line, column, &text, TokenKind::Punctuation, TOKEN_VALUE_DEFAULT, Element::Earth)
        );
      }

    }
  }

  fn word_token(
    &self,
    line      : PositionNumberType,
    column    : PositionNumberType,
    text      : &str,
    is_single : bool
  ) -> Token {
    if !is_single {
      if let Some(command) = Command::from_word(text) {
        return Token::new(
          line, column, text, TokenKind::ReservedWord, command.code() as f64, Element::Earth
        );
      }
    }
    match NUMBER_WORDS.get(text) {
      Some(value) if !is_single || text == "a" => {
        Token::new(line, column, text, TokenKind::Number, *value as f64, Element::Earth)
      }
      _ => {
        Token::new(
          line, column, text, TokenKind::Variable, TOKEN_VALUE_DEFAULT, self.words.element(text)
        )
      }
    }
  }

}

// endregion

// region Hyphen groups

/// One part of a number group, with the order of magnitude the grammar assigns it.
#[derive(Clone, Debug)]
struct NumberPart {
  token     : Token,
  value     : NumberType,
  magnitude : u32,
}

impl NumberPart {

  fn new(token: Token) -> NumberPart {
    let value = token.value as NumberType;
    NumberPart{
      token,
      value,
      magnitude: magnitude(value)
    }
  }

  /// Absorbs the next part with `combine`, spelling the result with a hyphen.
  fn absorb(&mut self, next: &NumberPart, value: NumberType, magnitude: u32) {
    self.token.text = format!("{}-{}", self.token.text, next.token.text);
    self.value = value;
    self.magnitude = magnitude;
  }

}

/// The power of ten just below a value: 0 for units, 1 for tens, 2 for hundreds.
fn magnitude(value: NumberType) -> u32 {
  let mut value = value;
  let mut power = 0;
  while value >= 10 {
    value /= 10;
    power += 1;
  }
  power
}

fn cannot_combine(part: &NumberPart, next: &NumberPart) -> Diagnostic {
  Diagnostic::new(
    next.token.line,
    next.token.column,
    format!("cannot combine number \"{}\" with number \"{}\"", part.token.text, next.token.text)
  )
}

/**
  One pass over a number group. `step` looks at a part and the part after it and either absorbs
  the next part (returning the new value and magnitude), leaves both alone, or rejects the pair.
  With `repeat`, a part keeps absorbing until `step` leaves the next part alone.
*/
fn combine_pass<F>(
  parts  : Vec<NumberPart>,
  repeat : bool,
  step   : F
) -> std::result::Result<Vec<NumberPart>, Diagnostic>
  where F: Fn(&NumberPart, &NumberPart) -> Option<std::result::Result<(NumberType, u32), ()>>
{
  let mut combined: Vec<NumberPart> = Vec::with_capacity(parts.len());
  let mut parts = parts.into_iter().peekable();

  while let Some(mut part) = parts.next() {
    while let Some(next) = parts.peek() {
      match step(&part, next) {
        None                             => break,
        Some(Err(()))                    => return Err(cannot_combine(&part, next)),
        Some(Ok((value, magnitude)))     => {
          part.absorb(next, value, magnitude);
          parts.next();
          if !repeat {
            break;
          }
        }
      }
    }
    combined.push(part);
  }

  Ok(combined)
}

/**
  Reads a hyphen group of number words as one number. The passes, in order:

  1. a multiple of ten takes the units after it: `twenty-five`
  2. a number below one hundred multiplies a following hundred: `two-hundred`
  3. a hundred takes the smaller number after it: `two-hundred-fifty`
  4. a number multiplies every larger magnitude after it: `two-hundred-fifty-thousand`
  5. a number takes every smaller magnitude after it: `three-thousand-two`

  Two parts of one magnitude side by side never combine.
*/
fn combine_numbers(parts: Vec<Token>) -> std::result::Result<Token, Diagnostic> {
  let parts: Vec<NumberPart> = parts.into_iter().map(NumberPart::new).collect();

  let parts = combine_pass(parts, false, |part, next| {
    if part.magnitude >= 2 {
      return None;
    }
    match part.magnitude.cmp(&next.magnitude) {
      std::cmp::Ordering::Equal   => Some(Err(())),
      std::cmp::Ordering::Less    => None,
      std::cmp::Ordering::Greater => {
        match part.value % 10 == 0 {
          true  => Some(Ok((part.value.saturating_add(next.value), part.magnitude))),
          false => Some(Err(()))
        }
      }
    }
  })?;

  let parts = combine_pass(parts, false, |part, next| {
    match (part.magnitude < 2, next.magnitude) {
      (false, _) => None,
      (true, 2)  => Some(Ok((part.value.saturating_mul(next.value), 2))),
      (true, m) if m < 2 => Some(Err(())),
      _          => None
    }
  })?;

  let parts = combine_pass(parts, false, |part, next| {
    match (part.magnitude == 2, part.magnitude.cmp(&next.magnitude)) {
      (false, _)                           => None,
      (true, std::cmp::Ordering::Greater) => Some(Ok((part.value.saturating_add(next.value), 2))),
      (true, std::cmp::Ordering::Equal)   => Some(Err(())),
      (true, std::cmp::Ordering::Less)    => None
    }
  })?;

  let parts = combine_pass(parts, true, |part, next| {
    match part.magnitude.cmp(&next.magnitude) {
      std::cmp::Ordering::Less    => {
        Some(Ok((part.value.saturating_mul(next.value), part.magnitude + next.magnitude)))
      }
      std::cmp::Ordering::Equal   => Some(Err(())),
      std::cmp::Ordering::Greater => None
    }
  })?;

  let parts = combine_pass(parts, true, |part, next| {
    match part.magnitude.cmp(&next.magnitude) {
      std::cmp::Ordering::Greater => Some(Ok((part.value.saturating_add(next.value), part.magnitude))),
      std::cmp::Ordering::Equal   => Some(Err(())),
      std::cmp::Ordering::Less    => None
    }
  })?;

  let mut parts = parts.into_iter();
  let first = match parts.next() {
    Some(first) => first,
    None        => return Err(Diagnostic::new(0, 0, "empty number group".to_string()))
  };
  if let Some(second) = parts.next() {
    return Err(cannot_combine(&first, &second));
  }

  let mut token = first.token;
  token.value = first.value as f64;
  token.element = Element::Earth;
  Ok(token)
}

/// Joins a hyphen group into one variable. The parts' element is kept if they all agree.
fn combine_variable(parts: Vec<Token>) -> Token {
  let mut parts = parts.into_iter();
  let mut token = match parts.next() {
    Some(token) => token,
    None        => return Token::new(0, 0, "", TokenKind::Variable, TOKEN_VALUE_DEFAULT, Element::Earth)
  };

  for part in parts {
    token.text = format!("{}-{}", token.text, part.text);
    if part.element != token.element {
      token.element = Element::Earth;
    }
  }

  token.kind = TokenKind::Variable;
  token.value = TOKEN_VALUE_DEFAULT;
  token
}

/// Collapses every hyphen group into a single token.
fn join_hyphens(pieces: Vec<Piece>, errors: &mut Vec<Diagnostic>) -> Vec<Token> {
  let mut tokens = Vec::with_capacity(pieces.len());
  let mut pieces = pieces.into_iter().peekable();

  while let Some(piece) = pieces.next() {
    let first = match piece {
      Piece::Token(token) => token,
      Piece::Hyphen(line, column) => {
        errors.push(Diagnostic::new(line, column, "hyphen with nothing before it".to_string()));
        continue;
      }
    };

    let mut group = vec![first];
    while let Some(Piece::Hyphen(line, column)) = pieces.peek().cloned() {
      pieces.next();
      match pieces.next() {
        Some(Piece::Token(token)) => group.push(token),
        _                         => {
          errors.push(Diagnostic::new(line, column, "dangling hyphen".to_string()));
          break;
        }
      }
    }

    if group.len() == 1 {
      tokens.extend(group);
      continue;
    }

    if let Some(mark) = group.iter().find(|token| token.kind == TokenKind::Punctuation) {
      errors.push(
        Diagnostic::new(mark.line, mark.column, format!("\"{}\" cannot be hyphenated", mark.text))
      );
      continue;
    }

    match group.iter().all(|token| token.kind == TokenKind::Number) {
      true  => {
        match combine_numbers(group) {
          Ok(token)       => tokens.push(token),
          Err(diagnostic) => errors.push(diagnostic)
        }
      }
      false => tokens.push(combine_variable(group))
    }
  }

  tokens
}

// endregion

/// Reads program text into tokens, in source order. Lines and columns count from 1.
pub fn tokenize(text: &str, words: &dyn WordLookup) -> Result<Vec<Token>> {
  let mut scanner = Scanner::new(words);
  for (index, line) in text.lines().enumerate() {
    scanner.scan_line(index + 1, line);
  }

  let Scanner{ pieces, mut errors, .. } = scanner;
  let tokens = join_hyphens(pieces, &mut errors);

  match errors.is_empty() {
    true  => Ok(tokens),
    false => {
      for error in errors.iter() {
        warn!("{}", error);
      }
      Err(HaifuError::Tokenize(errors))
    }
  }
}
