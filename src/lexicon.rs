/*!
  Word data: what the machine needs to know about an English word that the text alone does not
  tell it.

  A `Lexicon` maps a word to a `WordEntry` holding the word's base word (so that "rivers" and
  "river" name the same variable), its element, and its possible syllable counts. The machine only
  consumes the first two through the `WordLookup` trait; syllable counts are carried so that a
  dictionary file survives a load and save unchanged.

  Dictionary text files hold one entry per line:

  ```text
  word base_word element count [count ...]
  ```

  A base word of `_` means the word has none, and `.` means the word is its own base word. An
  element or syllable count of `_` means the data is not known. Blank lines are skipped.
*/

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use string_cache::DefaultAtom;

use crate::command::Command;
use crate::element::Element;
use crate::error::{HaifuError, Result};
use crate::tokenizer::is_number_word;

const MISSING_FIELD: &str = "_";
const IDENTITY_BASE_WORD: &str = ".";

/// What the machine asks of word data.
pub trait WordLookup {
  /// The name under which the word's variable is stored.
  fn canonical(&self, word: &str) -> DefaultAtom;
  /// The element a variable spelled by the word starts with.
  fn element(&self, word: &str) -> Element;
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum BaseWord {
  None,
  Identity,
  Word(String)
}

impl Display for BaseWord {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      BaseWord::None       => write!(f, "{}", MISSING_FIELD),
      BaseWord::Identity   => write!(f, "{}", IDENTITY_BASE_WORD),
      BaseWord::Word(word) => write!(f, "{}", word)
    }
  }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct WordEntry {
  pub base_word : BaseWord,
  pub element   : Option<Element>,
  pub syllables : Vec<u32>,
}

impl Display for WordEntry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let element = match self.element {
      Some(element) => element.to_string(),
      None          => MISSING_FIELD.to_string()
    };
    let syllables = match self.syllables.is_empty() {
      true  => MISSING_FIELD.to_string(),
      false => {
        self.syllables
            .iter()
            .map(|count| count.to_string())
            .collect::<Vec<String>>()
            .join(" ")
      }
    };
    write!(f, "{} {} {}", self.base_word, element, syllables)
  }
}

/// An in-memory dictionary, ordered by word.
#[derive(Clone, Default, Debug)]
pub struct Lexicon {
  words: BTreeMap<String, WordEntry>
}

impl Lexicon {

  pub fn new() -> Lexicon {
    Lexicon::default()
  }

  pub fn load<P: AsRef<Path>>(path: P) -> Result<Lexicon> {
    let text = std::fs::read_to_string(path)?;
    Lexicon::parse(&text)
  }

  /// Reads dictionary text. Line numbers in errors are 1-based.
  pub fn parse(text: &str) -> Result<Lexicon> {
    let mut lexicon = Lexicon::new();

    for (index, line) in text.lines().enumerate() {
      let mut fields = line.split_whitespace();
      let word = match fields.next() {
        Some(word) => word.to_lowercase(),
        None       => continue
      };

      let base_word = match fields.next() {
        Some(MISSING_FIELD)      => BaseWord::None,
        Some(IDENTITY_BASE_WORD) => BaseWord::Identity,
        Some(base)               => BaseWord::Word(base.to_lowercase()),
        None                     => return Err(dictionary_error(index, "missing base word"))
      };

      let element = match fields.next() {
        Some(MISSING_FIELD) => None,
        Some(name)          => {
          match Element::from_str(&name.to_lowercase()) {
            Ok(element) => Some(element),
            Err(_)      => {
              return Err(dictionary_error(index, &format!("unknown element \"{}\"", name)));
            }
          }
        }
        None => return Err(dictionary_error(index, "missing element"))
      };

      let mut syllables = Vec::new();
      for field in fields {
        if field == MISSING_FIELD {
          continue;
        }
        match field.parse::<u32>() {
          Ok(count) => syllables.push(count),
          Err(_)    => {
            return Err(dictionary_error(index, &format!("bad syllable count \"{}\"", field)));
          }
        }
      }

      lexicon.words.insert(word, WordEntry{ base_word, element, syllables });
    }

    Ok(lexicon)
  }

  /**
    Adds or replaces a word. Reserved words and number words have fixed meanings and are
    refused; the return value says whether the entry was stored.
  */
  pub fn insert(&mut self, word: &str, entry: WordEntry) -> bool {
    let word = word.to_lowercase();
    if Command::from_word(&word).is_some() || is_number_word(&word) {
      return false;
    }
    self.words.insert(word, entry);
    true
  }

  pub fn remove(&mut self, word: &str) -> Option<WordEntry> {
    self.words.remove(&word.to_lowercase())
  }

  pub fn entry(&self, word: &str) -> Option<&WordEntry> {
    self.words.get(word)
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// Writes the dictionary in the same text format `parse` reads, sorted by word.
  pub fn write_to<W: Write>(&self, target: &mut W) -> Result<()> {
    for (word, entry) in self.words.iter() {
      writeln!(target, "{} {}", word, entry)?;
    }
    Ok(())
  }

  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let mut target = BufWriter::new(File::create(path)?);
    self.write_to(&mut target)?;
    target.flush()?;
    Ok(())
  }

}

impl WordLookup for Lexicon {

  fn canonical(&self, word: &str) -> DefaultAtom {
    match self.words.get(word) {
      Some(WordEntry{ base_word: BaseWord::Word(base), .. }) => DefaultAtom::from(base.as_str()),
      _                                                     => DefaultAtom::from(word)
    }
  }

  fn element(&self, word: &str) -> Element {
    match self.words.get(word) {
      Some(WordEntry{ element: Some(element), .. }) => *element,
      _                                             => Element::Earth
    }
  }

}

fn dictionary_error(index: usize, message: &str) -> HaifuError {
  HaifuError::Dictionary{
    line    : index + 1,
    message : message.to_string()
  }
}
