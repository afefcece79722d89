use std::collections::HashMap;
use std::convert::TryFrom;
use std::ops::RangeInclusive;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, IntoStaticStr};

use crate::element::Relation;

/// Range of the pseudo-random value read from a `Few` cell.
pub const FEW_RANGE: RangeInclusive<u32> = 1..=50;
/// Range of the pseudo-random value read from a `Many` cell.
pub const MANY_RANGE: RangeInclusive<u32> = 51..=1000;

/**
  The twenty commands of the machine.

  The discriminant of each variant is the command's numeric code, the value a command rung
  carries. Codes are contiguous from 1, so `Command::try_from(code)` recovers a command from a
  code and fails for anything outside `1..=20`.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,       PartialEq,        Debug,        Hash
)]
#[repr(u8)]
pub enum Command {
  // Numeric commands, inert when executed //
  Few = 1,
  Many,

  // Control //
  Heaven,
  Promote,
  Demote,
  Blossom,
  Rise,
  Fall,

  // I/O //
  Listen,
  Speak,
  Count,

  // Elements //
  Create,
  Destroy,
  Fear,
  Love,

  // Values //
  Become,
  Like,
  Tomorrow,
  Negative,
  Operate,
}

impl Command {

  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Looks up a command by its code, accepting the `f64` payload a command rung stores.
  pub fn from_code(code: f64) -> Option<Command> {
    if code.fract() != 0.0 || code < 0.0 || code > u8::MAX as f64 {
      return None;
    }
    Command::try_from(code as u8).ok()
  }

  /// The reserved word, if any, that spells a command.
  pub fn from_word(word: &str) -> Option<Command> {
    RESERVED_WORDS.get(word).copied()
  }

  /// The range a command draws its value from when read as an operand, if it has a value.
  pub fn value_range(&self) -> Option<RangeInclusive<u32>> {
    match self {
      Command::Few  => Some(FEW_RANGE),
      Command::Many => Some(MANY_RANGE),
      _             => None
    }
  }

  /// The element relation advanced by the element commands.
  pub fn relation(&self) -> Option<Relation> {
    match self {
      Command::Create  => Some(Relation::Create),
      Command::Destroy => Some(Relation::Destroy),
      Command::Fear    => Some(Relation::Fear),
      Command::Love    => Some(Relation::Love),
      _                => None
    }
  }

}

lazy_static! {
  static ref RESERVED_WORDS: HashMap<&'static str, Command> = {
    let table: &[(Command, &[&str])] = &[
      (Command::Few, &["some", "few"]),
      (Command::Many, &["many", "plethora", "myriad"]),
      (Command::Heaven, &[
        "heaven", "heavens", "nirvana",
        "enlightenment", "enlighten", "enlightens", "enlightened", "enlightening",
        "harmony", "harmonies", "harmonious",
      ]),
      (Command::Promote, &[
        "promote", "promotes", "promoted", "promoting", "promotion", "promotions",
        "more",
        "increase", "increases", "increased", "increasing",
        "wax", "waxes", "waxed", "waxing",
      ]),
      (Command::Demote, &[
        "demote", "demotes", "demoted", "demoting", "demotion", "demotions",
        "less", "lessen", "lessens", "lessened", "lessening",
        "reduce", "reduces", "reduced", "reducing", "reduction", "reductions",
        "wane", "wanes", "waned", "waning",
      ]),
      (Command::Blossom, &[
        "blossom", "blossoms", "blossomed", "blossoming",
        "flower", "flowers", "flowered", "flowering",
        "petal", "petals",
      ]),
      (Command::Rise, &[
        "rise", "rises", "rose", "rising", "risen",
        "float", "floats", "floated", "floating",
        "ascend", "ascends", "ascended", "ascending", "ascension", "ascensions",
        "up", "upward",
      ]),
      (Command::Fall, &[
        "fall", "falls", "fell", "falling", "fallen",
        "drop", "drops", "dropped", "dropping",
        "descend", "descends", "descended", "descending", "descension", "descensions",
        "down", "downward",
      ]),
      (Command::Listen, &[
        "listen", "listens", "listened", "listening",
        "hear", "hears", "heard", "hearing",
        "see", "sees", "saw", "seeing",
      ]),
      (Command::Speak, &[
        "speak", "speaks", "spoke", "speaking", "spoken",
        "say", "says", "said", "saying",
        "draw", "draws", "drew", "drawing", "drawn",
      ]),
      (Command::Count, &[
        "count", "counts", "counted", "counting",
        "number", "numbers", "numbered", "numbering",
        "age", "ages", "aged", "aging",
      ]),
      (Command::Create, &[
        "create", "creates", "created", "creating", "creation", "creations",
        "produce", "produces", "produced", "producing", "production", "productions",
        "productive",
        "build", "builds", "built", "building",
      ]),
      (Command::Destroy, &[
        "destroy", "destroys", "destroyed", "destroying", "destruction", "destructive",
        "damage", "damages", "damaged", "damaging",
        "kill", "kills", "killed", "killing",
      ]),
      (Command::Fear, &[
        "fear", "fears", "feared", "fearing", "fearful",
        "hate", "hates", "hated", "hating", "hatred", "hatreds", "hateful",
        "doubt", "doubts", "doubted", "doubting", "doubtful",
      ]),
      (Command::Love, &[
        "love", "loves", "loved", "loving", "lovely",
        "desire", "desires", "desired", "desiring", "desirous",
        "regard", "regards", "regarded", "regarding",
      ]),
      (Command::Become, &[
        "become", "becomes", "became", "becoming",
        "reach", "reaches", "reached", "reaching",
        "achieve", "achieves", "achieved", "achieving", "achievement", "achievements",
      ]),
      (Command::Like, &[
        "like", "alike", "liken", "likens",
        "as",
        "is", "are", "was", "were", "be", "being", "been",
        "resemble", "resembles", "resembled", "resembling",
      ]),
      (Command::Tomorrow, &["tomorrow", "today", "yesterday"]),
      (Command::Negative, &[
        "negative", "negatives", "negate", "negates", "negated", "negating",
        "negation", "negations",
        "not",
        "deny", "denies", "denied", "denying", "denial", "denials",
      ]),
      (Command::Operate, &[
        "operate", "operates", "operated", "operating", "operation", "operations",
        "examine", "examines", "examined", "examining", "examination", "examinations",
        "study", "studies", "studied", "studying",
      ]),
    ];

    let mut words = HashMap::new();
    for (command, spellings) in table {
      for spelling in spellings.iter() {
        words.insert(*spelling, *command);
      }
    }
    words
  };
}
