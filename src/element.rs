/*!
  The five elements and the four relations between them.

  Each relation is a directed 5-cycle over Earth, Metal, Water, Wood, and Fire, and each is a
  different permutation of the same five elements. A relation is therefore a bijection from the
  set of elements to itself, which is how it is stored: a `BiMap` from an element to its
  successor. Reading the map left to right advances an element along the cycle (the `Create`,
  `Destroy`, `Fear`, and `Love` commands); reading it right to left answers the question
  `Operate` asks, namely which element an operand's element follows.

  `Element::None` is outside every cycle and maps to itself under every relation.
*/

use std::fmt::{Display, Formatter};

use bimap::BiMap;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::numeric::parity;

#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter,
  Clone,        Copy,          Eq,         PartialEq,  Debug,  Hash
)]
pub enum Element {
  #[strum(serialize = "none")]
  None,
  #[strum(serialize = "earth")]
  Earth,
  #[strum(serialize = "metal")]
  Metal,
  #[strum(serialize = "water")]
  Water,
  #[strum(serialize = "wood")]
  Wood,
  #[strum(serialize = "fire")]
  Fire,
}

impl Default for Element {
  fn default() -> Self {
    Element::Earth
  }
}

impl Element {
  /// The elements that take part in the relations, in `Create` order.
  pub const CYCLE: [Element; 5] =
    [Element::Earth, Element::Metal, Element::Water, Element::Wood, Element::Fire];

  /// Advances the element one step along the given relation.
  pub fn advance(self, relation: Relation) -> Element {
    relation.successor(self)
  }
}

#[derive(StrumDisplay, EnumIter, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Relation {
  Create,
  Destroy,
  Fear,
  Love,
}

impl Relation {

  fn table(self) -> &'static BiMap<Element, Element> {
    match self {
      Relation::Create  => &CREATE,
      Relation::Destroy => &DESTROY,
      Relation::Fear    => &FEAR,
      Relation::Love    => &LOVE,
    }
  }

  /// The element after `element` in this relation's cycle.
  pub fn successor(self, element: Element) -> Element {
    self.table()
        .get_by_left(&element)
        .copied()
        .unwrap_or(Element::None)
  }

  /// Whether `later` is the successor of `earlier` in this relation's cycle.
  pub fn follows(self, earlier: Element, later: Element) -> bool {
    match self.table().get_by_right(&later) {
      Some(predecessor) => *predecessor == earlier,
      None              => false
    }
  }

  /**
    The relation under which `later` follows `earlier`, tried in the fixed order
    `Create`, `Destroy`, `Fear`, `Love`. Each element has a distinct successor under each
    relation, so at most one relation can match a pair of distinct elements.
  */
  pub fn between(earlier: Element, later: Element) -> Option<Relation> {
    [Relation::Create, Relation::Destroy, Relation::Fear, Relation::Love]
      .iter()
      .copied()
      .find(|relation| relation.follows(earlier, later))
  }
}

fn make_cycle(order: [Element; 5]) -> BiMap<Element, Element> {
  let mut table = BiMap::new();
  for (i, element) in order.iter().enumerate() {
    table.insert(*element, order[(i + 1) % order.len()]);
  }
  table
}

lazy_static! {
  static ref CREATE: BiMap<Element, Element> = make_cycle(
    [Element::Earth, Element::Metal, Element::Water, Element::Wood, Element::Fire]
  );
  static ref DESTROY: BiMap<Element, Element> = make_cycle(
    [Element::Earth, Element::Water, Element::Fire, Element::Metal, Element::Wood]
  );
  static ref FEAR: BiMap<Element, Element> = make_cycle(
    [Element::Earth, Element::Wood, Element::Metal, Element::Fire, Element::Water]
  );
  static ref LOVE: BiMap<Element, Element> = make_cycle(
    [Element::Earth, Element::Fire, Element::Wood, Element::Water, Element::Metal]
  );
}

/// Even and odd, as far as the elements are concerned.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Polarity {
  Yin,
  Yang
}

impl Polarity {

  pub fn of(value: f64) -> Polarity {
    match parity(value) {
      0 => Polarity::Yin,
      _ => Polarity::Yang
    }
  }

  /// The numeric value written back by `Operate` when both operands share an element.
  pub fn value(self) -> f64 {
    match self {
      Polarity::Yin  => 0.0,
      Polarity::Yang => 1.0
    }
  }
}

impl Display for Polarity {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Polarity::Yin  => write!(f, "yin"),
      Polarity::Yang => write!(f, "yang")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  #[test]
  fn create_cycle_order() {
    assert_eq!(Element::Earth.advance(Relation::Create), Element::Metal);
    assert_eq!(Element::Metal.advance(Relation::Create), Element::Water);
    assert_eq!(Element::Water.advance(Relation::Create), Element::Wood);
    assert_eq!(Element::Wood.advance(Relation::Create), Element::Fire);
    assert_eq!(Element::Fire.advance(Relation::Create), Element::Earth);
  }

  #[test]
  fn five_steps_close_every_cycle() {
    for relation in Relation::iter() {
      for element in Element::CYCLE.iter() {
        let mut current = *element;
        for _ in 0..5 {
          current = current.advance(relation);
        }
        assert_eq!(current, *element, "{} did not close on {}", relation, element);
      }
    }
  }

  #[test]
  fn relations_are_distinct_permutations() {
    let mut seen: HashSet<Vec<Element>> = HashSet::new();
    for relation in Relation::iter() {
      let image: Vec<Element> =
        Element::CYCLE.iter().map(|e| e.advance(relation)).collect();
      let distinct: HashSet<Element> = image.iter().copied().collect();
      assert_eq!(distinct.len(), 5);
      assert!(!distinct.contains(&Element::None));
      assert!(seen.insert(image), "{} repeats another relation", relation);
    }
  }

  #[test]
  fn none_is_outside_the_cycles() {
    for relation in Relation::iter() {
      assert_eq!(Element::None.advance(relation), Element::None);
    }
    assert_eq!(Relation::between(Element::None, Element::Earth), None);
  }

  #[test]
  fn relation_between_pairs() {
    assert_eq!(Relation::between(Element::Metal, Element::Water), Some(Relation::Create));
    assert_eq!(Relation::between(Element::Metal, Element::Wood), Some(Relation::Destroy));
    assert_eq!(Relation::between(Element::Metal, Element::Fire), Some(Relation::Fear));
    assert_eq!(Relation::between(Element::Metal, Element::Earth), Some(Relation::Love));
    assert_eq!(Relation::between(Element::Metal, Element::Metal), None);
  }

  #[test]
  fn element_names() {
    assert_eq!(Element::from_str("wood"), Ok(Element::Wood));
    assert!(Element::from_str("aether").is_err());
    assert_eq!(format!("{}", Element::Fire), "fire");
  }

  #[test]
  fn polarity_rounds_away_from_zero() {
    assert_eq!(Polarity::of(2.0), Polarity::Yin);
    assert_eq!(Polarity::of(2.2), Polarity::Yang);
    assert_eq!(Polarity::of(-0.5), Polarity::Yang);
    assert_eq!(Polarity::of(-2.0), Polarity::Yin);
  }
}
