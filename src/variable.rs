use std::collections::HashMap;

use string_cache::DefaultAtom;

use crate::element::{Element, Relation};
use crate::rung::Rung;

/// What a variable holds. Assigning either form discards the other.
#[derive(Clone, PartialEq, Debug)]
pub enum Binding {
  Value(f64),
  /// A captured block, executed whenever the variable is executed.
  Block(Vec<Rung>),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Variable {
  pub element : Element,
  pub binding : Binding,
}

impl Variable {

  /// The variable's value, if it holds one.
  pub fn value(&self) -> Option<f64> {
    match self.binding {
      Binding::Value(value) => Some(value),
      Binding::Block(_)     => None
    }
  }

  pub fn block(&self) -> Option<&[Rung]> {
    match &self.binding {
      Binding::Block(rungs) => Some(rungs),
      Binding::Value(_)     => None
    }
  }

  pub fn is_callable(&self) -> bool {
    self.block().is_some()
  }

}

/**
  The variables of a run, keyed by canonical name. A variable exists from its first assignment
  or block capture; until then lookups find nothing.
*/
#[derive(Clone, Default, Debug)]
pub struct Variables {
  variables: HashMap<DefaultAtom, Variable>,
}

impl Variables {

  pub fn new() -> Variables {
    Variables::default()
  }

  pub fn clear(&mut self) {
    self.variables.clear();
  }

  pub fn get(&self, name: &DefaultAtom) -> Option<&Variable> {
    self.variables.get(name)
  }

  pub fn len(&self) -> usize {
    self.variables.len()
  }

  pub fn is_empty(&self) -> bool {
    self.variables.is_empty()
  }

  /// The variables in name order.
  pub fn sorted(&self) -> Vec<(&DefaultAtom, &Variable)> {
    let mut entries: Vec<(&DefaultAtom, &Variable)> = self.variables.iter().collect();
    entries.sort_by(|a, b| {
      let (left, right): (&str, &str) = (a.0, b.0);
      left.cmp(right)
    });
    entries
  }

  fn entry(&mut self, name: &DefaultAtom) -> &mut Variable {
    self.variables
        .entry(name.clone())
        .or_insert(Variable{ element: Element::None, binding: Binding::Value(0.0) })
  }

  /**
    Stores a value, creating the variable if needed. A variable with no element yet takes
    `Earth`. Otherwise it keeps its element, unless the write carries the element the value came
    from, in which case the variable takes that element.
  */
  pub fn assign(&mut self, name: &DefaultAtom, value: f64, source: Option<Element>) {
    let variable = self.entry(name);
    variable.binding = Binding::Value(value);
    variable.element = match (variable.element, source) {
      (Element::None, _)      => Element::Earth,
      (_, Some(element))      => element,
      (current, None)         => current,
    };
  }

  /// Binds a captured block. A variable with no element yet takes the element of its name.
  pub fn bind_block(&mut self, name: &DefaultAtom, rungs: Vec<Rung>, name_element: Element) {
    let variable = self.entry(name);
    variable.binding = Binding::Block(rungs);
    if variable.element == Element::None {
      variable.element = name_element;
    }
  }

  /// Advances an existing variable's element. Returns the new element.
  pub fn advance_element(&mut self, name: &DefaultAtom, relation: Relation) -> Option<Element> {
    let variable = self.variables.get_mut(name)?;
    variable.element = variable.element.advance(relation);
    Some(variable.element)
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::position::Position;

  fn atom(name: &str) -> DefaultAtom {
    DefaultAtom::from(name)
  }

  #[test]
  fn first_assignment_takes_earth() {
    let mut variables = Variables::new();
    assert!(variables.get(&atom("moon")).is_none());
    variables.assign(&atom("moon"), 4.0, None);
    let moon = variables.get(&atom("moon")).unwrap();
    assert_eq!(moon.value(), Some(4.0));
    assert_eq!(moon.element, Element::Earth);
  }

  #[test]
  fn later_assignments_keep_or_take_element() {
    let mut variables = Variables::new();
    variables.assign(&atom("moon"), 4.0, None);
    variables.advance_element(&atom("moon"), Relation::Create);
    variables.assign(&atom("moon"), 5.0, None);
    assert_eq!(variables.get(&atom("moon")).unwrap().element, Element::Metal);
    variables.assign(&atom("moon"), 6.0, Some(Element::Water));
    assert_eq!(variables.get(&atom("moon")).unwrap().element, Element::Water);
  }

  #[test]
  fn blocks_and_values_replace_each_other() {
    let mut variables = Variables::new();
    let block = vec![Rung::literal(Position::default(), "two", 2.0)];
    variables.bind_block(&atom("song"), block.clone(), Element::Fire);

    let song = variables.get(&atom("song")).unwrap();
    assert!(song.is_callable());
    assert_eq!(song.value(), None);
    assert_eq!(song.block(), Some(&block[..]));
    assert_eq!(song.element, Element::Fire);

    variables.assign(&atom("song"), 1.0, None);
    let song = variables.get(&atom("song")).unwrap();
    assert!(!song.is_callable());
    assert_eq!(song.element, Element::Fire);

    variables.bind_block(&atom("song"), vec![], Element::Wood);
    assert_eq!(variables.get(&atom("song")).unwrap().element, Element::Fire);
  }

  #[test]
  fn advancing_a_missing_variable() {
    let mut variables = Variables::new();
    assert_eq!(variables.advance_element(&atom("moon"), Relation::Love), None);
    assert!(variables.is_empty());
  }

  #[test]
  fn sorted_by_name() {
    let mut variables = Variables::new();
    variables.assign(&atom("wind"), 1.0, None);
    variables.assign(&atom("bell"), 2.0, None);
    let names: Vec<String> = variables.sorted().iter().map(|(name, _)| name.to_string()).collect();
    assert_eq!(names, vec!["bell", "wind"]);
  }
}
