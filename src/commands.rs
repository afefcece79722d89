/*!
  The bodies of the twenty commands.

  Every command reads its operand through the delegate, and every command returns a `Step`.
  Only `Heaven` halts on its own; the cursor commands halt when they push the bureaucrat past the
  end of the tape. A command whose operand has no numeric value does nothing.
*/

use std::convert::TryFrom;

use tracing::warn;

use crate::command::Command;
use crate::element::{Element, Polarity, Relation};
use crate::input::InputStream;
use crate::numeric::{format_general, parity, round_away, to_offset};
use crate::position::Position;
use crate::rung::{Cell, Rung};
use crate::vm::{Engine, Step};

impl Engine {

  pub(crate) fn dispatch(&mut self, command: Command, input: &mut InputStream) -> Step {
    match command {

      // Inert: `Few` and `Many` only mean something as operands.
      Command::Few | Command::Many | Command::Tomorrow => Step::Continue,

      Command::Heaven   => Step::Halt,

      Command::Promote  => self.promote(),
      Command::Demote   => self.demote(),
      Command::Blossom  => self.blossom(),
      Command::Rise     => self.rise(),
      Command::Fall     => self.fall(),

      Command::Listen   => self.listen(input),
      Command::Speak    => self.speak(),
      Command::Count    => self.count(),

      Command::Create
      | Command::Destroy
      | Command::Fear
      | Command::Love   => match command.relation() {
        Some(relation) => self.advance_operand(relation),
        None           => Step::Continue
      },

      Command::Become   => self.become_(),
      Command::Like     => self.like(),
      Command::Negative => self.negative(),
      Command::Operate  => self.operate(),

    }
  }

  // region Bureaucrat

  /**
    Moves the bureaucrat by `offset`. Moving past the end of the tape ends the run, and moving
    before its start stops at index 0. The delegate is pulled down to stay behind the bureaucrat.
  */
  fn move_primary(&mut self, offset: i64, verb: &str) -> Step {
    self.moved = true;

    let target = (self.primary as i64).saturating_add(offset);
    if target >= self.tape.len() as i64 {
      self.primary = self.tape.len();
      self.secondary = self.secondary.min(self.primary);
      return self.fail(&format!("bureaucrat {} past the end of the program", verb));
    }
    match target < 0 {
      true  => {
        warn!("bureaucrat {} below the start of the program", verb);
        self.primary = 0;
      }
      false => self.primary = target as usize
    }

    self.secondary = self.secondary.min(self.primary);
    Step::Continue
  }

  fn promote(&mut self) -> Step {
    let value = match self.numeric_at(self.secondary) {
      Some(value) if value != 0.0 => value,
      _                           => return Step::Continue
    };
    if value < 0.0 {
      warn!("bureaucrat promoted by a negative value, {}", format_general(value));
    }
    self.move_primary(to_offset(value), "promoted")
  }

  fn demote(&mut self) -> Step {
    let value = match self.numeric_at(self.secondary) {
      Some(value) if value != 0.0 => value,
      _                           => return Step::Continue
    };
    if value < 0.0 {
      warn!("bureaucrat demoted by a negative value, {}", format_general(value));
    }
    self.move_primary(to_offset(value).saturating_neg(), "demoted")
  }

  /// Odd values move the bureaucrat forward, even values move it back.
  fn blossom(&mut self) -> Step {
    let offset = match self.numeric_at(self.secondary).map(to_offset) {
      Some(offset) if offset != 0 => offset,
      _                           => return Step::Continue
    };
    match parity(offset as f64) {
      1 => self.move_primary(offset, "blossomed"),
      _ => self.move_primary(offset.saturating_neg(), "blossomed")
    }
  }

  // endregion

  // region Delegate

  /// How far `Rise` and `Fall` move: the value just before the bureaucrat, or 1.
  fn delegate_step(&mut self) -> i64 {
    let value = match self.primary {
      0 => None,
      p => self.numeric_at(p - 1)
    };
    to_offset(value.unwrap_or(1.0))
  }

  fn move_secondary(&mut self, offset: i64, verb: &str) -> Step {
    if offset < 0 {
      warn!("delegate {} by a negative value, {}", verb, offset);
    }

    let target = (self.secondary as i64).saturating_add(offset);
    self.secondary = match target {
      t if t < 0                    => {
        warn!("delegate {} below the start of the program", verb);
        0
      }
      t if t > self.primary as i64  => {
        warn!("delegate {} above the bureaucrat", verb);
        self.primary
      }
      t                             => t as usize
    };
    Step::Continue
  }

  fn rise(&mut self) -> Step {
    let step = self.delegate_step();
    self.move_secondary(step, "rose")
  }

  fn fall(&mut self) -> Step {
    let step = self.delegate_step();
    self.move_secondary(step.saturating_neg(), "fell")
  }

  // endregion

  // region Input and output

  /**
    Reads one value from the input and splices it onto the front of the tape as a literal. Once
    the input is exhausted, moves the rung after the bureaucrat to the front instead.
  */
  fn listen(&mut self, input: &mut InputStream) -> Step {
    match input.read() {

      Some(event) => {
        let rung = Rung::literal(Position::Input(self.input_events), &event.text, event.value);
        self.insert(rung, 0);
        self.input_events += 1;
      }

      None => {
        let next = self.primary + 1;
        if next < self.tape.len() {
          if let Some(rung) = self.remove(next) {
            self.insert(rung, 0);
          }
        }
      }

    }
    Step::Continue
  }

  fn speak(&mut self) -> Step {
    let value = match self.numeric_at(self.secondary) {
      Some(value) => value,
      None        => return Step::Continue
    };
    let code = to_offset(value);
    match u32::try_from(code).ok().and_then(std::char::from_u32) {
      Some(c) => self.emit(&c.to_string()),
      None    => warn!("{} is not a character code", code)
    }
    Step::Continue
  }

  fn count(&mut self) -> Step {
    if let Some(value) = self.numeric_at(self.secondary) {
      self.emit(&format_general(value));
    }
    Step::Continue
  }

  // endregion

  // region Values

  /// Advances the element of the operand at the delegate along `relation`.
  fn advance_operand(&mut self, relation: Relation) -> Step {
    let index = self.secondary;
    if self.numeric_at(index).is_none() {
      return Step::Continue;
    }
    if let Some(rung) = self.tape.get_mut(index) {
      match &rung.cell {
        Cell::Variable(name) => {
          self.variables.advance_element(name, relation);
        }
        Cell::Literal(_) => rung.element = rung.element.advance(relation),
        _ => {}
      }
    }
    Step::Continue
  }

  /**
    Zero becomes `Heaven`: the operand's rung is rewritten in place. Any other value is rounded
    away from zero, and a value that is already whole moves one further from zero, so the result
    always differs from the value read. A variable that becomes something also advances its element
    along `Create`.
  */
  fn become_(&mut self) -> Step {
    let index = self.secondary;
    let value = match self.numeric_at(index) {
      Some(value) => value,
      None        => return Step::Continue
    };

    if value == 0.0 {
      if let Some(rung) = self.tape.get_mut(index) {
        rung.cell = Cell::Command(Command::Heaven);
        rung.element = Element::Earth;
      }
      return Step::Continue;
    }

    let rounded = round_away(value);
    let result = match (rounded == value, value < 0.0) {
      (true, true)  => value - 1.0,
      (true, false) => value + 1.0,
      (false, _)    => rounded
    };

    if let Some(rung) = self.tape.get_mut(index) {
      match &mut rung.cell {
        Cell::Variable(name) => {
          self.variables.assign(name, result, None);
          self.variables.advance_element(name, Relation::Create);
        }
        Cell::Literal(literal) => *literal = result,
        _ => {}
      }
    }
    Step::Continue
  }

  /**
    Stores into the variable just before the bureaucrat the first value found scanning down from
    the delegate, leaving the delegate on it. Stores 0 when no rung down there has a value.
  */
  fn like(&mut self) -> Step {
    let target = match self.primary {
      0 => return Step::Continue,
      p => p - 1
    };
    if self.tape.get(target).and_then(Rung::variable_name).is_none() {
      return Step::Continue;
    }

    let mut found = None;
    for index in (0..=self.secondary).rev() {
      if let Some(value) = self.numeric_at(index) {
        found = Some((index, value));
        break;
      }
    }

    let value = match found {
      Some((index, value)) => {
        self.secondary = index;
        value
      }
      None => 0.0
    };
    self.assign(target, value, None);
    Step::Continue
  }

  fn negative(&mut self) -> Step {
    let index = self.secondary;
    if let Some(value) = self.numeric_at(index) {
      self.assign(index, -value, None);
    }
    Step::Continue
  }

  /**
    Combines the operand at the delegate, B, with the one after it, A, and writes the result to B.
    The operation is chosen by the relation that leads from B's element to A's:

    | Relation       | Result |
    |:---------------|:-------|
    | same element   | `1` if both are odd, else `0` |
    | `Create`       | `A + B`, and a variable B takes A's element |
    | `Destroy`      | `A - B` |
    | `Fear`         | `A / B` |
    | `Love`         | `A * B` |
  */
  fn operate(&mut self) -> Step {
    let b = self.secondary;
    let a = b + 1;
    if a >= self.tape.len() {
      warn!("operate at the end of the program has no second operand");
      return Step::Continue;
    }

    let value_b = match self.numeric_at(b) {
      Some(value) => value,
      None        => return Step::Continue
    };
    let value_a = match self.numeric_at(a) {
      Some(value) => value,
      None        => return Step::Continue
    };
    let element_b = self.element_at(b);
    let element_a = self.element_at(a);

    if element_b == element_a {
      let result = match (Polarity::of(value_a), Polarity::of(value_b)) {
        (Polarity::Yang, Polarity::Yang) => Polarity::Yang,
        _                                => Polarity::Yin
      };
      self.assign(b, result.value(), None);
      return Step::Continue;
    }

    match Relation::between(element_b, element_a) {
      Some(Relation::Create)  => self.assign(b, value_a + value_b, Some(element_a)),
      Some(Relation::Destroy) => self.assign(b, value_a - value_b, None),
      Some(Relation::Fear)    => self.assign(b, value_a / value_b, None),
      Some(Relation::Love)    => self.assign(b, value_a * value_b, None),
      None                    => {
        warn!("no relation leads from {} to {}, operate does nothing", element_b, element_a);
      }
    }
    Step::Continue
  }

  // endregion

}

#[cfg(test)]
mod tests {
  use string_cache::DefaultAtom;

  use super::*;
  use crate::vm::tests::{cmd, lit, machine, stop, var, Captured};
  use crate::vm::StopReason;

  fn elemental(value: f64, element: Element) -> Rung {
    Rung::new(Position::source(1, 1), "x", element, Cell::Literal(value))
  }

  /// A machine with its tape given in tape order and its cursors placed.
  fn placed(tape: Vec<Rung>, primary: usize, secondary: usize) -> (Engine, Captured) {
    let mut source = tape;
    source.reverse();
    let (mut engine, captured) = machine(source);
    engine.primary = primary;
    engine.secondary = secondary;
    (engine, captured)
  }

  fn literal_at(engine: &Engine, index: usize) -> Option<f64> {
    match engine.tape()[index].cell {
      Cell::Literal(value) => Some(value),
      _                    => None
    }
  }

  fn value_of(engine: &Engine, name: &str) -> Option<f64> {
    engine.variables().get(&DefaultAtom::from(name)).and_then(|v| v.value())
  }

  fn run(engine: &mut Engine, command: Command) -> Step {
    engine.dispatch(command, &mut InputStream::empty())
  }

  #[test]
  fn speak_after_two_rises() {
    // [Heaven, Speak, Literal(65)]: the delegate rises past Heaven and Speak onto the literal.
    let (mut engine, captured) = placed(
      vec![cmd(Command::Heaven), cmd(Command::Speak), lit(65.0)], 2, 0
    );
    run(&mut engine, Command::Rise);
    run(&mut engine, Command::Rise);
    assert_eq!(engine.secondary(), 2);
    run(&mut engine, Command::Speak);
    assert_eq!(captured.text(), "A");
  }

  #[test]
  fn rise_and_fall_clamp() {
    let (mut engine, _) = placed(vec![lit(0.0), lit(3.0), lit(0.0), lit(0.0)], 2, 0);
    run(&mut engine, Command::Rise);
    assert_eq!(engine.secondary(), 2);
    run(&mut engine, Command::Fall);
    assert_eq!(engine.secondary(), 0);

    // At index 0 nothing precedes the bureaucrat, so the step is 1.
    let (mut engine, _) = placed(vec![lit(9.0), lit(9.0)], 0, 0);
    run(&mut engine, Command::Rise);
    assert_eq!(engine.secondary(), 0);
  }

  #[test]
  fn promote_and_demote() {
    let (mut engine, _) = placed(vec![lit(2.0), lit(0.0), lit(0.0), lit(0.0), lit(0.0)], 0, 0);
    assert_eq!(run(&mut engine, Command::Promote), Step::Continue);
    assert_eq!(engine.primary(), 2);
    assert!(engine.moved);

    assert_eq!(run(&mut engine, Command::Demote), Step::Continue);
    assert_eq!(engine.primary(), 0);

    // Demoting below the tape stops at the first rung.
    assert_eq!(run(&mut engine, Command::Demote), Step::Continue);
    assert_eq!(engine.primary(), 0);
  }

  #[test]
  fn promote_by_zero_stays() {
    let (mut engine, _) = placed(vec![lit(0.0), lit(1.0)], 1, 0);
    run(&mut engine, Command::Promote);
    assert_eq!(engine.primary(), 1);
    assert!(!engine.moved);
  }

  #[test]
  fn promote_past_the_end_is_fatal() {
    let (mut engine, _) = machine(vec![lit(1.0), cmd(Command::Promote), lit(1000.0)]);
    let outcome = engine.run(&mut InputStream::empty()).unwrap();
    assert_eq!(outcome.reason, StopReason::Fatal);
    assert_eq!(engine.primary(), engine.tape().len());
  }

  #[test]
  fn negative_promotion_moves_back() {
    let (mut engine, _) = placed(vec![lit(-1.5), lit(0.0), lit(0.0)], 2, 0);
    run(&mut engine, Command::Promote);
    assert_eq!(engine.primary(), 0);
    assert_eq!(engine.secondary(), 0);
  }

  #[test]
  fn blossom_direction_follows_parity() {
    let (mut engine, _) = placed(vec![lit(3.0), lit(0.0), lit(0.0), lit(0.0), lit(0.0)], 0, 0);
    run(&mut engine, Command::Blossom);
    assert_eq!(engine.primary(), 3);

    let (mut engine, _) = placed(vec![lit(1.6), lit(0.0), lit(0.0), lit(0.0)], 3, 0);
    run(&mut engine, Command::Blossom);
    assert_eq!(engine.primary(), 1);
    assert_eq!(engine.secondary(), 0);
  }

  #[test]
  fn listen_splices_input() {
    let (mut engine, _) = placed(vec![cmd(Command::Listen), lit(1.0)], 0, 0);
    let mut input = InputStream::from_text("12 x");

    engine.dispatch(Command::Listen, &mut input);
    assert_eq!(engine.tape().len(), 3);
    assert_eq!(literal_at(&engine, 0), Some(12.0));
    assert_eq!(engine.tape()[0].position, Position::Input(0));
    assert_eq!((engine.primary(), engine.secondary()), (1, 1));

    engine.dispatch(Command::Listen, &mut input);
    assert_eq!(literal_at(&engine, 0), Some('x' as u32 as f64));
    assert_eq!(engine.tape()[0].position, Position::Input(1));
    assert_eq!(engine.primary(), 2);
  }

  #[test]
  fn exhausted_listen_relocates_the_next_rung() {
    let (mut engine, _) = placed(vec![cmd(Command::Listen), lit(1.0), lit(2.0)], 0, 0);
    run(&mut engine, Command::Listen);
    let cells: Vec<Cell> = engine.tape().iter().map(|rung| rung.cell.clone()).collect();
    assert_eq!(
      cells,
      vec![Cell::Literal(1.0), Cell::Command(Command::Listen), Cell::Literal(2.0)]
    );
    assert_eq!(engine.primary(), 1);

    // With nothing after the bureaucrat the tape is left alone.
    let (mut engine, _) = placed(vec![lit(1.0), cmd(Command::Listen)], 1, 0);
    run(&mut engine, Command::Listen);
    assert_eq!(literal_at(&engine, 0), Some(1.0));
  }

  #[test]
  fn count_and_speak() {
    let (mut engine, captured) = placed(vec![lit(0.5), cmd(Command::Count)], 1, 0);
    run(&mut engine, Command::Count);
    engine.secondary = 1;
    run(&mut engine, Command::Count);
    assert_eq!(captured.text(), "0.5");

    let (mut engine, captured) = placed(vec![lit(-1.0), cmd(Command::Speak)], 1, 0);
    run(&mut engine, Command::Speak);
    assert_eq!(captured.text(), "");

    let (mut engine, captured) = placed(vec![lit(96.2), cmd(Command::Speak)], 1, 0);
    run(&mut engine, Command::Speak);
    assert_eq!(captured.text(), "a");
  }

  #[test]
  fn few_is_drawn_from_its_range() {
    let (mut engine, captured) = placed(vec![cmd(Command::Few), cmd(Command::Count)], 1, 0);
    for _ in 0..20 {
      run(&mut engine, Command::Count);
      let value: u32 = captured.text().parse().unwrap();
      assert!((1..=50).contains(&value));
      captured.0.borrow_mut().clear();
    }
  }

  #[test]
  fn many_is_drawn_from_its_range() {
    let (mut engine, _) = placed(vec![cmd(Command::Many), cmd(Command::Count)], 1, 0);
    for _ in 0..20 {
      let value = engine.numeric_at(0).unwrap();
      assert!(value >= 51.0 && value <= 1000.0);
    }
    assert_eq!(engine.numeric_at(1), None);
  }

  #[test]
  fn element_commands() {
    let (mut engine, _) = placed(vec![lit(1.0), var("moon"), stop()], 2, 0);
    run(&mut engine, Command::Create);
    assert_eq!(engine.tape()[0].element, Element::Metal);
    run(&mut engine, Command::Destroy);
    assert_eq!(engine.tape()[0].element, Element::Wood);

    // An undefined variable has no value, so nothing happens.
    engine.secondary = 1;
    run(&mut engine, Command::Love);
    assert!(engine.variables().is_empty());

    engine.variables.assign(&DefaultAtom::from("moon"), 2.0, None);
    run(&mut engine, Command::Love);
    let moon = engine.variables().get(&DefaultAtom::from("moon")).unwrap();
    assert_eq!(moon.element, Element::Fire);
    assert_eq!(engine.tape()[1].element, Element::Earth);

    engine.secondary = 2;
    run(&mut engine, Command::Fear);
    assert_eq!(engine.tape()[2].element, Element::Earth);
  }

  #[test]
  fn become_rounds_away_and_nudges() {
    let (mut engine, _) = placed(vec![lit(3.0), lit(2.4), lit(-2.0), lit(0.0)], 3, 0);
    run(&mut engine, Command::Become);
    assert_eq!(literal_at(&engine, 0), Some(4.0));

    engine.secondary = 1;
    run(&mut engine, Command::Become);
    assert_eq!(literal_at(&engine, 1), Some(3.0));

    engine.secondary = 2;
    run(&mut engine, Command::Become);
    assert_eq!(literal_at(&engine, 2), Some(-3.0));

    engine.secondary = 3;
    run(&mut engine, Command::Become);
    assert_eq!(engine.tape()[3].cell, Cell::Command(Command::Heaven));
    assert_eq!(engine.tape()[3].element, Element::Earth);
  }

  #[test]
  fn become_advances_a_variable() {
    let (mut engine, _) = placed(vec![var("moon"), lit(0.0)], 1, 0);
    engine.variables.assign(&DefaultAtom::from("moon"), 3.0, None);
    run(&mut engine, Command::Become);
    let moon = engine.variables().get(&DefaultAtom::from("moon")).unwrap();
    assert_eq!(moon.value(), Some(4.0));
    assert_eq!(moon.element, Element::Metal);
  }

  #[test]
  fn like_stores_the_nearest_value() {
    let (mut engine, _) = placed(vec![lit(5.0), stop(), var("moon"), cmd(Command::Like)], 3, 1);
    run(&mut engine, Command::Like);
    assert_eq!(value_of(&engine, "moon"), Some(5.0));
    assert_eq!(engine.secondary(), 0);

    let (mut engine, _) = placed(vec![stop(), var("moon"), cmd(Command::Like)], 2, 0);
    run(&mut engine, Command::Like);
    assert_eq!(value_of(&engine, "moon"), Some(0.0));

    // Nothing is stored when the rung before the bureaucrat is not a variable.
    let (mut engine, _) = placed(vec![lit(5.0), lit(1.0), cmd(Command::Like)], 2, 0);
    run(&mut engine, Command::Like);
    assert_eq!(literal_at(&engine, 1), Some(1.0));
  }

  #[test]
  fn negative_writes_back() {
    let (mut engine, _) = placed(vec![lit(4.0), var("moon"), cmd(Command::Negative)], 2, 0);
    run(&mut engine, Command::Negative);
    assert_eq!(literal_at(&engine, 0), Some(-4.0));

    engine.variables.assign(&DefaultAtom::from("moon"), 2.5, None);
    engine.secondary = 1;
    run(&mut engine, Command::Negative);
    assert_eq!(value_of(&engine, "moon"), Some(-2.5));
  }

  #[test]
  fn operate_by_relation() {
    let cases = vec![
      (Element::Water, 7.0),  // Metal creates Water: A + B
      (Element::Wood,  3.0),  // Metal destroys Wood: A - B
      (Element::Fire,  2.5),  // Metal fears Fire:    A / B
      (Element::Earth, 10.0), // Metal loves Earth:   A * B
    ];
    for (element_a, expected) in cases {
      let (mut engine, _) = placed(
        vec![elemental(2.0, Element::Metal), elemental(5.0, element_a), cmd(Command::Operate)], 2, 0
      );
      run(&mut engine, Command::Operate);
      assert_eq!(literal_at(&engine, 0), Some(expected), "A is {}", element_a);
      assert_eq!(literal_at(&engine, 1), Some(5.0));
    }
  }

  #[test]
  fn operate_on_one_element_tests_parity() {
    let (mut engine, _) = placed(vec![lit(3.0), lit(5.0), cmd(Command::Operate)], 2, 0);
    run(&mut engine, Command::Operate);
    assert_eq!(literal_at(&engine, 0), Some(1.0));

    let (mut engine, _) = placed(vec![lit(3.0), lit(4.0), cmd(Command::Operate)], 2, 0);
    run(&mut engine, Command::Operate);
    assert_eq!(literal_at(&engine, 0), Some(0.0));
  }

  #[test]
  fn operate_creating_carries_the_element() {
    let (mut engine, _) = placed(
      vec![var("moon"), elemental(5.0, Element::Metal), cmd(Command::Operate)], 2, 0
    );
    engine.variables.assign(&DefaultAtom::from("moon"), 2.0, None);
    run(&mut engine, Command::Operate);
    let moon = engine.variables().get(&DefaultAtom::from("moon")).unwrap();
    assert_eq!(moon.value(), Some(7.0));
    assert_eq!(moon.element, Element::Metal);
  }

  #[test]
  fn operate_needs_two_operands() {
    let (mut engine, _) = placed(vec![lit(1.0), lit(3.0)], 1, 1);
    assert_eq!(run(&mut engine, Command::Operate), Step::Continue);
    assert_eq!(literal_at(&engine, 1), Some(3.0));

    let (mut engine, _) = placed(vec![stop(), lit(3.0), lit(0.0)], 2, 0);
    run(&mut engine, Command::Operate);
    assert_eq!(literal_at(&engine, 1), Some(3.0));
  }

  #[test]
  fn inert_commands() {
    let (mut engine, _) = placed(vec![lit(1.0)], 0, 0);
    assert_eq!(run(&mut engine, Command::Tomorrow), Step::Continue);
    assert_eq!(run(&mut engine, Command::Few), Step::Continue);
    assert_eq!(run(&mut engine, Command::Heaven), Step::Halt);
    assert_eq!(literal_at(&engine, 0), Some(1.0));
  }
}
