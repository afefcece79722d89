/*!
  The execution trace: a dump of the tape and the variables before every executed rung, written
  to a text sink as the program runs. The trace never changes what a program does.

  Tracing has three modes, toggled in a cycle: off, top-level rungs only, and every rung
  including the rungs of captured blocks. The tables themselves are only compiled in with the
  `trace_computation` feature; without it a `TraceLog` accepts and discards everything.
*/

use std::io::Write;

use strum_macros::{Display as StrumDisplay, EnumString};
use string_cache::DefaultAtom;
use tracing::warn;

#[cfg(feature = "trace_computation")]
use prettytable::{format as TableFormat, Table};

use crate::rung::Rung;
use crate::variable::Variables;
#[cfg(feature = "trace_computation")]
use crate::{numeric::format_general, rung::Cell, variable::Binding};

#[cfg(feature = "trace_computation")]
const RULE: &str = "------------------------------------------------------------";

#[derive(StrumDisplay, EnumString, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum TraceMode {
  #[strum(serialize = "off")]
  Off,
  #[strum(serialize = "top")]
  TopLevel,
  #[strum(serialize = "all")]
  Everything,
}

impl Default for TraceMode {
  fn default() -> Self {
    TraceMode::Off
  }
}

impl TraceMode {

  /// The next mode in the toggle cycle `Off -> TopLevel -> Everything -> Off`.
  pub fn cycle(self) -> TraceMode {
    match self {
      TraceMode::Off        => TraceMode::TopLevel,
      TraceMode::TopLevel   => TraceMode::Everything,
      TraceMode::Everything => TraceMode::Off,
    }
  }

  pub fn is_enabled(self) -> bool {
    self != TraceMode::Off
  }

  /// Whether a rung is traced, given whether it runs inside a captured block.
  pub fn records(self, in_block: bool) -> bool {
    match self {
      TraceMode::Off        => false,
      TraceMode::TopLevel   => !in_block,
      TraceMode::Everything => true,
    }
  }

}

/// The rung of a captured block being executed: the variable holding it and the rung's index.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
  pub variable : &'a DefaultAtom,
  pub index    : usize,
}

/// A snapshot of machine state to render.
pub struct Snapshot<'a> {
  pub tape      : &'a [Rung],
  pub primary   : usize,
  pub secondary : usize,
  pub variables : &'a Variables,
}

pub struct TraceLog {
  mode : TraceMode,
  sink : Option<Box<dyn Write>>,
}

impl TraceLog {

  pub fn new(mode: TraceMode, sink: Box<dyn Write>) -> TraceLog {
    TraceLog{
      mode,
      sink: Some(sink)
    }
  }

  pub fn disabled() -> TraceLog {
    TraceLog{
      mode : TraceMode::Off,
      sink : None
    }
  }

  pub fn is_active(&self) -> bool {
    self.sink.is_some() && self.mode.is_enabled()
  }

  pub fn wants(&self, frame: Option<Frame>) -> bool {
    self.sink.is_some() && self.mode.records(frame.is_some())
  }

  /// Writes to the sink. A sink that fails once is dropped for the rest of the run.
  fn write(&mut self, text: &str) {
    if let Some(sink) = self.sink.as_mut() {
      if let Err(error) = sink.write_all(text.as_bytes()) {
        warn!("execution trace disabled after a write failure: {}", error);
        self.sink = None;
      }
    }
  }

  /// Records what `Speak` or `Count` printed.
  pub fn output(&mut self, text: &str) {
    if self.is_active() {
      self.write(&format!("\nOutput: \"{}\"\n", text));
    }
  }

  pub fn finish(&mut self) {
    if let Some(sink) = self.sink.as_mut() {
      if let Err(error) = sink.flush() {
        warn!("could not flush the execution trace: {}", error);
      }
    }
    self.sink = None;
  }

  // region Rendering

  #[cfg(feature = "trace_computation")]
  pub fn execution(&mut self, step: usize, frame: Option<Frame>, state: &Snapshot) {
    if !self.wants(frame) {
      return;
    }
    let label = match frame {
      Some(Frame{ variable, .. }) => format!("{}, Execution of \"{}\"", step, variable),
      None                        => format!("{}", step)
    };
    let text = format!(
      "\n{rule}\nExecution {label}:\n{rule}\n{tape}\n{rule}\nVariables at execution {label}:\n{rule}\n{variables}",
      rule      = RULE,
      label     = label,
      tape      = make_tape_table(state),
      variables = make_variable_table(state.variables, frame)
    );
    self.write(&text);
  }

  #[cfg(not(feature = "trace_computation"))]
  pub fn execution(&mut self, _step: usize, _frame: Option<Frame>, _state: &Snapshot) {}

  /// The final dump written when a run ends.
  #[cfg(feature = "trace_computation")]
  pub fn termination(&mut self, state: &Snapshot) {
    if !self.is_active() {
      return;
    }
    let text = format!(
      "\n{rule}\nTermination:\n{rule}\n{tape}\n{rule}\nVariables at termination:\n{rule}\n{variables}\n",
      rule      = RULE,
      tape      = make_tape_table(state),
      variables = make_variable_table(state.variables, None)
    );
    self.write(&text);
  }

  #[cfg(not(feature = "trace_computation"))]
  pub fn termination(&mut self, _state: &Snapshot) {}

  // endregion

}

#[cfg(feature = "trace_computation")]
lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

#[cfg(feature = "trace_computation")]
fn describe_cell(rung: &Rung, variables: &Variables) -> String {
  match &rung.cell {
    Cell::Command(command) => command.to_string(),
    Cell::Invalid(code)    => format!("INVALID({})", code),
    Cell::Variable(name)   => {
      match variables.get(name) {
        None           => format!("{}: unset", name),
        Some(variable) => {
          match &variable.binding {
            Binding::Value(value) => format!("{}: {}", name, format_general(*value)),
            Binding::Block(rungs) => format!("{}: block of {}", name, rungs.len())
          }
        }
      }
    }
    Cell::Literal(value)   => format_general(*value),
    Cell::Punctuation      => String::new(),
  }
}

/// The tape in source order, last index first, with the cursors marked.
#[cfg(feature = "trace_computation")]
fn make_tape_table(state: &Snapshot) -> Table {
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Cursors", ubr->"Index", ubl->"Position", ubl->"Text", ubl->"Kind", ubl->"Contents", ubl->"Element"]);

  for (i, rung) in state.tape.iter().enumerate().rev() {
    let marker = match (i == state.secondary, i == state.primary) {
      (true, true)   => "D> B>",
      (true, false)  => "D>   ",
      (false, true)  => "   B>",
      (false, false) => ""
    };
    table.add_row(row![
      r->marker,
      r->i,
      rung.position,
      format!("\"{}\"", rung.name),
      rung.cell.kind_name(),
      describe_cell(rung, state.variables),
      rung.element
    ]);
  }

  if state.primary >= state.tape.len() {
    table.add_row(row![r->"   B>", r->state.tape.len(), "", "", "END", "", ""]);
  }

  table
}

/// The variables in name order. Blocks list their rungs, marking the rung being executed.
#[cfg(feature = "trace_computation")]
fn make_variable_table(variables: &Variables, frame: Option<Frame>) -> Table {
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Name", ubl->"Binding", ubl->"Element"]);

  for (name, variable) in variables.sorted() {
    match &variable.binding {

      Binding::Value(value) => {
        table.add_row(row![r->name, format!("VALUE {}", format_general(*value)), variable.element]);
      }

      Binding::Block(rungs) => {
        table.add_row(row![r->name, format!("BLOCK of {}", rungs.len()), variable.element]);
        let executing = match frame {
          Some(frame) if frame.variable == name => Some(frame.index),
          _                                     => None
        };
        for (i, rung) in rungs.iter().enumerate().rev() {
          match executing == Some(i) {
            true  => table.add_row(row![r->format!("* --> {}", i), rung, ""]),
            false => table.add_row(row![r->format!("{}", i), rung, ""]),
          };
        }
      }

    }
  }

  table
}
