//! The Haifu machine: a tape of rungs, read last word first, with two cursors walking it.
//!
//! The *bureaucrat* (primary cursor) is the instruction pointer. The *delegate* (secondary
//! cursor) trails it and points at the operand most commands read. At every point between
//! rungs `0 <= delegate <= bureaucrat <= tape.len()`, and the two structural operations,
//! `insert` and `remove`, are the only ways the tape changes length.

use std::io::Write;

use rand::{rngs::StdRng, Rng, SeedableRng};
use string_cache::DefaultAtom;
use tracing::{debug, error, info, trace, warn};

use crate::element::Element;
use crate::error::{HaifuError, Result};
use crate::input::InputStream;
use crate::lexicon::WordLookup;
use crate::rung::{Cell, Rung};
use crate::token::Token;
use crate::trace::{Frame, Snapshot, TraceLog, TraceMode};
use crate::variable::{Variable, Variables};

/// Whether execution continues after a rung.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Step {
  Continue,
  Halt
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum StopReason {
  /// A `Heaven` rung was executed.
  Halted,
  /// The bureaucrat walked off the end of the tape.
  RanOffEnd,
  /// The run could not go on: a block never ended, or a cursor was pushed past the tape.
  Fatal,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct RunOutcome {
  /// Rungs executed, counting the rungs of captured blocks.
  pub steps  : usize,
  pub reason : StopReason,
}

#[derive(Clone, Copy, Default, Debug)]
pub struct EngineConfig {
  pub trace : TraceMode,
  /// Seeds the generator behind `Few` and `Many`. Unseeded runs draw from entropy.
  pub seed  : Option<u64>,
}

pub struct Engine {
  // Program //
  program : Option<Vec<Rung>>, // The tape as loaded, restored at the start of every run
  pub(crate) tape : Vec<Rung>,

  // Cursors //
  pub(crate) primary   : usize, // The bureaucrat
  pub(crate) secondary : usize, // The delegate
  pub(crate) moved     : bool,  // Set when a rung moved the bureaucrat itself

  pub(crate) variables : Variables,

  // Counters //
  steps                    : usize,
  pub(crate) input_events  : usize,

  // Flags //
  fatal : bool,

  pub(crate) rng    : StdRng,
  config            : EngineConfig,
  pub(crate) output : Box<dyn Write>,
  trace_sink        : Option<Box<dyn Write>>,
  pub(crate) trace  : TraceLog,
}

impl Engine {

  // region Construction and loading

  /// A machine writing program output to standard output.
  pub fn new(config: EngineConfig) -> Engine {
    Engine::with_output(config, Box::new(std::io::stdout()))
  }

  pub fn with_output(config: EngineConfig, output: Box<dyn Write>) -> Engine {
    let rng = match config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None       => StdRng::from_entropy()
    };
    Engine {
      program      :  None,
      tape         :  vec![],
      primary      :  0,
      secondary    :  0,
      moved        :  false,
      variables    :  Variables::new(),
      steps        :  0,
      input_events :  0,
      fatal        :  false,
      rng,
      config,
      output,
      trace_sink   :  None,
      trace        :  TraceLog::disabled(),
    }
  }

  /// Advances the trace mode one step around its cycle and returns the new mode.
  pub fn toggle_trace(&mut self) -> TraceMode {
    self.config.trace = self.config.trace.cycle();
    self.config.trace
  }

  /// Where the next run writes its execution trace, if tracing is on.
  pub fn set_trace_sink(&mut self, sink: Box<dyn Write>) {
    self.trace_sink = Some(sink);
  }

  /// Loads a token stream: one rung per token, in source order, then reversed.
  pub fn load(&mut self, tokens: &[Token], words: &dyn WordLookup) {
    let rungs = tokens.iter().map(|token| Rung::from_token(token, words)).collect();
    self.load_rungs(rungs);
  }

  /// Loads rungs given in source order.
  pub fn load_rungs(&mut self, mut rungs: Vec<Rung>) {
    rungs.reverse();
    debug!("loaded a program of {} rungs", rungs.len());
    self.tape = rungs.clone();
    self.program = Some(rungs);
    self.variables.clear();
  }

  pub fn tape(&self) -> &[Rung] {
    &self.tape
  }

  pub fn primary(&self) -> usize {
    self.primary
  }

  pub fn secondary(&self) -> usize {
    self.secondary
  }

  pub fn variables(&self) -> &Variables {
    &self.variables
  }

  // endregion

  // region Tape maintenance

  /// Inserts a rung before `index`, keeping both cursors on the rungs they pointed at.
  /// Returns `false` and does nothing if `index > tape.len()`.
  pub fn insert(&mut self, rung: Rung, index: usize) -> bool {
    if index > self.tape.len() {
      return false;
    }
    if index <= self.primary {
      self.primary += 1;
    }
    if index <= self.secondary {
      self.secondary += 1;
    }
    self.tape.insert(index, rung);
    true
  }

  /// Removes the rung at `index`, keeping both cursors on the rungs they pointed at.
  pub fn remove(&mut self, index: usize) -> Option<Rung> {
    if index >= self.tape.len() {
      return None;
    }
    if index < self.primary {
      self.primary -= 1;
    }
    if index < self.secondary {
      self.secondary -= 1;
    }
    Some(self.tape.remove(index))
  }

  // endregion

  // region Running

  /**
    Runs the loaded program from the beginning. The tape is restored to the program as loaded and
    the cursors, variables, and counters are reset, so no state survives from an earlier run.
  */
  pub fn run(&mut self, input: &mut InputStream) -> Result<RunOutcome> {
    self.reset()?;

    info!("Starting execution...");

    let reason = loop {
      if let Some(reason) = self.step(input) {
        break reason;
      }
    };

    if let Err(error) = self.output.flush() {
      warn!("could not flush program output: {}", error);
    }
    let snapshot = Snapshot{
      tape      : &self.tape,
      primary   : self.primary,
      secondary : self.secondary,
      variables : &self.variables
    };
    self.trace.termination(&snapshot);
    self.trace.finish();

    info!("Done.");
    debug!("run ended after {} steps: {:?}", self.steps, reason);

    Ok(RunOutcome{ steps: self.steps, reason })
  }

  /// Restores the loaded program and clears all run state.
  fn reset(&mut self) -> Result<()> {
    let program = match &self.program {
      Some(program) => program.clone(),
      None          => return Err(HaifuError::NoProgram)
    };

    self.tape         = program;
    self.primary      = 0;
    self.secondary    = 0;
    self.steps        = 0;
    self.input_events = 0;
    self.fatal        = false;
    self.variables.clear();
    self.trace = match self.trace_sink.take() {
      Some(sink) if self.config.trace.is_enabled() => TraceLog::new(self.config.trace, sink),
      _                                            => TraceLog::disabled()
    };

    Ok(())
  }

  /// Executes the rung under the bureaucrat and advances past it unless the rung moved it.
  /// Returns why the run stopped, if it did.
  fn step(&mut self, input: &mut InputStream) -> Option<StopReason> {
    if self.primary >= self.tape.len() {
      return Some(StopReason::RanOffEnd);
    }

    self.moved = false;
    let rung = self.tape[self.primary].clone();
    if self.execute(&rung, input, None) == Step::Halt {
      return match self.fatal {
        true  => Some(StopReason::Fatal),
        false => Some(StopReason::Halted)
      };
    }

    if !self.moved {
      self.primary += 1;
    }
    None
  }

  /// Executes one rung. `frame` is set when the rung belongs to a captured block.
  pub(crate) fn execute(&mut self, rung: &Rung, input: &mut InputStream, frame: Option<Frame>) -> Step {
    if self.trace.wants(frame) {
      let snapshot = Snapshot{
        tape      : &self.tape,
        primary   : self.primary,
        secondary : self.secondary,
        variables : &self.variables
      };
      self.trace.execution(self.steps, frame, &snapshot);
    }
    self.steps += 1;

    trace!(
      step = self.steps,
      primary = self.primary,
      secondary = self.secondary,
      "executing {}", rung
    );

    match &rung.cell {

      Cell::Literal(_) => Step::Continue,

      Cell::Command(command) => self.dispatch(*command, input),

      Cell::Invalid(code) => {
        warn!("command \"{}\" (code {}) cannot be executed", rung.name, code);
        Step::Continue
      }

      Cell::Punctuation => self.capture_block(),

      Cell::Variable(name) => self.call(name, input),

    }
  }

  /// Executes the block bound to a variable, if any, on the machine's own cursors.
  fn call(&mut self, name: &DefaultAtom, input: &mut InputStream) -> Step {
    // The block can rebind its own variable while it runs, so it executes from a copy.
    let block: Vec<Rung> = match self.variables.get(name).and_then(Variable::block) {
      Some(rungs) => rungs.to_vec(),
      None        => return Step::Continue
    };

    for (index, rung) in block.iter().enumerate() {
      let frame = Frame{ variable: name, index };
      if self.execute(rung, input, Some(frame)) == Step::Halt {
        return Step::Halt;
      }
    }
    Step::Continue
  }

  /**
    Captures a block. The rung after the punctuation names the block, and every rung from the
    one after that up to, but not including, the next punctuation or the next rung matching the
    name is copied into the block. The bureaucrat is left on the terminating rung.
  */
  fn capture_block(&mut self) -> Step {
    let name_index = self.primary + 1;
    let name_rung = match self.tape.get(name_index) {
      Some(rung) => rung.clone(),
      None       => {
        warn!("punctuation at the end of the program");
        return Step::Continue;
      }
    };

    let mut block: Vec<Rung> = Vec::new();
    let mut index = name_index + 1;
    while index < self.tape.len() {
      let rung = &self.tape[index];
      if rung.is_punctuation() || name_rung.matches(rung) {
        self.primary = index;
        match name_rung.variable_name() {
          Some(name) => {
            self.variables.bind_block(name, block, name_rung.element);
          }
          None => {
            warn!("a block cannot be stored in \"{}\", which is not a variable", name_rung.name);
          }
        }
        return Step::Continue;
      }
      block.push(rung.clone());
      index += 1;
    }

    self.primary = self.tape.len();
    self.secondary = self.secondary.min(self.primary);
    self.fail("the end of the program was reached before a block ended")
  }

  /// Ends the run as a failure.
  pub(crate) fn fail(&mut self, message: &str) -> Step {
    error!("{}", message);
    self.fatal = true;
    Step::Halt
  }

  // endregion

  // region Operands

  /// The numeric value of a cell, if it has one. `Few` and `Many` draw a new value every read.
  pub(crate) fn numeric(&mut self, cell: &Cell) -> Option<f64> {
    match cell {
      Cell::Literal(value)         => Some(*value),
      Cell::Variable(name)         => self.variables.get(name).and_then(Variable::value),
      Cell::Command(command)       => {
        let range = command.value_range()?;
        Some(self.rng.gen_range(range) as f64)
      }
      _                            => None
    }
  }

  pub(crate) fn numeric_at(&mut self, index: usize) -> Option<f64> {
    let cell = self.tape.get(index)?.cell.clone();
    self.numeric(&cell)
  }

  /// A rung's element. A variable rung reports its variable's element once the variable exists.
  pub(crate) fn element_at(&self, index: usize) -> Element {
    match self.tape.get(index) {
      Some(rung) => {
        match rung.variable_name().and_then(|name| self.variables.get(name)) {
          Some(variable) => variable.element,
          None           => rung.element
        }
      }
      None => Element::None
    }
  }

  /**
    Writes a value into the rung at `index`. A variable rung stores the value in its variable, a
    literal rung is overwritten in place, and any other rung is left alone. `source` is the
    element the value came from, when the write should carry it over to a variable.
  */
  pub(crate) fn assign(&mut self, index: usize, value: f64, source: Option<Element>) {
    let rung = match self.tape.get_mut(index) {
      Some(rung) => rung,
      None       => return
    };
    match &mut rung.cell {
      Cell::Variable(name)   => self.variables.assign(name, value, source),
      Cell::Literal(literal) => *literal = value,
      _                      => {}
    }
  }

  /// Writes program output, recording it in the trace.
  pub(crate) fn emit(&mut self, text: &str) {
    if let Err(error) = self.output.write_all(text.as_bytes()) {
      warn!("could not write program output: {}", error);
    }
    self.trace.output(text);
  }

  // endregion

}
