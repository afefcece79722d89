/*!
  An execution engine for Haifu, a programming language whose programs are haiku.

  A program is read into tokens, loaded onto a tape last word first, and run by two cursors: the
  bureaucrat, which executes rungs, and the delegate, which points at the operand a command reads.
  See `vm` for the machine and `commands` for what each command does.
*/

#[cfg_attr(feature = "trace_computation", macro_use)]
extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod position;
pub mod numeric;
pub mod element;
pub mod command;
pub mod token;
pub mod error;
pub mod lexicon;
pub mod tokenizer;
pub mod rung;
pub mod variable;
pub mod input;
pub mod trace;
pub mod vm;
mod commands;

pub use crate::command::Command;
pub use crate::element::{Element, Relation};
pub use crate::error::{HaifuError, Result};
pub use crate::input::InputStream;
pub use crate::lexicon::{Lexicon, WordLookup};
pub use crate::tokenizer::tokenize;
pub use crate::trace::TraceMode;
pub use crate::vm::{Engine, EngineConfig, RunOutcome, StopReason};
