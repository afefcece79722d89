//! The `haifu` command line: run a program, list its tokens, or look words up in the dictionary.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use haifu::{
  tokenize, Engine, EngineConfig, InputStream, Lexicon, StopReason, TraceMode, WordLookup
};

/// Read when `--dictionary` is not given, if it exists.
const DEFAULT_DICTIONARY: &str = "haifu_words.txt";

#[derive(Parser, Debug)]
#[command(name = "haifu")]
#[command(about = "Run programs written in Haifu, a programming language of haiku")]
struct Args {
  /// Word data: base words and elements
  #[arg(long, env = "HAIFU_DICTIONARY", global = true)]
  dictionary: Option<PathBuf>,

  #[command(subcommand)]
  action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
  /// Execute a program. Input comes from the remaining arguments, or from standard input.
  Run {
    program: PathBuf,

    /// Input for `listen`, joined with spaces
    #[arg(allow_hyphen_values = true)]
    args: Vec<String>,

    /// Execution trace: off, top (top-level rungs), or all (rungs of blocks too)
    #[arg(long, default_value = "off")]
    trace: TraceMode,

    #[arg(long, env = "HAIFU_TRACE_FILE", default_value = "haifu_execution_log.txt")]
    trace_file: PathBuf,

    /// Seed for the values of "a few" and "many"
    #[arg(long)]
    seed: Option<u64>,
  },

  /// Print the tokens of a program.
  Tokens {
    program: PathBuf,
  },

  /// Print what the dictionary knows about words.
  Lookup {
    #[arg(required = true)]
    words: Vec<String>,
  },
}

fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn load_dictionary(path: Option<&Path>) -> Result<Lexicon> {
  let path = match path {
    Some(path) => path,
    None       => {
      let default = Path::new(DEFAULT_DICTIONARY);
      if !default.exists() {
        info!("no dictionary found, every word is its own base word");
        return Ok(Lexicon::new());
      }
      default
    }
  };

  let lexicon = Lexicon::load(path)
    .with_context(|| format!("reading dictionary {}", path.display()))?;
  info!("read {} words from {}", lexicon.len(), path.display());
  Ok(lexicon)
}

fn read_program(path: &Path, words: &Lexicon) -> Result<Vec<haifu::token::Token>> {
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("reading program {}", path.display()))?;
  let tokens = tokenize(&text, words)
    .with_context(|| format!("reading program {}", path.display()))?;
  Ok(tokens)
}

fn run(
  words      : &Lexicon,
  program    : &Path,
  args       : &[String],
  trace      : TraceMode,
  trace_file : &Path,
  seed       : Option<u64>
) -> Result<()> {
  let tokens = read_program(program, words)?;

  let mut engine = Engine::new(EngineConfig{ trace, seed });
  engine.load(&tokens, words);

  if trace.is_enabled() {
    let file = File::create(trace_file)
      .with_context(|| format!("creating trace file {}", trace_file.display()))?;
    engine.set_trace_sink(Box::new(BufWriter::new(file)));
  }

  let mut input = match args.is_empty() {
    true  => InputStream::from_reader(Box::new(BufReader::new(std::io::stdin()))),
    false => InputStream::from_text(&args.join(" "))
  };

  let outcome = engine.run(&mut input)?;
  if outcome.reason == StopReason::Fatal {
    warn!("the program stopped early after {} steps", outcome.steps);
  }
  Ok(())
}

fn main() -> Result<()> {
  init_logging();
  let args = Args::parse();

  let words = load_dictionary(args.dictionary.as_deref())?;

  match args.action {

    Action::Run{ program, args, trace, trace_file, seed } => {
      run(&words, &program, &args, trace, &trace_file, seed)?;
    }

    Action::Tokens{ program } => {
      for token in read_program(&program, &words)? {
        println!("{}", token);
      }
    }

    Action::Lookup{ words: queries } => {
      for query in queries {
        let word = query.to_lowercase();
        match words.entry(&word) {
          Some(entry) => println!("{} {}", word, entry),
          None        => println!("{} (unknown) {} {}", word, words.canonical(&word), words.element(&word)),
        }
      }
    }

  }

  Ok(())
}
