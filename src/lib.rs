//! A tiny tape-machine Brainfuck engine.
//!
//! This crate runs programs over the instruction set `><+-.[]` on a fixed
//! memory tape (default 30,000 cells) with a single cursor.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; cells wrap modulo 256.
//! - Strict cursor bounds: moving left from cell 0 or right past the end
//!   returns an error.
//! - Output `.` prints the current cell as a character followed by a newline.
//! - Bracket jumps re-scan the program text every time. By default the scan
//!   stops at the nearest bracket and does not understand nesting;
//!   [`BracketMode::Nested`] opts into balanced matching.
//! - Any other character, `,` included, rejects the program.
//!
//! Quick start:
//!
//! ```no_run
//! use bf_tape::{dump, interpret};
//!
//! let machine = interpret("+++>++<[->+<]").expect("program should run");
//! assert_eq!(&machine.tape()[..2], &[0, 5]);
//! print!("{}", dump::render(&machine));
//! ```

use std::io::Write;

pub mod cli_util;
pub mod config;
pub mod dump;
pub mod interpreter;
pub mod logger;
pub mod machine;
pub mod scanner;

pub use interpreter::{
    BracketKind, BracketMode, EngineOptions, InterpretError, Interpreter, StepControl, UnmatchedPolicy,
};
pub use machine::{Machine, TapeError, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use scanner::Scanner;

/// Run `program` with default options, printing `.` output to stdout.
pub fn interpret(program: &str) -> Result<Machine, InterpretError> {
    Interpreter::new(program).run()
}

/// Run `program` with `options`, writing `.` output to `out`.
pub fn interpret_with<W: Write>(program: &str, options: EngineOptions, out: W) -> Result<Machine, InterpretError> {
    Interpreter::with_output(program, out).with_options(options).run()
}
