//! The interpreter loop.
//!
//! An [`Interpreter`] drives a [`Scanner`] across the program text and
//! dispatches each character to a [`Machine`] operation or to a bracket jump.
//! Every run starts from a fresh, zeroed machine and hands it back on halt.
//!
//! Features and behaviors:
//! - Instructions are `><+-.[]`; any other character rejects the program.
//! - `.` writes the current cell as one character plus a newline to the sink.
//! - `[` with a zero cell jumps onto the next `]`, and `]` with a non-zero cell
//!   jumps back onto the previous `[`. In [`BracketMode::Naive`] (the default)
//!   these jumps find the textually nearest bracket and ignore nesting.
//! - The cursor is bounds-checked; leaving the tape is an error.

use std::fmt;
use std::io::{self, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::machine::{Machine, TapeError, DEFAULT_CAPACITY};
use crate::scanner::Scanner;

/// Errors that end an interpretation run.
#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    /// Encountered a character outside the instruction set `><+-.[]`.
    #[error("Invalid instruction '{ch}' at instruction {ip}")]
    InvalidInstruction { ch: char, ip: usize },

    /// The cursor would have left the tape.
    #[error("Cursor out of range at instruction {ip} (cursor={cursor}, op='{op}')")]
    OutOfRange {
        ip: usize,
        cursor: usize,
        op: char,
        #[source]
        source: TapeError,
    },

    /// A bracket jump found no target and unmatched brackets are rejected.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    MalformedProgram { ip: usize, kind: BracketKind },

    /// The configured tape could not be built.
    #[error("Unusable tape capacity: {source}")]
    Capacity {
        #[source]
        source: TapeError,
    },

    /// Writing to the output sink failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted through the cancel flag.
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Which side of a loop failed to find its partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// How bracket jumps find their target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BracketMode {
    /// Jump to the nearest bracket character in scan direction.
    #[default]
    Naive,
    /// Jump to the depth-balanced partner bracket.
    Nested,
}

/// What happens when a bracket jump finds no target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    /// Leave the scanner where it is and keep executing.
    #[default]
    Continue,
    /// Stop with [`InterpretError::MalformedProgram`].
    Reject,
}

/// Per-run engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub capacity: usize,
    pub brackets: BracketMode,
    pub unmatched: UnmatchedPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            brackets: BracketMode::default(),
            unmatched: UnmatchedPolicy::default(),
        }
    }
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Runs one program text against fresh machines.
pub struct Interpreter<W: Write = io::Stdout> {
    code: String,
    options: EngineOptions,
    out: W,
}

impl Interpreter<io::Stdout> {
    /// Create an interpreter that writes `.` output to stdout.
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_output(code, io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    /// Create an interpreter that writes `.` output (or the trace table) to `out`.
    pub fn with_output(code: impl Into<String>, out: W) -> Self {
        Self {
            code: code.into(),
            options: EngineOptions::default(),
            out,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute the program until the scanner is exhausted.
    ///
    /// Returns the final machine on success.
    pub fn run(&mut self) -> Result<Machine, InterpretError> {
        self.execute(false, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, control: StepControl) -> Result<Machine, InterpretError> {
        self.execute(false, Some(&control))
    }

    /// Execute while writing a step-by-step table to the sink instead of
    /// emitting `.` output. Machine state advances exactly as in [`run`](Self::run).
    pub fn run_trace(&mut self) -> Result<Machine, InterpretError> {
        self.execute(true, None)
    }

    /// Trace-run with cooperative cancellation and optional step limit.
    pub fn run_trace_with_control(&mut self, control: StepControl) -> Result<Machine, InterpretError> {
        self.execute(true, Some(&control))
    }

    fn execute(&mut self, trace: bool, control: Option<&StepControl>) -> Result<Machine, InterpretError> {
        let mut machine = Machine::try_new(self.options.capacity)
            .map_err(|source| InterpretError::Capacity { source })?;
        let mut scanner = Scanner::new(&self.code);
        log::debug!(
            "starting run: {} chars, capacity {}, {:?} brackets, {:?} on unmatched",
            scanner.len(),
            machine.capacity(),
            self.options.brackets,
            self.options.unmatched,
        );

        if trace {
            writeln!(self.out, "STEP | IP  | CUR | CELL | INSTR | ACTION")
                .and_then(|_| writeln!(self.out, "-----+-----+-----+------+-------+------------------------------------------------"))
                .map_err(|source| InterpretError::Io { ip: 0, source })?;
        }

        let mut step: usize = 0;
        while let Some(instr) = scanner.advance() {
            let Some(ip) = scanner.position() else { break };

            if let Some(ctrl) = control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(InterpretError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if step >= max {
                        return Err(InterpretError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let (cursor_before, cell_before) = (machine.cursor(), machine.peek());
            let mut action: Option<String> = trace.then(String::new);
            let out_of_range = |source: TapeError| InterpretError::OutOfRange { ip, cursor: cursor_before, op: instr, source };

            match instr {
                '>' => {
                    machine.move_right().map_err(out_of_range)?;
                    if let Some(a) = action.as_mut() { *a = format!("Moved cursor to cell {}", machine.cursor()); }
                }
                '<' => {
                    machine.move_left().map_err(out_of_range)?;
                    if let Some(a) = action.as_mut() { *a = format!("Moved cursor to cell {}", machine.cursor()); }
                }
                '+' => {
                    machine.increment();
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{}] from {} to {}", cursor_before, cell_before, machine.peek()); }
                }
                '-' => {
                    machine.decrement();
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{}] from {} to {}", cursor_before, cell_before, machine.peek()); }
                }
                '.' => {
                    if let Some(a) = action.as_mut() {
                        *a = format!("Output cell value {} (suppressed in trace)", cell_before);
                    } else {
                        machine.output(&mut self.out).map_err(|source| InterpretError::Io { ip, source })?;
                    }
                }
                '[' => {
                    if machine.peek() == 0 {
                        let found = match self.options.brackets {
                            BracketMode::Naive => scanner.seek_forward(']'),
                            BracketMode::Nested => scanner.seek_matching_forward(),
                        };
                        self.after_jump(found, ip, BracketKind::Open)?;
                        if let Some(a) = action.as_mut() {
                            *a = jump_action(found, "forward", "']'", scanner.position());
                        }
                    } else if let Some(a) = action.as_mut() {
                        *a = "Enter loop (cell != 0)".to_string();
                    }
                }
                ']' => {
                    if machine.peek() != 0 {
                        let found = match self.options.brackets {
                            BracketMode::Naive => scanner.seek_back('['),
                            BracketMode::Nested => scanner.seek_matching_back(),
                        };
                        self.after_jump(found, ip, BracketKind::Close)?;
                        if let Some(a) = action.as_mut() {
                            *a = jump_action(found, "back", "'['", scanner.position());
                        }
                    } else if let Some(a) = action.as_mut() {
                        *a = "Exit loop (cell is 0)".to_string();
                    }
                }
                _ => {
                    log::debug!("rejecting {instr:?} at instruction {ip}");
                    return Err(InterpretError::InvalidInstruction { ch: instr, ip });
                }
            }

            if let Some(action) = action {
                writeln!(
                    self.out,
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    step, ip, cursor_before, cell_before, instr, action
                )
                .map_err(|source| InterpretError::Io { ip, source })?;
            }

            step += 1;
        }

        let last_ip = scanner.position().unwrap_or(0);
        self.out.flush().map_err(|source| InterpretError::Io { ip: last_ip, source })?;
        log::debug!(
            "halted after {step} steps (cursor={}, high_water={})",
            machine.cursor(),
            machine.high_water()
        );
        Ok(machine)
    }

    fn after_jump(&self, found: bool, ip: usize, kind: BracketKind) -> Result<(), InterpretError> {
        if found {
            log::trace!("bracket {kind} at {ip} jumped");
            return Ok(());
        }
        match self.options.unmatched {
            UnmatchedPolicy::Reject => Err(InterpretError::MalformedProgram { ip, kind }),
            UnmatchedPolicy::Continue => {
                log::warn!("bracket {kind} at instruction {ip} has no jump target; continuing");
                Ok(())
            }
        }
    }
}

fn jump_action(found: bool, direction: &str, target: &str, landed: Option<usize>) -> String {
    match (found, landed) {
        (true, Some(at)) => format!("Jump {direction} to {target} at IP {at}"),
        _ => format!("No {target} found {direction}; continue"),
    }
}
