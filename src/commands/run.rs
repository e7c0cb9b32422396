use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bf_tape::cli_util::print_interpret_error;
use bf_tape::config::{self, Overrides};
use bf_tape::{dump, InterpretError, Interpreter, Machine, StepControl};
use clap::Args;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of program output
    #[arg(short = 't', long = "trace")]
    pub trace: bool,

    /// Print the visited tape after the program halts
    #[arg(short = 'd', long = "dump")]
    pub dump: bool,

    /// Read program text from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Concatenated program parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Match brackets by nesting depth instead of nearest character
    #[arg(long = "nested")]
    pub nested: bool,

    /// Reject a bracket jump that finds no target
    #[arg(long = "strict")]
    pub strict: bool,

    /// Tape capacity in cells (fallback BF_TAPE_CAPACITY; default 30000)
    #[arg(long = "capacity", value_name = "N")]
    pub capacity: Option<usize>,

    /// Maximum interpreter steps before abort (fallback BF_TAPE_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BF_TAPE_TIMEOUT_MS; default 2000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Read settings from PATH instead of the default config file
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        trace,
        dump: dump_tape,
        file,
        code,
        nested,
        strict,
        capacity,
        max_steps,
        timeout_ms,
        config: config_path,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            // A trailing line break is an editor artifact, not part of the program
            Ok(s) => s.trim_end_matches(['\n', '\r']).to_string(),
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    // Resolve settings: flags -> env -> config file -> defaults
    let file_config = match config_path {
        Some(path) => match config::load_from_path(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{program}: failed to read config file {}: {e}", path.display());
                let _ = io::stderr().flush();
                return 1;
            }
        },
        None => config::load_default(),
    };
    let overrides = Overrides { capacity, nested, strict, max_steps, timeout_ms };
    let settings = config::resolve(&overrides, &file_config, |name| std::env::var(name).ok());
    log::info!("running with {:?}", settings);

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Result<Machine, InterpretError>>();
    let program_owned = code_str.clone();
    let cancel_clone = cancel.clone();
    let options = settings.options;
    let max_steps = settings.max_steps;

    // Ctrl+C requests cancellation; the worker stops at the next instruction
    let ctrlc_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_flag.store(true, Ordering::Relaxed)) {
        log::warn!("failed to set ctrl+c handler: {e}");
    }

    thread::spawn(move || {
        let mut bf = Interpreter::new(program_owned).with_options(options);
        let ctrl = StepControl::new(max_steps, cancel_clone);
        let res = if trace {
            bf.run_trace_with_control(ctrl)
        } else {
            bf.run_with_control(ctrl)
        };
        let _ = tx.send(res);
    });

    let timeout_ms = settings.timeout_ms;
    let timeout = Duration::from_millis(timeout_ms);
    match rx.recv_timeout(timeout) {
        Ok(Ok(machine)) => {
            if dump_tape {
                print!("{}", dump::render(&machine));
            }
            let _ = io::stdout().flush();
            0
        }
        Ok(Err(InterpretError::Canceled)) => {
            eprintln!("Execution aborted: cancelled");
            let _ = io::stderr().flush();
            1
        }
        Ok(Err(other)) => {
            print_interpret_error(Some(program), &code_str, &other);
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            eprintln!("{program}: execution stopped without a result");
            let _ = io::stderr().flush();
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>  Read the program from PATH instead of positional "<code>"
  --trace, -t         Print a step-by-step table of operations instead of output
  --dump,  -d         Print the visited tape after the program halts
  --nested            Match brackets by nesting depth (default: nearest bracket)
  --strict            Fail when a bracket jump finds no target (default: continue)
  --capacity <N>      Tape capacity in cells (default 30000)
  --max-steps <N>     Abort after N instructions (default unlimited)
  --timeout <MS>      Abort after MS milliseconds of wall-clock time (default 2000)
  --config <PATH>     Read settings from PATH instead of the XDG config file
  --help,  -h         Show this help

Notes:
- Each `.` prints the current cell as one character followed by a newline.
- Any character outside of ><+-.[] stops the program with an error.
- Without --nested, `[` and `]` jump to the nearest bracket and ignore nesting.

Examples:
- Move three into the next cell and show the tape:
    {0} run --dump "+++[->+<]"
- Load a program from a file:
    {0} run --file ./program.bf
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
