use std::io::{self, Write};

use bf_tape::cli_util::print_interpret_error;
use bf_tape::{dump, Interpreter};
use clap::Args;

/// Moves 3 from cell 0 into cell 1, which already holds 2.
pub const DEMO_PROGRAM: &str = "+++>++<[->+<]";

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct DemoArgs {
    /// Print the visited tape after the program halts
    #[arg(short = 'd', long = "dump")]
    pub dump: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: DemoArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let mut bf = Interpreter::new(DEMO_PROGRAM);
    match bf.run() {
        Ok(machine) => {
            println!("program  = {DEMO_PROGRAM}");
            if args.dump {
                print!("{}", dump::render(&machine));
            }
            let _ = io::stdout().flush();
            0
        }
        Err(err) => {
            print_interpret_error(Some(program), DEMO_PROGRAM, &err);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} demo [--dump|-d]   # Run the built-in transfer program

Options:
  --dump,   -d        Print the visited tape after the program halts
  --help,   -h        Show this help

Description:
  Runs "{1}" on a fresh tape; with --dump, prints the cells it visited.
"#,
        program, DEMO_PROGRAM
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
