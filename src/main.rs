use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

mod commands {
    pub mod demo;
    pub mod run;
}

use commands::demo::DemoArgs;
use commands::run::RunArgs;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [OPTIONS] "<code>"       # Run a program (args are concatenated)
  {0} run  [OPTIONS] --file <PATH>  # Run a program loaded from file
  {0} demo [--dump]                 # Run the built-in demo program

Global options:
  -v, -vv, -vvv   Log more (info, debug, trace) to stderr; or set BF_TAPE_LOG

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf-tape", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Increase log verbosity
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Demo(DemoArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf-tape"));

    let cli = Cli::parse();
    bf_tape::logger::init(cli.verbose);

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => commands::run::run(&program, args),
        Command::Demo(args) => commands::demo::run(&program, args),
    };

    std::process::exit(code);
}
