use clap::{Parser, Subcommand};
use lazybrew::{
    diagnostics::{emit_syntax_errors, report_io_error, report_runtime_error},
    init_tracing,
    language::parser::parse_program,
    runtime::{
        console::{Console, ScriptedConsole, StdConsole},
        error::ErrorKind,
        Interpreter,
    },
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lazybrew", version, about = "Lazy interpreter for Brewin programs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program, starting at `main()`
    Run {
        file: PathBuf,
        /// Input line for `inputi`/`inputs`; repeatable. Replaces stdin.
        #[arg(long = "input", value_name = "LINE")]
        inputs: Vec<String>,
        /// Log interpreter activity at trace level to stderr
        #[arg(long)]
        trace: bool,
    },
    /// Parse a program and report syntax errors
    Check { file: PathBuf },
    /// Print the parsed syntax tree
    Ast { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let trace = matches!(cli.command, Command::Run { trace: true, .. });
    init_tracing(trace);

    match cli.command {
        Command::Run { file, inputs, .. } => run(&file, inputs),
        Command::Check { file } => check(&file),
        Command::Ast { file } => ast(&file),
    }
}

fn read_source(path: &Path) -> Result<String, ExitCode> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("br") {
        eprintln!("Invalid file extension. Only .br files are allowed.");
        return Err(ExitCode::from(1));
    }
    fs::read_to_string(path).map_err(|err| {
        report_io_error(path, &err);
        ExitCode::from(1)
    })
}

fn run(path: &Path, inputs: Vec<String>) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let program = match parse_program(&source) {
        Ok(program) => program,
        Err(errors) => {
            emit_syntax_errors(path, &source, &errors);
            return ExitCode::from(2);
        }
    };

    let scripted = if !inputs.is_empty() {
        Some(ScriptedConsole::with_inputs(inputs))
    } else {
        std::env::var("LAZYBREW_INPUTS")
            .ok()
            .map(|text| ScriptedConsole::from_pipe_separated(&text))
    };
    let result = match scripted {
        Some(console) => execute(&program, console.echoing()),
        None => execute(&program, StdConsole),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_runtime_error(path, &source, &err);
            ExitCode::from(match err.kind() {
                ErrorKind::NameError => 3,
                ErrorKind::TypeError => 4,
                ErrorKind::FaultError => 5,
            })
        }
    }
}

fn execute<C: Console>(
    program: &lazybrew::language::ast::Program,
    console: C,
) -> lazybrew::runtime::error::RuntimeResult<()> {
    Interpreter::new(program, console).run()
}

fn check(path: &Path) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(code) => return code,
    };
    match parse_program(&source) {
        Ok(program) => {
            println!("{}: ok ({} functions)", path.display(), program.functions.len());
            ExitCode::SUCCESS
        }
        Err(errors) => {
            emit_syntax_errors(path, &source, &errors);
            ExitCode::from(2)
        }
    }
}

fn ast(path: &Path) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(code) => return code,
    };
    match parse_program(&source) {
        Ok(program) => {
            println!("{program:#?}");
            ExitCode::SUCCESS
        }
        Err(errors) => {
            emit_syntax_errors(path, &source, &errors);
            ExitCode::from(2)
        }
    }
}
