use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser as CliParser;
use log::info;
use pcc::{
    compiler::{compiler::compile, instruction::render},
    display_error,
    errors::errors::Error,
    parse_source,
    session::Session,
    type_checker::{reachability::check_returns, type_checker::type_check},
};

/// Compiles a C subset to P-machine instructions
#[derive(CliParser, Debug)]
#[clap(name = "pcc", about = "C subset to P-machine compiler")]
struct Cli {
    /// Input C source file
    #[clap(value_parser)]
    input: PathBuf,

    /// Write the instructions to FILE instead of stdout
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable verbose diagnostic output
    #[clap(short, long)]
    verbose: bool,

    /// Print the resolved tree to stderr
    #[clap(long)]
    dump_ast: bool,
}

fn run(cli: &Cli, source: &str, file_name: &str) -> Result<String, Error> {
    let start = Instant::now();
    let mut session = Session::new();

    let mut ast = parse_source(source, file_name)?;
    info!("Parsed in {:?}", start.elapsed());

    let type_check_start = Instant::now();
    let mut symbols = type_check(&mut ast, &mut session)?;
    check_returns(&ast, &mut session);
    info!("Type checked in {:?}", type_check_start.elapsed());

    if cli.dump_ast {
        if let Some(root) = ast.root() {
            eprint!("{}", ast.dump(root));
        }
    }

    let compile_start = Instant::now();
    let instructions = compile(&mut ast, &mut symbols, &mut session)?;
    info!("Compiled in {:?}", compile_start.elapsed());

    for warning in session.take_warnings() {
        eprintln!("warning: {}", warning);
    }

    info!("Total time: {:?}", start.elapsed());
    Ok(render(&instructions))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let file_name = cli.input.to_string_lossy().to_string();
    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", file_name, error);
            return ExitCode::FAILURE;
        }
    };

    let program = match run(&cli, &source, &file_name) {
        Ok(program) => program,
        Err(error) => {
            display_error(&error, &source, &file_name);
            return ExitCode::FAILURE;
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(error) = fs::write(path, program) {
                eprintln!("Failed to write {}: {}", path.to_string_lossy(), error);
                return ExitCode::FAILURE;
            }
        }
        None => print!("{}", program),
    }

    ExitCode::SUCCESS
}
