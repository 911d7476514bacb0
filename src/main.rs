use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Result};
use dags::interpreter::context::StdioContext;
use dags::{Engine, Options};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::{fs::read_to_string, process::ExitCode};

#[derive(Debug, Parser)]
#[clap(name = "dags", version)]
pub struct CLArgs {
    /// Log more; repeat for more detail.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub routine: DagsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DagsCommand {
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Check a script, and every script in the store, without running them.
    Validate {
        path: PathBuf,
        #[clap(long = "set", value_parser = parse_entry)]
        entries: Vec<(String, String)>,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: ErrorFormat,
    },
    Pretty {
        path: PathBuf,
    },
    Run {
        path: PathBuf,
        #[clap(long = "set", value_parser = parse_entry)]
        entries: Vec<(String, String)>,
        /// Queued on the in channel, in order.
        #[clap(long = "input")]
        inputs: Vec<String>,
        #[clap(long)]
        seed: Option<u64>,
        #[clap(long = "max-depth")]
        max_depth: Option<usize>,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: ErrorFormat,
    },
    /// List every keyword.
    Help,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
}

fn parse_entry(text: &str) -> Result<(String, String), String> {
    text.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, found {text:?}"))
}

fn main() -> ExitCode {
    dags_main().expect("Encountered an error!")
}

fn dags_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    let args = CLArgs::parse();
    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let succeeded = match args.routine {
        DagsCommand::Tokenize { path, format } => {
            tracing::info!(?path, "tokenizing");
            let src = read_to_string(path)?;
            tokenize(&src, &format)
        }
        DagsCommand::Validate {
            path,
            entries,
            format,
        } => {
            tracing::info!(?path, "validating");
            let name = path.display().to_string();
            let src = read_to_string(&path)?;
            validate(&name, &src, entries, &format)
        }
        DagsCommand::Pretty { path } => {
            let src = read_to_string(path)?;
            let text = dags::pretty_print(&src).map_err(|error| eyre!("{error}"))?;
            println!("{text}");
            true
        }
        DagsCommand::Run {
            path,
            entries,
            inputs,
            seed,
            max_depth,
            format,
        } => {
            tracing::info!(?path, "running");
            let name = path.display().to_string();
            let src = read_to_string(&path)?;
            let options = Options { max_depth, seed };
            run(&name, &src, entries, inputs, options, &format)
        }
        DagsCommand::Help => {
            print!("{}", dags::help());
            true
        }
    };
    if succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(65))
    }
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use dags::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use dags::lexer::Lexer;

    let scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
    };
    for token in scanner {
        println!("{}", formatter.format(&token));
    }
    true
}

fn store_from(entries: Vec<(String, String)>) -> IndexMap<String, String> {
    let mut store = IndexMap::new();
    for (key, value) in entries {
        dags::store::set(&mut store, &key, &value);
    }
    store
}

fn validate(name: &str, src: &str, entries: Vec<(String, String)>, format: &ErrorFormat) -> bool {
    use dags::validator::formatter::{BasicFormatter, PrettyFormatter, ValidationFormatter};

    let engine = Engine::new(store_from(entries));
    let mut diagnostics = Vec::new();
    let script_ok = engine.validate_script(src, &mut diagnostics);
    let store_ok = engine.validate_dictionary(&mut diagnostics);

    let formatter: Box<dyn ValidationFormatter> = match format {
        ErrorFormat::Basic => Box::new(BasicFormatter),
        ErrorFormat::Pretty => Box::new(PrettyFormatter::new(name)),
    };
    for diagnostic in &diagnostics {
        eprintln!("{}", formatter.format_error(diagnostic));
    }
    script_ok && store_ok
}

fn run(
    name: &str,
    src: &str,
    entries: Vec<(String, String)>,
    inputs: Vec<String>,
    options: Options,
    format: &ErrorFormat,
) -> bool {
    use dags::interpreter::formatter::{BasicFormatter, PrettyFormatter, RuntimeErrorFormatter};

    let mut engine = Engine::with_options(store_from(entries), options);
    engine.in_channel_mut().extend(inputs);
    let result = engine.run_script(src, &mut StdioContext);
    println!();
    for item in engine.out_channel_mut().drain(..) {
        println!("[out] {item}");
    }

    match result {
        Ok(()) => true,
        Err(error) => {
            let formatter: Box<dyn RuntimeErrorFormatter> = match format {
                ErrorFormat::Basic => Box::new(BasicFormatter),
                ErrorFormat::Pretty => Box::new(PrettyFormatter::new(name)),
            };
            eprintln!("{}", formatter.format_error(&error));
            false
        }
    }
}
