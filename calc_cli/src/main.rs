//! # Beamline CLI
//!
//! Drives the calculation engine from the terminal. Every command prints
//! JSON to stdout; logs go to stderr (`RUST_LOG`, default `warn`).
//!
//! ```text
//! calc_cli [--settings settings.json] <command>
//!
//!   list                              registered calculators
//!   describe <id>                     field declarations
//!   example <id>                      example input record
//!   validate <id> <input.json>        validate without computing
//!   run <id> [input.json] [--out f]   calculate (example input if none given)
//!   lookup <category> <key>           domain table record
//!   self-check                        run every calculator's self-check
//! ```

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use calc_engine::file_io::{load_input, load_settings, save_result, SavedResult};
use calc_engine::materials::{Category, DomainLibrary};
use calc_engine::{EngineError, EngineSettings, Registry};
use serde::Serialize;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: calc_cli [--settings <file>] <list | describe <id> | example <id> | \
validate <id> <input.json> | run <id> [input.json] [--out <file>] | lookup <category> <key> | self-check>";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    List,
    Describe { id: String },
    Example { id: String },
    Validate { id: String, input: PathBuf },
    Run { id: String, input: Option<PathBuf>, out: Option<PathBuf> },
    Lookup { category: String, key: String },
    SelfCheck,
}

#[derive(Debug, Clone, PartialEq)]
struct Cli {
    settings: Option<PathBuf>,
    command: Command,
}

#[derive(Debug)]
enum CliError {
    Usage(String),
    Engine(EngineError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}\n{}", msg, USAGE),
            CliError::Engine(e) => write!(f, "[{}] {}", e.error_code(), e),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Engine(e.into())
    }
}

fn parse_args(args: &[String]) -> Result<Cli, CliError> {
    let mut settings = None;
    let mut out = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => {
                let path = iter.next().ok_or_else(|| CliError::Usage("--settings needs a file".into()))?;
                settings = Some(PathBuf::from(path));
            }
            "--out" => {
                let path = iter.next().ok_or_else(|| CliError::Usage("--out needs a file".into()))?;
                out = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(CliError::Usage("calc_cli".into())),
            _ => positional.push(arg.as_str()),
        }
    }

    let missing = |what: &str| CliError::Usage(format!("missing {}", what));
    let command = match positional.as_slice() {
        ["list"] => Command::List,
        ["describe", id] => Command::Describe { id: id.to_string() },
        ["example", id] => Command::Example { id: id.to_string() },
        ["validate", id, input] => Command::Validate {
            id: id.to_string(),
            input: PathBuf::from(input),
        },
        ["validate", ..] => return Err(missing("<id> <input.json>")),
        ["run", id] => Command::Run {
            id: id.to_string(),
            input: None,
            out,
        },
        ["run", id, input] => Command::Run {
            id: id.to_string(),
            input: Some(PathBuf::from(input)),
            out,
        },
        ["lookup", category, key] => Command::Lookup {
            category: category.to_string(),
            key: key.to_string(),
        },
        ["self-check"] => Command::SelfCheck,
        ["describe" | "example" | "run"] => return Err(missing("<id>")),
        ["lookup", ..] => return Err(missing("<category> <key>")),
        [] => return Err(missing("command")),
        other => return Err(CliError::Usage(format!("unknown command: {}", other.join(" ")))),
    };

    Ok(Cli { settings, command })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs a command; `Ok(false)` means it ran but reported a failure
fn execute(cli: Cli) -> Result<bool, CliError> {
    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => EngineSettings::default(),
    };
    let registry = Registry::builtin_with_settings(settings);
    debug!(calculators = registry.len(), command = ?cli.command, "engine ready");

    match cli.command {
        Command::List => print_json(&registry.list())?,
        Command::Describe { id } => {
            let calculator = registry.get(&id)?;
            print_json(&serde_json::json!({
                "id": calculator.id(),
                "name": calculator.name(),
                "description": calculator.description(),
                "version": calculator.version(),
                "fields": calculator.field_specs(),
            }))?;
        }
        Command::Example { id } => print_json(&registry.example_inputs(&id)?)?,
        Command::Validate { id, input } => {
            let record = load_input(&input)?;
            let validation = registry.validate(&id, &record)?;
            print_json(&validation)?;
            return Ok(validation.is_valid);
        }
        Command::Run { id, input, out } => {
            let record = match input {
                Some(path) => load_input(&path)?,
                None => registry.example_inputs(&id)?,
            };
            let result = registry.calculate(&id, &record)?;
            print_json(&result)?;
            let success = result.success;
            if let Some(path) = out {
                save_result(&SavedResult::new(id, record, result), &path)?;
            }
            return Ok(success);
        }
        Command::Lookup { category, key } => {
            let category = Category::from_str_flexible(&category).ok_or_else(|| {
                let known: Vec<&str> = Category::ALL.iter().map(Category::key).collect();
                CliError::Usage(format!("unknown category: {} (one of {})", category, known.join(", ")))
            })?;
            print_json(&DomainLibrary::global().lookup(category, &key))?;
        }
        Command::SelfCheck => {
            let reports = registry.self_check();
            print_json(&reports)?;
            return Ok(reports.iter().all(|r| r.passed()));
        }
    }
    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = parse_args(&args).and_then(execute);

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(CliError::Usage(msg)) => {
            eprintln!("{}", CliError::Usage(msg));
            ExitCode::from(2)
        }
        Err(e) => {
            match &e {
                CliError::Engine(err) if err.is_client_error() => warn!("{}", e),
                _ => error!("{}", e),
            }
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_run_with_out() {
        let cli = parse_args(&args("run haz-analysis in.json --out res.json")).unwrap();
        assert_eq!(
            cli.command,
            Command::Run {
                id: "haz-analysis".into(),
                input: Some(PathBuf::from("in.json")),
                out: Some(PathBuf::from("res.json")),
            }
        );
    }

    #[test]
    fn test_parse_settings_anywhere() {
        let cli = parse_args(&args("list --settings engine.json")).unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("engine.json")));
        assert_eq!(cli.command, Command::List);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_args(&args("")), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args("describe")), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args("validate haz-analysis")), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args("frobnicate")), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args("run x --out")), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_unknown_calculator_is_engine_error() {
        let cli = parse_args(&args("example no-such-calculator")).unwrap();
        match execute(cli) {
            Err(CliError::Engine(e)) => assert_eq!(e.error_code(), "CALCULATOR_NOT_FOUND"),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_category_lists_known_ones() {
        let cli = parse_args(&args("lookup metals steel")).unwrap();
        match execute(cli) {
            Err(CliError::Usage(msg)) => {
                assert!(msg.contains("metals"));
                assert!(msg.contains("cut_material"));
                assert!(msg.contains("laser_source"));
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_self_check_passes() {
        let cli = parse_args(&args("self-check")).unwrap();
        assert!(execute(cli).unwrap());
    }
}
