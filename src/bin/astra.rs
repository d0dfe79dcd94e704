//! Command-line interface for astra
//! Parses files with the built-in grammar, runs conformance case tables and lists grammar symbols.
//!
//! Usage:
//!   astra parse `<path>` [--entry `<symbol>`] [--format treeviz|json] [--trace]
//!   astra check `<cases.yaml>` | --builtin [--limit `<n>`]
//!   astra symbols
//!
//! Global flags: --config `<file>`, -d/--debug, -v/--verbose

use astra_parser::astra::config::{AstraConfig, Loader};
use astra_parser::astra::diagnostics::{LogSink, MemorySink, NullSink};
use astra_parser::astra::formats::Format;
use astra_parser::astra::parsing::grammar::Grammar;
use astra_parser::astra::testing::{builtin_tables, run_table, CaseTable};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::fs;
use std::rc::Rc;

type CliResult = Result<(), Box<dyn Error>>;

const DEFAULT_ENTRY: &str = "named-entry";

fn cli() -> Command {
    Command::new("astra")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for parsing and checking indentation-sensitive text")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at trace level, including every rule attempt"),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a file and print the result tree")
                .arg(
                    Arg::new("path")
                        .help("Path to the file to parse")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("entry")
                        .long("entry")
                        .short('e')
                        .help("Grammar symbol to parse with")
                        .default_value(DEFAULT_ENTRY),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: treeviz or json (default from config)"),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .action(ArgAction::SetTrue)
                        .help("Print the engine's diagnostic records after the result"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Run a conformance case table")
                .arg(
                    Arg::new("cases")
                        .help("Path to a YAML case table")
                        .required_unless_present("builtin")
                        .index(1),
                )
                .arg(
                    Arg::new("builtin")
                        .long("builtin")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("cases")
                        .help("Run the case tables shipped with the standard grammar"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(clap::value_parser!(u32))
                        .help("Run only the first N cases of each table"),
                ),
        )
        .subcommand(Command::new("symbols").about("List the symbols of the standard grammar"))
}

fn main() {
    let matches = cli().get_matches();
    init_logging(&matches);

    let result = load_config(&matches).and_then(|config| match matches.subcommand() {
        Some(("parse", sub)) => handle_parse_command(sub, &config),
        Some(("check", sub)) => handle_check_command(sub, &config),
        Some(("symbols", _)) => handle_symbols_command(),
        _ => unreachable!("clap requires a subcommand"),
    });

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}

fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("verbose") {
        "trace"
    } else if matches.get_flag("debug") {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<AstraConfig, Box<dyn Error>> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(("parse", sub)) = matches.subcommand() {
        if let Some(format) = sub.get_one::<String>("format") {
            format.parse::<Format>()?;
            loader = loader.set_override("render.format", format.as_str())?;
        }
    }
    if let Some(("check", sub)) = matches.subcommand() {
        if let Some(limit) = sub.get_one::<u32>("limit") {
            loader = loader.set_override("conformance.limit", i64::from(*limit))?;
        }
    }
    Ok(loader.build()?)
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches, config: &AstraConfig) -> CliResult {
    let path = matches
        .get_one::<String>("path")
        .ok_or("a path is required")?;
    let entry = matches
        .get_one::<String>("entry")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ENTRY);
    let trace = matches.get_flag("trace") || config.diagnostics.verbose;

    let text = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;

    let memory = Rc::new(MemorySink::new());
    let grammar = match (config.diagnostics.enabled, trace) {
        (false, _) => Grammar::standard_with(NullSink),
        (true, true) => Grammar::standard_with(Rc::clone(&memory)),
        (true, false) => Grammar::standard_with(LogSink),
    };

    let id = grammar
        .symbol_named(entry)
        .ok_or_else(|| format!("unknown grammar symbol: {}", entry))?;
    let result = grammar.parse_rule(&id.rule(), &text)?;

    print!(
        "{}",
        config.render.format.render(&result, config.render.show_locations)
    );
    if trace {
        for line in memory.lines() {
            eprintln!("{}", line);
        }
    }

    if result.is_error() {
        return Err(format!("{} did not parse as {}", path, entry).into());
    }
    Ok(())
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches, config: &AstraConfig) -> CliResult {
    let tables = if matches.get_flag("builtin") {
        builtin_tables()?
    } else {
        let path = matches
            .get_one::<String>("cases")
            .ok_or("a case table is required")?;
        vec![CaseTable::load(path)?]
    };

    let grammar = Grammar::standard();
    let options = config.conformance.run_options();
    let (mut passed, mut failed) = (0, 0);
    for table in &tables {
        println!("{}:", table.entry);
        for report in run_table(&grammar, table, &options)? {
            println!("  {}", report);
            if report.passed() {
                passed += 1;
            } else {
                failed += 1;
            }
        }
    }

    println!("\n{} passed, {} failed", passed, failed);
    if failed > 0 {
        return Err(format!("{} case variant(s) failed", failed).into());
    }
    Ok(())
}

/// Handle the symbols command
fn handle_symbols_command() -> CliResult {
    let grammar = Grammar::standard();
    for id in grammar.symbols() {
        let Some(info) = grammar.info(id) else {
            continue;
        };
        let mut line = format!("{:<24} {}", info.name, info.types.join(", "));
        if let Some(root) = &info.splays {
            line.push_str(&format!("  (splays {})", root));
        }
        if !info.alternatives.is_empty() {
            line.push_str(&format!("  [{}]", info.alternatives.join(" | ")));
        }
        println!("{}", line);
    }
    Ok(())
}
