//! Outer command line.
//!
//! clap only owns the process-level options. Everything after them is handed
//! to the command registry untouched, so registered commands keep their own
//! flag schemas.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command as ClapCommand};
use tracing::level_filters::LevelFilter;

pub fn build_cli() -> ClapCommand {
    ClapCommand::new("codeflare")
        .about("Browse, tail and chart distributed job runs")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .action(ArgAction::SetTrue)
                .conflicts_with("args")
                .help("Read commands from stdin, one per line"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Use this config file instead of the global and project files"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Raise the log level (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            Arg::new("args")
                .value_name("COMMAND")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help("Command words and flags, e.g. `dashboard /path/to/logdir`"),
        )
        .after_help(after_help_text(&[
            "codeflare dashboard /path/to/logdir",
            "codeflare chart gpu /path/to/logdir",
            "codeflare tailf /path/to/logdir --since 2024-05-01T12:00:00Z",
            "codeflare help chart",
        ]))
}

fn after_help_text(examples: &[&str]) -> String {
    let mut text = String::from("EXAMPLES:\n");
    for example in examples {
        text.push_str("  ");
        text.push_str(example);
        text.push('\n');
    }
    text
}

/// Parsed process-level options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub interactive: bool,
    pub config: Option<PathBuf>,
    pub verbose: u8,
    pub args: Vec<String>,
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            interactive: matches.get_flag("interactive"),
            config: matches.get_one::<PathBuf>("config").cloned(),
            verbose: matches.get_count("verbose"),
            args: matches
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        }
    }
}

/// Log level from a configured level name raised by `-v` count. An
/// unparsable name falls back to `warn`.
pub fn log_level(configured: &str, verbose: u8) -> LevelFilter {
    let configured = configured.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN);
    let requested = match verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    configured.max(requested)
}
