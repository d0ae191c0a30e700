use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

use telesim::commands;

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Config file to use instead of the default location")
        .value_parser(value_parser!(PathBuf))
}

fn event_arg() -> Arg {
    Arg::new("event")
        .short('e')
        .long("event")
        .value_name("NAME")
        .help("Event to inject at start (repeatable, see 'telesim events')")
        .action(ArgAction::Append)
}

fn build_cli() -> Command {
    Command::new("telesim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Synthetic telemetry engine for driving monitoring dashboards")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run a live simulation on the wall clock")
                .arg(config_arg())
                .arg(event_arg())
                .arg(
                    Arg::new("seconds")
                        .short('s')
                        .long("seconds")
                        .help("How long to run")
                        .value_parser(value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print one JSON snapshot per second")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("logs")
                        .short('l')
                        .long("logs")
                        .help("Also print synthesized log lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run an offline simulation and print the final snapshot")
                .arg(config_arg())
                .arg(event_arg())
                .arg(
                    Arg::new("ticks")
                        .short('t')
                        .long("ticks")
                        .help("Simulated seconds to run")
                        .value_parser(value_parser!(u64))
                        .default_value("60"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Random seed for a reproducible run")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .help("Pretty-print the JSON snapshot")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("summary")
                        .long("summary")
                        .help("Print a one-line summary instead of JSON")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("pretty"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the config file")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("show")
                        .about("Print the effective configuration")
                        .arg(config_arg()),
                )
                .subcommand(
                    Command::new("init")
                        .about("Write a default config file")
                        .arg(config_arg())
                        .arg(
                            Arg::new("force")
                                .short('f')
                                .long("force")
                                .help("Overwrite an existing file")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(Command::new("path").about("Print the default config path")),
        )
        .subcommand(Command::new("events").about("List injectable events"))
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    telesim::init_logging();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run(sub_matches),
        Some(("simulate", sub_matches)) => commands::simulate(sub_matches),
        Some(("config", sub_matches)) => commands::config::execute(sub_matches),
        Some(("events", _)) => commands::events(),
        Some(("version", _)) => commands::version(),
        _ => Ok(()),
    }
}
