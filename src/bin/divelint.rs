/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::env;
use std::process::ExitCode;

use chrono::Local;
use chrono::TimeZone;
use tracing_subscriber::EnvFilter;

use divexml::Config;
use divexml::DEFAULT_CHUNK_SIZE;
use divexml::Dialect;
use divexml::DiveParser;
use divexml::GroupBy;
use divexml::Logbook;
use divexml::LogbookXml;
use divexml::OrderBy;
use divexml::Severity;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("divelint (divexml) v{}", VERSION);
}

fn print_usage() {
    println!(
        concat!(
            "Usage: divelint [OPTIONS] [FILE.xml...]\n",
            "This tool checks dive logs and summarizes their dives.\n",
            "Options:\n",
            "  -g, --group <KEY>     Group by none, date, diver or divelog (default: none)\n",
            "  -o, --order <KEY>     Order by date, maxtime, maxtime-desc, maxdepth\n",
            "                        or maxdepth-desc (default: date)\n",
            "  -s, --split           Order the queue by time within each group\n",
            "  -x, --subsurface      Read the Subsurface dialect\n",
            "  -p, --print           Print the dives as a native dive log\n",
            "  -b, --buffer <SIZE>   File read buffer size in bytes (default: {})\n",
            "  -v, --verbose         Log every parse event\n",
            "  -h, --help            Display this help message and exit\n",
            "  -V, --version         Display the version and exit"
        ),
        DEFAULT_CHUNK_SIZE
    );
}

fn format_time(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).earliest() {
        Some(time) if timestamp != 0 => time.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

fn print_summary(logbook: &Logbook) {
    for group in logbook.groups() {
        println!(
            "Group {} ({}): {} dives, max depth {} m, from {} to {}",
            group.id,
            group.name.as_deref().unwrap_or("all"),
            group.dives.len(),
            group.max_depth,
            format_time(group.min_datetime),
            format_time(group.max_datetime),
        );
        for dive in logbook.group_dives(group.id) {
            let number = dive.number.map_or("-".to_string(), |n| n.to_string());
            println!(
                "  dive {} #{} at {}: {} samples, {} m, {}:{:02}",
                dive.id,
                number,
                format_time(dive.datetime),
                dive.samples.len(),
                dive.max_depth,
                dive.max_time / 60,
                dive.max_time % 60,
            );
        }
    }
    println!(
        "Total: {} dives in {} groups, {} errors",
        logbook.len(),
        logbook.groups().len(),
        logbook
            .diagnostics()
            .iter()
            .filter(|diag| diag.severity == Severity::Error)
            .count()
    );
}

fn parse_option<T: std::str::FromStr>(value: Option<String>, what: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .parse::<T>()
            .map_err(|err| format!("Invalid {}: {}", what, err)),
        None => Err(format!("Missing {}", what)),
    }
}

struct Options {
    config: Config,
    dialect: Dialect,
    print: bool,
    verbose: bool,
    files: Vec<String>,
}

enum Command {
    Run(Options),
    Exit(ExitCode),
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut group = GroupBy::None;
    let mut order = OrderBy::Date;
    let mut split = false;
    let mut chunk_size = DEFAULT_CHUNK_SIZE;
    let mut options = Options {
        config: Config::default(),
        dialect: Dialect::Native,
        print: false,
        verbose: false,
        files: Vec::new(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-g" | "--group" => group = parse_option(args.next(), "grouping")?,
            "-o" | "--order" => order = parse_option(args.next(), "ordering")?,
            "-s" | "--split" => split = true,
            "-x" | "--subsurface" => options.dialect = Dialect::Subsurface,
            "-p" | "--print" => options.print = true,
            "-b" | "--buffer" => chunk_size = parse_option(args.next(), "buffer size")?,
            "-v" | "--verbose" => options.verbose = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(Command::Exit(ExitCode::SUCCESS));
            }
            "-V" | "--version" => {
                print_version();
                return Ok(Command::Exit(ExitCode::SUCCESS));
            }
            _ => options.files.push(arg),
        }
    }

    options.config = Config {
        chunk_size,
        ..Config::new(group, order).with_split(split)
    };
    Ok(Command::Run(options))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> ExitCode {
    let mut args = env::args();
    // Skip the first argument (program name)
    args.next();

    let options = match parse_args(args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Exit(code)) => return code,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };
    init_logging(options.verbose);

    let mut logbook = Logbook::new(options.config.clone());
    let mut parser = DiveParser::with_chunk_size(options.dialect, options.config.chunk_size);
    let mut files = options.files;
    if files.is_empty() {
        files.push("-".to_string());
    }
    let mut failed = false;
    for file in &files {
        // Failures are logged as diagnostics
        failed |= parser.parse_path(&mut logbook, file).is_err();
    }
    if let Err(errors) = logbook.link() {
        tracing::debug!(count = errors.len(), "unresolved references");
    }

    if options.print {
        print!("{}", LogbookXml(&logbook));
    } else {
        print_summary(&logbook);
    }

    if failed || logbook.is_empty() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
