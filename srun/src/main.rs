#[macro_use]
extern crate clap;

use std::path::{Path, PathBuf};
use std::process;

use clap::Arg;
use svm::LogLevel;

use srun::{run_file, RunOptions};

fn main() {
    env_logger::init();

    // Parse command line arguments
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("SOURCE")
                .help("Sets the source file to assemble and run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("FILE")
                .help("Reads GETLINE input from FILE instead of stdin"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .help("Writes main output to FILE instead of stdout"),
        )
        .arg(
            Arg::with_name("error")
                .short("e")
                .long("error")
                .takes_value(true)
                .value_name("FILE")
                .help("Writes error output to FILE instead of stderr"),
        )
        .arg(
            Arg::with_name("log")
                .short("l")
                .long("log")
                .takes_value(true)
                .value_name("FILE")
                .help("Writes log output to FILE instead of stderr"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .long("verbosity")
                .takes_value(true)
                .value_name("LEVEL")
                .default_value("0")
                .help("Log verbosity: 0-3 or WARNING|EVENT|INFO|VERBOSE"),
        )
        .arg(
            Arg::with_name("debug")
                .short("d")
                .long("debug")
                .help("Traces the stack and every instruction while running"),
        )
        .arg(
            Arg::with_name("color")
                .short("c")
                .long("color")
                .help("Colors error and log output"),
        )
        .get_matches();

    let verbosity = match matches.value_of("verbosity").unwrap().parse::<LogLevel>() {
        Ok(level) => level,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let options = RunOptions {
        input: matches.value_of("input").map(PathBuf::from),
        output: matches.value_of("output").map(PathBuf::from),
        errors: matches.value_of("error").map(PathBuf::from),
        logs: matches.value_of("log").map(PathBuf::from),
        verbosity,
        debug: matches.is_present("debug"),
        color: matches.is_present("color"),
    };

    let source = matches.value_of("SOURCE").unwrap();

    match run_file(Path::new(source), options) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}
