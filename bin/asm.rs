use std::fs;

use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use acc32::{compiler, parsing};

enum Error {
    Translation(parsing::Error),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<parsing::Error> for Error {
    fn from(e: parsing::Error) -> Error {
        Error::Translation(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("acc32asm")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Translates assembly source into a code image")
        .arg(Arg::with_name("source")
             .help("File containing assembly source")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("target")
             .help("File the code image is written to")
             .value_name("TARGET")
             .required(true)
             .index(2))
        .arg(Arg::with_name("verbose")
             .help("Log every translated record")
             .short("v")
             .long("verbose"))
        .get_matches()
}

fn build_logger(verbose: bool) -> Logger {
    if !verbose {
        return Logger::root(Discard, o!());
    }

    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn main() {
    let args = parse_arguments();

    let source_path = args.value_of("source").unwrap();
    let target_path = args.value_of("target").unwrap();
    let logger = build_logger(args.is_present("verbose"));

    let result = run(source_path, target_path, logger);

    match result {
        Ok(()) => (),
        Err(Error::IO(io)) => {
            eprintln!("IO error: {}", io);
            std::process::exit(1);
        },
        Err(Error::Translation(err)) => {
            eprintln!("Translation error: {}", err);
            std::process::exit(1);
        },
    }
}

fn run(source_path: &str, target_path: &str, logger: Logger) -> Result<(), Error> {
    let source = fs::read_to_string(source_path)?;

    let image = compiler::translate_with_logger(&source, logger)?;

    fs::write(target_path, image.to_text())?;

    // The vector line is counted as a record.
    println!("LoC: {} code_instr: {}", source.split('\n').count(), image.len() + 1);

    Ok(())
}
