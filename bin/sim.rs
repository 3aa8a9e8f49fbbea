use std::fs;

use clap::{value_t, App, Arg, ArgMatches};
use slog::{info, o, Drain, Level, LevelFilter, Logger};
use slog_term::{FullFormat, TermDecorator};

use acc32::{
    error::VerboseParseError,
    image::{CodeImage, ImageErrorKind},
    machine::ExecutionError,
    simulation::{parse_input_events, InputErrorKind, Simulation, SimulationConfig},
};

enum Error {
    Image(VerboseParseError<ImageErrorKind>),
    Input(VerboseParseError<InputErrorKind>),
    Execution(ExecutionError),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<ExecutionError> for Error {
    fn from(e: ExecutionError) -> Error {
        Error::Execution(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("acc32sim")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Simulates the accumulator machine on a code image")
        .arg(Arg::with_name("code_file")
             .help("File containing the code image")
             .value_name("IMAGE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("input_file")
             .help("File containing `<tick> <character>` input events")
             .value_name("INPUT")
             .index(2))
        .arg(Arg::with_name("debug_limit")
             .help("Trace ticks below this value")
             .long("debug-limit")
             .value_name("TICKS")
             .default_value("200"))
        .arg(Arg::with_name("limit")
             .help("Stop the simulation at this tick")
             .long("limit")
             .value_name("TICKS")
             .default_value("100000"))
        .arg(Arg::with_name("verbose")
             .help("Log the state of the machine on every traced tick")
             .short("v")
             .long("verbose"))
        .get_matches()
}

fn build_logger(verbose: bool) -> Logger {
    let level = if verbose { Level::Debug } else { Level::Info };

    let decorator = TermDecorator::new().stderr().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = LevelFilter::new(drain, level).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn main() {
    let args = parse_arguments();

    let config = SimulationConfig {
        limit: value_t!(args, "limit", u64).unwrap_or_else(|e| e.exit()),
        debug_limit: value_t!(args, "debug_limit", u64).unwrap_or_else(|e| e.exit()),
    };

    let logger = build_logger(args.is_present("verbose"));

    let result = run(
        args.value_of("code_file").unwrap(),
        args.value_of("input_file"),
        config,
        logger,
    );

    let message = match result {
        Ok(()) => return,
        Err(Error::IO(io)) => format!("IO error: {}", io),
        Err(Error::Image(err)) => format!("Invalid code image: {}", err),
        Err(Error::Input(err)) => format!("Invalid input file: {}", err),
        Err(Error::Execution(err)) => format!("Execution error: {}", err),
    };

    eprintln!("{}", message);
    std::process::exit(1);
}

fn run(code_file: &str, input_file: Option<&str>, config: SimulationConfig, logger: Logger) -> Result<(), Error> {
    let image_text = fs::read_to_string(code_file)?;

    let image = CodeImage::parse(&image_text)
        .map_err(|err| Error::Image(err.verbose(&image_text)))?;

    let events = match input_file {
        Some(path) => {
            let text = fs::read_to_string(path)?;

            parse_input_events(&text)
                .map_err(|err| Error::Input(err.verbose(&text)))?
        },
        None => Vec::new(),
    };

    info!(logger, "loaded code image"; "records" => image.len(), "events" => events.len());

    let report = Simulation::with_logger(image, events, config, logger).run()?;

    println!("{}", report.output);
    println!("Instructions: {} Ticks: {}", report.instructions, report.ticks);

    Ok(())
}
