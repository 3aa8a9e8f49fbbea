//! Running [code images](CodeImage) against timed input events.

use std::collections::VecDeque;
use std::fmt;
use std::result::Result as StdResult;

use nom::{
    IResult,
    character::complete::{anychar, digit1, multispace0, space1},
    combinator::{map, map_res, verify},
    sequence::tuple,
    error::context,
};
use slog::{debug, info, o, warn, Discard, Logger};

use crate::error::finish;
use crate::event::EventListener;
use crate::image::CodeImage;
use crate::machine::{ControlUnit, Datapath, ExecutionError, Memory, Status, StepCounter, TraceRecord};

/// Delay of the null character appended after the last input event.
pub const SENTINEL_DELAY: u64 = 100;

/// Limits of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// The run stops once the tick counter reaches this value.
    pub limit: u64,

    /// Ticks below this value are traced.
    pub debug_limit: u64,
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            limit: 100_000,
            debug_limit: 200,
        }
    }
}

/// An input symbol that becomes pending at the given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub tick: u64,
    pub symbol: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputErrorKind {
    OutOfOrder {
        tick: u64,
        previous: u64,
    },
}

impl fmt::Display for InputErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputErrorKind::OutOfOrder { tick, previous } => {
                write!(f, "event at tick {} comes after an event at tick {}", tick, previous)
            },
        }
    }
}

pub type InputParseError = crate::error::ParseError<InputErrorKind>;
type Result<'a, T> = IResult<&'a str, T, InputParseError>;

fn take_u64(input: &str) -> Result<u64> {
    map_res(digit1, |s: &str| s.parse::<u64>())(input)
}

fn parse_event(input: &str) -> Result<InputEvent> {
    map(
        tuple((take_u64, space1, verify(anychar, |c: &char| !c.is_whitespace()))),
        |(tick, _, symbol)| InputEvent {
            tick,
            symbol: symbol as u32,
        },
    )(input)
}

fn parse_events(mut input: &str) -> Result<Vec<InputEvent>> {
    let mut events: Vec<InputEvent> = Vec::new();

    loop {
        let (rest, _) = multispace0(input)?;

        if rest.is_empty() {
            return Ok((rest, events));
        }

        let (next, event) = context("input event", parse_event)(rest)?;

        if let Some(previous) = events.last() {
            if event.tick < previous.tick {
                let kind = InputErrorKind::OutOfOrder {
                    tick: event.tick,
                    previous: previous.tick,
                };

                return Err(nom::Err::Failure(InputParseError::from_kind(rest, kind)));
            }
        }

        events.push(event);
        input = next;
    }
}

/// Parses `<tick> <character>` lines.
///
/// A null character is appended [SENTINEL_DELAY] ticks after the last event, which lets an
/// interrupt driven program notice the end of its input. The sentinel tick saturates at
/// `u64::MAX`.
pub fn parse_input_events(text: &str) -> StdResult<Vec<InputEvent>, InputParseError> {
    let mut events = finish(parse_events(text))?;

    if let Some(last) = events.last() {
        let sentinel = InputEvent {
            tick: last.tick.saturating_add(SENTINEL_DELAY),
            symbol: 0,
        };

        events.push(sentinel);
    }

    Ok(events)
}

/// Why a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Halted,
    EndOfInput,
    TickLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The rendered output buffer.
    pub output: String,

    /// Number of steps started in the fetch state, interrupt entries included.
    pub instructions: u64,

    pub ticks: u64,
    pub stop: StopReason,

    /// Machine state after each tick below the debug limit.
    pub trace: Vec<TraceRecord>,
}

/// A single run of a code image.
pub struct Simulation {
    pub control_unit: ControlUnit,
    events: VecDeque<InputEvent>,
    config: SimulationConfig,
    logger: Logger,
}

impl Simulation {
    pub fn new(image: CodeImage, events: Vec<InputEvent>, config: SimulationConfig) -> Simulation {
        Simulation::with_logger(image, events, config, None)
    }

    pub fn with_logger<L>(image: CodeImage, events: Vec<InputEvent>, config: SimulationConfig, logger: L) -> Simulation
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()));

        let CodeImage { interrupt_vector, memory } = image;

        let datapath = Datapath::with_logger(memory, logger.new(o!("unit" => "datapath")));
        let control_unit = ControlUnit::with_logger(datapath, interrupt_vector, logger.new(o!("unit" => "control")));

        Simulation {
            control_unit,
            events: events.into(),
            config,
            logger: logger.new(o!("stage" => "simulation")),
        }
    }

    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.control_unit.add_listener(listener);
    }

    /// Runs until the program halts, reads past its input, or reaches the tick limit.
    ///
    /// # Errors
    /// Fatal [ExecutionErrors](ExecutionError). Running out of input is reported through
    /// [StopReason::EndOfInput] instead.
    pub fn run(mut self) -> StdResult<Report, ExecutionError> {
        info!(self.logger, "start simulation";
            "cells" => self.control_unit.datapath.memory.size(),
            "events" => self.events.len(),
            "limit" => self.config.limit);

        let mut instructions = 0;
        let mut trace = Vec::new();

        let stop = loop {
            let tick = self.control_unit.current_tick();

            if tick >= self.config.limit {
                warn!(self.logger, "tick limit exceeded"; "limit" => self.config.limit);
                break StopReason::TickLimit;
            }

            if self.events.front().map_or(false, |event| tick >= event.tick) {
                if let Some(event) = self.events.pop_front() {
                    self.control_unit.set_input(event.symbol);
                }
            }

            if self.control_unit.step_counter == StepCounter::Fetch {
                instructions += 1;
            }

            match self.control_unit.decode_and_execute() {
                Ok(Status::Halted) => break StopReason::Halted,
                Ok(Status::Running) => (),
                Err(ExecutionError::EndOfInput) => {
                    warn!(self.logger, "input buffer is empty"; "tick" => tick);
                    break StopReason::EndOfInput;
                },
                Err(err) => return Err(err),
            }

            if tick < self.config.debug_limit {
                let record = self.control_unit.snapshot();
                debug!(self.logger, "{}", record);
                trace.push(record);
            } else if tick == self.config.debug_limit {
                warn!(self.logger, "debug limit exceeded"; "debug_limit" => self.config.debug_limit);
            }

            self.control_unit.tick();
        };

        let output = self.control_unit.datapath.render_output();
        let ticks = self.control_unit.current_tick();

        info!(self.logger, "end simulation"; "output" => output.as_str(), "instructions" => instructions, "ticks" => ticks);

        Ok(Report {
            output,
            instructions,
            ticks,
            stop,
            trace,
        })
    }
}

/// Runs `image` to completion with default logging.
pub fn simulate(image: CodeImage, events: Vec<InputEvent>, config: SimulationConfig) -> StdResult<Report, ExecutionError> {
    Simulation::new(image, events, config).run()
}
