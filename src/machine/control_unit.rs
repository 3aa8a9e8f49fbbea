//! [ControlUnit] for executing [code images](crate::image::CodeImage) one micro-step at a time.

use std::convert::TryFrom;
use std::fmt;

use slog::{info, o, trace, Discard, Logger};

use crate::event::{Event, EventDispatcher, EventListener};
use crate::isa::{Instruction, Opcode};

use super::datapath::{AluOperation, Datapath, Source};
use super::memory::Memory;
use super::ExecutionError;

/// The micro-step within the current instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCounter {
    /// Interrupt check and instruction fetch.
    Fetch,

    /// Decode, and execute for the single-cycle instructions.
    Decode,

    /// The memory access of the two-cycle instructions.
    Access,
}

impl StepCounter {
    pub fn as_u8(self) -> u8 {
        match self {
            StepCounter::Fetch => 0,
            StepCounter::Decode => 1,
            StepCounter::Access => 2,
        }
    }
}

impl TryFrom<u8> for StepCounter {
    type Error = ExecutionError;

    fn try_from(value: u8) -> Result<StepCounter, ExecutionError> {
        match value {
            0 => Ok(StepCounter::Fetch),
            1 => Ok(StepCounter::Decode),
            2 => Ok(StepCounter::Access),
            other => Err(ExecutionError::InvalidStepCounter(other)),
        }
    }
}

/// What the machine does after a micro-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
}

/// The machine state after a micro-step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub tick: u64,
    pub opcode: Opcode,
    pub step_counter: StepCounter,
    pub program_counter: u32,
    pub accumulator: u32,
    pub data_address: u32,
    pub zero: bool,
    pub interrupted: bool,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Tick: {:4} {:7} SC: {:3} PC: {:3} AC: {:4} DA: {:3} ZERO: {:1} INTERRUPTED: {:1}",
            self.tick,
            self.opcode,
            self.step_counter.as_u8(),
            self.program_counter,
            self.accumulator,
            self.data_address,
            self.zero as u8,
            self.interrupted as u8,
        )
    }
}

/// Sequences the [Datapath] through the micro-steps of each instruction and handles the
/// input interrupt.
pub struct ControlUnit<M = Vec<Instruction>> {
    pub datapath: Datapath<M>,

    /// Address of the next instruction to fetch.
    pub program_counter: u32,

    /// Holds the program counter while an interrupt handler runs.
    pub buffered_program_counter: u32,

    pub instruction_register: Instruction,
    pub step_counter: StepCounter,

    /// Set while the interrupt handler runs. Interrupts do not nest.
    pub interrupted: bool,

    pub interrupt_vector: Option<u32>,

    /// The pending input symbol, consumed by `INPUT`.
    pub input_symbol: Option<u32>,

    tick: u64,
    logger: Logger,
    events: EventDispatcher,
}

impl<M: Memory> ControlUnit<M> {
    pub fn new(datapath: Datapath<M>, interrupt_vector: Option<u32>) -> ControlUnit<M> {
        ControlUnit::with_logger(datapath, interrupt_vector, None)
    }

    pub fn with_logger<L>(datapath: Datapath<M>, interrupt_vector: Option<u32>, logger: L) -> ControlUnit<M>
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()));

        ControlUnit {
            datapath,
            program_counter: 0,
            buffered_program_counter: 0,
            instruction_register: Instruction::default(),
            step_counter: StepCounter::Fetch,
            interrupted: false,
            interrupt_vector,
            input_symbol: None,
            tick: 0,
            logger,
            events: EventDispatcher::new(),
        }
    }

    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.events.add_listener(listener);
    }

    pub fn tick(&mut self) {
        self.tick += 1;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Makes `symbol` the pending input. It raises an interrupt at the next fetch step if the
    /// program has an interrupt handler and is not already in it.
    pub fn set_input(&mut self, symbol: u32) {
        self.input_symbol = Some(symbol);
    }

    pub fn snapshot(&self) -> TraceRecord {
        TraceRecord {
            tick: self.tick,
            opcode: self.instruction_register.opcode,
            step_counter: self.step_counter,
            program_counter: self.program_counter,
            accumulator: self.datapath.accumulator,
            data_address: self.datapath.data_address,
            zero: self.datapath.zero(),
            interrupted: self.interrupted,
        }
    }

    /// Performs the micro-step selected by the step counter.
    ///
    /// # Returns
    /// [Status::Halted] once `HALT` is executed. An error stops the machine, its state is
    /// left as it was at the failing step.
    pub fn decode_and_execute(&mut self) -> Result<Status, ExecutionError> {
        match self.step_counter {
            StepCounter::Fetch => self.fetch(),
            StepCounter::Decode => self.decode(),
            StepCounter::Access => self.access(),
        }
    }

    fn fetch(&mut self) -> Result<Status, ExecutionError> {
        if let (Some(_), false, Some(vector)) = (self.input_symbol, self.interrupted, self.interrupt_vector) {
            self.enter_interrupt(vector);
            return Ok(Status::Running);
        }

        self.instruction_register = self.datapath.memory.get_instruction(self.program_counter)?;
        self.program_counter += 1;
        self.step_counter = StepCounter::Decode;

        trace!(self.logger, "fetch"; "instruction" => %self.instruction_register);

        Ok(Status::Running)
    }

    fn operand(&self) -> Result<u32, ExecutionError> {
        self.instruction_register.value
            .ok_or(ExecutionError::MissingOperand {
                opcode: self.instruction_register.opcode,
                address: self.instruction_register.index,
            })
    }

    fn invalid_opcode(&self) -> ExecutionError {
        ExecutionError::InvalidOpcode {
            opcode: self.instruction_register.opcode,
            step: self.step_counter,
            address: self.instruction_register.index,
        }
    }

    fn decode(&mut self) -> Result<Status, ExecutionError> {
        let next = match self.instruction_register.opcode {
            Opcode::Halt => {
                info!(self.logger, "halt"; "address" => self.instruction_register.index);
                self.events.dispatch(Event::Halt { address: self.instruction_register.index });
                return Ok(Status::Halted);
            },
            // Advances past the following cell as well.
            Opcode::NoOperation => {
                self.program_counter += 1;
                StepCounter::Fetch
            },
            Opcode::Jump => {
                self.program_counter = self.operand()?;
                StepCounter::Fetch
            },
            Opcode::JumpZero => {
                let target = self.operand()?;

                if self.datapath.zero() {
                    self.program_counter = target;
                }

                StepCounter::Fetch
            },
            Opcode::Return => {
                self.exit_interrupt()?;
                StepCounter::Fetch
            },
            Opcode::Load
            | Opcode::Save
            | Opcode::SetDataAddress
            | Opcode::Add
            | Opcode::Subtract
            | Opcode::Modulo => {
                let address = self.operand()?;
                self.datapath.latch_data_address(address);
                StepCounter::Access
            },
            Opcode::LoadIndirect => {
                let address = self.datapath.accumulator;
                self.datapath.latch_data_address(address);
                StepCounter::Access
            },
            Opcode::SaveIndirect => {
                self.write_memory()?;
                StepCounter::Fetch
            },
            Opcode::Push => {
                let value = self.operand()?;
                self.datapath.latch_accumulator(Source::Immediate(value))?;
                StepCounter::Fetch
            },
            Opcode::Increment => {
                self.datapath.alu(AluOperation::Add, Source::Immediate(1))?;
                StepCounter::Fetch
            },
            Opcode::Compare => {
                let value = self.operand()?;
                self.datapath.alu(AluOperation::Compare, Source::Immediate(value))?;
                StepCounter::Fetch
            },
            Opcode::Input => {
                let symbol = self.datapath.input(self.input_symbol)?;
                self.input_symbol = None;
                self.events.dispatch(Event::Input { symbol });
                StepCounter::Fetch
            },
            Opcode::Output => {
                let symbol = self.datapath.output();
                self.events.dispatch(Event::Output { symbol });
                StepCounter::Fetch
            },
            Opcode::String | Opcode::Number | Opcode::Buffer | Opcode::Vector => {
                return Err(self.invalid_opcode());
            },
        };

        self.step_counter = next;

        Ok(Status::Running)
    }

    fn access(&mut self) -> Result<Status, ExecutionError> {
        match self.instruction_register.opcode {
            Opcode::Load | Opcode::LoadIndirect => {
                self.datapath.latch_accumulator(Source::Memory)?;
            },
            Opcode::Save => self.write_memory()?,
            Opcode::SetDataAddress => {
                let address = self.datapath.memory.get_data(self.datapath.data_address)?;
                self.datapath.latch_data_address(address);
            },
            Opcode::Add => self.datapath.alu(AluOperation::Add, Source::Memory)?,
            Opcode::Subtract => self.datapath.alu(AluOperation::Subtract, Source::Memory)?,
            Opcode::Modulo => self.datapath.alu(AluOperation::Modulo, Source::Memory)?,
            _ => return Err(self.invalid_opcode()),
        }

        self.step_counter = StepCounter::Fetch;

        Ok(Status::Running)
    }

    fn write_memory(&mut self) -> Result<(), ExecutionError> {
        self.datapath.write()?;

        self.events.dispatch(Event::MemoryChange {
            address: self.datapath.data_address,
            data: self.datapath.accumulator,
        });

        Ok(())
    }

    fn enter_interrupt(&mut self, vector: u32) {
        info!(self.logger, "interrupt"; "return_address" => self.program_counter, "vector" => vector);

        self.interrupted = true;
        self.datapath.enter_interrupt();
        self.buffered_program_counter = self.program_counter;
        self.program_counter = vector;

        self.events.dispatch(Event::InterruptEnter {
            return_address: self.buffered_program_counter,
            vector,
        });
    }

    fn exit_interrupt(&mut self) -> Result<(), ExecutionError> {
        if !self.interrupted {
            return Err(ExecutionError::ReturnOutsideInterrupt {
                address: self.instruction_register.index,
            });
        }

        self.interrupted = false;
        self.datapath.exit_interrupt();
        self.program_counter = self.buffered_program_counter;

        info!(self.logger, "return from interrupt"; "return_address" => self.program_counter);

        self.events.dispatch(Event::InterruptExit {
            return_address: self.program_counter,
        });

        Ok(())
    }
}
