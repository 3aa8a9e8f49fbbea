//! The processor model: [Datapath] and [ControlUnit].
//!
//! The control unit advances one micro-step per tick. Every instruction takes a fetch step
//! and a decode/execute step, and instructions that access memory through the data address
//! register take one more step.

use std::fmt;

use crate::isa::Opcode;

pub mod control_unit;
pub mod datapath;
pub mod memory;

pub use self::control_unit::{ControlUnit, Status, StepCounter, TraceRecord};
pub use self::datapath::{render_symbol, AluOperation, Datapath, Source};
pub use self::memory::{Memory, MemoryError};

/// Errors that stop the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// `INPUT` was executed with no pending input symbol.
    EndOfInput,

    Memory(MemoryError),

    /// The opcode has no behaviour in the given step, for example a data cell was fetched.
    InvalidOpcode {
        opcode: Opcode,
        step: StepCounter,
        address: u32,
    },

    InvalidStepCounter(u8),

    MissingOperand {
        opcode: Opcode,
        address: u32,
    },

    /// `MOD` with a zero divisor.
    DivisionByZero,

    /// `RET` outside of an interrupt handler.
    ReturnOutsideInterrupt {
        address: u32,
    },
}

impl ExecutionError {
    /// Running out of input is the normal way for an input driven program to end. Everything
    /// else is a fault.
    pub fn is_fatal(&self) -> bool {
        match self {
            ExecutionError::EndOfInput => false,
            _ => true,
        }
    }
}

impl From<MemoryError> for ExecutionError {
    fn from(err: MemoryError) -> ExecutionError {
        ExecutionError::Memory(err)
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionError::EndOfInput => write!(f, "end of input"),
            ExecutionError::Memory(err) => write!(f, "memory error: {}", err),
            ExecutionError::InvalidOpcode { opcode, step, address } => {
                write!(f, "opcode {} at address {} cannot be executed in step {:?}", opcode, address, step)
            },
            ExecutionError::InvalidStepCounter(value) => write!(f, "invalid step counter value {}", value),
            ExecutionError::MissingOperand { opcode, address } => {
                write!(f, "{} at address {} has no operand", opcode, address)
            },
            ExecutionError::DivisionByZero => write!(f, "division by zero"),
            ExecutionError::ReturnOutsideInterrupt { address } => {
                write!(f, "RET at address {} outside of an interrupt handler", address)
            },
        }
    }
}

impl std::error::Error for ExecutionError {}
