use slog::{info, o, Discard, Logger};

use super::memory::Memory;
use super::ExecutionError;

/// Where the second operand of a datapath operation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The memory cell addressed by the data address register.
    Memory,

    /// A value supplied by the control unit.
    Immediate(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOperation {
    Add,
    Subtract,

    /// Unsigned remainder.
    Modulo,

    /// Sets the zero flag from `accumulator == operand` and leaves the accumulator alone.
    Compare,
}

/// Renders an output symbol: values below 256 as a character, the rest as a decimal number.
pub fn render_symbol(symbol: u32) -> String {
    if symbol < 256 {
        char::from(symbol as u8).to_string()
    } else {
        symbol.to_string()
    }
}

/// Registers, ALU and the memory of the machine.
pub struct Datapath<M> {
    pub memory: M,
    pub accumulator: u32,

    /// Holds the accumulator while an interrupt handler runs.
    pub buffered_accumulator: u32,

    pub data_address: u32,

    zero: bool,
    output_buffer: Vec<u32>,
    logger: Logger,
}

impl<M: Memory> Datapath<M> {
    pub fn new(memory: M) -> Datapath<M> {
        Datapath::with_logger(memory, None)
    }

    pub fn with_logger<L: Into<Option<Logger>>>(memory: M, logger: L) -> Datapath<M> {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()));

        Datapath {
            memory,
            accumulator: 0,
            buffered_accumulator: 0,
            data_address: 0,
            zero: false,
            output_buffer: Vec::new(),
            logger,
        }
    }

    /// The zero flag. Follows every accumulator write, and `CMP` sets it directly. It is clear
    /// until the first write.
    pub fn zero(&self) -> bool {
        self.zero
    }

    pub fn output_buffer(&self) -> &[u32] {
        &self.output_buffer
    }

    pub fn render_output(&self) -> String {
        self.output_buffer.iter().map(|symbol| render_symbol(*symbol)).collect()
    }

    fn read(&self, source: Source) -> Result<u32, ExecutionError> {
        match source {
            Source::Memory => Ok(self.memory.get_data(self.data_address)?),
            Source::Immediate(value) => Ok(value),
        }
    }

    fn load(&mut self, value: u32) {
        self.accumulator = value;
        self.zero = value == 0;
    }

    pub fn latch_data_address(&mut self, address: u32) {
        self.data_address = address;
    }

    pub fn latch_accumulator(&mut self, source: Source) -> Result<(), ExecutionError> {
        let value = self.read(source)?;
        self.load(value);
        Ok(())
    }

    /// Stores the accumulator into the cell addressed by the data address register.
    pub fn write(&mut self) -> Result<(), ExecutionError> {
        self.memory.set_data(self.data_address, self.accumulator)?;
        Ok(())
    }

    /// Combines the accumulator with an operand. Arithmetic wraps around modulo 2^32.
    pub fn alu(&mut self, operation: AluOperation, source: Source) -> Result<(), ExecutionError> {
        let operand = self.read(source)?;

        let result = match operation {
            AluOperation::Add => self.accumulator.wrapping_add(operand),
            AluOperation::Subtract => self.accumulator.wrapping_sub(operand),
            AluOperation::Modulo => {
                if operand == 0 {
                    return Err(ExecutionError::DivisionByZero);
                }

                self.accumulator % operand
            },
            AluOperation::Compare => {
                self.zero = self.accumulator == operand;
                return Ok(());
            },
        };

        self.load(result);

        Ok(())
    }

    /// Latches an input symbol into the accumulator.
    ///
    /// # Returns
    /// The latched symbol, or [ExecutionError::EndOfInput] if there is none.
    pub fn input(&mut self, symbol: Option<u32>) -> Result<u32, ExecutionError> {
        let symbol = symbol.ok_or(ExecutionError::EndOfInput)?;

        info!(self.logger, "input"; "symbol" => render_symbol(symbol));

        self.load(symbol);

        Ok(symbol)
    }

    /// Appends the accumulator to the output buffer.
    pub fn output(&mut self) -> u32 {
        let symbol = self.accumulator;
        self.output_buffer.push(symbol);

        info!(self.logger, "output"; "symbol" => render_symbol(symbol), "buffer" => self.render_output());

        symbol
    }

    pub fn enter_interrupt(&mut self) {
        self.buffered_accumulator = self.accumulator;
    }

    pub fn exit_interrupt(&mut self) {
        let value = self.buffered_accumulator;
        self.load(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{Instruction, Opcode};

    fn datapath(values: &[u32]) -> Datapath<Vec<Instruction>> {
        let memory = values.iter()
            .enumerate()
            .map(|(index, value)| Instruction {
                index: index as u32,
                opcode: Opcode::Number,
                value: Some(*value),
            })
            .collect();

        Datapath::new(memory)
    }

    #[test]
    fn test_arithmetic_wraps() {
        let mut dp = datapath(&[1, 0xFFFF_FFFF]);

        dp.latch_data_address(1);
        dp.latch_accumulator(Source::Memory).unwrap();
        assert_eq!(dp.accumulator, 0xFFFF_FFFF);
        assert!(!dp.zero());

        dp.alu(AluOperation::Add, Source::Immediate(1)).unwrap();
        assert_eq!(dp.accumulator, 0);
        assert!(dp.zero());

        dp.latch_data_address(0);
        dp.alu(AluOperation::Subtract, Source::Memory).unwrap();
        assert_eq!(dp.accumulator, 0xFFFF_FFFF);
    }

    #[test]
    fn test_modulo() {
        let mut dp = datapath(&[3, 0]);

        dp.latch_accumulator(Source::Immediate(10)).unwrap();
        dp.alu(AluOperation::Modulo, Source::Memory).unwrap();
        assert_eq!(dp.accumulator, 1);

        // unsigned: -1 is 2^32 - 1
        dp.latch_accumulator(Source::Immediate(0xFFFF_FFFF)).unwrap();
        dp.alu(AluOperation::Modulo, Source::Immediate(10)).unwrap();
        assert_eq!(dp.accumulator, 5);

        dp.latch_data_address(1);
        assert_eq!(dp.alu(AluOperation::Modulo, Source::Memory), Err(ExecutionError::DivisionByZero));
    }

    #[test]
    fn test_compare() {
        let mut dp = datapath(&[]);

        dp.latch_accumulator(Source::Immediate(5)).unwrap();
        dp.alu(AluOperation::Compare, Source::Immediate(5)).unwrap();
        assert!(dp.zero());
        assert_eq!(dp.accumulator, 5);

        dp.alu(AluOperation::Compare, Source::Immediate(6)).unwrap();
        assert!(!dp.zero());
        assert_eq!(dp.accumulator, 5);
    }

    #[test]
    fn test_memory_access() {
        let mut dp = datapath(&[0, 0]);

        dp.latch_accumulator(Source::Immediate(9)).unwrap();
        dp.latch_data_address(1);
        dp.write().unwrap();
        assert_eq!(dp.memory[1].value, Some(9));
        assert_eq!(dp.memory[1].opcode, Opcode::Number);

        dp.latch_data_address(2);
        assert!(dp.write().is_err());
        assert!(dp.latch_accumulator(Source::Memory).is_err());
    }

    #[test]
    fn test_input_output() {
        let mut dp = datapath(&[]);

        assert_eq!(dp.input(None), Err(ExecutionError::EndOfInput));
        assert_eq!(dp.input(Some(104)), Ok(104));
        assert_eq!(dp.output(), 104);

        dp.latch_accumulator(Source::Immediate(1000)).unwrap();
        dp.output();

        assert_eq!(dp.output_buffer(), &[104, 1000]);
        assert_eq!(dp.render_output(), "h1000");
    }

    #[test]
    fn test_interrupt_buffer() {
        let mut dp = datapath(&[]);

        dp.latch_accumulator(Source::Immediate(7)).unwrap();
        dp.enter_interrupt();
        dp.latch_accumulator(Source::Immediate(0)).unwrap();
        dp.exit_interrupt();

        assert_eq!(dp.accumulator, 7);
        assert!(!dp.zero());
    }
}
