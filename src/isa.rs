//! Types for representing instructions and the fixed-width numeric encoding of the machine.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

/// Width of a machine word in bits.
pub const BITS: u32 = 32;

/// Smallest value of a signed machine word.
pub const MIN_SIGN: i64 = -(1 << (BITS - 1));

/// Largest value of a signed machine word.
pub const MAX_SIGN: i64 = (1 << (BITS - 1)) - 1;

/// Largest value of an unsigned machine word.
pub const MAX_UNSIGNED: i64 = (1 << BITS) - 1;

/// Folds a signed literal into a machine word.
///
/// Returns `None` if `value` is outside of `MIN_SIGN..=MAX_SIGN`.
pub fn fold_signed(value: i64) -> Option<u32> {
    if value < MIN_SIGN || value > MAX_SIGN {
        return None;
    }

    Some(value as u32)
}

/// Folds an instruction operand literal into a machine word.
///
/// Operands may be written either as signed or as unsigned numbers, so the accepted range is
/// `MIN_SIGN..=MAX_UNSIGNED`. Negative values wrap around as two's complement.
pub fn fold_operand(value: i64) -> Option<u32> {
    if value < MIN_SIGN || value > MAX_UNSIGNED {
        return None;
    }

    if value < 0 {
        Some((value + (1 << BITS)) as u32)
    } else {
        Some(value as u32)
    }
}

/// Interprets a machine word as a two's complement signed number.
pub fn as_signed(word: u32) -> i32 {
    word as i32
}

/// Instructions and data directives of the accumulator machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Stops the execution.
    Halt,

    /// Unconditional jump to the address given in the operand.
    Jump,

    /// Jumps to the address given in the operand if the zero flag is set.
    JumpZero,

    /// Skips the next instruction.
    NoOperation,

    /// Returns from the interrupt handler.
    Return,

    /// Loads the accumulator from the memory cell given in the operand.
    Load,

    /// Stores the accumulator into the memory cell given in the operand.
    Save,

    /// Loads the accumulator from the memory cell whose address is in the accumulator.
    LoadIndirect,

    /// Loads the operand into the accumulator.
    Push,

    /// Sets the data address to the value stored in the memory cell given in the operand.
    SetDataAddress,

    /// Stores the accumulator into the memory cell pointed by the data address register.
    SaveIndirect,

    Add,
    Subtract,
    Modulo,

    /// Increments the accumulator by one.
    Increment,

    /// Sets the zero flag if the accumulator equals the operand.
    Compare,

    /// Loads the pending input symbol into the accumulator.
    Input,

    /// Appends the accumulator to the output buffer.
    Output,

    /// Data directive for a length-prefixed string.
    String,

    /// Data directive for a single number.
    Number,

    /// Data directive for a zero-filled buffer.
    Buffer,

    /// Directive that declares the interrupt handler.
    Vector,
}

lazy_static! {
    static ref MNEMONICS: HashMap<&'static str, Opcode> = Opcode::ALL
        .iter()
        .map(|opcode| (opcode.mnemonic(), *opcode))
        .collect();
}

impl Opcode {
    /// Every opcode, in the order of their numeric tags.
    pub const ALL: [Opcode; 22] = [
        Opcode::Halt,
        Opcode::Jump,
        Opcode::JumpZero,
        Opcode::NoOperation,
        Opcode::Return,
        Opcode::Load,
        Opcode::Save,
        Opcode::LoadIndirect,
        Opcode::Push,
        Opcode::SetDataAddress,
        Opcode::SaveIndirect,
        Opcode::Add,
        Opcode::Subtract,
        Opcode::Modulo,
        Opcode::Increment,
        Opcode::Compare,
        Opcode::Input,
        Opcode::Output,
        Opcode::String,
        Opcode::Number,
        Opcode::Buffer,
        Opcode::Vector,
    ];

    pub fn as_byte(&self) -> u8 {
        match self {
            Opcode::Halt => 0,
            Opcode::Jump => 1,
            Opcode::JumpZero => 2,
            Opcode::NoOperation => 3,
            Opcode::Return => 4,

            Opcode::Load => 10,
            Opcode::Save => 11,
            Opcode::LoadIndirect => 12,
            Opcode::Push => 13,
            Opcode::SetDataAddress => 14,
            Opcode::SaveIndirect => 15,

            Opcode::Add => 20,
            Opcode::Subtract => 21,
            Opcode::Modulo => 22,
            Opcode::Increment => 23,
            Opcode::Compare => 24,

            Opcode::Input => 30,
            Opcode::Output => 31,

            Opcode::String => 40,
            Opcode::Number => 41,
            Opcode::Buffer => 42,
            Opcode::Vector => 43,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Opcode> {
        let opcode = match byte {
            0 => Opcode::Halt,
            1 => Opcode::Jump,
            2 => Opcode::JumpZero,
            3 => Opcode::NoOperation,
            4 => Opcode::Return,

            10 => Opcode::Load,
            11 => Opcode::Save,
            12 => Opcode::LoadIndirect,
            13 => Opcode::Push,
            14 => Opcode::SetDataAddress,
            15 => Opcode::SaveIndirect,

            20 => Opcode::Add,
            21 => Opcode::Subtract,
            22 => Opcode::Modulo,
            23 => Opcode::Increment,
            24 => Opcode::Compare,

            30 => Opcode::Input,
            31 => Opcode::Output,

            40 => Opcode::String,
            41 => Opcode::Number,
            42 => Opcode::Buffer,
            43 => Opcode::Vector,

            _ => return None,
        };

        Some(opcode)
    }

    /// The name of the opcode in the assembly source and in the code image.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Halt => "HALT",
            Opcode::Jump => "JUMP",
            Opcode::JumpZero => "JZ",
            Opcode::NoOperation => "NOP",
            Opcode::Return => "RET",

            Opcode::Load => "LOAD",
            Opcode::Save => "SAVE",
            Opcode::LoadIndirect => "LOAD_AC",
            Opcode::Push => "PUSH",
            Opcode::SetDataAddress => "SET_DA",
            Opcode::SaveIndirect => "SAVE_AC",

            Opcode::Add => "ADD",
            Opcode::Subtract => "SUB",
            Opcode::Modulo => "MOD",
            Opcode::Increment => "INC",
            Opcode::Compare => "CMP",

            Opcode::Input => "INPUT",
            Opcode::Output => "OUTPUT",

            Opcode::String => "STRING",
            Opcode::Number => "NUMBER",
            Opcode::Buffer => "BUFFER",
            Opcode::Vector => "VECTOR",
        }
    }

    /// True for the opcodes that require exactly one operand.
    pub fn takes_operand(&self) -> bool {
        match self {
            Opcode::Jump
            | Opcode::JumpZero
            | Opcode::Load
            | Opcode::Save
            | Opcode::Push
            | Opcode::SetDataAddress
            | Opcode::Add
            | Opcode::Subtract
            | Opcode::Modulo
            | Opcode::Compare => true,
            _ => false,
        }
    }

    /// True for the instructions that need a memory access step after decoding.
    pub fn is_two_cycle(&self) -> bool {
        match self {
            Opcode::Load
            | Opcode::Save
            | Opcode::LoadIndirect
            | Opcode::SetDataAddress
            | Opcode::Add
            | Opcode::Subtract
            | Opcode::Modulo => true,
            _ => false,
        }
    }

    /// True for the data declaration directives, which are not executable.
    pub fn is_directive(&self) -> bool {
        match self {
            Opcode::String | Opcode::Number | Opcode::Buffer | Opcode::Vector => true,
            _ => false,
        }
    }

    /// Iterates over the mnemonics of the executable instructions.
    pub fn instruction_mnemonics() -> impl Iterator<Item = &'static str> {
        Opcode::ALL
            .iter()
            .filter(|opcode| !opcode.is_directive())
            .map(Opcode::mnemonic)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = ();

    fn from_str(input: &str) -> Result<Opcode, ()> {
        MNEMONICS.get(input).copied().ok_or(())
    }
}

/// A single cell of the unified instruction and data memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the cell.
    pub index: u32,
    pub opcode: Opcode,
    /// Operand of an instruction or the contents of a data cell.
    pub value: Option<u32>,
}

impl Default for Instruction {
    fn default() -> Instruction {
        Instruction {
            index: 0,
            opcode: Opcode::NoOperation,
            value: None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{} {} {}", self.index, self.opcode, value),
            None => write!(f, "{} {}", self.index, self.opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_table_is_bijective() {
        for opcode in Opcode::ALL.iter() {
            assert_eq!(Opcode::from_byte(opcode.as_byte()), Some(*opcode));
        }

        assert_eq!(Opcode::from_byte(5), None);
        assert_eq!(Opcode::from_byte(255), None);
    }

    #[test]
    fn test_mnemonics() {
        for opcode in Opcode::ALL.iter() {
            assert_eq!(opcode.mnemonic().parse::<Opcode>(), Ok(*opcode));
        }

        assert_eq!("LOAD_AC".parse::<Opcode>(), Ok(Opcode::LoadIndirect));
        assert_eq!("load".parse::<Opcode>(), Err(()));
        assert_eq!(format!("{:7}|", Opcode::JumpZero), "JZ     |");
    }

    #[test]
    fn test_fold_signed() {
        assert_eq!(fold_signed(0), Some(0));
        assert_eq!(fold_signed(-1), Some(0xFFFF_FFFF));
        assert_eq!(fold_signed(MAX_SIGN), Some(0x7FFF_FFFF));
        assert_eq!(fold_signed(MIN_SIGN), Some(0x8000_0000));
        assert_eq!(fold_signed(MAX_SIGN + 1), None);
        assert_eq!(fold_signed(MIN_SIGN - 1), None);

        for n in &[MIN_SIGN, -12345, -1, 0, 1, 12345, MAX_SIGN] {
            assert_eq!(as_signed(fold_signed(*n).unwrap()) as i64, *n);
        }
    }

    #[test]
    fn test_fold_operand() {
        assert_eq!(fold_operand(MAX_UNSIGNED), Some(u32::max_value()));
        assert_eq!(fold_operand(-2), Some(0xFFFF_FFFE));
        assert_eq!(fold_operand(MAX_UNSIGNED + 1), None);
        assert_eq!(fold_operand(MIN_SIGN - 1), None);
    }

    #[test]
    fn test_cycle_classes() {
        let two_cycle: Vec<_> = Opcode::ALL.iter().filter(|op| op.is_two_cycle()).collect();

        assert_eq!(two_cycle.len(), 7);
        assert!(!Opcode::SaveIndirect.is_two_cycle());
        assert!(Opcode::Compare.takes_operand());
        assert!(!Opcode::Increment.takes_operand());
        assert!(Opcode::instruction_mnemonics().all(|m| m != "VECTOR"));
    }
}
