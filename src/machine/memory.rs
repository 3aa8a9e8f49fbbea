use std::fmt;

use crate::isa::Instruction;

/// An access outside of the memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryError {
    pub address: u32,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "address {} is outside of the memory", self.address)
    }
}

/// Trait for implementing the unified instruction and data memory of the machine.
pub trait Memory {
    /// Fetch the instruction from the specified address.
    ///
    /// # Parameters
    /// - `addr`: The address of the instruction.
    ///
    /// # Returns
    /// The record stored in `addr` or a memory error.
    fn get_instruction(&self, addr: u32) -> Result<Instruction, MemoryError>;

    /// Fetch the data word from the specified address.
    ///
    /// A cell without a value reads as zero.
    fn get_data(&self, addr: u32) -> Result<u32, MemoryError>;

    /// Overwrite the data word in the specified address.
    ///
    /// Only the value part of the cell changes, its opcode is left as it was.
    fn set_data(&mut self, addr: u32, data: u32) -> Result<(), MemoryError>;

    /// Number of addressable cells.
    fn size(&self) -> usize;
}

impl Memory for Vec<Instruction> {
    fn get_instruction(&self, addr: u32) -> Result<Instruction, MemoryError> {
        self.get(addr as usize)
            .cloned()
            .ok_or(MemoryError { address: addr })
    }

    fn get_data(&self, addr: u32) -> Result<u32, MemoryError> {
        self.get(addr as usize)
            .map(|cell| cell.value.unwrap_or(0))
            .ok_or(MemoryError { address: addr })
    }

    fn set_data(&mut self, addr: u32, data: u32) -> Result<(), MemoryError> {
        match self.get_mut(addr as usize) {
            Some(cell) => {
                cell.value = Some(data);
                Ok(())
            },
            None => Err(MemoryError { address: addr }),
        }
    }

    fn size(&self) -> usize {
        self.len()
    }
}

#[test]
fn test_vec_memory() {
    use crate::isa::Opcode;

    let mut memory = vec![
        Instruction { index: 0, opcode: Opcode::Halt, value: None },
        Instruction { index: 1, opcode: Opcode::Push, value: Some(7) },
    ];

    assert_eq!(memory.get_data(0), Ok(0));
    assert_eq!(memory.get_data(1), Ok(7));
    assert_eq!(memory.get_data(2), Err(MemoryError { address: 2 }));

    assert_eq!(memory.set_data(0, 42), Ok(()));
    assert_eq!(memory.get_instruction(0), Ok(Instruction { index: 0, opcode: Opcode::Halt, value: Some(42) }));
    assert_eq!(memory.set_data(5, 1), Err(MemoryError { address: 5 }));
    assert_eq!(memory.size(), 2);
}
