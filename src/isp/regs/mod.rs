//! Register addressing and the hardware access boundary.
//!
//! [`RegisterBlock`] is the only way the rest of the crate touches configuration registers.
//! A memory-mapped implementation wraps volatile accesses; [`RegisterFile`] keeps the same
//! words in memory and records which ones were written. The interrupt registers sit behind
//! [`InterruptRegs`] so the dispatcher never needs the block itself.

pub mod file;
pub mod irq;
pub mod map;

pub use file::{IspRegisterFile, RegisterFile};
pub use irq::{InterruptFile, InterruptRegs};

use crate::isp::error::ValidationError;

/// Byte offset of a 32-bit register inside the ISP block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(u16);

impl Reg {
    pub(crate) const fn at(offset: u16) -> Self {
        assert!(offset % 4 == 0, "register offsets are word aligned");
        assert!((offset as usize) < map::ISP_BLOCK_SIZE, "register outside the ISP block");
        Self(offset)
    }

    /// Byte offset from the block base.
    #[inline]
    pub const fn offset(self) -> u16 {
        self.0
    }

    /// Word index from the block base.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 / 4) as usize
    }

    /// The register `n` words after this one, for register arrays.
    #[inline]
    pub(crate) const fn nth(self, n: usize) -> Self {
        Self(self.0 + (n as u16) * 4)
    }
}

/// A contiguous bit-field inside one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    name: &'static str,
    reg: Reg,
    shift: u8,
    width: u8,
}

impl Field {
    pub(crate) const fn new(name: &'static str, reg: Reg, shift: u8, width: u8) -> Self {
        assert!(width > 0 && shift as u32 + width as u32 <= 32, "field exceeds register");
        Self {
            name,
            reg,
            shift,
            width,
        }
    }

    /// Register holding this field.
    #[inline]
    pub const fn reg(&self) -> Reg {
        self.reg
    }

    /// Field name as it appears in the register map.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn shift(&self) -> u8 {
        self.shift
    }

    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Largest value the field can hold.
    #[inline]
    pub const fn max(&self) -> u32 {
        if self.width == 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Extracts the field from a full register word.
    #[inline]
    pub const fn extract(&self, word: u32) -> u32 {
        (word >> self.shift) & self.max()
    }

    /// Replaces the field inside `word`; bits of `value` above the width are dropped.
    #[inline]
    pub const fn insert(&self, word: u32, value: u32) -> u32 {
        let mask = self.max() << self.shift;
        (word & !mask) | ((value << self.shift) & mask)
    }

    /// Returns `value` if it fits, `FieldOverflow` otherwise.
    pub fn check(&self, value: u32) -> Result<u32, ValidationError> {
        if value > self.max() {
            return Err(ValidationError::FieldOverflow { field: self.name });
        }
        Ok(value)
    }
}

/// Word-level access to an ISP register block.
///
/// Reads take `&self` because real registers may change under the CPU (status bits,
/// self-clearing triggers); implementations use interior mutability where they model that.
pub trait RegisterBlock {
    /// Interrupt registers of the same block.
    type Interrupts: InterruptRegs;

    /// Reads a full register word.
    fn read(&self, reg: Reg) -> u32;

    /// Writes a full register word.
    fn write(&mut self, reg: Reg, value: u32);

    /// Reads a single field.
    fn read_field(&self, field: Field) -> u32 {
        field.extract(self.read(field.reg()))
    }

    /// Read-modify-write of a single field.
    fn write_field(&mut self, field: Field, value: u32) {
        let word = self.read(field.reg());
        self.write(field.reg(), field.insert(word, value));
    }

    /// Read-modify-write of a full word.
    fn modify<F>(&mut self, reg: Reg, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let word = self.read(reg);
        self.write(reg, f(word));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_REG: Reg = Reg::at(0x10);
    const LOW: Field = Field::new("low", TEST_REG, 0, 12);
    const HIGH: Field = Field::new("high", TEST_REG, 16, 12);
    const FULL: Field = Field::new("full", TEST_REG, 0, 32);

    #[test]
    fn field_insert_and_extract() {
        let word = HIGH.insert(LOW.insert(0, 0xABC), 0x123);
        assert_eq!(word, 0x0123_0ABC);
        assert_eq!(LOW.extract(word), 0xABC);
        assert_eq!(HIGH.extract(word), 0x123);

        // Overwide values are truncated to the field
        assert_eq!(LOW.insert(0, 0x1_FFFF), 0xFFF);
        // Neighbouring bits survive
        assert_eq!(LOW.insert(0xFFFF_FFFF, 0), 0xFFFF_F000);
    }

    #[test]
    fn field_check_limits() {
        assert_eq!(LOW.check(0xFFF), Ok(0xFFF));
        assert_eq!(
            LOW.check(0x1000),
            Err(ValidationError::FieldOverflow { field: "low" })
        );
        assert_eq!(FULL.max(), u32::MAX);
        assert_eq!(FULL.check(u32::MAX), Ok(u32::MAX));
    }

    #[test]
    fn reg_indexing() {
        assert_eq!(TEST_REG.index(), 4);
        assert_eq!(TEST_REG.nth(3).offset(), 0x1C);
    }
}
