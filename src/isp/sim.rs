//! Hosted model of the ISP register block.
//!
//! Good enough to drive every controller without hardware: registers load their reset
//! values, the commit bits clear on their own after a configurable number of reads, and the
//! interrupt registers are an [`InterruptFile`].

use core::cell::Cell;

use crate::isp::{
    error::CommitBit,
    regs::{InterruptFile, IspRegisterFile, Reg, RegisterBlock, map},
};

/// How the model acknowledges a commit bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckBehaviour {
    /// The bit reads back set `n` times, then clear.
    After(u32),
    /// The bit never clears.
    Never,
}

impl Default for AckBehaviour {
    fn default() -> Self {
        AckBehaviour::After(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Idle,
    Reads(u32),
    Stuck,
}

/// In-memory ISP with commit-bit behaviour.
pub struct SimulatedIsp {
    file: IspRegisterFile,
    ack: AckBehaviour,
    pending: [Cell<Pending>; 3],
    commits: [Cell<u32>; 3],
}

impl core::fmt::Debug for SimulatedIsp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulatedIsp")
            .field("ack", &self.ack)
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedIsp {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedIsp {
    /// Model at power-on reset.
    pub fn new() -> Self {
        let mut file = IspRegisterFile::new();
        file.load_defaults(map::RESET_VALUES);
        Self {
            file,
            ack: AckBehaviour::default(),
            pending: core::array::from_fn(|_| Cell::new(Pending::Idle)),
            commits: core::array::from_fn(|_| Cell::new(0)),
        }
    }

    pub fn with_ack(mut self, ack: AckBehaviour) -> Self {
        self.ack = ack;
        self
    }

    pub fn set_ack(&mut self, ack: AckBehaviour) {
        self.ack = ack;
    }

    /// Sets a read-only register, such as a statistics result, without marking it written.
    pub fn latch(&mut self, reg: Reg, value: u32) {
        self.file.load_defaults(&[(reg, value)]);
    }

    /// Times a commit bit was set since construction.
    pub fn commits(&self, bit: CommitBit) -> u32 {
        self.commits[bit.index()].get()
    }

    /// Underlying register file, for write tracking.
    pub fn file(&self) -> &IspRegisterFile {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut IspRegisterFile {
        &mut self.file
    }

    fn commit_bit_at(reg: Reg) -> Option<CommitBit> {
        CommitBit::ALL.into_iter().find(|b| b.field().reg() == reg)
    }

    fn read_commit(&self, bit: CommitBit, word: u32) -> u32 {
        let cell = &self.pending[bit.index()];
        let set = match cell.get() {
            Pending::Idle => false,
            Pending::Stuck => true,
            Pending::Reads(0) => {
                cell.set(Pending::Idle);
                false
            }
            Pending::Reads(n) => {
                cell.set(Pending::Reads(n - 1));
                true
            }
        };
        bit.field().insert(word, set as u32)
    }
}

impl RegisterBlock for SimulatedIsp {
    type Interrupts = InterruptFile;

    fn read(&self, reg: Reg) -> u32 {
        let word = self.file.read(reg);
        match Self::commit_bit_at(reg) {
            Some(bit) => self.read_commit(bit, word),
            None => word,
        }
    }

    fn write(&mut self, reg: Reg, value: u32) {
        let value = match Self::commit_bit_at(reg) {
            Some(bit) if bit.field().extract(value) != 0 => {
                let cell = &self.commits[bit.index()];
                cell.set(cell.get() + 1);
                self.pending[bit.index()].set(match self.ack {
                    AckBehaviour::After(n) => Pending::Reads(n),
                    AckBehaviour::Never => Pending::Stuck,
                });
                bit.field().insert(value, 0)
            }
            _ => value,
        };
        self.file.write(reg, value);
    }
}
