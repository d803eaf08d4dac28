//! Bounded polling of self-clearing commit bits.

use log::warn;

use crate::isp::{
    error::{CommitBit, IspError},
    regs::{Field, map},
};

/// Upper bound on the reads spent waiting for a commit bit to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollBudget(u32);

impl PollBudget {
    pub const DEFAULT: PollBudget = PollBudget(10_000);

    /// Budget of `reads` polls; zero is treated as one.
    pub const fn new(reads: u32) -> Self {
        if reads == 0 { Self(1) } else { Self(reads) }
    }

    #[inline]
    pub const fn reads(self) -> u32 {
        self.0
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CommitBit {
    #[cfg(any(test, feature = "sim"))]
    pub(crate) const ALL: [CommitBit; 3] =
        [CommitBit::Gamma, CommitBit::AeUpdate, CommitBit::AfManualUpdate];

    /// Register field that carries the bit.
    pub(crate) const fn field(self) -> Field {
        match self {
            CommitBit::Gamma => map::GAMMA_UPDATE,
            CommitBit::AeUpdate => map::AE_UPDATE,
            CommitBit::AfManualUpdate => map::AF_MANUAL_UPDATE,
        }
    }

    #[cfg(any(test, feature = "sim"))]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Calls `is_set` until it reports the bit clear or the budget runs out.
///
/// The caller takes a fresh critical section inside `is_set` for each read.
pub(crate) fn wait_clear<F>(
    budget: PollBudget,
    bit: CommitBit,
    mut is_set: F,
) -> Result<(), IspError>
where
    F: FnMut() -> bool,
{
    for _ in 0..budget.reads() {
        if !is_set() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    warn!("{bit:?} commit not acknowledged after {} reads", budget.reads());
    Err(IspError::HardwareTimeout(bit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_within_budget() {
        let mut reads = 0;
        let result = wait_clear(PollBudget::new(5), CommitBit::Gamma, || {
            reads += 1;
            reads < 3
        });
        assert_eq!(result, Ok(()));
        assert_eq!(reads, 3);
    }

    #[test]
    fn times_out_after_exact_budget() {
        let mut reads = 0;
        let result = wait_clear(PollBudget::new(4), CommitBit::AeUpdate, || {
            reads += 1;
            true
        });
        assert_eq!(result, Err(IspError::HardwareTimeout(CommitBit::AeUpdate)));
        assert_eq!(reads, 4);
    }

    #[test]
    fn zero_budget_still_reads_once() {
        assert_eq!(PollBudget::new(0).reads(), 1);
        assert_eq!(PollBudget::default().reads(), 10_000);
    }
}
