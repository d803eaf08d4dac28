use core::marker::PhantomData;

use crate::isp::{
    intr::{IrqInstaller, NoInstaller},
    poll::PollBudget,
    processor::Processor,
    regs::RegisterBlock,
};

// Builder states
pub struct NeedRegisters;
pub struct NeedInstaller;
pub struct Ready;

/// Type-state builder for [`Processor`].
///
/// ```
/// use embedded_isp::prelude::*;
///
/// let isp = ProcessorBuilder::new()
///     .registers(SimulatedIsp::new())
///     .no_installer()
///     .poll_budget(PollBudget::new(100))
///     .build();
/// assert_eq!(isp.poll_budget().reads(), 100);
/// ```
pub struct ProcessorBuilder<R, N, I, State> {
    regs: R,
    interrupts: N,
    installer: I,
    poll_budget: PollBudget,
    _state: PhantomData<State>,
}

// Start the builder
impl ProcessorBuilder<(), (), (), NeedRegisters> {
    pub fn new() -> Self {
        ProcessorBuilder {
            regs: (),
            interrupts: (),
            installer: (),
            poll_budget: PollBudget::DEFAULT,
            _state: PhantomData,
        }
    }
}

impl Default for ProcessorBuilder<(), (), (), NeedRegisters> {
    fn default() -> Self {
        Self::new()
    }
}

// Set the register block
impl ProcessorBuilder<(), (), (), NeedRegisters> {
    /// Register block whose interrupt registers need no setup of their own.
    pub fn registers<R>(self, regs: R) -> ProcessorBuilder<R, R::Interrupts, (), NeedInstaller>
    where
        R: RegisterBlock,
        R::Interrupts: Default,
    {
        self.registers_with_interrupts(regs, Default::default())
    }

    /// Register block plus a separate handle onto its interrupt registers.
    pub fn registers_with_interrupts<R: RegisterBlock>(
        self,
        regs: R,
        interrupts: R::Interrupts,
    ) -> ProcessorBuilder<R, R::Interrupts, (), NeedInstaller> {
        ProcessorBuilder {
            regs,
            interrupts,
            installer: (),
            poll_budget: self.poll_budget,
            _state: PhantomData,
        }
    }
}

// Set the dispatcher installer
impl<R: RegisterBlock> ProcessorBuilder<R, R::Interrupts, (), NeedInstaller> {
    pub fn installer<I: IrqInstaller>(
        self,
        installer: I,
    ) -> ProcessorBuilder<R, R::Interrupts, I, Ready> {
        ProcessorBuilder {
            regs: self.regs,
            interrupts: self.interrupts,
            installer,
            poll_budget: self.poll_budget,
            _state: PhantomData,
        }
    }

    /// Use when the dispatcher is bound to the interrupt vector statically.
    pub fn no_installer(self) -> ProcessorBuilder<R, R::Interrupts, NoInstaller, Ready> {
        self.installer(NoInstaller)
    }
}

impl<R, N, I, State> ProcessorBuilder<R, N, I, State> {
    /// Bound on reads while waiting for commit bits; defaults to [`PollBudget::DEFAULT`].
    pub fn poll_budget(mut self, budget: PollBudget) -> Self {
        self.poll_budget = budget;
        self
    }
}

// Build
impl<R: RegisterBlock, I: IrqInstaller> ProcessorBuilder<R, R::Interrupts, I, Ready> {
    pub fn build(self) -> Processor<R, I> {
        Processor::new(self.regs, self.interrupts, self.installer, self.poll_budget)
    }
}
