//! Ownership and interrupt registration shared by every statistics controller.

use log::{debug, warn};

use crate::isp::{
    error::{IspError, ProtocolError},
    intr::{EventHandler, IrqInstaller, SubmoduleId},
    processor::Processor,
    regs::RegisterBlock,
};

/// Claim on one statistics engine.
///
/// Holds the engine exclusively for its lifetime. Dropping it while enabled deregisters the
/// engine and turns it off before the claim is released.
pub(crate) struct Submodule<'a, R: RegisterBlock, I: IrqInstaller> {
    isp: &'a Processor<R, I>,
    id: SubmoduleId,
    enabled: bool,
    handler: Option<&'static dyn EventHandler>,
}

impl<'a, R: RegisterBlock, I: IrqInstaller> Submodule<'a, R, I> {
    pub(crate) fn claim(isp: &'a Processor<R, I>, id: SubmoduleId) -> Result<Self, IspError> {
        isp.claim(id)?;
        debug!("{id:?} controller created");
        Ok(Self {
            isp,
            id,
            enabled: false,
            handler: None,
        })
    }

    #[inline]
    pub(crate) fn isp(&self) -> &'a Processor<R, I> {
        self.isp
    }

    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_handler(
        &mut self,
        handler: &'static dyn EventHandler,
    ) -> Result<(), IspError> {
        if self.enabled {
            return Err(ProtocolError::ControllerEnabled.into());
        }
        self.handler = Some(handler);
        Ok(())
    }

    pub(crate) fn enable(&mut self) -> Result<(), IspError> {
        if self.enabled {
            return Err(ProtocolError::DuplicateRegistration(self.id).into());
        }
        self.isp.activate(self.id, self.handler)?;
        self.enabled = true;
        Ok(())
    }

    pub(crate) fn disable(&mut self) -> Result<(), IspError> {
        if !self.enabled {
            return Err(ProtocolError::NotRegistered(self.id).into());
        }
        self.isp.deactivate(self.id)?;
        self.enabled = false;
        Ok(())
    }
}

impl<R: RegisterBlock, I: IrqInstaller> Drop for Submodule<'_, R, I> {
    fn drop(&mut self) {
        if self.enabled {
            if let Err(e) = self.isp.deactivate(self.id) {
                warn!("{:?} teardown failed: {e}", self.id);
            }
        }
        self.isp.release(self.id);
        debug!("{:?} controller released", self.id);
    }
}
