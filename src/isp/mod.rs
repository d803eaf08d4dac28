pub mod ae;
pub mod af;
pub mod awb;
pub mod builder;
pub mod config;
pub(crate) mod dispatch;
pub mod encode;
pub mod error;
pub mod event;
pub mod fixed;
pub mod helpers;
pub mod hist;
pub mod intr;
pub mod poll;
pub mod processor;
pub mod regs;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub(crate) mod submodule;

#[cfg(test)]
mod test_support;

pub use ae::{AeConfig, AeController, AeEnvDetector, AeSamplePoint, AeStatistics};
pub use af::{
    AfConfig, AfController, AfStatistics, AfWindowStats, AutoEdgeThreshold, EdgeThreshold,
    EnvDetectorMode,
};
pub use awb::{AwbConfig, AwbController, AwbSamplePoint, AwbStatistics, AwbWhitePatch};
pub use builder::ProcessorBuilder;
pub use config::{
    BayerOrder, ColorFormat, FrameSize, InputSource, ProcessorConfig, YuvRange, YuvStandard,
};
pub use encode::{
    CcmMatrix, DenoiseTemplate, GammaChannel, GammaCurve, GammaPoint, LumaCoefficients, Point,
    RatioRange, WindowGeometry,
};
pub use error::{CommitBit, IspError, ProtocolError, ValidationError};
pub use event::{Event, EventMask};
pub use fixed::Ratio;
pub use hist::{HistConfig, HistController, HistMode, HistStatistics};
pub use intr::{EventHandler, IrqInstaller, NoInstaller, Registration, SubmoduleId};
pub use poll::PollBudget;
pub use processor::{BfConfig, BfPadding, Processor, ProcessorState};
pub use regs::{InterruptFile, InterruptRegs, IspRegisterFile, RegisterBlock};
#[cfg(any(test, feature = "sim"))]
pub use sim::{AckBehaviour, SimulatedIsp};

pub mod prelude {
    pub use super::{
        AeConfig, AeController, AfConfig, AfController, AwbConfig, AwbController, BfConfig,
        CcmMatrix, ColorFormat, CommitBit, DenoiseTemplate, EdgeThreshold, EnvDetectorMode,
        Event, EventHandler, EventMask, FrameSize, GammaChannel, GammaCurve, HistConfig,
        HistController, InterruptRegs, IrqInstaller, IspError, NoInstaller, Point, PollBudget,
        Processor, ProcessorBuilder, ProcessorConfig, ProcessorState, ProtocolError,
        RatioRange, RegisterBlock, SubmoduleId, ValidationError, WindowGeometry,
    };
    #[cfg(any(test, feature = "sim"))]
    pub use super::{AckBehaviour, SimulatedIsp};
}
