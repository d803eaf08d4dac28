use crate::isp::intr::SubmoduleId;

/// Input rejected before any register was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Gamma point `index` breaks the power-of-two interval rule or the curve does not end at 256.
    InvalidCurve { index: usize },
    /// Matrix coefficient `index` (row-major) is NaN or infinite.
    InvalidCoefficient { index: usize },
    /// Ratio is negative, NaN, or not below 4.0.
    InvalidRatio,
    /// Range minimum is greater than its maximum.
    InvalidRange,
    /// Denoise template cell does not fit in 4 bits.
    InvalidTemplate { row: usize, col: usize },
    /// Window coordinates out of range or not ordered.
    InvalidWindow,
    /// Window id does not name a hardware window.
    InvalidWindowId(usize),
    /// Histogram weights do not sum to 256.
    InvalidWeights,
    /// Histogram segment thresholds are not strictly increasing.
    InvalidSegments,
    /// RGB to gray coefficients do not sum to 256.
    InvalidLumaCoefficients,
    /// Value does not fit in the named register field.
    FieldOverflow { field: &'static str },
    /// Zero is reserved to select a different mode.
    ReservedSentinel,
    /// Source/format pair has no hardware encoding.
    UnsupportedFormat,
    /// Frame resolution is zero or exceeds the frame counters.
    InvalidFrameSize,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ValidationError::InvalidCurve { index } => {
                write!(f, "gamma point {index} breaks the power-of-two interval rule")
            }
            ValidationError::InvalidCoefficient { index } => {
                write!(f, "coefficient {index} is not a finite number")
            }
            ValidationError::InvalidRatio => write!(f, "ratio outside [0, 4)"),
            ValidationError::InvalidRange => write!(f, "range minimum exceeds maximum"),
            ValidationError::InvalidTemplate { row, col } => {
                write!(f, "template cell ({row}, {col}) exceeds 15")
            }
            ValidationError::InvalidWindow => write!(f, "window out of range or inverted"),
            ValidationError::InvalidWindowId(id) => write!(f, "no hardware window {id}"),
            ValidationError::InvalidWeights => write!(f, "histogram weights must sum to 256"),
            ValidationError::InvalidSegments => {
                write!(f, "histogram segments must be strictly increasing")
            }
            ValidationError::InvalidLumaCoefficients => {
                write!(f, "rgb coefficients must sum to 256")
            }
            ValidationError::FieldOverflow { field } => {
                write!(f, "value does not fit in field {field}")
            }
            ValidationError::ReservedSentinel => write!(f, "zero is reserved for another mode"),
            ValidationError::UnsupportedFormat => write!(f, "unsupported source/format pair"),
            ValidationError::InvalidFrameSize => write!(f, "invalid frame resolution"),
        }
    }
}

impl core::error::Error for ValidationError {}

/// Lifecycle or registration misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Submodule already holds an interrupt registration.
    DuplicateRegistration(SubmoduleId),
    /// Submodule has no interrupt registration.
    NotRegistered(SubmoduleId),
    /// Processor is already enabled.
    AlreadyEnabled,
    /// Processor is not enabled.
    NotEnabled,
    /// Another controller already owns this submodule.
    SubmoduleInUse(SubmoduleId),
    /// Submodules still hold interrupt registrations.
    SubmodulesActive,
    /// Operation requires the controller to be disabled.
    ControllerEnabled,
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::DuplicateRegistration(id) => write!(f, "{id:?} is already registered"),
            ProtocolError::NotRegistered(id) => write!(f, "{id:?} is not registered"),
            ProtocolError::AlreadyEnabled => write!(f, "processor already enabled"),
            ProtocolError::NotEnabled => write!(f, "processor not enabled"),
            ProtocolError::SubmoduleInUse(id) => write!(f, "{id:?} already has a controller"),
            ProtocolError::SubmodulesActive => write!(f, "submodules still registered"),
            ProtocolError::ControllerEnabled => write!(f, "controller must be disabled"),
        }
    }
}

impl core::error::Error for ProtocolError {}

/// Self-clearing hardware bits that acknowledge a configuration commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitBit {
    /// `GAMMA_CTRL.gamma_update`
    Gamma,
    /// `AE_CTRL.ae_update`
    AeUpdate,
    /// `AF_CTRL0.af_manual_update`
    AfManualUpdate,
}

/// Errors returned by processor and controller operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IspError {
    /// Input rejected; no register was touched.
    Validation(ValidationError),
    /// Lifecycle or registration misuse; no register was touched.
    Protocol(ProtocolError),
    /// A commit bit did not clear within the poll budget.
    HardwareTimeout(CommitBit),
}

impl core::fmt::Display for IspError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IspError::Validation(e) => write!(f, "validation failed: {e}"),
            IspError::Protocol(e) => write!(f, "protocol error: {e}"),
            IspError::HardwareTimeout(bit) => {
                write!(f, "hardware did not acknowledge {bit:?} commit")
            }
        }
    }
}

impl core::error::Error for IspError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            IspError::Validation(e) => Some(e),
            IspError::Protocol(e) => Some(e),
            IspError::HardwareTimeout(_) => None,
        }
    }
}

impl From<ValidationError> for IspError {
    fn from(e: ValidationError) -> Self {
        IspError::Validation(e)
    }
}

impl From<ProtocolError> for IspError {
    fn from(e: ProtocolError) -> Self {
        IspError::Protocol(e)
    }
}
