//! Error kinds shared by every zpoly crate.

/// Failure of a zpoly operation.
///
/// On any error every input is left as it was on entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// The allocator could not provide the requested memory.
    #[error("memory allocation failed")]
    AllocFailed,

    /// Zero divisor in a division, modular or GCD operation.
    #[error("division by zero")]
    DivisionByZero,

    /// Modulus below 2, or composite where a prime is required.
    #[error("invalid modulus")]
    ModulusInvalid,

    /// An inverse was requested but the GCD is not a unit.
    #[error("operands are not coprime")]
    NotCoprime,

    /// Packing parameters overflow the destination coefficient width.
    #[error("packed field does not fit the destination coefficient")]
    PackDoesNotFit,

    /// Narrowing would drop significant limbs.
    #[error("narrowing would lose significant bits")]
    TruncationLoses,

    /// A shift, reverse or fit parameter exceeds the addressable range.
    #[error("length exceeds the addressable range")]
    LengthOverflow,

    /// The Fermat ring has too few roots of unity for the transform depth.
    #[error("ring Z/(B^{n}+1) too small for a transform of depth {depth}")]
    RingTooSmall {
        /// Coefficient width in limbs.
        n: usize,
        /// Requested transform depth.
        depth: u32,
    },

    /// Textual input could not be parsed.
    #[error("invalid text: {0}")]
    InvalidText(String),
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, ErrorKind>;

impl From<std::collections::TryReserveError> for ErrorKind {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::AllocFailed
    }
}
