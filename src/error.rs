//! Error types for snmp-mib.
//!
//! Two disjoint classes of failure exist:
//!
//! - [`Error`]: structural and resource errors (an identifier that does not fit,
//!   malformed input, a broken tree definition, a dead thread-sync peer). These
//!   are recoverable by the caller and never reach an SNMP client verbatim.
//! - [`MibError`]: the closed SNMP protocol vocabulary. Leaves and instance
//!   accessors return these, and the registry surfaces them unchanged as the
//!   response status (or, for the pseudo-errors, as an exception value inside
//!   a single varbind).
//!
//! All public enums are `#[non_exhaustive]` where new variants are plausible.

use crate::oid::Oid;

/// Result type alias using the library's structural [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for operations that fail with a protocol error.
pub type MibResult<T> = std::result::Result<T, MibError>;

/// Offset added to context-specific exception tags to form pseudo error codes.
pub const VARBIND_EXCEPTION_OFFSET: u8 = 0xF0;

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// Address conversion error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressErrorKind {
    /// Not enough arcs to hold the encoded address.
    Truncated { needed: usize, available: usize },
    /// A fixed-width encoding was given the wrong number of arcs.
    ArcCount { expected: usize, actual: usize },
    /// An address octet arc is larger than 255.
    OctetOutOfRange { position: usize, value: u32 },
    /// The port arc is larger than 65535.
    PortOutOfRange(u32),
    /// InetAddressType arc is not one of unknown(0), ipv4(1), ipv6(2).
    UnsupportedType(u32),
    /// The length arc does not match the address type.
    LengthMismatch { expected: u32, actual: u32 },
}

impl std::fmt::Display for AddressErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { needed, available } => {
                write!(f, "need {} arcs but only {} available", needed, available)
            }
            Self::ArcCount { expected, actual } => {
                write!(f, "expected {} arcs, got {}", expected, actual)
            }
            Self::OctetOutOfRange { position, value } => {
                write!(f, "arc {} value {} exceeds 255", position, value)
            }
            Self::PortOutOfRange(v) => write!(f, "port arc {} exceeds 65535", v),
            Self::UnsupportedType(t) => write!(f, "unsupported InetAddressType {}", t),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "address length arc {} does not match {}", actual, expected)
            }
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Protocol errors returned by leaves and instance accessors.
///
/// This is a closed vocabulary: every variant maps onto an RFC 3416 error
/// status except the two pseudo-errors, which only ever describe a single
/// varbind and are encoded as exception values in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum MibError {
    #[error("genErr")]
    GenErr,
    #[error("noAccess")]
    NoAccess,
    #[error("wrongType")]
    WrongType,
    #[error("wrongLength")]
    WrongLength,
    #[error("wrongEncoding")]
    WrongEncoding,
    #[error("wrongValue")]
    WrongValue,
    #[error("noCreation")]
    NoCreation,
    #[error("inconsistentValue")]
    InconsistentValue,
    #[error("resourceUnavailable")]
    ResourceUnavailable,
    #[error("commitFailed")]
    CommitFailed,
    #[error("undoFailed")]
    UndoFailed,
    #[error("notWritable")]
    NotWritable,
    #[error("inconsistentName")]
    InconsistentName,
    /// No leaf node is registered at the requested OID.
    #[error("noSuchObject")]
    NoSuchObject,
    /// The leaf exists but holds no instance at the requested OID.
    #[error("noSuchInstance")]
    NoSuchInstance,
}

impl MibError {
    /// Numeric code of this error.
    ///
    /// Protocol errors use their RFC 3416 status value; pseudo-errors use
    /// [`VARBIND_EXCEPTION_OFFSET`] plus the context-specific exception tag.
    pub fn code(&self) -> u8 {
        match self {
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::NoSuchObject => VARBIND_EXCEPTION_OFFSET,
            Self::NoSuchInstance => VARBIND_EXCEPTION_OFFSET + 1,
        }
    }

    /// Returns `true` for errors that describe a varbind rather than a request.
    pub fn is_pseudo(&self) -> bool {
        matches!(self, Self::NoSuchObject | Self::NoSuchInstance)
    }

    /// Convert to the response error status.
    ///
    /// Pseudo-errors have no status of their own. When one escapes into a
    /// whole-request context (a SET naming a missing object) it is reported
    /// the way RFC 3416 section 4.2.5 prescribes: `notWritable`.
    pub fn to_error_status(&self) -> ErrorStatus {
        match self {
            Self::GenErr => ErrorStatus::GenErr,
            Self::NoAccess => ErrorStatus::NoAccess,
            Self::WrongType => ErrorStatus::WrongType,
            Self::WrongLength => ErrorStatus::WrongLength,
            Self::WrongEncoding => ErrorStatus::WrongEncoding,
            Self::WrongValue => ErrorStatus::WrongValue,
            Self::NoCreation => ErrorStatus::NoCreation,
            Self::InconsistentValue => ErrorStatus::InconsistentValue,
            Self::ResourceUnavailable => ErrorStatus::ResourceUnavailable,
            Self::CommitFailed => ErrorStatus::CommitFailed,
            Self::UndoFailed => ErrorStatus::UndoFailed,
            Self::NotWritable | Self::NoSuchObject | Self::NoSuchInstance => {
                ErrorStatus::NotWritable
            }
            Self::InconsistentName => ErrorStatus::InconsistentName,
        }
    }

    /// SNMPv1 error status for this error (RFC 3584 section 4.4).
    pub fn to_v1_error_status(&self) -> ErrorStatus {
        match self {
            Self::WrongValue
            | Self::WrongEncoding
            | Self::WrongType
            | Self::WrongLength
            | Self::InconsistentValue => ErrorStatus::BadValue,
            Self::NoAccess
            | Self::NotWritable
            | Self::NoCreation
            | Self::InconsistentName
            | Self::NoSuchObject
            | Self::NoSuchInstance => ErrorStatus::NoSuchName,
            Self::GenErr
            | Self::ResourceUnavailable
            | Self::CommitFailed
            | Self::UndoFailed => ErrorStatus::GenErr,
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid OID format or length.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// Arcs do not encode a valid address.
    #[error("invalid address encoding: {kind}")]
    InvalidAddress { kind: AddressErrorKind },

    /// Two children of one tree node share an arc.
    #[error("duplicate child arc {arc} under tree node {parent}")]
    DuplicateArc { parent: u32, arc: u32 },

    /// Two MIBs were registered under the same base OID.
    #[error("MIB already registered at {base}")]
    DuplicateMib { base: Oid },

    /// The thread-sync worker side of a proxy leaf is gone.
    #[error("thread-sync worker disconnected")]
    SyncDisconnected,

    /// Non-increasing OID detected during walk (leaf misbehavior).
    ///
    /// Returned when a walk receives an OID that is not lexicographically
    /// greater than the previous one, which would otherwise loop forever.
    #[error("walk detected non-increasing OID: {previous} >= {current}")]
    NonIncreasingOid { previous: Oid, current: Oid },

    /// Reading one object failed during a walk.
    #[error(transparent)]
    VarBind(#[from] crate::varbind::VarBindError),
}

impl Error {
    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create an address conversion error.
    pub fn invalid_address(kind: AddressErrorKind) -> Self {
        Self::InvalidAddress { kind }
    }
}
