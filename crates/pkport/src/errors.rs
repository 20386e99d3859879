//! Error types for layout compilation, bit access, scheduling and porting.
//!
//! Everything here is a programmer or configuration error. Problems with the
//! *data* being ported never surface as errors: tag processing turns them into
//! [`crate::alert::Alert`]s instead.

use thiserror::Error;

use crate::{alert::AlertKind, scheduler::Phase};

/// Errors produced when compiling [crate::field::Field]s into a [crate::layout::Layout].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Bit width is 0 or wider than [crate::bits::MAX_FIELD_BITS].
    #[error("field `{0}` has an invalid bit width")]
    InvalidFieldSize(String),
    /// Array count is zero.
    #[error("array field `{0}` has a count of zero")]
    InvalidArrayCount(String),
    /// Array stride is smaller than the element width.
    #[error("array field `{0}` has a stride smaller than its element width")]
    InvalidArrayStride(String),
    /// Field name is empty.
    #[error("field names must not be empty")]
    InvalidFieldName,
    /// Two fields share a name.
    #[error("field `{0}` is declared twice")]
    DuplicateField(String),
    /// Field extends past the end of the layout.
    #[error("field `{0}` runs past the end of the layout")]
    OutOfLayout(String),
    /// Explicit bounds are inverted or not representable in the field width.
    #[error("field `{0}` declares bounds its width cannot hold")]
    InvalidBounds(String),
    /// Two non-aliased fields occupy overlapping bits.
    #[error("fields `{first}` and `{second}` overlap")]
    Overlap { first: String, second: String },
    /// A JSON layout description could not be read.
    #[error("invalid layout description: {0}")]
    InvalidDefinition(String),
}

/// Errors produced when reading or writing bits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Requested bit range is beyond the end of the data.
    #[error("bit range {bit_pos}..{end} is outside the buffer")]
    OutOfBounds { bit_pos: usize, end: usize },
    /// More than 128 bits were requested in a single access.
    #[error("cannot access {0} bits at once")]
    TooManyBits(usize),
    /// Value cannot be represented in the destination.
    #[error("value {value} is outside the representable range {min}..={max}")]
    OutOfRange { value: i128, min: i128, max: i128 },
    /// No field with this name exists in the layout.
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// Element index past the end of an array field.
    #[error("index {index} is out of bounds for field `{field}`")]
    IndexOutOfBounds { field: String, index: usize },
    /// Input data is shorter than the layout.
    #[error("buffer of {actual} bytes is shorter than the {expected} byte layout")]
    BufferTooShort { expected: usize, actual: usize },
}

/// Errors detected while building a [crate::scheduler::Schedule].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("operation `{0}` is registered twice")]
    DuplicateOperation(&'static str),
    #[error("operation `{operation}` requires unknown operation `{requires}`")]
    UnknownDependency {
        operation: &'static str,
        requires: &'static str,
    },
    /// A dependency lives in a phase that runs after the dependent operation.
    #[error("operation `{operation}` ({phase:?}) requires `{requires}` from a later phase")]
    LaterPhaseDependency {
        operation: &'static str,
        phase: Phase,
        requires: &'static str,
    },
    #[error("operations in {phase:?} form a dependency cycle through `{operation}`")]
    Cycle {
        phase: Phase,
        operation: &'static str,
    },
}

/// Errors produced while reading a semantic record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document root must be an object")]
    NotAnObject,
}

/// Umbrella error for a conversion run.
#[derive(Debug, Error)]
pub enum PortError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Record(#[from] RecordError),
    /// An alert constructor was handed a kind it does not describe.
    #[error("the `{tag}` alert does not support the {kind:?} alert kind")]
    UnsupportedAlert { tag: String, kind: AlertKind },
    /// Sub-tag names and values of a multi-value tag differ in length.
    #[error("tag `{tag}` has {names} sub-tag names but {values} values")]
    SubtagMismatch {
        tag: String,
        names: usize,
        values: usize,
    },
    /// An index tag resolved to a representation its slot cannot hold.
    #[error("tag `{0}` resolved to a representation its destination cannot store")]
    RepresentationMismatch(String),
    /// A default value is missing from the lookup it is supposed to come from.
    #[error("default `{default}` for tag `{tag}` is not in the lookup table")]
    UnresolvableDefault { tag: String, default: String },
    /// A resolver was created without any candidate.
    #[error("resolver `{0}` has no candidates")]
    NoCandidates(String),
    /// A resolver's choice list does not line up with its candidates.
    #[error("resolver `{tag}` offers {choices} choices for {candidates} candidates")]
    ChoiceMismatch {
        tag: String,
        choices: usize,
        candidates: usize,
    },
    /// A chosen index is not one of the offered candidates.
    #[error("choice {index} is out of range for `{tag}` ({len} candidates)")]
    InvalidChoice {
        tag: String,
        index: usize,
        len: usize,
    },
    /// No choice was supplied for a blocking resolver.
    #[error("no choice was made for `{0}`")]
    Unresolved(String),
    /// The source cannot be represented in the target format at all.
    #[error("cannot port: {0}")]
    CannotPort(String),
    /// A format-specific invariant failed.
    #[error("{0}")]
    Format(String),
    /// An operation failed; the rest of the pipeline was skipped.
    #[error("conversion aborted in `{operation}`: {source}")]
    Aborted {
        operation: &'static str,
        #[source]
        source: Box<PortError>,
    },
}

/// Type alias for Results using [PortError].
pub type PortResult<T> = Result<T, PortError>;
