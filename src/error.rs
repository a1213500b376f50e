//! Error type shared by all routines in this crate.

use ndarray_linalg::error::LinalgError;
use thiserror::Error;

use crate::ss::TimeDomain;

/// Row/column count of a matrix, printed as `rows×cols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dims(pub usize, pub usize);

impl Dims {
    pub fn of<S, A>(m: &ndarray::ArrayBase<S, ndarray::Ix2>) -> Self
    where
        S: ndarray::Data<Elem = A>,
    {
        Dims(m.nrows(), m.ncols())
    }
}

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.0, self.1)
    }
}

/// Errors raised while building or interconnecting state-space systems.
///
/// Every variant indicates a modeling or usage error rather than a
/// transient condition, so callers are expected to propagate them.
#[derive(Error, Debug)]
pub enum SystemError {
    /// Two blocks have mutually inconsistent row/column counts.
    #[error("shape mismatch: {first} is {first_shape} but {second} is {second_shape}")]
    Shape {
        first: &'static str,
        first_shape: Dims,
        second: &'static str,
        second_shape: Dims,
    },

    /// A matrix that must be square is not.
    #[error("{what} must be square but is {shape}")]
    NotSquare { what: &'static str, shape: Dims },

    /// Operands evolve in incompatible time domains.
    #[error("incompatible time domains: {left} and {right}")]
    IncompatibleTime { left: TimeDomain, right: TimeDomain },

    /// Concatenated/summed operands disagree on a partition size.
    #[error("operand {operand} has {what} = {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        operand: usize,
        expected: usize,
        found: usize,
    },

    /// Requested partition does not fit the wrapped system.
    #[error("invalid partition: nu1 = {nu1} (of {nu} inputs), ny1 = {ny1} (of {ny} outputs)")]
    InvalidPartition {
        nu1: usize,
        nu: usize,
        ny1: usize,
        ny: usize,
    },

    /// Discrete-time sample period must be positive and finite.
    #[error("invalid sample time: {0}")]
    InvalidSampleTime(f64),

    /// A concatenation was requested over zero operands.
    #[error("concatenation requires at least one system")]
    EmptyConcatenation,

    /// The algebraic loop of a feedback interconnection is not solvable.
    #[error("feedback loop is singular: I + D11 products are not invertible")]
    SingularLoop,

    /// The algebraic loop is solvable but worse conditioned than requested.
    #[error("feedback loop is ill-conditioned: rcond = {rcond:e} < tol = {tol:e}")]
    IllConditionedLoop { rcond: f64, tol: f64 },

    /// A linear solve outside of a feedback loop hit a singular matrix.
    #[error("singular matrix: {0}")]
    Singular(String),

    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

impl SystemError {
    /// Shape mismatch between two named blocks.
    pub(crate) fn shape<S1, S2, A>(
        first: &'static str,
        a: &ndarray::ArrayBase<S1, ndarray::Ix2>,
        second: &'static str,
        b: &ndarray::ArrayBase<S2, ndarray::Ix2>,
    ) -> Self
    where
        S1: ndarray::Data<Elem = A>,
        S2: ndarray::Data<Elem = A>,
    {
        SystemError::Shape {
            first,
            first_shape: Dims::of(a),
            second,
            second_shape: Dims::of(b),
        }
    }

    pub(crate) fn not_square<S, A>(
        what: &'static str,
        m: &ndarray::ArrayBase<S, ndarray::Ix2>,
    ) -> Self
    where
        S: ndarray::Data<Elem = A>,
    {
        SystemError::NotSquare {
            what,
            shape: Dims::of(m),
        }
    }
}

pub type Result<T> = std::result::Result<T, SystemError>;
