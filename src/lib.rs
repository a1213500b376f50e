//! partitioned-ss: two-partition state-space systems and their interconnections
//!
//! A partitioned system splits the inputs and outputs of a linear
//! time-invariant state-space realization into two groups, typically
//! "disturbance/performance" (partition 1) and "control/measurement"
//! (partition 2) channels of a robust-control interconnection diagram.
//! This crate provides the algebra that combines such systems while
//! keeping the partition bookkeeping consistent.
//!
//! # Organization
//!
//! The library is organized into chapter modules:
//! - `mb`: Basic block-matrix routines (direct sum, stacking, LU solves)
//! - `ss`: Unpartitioned state-space systems and time domains
//! - `ps`: Partitioned systems (construction, block views, lifting)
//! - `ab`: Interconnections (parallel, series, feedback, concatenation)
//!
//! # Example
//!
//! ```
//! use ndarray::arr2;
//! use partitioned_ss::ab::feedback;
//! use partitioned_ss::ps::PartitionedSystem;
//! use partitioned_ss::ss::{StateSpace, TimeDomain};
//!
//! let plant = StateSpace::new(
//!     arr2(&[[-1.0]]),
//!     arr2(&[[1.0]]),
//!     arr2(&[[1.0]]),
//!     arr2(&[[0.0]]),
//!     TimeDomain::Continuous,
//! )
//! .unwrap();
//! let gain = StateSpace::static_gain(arr2(&[[4.0]]), TimeDomain::Continuous).unwrap();
//!
//! let closed = feedback(&plant.into(), &gain.into()).unwrap();
//! assert_eq!(closed.a(), arr2(&[[-5.0]]));
//! ```

pub mod ab;
pub mod error;
pub mod mb;
pub mod ps;
pub mod ss;

pub use error::SystemError;
pub use ps::{Blocks, PartitionedSystem};
pub use ss::{StateSpace, TimeDomain};
