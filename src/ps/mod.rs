//! Partitioned State-Space Systems (Chapter PS)
//!
//! A [`PartitionedSystem`] wraps one [`StateSpace`] and splits its inputs
//! and outputs into two groups:
//!
//! ```text
//! x' = A  x + B1  w + B2  u
//! z  = C1 x + D11 w + D12 u
//! y  = C2 x + D21 w + D22 u
//! ```
//!
//! where `w`/`z` (partition 1) are the first `nu1` inputs and `ny1`
//! outputs, and `u`/`y` (partition 2) are the rest. The nine blocks are
//! views into the wrapped matrices and are never stored separately.

use std::fmt;

use ndarray::{s, Array2, ArrayView2};

use crate::error::{Result, SystemError};
use crate::mb::{hstack, vstack};
use crate::ss::{StateSpace, TimeDomain};

/// Owned block matrices of a partitioned system.
///
/// Used both as the input of [`PartitionedSystem::new`] and as the output
/// of [`PartitionedSystem::blocks`].
#[derive(Clone, Debug, PartialEq)]
pub struct Blocks {
    pub a: Array2<f64>,
    pub b1: Array2<f64>,
    pub b2: Array2<f64>,
    pub c1: Array2<f64>,
    pub c2: Array2<f64>,
    pub d11: Array2<f64>,
    pub d12: Array2<f64>,
    pub d21: Array2<f64>,
    pub d22: Array2<f64>,
}

/// State-space system with inputs and outputs split into two partitions.
///
/// Equality is structural: two systems are equal when their wrapped
/// matrices, time domains and partition sizes are exactly equal.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionedSystem {
    p: StateSpace,
    nu1: usize,
    ny1: usize,
}

impl PartitionedSystem {
    /// Builds a partitioned system from its nine blocks.
    ///
    /// With `nx = rows(A)`, `nw = cols(B1)`, `nu = cols(B2)`,
    /// `nz = rows(C1)` and `ny = rows(C2)`, the blocks must satisfy
    ///
    /// ```text
    /// A: nx×nx   B1: nx×nw    B2: nx×nu
    /// C1: nz×nx  D11: nz×nw   D12: nz×nu
    /// C2: ny×nx  D21: ny×nw   D22: ny×nu
    /// ```
    ///
    /// The result has `nu1 = nw` and `ny1 = nz`.
    ///
    /// # Errors
    ///
    /// `Shape` naming the first pair of blocks that disagree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::arr2;
    /// use partitioned_ss::ps::{Blocks, PartitionedSystem};
    /// use partitioned_ss::ss::TimeDomain;
    ///
    /// let sys = PartitionedSystem::new(
    ///     Blocks {
    ///         a: arr2(&[[-1.0]]),
    ///         b1: arr2(&[[1.0]]),
    ///         b2: arr2(&[[0.5, 0.0]]),
    ///         c1: arr2(&[[1.0]]),
    ///         c2: arr2(&[[2.0]]),
    ///         d11: arr2(&[[0.0]]),
    ///         d12: arr2(&[[0.0, 0.0]]),
    ///         d21: arr2(&[[0.0]]),
    ///         d22: arr2(&[[0.0, 1.0]]),
    ///     },
    ///     TimeDomain::Continuous,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!((sys.nu1(), sys.nu2()), (1, 2));
    /// assert_eq!((sys.ny1(), sys.ny2()), (1, 1));
    /// assert_eq!(sys.d22(), arr2(&[[0.0, 1.0]]));
    /// ```
    pub fn new(blocks: Blocks, time: TimeDomain) -> Result<Self> {
        let Blocks {
            a,
            b1,
            b2,
            c1,
            c2,
            d11,
            d12,
            d21,
            d22,
        } = blocks;

        let nx = a.nrows();
        let nw = b1.ncols();
        let nu = b2.ncols();
        let nz = c1.nrows();
        let ny = c2.nrows();

        if a.ncols() != nx {
            return Err(SystemError::not_square("A", &a));
        }

        let checks: [(bool, &'static str, &Array2<f64>, &'static str, &Array2<f64>); 12] = [
            (b1.nrows() == nx, "A", &a, "B1", &b1),
            (b2.nrows() == nx, "A", &a, "B2", &b2),
            (c1.ncols() == nx, "A", &a, "C1", &c1),
            (c2.ncols() == nx, "A", &a, "C2", &c2),
            (d11.ncols() == nw, "B1", &b1, "D11", &d11),
            (d21.ncols() == nw, "B1", &b1, "D21", &d21),
            (d12.ncols() == nu, "B2", &b2, "D12", &d12),
            (d22.ncols() == nu, "B2", &b2, "D22", &d22),
            (d11.nrows() == nz, "C1", &c1, "D11", &d11),
            (d12.nrows() == nz, "C1", &c1, "D12", &d12),
            (d21.nrows() == ny, "C2", &c2, "D21", &d21),
            (d22.nrows() == ny, "C2", &c2, "D22", &d22),
        ];
        if let Some((_, first, m1, second, m2)) = checks.iter().find(|check| !check.0) {
            return Err(SystemError::shape(*first, *m1, *second, *m2));
        }

        let b = hstack(&[b1.view(), b2.view()], &["B1", "B2"])?;
        let c = vstack(&[c1.view(), c2.view()], &["C1", "C2"])?;
        let d_top = hstack(&[d11.view(), d12.view()], &["D11", "D12"])?;
        let d_bottom = hstack(&[d21.view(), d22.view()], &["D21", "D22"])?;
        let d = vstack(&[d_top.view(), d_bottom.view()], &["D1*", "D2*"])?;

        let p = StateSpace::new(a, b, c, d, time)?;
        Ok(PartitionedSystem { p, nu1: nw, ny1: nz })
    }

    /// Wraps a realization with an explicit partition.
    ///
    /// # Errors
    ///
    /// `InvalidPartition` if `nu1` exceeds the input count or `ny1` the
    /// output count.
    pub fn from_state_space(p: StateSpace, nu1: usize, ny1: usize) -> Result<Self> {
        if nu1 > p.nu() || ny1 > p.ny() {
            return Err(SystemError::InvalidPartition {
                nu1,
                nu: p.nu(),
                ny1,
                ny: p.ny(),
            });
        }
        Ok(PartitionedSystem { p, nu1, ny1 })
    }

    /// The wrapped realization.
    pub fn state_space(&self) -> &StateSpace {
        &self.p
    }

    /// Unwraps the realization, dropping the partition.
    pub fn into_state_space(self) -> StateSpace {
        self.p
    }

    /// Time domain of the wrapped realization.
    pub fn time_domain(&self) -> TimeDomain {
        self.p.time_domain()
    }

    /// Sample period of the wrapped realization, `None` for continuous time.
    pub fn sample_time(&self) -> Option<f64> {
        self.p.sample_time()
    }

    /// Number of partition-1 inputs.
    pub fn nu1(&self) -> usize {
        self.nu1
    }

    /// Number of partition-1 outputs.
    pub fn ny1(&self) -> usize {
        self.ny1
    }

    /// Number of partition-2 inputs.
    pub fn nu2(&self) -> usize {
        self.p.nu() - self.nu1
    }

    /// Number of partition-2 outputs.
    pub fn ny2(&self) -> usize {
        self.p.ny() - self.ny1
    }

    /// State dimension.
    pub fn nx(&self) -> usize {
        self.p.nx()
    }

    /// Total input count, `nu1 + nu2`.
    pub fn nu(&self) -> usize {
        self.p.nu()
    }

    /// Total output count, `ny1 + ny2`.
    pub fn ny(&self) -> usize {
        self.p.ny()
    }

    /// State matrix A.
    pub fn a(&self) -> ArrayView2<'_, f64> {
        self.p.a().view()
    }

    /// Columns `0..nu1` of B.
    pub fn b1(&self) -> ArrayView2<'_, f64> {
        self.p.b().slice(s![.., ..self.nu1])
    }

    /// Columns `nu1..` of B.
    pub fn b2(&self) -> ArrayView2<'_, f64> {
        self.p.b().slice(s![.., self.nu1..])
    }

    /// Rows `0..ny1` of C.
    pub fn c1(&self) -> ArrayView2<'_, f64> {
        self.p.c().slice(s![..self.ny1, ..])
    }

    /// Rows `ny1..` of C.
    pub fn c2(&self) -> ArrayView2<'_, f64> {
        self.p.c().slice(s![self.ny1.., ..])
    }

    /// Partition-1 feedthrough, the top-left block of D.
    pub fn d11(&self) -> ArrayView2<'_, f64> {
        self.p.d().slice(s![..self.ny1, ..self.nu1])
    }

    /// Top-right block of D.
    pub fn d12(&self) -> ArrayView2<'_, f64> {
        self.p.d().slice(s![..self.ny1, self.nu1..])
    }

    /// Bottom-left block of D.
    pub fn d21(&self) -> ArrayView2<'_, f64> {
        self.p.d().slice(s![self.ny1.., ..self.nu1])
    }

    /// Partition-2 feedthrough, the bottom-right block of D.
    pub fn d22(&self) -> ArrayView2<'_, f64> {
        self.p.d().slice(s![self.ny1.., self.nu1..])
    }

    /// Owned copies of the nine blocks; `PartitionedSystem::new` applied to
    /// the result rebuilds an equal system.
    pub fn blocks(&self) -> Blocks {
        Blocks {
            a: self.a().to_owned(),
            b1: self.b1().to_owned(),
            b2: self.b2().to_owned(),
            c1: self.c1().to_owned(),
            c2: self.c2().to_owned(),
            d11: self.d11().to_owned(),
            d12: self.d12().to_owned(),
            d21: self.d21().to_owned(),
            d22: self.d22().to_owned(),
        }
    }
}

/// Lifts a plain realization with every channel in partition 1.
impl From<StateSpace> for PartitionedSystem {
    fn from(p: StateSpace) -> Self {
        let (nu1, ny1) = (p.nu(), p.ny());
        PartitionedSystem { p, nu1, ny1 }
    }
}

impl fmt::Display for PartitionedSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "PartitionedSystem: nx = {}, nu1 = {}, nu2 = {}, ny1 = {}, ny2 = {}",
            self.nx(),
            self.nu1,
            self.nu2(),
            self.ny1,
            self.ny2()
        )?;
        write!(f, "{}", self.p)
    }
}
