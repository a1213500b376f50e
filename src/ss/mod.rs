//! State-Space Systems (Chapter SS)
//!
//! The unpartitioned realization `(A, B, C, D)` together with the time
//! domain it evolves in. Partitioned systems and every interconnection
//! routine hand their assembled matrices to [`StateSpace::new`], which is
//! the final shape check.

use std::fmt;

use ndarray::Array2;
use ndarray_linalg::{c64, Factorize, ReciprocalConditionNum, Solve};

use crate::error::{Result, SystemError};

/// Sample period of a discrete-time system.
///
/// Always finite and positive; the only way to obtain one is
/// [`TimeDomain::discrete`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleTime(f64);

impl SampleTime {
    /// Period in seconds.
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Time evolution of a system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeDomain {
    /// Continuous-time system: dx/dt = Ax + Bu
    Continuous,
    /// Discrete-time system: x(k+1) = Ax(k) + Bu(k)
    Discrete(SampleTime),
}

impl TimeDomain {
    /// Discrete time domain, rejecting non-positive or non-finite periods.
    pub fn discrete(dt: f64) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SystemError::InvalidSampleTime(dt));
        }
        Ok(TimeDomain::Discrete(SampleTime(dt)))
    }

    /// Sample period in seconds, `None` for continuous time.
    pub fn sample_time(&self) -> Option<f64> {
        match self {
            TimeDomain::Continuous => None,
            TimeDomain::Discrete(dt) => Some(dt.get()),
        }
    }

    /// True for a discrete-time domain.
    pub fn is_discrete(&self) -> bool {
        matches!(self, TimeDomain::Discrete(_))
    }
}

impl fmt::Display for TimeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeDomain::Continuous => write!(f, "continuous"),
            TimeDomain::Discrete(dt) => write!(f, "discrete (dt = {})", dt.get()),
        }
    }
}

/// Common time domain of a collection of systems.
///
/// Sample periods are compared exactly; no coercion between continuous and
/// discrete time is attempted. An empty collection is continuous.
///
/// # Examples
///
/// ```
/// use partitioned_ss::ss::{common_time_domain, TimeDomain};
///
/// let d = TimeDomain::discrete(0.1).unwrap();
/// assert_eq!(common_time_domain(&[d, d]).unwrap(), d);
/// assert!(common_time_domain(&[d, TimeDomain::Continuous]).is_err());
/// ```
pub fn common_time_domain(domains: &[TimeDomain]) -> Result<TimeDomain> {
    let first = match domains.first() {
        Some(t) => *t,
        None => return Ok(TimeDomain::Continuous),
    };
    for t in &domains[1..] {
        if *t != first {
            return Err(SystemError::IncompatibleTime {
                left: first,
                right: *t,
            });
        }
    }
    Ok(first)
}

/// Linear time-invariant system in state-space form
///
/// ```text
/// x' = A x + B u
/// y  = C x + D u
/// ```
///
/// with `n` states, `m` inputs and `p` outputs. Instances are validated on
/// construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSpace {
    a: Array2<f64>,
    b: Array2<f64>,
    c: Array2<f64>,
    d: Array2<f64>,
    time: TimeDomain,
}

impl StateSpace {
    /// Builds a realization after checking that the four matrices agree.
    ///
    /// # Errors
    ///
    /// `Shape` naming the first inconsistent pair: A must be square, B must
    /// have as many rows as A, C as many columns as A, and D must be `p×m`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::arr2;
    /// use partitioned_ss::ss::{StateSpace, TimeDomain};
    ///
    /// let sys = StateSpace::new(
    ///     arr2(&[[-1.0]]),
    ///     arr2(&[[1.0, 0.0]]),
    ///     arr2(&[[1.0]]),
    ///     arr2(&[[0.0, 0.0]]),
    ///     TimeDomain::Continuous,
    /// )
    /// .unwrap();
    /// assert_eq!((sys.nx(), sys.nu(), sys.ny()), (1, 2, 1));
    /// ```
    pub fn new(
        a: Array2<f64>,
        b: Array2<f64>,
        c: Array2<f64>,
        d: Array2<f64>,
        time: TimeDomain,
    ) -> Result<Self> {
        let n = a.nrows();

        if a.ncols() != n {
            return Err(SystemError::not_square("A", &a));
        }
        if b.nrows() != n {
            return Err(SystemError::shape("A", &a, "B", &b));
        }
        if c.ncols() != n {
            return Err(SystemError::shape("A", &a, "C", &c));
        }
        if d.nrows() != c.nrows() {
            return Err(SystemError::shape("C", &c, "D", &d));
        }
        if d.ncols() != b.ncols() {
            return Err(SystemError::shape("B", &b, "D", &d));
        }

        Ok(StateSpace { a, b, c, d, time })
    }

    /// Memoryless system `y = D u`.
    pub fn static_gain(d: Array2<f64>, time: TimeDomain) -> Result<Self> {
        let (p, m) = d.dim();
        StateSpace::new(
            Array2::zeros((0, 0)),
            Array2::zeros((0, m)),
            Array2::zeros((p, 0)),
            d,
            time,
        )
    }

    /// State matrix (`nx×nx`).
    pub fn a(&self) -> &Array2<f64> {
        &self.a
    }

    /// Input matrix (`nx×nu`).
    pub fn b(&self) -> &Array2<f64> {
        &self.b
    }

    /// Output matrix (`ny×nx`).
    pub fn c(&self) -> &Array2<f64> {
        &self.c
    }

    /// Feedthrough matrix (`ny×nu`).
    pub fn d(&self) -> &Array2<f64> {
        &self.d
    }

    /// Time domain the system evolves in.
    pub fn time_domain(&self) -> TimeDomain {
        self.time
    }

    /// Sample period, `None` for continuous-time systems.
    pub fn sample_time(&self) -> Option<f64> {
        self.time.sample_time()
    }

    /// True for a discrete-time system.
    pub fn is_discrete(&self) -> bool {
        self.time.is_discrete()
    }

    /// Number of states.
    pub fn nx(&self) -> usize {
        self.a.nrows()
    }

    /// Number of inputs.
    pub fn nu(&self) -> usize {
        self.b.ncols()
    }

    /// Number of outputs.
    pub fn ny(&self) -> usize {
        self.c.nrows()
    }

    /// Transfer matrix `G(s) = C (sI - A)^{-1} B + D` at a complex point.
    ///
    /// For discrete-time systems `s` is interpreted as the `z` variable.
    /// The resolvent is applied through an LU solve per input column.
    ///
    /// # Errors
    ///
    /// `Singular` if `s` is an eigenvalue of `A`.
    pub fn evaluate(&self, s: c64) -> Result<Array2<c64>> {
        let n = self.nx();
        let to_c = |v: &f64| c64::new(*v, 0.0);
        let mut g = self.d.map(to_c);
        if n == 0 {
            return Ok(g);
        }

        let mut pencil = self.a.map(|v| -c64::new(*v, 0.0));
        for i in 0..n {
            pencil[(i, i)] += s;
        }
        let lu = pencil
            .factorize()
            .map_err(|e| SystemError::Singular(format!("sI - A at s = {}: {}", s, e)))?;
        if !(lu.rcond()? > 0.0) {
            return Err(SystemError::Singular(format!("s = {} is a pole", s)));
        }

        let b = self.b.map(to_c);
        let c = self.c.map(to_c);
        let mut x = Array2::<c64>::zeros((n, self.nu()));
        for (j, col) in b.columns().into_iter().enumerate() {
            let xj = lu
                .solve(&col)
                .map_err(|e| SystemError::Singular(format!("sI - A at s = {}: {}", s, e)))?;
            x.column_mut(j).assign(&xj);
        }

        g += &c.dot(&x);
        Ok(g)
    }

    /// Frequency response at angular frequency `omega` (rad/s).
    ///
    /// Evaluates at `s = jω` for continuous-time systems and at
    /// `z = exp(jωΔt)` for discrete-time systems.
    pub fn frequency_response(&self, omega: f64) -> Result<Array2<c64>> {
        let point = match self.time {
            TimeDomain::Continuous => c64::new(0.0, omega),
            TimeDomain::Discrete(dt) => c64::new(0.0, omega * dt.get()).exp(),
        };
        self.evaluate(point)
    }
}

impl fmt::Display for StateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "A =\n{}", self.a)?;
        writeln!(f, "B =\n{}", self.b)?;
        writeln!(f, "C =\n{}", self.c)?;
        writeln!(f, "D =\n{}", self.d)?;
        write!(f, "{} system", self.time)
    }
}
