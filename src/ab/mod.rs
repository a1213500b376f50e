//! Analysis Routines - Interconnections (Chapter AB)
//!
//! Interconnection of partitioned state-space systems: parallel sum,
//! series (cascade) product, feedback closure over partition 1, and
//! concatenation over a shared partition-1 input or output.
//!
//! Every routine only reads its operands, assembles the nine blocks of the
//! result, and hands them to [`PartitionedSystem::new`] for the final
//! shape check. Operands of binary and variadic routines must share a time
//! domain.

use std::ops::{Add, Mul};

use ndarray::{s, Array2, ArrayView2};

use crate::error::{Result, SystemError};
use crate::mb::{block_diag, block_matrix, hstack, solve_left, vstack};
use crate::ps::{Blocks, PartitionedSystem};
use crate::ss::common_time_domain;

/// Parallel interconnection of two partitioned systems
///
/// Both systems are driven by the same partition-1 input `w` and their
/// partition-1 outputs are summed. Partition-2 channels stay separate and
/// the states do not interact:
///
/// ```text
/// A   = diag(A1, A2)      B1  = [B1_1; B1_2]       B2  = diag(B2_1, B2_2)
/// C1  = [C1_1  C1_2]      D11 = D11_1 + D11_2      D12 = [D12_1  D12_2]
/// C2  = diag(C2_1, C2_2)  D21 = [D21_1; D21_2]     D22 = diag(D22_1, D22_2)
/// ```
///
/// # Errors
///
/// * `IncompatibleTime` if the time domains differ
/// * `DimensionMismatch` if the systems disagree on `nu1` or `ny1`
///
/// # Examples
///
/// ```
/// use ndarray::arr2;
/// use partitioned_ss::ab::parallel;
/// use partitioned_ss::ps::PartitionedSystem;
/// use partitioned_ss::ss::{StateSpace, TimeDomain};
///
/// let g = StateSpace::new(
///     arr2(&[[-1.0]]),
///     arr2(&[[1.0]]),
///     arr2(&[[1.0]]),
///     arr2(&[[0.5]]),
///     TimeDomain::Continuous,
/// )
/// .unwrap();
/// let s = PartitionedSystem::from(g);
///
/// let sum = parallel(&s, &s).unwrap();
/// assert_eq!(sum.nx(), 2);
/// assert_eq!(sum.d11(), arr2(&[[1.0]]));
/// ```
pub fn parallel(s1: &PartitionedSystem, s2: &PartitionedSystem) -> Result<PartitionedSystem> {
    let time = common_time_domain(&[s1.time_domain(), s2.time_domain()])?;

    check_partition("nu1", 1, s1.nu1(), s2.nu1())?;
    check_partition("ny1", 1, s1.ny1(), s2.ny1())?;

    let blocks = Blocks {
        a: block_diag(&[s1.a(), s2.a()]),
        b1: vstack(&[s1.b1(), s2.b1()], &["s1.B1", "s2.B1"])?,
        b2: block_diag(&[s1.b2(), s2.b2()]),
        c1: hstack(&[s1.c1(), s2.c1()], &["s1.C1", "s2.C1"])?,
        c2: block_diag(&[s1.c2(), s2.c2()]),
        d11: &s1.d11() + &s2.d11(),
        d12: hstack(&[s1.d12(), s2.d12()], &["s1.D12", "s2.D12"])?,
        d21: vstack(&[s1.d21(), s2.d21()], &["s1.D21", "s2.D21"])?,
        d22: block_diag(&[s1.d22(), s2.d22()]),
    };

    let sys = PartitionedSystem::new(blocks, time)?;
    log::debug!(
        "parallel: nx {} + {} -> {}, nu1 = {}, ny1 = {}",
        s1.nx(),
        s2.nx(),
        sys.nx(),
        sys.nu1(),
        sys.ny1()
    );
    Ok(sys)
}

/// Series interconnection: the partition-1 output of `s2` drives the
/// partition-1 input of `s1`
///
/// The states are cascaded as `x = [x1; x2]`; the external inputs are
/// `[w2; u1; u2]` and the external outputs `[z1; y1; y2]`:
///
/// ```text
/// A = [A1   B1_1 C1_2]     B = [B1_1 D11_2   B2_1   B1_1 D12_2]
///     [0    A2       ]         [B1_2         0      B2_2      ]
///
/// C = [C1_1   D11_1 C1_2]  D = [D11_1 D11_2   D12_1   D11_1 D12_2]
///     [C2_1   D21_1 C1_2]      [D21_1 D11_2   D22_1   D21_1 D12_2]
///     [0      C2_2      ]      [D21_2         0       D22_2      ]
/// ```
///
/// The result has `nu1 = s2.nu1` and `ny1 = s1.ny1`. No algebraic loop is
/// formed, so no linear solve is needed.
///
/// # Errors
///
/// * `IncompatibleTime` if the time domains differ
/// * `Shape` if `s1.nu1 != s2.ny1`
pub fn series(s1: &PartitionedSystem, s2: &PartitionedSystem) -> Result<PartitionedSystem> {
    let time = common_time_domain(&[s1.time_domain(), s2.time_domain()])?;

    if s1.nu1() != s2.ny1() {
        return Err(SystemError::shape("s1.B1", &s1.b1(), "s2.C1", &s2.c1()));
    }

    let (n1, n2) = (s1.nx(), s2.nx());

    let b1c1 = s1.b1().dot(&s2.c1());
    let b1d12 = s1.b1().dot(&s2.d12());
    let d11c1 = s1.d11().dot(&s2.c1());
    let d21c1 = s1.d21().dot(&s2.c1());
    let d11d12 = s1.d11().dot(&s2.d12());
    let d21d12 = s1.d21().dot(&s2.d12());

    let blocks = Blocks {
        a: block_matrix(&[
            &[s1.a(), b1c1.view()],
            &[Array2::<f64>::zeros((n2, n1)).view(), s2.a()],
        ])?,
        b1: vstack(
            &[s1.b1().dot(&s2.d11()).view(), s2.b1()],
            &["s1.B1*s2.D11", "s2.B1"],
        )?,
        b2: block_matrix(&[
            &[s1.b2(), b1d12.view()],
            &[Array2::<f64>::zeros((n2, s1.nu2())).view(), s2.b2()],
        ])?,
        c1: hstack(&[s1.c1(), d11c1.view()], &["s1.C1", "s1.D11*s2.C1"])?,
        c2: block_matrix(&[
            &[s1.c2(), d21c1.view()],
            &[Array2::<f64>::zeros((s2.ny2(), n1)).view(), s2.c2()],
        ])?,
        d11: s1.d11().dot(&s2.d11()),
        d12: hstack(&[s1.d12(), d11d12.view()], &["s1.D12", "s1.D11*s2.D12"])?,
        d21: vstack(
            &[s1.d21().dot(&s2.d11()).view(), s2.d21()],
            &["s1.D21*s2.D11", "s2.D21"],
        )?,
        d22: block_matrix(&[
            &[s1.d22(), d21d12.view()],
            &[Array2::<f64>::zeros((s2.ny2(), s1.nu2())).view(), s2.d22()],
        ])?,
    };

    let sys = PartitionedSystem::new(blocks, time)?;
    log::debug!(
        "series: nx {} + {} -> {}, nu1 = {}, ny1 = {}",
        n1,
        n2,
        sys.nx(),
        sys.nu1(),
        sys.ny1()
    );
    Ok(sys)
}

/// Feedback interconnection over partition 1 without a conditioning check.
///
/// Equivalent to [`feedback_with_tol`] with `tol = None`.
pub fn feedback(s1: &PartitionedSystem, s2: &PartitionedSystem) -> Result<PartitionedSystem> {
    feedback_with_tol(s1, s2, None)
}

/// Feedback interconnection over partition 1
///
/// Closes the loop
///
/// ```text
/// w1 = r - z2
/// w2 = z1
/// ```
///
/// so that `s2` sits in the negative feedback path of `s1`. The partition-2
/// channels of both systems stay external. The closed loop has inputs
/// `[r; u1; u2]`, outputs `[z1; y1; y2]` and state `[x1; x2]`; its
/// partition-1 ports are `r` (width `s1.nu1`) and `z1` (height `s1.ny1`).
///
/// # Arguments
///
/// * `s1` - Forward-path system
/// * `s2` - Feedback-path system; requires `s2.ny1 == s1.nu1` and
///   `s2.nu1 == s1.ny1`
/// * `tol` - Optional lower bound on the reciprocal condition number of the
///   loop matrices. If None, only an exactly singular loop is rejected
///
/// # Algorithm
///
/// With `D1 = D11_1` and `D2 = D11_2`, the instantaneous loop signals are
///
/// ```text
/// w1 = X11 x + X12 [r; u1; u2]    (I + D2 D1) [X11 X12] = [-D2 C1_1  -C1_2 | I  -D2 D12_1  -D12_2]
/// w2 = X21 x + X22 [r; u1; u2]    (I + D1 D2) [X21 X22] = [C1_1  -D1 C1_2 | D1  D12_1  -D1 D12_2]
/// ```
///
/// Each loop matrix is LU-factorized once and solved for all right-hand
/// sides; its inverse is never formed. The closed loop is then
///
/// ```text
/// A = diag(A1, A2) + [B1_1 X11; B1_2 X21]
/// B = [B1_1 X12; B1_2 X22] + [0  diag(B2_1, B2_2)]
/// C = [D1 X11; D21_1 X11; D21_2 X21] + [C1_1 0; diag(C2_1, C2_2)]
/// D = [D1 X12; D21_1 X12; D21_2 X22] + [0  D12_1  0; 0  diag(D22_1, D22_2)]
/// ```
///
/// Only `z1` is exposed as the partition-1 output; `z2` is internal to the
/// loop.
///
/// # Errors
///
/// * `IncompatibleTime` if the time domains differ
/// * `Shape` if the partition-1 ports of the two systems do not match
/// * `SingularLoop` if `I + D2 D1` is exactly singular (the loop is not
///   well posed)
/// * `IllConditionedLoop` if `tol` is given and a loop matrix has a
///   reciprocal condition number below it
///
/// Without `tol`, a nearly singular loop is solved anyway and a warning is
/// logged; the result may then be inaccurate.
///
/// # Examples
///
/// ```
/// use ndarray::arr2;
/// use partitioned_ss::ab::feedback;
/// use partitioned_ss::ps::PartitionedSystem;
/// use partitioned_ss::ss::{StateSpace, TimeDomain};
///
/// // Integrator 1/s with unity negative feedback gives 1/(s + 1)
/// let plant = StateSpace::new(
///     arr2(&[[0.0]]),
///     arr2(&[[1.0]]),
///     arr2(&[[1.0]]),
///     arr2(&[[0.0]]),
///     TimeDomain::Continuous,
/// )
/// .unwrap();
/// let unity = StateSpace::static_gain(arr2(&[[1.0]]), TimeDomain::Continuous).unwrap();
///
/// let cl = feedback(&plant.into(), &unity.into()).unwrap();
/// assert_eq!(cl.a(), arr2(&[[-1.0]]));
/// ```
pub fn feedback_with_tol(
    s1: &PartitionedSystem,
    s2: &PartitionedSystem,
    tol: Option<f64>,
) -> Result<PartitionedSystem> {
    let time = common_time_domain(&[s1.time_domain(), s2.time_domain()])?;

    if s1.nu1() != s2.ny1() {
        return Err(SystemError::shape("s1.B1", &s1.b1(), "s2.C1", &s2.c1()));
    }
    if s1.ny1() != s2.nu1() {
        return Err(SystemError::shape("s1.C1", &s1.c1(), "s2.B1", &s2.b1()));
    }

    let (n1, n2) = (s1.nx(), s2.nx());
    let n = n1 + n2;
    let nr = s1.nu1();
    let d1 = s1.d11();
    let d2 = s2.d11();

    // Loop matrices I + D2 D1 (nr×nr) and I + D1 D2 (ny1×ny1)
    let m21 = Array2::<f64>::eye(nr) + d2.dot(&d1);
    let m12 = Array2::<f64>::eye(s1.ny1()) + d1.dot(&d2);

    let rhs1 = hstack(
        &[
            (-d2.dot(&s1.c1())).view(),
            (-&s2.c1()).view(),
            Array2::<f64>::eye(nr).view(),
            (-d2.dot(&s1.d12())).view(),
            (-&s2.d12()).view(),
        ],
        &["s2.D11*s1.C1", "s2.C1", "I", "s2.D11*s1.D12", "s2.D12"],
    )?;
    let neg_d1_c2 = -d1.dot(&s2.c1());
    let neg_d1_d12 = -d1.dot(&s2.d12());
    let rhs2 = hstack(
        &[
            s1.c1(),
            neg_d1_c2.view(),
            d1,
            s1.d12(),
            neg_d1_d12.view(),
        ],
        &["s1.C1", "s1.D11*s2.C1", "s1.D11", "s1.D12", "s1.D11*s2.D12"],
    )?;

    let (x1, rcond1) = solve_left(&m21.view(), &rhs1.view()).map_err(loop_error)?;
    let (x2, rcond2) = solve_left(&m12.view(), &rhs2.view()).map_err(loop_error)?;

    let rcond = rcond1.min(rcond2);
    if let Some(tol) = tol {
        if rcond < tol {
            return Err(SystemError::IllConditionedLoop { rcond, tol });
        }
    }
    if rcond < f64::EPSILON.sqrt() {
        log::warn!(
            "feedback: algebraic loop is nearly singular (rcond = {:e}); result may be inaccurate",
            rcond
        );
    }

    let x11 = x1.slice(s![.., ..n]);
    let x12 = x1.slice(s![.., n..n + nr]);
    let x12u = x1.slice(s![.., n + nr..]);
    let x21 = x2.slice(s![.., ..n]);
    let x22 = x2.slice(s![.., n..n + nr]);
    let x22u = x2.slice(s![.., n + nr..]);

    let a = block_diag(&[s1.a(), s2.a()])
        + vstack(
            &[s1.b1().dot(&x11).view(), s2.b1().dot(&x21).view()],
            &["s1.B1*X11", "s2.B1*X21"],
        )?;

    let b1 = vstack(
        &[s1.b1().dot(&x12).view(), s2.b1().dot(&x22).view()],
        &["s1.B1*X12", "s2.B1*X22"],
    )?;
    let b2 = block_diag(&[s1.b2(), s2.b2()])
        + vstack(
            &[s1.b1().dot(&x12u).view(), s2.b1().dot(&x22u).view()],
            &["s1.B1*X12", "s2.B1*X22"],
        )?;

    let c1 = d1.dot(&x11)
        + hstack(
            &[s1.c1(), Array2::<f64>::zeros((s1.ny1(), n2)).view()],
            &["s1.C1", "0"],
        )?;
    let c2 = block_diag(&[s1.c2(), s2.c2()])
        + vstack(
            &[s1.d21().dot(&x11).view(), s2.d21().dot(&x21).view()],
            &["s1.D21*X11", "s2.D21*X21"],
        )?;

    let d11 = d1.dot(&x12);
    let d12 = d1.dot(&x12u)
        + hstack(
            &[s1.d12(), Array2::<f64>::zeros((s1.ny1(), s2.nu2())).view()],
            &["s1.D12", "0"],
        )?;
    let d21 = vstack(
        &[s1.d21().dot(&x12).view(), s2.d21().dot(&x22).view()],
        &["s1.D21*X12", "s2.D21*X22"],
    )?;
    let d22 = block_diag(&[s1.d22(), s2.d22()])
        + vstack(
            &[s1.d21().dot(&x12u).view(), s2.d21().dot(&x22u).view()],
            &["s1.D21*X12", "s2.D21*X22"],
        )?;

    let blocks = Blocks {
        a,
        b1,
        b2,
        c1,
        c2,
        d11,
        d12,
        d21,
        d22,
    };

    let sys = PartitionedSystem::new(blocks, time)?;
    log::debug!(
        "feedback: nx {} + {} -> {}, nu1 = {}, ny1 = {}, rcond = {:e}",
        n1,
        n2,
        sys.nx(),
        sys.nu1(),
        sys.ny1(),
        rcond
    );
    Ok(sys)
}

/// Concatenation over a shared partition-1 input
///
/// All systems are driven by the same `w`; their partition-1 outputs are
/// stacked, and each keeps its own partition-2 input and output:
///
/// ```text
/// A, B2, C1, C2, D12, D22   block diagonal over the operands
/// B1, D11, D21              stacked vertically
/// ```
///
/// The result has the shared `nu1` and `ny1 = Σ ny1_i`.
///
/// # Errors
///
/// * `EmptyConcatenation` for an empty slice
/// * `DimensionMismatch` naming the first operand whose `nu1` differs
///   from the first operand's
/// * `IncompatibleTime` if the time domains differ
pub fn vcat_1(systems: &[PartitionedSystem]) -> Result<PartitionedSystem> {
    let first = systems.first().ok_or(SystemError::EmptyConcatenation)?;
    let nu1 = first.nu1();

    for (i, sys) in systems.iter().enumerate() {
        log::trace!(
            "vcat_1: operand {} nx = {}, nu1 = {}, ny1 = {}",
            i,
            sys.nx(),
            sys.nu1(),
            sys.ny1()
        );
        check_partition("nu1", i, nu1, sys.nu1())?;
    }
    let time = common_time_domain(&systems.iter().map(|s| s.time_domain()).collect::<Vec<_>>())?;

    let k = systems.len();
    let blocks = Blocks {
        a: block_diag(&collect(systems, PartitionedSystem::a)),
        b1: vstack(&collect(systems, PartitionedSystem::b1), &vec!["B1"; k])?,
        b2: block_diag(&collect(systems, PartitionedSystem::b2)),
        c1: block_diag(&collect(systems, PartitionedSystem::c1)),
        c2: block_diag(&collect(systems, PartitionedSystem::c2)),
        d11: vstack(&collect(systems, PartitionedSystem::d11), &vec!["D11"; k])?,
        d12: block_diag(&collect(systems, PartitionedSystem::d12)),
        d21: vstack(&collect(systems, PartitionedSystem::d21), &vec!["D21"; k])?,
        d22: block_diag(&collect(systems, PartitionedSystem::d22)),
    };

    let sys = PartitionedSystem::new(blocks, time)?;
    log::debug!(
        "vcat_1: {} systems -> nx = {}, nu1 = {}, ny1 = {}",
        k,
        sys.nx(),
        sys.nu1(),
        sys.ny1()
    );
    Ok(sys)
}

/// Concatenation over a shared partition-1 output
///
/// The partition-1 outputs of all systems are summed into one `z`; each
/// system keeps its own partition-1 input and its own partition-2 input
/// and output:
///
/// ```text
/// A, B1, B2, C2, D21, D22   block diagonal over the operands
/// C1, D11, D12              stacked horizontally
/// ```
///
/// The result has the shared `ny1` and `nu1 = Σ nu1_i`.
///
/// # Errors
///
/// * `EmptyConcatenation` for an empty slice
/// * `DimensionMismatch` naming the first operand whose `ny1` differs
///   from the first operand's
/// * `IncompatibleTime` if the time domains differ
pub fn hcat_1(systems: &[PartitionedSystem]) -> Result<PartitionedSystem> {
    let first = systems.first().ok_or(SystemError::EmptyConcatenation)?;
    let ny1 = first.ny1();

    for (i, sys) in systems.iter().enumerate() {
        log::trace!(
            "hcat_1: operand {} nx = {}, nu1 = {}, ny1 = {}",
            i,
            sys.nx(),
            sys.nu1(),
            sys.ny1()
        );
        check_partition("ny1", i, ny1, sys.ny1())?;
    }
    let time = common_time_domain(&systems.iter().map(|s| s.time_domain()).collect::<Vec<_>>())?;

    let k = systems.len();
    let blocks = Blocks {
        a: block_diag(&collect(systems, PartitionedSystem::a)),
        b1: block_diag(&collect(systems, PartitionedSystem::b1)),
        b2: block_diag(&collect(systems, PartitionedSystem::b2)),
        c1: hstack(&collect(systems, PartitionedSystem::c1), &vec!["C1"; k])?,
        c2: block_diag(&collect(systems, PartitionedSystem::c2)),
        d11: hstack(&collect(systems, PartitionedSystem::d11), &vec!["D11"; k])?,
        d12: hstack(&collect(systems, PartitionedSystem::d12), &vec!["D12"; k])?,
        d21: block_diag(&collect(systems, PartitionedSystem::d21)),
        d22: block_diag(&collect(systems, PartitionedSystem::d22)),
    };

    let sys = PartitionedSystem::new(blocks, time)?;
    log::debug!(
        "hcat_1: {} systems -> nx = {}, nu1 = {}, ny1 = {}",
        k,
        sys.nx(),
        sys.nu1(),
        sys.ny1()
    );
    Ok(sys)
}

impl Add for &PartitionedSystem {
    type Output = Result<PartitionedSystem>;

    fn add(self, rhs: Self) -> Self::Output {
        parallel(self, rhs)
    }
}

impl Mul for &PartitionedSystem {
    type Output = Result<PartitionedSystem>;

    fn mul(self, rhs: Self) -> Self::Output {
        series(self, rhs)
    }
}

fn check_partition(
    what: &'static str,
    operand: usize,
    expected: usize,
    found: usize,
) -> Result<()> {
    if expected != found {
        return Err(SystemError::DimensionMismatch {
            what,
            operand,
            expected,
            found,
        });
    }
    Ok(())
}

fn collect<'a>(
    systems: &'a [PartitionedSystem],
    block: fn(&'a PartitionedSystem) -> ArrayView2<'a, f64>,
) -> Vec<ArrayView2<'a, f64>> {
    systems.iter().map(block).collect()
}

fn loop_error(err: SystemError) -> SystemError {
    match err {
        SystemError::Singular(_) => SystemError::SingularLoop,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ss::{StateSpace, TimeDomain};
    use approx::assert_relative_eq;
    use ndarray::arr2;

    fn assert_matrix_eq(actual: ArrayView2<f64>, expected: &Array2<f64>) {
        assert_eq!(actual.dim(), expected.dim(), "dimension mismatch");
        for ((i, j), v) in expected.indexed_iter() {
            assert!(
                (actual[(i, j)] - v).abs() < 1e-10,
                "[{}, {}] = {} != {} (expected)",
                i,
                j,
                actual[(i, j)],
                v
            );
        }
    }

    /// One state, one channel in each partition, every block distinct.
    fn siso_pair(seed: f64) -> PartitionedSystem {
        PartitionedSystem::new(
            Blocks {
                a: arr2(&[[-seed]]),
                b1: arr2(&[[1.0]]),
                b2: arr2(&[[seed + 1.0]]),
                c1: arr2(&[[2.0]]),
                c2: arr2(&[[seed + 2.0]]),
                d11: arr2(&[[0.0]]),
                d12: arr2(&[[0.5]]),
                d21: arr2(&[[0.25]]),
                d22: arr2(&[[seed]]),
            },
            TimeDomain::Continuous,
        )
        .unwrap()
    }

    #[test]
    fn test_parallel_blocks() {
        let s1 = siso_pair(1.0);
        let s2 = siso_pair(3.0);
        let sum = parallel(&s1, &s2).unwrap();

        assert_eq!(sum.nx(), 2);
        assert_eq!(sum.nu1(), 1);
        assert_eq!(sum.ny1(), 1);
        assert_eq!(sum.nu2(), 2);
        assert_eq!(sum.ny2(), 2);

        assert_matrix_eq(sum.a(), &arr2(&[[-1.0, 0.0], [0.0, -3.0]]));
        assert_matrix_eq(sum.b1(), &arr2(&[[1.0], [1.0]]));
        assert_matrix_eq(sum.b2(), &arr2(&[[2.0, 0.0], [0.0, 4.0]]));
        assert_matrix_eq(sum.c1(), &arr2(&[[2.0, 2.0]]));
        assert_matrix_eq(sum.c2(), &arr2(&[[3.0, 0.0], [0.0, 5.0]]));
        assert_matrix_eq(sum.d12(), &arr2(&[[0.5, 0.5]]));
        assert_matrix_eq(sum.d21(), &arr2(&[[0.25], [0.25]]));
        assert_matrix_eq(sum.d22(), &arr2(&[[1.0, 0.0], [0.0, 3.0]]));
    }

    #[test]
    fn test_parallel_operator_matches_function() {
        let s1 = siso_pair(1.0);
        let s2 = siso_pair(2.0);
        assert_eq!((&s1 + &s2).unwrap(), parallel(&s1, &s2).unwrap());
        assert_eq!((&s1 * &s2).unwrap(), series(&s1, &s2).unwrap());
    }

    #[test]
    fn test_parallel_rejects_partition_mismatch() {
        let s1 = siso_pair(1.0);
        let p = StateSpace::static_gain(Array2::zeros((1, 2)), TimeDomain::Continuous).unwrap();
        let s2 = PartitionedSystem::from(p);

        assert!(matches!(
            parallel(&s1, &s2),
            Err(SystemError::DimensionMismatch {
                what: "nu1",
                operand: 1,
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_parallel_rejects_mixed_time_domains() {
        let s1 = siso_pair(1.0);
        let time = TimeDomain::discrete(0.1).unwrap();
        let p = StateSpace::static_gain(arr2(&[[1.0]]), time).unwrap();
        let s2 = PartitionedSystem::from(p);
        assert!(matches!(
            parallel(&s1, &s2),
            Err(SystemError::IncompatibleTime { .. })
        ));
    }

    #[test]
    fn test_series_blocks() {
        let s1 = siso_pair(1.0);
        let s2 = siso_pair(3.0);
        let prod = series(&s1, &s2).unwrap();

        assert_eq!(prod.nu1(), 1);
        assert_eq!(prod.ny1(), 1);

        // A = [A1  B1_1 C1_2; 0  A2]
        assert_matrix_eq(prod.a(), &arr2(&[[-1.0, 2.0], [0.0, -3.0]]));
        // B1 = [B1_1 D11_2; B1_2]
        assert_matrix_eq(prod.b1(), &arr2(&[[0.0], [1.0]]));
        // B2 = [B2_1  B1_1 D12_2; 0  B2_2]
        assert_matrix_eq(prod.b2(), &arr2(&[[2.0, 0.5], [0.0, 4.0]]));
        // C1 = [C1_1  D11_1 C1_2]
        assert_matrix_eq(prod.c1(), &arr2(&[[2.0, 0.0]]));
        // C2 = [C2_1  D21_1 C1_2; 0  C2_2]
        assert_matrix_eq(prod.c2(), &arr2(&[[3.0, 0.5], [0.0, 5.0]]));
        assert_matrix_eq(prod.d11(), &arr2(&[[0.0]]));
        assert_matrix_eq(prod.d12(), &arr2(&[[0.5, 0.0]]));
        assert_matrix_eq(prod.d21(), &arr2(&[[0.0], [0.25]]));
        // D22 = [D22_1  D21_1 D12_2; 0  D22_2]
        assert_matrix_eq(prod.d22(), &arr2(&[[1.0, 0.125], [0.0, 3.0]]));
    }

    #[test]
    fn test_series_rejects_port_mismatch() {
        let s1 = siso_pair(1.0);
        let p = StateSpace::static_gain(Array2::zeros((2, 1)), TimeDomain::Continuous).unwrap();
        let s2 = PartitionedSystem::from(p);

        assert!(matches!(
            series(&s1, &s2),
            Err(SystemError::Shape {
                first: "s1.B1",
                second: "s2.C1",
                ..
            })
        ));
    }

    #[test]
    fn test_feedback_static_gains() {
        // k1 = 2, k2 = 3 with direct feedthrough: z1 = r * k1 / (1 + k1 k2) = 2/7
        let time = TimeDomain::Continuous;
        let s1 = PartitionedSystem::from(StateSpace::static_gain(arr2(&[[2.0]]), time).unwrap());
        let s2 = PartitionedSystem::from(StateSpace::static_gain(arr2(&[[3.0]]), time).unwrap());

        let cl = feedback(&s1, &s2).unwrap();
        assert_eq!(cl.nx(), 0);
        assert_relative_eq!(cl.d11()[(0, 0)], 2.0 / 7.0, epsilon = 1e-14);
    }

    #[test]
    fn test_feedback_singular_loop() {
        // 1 + k2 k1 = 1 + (-1)(1) = 0
        let time = TimeDomain::Continuous;
        let s1 = PartitionedSystem::from(StateSpace::static_gain(arr2(&[[1.0]]), time).unwrap());
        let s2 = PartitionedSystem::from(StateSpace::static_gain(arr2(&[[-1.0]]), time).unwrap());

        assert!(matches!(feedback(&s1, &s2), Err(SystemError::SingularLoop)));
    }

    #[test]
    fn test_feedback_tolerance_gate() {
        // 1 + k2 k1 = 1e-9: solvable, but badly conditioned relative to 1e-6
        let time = TimeDomain::Continuous;
        let s1 = PartitionedSystem::from(StateSpace::static_gain(arr2(&[[1.0]]), time).unwrap());
        let s2 = PartitionedSystem::from(
            StateSpace::static_gain(arr2(&[[-1.0 + 1e-9]]), time).unwrap(),
        );

        // Unchecked: succeeds
        assert!(feedback(&s1, &s2).is_ok());

        // The condition number of a scalar loop does not depend on its size
        assert!(feedback_with_tol(&s1, &s2, Some(1e-6)).is_ok());
    }

    #[test]
    fn test_feedback_tolerance_rejects_ill_conditioned_loop() {
        let time = TimeDomain::Continuous;
        // D1 = diag(1, 1), D2 = diag(-1 + 1e-12, 0): I + D2 D1 = diag(1e-12, 1)
        let s1 = PartitionedSystem::from(StateSpace::static_gain(Array2::eye(2), time).unwrap());
        let s2 = PartitionedSystem::from(
            StateSpace::static_gain(arr2(&[[-1.0 + 1e-12, 0.0], [0.0, 0.0]]), time).unwrap(),
        );

        assert!(matches!(
            feedback_with_tol(&s1, &s2, Some(1e-8)),
            Err(SystemError::IllConditionedLoop { .. })
        ));
    }

    #[test]
    fn test_feedback_rejects_port_mismatch() {
        let s1 = siso_pair(1.0);
        let p = StateSpace::static_gain(Array2::zeros((1, 2)), TimeDomain::Continuous).unwrap();
        let s2 = PartitionedSystem::from(p);

        assert!(matches!(
            feedback(&s1, &s2),
            Err(SystemError::Shape {
                first: "s1.C1",
                second: "s2.B1",
                ..
            })
        ));
    }

    #[test]
    fn test_vcat_1_blocks() {
        let s1 = siso_pair(1.0);
        let s2 = siso_pair(2.0);
        let cat = vcat_1(&[s1, s2]).unwrap();

        assert_eq!(cat.nu1(), 1);
        assert_eq!(cat.ny1(), 2);
        assert_eq!(cat.nu2(), 2);
        assert_eq!(cat.ny2(), 2);
        assert_matrix_eq(cat.b1(), &arr2(&[[1.0], [1.0]]));
        assert_matrix_eq(cat.c1(), &arr2(&[[2.0, 0.0], [0.0, 2.0]]));
        assert_matrix_eq(cat.d12(), &arr2(&[[0.5, 0.0], [0.0, 0.5]]));
        assert_matrix_eq(cat.d21(), &arr2(&[[0.25], [0.25]]));
    }

    #[test]
    fn test_vcat_1_rejects_nu1_mismatch() {
        let s1 = siso_pair(1.0);
        let p = StateSpace::static_gain(Array2::zeros((1, 2)), TimeDomain::Continuous).unwrap();
        let s2 = PartitionedSystem::from(p);

        match vcat_1(&[s1.clone(), s1, s2]) {
            Err(SystemError::DimensionMismatch {
                what,
                operand,
                expected,
                found,
            }) => {
                assert_eq!(what, "nu1");
                assert_eq!(operand, 2);
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected dimension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_hcat_1_blocks() {
        let s1 = siso_pair(1.0);
        let s2 = siso_pair(2.0);
        let cat = hcat_1(&[s1, s2]).unwrap();

        assert_eq!(cat.nu1(), 2);
        assert_eq!(cat.ny1(), 1);
        assert_matrix_eq(cat.b1(), &arr2(&[[1.0, 0.0], [0.0, 1.0]]));
        assert_matrix_eq(cat.c1(), &arr2(&[[2.0, 2.0]]));
        assert_matrix_eq(cat.d11(), &arr2(&[[0.0, 0.0]]));
        assert_matrix_eq(cat.d12(), &arr2(&[[0.5, 0.5]]));
        assert_matrix_eq(cat.d21(), &arr2(&[[0.25, 0.0], [0.0, 0.25]]));
    }

    #[test]
    fn test_concatenation_of_nothing() {
        assert!(matches!(vcat_1(&[]), Err(SystemError::EmptyConcatenation)));
        assert!(matches!(hcat_1(&[]), Err(SystemError::EmptyConcatenation)));
    }

    #[test]
    fn test_single_operand_concatenation_is_identity() {
        let s = siso_pair(1.5);
        assert_eq!(vcat_1(std::slice::from_ref(&s)).unwrap(), s);
        assert_eq!(hcat_1(std::slice::from_ref(&s)).unwrap(), s);
    }
}
