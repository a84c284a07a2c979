//! Solver adapter

use std::cell::Cell;
use std::collections::BTreeMap;
use totsu_core::solver::Solver;
use totsu_core::{LinAlgEx, MatType, FloatGeneric};
use totsu::MatBuild;
use crate::algebra::{BasisIndex, ValueIndex, Point, Expression};
use crate::assembler::{PepProgram, gram_slot};
use crate::certificate::Certificate;
use crate::constraint::{ConstraintId, ConstraintKind};
use crate::error::{SolveError, ToleranceCheck, NumericToleranceWarning};
use crate::param::PepParam;
use crate::problem::ProbPEP;

type La = FloatGeneric<f64>;

//

/// Status of a session.
///
/// `Unsolved` → `Solving` → one of the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus
{
    Unsolved,
    Solving,
    Solved,
    Infeasible,
    Unbounded,
    SolverError,
}

impl SolveStatus
{
    /// Status after a failed solve.
    pub fn of_error(e: &SolveError) -> Self
    {
        match e {
            SolveError::Infeasible => SolveStatus::Infeasible,
            SolveError::Unbounded => SolveStatus::Unbounded,
            SolveError::Solver(_) | SolveError::Tolerance { .. } => SolveStatus::SolverError,
        }
    }
}

impl core::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            SolveStatus::Unsolved    => "unsolved",
            SolveStatus::Solving     => "solving",
            SolveStatus::Solved      => "solved",
            SolveStatus::Infeasible  => "infeasible",
            SolveStatus::Unbounded   => "unbounded",
            SolveStatus::SolverError => "solver error",
        })
    }
}

//

/// Smallest eigenvalue of a symmetric matrix.
///
/// * `mat` is the upper-triangular part in column-wise, unscaled.
/// * `n` is a number of rows and columns.
///
/// Returns `f64::INFINITY` for an empty matrix.
pub(crate) fn min_eigenvalue(mat: &[f64], n: usize, eps_zero: f64) -> f64
{
    let mut a = mat.to_vec();
    let mut work = vec![0.; La::map_eig_worklen(n)];

    let min = Cell::new(f64::INFINITY);
    La::map_eig(&mut a, None, eps_zero, &mut work, |e| {
        min.set(min.get().min(e));
        None
    });

    min.get()
}

//

/// Solution of a performance estimation problem
#[derive(Debug, Clone)]
pub struct PepSolution
{
    worst_case_value: f64,
    n_basis: usize,
    gram: Vec<f64>,
    values: BTreeMap<ValueIndex, f64>,
    duals: Vec<f64>,
    dual_psd: Vec<f64>,
    eps_zero: f64,
    warnings: Vec<NumericToleranceWarning>,
    certificate: Option<Certificate>,
}

impl PepSolution
{
    /// Worst-case value of the performance metric.
    pub fn worst_case_value(&self) -> f64
    {
        self.worst_case_value
    }

    /// Certificate of the worst-case value.
    ///
    /// Returns `None` if [`PepParam::certificate`] was off.
    pub fn certificate(&self) -> Option<&Certificate>
    {
        self.certificate.as_ref()
    }

    /// Numerical defects found within tolerance.
    pub fn warnings(&self) -> &[NumericToleranceWarning]
    {
        &self.warnings
    }

    /// Size of the Gram matrix.
    pub fn n_basis(&self) -> usize
    {
        self.n_basis
    }

    /// Worst-case Gram matrix.
    ///
    /// Returns the upper-triangular part in column-wise.
    pub fn gram(&self) -> &[f64]
    {
        &self.gram
    }

    /// Worst-case \\(\langle b_i, b_j \rangle\\).
    pub fn gram_entry(&self, i: BasisIndex, j: BasisIndex) -> f64
    {
        self.gram.get(gram_slot(i, j)).copied().unwrap_or(0.)
    }

    /// Worst-case function values.
    ///
    /// Values constrained nowhere are absent.
    pub fn values(&self) -> impl Iterator<Item=(ValueIndex, f64)> + '_
    {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Multipliers, one per compiled constraint in [`ConstraintId`] order.
    pub fn duals(&self) -> &[f64]
    {
        &self.duals
    }

    /// Multiplier of a compiled constraint.
    pub fn dual(&self, id: ConstraintId) -> Option<f64>
    {
        self.duals.get(id.0).copied()
    }

    /// Dual PSD matrix, upper-triangular part in column-wise.
    pub fn dual_psd(&self) -> &[f64]
    {
        &self.dual_psd
    }

    pub(crate) fn eps_zero(&self) -> f64
    {
        self.eps_zero
    }

    /// Evaluates an expression at the worst case.
    ///
    /// Function values constrained nowhere evaluate to `0`.
    pub fn eval(&self, expr: &Expression) -> f64
    {
        let mut v = expr.constant();
        for ((i, j), q) in expr.gram_terms() {
            v += q * self.gram_entry(i, j);
        }
        for (k, a) in expr.value_terms() {
            v += a * self.values.get(&k).copied().unwrap_or(0.);
        }
        v
    }

    /// Realizes a point of the worst case in \\(\mathbb{R}^d\\).
    ///
    /// Returns coordinates of the point
    /// whose inner products reproduce the Gram matrix,
    /// using its square root as the coordinates of the basis vectors.
    pub fn eval_point(&self, x: &Point) -> Vec<f64>
    {
        let d = self.n_basis;

        let mut sqrt_g = MatBuild::<La>::new(MatType::SymPack(d));
        sqrt_g.as_mut().copy_from_slice(&self.gram);
        sqrt_g.set_sqrt(self.eps_zero);

        let mut v = vec![0.; d];
        for (k, c) in x.terms() {
            if k.0 < d {
                for (r, vr) in v.iter_mut().enumerate() {
                    *vr += c * sqrt_g[(r, k.0)];
                }
            }
        }
        v
    }
}

//

fn check_defect(
    check: ToleranceCheck, amount: f64, constraint: Option<ConstraintId>,
    par: &PepParam, warnings: &mut Vec<NumericToleranceWarning>) -> Result<(), SolveError>
{
    if amount > par.tol_numeric {
        log::warn!("{} defect {:.3e} exceeds {:.3e}", check, amount, par.tol_numeric);
        Err(SolveError::Tolerance { check, amount, constraint })
    }
    else if amount > par.eps_warn.max(par.eps_acc) {
        let w = NumericToleranceWarning { check, amount, constraint };
        log::warn!("{}", w);
        warnings.push(w);
        Ok(())
    }
    else {
        Ok(())
    }
}

fn run_solver<L: LinAlgEx<F=f64>>(par: &PepParam, prob: &mut ProbPEP<L>) -> Result<(Vec<f64>, Vec<f64>), SolveError>
{
    let s = Solver::<L>::new().par(|sp| {
        sp.max_iter = par.max_iter;
        sp.eps_acc = par.eps_acc;
        sp.eps_inf = par.eps_inf;
        sp.eps_zero = par.eps_zero;
        sp.log_period = par.log_period;
    });

    match s.solve(prob.problem()) {
        Ok((x, y)) => Ok((x.to_vec(), y.to_vec())),
        Err(e) => {
            log::warn!("solver: {}", e);
            Err(e.into())
        },
    }
}

/// Looks for a ray of a homogeneous program along which the metric grows.
///
/// Returns `Err` with [`SolveError::Unbounded`] if the normalized worst case
/// of the linear part of the metric exceeds [`PepParam::tol_numeric`].
fn check_ray<L: LinAlgEx<F=f64>>(program: &PepProgram, par: &PepParam) -> Result<(), SolveError>
{
    log::info!("----- Calling solver on the normalized program");

    let mut prob = program.prob_normalized::<L>(par.eps_zero);
    let (x, _) = run_solver(par, &mut prob)?;

    let ray = program.metric_linear_of(&x);
    log::debug!("normalized worst case: {:.3e}", ray);

    if ray > par.tol_numeric {
        log::warn!("metric grows along a ray: {:.3e} at tr(G) <= 1", ray);
        Err(SolveError::Unbounded)
    }
    else {
        Ok(())
    }
}

/// Solves an assembled program.
///
/// Returns the solution, or `Err` with the terminal [`SolveError`].
/// A homogeneous program is first checked for a ray along which the metric grows,
/// reported as [`SolveError::Unbounded`].
pub fn solve_program<L: LinAlgEx<F=f64>>(program: &PepProgram, par: &PepParam) -> Result<PepSolution, SolveError>
{
    let (sk, nf, p, m) = program.dim();
    let d = program.n_basis();

    if sk + nf > 0 && program.is_homogeneous() {
        check_ray::<L>(program, par)?;
    }

    log::info!("----- Calling solver");
    log::info!("variables: {} + {}, constraints: {} + {} + {}", sk, nf, p, m, sk);

    let (x, y) = if sk + nf == 0 {
        (Vec::new(), Vec::new())
    }
    else {
        let mut prob = program.prob::<L>(par.eps_zero);
        run_solver(par, &mut prob)?
    };
    log::trace!("x: {:?}", x);
    log::trace!("y: {:?}", y);

    let gram = program.gram_of(&x);
    let values: BTreeMap<ValueIndex, f64> = program.values().iter().copied()
                                            .zip(program.values_of(&x))
                                            .collect();
    let (duals, dual_psd) = program.duals_of(&y);

    let mut sol = PepSolution {
        worst_case_value: 0.,
        n_basis: d,
        gram, values, duals, dual_psd,
        eps_zero: par.eps_zero,
        warnings: Vec::new(),
        certificate: None,
    };
    sol.worst_case_value = sol.eval(program.metric());

    //----- numerical checks

    let mut warnings = Vec::new();

    let primal = -min_eigenvalue(sol.gram(), d, par.eps_zero);
    check_defect(ToleranceCheck::PrimalPsd, primal.max(0.), None, par, &mut warnings)?;

    let dual = -min_eigenvalue(sol.dual_psd(), d, par.eps_zero);
    check_defect(ToleranceCheck::DualPsd, dual.max(0.), None, par, &mut warnings)?;

    let mut worst_viol = (0., None);
    let mut worst_slack = (0., None);
    for id in program.rows() {
        if let Some(s) = program.store().get(id) {
            let e = sol.eval(s.constraint.expression());

            let viol = s.constraint.violation(e);
            if viol > worst_viol.0 {
                worst_viol = (viol, Some(id));
            }

            if s.constraint.kind() == ConstraintKind::LessEq {
                let slack = (sol.duals[id.0] * e).abs();
                if slack > worst_slack.0 {
                    worst_slack = (slack, Some(id));
                }
            }
        }
    }
    check_defect(ToleranceCheck::Feasibility, worst_viol.0, worst_viol.1, par, &mut warnings)?;
    check_defect(ToleranceCheck::ComplementarySlackness, worst_slack.0, worst_slack.1, par, &mut warnings)?;

    sol.warnings = warnings;

    if par.certificate {
        sol.certificate = Some(Certificate::extract(program, &sol));
    }

    log::info!("worst-case value: {:.6e}", sol.worst_case_value);

    Ok(sol)
}

//

#[test]
fn test_min_eigenvalue()
{
    use float_eq::assert_float_eq;

    // [[2, 1], [1, 2]] has 1 and 3
    let ev = min_eigenvalue(&[2., 1., 2.], 2, 1e-12);
    assert_float_eq!(ev, 1., abs <= 1e-9);

    assert_eq!(min_eigenvalue(&[], 0, 1e-12), f64::INFINITY);
}

#[test]
fn test_status_of_error()
{
    use totsu_core::solver::SolverError;

    assert_eq!(SolveStatus::of_error(&SolveError::Unbounded), SolveStatus::Unbounded);
    assert_eq!(SolveStatus::of_error(&SolverError::ExcessIter.into()), SolveStatus::SolverError);
}
