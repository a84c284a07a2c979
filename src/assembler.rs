//! SDP assembler
//!
//! Lowers the symbolic constraint store and the performance metric
//! into the numeric data of a [`ProbPEP`].

use std::collections::BTreeMap;
use totsu_core::{LinAlgEx, MatType};
use totsu::MatBuild;
use crate::algebra::{BasisIndex, ValueIndex, Expression};
use crate::constraint::{ConstraintStore, ConstraintId, ConstraintKind};
use crate::error::SolveError;
use crate::problem::ProbPEP;

//

/// Slot of the Gram entry \\(G_{ij}\\) in \\({\rm vec}(G)\\).
///
/// Symmetric in `i` and `j`.
pub fn gram_slot(i: BasisIndex, j: BasisIndex) -> usize
{
    let (r, c) = if i.0 <= j.0 {
        (i.0, j.0)
    }
    else {
        (j.0, i.0)
    };
    c * (c + 1) / 2 + r
}

/// Assembled program
///
/// Fixes the row of every non-constant stored constraint
/// and the column of every Gram entry and every referenced function value.
/// Rows are the equalities, then the inequalities, each in store order.
#[derive(Debug, Clone)]
pub struct PepProgram
{
    store: ConstraintStore,
    metric: Expression,
    n_basis: usize,
    values: Vec<ValueIndex>,
    value_slots: BTreeMap<ValueIndex, usize>,
    rows_eq: Vec<ConstraintId>,
    rows_in: Vec<ConstraintId>,
}

impl PepProgram
{
    /// Assembles a program.
    ///
    /// Returns the program, or `Err` with [`SolveError::Infeasible`]
    /// if a constant constraint of the store is violated.
    /// * `store` is the compiled constraints.
    /// * `metric` is the performance metric to be maximized.
    /// * `n_basis` is a number of basis vectors, the size of the Gram matrix.
    pub fn new(store: ConstraintStore, metric: Expression, n_basis: usize) -> Result<Self, SolveError>
    {
        if let Some(id) = store.trivially_infeasible() {
            if let Some(s) = store.get(id) {
                log::warn!("{} ({}) never holds: {}", id, s.origin, s.constraint);
            }
            return Err(SolveError::Infeasible);
        }

        let mut rows_eq = Vec::new();
        let mut rows_in = Vec::new();
        let mut value_slots = BTreeMap::new();

        for (k, _) in metric.value_terms() {
            value_slots.insert(k, 0);
        }

        for (id, s) in store.iter() {
            let expr = s.constraint.expression();
            if expr.is_constant() {
                log::debug!("drop constant {} ({})", id, s.origin);
                continue;
            }

            for (k, _) in expr.value_terms() {
                value_slots.insert(k, 0);
            }
            match s.constraint.kind() {
                ConstraintKind::Equal => rows_eq.push(id),
                ConstraintKind::LessEq => rows_in.push(id),
            }
        }

        let values: Vec<ValueIndex> = value_slots.keys().copied().collect();
        for (slot, k) in values.iter().enumerate() {
            value_slots.insert(*k, slot);
        }

        Ok(PepProgram {
            store, metric, n_basis,
            values, value_slots,
            rows_eq, rows_in,
        })
    }

    pub fn store(&self) -> &ConstraintStore
    {
        &self.store
    }

    pub fn metric(&self) -> &Expression
    {
        &self.metric
    }

    /// Size of the Gram matrix.
    pub fn n_basis(&self) -> usize
    {
        self.n_basis
    }

    /// Dimensions of the program.
    ///
    /// Returns a tuple of the length of \\({\rm vec}(G)\\), the number of function value slots,
    /// the number of equality rows and the number of inequality rows.
    pub fn dim(&self) -> (usize, usize, usize, usize)
    {
        let d = self.n_basis;

        (d * (d + 1) / 2, self.values.len(), self.rows_eq.len(), self.rows_in.len())
    }

    /// Function values in slot order.
    pub fn values(&self) -> &[ValueIndex]
    {
        &self.values
    }

    /// Column of a function value, `None` if no constraint nor the metric refers to it.
    pub fn value_slot(&self, k: ValueIndex) -> Option<usize>
    {
        self.value_slots.get(&k).copied()
    }

    /// Stored constraints in row order.
    pub fn rows(&self) -> impl Iterator<Item=ConstraintId> + '_
    {
        self.rows_eq.iter().chain(self.rows_in.iter()).copied()
    }

    /// Columns and coefficients of the linear part of `expr`.
    fn columns(&self, expr: &Expression) -> Vec<(usize, f64)>
    {
        let (sk, _, _, _) = self.dim();
        let fsqrt2 = 2_f64.sqrt();

        let mut cols = Vec::new();
        for ((i, j), q) in expr.gram_terms() {
            // vec(G) holds sqrt(2) G_ij off the diagonal
            let q = if i == j {q} else {q / fsqrt2};
            cols.push((gram_slot(i, j), q));
        }
        for (k, a) in expr.value_terms() {
            if let Some(slot) = self.value_slot(k) {
                cols.push((sk + slot, a));
            }
            else {
                log::error!("value {} has no column", k);
            }
        }
        cols
    }

    /// Checks if every row has a zero constant.
    ///
    /// The feasible set of a homogeneous program is a cone,
    /// so its worst case is either the metric constant or unbounded.
    pub fn is_homogeneous(&self) -> bool
    {
        self.rows().all(|id| {
            self.store.get(id).map_or(true, |s| s.constraint.expression().constant() == 0.)
        })
    }

    /// Builds the numeric program.
    ///
    /// Returns a [`ProbPEP`] instance.
    /// * `eps_zero` should be the same value as [`totsu_core::solver::SolverParam::eps_zero`].
    pub fn prob<L: LinAlgEx<F=f64>>(&self, eps_zero: f64) -> ProbPEP<L>
    {
        self.build(eps_zero, false)
    }

    /// Builds the numeric program normalized by \\({\rm tr}(G) \le 1\\) and \\(|F_k| \le 1\\).
    ///
    /// Returns a [`ProbPEP`] instance whose worst case is bounded.
    /// For a homogeneous program, a positive worst case of its linear part
    /// is a ray along which the metric grows without bound.
    pub fn prob_normalized<L: LinAlgEx<F=f64>>(&self, eps_zero: f64) -> ProbPEP<L>
    {
        self.build(eps_zero, true)
    }

    fn build<L: LinAlgEx<F=f64>>(&self, eps_zero: f64, normalize: bool) -> ProbPEP<L>
    {
        let (sk, nf, p, m) = self.dim();
        let n = sk + nf;
        let m_norm = if normalize {1 + 2 * nf} else {0};

        let mut vec_c = MatBuild::<L>::new(MatType::General(n, 1));
        for (c, q) in self.columns(&self.metric) {
            vec_c[(c, 0)] = -q;
        }

        let mut mat_a = MatBuild::<L>::new(MatType::General(p + m + m_norm, n));
        let mut vec_b = MatBuild::<L>::new(MatType::General(p + m + m_norm, 1));
        for (r, id) in self.rows().enumerate() {
            if let Some(s) = self.store.get(id) {
                let expr = s.constraint.expression();
                for (c, a) in self.columns(expr) {
                    mat_a[(r, c)] = a;
                }
                vec_b[(r, 0)] = -expr.constant();
            }
        }

        if normalize {
            let r = p + m;
            // tr(G) <= 1
            for i in 0.. self.n_basis {
                mat_a[(r, gram_slot(BasisIndex(i), BasisIndex(i)))] = 1.;
            }
            vec_b[(r, 0)] = 1.;
            // -1 <= F_k <= 1
            for k in 0.. nf {
                mat_a[(r + 1 + 2 * k, sk + k)] = 1.;
                mat_a[(r + 2 + 2 * k, sk + k)] = -1.;
                vec_b[(r + 1 + 2 * k, 0)] = 1.;
                vec_b[(r + 2 + 2 * k, 0)] = 1.;
            }
        }

        log::trace!("vec_c: {}", vec_c);
        log::trace!("vec_b: {}", vec_b);

        ProbPEP::new(vec_c, mat_a, vec_b, p, sk, eps_zero)
    }

    /// Linear part of the metric at a primal solution.
    pub fn metric_linear_of(&self, x: &[f64]) -> f64
    {
        self.columns(&self.metric).iter()
        .map(|(c, q)| q * x.get(*c).copied().unwrap_or(0.))
        .sum()
    }

    /// Recovers the Gram matrix from a primal solution.
    ///
    /// Returns the upper-triangular part in column-wise, unscaled.
    pub fn gram_of(&self, x: &[f64]) -> Vec<f64>
    {
        unvec(&x[0.. self.dim().0])
    }

    /// Recovers function values from a primal solution.
    ///
    /// Returns values in slot order.
    pub fn values_of(&self, x: &[f64]) -> Vec<f64>
    {
        let (sk, nf, _, _) = self.dim();

        x[sk.. sk + nf].to_vec()
    }

    /// Recovers multipliers from a dual solution.
    ///
    /// Returns a tuple of one multiplier per stored constraint, zero for constant ones,
    /// and the dual PSD matrix, upper-triangular part in column-wise, unscaled.
    pub fn duals_of(&self, y: &[f64]) -> (Vec<f64>, Vec<f64>)
    {
        let (sk, _, p, m) = self.dim();

        let mut duals = vec![0.; self.store.len()];
        for (r, id) in self.rows().enumerate() {
            duals[id.0] = y[r];
        }

        (duals, unvec(&y[p + m.. p + m + sk]))
    }
}

/// Undoes the off-diagonal scaling of a vectorized symmetric matrix.
fn unvec(v: &[f64]) -> Vec<f64>
{
    let fsqrt2 = 2_f64.sqrt();

    let mut mat = v.to_vec();
    let mut k = 0;
    let mut c = 0;
    while k < mat.len() {
        for r in 0..= c {
            if k >= mat.len() {
                break;
            }
            if r != c {
                mat[k] /= fsqrt2;
            }
            k += 1;
        }
        c += 1;
    }
    mat
}

//

#[test]
fn test_gram_slot()
{
    let b = |i| BasisIndex(i);

    assert_eq!(gram_slot(b(0), b(0)), 0);
    assert_eq!(gram_slot(b(0), b(1)), 1);
    assert_eq!(gram_slot(b(1), b(1)), 2);
    assert_eq!(gram_slot(b(2), b(0)), 3);
    assert_eq!(gram_slot(b(0), b(2)), gram_slot(b(2), b(0)));

    let g = unvec(&[1., 2_f64.sqrt(), 3.]);
    assert_eq!(g.len(), 3);
    assert!((g[1] - 1.).abs() < 1e-15);
}

#[test]
fn test_program_rows()
{
    use crate::algebra::Point;
    use crate::constraint::ConstraintOrigin;

    let x = Point::from_basis(BasisIndex(0));
    let f = Expression::from_value(ValueIndex(3));

    let mut store = ConstraintStore::new();
    store.push(f.le(1.), ConstraintOrigin::InitialCondition).unwrap();
    store.push(Expression::from(0.).le(1.), ConstraintOrigin::InitialCondition).unwrap();
    store.push(x.norm_sq().equals(1.), ConstraintOrigin::InitialCondition).unwrap();

    let prog = PepProgram::new(store, f.clone(), 1).unwrap();
    assert_eq!(prog.dim(), (1, 1, 1, 1));
    assert_eq!(prog.rows().collect::<Vec<_>>(), vec![ConstraintId(2), ConstraintId(0)]);
    assert_eq!(prog.value_slot(ValueIndex(3)), Some(0));

    let (duals, s) = prog.duals_of(&[0.5, 2., 7.]);
    assert_eq!(duals, vec![2., 0., 0.5]);
    assert_eq!(s, vec![7.]);

    let mut store = ConstraintStore::new();
    store.push(Expression::from(1.).le(0.), ConstraintOrigin::InitialCondition).unwrap();
    assert_eq!(PepProgram::new(store, f, 1).unwrap_err(), SolveError::Infeasible);
}

#[test]
fn test_program_homogeneous()
{
    use crate::algebra::Point;
    use crate::constraint::ConstraintOrigin;

    let x = Point::from_basis(BasisIndex(0));
    let y = Point::from_basis(BasisIndex(1));
    let f = Expression::from_value(ValueIndex(0));
    let metric = &f + &x.inner(&y);

    let mut store = ConstraintStore::new();
    store.push(f.le(0.), ConstraintOrigin::InitialCondition).unwrap();
    store.push((&x - &y).norm_sq().ge(0.), ConstraintOrigin::InitialCondition).unwrap();

    let prog = PepProgram::new(store.clone(), metric.clone(), 2).unwrap();
    assert!(prog.is_homogeneous());
    assert_eq!(prog.dim(), (3, 1, 0, 2));

    // svec(G) with the off-diagonal entry scaled by sqrt(2), then F
    let sqrt2 = 2_f64.sqrt();
    let v = prog.metric_linear_of(&[1., 0.5 * sqrt2, 1., 0.25]);
    assert!((v - 0.75).abs() < 1e-12);

    store.push(x.norm_sq().le(1.), ConstraintOrigin::InitialCondition).unwrap();
    let prog = PepProgram::new(store, metric, 2).unwrap();
    assert!(!prog.is_homogeneous());
}
