//! Certificates of worst-case values

use crate::algebra::{BasisIndex, Expression};
use crate::assembler::{PepProgram, gram_slot};
use crate::constraint::{Constraint, ConstraintId, ConstraintKind, ConstraintOrigin};
use crate::solve::{PepSolution, min_eigenvalue};

//

/// Multiplier of one constraint in a [`Certificate`].
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateEntry
{
    pub id: ConstraintId,
    pub origin: ConstraintOrigin,
    pub constraint: Constraint,
    pub multiplier: f64,
}

/// Proof of a worst-case bound
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Multipliers \\(\lambda_i\\) of the constraints \\(e_i \le 0\\) (or \\(e_i = 0\\))
/// and a dual matrix \\(S \succeq 0\\) such that
/// \\[
/// m = \sum_i \lambda_i e_i - \langle S, G \rangle + \beta
/// \\]
/// holds identically in the function values and the Gram matrix \\(G\\),
/// where \\(m\\) is the performance metric.
/// With \\(\lambda_i \ge 0\\) on inequalities, every feasible point gives \\(m \le \beta\\).
#[derive(Debug, Clone)]
pub struct Certificate
{
    metric: Expression,
    entries: Vec<CertificateEntry>,
    n_basis: usize,
    dual_psd: Vec<f64>,
    bound: f64,
    eps_zero: f64,
}

/// Result of [`Certificate::verify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CertificateCheck
{
    /// Bound \\(\beta\\) proven by the certificate.
    pub bound: f64,
    /// Largest coefficient of the identity which does not cancel.
    pub residual: f64,
    /// Smallest multiplier of an inequality, `f64::INFINITY` if none.
    pub min_multiplier: f64,
    /// Smallest eigenvalue of \\(S\\), `f64::INFINITY` if empty.
    pub min_dual_eigenvalue: f64,
}

impl CertificateCheck
{
    /// Checks the certificate proves its bound up to `tol`.
    pub fn is_valid(&self, tol: f64) -> bool
    {
        self.residual <= tol && self.min_multiplier >= -tol && self.min_dual_eigenvalue >= -tol
    }
}

impl Certificate
{
    /// Extracts a certificate from a solution of a program.
    ///
    /// Returns the certificate with one entry per non-constant constraint, in row order.
    pub fn extract(program: &PepProgram, solution: &PepSolution) -> Self
    {
        let metric = program.metric().clone();

        let mut bound = metric.constant();
        let mut entries = Vec::new();
        for id in program.rows() {
            if let (Some(s), Some(multiplier)) = (program.store().get(id), solution.dual(id)) {
                bound -= multiplier * s.constraint.expression().constant();
                entries.push(CertificateEntry {
                    id,
                    origin: s.origin,
                    constraint: s.constraint.clone(),
                    multiplier,
                });
            }
        }

        log::debug!("certificate: {} multipliers, bound {:.6e}", entries.len(), bound);

        Certificate {
            metric,
            entries,
            n_basis: program.n_basis(),
            dual_psd: solution.dual_psd().to_vec(),
            bound,
            eps_zero: solution.eps_zero(),
        }
    }

    /// Bound proven by the certificate.
    pub fn bound(&self) -> f64
    {
        self.bound
    }

    pub fn entries(&self) -> &[CertificateEntry]
    {
        &self.entries
    }

    /// Dual PSD matrix \\(S\\), upper-triangular part in column-wise.
    pub fn dual_psd(&self) -> &[f64]
    {
        &self.dual_psd
    }

    /// Entries with a multiplier above `tol` in absolute value.
    ///
    /// These are the constraints the proof actually combines.
    pub fn active(&self, tol: f64) -> impl Iterator<Item=&CertificateEntry> + '_
    {
        self.entries.iter().filter(move |e| e.multiplier.abs() > tol)
    }

    /// Recomputes the identity symbolically.
    ///
    /// Returns the bound and how far the certificate is from a proof.
    pub fn verify(&self) -> CertificateCheck
    {
        // m - sum_i lambda_i e_i - beta, to be cancelled by -<S, G>
        let mut rest = &self.metric - self.bound;
        for e in self.entries.iter() {
            rest = rest.axpy(-e.multiplier, e.constraint.expression());
        }

        let mut residual = rest.constant().abs();
        for (_, a) in rest.value_terms() {
            residual = residual.max(a.abs());
        }
        for c in 0.. self.n_basis {
            for r in 0..= c {
                let (i, j) = (BasisIndex(r), BasisIndex(c));
                let s = self.dual_psd.get(gram_slot(i, j)).copied().unwrap_or(0.);
                let s = if r == c {s} else {2. * s};
                residual = residual.max((rest.gram_coefficient(i, j) + s).abs());
            }
        }

        let min_multiplier = self.entries.iter()
                             .filter(|e| e.constraint.kind() == ConstraintKind::LessEq)
                             .fold(f64::INFINITY, |m, e| m.min(e.multiplier));

        let min_dual_eigenvalue = min_eigenvalue(&self.dual_psd, self.n_basis, self.eps_zero);

        log::debug!("certificate residual {:.3e}", residual);

        CertificateCheck {
            bound: self.bound,
            residual,
            min_multiplier,
            min_dual_eigenvalue,
        }
    }
}

impl core::fmt::Display for Certificate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{} <= {:.6e}", self.metric, self.bound)?;
        for e in self.entries.iter() {
            writeln!(f, "  {:.6e} * [{}] ({})", e.multiplier, e.constraint, e.origin)?;
        }
        Ok(())
    }
}
