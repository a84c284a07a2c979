use super::{FunctionClass, Triple, Interpolation, unordered_pairs};
use crate::error::ClassParameterError;

//

/// Maximally monotone operator
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// \langle g_k - g_l, x_k - x_l \rangle \ge 0
/// \\]
/// for every pair \\(k < l\\). Set-valued: a new output is taken at each evaluation.
/// Function values are registered but never constrained.
#[derive(Debug, Clone, Default)]
pub struct MonotoneOperator;

impl MonotoneOperator
{
    pub fn new() -> Self
    {
        MonotoneOperator
    }
}

impl FunctionClass for MonotoneOperator
{
    fn name(&self) -> &str
    {
        "MonotoneOperator"
    }

    fn reuse_gradient(&self) -> bool
    {
        false
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        unordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            let dg = &tk.gradient - &tl.gradient;

            dg.inner(&dx).ge(0.)
        })
    }
}

//

/// Strongly monotone operator
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// \langle g_k - g_l, x_k - x_l \rangle \ge \mu \\|x_k - x_l\\|^2
/// \\]
/// for every pair \\(k < l\\), with \\(\mu > 0\\).
#[derive(Debug, Clone)]
pub struct StronglyMonotoneOperator
{
    pub mu: f64,
}

impl StronglyMonotoneOperator
{
    pub fn new(mu: f64) -> Self
    {
        StronglyMonotoneOperator { mu }
    }
}

impl FunctionClass for StronglyMonotoneOperator
{
    fn name(&self) -> &str
    {
        "StronglyMonotoneOperator"
    }

    fn validate(&self) -> Result<(), ClassParameterError>
    {
        ClassParameterError::check_positive(self.name(), "mu", self.mu)
    }

    fn reuse_gradient(&self) -> bool
    {
        false
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        let mu = self.mu;

        unordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            let dg = &tk.gradient - &tl.gradient;

            (mu * dx.norm_sq()).le(dg.inner(&dx))
        })
    }
}

//

/// Lipschitz continuous operator
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// \\|g_k - g_l\\|^2 \le L^2 \\|x_k - x_l\\|^2
/// \\]
/// for every pair \\(k < l\\), with \\(L > 0\\). Single-valued.
#[derive(Debug, Clone)]
pub struct LipschitzOperator
{
    pub l: f64,
}

impl LipschitzOperator
{
    pub fn new(l: f64) -> Self
    {
        LipschitzOperator { l }
    }
}

impl FunctionClass for LipschitzOperator
{
    fn name(&self) -> &str
    {
        "LipschitzOperator"
    }

    fn validate(&self) -> Result<(), ClassParameterError>
    {
        ClassParameterError::check_positive(self.name(), "l", self.l)
    }

    fn reuse_gradient(&self) -> bool
    {
        true
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        let l = self.l;

        unordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            let dg = &tk.gradient - &tl.gradient;

            dg.norm_sq().le(l * l * dx.norm_sq())
        })
    }
}

//

/// Cocoercive operator
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// \langle g_k - g_l, x_k - x_l \rangle \ge \beta \\|g_k - g_l\\|^2
/// \\]
/// for every pair \\(k < l\\), with \\(\beta > 0\\). Single-valued.
#[derive(Debug, Clone)]
pub struct CocoerciveOperator
{
    pub beta: f64,
}

impl CocoerciveOperator
{
    pub fn new(beta: f64) -> Self
    {
        CocoerciveOperator { beta }
    }
}

impl FunctionClass for CocoerciveOperator
{
    fn name(&self) -> &str
    {
        "CocoerciveOperator"
    }

    fn validate(&self) -> Result<(), ClassParameterError>
    {
        ClassParameterError::check_positive(self.name(), "beta", self.beta)
    }

    fn reuse_gradient(&self) -> bool
    {
        true
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        let beta = self.beta;

        unordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            let dg = &tk.gradient - &tl.gradient;

            (beta * dg.norm_sq()).le(dg.inner(&dx))
        })
    }
}

//

#[test]
fn test_monotone_pairs()
{
    use crate::algebra::{Point, Expression, BasisIndex, ValueIndex};

    let ts: Vec<Triple> = (0.. 4).map(|k| Triple {
        point: Point::from_basis(BasisIndex(2 * k)),
        gradient: Point::from_basis(BasisIndex(2 * k + 1)),
        value: Expression::from_value(ValueIndex(k)),
    }).collect();

    let cs = MonotoneOperator::new().interpolation(&ts);
    assert_eq!(cs.len(), 4 * 3 / 2);
    assert!(cs.iter().all(|c| c.pair.0 < c.pair.1));
    assert!(cs.iter().all(|c| c.constraint.expression().value_terms().count() == 0));

    assert!(LipschitzOperator::new(0.).validate().is_err());
    assert!(CocoerciveOperator::new(2.).validate().is_ok());
}
