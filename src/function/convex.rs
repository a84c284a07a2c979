use super::{FunctionClass, Triple, Interpolation, ordered_pairs, each_triple};
use crate::constraint::Constraint;
use crate::error::ClassParameterError;

//

// f_l - f_k + <g_l, x_k - x_l>
fn convexity(tk: &Triple, tl: &Triple) -> crate::algebra::Expression
{
    &tl.value - &tk.value + tl.gradient.inner(&(&tk.point - &tl.point))
}

/// Closed convex proper function
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// f_k \ge f_l + \langle g_l, x_k - x_l \rangle
/// \\]
/// for every ordered pair \\(k \ne l\\). Not differentiable: a new subgradient is taken at each evaluation.
#[derive(Debug, Clone, Default)]
pub struct ConvexFunction;

impl ConvexFunction
{
    pub fn new() -> Self
    {
        ConvexFunction
    }
}

impl FunctionClass for ConvexFunction
{
    fn name(&self) -> &str
    {
        "ConvexFunction"
    }

    fn reuse_gradient(&self) -> bool
    {
        false
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        ordered_pairs(triples, |tk, tl| {
            convexity(tk, tl).le(0.)
        })
    }
}

//

/// Strongly convex function
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// f_k \ge f_l + \langle g_l, x_k - x_l \rangle + \frac{\mu}{2} \\|x_k - x_l\\|^2
/// \\]
/// with \\(\mu > 0\\).
#[derive(Debug, Clone)]
pub struct StronglyConvexFunction
{
    pub mu: f64,
}

impl StronglyConvexFunction
{
    pub fn new(mu: f64) -> Self
    {
        StronglyConvexFunction { mu }
    }
}

impl FunctionClass for StronglyConvexFunction
{
    fn name(&self) -> &str
    {
        "StronglyConvexFunction"
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

        ordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            (convexity(tk, tl) + mu / 2. * dx.norm_sq()).le(0.)
        })
    }
}

//

/// Convex function with bounded subgradients
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// Convex and \\(M\\)-Lipschitz continuous:
/// [`ConvexFunction`] constraints plus \\(\\|g_k\\|^2 \le M^2\\) for every \\(k\\).
#[derive(Debug, Clone)]
pub struct ConvexLipschitzFunction
{
    pub m: f64,
}

impl ConvexLipschitzFunction
{
    pub fn new(m: f64) -> Self
    {
        ConvexLipschitzFunction { m }
    }
}

impl FunctionClass for ConvexLipschitzFunction
{
    fn name(&self) -> &str
    {
        "ConvexLipschitzFunction"
    }

    fn validate(&self) -> Result<(), ClassParameterError>
    {
        ClassParameterError::check_positive(self.name(), "m", self.m)
    }

    fn reuse_gradient(&self) -> bool
    {
        false
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        let m = self.m;

        let mut cs = each_triple(triples, |t| {
            t.gradient.norm_sq().le(m * m)
        });
        cs.extend(ordered_pairs(triples, |tk, tl| {
            convexity(tk, tl).le(0.)
        }));
        cs
    }
}

//

#[cfg(test)]
fn test_triples(n: usize) -> Vec<Triple>
{
    use crate::algebra::{Point, Expression, BasisIndex, ValueIndex};

    (0.. n).map(|k| Triple {
        point: Point::from_basis(BasisIndex(2 * k)),
        gradient: Point::from_basis(BasisIndex(2 * k + 1)),
        value: Expression::from_value(ValueIndex(k)),
    }).collect()
}

#[test]
fn test_convex_self_pair()
{
    use crate::algebra::{BasisIndex, ValueIndex};
    use crate::constraint::ConstraintKind;

    let ts = test_triples(3);
    let cs = ConvexFunction::new().interpolation(&ts);

    assert_eq!(cs.len(), 3 * 2);
    assert!(cs.iter().all(|c| c.pair.0 != c.pair.1));
    assert!(cs.iter().all(|c| c.constraint.kind() == ConstraintKind::LessEq));

    // (0, 1): f1 - f0 + <g1, x0 - x1> <= 0
    let c01 = &cs.iter().find(|c| c.pair == (0, 1)).unwrap().constraint;
    let e = c01.expression();
    assert_eq!(e.value_coefficient(ValueIndex(1)), 1.);
    assert_eq!(e.value_coefficient(ValueIndex(0)), -1.);
    assert_eq!(e.gram_coefficient(BasisIndex(3), BasisIndex(0)), 1.);
    assert_eq!(e.gram_coefficient(BasisIndex(3), BasisIndex(2)), -1.);

    // a triple against a copy of itself is trivial
    let same = vec![ts[0].clone(), ts[0].clone()];
    assert!(ConvexFunction::new().interpolation(&same).is_empty());
}

#[test]
fn test_strongly_convex_param()
{
    assert!(StronglyConvexFunction::new(0.1).validate().is_ok());
    assert!(StronglyConvexFunction::new(0.).validate().is_err());
    assert!(StronglyConvexFunction::new(f64::NAN).validate().is_err());
    assert!(ConvexLipschitzFunction::new(-1.).validate().is_err());

    let ts = test_triples(2);
    let cs = ConvexLipschitzFunction::new(1.).interpolation(&ts);
    assert_eq!(cs.len(), 2 + 2);
    assert_eq!(cs[0].pair, (0, 0));
}
