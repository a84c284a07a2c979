use super::{FunctionClass, Triple, Interpolation, ordered_pairs};
use crate::error::ClassParameterError;

//

/// Smooth (possibly nonconvex) function
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// Gradient is \\(L\\)-Lipschitz continuous:
/// \\[
/// f_k \ge f_l + \frac12 \langle g_k + g_l, x_k - x_l \rangle
/// + \frac{1}{4L} \\|g_k - g_l\\|^2 - \frac{L}{4} \\|x_k - x_l\\|^2
/// \\]
/// for every ordered pair \\(k \ne l\\).
#[derive(Debug, Clone)]
pub struct SmoothFunction
{
    pub l: f64,
}

impl SmoothFunction
{
    pub fn new(l: f64) -> Self
    {
        SmoothFunction { l }
    }
}

impl FunctionClass for SmoothFunction
{
    fn name(&self) -> &str
    {
        "SmoothFunction"
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

        ordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            let dg = &tk.gradient - &tl.gradient;
            let sg = &tk.gradient + &tl.gradient;

            (&tl.value - &tk.value
             + 0.5 * sg.inner(&dx)
             + 1. / (4. * l) * dg.norm_sq()
             - l / 4. * dx.norm_sq()).le(0.)
        })
    }
}

//

/// Smooth convex function
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// f_k \ge f_l + \langle g_l, x_k - x_l \rangle + \frac{1}{2L} \\|g_k - g_l\\|^2
/// \\]
/// for every ordered pair \\(k \ne l\\).
#[derive(Debug, Clone)]
pub struct SmoothConvexFunction
{
    pub l: f64,
}

impl SmoothConvexFunction
{
    pub fn new(l: f64) -> Self
    {
        SmoothConvexFunction { l }
    }
}

impl FunctionClass for SmoothConvexFunction
{
    fn name(&self) -> &str
    {
        "SmoothConvexFunction"
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

        ordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            let dg = &tk.gradient - &tl.gradient;

            (&tl.value - &tk.value
             + tl.gradient.inner(&dx)
             + 1. / (2. * l) * dg.norm_sq()).le(0.)
        })
    }
}

//

/// Smooth strongly convex function
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// f_k \ge f_l + \langle g_l, x_k - x_l \rangle
/// + \frac{1}{2(1 - \mu / L)} \left(
/// \frac1L \\|g_k - g_l\\|^2 + \mu \\|x_k - x_l\\|^2
/// - \frac{2\mu}{L} \langle g_k - g_l, x_k - x_l \rangle
/// \right)
/// \\]
/// for every ordered pair \\(k \ne l\\), with \\(0 \le \mu < L\\).
#[derive(Debug, Clone)]
pub struct SmoothStronglyConvexFunction
{
    pub mu: f64,
    pub l: f64,
}

impl SmoothStronglyConvexFunction
{
    pub fn new(mu: f64, l: f64) -> Self
    {
        SmoothStronglyConvexFunction { mu, l }
    }
}

impl FunctionClass for SmoothStronglyConvexFunction
{
    fn name(&self) -> &str
    {
        "SmoothStronglyConvexFunction"
    }

    fn validate(&self) -> Result<(), ClassParameterError>
    {
        ClassParameterError::check_positive(self.name(), "l", self.l)?;

        if !(self.mu.is_finite() && self.mu >= 0.) {
            return Err(ClassParameterError {
                class: self.name().to_string(),
                parameter: "mu",
                value: self.mu,
                reason: "must be finite and nonnegative",
            });
        }
        if self.mu >= self.l {
            return Err(ClassParameterError {
                class: self.name().to_string(),
                parameter: "mu",
                value: self.mu,
                reason: "must be less than l",
            });
        }
        Ok(())
    }

    fn reuse_gradient(&self) -> bool
    {
        true
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        let (mu, l) = (self.mu, self.l);
        let r = 1. / (2. * (1. - mu / l));

        ordered_pairs(triples, |tk, tl| {
            let dx = &tk.point - &tl.point;
            let dg = &tk.gradient - &tl.gradient;

            (&tl.value - &tk.value
             + tl.gradient.inner(&dx)
             + r * (1. / l * dg.norm_sq()
                    + mu * dx.norm_sq()
                    - 2. * mu / l * dg.inner(&dx))).le(0.)
        })
    }
}

//

#[test]
fn test_smooth_param()
{
    assert!(SmoothFunction::new(1.).validate().is_ok());
    assert!(SmoothConvexFunction::new(0.).validate().is_err());
    assert!(SmoothStronglyConvexFunction::new(0.1, 1.).validate().is_ok());
    assert!(SmoothStronglyConvexFunction::new(0., 1.).validate().is_ok());

    let e = SmoothStronglyConvexFunction::new(2., 1.).validate().unwrap_err();
    assert_eq!(e.parameter, "mu");
    assert_eq!(e.reason, "must be less than l");
    assert!(SmoothStronglyConvexFunction::new(1., 1.).validate().is_err());
    assert!(SmoothStronglyConvexFunction::new(-0.1, 1.).validate().is_err());
}

#[test]
fn test_smooth_strongly_convex_reduces()
{
    use crate::algebra::{Point, Expression, BasisIndex, ValueIndex};

    let ts: Vec<Triple> = (0.. 2).map(|k| Triple {
        point: Point::from_basis(BasisIndex(2 * k)),
        gradient: Point::from_basis(BasisIndex(2 * k + 1)),
        value: Expression::from_value(ValueIndex(k)),
    }).collect();

    // mu = 0 gives the smooth convex conditions
    let a = SmoothStronglyConvexFunction::new(0., 2.).interpolation(&ts);
    let b = SmoothConvexFunction::new(2.).interpolation(&ts);
    assert_eq!(a, b);
}
