//! Primitive steps of first-order methods

use crate::algebra::{Point, Expression};
use crate::error::PepError;
use crate::function::FunctionId;
use crate::pep::Pep;

/// Explicit gradient step \\(x_1 = x_0 - \gamma g_0\\) with \\(g_0 \in \partial f(x_0)\\).
///
/// Returns a tuple of \\(x_1\\), \\(g_0\\) and \\(f(x_0)\\).
pub fn gradient_step(pep: &mut Pep, f: FunctionId, x0: &Point, gamma: f64) -> Result<(Point, Point, Expression), PepError>
{
    let (g0, f0) = pep.oracle(f, x0)?;
    let x1 = x0 - gamma * &g0;

    Ok((x1, g0, f0))
}

/// Proximal step \\(x = x_0 - \gamma g\\) with \\(g \in \partial f(x)\\).
///
/// The gradient at the unknown output is a new basis vector,
/// so the step is exact rather than solved numerically.
/// Returns a tuple of \\(x\\), \\(g\\) and \\(f(x)\\).
pub fn proximal_step(pep: &mut Pep, f: FunctionId, x0: &Point, gamma: f64) -> Result<(Point, Point, Expression), PepError>
{
    let gx = pep.new_gradient(f)?;
    let fx = pep.new_value()?;
    let x = x0 - gamma * &gx;
    pep.add_point(f, &x, &gx, &fx)?;

    Ok((x, gx, fx))
}

//

#[test]
fn test_proximal_step()
{
    use crate::function::ConvexFunction;

    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(ConvexFunction::new()).unwrap();
    let x0 = pep.set_initial_point().unwrap();

    let (x1, g1, _) = proximal_step(&mut pep, f, &x0, 2.).unwrap();
    assert_eq!(pep.triples(f).unwrap().len(), 1);
    assert_eq!(&x1 + &(2. * &g1), x0);

    let (x2, g0, _) = gradient_step(&mut pep, f, &x0, 1.).unwrap();
    assert_eq!(pep.triples(f).unwrap().len(), 2);
    assert_eq!(x2, &x0 - &g0);
}
