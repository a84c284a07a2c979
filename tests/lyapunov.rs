use float_eq::assert_float_eq;
use totsu_pep::*;

//

#[test]
fn test_gd_lyapunov()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let l = 1.;
    let gamma = 1. / l;
    let n = 10.;

    let mut pep = Pep::new();
    let f = pep.declare_function(SmoothConvexFunction::new(l)).unwrap();

    let xs = pep.stationary_point(f).unwrap();
    let fs = pep.value(f, &xs).unwrap();

    let xn = pep.set_initial_point().unwrap();
    let (xnp1, _, fn_) = gradient_step(&mut pep, f, &xn, gamma).unwrap();
    let fnp1 = pep.value(f, &xnp1).unwrap();

    let init = n * (&fn_ - &fs) + l / 2. * (&xn - &xs).norm_sq();
    let fin = (n + 1.) * (&fnp1 - &fs) + l / 2. * (&xnp1 - &xs).norm_sq();

    // homogeneous, no initial condition
    pep.set_performance_metric(&fin - &init).unwrap();

    let sol = pep.solve().unwrap();
    println!("{:?}", sol.worst_case_value());

    assert_float_eq!(sol.worst_case_value(), 0., abs <= 1e-3);
}

#[test]
fn test_proximal_gradient()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let l = 1.;
    let gamma = 1. / l;

    let mut pep = Pep::new();
    let f = pep.declare_function(SmoothConvexFunction::new(l)).unwrap();
    let h = pep.declare_function(ConvexFunction::new()).unwrap();
    let sum = pep.declare_sum(&[(f, 1.), (h, 1.)]).unwrap();

    let xs = pep.stationary_point(sum).unwrap();
    let x0 = pep.set_initial_point().unwrap();

    let (y0, _, _) = gradient_step(&mut pep, f, &x0, gamma).unwrap();
    let (x1, _, _) = proximal_step(&mut pep, h, &y0, gamma).unwrap();

    pep.set_initial_condition((&x0 - &xs).norm_sq().le(1.)).unwrap();
    pep.set_performance_metric((&x1 - &xs).norm_sq()).unwrap();

    let sol = pep.solve().unwrap();
    println!("{:?}", sol.worst_case_value());

    // nonexpansive without strong convexity
    assert_float_eq!(sol.worst_case_value(), 1., abs <= 1e-3);
}
