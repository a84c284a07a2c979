use float_eq::assert_float_eq;
use totsu_pep::prelude::*;
use totsu_pep::*;

//

/// One gradient step of size `gamma` from `x0` with `||x0 - xs||^2 <= 1`.
///
/// Returns the session, the function, the stationary point and the two iterates.
fn gradient_descent_1(l: f64, gamma: f64) -> (Pep, FunctionId, Point, Point, Point)
{
    let mut pep = Pep::new();
    let f = pep.declare_function(SmoothConvexFunction::new(l)).unwrap();

    let xs = pep.stationary_point(f).unwrap();
    let x0 = pep.set_initial_point().unwrap();

    let (x1, _, _) = gradient_step(&mut pep, f, &x0, gamma).unwrap();

    pep.set_initial_condition((&x0 - &xs).norm_sq().le(1.)).unwrap();

    (pep, f, xs, x0, x1)
}

#[test]
fn test_gd_gradient_norm()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut pep, f, _, _, x1) = gradient_descent_1(1., 1.);

    let g1 = pep.gradient(f, &x1).unwrap();
    pep.set_performance_metric(g1.norm_sq()).unwrap();

    let sol = pep.solve().unwrap();
    println!("{:?}", sol.worst_case_value());

    assert_eq!(pep.status(), SolveStatus::Solved);
    assert_float_eq!(sol.worst_case_value(), 0.25, abs <= 1e-3);
}

#[test]
fn test_gd_function_value()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let l = 2.;
    let (mut pep, f, xs, _, x1) = gradient_descent_1(l, 1. / l);

    let fs = pep.value(f, &xs).unwrap();
    let f1 = pep.value(f, &x1).unwrap();
    pep.set_performance_metric(&f1 - &fs).unwrap();

    let sol = pep.solve().unwrap();
    println!("{:?}", sol.worst_case_value());

    // L / (4N + 2)
    assert_float_eq!(sol.worst_case_value(), l / 6., abs <= 1e-3);
    assert!(sol.warnings().is_empty());
}

#[test]
fn test_gd_certificate()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut pep, f, _, _, x1) = gradient_descent_1(1., 1.);

    let g1 = pep.gradient(f, &x1).unwrap();
    pep.set_performance_metric(g1.norm_sq()).unwrap();

    let sol = pep.solve().unwrap();
    let cert = sol.certificate().unwrap();
    println!("{}", cert);

    let check = cert.verify();
    println!("{:?}", check);
    assert!(check.is_valid(1e-3));
    assert_float_eq!(check.bound, sol.worst_case_value(), abs <= 1e-3);

    // the bound is the multiplier of ||x0 - xs||^2 - 1 <= 0
    let init = cert.entries().iter()
               .find(|e| e.origin == ConstraintOrigin::InitialCondition)
               .unwrap();
    assert_float_eq!(init.multiplier, 0.25, abs <= 1e-3);

    assert!(cert.active(1e-4).count() > 0);
    assert!(cert.active(1e-4).all(|e| e.multiplier > 0.));
}

#[test]
fn test_gd_no_certificate()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (pep, f, _, _, x1) = gradient_descent_1(1., 1.);
    let mut pep = pep.par(|p| {
        p.certificate = false;
    });

    let g1 = pep.gradient(f, &x1).unwrap();
    pep.set_performance_metric(g1.norm_sq()).unwrap();

    let sol = pep.solve().unwrap();
    assert!(sol.certificate().is_none());
}

fn gd_function_value(extra: Option<f64>) -> f64
{
    let (mut pep, f, xs, x0, x1) = gradient_descent_1(1., 1.);

    let fs = pep.value(f, &xs).unwrap();
    let f0 = pep.value(f, &x0).unwrap();
    let f1 = pep.value(f, &x1).unwrap();

    if let Some(bound) = extra {
        pep.set_initial_condition((&f0 - &fs).le(bound)).unwrap();
    }
    pep.set_performance_metric(&f1 - &fs).unwrap();

    let sol = pep.solve().unwrap();
    println!("{:?}", sol.worst_case_value());
    sol.worst_case_value()
}

#[test]
fn test_gd_extra_condition()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let without = gd_function_value(None);
    let with = gd_function_value(Some(0.1));

    assert_float_eq!(without, 1. / 6., abs <= 1e-3);
    // an extra condition only shrinks the feasible set
    assert!(with <= without + 1e-3);
    assert!(with <= 0.1 + 1e-3);
    assert!(with >= -1e-3);
}

#[test]
fn test_gd_worst_case_point()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut pep, f, xs, x0, x1) = gradient_descent_1(1., 1.);

    let g1 = pep.gradient(f, &x1).unwrap();
    pep.set_performance_metric(g1.norm_sq()).unwrap();

    let sol = pep.solve().unwrap();

    let d0 = sol.eval_point(&(&x0 - &xs));
    assert_eq!(d0.len(), pep.basis().len());

    let norm_sq: f64 = d0.iter().map(|v| v * v).sum();
    assert_float_eq!(norm_sq, sol.eval(&(&x0 - &xs).norm_sq()), abs <= 1e-3);
    assert!(norm_sq <= 1. + 1e-3);

    let gn: f64 = sol.eval_point(&g1).iter().map(|v| v * v).sum();
    assert_float_eq!(gn, sol.worst_case_value(), abs <= 1e-3);
}
