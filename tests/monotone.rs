use float_eq::assert_float_eq;
use totsu_pep::*;

//

/// Accelerated proximal point method on a maximally monotone operator,
/// `n` resolvent steps of size `alpha`.
fn accelerated_proximal_point(n: usize, alpha: f64) -> f64
{
    let mut pep = Pep::new();
    let a = pep.declare_function(MonotoneOperator::new()).unwrap();

    let xs = pep.stationary_point(a).unwrap();
    let x0 = pep.set_initial_point().unwrap();

    pep.set_initial_condition((&x0 - &xs).norm_sq().le(1.)).unwrap();

    let mut x = vec![x0.clone(); n + 1];
    let mut y = vec![x0; n + 1];
    for i in 0.. n - 1 {
        let (xi, _, _) = proximal_step(&mut pep, a, &y[i + 1], alpha).unwrap();
        x[i + 1] = xi;

        let t = i as f64 / (i as f64 + 2.);
        y[i + 2] = &(&x[i + 1] + &(t * &(&x[i + 1] - &x[i]))) - &(t * &(&x[i] - &y[i]));
    }
    let (xn, _, _) = proximal_step(&mut pep, a, &y[n], alpha).unwrap();
    x[n] = xn;

    pep.set_performance_metric((&x[n] - &y[n]).norm_sq()).unwrap();

    let sol = pep.solve().unwrap();
    println!("{:?}", sol.worst_case_value());

    sol.worst_case_value()
}

#[test]
fn test_accelerated_proximal_point()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // 1 / n^2
    assert_float_eq!(accelerated_proximal_point(2, 2.), 0.25, abs <= 1e-3);
}

#[test]
fn test_cocoercive_step()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // x1 = x0 - A(x0) with A 1/2-cocoercive is nonexpansive
    let mut pep = Pep::new();
    let a = pep.declare_function(CocoerciveOperator::new(0.5)).unwrap();

    let xs = pep.stationary_point(a).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let (x1, _, _) = gradient_step(&mut pep, a, &x0, 1.).unwrap();

    pep.set_initial_condition((&x0 - &xs).norm_sq().le(1.)).unwrap();
    pep.set_performance_metric((&x1 - &xs).norm_sq()).unwrap();

    let sol = pep.solve().unwrap();
    println!("{:?}", sol.worst_case_value());

    assert_float_eq!(sol.worst_case_value(), 1., abs <= 1e-3);

    let check = sol.certificate().unwrap().verify();
    assert!(check.is_valid(1e-3));
}
