use totsu_pep::prelude::*;
use totsu_pep::*;

//

#[test]
fn test_infeasible()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(SmoothConvexFunction::new(1.)).unwrap();

    let xs = pep.stationary_point(f).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let g0 = pep.gradient(f, &x0).unwrap();

    pep.set_initial_condition((&x0 - &xs).norm_sq().le(-1.)).unwrap();
    pep.set_performance_metric(g0.norm_sq()).unwrap();

    let e = pep.solve().unwrap_err();
    println!("{}", e);

    assert_eq!(e, PepError::Solve(SolveError::Infeasible));
    assert!(!e.is_construction_time());
    assert_eq!(pep.status(), SolveStatus::Infeasible);
}

#[test]
fn test_trivially_infeasible()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(ConvexFunction::new()).unwrap();

    let x0 = pep.set_initial_point().unwrap();
    let f0 = pep.value(f, &x0).unwrap();

    pep.set_initial_condition(Expression::from(1.).le(0.)).unwrap();
    pep.set_performance_metric(f0).unwrap();

    let e = pep.solve().unwrap_err();
    assert_eq!(e, PepError::Solve(SolveError::Infeasible));
}

#[test]
fn test_unbounded_then_terminal()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(SmoothConvexFunction::new(1.)).unwrap();

    let _ = pep.stationary_point(f).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let (x1, _, _) = gradient_step(&mut pep, f, &x0, 1.).unwrap();
    let g1 = pep.gradient(f, &x1).unwrap();

    // no initial condition
    pep.set_performance_metric(g1.norm_sq()).unwrap();

    let e = pep.solve().unwrap_err();
    println!("{}", e);

    assert_eq!(e, PepError::Solve(SolveError::Unbounded));
    assert_eq!(pep.status(), SolveStatus::Unbounded);

    // never retried
    let e2 = pep.solve().unwrap_err();
    assert_eq!(e2, e);
    assert_eq!(pep.status(), SolveStatus::Unbounded);
}

#[test]
fn test_unbounded_gradient_norm()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(SmoothConvexFunction::new(1.)).unwrap();

    let _ = pep.stationary_point(f).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let g0 = pep.gradient(f, &x0).unwrap();

    pep.set_performance_metric(g0.norm_sq()).unwrap();

    let e = pep.solve().unwrap_err();
    assert_eq!(e, PepError::Solve(SolveError::Unbounded));
    assert!(!e.is_construction_time());
}

#[test]
fn test_excess_iter()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new().par(|p| {
        p.max_iter = Some(1);
    });
    let f = pep.declare_function(SmoothConvexFunction::new(1.)).unwrap();

    let xs = pep.stationary_point(f).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let (x1, _, _) = gradient_step(&mut pep, f, &x0, 1.).unwrap();
    let g1 = pep.gradient(f, &x1).unwrap();

    pep.set_initial_condition((&x0 - &xs).norm_sq().le(1.)).unwrap();
    pep.set_performance_metric(g1.norm_sq()).unwrap();

    let e = pep.solve().unwrap_err();
    assert_eq!(e, PepError::Solve(SolveError::Solver(SolverError::ExcessIter)));
    assert_eq!(pep.status(), SolveStatus::SolverError);
}

#[test]
fn test_class_parameter()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();

    let e = pep.declare_function(SmoothStronglyConvexFunction::new(2., 1.)).unwrap_err();
    println!("{}", e);
    assert!(matches!(e, PepError::ClassParameter(_)));
    assert!(e.is_construction_time());

    // poisoned
    let e = pep.set_initial_point().unwrap_err();
    assert_eq!(e, PepError::Construction(ConstructionError::Poisoned));
    let e = pep.solve().unwrap_err();
    assert_eq!(e, PepError::Construction(ConstructionError::Poisoned));
}

#[test]
fn test_metric()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(ConvexFunction::new()).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let f0 = pep.value(f, &x0).unwrap();

    let e = pep.compile().unwrap_err();
    assert_eq!(e, PepError::Construction(ConstructionError::MissingMetric));

    let mut pep = Pep::new();
    let f = pep.declare_function(ConvexFunction::new()).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let f1 = pep.value(f, &x0).unwrap();

    pep.set_performance_metric(f1.clone()).unwrap();
    let e = pep.set_performance_metric(f1).unwrap_err();
    assert_eq!(e, PepError::Construction(ConstructionError::MetricAlreadySet));

    // a value of another session
    let mut pep = Pep::new();
    let e = pep.set_performance_metric(f0).unwrap_err();
    assert!(matches!(e, PepError::Construction(ConstructionError::UnknownValue { .. })));
}

#[test]
fn test_conflict()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let x0 = pep.set_initial_point().unwrap();

    pep.set_initial_condition(x0.norm_sq().equals(1.)).unwrap();

    let e = pep.set_initial_condition(x0.norm_sq().equals(2.)).unwrap_err();
    println!("{}", e);
    assert!(matches!(e, PepError::ConstraintConflict(ConstraintConflictError::Contradictory { .. })));
}

#[test]
fn test_unknown_function()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut other = Pep::new();
    let _ = other.declare_function(ConvexFunction::new()).unwrap();
    let h = other.declare_function(ConvexFunction::new()).unwrap();

    let mut pep = Pep::new();
    let _ = pep.declare_function(ConvexFunction::new()).unwrap();
    let x0 = pep.set_initial_point().unwrap();

    let e = pep.gradient(h, &x0).unwrap_err();
    assert_eq!(e, PepError::Construction(ConstructionError::UnknownFunction { function: h, declared: 1 }));
}

#[test]
fn test_basis_capacity()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new().par(|p| {
        p.max_basis = 2;
    });

    let _ = pep.set_initial_point().unwrap();
    let _ = pep.set_initial_point().unwrap();

    let e = pep.set_initial_point().unwrap_err();
    assert_eq!(e, PepError::Construction(ConstructionError::BasisCapacity { capacity: 2 }));
}
