use totsu_pep::*;

//

#[test]
fn test_canonical_points()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let x = pep.set_initial_point().unwrap();
    let y = pep.set_initial_point().unwrap();

    let p = &(&x + &y) - &y;
    assert_eq!(p, x);

    let z = &x - &x;
    assert!(z.is_zero());
    assert_eq!(z.norm_sq(), Expression::zero());
    assert!(z.norm_sq().is_constant());

    // <x, y> and <y, x> fold into one Gram entry
    let e = &x.inner(&y) - &y.inner(&x);
    assert!(e.is_constant());
    assert_eq!(e.constant(), 0.);
}

#[test]
fn test_expression_norm()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let x = pep.set_initial_point().unwrap();
    let y = pep.set_initial_point().unwrap();

    let e = (&x - &y).norm_sq();
    let (i, j) = (x.terms().next().unwrap().0, y.terms().next().unwrap().0);

    assert_eq!(e.gram_coefficient(i, i), 1.);
    assert_eq!(e.gram_coefficient(j, j), 1.);
    assert_eq!(e.gram_coefficient(i, j), -2.);
    assert_eq!(e.gram_coefficient(j, i), -2.);
}

#[test]
fn test_constraint_kinds()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(ConvexFunction::new()).unwrap();
    let x = pep.set_initial_point().unwrap();
    let v = pep.value(f, &x).unwrap();

    let c = v.ge(1.);
    assert_eq!(c.kind(), ConstraintKind::LessEq);
    assert_eq!(c.expression().value_terms().next().map(|(_, a)| a), Some(-1.));
    assert_eq!(c.expression().constant(), 1.);

    assert!(Expression::from(-1.).le(0.).is_trivially_satisfied());
    assert!(Expression::from(1.).equals(0.).is_trivially_violated());
}
