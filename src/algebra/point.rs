use std::collections::BTreeMap;
use std::ops::{Add, Sub, Neg, Mul};
use super::{BasisIndex, Expression};
use crate::constraint::Constraint;

//

/// Symbolic point
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// A point (or a gradient) \\(p = \sum_i c_i b_i\\) as a sparse linear combination of basis vectors \\(b_i\\).
/// No numeric vector is ever formed; \\(\langle b_i, b_j \rangle\\) are the Gram matrix entries
/// which are left unknown until the SDP is solved.
/// 
/// Zero coefficients are never stored, so two points compare equal
/// exactly when their coefficient maps are identical.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point
{
    coefs: BTreeMap<BasisIndex, f64>,
}

impl Point
{
    /// Zero vector.
    pub fn zero() -> Self
    {
        Point::default()
    }

    pub(crate) fn from_basis(index: BasisIndex) -> Self
    {
        let mut coefs = BTreeMap::new();
        coefs.insert(index, 1.);
        Point { coefs }
    }

    /// Checks if the zero vector.
    pub fn is_zero(&self) -> bool
    {
        self.coefs.is_empty()
    }

    /// Coefficient of a basis vector.
    /// 
    /// Returns `0.` for basis vectors the point does not use.
    pub fn coefficient(&self, index: BasisIndex) -> f64
    {
        self.coefs.get(&index).copied().unwrap_or(0.)
    }

    /// Nonzero terms in ascending order of basis index.
    pub fn terms(&self) -> impl Iterator<Item=(BasisIndex, f64)> + '_
    {
        self.coefs.iter().map(|(i, c)| (*i, *c))
    }

    /// Calculates \\(\alpha x + p\\) where \\(p\\) is `self`.
    pub fn axpy(&self, alpha: f64, x: &Point) -> Point
    {
        let mut coefs = self.coefs.clone();
        for (i, c) in x.coefs.iter() {
            let e = coefs.entry(*i).or_insert(0.);
            *e += alpha * c;
            if *e == 0. {
                coefs.remove(i);
            }
        }
        Point { coefs }
    }

    /// Calculates \\(\alpha p\\).
    pub fn scale(&self, alpha: f64) -> Point
    {
        if alpha == 0. {
            return Point::zero();
        }
        Point {
            coefs: self.coefs.iter()
                   .map(|(i, c)| (*i, alpha * c))
                   .filter(|(_, c)| *c != 0.)
                   .collect(),
        }
    }

    /// Inner product \\(\langle p, q \rangle\\).
    /// 
    /// Returns an expression linear in the Gram matrix entries.
    /// \\(\langle b_i, b_j \rangle\\) and \\(\langle b_j, b_i \rangle\\) fold into the same entry.
    pub fn inner(&self, q: &Point) -> Expression
    {
        let mut e = Expression::zero();
        for (i, ci) in self.coefs.iter() {
            for (j, cj) in q.coefs.iter() {
                e.add_gram(*i, *j, ci * cj);
            }
        }
        e
    }

    /// Squared norm \\(\\|p\\|^2 = \sum_i \sum_j c_i c_j \langle b_i, b_j \rangle\\).
    /// 
    /// The zero point gives the constant zero with no Gram entry.
    pub fn norm_sq(&self) -> Expression
    {
        self.inner(self)
    }

    /// Constraint `self == q`.
    /// 
    /// Stated as \\(\\|p - q\\|^2 = 0\\), linear in the Gram matrix entries,
    /// which forces the points to coincide since the Gram matrix is positive semidefinite.
    /// Identical points give a constant constraint which holds trivially.
    pub fn equals(&self, q: &Point) -> Constraint
    {
        (self - q).norm_sq().equals(0.)
    }
}

//

macro_rules! point_binop {
    ($tr:ident, $f:ident, $alpha:expr) => {
        impl $tr<&Point> for &Point
        {
            type Output = Point;
            fn $f(self, rhs: &Point) -> Point
            {
                self.axpy($alpha, rhs)
            }
        }

        impl $tr<Point> for Point
        {
            type Output = Point;
            fn $f(self, rhs: Point) -> Point
            {
                self.axpy($alpha, &rhs)
            }
        }

        impl $tr<&Point> for Point
        {
            type Output = Point;
            fn $f(self, rhs: &Point) -> Point
            {
                self.axpy($alpha, rhs)
            }
        }

        impl $tr<Point> for &Point
        {
            type Output = Point;
            fn $f(self, rhs: Point) -> Point
            {
                self.axpy($alpha, &rhs)
            }
        }
    };
}

point_binop!(Add, add, 1.);
point_binop!(Sub, sub, -1.);

impl Neg for &Point
{
    type Output = Point;
    fn neg(self) -> Point
    {
        self.scale(-1.)
    }
}

impl Neg for Point
{
    type Output = Point;
    fn neg(self) -> Point
    {
        self.scale(-1.)
    }
}

impl Mul<f64> for &Point
{
    type Output = Point;
    fn mul(self, rhs: f64) -> Point
    {
        self.scale(rhs)
    }
}

impl Mul<f64> for Point
{
    type Output = Point;
    fn mul(self, rhs: f64) -> Point
    {
        self.scale(rhs)
    }
}

impl Mul<&Point> for f64
{
    type Output = Point;
    fn mul(self, rhs: &Point) -> Point
    {
        rhs.scale(self)
    }
}

impl Mul<Point> for f64
{
    type Output = Point;
    fn mul(self, rhs: Point) -> Point
    {
        rhs.scale(self)
    }
}

impl core::fmt::Display for Point {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (i, c) in self.coefs.iter() {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}*{}", c, i)?;
            first = false;
        }
        Ok(())
    }
}

//

#[test]
fn test_point_canonical()
{
    let x = Point::from_basis(BasisIndex(0));
    let y = Point::from_basis(BasisIndex(1));

    let p = 2. * (&x + &y);
    let q = &x + &y + &x + &y;
    assert_eq!(p, q);

    let r = &x - 0.5 * &y + 0.5 * &y;
    assert_eq!(r, x);
    assert_eq!(r.terms().count(), 1);

    let z = &x - &x;
    assert!(z.is_zero());
    assert_eq!(z, Point::zero());
}

#[test]
fn test_point_norm_sq()
{
    let x = Point::from_basis(BasisIndex(0));
    let y = Point::from_basis(BasisIndex(2));

    // |x - 3y|^2 = G00 - 6 G02 + 9 G22
    let e = (&x - 3. * &y).norm_sq();
    assert_eq!(e.gram_coefficient(BasisIndex(0), BasisIndex(0)), 1.);
    assert_eq!(e.gram_coefficient(BasisIndex(0), BasisIndex(2)), -6.);
    assert_eq!(e.gram_coefficient(BasisIndex(2), BasisIndex(0)), -6.);
    assert_eq!(e.gram_coefficient(BasisIndex(2), BasisIndex(2)), 9.);

    // folded to the same entry in either order
    assert_eq!(x.inner(&y), y.inner(&x));

    let zero = Point::zero().norm_sq();
    assert!(zero.is_constant());
    assert_eq!(zero.constant(), 0.);
    assert_eq!(zero.gram_terms().count(), 0);
}

#[test]
fn test_point_equals()
{
    use crate::constraint::ConstraintKind;

    let x = Point::from_basis(BasisIndex(0));
    let y = Point::from_basis(BasisIndex(1));

    let c = x.equals(&y);
    assert_eq!(c.kind(), ConstraintKind::Equal);
    assert_eq!(c.expression(), &(&x - &y).norm_sq());

    assert!((&x + &y).equals(&(&y + &x)).is_trivially_satisfied());
}
