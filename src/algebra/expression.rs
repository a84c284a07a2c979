use std::collections::BTreeMap;
use std::ops::{Add, Sub, Neg, Mul};
use super::{BasisIndex, ValueIndex};
use crate::constraint::{Constraint, ConstraintKind};

//

/// Symbolic scalar expression
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// e = \sum_k a_k F_k + \sum_{i \le j} q_{ij} G_{ij} + c,
/// \\]
/// where \\(F_k\\) are function values, \\(G_{ij} = \langle b_i, b_j \rangle\\) are Gram matrix entries
/// and \\(c\\) is a constant.
/// Function values and inner products of [`crate::Point`]s are expressions;
/// so are performance metrics and both sides of constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression
{
    values: BTreeMap<ValueIndex, f64>,
    gram: BTreeMap<(BasisIndex, BasisIndex), f64>,
    constant: f64,
}

fn sorted(i: BasisIndex, j: BasisIndex) -> (BasisIndex, BasisIndex)
{
    if i <= j {
        (i, j)
    }
    else {
        (j, i)
    }
}

impl Expression
{
    /// Constant zero.
    pub fn zero() -> Self
    {
        Expression::default()
    }

    pub(crate) fn from_value(index: ValueIndex) -> Self
    {
        let mut values = BTreeMap::new();
        values.insert(index, 1.);
        Expression {
            values,
            ..Default::default()
        }
    }

    pub(crate) fn add_gram(&mut self, i: BasisIndex, j: BasisIndex, coef: f64)
    {
        let key = sorted(i, j);
        let e = self.gram.entry(key).or_insert(0.);
        *e += coef;
        if *e == 0. {
            self.gram.remove(&key);
        }
    }

    fn add_value(&mut self, k: ValueIndex, coef: f64)
    {
        let e = self.values.entry(k).or_insert(0.);
        *e += coef;
        if *e == 0. {
            self.values.remove(&k);
        }
    }

    /// Constant term.
    pub fn constant(&self) -> f64
    {
        self.constant
    }

    /// Checks if the expression has neither function values nor Gram entries.
    pub fn is_constant(&self) -> bool
    {
        self.values.is_empty() && self.gram.is_empty()
    }

    /// Coefficient of \\(G_{ij}\\), the same as of \\(G_{ji}\\).
    pub fn gram_coefficient(&self, i: BasisIndex, j: BasisIndex) -> f64
    {
        self.gram.get(&sorted(i, j)).copied().unwrap_or(0.)
    }

    /// Coefficient of a function value.
    pub fn value_coefficient(&self, k: ValueIndex) -> f64
    {
        self.values.get(&k).copied().unwrap_or(0.)
    }

    /// Nonzero Gram terms `((i, j), q_ij)` with `i <= j`, in ascending order.
    pub fn gram_terms(&self) -> impl Iterator<Item=((BasisIndex, BasisIndex), f64)> + '_
    {
        self.gram.iter().map(|(k, c)| (*k, *c))
    }

    /// Nonzero function value terms in ascending order.
    pub fn value_terms(&self) -> impl Iterator<Item=(ValueIndex, f64)> + '_
    {
        self.values.iter().map(|(k, c)| (*k, *c))
    }

    /// Same linear part without the constant.
    pub fn linear_part(&self) -> Expression
    {
        Expression {
            constant: 0.,
            ..self.clone()
        }
    }

    /// Calculates \\(\alpha x + e\\) where \\(e\\) is `self`.
    pub fn axpy(&self, alpha: f64, x: &Expression) -> Expression
    {
        let mut e = self.clone();
        for (k, c) in x.values.iter() {
            e.add_value(*k, alpha * c);
        }
        for ((i, j), c) in x.gram.iter() {
            e.add_gram(*i, *j, alpha * c);
        }
        e.constant += alpha * x.constant;
        e
    }

    /// Calculates \\(\alpha e\\).
    pub fn scale(&self, alpha: f64) -> Expression
    {
        Expression::zero().axpy(alpha, self)
    }

    /// Largest absolute coefficient of the linear part.
    pub fn max_abs_coefficient(&self) -> f64
    {
        self.values.values()
        .chain(self.gram.values())
        .fold(0., |m: f64, c| m.max(c.abs()))
    }

    /// Constraint `self <= rhs`.
    pub fn le<E: Into<Expression>>(&self, rhs: E) -> Constraint
    {
        Constraint::new(self - &rhs.into(), ConstraintKind::LessEq)
    }

    /// Constraint `self >= rhs`.
    pub fn ge<E: Into<Expression>>(&self, rhs: E) -> Constraint
    {
        Constraint::new(&rhs.into() - self, ConstraintKind::LessEq)
    }

    /// Constraint `self == rhs`.
    pub fn equals<E: Into<Expression>>(&self, rhs: E) -> Constraint
    {
        Constraint::new(self - &rhs.into(), ConstraintKind::Equal)
    }
}

impl From<f64> for Expression
{
    fn from(c: f64) -> Self
    {
        Expression {
            constant: c,
            ..Default::default()
        }
    }
}

//

macro_rules! expression_binop {
    ($tr:ident, $f:ident, $alpha:expr) => {
        impl $tr<&Expression> for &Expression
        {
            type Output = Expression;
            fn $f(self, rhs: &Expression) -> Expression
            {
                self.axpy($alpha, rhs)
            }
        }

        impl $tr<Expression> for Expression
        {
            type Output = Expression;
            fn $f(self, rhs: Expression) -> Expression
            {
                self.axpy($alpha, &rhs)
            }
        }

        impl $tr<&Expression> for Expression
        {
            type Output = Expression;
            fn $f(self, rhs: &Expression) -> Expression
            {
                self.axpy($alpha, rhs)
            }
        }

        impl $tr<Expression> for &Expression
        {
            type Output = Expression;
            fn $f(self, rhs: Expression) -> Expression
            {
                self.axpy($alpha, &rhs)
            }
        }

        impl $tr<f64> for Expression
        {
            type Output = Expression;
            fn $f(mut self, rhs: f64) -> Expression
            {
                self.constant += $alpha * rhs;
                self
            }
        }

        impl $tr<f64> for &Expression
        {
            type Output = Expression;
            fn $f(self, rhs: f64) -> Expression
            {
                self.clone().$f(rhs)
            }
        }
    };
}

expression_binop!(Add, add, 1.);
expression_binop!(Sub, sub, -1.);

impl Neg for &Expression
{
    type Output = Expression;
    fn neg(self) -> Expression
    {
        self.scale(-1.)
    }
}

impl Neg for Expression
{
    type Output = Expression;
    fn neg(self) -> Expression
    {
        self.scale(-1.)
    }
}

impl Mul<f64> for &Expression
{
    type Output = Expression;
    fn mul(self, rhs: f64) -> Expression
    {
        self.scale(rhs)
    }
}

impl Mul<f64> for Expression
{
    type Output = Expression;
    fn mul(self, rhs: f64) -> Expression
    {
        self.scale(rhs)
    }
}

impl Mul<&Expression> for f64
{
    type Output = Expression;
    fn mul(self, rhs: &Expression) -> Expression
    {
        rhs.scale(self)
    }
}

impl Mul<Expression> for f64
{
    type Output = Expression;
    fn mul(self, rhs: Expression) -> Expression
    {
        rhs.scale(self)
    }
}

impl core::fmt::Display for Expression {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (k, c) in self.values.iter() {
            write!(f, "{}*{} + ", c, k)?;
        }
        for ((i, j), c) in self.gram.iter() {
            write!(f, "{}*<{},{}> + ", c, i, j)?;
        }
        write!(f, "{}", self.constant)
    }
}

//

#[test]
fn test_expression_algebra()
{
    let f0 = Expression::from_value(ValueIndex(0));
    let f1 = Expression::from_value(ValueIndex(1));

    let e = 3. * (&f0 - &f1) + 1.;
    assert_eq!(e.value_coefficient(ValueIndex(0)), 3.);
    assert_eq!(e.value_coefficient(ValueIndex(1)), -3.);
    assert_eq!(e.constant(), 1.);

    let z = &e - &e;
    assert!(z.is_constant());
    assert_eq!(z, Expression::zero());

    let c = f0.le(&f1 + 2.);
    assert_eq!(c.kind(), ConstraintKind::LessEq);
    assert_eq!(c.expression().constant(), -2.);
    assert_eq!(c.expression().value_coefficient(ValueIndex(1)), -1.);
}
