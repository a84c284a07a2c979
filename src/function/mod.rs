//! Function classes
//! 
//! A function (or an operator) is only known through the triples
//! \\((x_k, g_k, f_k)\\) of points, gradients and values evaluated on it.
//! Its class states which sets of triples some member of the class can interpolate,
//! as pairwise constraints on the triples.
//! New classes are added by implementing [`FunctionClass`];
//! the session needs no change.

use crate::algebra::{Point, Expression};
use crate::constraint::Constraint;
use crate::error::ClassParameterError;

//

/// Handle of a function declared in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub(crate) usize);

impl FunctionId
{
    pub fn get(&self) -> usize
    {
        self.0
    }
}

impl core::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Evaluated triple of a point, a gradient (or subgradient, or operator output) and a function value.
#[derive(Debug, Clone, PartialEq)]
pub struct Triple
{
    pub point: Point,
    pub gradient: Point,
    pub value: Expression,
}

/// Interpolation constraint generated for the pair `(k, l)` of triples.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation
{
    pub pair: (usize, usize),
    pub constraint: Constraint,
}

/// Function class trait
/// 
/// Implemented by each class of functions or operators.
pub trait FunctionClass: core::fmt::Debug + Send
{
    /// Name of the class used in logs and errors.
    fn name(&self) -> &str;

    /// Checks the class parameters.
    /// 
    /// Called once when the function is declared.
    /// Returns `Ok`, or `Err` if parameters violate the validity precondition of the class.
    fn validate(&self) -> Result<(), ClassParameterError>
    {
        Ok(())
    }

    /// Whether the oracle is single-valued.
    /// 
    /// If `true`, evaluating twice at the identical point returns the same gradient.
    /// If `false`, a new subgradient is introduced each time while the value is shared.
    fn reuse_gradient(&self) -> bool;

    /// Generates interpolation constraints for the evaluated triples.
    /// 
    /// Returns constraints tagged with the pair of triples they come from.
    /// * `triples` are the triples evaluated on the function, in evaluation order.
    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>;
}

//

/// Applies `rule` to every ordered pair `(k, l)`, `k != l`.
/// 
/// Constraints which hold trivially are dropped.
pub fn ordered_pairs<R>(triples: &[Triple], rule: R) -> Vec<Interpolation>
where R: Fn(&Triple, &Triple) -> Constraint
{
    let mut cs = Vec::new();
    for k in 0.. triples.len() {
        for l in 0.. triples.len() {
            if k != l {
                push_nontrivial(&mut cs, (k, l), rule(&triples[k], &triples[l]));
            }
        }
    }
    cs
}

/// Applies `rule` to every unordered pair `(k, l)`, `k < l`.
/// 
/// Constraints which hold trivially are dropped.
pub fn unordered_pairs<R>(triples: &[Triple], rule: R) -> Vec<Interpolation>
where R: Fn(&Triple, &Triple) -> Constraint
{
    let mut cs = Vec::new();
    for k in 0.. triples.len() {
        for l in k + 1.. triples.len() {
            push_nontrivial(&mut cs, (k, l), rule(&triples[k], &triples[l]));
        }
    }
    cs
}

/// Applies `rule` to every triple `k`, tagged with the pair `(k, k)`.
pub fn each_triple<R>(triples: &[Triple], rule: R) -> Vec<Interpolation>
where R: Fn(&Triple) -> Constraint
{
    let mut cs = Vec::new();
    for (k, t) in triples.iter().enumerate() {
        push_nontrivial(&mut cs, (k, k), rule(t));
    }
    cs
}

fn push_nontrivial(cs: &mut Vec<Interpolation>, pair: (usize, usize), constraint: Constraint)
{
    if constraint.is_trivially_satisfied() {
        log::debug!("elide trivial interpolation at {:?}", pair);
    }
    else {
        cs.push(Interpolation { pair, constraint });
    }
}

//

mod convex;
mod smooth;
mod operator;
mod custom;

pub use convex::*;
pub use smooth::*;
pub use operator::*;
pub use custom::*;
