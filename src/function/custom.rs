use super::{FunctionClass, Triple, Interpolation, ordered_pairs};
use crate::constraint::Constraint;

//

/// Custom function class
/// 
/// A class given by a user-defined interpolation rule,
/// applied to every ordered pair of evaluated triples.
/// Implementing [`FunctionClass`] directly is the alternative for rules
/// which are not pairwise.
/// 
/// ```
/// use totsu_pep::*;
/// 
/// // convex functions, stated by hand
/// let class = CustomClass::new("MyConvex", false, |tk, tl| {
///     (&tl.value - &tk.value + tl.gradient.inner(&(&tk.point - &tl.point))).le(0.)
/// });
/// 
/// let mut pep = Pep::new();
/// let f = pep.declare_function(class).unwrap();
/// # let _ = f;
/// ```
pub struct CustomClass
{
    name: String,
    reuse_gradient: bool,
    rule: Box<dyn Fn(&Triple, &Triple) -> Constraint + Send>,
}

impl CustomClass
{
    /// Creates a class.
    /// 
    /// * `name` is used in logs and errors.
    /// * `reuse_gradient` is [`FunctionClass::reuse_gradient`].
    /// * `rule` takes the triples `k` and `l` and returns the constraint of the pair.
    pub fn new<R>(name: &str, reuse_gradient: bool, rule: R) -> Self
    where R: Fn(&Triple, &Triple) -> Constraint + Send + 'static
    {
        CustomClass {
            name: name.to_string(),
            reuse_gradient,
            rule: Box::new(rule),
        }
    }
}

impl core::fmt::Debug for CustomClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomClass")
         .field("name", &self.name)
         .field("reuse_gradient", &self.reuse_gradient)
         .finish()
    }
}

impl FunctionClass for CustomClass
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn reuse_gradient(&self) -> bool
    {
        self.reuse_gradient
    }

    fn interpolation(&self, triples: &[Triple]) -> Vec<Interpolation>
    {
        ordered_pairs(triples, |tk, tl| (self.rule)(tk, tl))
    }
}
