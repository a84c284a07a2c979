//! Constraints and their store

use crate::algebra::Expression;
use crate::error::ConstraintConflictError;
use crate::function::FunctionId;

//

/// Sense of a constraint in normal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind
{
    /// `e <= 0`
    LessEq,
    /// `e == 0`
    Equal,
}

/// Linear constraint on function values and Gram matrix entries
/// 
/// Kept in the normal form `e <= 0` or `e == 0`.
/// Created by [`Expression::le`], [`Expression::ge`] and [`Expression::equals`],
/// or by function classes.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint
{
    expr: Expression,
    kind: ConstraintKind,
}

impl Constraint
{
    /// Creates `expr <= 0` or `expr == 0`.
    pub fn new(expr: Expression, kind: ConstraintKind) -> Self
    {
        Constraint {
            expr, kind,
        }
    }

    /// Left-hand side of the normal form.
    pub fn expression(&self) -> &Expression
    {
        &self.expr
    }

    pub fn kind(&self) -> ConstraintKind
    {
        self.kind
    }

    /// Checks if a constant constraint which holds for any solution.
    pub fn is_trivially_satisfied(&self) -> bool
    {
        self.expr.is_constant() && self.violation(self.expr.constant()) == 0.
    }

    /// Checks if a constant constraint which holds for no solution.
    pub fn is_trivially_violated(&self) -> bool
    {
        self.expr.is_constant() && self.violation(self.expr.constant()) > 0.
    }

    /// Violation of the constraint when its expression evaluates to `value`.
    /// 
    /// Returns a nonnegative amount, zero if satisfied.
    pub fn violation(&self, value: f64) -> f64
    {
        match self.kind {
            ConstraintKind::LessEq => value.max(0.),
            ConstraintKind::Equal => value.abs(),
        }
    }
}

impl core::fmt::Display for Constraint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ConstraintKind::LessEq => write!(f, "{} <= 0", self.expr),
            ConstraintKind::Equal => write!(f, "{} == 0", self.expr),
        }
    }
}

//

/// Position of a constraint in a [`ConstraintStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId
{
    pub fn get(&self) -> usize
    {
        self.0
    }
}

impl core::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Who stated a constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintOrigin
{
    /// Declared by the user on the session, typically on the starting point.
    InitialCondition,
    /// Declared by the user on a function.
    Function { function: FunctionId },
    /// Generated by the class of a function for a pair of its evaluated triples.
    Interpolation { function: FunctionId, pair: (usize, usize) },
}

impl core::fmt::Display for ConstraintOrigin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            ConstraintOrigin::InitialCondition => write!(f, "initial condition"),
            ConstraintOrigin::Function { function } => write!(f, "constraint on {}", function),
            ConstraintOrigin::Interpolation { function, pair: (k, l) } =>
                write!(f, "interpolation of {} at ({}, {})", function, k, l),
        }
    }
}

/// Stored constraint with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredConstraint
{
    pub constraint: Constraint,
    pub origin: ConstraintOrigin,
}

//

/// Constraint store
/// 
/// Append-only list of constraints.
/// Iteration order is insertion order and [`ConstraintId`]s are positions,
/// so dual multipliers can be attributed to the constraints that produced them.
#[derive(Debug, Clone, Default)]
pub struct ConstraintStore
{
    entries: Vec<StoredConstraint>,
}

impl ConstraintStore
{
    pub fn new() -> Self
    {
        ConstraintStore::default()
    }

    /// Appends a constraint.
    /// 
    /// Returns the id of the appended constraint,
    /// or `Err` if it is an equality conflicting with an earlier one.
    pub fn push(&mut self, constraint: Constraint, origin: ConstraintOrigin) -> Result<ConstraintId, ConstraintConflictError>
    {
        let added = ConstraintId(self.entries.len());

        if constraint.kind() == ConstraintKind::Equal && !constraint.expression().is_constant() {
            if let Some(e) = self.find_conflict(&constraint, added) {
                log::error!("{}: {}", e, constraint);
                return Err(e);
            }
        }

        log::trace!("{} ({}): {}", added, origin, constraint);
        self.entries.push(StoredConstraint { constraint, origin });

        Ok(added)
    }

    fn find_conflict(&self, constraint: &Constraint, added: ConstraintId) -> Option<ConstraintConflictError>
    {
        let expr = constraint.expression();
        let lin = expr.linear_part();
        let neg_lin = -&lin;

        for (i, s) in self.entries.iter().enumerate() {
            if s.constraint.kind() != ConstraintKind::Equal {
                continue;
            }
            let other = s.constraint.expression();
            let other_lin = other.linear_part();

            let same_const = if other_lin == lin {
                Some(other.constant() == expr.constant())
            }
            else if other_lin == neg_lin {
                Some(other.constant() == -expr.constant())
            }
            else {
                None
            };

            let existing = ConstraintId(i);
            match same_const {
                Some(true) => return Some(ConstraintConflictError::Duplicate { existing, added }),
                Some(false) => return Some(ConstraintConflictError::Contradictory { existing, added }),
                None => {},
            }
        }

        None
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ConstraintId) -> Option<&StoredConstraint>
    {
        self.entries.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item=(ConstraintId, &StoredConstraint)>
    {
        self.entries.iter().enumerate().map(|(i, s)| (ConstraintId(i), s))
    }

    /// First constant constraint which no solution satisfies.
    pub fn trivially_infeasible(&self) -> Option<ConstraintId>
    {
        self.entries.iter()
        .position(|s| s.constraint.is_trivially_violated())
        .map(ConstraintId)
    }

    /// Number of constraints of a kind which involve at least one variable.
    pub fn count_active(&self, kind: ConstraintKind) -> usize
    {
        self.entries.iter()
        .filter(|s| s.constraint.kind() == kind && !s.constraint.expression().is_constant())
        .count()
    }
}

//

#[test]
fn test_store_equality_conflict()
{
    use crate::algebra::ValueIndex;

    let f0 = Expression::from_value(ValueIndex(0));
    let f1 = Expression::from_value(ValueIndex(1));

    let mut store = ConstraintStore::new();
    let c0 = store.push(f0.equals(&f1 + 1.), ConstraintOrigin::InitialCondition).unwrap();
    store.push(f0.le(2.), ConstraintOrigin::InitialCondition).unwrap();
    store.push(f0.le(2.), ConstraintOrigin::InitialCondition).unwrap();

    // same equality stated from the other side
    let e = store.push((&f1 + 1.).equals(f0.clone()), ConstraintOrigin::InitialCondition).unwrap_err();
    assert_eq!(e, ConstraintConflictError::Duplicate { existing: c0, added: ConstraintId(3) });

    let e = store.push(f0.equals(&f1 + 5.), ConstraintOrigin::InitialCondition).unwrap_err();
    assert_eq!(e, ConstraintConflictError::Contradictory { existing: c0, added: ConstraintId(3) });

    assert_eq!(store.len(), 3);
    assert_eq!(store.count_active(ConstraintKind::LessEq), 2);
    assert_eq!(store.count_active(ConstraintKind::Equal), 1);
    assert_eq!(store.trivially_infeasible(), None);

    let c = store.push(Expression::from(1.).le(0.), ConstraintOrigin::InitialCondition).unwrap();
    assert_eq!(store.trivially_infeasible(), Some(c));
}
