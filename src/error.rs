//! Errors and warnings

use totsu_core::solver::SolverError;
use crate::algebra::{BasisIndex, ValueIndex};
use crate::constraint::ConstraintId;
use crate::function::FunctionId;

//

/// Construction errors.
/// 
/// Raised while a session is being declared.
/// Once one is returned, the session is poisoned and refuses further use.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructionError
{
    /// A point refers to a basis vector which is not registered in the session.
    UnknownBasis { index: BasisIndex, registered: usize },
    /// An expression refers to a function value which is not registered in the session.
    UnknownValue { index: ValueIndex, registered: usize },
    /// A function handle which is not declared in the session.
    UnknownFunction { function: FunctionId, declared: usize },
    /// The basis registry would exceed its capacity.
    BasisCapacity { capacity: usize },
    /// Solving without a performance metric.
    MissingMetric,
    /// The performance metric was already set.
    MetricAlreadySet,
    /// Invalid weighted sum of functions.
    InvalidComposite { function: FunctionId, reason: &'static str },
    /// A previous construction error made the session unusable.
    Poisoned,
}

impl core::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            ConstructionError::UnknownBasis { index, registered } =>
                write!(f, "UnknownBasis: basis {} is not registered ({} registered)", index, registered),
            ConstructionError::UnknownValue { index, registered } =>
                write!(f, "UnknownValue: value {} is not registered ({} registered)", index, registered),
            ConstructionError::UnknownFunction { function, declared } =>
                write!(f, "UnknownFunction: function {} is not declared ({} declared)", function, declared),
            ConstructionError::BasisCapacity { capacity } =>
                write!(f, "BasisCapacity: more than {} basis vectors", capacity),
            ConstructionError::MissingMetric =>
                write!(f, "MissingMetric: no performance metric is set"),
            ConstructionError::MetricAlreadySet =>
                write!(f, "MetricAlreadySet: the performance metric is already set"),
            ConstructionError::InvalidComposite { function, reason } =>
                write!(f, "InvalidComposite: function {}: {}", function, reason),
            ConstructionError::Poisoned =>
                write!(f, "Poisoned: session is unusable after a construction error"),
        }
    }
}

impl std::error::Error for ConstructionError {}

//

/// Function class parameters violating the validity precondition of the class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassParameterError
{
    /// Name of the function class.
    pub class: String,
    /// Name of the offending parameter.
    pub parameter: &'static str,
    /// Value of the offending parameter.
    pub value: f64,
    /// Precondition which is violated.
    pub reason: &'static str,
}

impl ClassParameterError
{
    /// Checks `value` is finite and positive.
    /// 
    /// Returns `Ok`, or `Err` naming `class` and `parameter`.
    pub fn check_positive(class: &str, parameter: &'static str, value: f64) -> Result<(), ClassParameterError>
    {
        if value.is_finite() && value > 0. {
            Ok(())
        }
        else {
            Err(ClassParameterError {
                class: class.to_string(),
                parameter,
                value,
                reason: "must be finite and positive",
            })
        }
    }
}

impl core::fmt::Display for ClassParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ClassParameter: {}: {} = {} {}", self.class, self.parameter, self.value, self.reason)
    }
}

impl std::error::Error for ClassParameterError {}

//

/// Conflicting equality constraints.
/// 
/// The earlier constraint is kept; the added one is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintConflictError
{
    /// The same equality is stated twice.
    Duplicate { existing: ConstraintId, added: ConstraintId },
    /// Two equalities on the same terms require different constants.
    Contradictory { existing: ConstraintId, added: ConstraintId },
}

impl core::fmt::Display for ConstraintConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            ConstraintConflictError::Duplicate { existing, added } =>
                write!(f, "Duplicate: equality {} repeats equality {}", added, existing),
            ConstraintConflictError::Contradictory { existing, added } =>
                write!(f, "Contradictory: equality {} contradicts equality {}", added, existing),
        }
    }
}

impl std::error::Error for ConstraintConflictError {}

//

/// Numerical checks performed on a solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToleranceCheck
{
    /// Minimum eigenvalue of the primal Gram matrix.
    PrimalPsd,
    /// Minimum eigenvalue of the dual PSD multiplier.
    DualPsd,
    /// Worst violation of a constraint by the primal solution.
    Feasibility,
    /// Worst product of a multiplier and its constraint.
    ComplementarySlackness,
}

impl core::fmt::Display for ToleranceCheck {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            ToleranceCheck::PrimalPsd              => "primal PSD",
            ToleranceCheck::DualPsd                => "dual PSD",
            ToleranceCheck::Feasibility            => "feasibility",
            ToleranceCheck::ComplementarySlackness => "complementary slackness",
        })
    }
}

/// Non-fatal numerical defect of a solution.
/// 
/// The defect is nonzero but within [`crate::PepParam::tol_numeric`].
#[derive(Debug, Clone, PartialEq)]
pub struct NumericToleranceWarning
{
    /// Which check found the defect.
    pub check: ToleranceCheck,
    /// Magnitude of the defect.
    pub amount: f64,
    /// Constraint responsible for the defect, if any.
    pub constraint: Option<ConstraintId>,
}

impl core::fmt::Display for NumericToleranceWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} defect {:.3e}", self.check, self.amount)?;
        if let Some(c) = self.constraint {
            write!(f, " at constraint {}", c)?;
        }
        Ok(())
    }
}

//

/// Solve errors.
/// 
/// A terminal outcome of a session, never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError
{
    /// The declared constraints admit no function and no trajectory.
    Infeasible,
    /// The performance metric is unbounded.
    Unbounded,
    /// The solver failed for another reason, including the iteration bound.
    Solver(SolverError),
    /// A numerical check exceeded [`crate::PepParam::tol_numeric`].
    Tolerance { check: ToleranceCheck, amount: f64, constraint: Option<ConstraintId> },
}

impl From<SolverError> for SolveError
{
    fn from(e: SolverError) -> Self
    {
        match e {
            SolverError::Infeasible => SolveError::Infeasible,
            SolverError::Unbounded => SolveError::Unbounded,
            e => SolveError::Solver(e),
        }
    }
}

impl core::fmt::Display for SolveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            SolveError::Infeasible => write!(f, "Infeasible: constraints are infeasible"),
            SolveError::Unbounded => write!(f, "Unbounded: performance metric is unbounded"),
            SolveError::Solver(e) => write!(f, "Solver: {}", e),
            SolveError::Tolerance { check, amount, constraint } => {
                write!(f, "Tolerance: {} defect {:.3e}", check, amount)?;
                if let Some(c) = constraint {
                    write!(f, " at constraint {}", c)?;
                }
                Ok(())
            },
        }
    }
}

impl std::error::Error for SolveError {}

//

/// Errors of a PEP session.
#[derive(Debug, Clone, PartialEq)]
pub enum PepError
{
    Construction(ConstructionError),
    ClassParameter(ClassParameterError),
    ConstraintConflict(ConstraintConflictError),
    Solve(SolveError),
}

impl PepError
{
    /// Checks if raised while declaring the session.
    /// 
    /// Returns `true` for every error except [`PepError::Solve`].
    pub fn is_construction_time(&self) -> bool
    {
        !matches!(self, PepError::Solve(_))
    }
}

impl core::fmt::Display for PepError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            PepError::Construction(e) => write!(f, "{}", e),
            PepError::ClassParameter(e) => write!(f, "{}", e),
            PepError::ConstraintConflict(e) => write!(f, "{}", e),
            PepError::Solve(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            PepError::Construction(e) => Some(e),
            PepError::ClassParameter(e) => Some(e),
            PepError::ConstraintConflict(e) => Some(e),
            PepError::Solve(e) => Some(e),
        }
    }
}

impl From<ConstructionError> for PepError
{
    fn from(e: ConstructionError) -> Self
    {
        PepError::Construction(e)
    }
}

impl From<ClassParameterError> for PepError
{
    fn from(e: ClassParameterError) -> Self
    {
        PepError::ClassParameter(e)
    }
}

impl From<ConstraintConflictError> for PepError
{
    fn from(e: ConstraintConflictError) -> Self
    {
        PepError::ConstraintConflict(e)
    }
}

impl From<SolveError> for PepError
{
    fn from(e: SolveError) -> Self
    {
        PepError::Solve(e)
    }
}

impl From<SolverError> for PepError
{
    fn from(e: SolverError) -> Self
    {
        PepError::Solve(e.into())
    }
}

//

#[test]
fn test_solver_error_mapping()
{
    assert_eq!(SolveError::from(SolverError::Infeasible), SolveError::Infeasible);
    assert_eq!(SolveError::from(SolverError::Unbounded), SolveError::Unbounded);
    assert_eq!(SolveError::from(SolverError::ExcessIter), SolveError::Solver(SolverError::ExcessIter));

    let e: PepError = SolverError::Infeasible.into();
    assert!(!e.is_construction_time());
    assert_eq!(format!("{}", e), "Infeasible: constraints are infeasible");
}
