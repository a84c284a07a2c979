//! Performance estimation session

use totsu_core::{LinAlgEx, FloatGeneric};
use crate::algebra::{BasisRegistry, BasisOrigin, ValueIndex, Point, Expression};
use crate::assembler::PepProgram;
use crate::constraint::{Constraint, ConstraintStore, ConstraintOrigin};
use crate::error::{PepError, ConstructionError, SolveError};
use crate::function::{FunctionClass, FunctionId, Triple};
use crate::param::PepParam;
use crate::solve::{SolveStatus, PepSolution, solve_program};

//

#[derive(Debug)]
enum FunctionBody
{
    Leaf { class: Box<dyn FunctionClass>, triples: Vec<Triple> },
    Sum { terms: Vec<(FunctionId, f64)> },
}

//

/// Performance estimation problem
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// A session owns the basis vectors, the function values, the declared functions with
/// their evaluated triples, the initial conditions and the performance metric.
/// A method is written against it symbolically; [`Pep::solve`] then finds the worst case
/// of the metric over every function of the declared classes and every starting point
/// satisfying the initial conditions.
///
/// Construction errors poison the session:
/// every later call fails with [`ConstructionError::Poisoned`].
/// A failed solve is terminal: later solves return the same error.
#[derive(Debug)]
pub struct Pep
{
    par: PepParam,
    basis: BasisRegistry,
    n_values: usize,
    functions: Vec<FunctionBody>,
    declared: ConstraintStore,
    metric: Option<Expression>,
    status: SolveStatus,
    failure: Option<SolveError>,
    poisoned: bool,
}

impl Default for Pep
{
    fn default() -> Self
    {
        Pep::new()
    }
}

impl Pep
{
    /// Creates an empty session with default parameters.
    pub fn new() -> Self
    {
        let par = PepParam::default();
        let basis = BasisRegistry::new(par.max_basis);

        Pep {
            par,
            basis,
            n_values: 0,
            functions: Vec::new(),
            declared: ConstraintStore::new(),
            metric: None,
            status: SolveStatus::Unsolved,
            failure: None,
            poisoned: false,
        }
    }

    /// Changes parameters.
    ///
    /// Returns the session with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    ///   [`PepParam::max_basis`] takes effect only before the first basis vector is registered.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut PepParam)
    {
        f(&mut self.par);
        if self.basis.is_empty() {
            self.basis = BasisRegistry::new(self.par.max_basis);
        }
        else {
            log::warn!("max_basis unchanged: {} basis vectors already registered", self.basis.len());
        }
        self
    }

    /// Parameters of the session.
    pub fn param(&self) -> &PepParam
    {
        &self.par
    }

    pub fn status(&self) -> SolveStatus
    {
        self.status
    }

    /// Registered basis vectors.
    pub fn basis(&self) -> &BasisRegistry
    {
        &self.basis
    }

    /// Number of registered function values.
    pub fn n_values(&self) -> usize
    {
        self.n_values
    }

    /// Triples evaluated on a leaf function, in evaluation order.
    ///
    /// Returns `None` for a weighted sum or an unknown handle.
    pub fn triples(&self, f: FunctionId) -> Option<&[Triple]>
    {
        match self.functions.get(f.0) {
            Some(FunctionBody::Leaf { triples, .. }) => Some(triples),
            _ => None,
        }
    }

    //----- validation

    fn live(&self) -> Result<(), PepError>
    {
        if self.poisoned {
            Err(ConstructionError::Poisoned.into())
        }
        else {
            Ok(())
        }
    }

    fn poison_on<T>(&mut self, r: Result<T, PepError>) -> Result<T, PepError>
    {
        if let Err(e) = &r {
            log::error!("{}", e);
            self.poisoned = true;
        }
        r
    }

    fn touch(&mut self)
    {
        if self.status == SolveStatus::Solved {
            self.status = SolveStatus::Unsolved;
        }
    }

    fn check_function(&self, f: FunctionId) -> Result<(), ConstructionError>
    {
        if f.0 < self.functions.len() {
            Ok(())
        }
        else {
            Err(ConstructionError::UnknownFunction { function: f, declared: self.functions.len() })
        }
    }

    fn check_point(&self, x: &Point) -> Result<(), ConstructionError>
    {
        for (index, _) in x.terms() {
            if !self.basis.contains(index) {
                return Err(ConstructionError::UnknownBasis { index, registered: self.basis.len() });
            }
        }
        Ok(())
    }

    fn check_expression(&self, e: &Expression) -> Result<(), ConstructionError>
    {
        for ((i, j), _) in e.gram_terms() {
            for index in [i, j] {
                if !self.basis.contains(index) {
                    return Err(ConstructionError::UnknownBasis { index, registered: self.basis.len() });
                }
            }
        }
        for (index, _) in e.value_terms() {
            if index.0 >= self.n_values {
                return Err(ConstructionError::UnknownValue { index, registered: self.n_values });
            }
        }
        Ok(())
    }

    //----- declarations

    /// Declares a function of a class.
    ///
    /// Returns the handle of the function,
    /// or `Err` if the class parameters are invalid.
    pub fn declare_function<C: FunctionClass + 'static>(&mut self, class: C) -> Result<FunctionId, PepError>
    {
        self.live()?;

        let r = class.validate().map_err(PepError::from);
        self.poison_on(r)?;

        let f = FunctionId(self.functions.len());
        log::debug!("declare {}: {:?}", f, class);
        self.functions.push(FunctionBody::Leaf { class: Box::new(class), triples: Vec::new() });
        self.touch();

        Ok(f)
    }

    /// Declares a weighted sum \\(\sum_k w_k f_k\\) of declared functions.
    ///
    /// Returns the handle of the sum.
    /// The sum has no class of its own: its oracle combines those of its terms.
    pub fn declare_sum(&mut self, terms: &[(FunctionId, f64)]) -> Result<FunctionId, PepError>
    {
        self.live()?;

        let r = self.check_sum(terms).map_err(PepError::from);
        self.poison_on(r)?;

        let f = FunctionId(self.functions.len());
        log::debug!("declare {}: sum of {:?}", f, terms);
        self.functions.push(FunctionBody::Sum { terms: terms.to_vec() });
        self.touch();

        Ok(f)
    }

    fn check_sum(&self, terms: &[(FunctionId, f64)]) -> Result<(), ConstructionError>
    {
        let function = FunctionId(self.functions.len());

        if terms.is_empty() {
            return Err(ConstructionError::InvalidComposite { function, reason: "no terms" });
        }
        for (fk, w) in terms.iter() {
            self.check_function(*fk)?;
            if !w.is_finite() {
                return Err(ConstructionError::InvalidComposite { function, reason: "weights must be finite" });
            }
        }
        Ok(())
    }

    /// Registers a new starting point.
    pub fn set_initial_point(&mut self) -> Result<Point, PepError>
    {
        self.live()?;

        let r = self.basis.register(BasisOrigin::InitialPoint).map_err(PepError::from);
        let index = self.poison_on(r)?;
        self.touch();

        Ok(Point::from_basis(index))
    }

    /// Registers a new function value, unrelated to any other.
    pub fn new_value(&mut self) -> Result<Expression, PepError>
    {
        self.live()?;
        self.touch();

        Ok(Expression::from_value(self.next_value()))
    }

    /// Registers a new basis vector standing for a gradient of `f` at a point yet to be fixed.
    ///
    /// Used with [`Pep::add_point`] to state implicit steps.
    pub fn new_gradient(&mut self, f: FunctionId) -> Result<Point, PepError>
    {
        self.live()?;

        let r = self.check_function(f)
                .and_then(|_| self.basis.register(BasisOrigin::Gradient { function: f }))
                .map_err(PepError::from);
        let index = self.poison_on(r)?;
        self.touch();

        Ok(Point::from_basis(index))
    }

    fn next_value(&mut self) -> ValueIndex
    {
        let k = ValueIndex(self.n_values);
        self.n_values += 1;
        k
    }

    //----- oracles

    /// Stationary point \\(x_\star\\) of `f`, where \\(0\\) is a gradient.
    ///
    /// Returns a new point. Each call introduces another stationary point.
    /// For a weighted sum, every term must be a leaf function
    /// and the gradient of the last term is fixed by those of the others.
    pub fn stationary_point(&mut self, f: FunctionId) -> Result<Point, PepError>
    {
        self.live()?;

        let r = self.eval_stationary_point(f).map_err(PepError::from);
        let xs = self.poison_on(r)?;
        self.touch();

        Ok(xs)
    }

    fn eval_stationary_point(&mut self, f: FunctionId) -> Result<Point, ConstructionError>
    {
        self.check_function(f)?;

        let terms = match &self.functions[f.0] {
            FunctionBody::Leaf { .. } => {
                let xs = Point::from_basis(self.basis.register(BasisOrigin::StationaryPoint { function: f })?);
                let fs = Expression::from_value(self.next_value());
                self.push_triple(f, Triple { point: xs.clone(), gradient: Point::zero(), value: fs })?;
                return Ok(xs);
            },
            FunctionBody::Sum { terms } => terms.clone(),
        };

        let leaves = terms.iter().all(|(fk, _)| {
            matches!(self.functions[fk.0], FunctionBody::Leaf { .. })
        });
        if !leaves {
            return Err(ConstructionError::InvalidComposite { function: f, reason: "stationary point needs leaf terms" });
        }
        let (last, rest) = match terms.split_last() {
            Some(lr) => lr,
            None => return Err(ConstructionError::InvalidComposite { function: f, reason: "no terms" }),
        };
        if last.1 == 0. {
            return Err(ConstructionError::InvalidComposite { function: f, reason: "last weight must be nonzero" });
        }

        let xs = Point::from_basis(self.basis.register(BasisOrigin::StationaryPoint { function: f })?);

        // sum_k w_k g_k = 0
        let mut gsum = Point::zero();
        for (fk, w) in rest.iter() {
            let (g, _) = self.eval_oracle(*fk, &xs)?;
            gsum = gsum.axpy(*w, &g);
        }
        let g_last = gsum.scale(-1. / last.1);
        let f_last = Expression::from_value(self.next_value());
        self.push_triple(last.0, Triple { point: xs.clone(), gradient: g_last, value: f_last })?;

        Ok(xs)
    }

    /// Gradient and value of `f` at `x`.
    ///
    /// Returns a tuple of the gradient (or a subgradient, or an operator output) and the value.
    /// A single-valued class evaluated twice at an identical point returns the same gradient;
    /// otherwise a new subgradient shares the value of the point.
    pub fn oracle(&mut self, f: FunctionId, x: &Point) -> Result<(Point, Expression), PepError>
    {
        self.live()?;

        let r = self.check_point(x)
                .and_then(|_| self.eval_oracle(f, x))
                .map_err(PepError::from);
        let gv = self.poison_on(r)?;
        self.touch();

        Ok(gv)
    }

    /// Gradient of `f` at `x`. See [`Pep::oracle`].
    pub fn gradient(&mut self, f: FunctionId, x: &Point) -> Result<Point, PepError>
    {
        self.oracle(f, x).map(|(g, _)| g)
    }

    /// Subgradient of `f` at `x`. See [`Pep::oracle`].
    pub fn subgradient(&mut self, f: FunctionId, x: &Point) -> Result<Point, PepError>
    {
        self.gradient(f, x)
    }

    /// Value of `f` at `x`.
    ///
    /// No gradient is introduced if `f` was already evaluated at `x`.
    pub fn value(&mut self, f: FunctionId, x: &Point) -> Result<Expression, PepError>
    {
        self.live()?;

        let r = self.check_point(x)
                .and_then(|_| self.eval_value(f, x))
                .map_err(PepError::from);
        let v = self.poison_on(r)?;
        self.touch();

        Ok(v)
    }

    fn eval_oracle(&mut self, f: FunctionId, x: &Point) -> Result<(Point, Expression), ConstructionError>
    {
        self.check_function(f)?;

        let (reuse, found) = match &self.functions[f.0] {
            FunctionBody::Leaf { class, triples } => {
                (class.reuse_gradient(), triples.iter().find(|t| t.point == *x).cloned())
            },
            FunctionBody::Sum { terms } => {
                let terms = terms.clone();
                let mut g = Point::zero();
                let mut v = Expression::zero();
                for (fk, w) in terms.iter() {
                    let (gk, vk) = self.eval_oracle(*fk, x)?;
                    g = g.axpy(*w, &gk);
                    v = v.axpy(*w, &vk);
                }
                return Ok((g, v));
            },
        };

        match found {
            Some(t) if reuse => Ok((t.gradient, t.value)),
            Some(t) => {
                let g = Point::from_basis(self.basis.register(BasisOrigin::Gradient { function: f })?);
                self.push_triple(f, Triple { point: x.clone(), gradient: g.clone(), value: t.value.clone() })?;
                Ok((g, t.value))
            },
            None => {
                let g = Point::from_basis(self.basis.register(BasisOrigin::Gradient { function: f })?);
                let v = Expression::from_value(self.next_value());
                self.push_triple(f, Triple { point: x.clone(), gradient: g.clone(), value: v.clone() })?;
                Ok((g, v))
            },
        }
    }

    fn eval_value(&mut self, f: FunctionId, x: &Point) -> Result<Expression, ConstructionError>
    {
        self.check_function(f)?;

        let found = match &self.functions[f.0] {
            FunctionBody::Leaf { triples, .. } => {
                triples.iter().find(|t| t.point == *x).map(|t| t.value.clone())
            },
            FunctionBody::Sum { terms } => {
                let terms = terms.clone();
                let mut v = Expression::zero();
                for (fk, w) in terms.iter() {
                    v = v.axpy(*w, &self.eval_value(*fk, x)?);
                }
                return Ok(v);
            },
        };

        match found {
            Some(v) => Ok(v),
            None => self.eval_oracle(f, x).map(|(_, v)| v),
        }
    }

    fn push_triple(&mut self, f: FunctionId, t: Triple) -> Result<(), ConstructionError>
    {
        match &mut self.functions[f.0] {
            FunctionBody::Leaf { triples, .. } => {
                log::trace!("{} triple {}: x = {}, g = {}, f = {}", f, triples.len(), t.point, t.gradient, t.value);
                triples.push(t);
                Ok(())
            },
            FunctionBody::Sum { .. } => {
                Err(ConstructionError::InvalidComposite { function: f, reason: "triples belong to leaf functions" })
            },
        }
    }

    /// Adds a triple to a leaf function.
    ///
    /// * `x`, `g` and `v` are the point, the gradient and the value,
    ///   typically given by [`Pep::new_gradient`] and [`Pep::new_value`].
    pub fn add_point(&mut self, f: FunctionId, x: &Point, g: &Point, v: &Expression) -> Result<(), PepError>
    {
        self.live()?;

        let r = self.check_function(f)
                .and_then(|_| self.check_point(x))
                .and_then(|_| self.check_point(g))
                .and_then(|_| self.check_expression(v))
                .and_then(|_| self.push_triple(f, Triple { point: x.clone(), gradient: g.clone(), value: v.clone() }))
                .map_err(PepError::from);
        self.poison_on(r)?;
        self.touch();

        Ok(())
    }

    //----- constraints and metric

    fn declare_constraint(&mut self, c: &Constraint, origin: ConstraintOrigin) -> Result<(), PepError>
    {
        self.check_expression(c.expression())?;
        self.declared.push(c.clone(), origin)?;
        Ok(())
    }

    /// Adds an initial condition, typically on the starting point.
    ///
    /// Returns `Err` if it refers to unknown basis vectors or values,
    /// or conflicts with an earlier equality.
    pub fn set_initial_condition(&mut self, c: Constraint) -> Result<(), PepError>
    {
        self.live()?;

        let r = self.declare_constraint(&c, ConstraintOrigin::InitialCondition);
        self.poison_on(r)?;

        self.touch();

        Ok(())
    }

    /// Adds a constraint on a function, beyond those of its class.
    pub fn add_function_constraint(&mut self, f: FunctionId, c: Constraint) -> Result<(), PepError>
    {
        self.live()?;

        let r = self.check_function(f).map_err(PepError::from)
                .and_then(|_| self.declare_constraint(&c, ConstraintOrigin::Function { function: f }));
        self.poison_on(r)?;

        self.touch();

        Ok(())
    }

    /// Sets the performance metric to be maximized.
    ///
    /// Returns `Err` if already set.
    pub fn set_performance_metric(&mut self, e: Expression) -> Result<(), PepError>
    {
        self.live()?;

        let r = if self.metric.is_some() {
            Err(ConstructionError::MetricAlreadySet)
        }
        else {
            self.check_expression(&e)
        };
        self.poison_on(r.map_err(PepError::from))?;

        self.metric = Some(e);
        self.touch();

        Ok(())
    }

    //----- compile and solve

    fn compile_store(&self) -> Result<(ConstraintStore, Expression), PepError>
    {
        let metric = self.metric.clone().ok_or(ConstructionError::MissingMetric)?;
        let d = self.basis.len();

        log::info!("----- Setting up the problem");
        log::info!("size of the main PSD matrix: {}x{}", d, d);
        log::info!("function values: {}", self.n_values);

        // declared constraints keep the ids their conflicts were reported with
        let mut store = self.declared.clone();
        log::info!("initial conditions and function constraints ({} constraint(s) added)", store.len());

        for (i, body) in self.functions.iter().enumerate() {
            let function = FunctionId(i);

            if let FunctionBody::Leaf { class, triples } = body {
                let before = store.len();
                for itp in class.interpolation(triples) {
                    store.push(itp.constraint, ConstraintOrigin::Interpolation { function, pair: itp.pair })?;
                }
                log::info!("{} ({}): {} triple(s), {} constraint(s) added",
                    function, class.name(), triples.len(), store.len() - before);
            }
        }

        Ok((store, metric))
    }

    /// Compiles the session into an assembled program.
    ///
    /// Returns the program, or `Err` if the metric is missing, constraints conflict,
    /// or a constant constraint never holds.
    pub fn compile(&mut self) -> Result<PepProgram, PepError>
    {
        self.live()?;

        let r = self.compile_store();
        let (store, metric) = self.poison_on(r)?;

        Ok(PepProgram::new(store, metric, self.basis.len())?)
    }

    /// Solves the session by [`FloatGeneric`].
    ///
    /// Returns the solution, or `Err` with a construction error or the terminal [`SolveError`].
    pub fn solve(&mut self) -> Result<PepSolution, PepError>
    {
        self.solve_with::<FloatGeneric<f64>>()
    }

    /// Solves the session by a [`LinAlgEx`] implementation `L`.
    ///
    /// See [`Pep::solve`].
    pub fn solve_with<L: LinAlgEx<F=f64>>(&mut self) -> Result<PepSolution, PepError>
    {
        self.live()?;

        if let Some(e) = &self.failure {
            log::warn!("session already failed: {}", e);
            return Err(e.clone().into());
        }

        let r = self.compile_store();
        let (store, metric) = self.poison_on(r)?;

        log::debug!("{:?}", self.par);
        self.status = SolveStatus::Solving;

        let rslt = PepProgram::new(store, metric, self.basis.len())
                   .and_then(|prog| solve_program::<L>(&prog, &self.par));

        match rslt {
            Ok(sol) => {
                self.status = SolveStatus::Solved;
                log::info!("status: {}, worst-case value: {}", self.status, sol.worst_case_value());
                Ok(sol)
            },
            Err(e) => {
                self.status = SolveStatus::of_error(&e);
                log::warn!("status: {}: {}", self.status, e);
                self.failure = Some(e.clone());
                Err(e.into())
            },
        }
    }
}

//

#[test]
fn test_poisoned()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut other = Pep::new();
    let mut pep = Pep::new();

    let _ = other.set_initial_point().unwrap();
    let y = other.set_initial_point().unwrap();

    let _ = pep.set_initial_point().unwrap();
    let e = pep.set_performance_metric(y.norm_sq()).unwrap_err();
    assert!(e.is_construction_time());
    assert!(matches!(e, PepError::Construction(ConstructionError::UnknownBasis { registered: 1, .. })));

    let e = pep.set_initial_point().unwrap_err();
    assert_eq!(e, PepError::Construction(ConstructionError::Poisoned));
}

#[test]
fn test_oracle_reuse()
{
    use crate::function::{ConvexFunction, SmoothConvexFunction};

    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(SmoothConvexFunction::new(1.)).unwrap();
    let h = pep.declare_function(ConvexFunction::new()).unwrap();

    let x0 = pep.set_initial_point().unwrap();

    let (g0, f0) = pep.oracle(f, &x0).unwrap();
    let (g1, f1) = pep.oracle(f, &(&x0 + &Point::zero())).unwrap();
    assert_eq!((g0, f0), (g1, f1));
    assert_eq!(pep.triples(f).unwrap().len(), 1);

    let (h0, v0) = pep.oracle(h, &x0).unwrap();
    let (h1, v1) = pep.oracle(h, &x0).unwrap();
    assert_ne!(h0, h1);
    assert_eq!(v0, v1);
    assert_eq!(pep.triples(h).unwrap().len(), 2);

    // value of an evaluated point adds nothing
    let n = pep.basis().len();
    let _ = pep.value(h, &x0).unwrap();
    assert_eq!(pep.basis().len(), n);
}

#[test]
fn test_sum_stationary_point()
{
    use crate::function::{ConvexFunction, SmoothConvexFunction};

    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f1 = pep.declare_function(SmoothConvexFunction::new(1.)).unwrap();
    let f2 = pep.declare_function(ConvexFunction::new()).unwrap();
    let f = pep.declare_sum(&[(f1, 1.), (f2, 2.)]).unwrap();

    let xs = pep.stationary_point(f).unwrap();

    let g1 = pep.triples(f1).unwrap()[0].gradient.clone();
    let g2 = pep.triples(f2).unwrap()[0].gradient.clone();
    assert!((&g1 + &(2. * &g2)).is_zero());

    let (g, _) = pep.oracle(f, &xs).unwrap();
    assert_eq!(pep.triples(f1).unwrap().len(), 1);
    // the convex term takes a new subgradient
    assert_eq!(pep.triples(f2).unwrap().len(), 2);
    assert!(!g.is_zero());

    let e = pep.declare_sum(&[]).unwrap_err();
    assert!(matches!(e, PepError::Construction(ConstructionError::InvalidComposite { .. })));
}

#[test]
fn test_declared_ids()
{
    use crate::constraint::ConstraintId;
    use crate::error::ConstraintConflictError;
    use crate::function::ConvexFunction;

    let _ = env_logger::builder().is_test(true).try_init();

    let mut pep = Pep::new();
    let f = pep.declare_function(ConvexFunction::new()).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let f0 = pep.value(f, &x0).unwrap();

    pep.add_function_constraint(f, f0.le(1.)).unwrap();
    pep.set_initial_condition(x0.norm_sq().le(1.)).unwrap();
    pep.set_performance_metric(f0.clone()).unwrap();

    // compiled ids follow the call order of declared constraints
    let program = pep.compile().unwrap();
    let s0 = program.store().get(ConstraintId(0)).unwrap();
    let s1 = program.store().get(ConstraintId(1)).unwrap();
    assert_eq!(s0.origin, ConstraintOrigin::Function { function: f });
    assert_eq!(s1.origin, ConstraintOrigin::InitialCondition);

    let mut pep = Pep::new();
    let f = pep.declare_function(ConvexFunction::new()).unwrap();
    let x0 = pep.set_initial_point().unwrap();
    let f0 = pep.value(f, &x0).unwrap();

    pep.add_function_constraint(f, f0.equals(1.)).unwrap();
    pep.set_initial_condition(x0.norm_sq().le(1.)).unwrap();
    let e = pep.set_initial_condition(f0.equals(2.)).unwrap_err();

    assert_eq!(e, PepError::ConstraintConflict(ConstraintConflictError::Contradictory {
        existing: ConstraintId(0),
        added: ConstraintId(2),
    }));
}
