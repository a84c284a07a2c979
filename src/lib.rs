/*!
Worst-case analysis of first-order methods by **performance estimation problems** (PEP).

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

A method is written symbolically against functions of declared classes,
and the largest value its performance metric can take over every such function
and every starting point satisfying the initial conditions is computed exactly
as a semidefinite program solved by [`totsu_core`].

# General usage

1. Create a [`Pep`] session and optionally set its parameters by [`Pep::par`].
1. Declare functions by their classes, such as [`SmoothConvexFunction`] or [`MonotoneOperator`].
   [`CustomClass`] admits an interpolation condition of your own.
1. Register starting points by [`Pep::set_initial_point`]
   and a stationary point by [`Pep::stationary_point`].
1. Run the method on the symbolic points,
   calling oracles by [`Pep::oracle`] or the steps [`gradient_step`] and [`proximal_step`].
1. State initial conditions by [`Pep::set_initial_condition`]
   and a performance metric by [`Pep::set_performance_metric`].
1. Invoke [`Pep::solve`] to get a [`PepSolution`].
   Its [`Certificate`] is the proof of the worst-case value.

Points are combinations of basis vectors \\(b_i\\) whose Gram matrix
\\(G_{ij} = \langle b_i, b_j \rangle\\) is the unknown of the SDP,
together with the function values.
The interpolation conditions of each class make the worst case over those unknowns
the worst case over the class.

# Examples

One gradient step with \\(\gamma = 1 / L\\) on an \\(L\\)-smooth convex function \\(f\\):
\\[
\begin{array}{ll}
{\rm maximize} & \\|\nabla f(x_1)\\|^2 \\\\
{\rm subject \ to} & x_1 = x_0 - \gamma \nabla f(x_0), \\\\
& \\|x_0 - x_\star\\|^2 \le 1.
\end{array}
\\]

```
use float_eq::assert_float_eq;
use totsu_pep::prelude::*;
use totsu_pep::*;

//env_logger::init(); // Use any logger crate as `totsu_pep` uses `log` crate.

let l = 1.;

let mut pep = Pep::new();
let f = pep.declare_function(SmoothConvexFunction::new(l)).unwrap();

let xs = pep.stationary_point(f).unwrap();
let x0 = pep.set_initial_point().unwrap();

let (x1, _, _) = gradient_step(&mut pep, f, &x0, 1. / l).unwrap();
let g1 = pep.gradient(f, &x1).unwrap();

pep.set_initial_condition((&x0 - &xs).norm_sq().le(1.)).unwrap();
pep.set_performance_metric(g1.norm_sq()).unwrap();

let sol = pep.solve().unwrap();

assert_float_eq!(sol.worst_case_value(), 0.25, abs <= 1e-3);
```

## Other examples

Integration tests cover accelerated methods, monotone inclusions and Lyapunov analyses.
*/

mod algebra;

pub use algebra::*;

//

mod constraint;

pub use constraint::*;

//

mod function;

pub use function::*;

//

mod error;
mod param;

pub use error::*;
pub use param::*;

//

mod problem;
mod assembler;
mod solve;
mod certificate;

pub use problem::*;
pub use assembler::*;
pub use solve::*;
pub use certificate::*;

//

mod pep;
mod steps;

pub use pep::*;
pub use steps::*;

//

/// Prelude
pub mod prelude
{
   pub use totsu_core::solver::{SolverError, SolverParam};
   pub use totsu_core::{FloatGeneric, LinAlgEx};
   pub use crate::{Pep, PepParam, PepError, SolveStatus};
}
