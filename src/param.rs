use num_traits::Num;

//

/// Session parameters.
/// 
/// The first five are forwarded to [`totsu_core::solver::SolverParam`].
#[derive(Debug, Clone, PartialEq)]
pub struct PepParam
{
    /// Max iteration number of the solver. `None` means no upper limit.
    pub max_iter: Option<usize>,
    /// Tolerance of the primal residual, dual residual and duality gap.
    pub eps_acc: f64,
    /// Tolerance of the unboundness and infeasibility.
    pub eps_inf: f64,
    /// Tolerance of small positive value to avoid division by zero.
    pub eps_zero: f64,
    /// Period of iterations to output progress log of the solver (for debug/trace level).
    pub log_period: usize,
    /// Max number of basis vectors of a session.
    pub max_basis: usize,
    /// Numerical defects above this are reported as warnings on the solution.
    /// Never below [`PepParam::eps_acc`]: defects at the solver accuracy are expected.
    pub eps_warn: f64,
    /// Numerical defects above this fail the solve.
    pub tol_numeric: f64,
    /// Whether the solution carries a [`crate::Certificate`].
    pub certificate: bool,
}

impl Default for PepParam
{
    fn default() -> Self
    {
        PepParam {
            max_iter: Some(1_000_000),
            eps_acc: 1e-6,
            eps_inf: 1e-6,
            eps_zero: 1e-12,
            log_period: 10_000,
            max_basis: 1024,
            eps_warn: 1e-5,
            tol_numeric: 1e-3,
            certificate: true,
        }
    }
}

//

/// Parses an environment variable `e` as a decimal number.
/// 
/// Returns `Some` if `e` is set and parses, or `None` otherwise.
pub fn num_by_env<N: Num + core::fmt::Display>(e: &str) -> Option<N>
{
    if let Some(v) = std::env::var(e).ok()
                     .and_then(|s| {N::from_str_radix(s.trim(), 10).ok()}) {
        log::info!("{}: {}", e, v);
        Some(v)
    }
    else {
        None
    }
}

/// Overrides parameters by environment variables.
/// 
/// `PEP_MAX_ITER`, `PEP_EPS_ACC`, `PEP_EPS_INF`, `PEP_EPS_ZERO`, `PEP_LOG_PERIOD` and `PEP_MAX_BASIS`
/// override the fields of the same names. Unset or unparsable variables leave the fields unchanged.
pub fn set_par_by_env(p: &mut PepParam)
{
    p.max_iter = num_by_env("PEP_MAX_ITER").or(p.max_iter);
    p.eps_acc = num_by_env("PEP_EPS_ACC").unwrap_or(p.eps_acc);
    p.eps_inf = num_by_env("PEP_EPS_INF").unwrap_or(p.eps_inf);
    p.eps_zero = num_by_env("PEP_EPS_ZERO").unwrap_or(p.eps_zero);
    p.log_period = num_by_env("PEP_LOG_PERIOD").unwrap_or(p.log_period);
    p.max_basis = num_by_env("PEP_MAX_BASIS").unwrap_or(p.max_basis);
}

//

#[test]
fn test_num_by_env()
{
    let _ = env_logger::builder().is_test(true).try_init();

    std::env::set_var("PEP_TEST_NUM_BY_ENV_A", "1e-7");
    std::env::set_var("PEP_TEST_NUM_BY_ENV_B", "x");

    assert_eq!(num_by_env::<f64>("PEP_TEST_NUM_BY_ENV_A"), Some(1e-7));
    assert_eq!(num_by_env::<usize>("PEP_TEST_NUM_BY_ENV_B"), None);
    assert_eq!(num_by_env::<usize>("PEP_TEST_NUM_BY_ENV_UNSET"), None);
}

#[test]
fn test_set_par_by_env()
{
    let _ = env_logger::builder().is_test(true).try_init();

    std::env::set_var("PEP_LOG_PERIOD", " 77 ");

    let mut p = PepParam::default();
    set_par_by_env(&mut p);

    assert_eq!(p.log_period, 77);
    assert_eq!(p.max_basis, PepParam::default().max_basis);
}
