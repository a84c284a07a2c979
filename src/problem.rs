use num_traits::{Zero, One};
use totsu_core::solver::{Solver, SliceLike, Operator, Cone};
use totsu_core::{LinAlgEx, MatOp, ConePSD, ConeZero, ConeRPos, splitm, splitm_mut};
use totsu::MatBuild;

//

pub struct ProbPEPOpC<'a, L: LinAlgEx>
{
    vec_c: MatOp<'a, L>,
}

impl<'a, L: LinAlgEx> Operator<L> for ProbPEPOpC<'a, L>
{
    fn size(&self) -> (usize, usize)
    {
        let (n, one) = self.vec_c.size();
        assert_eq!(one, 1);

        (n, 1)
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        // y = a*vec_c*x + b*y;
        self.vec_c.op(alpha, x, beta, y);
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        // y = a*vec_c^T*x + b*y;
        self.vec_c.trans_op(alpha, x, beta, y);
    }

    fn absadd_cols(&self, tau: &mut L::Sl)
    {
        self.vec_c.absadd_cols(tau);
    }

    fn absadd_rows(&self, sigma: &mut L::Sl)
    {
        self.vec_c.absadd_rows(sigma);
    }
}

//

pub struct ProbPEPOpA<'a, L: LinAlgEx>
{
    mat_a: MatOp<'a, L>,
    sk: usize,
}

impl<'a, L: LinAlgEx> ProbPEPOpA<'a, L>
{
    fn dim(&self) -> (usize, usize, usize)
    {
        let (pm, n) = self.mat_a.size();
        assert!(self.sk <= n);

        (n, pm, self.sk)
    }
}

impl<'a, L: LinAlgEx> Operator<L> for ProbPEPOpA<'a, L>
{
    fn size(&self) -> (usize, usize)
    {
        let (n, pm, sk) = self.dim();

        (pm + sk, n)
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        let (_n, pm, sk) = self.dim();

        splitm_mut!(y, (y_pm; pm), (y_sk; sk));
        splitm!(x, (x_sk; sk));

        // y_pm = a*mat_a*x + b*y_pm
        self.mat_a.op(alpha, x, beta, &mut y_pm);

        // y_sk = -a*x_sk + b*y_sk
        L::scale(beta, &mut y_sk);
        L::add(-alpha, &x_sk, &mut y_sk);
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        let (_n, pm, sk) = self.dim();

        splitm!(x, (x_pm; pm), (x_sk; sk));

        // y = a*mat_a^T*x_pm + b*y
        self.mat_a.trans_op(alpha, &x_pm, beta, y);

        // y_sk = -a*x_sk + y_sk
        splitm_mut!(y, (y_sk; sk));
        L::add(-alpha, &x_sk, &mut y_sk);
    }

    fn absadd_cols(&self, tau: &mut L::Sl)
    {
        let (_n, _pm, sk) = self.dim();

        self.mat_a.absadd_cols(tau);

        splitm_mut!(tau, (tau_sk; sk));
        L::adds(L::F::one(), &mut tau_sk);
    }

    fn absadd_rows(&self, sigma: &mut L::Sl)
    {
        let (_n, pm, sk) = self.dim();

        splitm_mut!(sigma, (sigma_pm; pm), (sigma_sk; sk));

        self.mat_a.absadd_rows(&mut sigma_pm);
        L::adds(L::F::one(), &mut sigma_sk);
    }
}

//

pub struct ProbPEPOpB<'a, L: LinAlgEx>
{
    vec_b: MatOp<'a, L>,
    sk: usize,
}

impl<'a, L: LinAlgEx> ProbPEPOpB<'a, L>
{
    fn dim(&self) -> (usize, usize)
    {
        let (pm, one) = self.vec_b.size();
        assert_eq!(one, 1);

        (pm, self.sk)
    }
}

impl<'a, L: LinAlgEx> Operator<L> for ProbPEPOpB<'a, L>
{
    fn size(&self) -> (usize, usize)
    {
        let (pm, sk) = self.dim();

        (pm + sk, 1)
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        let (pm, sk) = self.dim();

        splitm_mut!(y, (y_pm; pm), (y_sk; sk));

        // y_pm = a*vec_b*x + b*y_pm
        self.vec_b.op(alpha, x, beta, &mut y_pm);

        // y_sk = b*y_sk
        L::scale(beta, &mut y_sk);
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        let (pm, _sk) = self.dim();

        splitm!(x, (x_pm; pm));

        // y = a*vec_b^T*x_pm + b*y
        self.vec_b.trans_op(alpha, &x_pm, beta, y);
    }

    fn absadd_cols(&self, tau: &mut L::Sl)
    {
        self.vec_b.absadd_cols(tau);
    }

    fn absadd_rows(&self, sigma: &mut L::Sl)
    {
        let (pm, _sk) = self.dim();

        splitm_mut!(sigma, (sigma_pm; pm));

        self.vec_b.absadd_rows(&mut sigma_pm);
    }
}

//

pub struct ProbPEPCone<'a, L: LinAlgEx>
{
    p: usize,
    m: usize,
    sk: usize,
    cone_zero: ConeZero<L>,
    cone_rpos: ConeRPos<L>,
    cone_psd: ConePSD<'a, L>,
}

impl<'a, L: LinAlgEx> Cone<L> for ProbPEPCone<'a, L>
{
    fn proj(&mut self, dual_cone: bool, x: &mut L::Sl) -> Result<(), ()>
    {
        let (p, m, sk) = (self.p, self.m, self.sk);

        splitm_mut!(x, (x_p; p), (x_m; m), (x_sk; sk));

        self.cone_zero.proj(dual_cone, &mut x_p)?;
        self.cone_rpos.proj(dual_cone, &mut x_m)?;
        self.cone_psd.proj(dual_cone, &mut x_sk)?;
        Ok(())
    }

    fn product_group<G: Fn(&mut L::Sl) + Copy>(&self, dp_tau: &mut L::Sl, group: G)
    {
        let (p, m, sk) = (self.p, self.m, self.sk);

        splitm_mut!(dp_tau, (t_p; p), (t_m; m), (t_sk; sk));

        self.cone_zero.product_group(&mut t_p, group);
        self.cone_rpos.product_group(&mut t_m, group);
        self.cone_psd.product_group(&mut t_sk, group);
    }
}

//

/// Conic program of a performance estimation problem
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// The problem is
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & c^Tx \\\\
/// {\rm subject \ to} & A_{\rm eq} x + b_{\rm eq} = 0 \\\\
/// & A_{\rm in} x + b_{\rm in} \le 0 \\\\
/// & G \succeq 0,
/// \end{array}
/// \\]
/// where
/// - variables \\( x = ({\rm vec}(G), F) \in \mathbb{R}^n \\)
///   with \\( G \in \mathcal{S}^d \\) the Gram matrix and \\( F \\) the function values
/// - \\( c \in \mathbb{R}^n \\)
/// - \\( A_{\rm eq} \in \mathbb{R}^{p \times n},\ b_{\rm eq} \in \mathbb{R}^p \\)
/// - \\( A_{\rm in} \in \mathbb{R}^{m \times n},\ b_{\rm in} \in \mathbb{R}^m \\).
///
/// The conic form fed to the solver is
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & c^Tx \\\\
/// {\rm subject \ to} &
///   \left[ \begin{array}{cc}
///   \multicolumn{2}{c}{A_{\rm eq}} \\\\
///   \multicolumn{2}{c}{A_{\rm in}} \\\\
///   -I & 0
///   \end{array} \right]
///   x
///   + s =
///   \left[ \begin{array}{c}
///   -b_{\rm eq} \\\\ -b_{\rm in} \\\\ 0
///   \end{array} \right] \\\\
/// & s \in \lbrace 0 \rbrace^p \times \mathbb{R}\_+^m \times {\rm vec}(\mathcal{S}_+^d).
/// \end{array}
/// \\]
///
/// \\( {\rm vec}(X) = (X_{11}\ \sqrt2 X_{12}\ X_{22}\ \sqrt2 X_{13}\ \sqrt2 X_{23}\ X_{33}\ \cdots)^T \\)
/// which extracts and scales the upper-triangular part of a symmetric matrix X in column-wise.
/// [`ConeZero`], [`ConeRPos`] and [`ConePSD`] are used for each block.
pub struct ProbPEP<L: LinAlgEx>
{
    vec_c: MatBuild<L>,
    mat_a: MatBuild<L>,
    vec_b: MatBuild<L>,

    p: usize,
    sk: usize,

    eps_zero: L::F,
    w_cone_psd: Vec<L::F>,
    w_solver: Vec<L::F>,
}

impl<L: LinAlgEx> ProbPEP<L>
{
    /// Creates a conic program with given data.
    ///
    /// Returns a [`ProbPEP`] instance.
    /// * `vec_c` is \\(c\\).
    /// * `mat_a` is \\(A_{\rm eq}\\) stacked on \\(A_{\rm in}\\).
    /// * `vec_b` is \\(-b_{\rm eq}\\) stacked on \\(-b_{\rm in}\\).
    /// * `p` is a number of the equality rows.
    /// * `sk` is a length of \\({\rm vec}(G)\\), which occupies the first columns.
    /// * `eps_zero` should be the same value as [`totsu_core::solver::SolverParam::eps_zero`].
    pub fn new(
        vec_c: MatBuild<L>,
        mat_a: MatBuild<L>, vec_b: MatBuild<L>,
        p: usize, sk: usize,
        eps_zero: L::F) -> Self
    {
        let n = vec_c.size().0;
        let pm = vec_b.size().0;

        assert_eq!(vec_c.size(), (n, 1));
        assert_eq!(mat_a.size(), (pm, n));
        assert_eq!(vec_b.size(), (pm, 1));
        assert!(p <= pm);
        assert!(sk <= n);

        ProbPEP {
            vec_c,
            mat_a,
            vec_b,
            p,
            sk,
            eps_zero,
            w_cone_psd: Vec::new(),
            w_solver: Vec::new(),
        }
    }

    /// Generates the problem data structures to be fed to [`totsu_core::solver::Solver::solve`].
    ///
    /// Returns a tuple of operators, a cone and a work slice.
    pub fn problem(&mut self) -> (ProbPEPOpC<L>, ProbPEPOpA<L>, ProbPEPOpB<L>, ProbPEPCone<'_, L>, &mut[L::F])
    {
        let p = self.p;
        let m = self.vec_b.size().0 - p;
        let sk = self.sk;

        let f0 = L::F::zero();

        let op_c = ProbPEPOpC {
            vec_c: self.vec_c.as_op(),
        };
        let op_a = ProbPEPOpA {
            mat_a: self.mat_a.as_op(),
            sk,
        };
        let op_b = ProbPEPOpB {
            vec_b: self.vec_b.as_op(),
            sk,
        };

        self.w_cone_psd.resize(ConePSD::<L>::query_worklen(sk), f0);
        let cone = ProbPEPCone {
            p, m, sk,
            cone_zero: ConeZero::new(),
            cone_rpos: ConeRPos::new(),
            cone_psd: ConePSD::new(self.w_cone_psd.as_mut(), self.eps_zero),
        };

        self.w_solver.resize(Solver::<L>::query_worklen(op_a.size()), f0);

        (op_c, op_a, op_b, cone, self.w_solver.as_mut())
    }
}

//

#[test]
fn test_pep_op_a_trans()
{
    use float_eq::assert_float_eq;
    use totsu_core::{FloatGeneric, MatType};

    type L = FloatGeneric<f64>;

    // 1 row, vec(G) of 2x2 and one value
    let vec_c = MatBuild::<L>::new(MatType::General(4, 1));
    let mat_a = MatBuild::<L>::new(MatType::General(1, 4)).iter_colmaj(&[
        1., 2., 3., 4.,
    ]);
    let vec_b = MatBuild::<L>::new(MatType::General(1, 1));
    let mut prob = ProbPEP::new(vec_c, mat_a, vec_b, 0, 3, 1e-12);
    let (_, op_a, _, _, _) = prob.problem();

    assert_eq!(op_a.size(), (4, 4));

    let x = [1., 1., 1., 1.];
    let mut y = [0.; 4];
    op_a.op(1., &x, 0., &mut y);
    assert_float_eq!(y.as_ref(), [10., -1., -1., -1.].as_ref(), abs_all <= 1e-12);

    let mut z = [0.; 4];
    op_a.trans_op(1., &y, 0., &mut z);
    assert_float_eq!(z.as_ref(), [11., 21., 31., 40.].as_ref(), abs_all <= 1e-12);

    let mut tau = [0.; 4];
    op_a.absadd_cols(&mut tau);
    assert_float_eq!(tau.as_ref(), [2., 3., 4., 4.].as_ref(), abs_all <= 1e-12);

    let mut sigma = [0.; 4];
    op_a.absadd_rows(&mut sigma);
    assert_float_eq!(sigma.as_ref(), [10., 1., 1., 1.].as_ref(), abs_all <= 1e-12);
}
