//! StableSwap math with Newton-Raphson solvers
//!
//! Solves the StableSwap curve
//!
//! ```text
//! A·n^n·Σxᵢ + D = A·n^n·D + D^(n+1) / (n^n·Πxᵢ)
//! ```
//!
//! for the invariant `D` given balances, and for one balance given `D` and the
//! others. The swap quote composes the two. `A` arrives pre-multiplied by
//! [`AMP_PRECISION`]; every product of scaled amounts is formed in 256 bits.
//!
//! Both solvers iterate over a fixed budget and either return the converged
//! value or [`MathError::ConvergenceFailure`]. A stale iterate is never returned.

use serde::{Deserialize, Serialize};
use tracing::debug;
use types::common::wide::{self, widen, U256};
use types::{MathError, Rounding, ScaledAmount, Solver};

use crate::pool_traits::validate_swap_fee;

/// Scale of the amplification parameter
pub const AMP_PRECISION: u64 = 1000;
/// Smallest whole amplification accepted by pool configuration
pub const MIN_AMP: u64 = 1;
/// Largest whole amplification accepted by pool configuration
pub const MAX_AMP: u64 = 10_000;

/// `|D_new − D|` at or below this (in scaled units) ends the invariant solve
pub const INVARIANT_CONVERGENCE_THRESHOLD: u128 = 100;
pub const MAX_INVARIANT_ITERATIONS: u32 = 256;

/// `|y_new − y|` at or below this ends the balance solve
pub const BALANCE_CONVERGENCE_THRESHOLD: u128 = 1;
pub const MAX_BALANCE_ITERATIONS: u32 = 64;

/// Amplification parameter `A`, pre-multiplied by [`AMP_PRECISION`]
///
/// Distinct from [`ScaledAmount`] so the two scales cannot be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct AmpFactor(u64);

impl AmpFactor {
    pub const MIN: Self = Self(MIN_AMP * AMP_PRECISION);
    pub const MAX: Self = Self(MAX_AMP * AMP_PRECISION);

    /// From a value already multiplied by [`AMP_PRECISION`]
    pub fn new(scaled: u64) -> Result<Self, MathError> {
        if scaled < Self::MIN.0 || scaled > Self::MAX.0 {
            return Err(MathError::AmpOutOfRange {
                value: scaled,
                min: Self::MIN.0,
                max: Self::MAX.0,
            });
        }
        Ok(Self(scaled))
    }

    /// From a whole amplification (e.g. `100` → `100_000`)
    pub fn from_whole(amp: u64) -> Result<Self, MathError> {
        let scaled = amp.checked_mul(AMP_PRECISION).ok_or(MathError::Overflow)?;
        Self::new(scaled)
    }

    #[inline]
    pub const fn raw_value(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for AmpFactor {
    type Error = MathError;

    fn try_from(scaled: u64) -> Result<Self, Self::Error> {
        Self::new(scaled)
    }
}

impl From<AmpFactor> for u64 {
    fn from(amp: AmpFactor) -> Self {
        amp.0
    }
}

/// Iteration budget and stopping tolerance for one Newton-Raphson solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverLimits {
    pub max_iterations: u32,
    /// In scaled units
    pub tolerance: u128,
}

impl SolverLimits {
    pub const INVARIANT: Self = Self {
        max_iterations: MAX_INVARIANT_ITERATIONS,
        tolerance: INVARIANT_CONVERGENCE_THRESHOLD,
    };

    pub const BALANCE: Self = Self {
        max_iterations: MAX_BALANCE_ITERATIONS,
        tolerance: BALANCE_CONVERGENCE_THRESHOLD,
    };
}

/// Result of quoting a StableSwap exact-in swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_in: ScaledAmount,
    pub token_index_in: usize,
    pub token_index_out: usize,
    pub amount_out: ScaledAmount,
}

/// StableSwap solver parameterised by its iteration limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableSwapSolver {
    pub invariant_limits: SolverLimits,
    pub balance_limits: SolverLimits,
}

impl Default for StableSwapSolver {
    fn default() -> Self {
        Self {
            invariant_limits: SolverLimits::INVARIANT,
            balance_limits: SolverLimits::BALANCE,
        }
    }
}

impl StableSwapSolver {
    pub fn new(invariant_limits: SolverLimits, balance_limits: SolverLimits) -> Self {
        Self {
            invariant_limits,
            balance_limits,
        }
    }

    /// Invariant `D` for `balances` under amplification `amp`
    ///
    /// Newton-Raphson from `D₀ = Σxᵢ`:
    ///
    /// ```text
    /// D_P   = D · Πᵢ (D / (n·xᵢ))          (built one balance at a time)
    /// D_new = (Ann·S + n·D_P·P) · D / ((Ann − P)·D + (n+1)·D_P·P)
    /// ```
    ///
    /// with `Ann = A·n` and `P = AMP_PRECISION`. An all-zero pool has `D = 0`;
    /// any other zero balance fails with `DivideByZero`.
    pub fn calc_invariant(
        &self,
        amp: AmpFactor,
        balances: &[ScaledAmount],
    ) -> Result<ScaledAmount, MathError> {
        check_pool_size(balances)?;

        let sum = balances.iter().try_fold(U256::zero(), |acc, balance| {
            wide::add(acc, widen(balance.raw_value()))
        })?;
        if sum.is_zero() {
            return Ok(ScaledAmount::ZERO);
        }

        let n = U256::from(balances.len());
        let amp_precision = U256::from(AMP_PRECISION);
        let ann = wide::mul(U256::from(amp.raw_value()), n)?;
        let ann_less_precision = wide::sub(ann, amp_precision)?;
        let ann_sum = wide::mul(ann, sum)?;

        let limits = self.invariant_limits;
        let mut invariant = sum;
        for iteration in 1..=limits.max_iterations {
            let mut d_p = invariant;
            for balance in balances {
                let denominator = wide::mul(n, widen(balance.raw_value()))?;
                d_p = wide::div(wide::mul(d_p, invariant)?, denominator, Rounding::Down)?;
            }

            let d_p_scaled = wide::mul(d_p, amp_precision)?;
            let numerator = wide::mul(
                wide::add(ann_sum, wide::mul(n, d_p_scaled)?)?,
                invariant,
            )?;
            let denominator = wide::add(
                wide::mul(ann_less_precision, invariant)?,
                wide::mul(n + U256::one(), d_p_scaled)?,
            )?;
            let next = wide::div(numerator, denominator, Rounding::Down)?;

            if wide::abs_diff(next, invariant) <= widen(limits.tolerance) {
                let converged = ScaledAmount::from_raw(wide::narrow(next)?);
                debug!(
                    iterations = iteration,
                    invariant = %converged,
                    tokens = balances.len(),
                    "StableSwap invariant converged"
                );
                return Ok(converged);
            }
            invariant = next;
        }

        debug!(
            max_iterations = limits.max_iterations,
            "StableSwap invariant failed to converge"
        );
        Err(MathError::ConvergenceFailure {
            solver: Solver::Invariant,
            iterations: limits.max_iterations,
        })
    }

    /// Balance of token `token_index` that keeps `invariant` with the other
    /// balances fixed
    ///
    /// Newton-Raphson on `y_new = (y² + c) / (2y + b − D)` with
    ///
    /// ```text
    /// P_D = Π(xᵢ·n) / D^(n−1)              (index order, ÷D after each term past the first)
    /// c   = ⌈D²·P / (Ann·P_D)⌉ · x_j
    /// b   = ⌊D·P / Ann⌋ + Σ_{i≠j} xᵢ
    /// y₀  = ⌈(D² + c) / (D + b)⌉
    /// ```
    ///
    /// The `x_j` factor cancels the `x_j` inside `P_D`, so the current value at
    /// `token_index` does not influence the answer. Divisions round up so the
    /// solved balance is never understated.
    pub fn calc_balance_given_invariant(
        &self,
        amp: AmpFactor,
        balances: &[ScaledAmount],
        invariant: ScaledAmount,
        token_index: usize,
    ) -> Result<ScaledAmount, MathError> {
        check_pool_size(balances)?;
        check_index(token_index, balances.len())?;

        let n = U256::from(balances.len());
        let amp_precision = U256::from(AMP_PRECISION);
        let ann = wide::mul(U256::from(amp.raw_value()), n)?;
        if ann.is_zero() {
            return Err(MathError::DivideByZero);
        }
        let d = widen(invariant.raw_value());

        let first = widen(balances[0].raw_value());
        let mut sum = first;
        let mut p_d = wide::mul(first, n)?;
        for balance in &balances[1..] {
            let x = widen(balance.raw_value());
            p_d = wide::div(wide::mul(wide::mul(p_d, x)?, n)?, d, Rounding::Down)?;
            sum = wide::add(sum, x)?;
        }
        let target = widen(balances[token_index].raw_value());
        let sum_others = wide::sub(sum, target)?;

        if p_d.is_zero() {
            return Err(MathError::DivideByZero);
        }

        let d_squared = wide::mul(d, d)?;
        let c = wide::mul(
            wide::div(
                wide::mul(d_squared, amp_precision)?,
                wide::mul(ann, p_d)?,
                Rounding::Up,
            )?,
            target,
        )?;
        let b = wide::add(
            wide::div(wide::mul(d, amp_precision)?, ann, Rounding::Down)?,
            sum_others,
        )?;

        let limits = self.balance_limits;
        let mut balance = wide::div(wide::add(d_squared, c)?, wide::add(d, b)?, Rounding::Up)?;
        for iteration in 1..=limits.max_iterations {
            let previous = balance;

            // 2y + b − D; a degenerate denominator means the curve is
            // ill-conditioned for these inputs rather than a caller error
            let denominator = wide::add(wide::mul(balance, U256::from(2u8))?, b)?
                .checked_sub(d)
                .filter(|value| !value.is_zero())
                .ok_or(MathError::ConvergenceFailure {
                    solver: Solver::BalanceGivenInvariant,
                    iterations: iteration,
                })?;

            balance = wide::div(
                wide::add(wide::mul(balance, balance)?, c)?,
                denominator,
                Rounding::Up,
            )?;

            if wide::abs_diff(balance, previous) <= widen(limits.tolerance) {
                let converged = ScaledAmount::from_raw(wide::narrow(balance)?);
                debug!(
                    iterations = iteration,
                    token_index,
                    balance = %converged,
                    "StableSwap balance converged"
                );
                return Ok(converged);
            }
        }

        debug!(
            max_iterations = limits.max_iterations,
            token_index, "StableSwap balance failed to converge"
        );
        Err(MathError::ConvergenceFailure {
            solver: Solver::BalanceGivenInvariant,
            iterations: limits.max_iterations,
        })
    }

    /// Output amount for swapping `amount_in` of token `token_index_in`
    ///
    /// `amount_out = max(0, x_out − y_out − 1)`: the trailing unit always rounds
    /// the user's output down. A zero input quotes zero without solving.
    pub fn calc_out_given_in(
        &self,
        amp: AmpFactor,
        balances: &[ScaledAmount],
        token_index_in: usize,
        token_index_out: usize,
        amount_in: ScaledAmount,
    ) -> Result<ScaledAmount, MathError> {
        check_pool_size(balances)?;
        check_pair(token_index_in, token_index_out, balances.len())?;
        if amount_in.is_zero() {
            return Ok(ScaledAmount::ZERO);
        }

        let invariant = self.calc_invariant(amp, balances)?;

        let updated = balances
            .iter()
            .enumerate()
            .map(|(index, balance)| {
                if index == token_index_in {
                    balance.checked_add(amount_in)
                } else {
                    Ok(*balance)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let new_balance_out =
            self.calc_balance_given_invariant(amp, &updated, invariant, token_index_out)?;

        let amount_out = balances[token_index_out]
            .raw_value()
            .checked_sub(new_balance_out.raw_value())
            .and_then(|delta| delta.checked_sub(1))
            .unwrap_or(0);

        Ok(ScaledAmount::from_raw(amount_out))
    }

    /// [`calc_out_given_in`](Self::calc_out_given_in) packaged as a [`SwapQuote`]
    pub fn quote(
        &self,
        amp: AmpFactor,
        balances: &[ScaledAmount],
        token_index_in: usize,
        token_index_out: usize,
        amount_in: ScaledAmount,
    ) -> Result<SwapQuote, MathError> {
        let amount_out =
            self.calc_out_given_in(amp, balances, token_index_in, token_index_out, amount_in)?;
        Ok(SwapQuote {
            amount_in,
            token_index_in,
            token_index_out,
            amount_out,
        })
    }
}

/// [`StableSwapSolver::calc_invariant`] with default limits
pub fn calc_invariant(
    amp: AmpFactor,
    balances: &[ScaledAmount],
) -> Result<ScaledAmount, MathError> {
    StableSwapSolver::default().calc_invariant(amp, balances)
}

/// [`StableSwapSolver::calc_balance_given_invariant`] with default limits
pub fn calc_balance_given_invariant(
    amp: AmpFactor,
    balances: &[ScaledAmount],
    invariant: ScaledAmount,
    token_index: usize,
) -> Result<ScaledAmount, MathError> {
    StableSwapSolver::default().calc_balance_given_invariant(amp, balances, invariant, token_index)
}

/// [`StableSwapSolver::calc_out_given_in`] with default limits
pub fn calc_out_given_in(
    amp: AmpFactor,
    balances: &[ScaledAmount],
    token_index_in: usize,
    token_index_out: usize,
    amount_in: ScaledAmount,
) -> Result<ScaledAmount, MathError> {
    StableSwapSolver::default().calc_out_given_in(
        amp,
        balances,
        token_index_in,
        token_index_out,
        amount_in,
    )
}

/// StableSwap pool parameters as supplied by the state owner
#[derive(Debug, Clone, PartialEq)]
pub struct StablePoolState {
    pub balances: Vec<ScaledAmount>,
    pub amp: AmpFactor,
    /// Fraction of SCALE taken from the output
    pub swap_fee: ScaledAmount,
    pub solver: StableSwapSolver,
}

impl StablePoolState {
    pub fn new(
        balances: Vec<ScaledAmount>,
        amp: AmpFactor,
        swap_fee: ScaledAmount,
    ) -> Result<Self, MathError> {
        check_pool_size(&balances)?;
        validate_swap_fee(swap_fee)?;
        Ok(Self {
            balances,
            amp,
            swap_fee,
            solver: StableSwapSolver::default(),
        })
    }

    /// Replace the default iteration limits
    pub fn with_solver(mut self, solver: StableSwapSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn invariant(&self) -> Result<ScaledAmount, MathError> {
        self.solver.calc_invariant(self.amp, &self.balances)
    }
}

pub(crate) fn check_pool_size(balances: &[ScaledAmount]) -> Result<(), MathError> {
    if balances.len() < 2 {
        return Err(MathError::InvalidAmount {
            reason: "pool needs at least two balances",
        });
    }
    Ok(())
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<(), MathError> {
    if index >= len {
        return Err(MathError::TokenIndexOutOfBounds { index, len });
    }
    Ok(())
}

pub(crate) fn check_pair(index_in: usize, index_out: usize, len: usize) -> Result<(), MathError> {
    check_index(index_in, len)?;
    check_index(index_out, len)?;
    if index_in == index_out {
        return Err(MathError::IdenticalTokenIndex { index: index_in });
    }
    Ok(())
}
