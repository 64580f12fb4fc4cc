use tracing::debug;

use super::engine::{
    checked_period_rate, inflation_factor, level_future_value, period_count, require_finite,
    require_finite_output, validate_horizon,
};
use super::error::{EngineError, EngineResult};
use super::types::{GoalInput, GoalResult};

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub max_iterations: u32,
    /// Stop once the bracket is narrower than this fraction of the nominal target.
    pub relative_tolerance: f64,
}

impl Default for GoalSolveConfig {
    fn default() -> Self {
        Self {
            max_iterations: 60,
            relative_tolerance: 1e-12,
        }
    }
}

/// Doublings allowed when the initial upper bound does not reach the target.
const MAX_BOUND_EXPANSIONS: u32 = 64;

pub fn solve_required_contribution(goal: &GoalInput) -> EngineResult<GoalResult> {
    solve_required_contribution_with(goal, GoalSolveConfig::default())
}

/// Bisects on the level contribution until its projected nominal value meets the
/// inflation-scaled target. The returned amount is the upper end of the final
/// bracket, so it never falls short.
pub fn solve_required_contribution_with(
    goal: &GoalInput,
    config: GoalSolveConfig,
) -> EngineResult<GoalResult> {
    validate_goal(goal, config)?;
    let rate = checked_period_rate(
        goal.annual_rate_percent,
        goal.periods_per_year,
        goal.rate_convention,
    )?;
    let periods = period_count(goal.horizon_years, goal.periods_per_year);
    if periods == 0 {
        return Err(EngineError::Validation(
            "horizon_years is too short to hold a single contribution period".to_string(),
        ));
    }

    let deflator = inflation_factor(goal.inflation_percent, goal.horizon_years)?;
    let target_nominal =
        require_finite_output("nominal target", goal.target_value_today * deflator)?;
    let projected = |c: f64| level_future_value(c, rate, periods, goal.payment_timing);

    let mut lo = 0.0;
    let mut hi = target_nominal;
    let mut expansions = 0;
    while require_finite_output("projected value", projected(hi))? < target_nominal {
        if expansions == MAX_BOUND_EXPANSIONS {
            return Err(EngineError::Domain(
                "no contribution within search bounds reaches the target".to_string(),
            ));
        }
        lo = hi;
        hi *= 2.0;
        expansions += 1;
    }

    let width_tolerance = target_nominal * config.relative_tolerance;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.max_iterations {
        iterations += 1;
        let mid = (lo + hi) * 0.5;
        if projected(mid) < target_nominal {
            lo = mid;
        } else {
            hi = mid;
        }

        if (hi - lo).abs() <= width_tolerance {
            converged = true;
            break;
        }
    }
    debug!(
        iterations,
        converged,
        expansions,
        required = hi,
        target_nominal,
        "goal solve finished"
    );

    Ok(GoalResult {
        required_periodic_contribution: hi,
        target_value_today: goal.target_value_today,
        target_value_nominal: target_nominal,
        horizon_years: goal.horizon_years,
        total_periods: periods,
        total_contributed: hi * periods as f64,
        iterations,
        converged,
    })
}

fn validate_goal(goal: &GoalInput, config: GoalSolveConfig) -> EngineResult<()> {
    require_finite(&[
        ("target_value_today", goal.target_value_today),
        ("horizon_years", goal.horizon_years),
        ("annual_rate_percent", goal.annual_rate_percent),
        ("inflation_percent", goal.inflation_percent),
    ])?;
    if goal.target_value_today <= 0.0 {
        return Err(EngineError::Validation(
            "target_value_today must be > 0".to_string(),
        ));
    }
    if goal.inflation_percent < 0.0 {
        return Err(EngineError::Validation(
            "inflation_percent must be >= 0".to_string(),
        ));
    }
    validate_horizon(goal.horizon_years, goal.periods_per_year)?;
    if config.max_iterations == 0 {
        return Err(EngineError::Validation(
            "max_iterations must be > 0".to_string(),
        ));
    }
    if !config.relative_tolerance.is_finite() || config.relative_tolerance < 0.0 {
        return Err(EngineError::Validation(
            "relative_tolerance must be >= 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::project;
    use crate::core::types::{PaymentTiming, RateConvention};
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn round_trip_value(goal: &GoalInput, result: &GoalResult) -> f64 {
        project(&goal.projection_for(result.required_periodic_contribution))
            .expect("solved contribution must project")
            .nominal_future_value
    }

    #[test]
    fn solver_reproduces_inflated_target_over_fifteen_years() {
        let goal = GoalInput::monthly(1_000_000.0, 15.0, 12.0, 6.0);
        let result = solve_required_contribution(&goal).expect("must solve");

        let target_nominal = 1_000_000.0 * 1.06_f64.powi(15);
        assert_close(result.target_value_nominal, target_nominal, 1e-6);
        assert_close(result.target_value_nominal, 2_396_558.19, 0.01);
        assert_close(result.required_periodic_contribution, 4_797.144, 0.01);
        assert_eq!(result.total_periods, 180);
        assert!(result.converged);

        let achieved = round_trip_value(&goal, &result);
        assert!(achieved >= target_nominal);
        assert_close(achieved, target_nominal, target_nominal * 1e-4);
    }

    #[test]
    fn solver_handles_zero_rate_and_zero_inflation() {
        let goal = GoalInput::monthly(120_000.0, 10.0, 0.0, 0.0);
        let result = solve_required_contribution(&goal).expect("must solve");

        assert_close(result.required_periodic_contribution, 1_000.0, 1e-6);
        assert_close(result.total_contributed, 120_000.0, 1e-3);
    }

    #[test]
    fn solver_expands_bound_for_shrinking_annuity_due() {
        let mut goal = GoalInput::monthly(10_000.0, 1.0 / 12.0, -60.0, 0.0);
        goal.payment_timing = PaymentTiming::Start;
        let result = solve_required_contribution(&goal).expect("must solve");

        assert_eq!(result.total_periods, 1);
        assert!(result.required_periodic_contribution > goal.target_value_today);
        assert_close(
            result.required_periodic_contribution,
            10_000.0 / 0.95,
            1e-6,
        );
    }

    #[test]
    fn solver_rejects_invalid_goals() {
        let bad_target = GoalInput::monthly(0.0, 10.0, 12.0, 6.0);
        assert!(matches!(
            solve_required_contribution(&bad_target),
            Err(EngineError::Validation(_))
        ));

        let bad_horizon = GoalInput::monthly(1_000.0, 0.0, 12.0, 6.0);
        assert!(matches!(
            solve_required_contribution(&bad_horizon),
            Err(EngineError::Validation(_))
        ));

        let too_short = GoalInput::monthly(1_000.0, 0.01, 12.0, 6.0);
        assert!(matches!(
            solve_required_contribution(&too_short),
            Err(EngineError::Validation(_))
        ));

        let infinite = GoalInput::monthly(f64::INFINITY, 10.0, 12.0, 6.0);
        assert!(matches!(
            solve_required_contribution(&infinite),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn solver_rejects_total_loss_rates_as_domain_errors() {
        let goal = GoalInput::monthly(1_000.0, 10.0, -1_200.0, 0.0);
        assert!(matches!(
            solve_required_contribution(&goal),
            Err(EngineError::Domain(_))
        ));
    }

    #[test]
    fn solver_rejects_targets_that_overflow_after_inflation() {
        let goal = GoalInput::monthly(1_000_000.0, 100.0, 12.0, 1_000_000.0);
        assert!(matches!(
            solve_required_contribution(&goal),
            Err(EngineError::Domain(_))
        ));
    }

    #[test]
    fn solver_rejects_growth_that_overflows_the_projection() {
        let goal = GoalInput::monthly(1_000_000.0, 100.0, 1_000_000.0, 0.0);
        assert!(matches!(
            solve_required_contribution(&goal),
            Err(EngineError::Domain(_))
        ));
    }

    #[test]
    fn solver_reports_non_convergence_with_tiny_iteration_budget() {
        let goal = GoalInput::monthly(50_000.0, 5.0, 8.0, 3.0);
        let config = GoalSolveConfig {
            max_iterations: 3,
            relative_tolerance: 1e-12,
        };
        let result = solve_required_contribution_with(&goal, config).expect("must return");

        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        assert!(round_trip_value(&goal, &result) >= result.target_value_nominal);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_solved_contribution_round_trips_through_projection(
            target in 1_000u32..5_000_000,
            years in 1u32..40,
            rate_bp in -500i32..2500,
            inflation_bp in 0u32..1200,
            effective in proptest::bool::ANY,
            due in proptest::bool::ANY
        ) {
            let mut goal = GoalInput::monthly(
                target as f64,
                years as f64,
                rate_bp as f64 / 100.0,
                inflation_bp as f64 / 100.0,
            );
            if effective {
                goal.rate_convention = RateConvention::Effective;
            }
            if due {
                goal.payment_timing = PaymentTiming::Start;
            }
            let result = solve_required_contribution(&goal).expect("must solve");
            let achieved = round_trip_value(&goal, &result);
            let target_nominal = result.target_value_nominal;

            prop_assert!(result.required_periodic_contribution >= 0.0);
            prop_assert!(achieved >= target_nominal * (1.0 - 1e-12));
            prop_assert!((achieved - target_nominal).abs() <= target_nominal * 1e-4);
        }
    }
}
