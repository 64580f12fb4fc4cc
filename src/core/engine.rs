use super::error::{EngineError, EngineResult};
use super::rate::effective_period_rate;
use super::types::{PaymentTiming, ProjectionInput, ProjectionResult, RateConvention, ScheduleYear};

/// Upper bound on contribution periods in one calculation (a thousand years of months).
pub const MAX_TOTAL_PERIODS: u32 = 12_000;

/// Level contributions compounded over `round(horizon_years * periods_per_year)` periods.
pub fn project(input: &ProjectionInput) -> EngineResult<ProjectionResult> {
    validate_projection(input)?;
    let rate = checked_period_rate(
        input.annual_rate_percent,
        input.periods_per_year,
        input.rate_convention,
    )?;
    let periods = period_count(input.horizon_years, input.periods_per_year);

    let nominal = level_future_value(
        input.periodic_contribution,
        rate,
        periods,
        input.payment_timing,
    );
    let contributed = input.periodic_contribution * periods as f64;

    build_result(input, nominal, contributed, input.horizon_years, periods)
}

/// Contributions held flat within each whole year and raised by `step_up_percent`
/// after it. A partial final year is dropped.
pub fn project_step_up(input: &ProjectionInput) -> EngineResult<ProjectionResult> {
    validate_projection(input)?;
    let rate = checked_period_rate(
        input.annual_rate_percent,
        input.periods_per_year,
        input.rate_convention,
    )?;
    let periods_per_year = input.periods_per_year;
    let whole_years = period_count(input.horizon_years, periods_per_year) / periods_per_year;
    let total_periods = whole_years * periods_per_year;
    let step = 1.0 + input.step_up_percent / 100.0;
    let offset = timing_offset(input.payment_timing);

    let mut amount = input.periodic_contribution;
    let mut nominal = 0.0;
    let mut contributed = 0.0;
    for year in 0..whole_years {
        for period_in_year in 0..periods_per_year {
            let period = year * periods_per_year + period_in_year + 1;
            let remaining = total_periods - period + offset;
            nominal += amount * (1.0 + rate).powi(remaining as i32);
        }
        contributed += amount * periods_per_year as f64;
        amount *= step;
    }

    build_result(
        input,
        nominal,
        contributed,
        whole_years as f64,
        total_periods,
    )
}

/// Year-by-year growth of the level projection. A partial final year gets its own row.
pub fn yearly_schedule(input: &ProjectionInput) -> EngineResult<Vec<ScheduleYear>> {
    validate_projection(input)?;
    let rate = checked_period_rate(
        input.annual_rate_percent,
        input.periods_per_year,
        input.rate_convention,
    )?;
    let periods = period_count(input.horizon_years, input.periods_per_year);
    build_schedule(input, rate, periods, 1.0)
}

/// Year-by-year growth of the step-up projection, whole years only.
pub fn yearly_schedule_step_up(input: &ProjectionInput) -> EngineResult<Vec<ScheduleYear>> {
    validate_projection(input)?;
    let rate = checked_period_rate(
        input.annual_rate_percent,
        input.periods_per_year,
        input.rate_convention,
    )?;
    let periods_per_year = input.periods_per_year;
    let whole_years = period_count(input.horizon_years, periods_per_year) / periods_per_year;
    let step = 1.0 + input.step_up_percent / 100.0;
    build_schedule(input, rate, whole_years * periods_per_year, step)
}

pub(super) fn validate_projection(input: &ProjectionInput) -> EngineResult<()> {
    require_finite(&[
        ("periodic_contribution", input.periodic_contribution),
        ("annual_rate_percent", input.annual_rate_percent),
        ("inflation_percent", input.inflation_percent),
        ("horizon_years", input.horizon_years),
        ("step_up_percent", input.step_up_percent),
    ])?;
    if input.periodic_contribution < 0.0 {
        return Err(validation("periodic_contribution must be >= 0"));
    }
    if input.inflation_percent < 0.0 {
        return Err(validation("inflation_percent must be >= 0"));
    }
    if input.step_up_percent < 0.0 {
        return Err(validation("step_up_percent must be >= 0"));
    }
    validate_horizon(input.horizon_years, input.periods_per_year)
}

pub(super) fn validate_horizon(horizon_years: f64, periods_per_year: u32) -> EngineResult<()> {
    if periods_per_year == 0 {
        return Err(validation("periods_per_year must be > 0"));
    }
    if horizon_years <= 0.0 {
        return Err(validation("horizon_years must be > 0"));
    }
    if horizon_years * periods_per_year as f64 > MAX_TOTAL_PERIODS as f64 {
        return Err(EngineError::Validation(format!(
            "horizon covers more than {MAX_TOTAL_PERIODS} contribution periods"
        )));
    }
    Ok(())
}

pub(super) fn require_finite(fields: &[(&str, f64)]) -> EngineResult<()> {
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(EngineError::Validation(format!(
                "{name} must be a finite number"
            )));
        }
    }
    Ok(())
}

/// Rejects a computed amount that overflowed `f64`.
pub(super) fn require_finite_output(name: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::Domain(format!(
            "{name} exceeds the representable range for these inputs"
        )))
    }
}

/// Per-period rate, rejected when it would wipe out (or invert) the balance each period.
pub(super) fn checked_period_rate(
    annual_rate_percent: f64,
    periods_per_year: u32,
    convention: RateConvention,
) -> EngineResult<f64> {
    let rate = effective_period_rate(annual_rate_percent, periods_per_year, convention);
    if rate.is_nan() || rate <= -1.0 {
        return Err(EngineError::Domain(format!(
            "annual rate of {annual_rate_percent}% gives a per-period rate at or below -100%"
        )));
    }
    Ok(rate)
}

/// Rounds half up; callers have already bounded the product.
pub(super) fn period_count(horizon_years: f64, periods_per_year: u32) -> u32 {
    (horizon_years * periods_per_year as f64).max(0.0).round() as u32
}

pub(super) fn level_future_value(
    contribution: f64,
    rate: f64,
    periods: u32,
    timing: PaymentTiming,
) -> f64 {
    if periods == 0 || contribution == 0.0 {
        return 0.0;
    }
    if rate == 0.0 {
        return contribution * periods as f64;
    }
    // (1+i)^n - 1 without cancellation for tiny rates
    let annuity_factor = (periods as f64 * rate.ln_1p()).exp_m1() / rate;
    let due_factor = match timing {
        PaymentTiming::End => 1.0,
        PaymentTiming::Start => 1.0 + rate,
    };
    contribution * annuity_factor * due_factor
}

pub(super) fn inflation_factor(inflation_percent: f64, horizon_years: f64) -> EngineResult<f64> {
    require_finite_output(
        "inflation factor",
        (1.0 + inflation_percent / 100.0).powf(horizon_years),
    )
}

fn timing_offset(timing: PaymentTiming) -> u32 {
    match timing {
        PaymentTiming::End => 0,
        PaymentTiming::Start => 1,
    }
}

fn build_result(
    input: &ProjectionInput,
    nominal: f64,
    contributed: f64,
    horizon_years: f64,
    total_periods: u32,
) -> EngineResult<ProjectionResult> {
    let nominal = require_finite_output("nominal future value", nominal)?;
    let contributed = require_finite_output("total contributed", contributed)?;
    let deflator = inflation_factor(input.inflation_percent, input.horizon_years)?;
    let real = require_finite_output("real future value", nominal / deflator)?;
    let wealth_multiple = if contributed > 0.0 {
        nominal / contributed
    } else {
        0.0
    };
    let average_periodic_contribution = if total_periods > 0 {
        contributed / total_periods as f64
    } else {
        0.0
    };

    Ok(ProjectionResult {
        nominal_future_value: nominal,
        real_future_value: real,
        total_contributed: contributed,
        horizon_years,
        total_periods,
        wealth_gained: nominal - contributed,
        wealth_multiple,
        average_periodic_contribution,
    })
}

fn build_schedule(
    input: &ProjectionInput,
    rate: f64,
    periods: u32,
    step: f64,
) -> EngineResult<Vec<ScheduleYear>> {
    let periods_per_year = input.periods_per_year;
    let mut rows = Vec::with_capacity(periods.div_ceil(periods_per_year) as usize);
    let mut amount = input.periodic_contribution;
    let mut balance = 0.0;
    let mut cumulative = 0.0;
    let mut elapsed = 0;
    let mut year = 0;

    while elapsed < periods {
        year += 1;
        let periods_this_year = (periods - elapsed).min(periods_per_year);
        let mut contribution = 0.0;
        let mut interest = 0.0;
        for _ in 0..periods_this_year {
            match input.payment_timing {
                PaymentTiming::Start => {
                    balance += amount;
                    let earned = balance * rate;
                    balance += earned;
                    interest += earned;
                }
                PaymentTiming::End => {
                    let earned = balance * rate;
                    balance += earned + amount;
                    interest += earned;
                }
            }
            contribution += amount;
        }
        elapsed += periods_this_year;
        cumulative += contribution;

        rows.push(ScheduleYear {
            year,
            periodic_contribution: amount,
            contribution,
            interest: require_finite_output("yearly interest", interest)?,
            end_balance: require_finite_output("year-end balance", balance)?,
            cumulative_contribution: require_finite_output("total contributed", cumulative)?,
        });
        amount *= step;
    }
    Ok(rows)
}

fn validation(msg: &str) -> EngineError {
    EngineError::Validation(msg.to_string())
}
