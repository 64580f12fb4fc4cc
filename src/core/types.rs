use serde::Serialize;

pub const DEFAULT_PERIODS_PER_YEAR: u32 = 12;

/// How a nominal annual rate is turned into a per-period growth rate.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateConvention {
    /// `annual / 100 / periods_per_year`
    #[default]
    Nominal,
    /// `(1 + annual / 100)^(1 / periods_per_year) - 1`
    Effective,
}

/// When in each period the contribution is invested.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentTiming {
    /// Ordinary annuity: the payment earns nothing in the period it is made.
    #[default]
    End,
    /// Annuity-due: the payment earns a full period of growth immediately.
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInput {
    pub periodic_contribution: f64,
    pub annual_rate_percent: f64,
    pub inflation_percent: f64,
    pub horizon_years: f64,
    pub periods_per_year: u32,
    /// Yearly increase applied to the contribution by the step-up projection.
    pub step_up_percent: f64,
    pub rate_convention: RateConvention,
    pub payment_timing: PaymentTiming,
}

impl ProjectionInput {
    /// Monthly contributions with no step-up and the default conventions.
    pub fn monthly(
        periodic_contribution: f64,
        annual_rate_percent: f64,
        inflation_percent: f64,
        horizon_years: f64,
    ) -> Self {
        Self {
            periodic_contribution,
            annual_rate_percent,
            inflation_percent,
            horizon_years,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            step_up_percent: 0.0,
            rate_convention: RateConvention::default(),
            payment_timing: PaymentTiming::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub nominal_future_value: f64,
    pub real_future_value: f64,
    pub total_contributed: f64,
    pub horizon_years: f64,
    pub total_periods: u32,
    pub wealth_gained: f64,
    pub wealth_multiple: f64,
    pub average_periodic_contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalInput {
    /// Target expressed in today's money.
    pub target_value_today: f64,
    pub horizon_years: f64,
    pub annual_rate_percent: f64,
    pub inflation_percent: f64,
    pub periods_per_year: u32,
    pub rate_convention: RateConvention,
    pub payment_timing: PaymentTiming,
}

impl GoalInput {
    pub fn monthly(
        target_value_today: f64,
        horizon_years: f64,
        annual_rate_percent: f64,
        inflation_percent: f64,
    ) -> Self {
        Self {
            target_value_today,
            horizon_years,
            annual_rate_percent,
            inflation_percent,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            rate_convention: RateConvention::default(),
            payment_timing: PaymentTiming::default(),
        }
    }

    /// The level-contribution projection the solver inverts, for a candidate amount.
    pub fn projection_for(&self, periodic_contribution: f64) -> ProjectionInput {
        ProjectionInput {
            periodic_contribution,
            annual_rate_percent: self.annual_rate_percent,
            inflation_percent: self.inflation_percent,
            horizon_years: self.horizon_years,
            periods_per_year: self.periods_per_year,
            step_up_percent: 0.0,
            rate_convention: self.rate_convention,
            payment_timing: self.payment_timing,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResult {
    /// Upper end of the final bisection bracket. Projecting it never falls short
    /// of `target_value_nominal`.
    pub required_periodic_contribution: f64,
    pub target_value_today: f64,
    pub target_value_nominal: f64,
    pub horizon_years: f64,
    pub total_periods: u32,
    pub total_contributed: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// One row of the year-by-year growth table.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleYear {
    pub year: u32,
    pub periodic_contribution: f64,
    pub contribution: f64,
    pub interest: f64,
    pub end_balance: f64,
    pub cumulative_contribution: f64,
}
