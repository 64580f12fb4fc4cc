use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::{
    DEFAULT_PERIODS_PER_YEAR, GoalInput, PaymentTiming, ProjectionInput, RateConvention,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CliRateConvention {
    Nominal,
    Effective,
}

impl From<CliRateConvention> for RateConvention {
    fn from(value: CliRateConvention) -> Self {
        match value {
            CliRateConvention::Nominal => RateConvention::Nominal,
            CliRateConvention::Effective => RateConvention::Effective,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CliPaymentTiming {
    End,
    Start,
}

impl From<CliPaymentTiming> for PaymentTiming {
    fn from(value: CliPaymentTiming) -> Self {
        match value {
            CliPaymentTiming::End => PaymentTiming::End,
            CliPaymentTiming::Start => PaymentTiming::Start,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sipcalc",
    about = "Systematic investment plan projections: level, step-up and goal-based"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve(ServeArgs),
    /// Project a level periodic contribution
    Project(ProjectArgs),
    /// Project a contribution raised once per year by --step-up percent
    StepUp(ProjectArgs),
    /// Solve for the periodic contribution that reaches a target in today's money
    Goal(GoalArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(env = "SIPCALC_PORT", default_value_t = 8080)]
    pub port: u16,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, help = "Contribution per period (initial contribution for step-up)")]
    pub contribution: f64,
    #[arg(long, help = "Expected annual return in percent, e.g. 12")]
    pub rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual inflation in percent")]
    pub inflation: f64,
    #[arg(long, help = "Investment horizon in years")]
    pub years: f64,
    #[arg(long, default_value_t = DEFAULT_PERIODS_PER_YEAR)]
    pub periods_per_year: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Yearly contribution increase in percent (step-up only)"
    )]
    pub step_up: f64,
    #[arg(long, value_enum, default_value_t = CliRateConvention::Nominal)]
    pub(crate) rate_convention: CliRateConvention,
    #[arg(long, value_enum, default_value_t = CliPaymentTiming::End)]
    pub(crate) timing: CliPaymentTiming,
}

impl ProjectArgs {
    pub fn to_input(&self) -> ProjectionInput {
        ProjectionInput {
            periodic_contribution: self.contribution,
            annual_rate_percent: self.rate,
            inflation_percent: self.inflation,
            horizon_years: self.years,
            periods_per_year: self.periods_per_year,
            step_up_percent: self.step_up,
            rate_convention: self.rate_convention.into(),
            payment_timing: self.timing.into(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GoalArgs {
    #[arg(long, help = "Target amount in today's money")]
    pub target: f64,
    #[arg(long)]
    pub years: f64,
    #[arg(long, help = "Expected annual return in percent, e.g. 12")]
    pub rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual inflation in percent")]
    pub inflation: f64,
    #[arg(long, default_value_t = DEFAULT_PERIODS_PER_YEAR)]
    pub periods_per_year: u32,
    #[arg(long, value_enum, default_value_t = CliRateConvention::Nominal)]
    pub(crate) rate_convention: CliRateConvention,
    #[arg(long, value_enum, default_value_t = CliPaymentTiming::End)]
    pub(crate) timing: CliPaymentTiming,
}

impl GoalArgs {
    pub fn to_goal(&self) -> GoalInput {
        GoalInput {
            target_value_today: self.target,
            horizon_years: self.years,
            annual_rate_percent: self.rate,
            inflation_percent: self.inflation,
            periods_per_year: self.periods_per_year,
            rate_convention: self.rate_convention.into(),
            payment_timing: self.timing.into(),
        }
    }
}
