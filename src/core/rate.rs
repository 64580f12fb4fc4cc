use super::types::RateConvention;

/// Converts a nominal annual rate in percent into the growth rate of one period.
///
/// Any real input is accepted. Rates at or below -100% per period are caught by
/// the callers' domain checks, not here.
pub fn effective_period_rate(
    annual_rate_percent: f64,
    periods_per_year: u32,
    convention: RateConvention,
) -> f64 {
    let periods = periods_per_year.max(1) as f64;
    let annual = annual_rate_percent / 100.0;
    match convention {
        RateConvention::Nominal => annual / periods,
        RateConvention::Effective => (1.0 + annual).powf(1.0 / periods) - 1.0,
    }
}
