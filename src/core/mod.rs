mod engine;
mod error;
mod rate;
mod solver;
mod types;

pub use engine::{
    MAX_TOTAL_PERIODS, project, project_step_up, yearly_schedule, yearly_schedule_step_up,
};
pub use error::{EngineError, EngineResult};
pub use rate::effective_period_rate;
pub use solver::{GoalSolveConfig, solve_required_contribution, solve_required_contribution_with};
pub use types::{
    DEFAULT_PERIODS_PER_YEAR, GoalInput, GoalResult, PaymentTiming, ProjectionInput,
    ProjectionResult, RateConvention, ScheduleYear,
};
