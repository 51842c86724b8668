mod error;
mod projection;
mod schedule;
mod solver;
mod tax;
mod types;

pub use error::ProjectionError;
pub use projection::{project, project_with};
pub use schedule::{
    DeductionBand, DeductionRule, IncomeTaxBracket, InsuranceComponent, SocialInsuranceTreatment,
    TaxSchedule,
};
pub use solver::{
    GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, solve_goal, solve_goal_with,
};
pub use tax::{SocialInsurance, TaxBreakdown, TaxEngine};
pub use types::{
    ExpenseBreakdown, Profile, ProjectionInput, ProjectionResult, ProjectionSummary,
    SavingsPolicy, YearlyRecord,
};
