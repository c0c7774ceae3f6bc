mod engine;
mod schedules;
mod types;

pub use engine::{Rng, run_projection, run_projection_with_rng};
pub use schedules::{
    COST_TABLE_AGES, INCOME_GROWTH_AGGRESSIVE, INCOME_GROWTH_CONSERVATIVE, INCOME_GROWTH_STANDARD,
    LIVING_COST_COMFORTABLE, LIVING_COST_FRUGAL, LIVING_COST_STANDARD, boarding_cost_at_age,
    cost_at_age, education_cost_table, rearing_cost_table,
};
pub use types::{
    ChildPlan, EducationTrack, Inputs, MortgagePlan, ProjectionResult, RateScenario, RearingPlan,
    RetirementPlan, YearRecord,
};
