use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RateScenario {
    Fixed,
    Stable,
    Rising,
    SharpRising,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EducationTrack {
    PublicWithCram,
    PublicThenPrivateArts,
    PublicThenPrivateScience,
    PrivateHighArts,
    PrivateHighScience,
    PrivateSecondaryArts,
    PrivateSecondaryScience,
    PrivateElementaryArts,
    PrivateElementaryScience,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RearingPlan {
    Standard,
    Comfortable,
}

#[derive(Debug, Clone, Copy)]
pub struct ChildPlan {
    pub birth_year: i32,
    pub education: EducationTrack,
    pub rearing: RearingPlan,
    /// Annual remittance while the child is away at university (ages 18-21).
    pub boarding_annual_cost: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct RetirementPlan {
    pub retirement_age: u32,
    /// Re-employment income as a percentage of the last pre-retirement wage.
    pub reemployment_income_pct: f64,
    pub full_retirement_age: u32,
    pub pension_start_age: u32,
    pub pension_annual: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MortgagePlan {
    pub principal: f64,
    pub start_year: i32,
    pub end_year: i32,
    /// Contract base rate in percent per year.
    pub base_rate: f64,
    /// Negotiated reduction in percent; applied rate = max(0, base - reduction).
    pub rate_reduction: f64,
    pub scenario: RateScenario,
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub start_year: i32,
    pub years: u32,
    pub head_age: u32,
    pub head_income_base: f64,
    /// Annual raise in percent.
    pub head_income_growth: f64,
    pub partner_income: f64,
    pub retirement: Option<RetirementPlan>,
    pub children: Vec<ChildPlan>,
    pub living_cost_base: f64,
    /// Fraction per year, e.g. 0.02.
    pub inflation_rate: f64,
    pub housing_fixed_cost: f64,
    pub mortgage: Option<MortgagePlan>,
    pub initial_cash: f64,
    pub initial_investment: f64,
    pub initial_retirement_account: f64,
    /// Fraction per year, e.g. 0.03.
    pub investment_yield: f64,
    /// Fraction per year.
    pub retirement_yield: f64,
    pub retirement_monthly_contribution: f64,
    /// Cash balance the rebalancing policy maintains before investing surplus.
    pub cash_floor: f64,
    pub invest_surplus: bool,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: i32,
    pub years_elapsed: u32,
    pub head_age: u32,
    pub child_ages: Vec<Option<u32>>,
    pub income: f64,
    pub education_cost: f64,
    pub rearing_cost: f64,
    pub boarding_cost: f64,
    pub living_cost: f64,
    pub expenses: f64,
    pub mortgage_payment: f64,
    pub mortgage_balance: f64,
    pub cash_flow: f64,
    pub cash: f64,
    pub investment: f64,
    pub retirement_account: f64,
    pub total_assets: f64,
    pub net_assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years: Vec<YearRecord>,
    pub insolvency_year: Option<i32>,
    pub min_assets_year: i32,
    pub min_assets: f64,
    pub final_net_assets: f64,
    pub child_cost_total: f64,
}
