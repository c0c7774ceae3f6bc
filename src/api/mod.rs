use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    ChildPlan, EducationTrack, INCOME_GROWTH_AGGRESSIVE, INCOME_GROWTH_CONSERVATIVE,
    INCOME_GROWTH_STANDARD, Inputs, LIVING_COST_COMFORTABLE, LIVING_COST_FRUGAL,
    LIVING_COST_STANDARD, MortgagePlan, ProjectionResult, RateScenario, RearingPlan,
    RetirementPlan, YearRecord, run_projection,
};

const MAX_PROJECTION_YEARS: u32 = 120;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRateScenario {
    Fixed,
    Stable,
    Rising,
    SharpRising,
}

impl From<CliRateScenario> for RateScenario {
    fn from(value: CliRateScenario) -> Self {
        match value {
            CliRateScenario::Fixed => RateScenario::Fixed,
            CliRateScenario::Stable => RateScenario::Stable,
            CliRateScenario::Rising => RateScenario::Rising,
            CliRateScenario::SharpRising => RateScenario::SharpRising,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliEducationTrack {
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

impl From<CliEducationTrack> for EducationTrack {
    fn from(value: CliEducationTrack) -> Self {
        match value {
            CliEducationTrack::PublicWithCram => EducationTrack::PublicWithCram,
            CliEducationTrack::PublicThenPrivateArts => EducationTrack::PublicThenPrivateArts,
            CliEducationTrack::PublicThenPrivateScience => EducationTrack::PublicThenPrivateScience,
            CliEducationTrack::PrivateHighArts => EducationTrack::PrivateHighArts,
            CliEducationTrack::PrivateHighScience => EducationTrack::PrivateHighScience,
            CliEducationTrack::PrivateSecondaryArts => EducationTrack::PrivateSecondaryArts,
            CliEducationTrack::PrivateSecondaryScience => EducationTrack::PrivateSecondaryScience,
            CliEducationTrack::PrivateElementaryArts => EducationTrack::PrivateElementaryArts,
            CliEducationTrack::PrivateElementaryScience => EducationTrack::PrivateElementaryScience,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRearingPlan {
    Standard,
    Comfortable,
}

impl From<CliRearingPlan> for RearingPlan {
    fn from(value: CliRearingPlan) -> Self {
        match value {
            CliRearingPlan::Standard => RearingPlan::Standard,
            CliRearingPlan::Comfortable => RearingPlan::Comfortable,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliIncomePreset {
    Conservative,
    Standard,
    Aggressive,
}

impl CliIncomePreset {
    fn growth_pct(self) -> f64 {
        match self {
            CliIncomePreset::Conservative => INCOME_GROWTH_CONSERVATIVE,
            CliIncomePreset::Standard => INCOME_GROWTH_STANDARD,
            CliIncomePreset::Aggressive => INCOME_GROWTH_AGGRESSIVE,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliLivingPreset {
    Frugal,
    Standard,
    Comfortable,
}

impl CliLivingPreset {
    fn annual_cost(self) -> f64 {
        match self {
            CliLivingPreset::Frugal => LIVING_COST_FRUGAL,
            CliLivingPreset::Standard => LIVING_COST_STANDARD,
            CliLivingPreset::Comfortable => LIVING_COST_COMFORTABLE,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRateScenario {
    Fixed,
    Stable,
    Rising,
    #[serde(alias = "sharpRising", alias = "sharp_rising")]
    SharpRising,
}

impl From<ApiRateScenario> for CliRateScenario {
    fn from(value: ApiRateScenario) -> Self {
        match value {
            ApiRateScenario::Fixed => CliRateScenario::Fixed,
            ApiRateScenario::Stable => CliRateScenario::Stable,
            ApiRateScenario::Rising => CliRateScenario::Rising,
            ApiRateScenario::SharpRising => CliRateScenario::SharpRising,
        }
    }
}

impl From<CliRateScenario> for ApiRateScenario {
    fn from(value: CliRateScenario) -> Self {
        match value {
            CliRateScenario::Fixed => ApiRateScenario::Fixed,
            CliRateScenario::Stable => ApiRateScenario::Stable,
            CliRateScenario::Rising => ApiRateScenario::Rising,
            CliRateScenario::SharpRising => ApiRateScenario::SharpRising,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiEducationTrack {
    #[serde(alias = "publicWithCram", alias = "public_with_cram")]
    PublicWithCram,
    #[serde(alias = "publicThenPrivateArts", alias = "public_then_private_arts")]
    PublicThenPrivateArts,
    #[serde(alias = "publicThenPrivateScience", alias = "public_then_private_science")]
    PublicThenPrivateScience,
    #[serde(alias = "privateHighArts", alias = "private_high_arts")]
    PrivateHighArts,
    #[serde(alias = "privateHighScience", alias = "private_high_science")]
    PrivateHighScience,
    #[serde(alias = "privateSecondaryArts", alias = "private_secondary_arts")]
    PrivateSecondaryArts,
    #[serde(alias = "privateSecondaryScience", alias = "private_secondary_science")]
    PrivateSecondaryScience,
    #[serde(alias = "privateElementaryArts", alias = "private_elementary_arts")]
    PrivateElementaryArts,
    #[serde(alias = "privateElementaryScience", alias = "private_elementary_science")]
    PrivateElementaryScience,
}

impl From<ApiEducationTrack> for CliEducationTrack {
    fn from(value: ApiEducationTrack) -> Self {
        match value {
            ApiEducationTrack::PublicWithCram => CliEducationTrack::PublicWithCram,
            ApiEducationTrack::PublicThenPrivateArts => CliEducationTrack::PublicThenPrivateArts,
            ApiEducationTrack::PublicThenPrivateScience => {
                CliEducationTrack::PublicThenPrivateScience
            }
            ApiEducationTrack::PrivateHighArts => CliEducationTrack::PrivateHighArts,
            ApiEducationTrack::PrivateHighScience => CliEducationTrack::PrivateHighScience,
            ApiEducationTrack::PrivateSecondaryArts => CliEducationTrack::PrivateSecondaryArts,
            ApiEducationTrack::PrivateSecondaryScience => {
                CliEducationTrack::PrivateSecondaryScience
            }
            ApiEducationTrack::PrivateElementaryArts => CliEducationTrack::PrivateElementaryArts,
            ApiEducationTrack::PrivateElementaryScience => {
                CliEducationTrack::PrivateElementaryScience
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRearingPlan {
    Standard,
    Comfortable,
}

impl From<ApiRearingPlan> for CliRearingPlan {
    fn from(value: ApiRearingPlan) -> Self {
        match value {
            ApiRearingPlan::Standard => CliRearingPlan::Standard,
            ApiRearingPlan::Comfortable => CliRearingPlan::Comfortable,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiIncomePreset {
    Conservative,
    Standard,
    Aggressive,
}

impl From<ApiIncomePreset> for CliIncomePreset {
    fn from(value: ApiIncomePreset) -> Self {
        match value {
            ApiIncomePreset::Conservative => CliIncomePreset::Conservative,
            ApiIncomePreset::Standard => CliIncomePreset::Standard,
            ApiIncomePreset::Aggressive => CliIncomePreset::Aggressive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiLivingPreset {
    Frugal,
    Standard,
    Comfortable,
}

impl From<ApiLivingPreset> for CliLivingPreset {
    fn from(value: ApiLivingPreset) -> Self {
        match value {
            ApiLivingPreset::Frugal => CliLivingPreset::Frugal,
            ApiLivingPreset::Standard => CliLivingPreset::Standard,
            ApiLivingPreset::Comfortable => CliLivingPreset::Comfortable,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    start_year: Option<i32>,
    years: Option<u32>,
    seed: Option<u64>,

    head_age: Option<u32>,
    head_income_base: Option<f64>,
    head_income_growth: Option<f64>,
    income_preset: Option<ApiIncomePreset>,
    partner_income: Option<f64>,

    retirement_age: Option<u32>,
    reemployment_income_pct: Option<f64>,
    full_retirement_age: Option<u32>,
    pension_start_age: Option<u32>,
    pension_annual: Option<f64>,

    child1_birth_year: Option<i32>,
    child1_education: Option<ApiEducationTrack>,
    child1_rearing: Option<ApiRearingPlan>,
    child1_boarding_cost: Option<f64>,
    child2_birth_year: Option<i32>,
    child2_education: Option<ApiEducationTrack>,
    child2_rearing: Option<ApiRearingPlan>,
    child2_boarding_cost: Option<f64>,

    living_cost_base: Option<f64>,
    living_preset: Option<ApiLivingPreset>,
    inflation_rate: Option<f64>,
    housing_fixed_cost: Option<f64>,

    mortgage_principal: Option<f64>,
    mortgage_start_year: Option<i32>,
    mortgage_end_year: Option<i32>,
    mortgage_base_rate: Option<f64>,
    mortgage_rate_reduction: Option<f64>,
    rate_scenario: Option<ApiRateScenario>,

    initial_cash: Option<f64>,
    initial_investment: Option<f64>,
    initial_retirement_account: Option<f64>,
    investment_yield: Option<f64>,
    retirement_yield: Option<f64>,
    retirement_monthly_contribution: Option<f64>,

    cash_floor: Option<f64>,
    invest_surplus: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "kakei",
    about = "Multi-year household finance projector (income, education costs, mortgage, assets)"
)]
struct Cli {
    #[arg(long, default_value_t = 2025, help = "First simulated calendar year")]
    start_year: i32,
    #[arg(
        long,
        help = "Years to simulate; defaults to 36 or a little past the last child's graduation"
    )]
    years: Option<u32>,
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 35, help = "Household head's current age")]
    head_age: u32,
    #[arg(long, default_value_t = 800.0, help = "Household head's current annual income")]
    head_income_base: f64,
    #[arg(long, help = "Annual raise in percent; defaults to the income preset")]
    head_income_growth: Option<f64>,
    #[arg(long, value_enum, help = "Wage-growth preset used when --head-income-growth is absent")]
    income_preset: Option<CliIncomePreset>,
    #[arg(long, default_value_t = 0.0, help = "Partner's annual income, held constant")]
    partner_income: f64,

    #[arg(long, help = "Enables the retirement phases when set")]
    retirement_age: Option<u32>,
    #[arg(
        long,
        default_value_t = 50.0,
        help = "Re-employment income as percent of the last pre-retirement wage"
    )]
    reemployment_income_pct: f64,
    #[arg(long, default_value_t = 65, help = "Age when labor income stops entirely")]
    full_retirement_age: u32,
    #[arg(long, default_value_t = 65)]
    pension_start_age: u32,
    #[arg(long, default_value_t = 0.0, help = "Flat annual pension amount")]
    pension_annual: f64,

    #[arg(long)]
    child1_birth_year: Option<i32>,
    #[arg(long, value_enum, default_value_t = CliEducationTrack::PublicThenPrivateScience)]
    child1_education: CliEducationTrack,
    #[arg(long, value_enum, default_value_t = CliRearingPlan::Standard)]
    child1_rearing: CliRearingPlan,
    #[arg(long, help = "Annual remittance while child 1 boards at university")]
    child1_boarding_cost: Option<f64>,
    #[arg(long)]
    child2_birth_year: Option<i32>,
    #[arg(long, value_enum, default_value_t = CliEducationTrack::PublicWithCram)]
    child2_education: CliEducationTrack,
    #[arg(long, value_enum, default_value_t = CliRearingPlan::Standard)]
    child2_rearing: CliRearingPlan,
    #[arg(long, help = "Annual remittance while child 2 boards at university")]
    child2_boarding_cost: Option<f64>,

    #[arg(long, help = "Annual living cost; defaults to the living preset")]
    living_cost_base: Option<f64>,
    #[arg(long, value_enum, help = "Living-cost preset used when --living-cost-base is absent")]
    living_preset: Option<CliLivingPreset>,
    #[arg(long, default_value_t = 2.0, help = "Annual inflation in percent")]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 19.2,
        help = "Property tax and upkeep, flat per year"
    )]
    housing_fixed_cost: f64,

    #[arg(
        long,
        default_value_t = 6460.0,
        help = "Mortgage principal; 0 disables the mortgage"
    )]
    mortgage_principal: f64,
    #[arg(long, default_value_t = 2024)]
    mortgage_start_year: i32,
    #[arg(long, default_value_t = 2059)]
    mortgage_end_year: i32,
    #[arg(long, default_value_t = 2.841, help = "Contract base rate in percent")]
    mortgage_base_rate: f64,
    #[arg(long, default_value_t = 2.057, help = "Negotiated rate reduction in percent")]
    mortgage_rate_reduction: f64,
    #[arg(long, value_enum, default_value_t = CliRateScenario::Fixed)]
    rate_scenario: CliRateScenario,

    #[arg(long, default_value_t = 380.0)]
    initial_cash: f64,
    #[arg(long, default_value_t = 1820.0)]
    initial_investment: f64,
    #[arg(long, default_value_t = 180.0)]
    initial_retirement_account: f64,
    #[arg(long, default_value_t = 3.0, help = "Taxable investment yield in percent")]
    investment_yield: f64,
    #[arg(long, default_value_t = 3.0, help = "Retirement-account yield in percent")]
    retirement_yield: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Monthly retirement-account contribution until age 60"
    )]
    retirement_monthly_contribution: f64,

    #[arg(
        long,
        default_value_t = 300.0,
        help = "Cash kept on hand before surplus is invested"
    )]
    cash_floor: f64,
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Sweep cash above the floor into investments"
    )]
    invest_surplus: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    start_year: i32,
    end_year: i32,
    rate_scenario: Option<ApiRateScenario>,
    cash_floor: f64,
    invest_surplus: bool,
    insolvency_year: Option<i32>,
    min_assets_year: i32,
    min_assets: f64,
    final_net_assets: f64,
    child_cost_total: f64,
    years: Vec<YearRecord>,
}

#[derive(Debug, Serialize)]
struct AdviceResponse {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<Inputs, String> {
    if !(1900..=2200).contains(&cli.start_year) {
        return Err("--start-year must be between 1900 and 2200".to_string());
    }

    if cli.head_age > 120 {
        return Err("--head-age must be <= 120".to_string());
    }

    if let Some(years) = cli.years {
        if years == 0 || years > MAX_PROJECTION_YEARS {
            return Err(format!(
                "--years must be between 1 and {MAX_PROJECTION_YEARS}"
            ));
        }
    }

    for (name, value) in [
        ("--head-income-base", cli.head_income_base),
        ("--partner-income", cli.partner_income),
        ("--pension-annual", cli.pension_annual),
        ("--housing-fixed-cost", cli.housing_fixed_cost),
        ("--initial-cash", cli.initial_cash),
        ("--initial-investment", cli.initial_investment),
        ("--initial-retirement-account", cli.initial_retirement_account),
        (
            "--retirement-monthly-contribution",
            cli.retirement_monthly_contribution,
        ),
        ("--cash-floor", cli.cash_floor),
        ("--mortgage-principal", cli.mortgage_principal),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if let Some(living) = cli.living_cost_base {
        if !living.is_finite() || living < 0.0 {
            return Err("--living-cost-base must be >= 0".to_string());
        }
    }

    if let Some(growth) = cli.head_income_growth {
        if !growth.is_finite() || growth <= -100.0 {
            return Err("--head-income-growth must be > -100".to_string());
        }
    }

    if !cli.inflation_rate.is_finite() || cli.inflation_rate <= -100.0 {
        return Err("--inflation-rate must be > -100".to_string());
    }

    for (name, rate) in [
        ("--investment-yield", cli.investment_yield),
        ("--retirement-yield", cli.retirement_yield),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    let retirement = match cli.retirement_age {
        Some(retirement_age) => {
            if retirement_age > cli.full_retirement_age {
                return Err("--retirement-age must be <= --full-retirement-age".to_string());
            }
            if !(0.0..=100.0).contains(&cli.reemployment_income_pct) {
                return Err("--reemployment-income-pct must be between 0 and 100".to_string());
            }
            Some(RetirementPlan {
                retirement_age,
                reemployment_income_pct: cli.reemployment_income_pct,
                full_retirement_age: cli.full_retirement_age,
                pension_start_age: cli.pension_start_age,
                pension_annual: cli.pension_annual,
            })
        }
        None => None,
    };

    let mut children = Vec::new();
    for (label, birth_year, education, rearing, boarding_cost) in [
        (
            "child 1",
            cli.child1_birth_year,
            cli.child1_education,
            cli.child1_rearing,
            cli.child1_boarding_cost,
        ),
        (
            "child 2",
            cli.child2_birth_year,
            cli.child2_education,
            cli.child2_rearing,
            cli.child2_boarding_cost,
        ),
    ] {
        let Some(birth_year) = birth_year else {
            continue;
        };
        if !(1900..=2200).contains(&birth_year) {
            return Err(format!("{label} birth year must be between 1900 and 2200"));
        }
        if let Some(cost) = boarding_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(format!("{label} boarding cost must be >= 0"));
            }
        }
        children.push(ChildPlan {
            birth_year,
            education: education.into(),
            rearing: rearing.into(),
            boarding_annual_cost: boarding_cost,
        });
    }

    let mortgage = if cli.mortgage_principal > 0.0 {
        for (name, year) in [
            ("--mortgage-start-year", cli.mortgage_start_year),
            ("--mortgage-end-year", cli.mortgage_end_year),
        ] {
            if !(1900..=2200).contains(&year) {
                return Err(format!("{name} must be between 1900 and 2200"));
            }
        }
        if cli.mortgage_end_year <= cli.mortgage_start_year {
            return Err("--mortgage-end-year must be > --mortgage-start-year".to_string());
        }
        for (name, rate) in [
            ("--mortgage-base-rate", cli.mortgage_base_rate),
            ("--mortgage-rate-reduction", cli.mortgage_rate_reduction),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(format!("{name} must be >= 0"));
            }
        }
        Some(MortgagePlan {
            principal: cli.mortgage_principal,
            start_year: cli.mortgage_start_year,
            end_year: cli.mortgage_end_year,
            base_rate: cli.mortgage_base_rate,
            rate_reduction: cli.mortgage_rate_reduction,
            scenario: cli.rate_scenario.into(),
        })
    } else {
        None
    };

    let head_income_growth = cli
        .head_income_growth
        .or(cli.income_preset.map(CliIncomePreset::growth_pct))
        .unwrap_or(INCOME_GROWTH_STANDARD);
    let living_cost_base = cli
        .living_cost_base
        .or(cli.living_preset.map(CliLivingPreset::annual_cost))
        .unwrap_or(LIVING_COST_STANDARD);

    let years = cli
        .years
        .unwrap_or_else(|| default_projection_years(cli.start_year, &children));

    Ok(Inputs {
        start_year: cli.start_year,
        years,
        head_age: cli.head_age,
        head_income_base: cli.head_income_base,
        head_income_growth,
        partner_income: cli.partner_income,
        retirement,
        children,
        living_cost_base,
        inflation_rate: cli.inflation_rate / 100.0,
        housing_fixed_cost: cli.housing_fixed_cost,
        mortgage,
        initial_cash: cli.initial_cash,
        initial_investment: cli.initial_investment,
        initial_retirement_account: cli.initial_retirement_account,
        investment_yield: cli.investment_yield / 100.0,
        retirement_yield: cli.retirement_yield / 100.0,
        retirement_monthly_contribution: cli.retirement_monthly_contribution,
        cash_floor: cli.cash_floor,
        invest_surplus: cli.invest_surplus,
        seed: cli.seed,
    })
}

/// 36 years, stretched so the run covers every child's graduation at 23.
fn default_projection_years(start_year: i32, children: &[ChildPlan]) -> u32 {
    let mut years = 36;
    for child in children {
        let through_graduation = child.birth_year + 23 - start_year + 1;
        years = years.max(through_graduation);
    }
    years.clamp(1, MAX_PROJECTION_YEARS as i32) as u32
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/advice-prompt", post(advice_prompt_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("kakei HTTP API listening on http://{addr}");
    info!("listening on {addr}");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            warn!("rejected projection request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let result = run_projection(&inputs);
    info!(
        "projected {} years from {}; insolvency: {:?}",
        inputs.years, inputs.start_year, result.insolvency_year
    );
    json_response(StatusCode::OK, build_project_response(&inputs, result))
}

async fn advice_prompt_handler(Json(payload): Json<ProjectPayload>) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            warn!("rejected advice request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let result = run_projection(&inputs);
    json_response(
        StatusCode::OK,
        AdviceResponse {
            prompt: build_advice_prompt(&inputs, &result),
        },
    )
}

fn build_project_response(inputs: &Inputs, result: ProjectionResult) -> ProjectResponse {
    ProjectResponse {
        start_year: inputs.start_year,
        end_year: inputs.start_year + inputs.years as i32 - 1,
        rate_scenario: inputs.mortgage.as_ref().map(|plan| match plan.scenario {
            RateScenario::Fixed => ApiRateScenario::Fixed,
            RateScenario::Stable => ApiRateScenario::Stable,
            RateScenario::Rising => ApiRateScenario::Rising,
            RateScenario::SharpRising => ApiRateScenario::SharpRising,
        }),
        cash_floor: inputs.cash_floor,
        invest_surplus: inputs.invest_surplus,
        insolvency_year: result.insolvency_year,
        min_assets_year: result.min_assets_year,
        min_assets: result.min_assets,
        final_net_assets: result.final_net_assets,
        child_cost_total: result.child_cost_total,
        years: result.years,
    }
}

/// One-shot request for the external text-generation service. Building the
/// prompt never touches the projection; issuing the call is the caller's job.
fn build_advice_prompt(inputs: &Inputs, result: &ProjectionResult) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a financial planner reviewing a household's long-term plan.\n\n");

    prompt.push_str("# Household\n");
    prompt.push_str(&format!(
        "- Head of household: age {}, annual income {:.0}, raises {:.1}%/yr\n",
        inputs.head_age, inputs.head_income_base, inputs.head_income_growth
    ));
    if inputs.partner_income > 0.0 {
        prompt.push_str(&format!("- Partner income: {:.0}/yr\n", inputs.partner_income));
    }
    if inputs.children.is_empty() {
        prompt.push_str("- Children: none\n");
    }
    for (index, child) in inputs.children.iter().enumerate() {
        prompt.push_str(&format!(
            "- Child {}: born {}, education track {:?}{}\n",
            index + 1,
            child.birth_year,
            child.education,
            if child.boarding_annual_cost.is_some() {
                ", boarding at university"
            } else {
                ""
            }
        ));
    }
    prompt.push_str(&format!(
        "- Starting assets: cash {:.0}, investments {:.0}, retirement account {:.0}\n",
        inputs.initial_cash, inputs.initial_investment, inputs.initial_retirement_account
    ));
    prompt.push_str(&format!(
        "- Policy: cash floor {:.0}, surplus {}\n",
        inputs.cash_floor,
        if inputs.invest_surplus {
            "swept into investments"
        } else {
            "held as cash"
        }
    ));

    let end_year = inputs.start_year + inputs.years as i32 - 1;
    prompt.push_str(&format!(
        "\n# Projection {}-{}\n",
        inputs.start_year, end_year
    ));
    prompt.push_str(&format!(
        "- Final net assets: {:.0}\n",
        result.final_net_assets
    ));
    if let Some(record) = result.years.last() {
        prompt.push_str(&format!(
            "- Retirement account at end: {:.0}\n",
            record.retirement_account
        ));
    }
    prompt.push_str(&format!(
        "- Lowest total assets: {:.0} in {}\n",
        result.min_assets, result.min_assets_year
    ));
    match result.insolvency_year {
        Some(year) => prompt.push_str(&format!("- Cash shortfall event: {year}\n")),
        None => prompt.push_str("- Cash shortfall event: none\n"),
    }
    prompt.push_str(&format!(
        "- Lifetime child-related costs: {:.0}\n",
        result.child_cost_total
    ));

    prompt.push_str("\nGive three blunt, specific recommendations to improve this plan.\n");
    prompt
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<Inputs, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: ProjectPayload) -> Result<Inputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.start_year {
        cli.start_year = v;
    }
    if let Some(v) = payload.years {
        cli.years = Some(v);
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }

    if let Some(v) = payload.head_age {
        cli.head_age = v;
    }
    if let Some(v) = payload.head_income_base {
        cli.head_income_base = v;
    }
    if let Some(v) = payload.head_income_growth {
        cli.head_income_growth = Some(v);
    }
    if let Some(v) = payload.income_preset {
        cli.income_preset = Some(v.into());
    }
    if let Some(v) = payload.partner_income {
        cli.partner_income = v;
    }

    if let Some(v) = payload.retirement_age {
        cli.retirement_age = Some(v);
    }
    if let Some(v) = payload.reemployment_income_pct {
        cli.reemployment_income_pct = v;
    }
    if let Some(v) = payload.full_retirement_age {
        cli.full_retirement_age = v;
    }
    if let Some(v) = payload.pension_start_age {
        cli.pension_start_age = v;
    }
    if let Some(v) = payload.pension_annual {
        cli.pension_annual = v;
    }

    if let Some(v) = payload.child1_birth_year {
        cli.child1_birth_year = Some(v);
    }
    if let Some(v) = payload.child1_education {
        cli.child1_education = v.into();
    }
    if let Some(v) = payload.child1_rearing {
        cli.child1_rearing = v.into();
    }
    if let Some(v) = payload.child1_boarding_cost {
        cli.child1_boarding_cost = Some(v);
    }
    if let Some(v) = payload.child2_birth_year {
        cli.child2_birth_year = Some(v);
    }
    if let Some(v) = payload.child2_education {
        cli.child2_education = v.into();
    }
    if let Some(v) = payload.child2_rearing {
        cli.child2_rearing = v.into();
    }
    if let Some(v) = payload.child2_boarding_cost {
        cli.child2_boarding_cost = Some(v);
    }

    if let Some(v) = payload.living_cost_base {
        cli.living_cost_base = Some(v);
    }
    if let Some(v) = payload.living_preset {
        cli.living_preset = Some(v.into());
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.housing_fixed_cost {
        cli.housing_fixed_cost = v;
    }

    if let Some(v) = payload.mortgage_principal {
        cli.mortgage_principal = v;
    }
    if let Some(v) = payload.mortgage_start_year {
        cli.mortgage_start_year = v;
    }
    if let Some(v) = payload.mortgage_end_year {
        cli.mortgage_end_year = v;
    }
    if let Some(v) = payload.mortgage_base_rate {
        cli.mortgage_base_rate = v;
    }
    if let Some(v) = payload.mortgage_rate_reduction {
        cli.mortgage_rate_reduction = v;
    }
    if let Some(v) = payload.rate_scenario {
        cli.rate_scenario = v.into();
    }

    if let Some(v) = payload.initial_cash {
        cli.initial_cash = v;
    }
    if let Some(v) = payload.initial_investment {
        cli.initial_investment = v;
    }
    if let Some(v) = payload.initial_retirement_account {
        cli.initial_retirement_account = v;
    }
    if let Some(v) = payload.investment_yield {
        cli.investment_yield = v;
    }
    if let Some(v) = payload.retirement_yield {
        cli.retirement_yield = v;
    }
    if let Some(v) = payload.retirement_monthly_contribution {
        cli.retirement_monthly_contribution = v;
    }

    if let Some(v) = payload.cash_floor {
        cli.cash_floor = v;
    }
    if let Some(v) = payload.invest_surplus {
        cli.invest_surplus = v;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        start_year: 2025,
        years: None,
        seed: 42,
        head_age: 35,
        head_income_base: 800.0,
        head_income_growth: None,
        income_preset: None,
        partner_income: 0.0,
        retirement_age: None,
        reemployment_income_pct: 50.0,
        full_retirement_age: 65,
        pension_start_age: 65,
        pension_annual: 0.0,
        child1_birth_year: None,
        child1_education: CliEducationTrack::PublicThenPrivateScience,
        child1_rearing: CliRearingPlan::Standard,
        child1_boarding_cost: None,
        child2_birth_year: None,
        child2_education: CliEducationTrack::PublicWithCram,
        child2_rearing: CliRearingPlan::Standard,
        child2_boarding_cost: None,
        living_cost_base: None,
        living_preset: None,
        inflation_rate: 2.0,
        housing_fixed_cost: 19.2,
        mortgage_principal: 6460.0,
        mortgage_start_year: 2024,
        mortgage_end_year: 2059,
        mortgage_base_rate: 2.841,
        mortgage_rate_reduction: 2.057,
        rate_scenario: CliRateScenario::Fixed,
        initial_cash: 380.0,
        initial_investment: 1820.0,
        initial_retirement_account: 180.0,
        investment_yield: 3.0,
        retirement_yield: 3.0,
        retirement_monthly_contribution: 3.0,
        cash_floor: 300.0,
        invest_surplus: true,
    }
}
