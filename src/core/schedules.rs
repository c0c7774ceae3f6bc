use super::types::{EducationTrack, RearingPlan};

/// Cost tables cover ages 0 through 22; the final entry (post-graduation) is 0.
pub const COST_TABLE_AGES: usize = 23;

const BOARDING_START_AGE: i32 = 18;
const BOARDING_END_AGE: i32 = 21;

/// Annual living-cost presets, in units of 10,000 JPY.
pub const LIVING_COST_FRUGAL: f64 = 360.0;
pub const LIVING_COST_STANDARD: f64 = 456.0;
pub const LIVING_COST_COMFORTABLE: f64 = 576.0;

/// Wage-growth presets in percent per year.
pub const INCOME_GROWTH_CONSERVATIVE: f64 = 0.5;
pub const INCOME_GROWTH_STANDARD: f64 = 1.5;
pub const INCOME_GROWTH_AGGRESSIVE: f64 = 3.0;

const EDU_PUBLIC_WITH_CRAM: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 35.0, 35.0, 35.0, 40.0, 45.0, 50.0, 60.0, 60.0, 80.0,
    60.0, 70.0, 90.0, 90.0, 55.0, 55.0, 55.0, 0.0,
];

const EDU_PUBLIC_THEN_PRIVATE_ARTS: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 35.0, 35.0, 35.0, 40.0, 45.0, 50.0, 60.0, 60.0, 80.0,
    60.0, 70.0, 90.0, 135.0, 105.0, 105.0, 105.0, 0.0,
];

const EDU_PUBLIC_THEN_PRIVATE_SCIENCE: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 35.0, 35.0, 35.0, 40.0, 45.0, 50.0, 60.0, 60.0, 80.0,
    60.0, 70.0, 90.0, 170.0, 150.0, 150.0, 150.0, 0.0,
];

const EDU_PRIVATE_HIGH_ARTS: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 35.0, 35.0, 35.0, 40.0, 45.0, 50.0, 60.0, 60.0, 80.0,
    100.0, 100.0, 110.0, 135.0, 105.0, 105.0, 105.0, 0.0,
];

const EDU_PRIVATE_HIGH_SCIENCE: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 35.0, 35.0, 35.0, 40.0, 45.0, 50.0, 60.0, 60.0, 80.0,
    100.0, 100.0, 110.0, 170.0, 150.0, 150.0, 150.0, 0.0,
];

const EDU_PRIVATE_SECONDARY_ARTS: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 35.0, 35.0, 35.0, 80.0, 100.0, 140.0, 145.0, 145.0,
    150.0, 110.0, 110.0, 120.0, 135.0, 105.0, 105.0, 105.0, 0.0,
];

const EDU_PRIVATE_SECONDARY_SCIENCE: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 35.0, 35.0, 35.0, 80.0, 100.0, 140.0, 145.0, 145.0,
    150.0, 110.0, 110.0, 120.0, 170.0, 150.0, 150.0, 150.0, 0.0,
];

const EDU_PRIVATE_ELEMENTARY_ARTS: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 160.0, 160.0, 160.0, 160.0, 170.0, 180.0, 145.0, 145.0,
    150.0, 110.0, 110.0, 120.0, 135.0, 105.0, 105.0, 105.0, 0.0,
];

const EDU_PRIVATE_ELEMENTARY_SCIENCE: [f64; COST_TABLE_AGES] = [
    10.0, 10.0, 10.0, 25.0, 25.0, 25.0, 160.0, 160.0, 160.0, 160.0, 170.0, 180.0, 145.0, 145.0,
    150.0, 110.0, 110.0, 120.0, 170.0, 150.0, 150.0, 150.0, 0.0,
];

const REARING_STANDARD: [f64; COST_TABLE_AGES] = [
    80.0, 80.0, 80.0, 90.0, 90.0, 90.0, 100.0, 100.0, 100.0, 110.0, 110.0, 120.0, 130.0, 130.0,
    130.0, 140.0, 140.0, 140.0, 100.0, 100.0, 100.0, 100.0, 0.0,
];

const REARING_COMFORTABLE: [f64; COST_TABLE_AGES] = [
    100.0, 100.0, 100.0, 110.0, 110.0, 110.0, 120.0, 120.0, 120.0, 130.0, 130.0, 140.0, 150.0,
    150.0, 150.0, 160.0, 160.0, 160.0, 150.0, 150.0, 150.0, 150.0, 0.0,
];

pub fn education_cost_table(track: EducationTrack) -> &'static [f64; COST_TABLE_AGES] {
    match track {
        EducationTrack::PublicWithCram => &EDU_PUBLIC_WITH_CRAM,
        EducationTrack::PublicThenPrivateArts => &EDU_PUBLIC_THEN_PRIVATE_ARTS,
        EducationTrack::PublicThenPrivateScience => &EDU_PUBLIC_THEN_PRIVATE_SCIENCE,
        EducationTrack::PrivateHighArts => &EDU_PRIVATE_HIGH_ARTS,
        EducationTrack::PrivateHighScience => &EDU_PRIVATE_HIGH_SCIENCE,
        EducationTrack::PrivateSecondaryArts => &EDU_PRIVATE_SECONDARY_ARTS,
        EducationTrack::PrivateSecondaryScience => &EDU_PRIVATE_SECONDARY_SCIENCE,
        EducationTrack::PrivateElementaryArts => &EDU_PRIVATE_ELEMENTARY_ARTS,
        EducationTrack::PrivateElementaryScience => &EDU_PRIVATE_ELEMENTARY_SCIENCE,
    }
}

pub fn rearing_cost_table(plan: RearingPlan) -> &'static [f64; COST_TABLE_AGES] {
    match plan {
        RearingPlan::Standard => &REARING_STANDARD,
        RearingPlan::Comfortable => &REARING_COMFORTABLE,
    }
}

/// Ages outside the table (before birth or after graduation) cost nothing.
pub fn cost_at_age(table: &[f64; COST_TABLE_AGES], age: i32) -> f64 {
    if (0..COST_TABLE_AGES as i32).contains(&age) {
        table[age as usize]
    } else {
        0.0
    }
}

pub fn boarding_cost_at_age(age: i32, annual_cost: Option<f64>) -> f64 {
    match annual_cost {
        Some(cost) if (BOARDING_START_AGE..=BOARDING_END_AGE).contains(&age) => cost,
        _ => 0.0,
    }
}
