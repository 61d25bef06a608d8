use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tenancy details supplied by the caller for a single check.
///
/// `city` and `construction_year` are echoed into the result but carry no
/// weight in the arithmetic. Numeric fields are assumed sanitized by the
/// input layer; the evaluator does not reject negative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentCapInput {
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    pub cold_rent: f64,
    pub living_area: f64,
    #[serde(default = "default_construction_year")]
    pub construction_year: i32,
    #[serde(default)]
    pub first_occupancy_after_2014: bool,
    #[serde(default)]
    pub comprehensively_modernised: bool,
    #[serde(default)]
    pub prior_rent_known: bool,
    #[serde(default)]
    pub prior_rent: f64,
    #[serde(default)]
    pub tenancy_start: Option<NaiveDate>,
}

fn default_construction_year() -> i32 {
    2000
}

impl Default for RentCapInput {
    fn default() -> Self {
        Self {
            postal_code: String::new(),
            city: String::new(),
            cold_rent: 0.0,
            living_area: 0.0,
            construction_year: default_construction_year(),
            first_occupancy_after_2014: false,
            comprehensively_modernised: false,
            prior_rent_known: false,
            prior_rent: 0.0,
            tenancy_start: None,
        }
    }
}

/// Statutory conditions that disable the rent cap for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionKind {
    NewBuild,
    Modernisation,
    PriorRent,
}

impl ExemptionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NewBuild => "New build",
            Self::Modernisation => "Comprehensive modernisation",
            Self::PriorRent => "Prior rent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemption {
    pub kind: ExemptionKind,
    pub detail: String,
}

/// Categorical outcome of a check, in decision-table priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    UncappedRegion,
    Exempt,
    Overcharged,
    Ok,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UncappedRegion => "No rent cap applies in this area",
            Self::Exempt => "An exemption disables the rent cap",
            Self::Overcharged => "Rent exceeds the legal maximum",
            Self::Ok => "Rent is within the legal maximum",
        }
    }
}

/// Outcome of one evaluation. Currency figures are rounded to 2 decimal
/// places, percentages to 1, at the point the result is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentCapResult {
    pub postal_code: String,
    pub city: String,
    pub in_capped_region: bool,
    pub cap_valid_until: Option<NaiveDate>,
    pub exemptions: Vec<Exemption>,
    pub cap_applies: bool,
    pub rent_per_sqm: f64,
    pub comparison_rent_per_sqm: f64,
    pub max_legal_rent_per_sqm: f64,
    pub max_legal_rent: f64,
    pub overage: f64,
    pub overage_percent: f64,
    pub overcharged: bool,
    pub refund_months: u32,
    pub refund_total: f64,
    pub recommendation: Recommendation,
}
