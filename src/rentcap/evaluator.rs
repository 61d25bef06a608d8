use chrono::{Datelike, NaiveDate};

use super::domain::{Exemption, ExemptionKind, Recommendation, RentCapInput, RentCapResult};
use super::regions::{RegionTable, FALLBACK_COMPARISON_RENT_PER_SQM};

/// Statutory markup over the local comparison rent (§ 556d BGB).
const ALLOWED_MARKUP: f64 = 1.10;

/// Limitation period for retroactive refund claims, in calendar months.
const MAX_REFUND_MONTHS: u32 = 30;

/// Runs one rent cap check against the supplied region table.
///
/// Returns `None` while the input is incomplete (no postal code, zero rent,
/// or zero living area). That is the expected blank-form state, not an
/// error, and callers render it as "nothing to show yet". The current date
/// is passed in explicitly so the refund window is reproducible.
pub fn evaluate(
    input: &RentCapInput,
    regions: &RegionTable,
    today: NaiveDate,
) -> Option<RentCapResult> {
    if input.postal_code.is_empty() || input.cold_rent == 0.0 || input.living_area == 0.0 {
        return None;
    }

    let region = regions.lookup(&input.postal_code);
    let in_capped_region = region.map(|entry| entry.capped).unwrap_or(false);
    let cap_valid_until = region.map(|entry| entry.cap_valid_until);

    let exemptions = collect_exemptions(input);
    let cap_applies = in_capped_region && exemptions.is_empty();

    let rent_per_sqm = input.cold_rent / input.living_area;
    let comparison_rent_per_sqm = region
        .map(|entry| entry.comparison_rent_per_sqm)
        .unwrap_or(FALLBACK_COMPARISON_RENT_PER_SQM);
    let max_legal_rent_per_sqm = comparison_rent_per_sqm * ALLOWED_MARKUP;
    let max_legal_rent = max_legal_rent_per_sqm * input.living_area;
    let overage = (input.cold_rent - max_legal_rent).max(0.0);
    let overage_percent = ((rent_per_sqm / comparison_rent_per_sqm - 1.0) * 100.0).max(0.0);
    let overcharged = cap_applies && overage > 0.0;
    let refund_months = refund_window_months(input.tenancy_start, today);
    let refund_total = if overcharged {
        overage * f64::from(refund_months)
    } else {
        0.0
    };

    let recommendation = recommend(in_capped_region, &exemptions, overcharged);

    Some(RentCapResult {
        postal_code: input.postal_code.clone(),
        city: input.city.clone(),
        in_capped_region,
        cap_valid_until,
        exemptions,
        cap_applies,
        rent_per_sqm: round_currency(rent_per_sqm),
        comparison_rent_per_sqm,
        max_legal_rent_per_sqm: round_currency(max_legal_rent_per_sqm),
        max_legal_rent: round_currency(max_legal_rent),
        overage: round_currency(overage),
        overage_percent: round_percent(overage_percent),
        overcharged,
        refund_months,
        refund_total: round_currency(refund_total),
        recommendation,
    })
}

// Checked independently, emitted in a fixed order. Any single exemption is
// enough to disable the cap.
fn collect_exemptions(input: &RentCapInput) -> Vec<Exemption> {
    let mut exemptions = Vec::new();

    if input.first_occupancy_after_2014 {
        exemptions.push(Exemption {
            kind: ExemptionKind::NewBuild,
            detail: "First occupied after 01.10.2014".to_string(),
        });
    }
    if input.comprehensively_modernised {
        exemptions.push(Exemption {
            kind: ExemptionKind::Modernisation,
            detail: "Comprehensively modernised".to_string(),
        });
    }
    if input.prior_rent_known && input.prior_rent > 0.0 {
        exemptions.push(Exemption {
            kind: ExemptionKind::PriorRent,
            detail: format!("Prior rent was {:.2} EUR", input.prior_rent),
        });
    }

    exemptions
}

// Priority order: region designation, then exemptions, then overcharge.
fn recommend(in_capped_region: bool, exemptions: &[Exemption], overcharged: bool) -> Recommendation {
    match (in_capped_region, exemptions.is_empty(), overcharged) {
        (false, _, _) => Recommendation::UncappedRegion,
        (true, false, _) => Recommendation::Exempt,
        (true, true, true) => Recommendation::Overcharged,
        (true, true, false) => Recommendation::Ok,
    }
}

// Calendar month difference, day-of-month ignored, clamped to [0, 30].
fn refund_window_months(tenancy_start: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(start) = tenancy_start else {
        return 0;
    };

    let elapsed =
        (today.year() - start.year()) * 12 + (today.month() as i32 - start.month() as i32);
    elapsed.clamp(0, MAX_REFUND_MONTHS as i32) as u32
}

fn round_currency(value: f64) -> f64 {
    round_to(value, 2)
}

fn round_percent(value: f64) -> f64 {
    round_to(value, 1)
}

// f64::round ties away from zero, matching the statutory rounding rule.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
