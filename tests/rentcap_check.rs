use chrono::NaiveDate;
use mietcheck::rentcap::domain::{ExemptionKind, Recommendation, RentCapInput};
use mietcheck::rentcap::{evaluate, RegionTable, RegionTableImporter};
use std::io::Cursor;

fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid evaluation date")
}

fn berlin_tenancy() -> RentCapInput {
    RentCapInput {
        postal_code: "10115".to_string(),
        city: "Berlin".to_string(),
        cold_rent: 1200.0,
        living_area: 80.0,
        tenancy_start: NaiveDate::from_ymd_opt(2024, 6, 15),
        ..RentCapInput::default()
    }
}

#[test]
fn overcharged_tenancy_yields_full_refund_trail() {
    let regions = RegionTable::standard();

    let result =
        evaluate(&berlin_tenancy(), &regions, evaluation_date()).expect("result produced");

    assert!(result.in_capped_region);
    assert!(result.cap_applies);
    assert_eq!(result.rent_per_sqm, 15.00);
    assert_eq!(result.max_legal_rent_per_sqm, 13.75);
    assert_eq!(result.max_legal_rent, 1100.00);
    assert_eq!(result.overage, 100.00);
    assert_eq!(result.overage_percent, 20.0);
    assert_eq!(result.refund_months, 12);
    assert_eq!(result.refund_total, 1200.00);
    assert_eq!(result.recommendation, Recommendation::Overcharged);
}

#[test]
fn new_build_exemption_overrides_overcharge() {
    let regions = RegionTable::standard();
    let mut input = berlin_tenancy();
    input.first_occupancy_after_2014 = true;

    let result = evaluate(&input, &regions, evaluation_date()).expect("result produced");

    assert_eq!(result.exemptions.len(), 1);
    assert_eq!(result.exemptions[0].kind, ExemptionKind::NewBuild);
    assert!(!result.cap_applies);
    assert!(!result.overcharged);
    assert_eq!(result.recommendation, Recommendation::Exempt);
}

#[test]
fn unknown_postal_code_is_treated_as_uncapped() {
    let regions = RegionTable::standard();
    let input = RentCapInput {
        postal_code: "99999".to_string(),
        cold_rent: 800.0,
        living_area: 80.0,
        ..RentCapInput::default()
    };

    let result = evaluate(&input, &regions, evaluation_date()).expect("result produced");

    assert!(!result.in_capped_region);
    assert_eq!(result.comparison_rent_per_sqm, 10.00);
    assert_eq!(result.recommendation, Recommendation::UncappedRegion);
}

#[test]
fn rent_within_allowance_is_ok() {
    let regions = RegionTable::standard();
    let input = RentCapInput {
        postal_code: "10115".to_string(),
        city: "Berlin".to_string(),
        cold_rent: 1000.0,
        living_area: 80.0,
        ..RentCapInput::default()
    };

    let result = evaluate(&input, &regions, evaluation_date()).expect("result produced");

    assert_eq!(result.rent_per_sqm, result.comparison_rent_per_sqm);
    assert_eq!(result.overage, 0.0);
    assert_eq!(result.recommendation, Recommendation::Ok);
}

#[test]
fn imported_table_drives_the_evaluation() {
    let csv = "postal_code,capped,valid_until,comparison_rent_per_sqm\n\
10115,true,2027-12-31,16.00\n";
    let regions = RegionTableImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

    let result =
        evaluate(&berlin_tenancy(), &regions, evaluation_date()).expect("result produced");

    assert_eq!(result.comparison_rent_per_sqm, 16.00);
    assert_eq!(result.max_legal_rent_per_sqm, 17.60);
    assert_eq!(
        result.cap_valid_until,
        NaiveDate::from_ymd_opt(2027, 12, 31)
    );
    assert_eq!(result.overage, 0.0);
    assert_eq!(result.recommendation, Recommendation::Ok);
}
