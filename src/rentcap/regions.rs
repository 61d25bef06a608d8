use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Comparison rent assumed for postal codes without a table entry, so a
/// maximum-rent figure can still be displayed outside capped regions.
pub const FALLBACK_COMPARISON_RENT_PER_SQM: f64 = 10.00;

/// Cap metadata for one postal code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub capped: bool,
    pub cap_valid_until: NaiveDate,
    pub comparison_rent_per_sqm: f64,
}

/// Read-only postal code lookup, built once at startup and never mutated.
///
/// Lookups are exact 5-character matches. A missing entry means "not a
/// capped region", not "unknown".
#[derive(Debug, Clone)]
pub struct RegionTable {
    entries: HashMap<String, RegionEntry>,
}

impl RegionTable {
    /// Built-in table covering the designated tight-housing-market areas,
    /// with per-district comparison rents from the published rent indexes.
    pub fn standard() -> Self {
        let cap_valid_until = standard_cap_expiry();
        let entries = CAPPED_AREAS
            .iter()
            .map(|&(postal_code, comparison_rent_per_sqm)| {
                (
                    postal_code.to_string(),
                    RegionEntry {
                        capped: true,
                        cap_valid_until,
                        comparison_rent_per_sqm,
                    },
                )
            })
            .collect();

        Self { entries }
    }

    pub(crate) fn from_entries(entries: HashMap<String, RegionEntry>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, postal_code: &str) -> Option<&RegionEntry> {
        self.entries.get(postal_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn standard_cap_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).expect("static cap expiry is a valid calendar date")
}

// Postal code -> comparison rent (EUR per square metre). The designation
// ordinances currently in force all expire 2025-12-31.
const CAPPED_AREAS: &[(&str, f64)] = &[
    // Berlin
    ("10115", 12.50),
    ("10117", 13.00),
    ("10119", 12.80),
    ("10178", 12.20),
    ("10179", 12.00),
    ("10243", 11.50),
    ("10245", 11.80),
    ("10247", 11.20),
    ("10249", 11.40),
    ("10317", 10.50),
    ("10318", 10.20),
    ("10319", 9.80),
    ("10365", 10.00),
    ("10367", 10.30),
    ("10369", 10.10),
    ("10405", 12.00),
    ("10407", 11.80),
    ("10409", 11.50),
    ("10435", 13.50),
    ("10437", 13.20),
    ("10439", 12.80),
    ("10551", 11.00),
    ("10553", 11.20),
    ("10555", 11.50),
    ("10557", 12.00),
    ("10559", 10.80),
    ("10585", 12.50),
    ("10587", 12.20),
    ("10589", 11.80),
    ("10623", 13.00),
    ("10625", 12.80),
    ("10627", 12.50),
    ("10629", 13.50),
    ("10707", 14.00),
    ("10709", 13.80),
    ("10711", 13.50),
    ("10713", 13.00),
    ("10715", 12.50),
    ("10717", 13.20),
    ("10719", 14.50),
    ("10777", 13.80),
    ("10779", 13.50),
    ("10781", 13.00),
    ("10783", 12.80),
    ("10785", 13.50),
    ("10787", 14.00),
    ("10789", 14.20),
    ("10823", 12.50),
    ("10825", 12.80),
    ("10827", 12.20),
    ("10829", 11.80),
    ("10961", 13.00),
    ("10963", 12.50),
    ("10965", 12.00),
    ("10967", 12.80),
    ("10969", 12.20),
    ("10997", 13.50),
    ("10999", 13.80),
    ("12043", 11.50),
    ("12045", 11.80),
    ("12047", 12.00),
    ("12049", 11.20),
    ("12051", 10.80),
    ("12053", 10.50),
    ("12055", 11.00),
    ("12057", 10.20),
    ("12059", 10.80),
    // Munich
    ("80331", 14.00),
    ("80333", 14.50),
    ("80335", 14.20),
    ("80336", 13.80),
    ("80337", 13.50),
    ("80469", 14.80),
    ("80538", 15.00),
    ("80539", 14.50),
    ("80634", 13.20),
    ("80636", 13.50),
    ("80637", 13.00),
    ("80638", 13.80),
    ("80639", 13.20),
    ("80686", 12.50),
    ("80687", 12.80),
    ("80689", 12.20),
    ("80796", 14.00),
    ("80797", 13.80),
    ("80798", 13.50),
    ("80799", 14.20),
    ("80801", 14.50),
    ("80802", 14.80),
    ("80803", 14.20),
    ("80804", 13.50),
    ("80805", 13.80),
    ("80807", 13.20),
    ("80809", 13.00),
    ("80933", 12.00),
    ("80935", 12.20),
    ("80937", 11.80),
    ("80939", 12.50),
    ("81241", 12.80),
    ("81243", 12.50),
    ("81245", 12.20),
    ("81247", 13.00),
    ("81249", 12.50),
    ("81369", 13.20),
    ("81371", 13.50),
    ("81373", 13.00),
    ("81375", 13.80),
    ("81377", 14.00),
    ("81379", 13.50),
    // Hamburg
    ("20095", 11.80),
    ("20097", 11.50),
    ("20099", 12.00),
    ("20144", 13.50),
    ("20146", 14.00),
    ("20148", 13.80),
    ("20149", 14.50),
    ("20249", 13.00),
    ("20251", 12.80),
    ("20253", 13.20),
    ("20255", 12.50),
    ("20257", 12.00),
    ("20259", 12.20),
    ("20354", 15.00),
    ("20355", 14.50),
    ("20357", 13.00),
    ("20359", 12.50),
    ("20457", 14.00),
    ("20459", 13.50),
    ("22041", 11.50),
    ("22043", 11.20),
    ("22045", 11.00),
    ("22047", 10.80),
    ("22049", 11.50),
    ("22081", 12.00),
    ("22083", 12.50),
    ("22085", 12.80),
    ("22087", 12.20),
    ("22089", 11.80),
    // Frankfurt am Main
    ("60311", 13.50),
    ("60313", 14.00),
    ("60314", 13.00),
    ("60316", 12.50),
    ("60318", 13.20),
    ("60320", 12.80),
    ("60322", 14.50),
    ("60323", 15.00),
    ("60325", 14.80),
    ("60326", 12.00),
    ("60327", 12.50),
    ("60329", 11.50),
    ("60385", 12.00),
    ("60386", 11.50),
    ("60388", 11.00),
    ("60389", 10.80),
    ("60431", 12.50),
    ("60433", 12.00),
    ("60435", 11.80),
    ("60437", 11.50),
    ("60438", 11.20),
    ("60439", 11.00),
    // Cologne
    ("50667", 12.50),
    ("50668", 12.00),
    ("50670", 11.80),
    ("50672", 13.00),
    ("50674", 13.50),
    ("50676", 13.20),
    ("50677", 12.80),
    ("50678", 12.50),
    ("50679", 11.50),
    ("50733", 11.80),
    ("50735", 11.50),
    ("50737", 11.00),
    ("50739", 10.80),
    ("50823", 12.00),
    ("50825", 11.80),
    ("50827", 11.50),
    ("50829", 11.20),
    // Duesseldorf
    ("40210", 12.00),
    ("40211", 12.50),
    ("40212", 13.00),
    ("40213", 14.00),
    ("40215", 11.50),
    ("40217", 12.00),
    ("40219", 11.80),
    ("40221", 11.50),
    ("40223", 12.50),
    ("40225", 11.00),
    ("40227", 10.80),
    ("40229", 10.50),
    ("40231", 10.20),
    ("40233", 10.00),
    ("40235", 11.00),
    ("40237", 11.50),
    ("40239", 12.00),
    // Stuttgart
    ("70173", 13.50),
    ("70174", 13.00),
    ("70176", 12.80),
    ("70178", 13.20),
    ("70180", 12.50),
    ("70182", 13.80),
    ("70184", 12.00),
    ("70186", 11.80),
    ("70188", 11.50),
    ("70190", 12.20),
    ("70191", 12.50),
    ("70192", 12.00),
    ("70193", 11.80),
    ("70195", 12.50),
    ("70197", 12.80),
    ("70199", 12.20),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_covers_known_districts() {
        let table = RegionTable::standard();

        let mitte = table.lookup("10115").expect("Berlin Mitte is listed");
        assert!(mitte.capped);
        assert_eq!(mitte.comparison_rent_per_sqm, 12.50);
        assert_eq!(
            mitte.cap_valid_until,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );

        let schwabing = table.lookup("80802").expect("Munich Schwabing is listed");
        assert_eq!(schwabing.comparison_rent_per_sqm, 14.80);
    }

    #[test]
    fn lookup_requires_exact_postal_code() {
        let table = RegionTable::standard();

        assert!(table.lookup("99999").is_none());
        assert!(table.lookup("1011").is_none());
        assert!(table.lookup("101150").is_none());
        assert!(table.lookup(" 10115").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn table_has_no_duplicate_postal_codes() {
        let table = RegionTable::standard();
        assert_eq!(table.len(), CAPPED_AREAS.len());
        assert!(!table.is_empty());
    }
}
