use super::regions::{RegionEntry, RegionTable};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RegionTableImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Record { postal_code: String, message: String },
}

impl std::fmt::Display for RegionTableImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionTableImportError::Io(err) => {
                write!(f, "failed to read region table: {}", err)
            }
            RegionTableImportError::Csv(err) => {
                write!(f, "invalid region table CSV data: {}", err)
            }
            RegionTableImportError::Record {
                postal_code,
                message,
            } => write!(f, "invalid region table row '{}': {}", postal_code, message),
        }
    }
}

impl std::error::Error for RegionTableImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegionTableImportError::Io(err) => Some(err),
            RegionTableImportError::Csv(err) => Some(err),
            RegionTableImportError::Record { .. } => None,
        }
    }
}

impl From<std::io::Error> for RegionTableImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RegionTableImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads a replacement region table from a CSV export, so refreshed
/// rent-index data can be deployed without a rebuild.
///
/// Expected columns: `postal_code,capped,valid_until,comparison_rent_per_sqm`.
pub struct RegionTableImporter;

impl RegionTableImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RegionTable, RegionTableImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RegionTable, RegionTableImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = HashMap::new();

        for record in csv_reader.deserialize::<RegionRow>() {
            let row = record?;
            let (postal_code, entry) = row.into_entry()?;
            entries.insert(postal_code, entry);
        }

        Ok(RegionTable::from_entries(entries))
    }
}

#[derive(Debug, Deserialize)]
struct RegionRow {
    postal_code: String,
    capped: bool,
    valid_until: String,
    comparison_rent_per_sqm: f64,
}

impl RegionRow {
    fn into_entry(self) -> Result<(String, RegionEntry), RegionTableImportError> {
        if self.postal_code.len() != 5 || !self.postal_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(RegionTableImportError::Record {
                postal_code: self.postal_code,
                message: "postal code must be exactly five digits".to_string(),
            });
        }

        if self.comparison_rent_per_sqm <= 0.0 {
            return Err(RegionTableImportError::Record {
                postal_code: self.postal_code,
                message: "comparison rent must be positive".to_string(),
            });
        }

        let cap_valid_until = NaiveDate::parse_from_str(self.valid_until.trim(), "%Y-%m-%d")
            .map_err(|err| RegionTableImportError::Record {
                postal_code: self.postal_code.clone(),
                message: format!("valid_until must be YYYY-MM-DD ({err})"),
            })?;

        let entry = RegionEntry {
            capped: self.capped,
            cap_valid_until,
            comparison_rent_per_sqm: self.comparison_rent_per_sqm,
        };

        Ok((self.postal_code, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "postal_code,capped,valid_until,comparison_rent_per_sqm\n";

    #[test]
    fn imports_well_formed_table() {
        let csv = format!(
            "{HEADER}04109,true,2026-12-31,9.40\n04105,false,2026-12-31,8.90\n"
        );

        let table = RegionTableImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(table.len(), 2);
        let leipzig = table.lookup("04109").expect("entry present");
        assert!(leipzig.capped);
        assert_eq!(leipzig.comparison_rent_per_sqm, 9.40);
        assert_eq!(
            leipzig.cap_valid_until,
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
        );
        assert!(!table.lookup("04105").expect("entry present").capped);
    }

    #[test]
    fn rejects_malformed_postal_codes() {
        let csv = format!("{HEADER}1011,true,2026-12-31,12.00\n");

        let error =
            RegionTableImporter::from_reader(Cursor::new(csv)).expect_err("short code rejected");
        match error {
            RegionTableImportError::Record { postal_code, .. } => {
                assert_eq!(postal_code, "1011");
            }
            other => panic!("expected record error, got {other:?}"),
        }

        let csv = format!("{HEADER}1O115,true,2026-12-31,12.00\n");
        assert!(RegionTableImporter::from_reader(Cursor::new(csv)).is_err());
    }

    #[test]
    fn rejects_non_positive_comparison_rent() {
        let csv = format!("{HEADER}10115,true,2026-12-31,0.00\n");

        let error = RegionTableImporter::from_reader(Cursor::new(csv))
            .expect_err("zero comparison rent rejected");
        assert!(matches!(error, RegionTableImportError::Record { .. }));
    }

    #[test]
    fn rejects_unparseable_dates() {
        let csv = format!("{HEADER}10115,true,31.12.2026,12.00\n");

        let error =
            RegionTableImporter::from_reader(Cursor::new(csv)).expect_err("bad date rejected");
        match error {
            RegionTableImportError::Record { message, .. } => {
                assert!(message.contains("YYYY-MM-DD"));
            }
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn surfaces_csv_and_io_errors() {
        let csv = format!("{HEADER}10115,not-a-bool,2026-12-31,12.00\n");
        let error = RegionTableImporter::from_reader(Cursor::new(csv)).expect_err("csv error");
        assert!(matches!(error, RegionTableImportError::Csv(_)));

        let error = RegionTableImporter::from_path("./does-not-exist.csv").expect_err("io error");
        assert!(matches!(error, RegionTableImportError::Io(_)));
    }

    #[test]
    fn later_rows_override_duplicate_postal_codes() {
        let csv = format!(
            "{HEADER}10115,true,2026-12-31,12.50\n10115,true,2026-12-31,13.00\n"
        );

        let table = RegionTableImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup("10115").expect("entry").comparison_rent_per_sqm,
            13.00
        );
    }
}
