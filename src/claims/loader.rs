//! Load claim records from the cleaned claims CSV
//!
//! Columns match the upstream pipeline's export:
//! age,sex,bmi,children,smoker,region,charges,insuranceclaim
//! with sex/smoker/insuranceclaim as 0/1 flags and region as a 0..3 code.

use super::{ClaimDataset, ClaimRecord, Region, Sex};
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row matching the claims table columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    age: u8,
    sex: u8,
    bmi: f64,
    children: u8,
    smoker: u8,
    region: u8,
    charges: f64,
    insuranceclaim: u8,
}

impl CsvRow {
    fn to_record(self) -> Result<ClaimRecord, Box<dyn Error>> {
        let sex = match self.sex {
            0 => Sex::Female,
            1 => Sex::Male,
            other => return Err(format!("Unknown sex code: {}", other).into()),
        };

        let smoker = match self.smoker {
            0 => false,
            1 => true,
            other => return Err(format!("Unknown smoker code: {}", other).into()),
        };

        let region = Region::from_code(self.region)
            .ok_or_else(|| format!("Unknown region code: {}", self.region))?;

        let claimed = match self.insuranceclaim {
            0 => false,
            1 => true,
            other => return Err(format!("Unknown insuranceclaim code: {}", other).into()),
        };

        if self.charges < 0.0 {
            return Err(format!("Negative charges: {}", self.charges).into());
        }

        Ok(ClaimRecord {
            age: self.age,
            sex,
            bmi: self.bmi,
            children: self.children,
            smoker,
            region,
            charges: self.charges,
            claimed,
        })
    }
}

/// Load a versioned dataset snapshot from a CSV file
pub fn load_claims<P: AsRef<Path>>(path: P, version: u64) -> Result<ClaimDataset, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    read_rows(&mut reader, version)
}

/// Load a versioned dataset snapshot from any reader (e.g., string buffer)
pub fn load_claims_from_reader<R: std::io::Read>(
    reader: R,
    version: u64,
) -> Result<ClaimDataset, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    read_rows(&mut csv_reader, version)
}

fn read_rows<R: std::io::Read>(
    reader: &mut Reader<R>,
    version: u64,
) -> Result<ClaimDataset, Box<dyn Error>> {
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.to_record()?);
    }
    Ok(ClaimDataset::new(version, records))
}
