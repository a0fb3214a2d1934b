use crate::types::{CityRecord, Dataset, HourRecord, RawCityRow, RawHourRow};
use crate::util::{parse_f64_field, parse_hour_field};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::error::Error;

/// Diagnostics from one load pass over both tables. Skipped rows are never
/// dropped silently; the caller prints these counts after loading.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub city_rows: usize,
    pub cities_loaded: usize,
    pub hour_rows: usize,
    pub hours_loaded: usize,
    pub skipped_rows: usize,
    pub duplicate_cities: usize,
}

/// Read both tab-separated tables into an immutable [`Dataset`].
///
/// This is the whole data-access layer: load once, return the value. There
/// is no process-wide cache and no partially-loaded state; an I/O failure on
/// either file fails the whole call.
pub fn load_dataset(
    city_path: &str,
    hour_path: &str,
) -> Result<(Dataset, LoadReport), Box<dyn Error>> {
    let mut report = LoadReport::default();
    let cities = load_city_table(city_path, &mut report)?;
    let hours = load_hour_table(hour_path, &mut report)?;
    Ok((Dataset { cities, hours }, report))
}

fn tsv_reader(path: &str) -> Result<csv::Reader<std::fs::File>, csv::Error> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
}

fn load_city_table(
    path: &str,
    report: &mut LoadReport,
) -> Result<Vec<CityRecord>, Box<dyn Error>> {
    let mut rdr = tsv_reader(path)?;
    let mut seen: HashSet<String> = HashSet::new();
    let mut records: Vec<CityRecord> = Vec::new();

    for result in rdr.deserialize::<RawCityRow>() {
        report.city_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };

        let city = row.city.as_deref().unwrap_or("").trim();
        if city.is_empty() {
            report.skipped_rows += 1;
            continue;
        }
        // Negative averages violate the table's contract; skip and count
        // rather than letting them reach the categorizer.
        let avg_aqi = match parse_f64_field(row.avg_aqi.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                report.skipped_rows += 1;
                continue;
            }
        };
        // City names are the unique key; the first occurrence wins.
        if !seen.insert(city.to_string()) {
            report.duplicate_cities += 1;
            continue;
        }

        records.push(CityRecord {
            city: city.to_string(),
            avg_aqi,
        });
    }

    report.cities_loaded = records.len();
    Ok(records)
}

fn load_hour_table(
    path: &str,
    report: &mut LoadReport,
) -> Result<Vec<HourRecord>, Box<dyn Error>> {
    let mut rdr = tsv_reader(path)?;
    let mut records: Vec<HourRecord> = Vec::new();

    for result in rdr.deserialize::<RawHourRow>() {
        report.hour_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };

        let hour = match parse_hour_field(row.hour.as_deref()) {
            Some(h) => h,
            None => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let avg_aqi = match parse_f64_field(row.avg_aqi.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                report.skipped_rows += 1;
                continue;
            }
        };

        records.push(HourRecord { hour, avg_aqi });
    }

    report.hours_loaded = records.len();
    Ok(records)
}
