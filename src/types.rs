use serde::{Deserialize, Serialize};
use tabled::Tabled;

// Raw rows as they come off the tab-separated source files. Both files are
// headerless, so fields match by position; everything arrives as an optional
// string and goes through the parse helpers in `util`.
#[derive(Debug, Deserialize)]
pub struct RawCityRow {
    pub city: Option<String>,
    pub avg_aqi: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawHourRow {
    pub hour: Option<String>,
    pub avg_aqi: Option<String>,
}

/// Average AQI for a single city. `city` is the unique key; source row order
/// is preserved after loading and breaks ranking ties.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub city: String,
    pub avg_aqi: f64,
}

/// Average AQI for a single hour of day (0-23). 24 rows expected, not enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct HourRecord {
    pub hour: u8,
    pub avg_aqi: f64,
}

/// Both source tables, loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub cities: Vec<CityRecord>,
    pub hours: Vec<HourRecord>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CityRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "AvgAQI")]
    #[tabled(rename = "AvgAQI")]
    pub avg_aqi: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Focus")]
    #[tabled(rename = "Focus")]
    pub focus: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HourTrendRow {
    #[serde(rename = "Hour")]
    #[tabled(rename = "Hour")]
    pub hour: String,
    #[serde(rename = "AvgAQI")]
    #[tabled(rename = "AvgAQI")]
    pub avg_aqi: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistributionRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Cities")]
    #[tabled(rename = "Cities")]
    pub count: usize,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TimeGroupRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Hours")]
    #[tabled(rename = "Hours")]
    pub hours: usize,
    #[serde(rename = "MeanAQI")]
    #[tabled(rename = "MeanAQI")]
    pub mean_aqi: String,
}

/// Headline numbers exported to `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_cities: usize,
    pub national_avg_aqi: f64,
    pub worst_city: String,
    pub worst_city_aqi: f64,
    pub best_city: String,
    pub best_city_aqi: f64,
    pub worst_hour: u8,
    pub worst_hour_aqi: f64,
    pub generated_at: String,
}
