use crate::aggregate::{self, AggregateError};
use crate::category::AqiCategory;
use crate::types::{
    CityRankingRow, CityRecord, DistributionRow, HourRecord, HourTrendRow, SummaryStats,
    TimeGroupRow,
};
use crate::util::{format_aqi, format_pct};
use chrono::Local;

/// How many cities the ranking view shows before the selected city is
/// spliced in.
pub const DISPLAY_RANK_LIMIT: usize = 10;

/// Threshold for the "extreme pollution" metric on the distribution view.
pub const EXTREME_THRESHOLD: f64 = 200.0;

/// Marker shown next to the focus city in the ranking table.
const FOCUS_MARKER: &str = "*";

/// Rows for the city comparison table. With no explicit selection the focus
/// defaults to the worst-ranked city.
pub fn city_ranking_rows(
    cities: &[CityRecord],
    selected: Option<&str>,
) -> Result<Vec<CityRankingRow>, AggregateError> {
    let ranked = aggregate::ranked_display_set(cities, selected, DISPLAY_RANK_LIMIT)?;
    let focus = match selected {
        Some(name) => name.to_string(),
        None => aggregate::worst_city(cities)?.city.clone(),
    };

    let mut rows = Vec::with_capacity(ranked.len());
    for record in ranked {
        let category = AqiCategory::classify(record.avg_aqi)?;
        rows.push(CityRankingRow {
            rank: aggregate::rank_of(cities, &record.city)?,
            city: record.city.clone(),
            avg_aqi: format_aqi(record.avg_aqi, 2),
            category: category.label().to_string(),
            focus: if record.city == focus {
                FOCUS_MARKER.to_string()
            } else {
                String::new()
            },
        });
    }
    Ok(rows)
}

/// Hour rows in clock order for the trend view.
pub fn hour_trend_rows(hours: &[HourRecord]) -> Vec<HourTrendRow> {
    let mut sorted: Vec<&HourRecord> = hours.iter().collect();
    sorted.sort_by_key(|r| r.hour);
    sorted
        .into_iter()
        .map(|r| HourTrendRow {
            hour: format!("{:02}:00", r.hour),
            avg_aqi: format_aqi(r.avg_aqi, 2),
        })
        .collect()
}

/// One row per severity category, zero-filled, with each category's share of
/// the city count.
pub fn distribution_rows(cities: &[CityRecord]) -> Result<Vec<DistributionRow>, AggregateError> {
    let histogram = aggregate::distribution(cities)?;
    let total = cities.len();
    Ok(histogram
        .into_iter()
        .map(|(category, count)| DistributionRow {
            category: category.label().to_string(),
            count,
            share: if total == 0 {
                format_pct(0.0)
            } else {
                format_pct(count as f64 / total as f64)
            },
        })
        .collect())
}

/// Day and Night rows for the diurnal comparison view.
pub fn time_group_rows(hours: &[HourRecord]) -> Result<Vec<TimeGroupRow>, AggregateError> {
    let means = aggregate::group_by_time_of_day(hours)?;
    Ok(vec![
        TimeGroupRow {
            group: "Day (06:00-18:00)".to_string(),
            hours: means.day_hours,
            mean_aqi: format_aqi(means.day_mean, 2),
        },
        TimeGroupRow {
            group: "Night (19:00-05:00)".to_string(),
            hours: means.night_hours,
            mean_aqi: format_aqi(means.night_mean, 2),
        },
    ])
}

/// Headline numbers for the JSON export, stamped with the local wall-clock
/// time of generation.
pub fn build_summary(
    cities: &[CityRecord],
    hours: &[HourRecord],
) -> Result<SummaryStats, AggregateError> {
    let worst = aggregate::worst_city(cities)?;
    let best = aggregate::best_city(cities)?;
    let worst_hr = aggregate::worst_hour(hours)?;
    Ok(SummaryStats {
        total_cities: cities.len(),
        national_avg_aqi: aggregate::national_average(cities)?,
        worst_city: worst.city.clone(),
        worst_city_aqi: worst.avg_aqi,
        best_city: best.city.clone(),
        best_city_aqi: best.avg_aqi,
        worst_hour: worst_hr.hour,
        worst_hour_aqi: worst_hr.avg_aqi,
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}
