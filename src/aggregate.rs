use crate::category::AqiCategory;
use crate::types::{CityRecord, HourRecord};
use crate::util::mean;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Failures surfaced by the aggregation core. None of these are transient:
/// every operation is a pure function of its input, so callers never retry,
/// they pick a fallback or refuse to render the view.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregateError {
    #[error("operation requires a non-empty record set")]
    EmptyInput,

    #[error("no city named {city:?} in the loaded table")]
    NotFound { city: String },

    #[error("the {group} group contains no hours, its mean is undefined")]
    EmptyGroup { group: TimeGroup },

    #[error("AQI value {value} is negative or not finite")]
    InvalidAqi { value: f64 },

    #[error("hour {hour} is outside 0-23")]
    InvalidHour { hour: u8 },
}

/// Binary partition of the 24 clock hours used for the diurnal comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeGroup {
    Day,
    Night,
}

impl TimeGroup {
    /// Day covers 06:00 through 18:00 inclusive; every other hour is Night.
    pub fn of_hour(hour: u8) -> Result<TimeGroup, AggregateError> {
        if hour > 23 {
            return Err(AggregateError::InvalidHour { hour });
        }
        Ok(if (6..=18).contains(&hour) {
            TimeGroup::Day
        } else {
            TimeGroup::Night
        })
    }
}

impl fmt::Display for TimeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeGroup::Day => "Day",
            TimeGroup::Night => "Night",
        })
    }
}

/// Per-group means produced by [`group_by_time_of_day`].
#[derive(Debug, Clone, PartialEq)]
pub struct DayNightMeans {
    pub day_mean: f64,
    pub day_hours: usize,
    pub night_mean: f64,
    pub night_hours: usize,
}

fn check_aqi(value: f64) -> Result<(), AggregateError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AggregateError::InvalidAqi { value });
    }
    Ok(())
}

// Stable descending order: equal values keep their source-row order.
fn sorted_desc(cities: &[CityRecord]) -> Vec<&CityRecord> {
    let mut ranked: Vec<&CityRecord> = cities.iter().collect();
    ranked.sort_by(|a, b| b.avg_aqi.partial_cmp(&a.avg_aqi).unwrap_or(Ordering::Equal));
    ranked
}

/// The `n` cities with the highest average AQI, worst first.
pub fn top_n(cities: &[CityRecord], n: usize) -> Result<Vec<&CityRecord>, AggregateError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if cities.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    let mut ranked = sorted_desc(cities);
    ranked.truncate(n);
    Ok(ranked)
}

/// Exact-match lookup by city name, case-sensitive.
pub fn focus_city<'a>(
    cities: &'a [CityRecord],
    name: &str,
) -> Result<&'a CityRecord, AggregateError> {
    cities
        .iter()
        .find(|r| r.city == name)
        .ok_or_else(|| AggregateError::NotFound {
            city: name.to_string(),
        })
}

/// The ranking table shown in the city view: the top `n` cities, plus the
/// selected city spliced in at its sorted position when it falls outside
/// that slice. `selected = None` means no specific focus.
pub fn ranked_display_set<'a>(
    cities: &'a [CityRecord],
    selected: Option<&str>,
    n: usize,
) -> Result<Vec<&'a CityRecord>, AggregateError> {
    let mut ranked = top_n(cities, n)?;
    if let Some(name) = selected {
        let record = focus_city(cities, name)?;
        if !ranked.iter().any(|r| r.city == record.city) {
            let pos = ranked
                .iter()
                .position(|r| r.avg_aqi < record.avg_aqi)
                .unwrap_or(ranked.len());
            ranked.insert(pos, record);
        }
    }
    Ok(ranked)
}

/// 1-based position of `name` in the full descending ordering.
pub fn rank_of(cities: &[CityRecord], name: &str) -> Result<usize, AggregateError> {
    sorted_desc(cities)
        .iter()
        .position(|r| r.city == name)
        .map(|i| i + 1)
        .ok_or_else(|| AggregateError::NotFound {
            city: name.to_string(),
        })
}

/// City with the highest average AQI; the first occurrence wins ties.
pub fn worst_city(cities: &[CityRecord]) -> Result<&CityRecord, AggregateError> {
    cities
        .iter()
        .reduce(|acc, r| if r.avg_aqi > acc.avg_aqi { r } else { acc })
        .ok_or(AggregateError::EmptyInput)
}

/// City with the lowest average AQI; the first occurrence wins ties.
pub fn best_city(cities: &[CityRecord]) -> Result<&CityRecord, AggregateError> {
    cities
        .iter()
        .reduce(|acc, r| if r.avg_aqi < acc.avg_aqi { r } else { acc })
        .ok_or(AggregateError::EmptyInput)
}

/// Arithmetic mean of all city averages.
pub fn national_average(cities: &[CityRecord]) -> Result<f64, AggregateError> {
    if cities.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    let mut values = Vec::with_capacity(cities.len());
    for r in cities {
        check_aqi(r.avg_aqi)?;
        values.push(r.avg_aqi);
    }
    Ok(mean(&values))
}

/// Hour record with the highest average AQI; the first occurrence wins ties.
pub fn worst_hour(hours: &[HourRecord]) -> Result<&HourRecord, AggregateError> {
    hours
        .iter()
        .reduce(|acc, r| if r.avg_aqi > acc.avg_aqi { r } else { acc })
        .ok_or(AggregateError::EmptyInput)
}

/// Count of cities per severity category, in severity order. Every category
/// is present in the result, zero-filled when no city falls in it.
pub fn distribution(
    cities: &[CityRecord],
) -> Result<Vec<(AqiCategory, usize)>, AggregateError> {
    let mut counts = [0usize; 6];
    for r in cities {
        let category = AqiCategory::classify(r.avg_aqi)?;
        counts[category as usize] += 1;
    }
    Ok(AqiCategory::ALL
        .iter()
        .map(|&category| (category, counts[category as usize]))
        .collect())
}

/// Count and fraction of cities strictly above `threshold`.
pub fn extreme_count(
    cities: &[CityRecord],
    threshold: f64,
) -> Result<(usize, f64), AggregateError> {
    if cities.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    let mut count = 0usize;
    for r in cities {
        check_aqi(r.avg_aqi)?;
        if r.avg_aqi > threshold {
            count += 1;
        }
    }
    Ok((count, count as f64 / cities.len() as f64))
}

/// Partition the hour records into Day and Night and average each group.
/// An empty group is an error, never a silent NaN.
pub fn group_by_time_of_day(hours: &[HourRecord]) -> Result<DayNightMeans, AggregateError> {
    let mut day = Vec::new();
    let mut night = Vec::new();
    for r in hours {
        check_aqi(r.avg_aqi)?;
        match TimeGroup::of_hour(r.hour)? {
            TimeGroup::Day => day.push(r.avg_aqi),
            TimeGroup::Night => night.push(r.avg_aqi),
        }
    }
    if day.is_empty() {
        return Err(AggregateError::EmptyGroup {
            group: TimeGroup::Day,
        });
    }
    if night.is_empty() {
        return Err(AggregateError::EmptyGroup {
            group: TimeGroup::Night,
        });
    }
    Ok(DayNightMeans {
        day_mean: mean(&day),
        day_hours: day.len(),
        night_mean: mean(&night),
        night_hours: night.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities(rows: &[(&str, f64)]) -> Vec<CityRecord> {
        rows.iter()
            .map(|(city, avg_aqi)| CityRecord {
                city: (*city).to_string(),
                avg_aqi: *avg_aqi,
            })
            .collect()
    }

    fn hours(rows: &[(u8, f64)]) -> Vec<HourRecord> {
        rows.iter()
            .map(|(hour, avg_aqi)| HourRecord {
                hour: *hour,
                avg_aqi: *avg_aqi,
            })
            .collect()
    }

    #[test]
    fn top_n_sorts_descending_and_truncates() {
        let data = cities(&[("A", 60.0), ("B", 310.0), ("C", 45.0), ("D", 120.0)]);
        let top = top_n(&data, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].city, "B");
        assert_eq!(top[1].city, "D");

        let all = top_n(&data, 10).unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].avg_aqi >= w[1].avg_aqi));
    }

    #[test]
    fn top_n_ties_keep_source_order() {
        let data = cities(&[("First", 100.0), ("Second", 100.0), ("Third", 100.0)]);
        let top = top_n(&data, 3).unwrap();
        let names: Vec<&str> = top.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn top_n_edge_inputs() {
        let data = cities(&[("A", 60.0)]);
        assert!(top_n(&data, 0).unwrap().is_empty());
        assert_eq!(top_n(&[], 3), Err(AggregateError::EmptyInput));
        assert!(top_n(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn rank_agrees_with_top_n() {
        let data = cities(&[("A", 60.0), ("B", 310.0), ("C", 45.0), ("D", 120.0)]);
        let top = top_n(&data, 2).unwrap();
        for r in &data {
            let rank = rank_of(&data, &r.city).unwrap();
            let in_top = top.iter().any(|t| t.city == r.city);
            assert_eq!(rank <= 2, in_top, "city {}", r.city);
        }
        assert_eq!(rank_of(&data, "B").unwrap(), 1);
        assert_eq!(rank_of(&data, "C").unwrap(), 4);
        assert!(matches!(
            rank_of(&data, "Nowhere"),
            Err(AggregateError::NotFound { .. })
        ));
    }

    #[test]
    fn focus_city_is_exact_and_case_sensitive() {
        let data = cities(&[("Jakarta", 155.0)]);
        assert_eq!(focus_city(&data, "Jakarta").unwrap().avg_aqi, 155.0);
        assert!(focus_city(&data, "jakarta").is_err());
    }

    #[test]
    fn ranked_display_set_splices_in_outside_selection() {
        let data = cities(&[
            ("A", 90.0),
            ("B", 80.0),
            ("C", 70.0),
            ("D", 60.0),
            ("E", 50.0),
        ]);
        // Selected city already in the slice: no extra row.
        let set = ranked_display_set(&data, Some("B"), 3).unwrap();
        assert_eq!(set.len(), 3);

        // Selected city below the cut: appears at its sorted position.
        let set = ranked_display_set(&data, Some("E"), 3).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set[3].city, "E");
        assert!(set.windows(2).all(|w| w[0].avg_aqi >= w[1].avg_aqi));

        // No focus: plain top-n.
        let set = ranked_display_set(&data, None, 3).unwrap();
        assert_eq!(set.len(), 3);

        assert!(matches!(
            ranked_display_set(&data, Some("Z"), 3),
            Err(AggregateError::NotFound { .. })
        ));
    }

    #[test]
    fn worst_and_best_city_with_tie_handling() {
        let data = cities(&[("A", 60.0), ("B", 310.0), ("C", 45.0)]);
        assert_eq!(worst_city(&data).unwrap().city, "B");
        assert_eq!(best_city(&data).unwrap().city, "C");

        let tied = cities(&[("X", 200.0), ("Y", 200.0)]);
        assert_eq!(worst_city(&tied).unwrap().city, "X");
        assert_eq!(best_city(&tied).unwrap().city, "X");

        assert_eq!(worst_city(&[]), Err(AggregateError::EmptyInput));
        assert_eq!(best_city(&[]), Err(AggregateError::EmptyInput));
    }

    #[test]
    fn national_average_matches_hand_computation() {
        let data = cities(&[("A", 60.0), ("B", 310.0), ("C", 45.0)]);
        let avg = national_average(&data).unwrap();
        assert!((avg - 138.333_333).abs() < 1e-3);
        assert_eq!(national_average(&[]), Err(AggregateError::EmptyInput));
    }

    #[test]
    fn national_average_rejects_negative_records() {
        let data = cities(&[("A", 60.0), ("B", -3.0)]);
        assert!(matches!(
            national_average(&data),
            Err(AggregateError::InvalidAqi { .. })
        ));
    }

    #[test]
    fn worst_hour_picks_max_with_first_occurrence_ties() {
        let data = hours(&[(0, 80.0), (7, 150.0), (13, 200.0), (20, 90.0)]);
        let worst = worst_hour(&data).unwrap();
        assert_eq!((worst.hour, worst.avg_aqi), (13, 200.0));

        let tied = hours(&[(3, 120.0), (9, 120.0)]);
        assert_eq!(worst_hour(&tied).unwrap().hour, 3);
        assert_eq!(worst_hour(&[]), Err(AggregateError::EmptyInput));
    }

    #[test]
    fn distribution_covers_all_categories_and_conserves_count() {
        let data = cities(&[("A", 60.0), ("B", 310.0), ("C", 45.0)]);
        let hist = distribution(&data).unwrap();
        assert_eq!(hist.len(), 6);
        let total: usize = hist.iter().map(|(_, count)| count).sum();
        assert_eq!(total, data.len());
        assert_eq!(hist[0], (AqiCategory::Good, 1));
        assert_eq!(hist[1], (AqiCategory::Satisfactory, 1));
        assert_eq!(hist[3], (AqiCategory::Poor, 1));
        assert_eq!(hist[5], (AqiCategory::Severe, 0));

        // Empty input still yields all six categories, zero-filled.
        let empty = distribution(&[]).unwrap();
        assert_eq!(empty.len(), 6);
        assert!(empty.iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn extreme_count_uses_strict_threshold() {
        let data = cities(&[("A", 60.0), ("B", 310.0), ("C", 45.0)]);
        let (count, fraction) = extreme_count(&data, 200.0).unwrap();
        assert_eq!(count, 1);
        assert!((fraction - 1.0 / 3.0).abs() < 1e-9);

        let boundary = cities(&[("A", 200.0)]);
        assert_eq!(extreme_count(&boundary, 200.0).unwrap().0, 0);
        assert_eq!(extreme_count(&[], 200.0), Err(AggregateError::EmptyInput));
    }

    #[test]
    fn day_night_partition_is_total_over_the_clock() {
        for hour in 0u8..=23 {
            let group = TimeGroup::of_hour(hour).unwrap();
            let expected = if (6..=18).contains(&hour) {
                TimeGroup::Day
            } else {
                TimeGroup::Night
            };
            assert_eq!(group, expected, "hour {}", hour);
        }
        assert!(matches!(
            TimeGroup::of_hour(24),
            Err(AggregateError::InvalidHour { hour: 24 })
        ));
    }

    #[test]
    fn group_by_time_of_day_averages_each_bucket() {
        let data = hours(&[(0, 80.0), (7, 150.0), (13, 200.0), (20, 90.0)]);
        let means = group_by_time_of_day(&data).unwrap();
        assert_eq!(means.day_hours, 2);
        assert_eq!(means.night_hours, 2);
        assert!((means.day_mean - 175.0).abs() < 1e-9);
        assert!((means.night_mean - 85.0).abs() < 1e-9);
    }

    #[test]
    fn group_by_time_of_day_full_clock_never_fails() {
        let full: Vec<HourRecord> = (0u8..=23)
            .map(|hour| HourRecord {
                hour,
                avg_aqi: 100.0,
            })
            .collect();
        let means = group_by_time_of_day(&full).unwrap();
        assert_eq!(means.day_hours + means.night_hours, 24);
    }

    #[test]
    fn group_by_time_of_day_flags_empty_buckets() {
        let night_only = hours(&[(2, 90.0), (22, 70.0)]);
        assert_eq!(
            group_by_time_of_day(&night_only),
            Err(AggregateError::EmptyGroup {
                group: TimeGroup::Day
            })
        );
        let day_only = hours(&[(9, 90.0)]);
        assert_eq!(
            group_by_time_of_day(&day_only),
            Err(AggregateError::EmptyGroup {
                group: TimeGroup::Night
            })
        );
        assert!(group_by_time_of_day(&[]).is_err());
    }

    #[test]
    fn group_by_time_of_day_rejects_out_of_range_hours() {
        let bad = hours(&[(9, 90.0), (30, 50.0)]);
        assert_eq!(
            group_by_time_of_day(&bad),
            Err(AggregateError::InvalidHour { hour: 30 })
        );
    }

    #[test]
    fn operations_are_idempotent() {
        let data = cities(&[("A", 60.0), ("B", 310.0), ("C", 45.0)]);
        let clock = hours(&[(0, 80.0), (7, 150.0), (13, 200.0), (20, 90.0)]);
        assert_eq!(top_n(&data, 2).unwrap(), top_n(&data, 2).unwrap());
        assert_eq!(distribution(&data).unwrap(), distribution(&data).unwrap());
        assert_eq!(
            group_by_time_of_day(&clock).unwrap(),
            group_by_time_of_day(&clock).unwrap()
        );
        assert_eq!(
            national_average(&data).unwrap(),
            national_average(&data).unwrap()
        );
    }
}
