// Entry point and high-level CLI flow.
//
// The binary is a menu-driven console dashboard over two pre-aggregated AQI
// tables (average per city, average per hour of day):
// - Options [1]-[5] render the analytic views.
// - Option [6] sets or clears the focus city used by the city view.
// - Option [7] exports every view to CSV plus a JSON summary.
mod aggregate;
mod category;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use aggregate::AggregateError;
use category::AqiCategory;
use std::io::{self, Write};
use types::Dataset;

const CITY_TABLE_PATH: &str = "avg_aqi_per_city.csv";
const HOUR_TABLE_PATH: &str = "avg_aqi_per_hour.csv";

/// Read a single line of input after printing a prompt.
fn read_choice(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn print_menu(focus: Option<&str>) {
    println!("=== National AQI Dashboard ===");
    println!("Focus city: {}", focus.unwrap_or("All cities"));
    println!("[1] Overview");
    println!("[2] City Comparison");
    println!("[3] Hourly Trend");
    println!("[4] Category Distribution");
    println!("[5] Day vs Night");
    println!("[6] Choose Focus City");
    println!("[7] Export Reports");
    println!("[0] Exit");
}

/// Option [1]: national headline metrics.
fn show_overview(data: &Dataset) -> Result<(), AggregateError> {
    println!("\nAir Quality Monitoring Overview\n");
    let national_avg = aggregate::national_average(&data.cities)?;
    let worst = aggregate::worst_city(&data.cities)?;
    let best = aggregate::best_city(&data.cities)?;

    println!(
        "National average AQI : {}",
        util::format_aqi(national_avg, 1)
    );
    println!(
        "Worst city           : {} ({})",
        worst.city,
        util::format_aqi(worst.avg_aqi, 2)
    );
    println!(
        "Best city            : {} ({})",
        best.city,
        util::format_aqi(best.avg_aqi, 2)
    );
    println!();
    println!("This dashboard reports air quality conditions from averaged AQI data.");
    println!("The analysis identifies:");
    println!("  - the cities with the heaviest pollution");
    println!("  - the most hazardous hours of the day");
    println!("  - how pollution is distributed across severity levels\n");
    Ok(())
}

/// Option [2]: ranking table plus focus-city detail.
fn show_city_comparison(data: &Dataset, selected: Option<&str>) -> Result<(), AggregateError> {
    println!("\nCity AQI Comparison\n");
    let rows = reports::city_ranking_rows(&data.cities, selected)?;
    println!(
        "Top {} cities by average AQI (focus city marked with '*'):\n",
        reports::DISPLAY_RANK_LIMIT
    );
    output::print_table(&rows);

    let focus = match selected {
        Some(name) => aggregate::focus_city(&data.cities, name)?,
        None => aggregate::worst_city(&data.cities)?,
    };
    let category = AqiCategory::classify(focus.avg_aqi)?;
    let rank = aggregate::rank_of(&data.cities, &focus.city)?;
    println!(
        "Focus city  : {} (rank {} of {})",
        focus.city,
        rank,
        data.cities.len()
    );
    println!("Average AQI : {}", util::format_aqi(focus.avg_aqi, 2));
    println!("Category    : {} ({})", category.label(), category.color());
    println!();
    println!("Cities at the top of this ranking carry the heaviest pollution load");
    println!("and are the natural priority for environmental policy.\n");
    Ok(())
}

/// Option [3]: AQI by hour of day.
fn show_hour_trend(data: &Dataset) -> Result<(), AggregateError> {
    println!("\nAQI Trend by Hour of Day\n");
    let worst = aggregate::worst_hour(&data.hours)?;
    println!(
        "Pollution peaks at {:02}:00 (average AQI {}).\n",
        worst.hour,
        util::format_aqi(worst.avg_aqi, 2)
    );
    output::print_table(&reports::hour_trend_rows(&data.hours));
    println!("Pollution typically climbs during commuter traffic hours.");
    println!("Those windows are highest risk for:");
    println!("  - children");
    println!("  - the elderly");
    println!("  - people with asthma\n");
    Ok(())
}

/// Option [4]: severity histogram plus the extreme-pollution metric.
fn show_distribution(data: &Dataset) -> Result<(), AggregateError> {
    println!("\nAQI Category Distribution\n");
    output::print_table(&reports::distribution_rows(&data.cities)?);

    let (count, fraction) =
        aggregate::extreme_count(&data.cities, reports::EXTREME_THRESHOLD)?;
    println!(
        "Cities with AQI above {}: {} ({})",
        reports::EXTREME_THRESHOLD as i64,
        util::format_count(count),
        util::format_pct(fraction)
    );
    println!();
    println!("The distribution shows which severity band holds most cities. A heavy");
    println!("Poor or Very Poor tail means national air quality needs serious attention.\n");
    Ok(())
}

/// Option [5]: day/night comparison.
fn show_day_night(data: &Dataset) -> Result<(), AggregateError> {
    println!("\nDay vs Night Pollution\n");
    output::print_table(&reports::time_group_rows(&data.hours)?);
    println!("Night hours often stay polluted because temperature inversion traps");
    println!("dirty air near the surface instead of letting it rise and disperse.\n");
    Ok(())
}

/// Option [6]: pick a focus city from the alphabetical list, or clear the
/// selection to return to the all-cities default.
fn choose_focus_city(data: &Dataset, current: Option<String>) -> Option<String> {
    let mut names: Vec<&str> = data.cities.iter().map(|r| r.city.as_str()).collect();
    names.sort_unstable();

    println!("\n[0] All cities");
    for (i, name) in names.iter().enumerate() {
        println!("[{}] {}", i + 1, name);
    }
    match read_choice("Select a city: ").parse::<usize>() {
        Ok(0) => {
            println!("Focus cleared.\n");
            None
        }
        Ok(i) if i <= names.len() => {
            let name = names[i - 1].to_string();
            println!("Focus set to {}.\n", name);
            Some(name)
        }
        _ => {
            println!("Invalid choice, keeping the current selection.\n");
            current
        }
    }
}

/// Option [7]: write every view to disk.
///
/// This function is intentionally side-effectful:
/// - writes four CSV files, one per view,
/// - and writes a JSON summary of the headline metrics.
fn handle_export(data: &Dataset, selected: Option<&str>) -> Result<(), AggregateError> {
    println!("\nExporting reports...\n");

    let ranking = reports::city_ranking_rows(&data.cities, selected)?;
    let distribution = reports::distribution_rows(&data.cities)?;
    let day_night = reports::time_group_rows(&data.hours)?;
    let trend = reports::hour_trend_rows(&data.hours);
    let summary = reports::build_summary(&data.cities, &data.hours)?;

    let exports: [(&str, Result<(), Box<dyn std::error::Error>>); 5] = [
        ("city_ranking.csv", output::write_csv("city_ranking.csv", &ranking)),
        (
            "aqi_distribution.csv",
            output::write_csv("aqi_distribution.csv", &distribution),
        ),
        ("day_night.csv", output::write_csv("day_night.csv", &day_night)),
        ("hour_trend.csv", output::write_csv("hour_trend.csv", &trend)),
        ("summary.json", output::write_json("summary.json", &summary)),
    ];
    for (name, result) in exports {
        match result {
            Ok(()) => println!("Wrote {}", name),
            Err(e) => eprintln!("Write error for {}: {}", name, e),
        }
    }
    println!();
    Ok(())
}

fn main() {
    let (data, report) = match loader::load_dataset(CITY_TABLE_PATH, HOUR_TABLE_PATH) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load AQI tables: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "Loaded {} cities and {} hour records.",
        util::format_count(report.cities_loaded),
        util::format_count(report.hours_loaded)
    );
    if report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            util::format_count(report.skipped_rows)
        );
    }
    if report.duplicate_cities > 0 {
        println!(
            "Note: {} duplicate city rows ignored (first occurrence kept).",
            util::format_count(report.duplicate_cities)
        );
    }
    println!();

    // The focus selection is the only piece of session state; the tables
    // themselves never change after load.
    let mut focus: Option<String> = None;
    loop {
        print_menu(focus.as_deref());
        let result = match read_choice("Enter choice: ").as_str() {
            "1" => show_overview(&data),
            "2" => show_city_comparison(&data, focus.as_deref()),
            "3" => show_hour_trend(&data),
            "4" => show_distribution(&data),
            "5" => show_day_night(&data),
            "6" => {
                focus = choose_focus_city(&data, focus.take());
                Ok(())
            }
            "7" => handle_export(&data, focus.as_deref()),
            "0" => {
                println!("Exiting the dashboard.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 0-7.\n");
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("Cannot render view: {}\n", e);
        }
    }
}
