use std::fmt::Write;

use chrono::NaiveDate;

use crate::aggregate::Aggregation;
use crate::models::FilterContext;
use crate::stats::{self, CountryBadRate, ProfileAxis};

fn scope_label(filters: &FilterContext) -> String {
    let countries = if filters.countries.is_empty() {
        "all countries".to_string()
    } else {
        filters.countries.join(", ")
    };
    match &filters.year {
        Some(year) => format!("{countries}, {year}"),
        None => format!("{countries}, all years"),
    }
}

pub fn build_report(
    column: &str,
    description: Option<&str>,
    filters: &FilterContext,
    generated: NaiveDate,
    aggregation: &Aggregation,
    bad_rates: &[CountryBadRate],
    profile: &[ProfileAxis],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Survey Answer Report: {column}");
    if let Some(description) = description {
        let _ = writeln!(output, "{description}");
    }
    let _ = writeln!(
        output,
        "Generated {} for {}",
        generated,
        scope_label(filters)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Answer Distribution");

    if aggregation.is_empty() {
        let _ = writeln!(output, "No data for this selection.");
    } else {
        for entry in aggregation.entries.iter() {
            let percentage = entry.count as f64 / aggregation.total as f64 * 100.0;
            let _ = writeln!(
                output,
                "- {}: {} ({:.1}%)",
                entry.category, entry.count, percentage
            );
        }
        let _ = writeln!(
            output,
            "Total {} answers, average {:.1} per category.",
            aggregation.total, aggregation.mean
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Missing Values by Country");

    if bad_rates.is_empty() {
        let _ = writeln!(output, "No countries in this selection.");
    } else {
        for rate in bad_rates.iter().take(10) {
            let _ = writeln!(output, "- {}: {:.1}%", rate.country, rate.percent);
        }
        let _ = writeln!(
            output,
            "Average: {:.1}%",
            stats::mean_rate(bad_rates)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Socio-Economic Profile");

    for axis in profile.iter() {
        match axis.value {
            Some(value) => {
                let _ = writeln!(output, "- {} ({}): {:.2}", axis.key, axis.column, value);
            }
            None => {
                let _ = writeln!(output, "- {} ({}): no data", axis.key, axis.column);
            }
        }
    }

    output
}
