use std::collections::HashMap;

use crate::aggregate::is_sentinel;
use crate::models::Row;

/// Share of one sentinel ("bad type") among a country's question answers.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryBadRate {
    pub country: String,
    pub percent: f64,
}

/// Per-country percentage of `bad_type` across all question (`q*`) columns,
/// one decimal place, sorted descending. "Missing" also matches the
/// lowercase "missing" values present in the data.
pub fn bad_rate_by_country(rows: &[Row], bad_type: &str) -> Vec<CountryBadRate> {
    let mut per_country: Vec<(String, usize, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let country = match row.get("country") {
            Some(c) => c,
            None => continue,
        };
        let i = match index.get(country) {
            Some(&i) => i,
            None => {
                index.insert(country.clone(), per_country.len());
                per_country.push((country.clone(), 0, 0));
                per_country.len() - 1
            }
        };
        for (key, value) in row {
            if !key.starts_with('q') {
                continue;
            }
            per_country[i].1 += 1;
            if value.as_str() == bad_type || (bad_type == "Missing" && value.as_str() == "missing") {
                per_country[i].2 += 1;
            }
        }
    }

    let mut rates: Vec<CountryBadRate> = per_country
        .into_iter()
        .filter(|(_, answers, _)| *answers > 0)
        .map(|(country, answers, bad)| CountryBadRate {
            country,
            percent: round1(bad as f64 / answers as f64 * 100.0),
        })
        .collect();

    rates.sort_by(|a, b| b.percent.partial_cmp(&a.percent).unwrap_or(std::cmp::Ordering::Equal));
    rates
}

/// Mean rate across countries, for the average reference line.
pub fn mean_rate(rates: &[CountryBadRate]) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().map(|r| r.percent).sum::<f64>() / rates.len() as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Count matrix for two columns, over rows with a valid answer in both.
/// Categories keep encounter order on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Crosstab {
    pub row_categories: Vec<String>,
    pub col_categories: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl Crosstab {
    pub fn is_empty(&self) -> bool {
        self.row_categories.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Largest cell, used for the heatmap color domain.
    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

pub fn crosstab(rows: &[Row], row_column: &str, col_column: &str) -> Crosstab {
    let mut row_categories: Vec<String> = Vec::new();
    let mut col_categories: Vec<String> = Vec::new();
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut col_index: HashMap<String, usize> = HashMap::new();
    let mut cells: HashMap<(usize, usize), usize> = HashMap::new();

    for row in rows {
        let a = match row.get(row_column) {
            Some(v) if !is_sentinel(v) => v,
            _ => continue,
        };
        let b = match row.get(col_column) {
            Some(v) if !is_sentinel(v) => v,
            _ => continue,
        };
        let i = *row_index.entry(a.clone()).or_insert_with(|| {
            row_categories.push(a.clone());
            row_categories.len() - 1
        });
        let j = *col_index.entry(b.clone()).or_insert_with(|| {
            col_categories.push(b.clone());
            col_categories.len() - 1
        });
        *cells.entry((i, j)).or_insert(0) += 1;
    }

    let mut counts = vec![vec![0; col_categories.len()]; row_categories.len()];
    for ((i, j), n) in cells {
        counts[i][j] = n;
    }

    Crosstab { row_categories, col_categories, counts }
}

/// Income quintile labels and their ordinal ranks.
pub const QUINTILE_SCALE: [(&str, f64); 5] = [
    ("Lowest quintile", 1.0),
    ("2 nd", 2.0),
    ("3rd", 3.0),
    ("4th", 4.0),
    ("Highest quintile", 5.0),
];

/// The six spider-chart axes: label and the column that feeds it.
pub const PROFILE_AXES: [(&str, &str); 6] = [
    ("averageAge", "se3_2"),
    ("selfPlacement", "se13a"),
    ("parentsPlacement", "se13b"),
    ("childrenPlacement", "se13c"),
    ("yearsEducation", "se5a"),
    ("incomeQuintile", "se14"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileAxis {
    pub key: &'static str,
    pub column: &'static str,
    pub value: Option<f64>,
}

/// Mean of the parseable numeric values in a column; None when no row has one.
pub fn numeric_mean(rows: &[Row], column: &str) -> Option<f64> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean income-quintile rank; unmapped labels are skipped.
pub fn quintile_mean(rows: &[Row], column: &str) -> Option<f64> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter_map(|v| {
            QUINTILE_SCALE
                .iter()
                .find(|(label, _)| *label == v.as_str())
                .map(|(_, rank)| *rank)
        })
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Socio-economic profile of a (usually pre-filtered) row set, one value per
/// spider axis.
pub fn profile(rows: &[Row]) -> Vec<ProfileAxis> {
    PROFILE_AXES
        .iter()
        .map(|&(key, column)| {
            let value = if key == "incomeQuintile" {
                quintile_mean(rows, column)
            } else {
                numeric_mean(rows, column)
            };
            ProfileAxis { key, column, value }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn bad_rates_count_question_cells_only() {
        let rows = vec![
            row(&[("country", "Japan"), ("q1", "Missing"), ("q2", "Yes"), ("year", "2019")]),
            row(&[("country", "Japan"), ("q1", "No"), ("q2", "missing"), ("year", "2019")]),
            row(&[("country", "Thailand"), ("q1", "Yes"), ("q2", "Yes"), ("year", "2019")]),
        ];
        let rates = bad_rate_by_country(&rows, "Missing");
        assert_eq!(rates.len(), 2);
        // Japan: 2 of 4 question cells, lowercase "missing" included.
        assert_eq!(rates[0], CountryBadRate { country: "Japan".to_string(), percent: 50.0 });
        assert_eq!(rates[1], CountryBadRate { country: "Thailand".to_string(), percent: 0.0 });
        assert!((mean_rate(&rates) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn bad_rates_sort_descending() {
        let rows = vec![
            row(&[("country", "A"), ("q1", "Yes")]),
            row(&[("country", "B"), ("q1", "Decline to answer")]),
        ];
        let rates = bad_rate_by_country(&rows, "Decline to answer");
        assert_eq!(rates[0].country, "B");
        assert_eq!(rates[0].percent, 100.0);
    }

    #[test]
    fn crosstab_counts_sum_to_clean_rows() {
        let rows = vec![
            row(&[("q1", "Yes"), ("se2", "Male")]),
            row(&[("q1", "Yes"), ("se2", "Female")]),
            row(&[("q1", "No"), ("se2", "Male")]),
            row(&[("q1", "Missing"), ("se2", "Male")]),
            row(&[("q1", "Yes"), ("se2", "Decline to answer")]),
        ];
        let tab = crosstab(&rows, "q1", "se2");
        assert_eq!(tab.row_categories, vec!["Yes", "No"]);
        assert_eq!(tab.col_categories, vec!["Male", "Female"]);
        assert_eq!(tab.total(), 3);
        assert_eq!(tab.max_count(), 1);
        assert_eq!(tab.counts[0][0], 1);
        assert_eq!(tab.counts[0][1], 1);
        assert_eq!(tab.counts[1][0], 1);
    }

    #[test]
    fn crosstab_of_nothing_is_empty() {
        let tab = crosstab(&[], "q1", "se2");
        assert!(tab.is_empty());
        assert_eq!(tab.max_count(), 0);
    }

    #[test]
    fn numeric_mean_skips_unparseable_values() {
        let rows = vec![
            row(&[("se3_2", "40")]),
            row(&[("se3_2", "50")]),
            row(&[("se3_2", "Missing")]),
        ];
        assert_eq!(numeric_mean(&rows, "se3_2"), Some(45.0));
        assert_eq!(numeric_mean(&rows, "se99"), None);
    }

    #[test]
    fn quintile_mean_maps_labels_to_ranks() {
        let rows = vec![
            row(&[("se14", "Lowest quintile")]),
            row(&[("se14", "Highest quintile")]),
            row(&[("se14", "Decline to answer")]),
        ];
        assert_eq!(quintile_mean(&rows, "se14"), Some(3.0));
    }

    #[test]
    fn profile_has_one_axis_per_indicator() {
        let rows = vec![row(&[("se3_2", "40"), ("se14", "3rd")])];
        let axes = profile(&rows);
        assert_eq!(axes.len(), 6);
        assert_eq!(axes[0].value, Some(40.0));
        assert_eq!(axes[5].value, Some(3.0));
        assert_eq!(axes[1].value, None);
    }
}
