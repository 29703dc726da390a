use std::collections::HashMap;

use crate::models::{AnswerCount, QuestionCatalog, Row};

/// Reserved strings meaning "non-answer". Rows holding one of these in the
/// target column are excluded from counting. The misspelled variant appears
/// verbatim in the source data.
pub const SENTINELS: [&str; 8] = [
    "Do not understand the question",
    "Do not undersand the question",
    "Decline to answer",
    "Missing",
    "missing",
    "Can't choose",
    "Not applicable",
    "Other [please name]",
];

pub fn is_sentinel(value: &str) -> bool {
    SENTINELS.contains(&value)
}

/// How the counted categories are ordered before plotting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Case-sensitive lexicographic, with the literal category "Missing"
    /// forced to the end.
    Alphabetical,
    /// Order of the named scale in the question catalog; categories absent
    /// from the scale follow in encounter order. An unknown scale name falls
    /// back to alphabetical so a chart is always renderable.
    ByScale(String),
    /// Count descending, stable ties.
    ByCountDesc,
    /// Count descending, truncated to the n largest, then re-ordered by the
    /// scale when one is supplied.
    TopByCount { n: usize, scale: Option<String> },
}

/// Fixed-width numeric flooring applied before counting: a raw value v maps
/// to the bucket label floor(v / width) * width. Non-numeric values pass
/// through unchanged as their own category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucketing {
    pub width: f64,
}

impl Bucketing {
    /// Bucket widths the dashboard uses for specific columns: ages in 4-year
    /// bands, birth years in 5-year bands.
    pub fn default_for(column: &str) -> Option<Bucketing> {
        match column {
            "se3_2" => Some(Bucketing { width: 4.0 }),
            "se3_1" => Some(Bucketing { width: 5.0 }),
            _ => None,
        }
    }

    pub fn label(&self, raw: &str) -> String {
        match raw.trim().parse::<f64>() {
            Ok(v) => format!("{}", (v / self.width).floor() * self.width),
            Err(_) => raw.to_string(),
        }
    }
}

/// The ordered distribution plus the figures every chart needs for axis
/// scaling and the average reference line. An empty `entries` is the
/// "no data" outcome, distinguishable from a populated result.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub entries: Vec<AnswerCount>,
    pub total: usize,
    pub mean: f64,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turn one column of the row set into an ordered list of (category, count)
/// pairs. Sentinel and absent values are always excluded, never substituted.
/// Pure: reads its inputs and returns fresh data.
pub fn aggregate(
    rows: &[Row],
    column: &str,
    policy: &OrderPolicy,
    catalog: &QuestionCatalog,
    bucketing: Option<Bucketing>,
) -> Aggregation {
    let mut entries: Vec<AnswerCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let raw = match row.get(column) {
            Some(v) if !is_sentinel(v) => v,
            _ => continue,
        };
        let category = match bucketing {
            Some(b) => b.label(raw),
            None => raw.clone(),
        };
        match index.get(&category) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(category.clone(), entries.len());
                entries.push(AnswerCount { category, count: 1 });
            }
        }
    }

    let entries = order_entries(entries, policy, catalog);
    let total: usize = entries.iter().map(|e| e.count).sum();
    let mean = if entries.is_empty() {
        0.0
    } else {
        total as f64 / entries.len() as f64
    };

    Aggregation { entries, total, mean }
}

fn order_entries(
    mut entries: Vec<AnswerCount>,
    policy: &OrderPolicy,
    catalog: &QuestionCatalog,
) -> Vec<AnswerCount> {
    match policy {
        OrderPolicy::Alphabetical => {
            sort_alphabetical(&mut entries);
            entries
        }
        OrderPolicy::ByScale(name) => {
            match scale_ranks(catalog, name) {
                Some(ranks) => sort_by_scale(&mut entries, &ranks),
                None => sort_alphabetical(&mut entries),
            }
            entries
        }
        OrderPolicy::ByCountDesc => {
            entries.sort_by(|a, b| b.count.cmp(&a.count));
            entries
        }
        OrderPolicy::TopByCount { n, scale } => {
            entries.sort_by(|a, b| b.count.cmp(&a.count));
            entries.truncate(*n);
            if let Some(ranks) = scale.as_deref().and_then(|s| scale_ranks(catalog, s)) {
                sort_by_scale(&mut entries, &ranks);
            }
            entries
        }
    }
}

fn sort_alphabetical(entries: &mut [AnswerCount]) {
    entries.sort_by(|a, b| {
        match (a.category == "Missing", b.category == "Missing") {
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            _ => a.category.cmp(&b.category),
        }
    });
}

// Scale labels match case-insensitively; the catalog and the data disagree on
// capitalization for several scales.
fn scale_ranks(catalog: &QuestionCatalog, name: &str) -> Option<HashMap<String, usize>> {
    let scale = catalog.scale(name)?;
    Some(
        scale
            .iter()
            .enumerate()
            .map(|(i, label)| (label.to_lowercase(), i))
            .collect(),
    )
}

fn sort_by_scale(entries: &mut [AnswerCount], ranks: &HashMap<String, usize>) {
    // Stable sort keeps encounter order for categories absent from the scale.
    entries.sort_by_key(|e| {
        ranks
            .get(&e.category.to_lowercase())
            .copied()
            .unwrap_or(usize::MAX)
    });
}
