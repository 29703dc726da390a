use std::collections::HashMap;

use serde::Deserialize;

/// One respondent's answers, keyed by question/field code (`q1`, `se3_2`,
/// `country`, `year`, ...). The survey has ~180 columns, so rows stay dynamic
/// rather than a fixed struct.
pub type Row = HashMap<String, String>;

/// One bar of a distribution: a distinct answer (or derived bucket) and how
/// many rows landed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCount {
    pub category: String,
    pub count: usize,
}

/// Question metadata from the catalog JSON. `order_outputs` names the scale
/// that orders this question's answers, when one exists.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionMeta {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub order_outputs: Option<String>,
}

/// The question catalog: named ordinal scales plus per-question metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionCatalog {
    #[serde(default)]
    pub scales: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub elements: Vec<QuestionMeta>,
}

impl QuestionCatalog {
    pub fn question(&self, id: &str) -> Option<&QuestionMeta> {
        self.elements.iter().find(|q| q.id == id)
    }

    pub fn scale(&self, name: &str) -> Option<&[String]> {
        self.scales.get(name).map(|s| s.as_slice())
    }
}

/// The caller-owned selection state: which countries and which survey year a
/// query should see. Empty countries / no year mean "all".
#[derive(Debug, Clone, Default)]
pub struct FilterContext {
    pub countries: Vec<String>,
    pub year: Option<String>,
}

impl FilterContext {
    pub fn matches(&self, row: &Row) -> bool {
        if !self.countries.is_empty() {
            match row.get("country") {
                Some(c) if self.countries.iter().any(|want| want == c) => {}
                _ => return false,
            }
        }
        if let Some(year) = &self.year {
            match row.get("year") {
                Some(y) if y == year => {}
                _ => return false,
            }
        }
        true
    }

    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
