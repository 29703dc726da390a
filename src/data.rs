use std::path::Path;

use anyhow::Context;

use crate::models::{QuestionCatalog, Row};

/// Load the respondent rows. Every column stays a string; numeric columns are
/// parsed at the point of use.
pub fn load_rows(csv_path: &Path) -> anyhow::Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut rows = Vec::new();

    for result in reader.deserialize::<Row>() {
        let row = result.with_context(|| format!("bad record in {}", csv_path.display()))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Load the question catalog (scales plus question metadata).
pub fn load_catalog(json_path: &Path) -> anyhow::Result<QuestionCatalog> {
    let raw = std::fs::read_to_string(json_path)
        .with_context(|| format!("failed to read {}", json_path.display()))?;
    let catalog: QuestionCatalog = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", json_path.display()))?;
    Ok(catalog)
}
