use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod aggregate;
mod data;
mod models;
mod report;
mod stats;

use aggregate::{aggregate, Bucketing, OrderPolicy};
use models::{FilterContext, QuestionCatalog};

#[derive(Parser)]
#[command(name = "survey-answer-explorer")]
#[command(about = "Aggregation queries over a cross-national survey dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Lexicographic, with "Missing" last
    Alphabetical,
    /// The question's ordinal scale from the catalog
    Scale,
    /// Count descending
    Count,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the answer distribution for one question
    Histogram {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        questions: Option<PathBuf>,
        #[arg(long)]
        column: String,
        #[arg(long)]
        country: Vec<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_enum, default_value = "alphabetical")]
        order: OrderArg,
        #[arg(long)]
        scale: Option<String>,
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        bucket: Option<f64>,
    },
    /// Rank countries by their share of one sentinel value
    Missing {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "Missing")]
        bad_type: String,
    },
    /// Cross-tabulate two columns
    Crosstab {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        rows: String,
        #[arg(long)]
        cols: String,
    },
    /// Socio-economic profile of one country against the global averages
    Profile {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        country: String,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        questions: Option<PathBuf>,
        #[arg(long)]
        column: String,
        #[arg(long)]
        country: Vec<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_enum, default_value = "alphabetical")]
        order: OrderArg,
        #[arg(long)]
        scale: Option<String>,
        #[arg(long)]
        top: Option<usize>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn load_catalog(path: Option<&PathBuf>) -> anyhow::Result<QuestionCatalog> {
    match path {
        Some(path) => data::load_catalog(path),
        None => Ok(QuestionCatalog::default()),
    }
}

/// Resolve the CLI's ordering flags to a policy. `--scale` overrides the
/// question's `order_outputs` entry; a scale ordering with no scale to use
/// falls back to alphabetical with a warning.
fn resolve_policy(
    order: OrderArg,
    top: Option<usize>,
    scale: Option<String>,
    column: &str,
    catalog: &QuestionCatalog,
) -> OrderPolicy {
    let scale_name = scale.or_else(|| {
        catalog
            .question(column)
            .and_then(|q| q.order_outputs.clone())
    });

    if let Some(n) = top {
        return OrderPolicy::TopByCount { n, scale: scale_name };
    }

    match order {
        OrderArg::Alphabetical => OrderPolicy::Alphabetical,
        OrderArg::Count => OrderPolicy::ByCountDesc,
        OrderArg::Scale => match scale_name {
            Some(name) => OrderPolicy::ByScale(name),
            None => {
                eprintln!("No scale configured for {column}, ordering alphabetically.");
                OrderPolicy::Alphabetical
            }
        },
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Histogram {
            csv,
            questions,
            column,
            country,
            year,
            order,
            scale,
            top,
            bucket,
        } => {
            let rows = data::load_rows(&csv)?;
            let catalog = load_catalog(questions.as_ref())?;
            let filters = FilterContext { countries: country, year };
            let filtered = filters.apply(&rows);

            let policy = resolve_policy(order, top, scale, &column, &catalog);
            let bucketing = bucket
                .map(|width| Bucketing { width })
                .or_else(|| Bucketing::default_for(&column));
            let agg = aggregate(&filtered, &column, &policy, &catalog, bucketing);

            if agg.is_empty() {
                println!("No data found for {column} in this selection.");
                return Ok(());
            }

            if let Some(question) = catalog.question(&column) {
                println!("{}: {}", column, question.description);
            }
            for entry in agg.entries.iter() {
                let percentage = entry.count as f64 / agg.total as f64 * 100.0;
                println!("- {}: {} ({:.1}%)", entry.category, entry.count, percentage);
            }
            println!(
                "Total {} answers, average {:.1} per category.",
                agg.total, agg.mean
            );
        }
        Commands::Missing { csv, bad_type } => {
            let rows = data::load_rows(&csv)?;
            let rates = stats::bad_rate_by_country(&rows, &bad_type);

            if rates.is_empty() {
                println!("No countries found in this dataset.");
                return Ok(());
            }

            println!("Share of \"{bad_type}\" answers by country:");
            for rate in rates.iter() {
                println!("- {}: {:.1}%", rate.country, rate.percent);
            }
            println!("Average: {:.1}%", stats::mean_rate(&rates));
        }
        Commands::Crosstab { csv, rows: row_column, cols: col_column } => {
            let rows = data::load_rows(&csv)?;
            let tab = stats::crosstab(&rows, &row_column, &col_column);

            if tab.is_empty() {
                println!("No data found for {row_column} x {col_column}.");
                return Ok(());
            }

            println!("{row_column} x {col_column} ({} answers):", tab.total());
            println!("\t{}", tab.col_categories.join("\t"));
            for (i, category) in tab.row_categories.iter().enumerate() {
                let cells: Vec<String> =
                    tab.counts[i].iter().map(|n| n.to_string()).collect();
                println!("{category}\t{}", cells.join("\t"));
            }
            println!("Largest cell: {}", tab.max_count());
        }
        Commands::Profile { csv, country } => {
            let rows = data::load_rows(&csv)?;
            let filters = FilterContext { countries: vec![country.clone()], year: None };
            let country_rows = filters.apply(&rows);

            if country_rows.is_empty() {
                println!("No data found for country: {country}");
                return Ok(());
            }

            let local = stats::profile(&country_rows);
            let global = stats::profile(&rows);

            println!("Socio-economic profile for {country}:");
            for (axis, global_axis) in local.iter().zip(global.iter()) {
                match (axis.value, global_axis.value) {
                    (Some(value), Some(global_value)) => println!(
                        "- {} ({}): {:.2} (global {:.2})",
                        axis.key, axis.column, value, global_value
                    ),
                    (Some(value), None) => {
                        println!("- {} ({}): {:.2}", axis.key, axis.column, value)
                    }
                    (None, _) => println!("- {} ({}): no data", axis.key, axis.column),
                }
            }
        }
        Commands::Report {
            csv,
            questions,
            column,
            country,
            year,
            order,
            scale,
            top,
            out,
        } => {
            let rows = data::load_rows(&csv)?;
            let catalog = load_catalog(questions.as_ref())?;
            let filters = FilterContext { countries: country, year };
            let filtered = filters.apply(&rows);

            let policy = resolve_policy(order, top, scale, &column, &catalog);
            let bucketing = Bucketing::default_for(&column);
            let agg = aggregate(&filtered, &column, &policy, &catalog, bucketing);
            let rates = stats::bad_rate_by_country(&filtered, "Missing");
            let profile = stats::profile(&filtered);

            let description = catalog
                .question(&column)
                .map(|q| q.description.clone());
            let report = report::build_report(
                &column,
                description.as_deref(),
                &filters,
                chrono::Utc::now().date_naive(),
                &agg,
                &rates,
                &profile,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
