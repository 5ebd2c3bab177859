use anyhow::{Context, Result};
use rostra_core::stats::{self, MonthlyStance};
use rostra_core::Table;
use rostra_search::{Error, ObjectStore, Services};
use serde::Serialize;

/// Load a product's dataset, or warn and return `None` when the object
/// store does not hold it.
async fn load_dataset(services: &Services, key: &str) -> Result<Option<Table>> {
    let definition = services
        .registry
        .get(key)
        .ok_or_else(|| Error::UnknownProduct {
            key: key.to_string(),
        })?;

    let present = services
        .lakefs
        .stat(
            &services.snapshot.repository,
            &services.snapshot.reference,
            &definition.object_path,
        )
        .await
        .context("Failed to check the object store")?;

    if !present {
        println!(
            "⚠ Dataset for {} is not in the object store ({}@{}:{}).",
            key, services.snapshot.repository, services.snapshot.reference, definition.object_path
        );
        println!("  Statistics need the Parquet dataset; run the pipeline to materialize it.");
        return Ok(None);
    }

    let table = services
        .loader()
        .load(key)
        .await
        .with_context(|| format!("Failed to load dataset for {}", key))?;
    Ok(Some(table))
}

#[derive(Debug, Serialize)]
struct StatsReport {
    summary: stats::DatasetSummary,
    countries: Vec<CountryCount>,
}

#[derive(Debug, Serialize)]
struct CountryCount {
    country: String,
    speeches: usize,
}

pub async fn show_stats(services: &Services, key: &str, top: usize, json: bool) -> Result<()> {
    let Some(table) = load_dataset(services, key).await? else {
        return Ok(());
    };

    let summary = stats::summarize(&table);
    let countries: Vec<CountryCount> = stats::country_counts(&table, top)
        .into_iter()
        .map(|(country, speeches)| CountryCount { country, speeches })
        .collect();

    if json {
        let report = StatsReport { summary, countries };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let count_or_dash = |n: Option<usize>| n.map_or_else(|| "-".to_string(), |n| n.to_string());

    println!("\n📊 Dataset statistics: {}\n", key);
    println!("  Total speeches:  {}", summary.total_speeches);
    println!("  Countries:       {}", count_or_dash(summary.countries));
    println!("  Authors:         {}", count_or_dash(summary.authors));
    println!("  Tariff mentions: {}", summary.tariff_mentions);
    match &summary.date_range {
        Some((first, last)) => println!("  Date range:      {} to {}", first, last),
        None => println!("  Date range:      -"),
    }

    if !countries.is_empty() {
        println!("\n  Speeches by country (top {})\n", top);
        let widest = countries.iter().map(|c| c.speeches).max().unwrap_or(1).max(1);
        for entry in &countries {
            let bar = "█".repeat((entry.speeches * 30).div_ceil(widest));
            println!("  {:<24} {:>6}  {}", entry.country, entry.speeches, bar);
        }
    }

    Ok(())
}

pub async fn show_trends(
    services: &Services,
    key: &str,
    countries: &[String],
    json: bool,
) -> Result<()> {
    let Some(table) = load_dataset(services, key).await? else {
        return Ok(());
    };

    let trends = stats::monthly_stance_averages(&table, countries);

    if json {
        println!("{}", serde_json::to_string_pretty(&trends)?);
        return Ok(());
    }

    println!("\n📈 Monthly stance averages: {}", key);
    if !countries.is_empty() {
        println!("   Countries: {}", countries.join(", "));
    }
    println!();

    if trends.is_empty() {
        println!("  No dated speeches match.");
        let known = stats::countries(&table);
        if !countries.is_empty() && !known.is_empty() {
            println!("  Known countries: {}", known.join(", "));
        }
        return Ok(());
    }

    println!(
        "  {:<8} {:>8} {:>9} {:>7} {:>8}",
        "Month", "Speeches", "Monetary", "Trade", "Outlook"
    );
    for row in &trends {
        print_trend(row);
    }

    Ok(())
}

fn print_trend(row: &MonthlyStance) {
    let score = |s: Option<f64>| s.map_or_else(|| "-".to_string(), |s| format!("{:+.2}", s));
    println!(
        "  {:<8} {:>8} {:>9} {:>7} {:>8}",
        row.month.format("%Y-%m").to_string(),
        row.speeches,
        score(row.monetary_stance),
        score(row.trade_stance),
        score(row.economic_outlook)
    );
}
