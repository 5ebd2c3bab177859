use anyhow::{Context, Result};
use backon::{ExponentialBuilder, Retryable};
use clap::builder::RangedU64ValueParser;
use rostra_core::SearchResult;
use rostra_search::{Error, SearchQuery, Services};

/// Characters of speech text shown with `--text`.
const TEXT_PREVIEW_CHARS: usize = 500;

const SAMPLE_QUERIES: [&str; 10] = [
    "inflation expectations and monetary policy",
    "trade tensions and tariffs impact",
    "interest rate decisions",
    "quantitative easing programs",
    "financial stability risks",
    "cryptocurrency and digital currencies",
    "climate change economic impact",
    "labor market conditions",
    "supply chain disruptions",
    "housing market trends",
];

#[derive(Debug, clap::Args)]
pub struct SearchArgs {
    /// Free-text query
    query: String,

    /// Data product key to search (see `rostra products`)
    #[arg(long, conflicts_with = "collection")]
    product: Option<String>,

    /// Vector-index collection to search directly
    #[arg(long)]
    collection: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 10, value_parser = RangedU64ValueParser::<usize>::new().range(1..=50))]
    limit: usize,

    /// Show a preview of each speech's text
    #[arg(long)]
    text: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Retry attempts when a backend is temporarily unavailable
    #[arg(long, default_value_t = 0)]
    retries: usize,
}

/// Resolve the collection to search and a label for display.
async fn target(services: &Services, args: &SearchArgs) -> Result<(String, String)> {
    if let Some(collection) = &args.collection {
        return Ok((collection.clone(), collection.clone()));
    }

    if let Some(key) = &args.product {
        let definition = services
            .registry
            .get(key)
            .ok_or_else(|| Error::UnknownProduct { key: key.clone() })?;
        return Ok((definition.collection.clone(), definition.label.clone()));
    }

    let catalog = services.resolver().get_available_products().await;
    let product = catalog.first().context(
        "No data products found. Run the indexing pipeline first to index speeches.",
    )?;
    Ok((
        product.collection().to_string(),
        product.definition.label.clone(),
    ))
}

pub async fn run_search(services: &Services, args: SearchArgs) -> Result<()> {
    let query = SearchQuery::new(args.query.as_str())?;
    let (collection, label) = target(services, &args).await?;
    let executor = services.executor();

    let results = (|| async { executor.search(&query, &collection, args.limit).await })
        .retry(ExponentialBuilder::default().with_max_times(args.retries))
        .when(Error::is_transient)
        .notify(|err, delay| log::warn!("Search failed ({}), retrying in {:?}", err, delay))
        .await
        .with_context(|| format!("Search on {} failed", collection))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("\n🔍 \"{}\" in {}\n", query, label);

    if results.is_empty() {
        println!("  No results.");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        print_result(rank + 1, result, args.text);
    }

    println!("  {} result(s)", results.len());
    Ok(())
}

fn print_result(rank: usize, result: &SearchResult, show_text: bool) {
    let record = result.canonical();
    let or_unknown = |value: Option<String>| value.unwrap_or_else(|| "Unknown".to_string());

    println!(
        "{:>3}. {}",
        rank,
        record.title.clone().unwrap_or_else(|| "Untitled".to_string())
    );
    println!("     Similarity: {:.1}%", result.similarity * 100.0);
    println!(
        "     {} | {} | {}",
        or_unknown(record.author),
        or_unknown(record.country),
        or_unknown(record.date)
    );

    let stances: Vec<String> = [
        ("monetary", record.monetary_stance),
        ("trade", record.trade_stance),
        ("outlook", record.economic_outlook),
    ]
    .into_iter()
    .filter_map(|(name, score)| score.map(|s| format!("{name} {s:+.2}")))
    .collect();
    if !stances.is_empty() {
        println!("     Stance: {}", stances.join(", "));
    }
    if record.tariff_mention == Some(true) {
        println!("     Mentions tariffs");
    }

    if show_text {
        if let Some(text) = record.text.filter(|t| !t.is_empty()) {
            println!("\n     {}", preview(&text, TEXT_PREVIEW_CHARS));
        }
    }
    println!();
}

/// The first `max_chars` characters of `text`, with an ellipsis if cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn show_samples() {
    println!("\n💡 Sample queries\n");
    for query in SAMPLE_QUERIES {
        println!("  rostra search \"{}\"", query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("rates held", 500), "rates held");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("Thedéen spoke", 6), "Thedée…");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn test_samples_are_valid_queries() {
        for query in SAMPLE_QUERIES {
            assert!(SearchQuery::new(query).is_ok());
        }
    }
}
