//! Aggregate statistics over a loaded speech dataset.
//!
//! All functions expect a normalized [`Table`] and read canonical column
//! names only. Missing columns degrade to `None` rather than failing, since
//! real and synthetic products do not carry the same column set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::record::{
    value_as_flag, value_as_number, value_as_text, AUTHOR, COUNTRY, DATE, ECONOMIC_OUTLOOK,
    MONETARY_STANCE, TARIFF_MENTION, TRADE_STANCE,
};
use crate::model::Table;

/// Headline numbers for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_speeches: usize,
    /// Distinct countries, or `None` without a `country` column.
    pub countries: Option<usize>,
    /// Distinct authors, or `None` without an `author` column.
    pub authors: Option<usize>,
    pub tariff_mentions: usize,
    /// Earliest and latest parseable date, compared as ISO strings.
    pub date_range: Option<(String, String)>,
}

/// Mean stance scores for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStance {
    /// First day of the month.
    pub month: NaiveDate,
    pub speeches: usize,
    pub monetary_stance: Option<f64>,
    pub trade_stance: Option<f64>,
    pub economic_outlook: Option<f64>,
}

pub fn summarize(table: &Table) -> DatasetSummary {
    let countries = table
        .has_column(COUNTRY)
        .then(|| distinct_text(table, COUNTRY).len());
    let authors = table
        .has_column(AUTHOR)
        .then(|| distinct_text(table, AUTHOR).len());

    let tariff_mentions = table
        .column(TARIFF_MENTION)
        .filter(|v| v.and_then(value_as_flag).unwrap_or(false))
        .count();

    let mut dates = table
        .column(DATE)
        .filter_map(|v| v.and_then(value_as_text))
        .filter(|d| parse_month(d).is_some());
    let date_range = dates.next().map(|first| {
        dates.fold((first.clone(), first), |(min, max), d| {
            let min = if d < min { d.clone() } else { min };
            let max = if d > max { d } else { max };
            (min, max)
        })
    });

    DatasetSummary {
        total_speeches: table.len(),
        countries,
        authors,
        tariff_mentions,
        date_range,
    }
}

/// Sorted list of distinct countries.
pub fn countries(table: &Table) -> Vec<String> {
    distinct_text(table, COUNTRY).into_iter().collect()
}

/// Speech counts per country, largest first (ties by name), at most
/// `top_n` entries.
pub fn country_counts(table: &Table, top_n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in table.column(COUNTRY) {
        if let Some(country) = value.and_then(value_as_text) {
            *counts.entry(country).or_default() += 1;
        }
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(top_n);
    counts
}

/// Monthly mean of `monetary_stance`, `trade_stance`, and
/// `economic_outlook`, sorted by month.
///
/// When `countries` is non-empty only rows for those countries are
/// counted. Rows without a parseable date are skipped.
pub fn monthly_stance_averages(table: &Table, countries: &[String]) -> Vec<MonthlyStance> {
    #[derive(Default)]
    struct Accumulator {
        speeches: usize,
        monetary: Mean,
        trade: Mean,
        outlook: Mean,
    }

    let mut months: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();

    for row in table.rows() {
        if !countries.is_empty() {
            let country = row.get(COUNTRY).and_then(value_as_text);
            if !country.is_some_and(|c| countries.contains(&c)) {
                continue;
            }
        }

        let Some(month) = row
            .get(DATE)
            .and_then(value_as_text)
            .and_then(|d| parse_month(&d))
        else {
            continue;
        };

        let acc = months.entry(month).or_default();
        acc.speeches += 1;
        acc.monetary.push(row.get(MONETARY_STANCE).and_then(value_as_number));
        acc.trade.push(row.get(TRADE_STANCE).and_then(value_as_number));
        acc.outlook.push(row.get(ECONOMIC_OUTLOOK).and_then(value_as_number));
    }

    months
        .into_iter()
        .map(|(month, acc)| MonthlyStance {
            month,
            speeches: acc.speeches,
            monetary_stance: acc.monetary.value(),
            trade_stance: acc.trade.value(),
            economic_outlook: acc.outlook.value(),
        })
        .collect()
}

#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

fn distinct_text(table: &Table, column: &str) -> BTreeSet<String> {
    table
        .column(column)
        .filter_map(|v| v.and_then(value_as_text))
        .collect()
}

/// Truncate an ISO date or timestamp to the first day of its month.
fn parse_month(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10)?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    date.with_day(1)
}
