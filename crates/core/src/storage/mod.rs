use crate::domain::{CommunicationRecord, FundRecord, MonthlyDividend};
use anyhow::Context;
use std::collections::HashSet;
use std::path::Path;

pub const FUNDS_FILE: &str = "funds.csv";
pub const COMMUNICATIONS_FILE: &str = "communications.csv";
pub const DIVIDENDS_MONTHLY_FILE: &str = "dividends_monthly.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

pub trait CsvRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl CsvRow for FundRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "ticker",
            "fund_type",
            "segment",
            "price",
            "price_to_book_ratio",
            "dividend_yield_12m",
            "last_distribution",
            "last_yield",
            "daily_liquidity",
            "properties_count",
            "vacancy_rate",
            "variation_12m",
            "management_type",
            "market_cap",
            "book_value",
            "shareholders_count",
            "target_audience",
            "management_fee",
            "rank_score",
            "last_updated",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.ticker.clone(),
            self.fund_type.to_string(),
            self.segment.clone(),
            self.price.to_string(),
            self.price_to_book_ratio.to_string(),
            self.dividend_yield_12m.to_string(),
            self.last_distribution.to_string(),
            self.last_yield.to_string(),
            self.daily_liquidity.to_string(),
            self.properties_count.to_string(),
            self.vacancy_rate.to_string(),
            self.variation_12m.to_string(),
            self.management_type.clone(),
            self.market_cap.to_string(),
            self.book_value.to_string(),
            self.shareholders_count.to_string(),
            self.target_audience.clone(),
            self.management_fee.clone(),
            self.rank_score.to_string(),
            self.last_updated.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ]
    }
}

impl CsvRow for CommunicationRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "ticker",
            "cnpj",
            "category",
            "type",
            "reference_date",
            "reference_month",
            "delivery_timestamp",
            "status",
            "version",
            "read_key",
            "last_updated",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.ticker.clone(),
            self.cnpj.clone(),
            self.category.clone(),
            self.kind.clone(),
            self.reference_date_display(),
            self.reference_month.clone(),
            self.delivery_display(),
            self.status.to_string(),
            self.version.to_string(),
            self.read_key(),
            self.last_updated.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ]
    }
}

impl CsvRow for MonthlyDividend {
    fn headers() -> &'static [&'static str] {
        &["ticker", "year_month", "month_year", "value"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.ticker.clone(),
            self.year_month.clone(),
            self.month_year.clone(),
            self.value.to_string(),
        ]
    }
}

pub fn write_csv<'a, R, I>(path: &Path, rows: I, mode: WriteMode) -> anyhow::Result<usize>
where
    R: CsvRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let headers: Vec<String> = R::headers().iter().map(|h| h.to_string()).collect();
    let mut out: Vec<Vec<String>> = Vec::new();

    if mode == WriteMode::Append && path.exists() {
        out = read_existing(path, &headers)?;
    }
    out.extend(rows.into_iter().map(|r| r.cells()));

    if mode == WriteMode::Append {
        out = dedupe_keep_last(out);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output folder {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {} for writing", path.display()))?;
    writer.write_record(&headers)?;
    for row in &out {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = out.len(), ?mode, "wrote csv");
    Ok(out.len())
}

fn read_existing(path: &Path, headers: &[String]) -> anyhow::Result<Vec<Vec<String>>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {} for append", path.display()))?;
    let existing: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    anyhow::ensure!(
        existing == headers,
        "cannot append to {}: header does not match",
        path.display()
    );

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("malformed row in {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn dedupe_keep_last(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Vec<String>> = rows
        .into_iter()
        .rev()
        .filter(|r| seen.insert(r.clone()))
        .collect();
    kept.reverse();
    kept
}
