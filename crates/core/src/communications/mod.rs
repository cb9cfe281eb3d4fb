use crate::domain::{CommunicationRecord, CommunicationStatus};
use crate::ingest::extract::read_raw_table;
use crate::ingest::types::normalize_ticker;
use crate::ingest::{ExtractError, ExtractStage, RawTable};
use crate::normalize::parse_plain;
use crate::time::{
    end_of_month, month_name_pt, parse_naive_date, parse_naive_timestamp, ZoneSettings,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use std::path::Path;

const SOURCE_NAME: &str = "communications";
const MISSING_TEXT: &str = "-";

const COL_TICKER: &str = "Ticker";
const COL_CNPJ: &str = "CNPJ";
const COL_CATEGORY: &str = "Categoria";
const COL_KIND: &str = "Tipo";
const COL_REFERENCE: &str = "Data de Referência";
const COL_DELIVERY: &str = "Data de Entrega";
const COL_STATUS: &str = "Status";
const COL_VERSION: &str = "Versão";
const COL_UPDATED_AT: &str = "Data Atualização";

pub fn parse_reference_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    if let Some((month, year)) = t.split_once('/') {
        let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if month.len() == 2 && year.len() == 4 && digits(month) && digits(year) {
            return end_of_month(year.parse().ok()?, month.parse().ok()?);
        }
    }
    parse_naive_date(t).or_else(|| parse_naive_timestamp(t).map(|dt| dt.date()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommunicationTable {
    records: Vec<CommunicationRecord>,
}

impl CommunicationTable {
    pub fn load(path: &Path, zones: &ZoneSettings) -> Result<Self, ExtractError> {
        let raw = read_raw_table(SOURCE_NAME, path)?;
        let table = Self::from_raw(&raw, path, zones)?;
        tracing::info!(
            source = SOURCE_NAME,
            rows = table.len(),
            path = %path.display(),
            "loaded communications"
        );
        Ok(table)
    }

    pub fn from_raw(raw: &RawTable, path: &Path, zones: &ZoneSettings) -> Result<Self, ExtractError> {
        for required in [COL_TICKER, COL_REFERENCE, COL_DELIVERY] {
            if raw.column_index(required).is_none() {
                return Err(ExtractError::new(
                    SOURCE_NAME,
                    path,
                    ExtractStage::Schema,
                    format!("required column {required:?} not found"),
                ));
            }
        }

        let mut records = Vec::with_capacity(raw.len());
        let mut skipped: usize = 0;
        for row in 0..raw.len() {
            let cell = |col: &str| raw.cell(row, col).unwrap_or("").trim();
            let text = |col: &str| {
                let v = cell(col);
                (if v.is_empty() { MISSING_TEXT } else { v }).to_string()
            };

            let ticker = normalize_ticker(cell(COL_TICKER));
            let reference = parse_reference_date(cell(COL_REFERENCE));
            let delivery = parse_naive_timestamp(cell(COL_DELIVERY));

            let (Some(reference_date), Some(delivery_timestamp)) = (reference, delivery) else {
                tracing::debug!(
                    row,
                    ticker = %ticker,
                    reference = cell(COL_REFERENCE),
                    delivery = cell(COL_DELIVERY),
                    "skipping filing with unparseable dates"
                );
                skipped += 1;
                continue;
            };
            if ticker.is_empty() {
                skipped += 1;
                continue;
            }

            records.push(CommunicationRecord {
                ticker,
                cnpj: text(COL_CNPJ),
                category: text(COL_CATEGORY),
                kind: text(COL_KIND),
                reference_date,
                reference_month: month_name_pt(reference_date).to_string(),
                delivery_timestamp,
                status: CommunicationStatus::parse(&text(COL_STATUS)),
                version: parse_plain(cell(COL_VERSION), None)
                    .filter(|v| v.is_finite())
                    .map(|v| v as i64)
                    .unwrap_or(0),
                last_updated: zones.localize_raw(cell(COL_UPDATED_AT)),
            });
        }

        if skipped > 0 {
            tracing::warn!(
                source = SOURCE_NAME,
                skipped,
                kept = records.len(),
                "filings dropped for missing ticker or unparseable dates"
            );
        }

        records.sort_by(|a, b| {
            a.ticker
                .cmp(&b.ticker)
                .then_with(|| b.delivery_timestamp.cmp(&a.delivery_timestamp))
                .then_with(|| b.version.cmp(&a.version))
        });

        Ok(Self { records })
    }

    pub fn records(&self) -> &[CommunicationRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommunicationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_ticker(&self, ticker: &str) -> Vec<&CommunicationRecord> {
        let ticker = normalize_ticker(ticker);
        self.records.iter().filter(|r| r.ticker == ticker).collect()
    }

    pub fn min_last_updated(&self) -> Option<DateTime<FixedOffset>> {
        self.records.iter().filter_map(|r| r.last_updated).min()
    }
}
