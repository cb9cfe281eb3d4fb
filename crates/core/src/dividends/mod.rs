use crate::domain::MonthlyDividend;
use crate::ingest::extract::read_raw_table;
use crate::ingest::types::normalize_ticker;
use crate::ingest::{ExtractError, ExtractStage, RawTable};
use crate::normalize::parse_plain;
use crate::time::parse_naive_timestamp;
use chrono::Datelike;
use std::collections::BTreeMap;
use std::path::Path;

const SOURCE_NAME: &str = "dividends";

pub fn load_monthly(path: &Path) -> Result<Vec<MonthlyDividend>, ExtractError> {
    let raw = match read_raw_table(SOURCE_NAME, path) {
        Ok(raw) => raw,
        Err(e) if e.is_missing_file() || e.stage == ExtractStage::Header => {
            tracing::info!(path = %path.display(), "no dividend history extract; using empty table");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let monthly = aggregate_monthly(&raw);
    tracing::info!(
        source = SOURCE_NAME,
        payments = raw.len(),
        months = monthly.len(),
        "aggregated dividend history"
    );
    Ok(monthly)
}

pub fn aggregate_monthly(raw: &RawTable) -> Vec<MonthlyDividend> {
    let mut sums: BTreeMap<(String, i32, u32), f64> = BTreeMap::new();

    for row in 0..raw.len() {
        let ticker = normalize_ticker(raw.cell(row, "Ticker").unwrap_or(""));
        let Some(com_date) = raw
            .cell(row, "data_com")
            .and_then(parse_naive_timestamp)
            .map(|dt| dt.date())
        else {
            continue;
        };
        if ticker.is_empty() {
            continue;
        }

        let value = raw
            .cell(row, "valor")
            .and_then(|v| parse_plain(v, None))
            .unwrap_or(0.0);
        *sums
            .entry((ticker, com_date.year(), com_date.month()))
            .or_insert(0.0) += value;
    }

    sums.into_iter()
        .map(|((ticker, year, month), value)| MonthlyDividend {
            ticker,
            year_month: format!("{year:04}-{month:02}"),
            month_year: format!("{month:02}/{year:04}"),
            value,
        })
        .collect()
}

pub fn for_ticker<'a>(rows: &'a [MonthlyDividend], ticker: &str) -> Vec<&'a MonthlyDividend> {
    let ticker = normalize_ticker(ticker);
    rows.iter().filter(|d| d.ticker == ticker).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::extract::parse_csv_text;

    #[test]
    fn sums_payments_per_month() {
        let raw = parse_csv_text(concat!(
            "Ticker,tipo,data_com,pagamento,valor,Data Atualização\n",
            "HGLG11,Dividendos,2024-01-31,2024-02-14,1.10,2024-02-20 08:00:00\n",
            "HGLG11,Amortização,2024-01-15,2024-02-14,0.25,2024-02-20 08:00:00\n",
            "HGLG11,Dividendos,2024-02-29,2024-03-14,1.10,2024-02-20 08:00:00\n",
            "ALZR11,Dividendos,2023-12-29,2024-01-12,0.80,2024-02-20 08:00:00\n",
            "ALZR11,Dividendos,,2024-01-12,0.80,2024-02-20 08:00:00\n",
        ))
        .unwrap();

        let monthly = aggregate_monthly(&raw);
        let keys: Vec<_> = monthly
            .iter()
            .map(|m| (m.ticker.as_str(), m.year_month.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("ALZR11", "2023-12"), ("HGLG11", "2024-01"), ("HGLG11", "2024-02")]
        );
        assert!((monthly[1].value - 1.35).abs() < 1e-9);
        assert_eq!(monthly[1].month_year, "01/2024");
    }

    #[test]
    fn missing_file_is_empty_history() {
        let rows = load_monthly(Path::new("/definitely/not/here.csv")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn filters_one_ticker() {
        let rows = vec![
            MonthlyDividend {
                ticker: "HGLG11".to_string(),
                year_month: "2024-01".to_string(),
                month_year: "01/2024".to_string(),
                value: 1.1,
            },
            MonthlyDividend {
                ticker: "ALZR11".to_string(),
                year_month: "2024-01".to_string(),
                month_year: "01/2024".to_string(),
                value: 0.8,
            },
        ];
        assert_eq!(for_ticker(&rows, "alzr11").len(), 1);
    }
}
