use crate::ingest::error::{ExtractError, ExtractStage};
use crate::ingest::extract::read_raw_table;
use crate::ingest::types::{normalize_ticker, FieldValue, RawTable, SourceRow, SourceTable};
use crate::normalize::{parse_flag, parse_localized, parse_plain, Magnitude};
use crate::time::parse_naive_timestamp;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FundType,
    Segment,
    Price,
    PriceToBookRatio,
    DividendYield12m,
    DailyLiquidity,
    PropertiesCount,
    VacancyRate,
    Variation12m,
    MarketCap,
    SharesOutstanding,
    BookValue,
    ShareholdersCount,
    LastDistribution,
    ManagementFee,
    ManagementType,
    TargetAudience,
    DataObtained,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    Number,
    LocalizedNumber,
    Text,
    Flag,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub raw: String,
    pub field: Field,
    pub format: ValueFormat,
    #[serde(default)]
    pub magnitude: Option<Magnitude>,
}

impl ColumnMapping {
    pub fn new(raw: &str, field: Field, format: ValueFormat) -> Self {
        Self {
            raw: raw.to_string(),
            field,
            format,
            magnitude: None,
        }
    }

    pub fn parse(&self, cell: &str) -> FieldValue {
        match self.format {
            ValueFormat::Number => FieldValue::Number(parse_plain(cell, self.magnitude)),
            ValueFormat::LocalizedNumber => {
                FieldValue::Number(parse_localized(cell, self.magnitude))
            }
            ValueFormat::Text => FieldValue::Text(cell.trim().to_string()),
            ValueFormat::Flag => FieldValue::Flag(parse_flag(cell)),
            ValueFormat::Timestamp => FieldValue::Timestamp(parse_naive_timestamp(cell)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSchema {
    pub name: String,
    pub version: u32,
    pub key_column: String,
    pub columns: Vec<ColumnMapping>,
}

impl SourceSchema {
    pub fn investidor10() -> Self {
        use Field::*;
        use ValueFormat::*;
        Self {
            name: "investidor10".to_string(),
            version: 2,
            key_column: "Ticker".to_string(),
            columns: vec![
                ColumnMapping::new("P/VP", PriceToBookRatio, Number),
                ColumnMapping::new("Dividend Yield", DividendYield12m, Number),
                ColumnMapping::new("Tipo", FundType, Text),
                ColumnMapping::new("Dados Obtidos", DataObtained, Flag),
                ColumnMapping::new("Cotação", Price, Number),
                ColumnMapping::new("Liquidez Diária", DailyLiquidity, Number),
                ColumnMapping::new("Variação 12M", Variation12m, Number),
                ColumnMapping::new("Público Alvo", TargetAudience, Text),
                ColumnMapping::new("Segmento", Segment, Text),
                ColumnMapping::new("Tipo de Gestão", ManagementType, Text),
                ColumnMapping::new("Taxa de Administração", ManagementFee, Text),
                ColumnMapping::new("Vacância", VacancyRate, Number),
                ColumnMapping::new("Número de Cotistas", ShareholdersCount, Number),
                ColumnMapping::new("Cotas Emitidas", SharesOutstanding, Number),
                ColumnMapping::new("Valor Patrimonial", BookValue, Number),
                ColumnMapping::new("Último Rendimento", LastDistribution, Number),
                ColumnMapping::new("Qtd de imóveis", PropertiesCount, Number),
                ColumnMapping::new("Valor de Mercado", MarketCap, Number),
                ColumnMapping::new("Data Atualização", UpdatedAt, Timestamp),
            ],
        }
    }

    pub fn fundamentus() -> Self {
        use Field::*;
        use ValueFormat::*;
        Self {
            name: "fundamentus".to_string(),
            version: 1,
            key_column: "Papel".to_string(),
            columns: vec![
                ColumnMapping::new("Qtd de imóveis", PropertiesCount, Number),
                ColumnMapping::new("Valor de Mercado", MarketCap, Number),
                ColumnMapping::new("Data Atualização", UpdatedAt, Timestamp),
            ],
        }
    }

    pub fn ward() -> Self {
        Self {
            name: "ward".to_string(),
            version: 1,
            key_column: "Ticker".to_string(),
            columns: vec![
                ColumnMapping::new("Segmento", Field::Segment, ValueFormat::Text),
                ColumnMapping::new("Data Atualização", Field::UpdatedAt, ValueFormat::Timestamp),
            ],
        }
    }

    pub fn apply(&self, raw: &RawTable, path: &Path) -> Result<SourceTable, ExtractError> {
        let key_idx = raw.column_index(&self.key_column).ok_or_else(|| {
            ExtractError::new(
                &self.name,
                path,
                ExtractStage::Schema,
                format!("key column {:?} not found", self.key_column),
            )
        })?;

        let mut present = Vec::with_capacity(self.columns.len());
        for mapping in &self.columns {
            match raw.column_index(&mapping.raw) {
                Some(idx) => present.push((idx, mapping)),
                None => tracing::debug!(
                    source = %self.name,
                    column = %mapping.raw,
                    "mapped column missing from extract; skipping"
                ),
            }
        }

        let mut table = SourceTable::new(&self.name);
        let mut duplicates: usize = 0;
        for cells in raw.rows() {
            let ticker = normalize_ticker(cells.get(key_idx).map(String::as_str).unwrap_or(""));
            if ticker.is_empty() {
                continue;
            }

            let mut row = SourceRow::new(ticker);
            for (idx, mapping) in &present {
                let cell = cells.get(*idx).map(String::as_str).unwrap_or("");
                row.values.insert(mapping.field, mapping.parse(cell));
            }

            if !table.push(row) {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            tracing::warn!(
                source = %self.name,
                duplicates,
                "duplicate tickers in extract; kept first occurrence"
            );
        }

        Ok(table)
    }

    pub fn load(&self, path: &Path) -> Result<SourceTable, ExtractError> {
        let raw = read_raw_table(&self.name, path)?;
        let table = self.apply(&raw, path)?;
        tracing::info!(
            source = %self.name,
            schema_version = self.version,
            rows = table.len(),
            path = %path.display(),
            "loaded source extract"
        );
        Ok(table)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSet {
    pub primary: SourceSchema,
    pub secondary: SourceSchema,
    pub segment_override: SourceSchema,
}

impl Default for SchemaSet {
    fn default() -> Self {
        Self {
            primary: SourceSchema::investidor10(),
            secondary: SourceSchema::fundamentus(),
            segment_override: SourceSchema::ward(),
        }
    }
}

impl SchemaSet {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("schema file {} is not a valid schema set", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::extract::parse_csv_text;
    use serde_json::json;

    fn apply(schema: &SourceSchema, csv: &str) -> Result<SourceTable, ExtractError> {
        let raw = parse_csv_text(csv).unwrap();
        schema.apply(&raw, Path::new("mem.csv"))
    }

    #[test]
    fn renames_source_key_to_ticker() {
        let t = apply(
            &SourceSchema::fundamentus(),
            "Papel,Segmento,Qtd de imóveis,Valor de Mercado\nhglg11,Logística,12,997230000.0\n",
        )
        .unwrap();
        let row = t.get("HGLG11").unwrap();
        assert_eq!(row.number(Field::PropertiesCount), Some(12.0));
        assert_eq!(row.number(Field::MarketCap), Some(997_230_000.0));
    }

    #[test]
    fn missing_key_column_is_malformed() {
        let err = apply(&SourceSchema::ward(), "Codigo,Segmento\nHGLG11,Logística\n").unwrap_err();
        assert_eq!(err.stage, ExtractStage::Schema);
    }

    #[test]
    fn keeps_first_duplicate_and_skips_blank_tickers() {
        let t = apply(
            &SourceSchema::ward(),
            "Ticker,Segmento\nHGLG11,Logística\n,Shoppings\nHGLG11,Shoppings\n",
        )
        .unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("HGLG11").unwrap().text(Field::Segment), Some("Logística"));
    }

    #[test]
    fn localized_columns_use_pt_br_rules() {
        let schema = SourceSchema {
            name: "raw_site".to_string(),
            version: 1,
            key_column: "Ticker".to_string(),
            columns: vec![
                ColumnMapping::new("DY", Field::DividendYield12m, ValueFormat::LocalizedNumber),
                ColumnMapping::new("VP", Field::BookValue, ValueFormat::LocalizedNumber),
            ],
        };
        let t = apply(&schema, "Ticker,DY,VP\nHGLG11,\"7,23%\",\"997,23 Milhões\"\n").unwrap();
        let row = t.get("HGLG11").unwrap();
        assert_eq!(row.number(Field::DividendYield12m), Some(7.23));
        assert_eq!(row.number(Field::BookValue), Some(997_230_000.0));
    }

    #[test]
    fn schema_set_deserializes_from_json() {
        let v = json!({
            "primary": {
                "name": "investidor10",
                "version": 3,
                "key_column": "Ticker",
                "columns": [
                    {"raw": "Preço", "field": "price", "format": "localized_number"},
                    {"raw": "VP", "field": "book_value", "format": "number", "magnitude": "million"}
                ]
            },
            "secondary": {"name": "fundamentus", "version": 1, "key_column": "Papel", "columns": []},
            "segment_override": {"name": "ward", "version": 1, "key_column": "Ticker", "columns": []}
        });
        let set: SchemaSet = serde_json::from_value(v).unwrap();
        assert_eq!(set.primary.version, 3);
        assert_eq!(set.primary.columns[1].magnitude, Some(Magnitude::Million));
    }
}
