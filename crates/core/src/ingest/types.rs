use crate::ingest::schema::Field;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(Option<f64>),
    Text(String),
    Flag(bool),
    Timestamp(Option<NaiveDateTime>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceRow {
    pub ticker: String,
    pub values: BTreeMap<Field, FieldValue>,
}

impl SourceRow {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.values.insert(field, value);
        self
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        match self.values.get(&field) {
            Some(FieldValue::Number(v)) => *v,
            _ => None,
        }
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn flag(&self, field: Field) -> Option<bool> {
        match self.values.get(&field) {
            Some(FieldValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn timestamp(&self, field: Field) -> Option<NaiveDateTime> {
        match self.values.get(&field) {
            Some(FieldValue::Timestamp(t)) => *t,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub source_name: String,
    rows: Vec<SourceRow>,
    index: BTreeMap<String, usize>,
}

impl SourceTable {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            rows: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, row: SourceRow) -> bool {
        if self.index.contains_key(&row.ticker) {
            return false;
        }
        self.index.insert(row.ticker.clone(), self.rows.len());
        self.rows.push(row);
        true
    }

    pub fn get(&self, ticker: &str) -> Option<&SourceRow> {
        self.index.get(ticker).map(|&i| &self.rows[i])
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}
