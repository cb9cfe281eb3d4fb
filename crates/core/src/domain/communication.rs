use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub const REFERENCE_DATE_FORMAT: &str = "%Y/%m/%d";
pub const DELIVERY_FORMAT: &str = "%Y/%m/%d %Hh%Mmin";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommunicationStatus {
    Active,
    Inactive,
    Cancelled,
    Other(String),
}

impl CommunicationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Ativo" | "Active" => CommunicationStatus::Active,
            "Inativo" | "Inactive" => CommunicationStatus::Inactive,
            "Cancelado" | "Cancelled" => CommunicationStatus::Cancelled,
            other => CommunicationStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CommunicationStatus::Active => "Ativo",
            CommunicationStatus::Inactive => "Inativo",
            CommunicationStatus::Cancelled => "Cancelado",
            CommunicationStatus::Other(s) => s,
        }
    }

    pub fn is_flagged(&self) -> bool {
        matches!(
            self,
            CommunicationStatus::Inactive | CommunicationStatus::Cancelled
        )
    }
}

impl fmt::Display for CommunicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for CommunicationStatus {
    fn from(s: String) -> Self {
        CommunicationStatus::parse(&s)
    }
}

impl From<CommunicationStatus> for String {
    fn from(s: CommunicationStatus) -> Self {
        s.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationRecord {
    pub ticker: String,
    pub cnpj: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub reference_date: NaiveDate,
    pub reference_month: String,
    pub delivery_timestamp: NaiveDateTime,
    pub status: CommunicationStatus,
    pub version: i64,
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl CommunicationRecord {
    pub fn read_key(&self) -> String {
        read_key(&self.ticker, self.delivery_timestamp, self.version)
    }

    pub fn legacy_id(&self) -> String {
        let raw = format!(
            "{}_{}_{}",
            self.ticker,
            self.delivery_timestamp.format(DELIVERY_FORMAT),
            self.version
        );
        raw.chars()
            .filter(|c| !matches!(c, '/' | ':' | ' '))
            .collect()
    }

    pub fn reference_date_display(&self) -> String {
        self.reference_date.format(REFERENCE_DATE_FORMAT).to_string()
    }

    pub fn delivery_display(&self) -> String {
        self.delivery_timestamp.format(DELIVERY_FORMAT).to_string()
    }
}

pub fn read_key(ticker: &str, delivery: NaiveDateTime, version: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ticker.trim().to_uppercase().as_bytes());
    hasher.update([0x1f]);
    hasher.update(delivery.format("%Y-%m-%dT%H:%M:%S").to_string().as_bytes());
    hasher.update([0x1f]);
    hasher.update(version.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
