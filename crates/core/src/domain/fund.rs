use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FundType {
    Tijolo,
    Papel,
    Desenvolvimento,
    Fundos,
    Misto,
    Outro,
    Unmapped(String),
}

impl FundType {
    pub const ALL: [FundType; 6] = [
        FundType::Tijolo,
        FundType::Papel,
        FundType::Desenvolvimento,
        FundType::Fundos,
        FundType::Misto,
        FundType::Outro,
    ];

    pub fn label(&self) -> &str {
        match self {
            FundType::Tijolo => "Fundo de Tijolo",
            FundType::Papel => "Fundo de Papel",
            FundType::Desenvolvimento => "Fundo de Desenvolvimento",
            FundType::Fundos => "Fundo de Fundos",
            FundType::Misto => "Fundo Misto",
            FundType::Outro => "Outro",
            FundType::Unmapped(s) => s,
        }
    }

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or_else(|| FundType::Unmapped(label.to_string()))
    }
}

impl fmt::Display for FundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for FundType {
    fn from(s: String) -> Self {
        FundType::from_label(&s)
    }
}

impl From<FundType> for String {
    fn from(t: FundType) -> Self {
        t.label().to_string()
    }
}

/// Percent fields are on the 0-100 scale. Metrics a source did not provide are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    pub ticker: String,
    pub fund_type: FundType,
    pub segment: String,
    pub price: f64,
    pub price_to_book_ratio: f64,
    pub dividend_yield_12m: f64,
    pub last_distribution: f64,
    pub last_yield: f64,
    pub daily_liquidity: f64,
    pub properties_count: u64,
    pub vacancy_rate: f64,
    pub variation_12m: f64,
    pub management_type: String,
    pub market_cap: f64,
    pub book_value: f64,
    pub shareholders_count: u64,
    pub target_audience: String,
    pub management_fee: String,
    pub rank_score: f64,
    pub last_updated: Option<DateTime<FixedOffset>>,
}
