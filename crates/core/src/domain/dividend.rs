use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDividend {
    pub ticker: String,
    pub year_month: String,
    pub month_year: String,
    pub value: f64,
}
