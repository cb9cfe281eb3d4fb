use crate::domain::FundType;
use crate::ingest::{Field, SourceRow, SourceTable};
use crate::reconcile::mappings::CategoryMappings;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Null and exactly 0 both fall through. A real zero is only kept when no
    /// other source offers a nonzero value.
    #[default]
    ZeroIsMissing,
    NullOnly,
}

impl FallbackPolicy {
    fn accepts(self, value: f64) -> bool {
        match self {
            FallbackPolicy::ZeroIsMissing => value != 0.0,
            FallbackPolicy::NullOnly => true,
        }
    }
}

pub fn resolve_chain(candidates: &[Option<f64>], policy: FallbackPolicy) -> Option<f64> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| policy.accepts(*v))
        .or_else(|| candidates.iter().flatten().copied().next())
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedFund {
    pub ticker: String,
    pub fund_type: FundType,
    pub segment: String,
    pub price: Option<f64>,
    pub price_to_book_ratio: Option<f64>,
    pub dividend_yield_12m: Option<f64>,
    pub daily_liquidity: Option<f64>,
    pub properties_count: Option<f64>,
    pub vacancy_rate: Option<f64>,
    pub variation_12m: Option<f64>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub book_value: Option<f64>,
    pub shareholders_count: Option<f64>,
    pub last_distribution: Option<f64>,
    pub management_fee: String,
    pub management_type: String,
    pub target_audience: String,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct SourceMerger {
    mappings: CategoryMappings,
    policy: FallbackPolicy,
}

impl SourceMerger {
    pub fn new(mappings: CategoryMappings, policy: FallbackPolicy) -> Self {
        Self { mappings, policy }
    }

    pub fn merge(&self, primary: &SourceTable, secondaries: &[SourceTable]) -> Vec<MergedFund> {
        let mut out = Vec::with_capacity(primary.len());
        let mut excluded: usize = 0;

        for row in primary.rows() {
            if row.flag(Field::DataObtained) != Some(true) {
                excluded += 1;
                continue;
            }

            let mut chain: Vec<&SourceRow> = Vec::with_capacity(1 + secondaries.len());
            chain.push(row);
            chain.extend(secondaries.iter().filter_map(|t| t.get(&row.ticker)));

            out.push(self.merge_row(row, &chain));
        }

        if excluded > 0 {
            tracing::warn!(
                source = %primary.source_name,
                excluded,
                kept = out.len(),
                "funds without primary data excluded from canonical table"
            );
        }

        out
    }

    fn merge_row(&self, primary: &SourceRow, chain: &[&SourceRow]) -> MergedFund {
        let number = |field: Field| -> Option<f64> {
            let candidates: Vec<Option<f64>> = chain.iter().map(|r| r.number(field)).collect();
            resolve_chain(&candidates, self.policy)
        };
        let text = |field: Field| -> String {
            chain
                .iter()
                .filter_map(|r| r.text(field))
                .map(str::trim)
                .find(|s| !s.is_empty())
                .unwrap_or("")
                .to_string()
        };

        let segment = self.resolve_segment(primary, &chain[1..]);
        let mut fund_type = self.mappings.fund_type(&text(Field::FundType));
        if let Some(implied) = self.mappings.type_for_segment(&segment) {
            fund_type = implied.clone();
        }

        let updated_at = chain.iter().filter_map(|r| r.timestamp(Field::UpdatedAt)).min();

        MergedFund {
            ticker: primary.ticker.clone(),
            fund_type,
            segment,
            price: number(Field::Price),
            price_to_book_ratio: number(Field::PriceToBookRatio),
            dividend_yield_12m: number(Field::DividendYield12m),
            daily_liquidity: number(Field::DailyLiquidity),
            properties_count: number(Field::PropertiesCount),
            vacancy_rate: number(Field::VacancyRate),
            variation_12m: number(Field::Variation12m),
            market_cap: number(Field::MarketCap),
            shares_outstanding: number(Field::SharesOutstanding),
            book_value: number(Field::BookValue),
            shareholders_count: number(Field::ShareholdersCount),
            last_distribution: number(Field::LastDistribution),
            management_fee: text(Field::ManagementFee),
            management_type: self.mappings.management_type(&text(Field::ManagementType)),
            target_audience: self.mappings.target_audience(&text(Field::TargetAudience)),
            updated_at,
        }
    }

    fn resolve_segment(&self, primary: &SourceRow, secondaries: &[&SourceRow]) -> String {
        let own = primary.text(Field::Segment).map(str::trim).unwrap_or("");
        let alternate = secondaries
            .iter()
            .filter_map(|r| r.text(Field::Segment))
            .map(str::trim)
            .find(|s| !s.is_empty());

        let chosen = match alternate {
            Some(alt) if own.is_empty() || self.mappings.is_low_confidence(own) => alt,
            _ => own,
        };
        self.mappings.segment(chosen)
    }
}

impl Default for SourceMerger {
    fn default() -> Self {
        Self::new(CategoryMappings::default(), FallbackPolicy::default())
    }
}
