use crate::domain::FundRecord;
use crate::reconcile::derived::{computed_market_cap, last_yield, RankWeights};
use crate::reconcile::merger::MergedFund;
use crate::time::ZoneSettings;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FundTable {
    records: Vec<FundRecord>,
}

impl FundTable {
    pub fn assemble(merged: Vec<MergedFund>, zones: &ZoneSettings, weights: RankWeights) -> Self {
        let mut records: Vec<FundRecord> = merged
            .into_iter()
            .map(|m| to_record(m, zones))
            .collect();

        records.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        let dy: Vec<f64> = records.iter().map(|r| r.dividend_yield_12m).collect();
        let pvp: Vec<f64> = records.iter().map(|r| r.price_to_book_ratio).collect();
        for (record, score) in records.iter_mut().zip(weights.scores(&dy, &pvp)) {
            record.rank_score = score;
        }

        // `sort_by` is stable, so the ticker order survives among equal scores.
        records.sort_by(|a, b| a.rank_score.total_cmp(&b.rank_score));

        Self { records }
    }

    pub fn get(&self, ticker: &str) -> Option<&FundRecord> {
        let ticker = ticker.trim();
        self.records
            .iter()
            .find(|r| r.ticker.eq_ignore_ascii_case(ticker))
    }

    pub fn records(&self) -> &[FundRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &FundRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn min_last_updated(&self) -> Option<DateTime<FixedOffset>> {
        self.records.iter().filter_map(|r| r.last_updated).min()
    }
}

fn to_record(m: MergedFund, zones: &ZoneSettings) -> FundRecord {
    let price = m.price.unwrap_or(0.0);
    let last_distribution = m.last_distribution.unwrap_or(0.0);
    let market_cap = computed_market_cap(price, m.shares_outstanding.unwrap_or(0.0))
        .or(m.market_cap)
        .unwrap_or(0.0);

    let last_updated = m.updated_at.and_then(|naive| {
        let localized = zones.localize(naive);
        if localized.is_none() {
            tracing::debug!(ticker = %m.ticker, %naive, "update timestamp falls in a DST gap");
        }
        localized
    });

    FundRecord {
        fund_type: m.fund_type,
        segment: m.segment,
        price,
        price_to_book_ratio: m.price_to_book_ratio.unwrap_or(0.0),
        dividend_yield_12m: m.dividend_yield_12m.unwrap_or(0.0),
        last_distribution,
        last_yield: last_yield(last_distribution, price),
        daily_liquidity: m.daily_liquidity.unwrap_or(0.0),
        properties_count: count(m.properties_count),
        vacancy_rate: m.vacancy_rate.unwrap_or(0.0),
        variation_12m: m.variation_12m.unwrap_or(0.0),
        management_type: m.management_type,
        market_cap,
        book_value: m.book_value.unwrap_or(0.0),
        shareholders_count: count(m.shareholders_count),
        target_audience: m.target_audience,
        management_fee: m.management_fee,
        rank_score: 0.0,
        last_updated,
        ticker: m.ticker,
    }
}

fn count(v: Option<f64>) -> u64 {
    match v {
        Some(v) if v.is_finite() && v > 0.0 => v.round() as u64,
        _ => 0,
    }
}
