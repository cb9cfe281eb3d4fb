use crate::config::DEFAULT_DY_RANK_WEIGHT;
use std::cmp::Ordering;

pub fn last_yield(last_distribution: f64, price: f64) -> f64 {
    if price == 0.0 {
        return 0.0;
    }
    last_distribution / price * 100.0
}

pub fn computed_market_cap(price: f64, shares_outstanding: f64) -> Option<f64> {
    let product = price * shares_outstanding;
    (product.is_finite() && product != 0.0).then_some(product)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankOrder {
    Descending,
    Ascending,
}

/// 1-based ranks; tied values share the mean of the positions they occupy.
pub fn average_ranks(values: &[f64], order: RankOrder) -> Vec<f64> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| {
        let ord = values[a].total_cmp(&values[b]);
        match order {
            RankOrder::Ascending => ord,
            RankOrder::Descending => ord.reverse(),
        }
    });

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < idx.len() {
        let mut end = start + 1;
        while end < idx.len() && values[idx[end]].total_cmp(&values[idx[start]]) == Ordering::Equal {
            end += 1;
        }
        // Positions start+1 ..= end.
        let mean = (start + 1 + end) as f64 / 2.0;
        for &i in &idx[start..end] {
            ranks[i] = mean;
        }
        start = end;
    }
    ranks
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankWeights {
    pub dividend_yield: f64,
    pub price_to_book: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            dividend_yield: DEFAULT_DY_RANK_WEIGHT,
            price_to_book: 1.0,
        }
    }
}

impl RankWeights {
    pub fn with_dividend_yield(weight: f64) -> Self {
        Self {
            dividend_yield: weight,
            ..Self::default()
        }
    }

    pub fn scores(&self, dividend_yields: &[f64], price_to_book: &[f64]) -> Vec<f64> {
        let dy = average_ranks(dividend_yields, RankOrder::Descending);
        let pvp = average_ranks(price_to_book, RankOrder::Ascending);
        dy.iter()
            .zip(&pvp)
            .map(|(d, p)| d * self.dividend_yield + p * self.price_to_book)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_yield_is_zero_for_zero_price() {
        assert_eq!(last_yield(1.0, 0.0), 0.0);
        assert!((last_yield(0.85, 100.0) - 0.85).abs() < 1e-12);
    }

    #[test]
    fn market_cap_needs_both_factors() {
        assert_eq!(computed_market_cap(100.0, 1000.0), Some(100_000.0));
        assert_eq!(computed_market_cap(100.0, 0.0), None);
        assert_eq!(computed_market_cap(0.0, 1000.0), None);
    }

    #[test]
    fn ties_share_the_average_rank() {
        let ranks = average_ranks(&[10.0, 8.0, 10.0, 5.0], RankOrder::Descending);
        assert_eq!(ranks, vec![1.5, 3.0, 1.5, 4.0]);

        let ranks = average_ranks(&[0.9, 1.1, 0.9], RankOrder::Ascending);
        assert_eq!(ranks, vec![1.5, 3.0, 1.5]);
    }

    #[test]
    fn dividend_yield_rank_carries_its_weight() {
        // A: best yield, worst P/VP. B: the opposite.
        let dy = [12.0, 8.0];
        let pvp = [1.2, 0.8];
        let scores = RankWeights::default().scores(&dy, &pvp);
        assert_eq!(scores, vec![1.0 * 2.0 + 2.0, 2.0 * 2.0 + 1.0]);

        let equal = RankWeights::with_dividend_yield(1.0).scores(&dy, &pvp);
        assert_eq!(equal[0], equal[1]);
    }
}
