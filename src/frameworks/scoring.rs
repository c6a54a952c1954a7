//! Derived numbers: quality score, budget estimate and score banding.

use serde::{Deserialize, Serialize};

use super::AnalysisMetrics;

const BUDGET_FLOOR: f64 = 50_000.0;
const BUDGET_SPAN: f64 = 150_000.0;
const BUDGET_CEILING: u64 = 199_999;
const DEFAULT_TIMELINE: &str = "100 days";

/// Share of the total per cost category. Sums to 1.0.
pub const BUDGET_RATIOS: BudgetRatios = BudgetRatios {
    development: 0.4,
    marketing: 0.3,
    operations: 0.2,
    legal: 0.1,
};

#[derive(Debug, Clone, Copy)]
pub struct BudgetRatios {
    pub development: f64,
    pub marketing: f64,
    pub operations: f64,
    pub legal: f64,
}

/// Weighted viability score rounded to one decimal.
pub fn quality_score(metrics: &AnalysisMetrics) -> f64 {
    let raw = metrics.desirability * 0.3
        + metrics.viability * 0.3
        + metrics.feasibility * 0.25
        + metrics.sustainability * 0.15;
    (raw * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub development: u64,
    pub marketing: u64,
    pub operations: u64,
    pub legal: u64,
}

impl BudgetBreakdown {
    pub fn sum(&self) -> u64 {
        self.development + self.marketing + self.operations + self.legal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEstimate {
    pub total: u64,
    pub breakdown: BudgetBreakdown,
    pub timeline: String,
}

impl BudgetEstimate {
    /// Budget for a uniform sample `unit` in [0, 1).
    ///
    /// The figure is unrelated to the analysis content. Each category is
    /// rounded on its own, so the breakdown may miss the total by a few units.
    pub fn from_unit(unit: f64) -> Self {
        let unit = unit.clamp(0.0, 1.0);
        let total = ((BUDGET_FLOOR + unit * BUDGET_SPAN).round() as u64).min(BUDGET_CEILING);
        let share = |ratio: f64| (total as f64 * ratio).round() as u64;
        Self {
            total,
            breakdown: BudgetBreakdown {
                development: share(BUDGET_RATIOS.development),
                marketing: share(BUDGET_RATIOS.marketing),
                operations: share(BUDGET_RATIOS.operations),
                legal: share(BUDGET_RATIOS.legal),
            },
            timeline: DEFAULT_TIMELINE.to_string(),
        }
    }

    /// Percentage of the total, one decimal, as shown in reports.
    pub fn percent_of_total(&self, amount: u64) -> String {
        if self.total == 0 {
            return "0.0".to_string();
        }
        format!("{:.1}", amount as f64 / self.total as f64 * 100.0)
    }
}

/// Three-way rating of any 1-10 score. Every surface that colours a score
/// goes through [`ScoreBand::for_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Success,
    Warning,
    Danger,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBand::Success
        } else if score >= 6.0 {
            ScoreBand::Warning
        } else {
            ScoreBand::Danger
        }
    }

    /// Utility class used by the dashboard.
    pub fn ui_class(&self) -> &'static str {
        match self {
            ScoreBand::Success => "text-green-500",
            ScoreBand::Warning => "text-yellow-500",
            ScoreBand::Danger => "text-red-500",
        }
    }
}

/// Group digits in threes: `125000` -> `125,000`.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a score the way it is displayed (`7`, `7.5`).
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(d: f64, v: f64, f: f64, s: f64) -> AnalysisMetrics {
        AnalysisMetrics {
            desirability: d,
            viability: v,
            feasibility: f,
            sustainability: s,
        }
    }

    #[test]
    fn quality_score_is_weighted_and_rounded() {
        assert_eq!(quality_score(&metrics(8.0, 7.0, 6.0, 8.0)), 7.2);
        assert_eq!(quality_score(&metrics(7.0, 7.0, 7.0, 7.0)), 7.0);
        assert_eq!(quality_score(&metrics(9.0, 8.0, 8.0, 6.0)), 8.0);
    }

    #[test]
    fn quality_score_stays_in_range_over_grid() {
        let steps = [1.0, 2.5, 4.0, 5.5, 7.0, 8.5, 10.0];
        for d in steps {
            for v in steps {
                for f in steps {
                    for s in steps {
                        let q = quality_score(&metrics(d, v, f, s));
                        assert!((1.0..=10.0).contains(&q), "{q} out of range");
                    }
                }
            }
        }
        assert_eq!(quality_score(&metrics(1.0, 1.0, 1.0, 1.0)), 1.0);
        assert_eq!(quality_score(&metrics(10.0, 10.0, 10.0, 10.0)), 10.0);
    }

    #[test]
    fn ratios_sum_to_one() {
        let r = BUDGET_RATIOS;
        let sum = r.development + r.marketing + r.operations + r.legal;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn budget_components_follow_ratios_with_rounding_slack() {
        for i in 0..1000 {
            let unit = i as f64 / 1000.0;
            let budget = BudgetEstimate::from_unit(unit);
            assert!((50_000..200_000).contains(&budget.total));
            let t = budget.total as f64;
            assert_eq!(budget.breakdown.development, (t * 0.4).round() as u64);
            assert_eq!(budget.breakdown.marketing, (t * 0.3).round() as u64);
            assert_eq!(budget.breakdown.operations, (t * 0.2).round() as u64);
            assert_eq!(budget.breakdown.legal, (t * 0.1).round() as u64);
            assert!(budget.breakdown.sum().abs_diff(budget.total) <= 3);
            assert_eq!(budget.timeline, "100 days");
        }
    }

    #[test]
    fn budget_upper_edge_stays_below_ceiling() {
        let budget = BudgetEstimate::from_unit(0.999_999_999);
        assert_eq!(budget.total, 199_999);
        assert_eq!(BudgetEstimate::from_unit(0.0).total, 50_000);
    }

    #[test]
    fn score_bands_use_eight_and_six_thresholds() {
        assert_eq!(ScoreBand::for_score(9.0), ScoreBand::Success);
        assert_eq!(ScoreBand::for_score(8.0), ScoreBand::Success);
        assert_eq!(ScoreBand::for_score(7.0), ScoreBand::Warning);
        assert_eq!(ScoreBand::for_score(6.0), ScoreBand::Warning);
        assert_eq!(ScoreBand::for_score(5.9), ScoreBand::Danger);
        assert_eq!(ScoreBand::for_score(4.0), ScoreBand::Danger);
    }

    #[test]
    fn thousands_and_scores_format_for_display() {
        assert_eq!(format_thousands(125_000), "125,000");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_score(7.0), "7");
        assert_eq!(format_score(7.4), "7.4");
    }

    #[test]
    fn percent_of_total_has_one_decimal() {
        let budget = BudgetEstimate::from_unit(0.5);
        assert_eq!(budget.total, 125_000);
        assert_eq!(budget.percent_of_total(budget.breakdown.development), "40.0");
    }
}
