//! Naive constant forecast: every future period equals the historical mean.

use serde::{Deserialize, Serialize};

use crate::aggregate::{round2, sum_by_month};
use crate::category::CategoryAxis;
use crate::transaction::Transaction;

pub const DEFAULT_HORIZON: usize = 3;

/// One projected period, labelled relative to the last observed one (`M+1`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub period_label: String,
    pub predicted_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryForecast {
    pub category: String,
    /// Empty when the category has no history.
    pub points: Vec<Forecast>,
}

/// Project `horizon` periods from a series of period totals.
///
/// An empty series yields an empty forecast.
pub fn forecast(period_totals: &[f64], horizon: usize) -> Vec<Forecast> {
    if period_totals.is_empty() {
        return Vec::new();
    }

    let mean = period_totals.iter().sum::<f64>() / period_totals.len() as f64;
    let predicted = round2(mean);

    (1..=horizon)
        .map(|i| Forecast {
            period_label: format!("M+{i}"),
            predicted_amount: predicted,
        })
        .collect()
}

/// Forecast each axis category from its own monthly series.
pub fn forecast_by_category(
    transactions: &[Transaction],
    axis: &CategoryAxis,
    horizon: usize,
) -> Vec<CategoryForecast> {
    axis.iter()
        .map(|label| {
            let in_category: Vec<Transaction> = transactions
                .iter()
                .filter(|tx| tx.category.is(label))
                .cloned()
                .collect();
            let series: Vec<f64> = sum_by_month(&in_category)
                .into_iter()
                .map(|m| m.total)
                .collect();

            CategoryForecast {
                category: label.to_string(),
                points: forecast(&series, horizon),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_series() {
        assert!(forecast(&[], DEFAULT_HORIZON).is_empty());
    }

    #[test]
    fn test_constant_mean() {
        let points = forecast(&[100.0, 200.0, 300.0], 3);
        assert_eq!(
            points,
            vec![
                Forecast { period_label: "M+1".into(), predicted_amount: 200.0 },
                Forecast { period_label: "M+2".into(), predicted_amount: 200.0 },
                Forecast { period_label: "M+3".into(), predicted_amount: 200.0 },
            ]
        );
    }

    #[test]
    fn test_rounds_to_cents() {
        let points = forecast(&[10.0, 10.0, 10.01], 1);
        assert_eq!(points[0].predicted_amount, 10.0);
        let points = forecast(&[1.0, 2.0, 2.0], 2);
        assert_eq!(points[1].predicted_amount, 1.67);
        assert_eq!(points[1].period_label, "M+2");
    }

    #[test]
    fn test_zero_horizon() {
        assert!(forecast(&[5.0], 0).is_empty());
    }

    #[test]
    fn test_by_category() {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let txns = vec![
            Transaction::new("", d(1), -100.0, Category::known("Loyer"), Category::Unknown, "u"),
            Transaction::new("", d(2), -300.0, Category::known("Loyer"), Category::Unknown, "u"),
            Transaction::new("", d(2), -20.0, Category::known("Courses"), Category::Unknown, "u"),
        ];
        let axis = CategoryAxis::new(["Loyer", "Courses", "Santé"]);
        let by_cat = forecast_by_category(&txns, &axis, 2);

        assert_eq!(by_cat.len(), 3);
        assert_eq!(by_cat[0].category, "Loyer");
        assert_eq!(by_cat[0].points.len(), 2);
        assert_eq!(by_cat[0].points[0].predicted_amount, -200.0);
        assert_eq!(by_cat[1].points[0].predicted_amount, -20.0);
        assert!(by_cat[2].points.is_empty());
    }
}
