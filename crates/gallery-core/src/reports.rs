//! Report models and aggregation math.
//!
//! Repositories return raw grouped aggregates (one row per category, year,
//! status, ...). The builders in this module turn those aggregates into the
//! report DTOs served by the API: they compute grand totals, percentage
//! breakdowns and year-over-year growth so that those rules live in one place
//! and can be tested without a database.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

// ============================================================================
// Math helpers
// ============================================================================

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Splits 100% across `values` proportionally, to two decimals.
///
/// Uses the largest remainder method on hundredths of a percent so the
/// returned percentages add up to exactly 100.00 whenever the total is
/// positive. An empty or zero total yields all zeros.
pub fn percentage_breakdown(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return vec![0.0; values.len()];
    }

    let raw: Vec<f64> = values.iter().map(|v| v / total * 10_000.0).collect();
    let mut hundredths: Vec<i64> = raw.iter().map(|r| r.floor() as i64).collect();
    let mut remaining = 10_000 - hundredths.iter().sum::<i64>();

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = raw[a] - raw[a].floor();
        let fb = raw[b] - raw[b].floor();
        fb.partial_cmp(&fa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    for idx in order {
        if remaining <= 0 {
            break;
        }
        hundredths[idx] += 1;
        remaining -= 1;
    }

    hundredths.into_iter().map(|h| h as f64 / 100.0).collect()
}

/// Year-over-year growth as a ratio: `(current - previous) / previous`.
///
/// Returns `None` when there is no prior-year value or it is zero.
pub fn growth_rate(current: f64, previous: Option<f64>) -> Option<f64> {
    match previous {
        Some(prev) if prev != 0.0 => Some((current - prev) / prev),
        _ => None,
    }
}

/// Growth of each year against the immediately preceding calendar year.
///
/// A year whose predecessor is missing from `series` gets `None`, even if an
/// older year is present.
pub fn year_over_year(series: &[(i32, f64)]) -> Vec<(i32, Option<f64>)> {
    let by_year: HashMap<i32, f64> = series.iter().copied().collect();
    series
        .iter()
        .map(|(year, value)| (*year, growth_rate(*value, by_year.get(&(year - 1)).copied())))
        .collect()
}

// ============================================================================
// Raw aggregates (repository output)
// ============================================================================

/// Artwork count and value for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregate {
    pub category: String,
    pub artwork_count: i64,
    pub total_value: f64,
}

/// Count and amount for one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearAggregate {
    pub year: i32,
    pub count: i64,
    pub amount: f64,
}

/// Visits and revenue for one exhibition.
#[derive(Debug, Clone, PartialEq)]
pub struct ExhibitionAggregate {
    pub exhibition_id: Uuid,
    pub title: String,
    pub visit_count: i64,
    pub revenue: f64,
}

/// Count and amount for one status value.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusAggregate {
    pub status: String,
    pub count: i64,
    pub amount: f64,
}

/// Policies grouped by insurer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAggregate {
    pub provider: String,
    pub policy_count: i64,
    pub total_coverage: f64,
    pub total_premium: f64,
}

// ============================================================================
// Collection value
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValueRow {
    pub category: String,
    pub artwork_count: i64,
    pub total_value: f64,
    pub percentage: f64,
}

/// Collection value grouped by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionValueReport {
    pub rows: Vec<CategoryValueRow>,
    pub total_artworks: i64,
    pub grand_total: f64,
}

impl CollectionValueReport {
    /// Builds the report, ordered by total value descending.
    pub fn build(mut aggregates: Vec<CategoryAggregate>) -> Self {
        aggregates.sort_by(|a, b| {
            b.total_value
                .partial_cmp(&a.total_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });

        let values: Vec<f64> = aggregates.iter().map(|a| a.total_value).collect();
        let percentages = percentage_breakdown(&values);

        let rows: Vec<CategoryValueRow> = aggregates
            .into_iter()
            .zip(percentages)
            .map(|(a, percentage)| CategoryValueRow {
                category: a.category,
                artwork_count: a.artwork_count,
                total_value: a.total_value,
                percentage,
            })
            .collect();

        Self {
            total_artworks: rows.iter().map(|r| r.artwork_count).sum(),
            grand_total: rows.iter().map(|r| r.total_value).sum(),
            rows,
        }
    }
}

// ============================================================================
// Visitor growth
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorGrowthRow {
    pub year: i32,
    pub visit_count: i64,
    pub revenue: f64,
    /// Growth in visit count over the previous year.
    pub growth_rate: Option<f64>,
    pub revenue_growth_rate: Option<f64>,
}

/// Visits and ticket revenue per year with YoY growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorGrowthReport {
    pub rows: Vec<VisitorGrowthRow>,
    pub total_visits: i64,
    pub total_revenue: f64,
}

impl VisitorGrowthReport {
    /// Builds the report, ordered by year ascending.
    pub fn build(mut aggregates: Vec<YearAggregate>) -> Self {
        aggregates.sort_by_key(|a| a.year);

        let counts: Vec<(i32, f64)> = aggregates.iter().map(|a| (a.year, a.count as f64)).collect();
        let revenue: Vec<(i32, f64)> = aggregates.iter().map(|a| (a.year, a.amount)).collect();
        let count_growth = year_over_year(&counts);
        let revenue_growth = year_over_year(&revenue);

        let rows: Vec<VisitorGrowthRow> = aggregates
            .iter()
            .zip(count_growth)
            .zip(revenue_growth)
            .map(|((a, (_, growth)), (_, rev_growth))| VisitorGrowthRow {
                year: a.year,
                visit_count: a.count,
                revenue: a.amount,
                growth_rate: growth,
                revenue_growth_rate: rev_growth,
            })
            .collect();

        Self {
            total_visits: rows.iter().map(|r| r.visit_count).sum(),
            total_revenue: rows.iter().map(|r| r.revenue).sum(),
            rows,
        }
    }
}

// ============================================================================
// Exhibition performance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionPerformanceRow {
    pub exhibition_id: Uuid,
    pub title: String,
    pub visit_count: i64,
    pub revenue: f64,
    pub average_ticket_price: f64,
}

/// Visits and revenue per exhibition, busiest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionPerformanceReport {
    pub rows: Vec<ExhibitionPerformanceRow>,
    pub total_visits: i64,
    pub total_revenue: f64,
}

impl ExhibitionPerformanceReport {
    pub fn build(mut aggregates: Vec<ExhibitionAggregate>) -> Self {
        aggregates.sort_by(|a, b| {
            b.visit_count
                .cmp(&a.visit_count)
                .then_with(|| {
                    b.revenue
                        .partial_cmp(&a.revenue)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.title.cmp(&b.title))
        });

        let rows: Vec<ExhibitionPerformanceRow> = aggregates
            .into_iter()
            .map(|a| ExhibitionPerformanceRow {
                average_ticket_price: if a.visit_count > 0 {
                    round2(a.revenue / a.visit_count as f64)
                } else {
                    0.0
                },
                exhibition_id: a.exhibition_id,
                title: a.title,
                visit_count: a.visit_count,
                revenue: a.revenue,
            })
            .collect();

        Self {
            total_visits: rows.iter().map(|r| r.visit_count).sum(),
            total_revenue: rows.iter().map(|r| r.revenue).sum(),
            rows,
        }
    }
}

// ============================================================================
// Loan summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummaryRow {
    pub status: String,
    pub loan_count: i64,
    pub total_fees: f64,
    /// Share of all loans, by count.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummaryReport {
    pub rows: Vec<LoanSummaryRow>,
    pub total_loans: i64,
    pub total_fees: f64,
}

impl LoanSummaryReport {
    pub fn build(mut aggregates: Vec<StatusAggregate>) -> Self {
        aggregates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));

        let counts: Vec<f64> = aggregates.iter().map(|a| a.count as f64).collect();
        let percentages = percentage_breakdown(&counts);

        let rows: Vec<LoanSummaryRow> = aggregates
            .into_iter()
            .zip(percentages)
            .map(|(a, percentage)| LoanSummaryRow {
                status: a.status,
                loan_count: a.count,
                total_fees: a.amount,
                percentage,
            })
            .collect();

        Self {
            total_loans: rows.iter().map(|r| r.loan_count).sum(),
            total_fees: rows.iter().map(|r| r.total_fees).sum(),
            rows,
        }
    }
}

// ============================================================================
// Restoration costs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorationCostRow {
    pub year: i32,
    pub restoration_count: i64,
    pub total_cost: f64,
    /// Growth in total cost over the previous year.
    pub growth_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorationCostReport {
    pub rows: Vec<RestorationCostRow>,
    pub total_restorations: i64,
    pub total_cost: f64,
}

impl RestorationCostReport {
    pub fn build(mut aggregates: Vec<YearAggregate>) -> Self {
        aggregates.sort_by_key(|a| a.year);

        let costs: Vec<(i32, f64)> = aggregates.iter().map(|a| (a.year, a.amount)).collect();
        let growth = year_over_year(&costs);

        let rows: Vec<RestorationCostRow> = aggregates
            .iter()
            .zip(growth)
            .map(|(a, (_, growth_rate))| RestorationCostRow {
                year: a.year,
                restoration_count: a.count,
                total_cost: a.amount,
                growth_rate,
            })
            .collect();

        Self {
            total_restorations: rows.iter().map(|r| r.restoration_count).sum(),
            total_cost: rows.iter().map(|r| r.total_cost).sum(),
            rows,
        }
    }
}

// ============================================================================
// Insurance coverage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceCoverageRow {
    pub provider: String,
    pub policy_count: i64,
    pub total_coverage: f64,
    pub total_premium: f64,
    /// Share of total coverage.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceCoverageReport {
    pub rows: Vec<InsuranceCoverageRow>,
    pub total_policies: i64,
    pub total_coverage: f64,
    pub total_premium: f64,
}

impl InsuranceCoverageReport {
    pub fn build(mut aggregates: Vec<ProviderAggregate>) -> Self {
        aggregates.sort_by(|a, b| {
            b.total_coverage
                .partial_cmp(&a.total_coverage)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.provider.cmp(&b.provider))
        });

        let coverage: Vec<f64> = aggregates.iter().map(|a| a.total_coverage).collect();
        let percentages = percentage_breakdown(&coverage);

        let rows: Vec<InsuranceCoverageRow> = aggregates
            .into_iter()
            .zip(percentages)
            .map(|(a, percentage)| InsuranceCoverageRow {
                provider: a.provider,
                policy_count: a.policy_count,
                total_coverage: a.total_coverage,
                total_premium: a.total_premium,
                percentage,
            })
            .collect();

        Self {
            total_policies: rows.iter().map(|r| r.policy_count).sum(),
            total_coverage: rows.iter().map(|r| r.total_coverage).sum(),
            total_premium: rows.iter().map(|r| r.total_premium).sum(),
            rows,
        }
    }
}

// ============================================================================
// Dashboard statistics
// ============================================================================

/// Operational counts for the dashboard, read from the OLTP schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryStatistics {
    pub total_artworks: i64,
    /// Artwork counts keyed by status (snake_case).
    pub artworks_by_status: BTreeMap<String, i64>,
    pub total_collection_value: f64,
    pub active_exhibitions: i64,
    pub total_visitors: i64,
    pub total_staff: i64,
    pub active_loans: i64,
    pub total_insured_value: f64,
    pub restorations_in_progress: i64,
}

impl GalleryStatistics {
    /// Recomputes `total_artworks` from the status breakdown.
    pub fn recalculate_total(&mut self) {
        self.total_artworks = self.artworks_by_status.values().sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sums_to_100(percentages: &[f64]) {
        let sum: f64 = percentages.iter().sum();
        assert!((sum - 100.0).abs() < 0.005, "sum was {}", sum);
    }

    #[test]
    fn test_percentage_breakdown_thirds() {
        let p = percentage_breakdown(&[1.0, 1.0, 1.0]);
        assert_sums_to_100(&p);
        assert!(p.iter().all(|v| (*v - 33.33).abs() < 0.015));
    }

    #[test]
    fn test_percentage_breakdown_uneven() {
        let p = percentage_breakdown(&[2.0, 7.0, 13.0, 0.0, 5.5]);
        assert_sums_to_100(&p);
        assert_eq!(p[3], 0.0);
    }

    #[test]
    fn test_percentage_breakdown_zero_total() {
        assert_eq!(percentage_breakdown(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(percentage_breakdown(&[]).is_empty());
    }

    #[test]
    fn test_growth_rate() {
        assert_eq!(growth_rate(150.0, Some(100.0)), Some(0.5));
        assert_eq!(growth_rate(50.0, Some(100.0)), Some(-0.5));
        assert_eq!(growth_rate(10.0, None), None);
        assert_eq!(growth_rate(10.0, Some(0.0)), None);
    }

    #[test]
    fn test_year_over_year_requires_adjacent_year() {
        let yoy = year_over_year(&[(2021, 100.0), (2022, 120.0), (2024, 90.0)]);
        assert_eq!(yoy[0], (2021, None));
        assert_eq!(yoy[1].0, 2022);
        assert!((yoy[1].1.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(yoy[2], (2024, None));
    }

    #[test]
    fn test_collection_value_totals() {
        let report = CollectionValueReport::build(vec![
            CategoryAggregate {
                category: "sculpture".into(),
                artwork_count: 3,
                total_value: 250_000.0,
            },
            CategoryAggregate {
                category: "painting".into(),
                artwork_count: 5,
                total_value: 750_000.0,
            },
        ]);

        assert_eq!(report.grand_total, 1_000_000.0);
        assert_eq!(report.total_artworks, 8);
        assert_eq!(report.rows[0].category, "painting");
        assert_eq!(report.rows[0].percentage, 75.0);
        assert_eq!(report.rows[1].percentage, 25.0);
        let sum: f64 = report.rows.iter().map(|r| r.total_value).sum();
        assert_eq!(sum, report.grand_total);
    }

    #[test]
    fn test_visitor_growth_first_year_is_null() {
        let report = VisitorGrowthReport::build(vec![
            YearAggregate {
                year: 2024,
                count: 300,
                amount: 4500.0,
            },
            YearAggregate {
                year: 2023,
                count: 200,
                amount: 3000.0,
            },
        ]);

        assert_eq!(report.rows[0].year, 2023);
        assert_eq!(report.rows[0].growth_rate, None);
        assert_eq!(report.rows[0].revenue_growth_rate, None);
        assert_eq!(report.rows[1].growth_rate, Some(0.5));
        assert_eq!(report.rows[1].revenue_growth_rate, Some(0.5));
        assert_eq!(report.total_visits, 500);
        assert_eq!(report.total_revenue, 7500.0);
    }

    #[test]
    fn test_exhibition_performance_ordering() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let report = ExhibitionPerformanceReport::build(vec![
            ExhibitionAggregate {
                exhibition_id: a,
                title: "Quiet Rooms".into(),
                visit_count: 2,
                revenue: 30.0,
            },
            ExhibitionAggregate {
                exhibition_id: b,
                title: "Light & Water".into(),
                visit_count: 3,
                revenue: 40.0,
            },
        ]);

        assert_eq!(report.rows[0].exhibition_id, b);
        assert_eq!(report.rows[0].average_ticket_price, 13.33);
        assert_eq!(report.rows[1].average_ticket_price, 15.0);
        assert_eq!(report.total_visits, 5);
    }

    #[test]
    fn test_exhibition_without_visits_has_zero_average() {
        let report = ExhibitionPerformanceReport::build(vec![ExhibitionAggregate {
            exhibition_id: Uuid::new_v4(),
            title: "Opening Soon".into(),
            visit_count: 0,
            revenue: 0.0,
        }]);
        assert_eq!(report.rows[0].average_ticket_price, 0.0);
    }

    #[test]
    fn test_loan_summary_percentages_by_count() {
        let report = LoanSummaryReport::build(vec![
            StatusAggregate {
                status: "active".into(),
                count: 1,
                amount: 1000.0,
            },
            StatusAggregate {
                status: "returned".into(),
                count: 2,
                amount: 500.0,
            },
        ]);
        assert_eq!(report.total_loans, 3);
        assert_eq!(report.total_fees, 1500.0);
        assert_eq!(report.rows[0].status, "returned");
        assert_sums_to_100(&report.rows.iter().map(|r| r.percentage).collect::<Vec<_>>());
    }

    #[test]
    fn test_restoration_costs_growth_on_cost() {
        let report = RestorationCostReport::build(vec![
            YearAggregate {
                year: 2022,
                count: 4,
                amount: 8000.0,
            },
            YearAggregate {
                year: 2023,
                count: 1,
                amount: 10000.0,
            },
        ]);
        assert_eq!(report.rows[1].growth_rate, Some(0.25));
        assert_eq!(report.total_cost, 18000.0);
        assert_eq!(report.total_restorations, 5);
    }

    #[test]
    fn test_insurance_coverage_percentages() {
        let report = InsuranceCoverageReport::build(vec![
            ProviderAggregate {
                provider: "Hiscox".into(),
                policy_count: 2,
                total_coverage: 600.0,
                total_premium: 6.0,
            },
            ProviderAggregate {
                provider: "AXA Art".into(),
                policy_count: 1,
                total_coverage: 200.0,
                total_premium: 3.0,
            },
        ]);
        assert_eq!(report.rows[0].provider, "Hiscox");
        assert_eq!(report.rows[0].percentage, 75.0);
        assert_eq!(report.total_coverage, 800.0);
        assert_eq!(report.total_premium, 9.0);
        assert_eq!(report.total_policies, 3);
    }

    #[test]
    fn test_report_json_is_camel_case() {
        let report = CollectionValueReport::build(vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("grandTotal").is_some());
        assert!(json.get("totalArtworks").is_some());
    }

    #[test]
    fn test_statistics_recalculate_total() {
        let mut stats = GalleryStatistics::default();
        stats.artworks_by_status.insert("available".into(), 4);
        stats.artworks_by_status.insert("on_loan".into(), 2);
        stats.recalculate_total();
        assert_eq!(stats.total_artworks, 6);
    }
}
