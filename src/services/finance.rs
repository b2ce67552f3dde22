// src/services/finance.rs
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Expense, Flock, Sale};

/// Number of trailing aggregates the forecast extrapolates from.
pub const TRAILING_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct SaleEvent {
    pub date: NaiveDate,
    pub revenue: f64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEvent {
    pub date: NaiveDate,
    pub cost: f64,
}

/// One calendar date's summed financial activity. `price` is the
/// most-recently-folded unit price among that date's sales.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub revenue: f64,
    pub expenses: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastPeriod {
    pub month: String,
    pub revenue: i64,
    pub expenses: i64,
    pub profit: i64,
}

/// Multiplicative perturbation applied to projected values. Injected so
/// tests can pin the factor; production sampling is uniform in [0.98, 1.03).
pub trait JitterSource {
    fn factor(&mut self) -> f64;
}

pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn factor(&mut self) -> f64 {
        rand::thread_rng().gen_range(0.98..1.03)
    }
}

/// Flatten every flock's nested sale/expense records into flat event
/// streams, preserving source order. Records without a usable date are
/// dropped silently. Unit price divides by quantity floored to 1, so a
/// zero-quantity sale reports its raw price.
pub fn collect_events(flocks: &[Flock]) -> (Vec<SaleEvent>, Vec<ExpenseEvent>) {
    let mut sale_events = Vec::new();
    let mut expense_events = Vec::new();

    for flock in flocks {
        for sale in &flock.sales {
            if let Some(date) = sale.date {
                sale_events.push(sale_event(date, sale));
            }
        }
        for expense in &flock.expenses {
            if let Some(date) = expense.date {
                expense_events.push(expense_event(date, expense));
            }
        }
    }

    (sale_events, expense_events)
}

fn sale_event(date: NaiveDate, sale: &Sale) -> SaleEvent {
    SaleEvent {
        date,
        revenue: sale.price,
        unit_price: sale.price / f64::from(sale.quantity.max(1)),
    }
}

fn expense_event(date: NaiveDate, expense: &Expense) -> ExpenseEvent {
    ExpenseEvent {
        date,
        cost: expense.cost,
    }
}

/// Fold the event streams into one aggregate per calendar date, ascending.
/// Same-date revenues and costs accumulate; the unit price is
/// last-write-wins among that date's sale events.
pub fn aggregate_by_date(
    sales: &[SaleEvent],
    expenses: &[ExpenseEvent],
) -> Vec<DailyAggregate> {
    let mut by_date: HashMap<NaiveDate, DailyAggregate> = HashMap::new();

    for sale in sales {
        let entry = by_date
            .entry(sale.date)
            .or_insert_with(|| empty_aggregate(sale.date));
        entry.revenue += sale.revenue;
        entry.price = sale.unit_price;
    }

    for expense in expenses {
        let entry = by_date
            .entry(expense.date)
            .or_insert_with(|| empty_aggregate(expense.date));
        entry.expenses += expense.cost;
    }

    let mut series: Vec<DailyAggregate> = by_date.into_values().collect();
    series.sort_by_key(|a| a.date);
    series
}

fn empty_aggregate(date: NaiveDate) -> DailyAggregate {
    DailyAggregate {
        date,
        revenue: 0.0,
        expenses: 0.0,
        price: 0.0,
    }
}

/// Totals and profit margin over a series. Margin is exactly 0 when there
/// is no revenue, never NaN.
pub fn summarize(series: &[DailyAggregate]) -> FinancialSummary {
    let total_revenue: f64 = series.iter().map(|a| a.revenue).sum();
    let total_expenses: f64 = series.iter().map(|a| a.expenses).sum();
    let profit_margin = if total_revenue == 0.0 {
        0.0
    } else {
        (total_revenue - total_expenses) / total_revenue
    };

    FinancialSummary {
        total_revenue,
        total_expenses,
        profit_margin,
    }
}

/// Restrict a series to the inclusive [start, end] window. A missing bound
/// leaves that side open; order is preserved.
pub fn filter_range(
    series: &[DailyAggregate],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<DailyAggregate> {
    series
        .iter()
        .filter(|a| start.map_or(true, |s| a.date >= s))
        .filter(|a| end.map_or(true, |e| a.date <= e))
        .cloned()
        .collect()
}

/// Project one period per label from the means of the trailing window,
/// jittering revenue and expenses independently and rounding to whole
/// currency units. An empty window projects from zero means.
pub fn project_forecast(
    series: &[DailyAggregate],
    labels: &[String],
    jitter: &mut dyn JitterSource,
) -> Vec<ForecastPeriod> {
    let window_start = series.len().saturating_sub(TRAILING_WINDOW);
    let window = &series[window_start..];

    let (avg_revenue, avg_expenses) = if window.is_empty() {
        (0.0, 0.0)
    } else {
        let n = window.len() as f64;
        (
            window.iter().map(|a| a.revenue).sum::<f64>() / n,
            window.iter().map(|a| a.expenses).sum::<f64>() / n,
        )
    };

    labels
        .iter()
        .map(|label| {
            let revenue = (avg_revenue * jitter.factor()).round() as i64;
            let expenses = (avg_expenses * jitter.factor()).round() as i64;
            ForecastPeriod {
                month: label.clone(),
                revenue,
                expenses,
                profit: revenue - expenses,
            }
        })
        .collect()
}

/// Names of the next `count` calendar months after `from`, used as the
/// default forecast period labels.
pub fn upcoming_month_labels(from: NaiveDate, count: usize) -> Vec<String> {
    let mut year = from.year();
    let mut month = from.month();
    let mut labels = Vec::with_capacity(count);

    for _ in 0..count {
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        labels.push(first.format("%B").to_string());
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Expense, Flock, Sale};

    struct FixedJitter(f64);

    impl JitterSource for FixedJitter {
        fn factor(&mut self) -> f64 {
            self.0
        }
    }

    /// Yields the given factors in order, then repeats the last one.
    struct SequenceJitter(Vec<f64>, usize);

    impl JitterSource for SequenceJitter {
        fn factor(&mut self) -> f64 {
            let i = self.1.min(self.0.len() - 1);
            self.1 += 1;
            self.0[i]
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sale(d: &str, quantity: u32, price: f64) -> Sale {
        Sale {
            id: None,
            flock: None,
            customer: None,
            date: Some(date(d)),
            item: "Eggs".to_string(),
            quantity,
            price,
        }
    }

    fn expense(d: &str, cost: f64) -> Expense {
        Expense {
            id: None,
            flock: None,
            date: Some(date(d)),
            item: "Feed Purchase".to_string(),
            cost,
        }
    }

    fn flock_with(sales: Vec<Sale>, expenses: Vec<Expense>) -> Flock {
        Flock {
            id: Some(1),
            name: "Sunrise Layers".to_string(),
            breed: "ISA Brown".to_string(),
            initial_count: 50,
            acquisition_date: date("2024-01-01"),
            egg_logs: vec![],
            mortality_logs: vec![],
            feed_logs: vec![],
            sales,
            expenses,
        }
    }

    fn aggregate(d: &str, revenue: f64, expenses: f64) -> DailyAggregate {
        DailyAggregate {
            date: date(d),
            revenue,
            expenses,
            price: 0.0,
        }
    }

    #[test]
    fn normalizer_flattens_in_source_order_and_drops_dateless_records() {
        let mut bad_sale = sale("2024-02-01", 2, 7.0);
        bad_sale.date = None;
        let mut bad_expense = expense("2024-02-01", 9.0);
        bad_expense.date = None;

        let flocks = vec![
            flock_with(
                vec![sale("2024-02-02", 12, 42.0), bad_sale],
                vec![bad_expense, expense("2024-02-03", 15.0)],
            ),
            flock_with(vec![sale("2024-02-01", 1, 5.0)], vec![]),
        ];

        let (sales, expenses) = collect_events(&flocks);
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].date, date("2024-02-02"));
        assert_eq!(sales[1].date, date("2024-02-01"));
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].cost, 15.0);
    }

    #[test]
    fn normalizer_floors_zero_quantity_divisor_to_one() {
        let flocks = vec![flock_with(vec![sale("2024-02-01", 0, 17.5)], vec![])];
        let (sales, _) = collect_events(&flocks);
        assert_eq!(sales[0].unit_price, 17.5);
    }

    #[test]
    fn normalizer_derives_unit_price_from_quantity() {
        let flocks = vec![flock_with(vec![sale("2024-02-01", 10, 35.0)], vec![])];
        let (sales, _) = collect_events(&flocks);
        assert_eq!(sales[0].unit_price, 3.5);
        assert_eq!(sales[0].revenue, 35.0);
    }

    #[test]
    fn aggregator_merges_same_date_events() {
        let sales = vec![
            SaleEvent {
                date: date("2024-01-01"),
                revenue: 100.0,
                unit_price: 5.0,
            },
            SaleEvent {
                date: date("2024-01-01"),
                revenue: 50.0,
                unit_price: 2.5,
            },
            SaleEvent {
                date: date("2024-01-02"),
                revenue: 20.0,
                unit_price: 4.0,
            },
        ];

        let series = aggregate_by_date(&sales, &[]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date("2024-01-01"));
        assert_eq!(series[0].revenue, 150.0);
        assert_eq!(series[1].date, date("2024-01-02"));
        assert_eq!(series[1].revenue, 20.0);
    }

    #[test]
    fn aggregator_never_emits_duplicate_dates_and_sorts_ascending() {
        let sales: Vec<SaleEvent> = ["2024-03-09", "2024-03-01", "2024-03-09", "2024-03-05"]
            .iter()
            .map(|d| SaleEvent {
                date: date(d),
                revenue: 10.0,
                unit_price: 1.0,
            })
            .collect();
        let expenses = vec![
            ExpenseEvent {
                date: date("2024-03-05"),
                cost: 3.0,
            },
            ExpenseEvent {
                date: date("2024-02-28"),
                cost: 2.0,
            },
        ];

        let series = aggregate_by_date(&sales, &expenses);
        let dates: Vec<NaiveDate> = series.iter().map(|a| a.date).collect();
        let mut deduped = dates.clone();
        deduped.dedup();
        assert_eq!(dates, deduped);
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn aggregator_unit_price_is_last_write_wins() {
        let sales = vec![
            SaleEvent {
                date: date("2024-01-01"),
                revenue: 100.0,
                unit_price: 5.0,
            },
            SaleEvent {
                date: date("2024-01-01"),
                revenue: 50.0,
                unit_price: 2.5,
            },
        ];

        let series = aggregate_by_date(&sales, &[]);
        assert_eq!(series[0].price, 2.5);
    }

    #[test]
    fn expense_only_dates_have_zero_revenue() {
        let expenses = vec![ExpenseEvent {
            date: date("2024-01-01"),
            cost: 30.0,
        }];
        let series = aggregate_by_date(&[], &expenses);
        assert_eq!(series[0].revenue, 0.0);
        assert_eq!(series[0].expenses, 30.0);
    }

    #[test]
    fn summary_matches_raw_input_sums() {
        let series = vec![
            aggregate("2024-01-01", 100.0, 50.0),
            aggregate("2024-01-02", 200.0, 50.0),
        ];
        let summary = summarize(&series);
        assert_eq!(summary.total_revenue, 300.0);
        assert_eq!(summary.total_expenses, 100.0);
        assert!((summary.profit_margin - 0.667).abs() < 0.001);
    }

    #[test]
    fn profit_margin_is_zero_without_revenue() {
        let series = vec![aggregate("2024-01-01", 0.0, 75.0)];
        let summary = summarize(&series);
        assert_eq!(summary.profit_margin, 0.0);
        assert!(!summary.profit_margin.is_nan());
    }

    #[test]
    fn unbounded_filter_is_identity() {
        let series = vec![
            aggregate("2024-01-01", 1.0, 0.0),
            aggregate("2024-01-05", 2.0, 0.0),
            aggregate("2024-01-09", 3.0, 0.0),
        ];
        assert_eq!(filter_range(&series, None, None), series);
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let series = vec![
            aggregate("2024-01-01", 1.0, 0.0),
            aggregate("2024-01-05", 2.0, 0.0),
            aggregate("2024-01-09", 3.0, 0.0),
        ];
        let filtered = filter_range(
            &series,
            Some(date("2024-01-01")),
            Some(date("2024-01-05")),
        );
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].date, date("2024-01-01"));
        assert_eq!(filtered[1].date, date("2024-01-05"));

        let open_start = filter_range(&series, None, Some(date("2024-01-05")));
        assert_eq!(open_start.len(), 2);
        let open_end = filter_range(&series, Some(date("2024-01-05")), None);
        assert_eq!(open_end.len(), 2);
    }

    #[test]
    fn forecast_with_pinned_jitter_reproduces_window_mean() {
        let series = vec![
            aggregate("2024-01-01", 1000.0, 400.0),
            aggregate("2024-01-02", 1000.0, 400.0),
        ];
        let labels = vec!["July".to_string(), "August".to_string()];
        let forecast = project_forecast(&series, &labels, &mut FixedJitter(1.0));

        assert_eq!(forecast.len(), 2);
        for period in &forecast {
            assert_eq!(period.revenue, 1000);
            assert_eq!(period.expenses, 400);
            assert_eq!(period.profit, period.revenue - period.expenses);
        }
        assert_eq!(forecast[0].month, "July");
    }

    #[test]
    fn forecast_jitters_revenue_and_expenses_independently() {
        let series = vec![aggregate("2024-01-01", 1000.0, 1000.0)];
        let labels = vec!["July".to_string()];
        let forecast =
            project_forecast(&series, &labels, &mut SequenceJitter(vec![1.02, 0.98], 0));

        assert_eq!(forecast[0].revenue, 1020);
        assert_eq!(forecast[0].expenses, 980);
        assert_eq!(forecast[0].profit, 40);
    }

    #[test]
    fn forecast_window_is_the_trailing_thirty_entries() {
        // 10 old entries at 0 revenue, then 30 at 100: the mean must ignore
        // everything before the trailing window.
        let mut series = Vec::new();
        for day in 1..=10 {
            series.push(aggregate(&format!("2024-01-{:02}", day), 0.0, 0.0));
        }
        for day in 1..=30 {
            series.push(aggregate(&format!("2024-02-{:02}", day), 100.0, 10.0));
        }

        let labels = vec!["March".to_string()];
        let forecast = project_forecast(&series, &labels, &mut FixedJitter(1.0));
        assert_eq!(forecast[0].revenue, 100);
        assert_eq!(forecast[0].expenses, 10);
    }

    #[test]
    fn forecast_over_empty_series_projects_zero() {
        let labels = vec!["July".to_string()];
        let forecast = project_forecast(&[], &labels, &mut FixedJitter(1.0));
        assert_eq!(forecast[0].revenue, 0);
        assert_eq!(forecast[0].expenses, 0);
        assert_eq!(forecast[0].profit, 0);
    }

    #[test]
    fn random_jitter_stays_in_range() {
        let mut jitter = RandomJitter;
        for _ in 0..200 {
            let f = jitter.factor();
            assert!((0.98..1.03).contains(&f));
        }
    }

    #[test]
    fn month_labels_roll_over_the_year_boundary() {
        let labels = upcoming_month_labels(date("2024-11-15"), 3);
        assert_eq!(labels, vec!["December", "January", "February"]);
    }

    #[test]
    fn month_labels_follow_the_reference_date() {
        let labels = upcoming_month_labels(date("2024-06-30"), 3);
        assert_eq!(labels, vec!["July", "August", "September"]);
    }
}
