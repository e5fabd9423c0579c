//! Turns monthly buckets into the labelled series and summary shown on the dashboard.

use serde::Serialize;
use time::Month;

use crate::cashflow::aggregation::{AnnualSummary, MonthlyBucket};

/// One month of the cashflow chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowPoint {
    pub month: Month,
    pub label: &'static str,
    pub income: f64,
    pub expenses: f64,
}

/// The year's totals and whether the balance should be styled as positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CashflowSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    /// `true` when the balance is zero or more.
    pub is_positive: bool,
}

/// Everything the dashboard needs to draw a year of cashflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowView {
    pub year: i32,
    /// Twelve points, January first.
    pub series: Vec<CashflowPoint>,
    pub summary: CashflowSummary,
}

/// The short English name of `month`, e.g. "Jan".
pub fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Label the buckets for `year` and compute the summary.
pub fn present(buckets: &[MonthlyBucket; 12], year: i32) -> CashflowView {
    let series = buckets
        .iter()
        .map(|bucket| CashflowPoint {
            month: bucket.month,
            label: month_label(bucket.month),
            income: bucket.income,
            expenses: bucket.expenses,
        })
        .collect();

    let AnnualSummary {
        total_income,
        total_expenses,
        balance,
    } = AnnualSummary::from_buckets(buckets);

    CashflowView {
        year,
        series,
        summary: CashflowSummary {
            total_income,
            total_expenses,
            balance,
            is_positive: balance >= 0.0,
        },
    }
}
