//! Aggregation of a year of transactions into monthly income and expense totals.

use std::collections::HashMap;

use time::Month;

use crate::{
    category::{Category, CategoryType},
    database_id::{CategoryId, TransactionId},
    transaction::Transaction,
};

/// The months of the year in calendar order.
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The income and expense totals for one month.
///
/// Both totals are sums of positive amounts, so neither is ever negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyBucket {
    pub month: Month,
    pub income: f64,
    pub expenses: f64,
}

impl MonthlyBucket {
    fn empty(month: Month) -> Self {
        Self {
            month,
            income: 0.0,
            expenses: 0.0,
        }
    }
}

/// A transaction that was left out of the totals because its category could
/// not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataIntegrityWarning {
    pub transaction_id: TransactionId,
    pub category_id: CategoryId,
}

/// Twelve monthly buckets, January first, and the transactions that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCashflow {
    pub buckets: [MonthlyBucket; 12],
    pub warnings: Vec<DataIntegrityWarning>,
}

/// The totals for a whole year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// Income minus expenses, negative when more was spent than earned.
    pub balance: f64,
}

impl AnnualSummary {
    /// Sum the income and expenses over `buckets`.
    pub fn from_buckets(buckets: &[MonthlyBucket]) -> Self {
        let (total_income, total_expenses) = buckets
            .iter()
            .fold((0.0, 0.0), |(income, expenses), bucket| {
                (income + bucket.income, expenses + bucket.expenses)
            });

        Self {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        }
    }
}

/// Sum `transactions` into a bucket per month of `year`.
///
/// `transactions` should already be limited to one user and to `year`.
/// A transaction's category type decides whether its amount is income or an
/// expense. Transactions with an unknown category are skipped and reported in
/// [MonthlyCashflow::warnings], and transactions from another year are
/// skipped, so a bad record never prevents the rest of the year from being shown.
pub fn aggregate(
    transactions: &[Transaction],
    categories: &HashMap<CategoryId, Category>,
    year: i32,
) -> MonthlyCashflow {
    let mut buckets = MONTHS.map(MonthlyBucket::empty);
    let mut warnings = Vec::new();

    for transaction in transactions {
        if transaction.date.year() != year {
            tracing::warn!(
                "Skipping transaction {} dated {} when aggregating the year {year}",
                transaction.id,
                transaction.date
            );
            continue;
        }

        let Some(category) = categories.get(&transaction.category_id) else {
            tracing::warn!(
                "Skipping transaction {} with unknown category {}",
                transaction.id,
                transaction.category_id
            );
            warnings.push(DataIntegrityWarning {
                transaction_id: transaction.id,
                category_id: transaction.category_id,
            });
            continue;
        };

        let bucket = &mut buckets[transaction.date.month() as usize - 1];

        match category.kind {
            CategoryType::Income => bucket.income += transaction.amount,
            CategoryType::Expense => bucket.expenses += transaction.amount,
        }
    }

    MonthlyCashflow { buckets, warnings }
}
