//! The dashboard: a year of cashflow, its summary and the latest transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    cashflow::{
        aggregation::aggregate,
        chart::{
            CASHFLOW_CHART_ID, DashboardChart, cashflow_chart, chart_container, charts_scripts,
        },
        presentation::{CashflowSummary, CashflowView, present},
    },
    category::get_categories_by_id,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency_summary, year_select},
    navigation::NavBar,
    period::{PeriodQuery, parse_year, year_options},
    timezone::local_today,
    transaction::{
        TransactionTableRow, get_recent_transactions, get_transaction_year_range,
        get_transactions_for_year, transaction_table,
    },
};

/// How many transactions the dashboard lists under the chart.
const RECENT_TRANSACTION_COUNT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the cashflow for the year in the `year` query parameter, defaulting
/// to the current local year.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    user_id: Option<Extension<UserID>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let Extension(user_id) = user_id.ok_or(Error::Unauthorized)?;

    let today = local_today(&state.local_timezone)
        .inspect_err(|_| tracing::error!("Invalid timezone {}", state.local_timezone))?;
    let year = parse_year(query.year.as_deref(), today.year());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_year(user_id, year, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions for {year}: {error}"))?;
    let recent_transactions =
        get_recent_transactions(user_id, RECENT_TRANSACTION_COUNT, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve recent transactions: {error}"))?;
    let categories = get_categories_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let year_range = get_transaction_year_range(user_id, &connection)?;
    drop(connection);

    let cashflow = aggregate(&transactions, &categories, year);
    if !cashflow.warnings.is_empty() {
        tracing::warn!(
            "{} transaction(s) were left out of the {year} cashflow for user {user_id}",
            cashflow.warnings.len()
        );
    }
    let view = present(&cashflow.buckets, year);

    let recent_rows: Vec<TransactionTableRow> = recent_transactions
        .iter()
        .map(|transaction| TransactionTableRow::new(transaction, &categories))
        .collect();
    let years = year_options(
        year_range.map(|(earliest, _)| earliest),
        today.year(),
        year,
    );

    Ok(dashboard_view(&view, &years, &recent_rows).into_response())
}

fn year_filter_form(year: i32, years: &[i32]) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="flex items-center gap-2"
        {
            (year_select(years, year))

            button type="submit" class="px-4 py-2 text-sm text-white bg-blue-500 rounded hover:bg-blue-600"
            {
                "Show"
            }
        }
    }
}

fn summary_item(label: &str, amount: f64, class: &str) -> Markup {
    html! {
        div class="flex flex-col gap-1 p-4 rounded bg-white shadow dark:bg-gray-800"
        {
            dt class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            dd class={ "text-2xl font-semibold tabular-nums " (class) }
            {
                (format_currency_summary(amount))
            }
        }
    }
}

fn summary_view(summary: &CashflowSummary) -> Markup {
    let balance_class = if summary.is_positive {
        "text-lime-600 dark:text-lime-400"
    } else {
        "text-orange-600 dark:text-orange-400"
    };

    html! {
        dl
            id="cashflow-summary"
            data-balance-positive=(if summary.is_positive { "true" } else { "false" })
            class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full"
        {
            (summary_item("Income", summary.total_income, "text-lime-600 dark:text-lime-400"))
            (summary_item("Expenses", summary.total_expenses, "text-orange-600 dark:text-orange-400"))
            (summary_item("Balance", summary.balance, balance_class))
        }
    }
}

fn dashboard_view(view: &CashflowView, years: &[i32], recent_rows: &[TransactionTableRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let charts = [DashboardChart {
        id: CASHFLOW_CHART_ID,
        options: cashflow_chart(view).to_string(),
    }];

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Cashflow " (view.year) }
                    (year_filter_form(view.year, years))
                }

                section id="charts" class="w-full"
                {
                    @for chart in &charts {
                        (chart_container(chart))
                    }
                }

                (summary_view(&view.summary))

                section class="space-y-2"
                {
                    div class="flex justify-between items-baseline"
                    {
                        h2 class="text-lg font-semibold" { "Recent transactions" }
                        a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE)
                        {
                            "View all transactions"
                        }
                    }

                    (transaction_table(recent_rows, false, "No transactions yet."))
                }
            }
        }
    };

    base("Dashboard", &charts_scripts(&charts), &content)
}
