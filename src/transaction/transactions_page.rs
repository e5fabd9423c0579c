//! The page listing a user's transactions for one month.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Month;

use crate::{
    AppState, Error,
    auth::UserID,
    cashflow::{MONTHS, month_label},
    category::get_categories_by_id,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, year_select},
    navigation::NavBar,
    period::{PeriodQuery, parse_month, parse_year, year_options},
    timezone::local_today,
    transaction::{
        core::{get_transaction_year_range, get_transactions_for_month},
        table::{TransactionTableRow, transaction_table},
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn period_filter_form(year: i32, month: Month, years: &[i32]) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-wrap items-center gap-2"
        {
            select
                name="month"
                id="month"
                aria-label="Month"
                class="p-2 rounded text-sm bg-gray-50 border border-gray-300 text-gray-900
                    dark:bg-gray-700 dark:border-gray-600 dark:text-white"
            {
                @for option_month in MONTHS {
                    option
                        value=(option_month as u8)
                        selected[option_month == month]
                    {
                        (month_label(option_month))
                    }
                }
            }

            (year_select(years, year))

            button type="submit" class="px-4 py-2 text-sm text-white bg-blue-500 rounded hover:bg-blue-600"
            {
                "Show"
            }
        }
    }
}

fn transactions_view(
    year: i32,
    month: Month,
    years: &[i32],
    rows: &[TransactionTableRow],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let heading = format!("{} {year}", month_label(month));

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                div class="flex justify-between flex-wrap items-center gap-4"
                {
                    h2 class="text-lg font-semibold" { (heading) }
                    (period_filter_form(year, month, years))
                }

                (transaction_table(rows, true, "No transactions in this month."))

                @if rows.is_empty() {
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(BUTTON_PRIMARY_STYLE)
                    {
                        "Add your first transaction for this month"
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Render the user's transactions for the month selected by the `year` and
/// `month` query parameters, defaulting to the current month.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    user_id: Option<Extension<UserID>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let Extension(user_id) = user_id.ok_or(Error::Unauthorized)?;

    let today = local_today(&state.local_timezone)
        .inspect_err(|_| tracing::error!("Invalid timezone {}", state.local_timezone))?;
    let year = parse_year(query.year.as_deref(), today.year());
    let month = parse_month(query.month.as_deref(), today.month());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_month(user_id, year, month, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let categories = get_categories_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let year_range = get_transaction_year_range(user_id, &connection)?;
    drop(connection);

    let rows: Vec<TransactionTableRow> = transactions
        .iter()
        .map(|transaction| TransactionTableRow::new(transaction, &categories))
        .collect();
    let years = year_options(
        year_range.map(|(earliest, _)| earliest),
        today.year(),
        year,
    );

    Ok(transactions_view(year, month, &years, &rows).into_response())
}
