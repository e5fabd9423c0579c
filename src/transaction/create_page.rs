//! Defines the route handler for the page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryType, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::local_today,
    period::MIN_YEAR,
    transaction::actions::{DESCRIPTION_MAX_LENGTH, DESCRIPTION_MIN_LENGTH, MAX_AMOUNT},
};

/// The transaction type selected when the page first loads.
const DEFAULT_TYPE: CategoryType = CategoryType::Expense;

fn type_radio(kind: CategoryType) -> Markup {
    let id = format!("type-{}", kind.as_str());

    html! {
        div class="flex-1"
        {
            input
                id=(id)
                type="radio"
                name="type_"
                value=(kind.as_str())
                required
                checked[kind == DEFAULT_TYPE]
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (kind.label()) }
        }
    }
}

fn create_transaction_view(max_date: Date, today: Date, categories: &[Category]) -> Markup {
    let create_transaction_route = endpoints::TRANSACTIONS_API;
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                id="new-transaction-form"
                hx-post=(create_transaction_route)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                fieldset class=(FORM_RADIO_GROUP_STYLE)
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    (type_radio(CategoryType::Expense))
                    (type_radio(CategoryType::Income))
                }

                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                    // Options for the other type are hidden by /static/app.js.
                    select
                        name="category_id"
                        id="category_id"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected { "Select a category" }

                        @for category in categories {
                            option
                                value=(category.id)
                                data-type=(category.kind.as_str())
                                hidden[category.kind != DEFAULT_TYPE]
                            {
                                (category.name)
                            }
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        min=(format!("{MIN_YEAR}-01-01"))
                        max=(max_date)
                        required
                        value=(today)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    // w-full needed to ensure input takes the full width when prefilled with a value
                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="amount"
                            type="number"
                            min="0.01"
                            max=(MAX_AMOUNT)
                            step="0.01"
                            placeholder="0.00"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        placeholder="Description"
                        minlength=(DESCRIPTION_MIN_LENGTH)
                        maxlength=(DESCRIPTION_MAX_LENGTH)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for create new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionPageState>,
    user_id: Option<Extension<UserID>>,
) -> Result<Response, Error> {
    let Extension(user_id) = user_id.ok_or(Error::Unauthorized)?;

    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new transaction page: {error}")
        })?
    };

    let today = local_today(&state.local_timezone)
        .inspect_err(|_| tracing::error!("Invalid timezone {}", state.local_timezone))?;
    let max_date = today.next_day().unwrap_or(today);

    Ok(create_transaction_view(max_date, today, &categories).into_response())
}
