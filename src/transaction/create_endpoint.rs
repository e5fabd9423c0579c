//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    timezone::local_today,
    transaction::actions::{NewTransactionData, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// On success the client is redirected to the transactions page for the
/// month of the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    user_id: Option<Extension<UserID>>,
    Form(form): Form<NewTransactionData>,
) -> Response {
    let user_id = user_id.map(|Extension(user_id)| user_id);

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => {
            tracing::error!("Invalid timezone {}", state.local_timezone);
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(user_id, form, today, &connection) {
        Ok(transaction) => {
            tracing::info!(
                "User {} created transaction {}",
                transaction.user_id,
                transaction.id
            );

            let redirect_url =
                endpoints::transactions_for_month(transaction.date.year(), transaction.date.month());

            (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
        }
        Err(error @ Error::Validation(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        auth::UserID,
        category::{CategoryName, CategoryType, create_category},
        database_id::CategoryId,
        db::initialize,
        endpoints,
        test_utils::{assert_hx_redirect, insert_test_user, parse_html_fragment},
        transaction::{
            actions::NewTransactionData,
            core::get_transactions_for_month,
            create_endpoint::{CreateTransactionState, create_transaction_endpoint},
        },
    };

    fn get_state() -> (CreateTransactionState, UserID, CategoryId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user("test@example.com", &connection);
        let category_id = create_category(
            user_id,
            CategoryName::new_unchecked("Groceries"),
            CategoryType::Expense,
            &connection,
        )
        .unwrap()
        .id;

        (
            CreateTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
            category_id,
        )
    }

    fn form(category_id: Option<CategoryId>, amount: f64) -> Form<NewTransactionData> {
        Form(NewTransactionData {
            kind: CategoryType::Expense,
            category_id,
            date: date!(2024 - 03 - 15),
            amount,
            description: "test transaction".to_owned(),
        })
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, user_id, category_id) = get_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Some(Extension(user_id)),
            form(Some(category_id), 12.3),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, &endpoints::transactions_for_month(2024, time::Month::March));
        let connection = state.db_connection.lock().unwrap();
        let transactions =
            get_transactions_for_month(user_id, 2024, time::Month::March, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 12.3);
        assert_eq!(transactions[0].description, "test transaction");
    }

    #[tokio::test]
    async fn invalid_amount_returns_alert() {
        let (state, user_id, category_id) = get_state();

        let response = create_transaction_endpoint(
            State(state),
            Some(Extension(user_id)),
            form(Some(category_id), -5.0),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        let text = html
            .select(&Selector::parse("[role=alert]").unwrap())
            .next()
            .expect("No alert found")
            .text()
            .collect::<String>();
        assert!(text.contains("Amount must be greater than zero"));
    }

    #[tokio::test]
    async fn missing_category_returns_alert() {
        let (state, user_id, _) = get_state();

        let response =
            create_transaction_endpoint(State(state), Some(Extension(user_id)), form(None, 12.3))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let (state, _, category_id) = get_state();

        let response =
            create_transaction_endpoint(State(state), None, form(Some(category_id), 12.3)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_timezone_is_server_error() {
        let (mut state, user_id, category_id) = get_state();
        state.local_timezone = "Not/AZone".to_owned();

        let response = create_transaction_endpoint(
            State(state),
            Some(Extension(user_id)),
            form(Some(category_id), 12.3),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_category_deserializes_to_none() {
        let today = OffsetDateTime::now_utc().date();
        let body =
            format!("type_=income&category_id=&date={today}&amount=1.5&description=Pay+day");

        let data: NewTransactionData = serde_html_form::from_str(&body).unwrap();

        assert_eq!(data.category_id, None);
        assert_eq!(data.kind, CategoryType::Income);
        assert_eq!(data.date, today);
    }
}
