use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, auth::UserID, database_id::TransactionId,
    transaction::actions::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
///
/// The response body is empty so that HTMX replaces the deleted row with
/// nothing, and the success alert is swapped in out-of-band.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    user_id: Option<Extension<UserID>>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let user_id = user_id.map(|Extension(user_id)| user_id);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(user_id, transaction_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => (
            StatusCode::OK,
            Alert::SuccessSimple {
                message: "Transaction deleted".to_owned(),
            }
            .into_oob_html(),
        )
            .into_response(),
        Err(Error::DeleteMissingTransaction) => {
            tracing::warn!("Could not find transaction {transaction_id} to delete");
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryName, CategoryType, create_category},
        db::initialize,
        test_utils::{insert_test_user, parse_html_fragment},
        transaction::core::{NewTransaction, Transaction, get_transaction, insert_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_state() -> (DeleteTransactionState, UserID, UserID, Transaction) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = insert_test_user("alice@example.com", &connection);
        let bob = insert_test_user("bob@example.com", &connection);
        let category = create_category(
            alice,
            CategoryName::new_unchecked("Groceries"),
            CategoryType::Expense,
            &connection,
        )
        .unwrap();
        let transaction = insert_transaction(
            alice,
            NewTransaction {
                amount: 1.23,
                category_id: category.id,
                date: date!(2025 - 10 - 26),
                description: "Test".to_owned(),
            },
            &connection,
        )
        .unwrap();

        (
            DeleteTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            alice,
            bob,
            transaction,
        )
    }

    #[tokio::test]
    async fn deletes_transaction() {
        let (state, alice, _, transaction) = get_state();

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Some(Extension(alice)),
            Path(transaction.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Transaction deleted"));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(alice, transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn other_users_transaction_is_not_found() {
        let (state, alice, bob, transaction) = get_state();

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Some(Extension(bob)),
            Path(transaction.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(alice, transaction.id, &connection),
            Ok(transaction)
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (state, alice, _, _) = get_state();

        let response =
            delete_transaction_endpoint(State(state), Some(Extension(alice)), Path(1337)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let (state, _, _, transaction) = get_state();

        let response = delete_transaction_endpoint(State(state), None, Path(transaction.id)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
