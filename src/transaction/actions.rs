//! The create and delete actions for transactions.
//!
//! Both actions take the caller's identity as an explicit parameter and refuse
//! to touch the database without one.

use rusqlite::Connection;
use serde::Deserialize;
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryType, get_category},
    database_id::{CategoryId, TransactionId},
    period::MIN_YEAR,
    transaction::core::{
        NewTransaction, Transaction, delete_transaction_row, insert_transaction,
    },
};

/// The minimum number of characters in a transaction description.
pub const DESCRIPTION_MIN_LENGTH: usize = 3;
/// The maximum number of characters in a transaction description.
pub const DESCRIPTION_MAX_LENGTH: usize = 300;
/// The largest amount, in dollars, a single transaction may have.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

pub(crate) const SELECT_CATEGORY_MSG: &str = "Please select a category";
pub(crate) const FUTURE_DATE_MSG: &str = "Transaction date cannot be in the future";
pub(crate) const EARLY_DATE_MSG: &str = "Transaction date cannot be before the year 1900";
pub(crate) const AMOUNT_MSG: &str = "Amount must be greater than zero";
pub(crate) const AMOUNT_TOO_LARGE_MSG: &str = "Amount must be at most $1,000,000,000";
pub(crate) const DESCRIPTION_TOO_SHORT_MSG: &str =
    "Description must contain at least 3 characters";
pub(crate) const DESCRIPTION_TOO_LONG_MSG: &str =
    "Description must contain at most 300 characters";

/// The form data for creating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransactionData {
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type_")]
    pub kind: CategoryType,
    /// The selected category, `None` when nothing has been selected.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// When the transaction happened.
    pub date: Date,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Text detailing the transaction.
    pub description: String,
}

/// Check `data` and turn it into a [NewTransaction].
///
/// The checks run in a fixed order and the first failure is returned as
/// [Error::Validation].
fn validate(
    user_id: UserID,
    data: NewTransactionData,
    today: Date,
    connection: &Connection,
) -> Result<NewTransaction, Error> {
    let category_id = data
        .category_id
        .ok_or_else(|| Error::Validation(SELECT_CATEGORY_MSG.to_owned()))?;

    match get_category(user_id, category_id, connection) {
        Ok(category) if category.kind == data.kind => {}
        Ok(_) | Err(Error::NotFound) => {
            return Err(Error::Validation(SELECT_CATEGORY_MSG.to_owned()));
        }
        Err(error) => return Err(error),
    }

    let max_date = today.next_day().unwrap_or(today);
    if data.date > max_date {
        return Err(Error::Validation(FUTURE_DATE_MSG.to_owned()));
    }

    // Earlier years cannot be selected on the dashboard or transactions page.
    if data.date.year() < MIN_YEAR {
        return Err(Error::Validation(EARLY_DATE_MSG.to_owned()));
    }

    if !(data.amount.is_finite() && data.amount > 0.0) {
        return Err(Error::Validation(AMOUNT_MSG.to_owned()));
    }

    if data.amount > MAX_AMOUNT {
        return Err(Error::Validation(AMOUNT_TOO_LARGE_MSG.to_owned()));
    }

    let description = data.description.trim();
    let description_length = description.graphemes(true).count();

    if description_length < DESCRIPTION_MIN_LENGTH {
        return Err(Error::Validation(DESCRIPTION_TOO_SHORT_MSG.to_owned()));
    }

    if description_length > DESCRIPTION_MAX_LENGTH {
        return Err(Error::Validation(DESCRIPTION_TOO_LONG_MSG.to_owned()));
    }

    Ok(NewTransaction {
        amount: data.amount,
        category_id,
        date: data.date,
        description: description.to_owned(),
    })
}

/// Validate and insert a transaction for `user_id`.
///
/// `today` is the current date in the server's local timezone. Transactions
/// may be dated at most one day after it.
///
/// # Errors
/// - [Error::Unauthorized] if `user_id` is `None`,
/// - [Error::Validation] with the first failing check's message,
/// - or [Error::SqlError] if the insert fails.
///
/// Nothing is written when an error is returned.
pub fn create_transaction(
    user_id: Option<UserID>,
    data: NewTransactionData,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let user_id = user_id.ok_or(Error::Unauthorized)?;
    let new_transaction = validate(user_id, data, today, connection)?;

    insert_transaction(user_id, new_transaction, connection)
}

/// Delete one of the user's transactions.
///
/// # Errors
/// - [Error::Unauthorized] if `user_id` is `None`,
/// - [Error::DeleteMissingTransaction] if no transaction with `id` belongs to
///   the user, including when it was already deleted,
/// - or [Error::SqlError] if the delete fails.
pub fn delete_transaction(
    user_id: Option<UserID>,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let user_id = user_id.ok_or(Error::Unauthorized)?;

    match delete_transaction_row(id, user_id, connection)? {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryName, CategoryType, create_category},
        database_id::CategoryId,
        db::initialize,
        test_utils::insert_test_user,
        transaction::core::get_transaction,
    };

    use super::{
        AMOUNT_MSG, AMOUNT_TOO_LARGE_MSG, DESCRIPTION_TOO_LONG_MSG, DESCRIPTION_TOO_SHORT_MSG,
        EARLY_DATE_MSG, FUTURE_DATE_MSG, MAX_AMOUNT, NewTransactionData, SELECT_CATEGORY_MSG,
        create_transaction, delete_transaction,
    };

    const TODAY: time::Date = date!(2024 - 06 - 15);

    struct Fixture {
        connection: Connection,
        alice: UserID,
        bob: UserID,
        salary: CategoryId,
        groceries: CategoryId,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = insert_test_user("alice@example.com", &connection);
        let bob = insert_test_user("bob@example.com", &connection);
        let salary = create_category(
            alice,
            CategoryName::new_unchecked("Salary"),
            CategoryType::Income,
            &connection,
        )
        .unwrap()
        .id;
        let groceries = create_category(
            alice,
            CategoryName::new_unchecked("Groceries"),
            CategoryType::Expense,
            &connection,
        )
        .unwrap()
        .id;

        Fixture {
            connection,
            alice,
            bob,
            salary,
            groceries,
        }
    }

    fn valid_data(category_id: CategoryId) -> NewTransactionData {
        NewTransactionData {
            kind: CategoryType::Expense,
            category_id: Some(category_id),
            date: TODAY,
            amount: 42.5,
            description: "Weekly shop".to_owned(),
        }
    }

    fn count_transactions(connection: &Connection) -> i64 {
        connection
            .query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap()
    }

    #[track_caller]
    fn assert_validation_error(result: Result<impl std::fmt::Debug, Error>, message: &str) {
        match result {
            Err(Error::Validation(got)) => assert_eq!(got, message),
            other => panic!("want validation error \"{message}\", got {other:?}"),
        }
    }

    #[test]
    fn creates_transaction() {
        let fixture = get_fixture();

        let transaction = create_transaction(
            Some(fixture.alice),
            valid_data(fixture.groceries),
            TODAY,
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(transaction.amount, 42.5);
        assert_eq!(transaction.category_id, fixture.groceries);
        assert_eq!(transaction.description, "Weekly shop");
        assert_eq!(
            get_transaction(fixture.alice, transaction.id, &fixture.connection),
            Ok(transaction)
        );
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        let fixture = get_fixture();

        let result = create_transaction(
            None,
            valid_data(fixture.groceries),
            TODAY,
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::Unauthorized));
        assert_eq!(count_transactions(&fixture.connection), 0);
    }

    #[test]
    fn negative_amount_is_rejected_without_insert() {
        let fixture = get_fixture();
        let data = NewTransactionData {
            amount: -5.0,
            ..valid_data(fixture.groceries)
        };

        let result = create_transaction(Some(fixture.alice), data, TODAY, &fixture.connection);

        assert_validation_error(result, AMOUNT_MSG);
        assert_eq!(count_transactions(&fixture.connection), 0);
    }

    #[test]
    fn non_finite_amount_is_rejected() {
        let fixture = get_fixture();
        let data = NewTransactionData {
            amount: f64::NAN,
            ..valid_data(fixture.groceries)
        };

        let result = create_transaction(Some(fixture.alice), data, TODAY, &fixture.connection);

        assert_validation_error(result, AMOUNT_MSG);
    }

    #[test]
    fn amount_above_limit_is_rejected_without_insert() {
        let fixture = get_fixture();
        let at_limit = NewTransactionData {
            amount: MAX_AMOUNT,
            ..valid_data(fixture.groceries)
        };
        let huge = NewTransactionData {
            amount: 1e20,
            ..valid_data(fixture.groceries)
        };

        let at_limit_result =
            create_transaction(Some(fixture.alice), at_limit, TODAY, &fixture.connection);
        let huge_result = create_transaction(Some(fixture.alice), huge, TODAY, &fixture.connection);

        assert!(at_limit_result.is_ok());
        assert_validation_error(huge_result, AMOUNT_TOO_LARGE_MSG);
        assert_eq!(count_transactions(&fixture.connection), 1);
    }

    #[test]
    fn missing_category_is_rejected() {
        let fixture = get_fixture();
        let data = NewTransactionData {
            category_id: None,
            ..valid_data(fixture.groceries)
        };

        let result = create_transaction(Some(fixture.alice), data, TODAY, &fixture.connection);

        assert_validation_error(result, SELECT_CATEGORY_MSG);
    }

    #[test]
    fn category_of_other_type_is_rejected() {
        let fixture = get_fixture();
        let data = NewTransactionData {
            kind: CategoryType::Expense,
            ..valid_data(fixture.salary)
        };

        let result = create_transaction(Some(fixture.alice), data, TODAY, &fixture.connection);

        assert_validation_error(result, SELECT_CATEGORY_MSG);
    }

    #[test]
    fn other_users_category_is_rejected() {
        let fixture = get_fixture();

        let result = create_transaction(
            Some(fixture.bob),
            valid_data(fixture.groceries),
            TODAY,
            &fixture.connection,
        );

        assert_validation_error(result, SELECT_CATEGORY_MSG);
        assert_eq!(count_transactions(&fixture.connection), 0);
    }

    #[test]
    fn date_may_be_one_day_ahead() {
        let fixture = get_fixture();
        let tomorrow = NewTransactionData {
            date: date!(2024 - 06 - 16),
            ..valid_data(fixture.groceries)
        };
        let day_after = NewTransactionData {
            date: date!(2024 - 06 - 17),
            ..valid_data(fixture.groceries)
        };

        let tomorrow_result =
            create_transaction(Some(fixture.alice), tomorrow, TODAY, &fixture.connection);
        let day_after_result =
            create_transaction(Some(fixture.alice), day_after, TODAY, &fixture.connection);

        assert!(tomorrow_result.is_ok());
        assert_validation_error(day_after_result, FUTURE_DATE_MSG);
    }

    #[test]
    fn date_before_earliest_selectable_year_is_rejected() {
        let fixture = get_fixture();
        let first_day = NewTransactionData {
            date: date!(1900 - 01 - 01),
            ..valid_data(fixture.groceries)
        };
        let too_early = NewTransactionData {
            date: date!(1850 - 05 - 01),
            ..valid_data(fixture.groceries)
        };

        let first_day_result =
            create_transaction(Some(fixture.alice), first_day, TODAY, &fixture.connection);
        let too_early_result =
            create_transaction(Some(fixture.alice), too_early, TODAY, &fixture.connection);

        assert!(first_day_result.is_ok());
        assert_validation_error(too_early_result, EARLY_DATE_MSG);
        assert_eq!(count_transactions(&fixture.connection), 1);
    }

    #[test]
    fn description_length_is_counted_in_graphemes() {
        let fixture = get_fixture();
        let too_short = NewTransactionData {
            description: " ab ".to_owned(),
            ..valid_data(fixture.groceries)
        };
        let three_emoji = NewTransactionData {
            description: "👩‍👩‍👧🍕🍕".to_owned(),
            ..valid_data(fixture.groceries)
        };
        let too_long = NewTransactionData {
            description: "a".repeat(301),
            ..valid_data(fixture.groceries)
        };

        assert_validation_error(
            create_transaction(Some(fixture.alice), too_short, TODAY, &fixture.connection),
            DESCRIPTION_TOO_SHORT_MSG,
        );
        assert!(
            create_transaction(Some(fixture.alice), three_emoji, TODAY, &fixture.connection)
                .is_ok()
        );
        assert_validation_error(
            create_transaction(Some(fixture.alice), too_long, TODAY, &fixture.connection),
            DESCRIPTION_TOO_LONG_MSG,
        );
    }

    #[test]
    fn first_failing_check_wins() {
        let fixture = get_fixture();
        let everything_wrong = NewTransactionData {
            kind: CategoryType::Expense,
            category_id: None,
            date: date!(2030 - 01 - 01),
            amount: 0.0,
            description: String::new(),
        };
        let wrong_date_and_amount = NewTransactionData {
            date: date!(2030 - 01 - 01),
            amount: 0.0,
            ..valid_data(fixture.groceries)
        };

        assert_validation_error(
            create_transaction(
                Some(fixture.alice),
                everything_wrong,
                TODAY,
                &fixture.connection,
            ),
            SELECT_CATEGORY_MSG,
        );
        assert_validation_error(
            create_transaction(
                Some(fixture.alice),
                wrong_date_and_amount,
                TODAY,
                &fixture.connection,
            ),
            FUTURE_DATE_MSG,
        );
    }

    #[test]
    fn delete_removes_own_transaction() {
        let fixture = get_fixture();
        let transaction = create_transaction(
            Some(fixture.alice),
            valid_data(fixture.groceries),
            TODAY,
            &fixture.connection,
        )
        .unwrap();

        let result = delete_transaction(Some(fixture.alice), transaction.id, &fixture.connection);

        assert_eq!(result, Ok(()));
        assert_eq!(count_transactions(&fixture.connection), 0);
    }

    #[test]
    fn delete_of_other_users_transaction_is_rejected() {
        let fixture = get_fixture();
        let transaction = create_transaction(
            Some(fixture.alice),
            valid_data(fixture.groceries),
            TODAY,
            &fixture.connection,
        )
        .unwrap();

        let result = delete_transaction(Some(fixture.bob), transaction.id, &fixture.connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(count_transactions(&fixture.connection), 1);
    }

    #[test]
    fn deleting_twice_is_a_benign_error() {
        let fixture = get_fixture();
        let transaction = create_transaction(
            Some(fixture.alice),
            valid_data(fixture.groceries),
            TODAY,
            &fixture.connection,
        )
        .unwrap();
        delete_transaction(Some(fixture.alice), transaction.id, &fixture.connection).unwrap();

        let result = delete_transaction(Some(fixture.alice), transaction.id, &fixture.connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn delete_without_identity_is_unauthorized() {
        let fixture = get_fixture();

        assert_eq!(
            delete_transaction(None, 1, &fixture.connection),
            Err(Error::Unauthorized)
        );
    }
}
