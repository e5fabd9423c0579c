//! Defines the transaction model and the user-scoped database queries for transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error,
    auth::UserID,
    database_id::{CategoryId, TransactionId},
    period::{month_date_range, year_date_range},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is always positive. Whether it counts as income or an expense
/// is decided by the type of the transaction's category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

/// A transaction that has passed validation and is ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money spent or earned, must be greater than zero.
    pub amount: f64,
    /// The ID of one of the user's categories.
    pub category_id: CategoryId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT so the IDs of deleted transactions are never handed out again.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
                )",
        (),
    )?;

    // Every query filters on the owner and a date range.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Insert a new transaction for `user_id`.
///
/// The caller is responsible for validating `new_transaction`, see
/// [crate::transaction::actions::create_transaction].
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn insert_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = new_transaction.category_id;

    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, category_id, amount, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, amount, category_id, date, description",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.category_id,
                new_transaction.amount,
                new_transaction.date,
                new_transaction.description,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(category_id)),
            error => error.into(),
        })
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`.
#[cfg(test)]
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, category_id, date, description FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the user's transactions dated within `year`, oldest first.
///
/// # Errors
/// Returns an error if `year` is not a valid year or there is an SQL error.
pub fn get_transactions_for_year(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = year_date_range(year)?;

    get_transactions_between(user_id, start, end, "ASC", connection)
}

/// Get the user's transactions dated within `month` of `year`, newest first.
///
/// # Errors
/// Returns an error if `year` is not a valid year or there is an SQL error.
pub fn get_transactions_for_month(
    user_id: UserID,
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = month_date_range(year, month)?;

    get_transactions_between(user_id, start, end, "DESC", connection)
}

fn get_transactions_between(
    user_id: UserID,
    start: Date,
    end: Date,
    order: &str,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = format!(
        "SELECT id, user_id, amount, category_id, date, description FROM \"transaction\"
         WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
         ORDER BY date {order}, id {order}"
    );

    connection
        .prepare(&query)?
        .query_map((user_id.as_i64(), start, end), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the user's `limit` most recent transactions, newest first.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, category_id, date, description FROM \"transaction\"
             WHERE user_id = ?1
             ORDER BY date DESC, id DESC
             LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// The years of the user's oldest and newest transactions, or `None` if the
/// user has no transactions.
pub fn get_transaction_year_range(
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<(i32, i32)>, Error> {
    let (min_date, max_date): (Option<Date>, Option<Date>) = connection.query_row(
        "SELECT MIN(date), MAX(date) FROM \"transaction\" WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(min_date
        .zip(max_date)
        .map(|(min_date, max_date)| (min_date.year(), max_date.year())))
}

/// The number of rows removed by a delete statement.
pub type RowsAffected = usize;

/// Delete the transaction `id` if, and only if, it belongs to `user_id`.
///
/// Returns the number of deleted rows, which is zero when the transaction does
/// not exist or belongs to someone else.
pub fn delete_transaction_row(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(|err| err.into())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order id, user_id, amount, category_id, date, description.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let amount = row.get(2)?;
    let category_id = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;

    Ok(Transaction {
        id,
        user_id,
        amount,
        category_id,
        date,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryName, CategoryType, create_category},
        database_id::CategoryId,
        db::initialize,
        test_utils::insert_test_user,
    };

    use super::{
        NewTransaction, delete_transaction_row, get_recent_transactions, get_transaction,
        get_transaction_year_range, get_transactions_for_month, get_transactions_for_year,
        insert_transaction,
    };

    struct Fixture {
        connection: Connection,
        alice: UserID,
        bob: UserID,
        groceries: CategoryId,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = insert_test_user("alice@example.com", &connection);
        let bob = insert_test_user("bob@example.com", &connection);
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
            groceries,
        }
    }

    fn new_transaction(amount: f64, date: time::Date, category_id: CategoryId) -> NewTransaction {
        NewTransaction {
            amount,
            category_id,
            date,
            description: "Test transaction".to_owned(),
        }
    }

    #[test]
    fn insert_succeeds() {
        let fixture = get_fixture();

        let transaction = insert_transaction(
            fixture.alice,
            new_transaction(12.3, date!(2025 - 10 - 05), fixture.groceries),
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.user_id, fixture.alice);
        assert_eq!(
            get_transaction(fixture.alice, transaction.id, &fixture.connection),
            Ok(transaction)
        );
    }

    #[test]
    fn insert_fails_on_invalid_category_id() {
        let fixture = get_fixture();

        let result = insert_transaction(
            fixture.alice,
            new_transaction(12.3, date!(2025 - 10 - 05), 999),
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(999))));
    }

    #[test]
    fn insert_rejects_non_positive_amount() {
        let fixture = get_fixture();

        let result = insert_transaction(
            fixture.alice,
            new_transaction(-5.0, date!(2025 - 10 - 05), fixture.groceries),
            &fixture.connection,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn year_query_only_returns_owners_transactions_in_year() {
        let fixture = get_fixture();
        let connection = &fixture.connection;
        let bobs_category = create_category(
            fixture.bob,
            CategoryName::new_unchecked("Groceries"),
            CategoryType::Expense,
            connection,
        )
        .unwrap()
        .id;
        for date in [
            date!(2023 - 12 - 31),
            date!(2024 - 01 - 01),
            date!(2024 - 12 - 31),
            date!(2025 - 01 - 01),
        ] {
            insert_transaction(
                fixture.alice,
                new_transaction(1.0, date, fixture.groceries),
                connection,
            )
            .unwrap();
        }
        insert_transaction(
            fixture.bob,
            new_transaction(1.0, date!(2024 - 06 - 01), bobs_category),
            connection,
        )
        .unwrap();

        let transactions = get_transactions_for_year(fixture.alice, 2024, connection).unwrap();

        let dates: Vec<_> = transactions.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![date!(2024 - 01 - 01), date!(2024 - 12 - 31)]);
    }

    #[test]
    fn month_query_returns_newest_first() {
        let fixture = get_fixture();
        let connection = &fixture.connection;
        for date in [
            date!(2024 - 02 - 01),
            date!(2024 - 02 - 29),
            date!(2024 - 02 - 10),
            date!(2024 - 03 - 01),
        ] {
            insert_transaction(
                fixture.alice,
                new_transaction(1.0, date, fixture.groceries),
                connection,
            )
            .unwrap();
        }

        let transactions =
            get_transactions_for_month(fixture.alice, 2024, Month::February, connection).unwrap();

        let dates: Vec<_> = transactions.iter().map(|t| t.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 29),
                date!(2024 - 02 - 10),
                date!(2024 - 02 - 01)
            ]
        );
    }

    #[test]
    fn recent_transactions_are_limited() {
        let fixture = get_fixture();
        for day in 1..=7 {
            let date = time::Date::from_calendar_date(2024, Month::May, day).unwrap();
            insert_transaction(
                fixture.alice,
                new_transaction(day as f64, date, fixture.groceries),
                &fixture.connection,
            )
            .unwrap();
        }

        let recent = get_recent_transactions(fixture.alice, 5, &fixture.connection).unwrap();

        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].date, date!(2024 - 05 - 07));
        assert_eq!(recent[4].date, date!(2024 - 05 - 03));
    }

    #[test]
    fn year_range_is_none_without_transactions() {
        let fixture = get_fixture();

        assert_eq!(
            get_transaction_year_range(fixture.alice, &fixture.connection),
            Ok(None)
        );
    }

    #[test]
    fn year_range_spans_oldest_to_newest() {
        let fixture = get_fixture();
        for date in [date!(2021 - 07 - 01), date!(2024 - 01 - 01), date!(2019 - 03 - 04)] {
            insert_transaction(
                fixture.alice,
                new_transaction(1.0, date, fixture.groceries),
                &fixture.connection,
            )
            .unwrap();
        }

        assert_eq!(
            get_transaction_year_range(fixture.alice, &fixture.connection),
            Ok(Some((2019, 2024)))
        );
    }

    #[test]
    fn delete_only_removes_owners_row() {
        let fixture = get_fixture();
        let transaction = insert_transaction(
            fixture.alice,
            new_transaction(1.0, date!(2024 - 01 - 01), fixture.groceries),
            &fixture.connection,
        )
        .unwrap();

        let deleted_by_bob =
            delete_transaction_row(transaction.id, fixture.bob, &fixture.connection).unwrap();
        let deleted_by_alice =
            delete_transaction_row(transaction.id, fixture.alice, &fixture.connection).unwrap();

        assert_eq!(deleted_by_bob, 0);
        assert_eq!(deleted_by_alice, 1);
        assert_eq!(
            get_transaction(fixture.alice, transaction.id, &fixture.connection),
            Err(Error::NotFound)
        );
    }
}
