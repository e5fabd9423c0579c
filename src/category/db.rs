//! Database operations for categories. Every query is scoped to a single user.

use std::collections::HashMap;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryName, CategoryType},
    database_id::CategoryId,
};

/// The categories every new user starts with.
const DEFAULT_CATEGORIES: [(&str, CategoryType); 11] = [
    ("Salary", CategoryType::Income),
    ("Rental Income", CategoryType::Income),
    ("Business", CategoryType::Income),
    ("Investments", CategoryType::Income),
    ("Other", CategoryType::Income),
    ("Housing", CategoryType::Expense),
    ("Groceries", CategoryType::Expense),
    ("Transport", CategoryType::Expense),
    ("Entertainment", CategoryType::Expense),
    ("Health", CategoryType::Expense),
    ("Other", CategoryType::Expense),
];

/// Initialize the category table and indexes.
///
/// Names are unique per user and type, so a user can have an income and an
/// expense category with the same name, e.g. "Other".
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            UNIQUE(user_id, type, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// of the same type with that name.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    kind: CategoryType,
    connection: &Connection,
) -> Result<Category, Error> {
    let result = connection.query_row(
        "INSERT INTO category (user_id, name, type) VALUES (?1, ?2, ?3) RETURNING id",
        (user_id.as_i64(), name.as_ref(), kind),
        |row| row.get(0),
    );

    let id = match result {
        Ok(id) => id,
        Err(rusqlite::Error::SqliteFailure(error, _))
            if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }
        Err(error) => return Err(error.into()),
    };

    Ok(Category {
        id,
        user_id,
        name,
        kind,
    })
}

/// Give a new user the default income and expense categories.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    for (name, kind) in DEFAULT_CATEGORIES {
        create_category(user_id, CategoryName::new_unchecked(name), kind, connection)?;
    }

    Ok(())
}

/// Get one of the user's categories.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, user_id, name, type FROM category WHERE id = :id AND user_id = :user_id")?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Get all of the user's categories, income first, then alphabetically.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type FROM category WHERE user_id = :user_id
            ORDER BY type DESC, name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Get all of the user's categories keyed by ID.
pub fn get_categories_by_id(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<CategoryId, Category>, Error> {
    Ok(get_categories(user_id, connection)?
        .into_iter()
        .map(|category| (category.id, category))
        .collect())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_name: String = row.get(2)?;
    let kind = row.get(3)?;

    Ok(Category {
        id,
        user_id,
        name: CategoryName::new_unchecked(&raw_name),
        kind,
    })
}
