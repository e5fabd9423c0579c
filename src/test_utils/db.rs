use rusqlite::Connection;

use crate::auth::{PasswordHash, UserID, create_user, parse_email};

/// Insert a user with a throwaway password hash and return their ID.
#[track_caller]
pub(crate) fn insert_test_user(email: &str, connection: &Connection) -> UserID {
    let email = parse_email(email).expect("Could not parse test email");

    create_user(
        &email,
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
    .id
}
