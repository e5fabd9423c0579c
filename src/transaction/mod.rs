//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the user-scoped database queries
//! - The validated create and delete actions
//! - View handlers for transaction-related web pages

mod actions;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod table;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, create_transaction_table, get_recent_transactions,
    get_transaction_year_range, get_transactions_for_year, insert_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_new_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use table::{TransactionTableRow, transaction_table};
pub use transactions_page::get_transactions_page;
