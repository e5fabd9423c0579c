//! Income and expense categories.
//!
//! Every transaction belongs to exactly one category and the category's type
//! decides whether the transaction's amount counts as income or as an expense.

mod create_endpoint;
mod db;
mod domain;
mod page;

pub use crate::database_id::CategoryId;
pub use create_endpoint::create_category_endpoint;
pub use db::{
    create_category, create_category_table, get_categories, get_categories_by_id, get_category,
    seed_default_categories,
};
pub use domain::{Category, CategoryFormData, CategoryName, CategoryType};
pub use page::get_categories_page;
pub(crate) use page::badge as category_type_badge;
