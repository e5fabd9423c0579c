//! The transaction table shared by the transactions page and the dashboard.

use std::collections::HashMap;

use maud::{Markup, html};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    category::{Category, CategoryType, category_type_badge},
    database_id::{CategoryId, TransactionId},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
    transaction::Transaction,
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 40;

const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day] [month repr:short] [year]");

/// A transaction joined with its category, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionTableRow {
    pub id: TransactionId,
    pub date: Date,
    pub description: String,
    pub category_name: Option<String>,
    pub kind: Option<CategoryType>,
    /// Negative for expenses.
    pub signed_amount: f64,
}

impl TransactionTableRow {
    /// Join `transaction` with its category from `categories`.
    ///
    /// A transaction whose category cannot be found keeps its unsigned amount
    /// and is shown without a category.
    pub fn new(transaction: &Transaction, categories: &HashMap<CategoryId, Category>) -> Self {
        let category = categories.get(&transaction.category_id);
        let kind = category.map(|category| category.kind);
        let signed_amount = match kind {
            Some(CategoryType::Expense) => -transaction.amount,
            _ => transaction.amount,
        };

        Self {
            id: transaction.id,
            date: transaction.date,
            description: transaction.description.clone(),
            category_name: category.map(|category| category.name.to_string()),
            kind,
            signed_amount,
        }
    }
}

fn amount_class(kind: Option<CategoryType>) -> &'static str {
    match kind {
        Some(CategoryType::Income) => "text-lime-700 dark:text-lime-400",
        Some(CategoryType::Expense) => "text-orange-700 dark:text-orange-400",
        None => "text-gray-500 dark:text-gray-400",
    }
}

fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

fn truncate_description(description: &str) -> (String, Option<&str>) {
    if description.graphemes(true).count() <= MAX_DESCRIPTION_GRAPHEMES {
        return (description.to_owned(), None);
    }

    let truncated: String = description
        .graphemes(true)
        .take(MAX_DESCRIPTION_GRAPHEMES)
        .collect();

    (format!("{truncated}…"), Some(description))
}

fn transaction_row_view(row: &TransactionTableRow, show_delete: bool) -> Markup {
    let (description, tooltip) = truncate_description(&row.description);
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, row.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        row.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(row.date) { (format_date(row.date)) }
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                @match (&row.category_name, row.kind) {
                    (Some(name), Some(kind)) => {
                        span class="mr-2" { (name) }
                        (category_type_badge(kind))
                    }
                    _ => {
                        span class="text-gray-400 dark:text-gray-500" { "-" }
                    }
                }
            }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(row.kind)) }
            {
                (format_currency(row.signed_amount))
            }
            @if show_delete {
                td class=(TABLE_CELL_STYLE)
                {
                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="outerHTML swap:0.5s"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// Render `rows` as a table, with a delete button per row when `show_delete` is set.
pub fn transaction_table(
    rows: &[TransactionTableRow],
    show_delete: bool,
    empty_message: &str,
) -> Markup {
    let column_count = if show_delete { 5 } else { 4 };

    html! {
        div class="overflow-x-auto rounded shadow"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        @if show_delete {
                            th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                        }
                    }
                }

                tbody
                {
                    @for row in rows {
                        (transaction_row_view(row, show_delete))
                    }

                    @if rows.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td
                                colspan=(column_count)
                                data-empty-state="true"
                                class="px-6 py-4 text-center"
                            {
                                (empty_message)
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use time::macros::date;

    use crate::{
        auth::UserID,
        category::{Category, CategoryName, CategoryType},
        transaction::Transaction,
    };

    use super::{TransactionTableRow, format_date, truncate_description};

    fn transaction(category_id: i64) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            amount: 40.0,
            category_id,
            date: date!(2024 - 01 - 20),
            description: "Groceries".to_owned(),
        }
    }

    fn categories() -> HashMap<i64, Category> {
        HashMap::from([(
            7,
            Category {
                id: 7,
                user_id: UserID::new(1),
                name: CategoryName::new_unchecked("Food"),
                kind: CategoryType::Expense,
            },
        )])
    }

    #[test]
    fn expense_amounts_are_negative() {
        let row = TransactionTableRow::new(&transaction(7), &categories());

        assert_eq!(row.signed_amount, -40.0);
        assert_eq!(row.category_name.as_deref(), Some("Food"));
        assert_eq!(row.kind, Some(CategoryType::Expense));
    }

    #[test]
    fn unknown_category_keeps_amount_without_category() {
        let row = TransactionTableRow::new(&transaction(99), &categories());

        assert_eq!(row.signed_amount, 40.0);
        assert_eq!(row.category_name, None);
        assert_eq!(row.kind, None);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "a".repeat(50);

        let (shown, tooltip) = truncate_description(&long);

        assert_eq!(shown, format!("{}…", "a".repeat(40)));
        assert_eq!(tooltip, Some(long.as_str()));
        assert_eq!(truncate_description("short"), ("short".to_owned(), None));
    }

    #[test]
    fn dates_use_short_month_names() {
        assert_eq!(format_date(date!(2024 - 01 - 05)), "05 Jan 2024");
    }
}
