//! The categories page: the user's categories grouped by type and a form for adding one.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryType, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, EXPENSE_BADGE_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, INCOME_BADGE_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page for the logged in user.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    user_id: Option<Extension<UserID>>,
) -> Result<Response, Error> {
    let Extension(user_id) = user_id.ok_or(Error::Unauthorized)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(categories_view(&categories).into_response())
}

/// A coloured label showing whether a category is income or an expense.
pub(crate) fn badge(kind: CategoryType) -> Markup {
    let style = match kind {
        CategoryType::Income => INCOME_BADGE_STYLE,
        CategoryType::Expense => EXPENSE_BADGE_STYLE,
    };

    html!( span class=(style) { (kind.label()) } )
}

fn category_list(title: &str, kind: CategoryType, categories: &[Category]) -> Markup {
    html! {
        section class="w-full"
        {
            h2 class="text-lg font-semibold mb-2" { (title) }

            ul class="divide-y divide-gray-200 dark:divide-gray-700 bg-white dark:bg-gray-800 rounded shadow"
            {
                @for category in categories.iter().filter(|category| category.kind == kind) {
                    li class="flex items-center justify-between px-4 py-3"
                    {
                        span { (category.name) }
                        (badge(kind))
                    }
                } @if !categories.iter().any(|category| category.kind == kind) {
                    li class="px-4 py-3 text-gray-500 dark:text-gray-400" { "No categories yet." }
                }
            }
        }
    }
}

fn new_category_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Utilities"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset class=(FORM_RADIO_GROUP_STYLE)
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                @for kind in [CategoryType::Expense, CategoryType::Income] {
                    @let id = format!("category-type-{}", kind.as_str());

                    div class="flex-1"
                    {
                        input
                            id=(id)
                            type="radio"
                            name="type_"
                            value=(kind.as_str())
                            required
                            checked[kind == CategoryType::Expense]
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (kind.label()) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl grid grid-cols-1 md:grid-cols-2 gap-6"
            {
                (category_list("Income", CategoryType::Income, categories))
                (category_list("Expenses", CategoryType::Expense, categories))
            }

            div class="w-full max-w-md mt-8"
            {
                h2 class="text-lg font-semibold mb-2" { "New Category" }
                (new_category_form())
            }
        }
    };

    base("Categories", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        category::seed_default_categories,
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, insert_test_user,
            must_get_form, parse_html_document,
        },
    };

    use super::{CategoriesPageState, get_categories_page};

    #[tokio::test]
    async fn lists_users_categories_and_form() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = insert_test_user("test@example.com", &connection);
        seed_default_categories(user_id, &connection).unwrap();
        let state = CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_categories_page(State(state), Some(Extension(user_id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let items = document
            .select(&Selector::parse("section li").unwrap())
            .count();
        assert_eq!(items, 11);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::CATEGORIES_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "type_", "radio");
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let state = CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = get_categories_page(State(state), None).await;

        assert!(matches!(result, Err(crate::Error::Unauthorized)));
    }
}
