//! Dismissible alerts for reporting the outcome of HTMX requests.
//!
//! Alerts are swapped into the `#alert-container` element in the page's base
//! template, either as the target of an error response or out-of-band next to
//! a successful response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// An alert message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    SuccessSimple { message: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::SuccessSimple { .. })
    }

    fn message(&self) -> &str {
        match self {
            Alert::SuccessSimple { message }
            | Alert::Error { message, .. }
            | Alert::ErrorSimple { message } => message,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Alert::Error { details, .. } => Some(details),
            Alert::SuccessSimple { .. } | Alert::ErrorSimple { .. } => None,
        }
    }

    pub fn into_html(self) -> Markup {
        let container_style = if self.is_success() {
            "flex items-start justify-between gap-3 p-4 rounded-lg shadow \
            text-lime-800 bg-lime-50 border border-lime-300 \
            dark:bg-gray-800 dark:text-lime-400 dark:border-lime-800"
        } else {
            "flex items-start justify-between gap-3 p-4 rounded-lg shadow \
            text-red-800 bg-red-50 border border-red-300 \
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        };
        let role = if self.is_success() { "status" } else { "alert" };

        html! {
            div class=(container_style) role=(role)
            {
                div
                {
                    p class="font-semibold" { (self.message()) }

                    @if let Some(details) = self.details() {
                        p class="text-sm mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    class="text-sm font-medium opacity-70 hover:opacity-100"
                    aria-label="Dismiss"
                    onclick="this.closest('#alert-container').classList.add('hidden')"
                {
                    "✕"
                }
            }
        }
    }

    /// Render the alert wrapped in an out-of-band swap for `#alert-container`.
    ///
    /// Use this to append an alert to a response whose main content targets
    /// another element.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                (self.into_html())
            }
        }
    }

    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        (status_code, self.into_html()).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_response_with_status(StatusCode::OK)
    }
}
