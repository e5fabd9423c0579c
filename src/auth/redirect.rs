//! Builds the log-in URL that sends the user back to where they were.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

/// Reduce `raw_url` to a same-site path and query, or `None` if it points elsewhere.
///
/// Absolute URLs are only accepted when `allow_absolute` is set, which is the
/// case for the HX-Current-URL header. Their scheme and host are discarded.
/// The log-in page itself is never a valid target.
fn to_local_path(raw_url: &str, allow_absolute: bool) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if !allow_absolute && (uri.scheme().is_some() || uri.authority().is_some()) {
        return None;
    }

    let path_and_query = uri.path_and_query()?;
    let is_local = path_and_query.path().starts_with('/')
        && !path_and_query.path().starts_with("//")
        && path_and_query.path() != endpoints::LOG_IN_VIEW;

    is_local.then(|| path_and_query.as_str().to_owned())
}

/// Return `raw_url` if it is a safe relative URL to redirect to after log-in.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    to_local_path(raw_url, false)
}

/// Build the log-in URL for a request that was rejected by the auth guard.
///
/// Page requests return to their own URL. API requests come from HTMX, so
/// they return to the page named in the HX-Current-URL header instead.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let redirect_url = to_local_path(current_url, true);
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
