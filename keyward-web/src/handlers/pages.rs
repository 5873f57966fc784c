//! Rendered pages

use super::types::StatusQuery;
use crate::{
    auth::{OptionalSession, SessionUser},
    templates::{HtmlTemplate, LoginTemplate, RegisterTemplate, WelcomeTemplate},
};
use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};

/// Human-readable text for a status code carried in the query string.
///
/// Unknown codes are dropped rather than echoed back.
pub fn status_text(code: &str) -> Option<&'static str> {
    match code {
        "RegisteredSuccessfully" => Some("Registration successful, please log in."),
        "logOutSuccessful" => Some("You have been logged out."),
        "UserExists" => Some("That username is already taken."),
        "MissingCredentials" => Some("Please enter a username and a password."),
        "StorageUnavailable" => Some("Registration is temporarily unavailable, please try again later."),
        "ServerError" => Some("Something went wrong, please try again."),
        _ => None,
    }
}

fn lookup(code: Option<&str>) -> Option<String> {
    code.and_then(status_text).map(str::to_string)
}

/// `/` sends visitors to the welcome view or the login form
pub async fn index(OptionalSession(session): OptionalSession) -> Redirect {
    match session {
        Some(_) => Redirect::to("/welcome"),
        None => Redirect::to("/login"),
    }
}

pub async fn login_page(Query(query): Query<StatusQuery>) -> Response {
    HtmlTemplate(LoginTemplate::new(
        lookup(query.msg.as_deref()),
        lookup(query.error.as_deref()),
    ))
    .into_response()
}

pub async fn register_page(Query(query): Query<StatusQuery>) -> Response {
    HtmlTemplate(RegisterTemplate::new(lookup(query.error.as_deref()))).into_response()
}

/// Only reachable with a live session; anonymous requests are redirected by the extractor
pub async fn welcome_page(user: SessionUser) -> Response {
    HtmlTemplate(WelcomeTemplate::new(user.username)).into_response()
}
