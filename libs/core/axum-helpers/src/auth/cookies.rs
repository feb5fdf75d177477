//! Auth cookie builders shared by the login/logout handlers.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// `access_token` cookie, valid for 1 day.
pub fn access_cookie(token: String, secure: bool) -> Cookie<'static> {
    build(ACCESS_TOKEN_COOKIE, token, Duration::days(1), secure)
}

/// `refresh_token` cookie, valid for 7 days.
pub fn refresh_cookie(token: String, secure: bool) -> Cookie<'static> {
    build(REFRESH_TOKEN_COOKIE, token, Duration::days(7), secure)
}

/// Expired cookie that removes `name` from the client.
pub fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

fn build(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_shape() {
        let cookie = access_cookie("tok".to_string(), true);
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.max_age(), Some(Duration::days(1)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn refresh_cookie_lives_seven_days() {
        let cookie = refresh_cookie("tok".to_string(), false);
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_cookie(ACCESS_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
