//! HTTP-only token cookies.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};
use schedman_core::errors::{ManagerError, ManagerResult};

use crate::config::CookieConfig;

/// `Set-Cookie` value carrying `value` for `max_age` seconds.
pub fn token_cookie(
    name: &str,
    value: &str,
    max_age: i64,
    config: &CookieConfig,
) -> ManagerResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
        name, value, max_age, config.same_site
    );
    if config.secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).map_err(|e| ManagerError::Internal(Box::new(e)))
}

/// `Set-Cookie` value that makes the browser drop `name`.
pub fn clear_cookie(name: &str, config: &CookieConfig) -> ManagerResult<HeaderValue> {
    token_cookie(name, "", 0, config)
}

/// Value of the request cookie `name`, if present and non-empty.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Appends every cookie in `cookies` to `headers`.
pub fn append_cookies(headers: &mut HeaderMap, cookies: Vec<HeaderValue>) {
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_cookie_attributes() {
        let config = CookieConfig::default();
        let cookie = token_cookie("access_token", "abc", 300, &config).unwrap();

        assert_eq!(
            cookie.to_str().unwrap(),
            "access_token=abc; Path=/; Max-Age=300; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_secure_cookie_and_clear() {
        let config = CookieConfig {
            secure: true,
            same_site: "Strict".to_string(),
            ..CookieConfig::default()
        };
        let cookie = clear_cookie("refresh_token", &config).unwrap();

        assert_eq!(
            cookie.to_str().unwrap(),
            "refresh_token=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict; Secure"
        );
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; access_token=tok; refresh_token="),
        );

        assert_eq!(read_cookie(&headers, "access_token"), Some("tok".to_string()));
        assert_eq!(read_cookie(&headers, "refresh_token"), None);
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
