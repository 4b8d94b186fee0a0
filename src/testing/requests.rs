//! HTTP request builders for testing handlers

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::test::TestRequest;
use actix_web::HttpRequest;
use serde_json::{json, Value};

use super::constants::{TEST_EMAIL, TEST_PASSWORD};

/// Builder for creating HTTP requests for testing
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    cookies: Vec<Cookie<'static>>,
    body: Option<Value>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: "/".to_string(),
            headers: Vec::new(),
            cookies: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_string();
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Add a `session` cookie with a raw token value
    #[must_use]
    pub fn with_session_token(self, token: &str) -> Self {
        self.with_cookie(Cookie::new(crate::session::SESSION_COOKIE_NAME, token.to_string()))
    }

    #[must_use]
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Finish as a `TestRequest`, e.g. for `.to_request()` with `test::call_service`
    #[must_use]
    pub fn into_test_request(self) -> TestRequest {
        let mut req = TestRequest::default()
            .method(self.method)
            .uri(&self.uri);

        for (name, value) in self.headers {
            req = req.insert_header((name, value));
        }

        for cookie in self.cookies {
            req = req.cookie(cookie);
        }

        if let Some(body) = self.body {
            req = req.set_json(body);
        }

        req
    }

    /// Build an `HttpRequest` for calling policy methods directly
    #[must_use]
    pub fn build(self) -> HttpRequest {
        self.into_test_request().to_http_request()
    }
}

/// Quick builder functions for common request types
impl RequestBuilder {
    /// `GET uri` carrying the given cookie
    #[must_use]
    pub fn get_with_cookie(uri: &str, cookie: Cookie<'static>) -> Self {
        Self::new().uri(uri).with_cookie(cookie)
    }

    /// `POST /auth/login` with the default test credentials
    #[must_use]
    pub fn login() -> Self {
        Self::login_as(TEST_EMAIL, TEST_PASSWORD, None)
    }

    /// `POST /auth/login` with explicit credentials
    #[must_use]
    pub fn login_as(email: &str, password: &str, redirect: Option<&str>) -> Self {
        let mut body = json!({ "email": email, "password": password });
        if let Some(redirect) = redirect {
            body["redirect"] = json!(redirect);
        }
        Self::new()
            .method(Method::POST)
            .uri("/auth/login")
            .header("Accept", "application/json")
            .json_body(body)
    }
}
