use crate::auth::Role;
use crate::error::{AssertionFailure, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Headers for one identity, ready to receive a method, URL, query and body.
///
/// The `Authorization` value is copied when the spec is built. A token refreshed
/// later does not change specs that already exist.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    http: reqwest::Client,
    role: Role,
    headers: HeaderMap,
}

impl RequestSpec {
    pub(crate) fn new(
        http: reqwest::Client,
        role: Role,
        authorization: Option<HeaderValue>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, value);
        }
        Self {
            http,
            role,
            headers,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url).headers(self.headers.clone())
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Sends the request and reads the whole body before returning.
    pub async fn send(&self, builder: RequestBuilder) -> Result<ApiResponse> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = match request.url().query() {
            Some(query) => format!("{}?{}", request.url().path(), query),
            None => request.url().path().to_string(),
        };

        debug!("{} {} as {}", method, path, self.role);
        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} {} -> {}", method, path, status);

        Ok(ApiResponse {
            method,
            path,
            status,
            body,
        })
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn expect_status(
        self,
        expected: StatusCode,
    ) -> std::result::Result<Self, AssertionFailure> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(AssertionFailure::Status {
                method: self.method,
                path: self.path,
                expected,
                actual: self.status,
                body: self.body,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, AssertionFailure> {
        serde_json::from_str(&self.body).map_err(|err| AssertionFailure::Body {
            method: self.method.clone(),
            path: self.path.clone(),
            model: std::any::type_name::<T>(),
            reason: err.to_string(),
        })
    }

    /// Status check followed by body parsing.
    pub fn expect_json<T: DeserializeOwned>(
        self,
        expected: StatusCode,
    ) -> std::result::Result<T, AssertionFailure> {
        self.expect_status(expected)?.json()
    }
}
