//! Response descriptor produced by the pipeline.
//!
//! # Responsibilities
//! - Carry status, ordered multi-value headers and an optional redirect
//! - Convert into an HTTP response or merge into a downstream one
//!
//! # Design Decisions
//! - A redirect is always 307 so the method and body are preserved
//! - Header values that cannot be encoded are dropped with a warning
//!   instead of failing the request

use axum::body::Body;
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

/// Status, headers and redirect target computed for one request.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    status: StatusCode,
    headers: HeaderMap,
    redirect_to: Option<String>,
}

impl ResponseDescriptor {
    /// A response that lets the request continue to the downstream handler.
    pub fn pass_through() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            redirect_to: None,
        }
    }

    /// A 307 redirect. `location` must already be built from screened parts.
    pub fn redirect(location: String) -> Self {
        let mut response = Self {
            status: StatusCode::TEMPORARY_REDIRECT,
            headers: HeaderMap::new(),
            redirect_to: None,
        };
        let location = if response.insert_header(LOCATION, &location) {
            location
        } else {
            response.insert_header(LOCATION, "/");
            "/".to_string()
        };
        response.redirect_to = Some(location);
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn redirect_to(&self) -> Option<&str> {
        self.redirect_to.as_deref()
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect_to.is_some()
    }

    /// First value of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every value of `name`, in insertion order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Replace `name`. Returns false when `value` is not a valid header value.
    pub fn insert_header(&mut self, name: HeaderName, value: &str) -> bool {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
                true
            }
            Err(_) => {
                tracing::warn!(header = %name, "Dropping unencodable header value");
                false
            }
        }
    }

    /// Add another value for `name`.
    pub fn append_header(&mut self, name: HeaderName, value: &str) -> bool {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.append(name, value);
                true
            }
            Err(_) => {
                tracing::warn!(header = %name, "Dropping unencodable header value");
                false
            }
        }
    }

    /// Copy these headers onto a downstream response. `Set-Cookie` values are
    /// added next to the handler's own; every other header is overwritten.
    pub fn merge_into(&self, target: &mut HeaderMap) {
        for (name, value) in self.headers.iter() {
            if *name == SET_COOKIE {
                target.append(name.clone(), value.clone());
            } else {
                target.insert(name.clone(), value.clone());
            }
        }
    }

    /// JSON view for the CLI and logs.
    pub fn to_json(&self) -> Value {
        let headers: Vec<Value> = self
            .headers
            .iter()
            .map(|(name, value)| json!([name.as_str(), value.to_str().unwrap_or_default()]))
            .collect();
        json!({
            "status": self.status.as_u16(),
            "headers": headers,
            "redirect_to": self.redirect_to,
        })
    }
}

impl IntoResponse for ResponseDescriptor {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
