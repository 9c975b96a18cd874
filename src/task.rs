//! Immutable description of one outbound request.

use serde_json::{Map, Value};

use crate::api::Endpoint;

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One unit of outbound work: a single request against one endpoint.
///
/// Tasks are built by the resource modules, carry everything the transport
/// needs (verb, endpoint, query, headers, form body), and are consumed
/// exactly once by the request pool.
#[derive(Debug, Clone)]
pub struct Task {
    method: Method,
    endpoint: Endpoint,
    path_param: Option<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Map<String, Value>>,
}

impl Task {
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            path_param: None,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set the path parameter substituted into the endpoint template.
    pub fn path_param(mut self, value: impl Into<String>) -> Self {
        self.path_param = Some(value.into());
        self
    }

    /// Append one query pair.
    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a set of query pairs.
    pub fn query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Append one header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Attach a form body sent on write operations.
    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers_ref(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body_ref(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()
    }

    /// Resolve the endpoint template against the path parameter.
    pub fn resolve_path(&self) -> String {
        self.endpoint.resolve(self.path_param.as_deref())
    }
}
