//! The transport-neutral request model.
//!
//! Binding only needs four things from a request: the method, the
//! Content-Type header, the raw query string, and the body bytes. Keeping
//! the model this small lets any server stack feed the dispatcher without
//! an adapter crate.

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// Whether requests with this method carry a body worth decoding.
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

/// A request as the binder sees it.
///
/// `content_type` is the raw header value, empty when the header is
/// absent. `query` is the raw (still percent-encoded) query string without
/// the leading `?`. Built with the `with_*` chain:
///
/// ```
/// use clasp_http::{Method, Request};
///
/// let req = Request::new(Method::Post)
///     .with_content_type("application/x-www-form-urlencoded")
///     .with_body("title=Hello");
/// assert_eq!(req.content_type(), "application/x-www-form-urlencoded");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Method,
    content_type: String,
    query: String,
    body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            content_type: String::new(),
            query: String::new(),
            body: Vec::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the query string; a leading `?` is stripped.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query: String = query.into();
        self.query = match query.strip_prefix('?') {
            Some(rest) => rest.to_owned(),
            None => query,
        };
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_bearing_methods() {
        assert!(Method::Post.allows_body());
        assert!(Method::Put.allows_body());
        assert!(Method::Patch.allows_body());
        assert!(!Method::Get.allows_body());
        assert!(!Method::Head.allows_body());
        assert!(!Method::Delete.allows_body());
    }

    #[test]
    fn query_prefix_stripped() {
        let req = Request::new(Method::Get).with_query("?a=1&b=2");
        assert_eq!(req.query(), "a=1&b=2");
        let req = Request::new(Method::Get).with_query("a=1");
        assert_eq!(req.query(), "a=1");
    }
}
