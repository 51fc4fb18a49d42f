//! Minimal HTTP request parsing.
//!
//! Only the request line is inspected. Headers and body are ignored, no
//! percent-decoding is applied, and any malformed input degrades to a
//! `GET /` request with no query parameters.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

/// Upper bound on the bytes read for one request.
pub const READ_CAP: usize = 1024;

/// Query key carrying the caller's passcode.
pub const PASSCODE_KEY: &str = "passcode";

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: SmolStr,
    path: String,
    query: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseError {
    NotText,
    NoRequestLine,
    NoTarget,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: SmolStr::new_static("GET"),
            path: "/".to_string(),
            query: IndexMap::new(),
        }
    }
}

impl Request {
    /// Parse a raw request buffer. Never fails.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        match Self::try_parse(raw) {
            Ok(request) => request,
            Err(err) => {
                debug!(?err, len = raw.len(), "unparseable request, serving dashboard");
                Self::default()
            }
        }
    }

    fn try_parse(raw: &[u8]) -> Result<Self, ParseError> {
        // Only the request line must be text; the read cap may split a
        // multi-byte character in a later header.
        let first = raw.split(|&byte| byte == b'\n').next().unwrap_or_default();
        let line = std::str::from_utf8(first).map_err(|_| ParseError::NotText)?;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            return Err(ParseError::NoRequestLine);
        }
        let mut tokens = line.split_whitespace();
        let method = tokens.next().ok_or(ParseError::NoRequestLine)?;
        let target = tokens.next().ok_or(ParseError::NoTarget)?;

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, IndexMap::new()),
        };
        Ok(Self {
            method: SmolStr::new(method),
            path: path.to_string(),
            query,
        })
    }

    /// Request method, unchecked by routing.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in request order.
    #[must_use]
    pub fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// Value of a query parameter, verbatim.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// The `passcode` query parameter, if supplied.
    #[must_use]
    pub fn passcode(&self) -> Option<&str> {
        self.param(PASSCODE_KEY)
    }
}

/// Split `a=1&b=2` into an ordered map. The first occurrence of a key wins;
/// a pair without `=` maps to an empty value.
fn parse_query(query: &str) -> IndexMap<String, String> {
    let mut params = IndexMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }
    params
}
