use std::collections::HashMap;

use http::Method;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::HandlerError;
use crate::model::JsonObject;
use crate::query::ListQuery;
use crate::response::MockResponse;

/// A URL pattern like `/faults/alarms/{id}/acknowledge`. Literal segments
/// match exactly; `{name}` segments capture one path segment. Trailing
/// slashes are insignificant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| {
                if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Segment::Param(name.to_string())
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// Match a concrete request path, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    /// True when this pattern captures every path the other pattern would
    /// match. A parameterized route registered before a literal route of
    /// the same shape shadows it completely.
    pub fn shadows(&self, other: &PathPattern) -> bool {
        if self.segments.len() != other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(mine, theirs)| match (mine, theirs) {
                (Segment::Param(_), _) => true,
                (Segment::Literal(a), Segment::Literal(b)) => a == b,
                (Segment::Literal(_), Segment::Param(_)) => false,
            })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Everything a handler may inspect about an intercepted request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub params: HashMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestContext {
    /// A captured path parameter. Only called for names the matched
    /// pattern declares, so a miss is a routing bug, not a client error.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn list_query(&self) -> Result<ListQuery, HandlerError> {
        ListQuery::from_pairs(&self.query).map_err(HandlerError::BadRequest)
    }

    /// The request body as a JSON object; 400 when absent or not an object.
    pub fn body_object(&self) -> Result<&JsonObject, HandlerError> {
        self.body
            .as_ref()
            .and_then(Value::as_object)
            .ok_or(HandlerError::MissingBody)
    }

    /// Deserialize the JSON body into a typed shape (usually a resource's
    /// `…Overrides` struct); 400 on a type mismatch.
    pub fn body_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let object = self.body_object()?;
        serde_json::from_value(Value::Object(object.clone()))
            .map_err(|e| HandlerError::bad_request(format!("invalid request body: {}", e)))
    }

    /// Required string field of the JSON body; 400 when missing or empty.
    pub fn required_str(&self, field: &str) -> Result<String, HandlerError> {
        let value = self
            .body_object()?
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        if value.is_empty() {
            return Err(HandlerError::bad_request(format!(
                "{} is required",
                field
            )));
        }
        Ok(value)
    }
}

pub type Handler = Box<dyn Fn(&RequestContext) -> Result<MockResponse, HandlerError> + Send + Sync>;

struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

/// Ordered route table. Dispatch walks the registration order and takes
/// the first match, so specific literal routes (`/subscribers/summary`)
/// must be registered before parameterized ones (`/subscribers/{id}`)
/// that would otherwise capture the literal segment as an ID.
#[derive(Default)]
pub struct MockRouter {
    routes: Vec<Route>,
}

impl MockRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Result<MockResponse, HandlerError> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            handler: Box::new(handler),
        });
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Result<MockResponse, HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Result<MockResponse, HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Result<MockResponse, HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Result<MockResponse, HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Result<MockResponse, HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Resolve a request against the table: first matching route wins, a
    /// miss is a 404 with an `{"error": ...}` body.
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> MockResponse {
        let matched = self
            .routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)));

        let Some((route, params)) = matched else {
            return MockResponse::with_status(
                http::StatusCode::NOT_FOUND,
                json!({ "error": format!("no handler for {} {}", method, path) }),
            );
        };

        debug!(%method, path, pattern = route.pattern.as_str(), "dispatching mock route");
        let ctx = RequestContext {
            method: method.clone(),
            path: path.to_string(),
            params,
            query,
            body,
        };
        match (route.handler)(&ctx) {
            Ok(response) => response,
            Err(error) => error.into_response(),
        }
    }

    /// Registration-order lint: every `(shadowing, shadowed)` pattern pair
    /// where a later route can never be reached because an earlier route
    /// with the same method captures all of its requests. A non-empty
    /// result means the registry is misordered.
    pub fn shadowed_routes(&self) -> Vec<(String, String)> {
        let mut shadowed = Vec::new();
        for (i, earlier) in self.routes.iter().enumerate() {
            for later in &self.routes[i + 1..] {
                if earlier.method == later.method && earlier.pattern.shadows(&later.pattern) {
                    shadowed.push((
                        earlier.pattern.as_str().to_string(),
                        later.pattern.as_str().to_string(),
                    ));
                }
            }
        }
        shadowed
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
