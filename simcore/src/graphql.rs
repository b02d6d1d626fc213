use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// A GraphQL POST body. The mock matches by operation name rather than
/// executing the query, so `query` is only consulted when `operationName`
/// is absent.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLRequest {
    #[serde(default)]
    pub query: String,
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Value,
}

impl GraphQLRequest {
    /// The explicit `operationName`, falling back to the first named
    /// operation in the query text.
    pub fn resolved_operation_name(&self) -> Option<String> {
        if let Some(name) = &self.operation_name {
            if !name.is_empty() {
                return Some(name.clone());
            }
        }
        static OPERATION_NAME: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b(?:query|mutation|subscription)\s+([A-Za-z_][A-Za-z0-9_]*)")
                .expect("operation name regex")
        });
        OPERATION_NAME
            .captures(&self.query)
            .map(|captures| captures[1].to_string())
    }
}

pub type OperationHandler = Box<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Ordered registry of GraphQL operations. Responses follow the GraphQL
/// transport convention: HTTP 200 with either `data` or `errors`.
#[derive(Default)]
pub struct GraphQLRegistry {
    operations: Vec<(String, OperationHandler)>,
}

impl GraphQLRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.operations.push((name.to_string(), Box::new(handler)));
        self
    }

    pub fn dispatch(&self, request: &GraphQLRequest) -> Value {
        let Some(name) = request.resolved_operation_name() else {
            return errors_body("request carries no operation name");
        };
        let Some((_, handler)) = self.operations.iter().find(|(n, _)| *n == name) else {
            return errors_body(&format!("unknown operation: {}", name));
        };
        debug!(operation = %name, "dispatching graphql operation");
        match handler(&request.variables) {
            Ok(data) => json!({ "data": data }),
            Err(message) => errors_body(&message),
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn errors_body(message: &str) -> Value {
    json!({ "errors": [{ "message": message }] })
}

/// Recursively rename snake_case object keys to camelCase, so snake_case
/// seed data comes back shaped like a generated GraphQL schema.
pub fn camelize(value: &Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(key, v)| (snake_to_camel(key), camelize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(camelize).collect()),
        other => other.clone(),
    }
}

fn snake_to_camel(key: &str) -> String {
    let mut result = String::with_capacity(key.len());
    let mut uppercase_next = false;
    for c in key.chars() {
        if c == '_' {
            uppercase_next = true;
        } else if uppercase_next {
            result.extend(c.to_uppercase());
            uppercase_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
