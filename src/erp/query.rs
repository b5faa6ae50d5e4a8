//! Resource identifiers and list queries

use serde_json::Value;

/// A single document address: (doctype, name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub doctype: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(doctype: &str, name: &str) -> Self {
        Self {
            doctype: doctype.to_string(),
            name: name.to_string(),
        }
    }
}

/// Description of a list request against one doctype
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListQuery {
    pub doctype: String,
    pub fields: Option<Vec<String>>,
    pub filters: Option<Value>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new(doctype: &str) -> Self {
        Self {
            doctype: doctype.to_string(),
            ..Default::default()
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query string parameters for `GET /api/resource/{doctype}`
    ///
    /// `fields` and `filters` are JSON-encoded; `limit` is skipped when zero.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(fields) = &self.fields {
            pairs.push(("fields", Value::from(fields.clone()).to_string()));
        }
        if let Some(filters) = &self.filters {
            pairs.push(("filters", filters.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }

        pairs
    }
}
