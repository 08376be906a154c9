use async_trait::async_trait;
use gloo_net::http::Request;
use log::debug;
use serde_json::Value;
use crate::api::error::QueryError;
use crate::config::Config;
use crate::session;

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read against one table of the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    /// Expect exactly one row; the store rejects zero or many.
    pub single: bool,
}

impl SelectQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            single: false,
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Renders the PostgREST query string, e.g. `select=*&id=eq.u1&order=sort_order.asc`.
    pub fn to_query_string(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };
        let mut params = vec![format!("select={}", urlencoding::encode(&columns))];

        for filter in &self.filters {
            params.push(format!(
                "{}=eq.{}",
                urlencoding::encode(&filter.column),
                urlencoding::encode(&filter.value)
            ));
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(format!("order={}.{}", urlencoding::encode(&order.column), direction));
        }

        params.join("&")
    }
}

/// Request/response access to the remote table store.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Runs `query` and returns the matching rows as JSON objects.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, QueryError>;
}

/// REST client for the hosted store's `/rest/v1` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RestStore {
    base_url: String,
    anon_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(Config::store_url(), Config::store_anon_key())
    }

    pub fn table_url(&self, query: &SelectQuery) -> String {
        format!(
            "{}/rest/v1/{}?{}",
            self.base_url,
            urlencoding::encode(&query.table),
            query.to_query_string()
        )
    }
}

#[async_trait(?Send)]
impl RemoteStore for RestStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, QueryError> {
        let url = self.table_url(query);
        debug!("Selecting from {}: {}", query.table, url);

        // Signed-in requests carry the user's token so row-level policies apply
        let bearer = session::access_token().unwrap_or_else(|| self.anon_key.clone());

        let mut request = Request::get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", bearer));
        if query.single {
            request = request.header("Accept", "application/vnd.pgrst.object+json");
        }

        let response = request.send().await?;

        if !response.ok() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::from_body(response.status(), &response.status_text(), &body));
        }

        let body = response.json::<Value>().await?;
        match body {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}
