#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Once;
use async_trait::async_trait;
use creator_app::api::{QueryError, RemoteStore, SelectQuery};
use futures::channel::oneshot;
use log::{Level, Log, Metadata, Record};
use serde_json::Value;

/// In-memory table store that honours eq filters, ordering and single-row mode.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Value>>,
    failure: RefCell<Option<QueryError>>,
    calls: Cell<usize>,
    queries: RefCell<Vec<SelectQuery>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn fail_with(&self, error: QueryError) {
        *self.failure.borrow_mut() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn queries(&self) -> Vec<SelectQuery> {
        self.queries.borrow().clone()
    }
}

fn column_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, QueryError> {
        self.calls.set(self.calls.get() + 1);
        self.queries.borrow_mut().push(query.clone());

        if let Some(error) = self.failure.borrow().clone() {
            return Err(error);
        }

        let mut rows: Vec<Value> = self
            .tables
            .get(&query.table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|f| row.get(&f.column).map(column_text).as_deref() == Some(f.value.as_str()))
            })
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by_key(|row| row.get(&order.column).and_then(Value::as_i64).unwrap_or_default());
            if !order.ascending {
                rows.reverse();
            }
        }

        if !query.columns.is_empty() {
            rows = rows
                .into_iter()
                .map(|row| {
                    let picked = query
                        .columns
                        .iter()
                        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                        .collect();
                    Value::Object(picked)
                })
                .collect();
        }

        if query.single && rows.len() != 1 {
            return Err(QueryError::Remote {
                status: 406,
                code: Some("PGRST116".to_string()),
                message: format!("JSON object requested, {} rows returned", rows.len()),
            });
        }

        Ok(rows)
    }
}

/// Holds the first select until the returned sender fires, then behaves like `inner`.
pub struct GatedStore {
    inner: MemoryStore,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> (Self, oneshot::Sender<()>) {
        let (open, gate) = oneshot::channel();
        let store = Self {
            inner,
            gate: RefCell::new(Some(gate)),
        };
        (store, open)
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait(?Send)]
impl RemoteStore for GatedStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, QueryError> {
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.select(query).await
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = record.args().to_string();
        RECORDS.with(|records| records.borrow_mut().push((record.level(), line)));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Installs the capturing logger and clears this thread's records.
pub fn capture_logs() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("logger already set");
        log::set_max_level(log::LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Records of `level` logged on this thread since `capture_logs`.
pub fn logged(level: Level) -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    })
}
