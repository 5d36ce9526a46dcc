//! Remote table access.
//!
//! # Responsibility
//! - Define the query-builder contract (`RemoteTable`) the managers talk to.
//! - Provide `RestTableClient`, a PostgREST-convention HTTP implementation.
//! - Provide `RemoteStore<E>`, the typed adapter that normalizes rows.
//!
//! # Invariants
//! - Remote rows are wire shaped; everything leaving `RemoteStore` is canonical.
//! - Ids and creation timestamps are assigned by the remote backend.

use crate::model::entity::{Entity, CREATED_AT_FIELD, ID_FIELD};
use crate::normalize::{normalize_entity, wire_payload, CanonicalRecord, PayloadMode};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

const REST_PATH: &str = "rest/v1";
const PREFER_REPRESENTATION: &str = "return=representation";

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug)]
pub enum RemoteError {
    /// The client could not be constructed from its settings.
    Config(String),
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(String),
    /// A single-row operation matched a different number of rows.
    RowCount { expected: usize, actual: usize },
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "invalid remote client settings: {message}"),
            Self::Transport(err) => write!(f, "remote request failed: {err}"),
            Self::Status { status, body } => write!(f, "remote returned {status}: {body}"),
            Self::Decode(message) => write!(f, "undecodable remote response: {message}"),
            Self::RowCount { expected, actual } => {
                write!(f, "expected {expected} row(s), remote returned {actual}")
            }
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Row selection in query-builder terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    /// `None` selects every column.
    pub columns: Option<Vec<String>>,
    pub id: Option<String>,
    /// Column to order by, descending.
    pub order_desc: Option<String>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(columns: &[&str]) -> Self {
        Self {
            columns: Some(columns.iter().map(|column| column.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn eq_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order_desc = Some(column.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders the query as PostgREST query-string pairs.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "select".to_string(),
            self.columns
                .as_ref()
                .map_or_else(|| "*".to_string(), |columns| columns.join(",")),
        )];
        if let Some(id) = &self.id {
            pairs.push((ID_FIELD.wire.to_string(), format!("eq.{id}")));
        }
        if let Some(column) = &self.order_desc {
            pairs.push(("order".to_string(), format!("{column}.desc")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Table-oriented remote backend, one call per round trip.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    async fn select(&self, table: &str, query: &SelectQuery) -> RemoteResult<Vec<Value>>;

    /// Inserts one row and returns it as stored, with backend-assigned columns.
    async fn insert(&self, table: &str, row: &Map<String, Value>) -> RemoteResult<Value>;

    /// Patches the row with `id` and returns the updated rows (zero or one).
    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: &Map<String, Value>,
    ) -> RemoteResult<Vec<Value>>;

    /// Deletes the row with `id`; deleting a missing row succeeds.
    async fn delete(&self, table: &str, id: &str) -> RemoteResult<()>;
}

/// HTTP client for a PostgREST-style `/rest/v1/<table>` endpoint.
pub struct RestTableClient {
    base_url: String,
    client: Client,
}

impl RestTableClient {
    pub fn new(base_url: &str, api_key: &SecretString, timeout: Duration) -> RemoteResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RemoteError::Config("remote url cannot be empty".to_string()));
        }

        let key = api_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("apikey"), header_value(key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {key}"))?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{REST_PATH}/{table}", self.base_url)
    }

    fn id_filter(id: &str) -> [(&'static str, String); 1] {
        [(ID_FIELD.wire, format!("eq.{id}"))]
    }
}

#[async_trait]
impl RemoteTable for RestTableClient {
    async fn select(&self, table: &str, query: &SelectQuery) -> RemoteResult<Vec<Value>> {
        debug!("event=remote_select module=remote table={table}");
        let response = self
            .client
            .get(self.table_url(table))
            .query(&query.to_query_pairs())
            .send()
            .await?;
        read_json(response).await
    }

    async fn insert(&self, table: &str, row: &Map<String, Value>) -> RemoteResult<Value> {
        debug!("event=remote_insert module=remote table={table}");
        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&[row])
            .send()
            .await?;
        let rows: Vec<Value> = read_json(response).await?;
        single_row(rows)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: &Map<String, Value>,
    ) -> RemoteResult<Vec<Value>> {
        debug!("event=remote_update module=remote table={table}");
        let response = self
            .client
            .patch(self.table_url(table))
            .query(&Self::id_filter(id))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(patch)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete(&self, table: &str, id: &str) -> RemoteResult<()> {
        debug!("event=remote_delete module=remote table={table}");
        let response = self
            .client
            .delete(self.table_url(table))
            .query(&Self::id_filter(id))
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }
}

fn header_value(value: &str) -> RemoteResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| RemoteError::Config("api key is not a valid header value".to_string()))
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let body = ensure_success(response).await?.text().await?;
    serde_json::from_str(&body).map_err(|err| RemoteError::Decode(err.to_string()))
}

fn single_row(rows: Vec<Value>) -> RemoteResult<Value> {
    let actual = rows.len();
    match <[Value; 1]>::try_from(rows) {
        Ok([row]) => Ok(row),
        Err(_) => Err(RemoteError::RowCount {
            expected: 1,
            actual,
        }),
    }
}

/// Typed remote adapter for one entity family.
pub struct RemoteStore<E: Entity> {
    client: Arc<dyn RemoteTable>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RemoteStore<E> {
    pub fn new(client: Arc<dyn RemoteTable>) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub fn client(&self) -> &dyn RemoteTable {
        self.client.as_ref()
    }

    fn table(&self) -> &'static str {
        E::SCHEMA.table
    }

    /// All rows, newest first.
    pub async fn list(&self) -> RemoteResult<Vec<E>> {
        let query = SelectQuery::all().order_desc(CREATED_AT_FIELD.wire);
        let rows = self.client.select(self.table(), &query).await?;
        Ok(rows.iter().filter_map(normalize_entity::<E>).collect())
    }

    /// Exactly one row by id; zero or several rows is an error.
    pub async fn get(&self, id: &str) -> RemoteResult<E> {
        let query = SelectQuery::all().eq_id(id);
        let rows = self.client.select(self.table(), &query).await?;
        decode_row(&single_row(rows)?)
    }

    pub async fn insert(&self, canonical: &CanonicalRecord) -> RemoteResult<E> {
        let payload = wire_payload(canonical, E::SCHEMA, PayloadMode::Insert);
        let row = self.client.insert(self.table(), &payload).await?;
        decode_row(&row)
    }

    /// Updates the supplied fields of an existing row.
    pub async fn update(&self, id: &str, canonical: &CanonicalRecord) -> RemoteResult<E> {
        let payload = wire_payload(canonical, E::SCHEMA, PayloadMode::Update);
        let rows = self.client.update(self.table(), id, &payload).await?;
        decode_row(&single_row(rows)?)
    }

    /// Writes only the status flag. Returns `None` when no row matched.
    pub async fn set_status(&self, id: &str, flag: bool) -> RemoteResult<Option<E>> {
        let mut patch = Map::new();
        patch.insert(E::SCHEMA.status.wire.to_string(), Value::Bool(flag));
        let rows = self.client.update(self.table(), id, &patch).await?;
        rows.first().map(decode_row::<E>).transpose()
    }

    pub async fn delete(&self, id: &str) -> RemoteResult<()> {
        self.client.delete(self.table(), id).await
    }
}

fn decode_row<E: Entity>(row: &Value) -> RemoteResult<E> {
    normalize_entity(row).ok_or_else(|| {
        RemoteError::Decode(format!("{} row is not a record", E::SCHEMA.name))
    })
}
