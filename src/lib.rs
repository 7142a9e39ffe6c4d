//! `quarry-http` is an async HTTP client for the Quarry data platform API.
//!
//! The crate wraps the platform's REST endpoints with typed services:
//! - [`QuarryClient::queries`] — SQL query execution
//! - [`QuarryClient::tables`] — table management and CSV import
//! - [`QuarryClient::files`] — multipart file upload
//! - [`QuarryClient::apps`] — app invocation
//!
//! All services route through one dispatch core that applies bearer
//! authentication, a per-attempt timeout, and bounded retries with linear
//! backoff for timeouts, connection failures and 5xx responses.

mod app;
mod body;
mod client;
mod config;
mod error;
mod file;
mod query;
mod table;
mod types;
mod wire;

pub use app::Apps;
pub use body::{FormField, FormPart, RequestBody};
pub use client::QuarryClient;
pub use config::{ClientConfig, ConfigUpdate, DEFAULT_BASE_URL};
pub use error::{ErrorCode, QuarryError};
pub use file::{FileInfo, Files};
pub use query::Queries;
pub use table::{ImportResult, TableColumn, TableInfo, Tables};
pub use types::ResponseEnvelope;

pub use reqwest::header::HeaderMap;
pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, QuarryError>;
