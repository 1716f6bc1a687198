//! StaffHub Client - typed access to the hosted backend service
//!
//! Provides the two surfaces the hosted service exposes: a REST table
//! surface ([`TableBackend`]: select/insert/update/upsert/delete by table
//! name) and an auth surface ([`AuthBackend`]: password sign-in, sign-out,
//! current user). Each trait has an HTTP implementation over the hosted
//! API and an in-memory implementation for tests and offline development.

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod query;

pub use backend::{AuthBackend, Session, TableBackend, UserInfo};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{AuthClient, RestClient};
pub use memory::MemoryBackend;
pub use query::{Filter, FilterOp, OrderBy, SelectRequest};
