//! fidi server: one mock node of an arbitrarily complex service.
//!
//! Each instance answers requests written in the fidi request language
//! (`fidi-dsl`): the request says how to respond, which peers exist, and
//! which downstream calls to fan out, with strict ordering between
//! sequence groups and full concurrency within one. There is no business
//! logic anywhere; composing instances reproduces a service's topology,
//! latency, and error envelope for exercising surrounding infrastructure.

pub mod caller;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerArgs;
pub use error::ServerError;
pub use state::AppState;
