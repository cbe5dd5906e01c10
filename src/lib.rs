//! Scenario-driven regression testing for query-style HTTP APIs.
//!
//! A use case is a list of steps; each step sends one request and compares
//! the response against a partial expected tree. Values remembered from one
//! response can be fed into later requests.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod memory;
pub mod scenario;
pub mod testing;
pub mod value;

pub use config::{RunnerConfig, ShowOptions};
pub use error::{RunError, ScenarioError, StepError, TransportError};
pub use http::{ReqwestTransport, Transport};
pub use memory::Memory;
pub use scenario::{Expectation, RunReport, Runner, Step, UseCase};
pub use testing::{match_value, Mismatch};
pub use value::Value;
