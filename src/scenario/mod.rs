//! # Scenarios
//!
//! Use cases, their steps, and the machinery that runs them: the step
//! executor (build, send, check) and the runner (ordering, `always` steps,
//! per-run memory).

mod executor;
mod runner;
mod step;
mod usecase;

pub use executor::{StepExecutor, GRAPHQL_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use runner::{RunReport, Runner, StepOutcome, StepStatus, UseCaseReport};
pub use step::{Expectation, Step, DEFAULT_TIMEOUT_SECS};
pub use usecase::UseCase;
