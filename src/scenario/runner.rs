use std::time::Instant;

use crate::config::RunnerConfig;
use crate::diagnostics::{emit, Category};
use crate::error::{RunError, StepError};
use crate::http::Transport;
use crate::memory::Memory;

use super::executor::StepExecutor;
use super::usecase::UseCase;

/// What happened to one step of a use case run.
#[derive(Debug, Clone, PartialEq)]
pub enum StepStatus {
    Passed,
    Failed(StepError),
    /// Not executed because an earlier step failed.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub label: String,
    pub always: bool,
    pub status: StepStatus,
}

/// Result of running one use case.
#[derive(Debug, Clone, PartialEq)]
pub struct UseCaseReport {
    pub source: String,
    pub steps: Vec<StepOutcome>,
    /// The first failure of the run; later failures of `always` steps are
    /// recorded per step but never replace it.
    pub failure: Option<StepError>,
    pub memory: Memory,
}

impl UseCaseReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Summary of a run over several use cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u128,
    pub use_cases: Vec<UseCaseReport>,
}

impl RunReport {
    fn record(&mut self, report: UseCaseReport) {
        for outcome in &report.steps {
            self.total += 1;
            match outcome.status {
                StepStatus::Passed => self.passed += 1,
                StepStatus::Failed(_) => self.failed += 1,
                StepStatus::Skipped => self.skipped += 1,
            }
        }
        self.use_cases.push(report);
    }

    /// The first failing use case, if any.
    pub fn into_result(self) -> Result<RunReport, RunError> {
        let failed = self
            .use_cases
            .iter()
            .find_map(|report| report.failure.clone().map(|error| (report.source.clone(), error)));
        match failed {
            Some((source_name, error)) => Err(RunError { source_name, error }),
            None => Ok(self),
        }
    }
}

/// Runs use cases against one server through one transport.
pub struct Runner<T: Transport> {
    config: RunnerConfig,
    transport: T,
}

impl<T: Transport> Runner<T> {
    pub fn new(config: RunnerConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run use cases in order, stopping after the first one that fails.
    pub async fn run(&self, use_cases: &[UseCase]) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::default();

        for use_case in use_cases {
            let use_case_report = self.run_use_case(use_case).await;
            let failed = !use_case_report.passed();
            report.record(use_case_report);
            if failed {
                break;
            }
        }

        report.duration_ms = started.elapsed().as_millis();
        report
    }

    /// Run the steps of one use case with a fresh memory.
    ///
    /// Once a step fails, later steps are skipped unless marked `always`.
    pub async fn run_use_case(&self, use_case: &UseCase) -> UseCaseReport {
        if use_case.comment.is_empty() {
            self.log(Category::Comment, format!("\n{}\n", use_case.source));
        } else {
            self.log(
                Category::Comment,
                format!("\n{}\n{}\n", use_case.source, use_case.comment),
            );
        }

        let executor = StepExecutor::new(&self.config, &self.transport);
        let mut memory = Memory::new();
        let mut failure: Option<StepError> = None;
        let mut steps = Vec::with_capacity(use_case.steps.len());

        for step in &use_case.steps {
            if failure.is_some() && !step.always {
                steps.push(StepOutcome {
                    label: step.label.clone(),
                    always: step.always,
                    status: StepStatus::Skipped,
                });
                continue;
            }

            let status = match executor.execute(step, &mut memory).await {
                Ok(()) => StepStatus::Passed,
                Err(err) => {
                    tracing::warn!(source = %use_case.source, category = err.category(), error = %err, "step failed");
                    if failure.is_none() {
                        failure = Some(err.clone());
                    }
                    StepStatus::Failed(err)
                }
            };
            steps.push(StepOutcome {
                label: step.label.clone(),
                always: step.always,
                status,
            });
        }

        UseCaseReport {
            source: use_case.source.clone(),
            steps,
            failure,
            memory,
        }
    }

    fn log(&self, category: Category, message: impl std::fmt::Display) {
        emit(&self.config.show, category, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::scenario::executor::tests::{step, FakeTransport};
    use serde_json::json;

    fn runner(transport: FakeTransport) -> Runner<FakeTransport> {
        Runner::new(RunnerConfig::new("http://localhost:8080"), transport)
    }

    #[tokio::test]
    async fn always_steps_run_after_failure_and_first_failure_wins() {
        let runner = runner(
            FakeTransport::new()
                .reply(500, "{}")
                .fail(TransportError::Failed("cleanup refused".into())),
        );
        let use_case = UseCase::new(
            "always.json",
            vec![
                step(json!({"label": "A", "status": 200})),
                step(json!({"label": "B"})),
                step(json!({"label": "C", "always": true})),
            ],
        );

        let report = runner.run_use_case(&use_case).await;

        let sent = runner.transport().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(report.steps[1].status, StepStatus::Skipped);
        assert!(matches!(report.steps[2].status, StepStatus::Failed(StepError::Transport { .. })));
        assert_eq!(
            report.failure,
            Some(StepError::StatusMismatch {
                label: "A".into(),
                expected: 200,
                actual: 500
            })
        );
    }

    #[tokio::test]
    async fn remember_happens_even_when_match_fails() {
        let runner = runner(
            FakeTransport::new()
                .reply(200, r#"{"songs":[{"id":"s-9","name":"Jump"}]}"#)
                .reply(200, r#"{"ok":true}"#),
        );
        let use_case = UseCase::new(
            "songs.json",
            vec![
                step(json!({"label": "list", "remember": {"sid": "songs.0.id"}, "expect": {"songs": []}})),
                step(json!({
                    "label": "fetch",
                    "content": "query { song }",
                    "json": true,
                    "headers": {"X-Id": "$(sid)"},
                    "vars": {"id": "$sid"},
                    "expect": {"ok": true}
                })),
            ],
        );

        let report = runner.run_use_case(&use_case).await;

        assert!(matches!(report.failure, Some(StepError::Match { .. })));
        assert_eq!(report.memory.get("sid"), Some(&json!("s-9")));
        assert_eq!(report.steps[1].status, StepStatus::Skipped);
    }

    #[tokio::test]
    async fn always_steps_see_memory_from_before_the_failure() {
        let runner = runner(
            FakeTransport::new()
                .reply(200, r#"{"song":{"id":"s-1"}}"#)
                .reply(500, "{}")
                .reply(200, "{}"),
        );
        let use_case = UseCase::new(
            "cleanup.json",
            vec![
                step(json!({"label": "create", "remember": {"sid": "song.id"}, "expect": {}})),
                step(json!({"label": "check", "status": 200})),
                step(json!({"label": "skipped", "headers": {"X-Id": "$(sid)"}})),
                step(json!({"label": "delete", "always": true, "headers": {"X-Id": "$(sid)"}})),
            ],
        );

        let report = runner.run_use_case(&use_case).await;

        assert!(matches!(report.failure, Some(StepError::StatusMismatch { .. })));
        assert_eq!(report.steps[2].status, StepStatus::Skipped);
        assert_eq!(report.steps[3].status, StepStatus::Passed);
        let sent = runner.transport().sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].header("X-Id"), Some("s-1"));
    }

    #[tokio::test]
    async fn substitution_uses_remembered_value() {
        let runner = runner(
            FakeTransport::new()
                .reply(200, r#"{"songs":[{"id":42}]}"#)
                .reply(200, r#"{"ok":true}"#),
        );
        let use_case = UseCase::new(
            "songs.json",
            vec![
                step(json!({"remember": {"sid": "songs.0.id"}, "expect": {"songs": [{"id": 42}]}})),
                step(json!({
                    "content": "query { song }",
                    "json": true,
                    "headers": {"X-Id": "$(sid)"},
                    "vars": {"id": "$sid"},
                    "expect": {"ok": true}
                })),
            ],
        );

        let report = runner.run_use_case(&use_case).await;
        assert!(report.passed(), "{:?}", report.failure);

        let sent = runner.transport().sent();
        assert_eq!(sent[1].header("X-Id"), Some("42"));
        let body: serde_json::Value = serde_json::from_str(sent[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["variables"]["id"], json!(42));
    }

    #[tokio::test]
    async fn memory_does_not_leak_between_runs() {
        let runner = runner(
            FakeTransport::new()
                .reply(200, r#"{"id":"first"}"#)
                .reply(200, r#"{"ok":true}"#),
        );
        let use_case = UseCase::new(
            "twice.json",
            vec![
                step(json!({"remember": {"id": "id"}, "expect": {}})),
                step(json!({"headers": {"X-Id": "$(id)"}})),
            ],
        );

        let first = runner.run_use_case(&use_case).await;
        assert_eq!(first.memory.get("id"), Some(&json!("first")));

        // Second run: the first step gets the default `{}` reply, so nothing
        // is remembered and the placeholder stays literal.
        let second = runner.run_use_case(&use_case).await;
        assert!(second.memory.is_empty());
        let sent = runner.transport().sent();
        assert_eq!(sent[1].header("X-Id"), Some("first"));
        assert_eq!(sent[3].header("X-Id"), Some("$(id)"));
    }

    #[tokio::test]
    async fn identical_responses_give_identical_failures() {
        let body = r#"{"data":{"artists":[{"name":"B"},{"name":"A"}]}}"#;
        let runner = runner(FakeTransport::new().reply(200, body).reply(200, body));
        let use_case = UseCase::new(
            "repeat.json",
            vec![step(json!({"expect": {"data": {"artists": [{"name": "A"}]}}}))],
        );

        let first = runner.run_use_case(&use_case).await;
        let second = runner.run_use_case(&use_case).await;
        assert!(first.failure.is_some());
        assert_eq!(first.failure, second.failure);
    }

    #[tokio::test]
    async fn concurrent_runs_keep_separate_memory() {
        let transport = FakeTransport::new()
            .reply(200, r#"{"id":1}"#)
            .reply(200, r#"{"id":2}"#);
        let runner = runner(transport);
        let use_case = UseCase::new("c.json", vec![step(json!({"remember": {"id": "id"}, "expect": {}}))]);

        let (a, b) = tokio::join!(runner.run_use_case(&use_case), runner.run_use_case(&use_case));
        let mut ids = vec![a.memory.get("id").cloned(), b.memory.get("id").cloned()];
        ids.sort_by_key(|id| id.as_ref().map(|v| v.to_string()));
        assert_eq!(ids, vec![Some(json!(1)), Some(json!(2))]);
    }

    #[tokio::test]
    async fn run_stops_after_first_failing_use_case() {
        let runner = runner(FakeTransport::new().reply(404, "").reply(200, ""));
        let failing = UseCase::new("fail.json", vec![step(json!({"label": "x", "status": 200}))]);
        let passing = UseCase::new("pass.json", vec![step(json!({"label": "y"}))]);

        let report = runner.run(&[failing, passing]).await;
        assert_eq!(report.use_cases.len(), 1);
        assert_eq!(report.total, 1);
        assert_eq!(report.failed, 1);

        let err = report.into_result().unwrap_err();
        assert_eq!(err.source_name, "fail.json");
        assert!(err.to_string().starts_with("fail.json: status code mismatch"));
    }

    #[tokio::test]
    async fn run_report_counts_outcomes() {
        let runner = runner(FakeTransport::new());
        let use_case = UseCase::new(
            "ok.json",
            vec![step(json!({"label": "a"})), step(json!({"label": "b", "status": 200}))],
        );

        let report = runner.run(&[use_case]).await;
        assert_eq!((report.total, report.passed, report.failed, report.skipped), (2, 2, 0, 0));
        assert!(report.into_result().is_ok());
    }
}
