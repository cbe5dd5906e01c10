use reqwest::Url;
use serde_json::json;

use crate::config::RunnerConfig;
use crate::diagnostics::{emit, Category};
use crate::error::{StepError, TransportError};
use crate::http::{HttpMethod, HttpResponse, OutgoingRequest, Transport};
use crate::memory::Memory;
use crate::testing::{compare_text, match_value, sort_by_key};
use crate::value::{parse_tree, split_path, to_log_string, Value};

use super::step::{Expectation, Step};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const GRAPHQL_CONTENT_TYPE: &str = "application/graphql";

/// Runs single steps: builds the request from the step and the current
/// memory, dispatches it and checks the response.
pub struct StepExecutor<'a> {
    config: &'a RunnerConfig,
    transport: &'a dyn Transport,
}

impl<'a> StepExecutor<'a> {
    pub fn new(config: &'a RunnerConfig, transport: &'a dyn Transport) -> Self {
        Self { config, transport }
    }

    pub async fn execute(&self, step: &Step, memory: &mut Memory) -> Result<(), StepError> {
        if let Some(description) = step.description() {
            self.log(Category::Comment, description);
        }

        let request = self.build_request(step, memory)?;
        self.log(
            Category::Request,
            format!(
                "{} {}\nContent-Type: {}\n{}",
                request.method,
                request.url,
                request.header("Content-Type").unwrap_or_default(),
                request.body.as_deref().unwrap_or_default()
            ),
        );

        let response = self.dispatch(step, request).await?;

        if step.status != 0 && step.status != response.status {
            return Err(StepError::StatusMismatch {
                label: step.label.clone(),
                expected: step.status,
                actual: response.status,
            });
        }

        match &step.expect {
            None => Ok(()),
            Some(Expectation::Text(expected)) => self.check_text(step, expected, &response),
            Some(Expectation::Tree(expected)) => self.check_tree(step, expected, response, memory),
        }
    }

    /// Build the request for `step` without sending it.
    pub fn build_request(&self, step: &Step, memory: &Memory) -> Result<OutgoingRequest, StepError> {
        if self.config.server.is_empty() {
            return Err(StepError::configuration(&step.label, "server not specified"));
        }
        if step.use_json && step.content.is_empty() {
            return Err(StepError::configuration(
                &step.label,
                "if using JSON the content can not be empty",
            ));
        }

        let mut target = self.config.server.clone();
        if step.path.is_empty() || !step.path.starts_with('/') {
            target.push_str(&self.config.base);
        }
        target.push_str(&step.path);

        let mut url = Url::parse(&target)
            .map_err(|err| StepError::configuration(&step.label, format!("invalid URL `{target}`: {err}")))?;

        let vars = memory.resolve_vars(&step.vars);
        if !step.use_json && (!vars.is_empty() || !step.op.is_empty()) {
            let mut query_pairs = url.query_pairs_mut();
            if !vars.is_empty() {
                query_pairs.append_pair("variables", &Value::Object(vars.clone()).to_string());
            }
            if !step.op.is_empty() {
                query_pairs.append_pair("operationName", &step.op);
            }
        }

        let method = step.method();
        let mut headers = Vec::with_capacity(step.headers.len() + 1);
        let body = match method {
            HttpMethod::Get => None,
            HttpMethod::Post => {
                let content = memory.interpolate(&step.content);
                if step.use_json {
                    let mut wrapped = json!({ "query": content });
                    if !vars.is_empty() {
                        wrapped["variables"] = Value::Object(vars);
                    }
                    if !step.op.is_empty() {
                        wrapped["operationName"] = Value::String(step.op.clone());
                    }
                    headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
                    Some(wrapped.to_string())
                } else {
                    headers.push(("Content-Type".to_string(), GRAPHQL_CONTENT_TYPE.to_string()));
                    Some(content)
                }
            }
        };

        for (name, value) in &step.headers {
            headers.push((name.clone(), memory.interpolate(value)));
        }

        Ok(OutgoingRequest {
            method,
            url: url.to_string(),
            headers,
            body,
            timeout: step.timeout(),
        })
    }

    async fn dispatch(&self, step: &Step, request: OutgoingRequest) -> Result<HttpResponse, StepError> {
        let timeout = request.timeout;
        let result = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                seconds: timeout.as_secs(),
            }),
        };

        result.map_err(|source| StepError::Transport {
            label: step.label.clone(),
            source,
        })
    }

    fn check_text(&self, step: &Step, expected: &str, response: &HttpResponse) -> Result<(), StepError> {
        self.log(Category::Response, &response.body);
        match compare_text(expected, &response.body) {
            None => Ok(()),
            Some(mismatch) => Err(StepError::TextMismatch {
                label: step.label.clone(),
                line: mismatch.line,
                column: mismatch.column,
            }),
        }
    }

    fn check_tree(
        &self,
        step: &Step,
        expected: &Value,
        response: HttpResponse,
        memory: &mut Memory,
    ) -> Result<(), StepError> {
        let mut result = match parse_tree(&response.body) {
            Ok(result) => result,
            Err(err) => {
                self.log(Category::Response, format!("[{}] {}", response.status, response.body));
                return Err(StepError::Parse {
                    label: step.label.clone(),
                    message: err.to_string(),
                    body: response.body,
                });
            }
        };

        for (path, key) in &step.sort_by {
            sort_by_key(&mut result, &split_path(path), key);
        }

        if self.config.show.responses {
            self.log(Category::Response, to_log_string(&result, self.config.indent));
        }

        for (record_key, path) in &step.remember {
            if !memory.remember(&result, record_key, &split_path(path)) {
                tracing::debug!(step = %step.label, key = %record_key, path = %path, "nothing to remember");
            }
        }

        match match_value(&result, expected) {
            None => Ok(()),
            Some(mismatch) => Err(StepError::Match {
                label: step.label.clone(),
                mismatch,
            }),
        }
    }

    fn log(&self, category: Category, message: impl std::fmt::Display) {
        emit(&self.config.show, category, message);
    }
}
