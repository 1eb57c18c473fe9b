//! Autonomous task executor - the plan/act loop.
//!
//! Turns a free-form task description into a sequence of tool invocations
//! chosen by the planner, and returns a terse result plus an audit trail.
//!
//! The loop deliberately treats "tool not found", "tool threw", and
//! "integration not connected" as information handed back to the planner
//! rather than run-terminating faults; the task description is user-facing
//! and open-ended, so the planner is expected to reason around the gap.
//! Only an explicit approval request, the iteration ceiling, and the
//! optional wall-clock deadline end a run structurally.

mod agent;
mod config;
mod prompt;

pub use agent::{TASK_EXECUTOR_AGENT_ID, TaskExecutorAgent};
pub use config::{
    ActionRecord, ApprovalHandoff, DEFAULT_MAX_ITERATIONS, TaskReport, TaskRunConfig,
    TaskRunOutcome,
};

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use cofounder_traits::{IntegrationGate, ToolContext, ToolOutcome, ToolRegistry};

use crate::context::ContextSource;
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message, ToolCall};
use prompt::build_system_prompt;

/// Drives the plan/act loop against the planner and the tool registry.
pub struct TaskExecutor {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    gate: Option<Arc<dyn IntegrationGate>>,
    context_source: Option<Arc<dyn ContextSource>>,
}

impl TaskExecutor {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            tools,
            gate: None,
            context_source: None,
        }
    }

    /// Attach the integration gate used for the advisory pre-check.
    pub fn with_gate(mut self, gate: Arc<dyn IntegrationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Attach a source of founder context for prompt grounding.
    pub fn with_context_source(mut self, source: Arc<dyn ContextSource>) -> Self {
        self.context_source = Some(source);
        self
    }

    /// Execute one run to its terminal outcome.
    pub async fn run(&self, config: TaskRunConfig) -> Result<TaskRunOutcome> {
        let started = Instant::now();
        let deadline = config.deadline.map(|budget| started + budget);

        // Init: prompt grounding plus the advisory integration pre-check.
        // The pre-check never blocks a run; the task may not need the
        // missing providers at all.
        let user_context = match &self.context_source {
            Some(source) => Some(source.load(&config.user_id).await),
            None => None,
        };
        let tool_ids = self.tools.list();
        let advisory = self.integration_advisory(&config.user_id, &tool_ids).await;

        let system_prompt = build_system_prompt(
            &self.tools,
            user_context.as_ref(),
            advisory.as_ref().map(|a| a.missing.as_slice()).unwrap_or(&[]),
        );
        let mut messages = vec![Message::system(system_prompt), Message::user(&config.task)];

        let mut actions: Vec<ActionRecord> = Vec::new();
        let mut tools_used: Vec<String> = Vec::new();
        let mut steps = 0usize;
        let mut last_text = String::new();

        for iteration in 0..config.max_iterations {
            if let Some(at) = deadline
                && Instant::now() >= at
            {
                warn!(iteration, "Run deadline reached, stopping");
                break;
            }

            let mut request =
                CompletionRequest::new(messages.clone()).with_tools(self.tools.schemas());
            if let Some(temp) = config.temperature {
                request = request.with_temperature(temp);
            }

            let response = match deadline {
                Some(at) => match timeout_at(at, self.llm.complete(request)).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(iteration, "Run deadline reached awaiting planner, stopping");
                        break;
                    }
                },
                None => self.llm.complete(request).await?,
            };

            // No tool calls: the text content is the final answer.
            if response.tool_calls.is_empty() {
                let answer = response.content.unwrap_or_default();
                debug!(
                    iteration,
                    steps,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Run completed"
                );
                return Ok(TaskRunOutcome::Completed(self.report(
                    answer, steps, tools_used, actions, advisory,
                )));
            }

            if let Some(content) = &response.content
                && !content.is_empty()
            {
                last_text = content.clone();
            }
            messages.push(Message::assistant_with_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            // Dispatch sequentially, feeding results back in the planner's
            // requested order.
            for call in &response.tool_calls {
                let dispatch = self
                    .dispatch_tool(call, &config, deadline, &mut actions, &mut tools_used)
                    .await;

                let result_str = match dispatch {
                    ToolDispatch::Feedback(text) => text,
                    ToolDispatch::Approval {
                        approval_id,
                        preview,
                    } => {
                        // Suspend the whole run; no further planner calls.
                        steps += 1;
                        debug!(
                            iteration,
                            approval_id = %approval_id,
                            "Run suspended pending approval"
                        );
                        return Ok(TaskRunOutcome::NeedsApproval(ApprovalHandoff {
                            approval_id,
                            preview,
                            steps,
                            tools_used,
                            actions,
                        }));
                    }
                };
                messages.push(Message::tool_result(call.id.clone(), result_str));
            }

            steps += 1;
        }

        // Iteration ceiling or deadline: a soft stop, not an error. Return
        // whatever the assistant said last.
        warn!(
            steps,
            max_iterations = config.max_iterations,
            "Run stopped before the planner finished"
        );
        Ok(TaskRunOutcome::Completed(self.report(
            last_text, steps, tools_used, actions, advisory,
        )))
    }

    fn report(
        &self,
        result: String,
        steps: usize,
        tools_used: Vec<String>,
        actions: Vec<ActionRecord>,
        advisory: Option<Advisory>,
    ) -> TaskReport {
        let (required, missing) = match advisory {
            Some(a) => (Some(a.required), Some(a.missing)),
            None => (None, None),
        };
        TaskReport {
            result,
            steps,
            tools_used,
            actions,
            required_integrations: required,
            missing_integrations: missing,
        }
    }

    async fn dispatch_tool(
        &self,
        call: &ToolCall,
        config: &TaskRunConfig,
        deadline: Option<Instant>,
        actions: &mut Vec<ActionRecord>,
        tools_used: &mut Vec<String>,
    ) -> ToolDispatch {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "Planner requested unknown tool");
            return ToolDispatch::Feedback(format!("Tool not found: {}", call.name));
        };

        let mut ctx = ToolContext::new(config.user_id.clone());
        ctx.agent_task_id = config.agent_task_id.clone();

        let execution = tool.execute(call.arguments.clone(), &ctx);
        let outcome = match deadline {
            Some(at) => match timeout_at(at, execution).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(tool = %call.name, "Tool call hit the run deadline");
                    return ToolDispatch::Feedback(format!(
                        "Error: Tool {} timed out",
                        call.name
                    ));
                }
            },
            None => execution.await,
        };

        match outcome {
            Ok(ToolOutcome::Completed { result }) => {
                if !tools_used.contains(&call.name) {
                    tools_used.push(call.name.clone());
                }
                actions.push(ActionRecord {
                    tool: call.name.clone(),
                    result: result.clone(),
                });
                ToolDispatch::Feedback(serde_json::to_string(&result).unwrap_or_default())
            }
            Ok(ToolOutcome::Unavailable { provider, message }) => {
                // Soft error: fed back as data so the planner can explain
                // the gap instead of failing the run.
                debug!(tool = %call.name, provider = %provider, "Tool unavailable");
                let payload = json!({
                    "error": "integration_not_connected",
                    "provider": provider,
                    "message": message,
                    "connected": false,
                });
                ToolDispatch::Feedback(payload.to_string())
            }
            Ok(ToolOutcome::ApprovalRequired {
                approval_id,
                preview,
            }) => ToolDispatch::Approval {
                approval_id,
                preview,
            },
            Err(error) => {
                // A single tool failure never aborts the run.
                warn!(tool = %call.name, error = %error, "Tool execution failed");
                ToolDispatch::Feedback(format!("Error: {}", error))
            }
        }
    }

    async fn integration_advisory(
        &self,
        user_id: &str,
        tool_ids: &[String],
    ) -> Option<Advisory> {
        let gate = self.gate.as_ref()?;

        let by_tool = gate.required_providers(tool_ids);
        let required: Vec<String> = by_tool
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut missing = Vec::new();
        for provider in &required {
            match gate.is_connected(user_id, provider).await {
                Ok(true) => {}
                Ok(false) => missing.push(provider.clone()),
                Err(error) => {
                    // Advisory only: an unanswerable gate reads as missing.
                    warn!(provider = %provider, error = %error, "Integration check failed");
                    missing.push(provider.clone());
                }
            }
        }

        Some(Advisory { required, missing })
    }
}

struct Advisory {
    required: Vec<String>,
    missing: Vec<String>,
}

enum ToolDispatch {
    /// A tool-result entry to append to the conversation.
    Feedback(String),
    /// Suspend the run pending out-of-band confirmation.
    Approval {
        approval_id: String,
        preview: serde_json::Value,
    },
}
