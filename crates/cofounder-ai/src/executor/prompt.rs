use cofounder_traits::ToolRegistry;

use crate::context::UserContext;

pub(crate) const DEFAULT_TASK_PROMPT: &str = "You are an autonomous executive assistant \
for a startup founder. You are given a task in plain language. Decide which of the \
available tools to call, in what order, to get it done. Call tools only when they move \
the task forward; when none applies, answer directly. If a tool reports that an \
integration is not connected, do not retry it - tell the user what is missing and how \
to connect it. Keep the final answer short and concrete, referencing what you actually did.";

/// Assemble the system prompt from base instructions, the tool catalog,
/// user context, and the integration advisory.
pub(crate) fn build_system_prompt(
    tools: &ToolRegistry,
    context: Option<&UserContext>,
    missing_integrations: &[String],
) -> String {
    let mut sections = Vec::new();

    sections.push(DEFAULT_TASK_PROMPT.to_string());

    let mut tool_names = tools.list();
    tool_names.sort();
    let tools_desc: Vec<String> = tool_names
        .iter()
        .filter_map(|name| tools.get(name))
        .map(|t| format!("- {}: {}", t.name(), t.description()))
        .collect();
    if !tools_desc.is_empty() {
        sections.push(format!("## Available Tools\n\n{}", tools_desc.join("\n")));
    }

    if let Some(context) = context
        && !context.is_empty()
    {
        sections.push(context.format_for_prompt());
    }

    if !missing_integrations.is_empty() {
        sections.push(format!(
            "## Integration Status\n\nNot connected: {}. The task may not need these. \
             If it does, explain what is missing instead of retrying the tool.",
            missing_integrations.join(", ")
        ));
    }

    sections.join("\n\n")
}
