use serde_json::Value;

/// Short badge shown next to a tool name
pub fn tool_icon(name: &str) -> String {
    let icon = match name {
        "Bash" => "$",
        "Read" => "R",
        "Write" | "WebFetch" => "W",
        "Edit" => "E",
        "Glob" => "G",
        "Grep" => "/",
        "Task" => "T",
        "WebSearch" => "S",
        "Skill" => "SK",
        _ => return name.chars().next().map(String::from).unwrap_or_else(|| "?".to_string()),
    };
    icon.to_string()
}

/// Human-oriented summary of a tool call's arguments.
///
/// Well-known tools get a compact form (`$ command`, `▸ path`); anything else is
/// pretty-printed JSON.
pub fn format_tool_input(name: &str, input: &Value) -> Result<String, serde_json::Error> {
    if input.is_null() {
        return Ok(String::new());
    }

    let mut parts = Vec::new();
    let mut push = |prefix: &str, key: &str, suffix: &str| {
        if let Some(value) = field(input, key) {
            parts.push(format!("{prefix}{value}{suffix}"));
        }
    };

    let fallback_when_empty = match name {
        "Bash" => {
            push("▸ ", "description", "");
            push("$ ", "command", "");
            push("timeout: ", "timeout", "ms");
            true
        }
        "Read" => {
            push("▸ ", "file_path", "");
            push("offset: ", "offset", "");
            push("limit: ", "limit", "");
            false
        }
        "Write" | "Edit" => {
            push("▸ ", "file_path", "");
            true
        }
        "Glob" => {
            push("pattern: ", "pattern", "");
            push("path: ", "path", "");
            false
        }
        "Grep" => {
            push("/", "pattern", "/");
            push("in: ", "path", "");
            push("glob: ", "glob", "");
            false
        }
        "Task" => {
            push("▸ ", "description", "");
            push("agent: ", "subagent_type", "");
            true
        }
        "WebFetch" => {
            push("▸ ", "url", "");
            push("prompt: ", "prompt", "");
            false
        }
        "WebSearch" => {
            push("▸ ", "query", "");
            true
        }
        _ => return serde_json::to_string_pretty(input),
    };

    if parts.is_empty() && fallback_when_empty {
        return serde_json::to_string_pretty(input);
    }
    Ok(parts.join("\n"))
}

/// A present, non-empty scalar field rendered as text
fn field(input: &Value, key: &str) -> Option<String> {
    match input.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
