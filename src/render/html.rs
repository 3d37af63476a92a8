use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::RenderError;
use crate::models::{
    Anomaly, Child, DocumentModel, Node, Origin, Pairing, SessionMeta, SystemEntry, TextEntry,
    ToolCallEntry, ToolResultEntry, Turn,
};

use super::assets;
use super::tools::{format_tool_input, tool_icon};

/// Renders a complete standalone HTML document.
///
/// Output depends only on the arguments. `generated_at` appears once, in a
/// `<meta name="generated-at">` tag, so two renders of the same document differ
/// only there.
pub fn render_document(
    document: &DocumentModel,
    meta: &SessionMeta,
    anomalies: &[Anomaly],
    generated_at: DateTime<Utc>,
) -> Result<String, RenderError> {
    let body = render_body(document, meta, anomalies)?;

    let title = match meta.started_at {
        Some(started) => format!("Claude Code Session - {}", started.format("%Y-%m-%d %H:%M UTC")),
        None => "Claude Code Session".to_string(),
    };

    let mut html = String::with_capacity(body.len() + assets::STYLE.len() + 4096);
    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n");
    html.push_str("<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!(
        "<meta name=\"generated-at\" content=\"{}\">\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", assets::FONT_URL));
    html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", assets::STYLESHEET_URL));
    html.push_str(&format!("<script src=\"{}\"></script>\n", assets::MARKDOWN_URL));
    html.push_str(&format!("<script src=\"{}\"></script>\n", assets::HIGHLIGHTER_URL));
    html.push_str("<style>");
    html.push_str(assets::STYLE);
    html.push_str("</style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str(&body);
    html.push_str("<script>");
    html.push_str(assets::SCRIPT);
    html.push_str("</script>\n");
    html.push_str("</body>\n");
    html.push_str("</html>\n");
    Ok(html)
}

/// Header, transcript and anomaly list. Contains no time-dependent data.
pub fn render_body(
    document: &DocumentModel,
    meta: &SessionMeta,
    anomalies: &[Anomaly],
) -> Result<String, RenderError> {
    let mut html = String::new();

    html.push_str("<header class=\"session-header\"><div class=\"wrap\">\n");
    html.push_str("<div class=\"session-title\">Claude Code Session</div>\n");
    let fields = meta.fields();
    if !fields.is_empty() {
        html.push_str("<dl class=\"meta-grid\">\n");
        for (label, value) in fields {
            let value = escape_html(&value);
            html.push_str(&format!(
                "<div><dt class=\"meta-label\">{label}</dt><dd class=\"meta-value\" title=\"{value}\">{value}</dd></div>\n"
            ));
        }
        html.push_str("</dl>\n");
    }
    html.push_str("</div></header>\n");

    html.push_str("<main class=\"wrap transcript\">\n");
    if !anomalies.is_empty() {
        render_anomalies(&mut html, anomalies);
    }
    for (index, node) in document.nodes().iter().enumerate() {
        if index > 0 {
            html.push_str("<hr class=\"msg-divider\">\n");
        }
        render_node(&mut html, node)?;
    }
    html.push_str("</main>\n");
    Ok(html)
}

fn render_node(html: &mut String, node: &Node) -> Result<(), RenderError> {
    match node {
        Node::User(entry) => render_user(html, entry),
        Node::Turn(turn) => render_turn(html, turn)?,
        Node::System(entry) => {
            open_section(html, "node system", entry.origin);
            label_row(html, "System", entry.origin);
            render_system_body(html, entry);
            html.push_str("</section>\n");
        }
        Node::Detached(child) => {
            open_section(html, "node detached", child.origin());
            render_child(html, child, &[])?;
            html.push_str("</section>\n");
        }
    }
    Ok(())
}

fn render_user(html: &mut String, entry: &TextEntry) {
    open_section(html, "node user", entry.origin);
    label_row(html, "Human", entry.origin);
    markdown(html, "prose", &entry.content);
    html.push_str("</section>\n");
}

fn render_turn(html: &mut String, turn: &Turn) -> Result<(), RenderError> {
    html.push_str(&format!("<section class=\"node assistant\" data-line=\"{}\"", turn.origin.line));
    if let Some(model) = &turn.model {
        html.push_str(&format!(" data-model=\"{}\"", escape_html(model)));
    }
    html.push_str(">\n");
    label_row(html, "Claude", turn.origin);
    if !turn.content.is_empty() {
        markdown(html, "prose", &turn.content);
    }
    for child in &turn.children {
        render_child(html, child, &turn.children)?;
    }
    html.push_str("</section>\n");
    Ok(())
}

/// `siblings` is the owning turn's child list, used to verify pairings
fn render_child(html: &mut String, child: &Child, siblings: &[Child]) -> Result<(), RenderError> {
    match child {
        Child::Thinking(entry) => {
            open_details(html, "collapsible child thinking", entry.origin);
            html.push_str("<summary><span class=\"chevron\">&#9654;</span><span class=\"block-label\">Thinking</span></summary>\n");
            markdown(html, "prose tool-scroll", &entry.content);
            html.push_str("</details>\n");
        }
        Child::ToolCall(call) => render_tool_call(html, call)?,
        Child::ToolResult(result) => {
            if let Pairing::Paired { call_index, .. } = &result.pairing
                && !matches!(siblings.get(*call_index), Some(Child::ToolCall(_)))
            {
                return Err(RenderError::DanglingPairing {
                    line: result.origin.line,
                    call_index: *call_index,
                });
            }
            render_tool_result(html, result);
        }
        Child::System(entry) => {
            html.push_str(&format!(
                "<div class=\"child system\" data-line=\"{}\">",
                entry.origin.line
            ));
            render_system_body(html, entry);
            html.push_str("</div>\n");
        }
    }
    Ok(())
}

fn render_tool_call(html: &mut String, call: &ToolCallEntry) -> Result<(), RenderError> {
    let input = format_tool_input(&call.name, &call.input)
        .map_err(|source| RenderError::ToolInput { line: call.origin.line, source })?;

    html.push_str(&format!(
        "<details class=\"collapsible child tool-call\" data-line=\"{}\" data-tool-id=\"{}\">\n",
        call.origin.line,
        escape_html(&call.id)
    ));
    html.push_str(&format!(
        "<summary><span class=\"chevron\">&#9654;</span><span class=\"tool-icon\">{}</span><span class=\"block-label\">{}</span></summary>\n",
        escape_html(&tool_icon(&call.name)),
        escape_html(&call.name)
    ));
    html.push_str(&format!(
        "<div class=\"tool-scroll\"><pre class=\"tool-input\">{}</pre></div>\n",
        escape_html(&input)
    ));
    html.push_str("</details>\n");
    Ok(())
}

fn render_tool_result(html: &mut String, result: &ToolResultEntry) {
    let mut class = String::from("collapsible child tool-result");
    if result.is_error {
        class.push_str(" error");
    }
    if result.is_orphaned() {
        class.push_str(" orphaned anomaly");
    }

    html.push_str(&format!(
        "<details class=\"{class}\" data-line=\"{}\" data-tool-id=\"{}\">\n",
        result.origin.line,
        escape_html(&result.id)
    ));

    let mut label = String::from(if result.is_error { "Error" } else { "Output" });
    if let Some(name) = result.tool_name() {
        label.push_str(" - ");
        label.push_str(name);
    }
    html.push_str(&format!(
        "<summary><span class=\"chevron\">&#9654;</span><span class=\"block-label\">{}</span>",
        escape_html(&label)
    ));
    if result.is_orphaned() {
        html.push_str("<span class=\"anomaly-badge\">no matching call</span>");
    }
    html.push_str("</summary>\n");

    if result.content.is_empty() {
        html.push_str("<div class=\"tool-scroll\"><pre class=\"tool-output\">(empty)</pre></div>\n");
    } else {
        html.push_str(&format!(
            "<div class=\"tool-scroll\"><pre class=\"tool-output\">{}</pre></div>\n",
            escape_html(&result.content)
        ));
    }
    html.push_str("</details>\n");
}

fn render_system_body(html: &mut String, entry: &SystemEntry) {
    if let Some(subtype) = &entry.subtype {
        html.push_str(&format!("<span class=\"block-label\">{}</span>", escape_html(subtype)));
    }
    html.push_str(&format!("<pre class=\"tool-output\">{}</pre>", escape_html(&entry.content)));
}

fn render_anomalies(html: &mut String, anomalies: &[Anomaly]) {
    html.push_str("<section class=\"anomalies anomaly\">\n");
    html.push_str(&format!(
        "<h2>{} anomalies found while reading this session</h2>\n",
        anomalies.len()
    ));
    html.push_str("<ul>\n");
    for anomaly in anomalies {
        html.push_str(&format!(
            "<li class=\"anomaly\" data-line=\"{}\">{}</li>\n",
            anomaly.line(),
            escape_html(&anomaly.to_string())
        ));
    }
    html.push_str("</ul>\n");
    html.push_str("</section>\n");
}

fn open_section(html: &mut String, class: &str, origin: Origin) {
    html.push_str(&format!("<section class=\"{class}\" data-line=\"{}\">\n", origin.line));
}

fn open_details(html: &mut String, class: &str, origin: Origin) {
    html.push_str(&format!("<details class=\"{class}\" data-line=\"{}\">\n", origin.line));
}

fn label_row(html: &mut String, label: &str, origin: Origin) {
    html.push_str("<div class=\"label-row\">");
    html.push_str(&format!("<span class=\"role-label\">{label}</span>"));
    if let Some(timestamp) = origin.timestamp {
        html.push_str(&format!(
            "<time datetime=\"{}\">{}</time>",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            timestamp.format("%H:%M")
        ));
    }
    html.push_str("</div>\n");
}

/// Markdown source as escaped text; the page script renders it on load
fn markdown(html: &mut String, class: &str, text: &str) {
    html.push_str(&format!("<div class=\"{class} markdown\">{}</div>\n", escape_html(text)));
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{EventKind, EventRecord};
    use crate::parsers::{BuildOutput, build_transcript};

    fn sample() -> BuildOutput {
        build_transcript(vec![
            Ok(EventRecord::new(
                1,
                EventKind::UserMessage,
                "hi <script>alert('x')</script> & \"q\"",
            )),
            Ok(EventRecord::new(2, EventKind::AssistantMessage { model: None }, "Looking")),
            Ok(EventRecord::new(
                3,
                EventKind::ToolCall {
                    name: "Bash".to_string(),
                    input: serde_json::json!({"command": "ls"}),
                },
                "",
            )
            .with_id("1")),
            Ok(EventRecord::new(4, EventKind::ToolResult { is_error: false }, "a.txt")
                .with_id("1")),
            Ok(EventRecord::new(5, EventKind::ThinkingBlock, "done")),
        ])
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_render_is_deterministic_outside_generated_at() {
        let output = sample();
        let meta = SessionMeta::default();
        let first = render_document(&output.document, &meta, &output.anomalies, at(0)).unwrap();
        let second =
            render_document(&output.document, &meta, &output.anomalies, at(1_700_000_000)).unwrap();

        assert_ne!(first, second);
        let strip = |html: &str| {
            html.lines()
                .filter(|l| !l.contains("name=\"generated-at\""))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&first), strip(&second));

        let body_a = render_body(&output.document, &meta, &output.anomalies).unwrap();
        let body_b = render_body(&output.document, &meta, &output.anomalies).unwrap();
        assert_eq!(body_a, body_b);
    }

    #[test]
    fn test_content_is_escaped() {
        let output = sample();
        let html = render_body(&output.document, &SessionMeta::default(), &[]).unwrap();

        assert!(!html.contains("<script>alert"));
        assert!(
            html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;q&quot;")
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_each_asset_referenced_once() {
        let output = sample();
        let html =
            render_document(&output.document, &SessionMeta::default(), &[], at(0)).unwrap();

        for url in assets::ALL {
            assert_eq!(html.matches(url).count(), 1, "{url}");
        }
    }

    #[test]
    fn test_children_collapsed_and_nodes_classed() {
        let output = sample();
        let html = render_body(&output.document, &SessionMeta::default(), &[]).unwrap();

        assert!(html.contains("<section class=\"node user\""));
        assert!(html.contains("<section class=\"node assistant\""));
        assert!(html.contains("class=\"collapsible child tool-call\""));
        assert!(html.contains("class=\"collapsible child tool-result\""));
        assert!(html.contains("class=\"collapsible child thinking\""));
        assert!(!html.contains(" open"));
        assert!(html.contains("Output - Bash"));
        assert!(html.contains("$ ls"));
    }

    #[test]
    fn test_orphans_and_anomalies_are_marked() {
        let output = build_transcript(vec![Ok(EventRecord::new(
            1,
            EventKind::ToolResult { is_error: true },
            "boom",
        )
        .with_id("9"))]);
        let html =
            render_body(&output.document, &SessionMeta::default(), &output.anomalies).unwrap();

        assert!(html.contains("tool-result error orphaned anomaly"));
        assert!(html.contains("<section class=\"anomalies anomaly\">"));
        assert!(html.contains("tool result &#39;9&#39; has no matching tool call"));
    }

    #[test]
    fn test_no_anomaly_section_when_clean() {
        let output = sample();
        let html =
            render_body(&output.document, &SessionMeta::default(), &output.anomalies).unwrap();
        assert!(!html.contains("class=\"anomalies"));
    }

    #[test]
    fn test_header_shows_session_meta() {
        let meta = SessionMeta {
            cwd: Some("/home/dev/<app>".to_string()),
            git_branch: Some("main".to_string()),
            ..Default::default()
        };
        let html = render_body(&DocumentModel::default(), &meta, &[]).unwrap();

        assert!(html.contains("Directory"));
        assert!(html.contains("/home/dev/&lt;app&gt;"));
        assert!(html.contains("Branch"));
    }

    #[test]
    fn test_dangling_pairing_is_a_render_error() {
        let origin = Origin { line: 3, timestamp: None };
        let turn = Turn {
            origin: Origin { line: 1, timestamp: None },
            id: None,
            content: String::new(),
            model: None,
            children: vec![Child::ToolResult(ToolResultEntry {
                origin,
                id: "1".to_string(),
                content: String::new(),
                is_error: false,
                pairing: Pairing::Paired { call_index: 5, tool_name: "Bash".to_string() },
            })],
        };
        let document = DocumentModel::from_nodes(vec![Node::Turn(turn)]);

        let err = render_body(&document, &SessionMeta::default(), &[]).unwrap_err();
        assert!(matches!(err, RenderError::DanglingPairing { line: 3, call_index: 5 }));
    }
}
