//! Browser-side assets referenced by exported documents.
//!
//! Each is referenced exactly once per document and never fetched by this crate.

/// Syntax highlighting theme
pub const STYLESHEET_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github.min.css";

/// Markdown engine, pinned so the raw-HTML escaping hook below keeps its signature
pub const MARKDOWN_URL: &str = "https://cdn.jsdelivr.net/npm/marked@12.0.2/marked.min.js";

pub const HIGHLIGHTER_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";

pub const FONT_URL: &str = "https://fonts.googleapis.com/css2?family=IBM+Plex+Mono:ital,wght@0,400;0,500;0,600;1,400&family=IBM+Plex+Sans:ital,wght@0,400;0,500;0,600;0,700;1,400&family=IBM+Plex+Serif:ital,wght@0,400;0,500;0,600;1,400&display=swap";

pub const ALL: [&str; 4] = [STYLESHEET_URL, MARKDOWN_URL, HIGHLIGHTER_URL, FONT_URL];

pub(crate) const STYLE: &str = r#"
:root {
    --user-accent: #D4613E;
    --user-bg: #FBF4F1;
    --user-label: #B8462A;
    --assistant-accent: #3D405B;
    --thinking-accent: #8B7EC8;
    --thinking-bg: #F6F4FB;
    --tool-accent: #3A7CA5;
    --tool-bg: #F0F5FA;
    --tool-border: #C2D6E8;
    --result-accent: #5A8A65;
    --result-bg: #F1F7F2;
    --result-border: #C0D9C5;
    --error-accent: #B5454A;
    --error-bg: #FBF1F1;
    --error-border: #E0BFBF;
    --system-accent: #8A8884;
    --anomaly-accent: #C9822B;
    --anomaly-bg: #FFF6E8;
    --page-bg: #F7F6F3;
    --divider: #E8E6E1;
    --text-primary: #2D2D2D;
    --text-secondary: #6B6966;
    --text-tertiary: #9C9891;
}
* { box-sizing: border-box; }
body {
    font-family: 'IBM Plex Sans', system-ui, sans-serif;
    background: var(--page-bg);
    color: var(--text-primary);
    margin: 0;
    -webkit-font-smoothing: antialiased;
}
.wrap { max-width: 52rem; margin: 0 auto; padding: 1.5rem 2rem; }
.session-header { background: #2D2D2D; color: #F0EFEC; border-bottom: 3px solid var(--user-accent); }
.session-title { font-size: 1.125rem; font-weight: 600; margin-bottom: 1rem; }
.meta-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 0.75rem 2rem; margin: 0; }
.meta-label { font-family: 'IBM Plex Mono', monospace; font-size: 0.625rem; letter-spacing: 0.1em; text-transform: uppercase; color: #8A8884; }
.meta-value { font-family: 'IBM Plex Mono', monospace; font-size: 0.8125rem; color: #E0DFDB; margin: 0; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.node { padding: 1.5rem 0 1.5rem 1.25rem; }
.node.user { border-left: 4px solid var(--user-accent); }
.node.system { border-left: 4px solid var(--system-accent); color: var(--text-secondary); }
.label-row { display: flex; align-items: center; justify-content: space-between; margin-bottom: 0.75rem; }
.role-label, .block-label { font-family: 'IBM Plex Mono', monospace; font-size: 0.6875rem; letter-spacing: 0.06em; text-transform: uppercase; }
.role-label { font-weight: 600; }
.node.user .role-label { color: var(--user-label); }
.node.assistant .role-label { color: var(--assistant-accent); }
.node.system .role-label { color: var(--system-accent); }
.label-row time { font-family: 'IBM Plex Mono', monospace; font-size: 0.6875rem; color: var(--text-tertiary); }
.prose { font-family: 'IBM Plex Serif', Georgia, serif; line-height: 1.75; font-size: 0.938rem; white-space: pre-wrap; }
.prose.rendered { white-space: normal; }
.prose pre { margin: 0.75em 0; border-radius: 6px; overflow-x: auto; background: #282c34; padding: 1em; }
.prose pre > code { background: none; padding: 0; color: #abb2bf; font-family: 'IBM Plex Mono', monospace; font-size: 0.85em; }
.prose :not(pre) > code { font-family: 'IBM Plex Mono', monospace; background: rgba(0,0,0,0.06); padding: 0.15em 0.4em; border-radius: 3px; }
.prose blockquote { border-left: 3px solid var(--divider); padding-left: 1em; color: var(--text-secondary); font-style: italic; }
.prose table { border-collapse: collapse; margin: 0.75em 0; width: 100%; font-size: 0.9em; }
.prose th, .prose td { border: 1px solid var(--divider); padding: 0.5em 0.75em; text-align: left; }
.prose a { color: #3A7CA5; }
.prose pre .hljs { background: transparent; }
.thinking .prose { font-style: italic; font-size: 0.875rem; color: #6B6280; }
.tool-scroll { max-height: 350px; overflow-y: auto; padding: 0.5rem 0.875rem; }
.tool-input, .tool-output { font-family: 'IBM Plex Mono', monospace; font-size: 0.78rem; line-height: 1.5; white-space: pre-wrap; word-break: break-word; margin: 0; }
details.collapsible { margin: 0.75rem 0; border-radius: 0 6px 6px 0; overflow: hidden; }
details.collapsible summary { cursor: pointer; user-select: none; list-style: none; padding: 0.5rem 0.875rem; display: flex; align-items: center; gap: 0.5rem; }
details.collapsible summary::-webkit-details-marker { display: none; }
details.collapsible summary .chevron { display: inline-block; transition: transform 0.15s ease; font-size: 0.6rem; }
details.collapsible[open] summary .chevron { transform: rotate(90deg); }
.thinking { background: var(--thinking-bg); border-left: 3px dashed var(--thinking-accent); }
.thinking .block-label { color: var(--thinking-accent); }
.tool-call { background: var(--tool-bg); border: 1px solid var(--tool-border); border-left: 4px solid var(--tool-accent); }
.tool-call .block-label { color: var(--tool-accent); }
.tool-icon { display: inline-flex; align-items: center; justify-content: center; min-width: 1.25rem; height: 1.25rem; background: var(--tool-accent); color: white; border-radius: 3px; font-size: 0.65rem; font-weight: 700; font-family: 'IBM Plex Mono', monospace; }
.tool-result { background: var(--result-bg); border: 1px solid var(--result-border); border-left: 4px solid var(--result-accent); }
.tool-result .block-label { color: var(--result-accent); }
.tool-result.error { background: var(--error-bg); border-color: var(--error-border); border-left-color: var(--error-accent); }
.tool-result.error .block-label { color: var(--error-accent); }
.child.system { border-left: 3px solid var(--system-accent); padding: 0.5rem 0.875rem; color: var(--text-secondary); }
.anomaly { outline: 2px dashed var(--anomaly-accent); outline-offset: 2px; }
.anomaly-badge { font-family: 'IBM Plex Mono', monospace; font-size: 0.625rem; text-transform: uppercase; color: var(--anomaly-accent); }
.anomalies { background: var(--anomaly-bg); padding: 1rem 1.25rem; margin: 1.5rem 0; }
.anomalies h2 { font-size: 0.875rem; margin: 0 0 0.5rem; color: var(--anomaly-accent); }
.anomalies li { font-family: 'IBM Plex Mono', monospace; font-size: 0.8rem; }
.msg-divider { border: none; border-top: 1px solid var(--divider); margin: 0; }
"#;

/// Markdown bodies are shipped as escaped text and turned into markup in the browser
pub(crate) const SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', function () {
    function escapeHtml(text) {
        return text.replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;')
            .replace(/"/g, '&quot;').replace(/'/g, '&#39;');
    }
    if (window.marked) {
        marked.use({
            gfm: true,
            breaks: false,
            renderer: {
                html: function (html) {
                    return escapeHtml(typeof html === 'string' ? html : html.text);
                }
            }
        });
    }
    document.querySelectorAll('.markdown').forEach(function (el) {
        if (!window.marked) return;
        el.innerHTML = marked.parse(el.textContent);
        el.classList.add('rendered');
        if (window.hljs) {
            el.querySelectorAll('pre code').forEach(function (block) {
                hljs.highlightElement(block);
            });
        }
    });
    document.querySelectorAll('time[datetime]').forEach(function (el) {
        var d = new Date(el.getAttribute('datetime'));
        if (!isNaN(d)) {
            el.textContent = d.toLocaleTimeString('en-US', {hour: '2-digit', minute: '2-digit'});
        }
    });
});
"#;
