//! Standalone HTML document assembly for export.

use pulldown_cmark_escape::{FmtWriter, escape_html};

use crate::types::{RenderError, Theme};

/// Wrap an already-rendered body in a complete HTML document.
///
/// The body is trusted renderer output and is spliced verbatim; the
/// title is escaped. The theme lands as a class on `<body>` so the
/// embedded style block can pick a palette.
pub fn standalone_document(title: &str, theme: Theme, body: &str) -> Result<String, RenderError> {
    let mut out = String::with_capacity(body.len() + 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("  <title>");
    escape_html(FmtWriter(&mut out), title)?;
    out.push_str("</title>\n  <style>\n");
    out.push_str(BASE_CSS);
    out.push_str("  </style>\n</head>\n<body class=\"theme-");
    out.push_str(theme.as_str());
    out.push_str("\">\n<main class=\"markdown-body\">\n");
    out.push_str(body);
    out.push_str("</main>\n</body>\n</html>\n");
    Ok(out)
}

const BASE_CSS: &str = r#"body { margin: 0; font-family: system-ui, sans-serif; line-height: 1.6; }
body.theme-light { background: #ffffff; color: #1f2328; }
body.theme-dark { background: #1e1e1e; color: #d4d4d4; }
.markdown-body { max-width: 48rem; margin: 0 auto; padding: 2rem 1rem; }
.markdown-body pre { overflow-x: auto; padding: 0.75rem; border-radius: 4px; }
.markdown-body code { font-family: ui-monospace, monospace; }
.markdown-body blockquote { margin: 0; padding-left: 1rem; border-left: 3px solid #8884; }
.markdown-body table { border-collapse: collapse; }
.markdown-body th, .markdown-body td { border: 1px solid #8884; padding: 0.3rem 0.6rem; }
.markdown-body img { max-width: 100%; }
.callout { padding: 0.5rem 1rem; border-left: 3px solid; border-radius: 4px; margin: 1rem 0; }
.callout-title { font-weight: 600; }
"#;
