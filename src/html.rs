//! Markdown to HTML conversion as a fixed sequence of pattern substitutions.
//!
//! This is deliberately not a structural Markdown parser: each pass runs over
//! the whole string independently, in a fixed order. Nested or overlapping
//! constructs can therefore come out slightly wrong; that lenient behavior is
//! part of the formatter's contract.

use std::sync::LazyLock;

use regex::Regex;

static RE_H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static RE_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static RE_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());
static RE_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static RE_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static RE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n((?s:.*?))```").unwrap());
static RE_INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Converts rendered Markdown into an HTML fragment via the ordered pass list:
/// headings (deepest first), bold, italic, fenced code, inline code, paragraph
/// breaks, line breaks.
pub fn to_fragment(markdown: &str) -> String {
    let html = RE_H3.replace_all(markdown, "<h3>$1</h3>");
    let html = RE_H2.replace_all(&html, "<h2>$1</h2>");
    let html = RE_H1.replace_all(&html, "<h1>$1</h1>");
    let html = RE_BOLD.replace_all(&html, "<strong>$1</strong>");
    let html = RE_ITALIC.replace_all(&html, "<em>$1</em>");
    let html = RE_FENCE.replace_all(&html, "<pre><code class=\"language-$1\">$2</code></pre>");
    let html = RE_INLINE_CODE.replace_all(&html, "<code>$1</code>");
    let html = html.replace("\n\n", "</p><p>");
    html.replace('\n', "<br>")
}

/// Wraps the converted fragment in the fixed minimal document shell.
pub fn to_document(markdown: &str) -> String {
    let fragment = to_fragment(markdown);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Article</title>
  <style>
    body {{
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
      max-width: 800px;
      margin: 0 auto;
      padding: 20px;
      line-height: 1.6;
    }}
    h1, h2, h3 {{ margin-top: 24px; }}
    code {{ background: #f4f4f4; padding: 2px 6px; border-radius: 3px; }}
    pre {{ background: #f4f4f4; padding: 16px; border-radius: 6px; overflow-x: auto; }}
  </style>
</head>
<body>
  <p>{fragment}</p>
</body>
</html>"#
    )
}
