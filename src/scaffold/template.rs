//! EJS template rendering.
//!
//! Supports the tag subset used by project templates:
//!
//! - `<%= name %>` - HTML-escaped variable
//! - `<%- name %>` - raw variable
//! - `<%# comment %>` - dropped
//! - `<%%` - literal `<%`
//! - a trailing `-%>` also swallows the newline after the tag
//!
//! Scriptlets (`<% code %>`) are rejected, there is no interpreter behind them.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Variables available to a template.
pub type TemplateContext = BTreeMap<String, String>;

const OPEN: &str = "<%";
const CLOSE: &str = "%>";

/// Render `source` against `context`. `path` names the template in errors.
pub fn render(source: &str, context: &TemplateContext, path: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];

        if let Some(literal) = after.strip_prefix('%') {
            out.push_str(OPEN);
            rest = literal;
            continue;
        }

        let end = after
            .find(CLOSE)
            .ok_or_else(|| Error::template(path, "Could not find matching close tag for \"<%\""))?;
        let mut tag = &after[..end];
        rest = &after[end + CLOSE.len()..];

        if let Some(trimmed) = tag.strip_suffix('-') {
            tag = trimmed;
            rest = rest
                .strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .unwrap_or(rest);
        }

        match tag.chars().next() {
            Some('=') => out.push_str(&escape_html(lookup(context, &tag[1..], path)?)),
            Some('-') => out.push_str(lookup(context, &tag[1..], path)?),
            Some('#') => {}
            _ => {
                return Err(Error::template(
                    path,
                    format!("Unsupported scriptlet tag: <%{}%>", tag),
                ))
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn lookup<'a>(context: &'a TemplateContext, expr: &str, path: &str) -> Result<&'a str> {
    let name = expr.trim();
    context
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::template(path, format!("{} is not defined", name)))
}

/// Escape the characters EJS escapes in `<%=` output.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
