// Template Service
// `$name` / `${name}` placeholder rendering for the HTML pages

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

const INDEX_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/index.html"));
const RESULT_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/result.html"));
const STYLE_CSS: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/style.css"));

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(?:(\$)|([A-Za-z_][A-Za-z0-9_]*)|\{([A-Za-z_][A-Za-z0-9_]*)\})")
            .expect("placeholder regex")
    })
}

/// Substitute known placeholders, leaving unknown ones untouched. `$$`
/// renders a literal `$`.
pub fn render(template: &str, values: &HashMap<&str, String>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }
            let name = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or("");
            match values.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

/// Loads templates from disk, falling back to the built-in copies.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub async fn load(&self, name: &str) -> Option<String> {
        if let Ok(content) = tokio::fs::read_to_string(self.dir.join(name)).await {
            return Some(content);
        }
        builtin_template(name).map(|s| s.to_string())
    }
}

pub fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "index.html" => Some(INDEX_HTML),
        "result.html" => Some(RESULT_HTML),
        _ => None,
    }
}

pub fn builtin_static(path: &str) -> Option<&'static [u8]> {
    match path {
        "style.css" => Some(STYLE_CSS),
        _ => None,
    }
}
