use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::{GatewayError, GatewayResult};
use crate::wire::{GeneratedProject, GenerationResult, Mode};

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").expect("static regex"))
}

/// Drop Markdown code-fence lines (```` ``` ```` / ```` ```json ````).
pub fn strip_fences(content: &str) -> String {
    let stripped = fence_re().replace_all(content, "");
    let trimmed = stripped.trim();
    // Single-line fences: ```json {...} ```
    let trimmed = trimmed.strip_prefix("```json").or_else(|| trimmed.strip_prefix("```")).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim().to_string()
}

/// Balanced `{...}` or `[...]` span opening at byte `start`.
/// Brackets inside string literals are ignored; returns None if nothing balances.
fn balanced_span(s: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_str = false;
    let mut escaped = false;

    for (i, ch) in s[start..].char_indices() {
        if in_str {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_str = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Every balanced span that parses as JSON, in order of its opening bracket.
fn json_candidates(s: &str) -> impl Iterator<Item = Value> + '_ {
    s.char_indices()
        .filter(|(_, ch)| matches!(ch, '{' | '['))
        .filter_map(|(i, _)| balanced_span(s, i))
        .filter_map(|span| serde_json::from_str::<Value>(span).ok())
}

/// Parse model content as JSON, tolerating fences and surrounding prose.
pub fn parse_content(content: &str) -> GatewayResult<Value> {
    let cleaned = strip_fences(content);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(v) => Ok(v),
        Err(first) => json_candidates(&cleaned)
            .next()
            .ok_or_else(|| GatewayError::Content(first.to_string())),
    }
}

/// Bring a parsed value into the shape `mode` expects.
///
/// Suggestions: a bare array, or an object wrapping exactly one array
/// (`{"projects": [...]}`). Several array-valued keys are ambiguous and rejected.
/// Blueprint: a single object. Any array is rejected.
pub fn reshape(mode: Mode, value: Value) -> GatewayResult<Value> {
    match (mode, value) {
        (Mode::Suggestions, v @ Value::Array(_)) => Ok(v),
        (Mode::Suggestions, Value::Object(map)) => {
            let mut arrays = map.into_iter().filter(|(_, v)| v.is_array());
            match (arrays.next(), arrays.next()) {
                (Some((_, inner)), None) => Ok(inner),
                (None, _) => Err(GatewayError::Shape("expected an array of projects, got an object without one".into())),
                (Some((a, _)), Some((b, _))) => Err(GatewayError::Shape(format!(
                    "ambiguous wrapper object: both `{a}` and `{b}` hold arrays"
                ))),
            }
        }
        (Mode::Blueprint, v @ Value::Object(_)) => Ok(v),
        (Mode::Blueprint, Value::Array(_)) => Err(GatewayError::Shape("expected one project object, got an array".into())),
        (_, other) => Err(GatewayError::Shape(format!("expected JSON {}, got `{other}`", expected_kind(mode)))),
    }
}

fn expected_kind(mode: Mode) -> &'static str {
    match mode {
        Mode::Suggestions => "array",
        Mode::Blueprint => "object",
    }
}

/// Validate against the project schema.
///
/// A blueprint additionally needs a description and a duration on every roadmap phase.
pub fn validate(mode: Mode, value: Value) -> GatewayResult<GenerationResult> {
    let schema_err = |e: serde_json::Error| GatewayError::Shape(format!("project does not match schema: {e}"));
    match mode {
        Mode::Suggestions => {
            let list: Vec<GeneratedProject> = serde_json::from_value(value).map_err(schema_err)?;
            if list.is_empty() {
                return Err(GatewayError::Shape("model returned no project ideas".into()));
            }
            Ok(GenerationResult::Suggestions(list))
        }
        Mode::Blueprint => {
            let project: GeneratedProject = serde_json::from_value(value).map_err(schema_err)?;
            if let Some(phase) = project
                .roadmap
                .iter()
                .find(|p| blank(&p.description) || blank(&p.duration))
            {
                return Err(GatewayError::Shape(format!(
                    "blueprint roadmap phase `{}` needs a description and a duration",
                    phase.phase
                )));
            }
            Ok(GenerationResult::Blueprint(Box::new(project)))
        }
    }
}

fn blank(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn shape(mode: Mode, value: Value) -> GatewayResult<GenerationResult> {
    validate(mode, reshape(mode, value)?)
}

/// Full pipeline: content string to validated result.
///
/// When the content is not JSON as a whole, each embedded JSON span is tried in
/// turn and the first one that fits `mode` wins.
pub fn normalize(mode: Mode, content: &str) -> GatewayResult<GenerationResult> {
    let cleaned = strip_fences(content);
    let parse_err = match serde_json::from_str::<Value>(&cleaned) {
        Ok(v) => return shape(mode, v),
        Err(e) => e,
    };

    let mut first_err = None;
    for candidate in json_candidates(&cleaned) {
        match shape(mode, candidate) {
            Ok(result) => return Ok(result),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    Err(first_err.unwrap_or_else(|| GatewayError::Content(parse_err.to_string())))
}
