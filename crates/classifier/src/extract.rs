//! Progressive extraction of a triage payload from a raw classifier reply.
//!
//! The capability is instructed to answer with a bare JSON object
//! `{"summary", "priority", "notes", "skills"}`, but real replies wander:
//! prose around the object, markdown code fences, truncated JSON. Four
//! strategies are tried in order, strictest first:
//!
//! 1. direct parse of the whole reply
//! 2. parse of the first fenced code block
//! 3. parse of the outermost brace-delimited substring
//! 4. per-field regex extraction
//!
//! Whatever parses must still pass schema validation; anything else is a
//! soft failure and the caller falls back.

use deskpilot_core::status::Priority;
use regex::Regex;
use serde_json::Value;

use crate::TriageResult;

/// Parse and validate a raw classifier reply.
///
/// Returns `None` when nothing structured can be recovered or the payload
/// fails validation; the caller substitutes [`TriageResult::fallback`].
pub fn parse_response(raw: &str) -> Option<TriageResult> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // A payload that parses but fails validation is schema-invalid, not
    // unstructured: reject it instead of regex-guessing fields out of it.
    if let Some(value) = extract_value(raw) {
        return validate(&value);
    }

    extract_fields(raw)
}

/// Strategies 1-3: recover a JSON value from the reply text.
fn extract_value(raw: &str) -> Option<Value> {
    // Strategy 1: the reply is the object.
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Some(value);
    }

    // Strategy 2: the object is inside a ```json fence.
    let fence = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static regex");
    if let Some(caps) = fence.captures(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(caps[1].trim()) {
            return Some(value);
        }
    }

    // Strategy 3: the object is embedded in prose; take the outermost braces.
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        if let Ok(value) = serde_json::from_str::<Value>(&raw[start..=end]) {
            return Some(value);
        }
    }

    None
}

/// Schema validation of a parsed payload.
///
/// Rejects (returns `None`) when priority is missing or out of range,
/// notes is present but not a string, or skills is present but not a list
/// of strings. A `summary` string, when present, is folded into the notes.
fn validate(value: &Value) -> Option<TriageResult> {
    let obj = value.as_object()?;

    let priority = Priority::parse_lenient(obj.get("priority")?.as_str()?)?;

    let notes = match obj.get("notes") {
        Some(Value::String(s)) => s.trim().to_string(),
        None => String::new(),
        Some(_) => return None,
    };

    let skills = match obj.get("skills") {
        Some(Value::Array(items)) => {
            let mut skills = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str()?.trim();
                if !s.is_empty() {
                    skills.push(s.to_string());
                }
            }
            skills
        }
        None => Vec::new(),
        Some(_) => return None,
    };

    let summary = obj.get("summary").and_then(Value::as_str).unwrap_or("");
    let notes = join_summary(summary, &notes);
    if notes.is_empty() {
        return None;
    }

    Some(TriageResult {
        priority,
        notes,
        skills,
    })
}

/// Strategy 4: last-resort per-field regex extraction.
///
/// Succeeds only if the priority field is recognizable; the remaining
/// fields default to the fallback values when absent, matching what the
/// fallback would have produced anyway.
fn extract_fields(raw: &str) -> Option<TriageResult> {
    let priority_re =
        Regex::new(r#"(?i)"priority"\s*:\s*"(low|medium|high)""#).expect("static regex");
    let priority = Priority::parse_lenient(&priority_re.captures(raw)?[1])?;

    let notes_re = Regex::new(r#""notes"\s*:\s*"([^"]*)""#).expect("static regex");
    let summary_re = Regex::new(r#""summary"\s*:\s*"([^"]*)""#).expect("static regex");
    let notes = notes_re
        .captures(raw)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    let summary = summary_re
        .captures(raw)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    let mut notes = join_summary(&summary, &notes);
    if notes.is_empty() {
        notes = TriageResult::fallback().notes;
    }

    let skills_re = Regex::new(r#""skills"\s*:\s*\[([^\]]*)\]"#).expect("static regex");
    let skills: Vec<String> = match skills_re.captures(raw) {
        Some(caps) => caps[1]
            .split(',')
            .map(|s| s.trim().trim_matches('"').trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => TriageResult::fallback().skills,
    };

    Some(TriageResult {
        priority,
        notes,
        skills,
    })
}

fn join_summary(summary: &str, notes: &str) -> String {
    let summary = summary.trim();
    match (summary.is_empty(), notes.is_empty()) {
        (true, _) => notes.to_string(),
        (false, true) => summary.to_string(),
        (false, false) => format!("{summary}\n\n{notes}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{"summary": "Login fails", "priority": "high",
        "notes": "Check the session store.", "skills": ["Redis", "Node.js"]}"#;

    fn expected() -> TriageResult {
        TriageResult {
            priority: Priority::High,
            notes: "Login fails\n\nCheck the session store.".to_string(),
            skills: vec!["Redis".to_string(), "Node.js".to_string()],
        }
    }

    #[test]
    fn bare_json_parses() {
        assert_eq!(parse_response(BARE).unwrap(), expected());
    }

    #[test]
    fn fenced_json_parses_to_same_result() {
        let fenced = format!("Here is my analysis:\n```json\n{BARE}\n```\nHope that helps!");
        assert_eq!(parse_response(&fenced).unwrap(), expected());
    }

    #[test]
    fn json_wrapped_in_prose_parses_to_same_result() {
        let prose = format!("Sure! Based on the ticket, {BARE} and that is my analysis.");
        assert_eq!(parse_response(&prose).unwrap(), expected());
    }

    #[test]
    fn priority_is_case_insensitive() {
        let raw = r#"{"priority": "HIGH", "notes": "escalate"}"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.priority, Priority::High);
        assert!(result.skills.is_empty());
    }

    #[test]
    fn invalid_priority_is_rejected() {
        let raw = r#"{"priority": "urgent", "notes": "hmm", "skills": []}"#;
        assert!(parse_response(raw).is_none());
    }

    #[test]
    fn non_string_skill_entries_are_rejected() {
        let raw = r#"{"priority": "low", "notes": "ok", "skills": ["go", 42]}"#;
        assert!(parse_response(raw).is_none());
    }

    #[test]
    fn skill_entries_are_trimmed_and_empties_dropped() {
        let raw = r#"{"priority": "low", "notes": "ok", "skills": [" Docker ", ""]}"#;
        assert_eq!(parse_response(raw).unwrap().skills, vec!["Docker".to_string()]);
    }

    #[test]
    fn field_regex_recovers_from_broken_json() {
        // Truncated object: no closing brace, so strategies 1-3 all fail.
        let raw = r#"The result: "priority": "medium", "notes": "restart the worker",
            "skills": ["DevOps"] and that is all"#;
        let result = parse_response(raw).unwrap();
        assert_eq!(result.priority, Priority::Medium);
        assert_eq!(result.notes, "restart the worker");
        assert_eq!(result.skills, vec!["DevOps".to_string()]);
    }

    #[test]
    fn unparseable_reply_yields_none() {
        assert!(parse_response("I could not analyze this ticket, sorry.").is_none());
        assert!(parse_response("").is_none());
    }

    #[test]
    fn summary_alone_becomes_notes() {
        let raw = r#"{"priority": "low", "summary": "A duplicate report"}"#;
        assert_eq!(parse_response(raw).unwrap().notes, "A duplicate report");
    }
}
