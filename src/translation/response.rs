/*!
 * Lenient parsing of model answers.
 *
 * Answers are expected to be a JSON object, but models wrap them in code
 * fences, answer with Python dict syntax, leave trailing commas or chat
 * around the payload. `parse_lenient` tries a strict parse first and then a
 * single repair pass before giving up.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::repair::RestatedLine;
use crate::errors::TranslationError;

static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").unwrap());

/// Parse `text` as JSON, repairing common model mistakes if needed
pub fn parse_lenient(text: &str) -> Result<Value, TranslationError> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let unfenced = CODE_FENCE_REGEX
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());

    let payload = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    };

    if let Ok(value) = serde_json::from_str::<Value>(payload) {
        return Ok(value);
    }

    let repaired = repair_json(payload);
    debug!("Repaired model answer: {}", repaired);
    serde_json::from_str::<Value>(&repaired).map_err(|e| {
        let preview: String = trimmed.chars().take(200).collect();
        TranslationError::MalformedResponse(format!("not JSON ({}): {}", e, preview))
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn expect_object(value: &Value) -> Result<&Map<String, Value>, TranslationError> {
    value
        .as_object()
        .ok_or_else(|| TranslationError::MalformedResponse(format!("expected a JSON object, got {}", kind_of(value))))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Values of a flat `{index: translation}` answer, in answer order
pub fn as_flat_lines(value: &Value) -> Result<Vec<String>, TranslationError> {
    Ok(expect_object(value)?.values().map(value_text).collect())
}

/// Entries of a deep `{index: {optimized_subtitle, revised_translation}}` answer
pub fn as_restated_lines(value: &Value) -> Result<Vec<RestatedLine>, TranslationError> {
    expect_object(value)?
        .iter()
        .map(|(key, entry)| {
            let field = |name: &str| {
                entry.get(name).map(value_text).ok_or_else(|| {
                    TranslationError::MalformedResponse(format!("entry {} has no '{}' field", key, name))
                })
            };
            Ok(RestatedLine::new(field("optimized_subtitle")?, field("revised_translation")?))
        })
        .collect()
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..].iter().copied().find(|c| !c.is_whitespace())
}

/// Rewrite near-JSON into JSON: single-quoted strings, bare keys, trailing
/// commas and Python literals
pub fn repair_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                out.push('"');
                i += 1;
                while i < chars.len() {
                    let ch = chars[i];
                    if ch == '\\' && i + 1 < chars.len() {
                        out.push(ch);
                        out.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    match ch {
                        '"' => {
                            out.push('"');
                            break;
                        }
                        '\n' => out.push_str("\\n"),
                        _ => out.push(ch),
                    }
                }
            }
            '\'' => {
                out.push('"');
                i += 1;
                while i < chars.len() {
                    let ch = chars[i];
                    if ch == '\\' && i + 1 < chars.len() {
                        if chars[i + 1] == '\'' {
                            out.push('\'');
                        } else {
                            out.push(ch);
                            out.push(chars[i + 1]);
                        }
                        i += 2;
                        continue;
                    }
                    i += 1;
                    // an apostrophe only closes the string where JSON syntax resumes
                    if ch == '\'' && matches!(next_significant(&chars, i), None | Some(':' | ',' | '}' | ']')) {
                        out.push('"');
                        break;
                    }
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\n' => out.push_str("\\n"),
                        _ => out.push(ch),
                    }
                }
            }
            ',' => {
                if !matches!(next_significant(&chars, i + 1), Some('}' | ']')) {
                    out.push(',');
                }
                i += 1;
            }
            c if c.is_alphanumeric() || c == '_' || c == '-' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '-' | '.' | '+')) {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                if next_significant(&chars, i) == Some(':') {
                    out.push('"');
                    out.push_str(&token);
                    out.push('"');
                } else {
                    out.push_str(match token.as_str() {
                        "True" => "true",
                        "False" => "false",
                        "None" => "null",
                        other => other,
                    });
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
