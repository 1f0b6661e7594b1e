//! Canonical task/skill model.
//!
//! Payload records arrive in heterogeneous shapes: skills may be flat
//! objects or wrapped in a `skill` sub-object, list-valued fields may be
//! delimited strings, ids may be numbers. Everything is normalized here,
//! once, at ingestion; downstream code only ever sees the canonical
//! types and never branches on raw shape again.

use crate::text::strip_markers;
use serde_json::Value;
use std::collections::HashMap;

/// A task record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub track: Option<TrackKey>,
}

/// Track identity as carried on tasks, skills, and related-task refs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TrackKey {
    pub name: String,
    pub code: String,
}

/// A reference from a skill to one of its related tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedTask {
    pub task_name: String,
    pub task_id: String,
    pub track: Option<TrackKey>,
}

/// Normalized technology-stack groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechStack {
    pub language: Vec<String>,
    pub os: Vec<String>,
    pub tools: Vec<String>,
}

/// A skill record in canonical form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skill {
    pub name: String,
    pub definition: String,
    pub tech_stack: TechStack,
    pub related_tasks: Vec<RelatedTask>,
    pub track: Option<TrackKey>,
    /// Scope marker; `"common"` means the skill attaches to any track it
    /// is linked to via related tasks.
    pub scope: Option<String>,
    pub rank: Option<f64>,
}

/// Render a JSON scalar as trimmed text; objects/arrays/null yield "".
pub fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numeric rank from a number or a numeric string.
fn scalar_rank(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Normalize a list-or-delimited-string field into trimmed, non-empty
/// strings. Strings split on `;`, `/` and `,`.
pub fn normalize_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| scalar_text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => {
            let s = scalar_text(Some(other));
            s.split([';', '/', ','])
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        }
    }
}

/// Lower-cased key index over a JSON object, built once per object so
/// synonym lookups don't rescan the map.
fn lower_key_index(obj: &Value) -> HashMap<String, &Value> {
    match obj.as_object() {
        Some(map) => map.iter().map(|(k, v)| (k.to_lowercase(), v)).collect(),
        None => HashMap::new(),
    }
}

/// First synonym present in the index wins.
fn pick<'a>(index: &HashMap<String, &'a Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| index.get(*k).copied())
}

fn track_key(value: Option<&Value>) -> Option<TrackKey> {
    let obj = value?;
    if !obj.is_object() {
        return None;
    }
    let key = TrackKey {
        name: scalar_text(obj.get("name")),
        code: scalar_text(obj.get("code")),
    };
    if key.name.is_empty() && key.code.is_empty() {
        None
    } else {
        Some(key)
    }
}

impl TechStack {
    /// Build from a raw `tech_stack` value. Non-object input yields an
    /// empty stack.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(obj) = value.filter(|v| v.is_object()) else {
            return Self::default();
        };
        let index = lower_key_index(obj);
        Self {
            language: normalize_list(pick(&index, &["language", "languages"])),
            os: normalize_list(pick(&index, &["os", "platform", "operating_system"])),
            tools: normalize_list(pick(&index, &["tools", "tool"])),
        }
    }

    /// Render as `* language: ...` / `* os: ...` / `* tools: ...` lines
    /// in that fixed order, non-empty groups only, markers stripped.
    pub fn lines(&self) -> String {
        let mut lines = Vec::new();
        for (label, values) in [
            ("language", &self.language),
            ("os", &self.os),
            ("tools", &self.tools),
        ] {
            if !values.is_empty() {
                lines.push(format!("* {}: {}", label, values.join(", ")));
            }
        }
        strip_markers(&lines.join("\n"))
    }
}

fn related_tasks_from(value: Option<&Value>) -> Vec<RelatedTask> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| RelatedTask {
            task_name: scalar_text(item.get("task_name")),
            task_id: scalar_text(item.get("task_id")),
            track: track_key(item.get("track")),
        })
        .collect()
}

/// Extract the task list from a payload record.
pub fn collect_tasks(payload: &Value) -> Vec<Task> {
    let Some(Value::Array(items)) = payload.get("tasks") else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| Task {
            id: scalar_text(item.get("task_id")),
            name: scalar_text(item.get("task_name")),
            description: scalar_text(item.get("task_description")),
            track: track_key(item.get("track")),
        })
        .collect()
}

/// Extract and normalize the skill list from a payload record.
///
/// An entry is "nested" iff it is an object containing a `skill`
/// sub-object; nested entries read `related_tasks`, `track`,
/// `track_scope` and `rank` from the outer object first, falling back to
/// the inner one.
pub fn collect_skills(payload: &Value) -> Vec<Skill> {
    let Some(Value::Array(items)) = payload.get("skills") else {
        return Vec::new();
    };
    items
        .iter()
        .map(|entry| {
            let inner = entry.get("skill").filter(|v| v.is_object());
            let body = inner.unwrap_or(entry);
            // outer entry wins for linkage fields on nested entries; an
            // empty outer list counts as absent
            let outer_then_inner = |key: &str| {
                entry
                    .get(key)
                    .filter(|v| !v.is_null() && !v.as_array().is_some_and(|a| a.is_empty()))
                    .or_else(|| body.get(key))
            };
            Skill {
                name: scalar_text(body.get("name")),
                definition: scalar_text(body.get("definition")),
                tech_stack: TechStack::from_value(body.get("tech_stack")),
                related_tasks: related_tasks_from(outer_then_inner("related_tasks")),
                track: track_key(outer_then_inner("track")),
                scope: {
                    let s = scalar_text(outer_then_inner("track_scope"));
                    if s.is_empty() {
                        None
                    } else {
                        Some(s)
                    }
                },
                rank: scalar_rank(outer_then_inner("rank")),
            }
        })
        .collect()
}

/// Build the `task_id -> task_name` lookup used to resolve related-task
/// display names. Only tasks with both an id and a name participate.
pub fn task_lookup(tasks: &[Task]) -> HashMap<&str, &str> {
    tasks
        .iter()
        .filter(|t| !t.id.is_empty() && !t.name.is_empty())
        .map(|t| (t.id.as_str(), t.name.as_str()))
        .collect()
}

/// Resolve display names for related-task refs: the ref's own
/// `task_name` wins, else its `task_id` is looked up; refs yielding no
/// name are skipped.
pub fn related_task_names(related: &[RelatedTask], lookup: &HashMap<&str, &str>) -> Vec<String> {
    related
        .iter()
        .filter_map(|rt| {
            if !rt.task_name.is_empty() {
                Some(rt.task_name.clone())
            } else if rt.task_id.is_empty() {
                None
            } else {
                lookup.get(rt.task_id.as_str()).map(|n| (*n).to_string())
            }
        })
        .collect()
}
