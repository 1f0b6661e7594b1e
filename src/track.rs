//! Track resolution and per-track selection.
//!
//! Track mode partitions tasks and skills by a categorical "track"
//! dimension. Membership follows a dual rule: a skill belongs to a track
//! directly (its own track name/code matches) or through "common" scope
//! (it is linked to the track via a related task). The two predicates
//! are kept separate and composed with OR.

use crate::model::{RelatedTask, Skill, Task};
use crate::text::bullet_lines;
use std::collections::HashSet;
use tracing::debug;

/// A resolved track, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// 1-based position, used in the generated sheet titles.
    pub index: usize,
    pub name: String,
    pub code: String,
}

/// Derive the ordered track list for a payload.
///
/// `meta.tracks` is the source of truth when present (declared order
/// preserved); otherwise tracks are inferred from the tasks in
/// first-occurrence order of distinct `(name, code)` pairs.
pub fn resolve_tracks(payload: &serde_json::Value, tasks: &[Task]) -> Vec<Track> {
    use crate::model::scalar_text;

    let declared: Vec<Track> = payload
        .get("meta")
        .and_then(|m| m.get("tracks"))
        .and_then(|t| t.as_array())
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| Track {
                    index: i + 1,
                    name: scalar_text(item.get("track_name")),
                    code: scalar_text(item.get("track_code")),
                })
                .collect()
        })
        .unwrap_or_default();
    if !declared.is_empty() {
        return declared;
    }

    let mut seen = HashSet::new();
    let mut inferred = Vec::new();
    for task in tasks {
        let Some(track) = &task.track else { continue };
        if seen.insert((track.name.clone(), track.code.clone())) {
            inferred.push(Track {
                index: inferred.len() + 1,
                name: track.name.clone(),
                code: track.code.clone(),
            });
        }
    }
    debug!(count = inferred.len(), "tracks inferred from tasks");
    inferred
}

/// Tasks whose own track name matches, in input order, truncated.
pub fn select_tasks_for_track<'a>(
    tasks: &'a [Task],
    track_name: &str,
    limit: usize,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| {
            t.track
                .as_ref()
                .is_some_and(|k| !k.name.is_empty() && k.name == track_name)
        })
        .take(limit)
        .collect()
}

/// Direct membership: the skill's own track carries the target name or
/// code. Empty fields never match.
fn matches_directly(skill: &Skill, track_name: &str, track_code: &str) -> bool {
    skill.track.as_ref().is_some_and(|k| {
        (!k.name.is_empty() && k.name == track_name)
            || (!k.code.is_empty() && k.code == track_code)
    })
}

/// Common-scope membership: the skill is marked `common` and some
/// related-task ref carries the target track.
fn matches_via_common_scope(skill: &Skill, track_name: &str, track_code: &str) -> bool {
    let is_common = skill
        .scope
        .as_deref()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("common"));
    is_common
        && skill.related_tasks.iter().any(|rt| {
            rt.track.as_ref().is_some_and(|k| {
                (!k.name.is_empty() && k.name == track_name)
                    || (!k.code.is_empty() && k.code == track_code)
            })
        })
}

/// Skills belonging to a track under the dual membership rule.
///
/// Matches are deduplicated by skill name (first occurrence wins),
/// stable-sorted ascending by rank with unranked entries last, and
/// truncated to `limit`.
pub fn select_skills_for_track<'a>(
    skills: &'a [Skill],
    track_name: &str,
    track_code: &str,
    limit: usize,
) -> Vec<&'a Skill> {
    let mut seen_names = HashSet::new();
    let mut selected: Vec<&Skill> = skills
        .iter()
        .filter(|s| {
            matches_directly(s, track_name, track_code)
                || matches_via_common_scope(s, track_name, track_code)
        })
        .filter(|s| seen_names.insert(s.name.clone()))
        .collect();

    // Vec::sort_by is stable, so equal ranks keep input order.
    selected.sort_by(|a, b| match (a.rank, b.rank) {
        (Some(ra), Some(rb)) => ra.partial_cmp(&rb).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    selected.truncate(limit);
    debug!(
        track = track_name,
        selected = selected.len(),
        "skills selected for track"
    );
    selected
}

/// Bullet list of related-task names scoped to the current track,
/// deduplicated by name in first-seen order.
pub fn bullets_from_related_tasks(related: &[RelatedTask], current_track_name: &str) -> String {
    let mut seen = HashSet::new();
    let names: Vec<&str> = related
        .iter()
        .filter(|rt| {
            rt.track
                .as_ref()
                .is_some_and(|k| !k.name.is_empty() && k.name == current_track_name)
        })
        .map(|rt| rt.task_name.as_str())
        .filter(|name| !name.is_empty() && seen.insert(name.to_string()))
        .collect();
    bullet_lines(names)
}
