//! Workbook filling.
//!
//! The template workbook carries all the visual structure (widths,
//! heights, merges, fonts, borders); this module only injects values
//! into fixed cell windows and flips on text wrap, leaving everything
//! else untouched. Track mode clones the template Task/Skill sheets per
//! track and removes the originals afterwards.

use crate::error::{Result, SheetError};
use crate::filename::ParsedName;
use crate::model::{self, Task};
use crate::text::{bullet_lines, strip_markers};
use crate::track::{self, Track};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;
use umya_spreadsheet::{
    reader, writer, HorizontalAlignmentValues, Spreadsheet, VerticalAlignmentValues, Worksheet,
};

/// Task sheet window: column A = name, column C = description.
pub const TASK_START_ROW: u32 = 5;
pub const TASK_END_ROW: u32 = 14;

/// Skill sheet window: A = related-task bullets, B = name,
/// D = definition, F = tech stack.
pub const SKILL_START_ROW: u32 = 5;
pub const SKILL_END_ROW: u32 = 11;

const TASK_SHEET: &str = "Task";
const SKILL_SHEET: &str = "Skill";

/// Load a workbook from template bytes.
pub fn load_template(bytes: &[u8]) -> Result<Spreadsheet> {
    let book = reader::xlsx::read_reader(Cursor::new(bytes.to_vec()), true)?;
    Ok(book)
}

/// Serialize a workbook back to bytes.
pub fn save_to_bytes(book: &Spreadsheet) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    writer::xlsx::write_writer(book, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Resolve a sheet title case-insensitively against the workbook.
///
/// The lower-cased title map is built once per call site from the sheet
/// collection; a miss is a hard template precondition failure.
fn canonical_sheet_name(book: &Spreadsheet, name: &str) -> Result<String> {
    let lower: HashMap<String, String> = book
        .get_sheet_collection()
        .iter()
        .map(|ws| (ws.get_name().to_lowercase(), ws.get_name().to_string()))
        .collect();
    lower
        .get(&name.to_lowercase())
        .cloned()
        .ok_or_else(|| SheetError::template(name))
}

fn sheet_mut<'a>(book: &'a mut Spreadsheet, canonical: &str) -> Result<&'a mut Worksheet> {
    book.get_sheet_by_name_mut(canonical)
        .ok_or_else(|| SheetError::template(canonical))
}

/// Write a text value and enable wrap, keeping the cell's existing
/// horizontal/vertical alignment, rotation, shrink and indent.
fn set_text(ws: &mut Worksheet, coord: &str, text: &str) {
    let cell = ws.get_cell_mut(coord);
    cell.set_value(text);
    cell.get_style_mut().get_alignment_mut().set_wrap_text(true);
}

/// Fill the Task window from `tasks`, blanking rows past the data.
fn fill_task_rows(ws: &mut Worksheet, tasks: &[&Task]) {
    let window = (TASK_END_ROW - TASK_START_ROW + 1) as usize;
    let mut row = TASK_START_ROW;
    for task in tasks.iter().take(window) {
        set_text(ws, &format!("A{}", row), &task.name);
        set_text(ws, &format!("C{}", row), &task.description);
        row += 1;
    }
    for r in row..=TASK_END_ROW {
        set_text(ws, &format!("A{}", r), "");
        set_text(ws, &format!("C{}", r), "");
    }
}

/// One rendered Skill-sheet row.
struct SkillRow {
    related: String,
    name: String,
    definition: String,
    tech: String,
}

/// Fill the Skill window, blanking rows past the data.
fn fill_skill_rows(ws: &mut Worksheet, rows: &[SkillRow]) {
    let window = (SKILL_END_ROW - SKILL_START_ROW + 1) as usize;
    let mut row = SKILL_START_ROW;
    for entry in rows.iter().take(window) {
        set_text(ws, &format!("A{}", row), &entry.related);
        set_text(ws, &format!("B{}", row), &entry.name);
        set_text(ws, &format!("D{}", row), &entry.definition);
        set_text(ws, &format!("F{}", row), &entry.tech);
        row += 1;
    }
    for r in row..=SKILL_END_ROW {
        for col in ["A", "B", "D", "F"] {
            set_text(ws, &format!("{}{}", col, r), "");
        }
    }
}

/// Fill the template's Task and Skill sheets in place (Non Track mode).
pub fn build_non_track(
    book: &mut Spreadsheet,
    parsed: &ParsedName,
    payload: &serde_json::Value,
) -> Result<()> {
    let task_sheet = canonical_sheet_name(book, TASK_SHEET)?;
    let skill_sheet = canonical_sheet_name(book, SKILL_SHEET)?;

    let tasks = model::collect_tasks(payload);
    let skills = model::collect_skills(payload);
    let lookup = model::task_lookup(&tasks);
    debug!(tasks = tasks.len(), skills = skills.len(), "payload normalized");

    let ws = sheet_mut(book, &task_sheet)?;
    set_text(ws, "B1", &parsed.org);
    set_text(ws, "B2", &parsed.role);
    let task_refs: Vec<&Task> = tasks.iter().collect();
    fill_task_rows(ws, &task_refs);

    let rows: Vec<SkillRow> = skills
        .iter()
        .map(|s| SkillRow {
            related: bullet_lines(model::related_task_names(&s.related_tasks, &lookup)),
            name: s.name.clone(),
            definition: strip_markers(&s.definition),
            tech: s.tech_stack.lines(),
        })
        .collect();
    let ws = sheet_mut(book, &skill_sheet)?;
    set_text(ws, "B1", &parsed.org);
    set_text(ws, "B2", &parsed.role);
    fill_skill_rows(ws, &rows);

    Ok(())
}

/// Duplicate a template sheet under a new title.
///
/// Cloning the worksheet carries column widths, row heights, merged
/// regions and cell styles along with it.
fn duplicate_sheet(book: &mut Spreadsheet, canonical: &str, title: &str) -> Result<()> {
    let mut copy = book
        .get_sheet_by_name(canonical)
        .ok_or_else(|| SheetError::template(canonical))?
        .clone();
    copy.set_name(title);
    book.add_sheet(copy)
        .map_err(|e| SheetError::template(format!("{}: {}", title, e)))?;
    Ok(())
}

/// Write the track header: org/job in B1/B2 and the track name centered
/// in the merged D1:D2 range.
fn write_track_header(ws: &mut Worksheet, parsed: &ParsedName, track: &Track) {
    set_text(ws, "B1", &parsed.org);
    set_text(ws, "B2", &parsed.role);
    ws.add_merge_cells("D1:D2");
    let cell = ws.get_cell_mut("D1");
    cell.set_value(&track.name);
    let alignment = cell.get_style_mut().get_alignment_mut();
    alignment.set_horizontal(HorizontalAlignmentValues::Center);
    alignment.set_vertical(VerticalAlignmentValues::Center);
    alignment.set_wrap_text(true);
}

/// Force vertical centering on every existing cell of a sheet, leaving
/// the other alignment fields as they are.
fn center_vertically(ws: &mut Worksheet) {
    for cell in ws.get_cell_collection_mut() {
        cell.get_style_mut()
            .get_alignment_mut()
            .set_vertical(VerticalAlignmentValues::Center);
    }
}

/// Materialize one Task/Skill sheet pair per resolved track, then remove
/// the template originals (Track mode).
pub fn build_track(
    book: &mut Spreadsheet,
    parsed: &ParsedName,
    payload: &serde_json::Value,
) -> Result<()> {
    let task_sheet = canonical_sheet_name(book, TASK_SHEET)?;
    let skill_sheet = canonical_sheet_name(book, SKILL_SHEET)?;

    let tasks = model::collect_tasks(payload);
    let skills = model::collect_skills(payload);
    let tracks = track::resolve_tracks(payload, &tasks);
    debug!(tracks = tracks.len(), "tracks resolved");
    // removing the originals with nothing to replace them would leave a
    // workbook with no sheets at all
    if tracks.is_empty() {
        return Err(SheetError::NoTracks);
    }

    let task_window = (TASK_END_ROW - TASK_START_ROW + 1) as usize;
    let skill_window = (SKILL_END_ROW - SKILL_START_ROW + 1) as usize;

    for t in &tracks {
        let task_title = format!("트랙 {}_Task", t.index);
        let skill_title = format!("트랙 {}_Skill", t.index);
        duplicate_sheet(book, &task_sheet, &task_title)?;
        duplicate_sheet(book, &skill_sheet, &skill_title)?;

        let selected_tasks = track::select_tasks_for_track(&tasks, &t.name, task_window);
        let ws = sheet_mut(book, &task_title)?;
        write_track_header(ws, parsed, t);
        fill_task_rows(ws, &selected_tasks);
        center_vertically(ws);

        let selected_skills =
            track::select_skills_for_track(&skills, &t.name, &t.code, skill_window);
        let rows: Vec<SkillRow> = selected_skills
            .iter()
            .map(|s| SkillRow {
                related: track::bullets_from_related_tasks(&s.related_tasks, &t.name),
                name: s.name.clone(),
                definition: strip_markers(&s.definition),
                tech: s.tech_stack.lines(),
            })
            .collect();
        let ws = sheet_mut(book, &skill_title)?;
        write_track_header(ws, parsed, t);
        fill_skill_rows(ws, &rows);
        center_vertically(ws);
    }

    book.remove_sheet_by_name(&task_sheet)
        .map_err(|e| SheetError::template(format!("{}: {}", task_sheet, e)))?;
    book.remove_sheet_by_name(&skill_sheet)
        .map_err(|e| SheetError::template(format!("{}: {}", skill_sheet, e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use umya_spreadsheet::new_file;

    /// Template with Task/Skill sheets carrying stale content inside the
    /// data windows.
    fn template() -> Spreadsheet {
        let mut book = new_file();
        let ws = book.get_sheet_mut(&0).unwrap();
        ws.set_name("Task");
        for r in TASK_START_ROW..=TASK_END_ROW {
            ws.get_cell_mut(format!("A{}", r)).set_value("stale");
            ws.get_cell_mut(format!("C{}", r)).set_value("stale");
        }
        let ws = book.new_sheet("Skill").unwrap();
        for r in SKILL_START_ROW..=SKILL_END_ROW {
            ws.get_cell_mut(format!("B{}", r)).set_value("stale");
        }
        book
    }

    fn parsed() -> ParsedName {
        ParsedName {
            org: "Acme".into(),
            role: "Data Engineer".into(),
        }
    }

    fn task_payload(count: usize) -> serde_json::Value {
        let tasks: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "task_id": format!("T{}", i),
                    "task_name": format!("task {}", i),
                    "task_description": format!("desc {}", i)
                })
            })
            .collect();
        json!({"tasks": tasks, "skills": []})
    }

    #[test]
    fn test_non_track_headers_and_rows() {
        let mut book = template();
        build_non_track(&mut book, &parsed(), &task_payload(3)).unwrap();
        let ws = book.get_sheet_by_name("Task").unwrap();
        assert_eq!(ws.get_value("B1"), "Acme");
        assert_eq!(ws.get_value("B2"), "Data Engineer");
        assert_eq!(ws.get_value("A5"), "task 0");
        assert_eq!(ws.get_value("C7"), "desc 2");
    }

    #[test]
    fn test_window_truncates_excess_tasks() {
        let mut book = template();
        build_non_track(&mut book, &parsed(), &task_payload(12)).unwrap();
        let ws = book.get_sheet_by_name("Task").unwrap();
        assert_eq!(ws.get_value("A14"), "task 9");
        // nothing past the window is touched
        assert_eq!(ws.get_value("A15"), "");
    }

    #[test]
    fn test_window_blanks_stale_rows() {
        let mut book = template();
        build_non_track(&mut book, &parsed(), &task_payload(3)).unwrap();
        let ws = book.get_sheet_by_name("Task").unwrap();
        for r in 8..=14 {
            assert_eq!(ws.get_value(format!("A{}", r)), "", "row {}", r);
            assert_eq!(ws.get_value(format!("C{}", r)), "", "row {}", r);
        }
        let ws = book.get_sheet_by_name("Skill").unwrap();
        for r in SKILL_START_ROW..=SKILL_END_ROW {
            assert_eq!(ws.get_value(format!("B{}", r)), "");
        }
    }

    #[test]
    fn test_skill_rows_resolved_and_sanitized() {
        let mut book = template();
        let payload = json!({
            "tasks": [{"task_id": "T1", "task_name": "Design"}],
            "skills": [{
                "name": "API Design",
                "definition": "Builds APIs [cite: 3] well",
                "tech_stack": {"language": ["Python"]},
                "related_tasks": [{"task_id": "T1"}]
            }]
        });
        build_non_track(&mut book, &parsed(), &payload).unwrap();
        let ws = book.get_sheet_by_name("Skill").unwrap();
        assert_eq!(ws.get_value("A5"), "* Design");
        assert_eq!(ws.get_value("B5"), "API Design");
        assert_eq!(ws.get_value("D5"), "Builds APIs well");
        assert_eq!(ws.get_value("F5"), "* language: Python");
    }

    #[test]
    fn test_sheet_lookup_case_insensitive() {
        let mut book = new_file();
        book.get_sheet_mut(&0).unwrap().set_name("TASK");
        book.new_sheet("skill").unwrap();
        build_non_track(&mut book, &parsed(), &task_payload(1)).unwrap();
        assert_eq!(book.get_sheet_by_name("TASK").unwrap().get_value("B1"), "Acme");
    }

    #[test]
    fn test_missing_sheet_is_template_error() {
        let mut book = new_file();
        book.get_sheet_mut(&0).unwrap().set_name("Task");
        let err = build_non_track(&mut book, &parsed(), &task_payload(1)).unwrap_err();
        assert!(matches!(err, SheetError::Template { .. }));
    }

    #[test]
    fn test_wrap_preserves_existing_alignment() {
        let mut book = template();
        {
            let ws = book.get_sheet_by_name_mut("Task").unwrap();
            ws.get_cell_mut("A5")
                .get_style_mut()
                .get_alignment_mut()
                .set_horizontal(HorizontalAlignmentValues::Right);
        }
        build_non_track(&mut book, &parsed(), &task_payload(1)).unwrap();
        let ws = book.get_sheet_by_name("Task").unwrap();
        let style = ws.get_cell("A5").unwrap().get_style();
        let alignment = style.get_alignment().unwrap();
        assert_eq!(
            alignment.get_horizontal(),
            &HorizontalAlignmentValues::Right
        );
        assert!(*alignment.get_wrap_text());
    }

    fn track_payload() -> serde_json::Value {
        json!({
            "meta": {"tracks": [
                {"track_name": "Backend", "track_code": "BE"},
                {"track_name": "Frontend", "track_code": "FE"}
            ]},
            "tasks": [
                {"task_id": "T1", "task_name": "deploy", "task_description": "ship it",
                 "track": {"name": "Backend", "code": "BE"}},
                {"task_id": "T2", "task_name": "style", "task_description": "make it pretty",
                 "track": {"name": "Frontend", "code": "FE"}}
            ],
            "skills": [
                {"name": "Kubernetes", "definition": "Runs clusters",
                 "track": {"name": "Backend", "code": "BE"},
                 "related_tasks": [{"task_name": "deploy", "track": {"name": "Backend"}}]},
                {"name": "Git", "definition": "Version control", "track_scope": "common",
                 "related_tasks": [
                     {"task_name": "deploy", "track": {"name": "Backend", "code": "BE"}},
                     {"task_name": "style", "track": {"name": "Frontend", "code": "FE"}}
                 ]}
            ]
        })
    }

    #[test]
    fn test_track_mode_materializes_sheet_pairs() {
        let mut book = template();
        build_track(&mut book, &parsed(), &track_payload()).unwrap();

        assert!(book.get_sheet_by_name("Task").is_none());
        assert!(book.get_sheet_by_name("Skill").is_none());

        let ws = book.get_sheet_by_name("트랙 1_Task").unwrap();
        assert_eq!(ws.get_value("B1"), "Acme");
        assert_eq!(ws.get_value("D1"), "Backend");
        assert_eq!(ws.get_value("A5"), "deploy");
        assert_eq!(ws.get_value("A6"), "");

        let ws = book.get_sheet_by_name("트랙 2_Task").unwrap();
        assert_eq!(ws.get_value("D1"), "Frontend");
        assert_eq!(ws.get_value("A5"), "style");
    }

    #[test]
    fn test_track_mode_skill_selection_and_bullets() {
        let mut book = template();
        build_track(&mut book, &parsed(), &track_payload()).unwrap();

        let ws = book.get_sheet_by_name("트랙 1_Skill").unwrap();
        assert_eq!(ws.get_value("B5"), "Kubernetes");
        assert_eq!(ws.get_value("A5"), "* deploy");
        // common-scope skill attaches to both tracks
        assert_eq!(ws.get_value("B6"), "Git");

        let ws = book.get_sheet_by_name("트랙 2_Skill").unwrap();
        assert_eq!(ws.get_value("B5"), "Git");
        assert_eq!(ws.get_value("A5"), "* style");
        assert_eq!(ws.get_value("B6"), "");
    }

    #[test]
    fn test_track_sheets_merge_and_centering() {
        let mut book = template();
        build_track(&mut book, &parsed(), &track_payload()).unwrap();

        let ws = book.get_sheet_by_name("트랙 1_Task").unwrap();
        let merged: Vec<String> = ws
            .get_merge_cells()
            .iter()
            .map(|r| r.get_range())
            .collect();
        assert!(merged.contains(&"D1:D2".to_string()));

        let style = ws.get_cell("A5").unwrap().get_style();
        assert_eq!(
            style.get_alignment().unwrap().get_vertical(),
            &VerticalAlignmentValues::Center
        );
    }

    #[test]
    fn test_track_mode_no_tracks_is_an_error() {
        let mut book = template();
        let payload = json!({"tasks": [], "skills": []});
        let err = build_track(&mut book, &parsed(), &payload).unwrap_err();
        assert!(matches!(err, SheetError::NoTracks));
        // template sheets survive a refused conversion
        assert!(book.get_sheet_by_name("Task").is_some());
        assert!(book.get_sheet_by_name("Skill").is_some());
    }

    #[test]
    fn test_other_sheets_left_untouched() {
        let mut book = template();
        book.new_sheet("설명").unwrap();
        build_track(&mut book, &parsed(), &track_payload()).unwrap();
        assert!(book.get_sheet_by_name("설명").is_some());
    }

    #[test]
    fn test_roundtrip_through_bytes() {
        let mut book = template();
        build_non_track(&mut book, &parsed(), &task_payload(2)).unwrap();
        let bytes = save_to_bytes(&book).unwrap();
        let reloaded = load_template(&bytes).unwrap();
        let ws = reloaded.get_sheet_by_name("Task").unwrap();
        assert_eq!(ws.get_value("A6"), "task 1");
    }
}
