use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::*;
use crate::document::{ExtractedDocument, ExtractedPage, PositionedWord, Rect, TableRegion};
use crate::model::ExamSession;
use assemble::{assemble_exams, assemble_weekly};
use cell::decompose_cell;
use exams::{ExamSlot, course_names_from_slots, detect_exam_type, exams_for_courses, extract_exam_slots};
use expand::repair_truncation;
use layout::{parse_layout_block, split_layout_blocks};
use locator::locate_students;
use normalize::{normalize_room, resolve_canonical_name};
use slots::resolved_minutes;
use table::parse_timetable_grid;

const SCENARIO_A_CELL: &str = "CS2006,BSE-4B: Operating Systems\nFazl-e-Basit (Room 10)";

fn context() -> ExtractionContext {
    ExtractionContext::new(ReferenceTables::default(), SlotTable::regular()).unwrap()
}

fn context_with(references: ReferenceTables) -> ExtractionContext {
    ExtractionContext::new(references, SlotTable::regular()).unwrap()
}

fn owned_row(cells: &[Option<&str>]) -> Vec<Option<String>> {
    cells.iter().map(|cell| cell.map(str::to_string)).collect()
}

fn grid(header: &[Option<&str>], rows: &[&[Option<&str>]]) -> TableRegion {
    let mut all_rows = vec![owned_row(header)];
    all_rows.extend(rows.iter().map(|row| owned_row(row)));
    TableRegion {
        bbox: Rect {
            x0: 20.0,
            top: 100.0,
            x1: 800.0,
            bottom: 400.0,
        },
        rows: all_rows,
    }
}

fn session(day: Weekday, start: &str, end: &str, subject: &str) -> ClassSession {
    ClassSession {
        day,
        start_time: start.to_string(),
        end_time: end.to_string(),
        subject: subject.to_string(),
        room: "Room 1".to_string(),
        teacher: "Someone".to_string(),
    }
}

/// Places each text at a character column, padding with spaces.
fn layout_line(cells: &[(usize, &str)]) -> String {
    let mut line = String::new();
    for (offset, text) in cells {
        while line.chars().count() < *offset {
            line.push(' ');
        }
        line.push_str(text);
    }
    line
}

fn layout_header() -> String {
    layout_line(&[(12, "8:00-9:30"), (32, "9:30-11:00"), (52, "11:00-12:30")])
}

#[test]
fn course_code_tokens_carry_sections_and_separators() {
    let patterns = Patterns::new().unwrap();
    let tokens = patterns.find_course_code_tokens("CS2006,BSE-4B: Operating Systems");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].code, "CS2006");
    assert_eq!(tokens[0].section.as_deref(), Some("BSE-4B"));
    assert_eq!(&"CS2006,BSE-4B: Operating Systems"[tokens[0].end..], "Operating Systems");

    let dashed = patterns.find_course_code_tokens("AL2002 - Artificial Intellige");
    assert_eq!(dashed[0].section, None);
    assert_eq!(&"AL2002 - Artificial Intellige"[dashed[0].end..], "Artificial Intellige");
}

#[test]
fn teacher_room_line_requires_parens_and_no_course_code() {
    let patterns = Patterns::new().unwrap();

    let found = patterns.match_teacher_room_line("Fazl-e-Basit (Room 10)").unwrap();
    assert_eq!(found.teacher, "Fazl-e-Basit");
    assert_eq!(found.room, "Room 10");

    let nested = patterns
        .match_teacher_room_line("Iqra Rehman (CS Dept) (Khyber) -")
        .unwrap();
    assert_eq!(nested.room, "Khyber");
    assert_eq!(nested.teacher, "Iqra Rehman");

    assert!(patterns.match_teacher_room_line("Rabia Zia").is_none());
    assert!(patterns.match_teacher_room_line("CS2006 (Room 10)").is_none());
}

#[test]
fn weekday_labels_match_short_and_full_names_only() {
    let patterns = Patterns::new().unwrap();

    assert_eq!(patterns.match_weekday_label("Monday CS2006"), Some((Weekday::Mon, 6)));
    assert_eq!(patterns.match_weekday_label("  Tue"), Some((Weekday::Tue, 5)));
    assert_eq!(patterns.match_weekday_label("Monitor"), None);
    assert_eq!(patterns.match_weekday_label("CS2006 Mon"), None);
}

#[test]
fn exam_dates_are_rendered_with_full_year() {
    let patterns = Patterns::new().unwrap();

    assert_eq!(
        patterns.parse_exam_date("Sat,21,Feb,26").as_deref(),
        Some("Sat, 21 Feb 2026")
    );
    assert_eq!(
        patterns.parse_exam_date("Datesheet\nMon, 23, Feb, 26").as_deref(),
        Some("Mon, 23 Feb 2026")
    );
    assert_eq!(patterns.parse_exam_date("no date here"), None);
}

#[test]
fn student_headers_are_found_in_order_without_duplicates() {
    let patterns = Patterns::new().unwrap();
    let text = "Timetable for 20p-0087|BCS|B\n...\nTimetable for 20P-0097|BCS|A\nTimetable for 20P-0087|BCS|B";

    assert_eq!(locate_students(&patterns, text), vec!["20P-0087", "20P-0097"]);
    assert!(locate_students(&patterns, "Weekly timetable").is_empty());
}

#[test]
fn decompose_splits_course_and_teacher_room() {
    let patterns = Patterns::new().unwrap();
    let cell = decompose_cell(&patterns, SCENARIO_A_CELL);

    assert_eq!(cell.courses.len(), 1);
    assert_eq!(cell.courses[0].code, "CS2006");
    assert_eq!(cell.courses[0].section.as_deref(), Some("BSE-4B"));
    assert_eq!(cell.courses[0].partial_name, "Operating Systems");

    let teacher_room = cell.teacher_room.unwrap();
    assert_eq!(teacher_room.teacher, "Fazl-e-Basit");
    assert_eq!(teacher_room.room, "Room 10");
}

#[test]
fn decompose_wrapped_name_and_missing_teacher() {
    let patterns = Patterns::new().unwrap();
    let cell = decompose_cell(&patterns, "CL2006,BCS-6C: Operating\nSystems - Lab");

    assert_eq!(cell.courses[0].partial_name, "Operating Systems - Lab");
    assert!(cell.teacher_room.is_none());
}

#[test]
fn decompose_without_course_code_is_empty() {
    let patterns = Patterns::new().unwrap();
    let cell = decompose_cell(&patterns, "Reserved\nAdmin (Room 3)");

    assert!(cell.courses.is_empty());
}

#[test]
fn truncation_rules_repair_known_stems() {
    assert_eq!(repair_truncation("Artificial Intellige"), "Artificial Intelligence");
    assert_eq!(repair_truncation("Digital Image Proces..."), "Digital Image Processing");
    assert_eq!(repair_truncation("Parallel and Distrib"), "Parallel and Distributed Computing");
    assert_eq!(repair_truncation("Probability and Stat..."), "Probability and Statistics");
    assert_eq!(repair_truncation("Numerical Comp…"), "Numerical Computing");
    assert_eq!(repair_truncation("Modeling an..."), "Modeling and Simulation");
}

#[test]
fn truncation_rules_respect_word_boundaries_and_markers() {
    assert_eq!(repair_truncation("Data Preproces"), "Data Preproces");
    assert_eq!(repair_truncation("Modeling an"), "Modeling an");
    assert_eq!(repair_truncation("Software Project Man..."), "Software Project Man");
    assert_eq!(repair_truncation("Operating Systems."), "Operating Systems");
}

#[test]
fn reference_name_replaces_truncated_partial() {
    let patterns = Patterns::new().unwrap();
    let mut course_names = BTreeMap::new();
    course_names.insert("CS2006".to_string(), "Operating Systems".to_string());

    let cell = decompose_cell(&patterns, "CS2006,BSE-4B: Operating Sys...");
    let dashed = expand::render_subject(&cell.courses[0], &course_names, SubjectStyle::Dashed);
    let sectioned = expand::render_subject(&cell.courses[0], &course_names, SubjectStyle::Sectioned);

    assert_eq!(dashed, "CS2006 - Operating Systems");
    assert_eq!(sectioned, "CS2006,BSE-4B: Operating Systems");
    assert!(!dashed.contains("..."));
}

#[test]
fn canonical_name_prefers_exact_then_fuzzy_match() {
    let mut table = BTreeMap::new();
    table.insert("fazl e basit".to_string(), "Dr. Fazl-e-Basit".to_string());
    table.insert("rabia zia".to_string(), "Rabia Zia".to_string());

    assert_eq!(resolve_canonical_name("Fazl-e-Basit", &table, 0.85), Some("Dr. Fazl-e-Basit"));
    assert_eq!(resolve_canonical_name("Fazl e Basitt", &table, 0.85), Some("Dr. Fazl-e-Basit"));
    assert_eq!(resolve_canonical_name("Ali Raza", &table, 0.85), None);
    assert_eq!(resolve_canonical_name("", &table, 0.85), None);
}

#[test]
fn teacher_resolution_uses_faculty_variants() {
    let mut references = ReferenceTables::default();
    references.add_faculty_member("Dr. Fazl-e-Basit");

    assert_eq!(resolve_teacher("F Basit", &references, 0.85), "Dr. Fazl-e-Basit");
    assert_eq!(resolve_teacher("Mon Fazl-e-Basit", &references, 0.85), "Dr. Fazl-e-Basit");
    assert_eq!(resolve_teacher("Tue", &references, 0.85), "Unknown");
    assert_eq!(resolve_teacher("", &references, 0.85), "Unknown");
    assert_eq!(resolve_teacher("Visiting Faculty", &references, 0.85), "Visiting Faculty");
}

#[test]
fn room_normalization_never_merges_numbered_rooms() {
    let mut references = ReferenceTables::default();
    references
        .room_aliases
        .insert("room 10".to_string(), "Room 10 (CS Block)".to_string());
    references
        .room_aliases
        .insert("khyber hall".to_string(), "Khyber Hall".to_string());

    assert_eq!(normalize_room("Room 10", &references, 0.85), "Room 10 (CS Block)");
    assert_eq!(normalize_room("room 11", &references, 0.85), "Room 11");
    assert_eq!(normalize_room("Khybr Hall", &references, 0.85), "Khyber Hall");
    assert_eq!(normalize_room("Lab 3", &references, 0.85), "Lab 3");
    assert_eq!(normalize_room("  ", &references, 0.85), "TBA");
}

#[test]
fn time_labels_parse_with_wrapping_and_dashes() {
    assert_eq!(TimeSlot::parse_label("8:00\n-9:30"), Some(TimeSlot::new("8:00", "9:30")));
    assert_eq!(TimeSlot::parse_label("12:30 – 2:00"), Some(TimeSlot::new("12:30", "2:00")));
    assert_eq!(TimeSlot::parse_label("Mon"), None);
    assert_eq!(TimeSlot::parse_label("8:00"), None);
}

#[test]
fn afternoon_hours_resolve_after_morning_hours() {
    assert_eq!(resolved_minutes("8:00"), Some(480));
    assert_eq!(resolved_minutes("11:00"), Some(660));
    assert_eq!(resolved_minutes("2:00"), Some(840));
    assert_eq!(resolved_minutes("14:00"), Some(840));
    assert_eq!(resolved_minutes("noon"), None);
}

#[test]
fn explicit_slot_lists_need_valid_labels() {
    let table = SlotTable::parse("8:00-9:05, 9:10-10:15").unwrap();
    assert_eq!(table.slots().len(), 2);
    assert_eq!(table.get(1), Some(&TimeSlot::new("9:10", "10:15")));

    assert!(SlotTable::parse("8:00").is_err());
    assert!(SlotTable::parse(" , ").is_err());
}

#[test]
fn column_boundaries_come_from_header_labels() {
    let table = SlotTable::regular();
    let boundaries = table.column_boundaries(&layout_header()).unwrap();

    assert_eq!(boundaries.first_offset(), 12);
    assert_eq!(boundaries.column_for(0), 0);
    assert_eq!(boundaries.column_for(20), 0);
    assert_eq!(boundaries.column_for(32), 1);
    assert_eq!(boundaries.column_for(51), 1);
    assert_eq!(boundaries.column_for(200), 2);

    assert!(table.column_boundaries("Day    8:00-9:30").is_none());
}

#[test]
fn regular_slots_map_onto_ramadan_slots() {
    let counterparts = SlotTable::regular().counterparts_in(&SlotTable::ramadan());

    assert_eq!(
        counterparts,
        vec![Some(0), Some(1), Some(2), Some(3), Some(5), Some(6)]
    );
}

#[test]
fn table_grid_scenario_a() {
    let context = context();
    let table = grid(
        &[None, Some("8:00-9:30"), Some("9:30\n-11:00")],
        &[&[Some("Tue"), None, Some(SCENARIO_A_CELL)]],
    );

    let timetable = parse_timetable_grid(&context, &table);

    assert_eq!(timetable.sessions.len(), 1);
    let session = &timetable.sessions[0];
    assert_eq!(session.day, Weekday::Tue);
    assert_eq!(session.start_time, "9:30");
    assert_eq!(session.end_time, "11:00");
    assert_eq!(session.subject, "CS2006 - Operating Systems");
    assert_eq!(session.room, "Room 10");
    assert_eq!(session.teacher, "Fazl-e-Basit");
    assert!(timetable.course_codes.contains("CS2006"));
}

#[test]
fn table_grid_uses_room_aliases() {
    let mut references = ReferenceTables::default();
    references
        .room_aliases
        .insert("room 10".to_string(), "Room 10 (CS Block)".to_string());
    let context = context_with(references);
    let table = grid(
        &[None, Some("9:30-11:00")],
        &[&[Some("Tue"), Some(SCENARIO_A_CELL)]],
    );

    let timetable = parse_timetable_grid(&context, &table);

    assert_eq!(timetable.sessions[0].room, "Room 10 (CS Block)");
}

#[test]
fn table_grid_scenario_b_two_codes_in_one_cell() {
    let context = context();
    let table = grid(
        &[None, Some("8:00-9:30")],
        &[&[
            Some("Mon"),
            Some("CS2006: Operating Systems CS2005: Database Systems\nAli Khan (Room 11)"),
        ]],
    );

    let timetable = parse_timetable_grid(&context, &table);

    assert_eq!(timetable.sessions.len(), 2);
    assert_eq!(timetable.sessions[0].subject, "CS2006 - Operating Systems");
    assert_eq!(timetable.sessions[1].subject, "CS2005 - Database Systems");
    for session in &timetable.sessions {
        assert_eq!(session.day, Weekday::Mon);
        assert_eq!(session.start_time, "8:00");
        assert_eq!(session.room, "Room 11");
        assert_eq!(session.teacher, "Ali Khan");
    }
}

#[test]
fn table_grid_scenario_c_never_appends_lab() {
    let context = context();
    let table = grid(
        &[None, Some("11:00-12:30")],
        &[&[Some("Wed"), Some("AL2002 - Artificial Intellige")]],
    );

    let timetable = parse_timetable_grid(&context, &table);

    assert_eq!(timetable.sessions.len(), 1);
    assert_eq!(timetable.sessions[0].subject, "AL2002 - Artificial Intelligence");
    assert!(!timetable.sessions[0].subject.contains("Lab"));
    assert_eq!(timetable.sessions[0].teacher, "Unknown");
    assert_eq!(timetable.sessions[0].room, "Unknown");
}

#[test]
fn table_grid_skips_cells_without_slot_or_code() {
    let context = context();
    let table = grid(
        &[Some("Day"), Some("8:00-9:30"), Some("Remarks")],
        &[
            &[Some("Thu"), Some("Free period"), Some("CS2006: Operating Systems")],
            &[Some("Notes"), Some("CS2005: Database Systems"), None],
        ],
    );

    let timetable = parse_timetable_grid(&context, &table);

    assert!(timetable.is_empty());
}

#[test]
fn assembler_sorts_scenario_e_and_enforces_shape() {
    let sessions = vec![
        session(Weekday::Tue, "2:00", "3:30", "CS2005 - Database Systems"),
        session(Weekday::Tue, "11:00", "12:30", "CS2006 - Operating Systems"),
        session(Weekday::Mon, "12:30", "2:00", "MT2005 - Probability and Statistics"),
        session(Weekday::Mon, "9:30", "8:00", "CS1002 - Broken Slot"),
        session(Weekday::Wed, "noon", "1:00", "CS1003 - Unparsable"),
    ];

    let weekly = assemble_weekly("20P-0087", sessions);

    let order = weekly
        .iter()
        .map(|session| (session.day, session.start_time.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![(Weekday::Mon, "12:30"), (Weekday::Tue, "11:00"), (Weekday::Tue, "2:00")]
    );

    for session in &weekly {
        assert!(resolved_minutes(&session.start_time) < resolved_minutes(&session.end_time));
    }
}

#[test]
fn assembler_dedupes_on_subject_prefix() {
    let long_name = format!("CS9999 - {}", "Advanced Topics in Very Long Course Names ".repeat(3));
    let sessions = vec![
        session(Weekday::Thu, "8:00", "9:30", &format!("{long_name}A")),
        session(Weekday::Thu, "8:00", "9:30", &format!("{long_name}B")),
        session(Weekday::Thu, "9:30", "11:00", &format!("{long_name}A")),
    ];

    let weekly = assemble_weekly("20P-0087", sessions);

    assert_eq!(weekly.len(), 2);
    assert!(weekly[0].subject.ends_with('A'));

    let mut keys = BTreeSet::new();
    for session in &weekly {
        let prefix = session.subject.chars().take(assemble::SUBJECT_KEY_CHARS).collect::<String>();
        assert!(keys.insert((session.day, session.start_time.clone(), prefix)));
    }
}

#[test]
fn exams_sort_by_date_then_time_with_undated_last() {
    let exam = |subject: &str, date: &str, start: &str| ExamSession {
        subject: subject.to_string(),
        date: date.to_string(),
        start_time: start.to_string(),
        end_time: "11:30".to_string(),
        room: None,
        teacher: None,
    };

    let exams = assemble_exams(vec![
        exam("CS2006 - Operating Systems", "", "8:30"),
        exam("CS2005 - Database Systems", "Mon, 23 Feb 2026", "8:30"),
        exam("MT2005 - Probability and Statistics", "Sat, 21 Feb 2026", "2:00"),
        exam("CS1002 - Programming", "Sat, 21 Feb 2026", "8:30"),
        exam("CS1002 - Programming", "Sat, 21 Feb 2026", "8:30"),
    ]);

    let subjects = exams.iter().map(|exam| exam.subject.as_str()).collect::<Vec<_>>();
    assert_eq!(
        subjects,
        vec![
            "CS1002 - Programming",
            "MT2005 - Probability and Statistics",
            "CS2005 - Database Systems",
            "CS2006 - Operating Systems",
        ]
    );
}

#[test]
fn layout_blocks_split_at_student_headers() {
    let context = context();
    let text = "Page title\nTimetable for 20p-0087|BCS|B\nfirst\nTimetable for 20P-0097\nsecond";

    let blocks = split_layout_blocks(&context, text);

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].roll_number, "20P-0087");
    assert_eq!(blocks[0].text, "|BCS|B\nfirst\n");
    assert_eq!(blocks[1].roll_number, "20P-0097");
    assert_eq!(blocks[1].text, "\nsecond");
}

#[test]
fn layout_block_tracks_days_columns_and_teachers() {
    let context = context();
    let block = [
        "|BCS|B".to_string(),
        layout_header(),
        layout_line(&[(0, "Mon"), (12, "CS2006,BSE-4B: Operating"), (40, "MT2005: Probability")]),
        layout_line(&[(12, "Systems"), (40, "and Stat...")]),
        layout_line(&[(12, "Fazl-e-Basit (Room 10)"), (40, "Ali Raza (Room 11)")]),
        layout_line(&[(0, "Tue"), (52, "CS3001,BCS-6A: Computer")]),
        layout_line(&[(52, "Networks")]),
        layout_line(&[(52, "Sara Khan (Lab 3)")]),
        layout_line(&[(0, "Wed"), (12, "CS4001: Cloud Computing")]),
    ]
    .join("\n");

    let timetable = parse_layout_block(&context, &block).unwrap();
    let sessions = &timetable.sessions;

    assert_eq!(sessions.len(), 4);

    assert_eq!(sessions[0].day, Weekday::Mon);
    assert_eq!(sessions[0].start_time, "8:00");
    assert_eq!(sessions[0].subject, "CS2006,BSE-4B: Operating Systems");
    assert_eq!(sessions[0].teacher, "Fazl-e-Basit");
    assert_eq!(sessions[0].room, "Room 10");

    assert_eq!(sessions[1].day, Weekday::Mon);
    assert_eq!(sessions[1].start_time, "9:30");
    assert_eq!(sessions[1].subject, "MT2005: Probability and Statistics");
    assert_eq!(sessions[1].teacher, "Ali Raza");

    assert_eq!(sessions[2].day, Weekday::Tue);
    assert_eq!(sessions[2].start_time, "11:00");
    assert_eq!(sessions[2].subject, "CS3001,BCS-6A: Computer Networks");
    assert_eq!(sessions[2].room, "Lab 3");

    assert_eq!(sessions[3].day, Weekday::Wed);
    assert_eq!(sessions[3].subject, "CS4001: Cloud Computing");
    assert_eq!(sessions[3].teacher, "Unknown");
    assert_eq!(sessions[3].room, "TBA");
}

#[test]
fn layout_cells_before_the_first_day_join_that_day() {
    let context = context();
    let block = [
        layout_header(),
        layout_line(&[(12, "CS2006: Operating Systems")]),
        layout_line(&[(12, "Fazl-e-Basit (Room 10)")]),
        layout_line(&[(0, "Mon"), (32, "MT2005: Probability")]),
        layout_line(&[(32, "Ali Raza (Room 11)")]),
    ]
    .join("\n");

    let timetable = parse_layout_block(&context, &block).unwrap();
    let summary = timetable
        .sessions
        .iter()
        .map(|session| (session.day, session.start_time.as_str(), session.teacher.as_str()))
        .collect::<Vec<_>>();

    assert_eq!(
        summary,
        vec![(Weekday::Mon, "8:00", "Fazl-e-Basit"), (Weekday::Mon, "9:30", "Ali Raza")]
    );
}

#[test]
fn layout_pending_cell_continues_into_day_row() {
    let context = context();
    let block = [
        layout_header(),
        layout_line(&[(12, "CS2006: Operating")]),
        layout_line(&[(0, "Mon"), (12, "Systems")]),
        layout_line(&[(12, "Fazl-e-Basit (Room 10)")]),
    ]
    .join("\n");

    let timetable = parse_layout_block(&context, &block).unwrap();

    assert_eq!(timetable.sessions.len(), 1);
    assert_eq!(timetable.sessions[0].day, Weekday::Mon);
    assert_eq!(timetable.sessions[0].subject, "CS2006: Operating Systems");
    assert_eq!(timetable.sessions[0].room, "Room 10");
}

#[test]
fn layout_block_without_slot_header_is_unparsed() {
    let context = context();
    let block = "Mon   CS2006: Operating Systems\n      Fazl-e-Basit (Room 10)";

    assert!(parse_layout_block(&context, block).is_none());
}

#[test]
fn exam_type_detection_prefers_page_text() {
    let path = Path::new("Final Datesheet Spring-2026.pdf");

    assert_eq!(detect_exam_type("Tentative Datesheet Sessional 1", path), "Sessional I");
    assert_eq!(detect_exam_type("2nd Sessional Examination", path), "Sessional II");
    assert_eq!(detect_exam_type("SESSIONAL II", path), "Sessional II");
    assert_eq!(detect_exam_type("   ", path), "Final Examination");
    assert_eq!(detect_exam_type("Datesheet", path), "Examination Schedule");
}

fn exam_slot(cell: &str) -> ExamSlot {
    ExamSlot {
        cell: cell.to_string(),
        header: "8:30-11:30".to_string(),
        date: "Sat, 21 Feb 2026".to_string(),
    }
}

#[test]
fn exams_match_student_codes_and_split_teacher_text() {
    let patterns = Patterns::new().unwrap();
    let slots = vec![
        exam_slot("MT2005 - Probability and Statistics|BAI-4A|BSE-4B Ali Raza, Sara Khan (St: 120)"),
        exam_slot("CS2005 - Database Systems|BCS-4A Rabia Zia (St: 40)"),
        exam_slot("MT20051 - Not A Code"),
    ];
    let codes = BTreeSet::from(["MT2005".to_string()]);

    let legacy = exams_for_courses(&patterns, &slots, &codes, true);
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].subject, "MT2005 - Probability and Statistics");
    assert_eq!(legacy[0].date, "Sat, 21 Feb 2026");
    assert_eq!(legacy[0].start_time, "8:30");
    assert_eq!(legacy[0].end_time, "11:30");
    assert_eq!(legacy[0].teacher.as_deref(), Some("Ali Raza, Sara Khan"));
    assert_eq!(legacy[0].room.as_deref(), Some("Ali Raza, Sara Khan"));

    let separated = exams_for_courses(&patterns, &slots, &codes, false);
    assert_eq!(separated[0].room, None);
    assert_eq!(separated[0].teacher.as_deref(), Some("Ali Raza, Sara Khan"));
}

#[test]
fn exam_subjects_feed_course_names() {
    let patterns = Patterns::new().unwrap();
    let slots = vec![
        exam_slot("CS2006 - Operating\nSystems|BSE-4B Fazl-e-Basit (St: 50)"),
        exam_slot("Reserved"),
    ];

    assert_eq!(
        course_names_from_slots(&patterns, &slots),
        vec![("CS2006".to_string(), "Operating Systems".to_string())]
    );
}

fn word(text: &str, x0: f32, top: f32) -> PositionedWord {
    PositionedWord {
        text: text.to_string(),
        x0,
        top,
        x1: x0 + 8.0 * text.len() as f32,
        bottom: top + 10.0,
    }
}

fn datesheet_page(words: Vec<PositionedWord>, cells: &[&str]) -> ExtractedPage {
    let mut rows = vec![vec![Some("8:30-11:30".to_string()), Some("12:00\n-3:00".to_string())]];
    rows.push(cells.iter().map(|cell| Some(cell.to_string())).collect());
    ExtractedPage {
        width: 842.0,
        height: 595.0,
        text: String::new(),
        layout_text: None,
        words,
        tables: vec![TableRegion {
            bbox: Rect {
                x0: 40.0,
                top: 150.0,
                x1: 800.0,
                bottom: 300.0,
            },
            rows,
        }],
    }
}

#[test]
fn exam_slots_carry_dates_forward() {
    let patterns = Patterns::new().unwrap();
    let document = ExtractedDocument {
        name: "datesheet".to_string(),
        pages: vec![
            datesheet_page(
                vec![word("Sat,21,Feb,26", 10.0, 110.0)],
                &["CS2006 - Operating Systems|BSE-4B", "MT2005 - Probability|BAI-4A"],
            ),
            datesheet_page(Vec::new(), &["CS2005 - Database Systems|BCS-4A", "CS1002 - Programming"]),
        ],
    };

    let slots = extract_exam_slots(&document, &patterns).unwrap();

    assert_eq!(slots.len(), 4);
    assert!(slots.iter().all(|slot| slot.date == "Sat, 21 Feb 2026"));
    assert_eq!(slots[1].header, "12:00\n-3:00");
    assert_eq!(slots[2].cell, "CS2005 - Database Systems|BCS-4A");
}
