//! Presentation helpers for the classroom binary
//!
//! Turns views, records and class content into terminal text. Empty display
//! fields are shown as "N/A" here and nowhere else.

use crate::models::{
    Assignment, AttendanceSheet, ClassroomRecord, ClassroomView, LinkPost, NoteResource, NoteUnit,
    Notice, Posted, Roster,
};

const MISSING: &str = "N/A";

fn or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING
    } else {
        value
    }
}

/// Format a joined classroom as seen by a student
pub fn format_view(view: &ClassroomView) -> String {
    let mut out = format!(
        "{}\n  Professor: {}\n  College: {}\n  Degree: {}\n  Semester: {}",
        or_missing(&view.subject),
        or_missing(&view.professor_name),
        or_missing(&view.college_name),
        or_missing(&view.degree),
        or_missing(&view.semester),
    );
    if let Some(link) = &view.link {
        out.push_str(&format!("\n  Link: {}", link));
    }
    if let Some(code) = &view.code {
        out.push_str(&format!("\n  Class Code: {}", code));
    }
    out.push_str(&format!("\n  Open: /view/{}", view.id));
    out
}

/// Format a classroom as seen by its teacher
pub fn format_classroom(record: &ClassroomRecord) -> String {
    format!(
        "{} [{}]\n  Professor: {}\n  College: {}\n  Degree: {}\n  Semester: {}\n  Code: {}\n  Link: {}",
        or_missing(&record.details.subject),
        record.id,
        or_missing(&record.details.professor_name),
        or_missing(&record.details.college_name),
        or_missing(&record.details.degree),
        or_missing(&record.details.semester),
        or_missing(&record.class_code),
        or_missing(&record.share_link),
    )
}

/// Text a teacher shares with students
pub fn format_invitation(record: &ClassroomRecord) -> String {
    format!("Join my class!\nLink: {}\nCode: {}", record.share_link, record.class_code)
}

pub fn format_notice(notice: &Posted<Notice>) -> String {
    format!(
        "{} [{}]\n  {}\n  Posted: {}",
        or_missing(&notice.item.title),
        notice.id,
        or_missing(&notice.item.description),
        notice.created_at.format("%Y-%m-%d %H:%M"),
    )
}

pub fn format_link(link: &Posted<LinkPost>) -> String {
    let mut out = format!("{} [{}]\n  {}", or_missing(&link.item.title), link.id, link.item.url);
    if !link.item.description.is_empty() {
        out.push_str(&format!("\n  {}", link.item.description));
    }
    out
}

pub fn format_assignment(assignment: &Posted<Assignment>) -> String {
    let item = &assignment.item;
    let mut out = format!(
        "{} [{}]\n  Due: {}\n  {}",
        or_missing(&item.title),
        assignment.id,
        item.due_date.format("%Y-%m-%d"),
        or_missing(&item.description),
    );
    if !item.link.is_empty() {
        out.push_str(&format!("\n  Link: {}", item.link));
    }
    out
}

pub fn format_note_unit(unit: &Posted<NoteUnit>) -> String {
    format!("{} [{}]", or_missing(&unit.item.name), unit.id)
}

pub fn format_note_resource(resource: &Posted<NoteResource>) -> String {
    let body = match &resource.item {
        NoteResource::Link { url } => format!("Link: {}", url),
        NoteResource::Text { text } => format!("Text: {}", text),
        NoteResource::Pdf { url } => format!("PDF: {}", url),
        NoteResource::Image { url } => format!("Image: {}", url),
    };
    format!("[{}] {}", resource.id, body)
}

/// Month name and year, plus the attached resource if any
pub fn format_attendance_sheet(sheet: &Posted<AttendanceSheet>) -> String {
    let month = sheet
        .item
        .first_day()
        .map(|day| day.format("%B %Y").to_string())
        .unwrap_or_else(|| sheet.item.month_key.clone());
    let resource = if sheet.item.resource_link.is_empty() {
        "No resource uploaded yet".to_string()
    } else {
        format!("Resource: {}", sheet.item.resource_link)
    };
    format!("{} [{}]\n  {}", month, sheet.id, resource)
}

pub fn format_roster(roster: &Roster) -> String {
    let admin = roster
        .admin
        .as_ref()
        .map(|a| format!("{} [{}]", a.item.name, a.id))
        .unwrap_or_else(|| MISSING.to_string());
    let mut out = format!("Admin: {}\nStudents:", admin);
    if roster.students.is_empty() {
        out.push_str(" none");
    }
    for student in &roster.students {
        out.push_str(&format!(
            "\n  {} ({}) [{}]",
            student.item.name,
            or_missing(student.item.enroll_no.as_deref().unwrap_or_default()),
            student.id
        ));
    }
    out
}
