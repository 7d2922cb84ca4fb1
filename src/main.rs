/// Classroom Client - Main entry point
///
/// A command-line front end over the classroom library: teachers create and
/// delete classrooms, students join by code and list what they joined, and
/// both share notices, links, assignments, notes and attendance inside a class.
use classroom_client::config::{
    AssignmentAction, AttendanceAction, Command, Config, LinkAction, NoticeAction, NotesAction,
    RosterAction,
};
use classroom_client::models::{ClassroomDetails, Invite, NoteResource, RoleIntent, StudentProfile};
use classroom_client::{
    cli, ClassroomError, ClassroomRegistry, ContentService, DocumentStore, MembershipReconciler,
    MemoryStore, Result, SessionService, SqliteStore,
};
use log::{error, info};
use std::sync::Arc;

fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    if config.memory {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let db_path = config.database_path()?;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!("Database: {}", db_path.display());
    Ok(Arc::new(SqliteStore::open(&db_path)?))
}

async fn run(config: Config) -> Result<()> {
    let store = open_store(&config)?;

    match config.command {
        Command::SignIn { ref uid, ref email, role } => {
            let session = SessionService::new(store);
            let role = session
                .sign_in(uid, email.as_deref(), role.map(RoleIntent::new))
                .await?;
            println!("{}", role);
        }
        Command::Create { ref teacher, ref details } => {
            let origin = config.share_origin()?;
            let registry = ClassroomRegistry::new(store);
            let details = ClassroomDetails::new(
                details.subject.clone(),
                details.professor.clone(),
                details.college.clone(),
                details.degree.clone(),
                details.semester.clone(),
            );
            let record = registry.create_classroom(teacher, &details, &origin).await?;
            println!("{}\n\n{}", cli::format_classroom(&record), cli::format_invitation(&record));
        }
        Command::Classrooms { ref teacher } => {
            let registry = ClassroomRegistry::new(store);
            let records = registry.list_classrooms(teacher).await?;
            if records.is_empty() {
                println!("No classrooms yet.");
            }
            for record in &records {
                println!("{}\n", cli::format_classroom(record));
            }
        }
        Command::DeleteClassroom { ref teacher, ref id } => {
            let registry = ClassroomRegistry::new(store);
            registry.delete_classroom(teacher, id).await?;
            println!("Deleted classroom {}", id);
        }
        Command::Join {
            ref student,
            ref profile,
            ref code,
            ref link,
            ref invite,
        } => {
            let invite = match invite {
                Some(raw) => Invite::parse(raw)?,
                None => Invite::default(),
            };
            let code = code
                .clone()
                .or(invite.code)
                .ok_or_else(|| ClassroomError::Validation("class code is required".to_string()))?;
            let link = link.clone().or(invite.link);

            let mut student_profile = StudentProfile::new(
                profile.name.clone(),
                profile.enrollment.clone(),
                profile.classroom_label.clone(),
                profile.semester.clone(),
            );
            if let Some(email) = &profile.email {
                student_profile = student_profile.with_email(email.clone());
            }

            let reconciler = MembershipReconciler::new(store);
            let outcome = reconciler
                .join_classroom(student, &student_profile, &code, link.as_deref())
                .await?;
            println!("Joined:\n{}", cli::format_view(&outcome.view));
        }
        Command::List { ref student } => {
            let reconciler = MembershipReconciler::new(store);
            let views = reconciler.list_joined_classrooms(student).await?;
            if views.is_empty() {
                println!("No classrooms joined yet.");
            }
            for view in &views {
                println!("{}\n", cli::format_view(view));
            }
        }
        Command::Leave { ref student, ref code } => {
            let reconciler = MembershipReconciler::new(store);
            reconciler.delete_membership(student, code).await?;
            println!("Left {}", code.trim().to_uppercase());
        }
        Command::Notice { action } => run_notice(&ContentService::new(store), action).await?,
        Command::Link { action } => run_link(&ContentService::new(store), action).await?,
        Command::Assignment { action } => run_assignment(&ContentService::new(store), action).await?,
        Command::Notes { action } => run_notes(&ContentService::new(store), action).await?,
        Command::Attendance { action } => run_attendance(&ContentService::new(store), action).await?,
        Command::Roster { action } => run_roster(&ContentService::new(store), action).await?,
    }

    Ok(())
}

fn print_all(items: Vec<String>, empty: &str) {
    if items.is_empty() {
        println!("{}", empty);
    }
    for item in items {
        println!("{}\n", item);
    }
}

async fn run_notice(content: &ContentService, action: NoticeAction) -> Result<()> {
    match action {
        NoticeAction::Post { at, title, description } => {
            let notice = content
                .post_notice(&at.user, &at.classroom_id, &title, &description)
                .await?;
            println!("{}", cli::format_notice(&notice));
        }
        NoticeAction::List { classroom_id } => {
            let notices = content.list_notices(&classroom_id).await?;
            print_all(notices.iter().map(cli::format_notice).collect(), "No notices yet.");
        }
        NoticeAction::Delete { at, id } => {
            content.delete_notice(&at.user, &at.classroom_id, &id).await?;
            println!("Deleted notice {}", id);
        }
    }
    Ok(())
}

async fn run_link(content: &ContentService, action: LinkAction) -> Result<()> {
    match action {
        LinkAction::Post { at, title, url, description } => {
            let link = content
                .post_link(&at.user, &at.classroom_id, &title, &description, &url)
                .await?;
            println!("{}", cli::format_link(&link));
        }
        LinkAction::List { classroom_id } => {
            let links = content.list_links(&classroom_id).await?;
            print_all(links.iter().map(cli::format_link).collect(), "No links yet.");
        }
        LinkAction::Delete { at, id } => {
            content.delete_link(&at.user, &at.classroom_id, &id).await?;
            println!("Deleted link {}", id);
        }
    }
    Ok(())
}

async fn run_assignment(content: &ContentService, action: AssignmentAction) -> Result<()> {
    match action {
        AssignmentAction::Add { at, title, due, description, link } => {
            let assignment = content
                .add_assignment(&at.user, &at.classroom_id, &title, &description, &due, link.as_deref())
                .await?;
            println!("{}", cli::format_assignment(&assignment));
        }
        AssignmentAction::List { classroom_id } => {
            let assignments = content.list_assignments(&classroom_id).await?;
            print_all(assignments.iter().map(cli::format_assignment).collect(), "No assignments yet.");
        }
        AssignmentAction::Delete { at, id } => {
            content.delete_assignment(&at.user, &at.classroom_id, &id).await?;
            println!("Deleted assignment {}", id);
        }
    }
    Ok(())
}

async fn run_notes(content: &ContentService, action: NotesAction) -> Result<()> {
    match action {
        NotesAction::AddUnit { at, name } => {
            let unit = content.add_note_unit(&at.user, &at.classroom_id, &name).await?;
            println!("{}", cli::format_note_unit(&unit));
        }
        NotesAction::Units { classroom_id } => {
            let units = content.list_note_units(&classroom_id).await?;
            print_all(units.iter().map(cli::format_note_unit).collect(), "No note units yet.");
        }
        NotesAction::DeleteUnit { at, unit } => {
            content.delete_note_unit(&at.user, &at.classroom_id, &unit).await?;
            println!("Deleted note unit {}", unit);
        }
        NotesAction::AddResource { at, unit, link, text } => {
            let mut resources = Vec::new();
            if let Some(url) = link {
                resources.push(NoteResource::Link { url });
            }
            if let Some(text) = text {
                resources.push(NoteResource::Text { text });
            }
            if resources.is_empty() {
                return Err(ClassroomError::Validation("give --link or --text".to_string()));
            }
            for resource in resources {
                let posted = content
                    .add_note_resource(&at.user, &at.classroom_id, &unit, resource)
                    .await?;
                println!("{}", cli::format_note_resource(&posted));
            }
        }
        NotesAction::Resources { classroom_id, unit } => {
            let resources = content.list_note_resources(&classroom_id, &unit).await?;
            print_all(resources.iter().map(cli::format_note_resource).collect(), "No resources yet.");
        }
        NotesAction::DeleteResource { at, unit, id } => {
            content
                .delete_note_resource(&at.user, &at.classroom_id, &unit, &id)
                .await?;
            println!("Deleted resource {}", id);
        }
    }
    Ok(())
}

async fn run_attendance(content: &ContentService, action: AttendanceAction) -> Result<()> {
    match action {
        AttendanceAction::Create { at, year, month } => {
            let sheet = content
                .create_attendance_sheet(&at.user, &at.classroom_id, year, month)
                .await?;
            println!("{}", cli::format_attendance_sheet(&sheet));
        }
        AttendanceAction::List { classroom_id } => {
            let sheets = content.list_attendance_sheets(&classroom_id).await?;
            print_all(sheets.iter().map(cli::format_attendance_sheet).collect(), "No attendance yet.");
        }
        AttendanceAction::Attach { at, sheet, link } => {
            content
                .attach_attendance_resource(&at.user, &at.classroom_id, &sheet, &link)
                .await?;
            println!("Attached {} to sheet {}", link, sheet);
        }
        AttendanceAction::Delete { at, id } => {
            content.delete_attendance_sheet(&at.user, &at.classroom_id, &id).await?;
            println!("Deleted attendance sheet {}", id);
        }
    }
    Ok(())
}

async fn run_roster(content: &ContentService, action: RosterAction) -> Result<()> {
    match action {
        RosterAction::SetAdmin { at, name } => {
            let admin = content.add_admin(&at.user, &at.classroom_id, &name).await?;
            println!("Admin: {} [{}]", admin.item.name, admin.id);
        }
        RosterAction::AddStudent { at, name, enrollment } => {
            let student = content
                .add_student(&at.user, &at.classroom_id, &name, &enrollment)
                .await?;
            println!("Added {} [{}]", student.item.name, student.id);
        }
        RosterAction::Show { classroom_id } => {
            let roster = content.roster(&classroom_id).await?;
            println!("{}", cli::format_roster(&roster));
        }
        RosterAction::Remove { at, id } => {
            content.remove_member(&at.user, &at.classroom_id, &id).await?;
            println!("Removed member {}", id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args();

    // Initialize logger with appropriate level based on verbose flag
    let log_level = if config.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    match run(config).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_user_facing() => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e);
            Err(e)
        }
    }
}
