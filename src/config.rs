/// Configuration for the classroom client binary.
/// Handles command-line argument parsing and config structure.

use crate::error::{ClassroomError, Result};
use crate::models::Role;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "classroom")]
#[command(about = "Classroom client - create classes, join by code, share class content", long_about = None)]
pub struct Config {
    /// SQLite database file path (default: ~/.classroom/classroom.db)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Keep everything in memory for this run
    #[arg(long, global = true, conflicts_with = "database")]
    pub memory: bool,

    /// Base URL used to build classroom share links
    #[arg(long, global = true, default_value = "http://localhost:5173")]
    pub origin: String,

    /// Enable verbose logging (DEBUG level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a sign-in and print the resolved role
    SignIn {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        email: Option<String>,
        /// Role chosen before signing in (teacher or student)
        #[arg(long = "as")]
        role: Option<Role>,
    },
    /// Create a classroom and print its code and share link
    Create {
        #[arg(long)]
        teacher: String,
        #[command(flatten)]
        details: DetailsArgs,
    },
    /// List classrooms created by a teacher
    Classrooms {
        #[arg(long)]
        teacher: String,
    },
    /// Delete a classroom created by this teacher
    DeleteClassroom {
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        id: String,
    },
    /// Join a classroom by code, optionally checking the share link
    Join {
        #[arg(long)]
        student: String,
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        link: Option<String>,
        /// Invite URL carrying the code (and optionally the link)
        #[arg(long)]
        invite: Option<String>,
    },
    /// List the classrooms a student has joined
    List {
        #[arg(long)]
        student: String,
    },
    /// Leave a joined classroom
    Leave {
        #[arg(long)]
        student: String,
        #[arg(long)]
        code: String,
    },
    /// Classroom notices
    Notice {
        #[command(subcommand)]
        action: NoticeAction,
    },
    /// Useful links shared in a classroom
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },
    /// Assignments with due dates
    Assignment {
        #[command(subcommand)]
        action: AssignmentAction,
    },
    /// Note units and their resources
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },
    /// Monthly attendance sheets
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },
    /// Classroom admin and student roster
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },
}

/// Acting user and target classroom for content writes
#[derive(Args, Debug, Clone)]
pub struct ClassArgs {
    #[arg(long)]
    pub user: String,
    /// Classroom id
    #[arg(long = "class")]
    pub classroom_id: String,
}

#[derive(Subcommand, Debug)]
pub enum NoticeAction {
    Post {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List {
        #[arg(long = "class")]
        classroom_id: String,
    },
    Delete {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum LinkAction {
    Post {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List {
        #[arg(long = "class")]
        classroom_id: String,
    },
    Delete {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AssignmentAction {
    Add {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        title: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        link: Option<String>,
    },
    List {
        #[arg(long = "class")]
        classroom_id: String,
    },
    Delete {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotesAction {
    AddUnit {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        name: String,
    },
    Units {
        #[arg(long = "class")]
        classroom_id: String,
    },
    /// Delete a unit and every resource in it
    DeleteUnit {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        unit: String,
    },
    /// Add a link and/or a text resource to a unit
    AddResource {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
    Resources {
        #[arg(long = "class")]
        classroom_id: String,
        #[arg(long)]
        unit: String,
    },
    DeleteResource {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceAction {
    Create {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        year: i32,
        /// 1-12
        #[arg(long)]
        month: u32,
    },
    List {
        #[arg(long = "class")]
        classroom_id: String,
    },
    /// Link the document holding a month's attendance
    Attach {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        sheet: String,
        #[arg(long)]
        link: String,
    },
    Delete {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RosterAction {
    SetAdmin {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        name: String,
    },
    AddStudent {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        name: String,
        #[arg(long)]
        enrollment: String,
    },
    Show {
        #[arg(long = "class")]
        classroom_id: String,
    },
    Remove {
        #[command(flatten)]
        at: ClassArgs,
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DetailsArgs {
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub professor: String,
    #[arg(long)]
    pub college: String,
    #[arg(long)]
    pub degree: String,
    #[arg(long)]
    pub semester: String,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub enrollment: String,
    /// Classroom and section
    #[arg(long = "classroom")]
    pub classroom_label: String,
    #[arg(long)]
    pub semester: String,
    #[arg(long)]
    pub email: Option<String>,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    /// Validated share-link origin.
    pub fn share_origin(&self) -> Result<Url> {
        let url = Url::parse(self.origin.trim())
            .map_err(|e| ClassroomError::Config(format!("invalid origin {:?}: {}", self.origin, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClassroomError::Config(format!(
                "origin {:?} cannot be used as a base URL",
                self.origin
            )));
        }
        Ok(url)
    }

    /// Database path, defaulting to `~/.classroom/classroom.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| ClassroomError::Config("Failed to get home directory".to_string()))?;
        Ok(base_dirs.home_dir().join(".classroom").join("classroom.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["classroom", "list", "--student", "S1"]);
        assert_eq!(config.origin, "http://localhost:5173");
        assert!(!config.memory);
        assert!(!config.verbose);
        assert!(matches!(config.command, Command::List { ref student } if student == "S1"));
    }

    #[test]
    fn test_custom_database() {
        let config = parse(&["classroom", "--database", "/tmp/custom.db", "list", "--student", "S1"]);
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn test_memory_conflicts_with_database() {
        let result = Config::try_parse_from([
            "classroom", "--memory", "--database", "/tmp/x.db", "list", "--student", "S1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sign_in_role() {
        let config = parse(&["classroom", "sign-in", "--uid", "U1", "--as", "teacher"]);
        match config.command {
            Command::SignIn { uid, role, email } => {
                assert_eq!(uid, "U1");
                assert_eq!(role, Some(Role::Teacher));
                assert_eq!(email, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_join_arguments() {
        let config = parse(&[
            "classroom", "join", "--student", "S1", "--name", "A", "--enrollment", "1",
            "--classroom", "X", "--semester", "5", "--code", "xq7f2k",
        ]);
        match config.command {
            Command::Join { student, profile, code, link, invite } => {
                assert_eq!(student, "S1");
                assert_eq!(profile.classroom_label, "X");
                assert_eq!(profile.semester, "5");
                assert_eq!(code.as_deref(), Some("xq7f2k"));
                assert!(link.is_none() && invite.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_content_subcommands() {
        let config = parse(&[
            "classroom", "notice", "post", "--user", "U1", "--class", "T1", "--title", "Exam",
        ]);
        match config.command {
            Command::Notice {
                action: NoticeAction::Post { at, title, description },
            } => {
                assert_eq!(at.user, "U1");
                assert_eq!(at.classroom_id, "T1");
                assert_eq!(title, "Exam");
                assert_eq!(description, "");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let config = parse(&[
            "classroom", "attendance", "create", "--user", "U1", "--class", "T1", "--year", "2025",
            "--month", "3",
        ]);
        assert!(matches!(
            config.command,
            Command::Attendance {
                action: AttendanceAction::Create { year: 2025, month: 3, .. }
            }
        ));

        let config = parse(&[
            "classroom", "notes", "add-resource", "--user", "U1", "--class", "T1", "--unit", "N1",
            "--text", "Read ch. 2",
        ]);
        match config.command {
            Command::Notes {
                action: NotesAction::AddResource { unit, link, text, .. },
            } => {
                assert_eq!(unit, "N1");
                assert!(link.is_none());
                assert_eq!(text.as_deref(), Some("Read ch. 2"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_share_origin_validation() {
        let mut config = parse(&["classroom", "list", "--student", "S1"]);
        assert_eq!(config.share_origin().unwrap().as_str(), "http://localhost:5173/");

        config.origin = "not a url".to_string();
        assert!(matches!(config.share_origin(), Err(ClassroomError::Config(_))));

        config.origin = "mailto:teacher@example.com".to_string();
        assert!(config.share_origin().is_err());
    }
}
