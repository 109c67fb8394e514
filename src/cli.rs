use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "timetable-indexer",
    version,
    about = "Build per-student class and exam schedules from timetable and datesheet documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the schedule index for every student in the timetable.
    Index(IndexArgs),
    /// Parse one student straight from the documents.
    Student(StudentArgs),
    /// Print one student's schedule from a built index.
    Lookup(LookupArgs),
    Status(StatusArgs),
    /// Move an index's class times from one slot profile to another.
    Retime(RetimeArgs),
}

/// Documents, reference tables and extraction knobs shared by `index` and `student`.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(long)]
    pub timetable: PathBuf,

    /// Tabula JSON with the timetable's table regions (default: `<timetable>.tables.json`).
    #[arg(long)]
    pub timetable_tables: Option<PathBuf>,

    #[arg(long)]
    pub datesheet: Option<PathBuf>,

    #[arg(long)]
    pub datesheet_tables: Option<PathBuf>,

    #[arg(long)]
    pub metadata: Option<PathBuf>,

    #[arg(long)]
    pub faculty: Option<PathBuf>,

    /// `{code: name}` map or a previously built index whose exam subjects are mined.
    #[arg(long)]
    pub course_map: Option<PathBuf>,

    #[arg(long)]
    pub fixups: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,

    #[arg(long, value_enum, default_value_t = SlotProfile::Regular)]
    pub slot_profile: SlotProfile,

    /// Explicit comma-separated `start-end` slots; overrides `--slot-profile`.
    #[arg(long)]
    pub slots: Option<String>,

    #[arg(long, default_value_t = 0.85)]
    pub similarity_threshold: f64,

    /// Also copy exam teacher text into the exam `room` field.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub legacy_exam_room: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    Auto,
    Table,
    Layout,
}

impl ModeArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Table => "table",
            Self::Layout => "layout",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SlotProfile {
    Regular,
    Ramadan,
}

impl SlotProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Ramadan => "ramadan",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value = "schedules_index.json")]
    pub output: PathBuf,

    /// Run manifest location (default: next to the index as `<output>.run.json`).
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StudentArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub roll: String,

    /// Write the schedule here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[arg(long, default_value = "schedules_index.json")]
    pub index: PathBuf,

    #[arg(long)]
    pub roll: String,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "schedules_index.json")]
    pub index: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RetimeArgs {
    #[arg(long, default_value = "schedules_index.json")]
    pub index: PathBuf,

    /// Defaults to rewriting the index in place.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = SlotProfile::Regular)]
    pub from: SlotProfile,

    #[arg(long, value_enum, default_value_t = SlotProfile::Ramadan)]
    pub to: SlotProfile,
}
