use std::path::PathBuf;

/// How the list is projected onto the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Flat,
    GroupedByState,
    GroupedByHeading,
}

impl ViewMode {
    /// The integer stored in the config file
    pub fn as_index(self) -> i64 {
        match self {
            ViewMode::Flat => 0,
            ViewMode::GroupedByState => 1,
            ViewMode::GroupedByHeading => 2,
        }
    }

    pub fn from_index(index: i64) -> Option<ViewMode> {
        match index {
            0 => Some(ViewMode::Flat),
            1 => Some(ViewMode::GroupedByState),
            2 => Some(ViewMode::GroupedByHeading),
            _ => None,
        }
    }

    /// Flat -> GroupedByState -> GroupedByHeading -> Flat
    pub fn next(self) -> ViewMode {
        match self {
            ViewMode::Flat => ViewMode::GroupedByState,
            ViewMode::GroupedByState => ViewMode::GroupedByHeading,
            ViewMode::GroupedByHeading => ViewMode::Flat,
        }
    }

    /// Label shown in the key help line
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Flat => "FLAT VIEW",
            ViewMode::GroupedByState => "STATE VIEW",
            ViewMode::GroupedByHeading => "HEADING VIEW",
        }
    }
}

/// Resolved settings from the config file, with defaults already applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding `tasks.md`
    pub todo_dir: PathBuf,
    /// View mode remembered from the last session
    pub view_mode: ViewMode,
}

impl Settings {
    pub const TASK_FILE_NAME: &'static str = "tasks.md";

    pub fn task_file(&self) -> PathBuf {
        self.todo_dir.join(Self::TASK_FILE_NAME)
    }
}
