use thiserror::Error;

/// Malformed input rejected before any aggregation runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("negative {field} on {id}")]
    NegativeRate { field: &'static str, id: String },

    #[error("negative hours on time entry {id}")]
    NegativeHours { id: String },

    #[error("negative amount on project cost {id}")]
    NegativeAmount { id: String },

    #[error("time entry {id} has hours but no clock out")]
    HoursWithoutClockOut { id: String },

    #[error("time entry {id} is clocked out but has no hours")]
    ClockOutWithoutHours { id: String },

    #[error("time entry {id} clocks out before it clocks in")]
    ClockOutBeforeClockIn { id: String },

    #[error("user {user_id} has more than one active membership on project {project_id}")]
    DuplicateActiveEmployee { project_id: String, user_id: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("home directory not found")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
