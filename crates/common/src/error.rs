use thiserror::Error;

/// Common error types used across the application.
///
/// `NotFound` marks structural failures: entities a handler is entitled to
/// assume exist (the innovation, a task being responded to). Expected
/// absences — an unresolvable recipient, a deleted account, a missing
/// preference entry — are never errors; they surface as `None` or as a
/// missing map entry and the one recipient is skipped.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Identity provider error: {0}")]
    Identity(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}
