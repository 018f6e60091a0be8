use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::Request;

/// Failure taxonomy shared by the store, the security layer and the routes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found")]
    NotFound,

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Message safe to show to a site visitor.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "Something went wrong. Please try again.".to_string(),
            AppError::Verification(_) => "Captcha verification failed. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
            rusqlite::Error::SqliteFailure(ref err, ref msg)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                AppError::Conflict(
                    msg.clone()
                        .unwrap_or_else(|| "Record already exists".to_string()),
                )
            }
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        let status = match &self {
            AppError::Validation(_) => Status::BadRequest,
            AppError::InvalidCredentials => Status::Unauthorized,
            AppError::NotFound => Status::NotFound,
            AppError::Verification(_) => Status::Forbidden,
            AppError::Conflict(_) => Status::Conflict,
            AppError::Database(msg) => {
                log::error!("Database error: {}", msg);
                Status::InternalServerError
            }
        };
        Err(status)
    }
}
