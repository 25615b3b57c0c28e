use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use thiserror::Error;

const ARCHIVE_EXTENSION: &str = ".zip";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please select a file to upload")]
    MissingFile,
    #[error("{file_name} is not a ZIP archive")]
    NotAnArchive { file_name: String },
    #[error("{file_name} contains no files")]
    EmptyArchive { file_name: String },
    #[error("email is required")]
    MissingEmail,
    #[error("please enter a valid email address")]
    InvalidEmail,
}

/// A validated upload, ready to be posted to the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    file_name: String,
    archive: Arc<[u8]>,
    email: String,
}

impl Submission {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn archive(&self) -> &[u8] {
        &self.archive
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Checks the upload form fields and builds a [`Submission`].
pub fn validate_submission(
    file_name: &str,
    archive: &[u8],
    email: &str,
) -> Result<Submission, ValidationError> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(ValidationError::MissingFile);
    }
    if !file_name.to_ascii_lowercase().ends_with(ARCHIVE_EXTENSION) {
        return Err(ValidationError::NotAnArchive {
            file_name: file_name.to_string(),
        });
    }
    if archive.is_empty() {
        return Err(ValidationError::EmptyArchive {
            file_name: file_name.to_string(),
        });
    }
    let entries = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|_| ValidationError::NotAnArchive {
            file_name: file_name.to_string(),
        })?
        .len();
    if entries == 0 {
        return Err(ValidationError::EmptyArchive {
            file_name: file_name.to_string(),
        });
    }

    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(Submission {
        file_name: file_name.to_string(),
        archive: Arc::from(archive),
        email: email.to_string(),
    })
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
        .is_match(email)
}
