use std::io::{Cursor, Write};

use scribe_core::{validate_submission, ValidationError};

fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn accepts_archive_and_trims_email() {
    let archive = zip_with(&[("todo-app/main.py", "print('hi')\n")]);
    let submission = validate_submission("Code.ZIP", &archive, "  dev@example.com ").unwrap();

    assert_eq!(submission.file_name(), "Code.ZIP");
    assert_eq!(submission.email(), "dev@example.com");
    assert_eq!(submission.archive(), archive.as_slice());
}

#[test]
fn rejects_missing_or_non_zip_file() {
    let archive = zip_with(&[("a.py", "")]);
    assert_eq!(
        validate_submission("", &archive, "a@b.com"),
        Err(ValidationError::MissingFile)
    );
    assert_eq!(
        validate_submission("code.tar.gz", &archive, "a@b.com"),
        Err(ValidationError::NotAnArchive {
            file_name: "code.tar.gz".to_string()
        })
    );
    assert_eq!(
        validate_submission("code.zip", b"definitely not a zip", "a@b.com"),
        Err(ValidationError::NotAnArchive {
            file_name: "code.zip".to_string()
        })
    );
}

#[test]
fn rejects_empty_archives() {
    assert_eq!(
        validate_submission("code.zip", &[], "a@b.com"),
        Err(ValidationError::EmptyArchive {
            file_name: "code.zip".to_string()
        })
    );
    let no_entries = zip_with(&[]);
    assert_eq!(
        validate_submission("code.zip", &no_entries, "a@b.com"),
        Err(ValidationError::EmptyArchive {
            file_name: "code.zip".to_string()
        })
    );
}

#[test]
fn rejects_missing_or_malformed_email() {
    let archive = zip_with(&[("a.py", "x = 1\n")]);
    assert_eq!(
        validate_submission("code.zip", &archive, "   "),
        Err(ValidationError::MissingEmail)
    );
    assert_eq!(
        validate_submission("code.zip", &archive, "not-an-email"),
        Err(ValidationError::InvalidEmail)
    );
    assert_eq!(
        validate_submission("code.zip", &archive, "a@b"),
        Err(ValidationError::InvalidEmail)
    );
}
