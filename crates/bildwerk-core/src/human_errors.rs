// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for end users.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::BildwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retrying may help (busy disk, transient I/O).
    Transient,
    /// User must do something (fix a path, add an image).
    ActionRequired,
    /// Retrying won't help — damaged file, bad configuration.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether trying again unchanged could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `BildwerkError` into a `HumanError`.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    match err {
        BildwerkError::ImageLoad { path, .. } => HumanError {
            message: format!("The image {path} couldn't be opened."),
            suggestion: "The file may be missing, damaged, or in an unusual format. Try saving it as a PNG or JPEG, or remove it from the document.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BildwerkError::EmptyDocument => HumanError {
            message: "There's nothing to export yet.".into(),
            suggestion: "Add at least one image, then export again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BildwerkError::ImageEncode(_) => HumanError {
            message: "The preview image couldn't be saved.".into(),
            suggestion: "Try again with a different output file name ending in .png.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BildwerkError::Pdf(_) => HumanError {
            message: "There's a problem with a PDF file.".into(),
            suggestion: "The file may be damaged or not a PDF at all. Try opening it in a PDF viewer first to check it works.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BildwerkError::Config(detail) => HumanError {
            message: "The settings file has an invalid value.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        BildwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Bildwerk doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or choose a different location.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        BildwerkError::Serialization(_) => HumanError {
            message: "The project file couldn't be read.".into(),
            suggestion: "Check that the file is valid JSON in the Bildwerk project format.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_load_names_the_file() {
        let err = BildwerkError::ImageLoad {
            path: "holiday/beach.jpg".into(),
            reason: "unexpected end of file".into(),
        };
        let human = humanize_error(&err);
        assert!(human.message.contains("holiday/beach.jpg"));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn empty_document_is_action_required() {
        let human = humanize_error(&BildwerkError::EmptyDocument);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = BildwerkError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);

        let err = BildwerkError::Io(std::io::Error::other("disk full"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn broken_pdf_is_permanent() {
        let human = humanize_error(&BildwerkError::Pdf("no trailer".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
