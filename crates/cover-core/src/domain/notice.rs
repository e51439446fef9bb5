//! User-facing warnings.
//!
//! The host UI renders [`Notice::message`] verbatim and dismisses it after
//! [`Notice::timeout`] when one is given.

use std::fmt;
use std::time::Duration;

use crate::domain::path::PathError;

/// How long an invalid-fallback warning stays on screen.
pub const FALLBACK_NOTICE_TIMEOUT: Duration = Duration::from_secs(10);

/// A warning for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The configured fallback image is not a readable file.
    InvalidFallback { path: String },
    /// The configured target path failed validation; updates were disabled.
    InvalidTarget(PathError),
}

impl Notice {
    /// The literal message text.
    pub fn message(&self) -> String {
        match self {
            Notice::InvalidFallback { path } => format!(
                "\"{path}\"\nis not a valid image file!\n\
                 A valid fallback image is required in Cover image."
            ),
            Notice::InvalidTarget(err) => {
                let path = err.path().display();
                match err {
                    PathError::NotWritable { .. } => {
                        format!("\"{path}\"\nis not in a writable location.\nCover image has been disabled.")
                    }
                    PathError::ParentMissing { .. } => {
                        format!("\"{path}\"\ndoes not exist.\nCover image has been disabled.")
                    }
                    PathError::MissingFilename { .. } => {
                        format!("\"{path}\"\nis missing a filename.\nCover image has been disabled.")
                    }
                    PathError::IsDirectory { .. } => format!(
                        "\"{path}\"\npoints to a directory, not a file.\nCover image has been disabled."
                    ),
                }
            }
        }
    }

    /// `Some` when the notice dismisses itself, `None` when it must be
    /// acknowledged.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Notice::InvalidFallback { .. } => Some(FALLBACK_NOTICE_TIMEOUT),
            Notice::InvalidTarget(_) => None,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_invalid_fallback_message_names_path_and_times_out() {
        let notice = Notice::InvalidFallback { path: "/sdcard/fb.png".to_string() };

        assert!(notice.message().starts_with("\"/sdcard/fb.png\"\nis not a valid image file!"));
        assert_eq!(notice.timeout(), Some(FALLBACK_NOTICE_TIMEOUT));
    }

    #[test]
    fn test_invalid_target_messages_cover_all_reasons() {
        let path = PathBuf::from("/ro/cover.png");
        let cases = [
            (PathError::NotWritable { path: path.clone() }, "is not in a writable location."),
            (PathError::ParentMissing { path: path.clone() }, "does not exist."),
            (PathError::MissingFilename { path: path.clone() }, "is missing a filename."),
            (PathError::IsDirectory { path: path.clone() }, "points to a directory, not a file."),
        ];

        for (err, expected) in cases {
            let notice = Notice::InvalidTarget(err);
            let text = notice.message();
            assert!(text.contains("\"/ro/cover.png\""), "missing path in {text:?}");
            assert!(text.contains(expected), "expected {expected:?} in {text:?}");
            assert_eq!(notice.timeout(), None);
        }
    }

    #[test]
    fn test_display_matches_message() {
        let notice = Notice::InvalidFallback { path: "x.png".to_string() };
        assert_eq!(notice.to_string(), notice.message());
    }
}
