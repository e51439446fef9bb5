//! What a lifecycle event should do to the target file.
//!
//! Conceptually the target file is a small state machine:
//!
//! ```text
//! open(doc, cover found)                  ──► HoldsCover(doc)
//! open(doc, excluded | no cover)          ──► unchanged
//! close(fallback on, valid fallback)      ──► HoldsFallback
//! close(fallback on, no/invalid fallback) ──► Empty
//! close(fallback on, feature off)         ──► Empty
//! close(fallback off)                     ──► unchanged
//! ```
//!
//! The initial state is whatever the file system holds from a previous run.
//! The functions here only decide; the caller performs the file operation.

/// Decision for a document open (or the equivalent re-run after a toggle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDecision {
    /// The feature is switched off.
    Disabled,
    /// The document has opted out of cover updates.
    Excluded,
    /// Ask the image source for a cover and write it if one is produced.
    Render,
}

/// Decision for a document close (or the equivalent cleanup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Fallback mode is off; the last written cover stays in place.
    Keep,
    /// Delete the target.  `warn_invalid` is set when a non-empty fallback
    /// path was configured but does not name a readable file.
    Remove { warn_invalid: bool },
    /// Copy the fallback image over the target.
    CopyFallback,
}

/// What actually happened to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverAction {
    /// The target file was left as it was.
    Unchanged,
    /// A freshly rendered cover was written.
    WroteCover,
    /// The fallback image was copied over the target.
    CopiedFallback,
    /// The target file was deleted (or was already absent).
    Removed,
}

/// Decides what a document open should do.
pub fn decide_open(enabled: bool, excluded: bool) -> OpenDecision {
    if !enabled {
        OpenDecision::Disabled
    } else if excluded {
        OpenDecision::Excluded
    } else {
        OpenDecision::Render
    }
}

/// Decides what a document close should do.
///
/// Exclusion of the closing document is not an input: when fallback mode is
/// on it applies on every close.  While the feature is switched off nothing
/// is ever copied, so a valid fallback degrades to a plain delete.
pub fn decide_close(
    enabled: bool,
    fallback_enabled: bool,
    fallback_path: &str,
    fallback_valid: bool,
) -> CloseDecision {
    if !fallback_enabled {
        CloseDecision::Keep
    } else if fallback_path.is_empty() {
        CloseDecision::Remove { warn_invalid: false }
    } else if !fallback_valid {
        CloseDecision::Remove { warn_invalid: true }
    } else if !enabled {
        CloseDecision::Remove { warn_invalid: false }
    } else {
        CloseDecision::CopyFallback
    }
}
