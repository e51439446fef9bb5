//! CoverImageManager: keeps the target image in sync with the open document.
//!
//! Every lifecycle event (document opened/closed) and every configuration
//! change (toggle, path edit, exclusion) arrives here as a method call.  The
//! manager consults the current [`CoverConfig`], validates the paths it is
//! about to touch, and performs at most one file operation on the target:
//! write a fresh cover, copy the fallback, or delete.
//!
//! # Failure policy
//!
//! Nothing here panics or aborts the host.  Path problems are corrected
//! locally: an untrusted target path disables the feature and surfaces a
//! [`Notice`]; a missing fallback turns into a delete plus a notice.  Plain
//! I/O failures are logged at `debug` and returned as [`CoverError`], leaving
//! a stale or missing image rather than a corrupt one.
//!
//! All methods run synchronously on the caller's thread.

use std::fmt;
use std::path::{Path, PathBuf};

use cover_core::domain::settings::{
    KEY_ENABLED, KEY_EXCLUDE, KEY_FALLBACK_ENABLED, KEY_FALLBACK_PATH, KEY_TARGET_PATH,
};
use cover_core::{
    decide_close, decide_open, is_readable_file, CloseDecision, CoverAction, CoverConfig, Notice,
    OpenDecision, PathError, PathValidator, SettingValue, SettingsStore, StoreError,
};
use thiserror::Error;
use tracing::{debug, info, trace};

use super::cover_image::CoverImage;
use super::target_file::{self, TargetFileError};

/// Error type for cover image operations.
#[derive(Debug, Error)]
pub enum CoverError {
    /// The target path failed validation; the feature has been disabled.
    #[error("invalid target path: {0}")]
    InvalidTarget(#[from] PathError),

    /// The operation needs an open document and there is none.
    #[error("no document is open")]
    NoDocument,

    /// A setting could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing, copying or deleting the target failed.
    #[error(transparent)]
    File(#[from] TargetFileError),
}

/// Produces cover images for documents.
///
/// Returning `None` means "no cover available", which is not an error.
#[cfg_attr(test, mockall::automock)]
pub trait CoverSource {
    fn cover_image(&self, document: &DocumentHandle) -> Option<CoverImage>;
}

/// Delivers warnings to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// An open document: its identity, location, and its own settings store.
pub struct DocumentHandle {
    pub id: String,
    pub path: PathBuf,
    pub settings: Box<dyn SettingsStore>,
}

impl DocumentHandle {
    pub fn new(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            settings,
        }
    }

    /// Whether this document has opted out of cover updates.
    pub fn is_excluded(&self) -> bool {
        self.settings.is_true(KEY_EXCLUDE)
    }
}

impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// State kept for the currently open document.
#[derive(Debug)]
struct DocumentSession {
    document: DocumentHandle,
    excluded: bool,
    cover_available: Option<bool>,
}

/// Point-in-time view of the manager, for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverStatus {
    pub config: CoverConfig,
    /// Id of the open document, if any.
    pub document: Option<String>,
    pub excluded: Option<bool>,
    /// `None` until a cover has been requested for the open document.
    pub cover_available: Option<bool>,
    pub target_exists: bool,
    pub target_problem: Option<PathError>,
    pub fallback_valid: bool,
}

/// The cover image synchronisation use case.
pub struct CoverImageManager {
    config: CoverConfig,
    store: Box<dyn SettingsStore>,
    source: Box<dyn CoverSource>,
    notifier: Box<dyn Notifier>,
    validator: PathValidator,
    session: Option<DocumentSession>,
}

impl CoverImageManager {
    /// Creates a manager, loading the configuration from `store`.
    ///
    /// Construction performs no file operation on the target.
    pub fn new(
        store: Box<dyn SettingsStore>,
        source: Box<dyn CoverSource>,
        notifier: Box<dyn Notifier>,
        validator: PathValidator,
    ) -> Self {
        let config = CoverConfig::load(store.as_ref());
        debug!(?config, "cover image configuration loaded");
        Self {
            config,
            store,
            source,
            notifier,
            validator,
            session: None,
        }
    }

    pub fn config(&self) -> &CoverConfig {
        &self.config
    }

    /// The document currently open, if any.
    pub fn current_document(&self) -> Option<&DocumentHandle> {
        self.session.as_ref().map(|s| &s.document)
    }

    /// Records `document` as open without touching the target file.
    ///
    /// For hosts that start while a document is already open.
    pub fn attach_document(&mut self, document: DocumentHandle) {
        self.session = Some(DocumentSession {
            excluded: document.is_excluded(),
            document,
            cover_available: None,
        });
    }

    /// A document was opened: write its cover unless disabled or excluded.
    ///
    /// A document without a cover leaves the existing target untouched.
    ///
    /// # Errors
    ///
    /// [`CoverError::InvalidTarget`] when the target path no longer
    /// validates (the feature is disabled as a side effect), or
    /// [`CoverError::File`] when writing fails.
    pub fn on_document_opened(&mut self, document: DocumentHandle) -> Result<CoverAction, CoverError> {
        debug!(document = %document.id, "document opened");
        self.attach_document(document);
        self.refresh_cover()
    }

    /// The open document was closed: apply the fallback policy to the
    /// target, then forget the session.
    ///
    /// # Errors
    ///
    /// [`CoverError::File`] when the delete or copy fails.
    pub fn on_document_closed(&mut self) -> Result<CoverAction, CoverError> {
        if let Some(session) = self.session.take() {
            debug!(document = %session.document.id, "document closed");
        }
        let target = self.config.target_path.clone();
        self.clean_up(&target)
    }

    /// Changes the target path.
    ///
    /// The old target is cleaned up first (as on close), then the new path is
    /// persisted and validated.  A valid path gets the open document's cover;
    /// an invalid one disables the feature.
    ///
    /// # Errors
    ///
    /// [`CoverError::InvalidTarget`] carrying the validator's reason.
    pub fn set_target_path(&mut self, new_path: &str) -> Result<CoverAction, CoverError> {
        if new_path == self.config.target_path {
            return Ok(CoverAction::Unchanged);
        }

        let old_path = std::mem::replace(&mut self.config.target_path, new_path.to_string());
        if let Err(err) = self.clean_up(&old_path) {
            debug!(error = %err, old_path = %old_path, "cleanup of previous target failed");
        }
        self.persist(KEY_TARGET_PATH, new_path.into())?;
        info!(path = new_path, "cover image path changed");

        match self.validator.validate(new_path) {
            Ok(()) => self.refresh_cover(),
            Err(err) => Err(self.disable_for_invalid_target(err)),
        }
    }

    /// Changes the fallback image path.
    ///
    /// Warns when a non-empty path is not a readable file but never touches
    /// the target.
    ///
    /// # Errors
    ///
    /// [`CoverError::Store`] if the new path cannot be persisted.
    pub fn set_fallback_path(&mut self, new_path: &str) -> Result<(), CoverError> {
        self.config.fallback_path = new_path.to_string();
        self.persist(KEY_FALLBACK_PATH, new_path.into())?;
        if !new_path.is_empty() && !is_readable_file(new_path) {
            self.notifier.notify(&Notice::InvalidFallback {
                path: new_path.to_string(),
            });
        }
        Ok(())
    }

    /// Flips the master switch and brings the target in line with it.
    ///
    /// # Errors
    ///
    /// As for [`on_document_opened`](Self::on_document_opened) when switching
    /// on and [`on_document_closed`](Self::on_document_closed) when switching
    /// off.
    pub fn toggle_enabled(&mut self) -> Result<CoverAction, CoverError> {
        self.config.enabled = !self.config.enabled;
        self.persist(KEY_ENABLED, self.config.enabled.into())?;
        info!(enabled = self.config.enabled, "cover image toggled");

        if self.config.enabled {
            self.refresh_cover()
        } else {
            let target = self.config.target_path.clone();
            self.clean_up(&target)
        }
    }

    /// Flips fallback mode.  With a document open the cover is refreshed;
    /// with none the close-time policy is applied at once.
    ///
    /// # Errors
    ///
    /// As for the lifecycle operation that is re-run.
    pub fn toggle_fallback(&mut self) -> Result<CoverAction, CoverError> {
        self.config.fallback_enabled = !self.config.fallback_enabled;
        self.persist(KEY_FALLBACK_ENABLED, self.config.fallback_enabled.into())?;
        info!(fallback = self.config.fallback_enabled, "cover image fallback toggled");

        if self.session.is_some() {
            self.refresh_cover()
        } else {
            let target = self.config.target_path.clone();
            self.clean_up(&target)
        }
    }

    /// Flips the open document's exclusion flag, persisting it in the
    /// document's settings.  Excluding runs the close-time policy; including
    /// writes the cover.
    ///
    /// # Errors
    ///
    /// [`CoverError::NoDocument`] when nothing is open, otherwise as for the
    /// lifecycle operation that is re-run.
    pub fn toggle_exclusion(&mut self) -> Result<CoverAction, CoverError> {
        let session = self.session.as_mut().ok_or(CoverError::NoDocument)?;
        session.excluded = !session.excluded;
        let excluded = session.excluded;
        session
            .document
            .settings
            .save_setting(KEY_EXCLUDE, excluded.into())?;
        info!(document = %session.document.id, excluded, "cover image exclusion toggled");

        if excluded {
            let target = self.config.target_path.clone();
            self.clean_up(&target)
        } else {
            self.refresh_cover()
        }
    }

    /// Returns a snapshot of configuration, session and target state.
    pub fn status(&self) -> CoverStatus {
        let target = Path::new(&self.config.target_path);
        CoverStatus {
            config: self.config.clone(),
            document: self.session.as_ref().map(|s| s.document.id.clone()),
            excluded: self.session.as_ref().map(|s| s.excluded),
            cover_available: self.session.as_ref().and_then(|s| s.cover_available),
            target_exists: target.is_file(),
            target_problem: self.validator.validate(target).err(),
            fallback_valid: is_readable_file(&self.config.fallback_path),
        }
    }

    /// Open-time behaviour for the current session.
    fn refresh_cover(&mut self) -> Result<CoverAction, CoverError> {
        let Some(session) = self.session.as_ref() else {
            trace!("no document open; nothing to render");
            return Ok(CoverAction::Unchanged);
        };

        match decide_open(self.config.enabled, session.excluded) {
            OpenDecision::Disabled => return Ok(CoverAction::Unchanged),
            OpenDecision::Excluded => {
                debug!(document = %session.document.id, "document excluded from cover image");
                return Ok(CoverAction::Unchanged);
            }
            OpenDecision::Render => {}
        }

        if let Err(err) = self.validator.validate(&self.config.target_path) {
            return Err(self.disable_for_invalid_target(err));
        }

        let cover = self
            .session
            .as_ref()
            .and_then(|s| self.source.cover_image(&s.document));
        if let Some(session) = self.session.as_mut() {
            session.cover_available = Some(cover.is_some());
        }
        let Some(cover) = cover else {
            debug!("no cover available; keeping current target");
            return Ok(CoverAction::Unchanged);
        };

        let target = Path::new(&self.config.target_path);
        target_file::write_cover(&cover, target).map_err(|err| {
            debug!(error = %err, "writing cover image failed");
            err
        })?;
        trace!(path = %target.display(), "cover image written");
        Ok(CoverAction::WroteCover)
    }

    /// Close-time behaviour against `target`.
    fn clean_up(&mut self, target: &str) -> Result<CoverAction, CoverError> {
        let fallback = self.config.fallback_path.clone();
        let decision = decide_close(
            self.config.enabled,
            self.config.fallback_enabled,
            &fallback,
            is_readable_file(&fallback),
        );

        match decision {
            CloseDecision::Keep => Ok(CoverAction::Unchanged),
            CloseDecision::Remove { warn_invalid } => {
                if warn_invalid {
                    self.notifier.notify(&Notice::InvalidFallback { path: fallback });
                }
                target_file::remove(Path::new(target)).map_err(|err| {
                    debug!(error = %err, "removing cover image failed");
                    err
                })?;
                trace!(path = target, "cover image removed");
                Ok(CoverAction::Removed)
            }
            CloseDecision::CopyFallback => {
                if let Err(err) = self.validator.validate(target) {
                    debug!(error = %err, "target no longer valid; fallback not copied");
                    return Ok(CoverAction::Unchanged);
                }
                target_file::copy_into_place(Path::new(&fallback), Path::new(target)).map_err(
                    |err| {
                        debug!(error = %err, "copying fallback image failed");
                        err
                    },
                )?;
                trace!(path = target, fallback = %fallback, "fallback image copied");
                Ok(CoverAction::CopiedFallback)
            }
        }
    }

    /// Forces the feature off after `err` and tells the user why.
    fn disable_for_invalid_target(&mut self, err: PathError) -> CoverError {
        self.config.enabled = false;
        if let Err(store_err) = self.persist(KEY_ENABLED, false.into()) {
            debug!(error = %store_err, "could not persist disabled state");
        }
        info!(reason = err.reason(), "cover image disabled: invalid target path");
        self.notifier.notify(&Notice::InvalidTarget(err.clone()));
        CoverError::InvalidTarget(err)
    }

    fn persist(&mut self, key: &str, value: SettingValue) -> Result<(), CoverError> {
        self.store.save_setting(key, value).map_err(|err| {
            debug!(error = %err, key, "persisting setting failed");
            CoverError::Store(err)
        })
    }
}
