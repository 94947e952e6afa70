/// Desktop implementations of the platform seams
///
/// - Permissions: an in-process ledger, asking through native yes/no dialogs
/// - Rationale: a native OK/Cancel dialog
/// - Camera: an external capture command (fswebcam by default)
/// - Gallery: the native file picker, checked to actually be an image

use async_trait::async_trait;
use log::{debug, info, warn};
use rfd::{
    AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel,
};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::process::Command;

use super::platform::{
    CameraDevice, ContentFilter, ContentPicker, PermissionSystem, Platform, RationalePrompt,
};
use super::{CapabilityKind, Permission, PermissionStatus};
use crate::config::{AppConfig, OUTPUT_PLACEHOLDER};
use crate::error::CapabilityError;
use crate::state::data::MediaRef;

/// Build the desktop platform from the configuration
pub fn platform(config: &AppConfig) -> Platform {
    Platform {
        permissions: Arc::new(DesktopPermissions::new(
            &config.granted_permissions,
            config.location.approximate_only,
        )),
        rationale: Arc::new(DialogRationale),
        camera: Arc::new(CommandCamera::new(config.camera_command.clone())),
        picker: Arc::new(FilePicker::new("Select a photo")),
    }
}

/// Permission ledger for platforms without runtime permissions.
/// A permission that was once denied asks for a rationale before the next prompt.
pub struct DesktopPermissions {
    ledger: Mutex<HashMap<Permission, PermissionStatus>>,
    approximate_only: bool,
}

impl DesktopPermissions {
    pub fn new(granted: &[Permission], approximate_only: bool) -> Self {
        let ledger = granted
            .iter()
            .filter(|p| !(approximate_only && **p == Permission::FineLocation))
            .map(|p| (*p, PermissionStatus::Granted))
            .collect();
        Self {
            ledger: Mutex::new(ledger),
            approximate_only,
        }
    }

    /// Record the user's single answer for a set of permissions
    fn apply_answer(&self, permissions: &[Permission], allowed: bool) -> HashMap<Permission, bool> {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);

        permissions
            .iter()
            .map(|p| {
                let grant =
                    allowed && !(self.approximate_only && *p == Permission::FineLocation);
                let status = if grant {
                    PermissionStatus::Granted
                } else {
                    PermissionStatus::Denied
                };
                ledger.insert(*p, status);
                (*p, grant)
            })
            .collect()
    }
}

fn describe(permissions: &[Permission]) -> &'static str {
    if permissions.contains(&Permission::Camera) {
        "the camera"
    } else {
        "your location"
    }
}

#[async_trait]
impl PermissionSystem for DesktopPermissions {
    fn status(&self, permission: Permission) -> PermissionStatus {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&permission)
            .copied()
            .unwrap_or(PermissionStatus::NotDetermined)
    }

    fn should_show_rationale(&self, permission: Permission) -> bool {
        self.status(permission) == PermissionStatus::Denied
    }

    async fn request(&self, permissions: &[Permission]) -> HashMap<Permission, bool> {
        let answer = AsyncMessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title("Allow access?")
            .set_description(format!("Allow Photo Gallery to use {}?", describe(permissions)))
            .set_buttons(MessageButtons::YesNo)
            .show()
            .await;
        let allowed = matches!(answer, MessageDialogResult::Yes);

        debug!("Permission prompt for {:?}: allowed = {}", permissions, allowed);
        self.apply_answer(permissions, allowed)
    }
}

/// Rationale shown as a native dialog; OK means "Accept"
pub struct DialogRationale;

#[async_trait]
impl RationalePrompt for DialogRationale {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        let answer = AsyncMessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::OkCancel)
            .show()
            .await;
        matches!(answer, MessageDialogResult::Ok)
    }
}

/// Captures by running an external program that writes one image file
pub struct CommandCamera {
    command: Vec<String>,
}

impl CommandCamera {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl CameraDevice for CommandCamera {
    async fn capture(&self, destination: &Path) -> Result<(), CapabilityError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| CapabilityError::Platform("no camera command configured".to_string()))?;

        let output = destination.to_string_lossy();
        let args: Vec<String> = args
            .iter()
            .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output))
            .collect();

        info!("📷 Running {} {}", program, args.join(" "));
        let status = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| CapabilityError::Platform(format!("cannot run {}: {}", program, e)))?;

        if !status.success() {
            debug!("Camera command exited with {}", status);
            return Err(CapabilityError::Cancelled(CapabilityKind::Camera));
        }

        // The destination was reserved empty; an empty file means nothing was taken
        let written = std::fs::metadata(destination)
            .map(|meta| meta.len())
            .unwrap_or(0);
        if written == 0 {
            debug!("Camera command wrote nothing to {}", destination.display());
            return Err(CapabilityError::Cancelled(CapabilityKind::Camera));
        }

        Ok(())
    }
}

/// Native file picker
pub struct FilePicker {
    title: String,
}

impl FilePicker {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl ContentPicker for FilePicker {
    async fn pick(&self, filter: &ContentFilter) -> Option<MediaRef> {
        let handle = AsyncFileDialog::new()
            .set_title(self.title.as_str())
            .add_filter(filter.label.as_str(), filter.extensions.as_slice())
            .pick_file()
            .await?;

        readable_image(handle.path(), filter)
    }
}

/// Accept a picked file only if it matches the filter and decodes as an image
fn readable_image(path: &Path, filter: &ContentFilter) -> Option<MediaRef> {
    if !filter.matches(path) {
        warn!("⚠️  {} does not match {}", path.display(), filter.mime);
        return None;
    }

    match image::image_dimensions(path) {
        Ok((width, height)) => {
            debug!("Picked {} ({}x{})", path.display(), width, height);
            Some(MediaRef::from_path(path))
        }
        Err(err) => {
            warn!("⚠️  {} is not a readable image: {}", path.display(), err);
            None
        }
    }
}
