/// Capability coordinator
///
/// Runs one request per capability kind through the permission state
/// machine and resolves it with exactly one outcome:
///
/// ```text
/// Idle → PermissionCheck ─┬─ granted ───────────────────────────→ Launching → Idle
///                         ├─ rationale → ShowingRationale ─┐
///                         └────────────────────────────────┴→ RequestingPermission
/// ```
///
/// Each public request is an `async fn` returning a `Result`, so the caller
/// gets its answer once and only once. Errors mean "nothing happened" and are
/// never shown to the user.

use chrono::Utc;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::platform::{ContentFilter, Platform, RationaleText};
use super::{CapabilityKind, FlowState, LocationGrant, Permission, PermissionStatus};
use crate::error::CapabilityError;
use crate::state::data::MediaRef;

/// How many name variants to try before giving up on a capture file
const MAX_CAPTURE_NAME_ATTEMPTS: u32 = 100;

/// Permissions asked together by the location flow. The first one decides
/// whether a rationale is shown.
const LOCATION_PERMISSIONS: [Permission; 2] = [Permission::FineLocation, Permission::CoarseLocation];

pub struct Coordinator {
    platform: Platform,
    /// Where camera captures are written
    capture_dir: PathBuf,
    /// Content-type filter for the gallery picker
    filter: ContentFilter,
    rationale: RationaleText,
    states: Mutex<HashMap<CapabilityKind, FlowState>>,
}

impl Coordinator {
    pub fn new(
        platform: Platform,
        capture_dir: PathBuf,
        filter: ContentFilter,
        rationale: RationaleText,
    ) -> Self {
        Self {
            platform,
            capture_dir,
            filter,
            rationale,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of the flow for a capability kind
    pub fn state(&self, kind: CapabilityKind) -> FlowState {
        self.lock_states().get(&kind).copied().unwrap_or_default()
    }

    /// Whether a new request of this kind would be accepted
    pub fn is_idle(&self, kind: CapabilityKind) -> bool {
        self.state(kind) == FlowState::Idle
    }

    /// Fine or coarse location already granted
    pub fn has_location_permission(&self) -> bool {
        LOCATION_PERMISSIONS
            .iter()
            .any(|p| self.platform.permissions.status(*p) == PermissionStatus::Granted)
    }

    /// Camera flow: permission, then capture into a freshly allocated file
    pub async fn request_capture(&self) -> Result<MediaRef, CapabilityError> {
        let flow = self.begin(CapabilityKind::Camera, FlowState::PermissionCheck)?;
        self.ensure_permission(&flow, &[Permission::Camera], &self.rationale.camera)
            .await?;

        flow.advance(FlowState::Launching);
        let destination = self.allocate_destination()?;

        match self.platform.camera.capture(&destination).await {
            Ok(()) => {
                info!("📷 Captured photo into {}", destination.display());
                Ok(MediaRef::from_path(destination))
            }
            Err(err) => {
                // Nothing references the reserved file once the capture failed
                if let Err(io_err) = std::fs::remove_file(&destination) {
                    debug!(
                        "Could not remove unused capture file {}: {}",
                        destination.display(),
                        io_err
                    );
                }
                debug!("Camera flow ended without a photo: {}", err);
                Err(err)
            }
        }
    }

    /// Gallery flow: no runtime permission, straight to the picker
    pub async fn request_selection(&self) -> Result<MediaRef, CapabilityError> {
        let _flow = self.begin(CapabilityKind::Gallery, FlowState::Launching)?;

        match self.platform.picker.pick(&self.filter).await {
            Some(media) => {
                info!("🖼️  Selected {}", media);
                Ok(media)
            }
            None => {
                debug!("Gallery picker closed without a selection");
                Err(CapabilityError::Cancelled(CapabilityKind::Gallery))
            }
        }
    }

    /// Location flow: either coarse or fine is enough
    pub async fn request_location_access(&self) -> Result<LocationGrant, CapabilityError> {
        let flow = self.begin(CapabilityKind::LocationPermission, FlowState::PermissionCheck)?;
        let granted = self
            .ensure_permission(&flow, &LOCATION_PERMISSIONS, &self.rationale.location)
            .await?;

        let grant = if granted.contains(&Permission::FineLocation) {
            LocationGrant::Fine
        } else {
            LocationGrant::Coarse
        };
        info!("📍 Location access granted ({:?})", grant);
        Ok(grant)
    }

    /// Permission check, optional rationale, then the platform prompt.
    /// Succeeds with the granted subset when at least one permission is granted.
    async fn ensure_permission(
        &self,
        flow: &FlowGuard<'_>,
        permissions: &[Permission],
        rationale: &str,
    ) -> Result<Vec<Permission>, CapabilityError> {
        let system = &self.platform.permissions;

        let already: Vec<Permission> = permissions
            .iter()
            .copied()
            .filter(|p| system.status(*p) == PermissionStatus::Granted)
            .collect();
        if !already.is_empty() {
            debug!("{} permission already granted", flow.kind);
            return Ok(already);
        }

        if permissions
            .first()
            .is_some_and(|p| system.should_show_rationale(*p))
        {
            flow.advance(FlowState::ShowingRationale);
            if !self
                .platform
                .rationale
                .confirm(&self.rationale.title, rationale)
                .await
            {
                return Err(CapabilityError::RationaleDismissed(flow.kind));
            }
        }

        flow.advance(FlowState::RequestingPermission);
        let answers = system.request(permissions).await;
        let granted: Vec<Permission> = permissions
            .iter()
            .copied()
            .filter(|p| answers.get(p).copied().unwrap_or(false))
            .collect();

        if granted.is_empty() {
            info!("{} permission denied", flow.kind);
            Err(CapabilityError::PermissionDenied(flow.kind))
        } else {
            Ok(granted)
        }
    }

    /// Reserve a new, empty capture file in the capture directory
    fn allocate_destination(&self) -> Result<PathBuf, CapabilityError> {
        std::fs::create_dir_all(&self.capture_dir).map_err(|e| {
            CapabilityError::Platform(format!(
                "cannot create capture directory {}: {}",
                self.capture_dir.display(),
                e
            ))
        })?;

        let stamp = Utc::now().timestamp_millis();
        for attempt in 0..MAX_CAPTURE_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("JPEG_{}_.jpg", stamp)
            } else {
                format!("JPEG_{}_{}.jpg", stamp, attempt)
            };
            let path = self.capture_dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(path),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(CapabilityError::Platform(format!(
                        "cannot create capture file {}: {}",
                        path.display(),
                        err
                    )))
                }
            }
        }

        Err(CapabilityError::Platform(format!(
            "no free capture file name in {}",
            self.capture_dir.display()
        )))
    }

    /// Move a kind out of Idle, or refuse if it is already busy
    fn begin(
        &self,
        kind: CapabilityKind,
        first: FlowState,
    ) -> Result<FlowGuard<'_>, CapabilityError> {
        let mut states = self.lock_states();
        let state = states.entry(kind).or_default();
        if *state != FlowState::Idle {
            debug!("Rejected {} request while in {:?}", kind, state);
            return Err(CapabilityError::Busy(kind));
        }
        *state = first;
        debug!("{} flow: Idle → {:?}", kind, first);

        Ok(FlowGuard {
            coordinator: self,
            kind,
        })
    }

    fn lock_states(&self) -> MutexGuard<'_, HashMap<CapabilityKind, FlowState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("capture_dir", &self.capture_dir)
            .field("filter", &self.filter.mime)
            .finish()
    }
}

/// Marks one in-flight request. Dropping it, on any exit path, puts the
/// kind back to Idle.
struct FlowGuard<'a> {
    coordinator: &'a Coordinator,
    kind: CapabilityKind,
}

impl FlowGuard<'_> {
    fn advance(&self, next: FlowState) {
        let mut states = self.coordinator.lock_states();
        let state = states.entry(self.kind).or_default();
        debug!("{} flow: {:?} → {:?}", self.kind, state, next);
        *state = next;
    }
}

impl Drop for FlowGuard<'_> {
    fn drop(&mut self) {
        self.advance(FlowState::Idle);
    }
}
