//! Scripted platform surfaces for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::oneshot;

use super::platform::{
    CameraDevice, ContentFilter, ContentPicker, PermissionSystem, Platform, RationalePrompt,
    RationaleText,
};
use super::{CapabilityKind, Coordinator, Permission, PermissionStatus};
use crate::error::CapabilityError;
use crate::state::data::MediaRef;

#[derive(Default)]
pub(crate) struct FakePermissions {
    pub(crate) statuses: Mutex<HashMap<Permission, PermissionStatus>>,
    pub(crate) rationale: Vec<Permission>,
    pub(crate) answers: HashMap<Permission, bool>,
    pub(crate) requests: Mutex<Vec<Vec<Permission>>>,
}

impl FakePermissions {
    pub(crate) fn granted(self, permission: Permission) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(permission, PermissionStatus::Granted);
        self
    }

    pub(crate) fn wants_rationale(mut self, permission: Permission) -> Self {
        self.rationale.push(permission);
        self
    }

    pub(crate) fn answers(mut self, permission: Permission, grant: bool) -> Self {
        self.answers.insert(permission, grant);
        self
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PermissionSystem for FakePermissions {
    fn status(&self, permission: Permission) -> PermissionStatus {
        self.statuses
            .lock()
            .unwrap()
            .get(&permission)
            .copied()
            .unwrap_or(PermissionStatus::NotDetermined)
    }

    fn should_show_rationale(&self, permission: Permission) -> bool {
        self.rationale.contains(&permission)
    }

    async fn request(&self, permissions: &[Permission]) -> HashMap<Permission, bool> {
        self.requests.lock().unwrap().push(permissions.to_vec());
        let mut result = HashMap::new();
        for permission in permissions {
            let grant = self.answers.get(permission).copied().unwrap_or(false);
            let status = if grant {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            };
            self.statuses.lock().unwrap().insert(*permission, status);
            result.insert(*permission, grant);
        }
        result
    }
}

pub(crate) struct FakeRationale {
    pub(crate) accept: bool,
    pub(crate) shown: AtomicUsize,
}

#[async_trait]
impl RationalePrompt for FakeRationale {
    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.shown.fetch_add(1, Ordering::SeqCst);
        self.accept
    }
}

pub(crate) struct FakeCamera {
    pub(crate) succeed: bool,
    pub(crate) captures: AtomicUsize,
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn capture(&self, destination: &Path) -> Result<(), CapabilityError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            std::fs::write(destination, b"jpeg").unwrap();
            Ok(())
        } else {
            Err(CapabilityError::Cancelled(CapabilityKind::Camera))
        }
    }
}

pub(crate) struct FakePicker {
    pub(crate) choice: Option<MediaRef>,
    pub(crate) calls: AtomicUsize,
    pub(crate) gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait]
impl ContentPicker for FakePicker {
    async fn pick(&self, _filter: &ContentFilter) -> Option<MediaRef> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.choice.clone()
    }
}

pub(crate) struct Harness {
    pub(crate) coordinator: Arc<Coordinator>,
    pub(crate) permissions: Arc<FakePermissions>,
    pub(crate) rationale: Arc<FakeRationale>,
    pub(crate) camera: Arc<FakeCamera>,
    pub(crate) picker: Arc<FakePicker>,
    pub(crate) dir: TempDir,
}

pub(crate) fn harness(
    permissions: FakePermissions,
    accept_rationale: bool,
    camera_succeeds: bool,
    choice: Option<MediaRef>,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let permissions = Arc::new(permissions);
    let rationale = Arc::new(FakeRationale {
        accept: accept_rationale,
        shown: AtomicUsize::new(0),
    });
    let camera = Arc::new(FakeCamera {
        succeed: camera_succeeds,
        captures: AtomicUsize::new(0),
    });
    let picker = Arc::new(FakePicker {
        choice,
        calls: AtomicUsize::new(0),
        gate: Mutex::new(None),
    });

    let platform = Platform {
        permissions: permissions.clone(),
        rationale: rationale.clone(),
        camera: camera.clone(),
        picker: picker.clone(),
    };
    let coordinator = Arc::new(Coordinator::new(
        platform,
        dir.path().join("captures"),
        ContentFilter::default(),
        RationaleText::default(),
    ));

    Harness {
        coordinator,
        permissions,
        rationale,
        camera,
        picker,
        dir,
    }
}
