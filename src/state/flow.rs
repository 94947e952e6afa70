/// Screen flow controller
///
/// Three screens on a back stack whose bottom is always the list:
/// List → Choose → Preview. A successful capture or selection pushes a
/// Preview carrying the photo reference; save or cancel on Preview goes
/// back to the list. Back pops exactly one screen.
///
/// Every Preview visit gets its own session number so that a late
/// location lookup for a dismissed preview can be recognized and dropped.

use log::{debug, info, warn};

use super::data::{MediaRef, PhotoRecord};
use super::store::PhotoStore;
use crate::capability::LocationGrant;
use crate::error::CapabilityError;

/// A screen and the state it owns
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    List,
    Choose,
    Preview(PreviewDraft),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::List => "list",
            Screen::Choose => "choose",
            Screen::Preview(_) => "preview",
        }
    }
}

/// What the user is annotating on the Preview screen
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDraft {
    pub session: u64,
    pub source: MediaRef,
    pub description: String,
    pub location: String,
}

/// Follow-up work requested when a Preview opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEffect {
    /// Resolve the device position to a place for this preview session
    LookupPlace { session: u64 },
    /// Ask the coordinator for location access
    RequestLocationAccess,
}

#[derive(Debug)]
pub struct FlowController {
    root: Screen,
    /// Screens above the list, innermost last
    history: Vec<Screen>,
    next_session: u64,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            root: Screen::List,
            history: Vec::new(),
            next_session: 1,
        }
    }

    /// The screen currently on top
    pub fn current(&self) -> &Screen {
        self.history.last().unwrap_or(&self.root)
    }

    /// The draft on screen, if the Preview is showing
    pub fn preview(&self) -> Option<&PreviewDraft> {
        match self.current() {
            Screen::Preview(draft) => Some(draft),
            _ => None,
        }
    }

    fn preview_mut(&mut self) -> Option<&mut PreviewDraft> {
        match self.history.last_mut() {
            Some(Screen::Preview(draft)) => Some(draft),
            _ => None,
        }
    }

    /// List → Choose
    pub fn open_chooser(&mut self) -> bool {
        if *self.current() != Screen::List {
            return false;
        }
        self.history.push(Screen::Choose);
        debug!("Navigated list → choose");
        true
    }

    /// Route the single outcome of a capture or selection request.
    /// Anything but success leaves the screens untouched.
    pub fn media_ready(
        &mut self,
        outcome: Result<MediaRef, CapabilityError>,
        location_granted: bool,
    ) -> Option<PreviewEffect> {
        match outcome {
            Ok(source) => self.show_preview(source, location_granted),
            Err(err) => {
                debug!("Staying on {}: {}", self.current().name(), err);
                None
            }
        }
    }

    /// (List or Choose) → Preview
    pub fn show_preview(
        &mut self,
        source: MediaRef,
        location_granted: bool,
    ) -> Option<PreviewEffect> {
        if self.preview().is_some() {
            warn!("Ignoring {} while a preview is already open", source);
            return None;
        }

        let session = self.next_session;
        self.next_session += 1;
        info!("Previewing {} (session {})", source, session);

        self.history.push(Screen::Preview(PreviewDraft {
            session,
            source,
            description: String::new(),
            location: String::new(),
        }));

        Some(if location_granted {
            PreviewEffect::LookupPlace { session }
        } else {
            PreviewEffect::RequestLocationAccess
        })
    }

    /// Outcome of a location access request started from the Preview.
    /// Only asks for a lookup again when `retry_lookup` is enabled.
    pub fn location_access_finished(
        &self,
        outcome: &Result<LocationGrant, CapabilityError>,
        retry_lookup: bool,
    ) -> Option<PreviewEffect> {
        match outcome {
            Ok(_) if retry_lookup => self
                .preview()
                .map(|draft| PreviewEffect::LookupPlace {
                    session: draft.session,
                }),
            Ok(grant) => {
                debug!("Location granted ({:?}); lookup not retried", grant);
                None
            }
            Err(err) => {
                debug!("No location lookup: {}", err);
                None
            }
        }
    }

    pub fn set_description(&mut self, description: String) {
        if let Some(draft) = self.preview_mut() {
            draft.description = description;
        }
    }

    pub fn set_location(&mut self, location: String) {
        if let Some(draft) = self.preview_mut() {
            draft.location = location;
        }
    }

    /// Apply a finished lookup. Returns false when the result was discarded
    /// because its preview is gone or nothing was resolved.
    pub fn place_resolved(&mut self, session: u64, place: Option<String>) -> bool {
        let Some(place) = place else {
            return false;
        };

        match self.preview_mut() {
            Some(draft) if draft.session == session => {
                debug!("Location for session {}: {}", session, place);
                draft.location = place;
                true
            }
            _ => {
                debug!("Discarding location for closed session {}", session);
                false
            }
        }
    }

    /// Preview → List, appending the finished record to the store
    pub fn save(&mut self, store: &mut PhotoStore) -> Option<PhotoRecord> {
        let draft = self.preview()?.clone();

        let record = PhotoRecord {
            id: store.next_id(),
            source: draft.source,
            description: draft.description,
            location: draft.location,
        };
        store.add_photo(record.clone());
        self.return_to_list();

        Some(record)
    }

    /// Preview → List without touching the store
    pub fn cancel(&mut self) -> bool {
        if self.preview().is_none() {
            return false;
        }
        debug!("Preview cancelled");
        self.return_to_list();
        true
    }

    /// Return to the immediately previous screen
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(left) => {
                debug!("Back from {} to {}", left.name(), self.current().name());
                true
            }
            None => false,
        }
    }

    fn return_to_list(&mut self) {
        self.history.clear();
    }
}
