use iced::keyboard::{self, key::Named, Key};
use iced::widget::container;
use iced::{Element, Length, Subscription, Task, Theme};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

mod capability;
mod config;
mod error;
mod location;
mod state;
mod ui;

use capability::{CapabilityKind, Coordinator, LocationGrant};
use config::AppConfig;
use error::CapabilityError;
use location::{FixedLocation, LocationLookup, PlaceTable};
use state::data::MediaRef;
use state::flow::{FlowController, PreviewEffect, Screen};
use state::store::PhotoStore;

/// Main application state
struct PhotoGallery {
    /// Every photo saved during this run
    store: PhotoStore,
    /// Which screen is showing and the draft being annotated
    flow: FlowController,
    /// Permission and capture flows
    coordinator: Arc<Coordinator>,
    /// Position → place text for new previews
    lookup: LocationLookup,
    retry_lookup_after_grant: bool,
    /// Requests sent to the coordinator whose result has not come back yet
    pending: HashSet<CapabilityKind>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User asked to take a photo with the camera
    CapturePhoto,
    /// User asked to pick a photo from the gallery
    SelectPhoto,
    /// List → Choose
    OpenChooser,
    /// Return to the previous screen
    Back,
    /// A capture or selection request finished
    MediaReady(CapabilityKind, Result<MediaRef, CapabilityError>),
    /// A location access request finished
    LocationAccessFinished(Result<LocationGrant, CapabilityError>),
    /// Background place lookup for a preview session finished
    PlaceResolved(u64, Option<String>),
    DescriptionChanged(String),
    LocationChanged(String),
    /// Save the previewed photo
    Save,
    /// Leave the preview without saving
    Cancel,
}

/// Background work to start after a message was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Follow {
    Capture,
    Select,
    Preview(PreviewEffect),
}

impl PhotoGallery {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load().unwrap_or_else(|e| {
            warn!("⚠️  Could not load config ({}), using defaults", e);
            AppConfig::default()
        });
        match config.to_json() {
            Ok(json) => debug!("Effective configuration:\n{}", json),
            Err(e) => warn!("⚠️  Could not serialize config: {}", e),
        }

        let coordinator = Coordinator::new(
            capability::desktop::platform(&config),
            config.capture_dir(),
            config.picker.clone(),
            config.rationale.clone(),
        );

        let geocoder = match &config.location.places_file {
            Some(path) => PlaceTable::load(path, config.location.max_distance_km)
                .unwrap_or_else(|e| {
                    warn!("⚠️  Place table unavailable ({}), showing coordinates only", e);
                    PlaceTable::empty()
                }),
            None => PlaceTable::empty(),
        };
        if geocoder.is_empty() {
            info!("No place table, previews show raw coordinates");
        }
        let lookup = LocationLookup::new(
            Arc::new(FixedLocation::new(config.location.last_known)),
            Arc::new(geocoder),
        );

        info!(
            "🎨 Photo Gallery initialized, captures go to {}",
            config.capture_dir().display()
        );

        (
            PhotoGallery::with_parts(
                PhotoStore::new(),
                Arc::new(coordinator),
                lookup,
                config.location.retry_lookup_after_grant,
            ),
            Task::none(),
        )
    }

    fn with_parts(
        store: PhotoStore,
        coordinator: Arc<Coordinator>,
        lookup: LocationLookup,
        retry_lookup_after_grant: bool,
    ) -> Self {
        PhotoGallery {
            store,
            flow: FlowController::new(),
            coordinator,
            lookup,
            retry_lookup_after_grant,
            pending: HashSet::new(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match self.apply(message) {
            Some(follow) => self.start(follow),
            None => Task::none(),
        }
    }

    /// Apply a message to the screens and store, returning the work it asks for
    fn apply(&mut self, message: Message) -> Option<Follow> {
        match message {
            Message::CapturePhoto => self.claim(CapabilityKind::Camera).then_some(Follow::Capture),
            Message::SelectPhoto => self.claim(CapabilityKind::Gallery).then_some(Follow::Select),
            Message::OpenChooser => {
                self.flow.open_chooser();
                None
            }
            Message::Back => {
                self.flow.back();
                None
            }
            Message::MediaReady(kind, outcome) => {
                self.pending.remove(&kind);
                let granted = self.coordinator.has_location_permission();
                let effect = self.flow.media_ready(outcome, granted);
                self.follow_preview(effect)
            }
            Message::LocationAccessFinished(outcome) => {
                self.pending.remove(&CapabilityKind::LocationPermission);
                let effect = self
                    .flow
                    .location_access_finished(&outcome, self.retry_lookup_after_grant);
                self.follow_preview(effect)
            }
            Message::PlaceResolved(session, place) => {
                self.flow.place_resolved(session, place);
                None
            }
            Message::DescriptionChanged(description) => {
                self.flow.set_description(description);
                None
            }
            Message::LocationChanged(location) => {
                self.flow.set_location(location);
                None
            }
            Message::Save => {
                if let Some(record) = self.flow.save(&mut self.store) {
                    info!(
                        "📊 {} photos in gallery (latest: {})",
                        self.store.photo_count(),
                        record.id
                    );
                }
                None
            }
            Message::Cancel => {
                self.flow.cancel();
                None
            }
        }
    }

    fn follow_preview(&mut self, effect: Option<PreviewEffect>) -> Option<Follow> {
        let effect = effect?;
        if effect == PreviewEffect::RequestLocationAccess
            && !self.claim(CapabilityKind::LocationPermission)
        {
            return None;
        }
        Some(Follow::Preview(effect))
    }

    /// A kind can be requested when nothing is in flight for it, whether
    /// the coordinator already started working on it or not
    fn can_request(&self, kind: CapabilityKind) -> bool {
        !self.pending.contains(&kind) && self.coordinator.is_idle(kind)
    }

    /// Mark a request as sent. False means one is already in flight.
    fn claim(&mut self, kind: CapabilityKind) -> bool {
        if !self.can_request(kind) {
            debug!("Ignoring {} request, one is already in flight", kind);
            return false;
        }
        self.pending.insert(kind)
    }

    /// Turn follow-up work into a background task
    fn start(&self, follow: Follow) -> Task<Message> {
        let coordinator = Arc::clone(&self.coordinator);
        match follow {
            Follow::Capture => Task::perform(
                async move { coordinator.request_capture().await },
                |outcome| Message::MediaReady(CapabilityKind::Camera, outcome),
            ),
            Follow::Select => Task::perform(
                async move { coordinator.request_selection().await },
                |outcome| Message::MediaReady(CapabilityKind::Gallery, outcome),
            ),
            Follow::Preview(PreviewEffect::LookupPlace { session }) => {
                let lookup = self.lookup.clone();
                Task::perform(async move { lookup.resolve_place().await }, move |place| {
                    Message::PlaceResolved(session, place)
                })
            }
            Follow::Preview(PreviewEffect::RequestLocationAccess) => Task::perform(
                async move { coordinator.request_location_access().await },
                Message::LocationAccessFinished,
            ),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let camera_idle = self.can_request(CapabilityKind::Camera);
        let gallery_idle = self.can_request(CapabilityKind::Gallery);

        let screen = match self.flow.current() {
            Screen::List => ui::list::view(&self.store, camera_idle, gallery_idle),
            Screen::Choose => ui::choose::view(camera_idle, gallery_idle),
            Screen::Preview(draft) => ui::preview::view(draft),
        };

        container(screen)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(24)
            .into()
    }

    /// Escape goes back one screen
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key {
            Key::Named(Named::Escape) => Some(Message::Back),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application(
        "Photo Gallery 📸",
        PhotoGallery::update,
        PhotoGallery::view,
    )
    .subscription(PhotoGallery::subscription)
    .theme(PhotoGallery::theme)
    .centered()
    .run_with(PhotoGallery::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::fakes::{harness, FakePermissions, Harness};
    use capability::Permission;
    use location::Position;

    fn gallery(h: &Harness, fix: Option<Position>, retry: bool) -> PhotoGallery {
        let lookup = LocationLookup::new(
            Arc::new(FixedLocation::new(fix)),
            Arc::new(PlaceTable::empty()),
        );
        PhotoGallery::with_parts(PhotoStore::new(), Arc::clone(&h.coordinator), lookup, retry)
    }

    fn shot(name: &str) -> MediaRef {
        MediaRef::from_path(format!("/photos/{}", name))
    }

    #[test]
    fn test_capture_annotate_and_save() {
        let h = harness(FakePermissions::default(), false, true, None);
        let mut app = gallery(&h, None, false);

        assert_eq!(app.apply(Message::CapturePhoto), Some(Follow::Capture));
        assert_eq!(
            app.apply(Message::MediaReady(CapabilityKind::Camera, Ok(shot("r1.jpg")))),
            Some(Follow::Preview(PreviewEffect::RequestLocationAccess))
        );
        assert_eq!(app.flow.current().name(), "preview");

        assert_eq!(app.apply(Message::DescriptionChanged("Sunset".to_string())), None);
        assert_eq!(app.apply(Message::LocationChanged("Beach".to_string())), None);
        assert_eq!(app.apply(Message::Save), None);

        assert_eq!(app.flow.current(), &Screen::List);
        assert_eq!(app.store.photo_count(), 1);
        let record = &app.store.get_all_photos()[0];
        assert_eq!(record.source, shot("r1.jpg"));
        assert_eq!(record.description, "Sunset");
        assert_eq!(record.location, "Beach");
    }

    #[tokio::test]
    async fn test_granted_preview_falls_back_to_coordinates() {
        let h = harness(
            FakePermissions::default().granted(Permission::CoarseLocation),
            false,
            true,
            None,
        );
        let mut app = gallery(&h, Some(Position::new(-33.0472, -71.6127)), false);

        let follow = app.apply(Message::MediaReady(CapabilityKind::Gallery, Ok(shot("r2.jpg"))));
        let Some(Follow::Preview(PreviewEffect::LookupPlace { session })) = follow else {
            panic!("expected a place lookup, got {:?}", follow);
        };

        let place = app.lookup.resolve_place().await;
        assert_eq!(app.apply(Message::PlaceResolved(session, place)), None);

        assert_eq!(app.flow.preview().unwrap().location, "-33.0472, -71.6127");
        assert_eq!(h.permissions.request_count(), 0);
    }

    #[test]
    fn test_location_answer_routing() {
        let h = harness(FakePermissions::default(), false, true, None);
        let mut app = gallery(&h, None, true);

        let follow = app.apply(Message::MediaReady(CapabilityKind::Camera, Ok(shot("r3.jpg"))));
        assert_eq!(follow, Some(Follow::Preview(PreviewEffect::RequestLocationAccess)));
        let session = app.flow.preview().unwrap().session;

        let denied = Err(CapabilityError::PermissionDenied(CapabilityKind::LocationPermission));
        assert_eq!(app.apply(Message::LocationAccessFinished(denied)), None);
        assert_eq!(app.flow.current().name(), "preview");

        assert_eq!(
            app.apply(Message::LocationAccessFinished(Ok(LocationGrant::Coarse))),
            Some(Follow::Preview(PreviewEffect::LookupPlace { session }))
        );
    }

    #[test]
    fn test_second_press_ignored_until_result() {
        let h = harness(FakePermissions::default(), false, true, None);
        let mut app = gallery(&h, None, false);

        assert_eq!(app.apply(Message::CapturePhoto), Some(Follow::Capture));
        assert_eq!(app.apply(Message::CapturePhoto), None);
        assert!(!app.can_request(CapabilityKind::Camera));

        // Other kinds stay available
        assert_eq!(app.apply(Message::SelectPhoto), Some(Follow::Select));
        assert_eq!(app.apply(Message::SelectPhoto), None);

        let cancelled = Err(CapabilityError::Cancelled(CapabilityKind::Camera));
        assert_eq!(app.apply(Message::MediaReady(CapabilityKind::Camera, cancelled)), None);
        assert_eq!(app.flow.current(), &Screen::List);
        assert!(app.can_request(CapabilityKind::Camera));
        assert_eq!(app.apply(Message::CapturePhoto), Some(Follow::Capture));
    }

    #[test]
    fn test_location_request_not_repeated_while_pending() {
        let h = harness(FakePermissions::default(), false, true, None);
        let mut app = gallery(&h, None, false);

        app.apply(Message::MediaReady(CapabilityKind::Camera, Ok(shot("r4.jpg"))));
        assert!(!app.can_request(CapabilityKind::LocationPermission));
        app.apply(Message::Cancel);

        // A second preview while the first location prompt is still open
        assert_eq!(
            app.apply(Message::MediaReady(CapabilityKind::Gallery, Ok(shot("r5.jpg")))),
            None
        );
        assert_eq!(app.flow.current().name(), "preview");

        let denied = Err(CapabilityError::RationaleDismissed(CapabilityKind::LocationPermission));
        app.apply(Message::LocationAccessFinished(denied));
        assert!(app.can_request(CapabilityKind::LocationPermission));
    }
}
