/// Photo list screen
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, Column, Image};
use iced::{ContentFit, Element, Length};

use super::BOLD;
use crate::state::data::PhotoRecord;
use crate::state::store::PhotoStore;
use crate::Message;

/// Height of the image in each card
const CARD_IMAGE_HEIGHT: f32 = 200.0;

pub fn view(store: &PhotoStore, camera_idle: bool, gallery_idle: bool) -> Element<'_, Message> {
    let actions = row![
        button("Capture 📷")
            .on_press_maybe(camera_idle.then_some(Message::CapturePhoto))
            .padding(10),
        button("Select 👆")
            .on_press_maybe(gallery_idle.then_some(Message::SelectPhoto))
            .padding(10),
        button("More…")
            .on_press(Message::OpenChooser)
            .padding(10)
            .style(button::secondary),
    ]
    .spacing(12);

    let body: Element<Message> = if store.is_empty() {
        text("No photos yet. Capture or select one to get started.")
            .size(16)
            .into()
    } else {
        let cards = store.get_all_photos().iter().map(photo_card);
        scrollable(Column::with_children(cards).spacing(12))
            .height(Length::Fill)
            .into()
    };

    column![
        text("Photo Gallery 📸").size(32).font(BOLD),
        text(format!("{} photos", store.photo_count())).size(14),
        actions,
        body,
    ]
    .spacing(16)
    .into()
}

/// One saved photo: image, description, location
fn photo_card(photo: &PhotoRecord) -> Element<'_, Message> {
    let content = column![
        Image::new(Handle::from_path(photo.source.as_path()))
            .width(Length::Fill)
            .height(Length::Fixed(CARD_IMAGE_HEIGHT))
            .content_fit(ContentFit::Cover),
        text(&photo.description).size(18).font(BOLD),
        text(format!("Location: {}", photo.location)).size(14),
    ]
    .spacing(8)
    .padding(12);

    container(content)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}
