use iced::widget::{button, column, text};
use iced::{Alignment, Element, Length};

use super::BOLD;
use crate::Message;

/// Capture-or-select screen
pub fn view<'a>(camera_idle: bool, gallery_idle: bool) -> Element<'a, Message> {
    column![
        text("Capture or Select").size(32).font(BOLD),
        button("Take Photo")
            .on_press_maybe(camera_idle.then_some(Message::CapturePhoto))
            .width(Length::Fill)
            .padding(10),
        button("Select from Gallery")
            .on_press_maybe(gallery_idle.then_some(Message::SelectPhoto))
            .width(Length::Fill)
            .padding(10),
        button("Cancel")
            .on_press(Message::Back)
            .width(Length::Fill)
            .padding(10)
            .style(button::text),
    ]
    .spacing(16)
    .max_width(480.0)
    .align_x(Alignment::Center)
    .into()
}
