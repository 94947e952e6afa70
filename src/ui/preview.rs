/// Preview and annotate screen
use iced::widget::image::Handle;
use iced::widget::{button, column, row, text, text_input, Image};
use iced::{ContentFit, Element, Length};

use super::BOLD;
use crate::state::flow::PreviewDraft;
use crate::Message;

const PREVIEW_HEIGHT: f32 = 250.0;

pub fn view(draft: &PreviewDraft) -> Element<'_, Message> {
    column![
        text("Preview Photo").size(32).font(BOLD),
        Image::new(Handle::from_path(draft.source.as_path()))
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .content_fit(ContentFit::Contain),
        text("Description:"),
        text_input("What is in this photo?", &draft.description)
            .on_input(Message::DescriptionChanged)
            .padding(8),
        text("Location:"),
        // Filled in by the place lookup when it resolves; always editable
        text_input("Where was it taken?", &draft.location)
            .on_input(Message::LocationChanged)
            .on_submit(Message::Save)
            .padding(8),
        row![
            button("Save").on_press(Message::Save).padding(10),
            button("Cancel")
                .on_press(Message::Cancel)
                .padding(10)
                .style(button::text),
        ]
        .spacing(12),
    ]
    .spacing(12)
    .into()
}
