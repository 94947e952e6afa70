/// Screen views
///
/// One `view` function per screen of the flow. They only read state and
/// emit `Message`s; every decision happens in `update`.

pub mod choose;
pub mod list;
pub mod preview;

use iced::font::Weight;
use iced::Font;

/// Bold variant of the default font, used for titles and descriptions
pub const BOLD: Font = Font {
    weight: Weight::Bold,
    ..Font::DEFAULT
};
