//! Display presentation: pure [`present`] mapping plus the [`ScreenRenderer`]
//! that paints the result onto an `embedded_graphics` draw target.

pub mod colors;
pub mod layout;
pub mod presenter;
pub mod render;

pub use presenter::{DisplayState, Face, LabelColor, PrimaryValue, present};
pub use render::{SPINNER_FRAMES, ScreenRenderer};
