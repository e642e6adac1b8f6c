//! Draws [`DisplayState`]s and the loading screen onto any `Rgb565` target.
//!
//! The renderer remembers what is on the panel and only repaints regions
//! whose content changed.  A theme flip (eCO2 crossing its threshold) or an
//! explicit [`ScreenRenderer::invalidate`] repaints everything.  Region
//! repaints and full repaints of the same state leave identical pixels.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use heapless::String;
use profont::PROFONT_24_POINT;

use crate::fsm::CalibrationStatus;

use super::colors::{NORMAL, Theme, badge_rgb, label_rgb};
use super::layout::*;
use super::presenter::{DisplayState, Face};

/// Loading spinner frames, advanced once per loading-frame interval.
pub const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

const LEFT_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Middle)
    .build();

#[derive(Debug)]
pub struct ScreenRenderer {
    /// Readings currently on the panel; `None` while loading or blank.
    shown: Option<DisplayState>,
    badge: Option<CalibrationStatus>,
    /// Spinner frame index currently on the panel.
    loading_frame: Option<usize>,
    stale: bool,
}

impl Default for ScreenRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenRenderer {
    pub const fn new() -> Self {
        Self {
            shown: None,
            badge: None,
            loading_frame: None,
            stale: true,
        }
    }

    /// Force the next draw to repaint the whole panel.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// The readings state last drawn, if the readings screen is up.
    pub fn shown(&self) -> Option<&DisplayState> {
        self.shown.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading_frame.is_some()
    }

    /// Draw the readings screen.  Returns `false` when nothing needed
    /// repainting.
    pub fn draw<D>(&mut self, state: &DisplayState, status: CalibrationStatus, target: &mut D) -> bool
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let theme = Theme::for_co2(state.co2_high());
        let theme_flipped = self
            .shown
            .is_none_or(|prev| prev.co2_high() != state.co2_high());

        if self.stale || theme_flipped {
            target.clear(theme.background).ok();
            draw_co2(state, theme, target);
            draw_face(state, target);
            draw_voc(state, theme, target);
            draw_badge(status, theme, target);
            self.commit(Some(*state), status, None);
            return true;
        }

        let mut drew = false;
        if let Some(prev) = self.shown {
            if prev.co2_ppm != state.co2_ppm {
                fill(CO2_LABEL_AREA, theme.background, target);
                fill(CO2_VALUE_AREA, theme.background, target);
                draw_co2(state, theme, target);
                drew = true;
            }
            if prev.voc_ppb != state.voc_ppb || prev.voc_color != state.voc_color {
                fill(VOC_STATUS_AREA, theme.background, target);
                fill(VOC_VALUE_AREA, theme.background, target);
                draw_voc(state, theme, target);
                drew = true;
            }
        }
        if self.badge != Some(status) {
            draw_badge(status, theme, target);
            drew = true;
        }

        self.commit(Some(*state), status, None);
        drew
    }

    /// Draw the loading screen at spinner `frame`.  Returns `false` when the
    /// frame and badge are already on the panel.
    pub fn draw_loading<D>(&mut self, frame: usize, status: CalibrationStatus, target: &mut D) -> bool
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let idx = frame % SPINNER_FRAMES.len();
        let fresh = self.stale || self.loading_frame.is_none();

        if fresh {
            target.clear(NORMAL.background).ok();
            self.badge = None;
        } else if self.loading_frame == Some(idx) && self.badge == Some(status) {
            return false;
        }

        if fresh || self.loading_frame != Some(idx) {
            if !fresh {
                fill(CO2_LABEL_AREA, NORMAL.background, target);
                fill(VOC_VALUE_AREA, NORMAL.background, target);
            }
            let spinner = SPINNER_FRAMES[idx];
            let label_style = MonoTextStyle::new(&FONT_10X20, NORMAL.foreground);

            let mut title: String<12> = String::new();
            let _ = write!(title, "Loading {spinner}");
            Text::with_text_style(&title, CO2_LABEL_POS, label_style, LEFT_MIDDLE)
                .draw(target)
                .ok();

            let mut tick: String<2> = String::new();
            let _ = tick.push(spinner);
            Text::with_text_style(&tick, VOC_VALUE_POS, label_style, LEFT_MIDDLE)
                .draw(target)
                .ok();
        }

        if self.badge != Some(status) {
            draw_badge(status, NORMAL, target);
        }

        self.commit(None, status, Some(idx));
        true
    }

    fn commit(
        &mut self,
        shown: Option<DisplayState>,
        badge: CalibrationStatus,
        loading_frame: Option<usize>,
    ) {
        self.shown = shown;
        self.badge = Some(badge);
        self.loading_frame = loading_frame;
        self.stale = false;
    }
}

// ---------------------------------------------------------------------------
// Region painters
// ---------------------------------------------------------------------------

fn fill<D>(area: Rectangle, color: Rgb565, target: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    area.into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)
        .ok();
}

fn draw_co2<D>(state: &DisplayState, theme: Theme, target: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    let label = if state.co2_high() { "CO2: HIGH" } else { "CO2: good" };
    Text::with_text_style(
        label,
        CO2_LABEL_POS,
        MonoTextStyle::new(&FONT_10X20, theme.foreground),
        LEFT_MIDDLE,
    )
    .draw(target)
    .ok();

    let mut value: String<8> = String::new();
    let _ = write!(value, "{}", state.primary_value);
    Text::with_text_style(
        &value,
        CO2_VALUE_POS,
        MonoTextStyle::new(&PROFONT_24_POINT, theme.foreground),
        LEFT_MIDDLE,
    )
    .draw(target)
    .ok();
}

fn draw_voc<D>(state: &DisplayState, theme: Theme, target: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_text_style(
        "VOC:",
        VOC_STATUS_POS,
        MonoTextStyle::new(&FONT_10X20, label_rgb(state.voc_color)),
        LEFT_MIDDLE,
    )
    .draw(target)
    .ok();

    let mut value: String<8> = String::new();
    let _ = write!(value, "{}", state.voc_ppb);
    Text::with_text_style(
        &value,
        VOC_VALUE_POS,
        MonoTextStyle::new(&FONT_10X20, theme.foreground),
        LEFT_MIDDLE,
    )
    .draw(target)
    .ok();
}

fn draw_face<D>(state: &DisplayState, target: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = label_rgb(state.co2_color);
    let outline = PrimitiveStyle::with_stroke(color, 2);

    Circle::with_center(FACE_CENTER, FACE_DIAMETER)
        .into_styled(outline)
        .draw(target)
        .ok();

    let eye = PrimitiveStyle::with_fill(color);
    for dx in [-5, 5] {
        Circle::with_center(FACE_CENTER + Point::new(dx, -4), 4)
            .into_styled(eye)
            .draw(target)
            .ok();
    }

    let mouth = match state.face {
        Face::Smile => Arc::with_center(
            FACE_CENTER + Point::new(0, 1),
            14,
            30.0_f32.deg(),
            120.0_f32.deg(),
        ),
        Face::Frown => Arc::with_center(
            FACE_CENTER + Point::new(0, 10),
            14,
            210.0_f32.deg(),
            120.0_f32.deg(),
        ),
    };
    mouth.into_styled(outline).draw(target).ok();
}

fn draw_badge<D>(status: CalibrationStatus, theme: Theme, target: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    fill(BADGE_AREA, badge_rgb(status).unwrap_or(theme.background), target);
}
