//! Fixed screen geometry for the 128×128 panel.
//!
//! ```text
//! ┌────────────────────────────┐
//! │ CO2: good              [■] │  label + calibration badge
//! │ 0.8                        │  primary value
//! │                            │
//! │  ( ◡ )      VOC:           │  face, VOC status
//! │             120            │  VOC value
//! └────────────────────────────┘
//! ```
//!
//! Text anchors use a middle baseline.  Each `*_AREA` is the rectangle
//! cleared before its region is redrawn; areas never overlap.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

pub const WIDTH: u32 = 128;
pub const HEIGHT: u32 = 128;

const HORIZONTAL_START: i32 = 8;
const VERTICAL_MOVE: i32 = 8;
const VOC_HORIZONTAL: i32 = 67;

pub const CO2_LABEL_POS: Point = Point::new(HORIZONTAL_START, 5 + VERTICAL_MOVE);
pub const CO2_LABEL_AREA: Rectangle = Rectangle::new(Point::new(0, 2), Size::new(112, 22));

pub const CO2_VALUE_POS: Point = Point::new(HORIZONTAL_START, 37 + VERTICAL_MOVE);
pub const CO2_VALUE_AREA: Rectangle = Rectangle::new(Point::new(0, 26), Size::new(WIDTH, 40));

pub const FACE_CENTER: Point = Point::new(HORIZONTAL_START + 14, 89 + VERTICAL_MOVE);
pub const FACE_DIAMETER: u32 = 28;
pub const FACE_AREA: Rectangle = Rectangle::new(Point::new(4, 80), Size::new(36, 34));

pub const VOC_STATUS_POS: Point = Point::new(VOC_HORIZONTAL, 76 + VERTICAL_MOVE);
pub const VOC_STATUS_AREA: Rectangle = Rectangle::new(Point::new(64, 73), Size::new(64, 22));

pub const VOC_VALUE_POS: Point = Point::new(VOC_HORIZONTAL, 100 + VERTICAL_MOVE);
pub const VOC_VALUE_AREA: Rectangle = Rectangle::new(Point::new(64, 97), Size::new(64, 24));

pub const BADGE_AREA: Rectangle = Rectangle::new(Point::new(116, 4), Size::new(8, 8));
