//! drawing the world.
//!
//! the simulation only knows the Renderer trait, backends decide what a frame looks like.
//! everything that wants to be drawn implements Drawable and describes itself both as a
//! single character for the terminal and as polygons for anything with real graphics.

pub mod channel;
pub mod screen;

use planar::Point;
use serde_derive::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer used before init")]
    NotInitialised,
    #[error("can't draw a {width}x{height} world")]
    BadSize { width: f64, height: f64 },
    #[error("can't write frame: {0}")]
    Io(#[from] std::io::Error),
    #[error("can't serialize frame: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("nobody is listening for frames anymore")]
    Disconnected,
}

/// a frame is start_frame, any number of draws, then finish_frame
pub trait Renderer {
    fn init(&mut self, width: f64, height: f64) -> Result<(), RenderError>;
    fn start_frame(&mut self) -> Result<(), RenderError>;
    fn draw(&mut self, d: &dyn Drawable) -> Result<(), RenderError>;
    fn finish_frame(&mut self) -> Result<(), RenderError>;
}

pub trait Drawable {
    /// cell and glyph for character based output, in world coordinates
    fn screen(&self) -> (i64, i64, u8);
    fn web(&self) -> Vec<DrawCommand>;
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0., 0., 0., 1.);
    pub const WHITE: Rgba = Rgba::new(1., 1., 1., 1.);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// as a css colour, channels 0-255, alpha stays a fraction
    pub fn css(&self) -> String {
        let byte = |v: f64| (v.clamp(0., 1.) * 255.) as u8;
        format!(
            "rgba({},{},{},{:.6})",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            self.a
        )
    }
}

impl serde::Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.css())
    }
}

/// an open or closed (first == last point) polyline
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct DrawCommand {
    pub points: Vec<Point>,
    pub line_colour: Rgba,
    pub do_fill: bool,
    pub fill_colour: Rgba,
}

/// a plain black outline
pub fn poly(points: Vec<Point>) -> DrawCommand {
    DrawCommand {
        points,
        line_colour: Rgba::BLACK,
        do_fill: false,
        fill_colour: Rgba::WHITE,
    }
}

#[test]
fn css_colours() {
    assert_eq!(Rgba::BLACK.css(), "rgba(0,0,0,1.000000)");
    assert_eq!(Rgba::new(0.5, 0.1, 0.1, 0.2).css(), "rgba(127,25,25,0.200000)");
    assert_eq!(Rgba::new(2., -1., 1., 0.).css(), "rgba(255,0,255,0.000000)");
}

#[test]
fn command_json() {
    let cmd = poly(vec![Point::new(0., 1.), Point::new(2.5, 0.)]);
    let json = serde_json::to_value(&cmd).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "points": [{"x": 0.0, "y": 1.0}, {"x": 2.5, "y": 0.0}],
            "line_colour": "rgba(0,0,0,1.000000)",
            "do_fill": false,
            "fill_colour": "rgba(255,255,255,1.000000)",
        })
    );
}
