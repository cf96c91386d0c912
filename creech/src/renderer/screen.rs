use super::{Drawable, RenderError, Renderer};
use std::io::Write;

// cursor home, clear screen, clear scrollback
const CLEAR: &[u8] = b"\x1b[H\x1b[2J\x1b[3J";

/// a character grid, one cell per world unit, written out in full every frame.
/// the world origin ends up in the middle, everything wraps around the edges.
pub struct Screen<W: Write> {
    out: W,
    width: i64,
    height: i64,
    // every row ends in a newline
    buffer: Vec<Vec<u8>>,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: 0,
            height: 0,
            buffer: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.buffer
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn clear(&mut self) {
        let mut row = vec![b' '; self.width as usize];
        row.push(b'\n');
        self.buffer = vec![row; self.height as usize];
    }

    fn put(&mut self, x: i64, y: i64, glyph: u8) {
        let (w, h) = (self.width, self.height);
        let col = (x + 3 * w / 2).rem_euclid(w) as usize;
        let row = (-y + 3 * h / 2).rem_euclid(h) as usize;
        self.buffer[row][col] = glyph;
    }
}

impl<W: Write> Renderer for Screen<W> {
    fn init(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        if !(width >= 1. && height >= 1.) {
            return Err(RenderError::BadSize { width, height });
        }
        self.width = width as i64;
        self.height = height as i64;
        self.clear();
        Ok(())
    }

    fn start_frame(&mut self) -> Result<(), RenderError> {
        if self.buffer.is_empty() {
            return Err(RenderError::NotInitialised);
        }
        self.clear();
        Ok(())
    }

    fn draw(&mut self, d: &dyn Drawable) -> Result<(), RenderError> {
        if self.buffer.is_empty() {
            return Err(RenderError::NotInitialised);
        }
        let (x, y, glyph) = d.screen();
        self.put(x, y, glyph);
        Ok(())
    }

    fn finish_frame(&mut self) -> Result<(), RenderError> {
        self.out.write_all(CLEAR)?;
        for row in &self.buffer {
            self.out.write_all(row)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
struct Glyph(i64, i64, u8);

#[cfg(test)]
impl Drawable for Glyph {
    fn screen(&self) -> (i64, i64, u8) {
        (self.0, self.1, self.2)
    }
    fn web(&self) -> Vec<super::DrawCommand> {
        Vec::new()
    }
}

#[test]
fn origin_is_centered() {
    let mut s = Screen::new(Vec::new());
    assert!(matches!(s.start_frame(), Err(RenderError::NotInitialised)));
    s.init(4., 4.).unwrap();
    s.start_frame().unwrap();
    s.draw(&Glyph(0, 0, b'a')).unwrap();
    s.draw(&Glyph(1, 1, b'b')).unwrap();
    s.draw(&Glyph(-2, -1, b'c')).unwrap();
    // wraps around
    s.draw(&Glyph(-2, 6, b'd')).unwrap();
    s.finish_frame().unwrap();

    let rows = s.rows().iter().map(|r| String::from_utf8_lossy(r)).collect::<Vec<_>>();
    assert_eq!(rows, ["d   \n", "   b\n", "  a \n", "c   \n"]);

    let out = s.into_inner();
    assert!(out.starts_with(CLEAR));
    assert_eq!(&out[CLEAR.len()..], b"d   \n   b\n  a \nc   \n");
}

#[test]
fn frames_start_blank() {
    let mut s = Screen::new(Vec::new());
    s.init(3., 2.).unwrap();
    s.start_frame().unwrap();
    s.draw(&Glyph(0, 0, b'x')).unwrap();
    s.start_frame().unwrap();
    assert!(s.rows().iter().all(|r| r == b"   \n"));
}

#[test]
fn unusable_sizes() {
    for (w, h) in [(0., 4.), (4., -1.), (0.5, 4.), (f64::NAN, 4.)] {
        let mut s = Screen::new(Vec::new());
        assert!(matches!(s.init(w, h), Err(RenderError::BadSize { .. })), "{w}x{h}");
        // still unusable afterwards
        assert!(matches!(s.start_frame(), Err(RenderError::NotInitialised)));
    }
}
