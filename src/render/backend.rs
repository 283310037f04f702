//! Drawing backend abstraction.
//!
//! The generator never draws anything itself; it issues primitive calls
//! against this trait and an external backend (a PDF writer, a raster
//! engine, the in-crate [`TraceBackend`](crate::render::trace::TraceBackend))
//! turns them into a document. The primitive set mirrors the classic
//! cell-based PDF APIs: positioned single-line and wrapped text cells,
//! rectangles, placed images, and a begin/end rotation scope.
//!
//! Drawing primitives are infallible; backends that can fail mid-document
//! (e.g. a streaming writer) defer their error to [`Backend::output`].

use std::path::Path;

use crate::error::FacturaError;
use crate::template::element::Align;

/// An RGB color triple passed to the color primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A render target: one in-progress document.
///
/// Implementations carry their own cursor; `cell` and `multi_cell` draw at
/// the current cursor position (set beforehand with [`Backend::set_xy`]),
/// and `multi_cell` advances the cursor past the wrapped text so
/// [`Backend::cursor_y`] reports where the next line would start.
pub trait Backend {
    /// Start a new blank page.
    fn add_page(&mut self);

    /// Register a font file under a family name and style (`""`, `"B"`).
    /// Fonts are immutable once registered and survive [`Backend::reset`].
    fn add_font(&mut self, family: &str, style: &str, path: &Path) -> Result<(), FacturaError>;

    /// Select the active font.
    fn set_font(&mut self, family: &str, style: &str, size: f64);

    fn set_text_color(&mut self, color: Rgb);
    fn set_draw_color(&mut self, color: Rgb);
    fn set_fill_color(&mut self, color: Rgb);
    fn set_line_width(&mut self, width: f64);

    /// Move the cursor.
    fn set_xy(&mut self, x: f64, y: f64);

    /// The cursor's current vertical position.
    fn cursor_y(&self) -> f64;

    /// Draw a single-line text cell of the given size at the cursor.
    fn cell(&mut self, width: f64, height: f64, text: &str, border: &str, align: Align);

    /// Draw a wrapped text cell at the cursor; the backend computes the
    /// resulting height and advances the cursor past it.
    fn multi_cell(&mut self, width: f64, line_height: f64, text: &str, border: &str, align: Align);

    /// Draw a rectangle, filled with the current fill color or
    /// outline-only.
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, filled: bool);

    /// Place an image file at the given position and size.
    fn image(&mut self, path: &Path, x: f64, y: f64, width: f64, height: f64)
    -> Result<(), FacturaError>;

    /// Open a rotation scope around subsequent draws. Every call must be
    /// paired with [`Backend::end_rotation`].
    fn begin_rotation(&mut self, degrees: f64, pivot_x: f64, pivot_y: f64);

    /// Close the innermost rotation scope.
    fn end_rotation(&mut self);

    /// Serialize the finished document to bytes.
    fn output(&mut self) -> Result<Vec<u8>, FacturaError>;

    /// Return the target to a blank single-page state for reuse. Must fail
    /// (so the pool discards the instance) whenever a pristine state cannot
    /// be guaranteed — e.g. an unbalanced rotation scope.
    fn reset(&mut self) -> Result<(), FacturaError>;
}
