//! Trace backend: a deterministic, in-memory render target.
//!
//! Every primitive call is recorded as a typed [`DrawOp`], and `output()`
//! serializes the op stream to a byte stream with a recognizable magic
//! header. The crate's tests assert against the recorded ops; it is also
//! handy for debugging template layout without a PDF viewer.
//!
//! Cursor semantics are the reference for loop expansion: `multi_cell`
//! advances the cursor by one `line_height` per explicit newline-separated
//! line (width-driven word wrap is a real drawing backend's concern).

use std::path::{Path, PathBuf};

use crate::error::FacturaError;
use crate::render::backend::{Backend, Rgb};
use crate::template::element::Align;

/// Magic header prefixed to every serialized trace.
pub const TRACE_MAGIC: &[u8] = b"%FACTURA-TRACE 1\n";

/// One recorded drawing primitive.
///
/// `Cell` and `MultiCell` capture the cursor position at draw time, so a
/// test can assert exactly where content landed.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    AddPage,
    AddFont {
        family: String,
        style: String,
        path: PathBuf,
    },
    SetFont {
        family: String,
        style: String,
        size: f64,
    },
    SetTextColor(Rgb),
    SetDrawColor(Rgb),
    SetFillColor(Rgb),
    SetLineWidth(f64),
    SetXy {
        x: f64,
        y: f64,
    },
    Cell {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        text: String,
        border: String,
        align: Align,
    },
    MultiCell {
        x: f64,
        y: f64,
        width: f64,
        line_height: f64,
        text: String,
        border: String,
        align: Align,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        filled: bool,
    },
    Image {
        path: PathBuf,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    BeginRotation {
        degrees: f64,
        pivot_x: f64,
        pivot_y: f64,
    },
    EndRotation,
}

/// In-memory recording backend.
#[derive(Debug, Default)]
pub struct TraceBackend {
    ops: Vec<DrawOp>,
    x: f64,
    y: f64,
    rotation_depth: usize,
    /// Registered fonts survive reset, mirroring how real backends keep
    /// font resources registered across reuse.
    fonts: Vec<(String, String)>,
}

impl TraceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded op stream.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Registered `(family, style)` pairs.
    pub fn fonts(&self) -> &[(String, String)] {
        &self.fonts
    }
}

impl Backend for TraceBackend {
    fn add_page(&mut self) {
        self.ops.push(DrawOp::AddPage);
        self.x = 0.0;
        self.y = 0.0;
    }

    fn add_font(&mut self, family: &str, style: &str, path: &Path) -> Result<(), FacturaError> {
        self.fonts.push((family.to_string(), style.to_string()));
        self.ops.push(DrawOp::AddFont {
            family: family.to_string(),
            style: style.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn set_font(&mut self, family: &str, style: &str, size: f64) {
        self.ops.push(DrawOp::SetFont {
            family: family.to_string(),
            style: style.to_string(),
            size,
        });
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.ops.push(DrawOp::SetTextColor(color));
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.ops.push(DrawOp::SetDrawColor(color));
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.ops.push(DrawOp::SetFillColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(DrawOp::SetLineWidth(width));
    }

    fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.ops.push(DrawOp::SetXy { x, y });
    }

    fn cursor_y(&self) -> f64 {
        self.y
    }

    fn cell(&mut self, width: f64, height: f64, text: &str, border: &str, align: Align) {
        self.ops.push(DrawOp::Cell {
            x: self.x,
            y: self.y,
            width,
            height,
            text: text.to_string(),
            border: border.to_string(),
            align,
        });
        // Single-line cells leave the cursor row unchanged.
        self.x += width;
    }

    fn multi_cell(&mut self, width: f64, line_height: f64, text: &str, border: &str, align: Align) {
        let lines = text.split('\n').count().max(1);
        self.ops.push(DrawOp::MultiCell {
            x: self.x,
            y: self.y,
            width,
            line_height,
            text: text.to_string(),
            border: border.to_string(),
            align,
        });
        self.x = 0.0;
        self.y += lines as f64 * line_height;
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, filled: bool) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            filled,
        });
    }

    fn image(
        &mut self,
        path: &Path,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), FacturaError> {
        self.ops.push(DrawOp::Image {
            path: path.to_path_buf(),
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn begin_rotation(&mut self, degrees: f64, pivot_x: f64, pivot_y: f64) {
        self.rotation_depth += 1;
        self.ops.push(DrawOp::BeginRotation {
            degrees,
            pivot_x,
            pivot_y,
        });
    }

    fn end_rotation(&mut self) {
        self.rotation_depth = self.rotation_depth.saturating_sub(1);
        self.ops.push(DrawOp::EndRotation);
    }

    fn output(&mut self) -> Result<Vec<u8>, FacturaError> {
        if self.rotation_depth != 0 {
            return Err(FacturaError::Backend(format!(
                "unbalanced rotation scope at output: depth {}",
                self.rotation_depth
            )));
        }
        let mut bytes = TRACE_MAGIC.to_vec();
        for op in &self.ops {
            bytes.extend_from_slice(format!("{:?}\n", op).as_bytes());
        }
        Ok(bytes)
    }

    fn reset(&mut self) -> Result<(), FacturaError> {
        if self.rotation_depth != 0 {
            return Err(FacturaError::Backend(
                "cannot reset: rotation scope still open".into(),
            ));
        }
        self.ops.clear();
        self.x = 0.0;
        self.y = 0.0;
        Ok(())
    }
}
