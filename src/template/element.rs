//! Typed template instructions.
//!
//! Each data row of a template becomes one [`Element`]: a positioned drawing
//! instruction with a kind, a backend draw-method hint, styling, and the
//! type-specific payload (text, QR/barcode content, image source, table
//! columns). Elements are validated at parse time and immutable afterwards.

use serde::{Deserialize, Serialize};

use crate::error::FacturaError;

/// The type of drawing instruction an element represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Box,
    Image,
    Qr,
    Barcode,
    /// Recognized but deliberately unimplemented; rendering logs and skips.
    Table,
}

impl ElementKind {
    /// Parse an explicit `type` column value. Unrecognized values return
    /// `None` so the caller can fall back to method inference.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ElementKind::Text),
            "box" => Some(ElementKind::Box),
            "image" => Some(ElementKind::Image),
            "qr" => Some(ElementKind::Qr),
            "barcode" => Some(ElementKind::Barcode),
            "table" => Some(ElementKind::Table),
            _ => None,
        }
    }

    /// Infer a kind from the draw method when the `type` column is absent
    /// or unrecognized. Unknown methods default to `Text`.
    pub fn infer(method: DrawMethod) -> Self {
        match method {
            DrawMethod::Cell | DrawMethod::MultiCell => ElementKind::Text,
            DrawMethod::Rect => ElementKind::Box,
            DrawMethod::Image => ElementKind::Image,
            DrawMethod::Qr => ElementKind::Qr,
            DrawMethod::Barcode => ElementKind::Barcode,
        }
    }
}

/// Backend drawing-mode hint: single-line cell, wrapped cell, or the
/// non-text primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawMethod {
    /// Single-line cell with a declared height.
    #[default]
    Cell,
    /// Wrapped multi-line cell; the backend computes the resulting height.
    MultiCell,
    Rect,
    Image,
    Qr,
    Barcode,
}

impl DrawMethod {
    /// Parse a `method` column value. Unknown values default to `Cell`,
    /// matching the text fallback in kind inference.
    pub fn parse(s: &str) -> Self {
        match s {
            "MultiCell" => DrawMethod::MultiCell,
            "Rect" => DrawMethod::Rect,
            "Image" => DrawMethod::Image,
            "QR" => DrawMethod::Qr,
            "Barcode" => DrawMethod::Barcode,
            _ => DrawMethod::Cell,
        }
    }
}

/// Horizontal text alignment, normalized from the template's free-form
/// column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Normalize an alignment string: `left`/`l`, `center`/`c`,
    /// `right`/`r` (case-insensitive). Anything else is `Left`.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CENTER" | "C" => Align::Center,
            "RIGHT" | "R" => Align::Right,
            _ => Align::Left,
        }
    }

    /// The single-letter code drawing backends expect.
    pub fn code(self) -> &'static str {
        match self {
            Align::Left => "L",
            Align::Center => "C",
            Align::Right => "R",
        }
    }
}

/// Which point of the element a rotation pivots around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotateAnchor {
    /// Pivot at the element center (the default).
    #[default]
    Center,
    /// Pivot at the middle of the left edge.
    LeftEdge,
    /// Pivot at the middle of the top edge.
    TopEdge,
}

impl RotateAnchor {
    /// Parse a `rotateType` column value: `left`, `top`, anything else is
    /// `Center`.
    pub fn parse(s: &str) -> Self {
        match s {
            "left" => RotateAnchor::LeftEdge,
            "top" => RotateAnchor::TopEdge,
            _ => RotateAnchor::Center,
        }
    }
}

/// Supported 1D/2D barcode symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarcodeFormat {
    #[default]
    Code128,
    Code39,
    Ean13,
    /// A QR code placed through the barcode element path.
    Qr,
}

impl BarcodeFormat {
    /// Parse a `barcodeFormat` column value (case-insensitive). Empty and
    /// unknown values fall back to `Code128`.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CODE39" => BarcodeFormat::Code39,
            "EAN13" => BarcodeFormat::Ean13,
            "QR" => BarcodeFormat::Qr,
            _ => BarcodeFormat::Code128,
        }
    }

    /// Display name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "Code128",
            BarcodeFormat::Code39 => "Code39",
            BarcodeFormat::Ean13 => "EAN13",
            BarcodeFormat::Qr => "QR",
        }
    }
}

/// The position of an element on the page, in page units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The dimensions of an element, in page units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Font selection for a text element.
///
/// An empty family defers to the generator's configured default family at
/// render time. `style` is the backend style string (`""`, `"B"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub style: String,
    pub size: f64,
}

/// An RGB color with an explicit "was it set" flag, distinguishing
/// "unset = inherit the backend default" from "explicitly black".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub is_set: bool,
}

/// Styling shared by all element kinds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Style {
    pub font: FontSpec,
    /// Border spec passed through to the backend verbatim (e.g. `"1"`).
    pub border: String,
    pub align: Align,
    pub rotate_degree: i32,
    pub rotate_anchor: RotateAnchor,
    pub text_color: Color,
    pub background: Color,
    pub image_src: String,
}

/// One column of a table element, parsed from the compact
/// `field:width[:align[:fontStyle]]` grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub field: String,
    pub width: f64,
    pub align: Align,
    pub font_style: String,
}

/// A single positioned drawing instruction derived from a template row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub method: DrawMethod,
    /// Literal text content, possibly containing `{{placeholder}}` tokens.
    pub text: String,
    /// A single identifier or a bracketed `[a,"b",c]` list of identifiers
    /// to bind into `text`.
    pub variable_name: String,
    /// `"<arrayName>.<fieldName>"` — when non-empty, this element repeats
    /// once per item of the named array.
    pub loop_field: String,
    pub position: Position,
    pub size: Size,
    pub style: Style,
    pub qr_content: String,
    pub barcode_format: BarcodeFormat,
    pub barcode_content: String,
    pub columns: Vec<TableColumn>,
}

impl Element {
    /// Check the invariants every element must satisfy, plus the
    /// kind-specific payload requirements.
    pub fn validate(&self) -> Result<(), FacturaError> {
        if self.position.x < 0.0 || self.position.y < 0.0 {
            return Err(FacturaError::InvalidElement(format!(
                "invalid position: x={:.2}, y={:.2}",
                self.position.x, self.position.y
            )));
        }

        if self.size.width <= 0.0 || self.size.height <= 0.0 {
            return Err(FacturaError::InvalidElement(format!(
                "invalid size: width={:.2}, height={:.2}",
                self.size.width, self.size.height
            )));
        }

        match self.kind {
            ElementKind::Qr => {
                if self.qr_content.is_empty() && self.variable_name.is_empty() {
                    return Err(FacturaError::InvalidElement(
                        "QR element requires either qrContent or variableName".into(),
                    ));
                }
            }
            ElementKind::Barcode => {
                if self.barcode_content.is_empty() && self.variable_name.is_empty() {
                    return Err(FacturaError::InvalidElement(
                        "barcode element requires either barcodeContent or variableName".into(),
                    ));
                }
            }
            ElementKind::Image => {
                if self.style.image_src.is_empty() && self.variable_name.is_empty() {
                    return Err(FacturaError::InvalidElement(
                        "image element requires either imageSrc or variableName".into(),
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Whether this element repeats over an array in the data context.
    pub fn is_loop(&self) -> bool {
        !self.loop_field.is_empty()
    }

    /// Split `loop_field` into `(arrayName, fieldName)`. Returns `None`
    /// unless the field has exactly two dot-separated parts.
    pub fn loop_parts(&self) -> Option<(&str, &str)> {
        let mut parts = self.loop_field.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(array), Some(field), None) if !array.is_empty() && !field.is_empty() => {
                Some((array, field))
            }
            _ => None,
        }
    }
}

impl Default for Element {
    fn default() -> Self {
        Self {
            kind: ElementKind::Text,
            method: DrawMethod::Cell,
            text: String::new(),
            variable_name: String::new(),
            loop_field: String::new(),
            position: Position::default(),
            size: Size::default(),
            style: Style::default(),
            qr_content: String::new(),
            barcode_format: BarcodeFormat::Code128,
            barcode_content: String::new(),
            columns: Vec::new(),
        }
    }
}
