//! # Rendering Module
//!
//! Turns a parsed element sequence plus a data context into a finished
//! document byte stream.
//!
//! ## Modules
//!
//! - [`backend`]: the drawing-primitive trait render targets implement
//! - [`trace`]: deterministic in-memory backend (tests, debugging)
//! - [`resolve`]: `{{placeholder}}` variable resolution
//! - [`encode`]: QR/barcode raster encoding
//! - [`pool`]: render-target reuse with a reset-or-discard contract
//! - [`context`]: render-scoped state (the loop position ledger)
//!
//! The [`Generator`] walks elements in sequence order — later elements draw
//! over earlier ones — and recovers from per-element failures by skipping
//! the element, so a missing image or an empty barcode never costs the
//! caller the whole document.

pub mod backend;
pub mod context;
pub mod encode;
pub mod pool;
pub mod resolve;
pub mod trace;

pub use backend::{Backend, Rgb};
pub use context::RenderContext;
pub use pool::{DEFAULT_POOL_CAPACITY, FontCache, PooledTarget, TargetPool};
pub use trace::{DrawOp, TRACE_MAGIC, TraceBackend};

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::FacturaError;
use crate::template::element::{Color, DrawMethod, Element, ElementKind, RotateAnchor};
use crate::template::parser::DEFAULT_FONT_SIZE;
use crate::value::Value;

/// Vertical gap between repeated loop items, in page units.
const LOOP_SPACING: f64 = 2.0;

/// Line width used for box outlines.
const BOX_LINE_WIDTH: f64 = 0.2;

/// Barcode rasters are encoded at this many pixels per page unit before
/// being placed at the element's size.
const BARCODE_PX_PER_UNIT: f64 = 10.0;

/// Renders element sequences against a pooled drawing backend.
///
/// One `Generator` serves many concurrent renders; all per-render state
/// lives in a [`RenderContext`] owned by each `generate` call.
pub struct Generator<B: Backend> {
    config: GeneratorConfig,
    pool: TargetPool<B>,
}

impl<B: Backend> Generator<B> {
    /// Create a generator whose render targets are built by `factory`.
    pub fn new(
        config: GeneratorConfig,
        factory: impl Fn() -> Result<B, FacturaError> + Send + Sync + 'static,
    ) -> Self {
        let pool = TargetPool::new(DEFAULT_POOL_CAPACITY, factory);
        Self { config, pool }
    }

    /// Render `elements` bound to `data` into a finished byte stream.
    ///
    /// `data` should be a mapping of named fields; any other shape renders
    /// with an empty context (placeholders stay verbatim) rather than
    /// failing.
    pub fn generate(&self, elements: &[Element], data: &Value) -> Result<Vec<u8>, FacturaError> {
        let empty = HashMap::new();
        let fields = match data.as_map() {
            Some(map) => map,
            None => {
                warn!("render data is not a mapping; rendering with an empty context");
                &empty
            }
        };

        let mut target = self.pool.acquire()?;
        let result = self.render_document(&mut target, elements, fields);
        // Release unconditionally; the pool's reset-or-discard contract
        // handles targets left dirty by a failed render.
        self.pool.release(target);
        result
    }

    fn render_document(
        &self,
        target: &mut PooledTarget<B>,
        elements: &[Element],
        fields: &HashMap<String, Value>,
    ) -> Result<Vec<u8>, FacturaError> {
        target.backend.add_page();
        self.ensure_fonts(target);
        target
            .backend
            .set_font(&self.config.default_family, "", DEFAULT_FONT_SIZE);

        debug!(count = elements.len(), "generating document");

        let mut ctx = RenderContext::new();
        for (index, element) in elements.iter().enumerate() {
            if let Err(e) = self.process_element(&mut target.backend, element, fields, &mut ctx) {
                warn!(index, kind = ?element.kind, %e, "element skipped");
            }
        }

        target.backend.output()
    }

    /// Register configured fonts on a target, once per target instance.
    fn ensure_fonts(&self, target: &mut PooledTarget<B>) {
        if target.fonts.is_system_loaded() {
            return;
        }

        for font in &self.config.fonts {
            let key = format!("{}{}", font.family, font.style);
            if target.fonts.is_loaded(&key) {
                continue;
            }
            let path = self.config.font_dir.join(&font.file);
            if !path.exists() {
                debug!(path = %path.display(), "font file not found; skipping registration");
                continue;
            }
            match target.backend.add_font(&font.family, &font.style, &path) {
                Ok(()) => {
                    debug!(family = %font.family, style = %font.style, "registered font");
                    target.fonts.mark_loaded(&key);
                }
                Err(e) => warn!(family = %font.family, %e, "font registration failed"),
            }
        }

        target.fonts.mark_system_loaded();
    }

    fn process_element(
        &self,
        backend: &mut B,
        element: &Element,
        fields: &HashMap<String, Value>,
        ctx: &mut RenderContext,
    ) -> Result<(), FacturaError> {
        // Parse-time validation already ran, but cached sequences and
        // caller-constructed elements go through here too.
        element.validate()?;

        if element.is_loop() {
            return self.process_loop(backend, element, fields, ctx);
        }

        let y = element.position.y;
        match element.kind {
            ElementKind::Text => {
                let text = resolve::resolve(&element.text, &element.variable_name, fields);
                self.draw_text(backend, element, &text, y)
            }
            ElementKind::Box => {
                self.draw_box(backend, element, y);
                Ok(())
            }
            ElementKind::Image => self.draw_image(backend, element, fields, y),
            ElementKind::Qr => {
                let content = resolve::special_content(
                    &element.qr_content,
                    &element.text,
                    &element.variable_name,
                    fields,
                );
                self.draw_qr(backend, element, &content, y)
            }
            ElementKind::Barcode => {
                let content = resolve::special_content(
                    &element.barcode_content,
                    &element.text,
                    &element.variable_name,
                    fields,
                );
                self.draw_barcode(backend, element, &content, y)
            }
            ElementKind::Table => {
                warn!("table elements are not yet implemented; skipping");
                Ok(())
            }
        }
    }

    /// Render a repeating element once per item of its bound array,
    /// advancing Y between items and recording the final position in the
    /// render's ledger.
    fn process_loop(
        &self,
        backend: &mut B,
        element: &Element,
        fields: &HashMap<String, Value>,
        ctx: &mut RenderContext,
    ) -> Result<(), FacturaError> {
        let (array_name, field_name) = element.loop_parts().ok_or_else(|| {
            FacturaError::Render(format!("invalid loopField format: {}", element.loop_field))
        })?;

        let items = match fields.get(array_name) {
            Some(Value::List(items)) => items,
            Some(_) => {
                return Err(FacturaError::Render(format!(
                    "field is not an array: {}",
                    array_name
                )));
            }
            None => {
                return Err(FacturaError::Render(format!(
                    "array field not found: {}",
                    array_name
                )));
            }
        };

        let mut current_y = ctx.loop_start_y(array_name, element.position.y);

        for (index, item) in items.iter().enumerate() {
            // Round to one decimal to keep accumulated float drift from
            // opening gaps between items.
            current_y = round_tenth(current_y);

            let field_text = resolve::array_field_text(item, field_name);
            let text = resolve::resolve_loop_item(
                &element.text,
                &element.loop_field,
                &field_text,
                array_name,
                fields,
            );

            if let Err(e) = self.draw_loop_item(backend, element, fields, &text, current_y) {
                warn!(index, %e, "loop item skipped");
            }

            // Wrapped text height is backend-computed, so the advance comes
            // from the cursor; single-line advance is the declared height.
            current_y = if element.method == DrawMethod::MultiCell
                && element.kind == ElementKind::Text
            {
                backend.cursor_y() + LOOP_SPACING
            } else {
                current_y + element.size.height + LOOP_SPACING
            };
        }

        ctx.record_loop_end(array_name, current_y);
        Ok(())
    }

    /// Draw one loop iteration at the given Y. Text kinds receive the
    /// item-resolved text; QR/barcode use their literal content if set,
    /// else the item text.
    fn draw_loop_item(
        &self,
        backend: &mut B,
        element: &Element,
        fields: &HashMap<String, Value>,
        text: &str,
        y: f64,
    ) -> Result<(), FacturaError> {
        match element.kind {
            ElementKind::Text => self.draw_text(backend, element, text, y),
            ElementKind::Box => {
                self.draw_box(backend, element, y);
                Ok(())
            }
            ElementKind::Image => self.draw_image(backend, element, fields, y),
            ElementKind::Qr => {
                let content = if element.qr_content.is_empty() {
                    text
                } else {
                    element.qr_content.as_str()
                };
                self.draw_qr(backend, element, content, y)
            }
            ElementKind::Barcode => {
                let content = if element.barcode_content.is_empty() {
                    text
                } else {
                    element.barcode_content.as_str()
                };
                self.draw_barcode(backend, element, content, y)
            }
            ElementKind::Table => {
                warn!("table elements are not yet implemented; skipping");
                Ok(())
            }
        }
    }

    fn draw_text(
        &self,
        backend: &mut B,
        element: &Element,
        text: &str,
        y: f64,
    ) -> Result<(), FacturaError> {
        self.set_element_font(backend, element);
        if element.style.text_color.is_set {
            backend.set_text_color(rgb(element.style.text_color));
        }

        with_rotation(backend, element, y, |backend| {
            backend.set_xy(element.position.x, y);
            match element.method {
                DrawMethod::MultiCell => {
                    let line_height = element.style.font.size * 0.5;
                    backend.multi_cell(
                        element.size.width,
                        line_height,
                        text,
                        &element.style.border,
                        element.style.align,
                    );
                }
                _ => backend.cell(
                    element.size.width,
                    element.size.height,
                    text,
                    &element.style.border,
                    element.style.align,
                ),
            }
            Ok(())
        })
    }

    fn draw_box(&self, backend: &mut B, element: &Element, y: f64) {
        if element.style.text_color.is_set {
            backend.set_draw_color(rgb(element.style.text_color));
        }
        if element.style.background.is_set {
            backend.set_fill_color(rgb(element.style.background));
        }
        backend.set_line_width(BOX_LINE_WIDTH);
        backend.rect(
            element.position.x,
            y,
            element.size.width,
            element.size.height,
            element.style.background.is_set,
        );
    }

    fn draw_image(
        &self,
        backend: &mut B,
        element: &Element,
        fields: &HashMap<String, Value>,
        y: f64,
    ) -> Result<(), FacturaError> {
        let path = if !element.style.image_src.is_empty() {
            element.style.image_src.clone()
        } else {
            fields
                .get(element.variable_name.as_str())
                .map(Value::render)
                .unwrap_or_default()
        };

        if path.is_empty() {
            return Err(FacturaError::Render("image path not specified".into()));
        }
        let path = Path::new(&path);
        if !path.exists() {
            return Err(FacturaError::Render(format!(
                "image file not found: {}",
                path.display()
            )));
        }

        backend.image(
            path,
            element.position.x,
            y,
            element.size.width,
            element.size.height,
        )
    }

    fn draw_qr(
        &self,
        backend: &mut B,
        element: &Element,
        content: &str,
        y: f64,
    ) -> Result<(), FacturaError> {
        if content.is_empty() {
            return Err(FacturaError::Render("QR content is empty".into()));
        }
        let png = encode::encode_qr(content)?;
        debug!(len = content.len(), "generated QR code");
        self.place_raster(backend, element, y, &png, "qr_")
    }

    fn draw_barcode(
        &self,
        backend: &mut B,
        element: &Element,
        content: &str,
        y: f64,
    ) -> Result<(), FacturaError> {
        if content.is_empty() {
            return Err(FacturaError::Render("barcode content is empty".into()));
        }
        let png = encode::encode_barcode(
            content,
            element.barcode_format,
            (element.size.width * BARCODE_PX_PER_UNIT) as u32,
            (element.size.height * BARCODE_PX_PER_UNIT) as u32,
        )?;
        debug!(format = element.barcode_format.name(), "generated barcode");
        self.place_raster(backend, element, y, &png, "barcode_")
    }

    /// Write PNG bytes to a scoped temp file and place it through the
    /// image primitive. The file is removed when this returns — on the
    /// error paths too.
    fn place_raster(
        &self,
        backend: &mut B,
        element: &Element,
        y: f64,
        png: &[u8],
        prefix: &str,
    ) -> Result<(), FacturaError> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".png")
            .tempfile_in(&self.config.temp_dir)?;
        file.write_all(png)?;
        file.flush()?;

        backend.image(
            file.path(),
            element.position.x,
            y,
            element.size.width,
            element.size.height,
        )
    }

    fn set_element_font(&self, backend: &mut B, element: &Element) {
        let family = if element.style.font.family.is_empty() {
            &self.config.default_family
        } else {
            &element.style.font.family
        };
        // Caller-constructed elements may carry a zero size; the parser's
        // default applies here too.
        let size = if element.style.font.size == 0.0 {
            DEFAULT_FONT_SIZE
        } else {
            element.style.font.size
        };
        backend.set_font(family, &element.style.font.style, size);
    }
}

/// Run `draw` inside a rotation scope when the element is rotated; begin
/// and end are always paired, error paths included.
fn with_rotation<B: Backend>(
    backend: &mut B,
    element: &Element,
    y: f64,
    draw: impl FnOnce(&mut B) -> Result<(), FacturaError>,
) -> Result<(), FacturaError> {
    if element.style.rotate_degree == 0 {
        return draw(backend);
    }

    let (pivot_x, pivot_y) = rotation_pivot(element, y);
    backend.begin_rotation(element.style.rotate_degree as f64, pivot_x, pivot_y);
    let result = draw(backend);
    backend.end_rotation();
    result
}

/// The rotation pivot point for an element drawn at `y`.
fn rotation_pivot(element: &Element, y: f64) -> (f64, f64) {
    let x = element.position.x;
    let (w, h) = (element.size.width, element.size.height);
    match element.style.rotate_anchor {
        RotateAnchor::LeftEdge => (x, y + h / 2.0),
        RotateAnchor::TopEdge => (x + w / 2.0, y),
        RotateAnchor::Center => (x + w / 2.0, y + h / 2.0),
    }
}

fn rgb(color: Color) -> Rgb {
    Rgb::new(color.r, color.g, color.b)
}

fn round_tenth(y: f64) -> f64 {
    (y * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::element::{Align, Position, Size};
    use pretty_assertions::assert_eq;

    fn generator() -> Generator<TraceBackend> {
        Generator::new(GeneratorConfig::default(), || Ok(TraceBackend::new()))
    }

    fn data(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    fn text_element(text: &str, y: f64, height: f64) -> Element {
        Element {
            text: text.into(),
            position: Position { x: 10.0, y },
            size: Size {
                width: 80.0,
                height,
            },
            ..Default::default()
        }
    }

    /// Render and hand back the recorded ops by running against a bare
    /// trace backend (bypassing the pool so the ops survive).
    fn render_ops(generator: &Generator<TraceBackend>, elements: &[Element], data: &Value) -> Vec<DrawOp> {
        let empty = HashMap::new();
        let fields = data.as_map().unwrap_or(&empty);
        let mut target = PooledTarget {
            backend: TraceBackend::new(),
            fonts: FontCache::new(),
        };
        generator
            .render_document(&mut target, elements, fields)
            .unwrap();
        target.backend.ops().to_vec()
    }

    fn cells(ops: &[DrawOp]) -> Vec<(String, f64)> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Cell { text, y, .. } => Some((text.clone(), *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_generate_produces_magic_header() {
        let generator = generator();
        let elements = vec![text_element("hello", 20.0, 8.0)];
        let bytes = generator.generate(&elements, &data("{}")).unwrap();
        assert!(bytes.starts_with(TRACE_MAGIC));
    }

    #[test]
    fn test_invoice_example() {
        // One bound text element plus one loop element over two items.
        let generator = generator();
        let mut header = text_element("Invoice: {{invoiceNumber}}", 20.0, 8.0);
        header.variable_name = "invoiceNumber".into();
        let mut lines = text_element("{{items.description}}", 40.0, 10.0);
        lines.loop_field = "items.description".into();

        let ops = render_ops(
            &generator,
            &[header, lines],
            &data(r#"{"invoiceNumber": "INV-1", "items": [{"description": "A"}, {"description": "B"}]}"#),
        );

        assert_eq!(
            cells(&ops),
            vec![
                ("Invoice: INV-1".to_string(), 20.0),
                ("A".to_string(), 40.0),
                ("B".to_string(), 52.0),
            ]
        );
    }

    #[test]
    fn test_loop_draws_once_per_item_with_fixed_spacing() {
        let generator = generator();
        let mut el = text_element("{{items.n}}", 30.0, 5.0);
        el.loop_field = "items.n".into();
        let ops = render_ops(
            &generator,
            &[el],
            &data(r#"{"items": [{"n": 1}, {"n": 2}, {"n": 3}, {"n": 4}]}"#),
        );

        let drawn = cells(&ops);
        assert_eq!(drawn.len(), 4);
        for (index, (text, y)) in drawn.iter().enumerate() {
            assert_eq!(text, &(index + 1).to_string());
            assert_eq!(*y, 30.0 + index as f64 * 7.0);
        }
    }

    #[test]
    fn test_loop_multicell_advances_from_cursor() {
        let generator = generator();
        let mut el = text_element("{{items.n}}", 30.0, 5.0);
        el.loop_field = "items.n".into();
        el.method = DrawMethod::MultiCell;
        el.style.font.size = 10.0;
        let ops = render_ops(
            &generator,
            &[el],
            &data(r#"{"items": [{"n": "one\ntwo"}, {"n": "three"}]}"#),
        );

        let ys: Vec<f64> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::MultiCell { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        // First item at 30; two lines of height 5 advance the cursor to 40,
        // plus 2 spacing → second item at 42.
        assert_eq!(ys, vec![30.0, 42.0]);
    }

    #[test]
    fn test_second_loop_over_same_array_continues_from_ledger() {
        let generator = generator();
        let mut texts = text_element("{{items.n}}", 30.0, 5.0);
        texts.loop_field = "items.n".into();
        let mut boxes = text_element("", 30.0, 5.0);
        boxes.kind = ElementKind::Box;
        boxes.method = DrawMethod::Rect;
        boxes.loop_field = "items.n".into();

        let ops = render_ops(
            &generator,
            &[texts, boxes],
            &data(r#"{"items": [{"n": 1}, {"n": 2}]}"#),
        );

        let rect_ys: Vec<f64> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        // Text loop ends at 30 + 7 + 7 = 44; boxes continue there.
        assert_eq!(rect_ys, vec![44.0, 51.0]);
    }

    #[test]
    fn test_loop_over_missing_array_skips_element_only() {
        let generator = generator();
        let mut looped = text_element("{{items.n}}", 30.0, 5.0);
        looped.loop_field = "items.n".into();
        let after = text_element("after", 60.0, 8.0);

        let ops = render_ops(&generator, &[looped, after], &data("{}"));
        assert_eq!(cells(&ops), vec![("after".to_string(), 60.0)]);
    }

    #[test]
    fn test_loop_over_non_list_skips_element_only() {
        let generator = generator();
        let mut looped = text_element("{{items.n}}", 30.0, 5.0);
        looped.loop_field = "items.n".into();

        let ops = render_ops(&generator, &[looped], &data(r#"{"items": "scalar"}"#));
        assert!(cells(&ops).is_empty());
    }

    #[test]
    fn test_rotation_ops_are_paired() {
        let generator = generator();
        let mut el = text_element("tilted", 20.0, 8.0);
        el.style.rotate_degree = 90;
        let ops = render_ops(&generator, &[el], &data("{}"));

        let begins = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::BeginRotation { .. }))
            .count();
        let ends = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::EndRotation))
            .count();
        assert_eq!(begins, 1);
        assert_eq!(ends, 1);

        // Center anchor: pivot at element center.
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::BeginRotation { degrees, pivot_x, pivot_y }
                if *degrees == 90.0 && *pivot_x == 50.0 && *pivot_y == 24.0
        )));
    }

    #[test]
    fn test_invalid_element_skipped_without_aborting() {
        let generator = generator();
        let mut bad = text_element("bad", 20.0, 8.0);
        bad.size.width = 0.0;
        let good = text_element("good", 40.0, 8.0);

        let ops = render_ops(&generator, &[bad, good], &data("{}"));
        assert_eq!(cells(&ops), vec![("good".to_string(), 40.0)]);
    }

    #[test]
    fn test_missing_image_skipped_without_aborting() {
        let generator = generator();
        let mut img = text_element("", 20.0, 8.0);
        img.kind = ElementKind::Image;
        img.style.image_src = "/no/such/image.png".into();
        let after = text_element("after", 40.0, 8.0);

        let ops = render_ops(&generator, &[img, after], &data("{}"));
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
        assert_eq!(cells(&ops), vec![("after".to_string(), 40.0)]);
    }

    #[test]
    fn test_box_filled_only_with_background() {
        let generator = generator();
        let mut outline = text_element("", 20.0, 8.0);
        outline.kind = ElementKind::Box;
        let mut filled = outline.clone();
        filled.style.background = Color {
            r: 200,
            g: 200,
            b: 200,
            is_set: true,
        };

        let ops = render_ops(&generator, &[outline, filled], &data("{}"));
        let fills: Vec<bool> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { filled, .. } => Some(*filled),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![false, true]);
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::SetFillColor(Rgb { r: 200, g: 200, b: 200 })
        )));
    }

    #[test]
    fn test_qr_placed_via_temp_image() {
        let generator = generator();
        let mut qr = text_element("", 20.0, 30.0);
        qr.kind = ElementKind::Qr;
        qr.size.width = 30.0;
        qr.qr_content = "https://example.com".into();

        let ops = render_ops(&generator, &[qr], &data("{}"));
        let placed = ops.iter().find_map(|op| match op {
            DrawOp::Image { path, width, height, .. } => Some((path.clone(), *width, *height)),
            _ => None,
        });
        let (path, width, height) = placed.expect("QR should place an image");
        assert_eq!((width, height), (30.0, 30.0));
        // The scoped temp artifact is gone once the element is drawn.
        assert!(!path.exists());
    }

    #[test]
    fn test_barcode_empty_content_skipped() {
        let generator = generator();
        let mut barcode = text_element("", 20.0, 12.0);
        barcode.kind = ElementKind::Barcode;
        barcode.variable_name = "code".into();

        // `code` resolves to an empty string.
        let ops = render_ops(&generator, &[barcode], &data(r#"{"code": ""}"#));
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
    }

    #[test]
    fn test_table_is_noop() {
        let generator = generator();
        let mut table = text_element("", 20.0, 8.0);
        table.kind = ElementKind::Table;
        let after = text_element("after", 40.0, 8.0);

        let ops = render_ops(&generator, &[table, after], &data("{}"));
        assert_eq!(cells(&ops), vec![("after".to_string(), 40.0)]);
    }

    #[test]
    fn test_non_map_data_renders_with_empty_context() {
        let generator = generator();
        let elements = vec![text_element("{{x}}", 20.0, 8.0)];
        let bytes = generator.generate(&elements, &data("[1, 2]")).unwrap();
        assert!(bytes.starts_with(TRACE_MAGIC));
    }

    #[test]
    fn test_element_font_and_color_applied() {
        let generator = generator();
        let mut el = text_element("styled", 20.0, 8.0);
        el.style.font.family = "Courier".into();
        el.style.font.style = "B".into();
        el.style.font.size = 14.0;
        el.style.text_color = Color {
            r: 10,
            g: 20,
            b: 30,
            is_set: true,
        };
        el.style.align = Align::Right;

        let ops = render_ops(&generator, &[el], &data("{}"));
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::SetFont { family, style, size }
                if family == "Courier" && style == "B" && *size == 14.0
        )));
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::SetTextColor(Rgb { r: 10, g: 20, b: 30 })
        )));
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::Cell { align: Align::Right, .. }
        )));
    }

    #[test]
    fn test_empty_font_family_uses_config_default() {
        let generator = generator();
        let el = text_element("plain", 20.0, 8.0);
        let ops = render_ops(&generator, &[el], &data("{}"));
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::SetFont { family, .. } if family == "Tahoma"
        )));
    }

    #[test]
    fn test_pool_reuse_across_generates() {
        let generator = generator();
        let elements = vec![text_element("hello", 20.0, 8.0)];
        generator.generate(&elements, &data("{}")).unwrap();
        assert_eq!(generator.pool.idle_count(), 1);
        generator.generate(&elements, &data("{}")).unwrap();
        assert_eq!(generator.pool.idle_count(), 1);
    }
}
