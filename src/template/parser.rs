//! CSV template parsing.
//!
//! A template is a header row naming columns, followed by one data row per
//! element. Column order is irrelevant; column presence drives behavior.
//! Parsing is deliberately forgiving: a malformed row or an element that
//! fails validation is logged and skipped, and a bad numeric field becomes
//! `0` with a warning. Only an unreadable file or header fails the parse.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::FacturaError;
use crate::template::element::{
    Align, BarcodeFormat, Color, DrawMethod, Element, ElementKind, FontSpec, Position,
    RotateAnchor, Size, Style, TableColumn,
};

/// Font size applied when the template leaves `fontSize` unset or zero.
pub const DEFAULT_FONT_SIZE: f64 = 10.0;

/// Parse a CSV template file into an ordered element sequence.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Element>, FacturaError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| FacturaError::Template(format!("error opening {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "parsing CSV template");
    parse_reader(file)
}

/// Parse CSV template data from any reader (dynamic templates, tests).
///
/// Performs no caching; [`TemplateCache::fetch`](crate::TemplateCache::fetch)
/// is the cached entry point for file-backed templates.
pub fn parse_reader<R: Read>(reader: R) -> Result<Vec<Element>, FacturaError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| FacturaError::Template(format!("error reading CSV headers: {}", e)))?
        .clone();
    if headers.is_empty() {
        return Err(FacturaError::Template("template has no header row".into()));
    }

    let mut elements = Vec::new();
    // Header occupies row 1; data rows are numbered from 2 for log messages.
    let mut row = 1usize;

    for record in rdr.records() {
        row += 1;
        let record = record
            .map_err(|e| FacturaError::Template(format!("error reading CSV row {}: {}", row, e)))?;

        if record.len() != headers.len() {
            warn!(
                row,
                expected = headers.len(),
                got = record.len(),
                "row has incorrect number of columns; skipping"
            );
            continue;
        }

        let fields: HashMap<&str, &str> = headers.iter().zip(record.iter()).collect();
        let element = element_from_row(&fields, row);

        if let Err(e) = element.validate() {
            warn!(row, %e, "invalid element; skipping");
            continue;
        }

        debug!(row, kind = ?element.kind, "created element");
        elements.push(element);
    }

    Ok(elements)
}

/// Build an element from one row's column map. Never fails: numeric fields
/// degrade to zero and enum-ish fields fall back to their defaults.
fn element_from_row(fields: &HashMap<&str, &str>, row: usize) -> Element {
    let col = |name: &str| -> &str { fields.get(name).copied().unwrap_or("") };

    let method = DrawMethod::parse(col("method"));
    let kind = ElementKind::parse(col("type")).unwrap_or_else(|| ElementKind::infer(method));

    let font_size = parse_f64(col("fontSize"), "fontSize", row);
    let text_color_set =
        !col("colorR").is_empty() || !col("colorG").is_empty() || !col("colorB").is_empty();

    Element {
        kind,
        method,
        text: col("text").to_string(),
        variable_name: col("variableName").to_string(),
        loop_field: col("loopField").to_string(),
        position: Position {
            x: parse_f64(col("x"), "x", row),
            y: parse_f64(col("y"), "y", row),
        },
        size: Size {
            width: parse_f64(col("width"), "width", row),
            height: parse_f64(col("height"), "height", row),
        },
        style: Style {
            font: FontSpec {
                family: col("font").to_string(),
                style: col("fontStyle").to_string(),
                size: if font_size == 0.0 {
                    DEFAULT_FONT_SIZE
                } else {
                    font_size
                },
            },
            border: col("border").to_string(),
            align: Align::parse(col("align")),
            rotate_degree: parse_i32(col("rotateDegree"), "rotateDegree", row),
            rotate_anchor: RotateAnchor::parse(col("rotateType")),
            text_color: Color {
                r: parse_channel(col("colorR"), "colorR", row),
                g: parse_channel(col("colorG"), "colorG", row),
                b: parse_channel(col("colorB"), "colorB", row),
                is_set: text_color_set,
            },
            background: Color {
                r: parse_channel(col("bgColorR"), "bgColorR", row),
                g: parse_channel(col("bgColorG"), "bgColorG", row),
                b: parse_channel(col("bgColorB"), "bgColorB", row),
                is_set: col("background") == "1",
            },
            image_src: col("imageSrc").to_string(),
        },
        qr_content: col("qrContent").to_string(),
        barcode_format: BarcodeFormat::parse(col("barcodeFormat")),
        barcode_content: col("barcodeContent").to_string(),
        columns: parse_columns(col("columns"), row),
    }
}

/// Parse table column definitions from the compact
/// `field1:width1[:align1[:style1]],field2:...` grammar. Entries with
/// fewer than two parts are dropped.
fn parse_columns(spec: &str, row: usize) -> Vec<TableColumn> {
    if spec.is_empty() {
        return Vec::new();
    }

    spec.split(',')
        .filter_map(|part| {
            let parts: Vec<&str> = part.trim().split(':').collect();
            if parts.len() < 2 {
                warn!(row, entry = part, "column entry needs field:width; skipping");
                return None;
            }
            Some(TableColumn {
                field: parts[0].trim().to_string(),
                width: parse_f64(parts[1], "column width", row),
                align: parts.get(2).map(|s| Align::parse(s)).unwrap_or_default(),
                font_style: parts.get(3).map(|s| s.to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

/// Lenient float parse: empty is silently zero, garbage is zero with a
/// warning. A single bad field never fails the template.
fn parse_f64(s: &str, column: &str, row: usize) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(row, column, value = s, "unparsable number; using 0");
            0.0
        }
    }
}

/// Lenient integer parse with the same degradation rules as [`parse_f64`].
fn parse_i32(s: &str, column: &str, row: usize) -> i32 {
    if s.is_empty() {
        return 0;
    }
    match s.parse::<i32>() {
        Ok(v) => v,
        Err(_) => {
            warn!(row, column, value = s, "unparsable integer; using 0");
            0
        }
    }
}

/// Lenient color channel parse, clamped to 0..=255.
fn parse_channel(s: &str, column: &str, row: usize) -> u8 {
    parse_i32(s, column, row).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "type,method,text,variableName,loopField,x,y,width,height,font,fontStyle,fontSize,border,align,colorR,colorG,colorB,background,bgColorR,bgColorG,bgColorB,rotateDegree,rotateType,imageSrc,qrContent,barcodeFormat,barcodeContent,columns";

    /// Build a full-width CSV row from `(column, value)` overrides, quoting
    /// values that contain commas.
    fn row(overrides: &[(&str, &str)]) -> String {
        HEADER
            .split(',')
            .map(|h| {
                let v = overrides
                    .iter()
                    .find(|(k, _)| *k == h)
                    .map(|(_, v)| *v)
                    .unwrap_or("");
                if v.contains(',') || v.contains('"') {
                    format!("\"{}\"", v.replace('"', "\"\""))
                } else {
                    v.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn parse_rows(rows: &[String]) -> Vec<Element> {
        let data = format!("{}\n{}", HEADER, rows.join("\n"));
        parse_reader(data.as_bytes()).unwrap()
    }

    fn geometry() -> Vec<(&'static str, &'static str)> {
        vec![("x", "1"), ("y", "1"), ("width", "10"), ("height", "10")]
    }

    #[test]
    fn test_basic_text_row() {
        let elements = parse_rows(&[row(&[
            ("type", "text"),
            ("method", "Cell"),
            ("text", "Invoice"),
            ("x", "10"),
            ("y", "20"),
            ("width", "90"),
            ("height", "8"),
            ("font", "Tahoma"),
            ("fontStyle", "B"),
            ("fontSize", "12"),
            ("align", "left"),
        ])]);
        assert_eq!(elements.len(), 1);
        let el = &elements[0];
        assert_eq!(el.kind, ElementKind::Text);
        assert_eq!(el.method, DrawMethod::Cell);
        assert_eq!(el.text, "Invoice");
        assert_eq!(el.position.x, 10.0);
        assert_eq!(el.size.height, 8.0);
        assert_eq!(el.style.font.family, "Tahoma");
        assert_eq!(el.style.font.style, "B");
        assert_eq!(el.style.font.size, 12.0);
        assert_eq!(el.style.align, Align::Left);
        assert!(!el.style.text_color.is_set);
    }

    #[test]
    fn test_kind_inferred_from_method() {
        let mut cols = geometry();
        cols.push(("method", "Rect"));
        assert_eq!(parse_rows(&[row(&cols)])[0].kind, ElementKind::Box);

        let mut cols = geometry();
        cols.push(("method", "MultiCell"));
        cols.push(("text", "hi"));
        let elements = parse_rows(&[row(&cols)]);
        assert_eq!(elements[0].kind, ElementKind::Text);
        assert_eq!(elements[0].method, DrawMethod::MultiCell);
    }

    #[test]
    fn test_unknown_type_and_method_defaults_to_text() {
        let mut cols = geometry();
        cols.push(("type", "wibble"));
        cols.push(("method", "Wobble"));
        let elements = parse_rows(&[row(&cols)]);
        assert_eq!(elements[0].kind, ElementKind::Text);
        assert_eq!(elements[0].method, DrawMethod::Cell);
    }

    #[test]
    fn test_mismatched_column_count_skips_row() {
        let mut cols = geometry();
        cols.push(("text", "kept"));
        let data = format!("{}\ntext,Cell,short row\n{}", HEADER, row(&cols));
        let elements = parse_reader(data.as_bytes()).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text, "kept");
    }

    #[test]
    fn test_unparsable_numeric_degrades_to_zero() {
        // width "abc" becomes 0, which then fails validation, dropping the
        // element but not the parse.
        let bad = row(&[("x", "1"), ("y", "1"), ("width", "abc"), ("height", "10")]);
        let mut cols = geometry();
        cols.push(("text", "good"));
        let elements = parse_rows(&[bad, row(&cols)]);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text, "good");
    }

    #[test]
    fn test_font_size_defaults_to_ten() {
        let elements = parse_rows(&[row(&geometry())]);
        assert_eq!(elements[0].style.font.size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_text_color_set_flag() {
        let mut cols = geometry();
        cols.extend([("colorR", "255"), ("colorG", "0"), ("colorB", "0")]);
        let color = parse_rows(&[row(&cols)])[0].style.text_color;
        assert!(color.is_set);
        assert_eq!((color.r, color.g, color.b), (255, 0, 0));
    }

    #[test]
    fn test_background_set_only_by_flag_column() {
        let mut cols = geometry();
        cols.extend([
            ("type", "box"),
            ("method", "Rect"),
            ("background", "1"),
            ("bgColorR", "200"),
        ]);
        assert!(parse_rows(&[row(&cols)])[0].style.background.is_set);

        let mut cols = geometry();
        cols.extend([("type", "box"), ("method", "Rect"), ("bgColorR", "200")]);
        assert!(!parse_rows(&[row(&cols)])[0].style.background.is_set);
    }

    #[test]
    fn test_invalid_element_skipped_not_fatal() {
        // QR without content or variable fails validation.
        let mut qr = geometry();
        qr.push(("type", "qr"));
        let mut ok = geometry();
        ok.push(("text", "ok"));
        let elements = parse_rows(&[row(&qr), row(&ok)]);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text, "ok");
    }

    #[test]
    fn test_columns_grammar() {
        let mut cols = geometry();
        cols.push(("type", "table"));
        cols.push(("columns", "description:60:left:B,amount:40:right"));
        let elements = parse_rows(&[row(&cols)]);
        let columns = &elements[0].columns;
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].field, "description");
        assert_eq!(columns[0].width, 60.0);
        assert_eq!(columns[0].align, Align::Left);
        assert_eq!(columns[0].font_style, "B");
        assert_eq!(columns[1].align, Align::Right);
        assert_eq!(columns[1].font_style, "");
    }

    #[test]
    fn test_header_only_template_is_empty() {
        let elements = parse_reader(HEADER.as_bytes()).unwrap();
        assert!(elements.is_empty());
    }

    #[test]
    fn test_empty_input_fails_structurally() {
        assert!(parse_reader(&b""[..]).is_err());
    }

    #[test]
    fn test_barcode_format_column() {
        let mut cols = geometry();
        cols.extend([
            ("type", "barcode"),
            ("method", "Barcode"),
            ("barcodeFormat", "code39"),
            ("barcodeContent", "123"),
        ]);
        let elements = parse_rows(&[row(&cols)]);
        assert_eq!(elements[0].barcode_format, BarcodeFormat::Code39);
        assert_eq!(elements[0].barcode_content, "123");
    }

    #[test]
    fn test_loop_field_carried() {
        let mut cols = geometry();
        cols.push(("text", "{{items.description}}"));
        cols.push(("loopField", "items.description"));
        let elements = parse_rows(&[row(&cols)]);
        assert!(elements[0].is_loop());
        assert_eq!(
            elements[0].loop_parts(),
            Some(("items", "description"))
        );
    }
}
