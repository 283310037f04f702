//! Generator configuration.
//!
//! A plain struct the embedding application fills in from whatever
//! configuration source it uses; the library itself reads no environment
//! and no config files.

use std::path::PathBuf;

/// One font file to register with each render target.
#[derive(Debug, Clone)]
pub struct FontFile {
    /// Family name elements refer to (e.g. `"Tahoma"`).
    pub family: String,
    /// Backend style string (`""` regular, `"B"` bold).
    pub style: String,
    /// File name inside [`GeneratorConfig::font_dir`].
    pub file: String,
}

/// Configuration for a [`Generator`](crate::render::Generator).
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory holding the font files.
    pub font_dir: PathBuf,
    /// Fonts registered on every render target. Files that are missing on
    /// disk are skipped with a warning.
    pub fonts: Vec<FontFile>,
    /// Family used when an element leaves its font unset, and as the
    /// document default.
    pub default_family: String,
    /// Where QR/barcode raster artifacts are written while being placed.
    pub temp_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from("./fonts"),
            fonts: vec![
                FontFile {
                    family: "Tahoma".into(),
                    style: String::new(),
                    file: "tahoma.ttf".into(),
                },
                FontFile {
                    family: "Tahoma".into(),
                    style: "B".into(),
                    file: "tahomabd.ttf".into(),
                },
            ],
            default_family: "Tahoma".into(),
            temp_dir: std::env::temp_dir(),
        }
    }
}
