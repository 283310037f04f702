//! # Factura - Template-Driven Invoice & Receipt Generator
//!
//! Factura renders documents (invoices, receipts) from declarative,
//! row-based CSV templates bound at render time to request-supplied data.
//! It provides:
//!
//! - **Template model**: typed, validated drawing elements parsed from CSV
//! - **Variable resolution**: `{{placeholder}}` binding with array-driven
//!   repetition (loop elements with automatic position advance)
//! - **Template cache**: modification-time and TTL invalidation, LRU
//!   eviction, background sweep
//! - **Resource pooling**: render targets reused across requests under a
//!   reset-or-discard contract
//!
//! Drawing itself is delegated to a pluggable [`render::Backend`]; the
//! in-crate [`render::TraceBackend`] records every primitive for tests and
//! debugging.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use factura::render::TraceBackend;
//! use factura::{Generator, GeneratorConfig, TemplateCache, Value};
//!
//! // Parse (and cache) a CSV template.
//! let cache = TemplateCache::new(100, Duration::from_secs(30 * 60));
//! let elements = cache.fetch("./assets/invoice_template.csv")?;
//!
//! // The per-request data context.
//! let data: Value = serde_json::from_str(
//!     r#"{"invoiceNumber": "INV-001", "items": [{"description": "Widget"}]}"#,
//! )?;
//!
//! // Render through a backend; swap the factory for a real PDF writer.
//! let generator = Generator::new(GeneratorConfig::default(), || Ok(TraceBackend::new()));
//! let bytes = generator.generate(&elements, &data)?;
//! # let _ = bytes;
//! # Ok::<(), factura::FacturaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Element model, CSV parser, template cache |
//! | [`render`] | Generator, backend trait, resolution, pooling |
//! | [`value`] | Dynamically-typed data context |
//! | [`config`] | Generator configuration |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod render;
pub mod template;
pub mod value;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use error::FacturaError;
pub use render::Generator;
pub use template::TemplateCache;
pub use value::Value;
