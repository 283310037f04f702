//! Render context — per-render state threaded through element processing.
//!
//! One `RenderContext` is created inside each `generate` call and passed by
//! mutable reference down the element-processing path, so two concurrent
//! renders over the same template can never see each other's loop positions.
//! It is discarded when the render returns.

use std::collections::HashMap;

/// Render-scoped mutable state.
///
/// Currently this is the loop position ledger: the final advanced Y of each
/// looped array, so a later element looping over the same array continues
/// below the rows already drawn instead of overlapping them.
#[derive(Debug, Default)]
pub struct RenderContext {
    last_y: HashMap<String, f64>,
}

impl RenderContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The Y a loop over `array` should start at: where a previous loop
    /// over the same array left off, or the element's declared Y.
    pub fn loop_start_y(&self, array: &str, declared_y: f64) -> f64 {
        self.last_y.get(array).copied().unwrap_or(declared_y)
    }

    /// Record where a loop over `array` ended.
    pub fn record_loop_end(&mut self, array: &str, y: f64) {
        self.last_y.insert(array.to_string(), y);
    }
}
