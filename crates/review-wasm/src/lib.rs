//! WASM module for the tutorial's browser UI.
//!
//! Wraps the review scheduler so the page can drive it directly. Every call
//! returns JSON; failures come back as `{"error": "...", "kind": "..."}`.
//! Persistence stays with the page: it passes `save()` output to
//! localStorage and hands it back to `load()` on startup.

use wasm_bindgen::prelude::*;
use serde::Serialize;

use dp_review::{ItemKind, Scheduler, SchedulerError};

#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

/// Serialize a scheduler result, or describe its error
fn respond<T: Serialize>(result: Result<T, SchedulerError>) -> String {
    match result {
        Ok(value) => match serde_json::to_string(&value) {
            Ok(json) => json,
            Err(e) => error_json("InvalidArgument", &format!("Failed to serialize result: {}", e)),
        },
        Err(e) => error_json(error_kind(&e), &e.to_string()),
    }
}

fn error_kind(err: &SchedulerError) -> &'static str {
    match err {
        SchedulerError::NotFound(_) => "NotFound",
        SchedulerError::AlreadyExists(_) => "AlreadyExists",
        SchedulerError::InvalidArgument(_) => "InvalidArgument",
        SchedulerError::Storage(_) => "StorageError",
    }
}

fn error_json(kind: &str, message: &str) -> String {
    serde_json::json!({ "error": message, "kind": kind }).to_string()
}

// ============================================================================
// WASM Exports
// ============================================================================

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();
}

/// Scheduler instance owned by the page
#[wasm_bindgen]
pub struct ReviewScheduler {
    inner: Scheduler,
}

#[wasm_bindgen]
impl ReviewScheduler {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { inner: Scheduler::new() }
    }

    /// Replace the collection with stored JSON (legacy records are upgraded).
    ///
    /// Returns `{"loaded": n}`.
    pub fn load(&mut self, raw: &str) -> String {
        let result = self.inner.load(raw).map(|()| serde_json::json!({ "loaded": self.inner.len() }));
        respond(result)
    }

    /// Serialized collection, ready for localStorage.
    /// On failure returns the error JSON instead.
    pub fn save(&self) -> String {
        match self.inner.save() {
            Ok(raw) => raw,
            Err(e) => error_json(error_kind(&e), &e.to_string()),
        }
    }

    /// kind: "chapter" | "exercise" | "concept" | "formula" | "pattern"
    ///
    /// Returns the new item.
    #[wasm_bindgen(js_name = createItem)]
    pub fn create_item(&mut self, id: &str, kind: &str, content: &str) -> String {
        let result = match ItemKind::from_str(kind) {
            Some(kind) => self.inner.create_item(id, kind, content).map(|item| item.clone()),
            None => Err(SchedulerError::invalid(format!("unknown item kind '{}'", kind))),
        };
        respond(result)
    }

    /// quality: 0-5, 3 and above counts as recalled.
    ///
    /// Returns {interval, easeFactor, repetitions, isGraduated, nextDueAt}.
    pub fn review(&mut self, id: &str, quality: u8) -> String {
        respond(self.inner.review(id, quality))
    }

    /// Returns {"interval": n} without changing anything
    #[wasm_bindgen(js_name = previewInterval)]
    pub fn preview_interval(&self, id: &str, quality: u8) -> String {
        let result = self
            .inner
            .preview_interval(id, quality)
            .map(|interval| serde_json::json!({ "interval": interval }));
        respond(result)
    }

    /// Returns [{quality, interval}] for the Again / Hard / Good / Easy buttons
    #[wasm_bindgen(js_name = previewButtons)]
    pub fn preview_buttons(&self, id: &str) -> String {
        respond(self.inner.preview_buttons(id))
    }

    /// Items due now, earliest first
    #[wasm_bindgen(js_name = itemsDueForReview)]
    pub fn items_due_for_review(&self) -> String {
        respond(Ok(self.inner.due_now()))
    }

    /// Next items to come due, earliest first
    pub fn upcoming(&self, limit: usize) -> String {
        let now = self.inner.now();
        respond(Ok(self.inner.upcoming(now, limit)))
    }

    /// Returns the item, or an error if it is unknown
    pub fn item(&self, id: &str) -> String {
        let result = self
            .inner
            .get(id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()));
        respond(result)
    }

    pub fn stats(&self) -> String {
        respond(Ok(self.inner.stats(self.inner.now())))
    }

    /// Stats plus ease bands, weekly activity and accuracy
    pub fn analytics(&self) -> String {
        respond(Ok(self.inner.analytics(self.inner.now())))
    }

    pub fn goals(&self) -> String {
        respond(Ok(self.inner.goals(self.inner.now())))
    }
}

impl Default for ReviewScheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
