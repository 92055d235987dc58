//! Handing rendered content to the response layer.
//!
//! When `emit_response` is enabled in the config and a [`Responder`] is
//! installed on the view, every successful render is passed to the responder
//! after all post-processing. The content is still returned to the caller.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ViewError;

/// Receives rendered view content.
pub trait Responder {
    /// Sends content with the given MIME type.
    fn send(&self, content: &str, content_type: &str) -> Result<(), ViewError>;
}

impl<F> Responder for F
where
    F: Fn(&str, &str) -> Result<(), ViewError>,
{
    fn send(&self, content: &str, content_type: &str) -> Result<(), ViewError> {
        self(content, content_type)
    }
}

/// MIME type for a template suffix. Unknown suffixes are served as HTML.
pub fn content_type_for(suffix: &str) -> &'static str {
    match suffix.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "json" => "application/json",
        "xml" => "text/xml",
        "txt" | "text" => "text/plain",
        "js" => "text/javascript",
        "css" => "text/css",
        _ => "text/html",
    }
}

/// Responder that collects everything sent to it. Useful in tests and for
/// buffering output before writing it elsewhere.
#[derive(Debug, Clone, Default)]
pub struct BufferResponder {
    sent: Rc<RefCell<Vec<(String, String)>>>,
}

impl BufferResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, as `(content, content_type)` pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.borrow().is_empty()
    }
}

impl Responder for BufferResponder {
    fn send(&self, content: &str, content_type: &str) -> Result<(), ViewError> {
        self.sent
            .borrow_mut()
            .push((content.to_string(), content_type.to_string()));
        Ok(())
    }
}
