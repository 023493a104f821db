//! Composes datastar SSE responses for the UI controls.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements, PatchSignals};

#[derive(Default)]
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Swap the element matched by `selector` for `html`.
    pub fn push_replace(&mut self, html: String, selector: &str) -> &mut Self {
        self.push_patch(html, selector, ElementPatchMode::Replace)
    }

    pub fn push_script(&mut self, script: String) -> &mut Self {
        let event = ExecuteScript::new(script).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Queue a signal patch. `payload` must be a JSON object.
    pub fn push_signals(&mut self, payload: &str) -> &mut Self {
        let event = PatchSignals::new(payload).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Ask the browser to navigate to `path`.
    pub fn push_redirect(&mut self, path: &str) -> &mut Self {
        let target = serde_json::to_string(path).unwrap_or_else(|_| "\"/\"".to_string());
        self.push_script(format!("window.location.assign({target});"))
    }

    /// Hand the queued events over, for responses that stream in stages.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn into_response(self) -> Response {
        let events = self.events;
        let stream = stream! {
            for event in events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}
