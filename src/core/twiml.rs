//! Minimal TwiML response builder
//!
//! The telephony provider drives a call by POSTing webhooks and executing the
//! TwiML document returned from each one. The gateway only ever emits four
//! verbs - `Say`, `Gather` (speech collection), `Dial` and `Redirect` - so a
//! small purpose-built serializer is used instead of a generic XML crate.
//! All text content and attribute values are XML-escaped.

use axum::http::header;
use axum::response::{IntoResponse, Response};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A single TwiML verb
#[derive(Debug, Clone, PartialEq)]
pub enum Verb {
    /// Speak text to the caller
    Say(String),
    /// Collect speech input and POST the result to `action`
    Gather {
        say: String,
        action: String,
        timeout_seconds: u32,
    },
    /// Connect the caller to another number
    Dial(String),
    /// Continue call flow at another webhook
    Redirect(String),
}

/// TwiML `<Response>` document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Twiml {
    verbs: Vec<Verb>,
    /// Optional TTS voice applied to every `Say` in the document
    voice: Option<String>,
}

impl Twiml {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document whose `Say` verbs carry a provider voice selection
    pub fn with_voice(voice: Option<String>) -> Self {
        Self {
            verbs: Vec::new(),
            voice,
        }
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    /// Speech gather with the provider defaults used throughout the gateway:
    /// five second timeout, automatic end-of-speech detection, POST callback.
    pub fn gather_speech(
        mut self,
        prompt: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.verbs.push(Verb::Gather {
            say: prompt.into(),
            action: action.into(),
            timeout_seconds: 5,
        });
        self
    }

    pub fn dial(mut self, number: impl Into<String>) -> Self {
        self.verbs.push(Verb::Dial(number.into()));
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect(url.into()));
        self
    }

    /// Whether the document hands the call to another number
    pub fn has_dial(&self) -> bool {
        self.verbs.iter().any(|v| matches!(v, Verb::Dial(_)))
    }

    /// Whether the document loops the call back for another turn
    pub fn has_reprompt(&self) -> bool {
        self.verbs
            .iter()
            .any(|v| matches!(v, Verb::Gather { .. } | Verb::Redirect(_)))
    }

    /// Render the document to an XML string
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(XML_HEADER);
        out.push_str("<Response>");
        let say_open = match &self.voice {
            Some(voice) => format!("<Say voice=\"{}\">", escape(voice)),
            None => "<Say>".to_string(),
        };
        for verb in &self.verbs {
            match verb {
                Verb::Say(text) => {
                    out.push_str(&say_open);
                    out.push_str(&escape(text));
                    out.push_str("</Say>");
                }
                Verb::Gather {
                    say,
                    action,
                    timeout_seconds,
                } => {
                    out.push_str(&format!(
                        "<Gather input=\"speech\" timeout=\"{}\" speechTimeout=\"auto\" \
                         action=\"{}\" method=\"POST\">",
                        timeout_seconds,
                        escape(action)
                    ));
                    out.push_str(&say_open);
                    out.push_str(&escape(say));
                    out.push_str("</Say>");
                    out.push_str("</Gather>");
                }
                Verb::Dial(number) => {
                    out.push_str("<Dial>");
                    out.push_str(&escape(number));
                    out.push_str("</Dial>");
                }
                Verb::Redirect(url) => {
                    out.push_str("<Redirect method=\"POST\">");
                    out.push_str(&escape(url));
                    out.push_str("</Redirect>");
                }
            }
        }
        out.push_str("</Response>");
        out
    }
}

impl IntoResponse for Twiml {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
            self.to_xml(),
        )
            .into_response()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
