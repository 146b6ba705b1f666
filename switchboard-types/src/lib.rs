//! Shared types between the translator core and the wire layer
//!
//! These types are the protocol-neutral call-control model: commands,
//! per-family option sets, and normalized outcomes. The wire layer builds
//! a `Command` from a parsed stanza and consumes `TranslatorEvent`s; the
//! translator core never sees XML.
//!
//! Serializable with serde for JSON over whatever transport the wire
//! layer uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Identifiers
// ============================================================================

/// Unique identifier for one active channel on the backend.
///
/// Either backend-assigned (inbound channels) or translator-assigned
/// (originated channels, UUID v4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CallId(pub String);

impl CallId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for one in-flight component (ULID).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A normalized call-control command, independent of wire format.
///
/// The wire layer resolves (tag, namespace) to one of these variants at
/// parse time; the set is closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    /// Play rendered documents to the caller
    Output(OutputOptions),
    /// Run speech/DTMF recognition against grammars
    Input(InputOptions),
    /// Collect bare DTMF digits
    CollectDtmf(DtmfOptions),
    /// Join the call to a conference room
    Conference(ConferenceOptions),
    /// Transmit fax documents
    SendFax(FaxOptions),
    /// Record the call audio
    Record(RecordOptions),
}

impl Command {
    pub fn family(&self) -> CommandFamily {
        match self {
            Command::Output(_) => CommandFamily::Output,
            Command::Input(_) => CommandFamily::Input,
            Command::CollectDtmf(_) => CommandFamily::CollectDtmf,
            Command::Conference(_) => CommandFamily::Conference,
            Command::SendFax(_) => CommandFamily::SendFax,
            Command::Record(_) => CommandFamily::Record,
        }
    }
}

/// Command family tag, used for routing and concurrency policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CommandFamily {
    Output,
    Input,
    CollectDtmf,
    Conference,
    SendFax,
    Record,
}

impl CommandFamily {
    /// Output and input may run concurrently on one call (prompt +
    /// recognition); every other family is exclusive at the call level.
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, CommandFamily::Output | CommandFamily::Input)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandFamily::Output => "output",
            CommandFamily::Input => "input",
            CommandFamily::CollectDtmf => "collect-dtmf",
            CommandFamily::Conference => "conference",
            CommandFamily::SendFax => "send-fax",
            CommandFamily::Record => "record",
        }
    }
}

impl std::fmt::Display for CommandFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Option Sets
// ============================================================================

/// Milliseconds, or -1 meaning "disabled". The uniform domain constraint
/// (-1 or non-negative) is enforced by the translator before any backend
/// operation is issued.
pub type TimeoutMs = i64;

/// Serde default for disabled timeouts.
pub fn disabled() -> TimeoutMs {
    -1
}

/// Options for an output (playback) command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputOptions {
    /// Documents to render, in order
    pub render_documents: Vec<RenderDocument>,
    /// Interrupt rendering on speech/dtmf ("speech", "dtmf", "any")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt_on: Option<String>,
    /// Offset into the first document, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<i64>,
    /// Begin rendering paused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_paused: Option<bool>,
    /// Pause between repeats, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<i64>,
    /// Number of times to repeat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_times: Option<i64>,
    /// Maximum total rendering time, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<i64>,
}

/// One document to render: a URL or an inline value with optional
/// content type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RenderDocument {
    Url { url: String },
    Inline {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
        value: String,
    },
}

/// Options for an input (recognition) command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputOptions {
    /// Grammars to match against; at least one is required
    pub grammars: Vec<GrammarDocument>,
    /// Overall recognition timeout, ms or -1
    #[serde(default = "disabled")]
    pub recognition_timeout: TimeoutMs,
    /// Timeout before any input is detected, ms or -1
    #[serde(default = "disabled")]
    pub initial_timeout: TimeoutMs,
    /// Timeout between DTMF digits, ms or -1
    #[serde(default = "disabled")]
    pub inter_digit_timeout: TimeoutMs,
    /// Recognizer sensitivity, 0.0-1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f32>,
    /// DTMF digit that terminates input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminator: Option<char>,
    /// Allow the caller to barge in over a concurrent prompt
    #[serde(default)]
    pub barge_in: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            grammars: Vec::new(),
            recognition_timeout: disabled(),
            initial_timeout: disabled(),
            inter_digit_timeout: disabled(),
            sensitivity: None,
            terminator: None,
            barge_in: false,
        }
    }
}

/// A recognition grammar: inline content or a URL reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GrammarDocument {
    Url { url: String },
    Inline {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
        value: String,
    },
}

/// Options for bare DTMF collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DtmfOptions {
    /// Maximum number of digits to collect
    pub max_digits: u32,
    /// Timeout before the first digit, ms or -1
    #[serde(default = "disabled")]
    pub initial_timeout: TimeoutMs,
    /// Timeout between digits, ms or -1
    #[serde(default = "disabled")]
    pub inter_digit_timeout: TimeoutMs,
    /// Digit that terminates collection early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminator: Option<char>,
}

/// Options for joining a conference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConferenceOptions {
    /// Conference room identifier
    pub room_id: String,
    /// Join muted
    #[serde(default)]
    pub mute: bool,
    /// Join as moderator (conference ends when the moderator leaves)
    #[serde(default)]
    pub moderator: bool,
}

/// Options for fax transmission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaxOptions {
    /// Documents to transmit, in order; at least one is required
    pub documents: Vec<FaxDocument>,
}

/// One fax document with optional sender identity, page header and an
/// ordered page selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaxDocument {
    pub url: String,
    /// Sender identity (e.g. a phone number)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Header string to print on each page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Pages to send, preserving order; None means all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageEntry>>,
}

/// Options for recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordOptions {
    /// Recording format (e.g. "wav")
    #[serde(default = "default_record_format")]
    pub format: String,
    /// Maximum recording duration, ms or -1
    #[serde(default = "disabled")]
    pub max_duration: TimeoutMs,
    /// Play a beep before recording starts
    #[serde(default)]
    pub start_beep: bool,
}

fn default_record_format() -> String {
    "wav".to_string()
}

// ============================================================================
// Fax Page Ranges
// ============================================================================

/// One entry in a fax page selection: a single page or an inclusive
/// range. The wire form is a comma-joined list such as "1-4,5,7-9";
/// order is preserved through the normalized model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PageEntry {
    Single(u32),
    Range { first: u32, last: u32 },
}

/// Error parsing a wire page list.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PageListError {
    #[error("invalid page entry: {0}")]
    InvalidEntry(String),
    #[error("descending page range: {0}")]
    DescendingRange(String),
}

impl PageEntry {
    fn parse(entry: &str) -> Result<Self, PageListError> {
        match entry.split_once('-') {
            Some((first, last)) => {
                let first: u32 = first
                    .trim()
                    .parse()
                    .map_err(|_| PageListError::InvalidEntry(entry.to_string()))?;
                let last: u32 = last
                    .trim()
                    .parse()
                    .map_err(|_| PageListError::InvalidEntry(entry.to_string()))?;
                if last < first {
                    return Err(PageListError::DescendingRange(entry.to_string()));
                }
                Ok(PageEntry::Range { first, last })
            }
            None => entry
                .trim()
                .parse()
                .map(PageEntry::Single)
                .map_err(|_| PageListError::InvalidEntry(entry.to_string())),
        }
    }
}

impl std::fmt::Display for PageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageEntry::Single(page) => write!(f, "{page}"),
            PageEntry::Range { first, last } => write!(f, "{first}-{last}"),
        }
    }
}

/// Parse a wire page list ("1-4,5,7-9") into ordered entries.
pub fn parse_page_list(value: &str) -> Result<Vec<PageEntry>, PageListError> {
    value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(PageEntry::parse)
        .collect()
}

/// Render ordered page entries back to the wire form.
pub fn format_page_list(pages: &[PageEntry]) -> String {
    pages
        .iter()
        .map(PageEntry::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Outcomes & Events
// ============================================================================

/// The normalized result of a component's execution. Exactly one is
/// produced per dispatched command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Outcome {
    /// Successful completion, with an optional structured payload
    /// (e.g. recognition interpretations, recording reference)
    Match {
        #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
        payload: serde_json::Value,
    },
    /// Input was received but matched no grammar
    NoMatch,
    /// No input was received before the relevant timeout
    NoInput,
    /// The component was stopped by explicit request
    Stopped,
    /// The component failed; cause is human-readable
    Error { cause: String },
    /// The owning channel disappeared while the component was active
    ChannelGone,
}

impl Outcome {
    pub fn matched(payload: serde_json::Value) -> Self {
        Outcome::Match { payload }
    }

    pub fn error(cause: impl Into<String>) -> Self {
        Outcome::Error {
            cause: cause.into(),
        }
    }
}

/// Terminal outcome event for one component, republished to the wire
/// layer by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentEvent {
    pub call_id: CallId,
    pub component_id: ComponentId,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

/// Events published by the translator: component outcomes plus
/// call-level signals that are not tied to any component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TranslatorEvent {
    /// A component reached its terminal outcome
    Component(ComponentEvent),
    /// A DTMF digit was observed on the channel
    Dtmf {
        call_id: CallId,
        signal: char,
        timestamp: DateTime<Utc>,
    },
    /// The channel was torn down on the backend
    ChannelEnded {
        call_id: CallId,
        timestamp: DateTime<Utc>,
    },
}

// ============================================================================
// Tests
// ============================================================================
