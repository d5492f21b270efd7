//! Request and response types for the CodeAlive API.
//!
//! Response structs are deliberately tolerant: the service adds fields
//! over time and several have shifted shape across versions, so parsing
//! accepts the variants and accessors normalize them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Data sources
// ─────────────────────────────────────────────────────────────────────────────

/// Prefix marking a workspace reference on the wire and in CLI args.
const WORKSPACE_PREFIX: &str = "workspace:";

/// Scope of a searchable corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceScope {
    /// A single indexed repository.
    Repository,
    /// A workspace: a named group of repositories searched together.
    Workspace,
}

/// A named, pre-indexed repository or workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceRef {
    name: String,
    scope: DataSourceScope,
}

impl DataSourceRef {
    /// Parse a reference; `workspace:<name>` selects workspace scope.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (name, scope) = match raw.strip_prefix(WORKSPACE_PREFIX) {
            Some(rest) => (rest.trim(), DataSourceScope::Workspace),
            None => (raw, DataSourceScope::Repository),
        };
        if name.is_empty() {
            return Err(Error::Config(
                "data source name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            scope,
        })
    }

    /// The bare name, without the scope prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> DataSourceScope {
        self.scope
    }
}

impl fmt::Display for DataSourceRef {
    /// Wire form: `name` or `workspace:name`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            DataSourceScope::Repository => write!(f, "{}", self.name),
            DataSourceScope::Workspace => write!(f, "{}{}", WORKSPACE_PREFIX, self.name),
        }
    }
}

impl FromStr for DataSourceRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Comma-joined wire names, for error messages.
pub(crate) fn join_refs(refs: &[DataSourceRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Order-insensitive comparison of two data-source sets.
pub(crate) fn sets_differ(a: &[DataSourceRef], b: &[DataSourceRef]) -> bool {
    let mut left: Vec<String> = a.iter().map(ToString::to_string).collect();
    let mut right: Vec<String> = b.iter().map(ToString::to_string).collect();
    left.sort();
    left.dedup();
    right.sort();
    right.dedup();
    left != right
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Search strategy selector, trading latency for recall and depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Server picks the strategy.
    #[default]
    Auto,
    /// Lexical only: lowest latency, lowest recall for conceptual
    /// queries.
    Fast,
    /// Exhaustive server-side multi-pass; runs under the extended
    /// timeout budget.
    Deep,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Auto => "auto",
            SearchMode::Fast => "fast",
            SearchMode::Deep => "deep",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SearchMode::Auto),
            "fast" => Ok(SearchMode::Fast),
            "deep" => Ok(SearchMode::Deep),
            other => Err(Error::Config(format!(
                "unknown search mode '{}' (expected auto, fast, or deep)",
                other
            ))),
        }
    }
}

/// A single-shot search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Natural-language description of what to find.
    pub query: String,
    /// Corpora to search; order affects only result interleaving.
    pub data_sources: Vec<DataSourceRef>,
    pub mode: SearchMode,
    /// Embed full file content in results (for corpora the caller cannot
    /// read locally) instead of paths only.
    pub include_content: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, data_sources: Vec<DataSourceRef>) -> Self {
        Self {
            query: query.into(),
            data_sources,
            mode: SearchMode::default(),
            include_content: false,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_content(mut self, include_content: bool) -> Self {
        self.include_content = include_content;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::Config("query must not be empty".to_string()));
        }
        if self.data_sources.is_empty() {
            return Err(Error::Config(
                "at least one data source is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// 1-based line position inside a file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePosition {
    pub line: u32,
}

/// Line span of a match.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRange {
    pub start: LinePosition,
    pub end: LinePosition,
}

/// Nested location object on newer service versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchLocation {
    pub path: Option<String>,
    pub range: Option<MatchRange>,
}

/// Data-source attribution on a match: an object on newer service
/// versions, a bare name on older ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSourceTag {
    Name(String),
    Info {
        #[serde(default)]
        name: Option<String>,
    },
}

impl DataSourceTag {
    pub fn name(&self) -> Option<&str> {
        match self {
            DataSourceTag::Name(name) => Some(name),
            DataSourceTag::Info { name } => name.as_deref(),
        }
    }
}

/// One search hit.
///
/// Field names vary across service versions; use the accessors rather
/// than the raw fields where a normalized view matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchMatch {
    pub location: Option<MatchLocation>,
    #[serde(alias = "file", alias = "path")]
    pub file_path: Option<String>,
    #[serde(alias = "lineNumber")]
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    #[serde(alias = "relevance")]
    pub score: Option<f64>,
    #[serde(alias = "content", alias = "code")]
    pub snippet: Option<String>,
    pub kind: Option<String>,
    /// Stable identifier; chunk results encode `repo::path::chunk`.
    pub identifier: Option<String>,
    pub data_source: Option<DataSourceTag>,
}

impl SearchMatch {
    /// Best-effort file path: nested location first, then flat fields,
    /// then the path segment of a chunk identifier.
    pub fn path(&self) -> Option<&str> {
        if let Some(path) = self.location.as_ref().and_then(|l| l.path.as_deref()) {
            return Some(path);
        }
        if let Some(path) = self.file_path.as_deref() {
            return Some(path);
        }
        if let Some(identifier) = self.identifier.as_deref() {
            let mut parts = identifier.split("::");
            if let (Some(_repo), Some(path)) = (parts.next(), parts.next()) {
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
        None
    }

    /// 1-based line span, when the service provided one. A zero start
    /// line means "unknown".
    pub fn lines(&self) -> Option<(u32, Option<u32>)> {
        if let Some(range) = self.location.as_ref().and_then(|l| l.range) {
            if range.start.line > 0 {
                let end = (range.end.line > range.start.line).then_some(range.end.line);
                return Some((range.start.line, end));
            }
        }
        let start = self.start_line.filter(|line| *line > 0)?;
        let end = self.end_line.filter(|line| *line > start);
        Some((start, end))
    }

    /// Short symbol name: the last identifier segment, skipped for chunk
    /// results whose identifiers are just numeric ids.
    pub fn symbol(&self) -> Option<&str> {
        if self.kind.as_deref() == Some("Chunk") {
            return None;
        }
        let identifier = self.identifier.as_deref()?;
        let short = identifier.rsplit("::").next().unwrap_or(identifier);
        (Some(short) != self.path()).then_some(short)
    }

    pub fn source_name(&self) -> Option<&str> {
        self.data_source.as_ref().and_then(|tag| tag.name())
    }
}

/// Search results in the order returned by the service.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub matches: Vec<SearchMatch>,
}

/// Wire shape of search results: bare array on older service versions,
/// wrapped object on newer ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchResponseWire {
    Flat(Vec<SearchMatch>),
    Wrapped {
        #[serde(default)]
        results: Vec<SearchMatch>,
    },
}

impl From<SearchResponseWire> for SearchResponse {
    fn from(wire: SearchResponseWire) -> Self {
        let matches = match wire {
            SearchResponseWire::Flat(matches) => matches,
            SearchResponseWire::Wrapped { results } => results,
        };
        SearchResponse { matches }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque server-issued conversation token. The client never inspects
/// or interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chat continuation handle: the token plus the data-source set the
/// conversation was created with.
///
/// The set is empty when the handle was resumed from a bare token that
/// crossed a process boundary; in that case mismatches are detected
/// against the set the service echoes back instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub data_sources: Vec<DataSourceRef>,
}

impl Conversation {
    /// Rebuild a handle from a bare token (e.g. a `--continue` flag).
    pub fn resumed(token: impl Into<String>) -> Self {
        Self {
            id: ConversationId::new(token),
            data_sources: Vec::new(),
        }
    }

    /// True when `refs` names a different corpus set than this
    /// conversation was created with. Unknown sets never mismatch.
    pub fn mismatches(&self, refs: &[DataSourceRef]) -> bool {
        if self.data_sources.is_empty() || refs.is_empty() {
            return false;
        }
        sets_differ(&self.data_sources, refs)
    }
}

/// One successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// The synthesized answer.
    pub answer: String,
    /// Handle for the next turn.
    pub conversation: Conversation,
}

/// Role/content pair for the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequestWire {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ChatResponseWire {
    pub id: Option<String>,
    pub choices: Vec<ChatChoiceWire>,
    /// Data-source set echoed by the service for this conversation.
    pub data_sources: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ChatChoiceWire {
    pub message: Option<ChatMessage>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Data-source catalog
// ─────────────────────────────────────────────────────────────────────────────

/// A catalog entry for an indexed repository or workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataSource {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    /// Indexing state; `Alive` means ready for use.
    pub state: Option<String>,
    pub url: Option<String>,
}

impl DataSource {
    pub fn is_workspace(&self) -> bool {
        self.source_type.as_deref() == Some("Workspace")
    }

    /// Ready for search and chat.
    pub fn is_alive(&self) -> bool {
        matches!(self.state.as_deref(), None | Some("Alive"))
    }
}

/// Wire shape of a catalog listing: bare array today, paged object if
/// the service ever starts paginating.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DataSourcePage {
    Flat(Vec<DataSource>),
    Paged {
        #[serde(default)]
        items: Vec<DataSource>,
        #[serde(default, rename = "nextPageToken")]
        next_page_token: Option<String>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
