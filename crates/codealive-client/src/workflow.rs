//! Statically declared explore workflows.
//!
//! Each workflow is a fixed recipe: an ordered list of search and chat
//! steps with the caller's target substituted into the templates. An
//! unrecognized tag is a lookup miss, never a fallback to a default
//! sequence; a typo must fail before any network call.

use serde::Serialize;

use crate::types::{ConversationId, SearchMatch, SearchMode};

/// One step of a workflow. `{target}` in templates is substituted with
/// the caller's target description.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// A search call.
    Search {
        query: &'static str,
        mode: SearchMode,
        include_content: bool,
    },
    /// A chat call; conversation state threads between chat steps
    /// within one run.
    Chat { prompt: &'static str },
}

/// A named workflow recipe.
#[derive(Debug, Clone, Copy)]
pub struct Workflow {
    pub tag: &'static str,
    pub description: &'static str,
    pub steps: &'static [Step],
}

/// Registry of known workflows; order here is display order.
pub const WORKFLOWS: &[Workflow] = &[
    Workflow {
        tag: "understand",
        description: "Explain how a topic works: locate the code, then walk through it",
        steps: &[
            Step::Search {
                query: "{target}",
                mode: SearchMode::Auto,
                include_content: false,
            },
            Step::Chat {
                prompt: "Based on the search results for '{target}', explain how this works in the codebase. Focus on architecture, key components, and data flow.",
            },
        ],
    },
    Workflow {
        tag: "dependency",
        description: "Deep-dive into a library: usage sites, internals, gotchas",
        steps: &[
            Step::Search {
                query: "How is {target} used? Show me import statements and usage examples",
                mode: SearchMode::Auto,
                include_content: true,
            },
            Step::Chat {
                prompt: "About the library/dependency '{target}':\n1. How does it work internally?\n2. What are the common usage patterns in this codebase?\n3. What are best practices and potential gotchas?\n4. How do other projects in the ecosystem use it?",
            },
        ],
    },
    Workflow {
        tag: "pattern",
        description: "Find and compare implementations of a pattern across projects",
        steps: &[
            Step::Search {
                query: "Show me different implementations of {target}",
                mode: SearchMode::Deep,
                include_content: true,
            },
            Step::Chat {
                prompt: "Analyze the different implementations of '{target}' found in the codebase:\n1. What are the common patterns?\n2. What are the variations?\n3. Which approach is recommended and why?\n4. Are there any anti-patterns to avoid?",
            },
        ],
    },
    Workflow {
        tag: "implement",
        description: "Find similar features to guide a new implementation",
        steps: &[
            Step::Search {
                query: "Similar features to {target}, existing implementations",
                mode: SearchMode::Auto,
                include_content: false,
            },
            Step::Chat {
                prompt: "I need to implement '{target}'. Based on the codebase:\n1. What similar features exist that I can learn from?\n2. What are the architectural patterns I should follow?\n3. What components/services do I need to integrate with?\n4. What are the key considerations (security, performance, testing)?\n5. What's the recommended approach to implement this?",
            },
        ],
    },
    Workflow {
        tag: "debug",
        description: "Trace a symptom to its likely root cause",
        steps: &[
            Step::Search {
                query: "Code related to {target}",
                mode: SearchMode::Auto,
                include_content: true,
            },
            Step::Chat {
                prompt: "Help me debug: '{target}'\n1. What code is likely involved?\n2. What could be causing this issue?\n3. What should I check first?\n4. What are common mistakes related to this?\n5. How can I trace and fix this issue?",
            },
        ],
    },
];

/// Look up a workflow by tag.
pub fn find(tag: &str) -> Option<&'static Workflow> {
    WORKFLOWS.iter().find(|w| w.tag.eq_ignore_ascii_case(tag))
}

/// Substitute the target into a step template.
pub(crate) fn render(template: &str, target: &str) -> String {
    template.replace("{target}", target)
}

/// Outcome of one executed workflow step.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepReport {
    Search {
        query: String,
        matches: Vec<SearchMatch>,
    },
    Chat {
        question: String,
        answer: String,
    },
}

/// Result of a full explore run.
#[derive(Debug, Clone, Serialize)]
pub struct ExploreReport {
    pub tag: String,
    pub target: String,
    /// Step outcomes in execution order.
    pub steps: Vec<StepReport>,
    /// Conversation handle for manual follow-up questions, when the run
    /// included a chat step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}
