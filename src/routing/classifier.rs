//! Prompt classification: knowledge query or general conversation.

use serde::{Deserialize, Serialize};

use super::keywords::KeywordSet;

/// The chosen backend for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteTag {
    /// Health/medical topic — answered by the knowledge base.
    Knowledge,
    /// Everything else — answered by the conversational model.
    General,
}

impl RouteTag {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteTag::Knowledge => "knowledge",
            RouteTag::General => "general",
        }
    }
}

/// The result of classifying one prompt. Produced fresh per request; carries
/// the original text so the caller can forward it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub tag: RouteTag,
    pub prompt: String,
}

/// Classifies prompts against an immutable keyword set.
///
/// Pure and synchronous: no I/O, no shared mutable state, safe to call from
/// any number of request tasks concurrently.
#[derive(Debug, Clone)]
pub struct PromptRouter {
    keywords: KeywordSet,
}

impl PromptRouter {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    /// Classify a prompt.
    ///
    /// Any keyword match (case-insensitive substring) routes to
    /// [`RouteTag::Knowledge`]; no match routes to [`RouteTag::General`].
    /// An empty prompt therefore classifies as general; callers that treat
    /// empty input as an error must reject it before calling.
    pub fn classify(&self, prompt: &str) -> RouteDecision {
        let tag = if self.keywords.matches(prompt) {
            RouteTag::Knowledge
        } else {
            RouteTag::General
        };

        RouteDecision {
            tag,
            prompt: prompt.to_string(),
        }
    }
}

impl Default for PromptRouter {
    fn default() -> Self {
        Self::new(KeywordSet::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_prompt_routes_to_knowledge() {
        let router = PromptRouter::default();
        let decision = router.classify("What is my blood pressure today?");
        assert_eq!(decision.tag, RouteTag::Knowledge);
        assert_eq!(decision.prompt, "What is my blood pressure today?");
    }

    #[test]
    fn small_talk_routes_to_general() {
        let router = PromptRouter::default();
        assert_eq!(router.classify("Tell me a joke").tag, RouteTag::General);
    }

    #[test]
    fn dr_seuss_false_positive_is_preserved() {
        // Substring matching on "Dr." fires even though the prompt is about
        // children's books. Documented tradeoff; do not "fix" silently.
        let router = PromptRouter::default();
        assert_eq!(
            router.classify("Can you recommend a good Dr. Seuss book?").tag,
            RouteTag::Knowledge
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        let router = PromptRouter::default();
        assert_eq!(
            router.classify("BLOOD PRESSURE check").tag,
            router.classify("blood pressure check").tag
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let router = PromptRouter::default();
        assert_eq!(
            router.classify("any old prompt"),
            router.classify("any old prompt")
        );
    }

    #[test]
    fn empty_prompt_classifies_as_general() {
        // Vacuous match: no keyword is contained in "". The gateway rejects
        // empty prompts before routing; the router itself stays total.
        let router = PromptRouter::default();
        assert_eq!(router.classify("").tag, RouteTag::General);
        assert_eq!(router.classify("   ").tag, RouteTag::General);
    }

    #[test]
    fn tags_serialize_lowercase() {
        let decision = PromptRouter::default().classify("hello");
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["tag"], "general");
        assert_eq!(json["prompt"], "hello");
    }
}
