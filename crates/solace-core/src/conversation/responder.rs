//! Rule-based reply generation.
//!
//! An utterance is lower-cased and tested against an ordered list of keyword
//! rules. The first rule that matches supplies the reply; when none match the
//! fallback reply is used.

use regex::Regex;

use crate::error::{Result, SolaceError};

/// Greeting appended to an empty chat log. It is not a reply to anything.
pub const WELCOME_MESSAGE: &str = "Hi there! I'm your Solace companion. I'm here to listen and \
support you with techniques drawn from cognitive behavioral therapy and mindfulness. \
How are you feeling today?";

const FALLBACK_REPLY: &str = "Thank you for sharing. Remember that it's okay to feel what \
you're feeling, and I'm here to support you. Would you like to explore some coping \
strategies together?";

/// A named keyword rule.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Regex,
    reply: String,
}

impl Rule {
    /// Builds a rule matching any of `keywords`.
    ///
    /// A keyword matches as a whole word or phrase. A trailing `*` turns it
    /// into a stem that also matches longer words (`stress*` matches
    /// "stressed" and "stressful").
    pub fn keywords(name: impl Into<String>, keywords: &[&str], reply: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if keywords.is_empty() {
            return Err(SolaceError::config(format!("rule '{name}' has no keywords")));
        }

        let alternatives: Vec<String> = keywords
            .iter()
            .map(|kw| match kw.strip_suffix('*') {
                Some(stem) => format!(r"{}\w*", regex::escape(&stem.to_lowercase())),
                None => regex::escape(&kw.to_lowercase()),
            })
            .collect();
        let source = format!(r"\b(?:{})\b", alternatives.join("|"));
        let pattern = Regex::new(&source)
            .map_err(|e| SolaceError::config(format!("rule '{name}': {e}")))?;

        Ok(Self {
            name,
            pattern,
            reply: reply.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    fn matches(&self, lowered: &str) -> bool {
        self.pattern.is_match(lowered)
    }
}

/// Ordered, first-match-wins reply generator.
#[derive(Debug, Clone)]
pub struct Responder {
    rules: Vec<Rule>,
    fallback: String,
}

impl Responder {
    pub fn new(rules: Vec<Rule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// The built-in rule set.
    ///
    /// Crisis comes first so a message that also mentions anxiety, stress or
    /// anything else still surfaces the hotline.
    pub fn builtin() -> Result<Self> {
        let rules = vec![
            Rule::keywords(
                "crisis",
                &[
                    "help",
                    "emergency",
                    "crisis",
                    "suicid*",
                    "kill myself",
                    "hurt myself",
                    "end my life",
                ],
                "If you're in crisis, please reach out to a mental health professional \
                 immediately. In the US you can call or text 988 to reach the Suicide & Crisis \
                 Lifeline, or text HOME to 741741 to reach the Crisis Text Line.",
            )?,
            Rule::keywords(
                "greeting",
                &["hello", "hi", "hey", "good morning", "good evening"],
                "Hello! I'm your Solace companion. How are you feeling today?",
            )?,
            Rule::keywords(
                "anxiety",
                &["anxious", "anxiety", "panic*", "nervous", "worried"],
                "I'm sorry to hear you're feeling anxious. Remember that anxiety is a normal \
                 response to stress. Try taking a few deep breaths with me in our breathing \
                 exercise section.",
            )?,
            Rule::keywords(
                "sadness",
                &["sad", "depress*", "unhappy", "lonely", "hopeless"],
                "I hear that you're feeling down. Depression and sadness are common emotions \
                 that many people experience. Would you like to talk more about what's on your \
                 mind?",
            )?,
            Rule::keywords(
                "stress",
                &["stress*", "overwhelm*", "burned out", "burnt out", "burnout"],
                "Stress can be overwhelming. Consider taking a short break to reset. Our guided \
                 breathing exercises can help reduce stress levels.",
            )?,
            Rule::keywords(
                "positive",
                &["happy", "good", "great", "glad", "better"],
                "I'm glad to hear you're feeling positive! It's important to acknowledge and \
                 celebrate these moments.",
            )?,
            Rule::keywords(
                "breathing",
                &["breath*"],
                "Breathing exercises can help calm your mind and body. You can try our guided \
                 breathing exercise whenever you like.",
            )?,
        ];
        Ok(Self::new(rules, FALLBACK_REPLY))
    }

    /// Returns the reply for `utterance`.
    pub fn respond(&self, utterance: &str) -> &str {
        let lowered = utterance.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(self.fallback.as_str(), Rule::reply)
    }

    /// Name of the rule that would answer `utterance`, `None` for the fallback.
    pub fn matched_rule(&self, utterance: &str) -> Option<&str> {
        let lowered = utterance.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(Rule::name)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}
