mod expected;
mod token;

use fnv::FnvHashSet;
use tracing::debug;

pub use self::expected::describe_expected;
pub use self::token::{LexicalErrorKind, Token, TokenKind};

/// Compilation phase that produced a diagnostic. Ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Lexical,
    Syntactic,
    Semantic,
}

/// Insertion ordered set of rendered messages.
#[derive(Debug, Default, Clone)]
struct Bucket {
    seen: FnvHashSet<String>,
    messages: Vec<String>,
}

impl Bucket {
    fn add(&mut self, message: String) -> bool {
        if self.seen.contains(&message) {
            return false;
        }

        self.seen.insert(message.clone());
        self.messages.push(message);
        true
    }

    fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Accumulates diagnostics over a whole compilation.
///
/// Messages are kept in three buckets, one per [`Phase`]. Only one bucket is
/// ever surfaced: lexical errors hide syntax errors, which hide semantic
/// errors.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    lexical: Bucket,
    syntactic: Bucket,
    semantic: Bucket,
}

fn location(line: usize, column: usize, context: &str) -> String {
    if context.is_empty() {
        format!("line {}, column {}", line, column)
    } else {
        format!("line {}, column {} ({})", line, column, context)
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket_mut(&mut self, phase: Phase) -> &mut Bucket {
        match phase {
            Phase::Lexical => &mut self.lexical,
            Phase::Syntactic => &mut self.syntactic,
            Phase::Semantic => &mut self.semantic,
        }
    }

    fn record(&mut self, phase: Phase, message: String) {
        debug!(?phase, %message, "diagnostic");
        self.bucket_mut(phase).add(message);
    }

    /// Records a syntax error for `found` given the token images the parser
    /// would have accepted instead.
    pub fn record_syntax_error<S: AsRef<str>>(&mut self, found: &Token, expected: &[S], context: &str) {
        let message = format!(
            "Syntax error at {}: found {}, expected: {}.",
            location(found.line, found.column, context),
            found,
            describe_expected(expected)
        );
        self.record(Phase::Syntactic, message);
    }

    pub fn record_lexical_error(&mut self, token: &Token, context: &str) {
        let kind = token
            .lexical_error()
            .unwrap_or(LexicalErrorKind::UnrecognizedSymbol);

        let message = format!(
            "Lexical error at {}: found {}. {}",
            location(token.line, token.column, context),
            token,
            kind.explanation()
        );
        self.record(Phase::Lexical, message);
    }

    /// `kind` names the error class in the message, e.g. `"Semantic"`.
    pub fn record_semantic_error(&mut self, kind: &str, line: usize, column: usize, message: &str) {
        let message = format!("{} error (line {}, column {}): {}", kind, line, column, message);
        self.record(Phase::Semantic, message);
    }

    pub fn has_errors(&self) -> bool {
        !(self.lexical.is_empty() && self.syntactic.is_empty() && self.semantic.is_empty())
    }

    /// The phase whose messages [`messages`](Self::messages) returns.
    pub fn surfaced_phase(&self) -> Option<Phase> {
        if !self.lexical.is_empty() {
            Some(Phase::Lexical)
        } else if !self.syntactic.is_empty() {
            Some(Phase::Syntactic)
        } else if !self.semantic.is_empty() {
            Some(Phase::Semantic)
        } else {
            None
        }
    }

    /// Messages of the highest priority non-empty phase, in insertion order.
    pub fn messages(&self) -> Vec<String> {
        self.surfaced_phase()
            .map(|phase| self.messages_of(phase).to_vec())
            .unwrap_or_default()
    }

    pub fn messages_of(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Lexical => &self.lexical.messages,
            Phase::Syntactic => &self.syntactic.messages,
            Phase::Semantic => &self.semantic.messages,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
