//! State owned by an editor integration, kept out of the validation core.
//!
//! The core computes a fresh diagnostic list per pass. This module holds what
//! outlives a pass: the latest diagnostics per document, and which pass is the
//! newest one scheduled for each document.

use crate::config::ValidatorConfig;
use crate::diagnostic::Diagnostic;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Latest diagnostics per document. `set` replaces, never merges.
#[derive(Debug, Default)]
pub struct DiagnosticRegistry {
    documents: HashMap<String, Vec<Diagnostic>>,
}

impl DiagnosticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, document: &str, diagnostics: Vec<Diagnostic>) {
        log::debug!("publishing {} diagnostic(s) for {document}", diagnostics.len());
        self.documents.insert(document.to_string(), diagnostics);
    }

    pub fn delete(&mut self, document: &str) -> Option<Vec<Diagnostic>> {
        self.documents.remove(document)
    }

    pub fn get(&self, document: &str) -> Option<&[Diagnostic]> {
        self.documents.get(document).map(Vec::as_slice)
    }

    /// Stores the result of the pass `token` unless a newer pass was scheduled
    /// since. Returns whether the result was stored.
    pub fn publish(
        &mut self,
        scheduler: &ValidationScheduler,
        token: &PassToken,
        diagnostics: Vec<Diagnostic>,
    ) -> bool {
        if !scheduler.is_current(token) {
            log::trace!("dropping stale pass {} for {}", token.sequence, token.document);
            return false;
        }
        self.set(&token.document, diagnostics);
        true
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Identifies one scheduled validation pass.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct PassToken {
    pub document: String,
    sequence: u64,
}

#[derive(Debug)]
struct PendingPass {
    token: PassToken,
    due: Instant,
}

/// Debounces validation passes per document.
///
/// Scheduling a pass replaces any pass still pending for the same document,
/// and marks every earlier token for that document as stale.
#[derive(Debug)]
pub struct ValidationScheduler {
    delay: Duration,
    next_sequence: u64,
    pending: HashMap<String, PendingPass>,
    latest: HashMap<String, u64>,
}

impl Default for ValidationScheduler {
    fn default() -> Self {
        Self::from_config(&ValidatorConfig::default())
    }
}

impl ValidationScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_sequence: 0,
            pending: HashMap::new(),
            latest: HashMap::new(),
        }
    }

    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(config.debounce())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, document: &str, now: Instant) -> PassToken {
        self.next_sequence += 1;
        let token = PassToken {
            document: document.to_string(),
            sequence: self.next_sequence,
        };
        let replaced = self.pending.insert(
            document.to_string(),
            PendingPass {
                token: token.clone(),
                due: now + self.delay,
            },
        );
        if let Some(replaced) = replaced {
            log::trace!("pass {} for {document} superseded", replaced.token.sequence);
        }
        self.latest.insert(document.to_string(), token.sequence);
        token
    }

    /// Removes and returns every pending pass whose delay has elapsed by `now`,
    /// oldest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<PassToken> {
        let mut due: Vec<PassToken> = Vec::new();
        self.pending.retain(|_, pass| {
            if pass.due <= now {
                due.push(pass.token.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|token| token.sequence);
        due
    }

    /// Earliest instant at which a pending pass becomes due.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|pass| pass.due).min()
    }

    pub fn is_current(&self, token: &PassToken) -> bool {
        self.latest.get(&token.document) == Some(&token.sequence)
    }

    /// Forgets a closed document; its outstanding tokens become stale.
    pub fn cancel(&mut self, document: &str) {
        self.pending.remove(document);
        self.latest.remove(document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn test_pass_runs_after_delay() {
        let mut scheduler = ValidationScheduler::new(DELAY);
        let start = Instant::now();
        let token = scheduler.schedule("a.yaml", start);
        assert!(scheduler.take_due(start + Duration::from_millis(499)).is_empty());
        assert_eq!(scheduler.take_due(start + DELAY), vec![token.clone()]);
        assert!(scheduler.take_due(start + DELAY * 2).is_empty());
        assert!(scheduler.is_current(&token));
    }

    #[test]
    fn test_new_pass_supersedes_pending_one() {
        let mut scheduler = ValidationScheduler::new(DELAY);
        let start = Instant::now();
        let first = scheduler.schedule("a.yaml", start);
        let second = scheduler.schedule("a.yaml", start + Duration::from_millis(300));
        assert!(!scheduler.is_current(&first));
        assert!(scheduler.take_due(start + DELAY).is_empty());
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(800)),
            vec![second]
        );
    }

    #[test]
    fn test_documents_are_independent() {
        let mut scheduler = ValidationScheduler::new(DELAY);
        let start = Instant::now();
        let a = scheduler.schedule("a.yaml", start);
        let b = scheduler.schedule("b.yaml", start);
        assert_eq!(scheduler.take_due(start + DELAY), vec![a, b]);
    }

    #[test]
    fn test_registry_replaces_and_drops_stale_results() {
        let mut scheduler = ValidationScheduler::new(DELAY);
        let mut registry = DiagnosticRegistry::new();
        let start = Instant::now();
        let stale = scheduler.schedule("a.yaml", start);
        let fresh = scheduler.schedule("a.yaml", start);

        assert!(registry.publish(&scheduler, &fresh, Vec::new()));
        assert!(!registry.publish(&scheduler, &stale, Vec::new()));
        assert_eq!(registry.get("a.yaml").map(<[Diagnostic]>::len), Some(0));

        scheduler.cancel("a.yaml");
        assert!(!scheduler.is_current(&fresh));
        assert!(registry.delete("a.yaml").is_some());
        assert!(registry.is_empty());
    }
}
