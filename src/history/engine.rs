//! History Engine Module
//!
//! Ordered, depth-bounded action log with an undo/redo cursor.

use std::collections::VecDeque;

use tracing::trace;

// == History Engine ==
/// Linear undo/redo log.
///
/// The cursor counts applied actions: `applied == 0` is the fully undone
/// state and `applied == len` is the tip. Adding an action while not at the
/// tip discards everything after the cursor first.
#[derive(Debug, Clone)]
pub struct HistoryEngine<A> {
    log: VecDeque<A>,
    applied: usize,
    max_steps: usize,
}

impl<A> HistoryEngine<A> {
    // == Constructor ==
    /// Creates an empty log holding at most `max_steps` actions (minimum 1).
    pub fn new(max_steps: usize) -> Self {
        Self {
            log: VecDeque::new(),
            applied: 0,
            max_steps: max_steps.max(1),
        }
    }

    // == Add Action ==
    /// Records a newly applied action.
    pub fn add_action(&mut self, action: A) {
        if self.applied < self.log.len() {
            trace!(
                discarded = self.log.len() - self.applied,
                "discarding redo branch"
            );
            self.log.truncate(self.applied);
        }

        self.log.push_back(action);
        self.applied = self.log.len();

        if self.log.len() > self.max_steps {
            self.log.pop_front();
            self.applied -= 1;
        }
    }

    // == Undo ==
    /// Steps the cursor back and returns the action to invert, or None when
    /// nothing is applied.
    pub fn undo(&mut self) -> Option<&A> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.log.get(self.applied)
    }

    // == Redo ==
    /// Steps the cursor forward and returns the action to re-apply, or None at
    /// the tip.
    pub fn redo(&mut self) -> Option<&A> {
        if self.applied >= self.log.len() {
            return None;
        }
        self.applied += 1;
        self.log.get(self.applied - 1)
    }

    // == Clear ==
    pub fn clear_history(&mut self) {
        self.log.clear();
        self.applied = 0;
    }

    // == Retain ==
    /// Keeps only the actions matching `keep`. The cursor stays between the
    /// same surviving applied and undone actions. Returns how many were
    /// dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&A) -> bool,
    {
        let before = self.log.len();
        let mut applied = 0;
        let mut index = 0;
        let cursor = self.applied;
        self.log.retain(|action| {
            let kept = keep(action);
            if kept && index < cursor {
                applied += 1;
            }
            index += 1;
            kept
        });
        self.applied = applied;
        before - self.log.len()
    }

    // == Accessors ==
    /// Index of the last applied action, None when fully undone.
    pub fn current_index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.log.len()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Actions from oldest to newest, including any redo branch.
    pub fn actions(&self) -> impl Iterator<Item = &A> {
        self.log.iter()
    }

    /// The action the next `undo` would return.
    pub fn peek_undo(&self) -> Option<&A> {
        self.current_index().and_then(|i| self.log.get(i))
    }

    /// The action the next `redo` would return.
    pub fn peek_redo(&self) -> Option<&A> {
        self.log.get(self.applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_of(engine: &HistoryEngine<char>) -> Vec<char> {
        engine.actions().copied().collect()
    }

    #[test]
    fn test_new_engine_is_fully_undone() {
        let engine: HistoryEngine<char> = HistoryEngine::new(10);
        assert_eq!(engine.current_index(), None);
        assert!(!engine.can_undo());
        assert!(!engine.can_redo());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_add_moves_cursor_to_tip() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        engine.add_action('b');

        assert_eq!(engine.current_index(), Some(1));
        assert!(engine.can_undo());
        assert!(!engine.can_redo());
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut engine: HistoryEngine<char> = HistoryEngine::new(10);
        assert_eq!(engine.undo(), None);
        assert_eq!(engine.current_index(), None);
    }

    #[test]
    fn test_redo_at_tip_is_noop() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');

        assert_eq!(engine.redo(), None);
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn test_undo_returns_actions_newest_first() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        engine.add_action('b');

        assert_eq!(engine.undo(), Some(&'b'));
        assert_eq!(engine.undo(), Some(&'a'));
        assert_eq!(engine.undo(), None);
        assert_eq!(engine.current_index(), None);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        let after_add = engine.current_index();

        engine.undo();
        assert_eq!(engine.redo(), Some(&'a'));
        assert_eq!(engine.current_index(), after_add);
    }

    #[test]
    fn test_new_action_discards_redo_branch() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        engine.add_action('b');
        engine.add_action('c');

        engine.undo();
        engine.undo();
        assert_eq!(engine.current_index(), Some(0));

        engine.add_action('d');
        assert_eq!(log_of(&engine), vec!['a', 'd']);
        assert_eq!(engine.current_index(), Some(1));
        assert!(!engine.can_redo());
    }

    #[test]
    fn test_new_action_after_full_undo_replaces_log() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        engine.add_action('b');
        engine.undo();
        engine.undo();

        engine.add_action('z');
        assert_eq!(log_of(&engine), vec!['z']);
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn test_depth_bound_drops_oldest() {
        let mut engine = HistoryEngine::new(2);
        engine.add_action('a');
        engine.add_action('b');
        engine.add_action('c');

        assert_eq!(log_of(&engine), vec!['b', 'c']);
        assert_eq!(engine.current_index(), Some(1));
        assert_eq!(engine.undo(), Some(&'c'));
        assert_eq!(engine.undo(), Some(&'b'));
        assert_eq!(engine.undo(), None);
    }

    #[test]
    fn test_zero_max_steps_keeps_one() {
        let mut engine = HistoryEngine::new(0);
        engine.add_action('a');
        engine.add_action('b');

        assert_eq!(engine.max_steps(), 1);
        assert_eq!(log_of(&engine), vec!['b']);
    }

    #[test]
    fn test_peek_matches_next_step() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        engine.add_action('b');
        engine.undo();

        assert_eq!(engine.peek_undo(), Some(&'a'));
        assert_eq!(engine.peek_redo(), Some(&'b'));
    }

    #[test]
    fn test_retain_keeps_cursor_between_survivors() {
        let mut engine = HistoryEngine::new(10);
        for action in ['a', 'B', 'c', 'D', 'e'] {
            engine.add_action(action);
        }
        engine.undo();
        engine.undo();

        let dropped = engine.retain(|c| c.is_lowercase());

        assert_eq!(dropped, 2);
        assert_eq!(log_of(&engine), vec!['a', 'c', 'e']);
        assert_eq!(engine.current_index(), Some(1));
        assert_eq!(engine.peek_undo(), Some(&'c'));
        assert_eq!(engine.peek_redo(), Some(&'e'));
    }

    #[test]
    fn test_retain_nothing_resets_cursor() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        engine.add_action('b');

        assert_eq!(engine.retain(|_| false), 2);
        assert_eq!(engine.current_index(), None);
        assert!(!engine.can_undo());
        assert!(!engine.can_redo());
    }

    #[test]
    fn test_clear_history() {
        let mut engine = HistoryEngine::new(10);
        engine.add_action('a');
        engine.clear_history();

        assert!(engine.is_empty());
        assert_eq!(engine.current_index(), None);
        assert_eq!(engine.undo(), None);
    }
}
