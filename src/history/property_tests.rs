//! Property-Based Tests for the History Engine
//!
//! Drives [`HistoryEngine`] with random operation sequences and compares it
//! with a plain vector-and-cursor model.

use proptest::prelude::*;

use crate::history::HistoryEngine;

#[derive(Debug, Clone)]
enum HistoryOp {
    Add(u32),
    Undo,
    Redo,
    Clear,
}

fn history_op_strategy() -> impl Strategy<Value = HistoryOp> {
    prop_oneof![
        4 => any::<u32>().prop_map(HistoryOp::Add),
        3 => Just(HistoryOp::Undo),
        2 => Just(HistoryOp::Redo),
        1 => Just(HistoryOp::Clear),
    ]
}

/// Reference model: `index` is -1 when fully undone.
struct Model {
    log: Vec<u32>,
    index: i64,
    max: usize,
}

impl Model {
    fn add(&mut self, a: u32) {
        self.log.truncate((self.index + 1) as usize);
        self.log.push(a);
        self.index = self.log.len() as i64 - 1;
        if self.log.len() > self.max {
            self.log.remove(0);
            self.index -= 1;
        }
    }

    fn undo(&mut self) -> Option<u32> {
        if self.index < 0 {
            return None;
        }
        let a = self.log[self.index as usize];
        self.index -= 1;
        Some(a)
    }

    fn redo(&mut self) -> Option<u32> {
        if self.index >= self.log.len() as i64 - 1 {
            return None;
        }
        self.index += 1;
        Some(self.log[self.index as usize])
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    // The engine matches the model and keeps -1 <= index < len and
    // len <= max_steps after every operation.
    #[test]
    fn prop_engine_matches_model(
        max in 1usize..8,
        ops in prop::collection::vec(history_op_strategy(), 1..60)
    ) {
        let mut engine = HistoryEngine::new(max);
        let mut model = Model { log: Vec::new(), index: -1, max };

        for op in ops {
            match op {
                HistoryOp::Add(a) => {
                    engine.add_action(a);
                    model.add(a);
                }
                HistoryOp::Undo => prop_assert_eq!(engine.undo().copied(), model.undo()),
                HistoryOp::Redo => prop_assert_eq!(engine.redo().copied(), model.redo()),
                HistoryOp::Clear => {
                    engine.clear_history();
                    model.log.clear();
                    model.index = -1;
                }
            }

            let index = engine.current_index().map(|i| i as i64).unwrap_or(-1);
            prop_assert_eq!(index, model.index);
            prop_assert_eq!(engine.actions().copied().collect::<Vec<_>>(), model.log.clone());
            prop_assert!(engine.len() <= max);
            prop_assert!(index >= -1 && index < engine.len() as i64);
            prop_assert_eq!(engine.can_undo(), index >= 0);
            prop_assert_eq!(engine.can_redo(), index < engine.len() as i64 - 1);
        }
    }

    // Undoing k steps and redoing k steps returns to the same cursor and
    // yields the undone actions in reverse order.
    #[test]
    fn prop_undo_redo_round_trip(actions in prop::collection::vec(any::<u32>(), 1..20), k in 0usize..25) {
        let mut engine = HistoryEngine::new(50);
        for a in &actions {
            engine.add_action(*a);
        }
        let tip = engine.current_index();

        let mut undone = Vec::new();
        for _ in 0..k {
            if let Some(a) = engine.undo() {
                undone.push(*a);
            }
        }
        let mut redone = Vec::new();
        for _ in 0..undone.len() {
            if let Some(a) = engine.redo() {
                redone.push(*a);
            }
        }
        redone.reverse();

        prop_assert_eq!(undone, redone);
        prop_assert_eq!(engine.current_index(), tip);
    }
}
