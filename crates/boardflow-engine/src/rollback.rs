use tracing::warn;

use boardflow_domain::{Board, DragSession, DropResolver, OptimisticApplier};

use crate::dispatcher::MoveDebouncer;

/// Session-scoped undo to last-known-good state.
///
/// Rollback discards the optimistic projection wholesale and restores
/// the session snapshot; it never computes inverse diffs against
/// current state, so there is no partial reconciliation to get wrong.
/// The pending debounced dispatch is cancelled first so a stale
/// request cannot commit after the board has reverted.
#[derive(Debug)]
pub struct RollbackManager;

impl RollbackManager {
    pub fn rollback(
        session: &DragSession,
        debouncer: &mut MoveDebouncer,
        applier: &mut OptimisticApplier,
        resolver: &mut DropResolver,
    ) -> Board {
        debouncer.cancel();
        applier.reset();
        resolver.reset();
        warn!(
            subject_id = %session.subject_id,
            sequence = session.sequence,
            "rolling back drag session to snapshot"
        );
        session.snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CorrelationId;
    use boardflow_domain::{
        Group, GroupKind, Item, MoveSpec, SessionGuard, SessionKind, SortKey,
    };
    use std::time::{Duration, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_rollback_restores_snapshot_and_cancels_dispatch() {
        let mut board = Board::new();
        let todo = Group::new(GroupKind::Status, "Todo".to_string());
        let doing = Group::new(GroupKind::Status, "Doing".to_string());
        let todo_id = todo.id;
        let doing_id = doing.id;
        board.add_group(todo);
        board.add_group(doing);
        let item = Item::new(todo_id, "A".to_string(), SortKey::new(0.0));
        let item_id = item.id;
        board.add_item(item);

        let mut guard = SessionGuard::new();
        guard
            .begin(SessionKind::Item, item_id, Some(todo_id), 0, board.clone())
            .unwrap();

        let mut applier = OptimisticApplier::new(Duration::from_millis(16));
        let applied = applier.apply(
            &board,
            MoveSpec {
                item_id,
                to_group_id: doing_id,
                to_index: 0,
                to_parent: None,
            },
            Instant::now(),
        );
        let boardflow_domain::Applied::Changed(optimistic) = applied else {
            panic!("expected a change");
        };
        assert_ne!(optimistic, board);

        let (mut debouncer, mut fired) = MoveDebouncer::new(Duration::from_millis(100));
        debouncer.schedule(crate::dispatcher::PendingMove {
            correlation_id: CorrelationId::generate(),
            item_id,
            from_group_id: todo_id,
            to_group_id: doing_id,
            to_index: 0,
            from_sort_key: SortKey::new(0.0),
            to_sort_key: SortKey::new(0.0),
        });

        let mut resolver = DropResolver::new();
        let session = guard.session().unwrap().clone();
        let restored =
            RollbackManager::rollback(&session, &mut debouncer, &mut applier, &mut resolver);

        // all-or-nothing: exact deep equality with the snapshot
        assert_eq!(restored, board);
        assert!(applier.take_dirty_parents().is_empty());
        // the superseded dispatch can never fire
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(fired.try_recv().is_err());
    }
}
