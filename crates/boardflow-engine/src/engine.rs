use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use boardflow_core::{BoardflowError, BoardflowResult, EngineConfig};
use boardflow_domain::{
    ActivationThreshold, Applied, Board, DropResolver, DropTarget, DroppableRegion, GroupId,
    GroupKind, ItemId, MembershipIndex, MoveSpec, OptimisticApplier, Point, SessionGuard,
    SessionKind, SessionPhase,
};

use crate::{
    channel::Channel,
    dispatcher::{MoveDebouncer, PendingMove},
    gate::DependencyGate,
    matcher::ResponseMatcher,
    protocol::{
        ClientMessage, CorrelationId, MoveItemRequest, MoveItemResponse, ReorderGroupsRequest,
        ServerMessage,
    },
    rollback::RollbackManager,
};

/// UI-facing notifications. The engine never touches rendering; it
/// reports outcomes on this stream and the surrounding UI decides what
/// to show.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A committed move changed a parent's subtask set; its progress
    /// rollup recompute has been requested.
    ProgressRecomputeQueued { parent_id: ItemId },
    /// Transport failure or timeout. The board has been rolled back;
    /// the user must re-initiate the drag (no automatic retry).
    TransientError { message: String },
    /// The dependency gate rejected the move. Names the blockers.
    DependencyBlocked {
        item_id: ItemId,
        blocking: Vec<String>,
    },
    /// The server rejected the move or column reorder outright.
    MoveRejected { reason: String },
}

/// How a pointer-up resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Server accepted; canonical order and keys adopted.
    Committed,
    /// The pointer never resolved to a droppable region; any partial
    /// optimistic state was rolled back.
    NoTarget,
    /// The drop matched the subject's original position; nothing was
    /// dispatched.
    NoChange,
}

/// The optimistic drag/reorder engine.
///
/// Owns the board store and every sub-component; all pointer-path
/// methods are synchronous and non-blocking, remote synchronization is
/// awaited only in `pointer_up`. Exactly one drag session (item- or
/// group-kind) may be open at a time.
pub struct BoardEngine<C: Channel> {
    board: Board,
    index: MembershipIndex,
    resolver: DropResolver,
    applier: OptimisticApplier,
    debouncer: MoveDebouncer,
    fired_rx: mpsc::UnboundedReceiver<PendingMove>,
    matcher: ResponseMatcher,
    gate: DependencyGate,
    guard: SessionGuard,
    channel: C,
    activation_distance: f64,
    grouping_mode: GroupKind,
    project_id: Uuid,
    team_id: Uuid,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl<C: Channel> BoardEngine<C> {
    pub fn new(
        board: Board,
        channel: C,
        config: EngineConfig,
        grouping_mode: GroupKind,
        project_id: Uuid,
        team_id: Uuid,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let matcher = ResponseMatcher::new(config.response_timeout());
        let gate = DependencyGate::new(matcher.clone());
        let (debouncer, fired_rx) = MoveDebouncer::new(config.debounce_window());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let index = MembershipIndex::from_board(&board);
        let applier = OptimisticApplier::new(config.frame_interval());
        (
            Self {
                board,
                index,
                resolver: DropResolver::new(),
                applier,
                debouncer,
                fired_rx,
                matcher,
                gate,
                guard: SessionGuard::new(),
                channel,
                activation_distance: config.activation_distance,
                grouping_mode,
                project_id,
                team_id,
                events_tx,
            },
            events_rx,
        )
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> SessionPhase {
        self.guard.phase()
    }

    /// The matcher, for wiring the transport's inbound messages in
    /// (e.g. `engine.matcher().pump(server_rx)`).
    pub fn matcher(&self) -> ResponseMatcher {
        self.matcher.clone()
    }

    /// Spawn a pump feeding inbound server messages to the matcher.
    pub fn connect_inbound(
        &self,
        rx: mpsc::UnboundedReceiver<ServerMessage>,
    ) -> JoinHandle<()> {
        self.matcher.pump(rx)
    }

    /// Replace the board from a realtime refresh (another user's
    /// edit). Only legal while no drag session is open.
    pub fn apply_remote_board(&mut self, board: Board) -> BoardflowResult<()> {
        if self.guard.phase() != SessionPhase::Idle {
            return Err(BoardflowError::SessionActive);
        }
        self.index.rebuild(&board);
        self.board = board;
        Ok(())
    }

    /// Activation gate for a pointer press at `origin`: the embedder
    /// opens the drag session once the pointer has travelled the
    /// configured activation distance, so clicks stay clicks.
    pub fn drag_activation(&self, origin: Point) -> ActivationThreshold {
        ActivationThreshold::new(origin, self.activation_distance)
    }

    pub fn begin_item_drag(&mut self, item_id: ItemId) -> BoardflowResult<()> {
        let group_id = self.index.find_group(item_id);
        let origin_index = self
            .board
            .group(group_id)
            .position_of(item_id)
            .unwrap_or_else(|| panic!("item {item_id} missing from its group order"));
        self.guard.begin(
            SessionKind::Item,
            item_id,
            Some(group_id),
            origin_index,
            self.board.clone(),
        )?;
        self.resolver.reset();
        self.applier.reset();
        debug!(%item_id, %group_id, origin_index, "item drag session opened");
        Ok(())
    }

    pub fn begin_group_drag(&mut self, group_id: GroupId) -> BoardflowResult<()> {
        if self.grouping_mode == GroupKind::Phase {
            return Err(BoardflowError::GroupingLocked);
        }
        let origin_index = self.board.group_position(group_id);
        self.guard.begin(
            SessionKind::Group,
            group_id,
            None,
            origin_index,
            self.board.clone(),
        )?;
        self.resolver.reset();
        debug!(%group_id, origin_index, "group drag session opened");
        Ok(())
    }

    /// Re-resolve the drop target and re-apply the optimistic
    /// mutation. Synchronous; called from pointer/animation-frame
    /// callbacks. A call outside an active `Dragging` phase is a no-op.
    pub fn pointer_move(
        &mut self,
        pointer: Point,
        regions: &[DroppableRegion],
        now: Instant,
    ) -> BoardflowResult<()> {
        if self.guard.phase() != SessionPhase::Dragging {
            return Ok(());
        }
        let session = self.guard.session().expect("dragging implies a session");
        let kind = session.kind;
        let subject_id = session.subject_id;

        let Some(target) = self.resolver.resolve(pointer, regions, kind, &self.board) else {
            return Ok(());
        };

        match kind {
            SessionKind::Item => {
                let to_parent = match target.over {
                    DropTarget::Item(over_id) if over_id != subject_id => {
                        self.board.item(over_id).parent_item_id
                    }
                    _ => None,
                };
                let spec = MoveSpec {
                    item_id: subject_id,
                    to_group_id: target.group_id,
                    to_index: target.index,
                    to_parent,
                };
                let from_group_id = self.board.item(subject_id).group_id;
                let from_sort_key = self.board.item(subject_id).sort_key;
                if let Applied::Changed(next) = self.applier.apply(&self.board, spec, now) {
                    let to_sort_key = next.item(subject_id).sort_key;
                    self.board = next;
                    self.debouncer.schedule(PendingMove {
                        correlation_id: CorrelationId::generate(),
                        item_id: subject_id,
                        from_group_id,
                        to_group_id: spec.to_group_id,
                        to_index: spec.to_index,
                        from_sort_key,
                        to_sort_key,
                    });
                }
            }
            SessionKind::Group => {
                if target.group_id != subject_id {
                    let mut order = self.board.group_order();
                    let from = self.board.group_position(subject_id);
                    order.remove(from);
                    let to = target.index.min(order.len());
                    order.insert(to, subject_id);
                    self.board = self.board.reorder_groups(&order);
                }
            }
        }
        Ok(())
    }

    /// Finish the session: flush the debounced move, synchronize with
    /// the server, and commit or roll back.
    pub async fn pointer_up(&mut self) -> BoardflowResult<MoveOutcome> {
        if self.guard.phase() != SessionPhase::Dragging {
            return Err(BoardflowError::SessionInactive);
        }
        match self.guard.session().expect("dragging implies a session").kind {
            SessionKind::Item => self.finish_item_drag().await,
            SessionKind::Group => self.finish_group_drag().await,
        }
    }

    /// Abandon the session and restore the snapshot.
    pub fn cancel_drag(&mut self) -> BoardflowResult<()> {
        if self.guard.session().is_none() {
            return Err(BoardflowError::SessionInactive);
        }
        self.roll_back_active_session();
        Ok(())
    }

    async fn finish_item_drag(&mut self) -> BoardflowResult<MoveOutcome> {
        let session = self
            .guard
            .session()
            .expect("dragging implies a session")
            .clone();
        let origin_group_id = session.origin_group_id.expect("item sessions have an origin");

        // the flushed slot supersedes anything the timer emitted earlier
        let mut pending = None;
        while let Ok(fired) = self.fired_rx.try_recv() {
            pending = Some(fired);
        }
        if let Some(flushed) = self.debouncer.flush() {
            pending = Some(flushed);
        }

        let Some(pending) = pending else {
            let outcome = if self.resolver.last_target().is_none() {
                MoveOutcome::NoTarget
            } else {
                MoveOutcome::NoChange
            };
            self.roll_back_active_session();
            return Ok(outcome);
        };

        // dropping the item exactly where it started dispatches nothing
        if pending.to_group_id == origin_group_id && pending.to_index == session.origin_index {
            self.roll_back_active_session();
            return Ok(MoveOutcome::NoChange);
        }

        self.guard.begin_commit();
        let request = ClientMessage::MoveItem(MoveItemRequest {
            correlation_id: pending.correlation_id,
            project_id: self.project_id,
            item_id: pending.item_id,
            from_group_id: origin_group_id,
            to_group_id: pending.to_group_id,
            to_index: pending.to_index,
            grouping_mode: self.grouping_mode,
            team_id: self.team_id,
        });

        let response = match self.matcher.send_request(&self.channel, request).await {
            Ok(response) => response,
            Err(err) => {
                self.emit(EngineEvent::TransientError {
                    message: err.to_string(),
                });
                self.roll_back_active_session();
                return Err(err);
            }
        };
        let ServerMessage::MoveItemAck(ack) = response else {
            let err = BoardflowError::Transport("expected a move ack".to_string());
            self.emit(EngineEvent::TransientError {
                message: err.to_string(),
            });
            self.roll_back_active_session();
            return Err(err);
        };

        // a move between workflow statuses is only final once the
        // dependency gate clears it
        if self.grouping_mode == GroupKind::Status && pending.to_group_id != origin_group_id {
            match self
                .gate
                .check(&self.channel, pending.item_id, pending.to_group_id)
                .await
            {
                Ok(decision) if decision.accepted => {}
                Ok(decision) => {
                    self.emit(EngineEvent::DependencyBlocked {
                        item_id: pending.item_id,
                        blocking: decision.blocking.clone(),
                    });
                    self.roll_back_active_session();
                    return Err(BoardflowError::DependencyBlocked {
                        item_id: pending.item_id,
                        blocking: decision.blocking,
                    });
                }
                Err(err) => {
                    self.emit(EngineEvent::TransientError {
                        message: err.to_string(),
                    });
                    self.roll_back_active_session();
                    return Err(err);
                }
            }
        }

        self.commit_move(&pending, ack).await;
        Ok(MoveOutcome::Committed)
    }

    async fn finish_group_drag(&mut self) -> BoardflowResult<MoveOutcome> {
        let session = self
            .guard
            .session()
            .expect("dragging implies a session")
            .clone();
        let order = self.board.group_order();
        if order == session.snapshot.group_order() {
            self.roll_back_active_session();
            return Ok(MoveOutcome::NoChange);
        }

        self.guard.begin_commit();
        let request = ClientMessage::ReorderGroups(ReorderGroupsRequest {
            correlation_id: CorrelationId::generate(),
            project_id: self.project_id,
            ordered_group_ids: order,
        });
        match self.matcher.send_request(&self.channel, request).await {
            Ok(ServerMessage::ReorderGroupsAck { accepted: true, .. }) => {
                self.index.rebuild(&self.board);
                self.resolver.reset();
                self.guard.finish();
                info!("column reorder committed");
                Ok(MoveOutcome::Committed)
            }
            Ok(ServerMessage::ReorderGroupsAck {
                accepted: false, ..
            }) => {
                let reason = "column order rejected".to_string();
                self.emit(EngineEvent::MoveRejected {
                    reason: reason.clone(),
                });
                self.roll_back_active_session();
                Err(BoardflowError::Rejected { reason })
            }
            Ok(_) => {
                let err = BoardflowError::Transport("expected a reorder ack".to_string());
                self.emit(EngineEvent::TransientError {
                    message: err.to_string(),
                });
                self.roll_back_active_session();
                Err(err)
            }
            Err(err) => {
                self.emit(EngineEvent::TransientError {
                    message: err.to_string(),
                });
                self.roll_back_active_session();
                Err(err)
            }
        }
    }

    /// Adopt the server's canonical order and keys, then notify
    /// progress rollups. Runs only after the move is final.
    async fn commit_move(&mut self, pending: &PendingMove, ack: MoveItemResponse) {
        if !ack.accepted_order.is_empty() {
            let group = self.board.group_mut(pending.to_group_id);
            let mut current: Vec<ItemId> = group.ordered_item_ids.clone();
            current.sort();
            let mut accepted = ack.accepted_order.clone();
            accepted.sort();
            if current == accepted {
                group.ordered_item_ids = ack.accepted_order;
            } else {
                warn!(
                    group_id = %pending.to_group_id,
                    "server accepted_order is not a permutation of the local group; keeping local order"
                );
            }
        }
        for (item_id, sort_key) in ack.canonical_sort_keys {
            if let Some(item) = self.board.items.get_mut(&item_id) {
                item.adopt_sort_key(sort_key);
            }
        }
        self.index.rebuild(&self.board);

        for parent_id in self.applier.take_dirty_parents() {
            if let Err(err) = self
                .channel
                .send(ClientMessage::RecomputeProgress { item_id: parent_id })
                .await
            {
                warn!(%parent_id, %err, "failed to send progress recompute notification");
            }
            self.emit(EngineEvent::ProgressRecomputeQueued { parent_id });
        }

        self.applier.reset();
        self.resolver.reset();
        self.guard.finish();
        info!(item_id = %pending.item_id, to_group_id = %pending.to_group_id, "move committed");
    }

    fn roll_back_active_session(&mut self) {
        let session = self
            .guard
            .session()
            .expect("rollback requires a session")
            .clone();
        self.guard.begin_rollback();
        self.board = RollbackManager::rollback(
            &session,
            &mut self.debouncer,
            &mut self.applier,
            &mut self.resolver,
        );
        // discard anything the debounce timer emitted before cancel
        while self.fired_rx.try_recv().is_ok() {}
        self.index.rebuild(&self.board);
        self.guard.finish();
    }

    fn emit(&self, event: EngineEvent) {
        // a disconnected UI just means nobody is listening
        let _ = self.events_tx.send(event);
    }
}
