//! Shared harness: a board fixture, column/row geometry, and an
//! in-process fake server answering over the in-memory channel.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use boardflow_core::EngineConfig;
use boardflow_domain::{
    Board, DropTarget, DroppableRegion, Group, GroupId, GroupKind, Item, ItemId, Point, Rect,
    SortKey,
};
use boardflow_engine::{
    BoardEngine, ClientMessage, EngineEvent, InMemoryChannel, MoveItemResponse, ResponseMatcher,
    ServerMessage,
};

/// How the fake server answers.
#[derive(Debug, Clone)]
pub enum ServerBehavior {
    AcceptAll,
    /// Gate requests are rejected with these blocker names.
    RejectGate(Vec<String>),
    /// Column reorders come back `accepted: false`.
    RejectReorder,
    /// Never answer anything; requests time out.
    Silent,
    /// Accept the move and return this canonical order and key set.
    CanonicalKeys(Vec<ItemId>, HashMap<ItemId, SortKey>),
}

pub struct Harness {
    pub engine: BoardEngine<InMemoryChannel>,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
    pub seen: Arc<Mutex<Vec<ClientMessage>>>,
    pub server: JoinHandle<()>,
    pub todo: GroupId,
    pub doing: GroupId,
    pub done: GroupId,
    pub a: ItemId,
    pub b: ItemId,
}

/// Board `{Todo: [A, B], Doing: [], Done: []}`.
pub fn three_column_board() -> (Board, GroupId, GroupId, GroupId, ItemId, ItemId) {
    let mut board = Board::new();
    let todo = Group::new(GroupKind::Status, "Todo".to_string());
    let doing = Group::new(GroupKind::Status, "Doing".to_string());
    let done = Group::new(GroupKind::Status, "Done".to_string());
    let (todo_id, doing_id, done_id) = (todo.id, doing.id, done.id);
    board.add_group(todo);
    board.add_group(doing);
    board.add_group(done);
    let a = Item::new(todo_id, "A".to_string(), SortKey::new(0.0));
    let b = Item::new(todo_id, "B".to_string(), SortKey::new(1.0));
    let (a_id, b_id) = (a.id, b.id);
    board.add_item(a);
    board.add_item(b);
    (board, todo_id, doing_id, done_id, a_id, b_id)
}

pub fn harness(behavior: ServerBehavior) -> Harness {
    let (board, todo, doing, done, a, b) = three_column_board();
    harness_with_board(behavior, board, todo, doing, done, a, b)
}

pub fn harness_with_board(
    behavior: ServerBehavior,
    board: Board,
    todo: GroupId,
    doing: GroupId,
    done: GroupId,
    a: ItemId,
    b: ItemId,
) -> Harness {
    let (channel, outbound_rx) = InMemoryChannel::pair();
    let (engine, events) = BoardEngine::new(
        board,
        channel,
        EngineConfig::default(),
        GroupKind::Status,
        Uuid::new_v4(),
        Uuid::new_v4(),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let server = spawn_server(outbound_rx, engine.matcher(), behavior, Arc::clone(&seen));
    Harness {
        engine,
        events,
        seen,
        server,
        todo,
        doing,
        done,
        a,
        b,
    }
}

pub fn spawn_server(
    mut outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
    matcher: ResponseMatcher,
    behavior: ServerBehavior,
    seen: Arc<Mutex<Vec<ClientMessage>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            seen.lock().unwrap().push(message.clone());
            if matches!(behavior, ServerBehavior::Silent) {
                continue;
            }
            match message {
                ClientMessage::MoveItem(req) => {
                    let (accepted_order, canonical_sort_keys) = match &behavior {
                        ServerBehavior::CanonicalKeys(order, keys) => {
                            (order.clone(), keys.clone())
                        }
                        _ => (Vec::new(), HashMap::new()),
                    };
                    matcher.dispatch_inbound(ServerMessage::MoveItemAck(MoveItemResponse {
                        correlation_id: req.correlation_id,
                        accepted_order,
                        canonical_sort_keys,
                    }));
                }
                ClientMessage::ReorderGroups(req) => {
                    matcher.dispatch_inbound(ServerMessage::ReorderGroupsAck {
                        correlation_id: req.correlation_id,
                        accepted: !matches!(behavior, ServerBehavior::RejectReorder),
                    });
                }
                ClientMessage::CheckDependencyGate(req) => {
                    let (accepted, blocking) = match &behavior {
                        ServerBehavior::RejectGate(blocking) => (false, blocking.clone()),
                        _ => (true, Vec::new()),
                    };
                    matcher.dispatch_inbound(ServerMessage::GateAck {
                        correlation_id: req.correlation_id,
                        accepted,
                        blocking,
                    });
                }
                ClientMessage::RecomputeProgress { .. } => {}
            }
        }
    })
}

/// Columns 100px wide at x = 0, 100, 200; item rows 40px tall inside
/// their column.
pub fn regions(board: &Board) -> Vec<DroppableRegion> {
    let mut out = Vec::new();
    for (col, group) in board.groups.iter().enumerate() {
        let x = col as f64 * 100.0;
        out.push(DroppableRegion {
            target: DropTarget::Group(group.id),
            rect: Rect::new(x, 0.0, 100.0, 400.0),
        });
        for (row, item_id) in group.ordered_item_ids.iter().enumerate() {
            out.push(DroppableRegion {
                target: DropTarget::Item(*item_id),
                rect: Rect::new(x, row as f64 * 40.0, 100.0, 40.0),
            });
        }
    }
    out
}

/// Pointer position inside column `col`, row `row`.
pub fn at(col: usize, row: usize) -> Point {
    Point::new(col as f64 * 100.0 + 50.0, row as f64 * 40.0 + 20.0)
}

pub fn move_item_requests(seen: &Arc<Mutex<Vec<ClientMessage>>>) -> Vec<ClientMessage> {
    seen.lock()
        .unwrap()
        .iter()
        .filter(|m| matches!(m, ClientMessage::MoveItem(_)))
        .cloned()
        .collect()
}
