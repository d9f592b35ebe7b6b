use uuid::Uuid;

use boardflow_core::{BoardflowError, BoardflowResult};

use crate::{board::Board, group::GroupId};

/// Whether the session is dragging an item between groups or
/// reordering the groups (columns) themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Item,
    Group,
}

/// Session state machine. `Dragging` re-enters itself on every pointer
/// move; `Committing` and `RollingBack` always terminate to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Dragging,
    Committing,
    RollingBack,
}

/// The ephemeral state of one in-progress drag interaction.
///
/// `snapshot` is captured at session start and is immutable for the
/// lifetime of the session: it is the only valid rollback target.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub kind: SessionKind,
    pub subject_id: Uuid,
    pub origin_group_id: Option<GroupId>,
    pub origin_index: usize,
    pub snapshot: Board,
    pub sequence: u64,
}

/// Enforces that at most one drag session (of either kind) is open.
///
/// `begin` while a session is active is a user-visible rejection, not a
/// panic: a second pointer can legitimately land mid-drag. Illegal
/// phase transitions, by contrast, are programming errors and panic.
#[derive(Debug, Default)]
pub struct SessionGuard {
    phase: SessionPhase,
    session: Option<DragSession>,
    next_sequence: u64,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn begin(
        &mut self,
        kind: SessionKind,
        subject_id: Uuid,
        origin_group_id: Option<GroupId>,
        origin_index: usize,
        snapshot: Board,
    ) -> BoardflowResult<&DragSession> {
        if self.phase != SessionPhase::Idle {
            return Err(BoardflowError::SessionActive);
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.phase = SessionPhase::Dragging;
        self.session = Some(DragSession {
            kind,
            subject_id,
            origin_group_id,
            origin_index,
            snapshot,
            sequence,
        });
        Ok(self.session.as_ref().expect("just set"))
    }

    pub fn begin_commit(&mut self) {
        assert_eq!(
            self.phase,
            SessionPhase::Dragging,
            "commit may only start from Dragging"
        );
        self.phase = SessionPhase::Committing;
    }

    pub fn begin_rollback(&mut self) {
        assert!(
            matches!(self.phase, SessionPhase::Dragging | SessionPhase::Committing),
            "rollback may only start from Dragging or Committing"
        );
        self.phase = SessionPhase::RollingBack;
    }

    /// Terminate the session, returning to `Idle`.
    pub fn finish(&mut self) -> DragSession {
        assert!(
            matches!(
                self.phase,
                SessionPhase::Committing | SessionPhase::RollingBack
            ),
            "finish may only follow Committing or RollingBack"
        );
        self.phase = SessionPhase::Idle;
        self.session.take().expect("active session")
    }
}
