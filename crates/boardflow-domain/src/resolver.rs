use crate::{
    board::Board,
    geometry::{Point, Rect},
    group::GroupId,
    item::ItemId,
    session::SessionKind,
};

/// What a droppable region stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Item(ItemId),
    Group(GroupId),
}

/// Screen-space region registered by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroppableRegion {
    pub target: DropTarget,
    pub rect: Rect,
}

/// A resolved drop candidate: the destination group, the insertion
/// index within it, and the region the pointer was attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub group_id: GroupId,
    pub index: usize,
    pub over: DropTarget,
}

/// Turns pointer geometry into a single drop candidate.
///
/// Containment first, closest-center fallback second, and a group hit
/// refines to the nearest item row inside it for an insertion index.
/// Identical geometry and regions always yield an identical result:
/// candidates are scanned in region order and ties keep the first.
///
/// The resolver remembers the last non-null target so a transient miss
/// (pointer slipping between rows) does not clear the drop indicator.
#[derive(Debug, Default)]
pub struct DropResolver {
    last_target: Option<ResolvedTarget>,
}

impl DropResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the remembered target. Called at session end.
    pub fn reset(&mut self) {
        self.last_target = None;
    }

    pub fn last_target(&self) -> Option<ResolvedTarget> {
        self.last_target
    }

    pub fn resolve(
        &mut self,
        pointer: Point,
        regions: &[DroppableRegion],
        kind: SessionKind,
        board: &Board,
    ) -> Option<ResolvedTarget> {
        let chosen = Self::pick_region(pointer, regions, kind);
        let resolved = chosen.map(|region| Self::refine(pointer, region, regions, board, kind));
        match resolved {
            Some(target) => {
                self.last_target = Some(target);
                Some(target)
            }
            // jitter guard: keep the indicator where it was
            None => self.last_target,
        }
    }

    fn compatible(target: DropTarget, kind: SessionKind) -> bool {
        match kind {
            SessionKind::Group => matches!(target, DropTarget::Group(_)),
            SessionKind::Item => true,
        }
    }

    fn pick_region(
        pointer: Point,
        regions: &[DroppableRegion],
        kind: SessionKind,
    ) -> Option<DroppableRegion> {
        let candidates: Vec<DroppableRegion> = regions
            .iter()
            .copied()
            .filter(|r| Self::compatible(r.target, kind))
            .collect();

        // phase 1: direct containment, item regions preferred for item drags
        let hits: Vec<DroppableRegion> = candidates
            .iter()
            .copied()
            .filter(|r| r.rect.contains(pointer))
            .collect();
        if kind == SessionKind::Item {
            if let Some(hit) = hits
                .iter()
                .find(|r| matches!(r.target, DropTarget::Item(_)))
            {
                return Some(*hit);
            }
        }
        if let Some(hit) = hits.first() {
            return Some(*hit);
        }

        // phase 2: closest center among the compatible set
        candidates.into_iter().min_by(|a, b| {
            pointer
                .distance_sq(a.rect.center())
                .total_cmp(&pointer.distance_sq(b.rect.center()))
        })
    }

    fn refine(
        pointer: Point,
        region: DroppableRegion,
        regions: &[DroppableRegion],
        board: &Board,
        kind: SessionKind,
    ) -> ResolvedTarget {
        match region.target {
            DropTarget::Item(item_id) => {
                let group_id = board.item(item_id).group_id;
                let index = board
                    .group(group_id)
                    .position_of(item_id)
                    .unwrap_or_else(|| panic!("item {item_id} missing from its group order"));
                ResolvedTarget {
                    group_id,
                    index,
                    over: region.target,
                }
            }
            DropTarget::Group(group_id) => {
                // column drags land on the column itself; the index is
                // its position in the board's group order
                if kind == SessionKind::Group {
                    return ResolvedTarget {
                        group_id,
                        index: board.group_position(group_id),
                        over: region.target,
                    };
                }
                let group = board.group(group_id);
                if group.is_empty() {
                    return ResolvedTarget {
                        group_id,
                        index: 0,
                        over: region.target,
                    };
                }
                // nearest item row inside the group, else drop at the tail
                let nearest = regions
                    .iter()
                    .filter_map(|r| match r.target {
                        DropTarget::Item(id) if board.item(id).group_id == group_id => {
                            Some((id, r.rect))
                        }
                        _ => None,
                    })
                    .min_by(|a, b| {
                        pointer
                            .distance_sq(a.1.center())
                            .total_cmp(&pointer.distance_sq(b.1.center()))
                    });
                match nearest {
                    Some((item_id, _)) => ResolvedTarget {
                        group_id,
                        index: group.position_of(item_id).expect("item is in the group"),
                        over: DropTarget::Item(item_id),
                    },
                    None => ResolvedTarget {
                        group_id,
                        index: group.len(),
                        over: region.target,
                    },
                }
            }
        }
    }
}
