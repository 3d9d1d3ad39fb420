//! Update phase scheduler.
//!
//! Each frame runs `earlyupdate`, `update` and `lateupdate` as two passes:
//! first over Behaviour components (game logic), then over every other
//! component. Within a pass components are visited in registration order.
//!
//! The set of components is snapshotted before a pass. Each one is checked
//! again right before its turn, so a component destroyed or deactivated by
//! an earlier hook in the same pass is skipped, and one added during the
//! pass waits for the next.

use log::trace;

use crate::components::kind::ComponentKind;
use crate::error::EngineResult;
use crate::events::{self, EventPayload};
use crate::systems::transform::tick_transform;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Behaviour,
    Component,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    EarlyUpdate,
    Update,
    LateUpdate,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::EarlyUpdate, Phase::Update, Phase::LateUpdate];

    pub fn event(self) -> &'static str {
        match self {
            Phase::EarlyUpdate => events::EARLY_UPDATE,
            Phase::Update => events::UPDATE,
            Phase::LateUpdate => events::LATE_UPDATE,
        }
    }
}

impl Pass {
    fn includes(self, kind: ComponentKind) -> bool {
        match self {
            Pass::Behaviour => kind == ComponentKind::Behaviour,
            Pass::Component => kind != ComponentKind::Behaviour,
        }
    }
}

/// Run one pass of one phase. Transforms tick during the component
/// `earlyupdate` pass.
///
/// A failing hook aborts the pass and its error is returned. Returns the
/// number of hooks invoked plus transforms that reported a change.
pub fn run_phase(world: &mut World, pass: Pass, phase: Phase) -> EngineResult<usize> {
    let snapshot = world.components().to_vec();
    let mut invoked = 0;
    for id in snapshot {
        let Some(info) = world.component_info(id) else {
            continue;
        };
        if info.pending_destroy || !pass.includes(info.kind) || !world.is_component_active(id) {
            continue;
        }
        if info.kind == ComponentKind::Transform {
            if phase == Phase::EarlyUpdate && tick_transform(world, info.owner)? {
                invoked += 1;
            }
            continue;
        }
        invoked += world.dispatch(id, phase.event(), &EventPayload::None)?;
    }
    trace!("{:?} {:?} pass invoked {} hooks", pass, phase, invoked);
    Ok(invoked)
}
