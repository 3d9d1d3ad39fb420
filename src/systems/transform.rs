//! Per-frame transform change notification.
//!
//! Runs for each live transform during the component `earlyupdate` pass,
//! before physics and before any `update` hook.

use crate::error::EngineResult;
use crate::events::eventtarget::dispatch_all;
use crate::events::transform::{TransformDelta, CHANGE, CHANNELS};
use crate::events::EventPayload;
use crate::world::ids::GameObjectId;
use crate::world::World;

/// Diff `go`'s transform against last frame and emit the change events.
///
/// The full delta goes out as `change` on `go` and `parentchange` on every
/// descendant. The user-written and engine-written parts go out the same
/// way as `modified` / `parentmodified` and `modifiedinternal` /
/// `parentmodifiedinternal`; an empty part emits nothing. Returns whether
/// anything changed.
pub fn tick_transform(world: &mut World, go: GameObjectId) -> EngineResult<bool> {
    let Some(object) = world.objects.get_mut(&go) else {
        return Ok(false);
    };
    let Some(frame) = object.transform.take_frame_delta() else {
        return Ok(false);
    };
    let descendants = world.descendants(go)?;
    let views = [frame.all, frame.user, frame.engine];
    let channels = CHANNELS.into_iter().zip(views);
    dispatch_all(CHANGE, channels, |((own, parent), delta): ((&'static str, &'static str), TransformDelta)| {
        if delta.is_empty() {
            return Ok(());
        }
        let payload = EventPayload::Transform(delta);
        world.emit(go, own, &payload)?;
        dispatch_all(parent, descendants.iter().copied(), |d: GameObjectId| {
            world.emit(d, parent, &payload).map(|_| ())
        })
        .map(|_| ())
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::transform::{MODIFIED, MODIFIED_INTERNAL, PARENT_CHANGE};
    use crate::math::Vector2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(world: &mut World, go: GameObjectId, event: &'static str, log: &Rc<RefCell<Vec<(&'static str, TransformDelta)>>>) {
        let log = Rc::clone(log);
        world
            .observe_transform(
                go,
                event,
                Box::new(move |delta: &TransformDelta| {
                    log.borrow_mut().push((event, *delta));
                    Ok(())
                }),
            )
            .unwrap();
    }

    #[test]
    fn unchanged_transform_emits_nothing() {
        let mut world = World::new();
        let go = world.create_game_object("still").unwrap();
        tick_transform(&mut world, go).unwrap();
        assert!(!tick_transform(&mut world, go).unwrap());
    }

    #[test]
    fn user_and_engine_parts_go_to_separate_events() {
        let mut world = World::new();
        let go = world.create_game_object("mover").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        record(&mut world, go, CHANGE, &log);
        record(&mut world, go, MODIFIED, &log);
        record(&mut world, go, MODIFIED_INTERNAL, &log);

        world.transform_mut(go).unwrap().set_position(Vector2::new(3.0, 0.0));
        world
            .transform_mut(go)
            .unwrap()
            .internal_set(None, None, Some(Vector2::new(2.0, 2.0)));
        assert!(tick_transform(&mut world, go).unwrap());

        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].0, CHANGE);
        assert_eq!(log[1].0, MODIFIED);
        assert_eq!(log[1].1.position, Some(Vector2::new(3.0, 0.0)));
        assert_eq!(log[1].1.scale, None);
        assert_eq!(log[2].0, MODIFIED_INTERNAL);
        assert_eq!(log[2].1.scale, Some(Vector2::new(1.0, 1.0)));
    }

    #[test]
    fn descendants_hear_parent_events() {
        let mut world = World::new();
        let root = world.create_game_object("root").unwrap();
        let child = world.create_child(root, "child").unwrap();
        let grandchild = world.create_child(child, "grandchild").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        record(&mut world, grandchild, PARENT_CHANGE, &log);

        world.transform_mut(root).unwrap().translate(Vector2::new(1.0, 1.0));
        tick_transform(&mut world, root).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }
}
