//! Coordinate-space algebra over parent chains.
//!
//! A [`Transformation`] is a node of a coordinate tree: a local position,
//! rotation and scale expressed in the frame of its optional parent. Live
//! transforms are turned into transformation chains by the
//! [`World`](crate::world::World); the functions here are pure and never look
//! at component state.
//!
//! Composition follows the usual 2D rule used for world transforms:
//!
//! ```text
//! position' = parent.position + rotate(child.position * parent.scale, parent.rotation)
//! rotation' = parent.rotation + child.rotation
//! scale'    = child.scale * parent.scale
//! ```
//!
//! Every chain walk is bounded by [`MAX_HIERARCHY_DEPTH`] and fails with
//! [`EngineError::HierarchyTooDeep`] instead of looping.

use serde::Serialize;
use std::rc::Rc;

use super::angle::Angle;
use super::vector2::Vector2;
use crate::error::{EngineError, EngineResult};

/// Deepest parent chain any walk will follow.
pub const MAX_HIERARCHY_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transformation {
    pub id: u64,
    pub position: Vector2,
    pub rotation: Angle,
    pub scale: Vector2,
    pub parent: Option<Rc<Transformation>>,
}

impl Transformation {
    /// Identity transformation with no parent.
    pub fn identity(id: u64) -> Self {
        Self {
            id,
            position: Vector2::ZERO,
            rotation: Angle::ZERO,
            scale: Vector2::ONE,
            parent: None,
        }
    }

    pub fn with_position(mut self, position: Vector2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Angle) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_parent(mut self, parent: Option<Rc<Transformation>>) -> Self {
        self.parent = parent;
        self
    }

    /// Same local values, no parent.
    pub fn detached(&self) -> Self {
        Self {
            parent: None,
            ..self.clone()
        }
    }

    /// Ancestors from the direct parent upwards.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent.as_deref(),
        }
    }

    /// Number of ancestors.
    pub fn depth(&self) -> EngineResult<usize> {
        let mut depth = 0;
        for _ in self.ancestors() {
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
            }
        }
        Ok(depth)
    }

    /// Compare local values (parents are ignored).
    pub fn local_approx_eq(&self, other: &Transformation, epsilon: f64) -> bool {
        self.position.approx_eq(other.position, epsilon)
            && self.rotation.equals(&other.rotation, epsilon)
            && self.scale.approx_eq(other.scale, epsilon)
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a Transformation>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Transformation;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

/// How two transformations relate in the coordinate tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Same,
    /// The first is an ancestor of the second, `n` levels up.
    Ancestor(usize),
    /// The first is a descendant of the second, `n` levels down.
    Descendant(usize),
    Unrelated,
}

impl Relation {
    /// Positive when the first is an ancestor, negative when it is a
    /// descendant, `None` when unrelated.
    pub fn signed_depth(self) -> Option<i64> {
        match self {
            Relation::Same => Some(0),
            Relation::Ancestor(d) => Some(d as i64),
            Relation::Descendant(d) => Some(-(d as i64)),
            Relation::Unrelated => None,
        }
    }
}

fn depth_of(chain_of: &Transformation, id: u64) -> EngineResult<Option<usize>> {
    for (index, ancestor) in chain_of.ancestors().enumerate() {
        if index >= MAX_HIERARCHY_DEPTH {
            return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
        }
        if ancestor.id == id {
            return Ok(Some(index + 1));
        }
    }
    Ok(None)
}

/// Find the structural relation between `t1` and `t2` by id.
pub fn find_relation(t1: &Transformation, t2: &Transformation) -> EngineResult<Relation> {
    if t1.id == t2.id {
        return Ok(Relation::Same);
    }
    if let Some(depth) = depth_of(t2, t1.id)? {
        return Ok(Relation::Ancestor(depth));
    }
    if let Some(depth) = depth_of(t1, t2.id)? {
        return Ok(Relation::Descendant(depth));
    }
    Ok(Relation::Unrelated)
}

/// Express `child` one level up, in the frame `parent` lives in.
pub fn to_parent(child: &Transformation, parent: &Transformation) -> Transformation {
    Transformation {
        id: child.id,
        position: parent.position + (child.position * parent.scale).rotated(parent.rotation),
        rotation: parent.rotation + child.rotation,
        scale: child.scale * parent.scale,
        parent: parent.parent.clone(),
    }
}

/// Express `t`, given in the frame `frame` lives in, relative to `frame`.
///
/// Exact inverse of [`to_parent`]. A zero scale component on `frame`
/// produces non-finite values.
pub fn to_child(t: &Transformation, frame: &Rc<Transformation>) -> Transformation {
    Transformation {
        id: t.id,
        position: (t.position - frame.position).rotated(-frame.rotation) / frame.scale,
        rotation: t.rotation - frame.rotation,
        scale: t.scale / frame.scale,
        parent: Some(Rc::clone(frame)),
    }
}

/// Express `a` relative to `b`, both given in the same frame.
///
/// `common_parent` overrides the frame both are assumed to share; by
/// default it is `b`'s parent. The result is parented to `b`.
pub fn to_sibling(
    a: &Transformation,
    b: &Transformation,
    common_parent: Option<&Rc<Transformation>>,
) -> Transformation {
    let frame = Rc::new(Transformation {
        parent: common_parent.cloned().or_else(|| b.parent.clone()),
        ..b.clone()
    });
    to_child(a, &frame)
}

/// Walk the parent chain up to the root, composing at every level.
pub fn to_global(t: &Transformation) -> EngineResult<Transformation> {
    let mut current = t.clone();
    let mut steps = 0;
    while let Some(parent) = current.parent.clone() {
        steps += 1;
        if steps > MAX_HIERARCHY_DEPTH {
            return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
        }
        current = to_parent(&current, &parent);
    }
    Ok(current)
}

/// Root-first list of `target` and its ancestors.
fn frame_chain(target: &Rc<Transformation>) -> EngineResult<Vec<Rc<Transformation>>> {
    let mut chain = vec![Rc::clone(target)];
    let mut cursor = target.parent.clone();
    while let Some(frame) = cursor {
        if chain.len() > MAX_HIERARCHY_DEPTH {
            return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
        }
        cursor = frame.parent.clone();
        chain.push(frame);
    }
    chain.reverse();
    Ok(chain)
}

/// Express `t` in the local frame of `target` (`None` is world space).
///
/// `t` is first lifted through its own parents until it reaches the deepest
/// frame it shares with `target`, then pushed down `target`'s chain. When
/// the two chains share nothing the shared frame is world space, so `t` is
/// globalized and re-derived from `target`'s root.
pub fn to_local(
    t: &Transformation,
    target: Option<&Rc<Transformation>>,
) -> EngineResult<Transformation> {
    let Some(target) = target else {
        return to_global(t);
    };
    if t.parent.as_ref().is_some_and(|p| p.id == target.id) {
        return Ok(t.clone());
    }

    let chain = frame_chain(target)?;
    let mut own_frames = Vec::new();
    for (index, ancestor) in t.ancestors().enumerate() {
        if index >= MAX_HIERARCHY_DEPTH {
            return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
        }
        own_frames.push(ancestor.id);
    }
    let shared = chain
        .iter()
        .rposition(|frame| own_frames.contains(&frame.id));
    let shared_id = shared.map(|index| chain[index].id);

    let mut current = t.clone();
    while let Some(parent) = current.parent.clone() {
        if Some(parent.id) == shared_id {
            break;
        }
        current = to_parent(&current, &parent);
    }

    let start = shared.map_or(0, |index| index + 1);
    for frame in &chain[start..] {
        current = to_child(&current, frame);
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn node(id: u64, x: f64, y: f64) -> Transformation {
        Transformation::identity(id).with_position(Vector2::new(x, y))
    }

    #[test]
    fn to_parent_composes_scale_then_rotation() {
        let parent = node(1, 100.0, 100.0)
            .with_rotation(Angle::from_degrees(90.0))
            .with_scale(Vector2::new(2.0, 2.0));
        let child = node(2, 40.0, 0.0);
        let up = to_parent(&child, &parent);
        assert!(up.position.approx_eq(Vector2::new(100.0, 180.0), EPSILON));
        assert!(up.rotation.equals(&Angle::from_degrees(90.0), EPSILON));
        assert!(up.scale.approx_eq(Vector2::new(2.0, 2.0), EPSILON));
    }

    #[test]
    fn to_child_inverts_to_parent() {
        let parent = Rc::new(
            node(1, 3.0, -7.0)
                .with_rotation(Angle::from_degrees(33.0))
                .with_scale(Vector2::new(2.0, 0.5)),
        );
        let child = node(2, 5.0, 1.0)
            .with_rotation(Angle::from_degrees(10.0))
            .with_scale(Vector2::new(3.0, 3.0));
        let back = to_child(&to_parent(&child, &parent), &parent);
        assert!(back.local_approx_eq(&child, EPSILON));
        assert_eq!(back.parent.as_ref().map(|p| p.id), Some(1));
    }

    #[test]
    fn to_sibling_expresses_relative_offset() {
        let a = node(1, 2.0, 0.0);
        let b = node(2, 0.0, 5.0);
        let rel = to_sibling(&a, &b, None);
        assert!(rel.position.approx_eq(Vector2::new(2.0, -5.0), EPSILON));
        assert_eq!(rel.parent.as_ref().map(|p| p.id), Some(2));
    }

    #[test]
    fn find_relation_reports_signed_depth() {
        let root = Rc::new(node(1, 0.0, 0.0));
        let mid = Rc::new(node(2, 0.0, 0.0).with_parent(Some(Rc::clone(&root))));
        let leaf = node(3, 0.0, 0.0).with_parent(Some(Rc::clone(&mid)));
        let other = node(4, 0.0, 0.0);

        assert_eq!(find_relation(&root, &leaf).unwrap(), Relation::Ancestor(2));
        assert_eq!(find_relation(&leaf, &mid).unwrap(), Relation::Descendant(1));
        assert_eq!(find_relation(&leaf, &leaf).unwrap().signed_depth(), Some(0));
        assert_eq!(find_relation(&leaf, &other).unwrap(), Relation::Unrelated);
        assert_eq!(Relation::Descendant(2).signed_depth(), Some(-2));
    }

    #[test]
    fn to_local_descends_into_target_under_same_parent() {
        let root = Rc::new(node(1, 10.0, 0.0));
        let target = Rc::new(node(2, 0.0, 5.0).with_parent(Some(Rc::clone(&root))));
        let t = node(3, 2.0, 0.0).with_parent(Some(Rc::clone(&root)));
        let local = to_local(&t, Some(&target)).unwrap();
        assert!(local.position.approx_eq(Vector2::new(2.0, -5.0), EPSILON));
    }

    #[test]
    fn to_local_without_target_is_global() {
        let root = Rc::new(node(1, 10.0, 0.0));
        let t = node(2, 2.0, 0.0).with_parent(Some(root));
        let g = to_local(&t, None).unwrap();
        assert!(g.position.approx_eq(Vector2::new(12.0, 0.0), EPSILON));
        assert!(g.parent.is_none());
    }

    #[test]
    fn depth_counts_ancestors() {
        let root = Rc::new(node(1, 0.0, 0.0));
        let t = node(2, 0.0, 0.0).with_parent(Some(root));
        assert_eq!(t.depth().unwrap(), 1);
        assert_eq!(t.ancestors().count(), 1);
    }
}
