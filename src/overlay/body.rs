//! Marker spheres on tracked body joints.

use std::collections::HashMap;
use std::fmt;

use crate::geom::Transform;
use crate::scene::{Color, Node, NodeId, Scene};
use crate::skeleton::BodyJoint;

/// Stable identity of a tracked anchor across add and update events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(u64);

impl AnchorId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked body with per-joint model transforms. Joints the tracker could
/// not resolve are simply absent.
#[derive(Clone, Debug)]
pub struct BodyAnchor {
    pub id: AnchorId,
    joints: HashMap<BodyJoint, Transform>,
}

impl BodyAnchor {
    pub fn new(id: AnchorId) -> Self {
        Self {
            id,
            joints: HashMap::new(),
        }
    }

    pub fn set_joint(&mut self, joint: BodyJoint, transform: Transform) {
        self.joints.insert(joint, transform);
    }

    pub fn with_joint(mut self, joint: BodyJoint, transform: Transform) -> Self {
        self.joints.insert(joint, transform);
        self
    }

    pub fn joint_transform(&self, joint: BodyJoint) -> Option<Transform> {
        self.joints.get(&joint).copied()
    }
}

/// Anchors a tracking session reports. Overlays pick out the variants they
/// care about and ignore the rest.
#[derive(Clone, Debug)]
pub enum Anchor {
    Body(BodyAnchor),
    /// A plain positional anchor (detected plane, feature point, ...).
    World { id: AnchorId, transform: Transform },
}

#[derive(Clone, Debug)]
pub struct BodyOverlayConfig {
    /// Joints that get a marker. Anything else the anchor reports is ignored.
    pub joints: Vec<BodyJoint>,
    pub marker_radius: f32,
    pub marker_color: Color,
}

impl Default for BodyOverlayConfig {
    fn default() -> Self {
        Self {
            joints: vec![BodyJoint::LeftShoulder, BodyJoint::RightShoulder],
            marker_radius: 0.05,
            marker_color: Color::RED,
        }
    }
}

/// Keeps one sphere marker per (anchor, joint) at the joint's latest model
/// transform. Add and update events are handled identically.
pub struct BodyOverlay {
    cfg: BodyOverlayConfig,
    markers: HashMap<(AnchorId, BodyJoint), NodeId>,
}

impl BodyOverlay {
    pub fn new(cfg: BodyOverlayConfig) -> Self {
        Self {
            cfg,
            markers: HashMap::new(),
        }
    }

    pub fn anchors_added(&mut self, scene: &mut Scene, anchors: &[Anchor]) {
        self.apply(scene, anchors);
    }

    pub fn anchors_updated(&mut self, scene: &mut Scene, anchors: &[Anchor]) {
        self.apply(scene, anchors);
    }

    fn apply(&mut self, scene: &mut Scene, anchors: &[Anchor]) {
        let radius = self.cfg.marker_radius;
        let color = self.cfg.marker_color;

        for anchor in anchors {
            let Anchor::Body(body) = anchor else { continue };
            for &joint in &self.cfg.joints {
                let Some(transform) = body.joint_transform(joint) else {
                    continue;
                };
                let node_id = *self.markers.entry((body.id, joint)).or_insert_with(|| {
                    log::debug!("placing marker for {} on anchor {}", joint.label(), body.id);
                    scene.push(Node::sphere(
                        format!("body-{}-{}", body.id, joint.label()),
                        radius,
                        color,
                    ))
                });
                scene.node_mut(node_id).transform = transform;
            }
        }
    }

    /// Marker node for a joint, if one has been placed.
    pub fn marker(&self, anchor: AnchorId, joint: BodyJoint) -> Option<NodeId> {
        self.markers.get(&(anchor, joint)).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl Default for BodyOverlay {
    fn default() -> Self {
        Self::new(BodyOverlayConfig::default())
    }
}
