//! Hand skeleton markers and bone segments.

use std::collections::HashMap;

use crate::geom::{Vec3, segment_between};
use crate::raycast::SurfaceRaycaster;
use crate::scene::{Color, Geometry, Node, NodeId, Scene};
use crate::skeleton::{HAND_BONES, HandJoint};
use crate::types::Frame;
use crate::vision::{HandObservation, HandPoseEstimator, ObservedPoint};

#[derive(Clone, Copy, Debug)]
pub struct HandOverlayConfig {
    /// Both joints of a pair must score strictly above this to be drawn.
    pub confidence_threshold: f32,
    pub marker_radius: f32,
    pub marker_color: Color,
    pub bone_radius: f32,
    pub bone_color: Color,
}

impl Default for HandOverlayConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            marker_radius: 0.01,
            marker_color: Color::BLUE,
            bone_radius: 0.002,
            bone_color: Color::WHITE,
        }
    }
}

/// What one processed frame did to the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub hand_detected: bool,
    pub markers_refreshed: usize,
    pub raycast_misses: usize,
    pub bones_refreshed: usize,
    pub bones_skipped: usize,
}

/// Maintains one sphere marker per hand joint and one cylinder segment per
/// bone pair, refreshed on every processed frame.
///
/// Markers are created lazily the first time their joint clears the
/// confidence gate and are repositioned in place afterwards; the node set
/// only ever grows up to one node per joint plus one per pair.
pub struct HandOverlay {
    estimator: Box<dyn HandPoseEstimator>,
    raycaster: Box<dyn SurfaceRaycaster>,
    cfg: HandOverlayConfig,
    joint_markers: HashMap<HandJoint, NodeId>,
    bones: HashMap<(HandJoint, HandJoint), NodeId>,
}

impl HandOverlay {
    pub fn new(
        estimator: Box<dyn HandPoseEstimator>,
        raycaster: Box<dyn SurfaceRaycaster>,
        cfg: HandOverlayConfig,
    ) -> Self {
        Self {
            estimator,
            raycaster,
            cfg,
            joint_markers: HashMap::new(),
            bones: HashMap::new(),
        }
    }

    /// Runs estimation on the frame and refreshes markers and bones from the
    /// result. Estimation failures and frames without a hand leave the scene
    /// untouched.
    pub fn process_frame(&mut self, scene: &mut Scene, frame: &Frame) -> FrameStats {
        let observation = match self.estimator.estimate(frame) {
            Ok(Some(observation)) => observation,
            Ok(None) => return FrameStats::default(),
            Err(err) => {
                log::warn!("hand pose estimation failed: {err:?}");
                return FrameStats::default();
            }
        };

        self.apply_observation(scene, &observation)
    }

    fn apply_observation(&mut self, scene: &mut Scene, observation: &HandObservation) -> FrameStats {
        let mut stats = FrameStats {
            hand_detected: true,
            ..FrameStats::default()
        };
        // Shared joints sit in several pairs; refresh each at most once.
        let mut refreshed = [false; HandJoint::COUNT];

        for &(a, b) in HAND_BONES.iter() {
            let (Some(pa), Some(pb)) = (observation.point(a), observation.point(b)) else {
                continue;
            };
            if pa.confidence <= self.cfg.confidence_threshold
                || pb.confidence <= self.cfg.confidence_threshold
            {
                stats.bones_skipped += 1;
                continue;
            }

            self.refresh_marker(scene, a, pa, &mut refreshed, &mut stats);
            self.refresh_marker(scene, b, pb, &mut refreshed, &mut stats);
            self.refresh_bone(scene, a, b, &mut stats);
        }

        stats
    }

    fn refresh_marker(
        &mut self,
        scene: &mut Scene,
        joint: HandJoint,
        point: ObservedPoint,
        refreshed: &mut [bool; HandJoint::COUNT],
        stats: &mut FrameStats,
    ) {
        if refreshed[joint.landmark_index()] {
            return;
        }
        refreshed[joint.landmark_index()] = true;

        let radius = self.cfg.marker_radius;
        let color = self.cfg.marker_color;
        let node_id = *self.joint_markers.entry(joint).or_insert_with(|| {
            scene.push(Node::sphere(
                format!("hand-{}", joint.label()),
                radius,
                color,
            ))
        });

        // A miss keeps whatever position the marker had before.
        match self.raycaster.cast(point.x, point.y) {
            Some(position) => {
                scene.node_mut(node_id).transform.position = position;
                stats.markers_refreshed += 1;
            }
            None => stats.raycast_misses += 1,
        }
    }

    fn refresh_bone(
        &mut self,
        scene: &mut Scene,
        a: HandJoint,
        b: HandJoint,
        stats: &mut FrameStats,
    ) {
        let (Some(&marker_a), Some(&marker_b)) =
            (self.joint_markers.get(&a), self.joint_markers.get(&b))
        else {
            return;
        };
        let start = scene.node(marker_a).transform.position;
        let end = scene.node(marker_b).transform.position;
        let segment = segment_between(start, end);

        let radius = self.cfg.bone_radius;
        let color = self.cfg.bone_color;
        let node_id = *self.bones.entry((a, b)).or_insert_with(|| {
            scene.push(Node::cylinder(
                format!("bone-{}-{}", a.label(), b.label()),
                radius,
                0.0,
                color,
            ))
        });

        let node = scene.node_mut(node_id);
        node.transform = segment.transform;
        if let Geometry::Cylinder { height, .. } = &mut node.geometry {
            *height = segment.length;
        }
        stats.bones_refreshed += 1;
    }

    /// Marker node for a joint, if one has been created.
    pub fn marker(&self, joint: HandJoint) -> Option<NodeId> {
        self.joint_markers.get(&joint).copied()
    }

    /// Segment node for a bone pair, if one has been created.
    pub fn bone(&self, pair: (HandJoint, HandJoint)) -> Option<NodeId> {
        self.bones.get(&pair).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.joint_markers.len()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Current 3D position of a joint marker, for hosts that want the pose
    /// without walking the scene.
    pub fn marker_position(&self, scene: &Scene, joint: HandJoint) -> Option<Vec3> {
        self.marker(joint)
            .map(|id| scene.node(id).transform.position)
    }
}
