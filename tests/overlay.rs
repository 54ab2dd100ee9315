//! Overlay behavior against scripted estimation, ray-cast, and torch seams.

use std::collections::{HashMap, VecDeque};

use anyhow::anyhow;
use pose_overlay::{
    Anchor, AnchorId, BodyAnchor, BodyOverlay, BodyOverlayConfig, Frame, FrameStats, HandOverlay,
    HandOverlayConfig, Scene,
    geom::{Transform, Vec3},
    raycast::SurfaceRaycaster,
    scene::{Color, Geometry},
    skeleton::{BodyJoint, HandJoint},
    vision::{EstimatorError, HandObservation, HandPoseEstimator, ObservedPoint},
};

const EPS: f32 = 1e-5;

fn assert_close(a: Vec3, b: Vec3) {
    assert!(a.distance(b) < EPS, "expected {a:?} close to {b:?}");
}

/// Replays prepared estimation results, one per frame, then reports "no hand".
struct ScriptedEstimator {
    results: VecDeque<Result<Option<HandObservation>, EstimatorError>>,
}

impl ScriptedEstimator {
    fn new(results: Vec<Result<Option<HandObservation>, EstimatorError>>) -> Box<Self> {
        Box::new(Self {
            results: results.into(),
        })
    }
}

impl HandPoseEstimator for ScriptedEstimator {
    fn estimate(&mut self, _frame: &Frame) -> Result<Option<HandObservation>, EstimatorError> {
        self.results.pop_front().unwrap_or(Ok(None))
    }
}

/// Fixed table of pixel hits; any pixel not in the table misses.
struct TableRaycaster {
    hits: HashMap<(i32, i32), Vec3>,
}

impl TableRaycaster {
    fn new(entries: &[((f32, f32), Vec3)]) -> Box<Self> {
        let hits = entries
            .iter()
            .map(|((x, y), hit)| ((*x as i32, *y as i32), *hit))
            .collect();
        Box::new(Self { hits })
    }
}

impl SurfaceRaycaster for TableRaycaster {
    fn cast(&self, x: f32, y: f32) -> Option<Vec3> {
        self.hits.get(&(x as i32, y as i32)).copied()
    }
}

fn observation(points: &[(HandJoint, (f32, f32), f32)]) -> HandObservation {
    let mut obs = HandObservation::new();
    for &(joint, (x, y), confidence) in points {
        obs.insert(joint, ObservedPoint { x, y, confidence });
    }
    obs
}

fn frame() -> Frame {
    Frame::new(vec![0; 4], 1, 1)
}

fn cylinder_height(scene: &Scene, overlay: &HandOverlay, pair: (HandJoint, HandJoint)) -> f32 {
    let node = scene.node(overlay.bone(pair).expect("bone node missing"));
    match node.geometry {
        Geometry::Cylinder { height, .. } => height,
        other => panic!("expected a cylinder, got {other:?}"),
    }
}

#[test]
fn test_bone_spans_its_markers() {
    let estimator = ScriptedEstimator::new(vec![Ok(Some(observation(&[
        (HandJoint::Wrist, (100.0, 100.0), 0.9),
        (HandJoint::ThumbCmc, (200.0, 100.0), 0.9),
    ])))]);
    let raycaster = TableRaycaster::new(&[
        ((100.0, 100.0), Vec3::ZERO),
        ((200.0, 100.0), Vec3::X),
    ]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    let stats = overlay.process_frame(&mut scene, &frame());

    assert!(stats.hand_detected);
    assert_eq!(stats.markers_refreshed, 2);
    assert_eq!(stats.bones_refreshed, 1);
    assert_eq!(overlay.marker_count(), 2);
    assert_eq!(overlay.bone_count(), 1);
    assert_eq!(scene.len(), 3);

    let pair = (HandJoint::Wrist, HandJoint::ThumbCmc);
    let bone = scene.node(overlay.bone(pair).unwrap());
    assert_close(bone.transform.position, Vec3::new(0.5, 0.0, 0.0));
    assert!((cylinder_height(&scene, &overlay, pair) - 1.0).abs() < EPS);
}

#[test]
fn test_low_confidence_joint_blocks_its_pair() {
    // 0.4 on the index knuckle keeps the wrist pair out no matter how sure
    // the wrist itself is.
    let estimator = ScriptedEstimator::new(vec![Ok(Some(observation(&[
        (HandJoint::Wrist, (100.0, 100.0), 0.9),
        (HandJoint::IndexMcp, (150.0, 100.0), 0.4),
    ])))]);
    let raycaster = TableRaycaster::new(&[
        ((100.0, 100.0), Vec3::ZERO),
        ((150.0, 100.0), Vec3::X),
    ]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    let stats = overlay.process_frame(&mut scene, &frame());

    assert!(stats.hand_detected);
    assert_eq!(stats.bones_skipped, 1);
    assert_eq!(scene.len(), 0);
    assert!(overlay.marker(HandJoint::Wrist).is_none());
    assert!(overlay.marker(HandJoint::IndexMcp).is_none());
    assert!(overlay.bone((HandJoint::Wrist, HandJoint::IndexMcp)).is_none());
}

#[test]
fn test_confidence_gate_is_strict() {
    // Exactly the threshold does not pass.
    let estimator = ScriptedEstimator::new(vec![Ok(Some(observation(&[
        (HandJoint::Wrist, (100.0, 100.0), 0.5),
        (HandJoint::ThumbCmc, (200.0, 100.0), 0.5),
    ])))]);
    let raycaster = TableRaycaster::new(&[
        ((100.0, 100.0), Vec3::ZERO),
        ((200.0, 100.0), Vec3::X),
    ]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    overlay.process_frame(&mut scene, &frame());

    assert_eq!(scene.len(), 0);
}

#[test]
fn test_nodes_are_created_once_and_moved_in_place() {
    let chain = |base: f32, confidence: f32| {
        Ok(Some(observation(&[
            (HandJoint::Wrist, (base, 100.0), confidence),
            (HandJoint::ThumbCmc, (base + 10.0, 100.0), confidence),
            (HandJoint::ThumbIp, (base + 20.0, 100.0), confidence),
            (HandJoint::ThumbTip, (base + 30.0, 100.0), confidence),
        ])))
    };
    let estimator = ScriptedEstimator::new(vec![chain(100.0, 0.9), chain(200.0, 0.9)]);
    let raycaster = TableRaycaster::new(&[
        ((100.0, 100.0), Vec3::new(0.0, 0.0, -0.5)),
        ((110.0, 100.0), Vec3::new(0.1, 0.0, -0.5)),
        ((120.0, 100.0), Vec3::new(0.2, 0.0, -0.5)),
        ((130.0, 100.0), Vec3::new(0.3, 0.0, -0.5)),
        ((200.0, 100.0), Vec3::new(1.0, 0.0, -0.5)),
        ((210.0, 100.0), Vec3::new(1.1, 0.0, -0.5)),
        ((220.0, 100.0), Vec3::new(1.2, 0.0, -0.5)),
        ((230.0, 100.0), Vec3::new(1.3, 0.0, -0.5)),
    ]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    overlay.process_frame(&mut scene, &frame());
    assert_eq!(overlay.marker_count(), 4);
    assert_eq!(overlay.bone_count(), 3);
    assert_eq!(scene.len(), 7);
    let wrist = overlay.marker(HandJoint::Wrist).unwrap();
    assert_close(scene.node(wrist).transform.position, Vec3::new(0.0, 0.0, -0.5));

    overlay.process_frame(&mut scene, &frame());
    // Same nodes, new transforms.
    assert_eq!(scene.len(), 7);
    assert_eq!(overlay.marker(HandJoint::Wrist), Some(wrist));
    assert_close(scene.node(wrist).transform.position, Vec3::new(1.0, 0.0, -0.5));
}

#[test]
fn test_raycast_miss_keeps_last_position() {
    let estimator = ScriptedEstimator::new(vec![
        Ok(Some(observation(&[
            (HandJoint::Wrist, (100.0, 100.0), 0.9),
            (HandJoint::ThumbCmc, (200.0, 100.0), 0.9),
        ]))),
        // The wrist wanders somewhere the surface estimate cannot resolve.
        Ok(Some(observation(&[
            (HandJoint::Wrist, (999.0, 999.0), 0.9),
            (HandJoint::ThumbCmc, (210.0, 100.0), 0.9),
        ]))),
    ]);
    let raycaster = TableRaycaster::new(&[
        ((100.0, 100.0), Vec3::new(0.2, 0.3, -0.5)),
        ((200.0, 100.0), Vec3::new(0.5, 0.3, -0.5)),
        ((210.0, 100.0), Vec3::new(0.6, 0.3, -0.5)),
    ]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    overlay.process_frame(&mut scene, &frame());
    let stats = overlay.process_frame(&mut scene, &frame());

    assert_eq!(stats.raycast_misses, 1);
    assert_eq!(stats.markers_refreshed, 1);
    let wrist = overlay.marker(HandJoint::Wrist).unwrap();
    assert_close(scene.node(wrist).transform.position, Vec3::new(0.2, 0.3, -0.5));
    // The bone follows the stale wrist and the fresh thumb.
    let pair = (HandJoint::Wrist, HandJoint::ThumbCmc);
    let bone = scene.node(overlay.bone(pair).unwrap());
    assert_close(
        bone.transform.position,
        Vec3::new(0.2, 0.3, -0.5).midpoint(Vec3::new(0.6, 0.3, -0.5)),
    );
}

#[test]
fn test_never_resolved_marker_stays_at_origin() {
    let estimator = ScriptedEstimator::new(vec![Ok(Some(observation(&[
        (HandJoint::Wrist, (100.0, 100.0), 0.9),
        (HandJoint::ThumbCmc, (777.0, 777.0), 0.9),
    ])))]);
    let raycaster = TableRaycaster::new(&[((100.0, 100.0), Vec3::new(0.2, 0.0, -0.5))]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    let stats = overlay.process_frame(&mut scene, &frame());

    assert_eq!(stats.raycast_misses, 1);
    let thumb = overlay.marker(HandJoint::ThumbCmc).unwrap();
    assert_close(scene.node(thumb).transform.position, Vec3::ZERO);
}

#[test]
fn test_estimator_failure_leaves_scene_untouched() {
    let estimator = ScriptedEstimator::new(vec![
        Ok(Some(observation(&[
            (HandJoint::Wrist, (100.0, 100.0), 0.9),
            (HandJoint::ThumbCmc, (200.0, 100.0), 0.9),
        ]))),
        Err(EstimatorError::Inference(anyhow!("backend gave up"))),
    ]);
    let raycaster = TableRaycaster::new(&[
        ((100.0, 100.0), Vec3::ZERO),
        ((200.0, 100.0), Vec3::X),
    ]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    overlay.process_frame(&mut scene, &frame());
    let before: Vec<Transform> = scene.iter().map(|(_, n)| n.transform).collect();

    let stats = overlay.process_frame(&mut scene, &frame());

    assert_eq!(stats, FrameStats::default());
    let after: Vec<Transform> = scene.iter().map(|(_, n)| n.transform).collect();
    assert_eq!(before, after);
}

#[test]
fn test_frame_without_hand_is_a_no_op() {
    let estimator = ScriptedEstimator::new(vec![Ok(None)]);
    let raycaster = TableRaycaster::new(&[]);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    let stats = overlay.process_frame(&mut scene, &frame());

    assert_eq!(stats, FrameStats::default());
    assert!(scene.is_empty());
}

#[test]
fn test_full_hand_produces_bounded_node_set() {
    let mut points = Vec::new();
    let mut hits = Vec::new();
    for joint in HandJoint::ALL {
        let x = 10.0 * joint.landmark_index() as f32;
        points.push((joint, (x, 50.0), 0.9));
        hits.push((
            (x, 50.0),
            Vec3::new(joint.landmark_index() as f32 * 0.02, 0.0, -0.5),
        ));
    }
    let estimator = ScriptedEstimator::new(vec![
        Ok(Some(observation(&points))),
        Ok(Some(observation(&points))),
    ]);
    let raycaster = TableRaycaster::new(&hits);
    let mut overlay = HandOverlay::new(estimator, raycaster, HandOverlayConfig::default());
    let mut scene = Scene::new();

    let stats = overlay.process_frame(&mut scene, &frame());

    // ThumbMp belongs to no segment, so 20 of the 21 joints get markers.
    assert_eq!(stats.markers_refreshed, 20);
    assert_eq!(stats.bones_refreshed, 19);
    assert_eq!(overlay.marker_count(), 20);
    assert_eq!(overlay.bone_count(), 19);
    assert_eq!(scene.len(), 39);
    assert!(overlay.marker(HandJoint::ThumbMp).is_none());

    // A second identical frame adds nothing.
    overlay.process_frame(&mut scene, &frame());
    assert_eq!(scene.len(), 39);
}

fn shoulders_at(id: AnchorId, center_x: f32) -> Anchor {
    Anchor::Body(
        BodyAnchor::new(id)
            .with_joint(
                BodyJoint::LeftShoulder,
                Transform::from_position(Vec3::new(center_x - 0.2, 1.5, -2.0)),
            )
            .with_joint(
                BodyJoint::RightShoulder,
                Transform::from_position(Vec3::new(center_x + 0.2, 1.5, -2.0)),
            ),
    )
}

#[test]
fn test_body_markers_update_in_place() {
    let mut overlay = BodyOverlay::default();
    let mut scene = Scene::new();
    let id = AnchorId::new(1);

    overlay.anchors_added(&mut scene, &[shoulders_at(id, 0.0)]);
    assert_eq!(scene.len(), 2);
    assert_eq!(overlay.marker_count(), 2);

    let left = overlay.marker(id, BodyJoint::LeftShoulder).unwrap();
    let node = scene.node(left);
    assert_eq!(node.name, "body-1-left_shoulder");
    assert_eq!(node.color, Color::RED);
    assert_eq!(node.geometry, Geometry::Sphere { radius: 0.05 });

    overlay.anchors_updated(&mut scene, &[shoulders_at(id, 0.3)]);
    assert_eq!(scene.len(), 2);
    assert_eq!(overlay.marker(id, BodyJoint::LeftShoulder), Some(left));
    assert_close(scene.node(left).transform.position, Vec3::new(0.1, 1.5, -2.0));
}

#[test]
fn test_body_overlay_tracks_anchors_independently() {
    let mut overlay = BodyOverlay::default();
    let mut scene = Scene::new();

    overlay.anchors_added(&mut scene, &[shoulders_at(AnchorId::new(1), -0.5)]);
    overlay.anchors_updated(
        &mut scene,
        &[
            shoulders_at(AnchorId::new(1), -0.4),
            shoulders_at(AnchorId::new(2), 0.5),
        ],
    );

    assert_eq!(scene.len(), 4);
    assert!(overlay.marker(AnchorId::new(2), BodyJoint::LeftShoulder).is_some());
}

#[test]
fn test_body_overlay_skips_world_anchors_and_missing_joints() {
    let mut overlay = BodyOverlay::default();
    let mut scene = Scene::new();
    let id = AnchorId::new(3);

    let one_shoulder = Anchor::Body(BodyAnchor::new(id).with_joint(
        BodyJoint::LeftShoulder,
        Transform::from_position(Vec3::new(-0.2, 1.5, -2.0)),
    ));
    let world = Anchor::World {
        id: AnchorId::new(99),
        transform: Transform::from_position(Vec3::new(0.0, 0.0, -1.0)),
    };

    overlay.anchors_added(&mut scene, &[world, one_shoulder]);

    assert_eq!(scene.len(), 1);
    assert!(overlay.marker(id, BodyJoint::LeftShoulder).is_some());
    assert!(overlay.marker(id, BodyJoint::RightShoulder).is_none());

    // The occluded shoulder appears on a later update.
    overlay.anchors_updated(&mut scene, &[shoulders_at(id, 0.0)]);
    assert_eq!(scene.len(), 2);
    assert!(overlay.marker(id, BodyJoint::RightShoulder).is_some());
}

#[test]
fn test_body_overlay_honors_configured_joints() {
    let cfg = BodyOverlayConfig {
        joints: vec![BodyJoint::Neck],
        ..BodyOverlayConfig::default()
    };
    let mut overlay = BodyOverlay::new(cfg);
    let mut scene = Scene::new();
    let id = AnchorId::new(4);

    let anchor = Anchor::Body(
        BodyAnchor::new(id)
            .with_joint(BodyJoint::Neck, Transform::from_position(Vec3::new(0.0, 1.6, -2.0)))
            .with_joint(
                BodyJoint::LeftShoulder,
                Transform::from_position(Vec3::new(-0.2, 1.5, -2.0)),
            ),
    );
    overlay.anchors_added(&mut scene, &[anchor]);

    assert_eq!(scene.len(), 1);
    assert!(overlay.marker(id, BodyJoint::Neck).is_some());
    assert!(overlay.marker(id, BodyJoint::LeftShoulder).is_none());
}
