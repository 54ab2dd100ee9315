//! Drives the body marker overlay from a synthesized anchor stream, standing
//! in for a live body tracker. Prints the resulting scene so the bounded node
//! count is easy to eyeball.

use pose_overlay::{
    Anchor, AnchorId, BodyAnchor, BodyOverlay, Scene,
    geom::{Transform, Vec3},
    skeleton::BodyJoint,
};

const STEPS: u32 = 120;

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let mut overlay = BodyOverlay::default();

    let first_body = AnchorId::new(1);
    let second_body = AnchorId::new(2);
    let feature_point = AnchorId::new(900);

    for step in 0..STEPS {
        let t = step as f32 / 30.0;
        let sway = (t * std::f32::consts::TAU * 0.5).sin() * 0.05;
        let bob = (t * std::f32::consts::TAU).sin() * 0.02;

        let mut anchors = vec![
            Anchor::Body(swaying_body(first_body, -0.4 + sway, bob)),
            // Trackers report plain world anchors too; the overlay skips them.
            Anchor::World {
                id: feature_point,
                transform: Transform::from_position(Vec3::new(0.0, 0.9, -1.2)),
            },
        ];

        // A second person walks into view halfway through, right shoulder
        // occluded for the first second.
        if step >= 60 {
            let mut body = swaying_body(second_body, 0.5 - sway, bob);
            if step < 90 {
                body = occlude(body, BodyJoint::RightShoulder);
            }
            anchors.push(Anchor::Body(body));
        }

        if step == 0 {
            overlay.anchors_added(&mut scene, &anchors);
        } else {
            overlay.anchors_updated(&mut scene, &anchors);
        }
    }

    println!(
        "{} marker nodes after {} tracker events",
        scene.len(),
        STEPS
    );
    for (_, node) in scene.iter() {
        let p = node.transform.position;
        println!("  {} at ({:+.3}, {:+.3}, {:+.3})", node.name, p.x, p.y, p.z);
    }
}

fn swaying_body(id: AnchorId, center_x: f32, bob: f32) -> BodyAnchor {
    let shoulder_height = 1.45 + bob;
    BodyAnchor::new(id)
        .with_joint(
            BodyJoint::LeftShoulder,
            Transform::from_position(Vec3::new(center_x - 0.18, shoulder_height, -2.0)),
        )
        .with_joint(
            BodyJoint::RightShoulder,
            Transform::from_position(Vec3::new(center_x + 0.18, shoulder_height, -2.0)),
        )
}

fn occlude(body: BodyAnchor, joint: BodyJoint) -> BodyAnchor {
    let mut rebuilt = BodyAnchor::new(body.id);
    for candidate in [BodyJoint::LeftShoulder, BodyJoint::RightShoulder] {
        if candidate == joint {
            continue;
        }
        if let Some(transform) = body.joint_transform(candidate) {
            rebuilt.set_joint(candidate, transform);
        }
    }
    rebuilt
}
