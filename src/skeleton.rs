//! Joint identities and the hand bone topology.

/// The 21 hand landmarks in the standard MediaPipe ordering
/// (wrist first, then thumb through little finger, base to tip).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandJoint {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    LittleMcp = 17,
    LittlePip = 18,
    LittleDip = 19,
    LittleTip = 20,
}

impl HandJoint {
    pub const COUNT: usize = 21;

    pub const ALL: [HandJoint; Self::COUNT] = [
        HandJoint::Wrist,
        HandJoint::ThumbCmc,
        HandJoint::ThumbMp,
        HandJoint::ThumbIp,
        HandJoint::ThumbTip,
        HandJoint::IndexMcp,
        HandJoint::IndexPip,
        HandJoint::IndexDip,
        HandJoint::IndexTip,
        HandJoint::MiddleMcp,
        HandJoint::MiddlePip,
        HandJoint::MiddleDip,
        HandJoint::MiddleTip,
        HandJoint::RingMcp,
        HandJoint::RingPip,
        HandJoint::RingDip,
        HandJoint::RingTip,
        HandJoint::LittleMcp,
        HandJoint::LittlePip,
        HandJoint::LittleDip,
        HandJoint::LittleTip,
    ];

    /// Index of this joint in the estimator's landmark output.
    pub fn landmark_index(self) -> usize {
        self as usize
    }

    pub fn from_landmark_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            HandJoint::Wrist => "wrist",
            HandJoint::ThumbCmc => "thumb_cmc",
            HandJoint::ThumbMp => "thumb_mp",
            HandJoint::ThumbIp => "thumb_ip",
            HandJoint::ThumbTip => "thumb_tip",
            HandJoint::IndexMcp => "index_mcp",
            HandJoint::IndexPip => "index_pip",
            HandJoint::IndexDip => "index_dip",
            HandJoint::IndexTip => "index_tip",
            HandJoint::MiddleMcp => "middle_mcp",
            HandJoint::MiddlePip => "middle_pip",
            HandJoint::MiddleDip => "middle_dip",
            HandJoint::MiddleTip => "middle_tip",
            HandJoint::RingMcp => "ring_mcp",
            HandJoint::RingPip => "ring_pip",
            HandJoint::RingDip => "ring_dip",
            HandJoint::RingTip => "ring_tip",
            HandJoint::LittleMcp => "little_mcp",
            HandJoint::LittlePip => "little_pip",
            HandJoint::LittleDip => "little_dip",
            HandJoint::LittleTip => "little_tip",
        }
    }
}

/// The five wrist-rooted chains of the hand skeleton, 19 segments total.
/// The thumb chain runs wrist, CMC, IP, tip; `ThumbMp` carries no segment
/// of its own.
pub const HAND_BONES: [(HandJoint, HandJoint); 19] = [
    (HandJoint::Wrist, HandJoint::ThumbCmc),
    (HandJoint::ThumbCmc, HandJoint::ThumbIp),
    (HandJoint::ThumbIp, HandJoint::ThumbTip),
    (HandJoint::Wrist, HandJoint::IndexMcp),
    (HandJoint::IndexMcp, HandJoint::IndexPip),
    (HandJoint::IndexPip, HandJoint::IndexDip),
    (HandJoint::IndexDip, HandJoint::IndexTip),
    (HandJoint::Wrist, HandJoint::MiddleMcp),
    (HandJoint::MiddleMcp, HandJoint::MiddlePip),
    (HandJoint::MiddlePip, HandJoint::MiddleDip),
    (HandJoint::MiddleDip, HandJoint::MiddleTip),
    (HandJoint::Wrist, HandJoint::RingMcp),
    (HandJoint::RingMcp, HandJoint::RingPip),
    (HandJoint::RingPip, HandJoint::RingDip),
    (HandJoint::RingDip, HandJoint::RingTip),
    (HandJoint::Wrist, HandJoint::LittleMcp),
    (HandJoint::LittleMcp, HandJoint::LittlePip),
    (HandJoint::LittlePip, HandJoint::LittleDip),
    (HandJoint::LittleDip, HandJoint::LittleTip),
];

/// Body joints reported by anchor-based trackers. Only a subset carries
/// markers by default, but the identity set is fixed by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyJoint {
    Root,
    Head,
    Neck,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyJoint {
    pub fn label(self) -> &'static str {
        match self {
            BodyJoint::Root => "root",
            BodyJoint::Head => "head",
            BodyJoint::Neck => "neck",
            BodyJoint::LeftShoulder => "left_shoulder",
            BodyJoint::RightShoulder => "right_shoulder",
            BodyJoint::LeftElbow => "left_elbow",
            BodyJoint::RightElbow => "right_elbow",
            BodyJoint::LeftWrist => "left_wrist",
            BodyJoint::RightWrist => "right_wrist",
            BodyJoint::LeftHip => "left_hip",
            BodyJoint::RightHip => "right_hip",
            BodyJoint::LeftKnee => "left_knee",
            BodyJoint::RightKnee => "right_knee",
            BodyJoint::LeftAnkle => "left_ankle",
            BodyJoint::RightAnkle => "right_ankle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_landmark_index_round_trip() {
        for (i, joint) in HandJoint::ALL.iter().enumerate() {
            assert_eq!(joint.landmark_index(), i);
            assert_eq!(HandJoint::from_landmark_index(i), Some(*joint));
        }
        assert_eq!(HandJoint::from_landmark_index(HandJoint::COUNT), None);
    }

    #[test]
    fn test_hand_bones_has_nineteen_segments() {
        assert_eq!(HAND_BONES.len(), 19);
    }

    #[test]
    fn test_hand_bones_covers_every_joint() {
        let mut seen = HashSet::new();
        for (a, b) in HAND_BONES {
            assert_ne!(a, b);
            seen.insert(a);
            seen.insert(b);
        }
        for joint in HandJoint::ALL {
            // ThumbMp is skipped by the thumb chain on purpose.
            if joint == HandJoint::ThumbMp {
                assert!(!seen.contains(&joint));
            } else {
                assert!(seen.contains(&joint), "{joint:?} missing from HAND_BONES");
            }
        }
    }

    #[test]
    fn test_hand_bones_roots_five_chains_at_the_wrist() {
        let chain_roots = HAND_BONES
            .iter()
            .filter(|(a, _)| *a == HandJoint::Wrist)
            .count();
        assert_eq!(chain_roots, 5);
        assert!(HAND_BONES.contains(&(HandJoint::Wrist, HandJoint::ThumbCmc)));
        assert!(HAND_BONES.contains(&(HandJoint::Wrist, HandJoint::IndexMcp)));
    }

    #[test]
    fn test_hand_bones_pairs_are_unique() {
        let mut seen = HashSet::new();
        for pair in HAND_BONES {
            assert!(seen.insert(pair), "duplicate pair {pair:?}");
        }
    }
}
