//! Hand pose data model: 21 landmarks per hand in fixed anatomical order.

use serde::Deserialize;
use thiserror::Error;

/// Landmark indices, fixed across the whole pipeline (wrist first, then
/// four joints per finger, tips at 4/8/12/16/20).
pub mod lm {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

pub const LANDMARK_COUNT: usize = 21;

const TIPS: [usize; 5] = [
    lm::THUMB_TIP,
    lm::INDEX_TIP,
    lm::MIDDLE_TIP,
    lm::RING_TIP,
    lm::PINKY_TIP,
];
const PIPS: [usize; 5] = [
    lm::THUMB_IP,
    lm::INDEX_PIP,
    lm::MIDDLE_PIP,
    lm::RING_PIP,
    lm::PINKY_PIP,
];
const MCPS: [usize; 5] = [
    lm::THUMB_MCP,
    lm::INDEX_MCP,
    lm::MIDDLE_MCP,
    lm::RING_MCP,
    lm::PINKY_MCP,
];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Landmark {
    /// Normalised [0,1] image coordinates.
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist.
    #[serde(default)]
    pub z: f32,
}

/// One detected hand in one camera frame. Produced by the external pose
/// source, consumed exactly once by the mapper, then discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct HandPose {
    pub landmarks: Vec<Landmark>,
    #[serde(default = "default_handedness")]
    pub handedness: String,
    #[serde(default)]
    pub timestamp_ms: f64,
}

fn default_handedness() -> String {
    "Right".to_string()
}

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("expected {LANDMARK_COUNT} landmarks, got {0}")]
    LandmarkCount(usize),
    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

impl HandPose {
    pub fn new(landmarks: Vec<Landmark>, handedness: impl Into<String>) -> Self {
        Self {
            landmarks,
            handedness: handedness.into(),
            timestamp_ms: 0.0,
        }
    }

    /// Boundary check for poses arriving from the external source.
    /// Everything past this point assumes 21 finite landmarks.
    pub fn validate(&self) -> Result<(), PoseError> {
        if self.landmarks.len() != LANDMARK_COUNT {
            return Err(PoseError::LandmarkCount(self.landmarks.len()));
        }
        for (i, p) in self.landmarks.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(PoseError::NonFinite(i));
            }
        }
        Ok(())
    }

    pub fn lm(&self, idx: usize) -> Landmark {
        self.landmarks[idx]
    }

    /// Fingertip by finger number (0 = thumb .. 4 = pinky).
    pub fn fingertip(&self, finger: usize) -> Landmark {
        self.lm(TIPS[finger])
    }

    /// Whether a finger appears extended.
    ///
    /// Index..pinky: tip above both PIP and MCP (smaller y = higher).
    /// The two-joint check suppresses flicker while a finger is
    /// half-curled, which a plain tip-vs-PIP test does not.
    ///
    /// Thumb: tip farther from the wrist (horizontally) than the IP
    /// joint, which works for either handedness.
    pub fn finger_extended(&self, finger: usize) -> bool {
        let tip = self.lm(TIPS[finger]);
        let pip = self.lm(PIPS[finger]);
        if finger == 0 {
            let wrist = self.lm(lm::WRIST);
            return (tip.x - wrist.x).abs() > (pip.x - wrist.x).abs();
        }
        let mcp = self.lm(MCPS[finger]);
        tip.y < pip.y && tip.y < mcp.y
    }

    /// Euclidean distance between thumb tip and index tip, in
    /// normalised units.
    pub fn pinch_distance(&self) -> f32 {
        let t = self.fingertip(0);
        let i = self.fingertip(1);
        ((t.x - i.x).powi(2) + (t.y - i.y).powi(2)).sqrt()
    }

    /// Normalised (x, y) of the index fingertip.
    pub fn index_tip(&self) -> (f32, f32) {
        let p = self.fingertip(1);
        (p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand() -> Vec<Landmark> {
        vec![
            Landmark {
                x: 0.5,
                y: 0.5,
                z: 0.0
            };
            LANDMARK_COUNT
        ]
    }

    #[test]
    fn validate_accepts_well_formed_pose() {
        let pose = HandPose::new(flat_hand(), "Right");
        assert!(pose.validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_pose() {
        let pose = HandPose::new(vec![Landmark { x: 0.5, y: 0.5, z: 0.0 }; 7], "Left");
        assert!(matches!(pose.validate(), Err(PoseError::LandmarkCount(7))));
    }

    #[test]
    fn validate_rejects_non_finite_coordinate() {
        let mut lms = flat_hand();
        lms[lm::INDEX_TIP].y = f32::NAN;
        let pose = HandPose::new(lms, "Right");
        assert!(matches!(
            pose.validate(),
            Err(PoseError::NonFinite(i)) if i == lm::INDEX_TIP
        ));
    }

    #[test]
    fn index_extended_requires_tip_above_both_joints() {
        let mut lms = flat_hand();
        lms[lm::INDEX_TIP] = Landmark { x: 0.5, y: 0.3, z: 0.0 };
        lms[lm::INDEX_PIP] = Landmark { x: 0.5, y: 0.5, z: 0.0 };
        lms[lm::INDEX_MCP] = Landmark { x: 0.5, y: 0.6, z: 0.0 };
        let pose = HandPose::new(lms.clone(), "Right");
        assert!(pose.finger_extended(1));

        // tip above PIP but below MCP: half-curled, not extended
        lms[lm::INDEX_MCP] = Landmark { x: 0.5, y: 0.2, z: 0.0 };
        let pose = HandPose::new(lms, "Right");
        assert!(!pose.finger_extended(1));
    }

    #[test]
    fn thumb_extension_is_symmetric_in_x() {
        for dir in [1.0f32, -1.0] {
            let mut lms = flat_hand();
            lms[lm::WRIST] = Landmark { x: 0.5, y: 0.8, z: 0.0 };
            lms[lm::THUMB_TIP] = Landmark {
                x: 0.5 + 0.2 * dir,
                y: 0.5,
                z: 0.0,
            };
            lms[lm::THUMB_IP] = Landmark {
                x: 0.5 + 0.1 * dir,
                y: 0.5,
                z: 0.0,
            };
            let pose = HandPose::new(lms, "Right");
            assert!(pose.finger_extended(0), "dir {dir}");
        }
    }

    #[test]
    fn pinch_distance_is_euclidean() {
        let mut lms = flat_hand();
        lms[lm::THUMB_TIP] = Landmark { x: 0.3, y: 0.4, z: 0.0 };
        lms[lm::INDEX_TIP] = Landmark { x: 0.6, y: 0.8, z: 0.0 };
        let pose = HandPose::new(lms, "Right");
        assert!((pose.pinch_distance() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn deserializes_from_json_line() {
        let mut obj = String::from("{\"landmarks\":[");
        for i in 0..LANDMARK_COUNT {
            if i > 0 {
                obj.push(',');
            }
            obj.push_str("{\"x\":0.5,\"y\":0.5,\"z\":0.0}");
        }
        obj.push_str("],\"handedness\":\"Left\"}");
        let pose: HandPose = serde_json::from_str(&obj).unwrap();
        assert_eq!(pose.landmarks.len(), LANDMARK_COUNT);
        assert_eq!(pose.handedness, "Left");
        assert!(pose.validate().is_ok());
    }
}
