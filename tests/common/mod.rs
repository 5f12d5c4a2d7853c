//! Shared pose builders for the integration suites.
#![allow(dead_code)] // each suite uses its own subset

use handctl::pose::{HandPose, LANDMARK_COUNT, Landmark, lm};

/// Build a pose from landmark overrides. Unspecified landmarks sit at
/// (0.5, 0.5) with the wrist at (0.5, 0.8), which reads as a curled
/// hand: no finger passes its extension test.
pub fn make_hand(points: &[(usize, (f32, f32, f32))]) -> HandPose {
    let mut lms = vec![Landmark { x: 0.5, y: 0.5, z: 0.0 }; LANDMARK_COUNT];
    lms[lm::WRIST] = Landmark { x: 0.5, y: 0.8, z: 0.0 };
    for &(i, (x, y, z)) in points {
        lms[i] = Landmark { x, y, z };
    }
    HandPose::new(lms, "Right")
}

/// Pointer pose: only the index finger extended, tip at (nx, ny). The
/// thumb tip is parked away from the index tip so the pose cannot read
/// as a pinch.
pub fn pointer_hand(nx: f32, ny: f32) -> HandPose {
    make_hand(&[
        (lm::THUMB_TIP, (0.5, 0.62, 0.0)),
        (lm::INDEX_TIP, (nx, ny, 0.0)),
        (lm::INDEX_PIP, (nx, ny + 0.05, 0.0)),
        (lm::INDEX_MCP, (nx, ny + 0.10, 0.0)),
    ])
}

/// All fingers curled, thumb tip kept clear of the index tip.
pub fn fist_hand() -> HandPose {
    make_hand(&[(lm::THUMB_TIP, (0.5, 0.62, 0.0))])
}

/// Index + middle extended, everything else curled.
pub fn v_sign_hand() -> HandPose {
    make_hand(&[
        (lm::THUMB_TIP, (0.5, 0.62, 0.0)),
        (lm::INDEX_TIP, (0.45, 0.30, 0.0)),
        (lm::INDEX_PIP, (0.45, 0.50, 0.0)),
        (lm::INDEX_MCP, (0.45, 0.60, 0.0)),
        (lm::MIDDLE_TIP, (0.55, 0.30, 0.0)),
        (lm::MIDDLE_PIP, (0.55, 0.50, 0.0)),
        (lm::MIDDLE_MCP, (0.55, 0.60, 0.0)),
    ])
}

/// Index + middle + ring extended with the index tip at (nx, ny):
/// three-finger stick pose.
pub fn stick_hand(nx: f32, ny: f32) -> HandPose {
    make_hand(&[
        (lm::THUMB_TIP, (0.5, 0.62, 0.0)),
        (lm::INDEX_TIP, (nx, ny, 0.0)),
        (lm::INDEX_PIP, (nx, ny + 0.15, 0.0)),
        (lm::INDEX_MCP, (nx, ny + 0.25, 0.0)),
        (lm::MIDDLE_TIP, (0.56, 0.30, 0.0)),
        (lm::MIDDLE_PIP, (0.56, 0.50, 0.0)),
        (lm::MIDDLE_MCP, (0.56, 0.60, 0.0)),
        (lm::RING_TIP, (0.62, 0.30, 0.0)),
        (lm::RING_PIP, (0.62, 0.50, 0.0)),
        (lm::RING_MCP, (0.62, 0.60, 0.0)),
    ])
}

/// Thumb + index extended, thumb tip well below the wrist: scroll down.
pub fn scroll_down_hand() -> HandPose {
    make_hand(&[
        (lm::THUMB_TIP, (0.20, 0.90, 0.0)),
        (lm::THUMB_IP, (0.35, 0.80, 0.0)),
        (lm::INDEX_TIP, (0.55, 0.30, 0.0)),
        (lm::INDEX_PIP, (0.55, 0.50, 0.0)),
        (lm::INDEX_MCP, (0.55, 0.60, 0.0)),
    ])
}

/// Thumb and index tips nearly touching: pinch.
pub fn pinch_hand() -> HandPose {
    make_hand(&[
        (lm::THUMB_TIP, (0.50, 0.40, 0.0)),
        (lm::INDEX_TIP, (0.51, 0.40, 0.0)),
        (lm::INDEX_PIP, (0.51, 0.55, 0.0)),
        (lm::INDEX_MCP, (0.51, 0.60, 0.0)),
    ])
}
