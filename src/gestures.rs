//! Frame classification and confirmation.
//!
//! Each frame is classified into exactly one label via a priority
//! ladder; a label only becomes *active* after winning `confirm_frames`
//! consecutive rounds, which damps flicker during hand transitions.

use crate::config::Thresholds;
use crate::pose::{HandPose, lm};

/// Closed set of recognised gestures. Every frame maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureLabel {
    Idle,
    Pointer,
    Pinch,
    Fist,
    VSign,
    ThreeStick,
    OpenPalm,
    ScrollUp,
    ScrollDown,
}

impl GestureLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            GestureLabel::Idle => "idle",
            GestureLabel::Pointer => "pointer",
            GestureLabel::Pinch => "pinch",
            GestureLabel::Fist => "fist",
            GestureLabel::VSign => "v_sign",
            GestureLabel::ThreeStick => "three_stick",
            GestureLabel::OpenPalm => "open_palm",
            GestureLabel::ScrollUp => "scroll_up",
            GestureLabel::ScrollDown => "scroll_down",
        }
    }
}

/// Stateless priority-ladder classifier. Depends only on the current
/// pose, never on history.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    pinch_close: f32,
    scroll_band: f32,
}

impl GestureClassifier {
    pub fn new(th: &Thresholds) -> Self {
        Self {
            pinch_close: th.pinch_close,
            scroll_band: th.scroll_band,
        }
    }

    /// Top-to-bottom ladder, first match wins.
    pub fn classify(&self, hand: &HandPose) -> GestureLabel {
        let ext: [bool; 5] = std::array::from_fn(|i| hand.finger_extended(i));
        let n = ext.iter().filter(|e| **e).count();

        // Pinch outranks everything else.
        if hand.pinch_distance() < self.pinch_close {
            return GestureLabel::Pinch;
        }

        if n == 0 {
            return GestureLabel::Fist;
        }

        // index + middle only
        if ext[1] && ext[2] && !ext[0] && !ext[3] && !ext[4] {
            return GestureLabel::VSign;
        }

        // index + middle + ring, no thumb/pinky
        if ext[1] && ext[2] && ext[3] && !ext[0] && !ext[4] {
            return GestureLabel::ThreeStick;
        }

        if n == 5 {
            return GestureLabel::OpenPalm;
        }

        // thumb + index: scroll, direction from thumb height vs wrist
        if ext[0] && ext[1] && n == 2 {
            let thumb = hand.fingertip(0);
            let wrist = hand.lm(lm::WRIST);
            if thumb.y < wrist.y - self.scroll_band {
                return GestureLabel::ScrollUp;
            }
            if thumb.y > wrist.y + self.scroll_band {
                return GestureLabel::ScrollDown;
            }
            // direction ambiguous
            return GestureLabel::Pointer;
        }

        if ext[1] {
            return GestureLabel::Pointer;
        }

        GestureLabel::Idle
    }
}

/// Confirmation filter: the active label only changes once a candidate
/// has won `confirm` consecutive classifications. Otherwise the active
/// label is sticky.
#[derive(Debug, Clone)]
pub struct Debouncer {
    pending: GestureLabel,
    count: u32,
    active: GestureLabel,
    confirm: u32,
}

impl Debouncer {
    pub fn new(confirm_frames: u32) -> Self {
        Self::resume(confirm_frames, GestureLabel::Idle)
    }

    /// Fresh confirmation counter that keeps a previously active label
    /// (used when tunables are swapped mid-session).
    pub fn resume(confirm_frames: u32, active: GestureLabel) -> Self {
        Self {
            pending: active,
            count: 0,
            active,
            confirm: confirm_frames.max(1),
        }
    }

    /// Feed one classification, get the (possibly unchanged) active label.
    pub fn observe(&mut self, label: GestureLabel) -> GestureLabel {
        if label == self.pending {
            self.count = self.count.saturating_add(1);
        } else {
            self.pending = label;
            self.count = 1;
        }
        if self.count >= self.confirm {
            self.active = self.pending;
        }
        self.active
    }

    pub fn active(&self) -> GestureLabel {
        self.active
    }
}
