//! Action synthesis: turns the confirmed gesture stream into ordered
//! HID commands, with cursor/stick smoothing, cooldown gating, and
//! hold/release bookkeeping.

use std::time::{Duration, Instant};

use crate::config::{Screen, Thresholds};
use crate::gestures::{Debouncer, GestureClassifier, GestureLabel};
use crate::pose::HandPose;
use crate::protocol::{Button, Command};

/// Per-hand session state. Owned by exactly one mapper, mutated once
/// per frame, never shared.
#[derive(Debug, Clone)]
struct MappingState {
    cursor: (f32, f32),
    stick: (f32, f32),
    pinching: bool,
    fist_held: bool,
    // None = never fired, so the first event is not gated.
    last_click: Option<Duration>,
    last_rclick: Option<Duration>,
    last_scroll: Option<Duration>,
    last_start: Option<Duration>,
}

impl MappingState {
    fn new() -> Self {
        Self {
            cursor: (0.5, 0.5),
            stick: (0.0, 0.0),
            pinching: false,
            fist_held: false,
            last_click: None,
            last_rclick: None,
            last_scroll: None,
            last_start: None,
        }
    }
}

fn cooldown_over(last: Option<Duration>, now: Duration, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(t) => now.saturating_sub(t) > cooldown,
    }
}

/// One tracked hand's classify → debounce → synthesize chain behind a
/// single update entry point.
///
/// Total for any input pose: out-of-range coordinates are clamped at
/// the pixel/stick boundary and float-to-int casts saturate, so the
/// output may be meaningless for garbage input but is always
/// well-formed.
#[derive(Debug)]
pub struct GestureMapper {
    th: Thresholds,
    screen: Screen,
    classifier: GestureClassifier,
    debounce: Debouncer,
    state: MappingState,
    epoch: Instant,
}

impl GestureMapper {
    pub fn new(th: Thresholds, screen: Screen) -> Self {
        let classifier = GestureClassifier::new(&th);
        let debounce = Debouncer::new(th.confirm_frames);
        Self {
            th,
            screen,
            classifier,
            debounce,
            state: MappingState::new(),
            epoch: Instant::now(),
        }
    }

    /// Swap tunables mid-session (profile reload). Smoothing state and
    /// holds survive; the confirmation counter starts over.
    pub fn set_thresholds(&mut self, th: Thresholds) {
        self.classifier = GestureClassifier::new(&th);
        self.debounce = Debouncer::resume(th.confirm_frames, self.debounce.active());
        self.th = th;
    }

    pub fn active_label(&self) -> GestureLabel {
        self.debounce.active()
    }

    /// Map one frame using the mapper's own clock.
    pub fn map(&mut self, hand: &HandPose) -> Vec<Command> {
        let now = self.epoch.elapsed();
        self.map_at(hand, now)
    }

    /// Map one frame at an explicit session time. Command order within
    /// the returned list is significant (move before click).
    pub fn map_at(&mut self, hand: &HandPose, now: Duration) -> Vec<Command> {
        let mut out = Vec::new();

        let label = self.classifier.classify(hand);
        let active = self.debounce.observe(label);

        // Release bookkeeping before the label branch: leaving Fist
        // drops the held button, leaving Pinch re-arms the click edge.
        if active != GestureLabel::Fist && self.state.fist_held {
            out.push(Command::GamepadButton {
                button: Button::A,
                pressed: false,
            });
            self.state.fist_held = false;
        }
        if active != GestureLabel::Pinch {
            self.state.pinching = false;
        }

        match active {
            GestureLabel::Pointer => {
                out.push(self.track_cursor(hand));
            }

            // Edge-triggered: one click per new pinch engagement, and
            // only if the click cooldown has elapsed.
            GestureLabel::Pinch => {
                out.push(self.track_cursor(hand));
                if !self.state.pinching {
                    self.state.pinching = true;
                    if cooldown_over(self.state.last_click, now, self.th.click_cooldown()) {
                        out.push(Command::MouseLeftClick);
                        self.state.last_click = Some(now);
                    }
                }
            }

            GestureLabel::Fist => {
                if !self.state.fist_held {
                    out.push(Command::GamepadButton {
                        button: Button::A,
                        pressed: true,
                    });
                    self.state.fist_held = true;
                }
            }

            // Level-triggered: repeats every cooldown interval while
            // the v-sign is sustained. Deliberately asymmetric with
            // the pinch click above.
            GestureLabel::VSign => {
                out.push(self.track_cursor(hand));
                if cooldown_over(self.state.last_rclick, now, self.th.click_cooldown()) {
                    out.push(Command::MouseRightClick);
                    self.state.last_rclick = Some(now);
                }
            }

            GestureLabel::ThreeStick => {
                out.push(self.track_stick(hand));
            }

            GestureLabel::OpenPalm => {
                if cooldown_over(self.state.last_start, now, self.th.start_cooldown()) {
                    out.push(Command::GamepadButton {
                        button: Button::Start,
                        pressed: true,
                    });
                    out.push(Command::GamepadButton {
                        button: Button::Start,
                        pressed: false,
                    });
                    self.state.last_start = Some(now);
                }
            }

            GestureLabel::ScrollUp | GestureLabel::ScrollDown => {
                if cooldown_over(self.state.last_scroll, now, self.th.scroll_cooldown()) {
                    let delta = if active == GestureLabel::ScrollUp {
                        self.th.scroll_step
                    } else {
                        -self.th.scroll_step
                    };
                    out.push(Command::MouseScroll { delta });
                    self.state.last_scroll = Some(now);
                }
            }

            GestureLabel::Idle => {}
        }

        out
    }

    /// EWMA-smoothed cursor from the index fingertip, clamped to the
    /// screen.
    fn track_cursor(&mut self, hand: &HandPose) -> Command {
        let (ix, iy) = hand.index_tip();
        let a = self.th.cursor_smoothing;
        let s = &mut self.state;
        s.cursor.0 = s.cursor.0 * (1.0 - a) + ix * a;
        s.cursor.1 = s.cursor.1 * (1.0 - a) + iy * a;

        let w = self.screen.width as f32;
        let h = self.screen.height as f32;
        let x = (s.cursor.0 * w).round().clamp(0.0, w - 1.0) as i32;
        let y = (s.cursor.1 * h).round().clamp(0.0, h - 1.0) as i32;
        Command::MouseMove { x, y }
    }

    /// EWMA-smoothed analogue stick from the index fingertip, with a
    /// radial dead-zone rescaled so its edge maps to zero deflection.
    fn track_stick(&mut self, hand: &HandPose) -> Command {
        let (ix, iy) = hand.index_tip();
        let mut raw_x = ix - 0.5;
        let mut raw_y = iy - 0.5;

        let dz = self.th.stick_deadzone;
        let mag = (raw_x * raw_x + raw_y * raw_y).sqrt();
        // `<=` also covers mag == 0 with a zero dead-zone, where the
        // rescale below would divide by zero
        if mag <= dz {
            raw_x = 0.0;
            raw_y = 0.0;
        } else {
            let scale = (mag - dz) / (0.5 - dz) / mag;
            raw_x *= scale;
            raw_y *= scale;
        }

        let a = self.th.stick_smoothing;
        let s = &mut self.state;
        s.stick.0 = s.stick.0 * (1.0 - a) + raw_x * a;
        s.stick.1 = s.stick.1 * (1.0 - a) + raw_y * a;

        let x = (s.stick.0 * 2.0 * 32767.0).round().clamp(-32767.0, 32767.0) as i16;
        let y = (s.stick.1 * 2.0 * 32767.0).round().clamp(-32767.0, 32767.0) as i16;
        Command::GamepadStick { x, y }
    }
}
