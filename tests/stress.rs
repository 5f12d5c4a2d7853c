//! Floods the mapper with randomized poses: no panics, and every
//! emitted line matches the driver grammar.

mod common;

use std::time::Duration;

use handctl::config::{Screen, Thresholds};
use handctl::mapper::GestureMapper;
use handctl::pose::{HandPose, lm};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::make_hand;

fn random_hand(rng: &mut StdRng) -> HandPose {
    let mut points = Vec::new();
    for (tip, pip, mcp) in [
        (lm::INDEX_TIP, lm::INDEX_PIP, lm::INDEX_MCP),
        (lm::MIDDLE_TIP, lm::MIDDLE_PIP, lm::MIDDLE_MCP),
        (lm::RING_TIP, lm::RING_PIP, lm::RING_MCP),
        (lm::PINKY_TIP, lm::PINKY_PIP, lm::PINKY_MCP),
    ] {
        let x: f32 = rng.r#gen();
        let y: f32 = rng.r#gen();
        let joint = if rng.r#gen::<bool>() { 0.1 } else { -0.1 };
        points.push((tip, (x, y, 0.0)));
        points.push((pip, (x, y + joint, 0.0)));
        points.push((mcp, (x, y + joint * 1.5, 0.0)));
    }
    points.push((lm::THUMB_TIP, (rng.r#gen(), rng.r#gen(), 0.0)));
    points.push((lm::THUMB_IP, (rng.r#gen(), rng.r#gen(), 0.0)));
    make_hand(&points)
}

/// (verb, expected token count) table from the driver protocol.
fn expected_tokens(verb: &str) -> Option<usize> {
    match verb {
        "MOUSE_MOVE" => Some(3),
        "MOUSE_LEFT" => Some(1),
        "MOUSE_RIGHT" => Some(1),
        "MOUSE_SCROLL" => Some(2),
        "GAMEPAD_BTN" => Some(3),
        "GAMEPAD_STICK" => Some(3),
        _ => None,
    }
}

#[test]
fn rapid_fire_random_poses_never_fail() {
    let mut rng = StdRng::seed_from_u64(0x4841_4e44);
    let mut m = GestureMapper::new(Thresholds::default(), Screen::default());
    for i in 0..10_000u64 {
        let hand = random_hand(&mut rng);
        let cmds = m.map_at(&hand, Duration::from_millis(i * 16));
        for c in cmds {
            assert!(!c.to_string().is_empty());
        }
    }
}

#[test]
fn all_emitted_lines_match_the_grammar() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut m = GestureMapper::new(Thresholds::default(), Screen::default());
    for i in 0..5_000u64 {
        for cmd in m.map_at(&random_hand(&mut rng), Duration::from_millis(i * 16)) {
            let line = cmd.to_string();
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let verb = tokens[0];
            let expected = expected_tokens(verb)
                .unwrap_or_else(|| panic!("unknown verb {verb:?} in {line:?}"));
            assert_eq!(
                tokens.len(),
                expected,
                "token count mismatch for {line:?}"
            );
            // numeric arguments must parse as integers
            match verb {
                "MOUSE_MOVE" | "GAMEPAD_STICK" => {
                    tokens[1].parse::<i32>().unwrap();
                    tokens[2].parse::<i32>().unwrap();
                }
                "MOUSE_SCROLL" => {
                    tokens[1].parse::<i32>().unwrap();
                }
                "GAMEPAD_BTN" => {
                    assert!(tokens[2] == "0" || tokens[2] == "1");
                }
                _ => {}
            }
        }
    }
}

#[test]
fn stick_output_is_bounded_for_arbitrary_input() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut m = GestureMapper::new(Thresholds::default(), Screen::default());
    for i in 0..10_000u64 {
        // positions well outside the nominal [0,1] range included
        let x = rng.gen_range(-3.0f32..4.0);
        let y = rng.gen_range(-3.0f32..4.0);
        let mut hand = random_hand(&mut rng);
        hand.landmarks[lm::INDEX_TIP].x = x;
        hand.landmarks[lm::INDEX_TIP].y = y;
        for cmd in m.map_at(&hand, Duration::from_millis(i * 16)) {
            if let handctl::protocol::Command::GamepadStick { x, y } = cmd {
                assert!((-32767..=32767).contains(&x));
                assert!((-32767..=32767).contains(&y));
            }
        }
    }
}
