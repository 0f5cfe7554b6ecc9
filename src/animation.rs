//! Animation clips and the playback lifecycle.
//!
//! A [`Clip`] is a set of per-node keyframe channels sampled with linear
//! interpolation and looped indefinitely. The [`Player`] owns the clip set
//! and a playback clock, and moves through `Idle -> Playing <-> Paused`:
//! playback starts when a named clip resolves, pauses when the window stops
//! being visible, and resumes from the same clock when it comes back. A
//! missing clip name is tolerated silently; the player just stays idle.

use crate::scene::Scene;
use glam::{Quat, Vec3};
use log::debug;

/// Which node property a channel animates.
#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

/// Keyframed values for one property of one node.
#[derive(Clone, Debug)]
pub struct Channel {
    /// Index of the target node in the scene.
    pub node: usize,
    /// Keyframe timestamps in seconds, ascending.
    pub times: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Channel {
    /// Index of the keyframe at or before `time`, plus the blend fraction
    /// toward the next one. Clamps at both ends.
    fn locate(&self, time: f32) -> (usize, usize, f32) {
        let last = self.times.len() - 1;
        if time <= self.times[0] {
            return (0, 0, 0.0);
        }
        if time >= self.times[last] {
            return (last, last, 0.0);
        }

        let next = self.times.partition_point(|&t| t <= time);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let alpha = if span > 0.0 {
            (time - self.times[prev]) / span
        } else {
            0.0
        };
        (prev, next, alpha)
    }

    /// Writes the interpolated value for `time` onto the target node.
    fn sample(&self, time: f32, scene: &mut Scene) {
        if self.times.is_empty() {
            return;
        }
        let (prev, next, alpha) = self.locate(time);
        let node = &mut scene.nodes[self.node];

        match &self.keyframes {
            Keyframes::Translation(values) => {
                node.translation = values[prev].lerp(values[next], alpha);
            }
            Keyframes::Rotation(values) => {
                node.rotation = values[prev].slerp(values[next], alpha);
            }
            Keyframes::Scale(values) => {
                node.scale = values[prev].lerp(values[next], alpha);
            }
        }
    }
}

/// A named, loopable animation clip.
#[derive(Clone, Debug)]
pub struct Clip {
    pub name: String,
    /// Clip length in seconds: the largest keyframe timestamp.
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl Clip {
    /// Samples every channel at `time` (already wrapped by the caller).
    pub fn sample(&self, time: f32, scene: &mut Scene) {
        for channel in &self.channels {
            channel.sample(time, scene);
        }
    }
}

/// Playback lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    /// No clip resolved; nothing plays.
    Idle,
    Playing,
    Paused,
}

/// Owns the clip set and drives looping playback.
pub struct Player {
    clips: Vec<Clip>,
    active: Option<usize>,
    clock: f32,
    paused: bool,
}

impl Player {
    pub fn new(clips: Vec<Clip>) -> Self {
        Self {
            clips,
            active: None,
            clock: 0.0,
            paused: false,
        }
    }

    /// Resolves a clip by name and starts looping playback from time zero.
    ///
    /// An absent name leaves the player idle; no playback, no error.
    pub fn play(&mut self, name: &str) {
        match self.clips.iter().position(|c| c.name == name) {
            Some(index) => {
                self.active = Some(index);
                self.clock = 0.0;
                self.paused = false;
            }
            None => {
                debug!("animation clip {name:?} not found; staying idle");
            }
        }
    }

    /// Freezes the clock. No-op unless currently playing.
    pub fn pause(&mut self) {
        if self.active.is_some() {
            self.paused = true;
        }
    }

    /// Continues from the paused clock. No-op unless currently paused.
    pub fn resume(&mut self) {
        if self.active.is_some() {
            self.paused = false;
        }
    }

    pub fn state(&self) -> Playback {
        match self.active {
            None => Playback::Idle,
            Some(_) if self.paused => Playback::Paused,
            Some(_) => Playback::Playing,
        }
    }

    /// Elapsed playback time within the current loop iteration.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Accumulates `dt` seconds of playback, wrapping at the clip duration.
    /// Does nothing while idle or paused.
    pub fn advance(&mut self, dt: f32) {
        let Some(index) = self.active else {
            return;
        };
        if self.paused {
            return;
        }
        let duration = self.clips[index].duration;
        if duration > 0.0 {
            self.clock = (self.clock + dt).rem_euclid(duration);
        }
    }

    /// Writes the current pose onto the scene nodes.
    pub fn apply(&self, scene: &mut Scene) {
        if let Some(index) = self.active {
            self.clips[index].sample(self.clock, scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    fn rig() -> Scene {
        Scene {
            nodes: vec![Node {
                name: None,
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
                parent: None,
            }],
            primitives: vec![],
        }
    }

    fn bob_clip() -> Clip {
        Clip {
            name: "experiment".into(),
            duration: 2.0,
            channels: vec![Channel {
                node: 0,
                times: vec![0.0, 1.0, 2.0],
                keyframes: Keyframes::Translation(vec![
                    Vec3::ZERO,
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::ZERO,
                ]),
            }],
        }
    }

    #[test]
    fn sampling_interpolates_between_keyframes() {
        let mut scene = rig();
        bob_clip().sample(0.5, &mut scene);
        assert_eq!(scene.nodes[0].translation, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn sampling_clamps_outside_keyframe_range() {
        // First keyframe at t=1.0; sampling before it holds the first value,
        // sampling past the last holds the last value.
        let clip = Clip {
            name: "clamped".into(),
            duration: 2.0,
            channels: vec![Channel {
                node: 0,
                times: vec![1.0, 2.0],
                keyframes: Keyframes::Translation(vec![Vec3::X, Vec3::Y]),
            }],
        };

        let mut scene = rig();
        clip.sample(0.0, &mut scene);
        assert_eq!(scene.nodes[0].translation, Vec3::X);

        clip.sample(3.0, &mut scene);
        assert_eq!(scene.nodes[0].translation, Vec3::Y);
    }

    #[test]
    fn missing_clip_keeps_player_idle() {
        let mut player = Player::new(vec![bob_clip()]);
        player.play("does-not-exist");
        assert_eq!(player.state(), Playback::Idle);

        player.advance(1.0);
        assert_eq!(player.clock(), 0.0);
    }

    #[test]
    fn play_starts_looping_from_zero() {
        let mut player = Player::new(vec![bob_clip()]);
        player.play("experiment");
        assert_eq!(player.state(), Playback::Playing);
        assert_eq!(player.clock(), 0.0);

        player.advance(1.5);
        assert!((player.clock() - 1.5).abs() < 1e-6);

        // Wraps at the clip duration.
        player.advance(1.0);
        assert!((player.clock() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pause_preserves_the_clock_and_resume_continues() {
        let mut player = Player::new(vec![bob_clip()]);
        player.play("experiment");
        player.advance(0.75);

        player.pause();
        assert_eq!(player.state(), Playback::Paused);
        player.advance(5.0);
        assert!((player.clock() - 0.75).abs() < 1e-6);

        player.resume();
        assert_eq!(player.state(), Playback::Playing);
        player.advance(0.25);
        assert!((player.clock() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut player = Player::new(vec![bob_clip()]);
        player.play("experiment");
        player.advance(0.5);

        player.pause();
        player.pause();
        assert_eq!(player.state(), Playback::Paused);
        assert!((player.clock() - 0.5).abs() < 1e-6);

        player.resume();
        player.resume();
        assert_eq!(player.state(), Playback::Playing);
    }

    #[test]
    fn visibility_round_trip_loses_no_time() {
        let mut player = Player::new(vec![bob_clip()]);
        player.play("experiment");

        player.advance(0.4);
        player.pause(); // hidden
        player.resume(); // visible again
        player.advance(0.6);
        player.pause(); // hidden again

        assert!((player.clock() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn apply_writes_the_sampled_pose() {
        let mut scene = rig();
        let mut player = Player::new(vec![bob_clip()]);
        player.play("experiment");
        player.advance(1.0);
        player.apply(&mut scene);
        assert_eq!(scene.nodes[0].translation, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn pause_on_idle_player_stays_idle() {
        let mut player = Player::new(vec![]);
        player.pause();
        assert_eq!(player.state(), Playback::Idle);
        player.resume();
        assert_eq!(player.state(), Playback::Idle);
    }
}
