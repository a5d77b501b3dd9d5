use std::collections::BTreeMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use nexus_ecs::Component;

use crate::error::{Result, SceneError};

/// Joint matrices of a skeleton at one point in time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnimatedFrame {
    pub timestamp: f32,
    pub joints: Vec<Mat4>,
}

/// A looping clip: frames sorted by timestamp plus a playhead.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Animation {
    pub name: String,
    pub duration: f32,
    pub frames: Vec<AnimatedFrame>,
    #[serde(default)]
    time: f32,
}

impl Animation {
    pub fn new(name: impl Into<String>, duration: f32, frames: Vec<AnimatedFrame>) -> Animation {
        Animation {
            name: name.into(),
            duration,
            frames,
            time: 0.0,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Moves the playhead forward, wrapping around once the end of the clip is passed.
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
        if self.duration > 0.0 && self.time > self.duration {
            self.time %= self.duration;
        }
    }

    /// The last frame at or before the playhead and the first one after it. Past the final frame both are the
    /// final frame.
    fn frames_around(&self) -> Option<(&AnimatedFrame, &AnimatedFrame)> {
        let first = self.frames.first()?;
        let mut last = first;
        let mut next = first;

        for frame in &self.frames[1..] {
            next = frame;
            if frame.timestamp > self.time {
                break;
            }
            last = frame;
        }

        Some((last, next))
    }

    /// Joint matrices at the playhead, interpolated between the surrounding frames.
    pub fn sample(&self) -> Vec<Mat4> {
        let (last, next) = match self.frames_around() {
            Some(pair) => pair,
            None => return Vec::new(),
        };

        let span = next.timestamp - last.timestamp;
        let progress = if span > 0.0 {
            ((self.time - last.timestamp) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        last.joints
            .iter()
            .zip(&next.joints)
            .map(|(a, b)| {
                let (_, rot_a, pos_a) = a.to_scale_rotation_translation();
                let (scale_b, rot_b, pos_b) = b.to_scale_rotation_translation();

                Mat4::from_scale_rotation_translation(
                    scale_b,
                    rot_a.slerp(rot_b, progress),
                    pos_a.lerp(pos_b, progress),
                )
            })
            .collect()
    }

    pub fn next_frame(&mut self, dt: f32) -> Vec<Mat4> {
        self.advance(dt);
        self.sample()
    }
}

/// On-disk form of an animation asset. Clips without a name take the name of the asset they are loaded from.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AnimationFile {
    pub clips: Vec<AnimationClip>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnimationClip {
    #[serde(default)]
    pub name: Option<String>,
    pub duration: f32,
    pub frames: Vec<AnimatedFrame>,
}

impl AnimationFile {
    pub fn into_animations(self, asset_name: &str) -> Vec<Animation> {
        self.clips
            .into_iter()
            .map(|clip| {
                let name = clip.name.unwrap_or_else(|| asset_name.to_string());
                Animation::new(name, clip.duration, clip.frames)
            })
            .collect()
    }
}

/// The set of clips an entity can play, which one is playing and which one is fading in.
#[derive(Component, Serialize, Deserialize, Clone, Debug)]
pub struct AnimationMapComponent {
    animations: BTreeMap<String, Animation>,
    current: Option<String>,
    next: Option<String>,
    /// Playback weight of the current clip
    weight: f32,
    /// Rate at which the queued clip fades in, and its weight once it takes over
    fade_rate: f32,
    blend: f32,
}

impl Default for AnimationMapComponent {
    fn default() -> Self {
        AnimationMapComponent {
            animations: BTreeMap::new(),
            current: None,
            next: None,
            weight: 1.0,
            fade_rate: 1.0,
            blend: 0.0,
        }
    }
}

impl AnimationMapComponent {
    pub fn from_animations(animations: impl IntoIterator<Item = Animation>) -> Self {
        let mut map = AnimationMapComponent::default();
        for animation in animations {
            map.add_animation(animation);
        }
        map
    }

    /// Adds a clip, replacing any clip with the same name.
    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.insert(animation.name.clone(), animation);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    /// Starts `name`. When nothing is playing it starts right away at `weight`, otherwise it fades in over the
    /// current clip at a rate scaled by `weight` and keeps that weight once it takes over. Playing the current clip
    /// again updates its weight and cancels a pending fade.
    pub fn play(&mut self, name: &str, weight: f32) -> Result<()> {
        if !self.animations.contains_key(name) {
            return Err(SceneError::AnimationNotFound { name: name.to_string() });
        }

        match self.current.as_deref() {
            None => {
                self.current = Some(name.to_string());
                self.weight = weight;
            }
            Some(current) if current == name => {
                self.next = None;
                self.weight = weight;
            }
            Some(_) => {
                self.next = Some(name.to_string());
                self.fade_rate = weight;
            }
        }
        self.blend = 0.0;

        Ok(())
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.current.as_deref() == Some(name)
    }

    /// Name and weight of the clip currently playing.
    pub fn current(&self) -> Option<(&str, f32)> {
        self.current.as_deref().map(|name| (name, self.weight))
    }

    /// Clip waiting to take over from the current one.
    pub fn queued(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Advances playback by `dt` seconds and returns the joint matrices to skin with. Empty when nothing plays.
    pub fn update(&mut self, dt: f32) -> Vec<Mat4> {
        let current = match self.current.clone() {
            Some(current) => current,
            None => return Vec::new(),
        };

        let matrices = self.animations
            .get_mut(&current)
            .map(|animation| animation.next_frame(dt))
            .unwrap_or_default();

        let next = match self.next.clone() {
            Some(next) => next,
            None => return matrices,
        };

        self.blend += dt * self.fade_rate;
        if self.blend >= 1.0 {
            self.blend = 0.0;
            self.weight = self.fade_rate;
            self.current = Some(next);
            self.next = None;
            return matrices;
        }

        let next_matrices = self.animations
            .get_mut(&next)
            .map(|animation| animation.next_frame(dt))
            .unwrap_or_default();

        let t = self.blend;
        matrices
            .iter()
            .zip(&next_matrices)
            .map(|(a, b)| Mat4::from_cols(
                a.x_axis.lerp(b.x_axis, t),
                a.y_axis.lerp(b.y_axis, t),
                a.z_axis.lerp(b.z_axis, t),
                a.w_axis.lerp(b.w_axis, t),
            ))
            .collect()
    }
}
