// Character animation playback

use log::warn;
use std::collections::HashMap;

/// Clip played when a requested clip does not exist
pub const FALLBACK_CLIP: &str = "Idle";

/// A single animation clip
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Name of the animation (e.g., "Idle", "Walk", "Dance")
    pub name: String,
    /// Number of frames in the animation
    pub frame_count: usize,
    /// Duration of each frame in seconds
    pub frame_duration: f32,
    /// Whether the animation loops
    pub looping: bool,
}

impl AnimationClip {
    /// Create a new animation clip
    pub fn new(name: &str, frame_count: usize, fps: f32, looping: bool) -> Self {
        Self {
            name: name.to_string(),
            frame_count,
            frame_duration: 1.0 / fps,
            looping,
        }
    }

    /// Create a looping animation
    pub fn looping(name: &str, frame_count: usize, fps: f32) -> Self {
        Self::new(name, frame_count, fps, true)
    }

    /// Create a one-shot animation (plays once)
    pub fn one_shot(name: &str, frame_count: usize, fps: f32) -> Self {
        Self::new(name, frame_count, fps, false)
    }
}

/// Manages animation playback for a character
#[derive(Debug)]
pub struct AnimationPlayer {
    /// All available animations
    animations: HashMap<String, AnimationClip>,
    /// Currently playing animation name
    current_animation: String,
    /// Current frame index
    current_frame: usize,
    /// Time elapsed in current frame
    frame_timer: f32,
    /// Whether the animation is playing
    playing: bool,
    /// Triggers raised since the world last drained them
    triggers: Vec<&'static str>,
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self {
            animations: HashMap::new(),
            current_animation: String::new(),
            current_frame: 0,
            frame_timer: 0.0,
            playing: true,
            triggers: Vec::new(),
        }
    }

    /// Create an animation player with the standard character clips
    pub fn with_standard_animations() -> Self {
        let mut player = Self::new();

        player.add_animation(AnimationClip::looping("Idle", 8, 10.0));
        player.add_animation(AnimationClip::looping("Walk", 8, 12.0));
        player.add_animation(AnimationClip::looping("Run", 8, 16.0));
        player.add_animation(AnimationClip::looping("Crouch", 4, 8.0));
        player.add_animation(AnimationClip::one_shot("Jump", 4, 12.0));
        player.add_animation(AnimationClip::looping("Fall", 4, 10.0));
        player.add_animation(AnimationClip::looping("Cling", 4, 8.0));
        player.add_animation(AnimationClip::one_shot("Shoot", 6, 12.0));
        player.add_animation(AnimationClip::looping("Dance", 12, 12.0));
        player.add_animation(AnimationClip::one_shot("Dead", 6, 10.0));

        player.play(FALLBACK_CLIP);

        player
    }

    /// Add an animation clip
    pub fn add_animation(&mut self, clip: AnimationClip) {
        self.animations.insert(clip.name.clone(), clip);
    }

    /// Check whether a clip exists
    pub fn has_clip(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    /// Play an animation by name
    pub fn play(&mut self, name: &str) {
        if self.current_animation != name {
            self.current_animation = name.to_string();
            self.current_frame = 0;
            self.frame_timer = 0.0;
            self.playing = true;
        }
    }

    /// Play `name`, or `fallback` if no clip with that name exists
    pub fn play_or_fallback(&mut self, name: &str, fallback: &str) {
        if self.has_clip(name) {
            self.play(name);
        } else {
            warn!("No '{}' animation found, using '{}' instead", name, fallback);
            self.play(fallback);
        }
    }

    /// Raise a one-shot animation trigger
    pub fn set_trigger(&mut self, name: &'static str) {
        self.triggers.push(name);
    }

    /// Take all triggers raised since the last call
    pub fn drain_triggers(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.triggers)
    }

    /// Update the animation (called every frame)
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }

        let Some(clip) = self.animations.get(&self.current_animation) else {
            return;
        };

        self.frame_timer += dt;

        while self.frame_timer >= clip.frame_duration {
            self.frame_timer -= clip.frame_duration;
            self.current_frame += 1;

            if self.current_frame >= clip.frame_count {
                if clip.looping {
                    self.current_frame = 0;
                } else {
                    // Stay on last frame
                    self.current_frame = clip.frame_count - 1;
                    self.playing = false;
                }
            }
        }
    }

    /// Get the current animation name
    pub fn current_animation(&self) -> &str {
        &self.current_animation
    }

    /// Get the current frame index
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }
}
