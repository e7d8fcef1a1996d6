use std::sync::Arc;

use slotmap::SlotMap;

use crate::animation::clip::Animation;
use crate::animation::player::AnimationPlayer;
use crate::animation::{AnimationKey, PlayerKey};
use crate::errors::{PgeError, ResourceKind, Result};
use crate::scene::NodeGraph;

/// Owns loaded animations and the players driving them.
///
/// Single-writer, like the node graph it writes into.
#[derive(Debug, Default)]
pub struct Animator {
    animations: SlotMap<AnimationKey, Arc<Animation>>,
    players: SlotMap<PlayerKey, AnimationPlayer>,
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_animation(&mut self, animation: Animation) -> AnimationKey {
        log::debug!(
            "Animation {:?} loaded ({} channels, {:.3}s)",
            animation.name(),
            animation.channels().len(),
            animation.duration()
        );
        self.animations.insert(Arc::new(animation))
    }

    pub fn animation(&self, key: AnimationKey) -> Result<Arc<Animation>> {
        self.animations
            .get(key)
            .cloned()
            .ok_or(PgeError::StaleHandle(ResourceKind::Animation))
    }

    /// Unloads the animation. Players already created from it keep their
    /// own reference and continue to work.
    pub fn remove_animation(&mut self, key: AnimationKey) -> Option<Arc<Animation>> {
        self.animations.remove(key)
    }

    #[must_use]
    pub fn find_animation(&self, name: &str) -> Option<AnimationKey> {
        self.animations
            .iter()
            .find(|(_, a)| a.name() == name)
            .map(|(k, _)| k)
    }

    /// Creates a stopped player for a loaded animation.
    pub fn create_player(&mut self, animation: AnimationKey) -> Result<PlayerKey> {
        let animation = self.animation(animation)?;
        Ok(self.players.insert(AnimationPlayer::new(animation)))
    }

    pub fn add_player(&mut self, player: AnimationPlayer) -> PlayerKey {
        self.players.insert(player)
    }

    pub fn remove_player(&mut self, key: PlayerKey) -> Option<AnimationPlayer> {
        self.players.remove(key)
    }

    pub fn player(&self, key: PlayerKey) -> Result<&AnimationPlayer> {
        self.players
            .get(key)
            .ok_or(PgeError::StaleHandle(ResourceKind::Player))
    }

    pub fn player_mut(&mut self, key: PlayerKey) -> Result<&mut AnimationPlayer> {
        self.players
            .get_mut(key)
            .ok_or(PgeError::StaleHandle(ResourceKind::Player))
    }

    pub fn play(&mut self, key: PlayerKey) -> Result<()> {
        self.player_mut(key)?.play();
        Ok(())
    }

    pub fn pause(&mut self, key: PlayerKey) -> Result<()> {
        self.player_mut(key)?.pause();
        Ok(())
    }

    pub fn stop(&mut self, key: PlayerKey) -> Result<()> {
        self.player_mut(key)?.stop();
        Ok(())
    }

    pub fn seek(&mut self, key: PlayerKey, time: f32) -> Result<()> {
        self.player_mut(key)?.seek(time);
        Ok(())
    }

    #[must_use]
    pub fn playing_count(&self) -> usize {
        self.players.values().filter(|p| p.is_playing()).count()
    }

    /// Advances every playing player by `dt` and writes its pose.
    ///
    /// Players that reach their end during this tick still write their final
    /// pose. A player whose target node was destroyed is stopped. All
    /// players are processed; the first error is returned.
    pub fn tick(&mut self, dt: f32, graph: &mut NodeGraph) -> Result<()> {
        let mut first_error = None;

        for (key, player) in &mut self.players {
            if !player.is_playing() {
                continue;
            }
            player.advance(dt);

            if let Err(e) = player.apply(graph) {
                if matches!(e, PgeError::StaleHandle(ResourceKind::Node)) {
                    log::warn!(
                        "Animation {:?} targets a destroyed node, stopping player {key:?}",
                        player.animation().name()
                    );
                    player.stop();
                }
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
