use crate::error::{GameError, GameResult};
use crate::types::PosterId;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Posters known to the game and the ones already shown this game
#[derive(Debug, Clone, Default)]
pub struct PosterPool {
    all: Vec<PosterId>,
    used: Vec<PosterId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PosterDraw {
    pub poster: PosterId,
    /// The pool was exhausted and used posters were made available again
    pub recycled: bool,
}

impl PosterPool {
    pub fn new(posters: Vec<PosterId>) -> Self {
        let mut pool = Self::default();
        pool.load(posters);
        pool
    }

    /// Replace the known posters, dropping duplicates
    pub fn load(&mut self, posters: Vec<PosterId>) {
        self.all.clear();
        for poster in posters {
            if !self.all.contains(&poster) {
                self.all.push(poster);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn used(&self) -> &[PosterId] {
        &self.used
    }

    /// Forget which posters were shown; the known list is kept
    pub fn reset_used(&mut self) {
        self.used.clear();
    }

    /// Pick an unused poster uniformly at random and mark it used. Once every
    /// poster has been shown the used list starts over.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameResult<PosterDraw> {
        if self.all.is_empty() {
            return Err(GameError::NoPosters);
        }

        let mut available: Vec<&PosterId> =
            self.all.iter().filter(|p| !self.used.contains(p)).collect();
        let recycled = available.is_empty();
        if recycled {
            available = self.all.iter().collect();
        }

        let poster = available
            .choose(rng)
            .map(|p| (*p).clone())
            .ok_or(GameError::NoPosters)?;

        if recycled {
            self.used.clear();
        }
        self.used.push(poster.clone());
        Ok(PosterDraw { poster, recycled })
    }
}
