//! Experiment name allocation
//!
//! Generated names are adjective-noun pairs, produced independently of any
//! experiment state and then checked for collision against the names
//! already taken in the target model namespace. Explicit caller-supplied
//! names skip generation but go through the same uniqueness check.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::{Error, Result};

/// How many generated candidates are tried before giving up with
/// [`Error::NameSpaceExhausted`].
pub const MAX_NAME_ATTEMPTS: usize = 43;

const ADJECTIVES: &[&str] = &[
    "amber", "ancient", "bold", "brave", "bright", "calm", "clever", "cosmic", "crimson",
    "curious", "daring", "deep", "eager", "early", "fearless", "fierce", "gentle", "gilded",
    "golden", "hidden", "humble", "keen", "lively", "lucid", "mellow", "misty", "noble",
    "patient", "proud", "quiet", "rapid", "restless", "rustic", "silent", "solar", "stoic",
    "swift", "tidal", "vivid", "wandering", "wild", "wise",
];

const NOUNS: &[&str] = &[
    "aurora", "badger", "beacon", "canyon", "comet", "condor", "coral", "crane", "delta",
    "ember", "falcon", "fjord", "gazelle", "glacier", "harbor", "heron", "ibis", "jaguar",
    "lagoon", "lantern", "lynx", "marmot", "meadow", "meteor", "nebula", "orchid", "osprey",
    "otter", "pine", "quartz", "raven", "reef", "sparrow", "summit", "thicket", "tundra",
    "walrus", "willow", "zephyr",
];

/// Source of candidate experiment names.
///
/// Kept as a seam so tests can pin the generator; production code uses
/// [`WordPairGenerator`].
pub trait NameSource {
    /// Produce one candidate name.
    fn generate(&mut self) -> String;
}

/// Default name source: a random adjective-noun pair like `brave-falcon`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordPairGenerator;

impl NameSource for WordPairGenerator {
    fn generate(&mut self) -> String {
        let mut rng = rand::thread_rng();
        // Both slices are non-empty constants, choose cannot fail.
        let adjective = ADJECTIVES.choose(&mut rng).unwrap_or(&"brave");
        let noun = NOUNS.choose(&mut rng).unwrap_or(&"falcon");
        format!("{adjective}-{noun}")
    }
}

/// Allocates an experiment name that is unique within one model namespace.
#[derive(Debug)]
pub struct NameAllocator<G = WordPairGenerator> {
    source: G,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new(WordPairGenerator)
    }
}

impl<G: NameSource> NameAllocator<G> {
    /// Create an allocator over the given name source.
    #[must_use]
    pub const fn new(source: G) -> Self {
        Self { source }
    }

    /// Generate a name absent from `taken`, retrying on collision.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameSpaceExhausted`] once [`MAX_NAME_ATTEMPTS`]
    /// candidates have all collided.
    pub fn allocate(&mut self, taken: &HashSet<String>) -> Result<String> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let candidate = self.source.generate();
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
        }

        Err(Error::NameSpaceExhausted(MAX_NAME_ATTEMPTS))
    }

    /// Check a caller-chosen name against `taken`.
    ///
    /// No retry: the caller cannot be offered an alternative they did not
    /// choose.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateExperimentName`] on collision.
    pub fn reserve_explicit(&self, name: &str, taken: &HashSet<String>) -> Result<String> {
        if taken.contains(name) {
            return Err(Error::DuplicateExperimentName(name.to_string()));
        }
        Ok(name.to_string())
    }
}
