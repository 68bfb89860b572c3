//! Rogeo Game Engine
//!
//! Platform-agnostic core of the Ragnarok map-guessing quiz: guess
//! normalization and matching, spot selection, the round/lives/score state
//! machine and its countdown. Rendering, assets and translations belong to
//! the host; it drives a [`GameSession`] (directly, through the virtual-time
//! [`GameLoop`], or through the tokio actor behind the `async` feature) and
//! renders from [`GameSnapshot`].

#[cfg(feature = "async")]
pub mod actor;
pub mod clock;
pub mod constants;
pub mod data;
pub mod matcher;
pub mod normalize;
pub mod result;
pub mod seed;
pub mod selector;
pub mod session;
pub mod settings;
pub mod state;
pub mod timer;

use std::sync::Arc;

// Re-export commonly used types
#[cfg(feature = "async")]
pub use actor::{ActorError, SessionHandle, spawn_session};
pub use clock::GameLoop;
pub use data::{CatalogError, Spot, SpotCatalog};
pub use matcher::{matches, suggest};
pub use normalize::normalize;
pub use result::GameSummary;
pub use seed::{parse_seed, seed_from_text};
pub use selector::{
    ChoiceOptions, CropFormula, CropOrigin, CropView, crop_origin, multiple_choice_options,
    pick_next,
};
pub use session::{
    GameSession, GameSnapshot, IgnoreReason, PendingReveal, RevealTicket, Transition,
    score_for_correct,
};
pub use settings::{GameMode, Settings, Timing};
pub use state::{MissReason, Phase, RoundOutcome, RoundState, RunStats};
pub use timer::{Countdown, TickOutcome};

/// Trait for abstracting where the spot catalog comes from
/// Hosts can ship their own list or load one at runtime
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the spot catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or is invalid.
    fn load_catalog(&self) -> Result<SpotCatalog, Self::Error>;
}

/// Loader for the catalog compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

impl CatalogLoader for EmbeddedCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<SpotCatalog, Self::Error> {
        SpotCatalog::builtin()
    }
}

/// Loader for a catalog supplied as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    json: String,
}

impl JsonCatalog {
    #[must_use]
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl CatalogLoader for JsonCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<SpotCatalog, Self::Error> {
        SpotCatalog::from_json(&self.json)
    }
}

/// Main game engine for creating sessions over one catalog source
pub struct GameEngine<L>
where
    L: CatalogLoader,
{
    loader: L,
}

impl<L> GameEngine<L>
where
    L: CatalogLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load the catalog once so several sessions can share it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn load_catalog(&self) -> Result<Arc<SpotCatalog>, L::Error> {
        self.loader.load_catalog().map(Arc::new)
    }

    /// Create a new session with the specified seed and settings
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_session(&self, seed: u64, settings: Settings) -> Result<GameSession, L::Error> {
        let catalog = self.load_catalog()?;
        log::debug!(
            "creating session over {} spots with seed {seed:#x}",
            catalog.len()
        );
        Ok(GameSession::new(catalog, settings, seed))
    }

    /// Create a session already wrapped in a virtual-time driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_loop(
        &self,
        seed: u64,
        settings: Settings,
        timing: Timing,
    ) -> Result<GameLoop, L::Error> {
        self.create_session(seed, settings)
            .map(|session| GameLoop::new(session, timing))
    }
}
