//! Data acquisition for a Minecraft server: console commands over rcon,
//! player data from the world save and player names from the profile service.

pub mod collector;
mod error;
pub mod identity;
pub mod rcon;
pub mod save;
pub mod version;

pub use collector::{RconCollector, SaveCollector, ServerSnapshot};
pub use error::{ConfigError, Error, LookupError, ParseError, Result, TransportError};
pub use identity::{IdentityCache, MojangLookup, Profile, ProfileLookup};
pub use rcon::{RconClient, ServerType};
pub use save::{PlayerData, Save};
pub use version::{MinecraftVersion, SharedVersion};
