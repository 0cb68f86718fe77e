//! Wire types for the Refractor REST API and socket bodies

mod auth;
mod chat;
mod game;
mod group;
mod infraction;
mod player;
mod search;
mod server;
mod stats;
mod user;

pub use auth::{Identity, Session, VerifiableAddress};
pub use chat::{ChatMessage, FlaggedWord};
pub use game::{
    Game, GameCommand, GameCommandSettings, GameGeneralSettings, GameSettings, InfractionCommands,
    SyncCommands,
};
pub use group::{GroupReorderInfo, Group, NewGroupParams, Permission, ServerOverrides};
pub use infraction::{
    Attachment, CreateAttachmentParams, CreateInfractionParams, Infraction, InfractionType,
    UpdateInfractionParams,
};
pub use player::{OnlinePlayer, Player};
pub use search::{
    ChatSearchBody, InfractionSearchBody, InfractionSearchResult, PlayerSearchBody,
    PlayerSearchResult, SearchResults,
};
pub use server::{CreateServerParams, Server, UpdateServerParams};
pub use stats::Stats;
pub use user::{User, UserGroupParams, UserLinkParams, UserMeta, UserTraits};

/// Numeric id used by servers, groups, infractions and chat messages
pub type Id = i64;
