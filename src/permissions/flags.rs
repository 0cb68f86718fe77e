//! Flags deployed with Refractor
//!
//! Bit positions come from the order of `BUILTIN_FLAGS`. Stored group and
//! user masks depend on that order, so entries are only ever appended.

pub const FLAG_SUPER_ADMIN: &str = "FLAG_SUPER_ADMIN";
pub const FLAG_ADMINISTRATOR: &str = "FLAG_ADMINISTRATOR";
pub const FLAG_VIEW_SERVERS: &str = "FLAG_VIEW_SERVERS";
pub const FLAG_VIEW_PLAYER_RECORDS: &str = "FLAG_VIEW_PLAYER_RECORDS";
pub const FLAG_VIEW_INFRACTION_RECORDS: &str = "FLAG_VIEW_INFRACTION_RECORDS";
pub const FLAG_VIEW_CHAT_RECORDS: &str = "FLAG_VIEW_CHAT_RECORDS";
pub const FLAG_CREATE_WARNING: &str = "FLAG_CREATE_WARNING";
pub const FLAG_CREATE_MUTE: &str = "FLAG_CREATE_MUTE";
pub const FLAG_CREATE_KICK: &str = "FLAG_CREATE_KICK";
pub const FLAG_CREATE_BAN: &str = "FLAG_CREATE_BAN";
pub const FLAG_EDIT_OWN_INFRACTIONS: &str = "FLAG_EDIT_OWN_INFRACTIONS";
pub const FLAG_EDIT_ANY_INFRACTION: &str = "FLAG_EDIT_ANY_INFRACTION";
pub const FLAG_DELETE_OWN_INFRACTIONS: &str = "FLAG_DELETE_OWN_INFRACTIONS";
pub const FLAG_DELETE_ANY_INFRACTION: &str = "FLAG_DELETE_ANY_INFRACTION";
pub const FLAG_SEND_CHAT_MESSAGES: &str = "FLAG_SEND_CHAT_MESSAGES";
pub const FLAG_VIEW_USERS: &str = "FLAG_VIEW_USERS";

/// (name, description) in bit order
pub const BUILTIN_FLAGS: &[(&str, &str)] = &[
    (
        FLAG_SUPER_ADMIN,
        "Grants every permission and cannot be revoked by group overrides. Reserved for the \
         owner of the installation.",
    ),
    (
        FLAG_ADMINISTRATOR,
        "Grants full access to Refractor. Administrator is required to add, edit and delete \
         servers as well as modify admin level settings.",
    ),
    (
        FLAG_VIEW_SERVERS,
        "Allows the viewing of servers, their status and their online players.",
    ),
    (
        FLAG_VIEW_PLAYER_RECORDS,
        "Allows the viewing of player records.",
    ),
    (
        FLAG_VIEW_INFRACTION_RECORDS,
        "Allows the viewing of infraction records.",
    ),
    (
        FLAG_VIEW_CHAT_RECORDS,
        "Allows the viewing of chat message records.",
    ),
    (FLAG_CREATE_WARNING, "Allows the creation of warnings."),
    (FLAG_CREATE_MUTE, "Allows the creation of mutes."),
    (FLAG_CREATE_KICK, "Allows the creation of kicks."),
    (FLAG_CREATE_BAN, "Allows the creation of bans."),
    (
        FLAG_EDIT_OWN_INFRACTIONS,
        "Allows editing and repealing infractions the user issued.",
    ),
    (
        FLAG_EDIT_ANY_INFRACTION,
        "Allows editing and repealing any infraction.",
    ),
    (
        FLAG_DELETE_OWN_INFRACTIONS,
        "Allows deleting infractions the user issued.",
    ),
    (FLAG_DELETE_ANY_INFRACTION, "Allows deleting any infraction."),
    (
        FLAG_SEND_CHAT_MESSAGES,
        "Allows sending chat messages to servers from the dashboard.",
    ),
    (FLAG_VIEW_USERS, "Allows the viewing of Refractor users."),
    // append new flags here
];
