use crate::{
    containers::{Container, ContainerKind, UpsertCoordinator},
    state::AppState,
};
use axum::Router;

pub mod dto;
pub mod handlers;

use dto::{Profile, ProfileResponse};

pub const DEFAULT_NAME: &str = "Default";
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
pub const DEFAULT_LAST_PROFILE: i32 = 1;

/// The per-user list of Pomodoro timer profiles.
pub struct Profiles;

pub type ProfileCoordinator = UpsertCoordinator<Profiles>;

fn default_profile() -> Profile {
    Profile {
        name: Some(DEFAULT_NAME.to_string()),
        focus_time: Some(DEFAULT_FOCUS_MINUTES),
        break_time: Some(DEFAULT_BREAK_MINUTES),
        long_break: Some(DEFAULT_LONG_BREAK_MINUTES),
    }
}

impl ContainerKind for Profiles {
    const NAME: &'static str = "Profiles";
    const TABLE: &'static str = "profiles";
    const PAYLOAD_COLUMN: &'static str = "profile_stored";
    const EXTRA_COLUMN: Option<&'static str> = Some("last_profile");

    type Item = Profile;
    type View = ProfileResponse;

    fn fill_defaults(items: Option<Vec<Profile>>) -> Vec<Profile> {
        let Some(items) = items else {
            return vec![default_profile()];
        };
        items
            .into_iter()
            .map(|p| Profile {
                name: Some(p.name.unwrap_or_else(|| DEFAULT_NAME.to_string())),
                focus_time: Some(p.focus_time.unwrap_or(DEFAULT_FOCUS_MINUTES)),
                break_time: Some(p.break_time.unwrap_or(DEFAULT_BREAK_MINUTES)),
                long_break: Some(p.long_break.unwrap_or(DEFAULT_LONG_BREAK_MINUTES)),
            })
            .collect()
    }

    fn default_extra(extra: Option<i32>) -> Option<i32> {
        Some(extra.unwrap_or(DEFAULT_LAST_PROFILE))
    }

    fn shape(c: Container<Profile>) -> ProfileResponse {
        ProfileResponse {
            id: c.id,
            user_id: c.owner_id,
            last_profile: c.extra.unwrap_or(DEFAULT_LAST_PROFILE),
            profile_stored: c.items,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
