use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{containers::ContainerChanges, error::AppError};

/// A timer profile as stored; durations are minutes.
///
/// Decoding stays lenient so rows written by older clients still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "focusTime", default, skip_serializing_if = "Option::is_none")]
    pub focus_time: Option<u32>,
    #[serde(rename = "break", default, skip_serializing_if = "Option::is_none")]
    pub break_time: Option<u32>,
    #[serde(rename = "longBreak", default, skip_serializing_if = "Option::is_none")]
    pub long_break: Option<u32>,
}

impl Profile {
    pub fn validate(&self) -> Result<(), AppError> {
        let minutes = [
            ("focusTime", self.focus_time),
            ("break", self.break_time),
            ("longBreak", self.long_break),
        ];
        for (field, value) in minutes {
            if value == Some(0) {
                return Err(AppError::Validation(format!("{field} must not be less than 1")));
            }
        }
        Ok(())
    }
}

/// Full profile shape accepted by the create endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProfile {
    pub name: String,
    #[serde(rename = "focusTime")]
    pub focus_time: u32,
    #[serde(rename = "break")]
    pub break_time: u32,
    #[serde(rename = "longBreak")]
    pub long_break: u32,
}

impl From<NewProfile> for Profile {
    fn from(p: NewProfile) -> Self {
        Self {
            name: Some(p.name),
            focus_time: Some(p.focus_time),
            break_time: Some(p.break_time),
            long_break: Some(p.long_break),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProfileContainerRequest {
    #[serde(rename = "lastProfile", default)]
    pub last_profile: Option<i32>,
    #[serde(rename = "profileStored")]
    pub profile_stored: Vec<NewProfile>,
}

impl CreateProfileContainerRequest {
    pub fn into_items(self) -> Result<(Vec<Profile>, Option<i32>), AppError> {
        let items: Vec<Profile> = self.profile_stored.into_iter().map(Profile::from).collect();
        items.iter().try_for_each(Profile::validate)?;
        Ok((items, self.last_profile))
    }
}

/// Profile shape accepted by the upsert endpoint; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "focusTime", default)]
    pub focus_time: Option<u32>,
    #[serde(rename = "break", default)]
    pub break_time: Option<u32>,
    #[serde(rename = "longBreak", default)]
    pub long_break: Option<u32>,
}

impl From<ProfilePatch> for Profile {
    fn from(p: ProfilePatch) -> Self {
        Self {
            name: p.name,
            focus_time: p.focus_time,
            break_time: p.break_time,
            long_break: p.long_break,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileContainerRequest {
    #[serde(rename = "lastProfile", default)]
    pub last_profile: Option<i32>,
    #[serde(rename = "profileStored", default)]
    pub profile_stored: Option<Vec<ProfilePatch>>,
}

impl UpdateProfileContainerRequest {
    /// Rejects zero-minute durations before anything is written.
    pub fn into_changes(self) -> Result<ContainerChanges<Profile>, AppError> {
        let items: Option<Vec<Profile>> = self
            .profile_stored
            .map(|items| items.into_iter().map(Profile::from).collect());
        items.iter().flatten().try_for_each(Profile::validate)?;
        Ok(ContainerChanges {
            items,
            extra: self.last_profile,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "lastProfile")]
    pub last_profile: i32,
    #[serde(rename = "profileStored")]
    pub profile_stored: Vec<Profile>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
