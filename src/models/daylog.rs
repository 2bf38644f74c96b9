use super::{BaseModel, User};
use crate::mapper::ColumnValue;
use crate::service::validation::{char_len, unique_ignore_case, Validator};
use crate::sql::SqlValue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How the day went. Stored as an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i32)]
pub enum MoodLabel {
    Bad = 1,
    #[default]
    Neutral = 2,
    Good = 3,
}

impl ColumnValue for MoodLabel {}

impl From<MoodLabel> for SqlValue {
    fn from(label: MoodLabel) -> Self {
        SqlValue::I32(label as i32)
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoodLabel::Bad => "BAD",
            MoodLabel::Neutral => "NEUTRAL",
            MoodLabel::Good => "GOOD",
        };
        f.write_str(s)
    }
}

impl FromStr for MoodLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BAD" => Ok(MoodLabel::Bad),
            "NEUTRAL" => Ok(MoodLabel::Neutral),
            "GOOD" => Ok(MoodLabel::Good),
            other => Err(format!("unknown mood label: {other}")),
        }
    }
}

/// One journal entry. `tags` is aggregated by the `day_logs_with_tags` view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Daylog {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub mood_label: MoodLabel,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(flatten)]
    pub base: BaseModel,
}

crate::impl_entity!(Daylog {
    id: column("id"),
    user_id: column("user_id"),
    date: column("date"),
    description: column("description"),
    mood_label: column("mood_label"),
    tags: column("tags"),
    user: ignore,
    base: embed(BaseModel),
});

pub const MAX_DESCRIPTION: usize = 1000;
pub const MAX_TAG_NAME: usize = 100;

/// Body of a create request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaylogInput {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    pub mood_label: Option<MoodLabel>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of a partial update. Absent fields keep their stored value; `tags`
/// replaces the whole set when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaylogPatch {
    pub version: i32,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub mood_label: Option<MoodLabel>,
    pub tags: Option<Vec<String>>,
}

pub fn validate_tags(v: &mut Validator, tags: &[String]) {
    for tag in tags {
        v.check(!tag.trim().is_empty(), "tags", "must not contain empty names");
        v.check(char_len(tag) <= MAX_TAG_NAME, "tags", "must not contain names longer than 100 characters");
    }
    v.check(unique_ignore_case(tags), "tags", "must not contain duplicate values");
}

impl DaylogInput {
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.date.is_some(), "date", "must be provided");
        v.check(self.mood_label.is_some(), "mood_label", "must be provided");
        v.check(
            char_len(&self.description) <= MAX_DESCRIPTION,
            "description",
            "must not be more than 1000 characters long",
        );
        validate_tags(v, &self.tags);
    }
}

impl DaylogPatch {
    /// Merge into the stored entry.
    pub fn apply(self, log: &mut Daylog) {
        log.base.version = self.version;
        if let Some(date) = self.date {
            log.date = date;
        }
        if let Some(description) = self.description {
            log.description = description;
        }
        if let Some(mood_label) = self.mood_label {
            log.mood_label = mood_label;
        }
        if let Some(tags) = self.tags {
            log.tags = tags;
        }
    }
}

impl Daylog {
    pub fn validate(&self, v: &mut Validator) {
        v.check(
            char_len(&self.description) <= MAX_DESCRIPTION,
            "description",
            "must not be more than 1000 characters long",
        );
        validate_tags(v, &self.tags);
    }
}
