use super::{BaseModel, Daylog};
use crate::service::validation::{char_len, Validator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(flatten)]
    pub base: BaseModel,
    /// Most recent entry using this tag, if any.
    pub last_log: Option<Daylog>,
}

crate::impl_entity!(Tag {
    id: column("id"),
    name: column("name"),
    user_id: column("user_id"),
    base: embed(BaseModel),
    last_log: nested(Daylog, "dl"),
});

/// Body of create and update requests; `version` is required for updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagInput {
    #[serde(default)]
    pub name: String,
    pub version: Option<i32>,
}

impl Tag {
    pub fn validate(&self, v: &mut Validator) {
        v.check(!self.name.trim().is_empty(), "name", "must be provided");
        v.check(char_len(&self.name) <= 100, "name", "must not be more than 100 characters long");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{project, width, Entity};

    #[test]
    fn last_log_projects_under_join_alias() {
        let cols = project::<Tag>("t");
        assert_eq!(cols.len(), width(Tag::FIELDS));
        assert_eq!(&cols[..3], ["t.id", "t.name", "t.user_id"]);
        assert!(cols[9..].iter().all(|c| c.starts_with("dl.")));
    }

    #[test]
    fn name_is_required() {
        let mut v = Validator::new();
        Tag::default().validate(&mut v);
        assert!(v.errors().contains_key("name"));
    }
}
