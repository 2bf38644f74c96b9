use super::BaseModel;
use crate::service::validation::{char_len, is_email, Validator};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Pending activation code; zero once activated.
    #[serde(skip)]
    pub cod: i32,
    #[serde(skip)]
    pub password_hash: Vec<u8>,
    /// Only present while a registration is being validated.
    #[serde(skip)]
    pub password_plaintext: Option<String>,
    pub activated: bool,
    #[serde(flatten)]
    pub base: BaseModel,
}

crate::impl_entity!(User {
    id: column("id"),
    name: column("name"),
    email: column("email"),
    phone: column("phone"),
    cod: column("cod"),
    password_hash: column("password_hash"),
    password_plaintext: ignore,
    activated: column("activated"),
    base: embed(BaseModel),
});

/// Registration input. Hashing happens before this point.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: Vec<u8>,
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(is_email(email), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(password.len() >= 8, "password", "must be at least 8 bytes long");
    v.check(password.len() <= 72, "password", "must not be more than 72 bytes long");
}

impl User {
    pub fn validate(&self, v: &mut Validator) {
        v.check(!self.name.is_empty(), "name", "must be provided");
        v.check(char_len(&self.name) <= 500, "name", "must not be more than 500 characters long");
        v.check(!self.phone.is_empty(), "phone", "must be provided");
        validate_email(v, &self.email);
        if let Some(password) = &self.password_plaintext {
            validate_password_plaintext(v, password);
        }
        v.check(!self.password_hash.is_empty(), "password", "must be provided");
    }

    pub fn is_active(&self) -> bool {
        self.activated && !self.base.deleted
    }
}
