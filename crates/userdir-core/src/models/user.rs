use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Prefix used when a placeholder id goes over the wire or into a URL.
const PLACEHOLDER_PREFIX: &str = "tmp-";

/// Identifier of a user record.
///
/// Records that came from the directory carry the id the server assigned.
/// Records inserted optimistically carry a client-generated placeholder until
/// the list is fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserId {
    Assigned(i64),
    Placeholder(u64),
}

impl UserId {
    /// Draw a random placeholder that does not collide with any id in `taken`.
    pub fn placeholder_excluding(taken: &[User]) -> Self {
        loop {
            let candidate = UserId::Placeholder(rand::random());
            if !taken.iter().any(|u| u.id == candidate) {
                return candidate;
            }
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, UserId::Placeholder(_))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Assigned(id) => write!(f, "{}", id),
            UserId::Placeholder(raw) => write!(f, "{}{:x}", PLACEHOLDER_PREFIX, raw),
        }
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UserId::Assigned(id) => serializer.serialize_i64(*id),
            UserId::Placeholder(_) => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(UserId::Assigned(id)),
            Raw::Text(text) => {
                if let Some(hex) = text.strip_prefix(PLACEHOLDER_PREFIX) {
                    u64::from_str_radix(hex, 16)
                        .map(UserId::Placeholder)
                        .map_err(|_| de::Error::custom(format!("invalid placeholder id: {}", text)))
                } else {
                    text.parse()
                        .map(UserId::Assigned)
                        .map_err(|_| de::Error::custom(format!("invalid user id: {}", text)))
                }
            }
        }
    }
}

/// A user record as held in the directory.
///
/// The remote service returns richer objects (username, phone, address...);
/// only the fields shown here are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
        }
    }

    /// Display line used in lists: `Name (email)`.
    pub fn display_line(&self) -> String {
        if self.email.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.email)
        }
    }
}

/// Fields supplied by the operator when creating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directory_user_ignores_extra_fields() {
        let json = r#"{"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "Sincere@april.biz",
            "address": {"street": "Kulas Light", "city": "Gwenborough"}, "phone": "1-770-736-8031 x56442"}"#;

        let user: User = serde_json::from_str(json).expect("Failed to parse user test JSON");
        assert_eq!(user.id, UserId::Assigned(1));
        assert_eq!(user.name, "Leanne Graham");
        assert_eq!(user.email, "Sincere@april.biz");
    }

    #[test]
    fn test_parse_user_missing_fields() {
        let user: User = serde_json::from_str(r#"{"id": 11}"#).expect("Failed to parse");
        assert_eq!(user.id, UserId::Assigned(11));
        assert!(user.name.is_empty());
        assert!(user.email.is_empty());
    }

    #[test]
    fn test_user_id_accepts_numeric_string() {
        let id: UserId = serde_json::from_str(r#""42""#).expect("Failed to parse");
        assert_eq!(id, UserId::Assigned(42));
    }

    #[test]
    fn test_placeholder_id_wire_format() {
        let id = UserId::Placeholder(0xbeef);
        assert_eq!(id.to_string(), "tmp-beef");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""tmp-beef""#);

        let parsed: UserId = serde_json::from_str(r#""tmp-beef""#).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        assert!(serde_json::from_str::<UserId>(r#""abc""#).is_err());
        assert!(serde_json::from_str::<UserId>(r#""tmp-zz""#).is_err());
    }

    #[test]
    fn test_draft_serializes_only_name_and_email() {
        let draft = UserDraft::new("B", "b@x.com");
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, serde_json::json!({"name": "B", "email": "b@x.com"}));
    }

    #[test]
    fn test_placeholder_excluding_is_fresh() {
        let users = vec![
            User { id: UserId::Assigned(1), name: "A".into(), email: "a@x.com".into() },
        ];
        let id = UserId::placeholder_excluding(&users);
        assert!(id.is_placeholder());
        assert!(!users.iter().any(|u| u.id == id));
    }

    #[test]
    fn test_display_line() {
        let user = User { id: UserId::Assigned(1), name: "A".into(), email: "a@x.com".into() };
        assert_eq!(user.display_line(), "A (a@x.com)");

        let no_email = User { email: String::new(), ..user };
        assert_eq!(no_email.display_line(), "A");
    }
}
