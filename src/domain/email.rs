use serde::{Deserialize, Serialize};

pub type EmailId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub email: String,
    pub name: String,
}

impl Sender {
    /// Uppercased first letter of the display name, used as the avatar.
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .find(|c| !c.is_whitespace())
            .or_else(|| self.email.chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('?')
    }
}

/// Listing metadata of one email plus the two flags that only exist locally.
///
/// Serialized with the field names of the remote payload (`from`,
/// `short_description`) so the persisted array reads like the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: EmailId,
    #[serde(rename = "from")]
    pub sender: Sender,
    /// Epoch milliseconds.
    pub date: i64,
    pub subject: String,
    pub short_description: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailBody {
    pub id: EmailId,
    /// Raw HTML as served by the source. Never rendered as markup.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_uses_first_letter_of_name() {
        let s = Sender {
            email: "bob@example.com".into(),
            name: "  alice".into(),
        };
        assert_eq!(s.initial(), 'A');
    }

    #[test]
    fn initial_falls_back_to_email() {
        let s = Sender {
            email: "zed@example.com".into(),
            name: String::new(),
        };
        assert_eq!(s.initial(), 'Z');
    }

    #[test]
    fn missing_flags_default_to_false() {
        let json = r#"{"id":"7","from":{"email":"a@b.c","name":"A"},"date":1,"subject":"s","short_description":"d"}"#;
        let e: EmailSummary = serde_json::from_str(json).unwrap();
        assert!(!e.read);
        assert!(!e.favorite);
    }
}
