use serde::{Deserialize, Serialize};

/// One parsed chat message.
///
/// Equality, ordering and hashing cover all three fields, so two records with
/// the same time, user and text collapse into one entry inside a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Record {
    pub time: i64,
    pub user: String,
    pub text: String,
}

impl Record {
    pub fn new(time: i64, user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            time,
            user: user.into(),
            text: text.into(),
        }
    }
}
