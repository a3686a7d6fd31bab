use serde::{Deserialize, Serialize};

/// The signed-in user of the demo auth gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}
