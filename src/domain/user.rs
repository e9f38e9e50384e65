use serde::Deserialize;

const DEFAULT_REAL_NAME: &str = "noname";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub real_name: String,
    pub email: Option<String>,
    pub status_text: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            real_name: DEFAULT_REAL_NAME.to_owned(),
            email: None,
            status_text: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub profile: Profile,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn real_name(&self) -> &str {
        &self.profile.real_name
    }
}
