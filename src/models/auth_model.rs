use serde::Deserialize;

/// Registration form; field names follow the sign-up page.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "usr")]
    pub username: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "rep_password")]
    pub confirm: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}
