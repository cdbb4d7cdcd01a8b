//! Validated signup input

/// A signup payload that passed validation
///
/// Holds the password in plaintext; it is consumed by registration and
/// dropped as soon as the hash has been computed.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub age: u8,
    pub password: String,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("email", &self.email)
            .field("age", &self.age)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
