use serde::{Deserialize, Serialize};

/// Registered DJ record, looked up when a credential is verified
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DjModel {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub approved: bool,
}

/// Display identity of an authenticated user, captured once at connect time
///
/// Events carry a snapshot of this identity rather than a live lookup, so a
/// profile change mid-broadcast never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl From<&DjModel> for UserIdentity {
    fn from(dj: &DjModel) -> Self {
        Self {
            id: dj.id.clone(),
            name: dj.name.clone(),
            avatar: dj.avatar.clone(),
        }
    }
}

/// JWT claims structure carried by connection credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    pub sub: String, // DJ id
    pub exp: usize,  // Expiration timestamp (standard JWT claim)
    pub iat: usize,  // Issued at timestamp (standard JWT claim)
}
