//! Resource ownership checks.

use super::token::SessionClaim;

/// Whether the session's account authored a resource.
///
/// Ids are compared as integers, never as serialized text, so formatting
/// differences can neither grant nor deny access.
#[must_use]
pub const fn is_owner(claim: &SessionClaim, author_id: i32) -> bool {
    claim.sub == author_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(sub: i32) -> SessionClaim {
        SessionClaim {
            sub,
            username: "alice".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_owner_matches_on_id() {
        assert!(is_owner(&claim(3), 3));
        assert!(!is_owner(&claim(3), 4));
        assert!(!is_owner(&claim(-1), 1));
    }
}
