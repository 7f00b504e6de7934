//! Affinity token derivation.
//!
//! A token is the 128-bit FNV-1a hash of the backend URL, rendered as 32 hex
//! digits. It depends only on the URL text, so it survives restarts, and it
//! cannot be turned back into an address without scanning the pool.

use url::Url;

const FNV_OFFSET_BASIS: u128 = 0x6c62272e07bb014262b821756295c58d;
const FNV_PRIME: u128 = 0x0000000001000000000000000000013b;

/// Length of a rendered token.
pub const TOKEN_LEN: usize = 32;

/// Derive the affinity token of a backend URL.
pub fn affinity_token(url: &Url) -> String {
    let hash = url.as_str().bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u128::from(byte)).wrapping_mul(FNV_PRIME)
    });
    format!("{:032x}", hash)
}

/// Cheap shape check before scanning the pool for a cookie value.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_token_is_stable() {
        let a = affinity_token(&url("http://10.0.0.1:8080"));
        let b = affinity_token(&url("http://10.0.0.1:8080"));
        assert_eq!(a, b);
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(is_well_formed(&a));
    }

    #[test]
    fn test_token_differs_per_address() {
        let a = affinity_token(&url("http://10.0.0.1:8080"));
        let b = affinity_token(&url("http://10.0.0.1:8081"));
        let c = affinity_token(&url("https://10.0.0.1:8080"));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_well_formed() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("zz62272e07bb014262b821756295c58d"));
        assert!(!is_well_formed("6c62272e07bb0142"));
    }
}
