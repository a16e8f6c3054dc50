use lazy_static::lazy_static;
use regex::Regex;

/// Ceiling on the user bio, enforced on register and profile update.
pub const MAX_BIO_LEN: usize = 250;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email("a.writer+blog@mail.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("@example.com "));
        assert!(!is_valid_email(""));
    }
}
