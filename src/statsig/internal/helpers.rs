use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SECRET_KEY_PATTERN: Regex = Regex::new(r"secret-[a-zA-Z0-9]+").unwrap();
}

/// Masks server secret keys before a message leaves the process.
pub fn sanitize(message: &str) -> String {
    SECRET_KEY_PATTERN
        .replace_all(message, "secret-****")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::sanitize;

    #[test]
    fn masks_secret_keys() {
        assert_eq!(
            sanitize("bad key secret-abc123XYZ in request"),
            "bad key secret-**** in request"
        );
    }

    #[test]
    fn leaves_other_text_alone() {
        assert_eq!(sanitize("secret- is not a key"), "secret- is not a key");
    }
}
