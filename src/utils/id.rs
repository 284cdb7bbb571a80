//! URL-safe endpoint identifier generation.
//!
//! The id derived from an endpoint's name and URL is used as the storage key
//! and in every admin API call, so the mapping must stay stable: ASCII
//! alphanumerics are kept, the separator characters ` -_/:.` become dashes,
//! runs of dashes collapse, and trailing dashes are stripped. Any other
//! character is dropped.

/// Derives a stable, URL-safe id from an endpoint name and URL.
pub fn generate_id(name: &str, url: &str) -> String {
    let combined = format!("{name}-{url}");
    let mut id = String::with_capacity(combined.len());
    let mut prev_dash = false;

    for c in combined.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
            prev_dash = false;
        } else if matches!(c, ' ' | '-' | '_' | '/' | ':' | '.') {
            if !prev_dash {
                id.push('-');
            }
            prev_dash = true;
        }
    }

    while id.ends_with('-') {
        id.pop();
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_url_sanitized() {
        assert_eq!(
            generate_id("My Api", "https://api.example.com/v1/"),
            "My-Api-https-api-example-com-v1"
        );
    }

    #[test]
    fn separator_runs_collapse() {
        assert_eq!(generate_id("a  b", "http://x"), "a-b-http-x");
        assert_eq!(generate_id("a-_/:.b", "c"), "a-b-c");
    }

    #[test]
    fn non_ascii_dropped() {
        assert_eq!(generate_id("café", "http://ü.example"), "caf-http-example");
    }

    #[test]
    fn idempotent_over_its_own_output() {
        let first = generate_id("My Api", "https://api.example.com/v1/");
        assert_eq!(generate_id(&first, ""), first);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(generate_id("", ""), "");
    }
}
