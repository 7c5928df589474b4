//! Token classification and normalization.
//!
//! Raw tokens are rewritten into a flat stream the binder can walk without
//! lookbehind:
//!
//! - `--name=value` and `-n=value` become `--name value` / `-n value`;
//! - short clusters such as `-abc` become `-a -b -c`;
//! - everything else passes through unchanged.
//!
//! Malformed flags (`---x`, `--`) anywhere in the normalized stream reject
//! the whole input before any value is bound.

use crate::error::ParseError;

/// True when the token starts with `-` and is at least two bytes long.
pub fn is_flag(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('-')
}

/// True for `-x` where `x` is any character other than `-`.
pub fn is_short_flag(token: &str) -> bool {
    let mut chars = token.chars();
    is_flag(token)
        && chars.next() == Some('-')
        && chars.next().is_some_and(|c| c != '-')
        && chars.next().is_none()
}

/// True for flag tokens that are neither `-x` nor `--x...`.
///
/// # Examples
///
/// ```
/// use optparse_core::token::is_malformed_flag;
///
/// assert!(is_malformed_flag("---version"));
/// assert!(is_malformed_flag("--"));
/// assert!(is_malformed_flag("-version"));
/// assert!(!is_malformed_flag("--version"));
/// assert!(!is_malformed_flag("-v"));
/// assert!(!is_malformed_flag("value"));
/// ```
pub fn is_malformed_flag(token: &str) -> bool {
    if !is_flag(token) || is_short_flag(token) {
        return false;
    }
    let mut chars = token.chars();
    let well_formed_long = chars.next() == Some('-')
        && chars.next() == Some('-')
        && chars.next().is_some_and(|c| c != '-');
    !well_formed_long
}

/// Expands assignments and short-flag clusters into a flat token list.
///
/// Clusters are not checked against any schema here; an unknown letter
/// surfaces as [`ParseError::UnknownFlag`] during binding.
///
/// # Errors
///
/// Returns [`ParseError::UnknownFlag`] for the first malformed flag in the
/// normalized stream.
///
/// # Examples
///
/// ```
/// use optparse_core::token::normalize;
///
/// let tokens = normalize(["info", "-abc", "--output=./dir", "-V=2.0.0"]).unwrap();
/// assert_eq!(
///     tokens,
///     vec!["info", "-a", "-b", "-c", "--output", "./dir", "-V", "2.0.0"]
/// );
/// ```
pub fn normalize<I, S>(tokens: I) -> Result<Vec<String>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        if !is_flag(token) {
            normalized.push(token.to_string());
        } else if token.contains('=') || token.starts_with("--") {
            match token.split_once('=') {
                Some((name, value)) => {
                    normalized.extend(
                        [name, value]
                            .into_iter()
                            .filter(|part| !part.is_empty())
                            .map(str::to_string),
                    );
                }
                None => normalized.push(token.to_string()),
            }
        } else if is_short_flag(token) {
            normalized.push(token.to_string());
        } else {
            normalized.extend(token.chars().skip(1).map(|c| format!("-{c}")));
        }
    }

    if let Some(bad) = normalized.iter().find(|token| is_malformed_flag(token)) {
        return Err(ParseError::unknown_flag(bad));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_flag() {
        assert!(is_flag("-v"));
        assert!(is_flag("--verbose"));
        assert!(!is_flag("-"));
        assert!(!is_flag("value"));
        assert!(!is_flag(""));
    }

    #[test]
    fn test_is_short_flag() {
        assert!(is_short_flag("-v"));
        assert!(is_short_flag("-é"));
        assert!(!is_short_flag("--"));
        assert!(!is_short_flag("-vv"));
        assert!(!is_short_flag("--v"));
    }

    #[test]
    fn test_cluster_expansion_preserves_order() {
        let tokens = normalize(["-cab", "value"]).unwrap();
        assert_eq!(tokens, vec!["-c", "-a", "-b", "value"]);
    }

    #[test]
    fn test_assignment_splits_on_first_equals() {
        let tokens = normalize(["--define=key=value"]).unwrap();
        assert_eq!(tokens, vec!["--define", "key=value"]);
    }

    #[test]
    fn test_assignment_drops_empty_value() {
        let tokens = normalize(["--output="]).unwrap();
        assert_eq!(tokens, vec!["--output"]);
    }

    #[test]
    fn test_positional_with_equals_is_untouched() {
        let tokens = normalize(["key=value"]).unwrap();
        assert_eq!(tokens, vec!["key=value"]);
    }

    #[test]
    fn test_malformed_flags_are_rejected() {
        for (input, token) in [
            ("---version", "---version"),
            ("---v=1.0.0", "---v"),
            ("--", "--"),
            ("-a-b", "--"),
        ] {
            let err = normalize([input]).unwrap_err();
            assert!(
                matches!(&err, ParseError::UnknownFlag { token: t, .. } if t == token),
                "{input}: {err:?}"
            );
        }
    }

    #[test]
    fn test_single_dash_long_form_becomes_cluster() {
        let tokens = normalize(["-version"]).unwrap();
        assert_eq!(tokens, vec!["-v", "-e", "-r", "-s", "-i", "-o", "-n"]);
    }
}
