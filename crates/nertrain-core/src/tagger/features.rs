//! Sparse string features for the perceptron tagger.

use crate::tagger::tokenizer::Token;

/// Extract the features of every token in a sentence.
pub fn sentence_features(tokens: &[Token]) -> Vec<Vec<String>> {
    (0..tokens.len())
        .map(|i| {
            let prev = i.checked_sub(1).map(|p| tokens[p].text.as_str());
            let next = tokens.get(i + 1).map(|t| t.text.as_str());
            token_features(&tokens[i].text, prev, next)
        })
        .collect()
}

/// Features of one token given its neighbours.
pub fn token_features(
    token: &str,
    prev_token: Option<&str>,
    next_token: Option<&str>,
) -> Vec<String> {
    let lower = token.to_lowercase();
    let mut features = Vec::with_capacity(16);

    features.push("bias".to_string());
    features.push(format!("w={lower}"));
    features.push(format!("pre3={}", prefix(&lower, 3)));
    features.push(format!("suf3={}", suffix(&lower, 3)));
    features.push(format!("suf2={}", suffix(&lower, 2)));
    features.push(format!("shape={}", shape(token)));

    if is_title(token) {
        features.push("is_title".to_string());
    }
    if token.chars().any(char::is_alphabetic)
        && token.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
    {
        features.push("is_upper".to_string());
    }
    if token.chars().any(|c| c.is_ascii_digit()) {
        features.push("has_digit".to_string());
    }
    if token.chars().all(|c| c.is_ascii_punctuation()) {
        features.push("is_punct".to_string());
    }
    if token.chars().count() > 3 {
        features.push("long_token".to_string());
    }

    // Context features
    match prev_token {
        Some(p) => {
            features.push(format!("w-1={}", p.to_lowercase()));
            if is_title(p) {
                features.push("prev_title".to_string());
            }
        }
        None => features.push("bos".to_string()),
    }
    match next_token {
        Some(n) => {
            features.push(format!("w+1={}", n.to_lowercase()));
            if is_title(n) {
                features.push("next_title".to_string());
            }
        }
        None => features.push("eos".to_string()),
    }

    features
}

fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn suffix(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    match s.char_indices().nth(count - n) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

fn is_title(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(char::is_uppercase)
        && chars.all(|c| !c.is_alphabetic() || c.is_lowercase())
}

/// Collapsed word shape: `Horses` -> `Xx`, `R2-D2` -> `Xd-Xd`.
fn shape(token: &str) -> String {
    let mut out = String::new();
    for c in token.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_alphabetic() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };
        if !out.ends_with(class) {
            out.push(class);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() {
        assert_eq!(shape("Horses"), "Xx");
        assert_eq!(shape("R2-D2"), "Xd-Xd");
        assert_eq!(shape("?"), "?");
    }

    #[test]
    fn test_affixes() {
        assert_eq!(prefix("horses", 3), "hor");
        assert_eq!(suffix("horses", 3), "ses");
        assert_eq!(suffix("ox", 3), "ox");
        assert_eq!(suffix("café", 2), "fé");
    }

    #[test]
    fn test_token_features() {
        let features = token_features("Paris", Some("in"), None);
        assert!(features.contains(&"w=paris".to_string()));
        assert!(features.contains(&"is_title".to_string()));
        assert!(features.contains(&"w-1=in".to_string()));
        assert!(features.contains(&"eos".to_string()));
        assert!(!features.contains(&"bos".to_string()));
    }

    #[test]
    fn test_sentence_features_context() {
        let tokens = crate::tagger::Tokenizer::new().tokenize("I like dogs");
        let features = sentence_features(&tokens);
        assert_eq!(features.len(), 3);
        assert!(features[0].contains(&"bos".to_string()));
        assert!(features[1].contains(&"w+1=dogs".to_string()));
    }
}
