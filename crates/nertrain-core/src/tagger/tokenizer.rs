//! # Tokenizer for the Perceptron Tagger
//!
//! Splits free text into word and punctuation tokens for sequence labeling.
//! Tokens keep their original casing; normalization happens at feature
//! extraction time.

/// A token extracted from a text with positional information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text content
    pub text: String,
    /// Start byte position in the original string
    pub start: usize,
    /// End byte position in the original string
    pub end: usize,
    /// Token index in the sequence
    pub index: usize,
}

/// Whitespace/punctuation tokenizer.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a new tokenizer instance.
    pub fn new() -> Self {
        Self
    }

    /// Tokenize a text into a sequence of tokens.
    ///
    /// Whitespace separates tokens and is dropped. Every punctuation
    /// character becomes a token of its own.
    ///
    /// # Examples
    /// ```
    /// use nertrain_core::tagger::Tokenizer;
    ///
    /// let tokens = Tokenizer::new().tokenize("Do you like horses?");
    /// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    /// assert_eq!(texts, ["Do", "you", "like", "horses", "?"]);
    /// ```
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current_start: Option<usize> = None;

        for (idx, c) in input.char_indices() {
            if c.is_whitespace() || is_split_punct(c) {
                if let Some(start) = current_start.take() {
                    push_token(&mut tokens, input, start, idx);
                }
                if is_split_punct(c) {
                    push_token(&mut tokens, input, idx, idx + c.len_utf8());
                }
            } else if current_start.is_none() {
                current_start = Some(idx);
            }
        }

        if let Some(start) = current_start {
            push_token(&mut tokens, input, start, input.len());
        }

        tokens
    }

    /// Get the original byte span for a range of tokens.
    pub fn get_spans(
        &self,
        tokens: &[Token],
        start_idx: usize,
        end_idx: usize,
    ) -> Option<(usize, usize)> {
        if start_idx >= tokens.len() || end_idx > tokens.len() || start_idx >= end_idx {
            return None;
        }

        let start = tokens[start_idx].start;
        let end = tokens[end_idx - 1].end;
        Some((start, end))
    }
}

/// Punctuation that always forms its own token. Apostrophes and hyphens stay
/// inside words ("don't", "well-known").
fn is_split_punct(c: char) -> bool {
    (c.is_ascii_punctuation() && c != '\'' && c != '-')
        || matches!(c, '“' | '”' | '‘' | '…')
}

fn push_token(tokens: &mut Vec<Token>, input: &str, start: usize, end: usize) {
    let index = tokens.len();
    tokens.push(Token {
        text: input[start..end].to_string(),
        start,
        end,
        index,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        let tokens = Tokenizer::new().tokenize("Do you like horses and dogs?");

        assert_eq!(
            texts(&tokens),
            ["Do", "you", "like", "horses", "and", "dogs", "?"]
        );
        assert_eq!(tokens[3].start, 12);
        assert_eq!(tokens[3].end, 18);
        assert_eq!(tokens[6].index, 6);
    }

    #[test]
    fn test_tokenize_punctuation() {
        let tokens = Tokenizer::new().tokenize("Hello,world (yes). Don't re-run!");
        assert_eq!(
            texts(&tokens),
            ["Hello", ",", "world", "(", "yes", ")", ".", "Don't", "re-run", "!"]
        );
    }

    #[test]
    fn test_tokenize_multibyte() {
        let text = "Über  café";
        let tokens = Tokenizer::new().tokenize(text);
        assert_eq!(texts(&tokens), ["Über", "café"]);
        assert_eq!(&text[tokens[1].start..tokens[1].end], "café");
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(Tokenizer::new().tokenize("").is_empty());
        assert!(Tokenizer::new().tokenize("  \t\n ").is_empty());
    }

    #[test]
    fn test_get_spans() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("I like big dogs");

        assert_eq!(tokenizer.get_spans(&tokens, 2, 4), Some((7, 15)));
        assert_eq!(tokenizer.get_spans(&tokens, 3, 3), None);
        assert_eq!(tokenizer.get_spans(&tokens, 0, 9), None);
    }
}
