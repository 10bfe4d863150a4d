// mascara-context/src/scanner/mod.rs
//! Zero-copy word tokenizer.
//!
//! Splits text into alphabetic words and ASCII digit runs, keeping byte offsets
//! into the original string so matches can be mapped back without copying.

/// Orthographic shape of a token, used to decide whether it can be part of a
/// proper-noun sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    /// `Paulo`, `Ávila`: uppercase first letter followed by lowercase.
    Capitalized,
    /// `da`, `rua`
    Lower,
    /// `CPF`, `LGPD`
    Upper,
    /// A lone uppercase letter such as `P` in `P. H.`
    Initial,
    /// Mixed case (`iPhone`) or anything else alphabetic.
    Mixed,
    /// ASCII digit run.
    Numeric,
}

/// A single token with its byte span in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub shape: TokenShape,
}

impl<'a> Token<'a> {
    pub fn is_word(&self) -> bool {
        self.shape != TokenShape::Numeric
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Alpha,
    Digit,
    Other,
}

fn classify(c: char) -> Class {
    if c.is_alphabetic() {
        Class::Alpha
    } else if c.is_ascii_digit() {
        Class::Digit
    } else {
        Class::Other
    }
}

fn shape_of(word: &str) -> TokenShape {
    let mut chars = word.chars();
    let Some(first) = chars.next() else { return TokenShape::Mixed; };
    if first.is_ascii_digit() {
        return TokenShape::Numeric;
    }

    let mut rest_lower = 0usize;
    let mut rest_upper = 0usize;
    for c in chars {
        if c.is_lowercase() {
            rest_lower += 1;
        } else if c.is_uppercase() {
            rest_upper += 1;
        }
    }

    match (first.is_uppercase(), rest_lower, rest_upper) {
        (true, 0, 0) => TokenShape::Initial,
        (true, _, 0) => TokenShape::Capitalized,
        (true, 0, _) => TokenShape::Upper,
        (false, _, 0) if first.is_lowercase() => TokenShape::Lower,
        _ => TokenShape::Mixed,
    }
}

/// Iterator over the tokens of a string slice.
pub struct Tokenizer<'a> {
    input: &'a str,
    chars: core::iter::Peekable<core::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // Skip separators.
        let (start, class) = loop {
            let (idx, c) = self.chars.next()?;
            let class = classify(c);
            if class != Class::Other {
                break (idx, class);
            }
        };

        let mut end = self.input.len();
        while let Some(&(idx, c)) = self.chars.peek() {
            if classify(c) != class {
                end = idx;
                break;
            }
            self.chars.next();
        }

        let text = &self.input[start..end];
        Some(Token {
            text,
            start,
            end,
            shape: shape_of(text),
        })
    }
}

/// Returns true when the bytes between two tokens are horizontal whitespace only.
pub fn is_inline_gap(text: &str, from: usize, to: usize) -> bool {
    if from >= to {
        return false;
    }
    text[from..to].chars().all(|c| c.is_whitespace() && c != '\n' && c != '\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_tokenizer_offsets_and_shapes() {
        let text = "Sr. João da Silva, CPF 123";
        let tokens: Vec<Token> = Tokenizer::new(text).collect();
        let words: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(words, ["Sr", "João", "da", "Silva", "CPF", "123"]);

        assert_eq!(tokens[1].shape, TokenShape::Capitalized);
        assert_eq!(&text[tokens[1].start..tokens[1].end], "João");
        assert_eq!(tokens[2].shape, TokenShape::Lower);
        assert_eq!(tokens[4].shape, TokenShape::Upper);
        assert_eq!(tokens[5].shape, TokenShape::Numeric);
    }

    #[test]
    fn test_single_letters_are_initials() {
        let tokens: Vec<Token> = Tokenizer::new("P. H.").collect();
        assert!(tokens.iter().all(|t| t.shape == TokenShape::Initial));
    }

    #[test]
    fn test_inline_gap() {
        let text = "Ana  Souza\nLima";
        assert!(is_inline_gap(text, 3, 5));
        assert!(!is_inline_gap(text, 10, 11));
        assert!(!is_inline_gap(text, 3, 3));
    }
}
