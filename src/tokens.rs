//! Whitespace/quote tokenizer. The rest of the shell only sees the
//! position-indexed `Tokens` it produces.

use std::ops::Range;

/// One input line split into owned words, in order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tokens {
    words: Vec<String>,
}

impl Tokens {
    pub fn get(&self, i: usize) -> Option<&str> {
        self.words.get(i).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True if some token equals `word` exactly (operator detection).
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn slice(&self, range: Range<usize>) -> &[String] {
        &self.words[range]
    }
}

struct Scanner<'a> {
    line: &'a [u8],
    i: usize,
}

impl<'a> Scanner<'a> {
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.line.get(self.i) {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.i += 1;
        }
    }

    /// Reads one word. A quoted span becomes part of the word with the
    /// quotes stripped; an unterminated quote runs to end of line.
    fn read_word(&mut self) -> String {
        let mut word = Vec::new();
        while let Some(&c) = self.line.get(self.i) {
            match c {
                b'"' | b'\'' => {
                    self.i += 1;
                    while let Some(&q) = self.line.get(self.i) {
                        self.i += 1;
                        if q == c {
                            break;
                        }
                        word.push(q);
                    }
                }
                _ if c.is_ascii_whitespace() => break,
                _ => {
                    word.push(c);
                    self.i += 1;
                }
            }
        }
        String::from_utf8_lossy(&word).into_owned()
    }
}

pub fn tokenize(line: &str) -> Tokens {
    let mut scanner = Scanner { line: line.as_bytes(), i: 0 };
    let mut words = Vec::new();
    loop {
        scanner.skip_whitespace();
        if scanner.i >= scanner.line.len() {
            break;
        }
        words.push(scanner.read_word());
    }
    Tokens { words }
}
