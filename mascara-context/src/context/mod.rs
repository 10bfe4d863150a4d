// mascara-context/src/context/mod.rs
use daachorse::DoubleArrayAhoCorasick;
extern crate alloc;
use alloc::vec::Vec;
use core::fmt;

/// What a cue keyword announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// Words that usually precede a person's name ("nome", "sr", "paciente").
    Person,
    /// Thoroughfare types that open a street address ("rua", "avenida").
    Address,
}

const PERSON: u32 = 0;
const ADDRESS: u32 = 1;

const PERSON_CUES: &[&str] = &[
    "nome", "sr", "sra", "srta", "senhor", "senhora", "dr", "dra", "doutor", "doutora",
    "cliente", "titular", "paciente", "solicitante", "requerente", "responsável",
    "atenciosamente", "assinado", "contato", "chamo", "servidor", "servidora",
];

const ADDRESS_CUES: &[&str] = &[
    "rua", "avenida", "av", "travessa", "alameda", "praça", "praca", "rodovia",
    "estrada", "largo", "viela", "beco", "quadra",
];

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b >= 0x80
}

/// Scans for cue keywords with word-boundary awareness.
///
/// All lookups expect ASCII-lowercased input so that byte offsets line up with
/// the original text.
pub struct CueScanner {
    automaton: DoubleArrayAhoCorasick<u32>,
}

impl fmt::Debug for CueScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CueScanner")
         .field("automaton", &"<DoubleArrayAhoCorasick>")
         .finish()
    }
}

impl Default for CueScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CueScanner {
    /// Creates a new scanner with the built-in Portuguese cue vocabulary.
    pub fn new() -> Self {
        let patvals: Vec<(&str, u32)> = PERSON_CUES
            .iter()
            .map(|p| (*p, PERSON))
            .chain(ADDRESS_CUES.iter().map(|p| (*p, ADDRESS)))
            .collect();

        let automaton = DoubleArrayAhoCorasick::with_values(patvals)
            .expect("Failed to build Aho-Corasick automaton for cue scanning");

        Self { automaton }
    }

    /// Returns the cue kind when `word` (already lowercased) is exactly a cue keyword.
    pub fn classify_word(&self, word: &[u8]) -> Option<CueKind> {
        self.automaton
            .find_overlapping_iter(word)
            .find(|m| m.start() == 0 && m.end() == word.len())
            .map(|m| if m.value() == ADDRESS { CueKind::Address } else { CueKind::Person })
    }

    /// Scans the window preceding `token_start` for a person cue.
    /// Employs word-boundary checks so "sr" doesn't match inside "israel".
    pub fn scan_preceding_context(&self, text: &[u8], token_start: usize, window_size: usize) -> bool {
        if token_start == 0 { return false; }

        let start = token_start.saturating_sub(window_size);
        let window = &text[start..token_start];

        for matched in self.automaton.find_overlapping_iter(window) {
            if matched.value() != PERSON {
                continue;
            }
            let m_start = matched.start();
            let m_end = matched.end();

            // A keyword clipped by the window edge is not trusted.
            let prefix_ok = if m_start == 0 {
                start == 0 || !is_word_byte(text[start - 1])
            } else {
                !is_word_byte(window[m_start - 1])
            };
            let suffix_ok = m_end == window.len() || !is_word_byte(window[m_end]);

            if prefix_ok && suffix_ok {
                return true;
            }
        }
        false
    }
}
