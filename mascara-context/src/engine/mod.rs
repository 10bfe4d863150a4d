//! The contextual recognizer for mascara.
//!
//! Finds person names and street addresses in Portuguese free text. There is no
//! checksum for either, so every match carries a confidence instead of a
//! verdict; callers decide where to cut.
//!
//! Addresses are resolved first (a thoroughfare cue followed by a proper-noun
//! sequence and an optional house number); person names are the remaining
//! capitalized sequences, boosted when a cue keyword precedes them.

extern crate alloc;
use alloc::vec::Vec;
use crate::context::{CueKind, CueScanner};
use crate::scanner::{is_inline_gap, Token, TokenShape, Tokenizer};
use crate::scoring::{calculate_confidence, Evidence, ScoringWeights};

/// The kind of entity recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Address,
}

/// A recognized span in the scanned text.
#[derive(Debug, Clone)]
pub struct EntityMatch {
    pub kind: EntityKind,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

/// Lowercase particles allowed inside a proper-noun sequence.
const CONNECTORS: &[&str] = &["da", "de", "do", "das", "dos", "e", "d"];

/// Capitalized words that open sentences or greetings and never start a name.
const STOPWORDS: &[&str] = &[
    "O", "A", "Os", "As", "Um", "Uma", "Meu", "Minha", "Seu", "Sua", "Nosso", "Nossa",
    "Olá", "Oi", "Bom", "Boa", "Prezado", "Prezada", "Caro", "Cara", "Em", "No", "Na",
    "Para", "Por", "Com", "De", "Do", "Da", "Eu", "Ele", "Ela", "Este", "Esta", "Obrigado",
    "Obrigada", "Favor", "Segue", "Att", "Sim", "Não",
];

/// Capitalized words that open a multi-word place name ("São Paulo", "Rio de Janeiro").
/// The whole run they open is skipped.
const PLACE_PREFIXES: &[&str] = &[
    "São", "Santo", "Santa", "Rio", "Porto", "Belo", "Campo", "Mato", "Minas", "Espírito",
    "Distrito", "Foz", "Ribeirão", "Juiz", "Feira", "Nova", "Novo",
];

/// Single-word places: the country, states and capitals that are not also given names.
const PLACE_NAMES: &[&str] = &[
    "Brasil", "Brasília", "Acre", "Alagoas", "Amapá", "Amazonas", "Bahia", "Ceará", "Goiás",
    "Maranhão", "Pará", "Paraíba", "Paraná", "Pernambuco", "Piauí", "Rondônia", "Roraima",
    "Sergipe", "Tocantins", "Curitiba", "Recife", "Fortaleza", "Manaus", "Belém", "Goiânia",
    "Florianópolis", "Teresina", "Maceió", "Aracaju", "Cuiabá", "Macapá", "Palmas",
    "Campinas", "Niterói", "Guarulhos", "Osasco", "Londrina", "Joinville",
];

const NUMBER_MARKERS: &[&str] = &["n", "nº", "no", "num", "número", "numero"];

/// Longest proper-noun sequence considered a single entity.
const MAX_SEQUENCE: usize = 8;

/// The recognizer itself. Immutable after construction and safe to share.
#[derive(Debug)]
pub struct ContextRecognizer {
    cue_scanner: CueScanner,
    scoring_weights: ScoringWeights,
    cue_window: usize,
}

impl ContextRecognizer {
    /// Initializes a recognizer that looks back `cue_window` bytes for person cues.
    pub fn new(cue_window: usize) -> Self {
        Self {
            cue_scanner: CueScanner::new(),
            scoring_weights: ScoringWeights::default(),
            cue_window,
        }
    }

    /// Scans `text` and returns every candidate entity in text order, unfiltered.
    pub fn scan(&self, text: &str) -> Vec<EntityMatch> {
        let tokens: Vec<Token> = Tokenizer::new(text).collect();
        if tokens.is_empty() {
            return Vec::new();
        }
        let lowered = text.as_bytes().to_ascii_lowercase();
        let mut consumed = alloc::vec![false; tokens.len()];
        let mut matches = Vec::new();

        // Pass 1: addresses
        let mut i = 0;
        while i < tokens.len() {
            let tok = &tokens[i];
            let is_cue = tok.is_word()
                && self.cue_scanner.classify_word(&lowered[tok.start..tok.end]) == Some(CueKind::Address);
            if is_cue {
                if let Some((last, evidence)) = self.extend_address(text, &tokens, i) {
                    matches.push(EntityMatch {
                        kind: EntityKind::Address,
                        start: tok.start,
                        end: tokens[last].end,
                        confidence: calculate_confidence(&evidence, &self.scoring_weights),
                    });
                    consumed[i..=last].iter_mut().for_each(|c| *c = true);
                    i = last + 1;
                    continue;
                }
            }
            i += 1;
        }

        // Pass 2: person names over the remaining tokens
        let mut i = 0;
        while i < tokens.len() {
            if consumed[i] || !self.can_start_name(text, &lowered, &tokens[i]) {
                i += 1;
                continue;
            }
            if PLACE_PREFIXES.contains(&tokens[i].text) {
                i = self.extend_name(text, &lowered, &tokens, &consumed, i) + 1;
                continue;
            }
            let last = self.extend_name(text, &lowered, &tokens, &consumed, i);
            let capitalized = tokens[i..=last]
                .iter()
                .filter(|t| t.shape == TokenShape::Capitalized)
                .count();
            let evidence = Evidence {
                capitalized_tokens: capitalized,
                has_cue: self.cue_scanner.scan_preceding_context(&lowered, tokens[i].start, self.cue_window),
                has_number: false,
            };
            matches.push(EntityMatch {
                kind: EntityKind::Person,
                start: tokens[i].start,
                end: tokens[last].end,
                confidence: calculate_confidence(&evidence, &self.scoring_weights),
            });
            i = last + 1;
        }

        matches.sort_by_key(|m| m.start);
        matches
    }

    /// Extends an address starting at the cue token `cue_idx`.
    /// Returns the index of the last token and the gathered evidence.
    fn extend_address(&self, text: &str, tokens: &[Token], cue_idx: usize) -> Option<(usize, Evidence)> {
        let mut last = cue_idx;
        let mut capitalized = 0usize;
        let mut j = cue_idx + 1;

        while j < tokens.len() && j - cue_idx <= MAX_SEQUENCE {
            let gap_ok = if j == cue_idx + 1 {
                // "Av. Paulista" allows an abbreviation period after the cue
                let gap = &text[tokens[last].end..tokens[j].start];
                let gap = gap.strip_prefix('.').unwrap_or(gap);
                !gap.is_empty() && gap.chars().all(|c| c.is_whitespace() && c != '\n')
            } else {
                is_inline_gap(text, tokens[last].end, tokens[j].start)
            };
            if !gap_ok {
                break;
            }

            let tok = &tokens[j];
            match tok.shape {
                TokenShape::Capitalized if !is_embedded(text, tok) => {
                    capitalized += 1;
                    last = j;
                }
                // "Rua 25 de Março": a number only continues the street name when a word follows.
                TokenShape::Numeric if next_is_name_part(text, tokens, j) => {
                    last = j;
                }
                TokenShape::Lower if is_connector(tok.text) && next_is_name_part(text, tokens, j) => {
                    last = j;
                }
                _ => break,
            }
            j += 1;
        }

        if capitalized == 0 {
            return None;
        }

        let mut evidence = Evidence {
            capitalized_tokens: capitalized,
            has_cue: true,
            has_number: false,
        };

        if let Some(number_idx) = house_number_after(text, tokens, last) {
            evidence.has_number = true;
            last = number_idx;
        }

        Some((last, evidence))
    }

    fn can_start_name(&self, text: &str, lowered: &[u8], tok: &Token) -> bool {
        tok.shape == TokenShape::Capitalized
            && !is_embedded(text, tok)
            && !STOPWORDS.contains(&tok.text)
            && !PLACE_NAMES.contains(&tok.text)
            && self.cue_scanner.classify_word(&lowered[tok.start..tok.end]).is_none()
    }

    fn extend_name(&self, text: &str, lowered: &[u8], tokens: &[Token], consumed: &[bool], first: usize) -> usize {
        let mut last = first;
        let mut j = first + 1;
        while j < tokens.len() && j - first < MAX_SEQUENCE {
            if consumed[j] || !is_inline_gap(text, tokens[j - 1].end, tokens[j].start) {
                break;
            }
            let tok = &tokens[j];
            let continues = match tok.shape {
                TokenShape::Capitalized => {
                    !is_embedded(text, tok)
                        && !STOPWORDS.contains(&tok.text)
                        && !PLACE_NAMES.contains(&tok.text)
                        && self.cue_scanner.classify_word(&lowered[tok.start..tok.end]).is_none()
                }
                TokenShape::Lower => {
                    is_connector(tok.text)
                        && j + 1 < tokens.len()
                        && !consumed[j + 1]
                        && tokens[j + 1].shape == TokenShape::Capitalized
                        && is_inline_gap(text, tok.end, tokens[j + 1].start)
                }
                _ => false,
            };
            if !continues {
                break;
            }
            if tok.shape == TokenShape::Capitalized {
                last = j;
            }
            j += 1;
        }
        last
    }
}

fn is_connector(word: &str) -> bool {
    CONNECTORS.contains(&word)
}

fn next_is_name_part(text: &str, tokens: &[Token], idx: usize) -> bool {
    tokens.get(idx + 1).map_or(false, |next| {
        is_inline_gap(text, tokens[idx].end, next.start)
            && (next.shape == TokenShape::Capitalized || (next.shape == TokenShape::Lower && is_connector(next.text)))
    })
}

/// A word glued to `@`, `_`, `/`, digits or a dotted continuation is part of an
/// e-mail, handle or URL rather than running text.
fn is_embedded(text: &str, tok: &Token) -> bool {
    let before = text[..tok.start].chars().next_back();
    let mut after = text[tok.end..].chars();
    let next = after.next();
    let next2 = after.next();

    let glued_before = matches!(before, Some('@' | '_' | '/' | '\\' | '-' | '.')) || before.map_or(false, |c| c.is_ascii_digit());
    let glued_after = matches!(next, Some('@' | '_' | '/' | '\\')) || next.map_or(false, |c| c.is_ascii_digit())
        || (next == Some('.') && next2.map_or(false, |c| c.is_alphanumeric()));

    glued_before || glued_after
}

/// Looks for `, 123`, `nº 123` or `, n. 123` right after the street name.
fn house_number_after(text: &str, tokens: &[Token], last: usize) -> Option<usize> {
    let mut k = last + 1;
    let mut prev_end = tokens[last].end;
    let mut saw_marker = false;

    while k < tokens.len() {
        let gap = &text[prev_end..tokens[k].start];
        if gap.contains('\n') || gap.chars().any(|c| !(c.is_whitespace() || matches!(c, ',' | '.' | '°' | ':'))) {
            return None;
        }
        let tok = &tokens[k];
        if tok.shape == TokenShape::Numeric {
            return Some(k);
        }
        if saw_marker || !NUMBER_MARKERS.iter().any(|m| tok.text.eq_ignore_ascii_case(m)) {
            return None;
        }
        saw_marker = true;
        prev_end = tok.end;
        k += 1;
    }
    None
}
