//! Field parsing for OCR text from a Ugandan national ID card.
//!
//! Each field has an ordered list of patterns. The first pattern that yields a
//! plausible value wins.

use crate::OcrError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Words printed on every card. An ID candidate containing one of them is
/// boilerplate picked up by a loose pattern, not an ID number.
const DEFAULT_BOILERPLATE: [&str; 5] = ["NATIONAL", "CARD", "REPUBLIC", "UGANDA", "IDCARD"];

const DEFAULT_ID_PATTERNS: [&str; 3] = [
    r"(CF|CM|CS)\d{2}[A-Z0-9]{8,12}",
    r"[A-Z]{2}\d{2}[A-Z0-9]{8,12}",
    r"\b[A-Z]{2}[0-9A-Z]{12,16}\b",
];

const NAME_PATTERNS: [&str; 3] = [
    r"NAMES?\s*:\s*([A-Z\s]+)",
    r"NAMES\s+([A-Z\s]+)",
    r"([A-Z]+\s+[A-Z]+)",
];

const DOB_PATTERNS: [&str; 3] = [
    r"(\d{1,2}[/-]\d{1,2}[/-]\d{4})",
    r"(\d{4}[/-]\d{1,2}[/-]\d{1,2})",
    r"DOB\s*:\s*(\d{1,2}[/-]\d{1,2}[/-]\d{4})",
];

/// OCR engine and parsing settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path to the tesseract binary; empty disables OCR.
    pub tesseract: PathBuf,
    pub page_segmentation: u8,
    pub whitelist: String,
    pub language: Option<String>,
    /// ID number patterns, tried in order.
    pub id_patterns: Vec<String>,
    pub boilerplate: Vec<String>,
    pub min_id_len: usize,
    /// Kill the OCR engine after this many milliseconds.
    pub timeout_ms: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract: PathBuf::from("tesseract"),
            page_segmentation: 6,
            whitelist: "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/-: ".to_string(),
            language: None,
            id_patterns: DEFAULT_ID_PATTERNS.iter().map(|p| p.to_string()).collect(),
            boilerplate: DEFAULT_BOILERPLATE.iter().map(|w| w.to_string()).collect(),
            min_id_len: 10,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFields {
    pub id_number: Option<String>,
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub sex: Option<Sex>,
}

impl ParsedFields {
    /// Additive per field found (0.4 / 0.3 / 0.2 / 0.1), capped at 1.0.
    /// Empty OCR text always scores zero.
    pub fn confidence(&self, raw_text: &str) -> f64 {
        if raw_text.trim().is_empty() {
            return 0.0;
        }
        let mut confidence = 0.0;
        if self.id_number.is_some() {
            confidence += 0.4;
        }
        if self.name.is_some() {
            confidence += 0.3;
        }
        if self.date_of_birth.is_some() {
            confidence += 0.2;
        }
        if self.sex.is_some() {
            confidence += 0.1;
        }
        f64::min(confidence, 1.0)
    }
}

pub struct IdDocumentParser {
    id_patterns: Vec<Regex>,
    name_patterns: Vec<Regex>,
    dob_patterns: Vec<Regex>,
    male: Regex,
    female: Regex,
    boilerplate: Vec<String>,
    min_id_len: usize,
}

impl IdDocumentParser {
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let compile = |patterns: &[&str]| -> Result<Vec<Regex>, regex::Error> {
            patterns.iter().map(|p| Regex::new(p)).collect()
        };
        Ok(Self {
            id_patterns: config
                .id_patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<_, _>>()?,
            name_patterns: compile(&NAME_PATTERNS)?,
            dob_patterns: compile(&DOB_PATTERNS)?,
            male: Regex::new(r"\bMALE\b")?,
            female: Regex::new(r"\bFEMALE\b")?,
            boilerplate: config.boilerplate.iter().map(|w| w.to_uppercase()).collect(),
            min_id_len: config.min_id_len,
        })
    }

    pub fn parse(&self, raw_text: &str) -> ParsedFields {
        let text = raw_text.to_uppercase();
        let text = text.trim();
        let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");

        ParsedFields {
            id_number: self.id_number(&[text, single_line.as_str()]),
            name: self.name(text),
            date_of_birth: self
                .dob_patterns
                .iter()
                .find_map(|re| re.captures(text).map(|c| c[1].to_string())),
            sex: if self.male.is_match(text) {
                Some(Sex::Male)
            } else if self.female.is_match(text) {
                Some(Sex::Female)
            } else {
                None
            },
        }
    }

    /// Multiline text first, then the whitespace-collapsed form; within each,
    /// patterns in order and matches left to right.
    fn id_number(&self, versions: &[&str]) -> Option<String> {
        versions.iter().find_map(|text| {
            self.id_patterns.iter().find_map(|re| {
                re.find_iter(text)
                    .map(|m| m.as_str())
                    .find(|candidate| self.plausible_id(candidate))
                    .map(str::to_string)
            })
        })
    }

    fn plausible_id(&self, candidate: &str) -> bool {
        candidate.len() >= self.min_id_len
            && !self.boilerplate.iter().any(|word| candidate.contains(word.as_str()))
    }

    fn name(&self, text: &str) -> Option<String> {
        self.name_patterns.iter().find_map(|re| {
            let name = re.captures(text)?.get(1)?.as_str().trim();
            (name.len() > 3 && name.len() < 50).then(|| name.to_string())
        })
    }
}
