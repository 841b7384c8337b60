//! Dialect lexicon applied to operator text before synthesis, so the voice
//! reads liturgical terms the way the installation's listeners expect.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex, RegexBuilder};

/// Substitutions applied in order; each rule sees the output of the previous
/// one. Some rules only canonicalize casing. Re-applying the whole table to
/// its own output is a no-op, so already-normalized text passes through
/// unchanged.
const RULES: &[(&str, &str)] = &[
    ("Allah", "Alloh"),
    ("Alloh", "Alloh"),
    ("Rasulullah", "Rasululloh"),
    ("SWT", "Subhanahu wa Ta'ala"),
    ("SAW", "Shallallahu alaihi wa sallam"),
    ("Al-Maidah", "almaidah"),
    ("Al Maidah", "almaidah"),
    ("Almaidah", "almaidah"),
    ("Al-Fatihah", "alfatihah"),
    ("Al-Anfal", "alanfal"),
    ("Al-Quran", "alquran"),
    ("Assalamualaikum", "Assalamu alaikum"),
    ("Wassalamualaikum", "Wassalamu alaikum"),
    ("Warahmatullahi", "Warohmatullohi"),
    ("Wabarakatuh", "Wabarokatuh"),
    ("Sholat", "Sholat"),
    ("Salat", "Sholat"),
    ("Dzuhur", "Zuhur"),
    ("Ashar", "Asar"),
    ("Maghrib", "Magrib"),
    ("Isya", "Isya"),
    ("Subuh", "Subuh"),
];

static COMPILED: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(pattern, replacement)| {
            let re = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(pattern)))
                .case_insensitive(true)
                .build()
                .expect("lexicon pattern");
            (re, *replacement)
        })
        .collect()
});

/// Rewrite operator text to the pronunciation lexicon. Whole words only,
/// case-insensitive. Total; never fails.
pub fn normalize(text: &str) -> String {
    let mut out = text.to_string();
    for (re, replacement) in COMPILED.iter() {
        out = re.replace_all(&out, NoExpand(replacement)).into_owned();
    }
    out
}
