//! Matching scraped athlete names to canonical athlete rows.
//!
//! Names on the external sites drift from the stored spelling (accents,
//! apostrophes, nicknames, multi-word given names). Resolution runs an ordered
//! chain of [`ResolveStrategy`]s over a snapshot of the athlete table; the first
//! strategy that returns an id wins and later ones are not consulted.
//!
//! Ambiguity is not detected: when several rows satisfy a strategy, the first
//! row in table order is returned.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Athlete, AthleteId};

/// A display name split into given and family parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// Split a `"First Last"` display name at its last whitespace run, so
    /// multi-word given names stay in `first`.
    pub fn parse(display: &str) -> Self {
        let display = display.split_whitespace().collect::<Vec<_>>().join(" ");
        match display.rsplit_once(' ') {
            Some((first, last)) => Self::new(first, last),
            None => Self::new(display, ""),
        }
    }

    pub fn full(&self) -> String {
        if self.last.is_empty() {
            self.first.clone()
        } else {
            format!("{} {}", self.first, self.last)
        }
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

/// Lowercase, strip accents and apostrophes, and collapse whitespace.
///
/// Folding covers Latin letters with diacritics, the common ligatures and
/// combining marks. Other scripts pass through lowercased.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '`' | '\u{00b4}'))
        .flat_map(char::to_lowercase)
    {
        match fold_diacritic(c) {
            Folded::Char(c) => folded.push(c),
            Folded::Str(s) => folded.push_str(s),
            Folded::Drop => {}
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

enum Folded {
    Char(char),
    Str(&'static str),
    Drop,
}

fn fold_diacritic(c: char) -> Folded {
    let base = match c {
        '\u{0300}'..='\u{036f}' => return Folded::Drop,
        'ß' => return Folded::Str("ss"),
        'æ' => return Folded::Str("ae"),
        'œ' => return Folded::Str("oe"),
        'þ' => return Folded::Str("th"),
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => 'c',
        'ď' | 'đ' | 'ð' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => 's',
        'ţ' | 'ť' | 'ŧ' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    };
    Folded::Char(base)
}

/// One way of turning a scraped name into an athlete id.
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(&self, name: &PersonName, athletes: &[Athlete]) -> Option<AthleteId>;
}

fn first_where(athletes: &[Athlete], pred: impl Fn(&Athlete) -> bool) -> Option<AthleteId> {
    athletes.iter().find(|a| pred(*a)).map(|a| a.id.clone())
}

fn same_ignoring_case(stored: &str, scraped: &str) -> bool {
    stored.to_lowercase() == scraped.to_lowercase() || normalize(stored) == normalize(scraped)
}

/// Names that never line up with the stored spelling.
static EXCEPTIONS: OnceLock<HashMap<&'static str, (&'static str, &'static str)>> = OnceLock::new();

fn exceptions() -> &'static HashMap<&'static str, (&'static str, &'static str)> {
    EXCEPTIONS.get_or_init(|| {
        HashMap::from([
            ("john florence", ("John", "John Florence")),
            ("john john florence", ("John", "John Florence")),
            ("leo fioravanti", ("Leonardo", "Fioravanti")),
            ("liam obrien", ("Liam", "O'Brien")),
            ("connor oleary", ("Connor", "O'Leary")),
        ])
    })
}

/// Fixed table of known problem names, keyed by normalized full name and
/// then by normalized given name alone.
pub struct ExceptionTable;

impl ResolveStrategy for ExceptionTable {
    fn name(&self) -> &'static str {
        "exception-table"
    }

    fn resolve(&self, name: &PersonName, athletes: &[Athlete]) -> Option<AthleteId> {
        let table = exceptions();
        [normalize(&name.full()), normalize(&name.first)]
            .iter()
            .filter_map(|key| table.get(key.as_str()))
            .find_map(|(first, last)| {
                first_where(athletes, |a| a.first_name == *first && a.last_name == *last)
            })
    }
}

/// Case-sensitive equality on both name parts.
pub struct ExactMatch;

impl ResolveStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn resolve(&self, name: &PersonName, athletes: &[Athlete]) -> Option<AthleteId> {
        first_where(athletes, |a| a.first_name == name.first && a.last_name == name.last)
    }
}

/// Case-insensitive equality on both name parts; accent and apostrophe
/// variants also compare equal.
pub struct CaseInsensitiveMatch;

impl ResolveStrategy for CaseInsensitiveMatch {
    fn name(&self) -> &'static str {
        "case-insensitive"
    }

    fn resolve(&self, name: &PersonName, athletes: &[Athlete]) -> Option<AthleteId> {
        first_where(athletes, |a| {
            same_ignoring_case(&a.first_name, &name.first)
                && same_ignoring_case(&a.last_name, &name.last)
        })
    }
}

/// For multi-word given names, move everything after the first word into the
/// family name and retry case-insensitively.
pub struct CompoundGivenName;

impl ResolveStrategy for CompoundGivenName {
    fn name(&self) -> &'static str {
        "compound-given-name"
    }

    fn resolve(&self, name: &PersonName, athletes: &[Athlete]) -> Option<AthleteId> {
        let (first, rest) = name.first.split_once(char::is_whitespace)?;
        let last = if name.last.is_empty() {
            rest.trim().to_string()
        } else {
            format!("{} {}", rest.trim(), name.last)
        };
        first_where(athletes, |a| {
            same_ignoring_case(&a.first_name, first) && same_ignoring_case(&a.last_name, &last)
        })
    }
}

/// Outcome of resolving one scraped name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        athlete_id: AthleteId,
        strategy: &'static str,
    },
    Unresolved,
}

impl Resolution {
    pub fn into_athlete_id(self) -> Option<AthleteId> {
        match self {
            Resolution::Resolved { athlete_id, .. } => Some(athlete_id),
            Resolution::Unresolved => None,
        }
    }
}

/// The default resolution chain, in the order it must run.
pub fn default_strategies() -> Vec<Box<dyn ResolveStrategy>> {
    vec![
        Box::new(ExceptionTable),
        Box::new(ExactMatch),
        Box::new(CaseInsensitiveMatch),
        Box::new(CompoundGivenName),
    ]
}

/// Resolves scraped names against a snapshot of the athlete table.
pub struct Reconciler {
    athletes: Vec<Athlete>,
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Reconciler {
    /// `athletes` must be in table order; it decides which row wins a tie.
    pub fn new(athletes: Vec<Athlete>) -> Self {
        Self::with_strategies(athletes, default_strategies())
    }

    pub fn with_strategies(athletes: Vec<Athlete>, strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self {
            athletes,
            strategies,
        }
    }

    /// Append a strategy to the end of the chain.
    pub fn push_strategy(&mut self, strategy: Box<dyn ResolveStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn resolve(&self, name: &PersonName) -> Resolution {
        for strategy in &self.strategies {
            if let Some(athlete_id) = strategy.resolve(name, &self.athletes) {
                debug!(%name, strategy = strategy.name(), %athlete_id, "resolved athlete");
                return Resolution::Resolved {
                    athlete_id,
                    strategy: strategy.name(),
                };
            }
        }
        warn!(%name, "no athlete found");
        Resolution::Unresolved
    }

    /// Resolve a `"First Last"` display name.
    pub fn resolve_display(&self, display: &str) -> Resolution {
        self.resolve(&PersonName::parse(display))
    }
}
