//! Rewrites shorthand phrases into the canonical `Every <n> <interval>, ...`
//! grammar and resolves weekday / month names to numbers.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Weekday names and abbreviations, Monday = 1.
const WEEKDAYS: &[(&str, u32)] = &[
    ("monday", 1),
    ("tuesday", 2),
    ("wednesday", 3),
    ("thursday", 4),
    ("friday", 5),
    ("saturday", 6),
    ("sunday", 7),
    ("mon", 1),
    ("tue", 2),
    ("tues", 2),
    ("wed", 3),
    ("weds", 3),
    ("thu", 4),
    ("thur", 4),
    ("thurs", 4),
    ("fri", 5),
    ("sat", 6),
    ("sun", 7),
];

/// Month names and abbreviations, January = 1. Not consumed by the phrase
/// grammar yet.
const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("sept", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

fn lookup(table: &[(&str, u32)], token: &str) -> Option<u32> {
    let token = token.trim().to_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, n)| *n)
}

pub fn weekday_number(token: &str) -> Option<u32> {
    lookup(WEEKDAYS, token)
}

pub fn month_number(token: &str) -> Option<u32> {
    lookup(MONTHS, token)
}

/// Case-insensitive alternation over every weekday name, longest first, so
/// that "tuesday" is never consumed as "tue" + "sday".
fn weekday_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let mut names: Vec<&str> = WEEKDAYS.iter().map(|(name, _)| *name).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternation = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i){alternation}")).expect("weekday names form a valid pattern")
    })
}

/// Replace every embedded weekday name with its number:
/// `"mon-wed/Friday"` becomes `"1-3/5"`.
pub fn substitute_weekdays(s: &str) -> String {
    weekday_pattern()
        .replace_all(s, |caps: &Captures<'_>| {
            weekday_number(&caps[0]).map_or_else(|| caps[0].to_string(), |n| n.to_string())
        })
        .into_owned()
}

/// Strip an ASCII prefix, ignoring case.
pub(crate) fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn is_weekday_list(tokens: &str) -> bool {
    !tokens.is_empty() && tokens.split(['/', '-']).all(|t| weekday_number(t).is_some())
}

/// Rewrite the special-case forms into the canonical grammar, leaving any
/// trailing clauses untouched:
///
/// - `every day` → `Every 1 days`
/// - `every weekday` → `Every 1 weeks, on 1-5`
/// - `every mon/thu` → `Every 1 weeks, on mon/thu`
///
/// Phrases already in canonical form are returned unchanged.
pub fn normalize(phrase: &str) -> String {
    let (head, rest) = match phrase.split_once(',') {
        Some((head, rest)) => (head, Some(rest)),
        None => (phrase, None),
    };
    let head = head.trim();

    let rewritten = if head.eq_ignore_ascii_case("every day") {
        "Every 1 days".to_string()
    } else if head.eq_ignore_ascii_case("every weekday") {
        "Every 1 weeks, on 1-5".to_string()
    } else {
        match strip_prefix_ci(head, "every ").map(str::trim) {
            Some(tokens) if is_weekday_list(tokens) => format!("Every 1 weeks, on {tokens}"),
            _ => return phrase.to_string(),
        }
    };

    match rest {
        Some(rest) => format!("{rewritten},{rest}"),
        None => rewritten,
    }
}
