//! Composite-key text utilities.
//!
//! Entities pack several logical components into one key attribute joined
//! with `::` (`district::group::unit`, `REWARD::AVATAR::17`). Sort-key
//! prefix queries scope on these joined prefixes, so the splitter is part
//! of the data contract.

use chrono::{DateTime, Local, NaiveDate};

use crate::errors::{Error, Result};

/// Separator between logical components of a composite key.
pub const SPLITTER: &str = "::";

/// Strip everything but alphanumerics and spaces.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect()
}

/// Join components into a composite key value.
pub fn join_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| part.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(SPLITTER)
}

/// Split a composite key value back into its components.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split(SPLITTER).collect()
}

/// Render a date in the platform's key format.
pub fn date_to_text(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Parse a date from the platform's key format.
pub fn text_to_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%d-%m-%Y")
        .map_err(|e| Error::Validation(format!("invalid date '{text}': {e}")))
}

/// Generate a code from a display name and the current date:
/// lowercased cleaned name joined with the compact date.
pub fn generate_code(name: &str, now: DateTime<Local>) -> String {
    let name = clean_text(name).to_lowercase();
    let date = date_to_text(now.date_naive()).replace('-', "");
    join_key([name.as_str(), date.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_and_split_round_trip() {
        let key = join_key(["north", "group-7", "scouts"]);
        assert_eq!(key, "north::group-7::scouts");
        assert_eq!(split_key(&key), vec!["north", "group-7", "scouts"]);
    }

    #[test]
    fn clean_text_strips_punctuation() {
        assert_eq!(clean_text("Tr;oop #42!"), "Troop 42");
    }

    #[test]
    fn dates_render_in_key_format() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
        assert_eq!(date_to_text(date), "09-03-2021");
        assert_eq!(text_to_date("09-03-2021").unwrap(), date);
        assert!(text_to_date("2021/03/09").is_err());
    }
}
