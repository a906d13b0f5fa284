use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use icu::locale::Locale as IcuLocale;

use crate::error::{AdapterError, Result};

/// A validated BCP-47 locale tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: String,
    language: String,
}

impl Locale {
    pub fn parse(tag: &str) -> Result<Self> {
        let normalized = tag.trim().replace('_', "-");
        let locale: IcuLocale = normalized
            .parse()
            .map_err(|_| AdapterError::InvalidLocale(tag.to_string()))?;
        Ok(Self {
            tag: locale.to_string(),
            language: locale.id.language.to_string(),
        })
    }

    /// Canonical tag, e.g. `en-US`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Sunday for `en-US`, Monday for every other tag.
    pub fn first_day_of_week(&self) -> Weekday {
        match self.tag.as_str() {
            "en-US" => Weekday::Sun,
            _ => Weekday::Mon,
        }
    }

    pub(crate) fn names(&self) -> &'static Names {
        match self.language.as_str() {
            "fr" => &FRENCH,
            "de" => &GERMAN,
            "es" => &SPANISH,
            _ => &ENGLISH,
        }
    }
}

impl FromStr for Locale {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Name tables for the given locale, English when none is configured.
pub(crate) fn names_for(locale: Option<&Locale>) -> &'static Names {
    locale.map_or(&ENGLISH, Locale::names)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextWidth {
    Short,
    Full,
    Narrow,
}

/// Localized month, weekday and meridiem text. Weekday arrays start on
/// Monday.
pub(crate) struct Names {
    months_full: [&'static str; 12],
    months_short: [&'static str; 12],
    months_narrow: [&'static str; 12],
    weekdays_full: [&'static str; 7],
    weekdays_short: [&'static str; 7],
    weekdays_narrow: [&'static str; 7],
    am: &'static str,
    pm: &'static str,
}

impl Names {
    fn months(&self, width: TextWidth) -> &[&'static str; 12] {
        match width {
            TextWidth::Short => &self.months_short,
            TextWidth::Full => &self.months_full,
            TextWidth::Narrow => &self.months_narrow,
        }
    }

    fn weekdays(&self, width: TextWidth) -> &[&'static str; 7] {
        match width {
            TextWidth::Short => &self.weekdays_short,
            TextWidth::Full => &self.weekdays_full,
            TextWidth::Narrow => &self.weekdays_narrow,
        }
    }

    /// `month` is 1-based.
    pub(crate) fn month(&self, month: u32, width: TextWidth) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        self.months(width)[idx]
    }

    pub(crate) fn weekday(&self, weekday: Weekday, width: TextWidth) -> &'static str {
        self.weekdays(width)[weekday.num_days_from_monday() as usize]
    }

    pub(crate) fn meridiem(&self, pm: bool) -> &'static str {
        if pm { self.pm } else { self.am }
    }

    /// Longest month name at the start of `text`, matched case-insensitively.
    /// Returns the 1-based month and the matched byte length.
    pub(crate) fn match_month(&self, text: &str, width: TextWidth) -> Option<(u32, usize)> {
        longest_prefix(self.months(width), text).map(|(i, len)| (i as u32 + 1, len))
    }

    pub(crate) fn match_weekday(&self, text: &str, width: TextWidth) -> Option<(Weekday, usize)> {
        longest_prefix(self.weekdays(width), text).and_then(|(i, len)| {
            let wd = Weekday::try_from(i as u8).ok()?;
            Some((wd, len))
        })
    }

    /// Returns `true` for PM.
    pub(crate) fn match_meridiem(&self, text: &str) -> Option<(bool, usize)> {
        longest_prefix(&[self.am, self.pm], text).map(|(i, len)| (i == 1, len))
    }
}

fn longest_prefix(candidates: &[&str], text: &str) -> Option<(usize, usize)> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            text.get(..name.len())
                .is_some_and(|head| head.to_lowercase() == name.to_lowercase())
        })
        .max_by_key(|(_, name)| name.len())
        .map(|(i, name)| (i, name.len()))
}

static ENGLISH: Names = Names {
    months_full: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    months_short: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    months_narrow: ["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"],
    weekdays_full: [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ],
    weekdays_short: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
    weekdays_narrow: ["M", "T", "W", "T", "F", "S", "S"],
    am: "AM",
    pm: "PM",
};

static FRENCH: Names = Names {
    months_full: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    months_short: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
        "nov.", "déc.",
    ],
    months_narrow: ["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"],
    weekdays_full: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
    weekdays_short: ["lun.", "mar.", "mer.", "jeu.", "ven.", "sam.", "dim."],
    weekdays_narrow: ["L", "M", "M", "J", "V", "S", "D"],
    am: "AM",
    pm: "PM",
};

static GERMAN: Names = Names {
    months_full: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    months_short: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
        "Dez.",
    ],
    months_narrow: ["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"],
    weekdays_full: [
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
        "Sonntag",
    ],
    weekdays_short: ["Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa.", "So."],
    weekdays_narrow: ["M", "D", "M", "D", "F", "S", "S"],
    am: "AM",
    pm: "PM",
};

static SPANISH: Names = Names {
    months_full: [
        "enero",
        "febrero",
        "marzo",
        "abril",
        "mayo",
        "junio",
        "julio",
        "agosto",
        "septiembre",
        "octubre",
        "noviembre",
        "diciembre",
    ],
    months_short: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
    ],
    months_narrow: ["E", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"],
    weekdays_full: [
        "lunes",
        "martes",
        "miércoles",
        "jueves",
        "viernes",
        "sábado",
        "domingo",
    ],
    weekdays_short: ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"],
    weekdays_narrow: ["L", "M", "X", "J", "V", "S", "D"],
    am: "a. m.",
    pm: "p. m.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_start_is_binary() {
        assert_eq!(Locale::parse("en-US").unwrap().first_day_of_week(), Weekday::Sun);
        assert_eq!(Locale::parse("en_US").unwrap().first_day_of_week(), Weekday::Sun);
        assert_eq!(Locale::parse("en-GB").unwrap().first_day_of_week(), Weekday::Mon);
        assert_eq!(Locale::parse("en").unwrap().first_day_of_week(), Weekday::Mon);
        assert_eq!(Locale::parse("fr-CA").unwrap().first_day_of_week(), Weekday::Mon);
    }

    #[test]
    fn rejects_garbage_tags() {
        assert!(matches!(
            Locale::parse("not a locale"),
            Err(AdapterError::InvalidLocale(_))
        ));
    }

    #[test]
    fn name_lookup() {
        let fr = Locale::parse("fr-FR").unwrap();
        assert_eq!(fr.names().month(3, TextWidth::Full), "mars");
        assert_eq!(fr.names().weekday(Weekday::Sun, TextWidth::Short), "dim.");
        let unknown = Locale::parse("ja-JP").unwrap();
        assert_eq!(unknown.names().month(12, TextWidth::Short), "Dec");
    }

    #[test]
    fn prefix_matching_prefers_longest() {
        let names = names_for(None);
        assert_eq!(names.match_month("june 5", TextWidth::Full), Some((6, 4)));
        assert_eq!(names.match_weekday("Sunday", TextWidth::Full), Some((Weekday::Sun, 6)));
        let fr = Locale::parse("fr").unwrap();
        assert_eq!(fr.names().match_month("juillet", TextWidth::Full), Some((7, 7)));
        assert_eq!(names.match_meridiem("pm"), Some((true, 2)));
    }
}
