use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ModuleId);
id_newtype!(PlanningId);
id_newtype!(StudentId);

/// Academic term within a calendar year. Summer precedes winter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Summer,
    Winter,
}

impl Term {
    fn suffix(self) -> char {
        match self {
            Term::Summer => 'S',
            Term::Winter => 'W',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SemesterParseError {
    #[error("semester label is empty")]
    Empty,
    #[error("unknown term suffix in semester label '{0}'")]
    UnknownTerm(String),
    #[error("invalid year in semester label '{0}'")]
    InvalidYear(String),
    #[error("invalid semester code {0}")]
    InvalidCode(i64),
}

/// One academic term, labelled `<year><S|W>` (e.g. `2020S`, `2020W`).
///
/// Ordering is chronological and agrees with the ordering of the labels.
/// Deserializes from a label or from the backend's numeric code (see
/// [`Semester::code`]); serializes as a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SemesterRepr", into = "String")]
pub struct Semester {
    year: i32,
    term: Term,
}

impl Semester {
    pub const fn new(year: i32, term: Term) -> Self {
        Self { year, term }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn term(&self) -> Term {
        self.term
    }

    /// The semester a calendar date falls into. January and February still
    /// belong to the winter term that started the previous autumn.
    pub fn containing(date: NaiveDate) -> Self {
        match date.month() {
            3..=8 => Self::new(date.year(), Term::Summer),
            9..=12 => Self::new(date.year(), Term::Winter),
            _ => Self::new(date.year() - 1, Term::Winter),
        }
    }

    /// Moves `terms` semesters forward (or backward when negative).
    pub fn shift(self, terms: i32) -> Self {
        let index = i64::from(self.year) * 2 + self.term_index() + i64::from(terms);
        let term = if index.rem_euclid(2) == 0 {
            Term::Summer
        } else {
            Term::Winter
        };
        Self::new(index.div_euclid(2) as i32, term)
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Numeric form used by the planning backend: `year * 10 + 1` for the
    /// summer term, `year * 10 + 2` for the winter term (`20171` is `2017S`).
    pub fn code(&self) -> i64 {
        i64::from(self.year) * 10 + self.term_index() + 1
    }

    pub fn from_code(code: i64) -> Result<Self, SemesterParseError> {
        let term = match code.rem_euclid(10) {
            1 => Term::Summer,
            2 => Term::Winter,
            _ => return Err(SemesterParseError::InvalidCode(code)),
        };
        let year = i32::try_from(code.div_euclid(10))
            .ok()
            .filter(|year| *year > 0)
            .ok_or(SemesterParseError::InvalidCode(code))?;
        Ok(Self::new(year, term))
    }

    fn term_index(&self) -> i64 {
        match self.term {
            Term::Summer => 0,
            Term::Winter => 1,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.year, self.term.suffix())
    }
}

impl FromStr for Semester {
    type Err = SemesterParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let Some(suffix) = raw.chars().last() else {
            return Err(SemesterParseError::Empty);
        };
        let term = match suffix.to_ascii_uppercase() {
            'S' => Term::Summer,
            'W' => Term::Winter,
            _ => return Err(SemesterParseError::UnknownTerm(raw.to_string())),
        };
        let year = raw[..raw.len() - suffix.len_utf8()]
            .parse::<i32>()
            .map_err(|_| SemesterParseError::InvalidYear(raw.to_string()))?;
        Ok(Self::new(year, term))
    }
}

/// Either wire form of a semester.
#[derive(Deserialize)]
#[serde(untagged)]
enum SemesterRepr {
    Code(i64),
    Label(String),
}

impl TryFrom<SemesterRepr> for Semester {
    type Error = SemesterParseError;

    fn try_from(value: SemesterRepr) -> Result<Self, Self::Error> {
        match value {
            SemesterRepr::Code(code) => Self::from_code(code),
            SemesterRepr::Label(label) => label.parse(),
        }
    }
}

impl TryFrom<String> for Semester {
    type Error = SemesterParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Semester> for String {
    fn from(value: Semester) -> Self {
        value.to_string()
    }
}

/// The four disjoint lists a module can sit in on the planning page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Proposals,
    Completions,
    Bookings,
    Plannings,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Proposals,
        Bucket::Completions,
        Bucket::Bookings,
        Bucket::Plannings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Proposals => "proposals",
            Bucket::Completions => "completions",
            Bucket::Bookings => "bookings",
            Bucket::Plannings => "plannings",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown bucket '{0}'")]
pub struct UnknownBucket(pub String);

impl FromStr for Bucket {
    type Err = UnknownBucket;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownBucket(raw.to_string()))
    }
}

/// A course as shown on the planning page, whichever bucket it sits in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub ects: u32,
    pub semester: Option<Semester>,
    pub planning_id: Option<PlanningId>,
}

impl Module {
    pub fn new(id: ModuleId, title: impl Into<String>, ects: u32) -> Self {
        Self {
            id,
            title: title.into(),
            ects,
            semester: None,
            planning_id: None,
        }
    }

    pub fn with_semester(mut self, semester: Semester) -> Self {
        self.semester = Some(semester);
        self
    }

    pub fn in_semester(&self, semester: &Semester) -> bool {
        self.semester.as_ref() == Some(semester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sem(label: &str) -> Semester {
        label.parse().expect("semester label")
    }

    #[test]
    fn parses_and_prints_labels() {
        assert_eq!(sem("2020S"), Semester::new(2020, Term::Summer));
        assert_eq!(sem(" 2021w "), Semester::new(2021, Term::Winter));
        assert_eq!(sem("2021W").to_string(), "2021W");
        assert_eq!("".parse::<Semester>(), Err(SemesterParseError::Empty));
        assert!(matches!(
            "2020X".parse::<Semester>(),
            Err(SemesterParseError::UnknownTerm(_))
        ));
        assert!(matches!(
            "abS".parse::<Semester>(),
            Err(SemesterParseError::InvalidYear(_))
        ));
    }

    #[test]
    fn shift_crosses_year_boundaries_both_ways() {
        assert_eq!(sem("2020S").shift(1), sem("2020W"));
        assert_eq!(sem("2020W").shift(1), sem("2021S"));
        assert_eq!(sem("2021S").shift(-1), sem("2020W"));
        assert_eq!(sem("2021S").shift(-3), sem("2019W"));
        assert_eq!(sem("2020W").shift(0), sem("2020W"));
    }

    #[test]
    fn ordering_matches_label_ordering() {
        let mut semesters = vec![sem("2021S"), sem("2020W"), sem("2020S")];
        semesters.sort();
        let labels: Vec<String> = semesters.iter().map(Semester::label).collect();
        let mut sorted_labels = labels.clone();
        sorted_labels.sort();
        assert_eq!(labels, sorted_labels);
        assert_eq!(labels, vec!["2020S", "2020W", "2021S"]);
    }

    #[test]
    fn containing_maps_months_to_terms() {
        let date = |y, m| NaiveDate::from_ymd_opt(y, m, 15).expect("date");
        assert_eq!(Semester::containing(date(2024, 4)), sem("2024S"));
        assert_eq!(Semester::containing(date(2024, 10)), sem("2024W"));
        assert_eq!(Semester::containing(date(2025, 1)), sem("2024W"));
    }

    #[test]
    fn semester_serializes_as_label() {
        let json = serde_json::to_string(&sem("2020W")).expect("serialize");
        assert_eq!(json, "\"2020W\"");
        let back: Semester = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, sem("2020W"));
    }

    #[test]
    fn numeric_codes_map_to_terms() {
        assert_eq!(Semester::from_code(20171), Ok(sem("2017S")));
        assert_eq!(Semester::from_code(20172), Ok(sem("2017W")));
        assert_eq!(sem("2021W").code(), 20212);
        assert_eq!(Semester::from_code(20173), Err(SemesterParseError::InvalidCode(20173)));
        assert_eq!(Semester::from_code(-1), Err(SemesterParseError::InvalidCode(-1)));
        assert!(sem("2017S").code() < sem("2017W").code());
        assert!(sem("2017W").code() < sem("2018S").code());
    }

    #[test]
    fn deserializes_from_code_or_label() {
        let from_code: Semester = serde_json::from_str("20171").expect("code");
        let from_label: Semester = serde_json::from_str("\"2017S\"").expect("label");
        assert_eq!(from_code, from_label);
        assert!(serde_json::from_str::<Semester>("20179").is_err());
    }

    #[test]
    fn bucket_names_round_trip_through_from_str() {
        assert_eq!("plannings".parse::<Bucket>(), Ok(Bucket::Plannings));
        assert_eq!("Proposals".parse::<Bucket>(), Ok(Bucket::Proposals));
        assert!("wishlist".parse::<Bucket>().is_err());
    }
}
