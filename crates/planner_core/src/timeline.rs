//! Semester timeline of a study program.

use chrono::Local;
use shared::domain::Semester;
use thiserror::Error;

/// Upper bound for both the student's current semester and the program
/// length.
pub const MAX_PROGRAM_SEMESTERS: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("current semester {0} exceeds the supported maximum of {MAX_PROGRAM_SEMESTERS}")]
    OffsetOutOfRange(u32),
    #[error("program length {0} exceeds the supported maximum of {MAX_PROGRAM_SEMESTERS}")]
    TotalOutOfRange(u32),
}

/// Source of the "now" reference semester.
pub trait SemesterClock: Send + Sync {
    fn now(&self) -> Semester;
}

/// Reads the local calendar date.
pub struct SystemClock;

impl SemesterClock for SystemClock {
    fn now(&self) -> Semester {
        Semester::containing(Local::now().date_naive())
    }
}

/// Always reports the same semester.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Semester);

impl SemesterClock for FixedClock {
    fn now(&self) -> Semester {
        self.0
    }
}

/// Semesters of a program of `total` terms, given that `reference` is the
/// student's `offset`-th semester. An offset of 0 means the program starts
/// the term after `reference`.
///
/// The result is ascending and free of duplicates. Both `offset` and `total`
/// are bounded by [`MAX_PROGRAM_SEMESTERS`].
pub fn build_timeline(
    reference: Semester,
    offset: u32,
    total: u32,
) -> Result<Vec<Semester>, TimelineError> {
    let offset = i32::try_from(offset)
        .ok()
        .filter(|_| offset <= MAX_PROGRAM_SEMESTERS)
        .ok_or(TimelineError::OffsetOutOfRange(offset))?;
    let total = i32::try_from(total)
        .ok()
        .filter(|_| total <= MAX_PROGRAM_SEMESTERS)
        .ok_or(TimelineError::TotalOutOfRange(total))?;
    let first = reference.shift(1 - offset);
    Ok((0..total).map(|step| first.shift(step)).collect())
}

/// Semesters sorted ascending by label, duplicates removed.
pub fn ordered(semesters: &[Semester]) -> Vec<Semester> {
    let mut ordered = semesters.to_vec();
    ordered.sort_by_key(Semester::label);
    ordered.dedup();
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sem(label: &str) -> Semester {
        label.parse().expect("semester")
    }

    fn labels(semesters: &[Semester]) -> Vec<String> {
        semesters.iter().map(Semester::label).collect()
    }

    fn timeline(reference: &str, offset: u32, total: u32) -> Vec<Semester> {
        build_timeline(sem(reference), offset, total).expect("timeline")
    }

    #[test]
    fn first_semester_of_program_starts_timeline() {
        let timeline = timeline("2020S", 1, 3);
        assert_eq!(labels(&timeline), vec!["2020S", "2020W", "2021S"]);
    }

    #[test]
    fn later_offset_reaches_back_to_program_start() {
        let timeline = timeline("2021S", 3, 6);
        assert_eq!(timeline.len(), 6);
        assert_eq!(timeline[0], sem("2020S"));
        assert_eq!(timeline[2], sem("2021S"));
        assert!(timeline.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn zero_offset_and_zero_total() {
        assert_eq!(timeline("2020W", 0, 1), vec![sem("2021S")]);
        assert!(timeline("2020W", 2, 0).is_empty());
    }

    #[test]
    fn oversized_offset_or_total_is_rejected() {
        assert_eq!(
            build_timeline(sem("2020S"), 2_147_483_648, 1),
            Err(TimelineError::OffsetOutOfRange(2_147_483_648))
        );
        assert_eq!(
            build_timeline(sem("2020S"), 1, 2_147_483_648),
            Err(TimelineError::TotalOutOfRange(2_147_483_648))
        );
        assert_eq!(
            build_timeline(sem("2020S"), MAX_PROGRAM_SEMESTERS + 1, 1),
            Err(TimelineError::OffsetOutOfRange(MAX_PROGRAM_SEMESTERS + 1))
        );
        let longest = timeline("2020S", MAX_PROGRAM_SEMESTERS, MAX_PROGRAM_SEMESTERS);
        assert_eq!(longest.len(), MAX_PROGRAM_SEMESTERS as usize);
        assert_eq!(longest[MAX_PROGRAM_SEMESTERS as usize - 1], sem("2020S"));
    }

    #[test]
    fn ordered_sorts_and_dedups() {
        let ordered = ordered(&[sem("2021S"), sem("2020S"), sem("2020W"), sem("2020S")]);
        assert_eq!(labels(&ordered), vec!["2020S", "2020W", "2021S"]);
    }

    #[test]
    fn fixed_clock_reports_its_semester() {
        assert_eq!(FixedClock(sem("2022W")).now(), sem("2022W"));
    }
}
