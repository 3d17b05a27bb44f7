//! Values derived from the bucket state for display.

use shared::domain::{Bucket, Module, Semester};

use crate::state::Buckets;

/// Buckets whose modules count toward the credit totals.
const CREDITED: [Bucket; 3] = [Bucket::Completions, Bucket::Bookings, Bucket::Plannings];

fn credited(buckets: &Buckets) -> impl Iterator<Item = &Module> {
    CREDITED
        .into_iter()
        .flat_map(move |bucket| buckets.get(bucket).iter())
}

/// ECTS of completed, booked and planned modules. Proposals are excluded.
pub fn total_ects(buckets: &Buckets) -> u32 {
    credited(buckets).map(|module| module.ects).sum()
}

pub fn semester_ects(buckets: &Buckets, semester: &Semester) -> u32 {
    credited(buckets)
        .filter(|module| module.in_semester(semester))
        .map(|module| module.ects)
        .sum()
}

/// Proposals whose title contains `term`, ignoring case and surrounding
/// whitespace. An empty term matches everything.
pub fn filtered_proposals<'a>(buckets: &'a Buckets, term: &str) -> Vec<&'a Module> {
    let needle = term.trim().to_lowercase();
    buckets
        .get(Bucket::Proposals)
        .iter()
        .filter(|module| module.title.to_lowercase().contains(&needle))
        .collect()
}

pub fn modules_in<'a>(buckets: &'a Buckets, bucket: Bucket, semester: &Semester) -> Vec<&'a Module> {
    buckets
        .get(bucket)
        .iter()
        .filter(|module| module.in_semester(semester))
        .collect()
}

#[cfg(test)]
mod tests {
    use shared::domain::ModuleId;

    use super::*;

    fn sem(label: &str) -> Semester {
        label.parse().expect("semester")
    }

    fn sample() -> Buckets {
        let mut buckets = Buckets::default();
        buckets.insert(
            Bucket::Proposals,
            Module::new(ModuleId(1), "Lineare Algebra", 30).with_semester(sem("2020S")),
        );
        buckets.insert(Bucket::Proposals, Module::new(ModuleId(2), "Analysis", 5));
        buckets.insert(
            Bucket::Completions,
            Module::new(ModuleId(3), "Programmieren", 6).with_semester(sem("2019W")),
        );
        buckets.insert(
            Bucket::Bookings,
            Module::new(ModuleId(4), "Datenbanken", 5).with_semester(sem("2020S")),
        );
        buckets.insert(
            Bucket::Plannings,
            Module::new(ModuleId(5), "Compilerbau", 8).with_semester(sem("2020S")),
        );
        buckets.insert(
            Bucket::Plannings,
            Module::new(ModuleId(6), "Netzwerke", 4).with_semester(sem("2020W")),
        );
        buckets
    }

    #[test]
    fn total_excludes_proposals() {
        assert_eq!(total_ects(&sample()), 6 + 5 + 8 + 4);
        assert_eq!(total_ects(&Buckets::default()), 0);
    }

    #[test]
    fn semester_total_only_counts_matching_semester() {
        let buckets = sample();
        assert_eq!(semester_ects(&buckets, &sem("2020S")), 5 + 8);
        assert_eq!(semester_ects(&buckets, &sem("2020W")), 4);
        assert_eq!(semester_ects(&buckets, &sem("2021S")), 0);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let buckets = sample();
        let hits = filtered_proposals(&buckets, "  ALGEB ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ModuleId(1));
        assert_eq!(filtered_proposals(&buckets, "").len(), 2);
        assert!(filtered_proposals(&buckets, "Compilerbau").is_empty());
    }

    #[test]
    fn modules_in_filters_by_exact_semester() {
        let buckets = sample();
        let planned: Vec<ModuleId> = modules_in(&buckets, Bucket::Plannings, &sem("2020S"))
            .into_iter()
            .map(|module| module.id)
            .collect();
        assert_eq!(planned, vec![ModuleId(5)]);
        assert!(modules_in(&buckets, Bucket::Bookings, &sem("2020W")).is_empty());
    }
}
