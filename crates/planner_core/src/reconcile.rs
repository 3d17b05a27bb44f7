//! Partitions the raw backend records into the four page buckets.

use shared::{
    domain::{Bucket, Module, ModuleId, PlanningId},
    protocol::{BookingRecord, CompletionRecord, CourseRecord, PlanningRecord},
};
use tracing::{debug, warn};

use crate::state::Buckets;

/// Raw result of the initial load, one list per backend resource.
#[derive(Debug, Clone, Default)]
pub struct FetchedRecords {
    pub courses: Vec<CourseRecord>,
    pub completions: Vec<CompletionRecord>,
    pub bookings: Vec<BookingRecord>,
    pub plannings: Vec<PlanningRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub buckets: Buckets,
    /// Course ids of bookings that matched no remaining proposal.
    pub unmatched_bookings: Vec<ModuleId>,
    /// Plannings whose course matched no remaining proposal.
    pub unmatched_plannings: Vec<PlanningId>,
}

/// Builds the bucket state from a full load.
///
/// Every course starts as a proposal. Completions remove their course from
/// the proposals by id. Bookings and plannings each claim the proposal named
/// by their foreign key; a booking or planning whose course is no longer a
/// proposal (unknown, completed, or already claimed) is dropped and reported
/// in the returned [`Reconciliation`].
pub fn reconcile(records: FetchedRecords) -> Reconciliation {
    let mut result = Reconciliation::default();
    let buckets = &mut result.buckets;

    for course in records.courses {
        let id = course.uid;
        if !buckets.insert(Bucket::Proposals, Module::from(course)) {
            debug!(module_id = %id, "duplicate course in proposal list ignored");
        }
    }

    for completion in records.completions {
        let id = completion.uid;
        buckets.take(Bucket::Proposals, id);
        if !buckets.insert(Bucket::Completions, Module::from(completion)) {
            debug!(module_id = %id, "duplicate completion ignored");
        }
    }

    for booking in records.bookings {
        let execution = booking.course_execution;
        let Some(proposal) = buckets.take(Bucket::Proposals, execution.course_id) else {
            warn!(module_id = %execution.course_id, "booking references no open proposal; dropped");
            result.unmatched_bookings.push(execution.course_id);
            continue;
        };
        buckets.insert(
            Bucket::Bookings,
            Module {
                semester: execution.semester,
                planning_id: None,
                ..proposal
            },
        );
    }

    for planning in records.plannings {
        let Some(mut proposal) = buckets.take(Bucket::Proposals, planning.course_id) else {
            warn!(
                planning_id = %planning.uid,
                module_id = %planning.course_id,
                "planning references no open proposal; dropped"
            );
            result.unmatched_plannings.push(planning.uid);
            continue;
        };
        proposal.semester = Some(planning.semester);
        proposal.planning_id = Some(planning.uid);
        buckets.insert(Bucket::Plannings, proposal);
    }

    result
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
