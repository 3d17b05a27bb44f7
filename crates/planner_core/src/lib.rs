use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Bucket, Module, PlanningId, Semester, StudentId},
    protocol::{BookingRecord, CompletionRecord, CourseRecord, PlanningRecord, PlanningResource},
};
use tracing::{error, info, warn};

pub mod drag;
pub mod projection;
pub mod reconcile;
pub mod rest;
pub mod state;
pub mod timeline;

pub use drag::{accepts_drop, DropError, DropEvent, DropOutcome, Transition};
pub use reconcile::{reconcile, FetchedRecords, Reconciliation};
pub use rest::{Endpoints, RestOptions, RestPlanningBackend};
pub use state::Buckets;
pub use timeline::{
    build_timeline, FixedClock, SemesterClock, SystemClock, TimelineError, MAX_PROGRAM_SEMESTERS,
};

#[async_trait]
pub trait PlanningBackend: Send + Sync {
    async fn fetch_courses(&self) -> Result<Vec<CourseRecord>>;
    async fn fetch_completions(&self, student_id: StudentId) -> Result<Vec<CompletionRecord>>;
    async fn fetch_bookings(&self, student_id: StudentId) -> Result<Vec<BookingRecord>>;
    async fn fetch_plannings(&self, student_id: StudentId) -> Result<Vec<PlanningRecord>>;
    async fn create_planning(&self, planning: &PlanningResource) -> Result<PlanningId>;
    async fn delete_planning(&self, planning_id: PlanningId) -> Result<()>;
    async fn update_planning(
        &self,
        planning_id: PlanningId,
        planning: &PlanningResource,
    ) -> Result<()>;
}

pub struct MissingPlanningBackend;

#[async_trait]
impl PlanningBackend for MissingPlanningBackend {
    async fn fetch_courses(&self) -> Result<Vec<CourseRecord>> {
        Err(anyhow!("planning backend unavailable"))
    }

    async fn fetch_completions(&self, student_id: StudentId) -> Result<Vec<CompletionRecord>> {
        Err(anyhow!(
            "planning backend unavailable for student {student_id}"
        ))
    }

    async fn fetch_bookings(&self, student_id: StudentId) -> Result<Vec<BookingRecord>> {
        Err(anyhow!(
            "planning backend unavailable for student {student_id}"
        ))
    }

    async fn fetch_plannings(&self, student_id: StudentId) -> Result<Vec<PlanningRecord>> {
        Err(anyhow!(
            "planning backend unavailable for student {student_id}"
        ))
    }

    async fn create_planning(&self, planning: &PlanningResource) -> Result<PlanningId> {
        Err(anyhow!(
            "planning backend unavailable; cannot plan module {}",
            planning.course_id
        ))
    }

    async fn delete_planning(&self, planning_id: PlanningId) -> Result<()> {
        Err(anyhow!(
            "planning backend unavailable; cannot delete planning {planning_id}"
        ))
    }

    async fn update_planning(
        &self,
        planning_id: PlanningId,
        _planning: &PlanningResource,
    ) -> Result<()> {
        Err(anyhow!(
            "planning backend unavailable; cannot update planning {planning_id}"
        ))
    }
}

/// Issues the four initial reads concurrently. Fails as a whole if any
/// single read fails.
pub async fn fetch_all(
    backend: &dyn PlanningBackend,
    student_id: StudentId,
) -> Result<FetchedRecords> {
    let (courses, completions, bookings, plannings) = futures::try_join!(
        backend.fetch_courses(),
        backend.fetch_completions(student_id),
        backend.fetch_bookings(student_id),
        backend.fetch_plannings(student_id),
    )?;
    Ok(FetchedRecords {
        courses,
        completions,
        bookings,
        plannings,
    })
}

/// Who is planning and where they are in their program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentSession {
    pub student_id: StudentId,
    /// Position of the reference semester within the program, 1-based.
    pub current_semester: u32,
    pub total_semesters: u32,
}

/// State and operations behind the planning page.
pub struct PlannerPage {
    backend: Arc<dyn PlanningBackend>,
    session: StudentSession,
    reference: Semester,
    semesters: Vec<Semester>,
    buckets: Buckets,
    search: String,
    ready: bool,
}

impl PlannerPage {
    pub fn new(
        backend: Arc<dyn PlanningBackend>,
        session: StudentSession,
        clock: &dyn SemesterClock,
    ) -> Self {
        Self {
            backend,
            session,
            reference: clock.now(),
            semesters: Vec::new(),
            buckets: Buckets::default(),
            search: String::new(),
            ready: false,
        }
    }

    /// Fetches and reconciles everything. On failure the page stays not
    /// ready and keeps whatever it held before.
    pub async fn load(&mut self) -> Result<()> {
        let records = match fetch_all(self.backend.as_ref(), self.session.student_id).await {
            Ok(records) => records,
            Err(err) => {
                error!(student_id = %self.session.student_id, "initial load failed: {err:#}");
                self.ready = false;
                return Err(err);
            }
        };

        let semesters = match build_timeline(
            self.reference,
            self.session.current_semester,
            self.session.total_semesters,
        ) {
            Ok(semesters) => semesters,
            Err(err) => {
                error!(student_id = %self.session.student_id, "invalid study session: {err}");
                self.ready = false;
                return Err(err.into());
            }
        };

        let reconciliation = reconcile(records);
        let dropped =
            reconciliation.unmatched_bookings.len() + reconciliation.unmatched_plannings.len();
        if dropped > 0 {
            warn!(dropped, "bookings or plannings without an open proposal were dropped");
        }
        self.buckets = reconciliation.buckets;
        self.semesters = semesters;
        self.ready = true;
        info!(
            modules = self.buckets.len(),
            semesters = self.semesters.len(),
            "planning page loaded"
        );
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn session(&self) -> &StudentSession {
        &self.session
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    /// Timeline semesters, ascending by label.
    pub fn ordered_semesters(&self) -> Vec<Semester> {
        timeline::ordered(&self.semesters)
    }

    pub fn upcoming_semester(&self) -> Semester {
        self.reference
    }

    pub fn after_next_semester(&self) -> Semester {
        self.reference.next()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn filtered_proposals(&self) -> Vec<&Module> {
        projection::filtered_proposals(&self.buckets, &self.search)
    }

    pub fn modules_in(&self, bucket: Bucket, semester: &Semester) -> Vec<&Module> {
        projection::modules_in(&self.buckets, bucket, semester)
    }

    pub fn total_ects(&self) -> u32 {
        projection::total_ects(&self.buckets)
    }

    pub fn semester_ects(&self, semester: &Semester) -> u32 {
        projection::semester_ects(&self.buckets, semester)
    }

    pub fn accepts_drop(&self, origin: Bucket, destination: Bucket) -> bool {
        accepts_drop(origin, destination)
    }

    pub async fn handle_drop(&mut self, event: DropEvent) -> Result<DropOutcome, DropError> {
        drag::handle_drop(
            &mut self.buckets,
            self.backend.as_ref(),
            self.session.student_id,
            event,
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
