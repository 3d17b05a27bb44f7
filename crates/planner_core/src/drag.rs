//! Maps a drop of a module into another list onto one planning mutation.

use anyhow::Context;
use shared::{
    domain::{Bucket, ModuleId, PlanningId, Semester, StudentId},
    protocol::PlanningResource,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{state::Buckets, PlanningBackend};

/// A module dropped from the `origin` list into the `destination` list, in
/// the column of `semester`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropEvent {
    pub origin: Bucket,
    pub destination: Bucket,
    pub module_id: ModuleId,
    pub semester: Semester,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CreatePlanning,
    DeletePlanning,
    MovePlanning,
    Invalid,
}

impl Transition {
    pub fn classify(origin: Bucket, destination: Bucket) -> Self {
        match (origin, destination) {
            (Bucket::Proposals, Bucket::Plannings) => Transition::CreatePlanning,
            (Bucket::Plannings, Bucket::Proposals) => Transition::DeletePlanning,
            (Bucket::Plannings, Bucket::Plannings) => Transition::MovePlanning,
            _ => Transition::Invalid,
        }
    }
}

/// Whether `destination` takes modules dragged out of `origin`. Proposals
/// only take planned modules back; plannings take proposals and other
/// plannings; completions and bookings take nothing.
pub fn accepts_drop(origin: Bucket, destination: Bucket) -> bool {
    Transition::classify(origin, destination) != Transition::Invalid
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    PlanningCreated(PlanningId),
    PlanningDeleted(PlanningId),
    PlanningUpdated(PlanningId),
    /// The move was applied locally, but the module carried no planning id
    /// so there was nothing to delete or update on the backend.
    LocalOnly,
}

#[derive(Debug, Error)]
pub enum DropError {
    #[error("module {module_id} is not in {bucket}")]
    ModuleNotFound { module_id: ModuleId, bucket: Bucket },
    #[error("cannot move a module from {origin} to {destination}")]
    InvalidTransition { origin: Bucket, destination: Bucket },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Applies a drop to `buckets` and issues the matching backend call.
///
/// The module's semester is stamped before anything else, including for
/// transitions that are then rejected. Valid moves are applied locally before
/// the backend answers and are not rolled back if the call fails.
pub async fn handle_drop(
    buckets: &mut Buckets,
    backend: &dyn PlanningBackend,
    student_id: StudentId,
    event: DropEvent,
) -> Result<DropOutcome, DropError> {
    let DropEvent {
        origin,
        destination,
        module_id,
        semester,
    } = event;

    let Some(module) = buckets.find_mut(origin, module_id) else {
        error!(%module_id, %origin, "dropped module not found in origin list");
        return Err(DropError::ModuleNotFound {
            module_id,
            bucket: origin,
        });
    };
    module.semester = Some(semester);

    let transition = Transition::classify(origin, destination);
    if transition == Transition::Invalid {
        warn!(%module_id, %origin, %destination, "unsupported drop; no backend call");
        return Err(DropError::InvalidTransition {
            origin,
            destination,
        });
    }

    let module = buckets
        .transfer(origin, destination, module_id)
        .ok_or(DropError::ModuleNotFound {
            module_id,
            bucket: origin,
        })?;
    let resource = PlanningResource {
        student_id,
        semester,
        course_id: module_id,
    };

    match transition {
        Transition::CreatePlanning => {
            let planning_id = backend
                .create_planning(&resource)
                .await
                .with_context(|| format!("failed to create planning for module {module_id}"))
                .inspect_err(|err| error!("{err:#}"))?;
            module.planning_id = Some(planning_id);
            info!(%module_id, %planning_id, "created planning");
            Ok(DropOutcome::PlanningCreated(planning_id))
        }
        Transition::DeletePlanning => {
            let Some(planning_id) = module.planning_id.take() else {
                warn!(%module_id, "module has no planning id; nothing to delete");
                return Ok(DropOutcome::LocalOnly);
            };
            backend
                .delete_planning(planning_id)
                .await
                .with_context(|| {
                    format!(
                        "failed to delete planning {planning_id} of module {module_id}; \
                         backend planning {planning_id} may be orphaned"
                    )
                })
                .inspect_err(|err| error!(%module_id, %planning_id, "{err:#}"))?;
            info!(%module_id, %planning_id, "deleted planning");
            Ok(DropOutcome::PlanningDeleted(planning_id))
        }
        Transition::MovePlanning => {
            let Some(planning_id) = module.planning_id else {
                warn!(%module_id, "module has no planning id; nothing to update");
                return Ok(DropOutcome::LocalOnly);
            };
            backend
                .update_planning(planning_id, &resource)
                .await
                .with_context(|| format!("failed to update planning {planning_id}"))
                .inspect_err(|err| error!("{err:#}"))?;
            info!(%module_id, %planning_id, %semester, "updated planning semester");
            Ok(DropOutcome::PlanningUpdated(planning_id))
        }
        Transition::Invalid => Err(DropError::InvalidTransition {
            origin,
            destination,
        }),
    }
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod tests;
