//! Records exchanged with the planning REST backend.

use serde::{Deserialize, Serialize, Serializer};

use crate::domain::{Module, ModuleId, PlanningId, Semester, StudentId};

/// Every backend response wraps its payload in `{"resource": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceList<T> {
    pub resource: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEnvelope<T> {
    pub resource: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecord {
    pub uid: ModuleId,
    pub name_de: String,
    pub ects: u32,
}

impl From<CourseRecord> for Module {
    fn from(value: CourseRecord) -> Self {
        Module::new(value.uid, value.name_de, value.ects)
    }
}

/// Row of the results view. Carries the full course information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub uid: ModuleId,
    pub name_de: String,
    pub ects: u32,
    #[serde(default)]
    pub semester: Option<Semester>,
}

impl From<CompletionRecord> for Module {
    fn from(value: CompletionRecord) -> Self {
        Module {
            id: value.uid,
            title: value.name_de,
            ects: value.ects,
            semester: value.semester,
            planning_id: None,
        }
    }
}

/// Enrollment of the student in a course execution. Only the foreign key of
/// the course is delivered; title and ECTS come from the matching course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(rename = "courseexecution_by_courseexecution_ID")]
    pub course_execution: CourseExecutionRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseExecutionRecord {
    pub course_id: ModuleId,
    #[serde(default)]
    pub semester: Option<Semester>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRecord {
    pub uid: PlanningId,
    #[serde(rename = "course_ID")]
    pub course_id: ModuleId,
    pub semester: Semester,
    #[serde(rename = "student_ID", default)]
    pub student_id: Option<StudentId>,
}

/// Body of planning create and update requests. The semester goes out in
/// the backend's numeric form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningResource {
    #[serde(rename = "student_ID")]
    pub student_id: StudentId,
    #[serde(serialize_with = "semester_code")]
    pub semester: Semester,
    #[serde(rename = "course_ID")]
    pub course_id: ModuleId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub uid: PlanningId,
}

fn semester_code<S: Serializer>(semester: &Semester, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(semester.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_booking_with_related_course_execution() {
        let raw = r#"{"resource":[{"uid":4,"courseexecution_by_courseexecution_ID":{"course_id":17,"semester":"2020W"}}]}"#;
        let list: ResourceList<BookingRecord> = serde_json::from_str(raw).expect("decode");
        assert_eq!(list.resource[0].course_execution.course_id, ModuleId(17));
        assert_eq!(
            list.resource[0].course_execution.semester,
            Some("2020W".parse::<Semester>().expect("semester"))
        );
    }

    #[test]
    fn planning_resource_uses_backend_field_names() {
        let body = ResourceEnvelope {
            resource: PlanningResource {
                student_id: StudentId(3),
                semester: "2021S".parse::<Semester>().expect("semester"),
                course_id: ModuleId(9),
            },
        };
        let json = serde_json::to_value(&body).expect("encode");
        assert_eq!(
            json,
            serde_json::json!({"resource": {"student_ID": 3, "semester": 20211, "course_ID": 9}})
        );
    }

    #[test]
    fn decodes_planning_with_numeric_semester() {
        let raw = r#"{"resource":[{"uid":70,"course_ID":3,"semester":20171,"student_ID":9},{"uid":71,"course_ID":4,"semester":"2017W"}]}"#;
        let list: ResourceList<PlanningRecord> = serde_json::from_str(raw).expect("decode");
        assert_eq!(list.resource[0].semester, "2017S".parse::<Semester>().expect("semester"));
        assert_eq!(list.resource[0].student_id, Some(StudentId(9)));
        assert_eq!(list.resource[1].semester, "2017W".parse::<Semester>().expect("semester"));
    }
}
