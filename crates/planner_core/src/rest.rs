//! `PlanningBackend` over the planning REST API.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{PlanningId, StudentId},
    error::ApiError,
    protocol::{
        BookingRecord, CompletionRecord, CourseRecord, CreatedRecord, PlanningRecord,
        PlanningResource, ResourceEnvelope, ResourceList,
    },
};
use url::Url;

use crate::PlanningBackend;

pub const API_KEY_HEADER: &str = "X-Api-Key";
const BOOKING_RELATION: &str = "courseexecution_by_courseexecution_ID";

/// Resource paths relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub course: String,
    pub result_view: String,
    pub student_course_execution: String,
    pub planning: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            course: "course".into(),
            result_view: "result_view".into(),
            student_course_execution: "student_courseexecution".into(),
            planning: "planning".into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RestOptions {
    pub api_key: Option<String>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

pub struct RestPlanningBackend {
    http: Client,
    base_url: Url,
    endpoints: Endpoints,
    api_key: Option<String>,
}

impl RestPlanningBackend {
    pub fn new(base_url: &str, endpoints: Endpoints, options: RestOptions) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid API base url '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;

        Ok(Self {
            http,
            base_url,
            endpoints,
            api_key: options.api_key,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid endpoint path '{path}'"))
    }

    fn planning_url(&self, planning_id: PlanningId) -> Result<Url> {
        let path = format!(
            "{}/{}",
            self.endpoints.planning.trim_end_matches('/'),
            planning_id
        );
        self.url(&path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .authorize(self.http.get(self.url(path)?).query(query))
            .send()
            .await?;
        let list: ResourceList<T> = check_status(response).await?.json().await?;
        Ok(list.resource)
    }
}

fn student_filter(student_id: StudentId) -> (&'static str, String) {
    ("filter", format!("(student_id=\"{student_id}\")"))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), &body).into())
}

#[async_trait]
impl PlanningBackend for RestPlanningBackend {
    async fn fetch_courses(&self) -> Result<Vec<CourseRecord>> {
        self.get_list(&self.endpoints.course, &[])
            .await
            .context("failed to fetch courses")
    }

    async fn fetch_completions(&self, student_id: StudentId) -> Result<Vec<CompletionRecord>> {
        self.get_list(&self.endpoints.result_view, &[student_filter(student_id)])
            .await
            .context("failed to fetch completed courses")
    }

    async fn fetch_bookings(&self, student_id: StudentId) -> Result<Vec<BookingRecord>> {
        self.get_list(
            &self.endpoints.student_course_execution,
            &[
                student_filter(student_id),
                ("related", BOOKING_RELATION.to_string()),
            ],
        )
        .await
        .context("failed to fetch bookings")
    }

    async fn fetch_plannings(&self, student_id: StudentId) -> Result<Vec<PlanningRecord>> {
        self.get_list(&self.endpoints.planning, &[student_filter(student_id)])
            .await
            .context("failed to fetch plannings")
    }

    async fn create_planning(&self, planning: &PlanningResource) -> Result<PlanningId> {
        let response = self
            .authorize(self.http.post(self.url(&self.endpoints.planning)?))
            .json(&ResourceEnvelope {
                resource: planning.clone(),
            })
            .send()
            .await?;
        let created: ResourceList<CreatedRecord> = check_status(response).await?.json().await?;
        created
            .resource
            .first()
            .map(|record| record.uid)
            .ok_or_else(|| anyhow!("planning create response carried no record"))
    }

    async fn delete_planning(&self, planning_id: PlanningId) -> Result<()> {
        let response = self
            .authorize(self.http.delete(self.planning_url(planning_id)?))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_planning(
        &self,
        planning_id: PlanningId,
        planning: &PlanningResource,
    ) -> Result<()> {
        let response = self
            .authorize(self.http.patch(self.planning_url(planning_id)?))
            .json(planning)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
