//! Course listing and registration.
//!
//! A course is a platform event whose object has type `piscine`. Listing and
//! registration go through the GraphQL engine with the service's own token.

use crate::errors::ApiError;
use crate::models::Course;
use crate::services::platform::run_typed;
use platform_client::GraphqlExecutor;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

const CAMPUS_COURSES_QUERY: &str = r#"query queryCampusEvents($campusName: String!) {
  event(where: {_and: [{campus: {_eq: $campusName}}, {object: {type: {_eq: "piscine"}}}]}) {
    id
    object {
      campus
      name
    }
  }
}"#;

const USER_COURSES_QUERY: &str = r#"query queryUserEvents($campusName: String!, $userID: Int!) {
  user(where: {id: {_eq: $userID}}) {
    events(where: {_and: [{event: {campus: {_eq: $campusName}}}, {event: {object: {type: {_eq: "piscine"}}}}]}) {
      event {
        id
        object {
          campus
          name
        }
      }
    }
  }
}"#;

const REGISTER_MUTATION: &str = r#"mutation insert_event_user($objects: [event_user_insert_input!]!) {
  insert_event_user(objects: $objects) {
    returning {
      eventId
    }
  }
}"#;

const UNREGISTER_MUTATION: &str = r#"mutation remove_user_from_event($userId: Int!, $eventId: Int!) {
  delete_event_user(where: {_and: [{userId: {_eq: $userId}}, {eventId: {_eq: $eventId}}]}) {
    affected_rows
  }
}"#;

// ============================================================================
// GraphQL data shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct CampusEventsData {
    event: Vec<EventRow>,
}

#[derive(Debug, Deserialize)]
struct UserEventsData {
    user: Vec<UserEvents>,
}

#[derive(Debug, Deserialize)]
struct UserEvents {
    events: Vec<UserEventRow>,
}

#[derive(Debug, Deserialize)]
struct UserEventRow {
    event: EventRow,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    id: i64,
    object: EventObject,
}

#[derive(Debug, Deserialize)]
struct EventObject {
    campus: String,
    name: String,
}

impl From<EventRow> for Course {
    fn from(row: EventRow) -> Self {
        Course {
            id: row.id,
            name: row.object.name,
            campus: row.object.campus,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertEventUserData {
    insert_event_user: InsertEventUserResult,
}

#[derive(Debug, Deserialize)]
struct InsertEventUserResult {
    returning: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DeleteEventUserData {
    delete_event_user: DeleteEventUserResult,
}

#[derive(Debug, Deserialize)]
struct DeleteEventUserResult {
    affected_rows: i64,
}

// ============================================================================
// Service
// ============================================================================

/// Course operations for one campus.
#[derive(Clone)]
pub struct CourseService {
    executor: Arc<dyn GraphqlExecutor>,
    campus_name: String,
}

impl CourseService {
    pub fn new(executor: Arc<dyn GraphqlExecutor>, campus_name: impl Into<String>) -> Self {
        Self {
            executor,
            campus_name: campus_name.into(),
        }
    }

    /// Campus this service is scoped to.
    pub fn campus_name(&self) -> &str {
        &self.campus_name
    }

    /// All courses of the campus.
    #[instrument(skip_all, fields(campus = %self.campus_name))]
    pub async fn campus_courses(&self) -> Result<Vec<Course>, ApiError> {
        let data: CampusEventsData = run_typed(
            self.executor.as_ref(),
            "campus_courses",
            CAMPUS_COURSES_QUERY,
            &json!({"campusName": self.campus_name}),
        )
        .await?;

        Ok(data.event.into_iter().map(Course::from).collect())
    }

    /// Courses of the campus the user is registered to.
    ///
    /// A user unknown to the platform has no courses.
    #[instrument(skip_all, fields(campus = %self.campus_name))]
    pub async fn user_courses(&self, user_id: i64) -> Result<Vec<Course>, ApiError> {
        let data: UserEventsData = run_typed(
            self.executor.as_ref(),
            "user_courses",
            USER_COURSES_QUERY,
            &json!({"campusName": self.campus_name, "userID": user_id}),
        )
        .await?;

        Ok(data
            .user
            .into_iter()
            .next()
            .map(|user| {
                user.events
                    .into_iter()
                    .map(|row| Course::from(row.event))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Courses of the campus the user is not registered to, in campus order.
    #[instrument(skip_all, fields(campus = %self.campus_name))]
    pub async fn available_courses(&self, user_id: i64) -> Result<Vec<Course>, ApiError> {
        let (campus_courses, user_courses) =
            tokio::try_join!(self.campus_courses(), self.user_courses(user_id))?;

        Ok(filter_available(campus_courses, &user_courses))
    }

    /// Register the user to a course.
    #[instrument(skip_all, fields(course_id = course_id))]
    pub async fn register(&self, user_id: i64, course_id: i64) -> Result<(), ApiError> {
        let data: InsertEventUserData = run_typed(
            self.executor.as_ref(),
            "register_course",
            REGISTER_MUTATION,
            &json!({"objects": [{"eventId": course_id, "userId": user_id}]}),
        )
        .await?;

        info!(
            target: "manager.services.courses",
            course_id,
            inserted = data.insert_event_user.returning.len(),
            "User registered to course"
        );
        Ok(())
    }

    /// Remove the user from a course.
    ///
    /// Succeeds even when the user was not registered.
    #[instrument(skip_all, fields(course_id = course_id))]
    pub async fn unregister(&self, user_id: i64, course_id: i64) -> Result<(), ApiError> {
        let data: DeleteEventUserData = run_typed(
            self.executor.as_ref(),
            "unregister_course",
            UNREGISTER_MUTATION,
            &json!({"userId": user_id, "eventId": course_id}),
        )
        .await?;

        info!(
            target: "manager.services.courses",
            course_id,
            affected_rows = data.delete_event_user.affected_rows,
            "User unregistered from course"
        );
        Ok(())
    }
}

/// Keep the campus courses whose id is not among the user's courses.
fn filter_available(campus_courses: Vec<Course>, user_courses: &[Course]) -> Vec<Course> {
    let registered: HashSet<i64> = user_courses.iter().map(|c| c.id).collect();
    campus_courses
        .into_iter()
        .filter(|c| !registered.contains(&c.id))
        .collect()
}
