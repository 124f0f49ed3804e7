use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::db::Repository;
use crate::db::repository::next_id;
use crate::error::AppError;
use crate::models::{Course, ScheduleExport, Settings};
use crate::services::week;
use crate::validation::{
    self, ValidationError, check_time_range, validate_course_patch, validate_new_course,
};

/// Request-level operations over the course and settings documents.
///
/// Each mutation is a full load-modify-save against the repository. The
/// sequence as a whole is not locked; see [`Repository`].
#[derive(Debug, Clone)]
pub struct ScheduleService {
    repo: Repository,
}

impl ScheduleService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn settings(&self) -> Settings {
        self.repo.load_settings().await
    }

    pub async fn replace_settings(
        &self,
        payload: &Value,
        today: NaiveDate,
    ) -> Result<Settings, AppError> {
        let settings = validation::validate_settings(payload, today)?;
        self.repo.save_settings(&settings).await?;
        info!("settings updated: {}", settings.semester_name);
        Ok(settings)
    }

    pub async fn current_week(&self, today: NaiveDate) -> u32 {
        week::current_week(&self.repo.load_settings().await, today)
    }

    pub async fn list_courses(&self) -> Vec<Course> {
        self.repo.load_courses().await
    }

    pub async fn course(&self, id: u64) -> Result<Course, AppError> {
        self.repo
            .load_courses()
            .await
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)
    }

    pub async fn create_course(&self, payload: &Value) -> Result<Course, AppError> {
        let new_course = validate_new_course(payload)?;
        let mut courses = self.repo.load_courses().await;
        let course = new_course.with_id(next_id(&courses));
        courses.push(course.clone());
        self.repo.save_courses(&courses).await?;

        info!("created course {} ({})", course.id, course.title);
        Ok(course)
    }

    pub async fn update_course(&self, id: u64, payload: &Value) -> Result<Course, AppError> {
        let mut courses = self.repo.load_courses().await;
        let slot = courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;

        let patch = validate_course_patch(payload)?;
        let updated = slot.patched(patch);
        check_time_range(&updated.start_time, &updated.end_time)?;
        *slot = updated.clone();
        self.repo.save_courses(&courses).await?;

        info!("updated course {}", id);
        Ok(updated)
    }

    pub async fn delete_course(&self, id: u64) -> Result<(), AppError> {
        let mut courses = self.repo.load_courses().await;
        let before = courses.len();
        courses.retain(|c| c.id != id);
        if courses.len() == before {
            return Err(AppError::NotFound);
        }
        self.repo.save_courses(&courses).await?;

        info!("deleted course {}", id);
        Ok(())
    }

    /// Courses that meet in `week`, in stored order.
    pub async fn schedule_for_week(&self, week: i64) -> Vec<Course> {
        self.repo
            .load_courses()
            .await
            .into_iter()
            .filter(|c| c.runs_in_week(week))
            .collect()
    }

    pub async fn export(&self) -> ScheduleExport {
        ScheduleExport {
            courses: self.repo.load_courses().await,
            settings: self.repo.load_settings().await,
        }
    }

    /// Replaces both documents with the payload's contents.
    ///
    /// Everything is validated before anything is written. Course ids are
    /// reassigned from 1 in input order. Returns the number of courses.
    pub async fn import(&self, payload: &Value, today: NaiveDate) -> Result<usize, AppError> {
        let map = payload.as_object().ok_or_else(|| {
            ValidationError::InvalidPayload("import must be a JSON object".to_string())
        })?;

        let empty_settings = Value::Object(Default::default());
        let settings_value = map
            .get("settings")
            .filter(|v| !v.is_null())
            .unwrap_or(&empty_settings);
        let settings = validation::validate_settings(settings_value, today)?;

        let course_values = match map.get("courses") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                return Err(ValidationError::InvalidPayload(
                    "courses must be a list".to_string(),
                )
                .into());
            }
        };
        let courses = course_values
            .iter()
            .enumerate()
            .map(|(i, value)| validate_new_course(value).map(|c| c.with_id(i as u64 + 1)))
            .collect::<Result<Vec<Course>, ValidationError>>()?;

        self.repo.save_settings(&settings).await?;
        self.repo.save_courses(&courses).await?;

        info!("imported {} courses", courses.len());
        Ok(courses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DataFiles;
    use serde_json::json;

    async fn setup_service() -> ScheduleService {
        let dir = std::env::temp_dir().join(format!("class-schedule-{}", uuid::Uuid::new_v4()));
        let repo = Repository::new(DataFiles::in_dir(dir));
        repo.ensure_initialized().await.expect("Failed to initialize");
        ScheduleService::new(repo)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn course_json(title: &str, weeks: Value) -> Value {
        json!({
            "title": title,
            "weekday": 3,
            "start_time": "14:00",
            "end_time": "15:40",
            "weeks": weeks
        })
    }

    #[tokio::test]
    async fn create_round_trips_through_storage() {
        let service = setup_service().await;
        let created = service
            .create_course(&course_json(" 操作系统 ", json!([2, 1])))
            .await
            .expect("Failed to create course");

        assert_eq!(created.id, 1);
        assert_eq!(created.title, "操作系统");
        assert_eq!(created.weeks, vec![1, 2]);

        let stored = service.list_courses().await;
        assert_eq!(stored, vec![created]);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let service = setup_service().await;
        for title in ["a", "b", "c"] {
            service.create_course(&course_json(title, json!([1]))).await.unwrap();
        }

        service.delete_course(2).await.unwrap();
        let next = service.create_course(&course_json("d", json!([1]))).await.unwrap();
        assert_eq!(next.id, 4);

        service.delete_course(4).await.unwrap();
        let next = service.create_course(&course_json("e", json!([1]))).await.unwrap();
        assert_eq!(next.id, 4);

        for id in [1, 3, 4] {
            service.delete_course(id).await.unwrap();
        }
        let next = service.create_course(&course_json("f", json!([1]))).await.unwrap();
        assert_eq!(next.id, 1);
    }

    #[tokio::test]
    async fn update_merges_present_fields() {
        let service = setup_service().await;
        let created = service.create_course(&course_json("编译原理", json!([1, 2]))).await.unwrap();

        let updated = service
            .update_course(created.id, &json!({ "location": "实验楼 305", "color": "" }))
            .await
            .expect("Failed to update course");

        assert_eq!(updated.title, "编译原理");
        assert_eq!(updated.location, "实验楼 305");
        assert_eq!(updated.weeks, vec![1, 2]);
        assert_eq!(updated.color, "#4f8cff");
        assert_eq!(service.list_courses().await, vec![updated]);
    }

    #[tokio::test]
    async fn update_rechecks_merged_time_range() {
        let service = setup_service().await;
        let created = service.create_course(&course_json("网络", json!([1]))).await.unwrap();

        let err = service
            .update_course(created.id, &json!({ "end_time": "13:00" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::InvalidRange(_))));
        assert_eq!(service.list_courses().await, vec![created]);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let service = setup_service().await;
        assert!(matches!(
            service.update_course(9, &json!({})).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(service.delete_course(9).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn schedule_filters_by_week() {
        let service = setup_service().await;
        service.create_course(&course_json("a", json!([1, 3]))).await.unwrap();
        service.create_course(&course_json("b", json!([2]))).await.unwrap();
        service.create_course(&course_json("c", json!([3, 4]))).await.unwrap();

        let titles: Vec<String> = service
            .schedule_for_week(3)
            .await
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["a", "c"]);
        assert!(service.schedule_for_week(5).await.is_empty());
    }

    #[tokio::test]
    async fn import_reassigns_ids_and_replaces_everything() {
        let service = setup_service().await;
        service.create_course(&course_json("old", json!([1]))).await.unwrap();

        let mut first = course_json("x", json!([1]));
        first["id"] = json!(42);
        let count = service
            .import(
                &json!({
                    "courses": [first, course_json("y", json!([2]))],
                    "settings": { "semester_name": "春季", "first_monday": "2026-03-02", "slot_interval": 20 }
                }),
                today(),
            )
            .await
            .expect("Failed to import");

        assert_eq!(count, 2);
        let exported = service.export().await;
        let ids: Vec<u64> = exported.courses.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(exported.courses[0].title, "x");
        assert_eq!(exported.settings.semester_name, "春季");
        assert_eq!(exported.settings.slot_interval, 20);
    }

    #[tokio::test]
    async fn invalid_import_changes_nothing() {
        let service = setup_service().await;
        let existing = service.create_course(&course_json("keep", json!([1]))).await.unwrap();
        let settings_before = service.settings().await;

        let result = service
            .import(
                &json!({
                    "courses": [
                        course_json("a", json!([1])),
                        course_json("b", json!([1])),
                        { "title": "broken", "weekday": 1 },
                        course_json("c", json!([1]))
                    ],
                    "settings": { "semester_name": "新学期" }
                }),
                today(),
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::MissingField("start_time")))
        ));
        assert_eq!(service.list_courses().await, vec![existing]);
        assert_eq!(service.settings().await, settings_before);
    }

    #[tokio::test]
    async fn replace_settings_coerces_interval() {
        let service = setup_service().await;
        let settings = service
            .replace_settings(&json!({ "first_monday": "2026-09-07", "slot_interval": 25 }), today())
            .await
            .unwrap();
        assert_eq!(settings.slot_interval, 30);
        assert_eq!(service.settings().await, settings);
        assert_eq!(service.current_week(today()).await, 6);
    }
}
