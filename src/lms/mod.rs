pub mod dto;

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::{CourseRef, CourseType};

use dto::{
    CourseResponse, CoursesResponse, CreateLessonBody, CreateLiveClassBody, CreateSectionBody,
    CreateWeekBody, CreatedLessonResponse, CreatedLiveClassResponse, CreatedSectionResponse,
    CreatedWeekResponse, CurriculumResponse, RawCourse, RawLesson, RawLiveClass, RawSection,
    RawWeek, UpdateWeekBody,
};

#[derive(Clone, Debug)]
pub struct LmsConfig {
    pub base_url: String,
    pub api_token: String,
}

impl LmsConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("LMS_BASE_URL")
            .map_err(|_| AppError::BadRequest("LMS_BASE_URL is not set".to_string()))?;
        let api_token = env::var("LMS_API_TOKEN")
            .map_err(|_| AppError::BadRequest("LMS_API_TOKEN is not set".to_string()))?;

        Ok(Self {
            base_url,
            api_token,
        })
    }
}

/// The remote store's REST surface. Services depend on this trait so tests
/// can script the remote side.
#[async_trait]
pub trait LmsApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<RawCourse>, AppError>;
    async fn list_courses_of_type(
        &self,
        course_type: CourseType,
    ) -> Result<Vec<RawCourse>, AppError>;
    async fn get_course(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<RawCourse, AppError>;

    async fn get_curriculum(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<CurriculumResponse, AppError>;
    /// Older deployments mounted the curriculum under /curriculum instead
    /// of /tcourse.
    async fn get_curriculum_legacy(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<CurriculumResponse, AppError>;

    async fn create_week(
        &self,
        course: &CourseRef,
        body: &CreateWeekBody,
    ) -> Result<RawWeek, AppError>;
    async fn update_week(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &UpdateWeekBody,
    ) -> Result<(), AppError>;
    async fn delete_week(&self, course: &CourseRef, week_id: &str) -> Result<(), AppError>;

    async fn create_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &CreateLessonBody,
    ) -> Result<RawLesson, AppError>;
    async fn update_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        lesson_id: &str,
        body: &CreateLessonBody,
    ) -> Result<(), AppError>;
    async fn delete_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        lesson_id: &str,
    ) -> Result<(), AppError>;

    async fn create_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &CreateSectionBody,
    ) -> Result<RawSection, AppError>;
    async fn update_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        section_id: &str,
        body: &CreateSectionBody,
    ) -> Result<(), AppError>;
    async fn delete_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        section_id: &str,
    ) -> Result<(), AppError>;

    async fn create_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &CreateLiveClassBody,
    ) -> Result<RawLiveClass, AppError>;
    async fn update_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        live_class_id: &str,
        body: &CreateLiveClassBody,
    ) -> Result<(), AppError>;
    async fn delete_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        live_class_id: &str,
    ) -> Result<(), AppError>;
}

pub struct LmsHttpClient {
    client: Client,
    config: LmsConfig,
}

impl LmsHttpClient {
    pub fn new(config: LmsConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn weeks_path(&self, course: &CourseRef) -> String {
        format!(
            "/tcourse/{}/{}/curriculum/weeks",
            course.course_type, course.course_id
        )
    }

    async fn read_response(&self, response: reqwest::Response) -> Result<String, AppError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 {
            let message = if body.is_empty() {
                "unauthorized".to_string()
            } else {
                body
            };
            return Err(AppError::Auth(message));
        }
        if !status.is_success() {
            return Err(AppError::Remote {
                status: Some(status.as_u16()),
                message: format!("LMS API error {}: {}", status, body),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .send()
            .await
            .map_err(|e| AppError::Remote {
                status: None,
                message: format!("GET {} failed: {}", path, e),
            })?;

        let body = self.read_response(response).await?;
        serde_json::from_str(&body).map_err(|e| AppError::Remote {
            status: None,
            message: format!("Failed to parse LMS response from {}: {}", path, e),
        })
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Remote {
                status: None,
                message: format!("POST {} failed: {}", path, e),
            })?;

        let body = self.read_response(response).await?;
        serde_json::from_str(&body).map_err(|e| AppError::Remote {
            status: None,
            message: format!("Failed to parse LMS response from {}: {}", path, e),
        })
    }

    async fn put_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Remote {
                status: None,
                message: format!("PUT {} failed: {}", path, e),
            })?;

        self.read_response(response).await.map(|_| ())
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .send()
            .await
            .map_err(|e| AppError::Remote {
                status: None,
                message: format!("DELETE {} failed: {}", path, e),
            })?;

        self.read_response(response).await.map(|_| ())
    }
}

#[async_trait]
impl LmsApi for LmsHttpClient {
    async fn list_courses(&self) -> Result<Vec<RawCourse>, AppError> {
        let response: CoursesResponse = self.get_json("/courses/get").await?;
        if !response.success {
            return Err(AppError::Remote {
                status: None,
                message: "bulk course listing returned success=false".to_string(),
            });
        }
        Ok(response.data)
    }

    async fn list_courses_of_type(
        &self,
        course_type: CourseType,
    ) -> Result<Vec<RawCourse>, AppError> {
        let response: CoursesResponse =
            self.get_json(&format!("/tcourse/{}", course_type)).await?;
        if !response.success {
            return Err(AppError::Remote {
                status: None,
                message: format!("{} course listing returned success=false", course_type),
            });
        }
        Ok(response.data)
    }

    async fn get_course(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<RawCourse, AppError> {
        let response: CourseResponse = self
            .get_json(&format!("/tcourse/{}/{}", course_type, course_id))
            .await?;
        match response.data {
            Some(raw) if response.success => Ok(raw),
            _ => Err(AppError::CourseNotFound(course_id.to_string())),
        }
    }

    async fn get_curriculum(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<CurriculumResponse, AppError> {
        self.get_json(&format!(
            "/tcourse/{}/{}/curriculum",
            course_type, course_id
        ))
        .await
    }

    async fn get_curriculum_legacy(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<CurriculumResponse, AppError> {
        self.get_json(&format!("/curriculum/{}/{}", course_type, course_id))
            .await
    }

    async fn create_week(
        &self,
        course: &CourseRef,
        body: &CreateWeekBody,
    ) -> Result<RawWeek, AppError> {
        let response: CreatedWeekResponse = self.post_json(&self.weeks_path(course), body).await?;
        Ok(response.week)
    }

    async fn update_week(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &UpdateWeekBody,
    ) -> Result<(), AppError> {
        self.put_json(&format!("{}/{}", self.weeks_path(course), week_id), body)
            .await
    }

    async fn delete_week(&self, course: &CourseRef, week_id: &str) -> Result<(), AppError> {
        self.delete(&format!("{}/{}", self.weeks_path(course), week_id))
            .await
    }

    async fn create_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &CreateLessonBody,
    ) -> Result<RawLesson, AppError> {
        let path = format!("{}/{}/lessons", self.weeks_path(course), week_id);
        let response: CreatedLessonResponse = self.post_json(&path, body).await?;
        Ok(response.lesson)
    }

    async fn update_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        lesson_id: &str,
        body: &CreateLessonBody,
    ) -> Result<(), AppError> {
        let path = format!(
            "{}/{}/lessons/{}",
            self.weeks_path(course),
            week_id,
            lesson_id
        );
        self.put_json(&path, body).await
    }

    async fn delete_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        lesson_id: &str,
    ) -> Result<(), AppError> {
        let path = format!(
            "{}/{}/lessons/{}",
            self.weeks_path(course),
            week_id,
            lesson_id
        );
        self.delete(&path).await
    }

    async fn create_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &CreateSectionBody,
    ) -> Result<RawSection, AppError> {
        let path = format!("{}/{}/sections", self.weeks_path(course), week_id);
        let response: CreatedSectionResponse = self.post_json(&path, body).await?;
        Ok(response.section)
    }

    async fn update_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        section_id: &str,
        body: &CreateSectionBody,
    ) -> Result<(), AppError> {
        let path = format!(
            "{}/{}/sections/{}",
            self.weeks_path(course),
            week_id,
            section_id
        );
        self.put_json(&path, body).await
    }

    async fn delete_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        section_id: &str,
    ) -> Result<(), AppError> {
        let path = format!(
            "{}/{}/sections/{}",
            self.weeks_path(course),
            week_id,
            section_id
        );
        self.delete(&path).await
    }

    async fn create_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        body: &CreateLiveClassBody,
    ) -> Result<RawLiveClass, AppError> {
        let path = format!("{}/{}/live-classes", self.weeks_path(course), week_id);
        let response: CreatedLiveClassResponse = self.post_json(&path, body).await?;
        Ok(response.live_class)
    }

    async fn update_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        live_class_id: &str,
        body: &CreateLiveClassBody,
    ) -> Result<(), AppError> {
        let path = format!(
            "{}/{}/live-classes/{}",
            self.weeks_path(course),
            week_id,
            live_class_id
        );
        self.put_json(&path, body).await
    }

    async fn delete_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        live_class_id: &str,
    ) -> Result<(), AppError> {
        let path = format!(
            "{}/{}/live-classes/{}",
            self.weeks_path(course),
            week_id,
            live_class_id
        );
        self.delete(&path).await
    }
}

/// Client that answers every read with nothing and accepts every write.
/// Useful for running the editor surface without a live remote.
pub struct NoopLmsClient;

#[async_trait]
impl LmsApi for NoopLmsClient {
    async fn list_courses(&self) -> Result<Vec<RawCourse>, AppError> {
        Ok(Vec::new())
    }

    async fn list_courses_of_type(
        &self,
        _course_type: CourseType,
    ) -> Result<Vec<RawCourse>, AppError> {
        Ok(Vec::new())
    }

    async fn get_course(
        &self,
        _course_type: CourseType,
        course_id: &str,
    ) -> Result<RawCourse, AppError> {
        Err(AppError::CourseNotFound(course_id.to_string()))
    }

    async fn get_curriculum(
        &self,
        _course_type: CourseType,
        _course_id: &str,
    ) -> Result<CurriculumResponse, AppError> {
        Ok(CurriculumResponse::default())
    }

    async fn get_curriculum_legacy(
        &self,
        _course_type: CourseType,
        _course_id: &str,
    ) -> Result<CurriculumResponse, AppError> {
        Ok(CurriculumResponse::default())
    }

    async fn create_week(
        &self,
        _course: &CourseRef,
        _body: &CreateWeekBody,
    ) -> Result<RawWeek, AppError> {
        Ok(RawWeek::default())
    }

    async fn update_week(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _body: &UpdateWeekBody,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_week(&self, _course: &CourseRef, _week_id: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_lesson(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _body: &CreateLessonBody,
    ) -> Result<RawLesson, AppError> {
        Ok(RawLesson::default())
    }

    async fn update_lesson(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _lesson_id: &str,
        _body: &CreateLessonBody,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_lesson(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _lesson_id: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_section(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _body: &CreateSectionBody,
    ) -> Result<RawSection, AppError> {
        Ok(RawSection::default())
    }

    async fn update_section(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _section_id: &str,
        _body: &CreateSectionBody,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_section(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _section_id: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_live_class(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _body: &CreateLiveClassBody,
    ) -> Result<RawLiveClass, AppError> {
        Ok(RawLiveClass::default())
    }

    async fn update_live_class(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _live_class_id: &str,
        _body: &CreateLiveClassBody,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_live_class(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _live_class_id: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }
}
