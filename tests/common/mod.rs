#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use backend::error::AppError;
use backend::lms::LmsApi;
use backend::lms::dto::{
    CreateLessonBody, CreateLiveClassBody, CreateSectionBody, CreateWeekBody, CurriculumData,
    CurriculumResponse, RawCourse, RawLesson, RawLiveClass, RawSection, RawWeek, UpdateWeekBody,
};
use backend::models::{CourseRef, CourseType};

/// How the scripted remote reacts to a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteBehavior {
    #[default]
    Succeed,
    FailServer,
    FailAuth,
    FailWeekNotFound,
}

impl RemoteBehavior {
    fn error(self) -> AppError {
        match self {
            RemoteBehavior::Succeed => unreachable!("Succeed has no error"),
            RemoteBehavior::FailServer => AppError::Remote {
                status: Some(500),
                message: "LMS API error 500: internal server error".to_string(),
            },
            RemoteBehavior::FailAuth => AppError::Remote {
                status: Some(401),
                message: "LMS API error 401: unauthorized".to_string(),
            },
            RemoteBehavior::FailWeekNotFound => AppError::Remote {
                status: Some(404),
                message: "LMS API error 404: Week not found".to_string(),
            },
        }
    }
}

/// Scripted remote store. Responses are configured up front; every call is
/// recorded so tests can assert on attempt counts and ordering.
#[derive(Default)]
pub struct MockLms {
    pub bulk_courses: Option<Vec<RawCourse>>,
    pub typed_listings: HashMap<CourseType, Vec<RawCourse>>,
    pub direct_courses: HashMap<(CourseType, String), RawCourse>,
    pub curricula: HashMap<(CourseType, String), Vec<RawWeek>>,
    pub legacy_curricula: HashMap<(CourseType, String), Vec<RawWeek>>,
    pub week_behavior: RemoteBehavior,
    pub created_week_id: Option<String>,
    pub lesson_behavior: RemoteBehavior,
    pub created_lesson_id: Option<String>,
    pub section_behavior: RemoteBehavior,
    pub created_section_id: Option<String>,
    pub live_class_behavior: RemoteBehavior,
    pub created_live_class_id: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockLms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bulk(mut self, courses: Vec<RawCourse>) -> Self {
        self.bulk_courses = Some(courses);
        self
    }

    pub fn with_typed_listing(mut self, course_type: CourseType, courses: Vec<RawCourse>) -> Self {
        self.typed_listings.insert(course_type, courses);
        self
    }

    pub fn with_direct_course(
        mut self,
        course_type: CourseType,
        course_id: &str,
        course: RawCourse,
    ) -> Self {
        self.direct_courses
            .insert((course_type, course_id.to_string()), course);
        self
    }

    pub fn with_curriculum(
        mut self,
        course_type: CourseType,
        course_id: &str,
        weeks: Vec<RawWeek>,
    ) -> Self {
        self.curricula
            .insert((course_type, course_id.to_string()), weeks);
        self
    }

    pub fn with_legacy_curriculum(
        mut self,
        course_type: CourseType,
        course_id: &str,
        weeks: Vec<RawWeek>,
    ) -> Self {
        self.legacy_curricula
            .insert((course_type, course_id.to_string()), weeks);
        self
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == name)
            .count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn curriculum_response(weeks: &[RawWeek]) -> CurriculumResponse {
        CurriculumResponse {
            success: true,
            data: CurriculumData {
                curriculum: weeks.to_vec(),
                total_weeks: Some(weeks.len() as u32),
            },
        }
    }
}

#[async_trait]
impl LmsApi for MockLms {
    async fn list_courses(&self) -> Result<Vec<RawCourse>, AppError> {
        self.record("list_courses");
        match &self.bulk_courses {
            Some(courses) => Ok(courses.clone()),
            None => Err(AppError::Remote {
                status: Some(503),
                message: "LMS API error 503: listing unavailable".to_string(),
            }),
        }
    }

    async fn list_courses_of_type(
        &self,
        course_type: CourseType,
    ) -> Result<Vec<RawCourse>, AppError> {
        self.record("list_courses_of_type");
        match self.typed_listings.get(&course_type) {
            Some(courses) => Ok(courses.clone()),
            None => Err(AppError::Remote {
                status: Some(500),
                message: format!("LMS API error 500: {} listing unavailable", course_type),
            }),
        }
    }

    async fn get_course(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<RawCourse, AppError> {
        self.record("get_course");
        self.direct_courses
            .get(&(course_type, course_id.to_string()))
            .cloned()
            .ok_or_else(|| AppError::CourseNotFound(course_id.to_string()))
    }

    async fn get_curriculum(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<CurriculumResponse, AppError> {
        self.record("get_curriculum");
        match self.curricula.get(&(course_type, course_id.to_string())) {
            Some(weeks) => Ok(Self::curriculum_response(weeks)),
            None => Err(AppError::Remote {
                status: Some(404),
                message: "LMS API error 404: curriculum unavailable".to_string(),
            }),
        }
    }

    async fn get_curriculum_legacy(
        &self,
        course_type: CourseType,
        course_id: &str,
    ) -> Result<CurriculumResponse, AppError> {
        self.record("get_curriculum_legacy");
        match self
            .legacy_curricula
            .get(&(course_type, course_id.to_string()))
        {
            Some(weeks) => Ok(Self::curriculum_response(weeks)),
            None => Err(AppError::Remote {
                status: Some(404),
                message: "LMS API error 404: curriculum unavailable".to_string(),
            }),
        }
    }

    async fn create_week(
        &self,
        _course: &CourseRef,
        body: &CreateWeekBody,
    ) -> Result<RawWeek, AppError> {
        self.record("create_week");
        match self.week_behavior {
            RemoteBehavior::Succeed => Ok(RawWeek {
                id: self.created_week_id.clone(),
                week_title: Some(body.week_title.clone()),
                week_description: Some(body.week_description.clone()),
                order: Some(body.order),
                ..RawWeek::default()
            }),
            behavior => Err(behavior.error()),
        }
    }

    async fn update_week(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _body: &UpdateWeekBody,
    ) -> Result<(), AppError> {
        self.record("update_week");
        match self.week_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }

    async fn delete_week(&self, _course: &CourseRef, _week_id: &str) -> Result<(), AppError> {
        self.record("delete_week");
        match self.week_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }

    async fn create_lesson(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        body: &CreateLessonBody,
    ) -> Result<RawLesson, AppError> {
        self.record("create_lesson");
        match self.lesson_behavior {
            RemoteBehavior::Succeed => Ok(RawLesson {
                id: self.created_lesson_id.clone(),
                title: Some(body.title.clone()),
                order: Some(body.order),
                ..RawLesson::default()
            }),
            behavior => Err(behavior.error()),
        }
    }

    async fn update_lesson(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _lesson_id: &str,
        _body: &CreateLessonBody,
    ) -> Result<(), AppError> {
        self.record("update_lesson");
        match self.lesson_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }

    async fn delete_lesson(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _lesson_id: &str,
    ) -> Result<(), AppError> {
        self.record("delete_lesson");
        match self.lesson_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }

    async fn create_section(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        body: &CreateSectionBody,
    ) -> Result<RawSection, AppError> {
        self.record("create_section");
        match self.section_behavior {
            RemoteBehavior::Succeed => Ok(RawSection {
                id: self.created_section_id.clone(),
                title: Some(body.title.clone()),
                order: Some(body.order),
                ..RawSection::default()
            }),
            behavior => Err(behavior.error()),
        }
    }

    async fn update_section(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _section_id: &str,
        _body: &CreateSectionBody,
    ) -> Result<(), AppError> {
        self.record("update_section");
        match self.section_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }

    async fn delete_section(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _section_id: &str,
    ) -> Result<(), AppError> {
        self.record("delete_section");
        match self.section_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }

    async fn create_live_class(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        body: &CreateLiveClassBody,
    ) -> Result<RawLiveClass, AppError> {
        self.record("create_live_class");
        match self.live_class_behavior {
            RemoteBehavior::Succeed => Ok(RawLiveClass {
                id: self.created_live_class_id.clone(),
                title: Some(body.title.clone()),
                scheduled_at: Some(body.scheduled_at.clone()),
                duration_minutes: Some(body.duration_minutes),
                ..RawLiveClass::default()
            }),
            behavior => Err(behavior.error()),
        }
    }

    async fn update_live_class(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _live_class_id: &str,
        _body: &CreateLiveClassBody,
    ) -> Result<(), AppError> {
        self.record("update_live_class");
        match self.live_class_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }

    async fn delete_live_class(
        &self,
        _course: &CourseRef,
        _week_id: &str,
        _live_class_id: &str,
    ) -> Result<(), AppError> {
        self.record("delete_live_class");
        match self.live_class_behavior {
            RemoteBehavior::Succeed => Ok(()),
            behavior => Err(behavior.error()),
        }
    }
}

/// A raw remote week with just an id and a display title, the shape most
/// production records take.
pub fn raw_week(id: &str, title: &str) -> RawWeek {
    RawWeek {
        id: Some(id.to_string()),
        week_title: Some(title.to_string()),
        ..RawWeek::default()
    }
}

pub fn raw_course(id: &str, course_type: Option<&str>) -> RawCourse {
    RawCourse {
        id: Some(id.to_string()),
        course_type: course_type.map(|value| value.to_string()),
        course_title: Some(format!("Course {}", id)),
        ..RawCourse::default()
    }
}
