use axum::Json;
use axum::extract::Path;
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::error::AppError;
use crate::models::*;
use crate::services::{
    CourseLoadSummary, CourseLocator, CurriculumFetcher, MutationCoordinator, MutationOutcome,
};
use crate::state::AppState;
use crate::store::CurriculumSnapshot;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
        .route("/courses/{id}/curriculum/load", post(load_curriculum))
        .route("/curriculum", get(get_curriculum))
        .route("/curriculum/weeks", post(add_week))
        .route("/curriculum/weeks/{week_id}", put(update_week).delete(delete_week))
        .route("/curriculum/weeks/{week_id}/lessons", post(add_lesson))
        .route(
            "/curriculum/weeks/{week_id}/lessons/{lesson_id}",
            put(update_lesson).delete(delete_lesson),
        )
        .route("/curriculum/weeks/{week_id}/sections", post(add_section))
        .route(
            "/curriculum/weeks/{week_id}/sections/{section_id}",
            put(update_section).delete(delete_section),
        )
        .route(
            "/curriculum/weeks/{week_id}/live-classes",
            post(add_live_class),
        )
        .route(
            "/curriculum/weeks/{week_id}/live-classes/{live_class_id}",
            put(update_live_class).delete(delete_live_class),
        )
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
struct CourseListResponse {
    courses: Vec<Course>,
    summary: CourseLoadSummary,
}

async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<CourseListResponse>, AppError> {
    let locator = CourseLocator::new(state.lms.clone(), state.courses.clone());
    let summary = if state.courses.read().await.is_loaded() {
        CourseLoadSummary {
            loaded: state.courses.read().await.courses().len(),
            failed_types: Vec::new(),
        }
    } else {
        locator.load_all().await?
    };

    let courses = state.courses.read().await.courses().to_vec();
    Ok(Json(CourseListResponse { courses, summary }))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let locator = CourseLocator::new(state.lms.clone(), state.courses.clone());
    let course = locator.locate(&id).await?;
    Ok(Json(course))
}

async fn load_curriculum(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CurriculumSnapshot>, AppError> {
    let locator = CourseLocator::new(state.lms.clone(), state.courses.clone());
    let course = locator.locate(&id).await?;
    let course_ref = CourseRef::from(&course);

    let fetcher = CurriculumFetcher::new(state.lms.clone());
    let weeks = fetcher.fetch(&course_ref).await?;

    let mut store = state.curriculum.write().await;
    store.load(course_ref, weeks);
    Ok(Json(store.snapshot()))
}

async fn get_curriculum(
    State(state): State<AppState>,
) -> Result<Json<CurriculumSnapshot>, AppError> {
    Ok(Json(state.curriculum.read().await.snapshot()))
}

/// Mutation routes address the course the store was loaded for.
async fn loaded_course(state: &AppState) -> Result<CourseRef, AppError> {
    state
        .curriculum
        .read()
        .await
        .course()
        .cloned()
        .ok_or_else(|| AppError::BadRequest("no course loaded".to_string()))
}

async fn add_week(
    State(state): State<AppState>,
    Json(req): Json<NewWeekRequest>,
) -> Result<Json<MutationOutcome<CurriculumWeek>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(coordinator.add_week(&course, req).await?))
}

async fn update_week(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
    Json(req): Json<UpdateWeekRequest>,
) -> Result<Json<MutationOutcome<CurriculumWeek>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(coordinator.update_week(&course, &week_id, req).await?))
}

async fn delete_week(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
) -> Result<Json<MutationOutcome<String>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(coordinator.delete_week(&course, &week_id).await?))
}

async fn add_lesson(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
    Json(req): Json<NewLessonRequest>,
) -> Result<Json<MutationOutcome<Lesson>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(coordinator.add_lesson(&course, &week_id, req).await?))
}

async fn update_lesson(
    State(state): State<AppState>,
    Path((week_id, lesson_id)): Path<(String, String)>,
    Json(req): Json<UpdateLessonRequest>,
) -> Result<Json<MutationOutcome<Lesson>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(
        coordinator
            .update_lesson(&course, &week_id, &lesson_id, req)
            .await?,
    ))
}

async fn delete_lesson(
    State(state): State<AppState>,
    Path((week_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<MutationOutcome<String>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(
        coordinator
            .delete_lesson(&course, &week_id, &lesson_id)
            .await?,
    ))
}

async fn add_section(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
    Json(req): Json<NewSectionRequest>,
) -> Result<Json<MutationOutcome<Section>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(coordinator.add_section(&course, &week_id, req).await?))
}

async fn update_section(
    State(state): State<AppState>,
    Path((week_id, section_id)): Path<(String, String)>,
    Json(req): Json<UpdateSectionRequest>,
) -> Result<Json<MutationOutcome<Section>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(
        coordinator
            .update_section(&course, &week_id, &section_id, req)
            .await?,
    ))
}

async fn delete_section(
    State(state): State<AppState>,
    Path((week_id, section_id)): Path<(String, String)>,
) -> Result<Json<MutationOutcome<String>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(
        coordinator
            .delete_section(&course, &week_id, &section_id)
            .await?,
    ))
}

async fn add_live_class(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
    Json(req): Json<NewLiveClassRequest>,
) -> Result<Json<MutationOutcome<LiveClass>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(
        coordinator.add_live_class(&course, &week_id, req).await?,
    ))
}

async fn update_live_class(
    State(state): State<AppState>,
    Path((week_id, live_class_id)): Path<(String, String)>,
    Json(req): Json<UpdateLiveClassRequest>,
) -> Result<Json<MutationOutcome<LiveClass>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(
        coordinator
            .update_live_class(&course, &week_id, &live_class_id, req)
            .await?,
    ))
}

async fn delete_live_class(
    State(state): State<AppState>,
    Path((week_id, live_class_id)): Path<(String, String)>,
) -> Result<Json<MutationOutcome<String>>, AppError> {
    let course = loaded_course(&state).await?;
    let coordinator = MutationCoordinator::new(state.lms.clone(), state.curriculum.clone());
    Ok(Json(
        coordinator
            .delete_live_class(&course, &week_id, &live_class_id)
            .await?,
    ))
}
