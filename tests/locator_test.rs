mod common;

use std::sync::Arc;

use tokio::sync::RwLock;

use backend::error::AppError;
use backend::lms::dto::{RawCourse, infer_course_type};
use backend::models::CourseType;
use backend::services::CourseLocator;
use backend::store::CourseCache;
use common::{MockLms, raw_course};

fn locator(lms: Arc<MockLms>) -> (CourseLocator, Arc<RwLock<CourseCache>>) {
    let cache = Arc::new(RwLock::new(CourseCache::default()));
    (CourseLocator::new(lms, cache.clone()), cache)
}

#[tokio::test]
async fn bulk_listing_is_loaded_once_and_searched_from_cache() {
    let lms = Arc::new(MockLms::new().with_bulk(vec![
        raw_course("c1", Some("blended")),
        raw_course("c2", Some("live")),
    ]));
    let (locator, _cache) = locator(lms.clone());

    let first = locator.locate("c2").await.expect("locate failed");
    assert_eq!(first.course_type, CourseType::Live);

    let second = locator.locate("c1").await.expect("locate failed");
    assert_eq!(second.course_type, CourseType::Blended);

    assert_eq!(lms.call_count("list_courses"), 1);
    assert_eq!(lms.call_count("get_course"), 0);
}

#[tokio::test]
async fn partial_per_type_fallback_is_a_summary_not_an_error() {
    // Bulk endpoint down; blended and free listings answer, live fails.
    let lms = Arc::new(
        MockLms::new()
            .with_typed_listing(CourseType::Blended, vec![raw_course("c1", None)])
            .with_typed_listing(CourseType::Free, vec![raw_course("c2", None)]),
    );
    let (locator, cache) = locator(lms.clone());

    let summary = locator.load_all().await.expect("load_all failed");
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.failed_types, vec![CourseType::Live]);

    let cache = cache.read().await;
    assert_eq!(cache.courses().len(), 2);
    assert_eq!(cache.find("c1").unwrap().course_type, CourseType::Blended);
    assert_eq!(cache.find("c2").unwrap().course_type, CourseType::Free);
}

#[tokio::test]
async fn unlisted_course_resolves_through_direct_typed_lookup() {
    let lms = Arc::new(
        MockLms::new()
            .with_bulk(Vec::new())
            .with_direct_course(CourseType::Live, "hidden", raw_course("hidden", None)),
    );
    let (locator, _cache) = locator(lms.clone());

    let course = locator.locate("hidden").await.expect("locate failed");
    assert_eq!(course.course_type, CourseType::Live);
    // blended missed first, live hit, free never tried
    assert_eq!(lms.call_count("get_course"), 2);

    // The direct hit is cached for the next locate.
    let again = locator.locate("hidden").await.expect("locate failed");
    assert_eq!(again.id, "hidden");
    assert_eq!(lms.call_count("get_course"), 2);
}

#[tokio::test]
async fn exhausted_lookups_surface_course_not_found() {
    let lms = Arc::new(MockLms::new().with_bulk(Vec::new()));
    let (locator, _cache) = locator(lms.clone());

    let err = locator.locate("ghost").await.unwrap_err();
    assert!(matches!(err, AppError::CourseNotFound(_)));
    assert_eq!(lms.call_count("get_course"), 3);
}

#[tokio::test]
async fn course_type_inference_is_deterministic() {
    let explicit = RawCourse {
        course_type: Some("free".to_string()),
        ..RawCourse::default()
    };
    assert_eq!(infer_course_type(&explicit), CourseType::Free);

    let category = RawCourse {
        category_type: Some("Live".to_string()),
        ..RawCourse::default()
    };
    assert_eq!(infer_course_type(&category), CourseType::Live);

    let zero_fee = RawCourse {
        course_fee: Some(0.0),
        ..RawCourse::default()
    };
    assert_eq!(infer_course_type(&zero_fee), CourseType::Free);

    let paid = RawCourse {
        course_fee: Some(199.0),
        ..RawCourse::default()
    };
    assert_eq!(infer_course_type(&paid), CourseType::Blended);

    let no_signal = RawCourse::default();
    assert_eq!(infer_course_type(&no_signal), CourseType::Blended);

    // The explicit field wins over everything else.
    let conflicting = RawCourse {
        course_type: Some("blended".to_string()),
        category_type: Some("Live".to_string()),
        course_fee: Some(0.0),
        ..RawCourse::default()
    };
    assert_eq!(infer_course_type(&conflicting), CourseType::Blended);
}

#[tokio::test]
async fn records_without_an_id_are_dropped_during_normalization() {
    let lms = Arc::new(MockLms::new().with_bulk(vec![
        raw_course("c1", Some("blended")),
        RawCourse::default(),
    ]));
    let (locator, cache) = locator(lms);

    let summary = locator.load_all().await.expect("load_all failed");
    assert_eq!(summary.loaded, 1);
    assert_eq!(cache.read().await.courses().len(), 1);
}
