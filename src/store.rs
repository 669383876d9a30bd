//! In-memory state the editing surface renders from. All writes flow
//! through the mutation coordinator; nothing else touches these trees.

use serde::Serialize;

use crate::models::{Course, CourseRef, CurriculumWeek};

/// The canonical week list for the currently loaded course.
#[derive(Debug, Default)]
pub struct CurriculumStore {
    course: Option<CourseRef>,
    weeks: Vec<CurriculumWeek>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurriculumTotals {
    pub total_weeks: usize,
    pub total_lessons: usize,
}

#[derive(Debug, Serialize)]
pub struct CurriculumSnapshot {
    pub course: Option<CourseRef>,
    pub weeks: Vec<CurriculumWeek>,
    pub totals: CurriculumTotals,
}

impl CurriculumStore {
    pub fn load(&mut self, course: CourseRef, weeks: Vec<CurriculumWeek>) {
        self.course = Some(course);
        self.weeks = weeks;
    }

    pub fn course(&self) -> Option<&CourseRef> {
        self.course.as_ref()
    }

    pub fn weeks(&self) -> &[CurriculumWeek] {
        &self.weeks
    }

    pub fn week(&self, week_id: &str) -> Option<&CurriculumWeek> {
        self.weeks.iter().find(|week| week.id == week_id)
    }

    pub fn week_mut(&mut self, week_id: &str) -> Option<&mut CurriculumWeek> {
        self.weeks.iter_mut().find(|week| week.id == week_id)
    }

    pub fn push_week(&mut self, week: CurriculumWeek) {
        self.weeks.push(week);
    }

    pub fn remove_week(&mut self, week_id: &str) -> bool {
        let before = self.weeks.len();
        self.weeks.retain(|week| week.id != week_id);
        self.weeks.len() != before
    }

    /// Rewrite a week's identifier after reconciliation settled its remote
    /// address. Children stay attached; only the id changes.
    pub fn remap_week_id(&mut self, old_id: &str, new_id: &str) -> bool {
        match self.week_mut(old_id) {
            Some(week) => {
                week.id = new_id.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace the week list with a fresh remote fetch, keeping the course.
    pub fn replace_weeks(&mut self, weeks: Vec<CurriculumWeek>) {
        self.weeks = weeks;
    }

    pub fn next_week_order(&self) -> u32 {
        self.weeks.len() as u32 + 1
    }

    pub fn totals(&self) -> CurriculumTotals {
        CurriculumTotals {
            total_weeks: self.weeks.len(),
            total_lessons: self.weeks.iter().map(|week| week.lessons.len()).sum(),
        }
    }

    pub fn snapshot(&self) -> CurriculumSnapshot {
        CurriculumSnapshot {
            course: self.course.clone(),
            weeks: self.weeks.clone(),
            totals: self.totals(),
        }
    }
}

/// Bulk course listing cache searched by the locator before any per-type
/// lookup goes out.
#[derive(Debug, Default)]
pub struct CourseCache {
    courses: Vec<Course>,
    loaded: bool,
}

impl CourseCache {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn find(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == course_id)
    }

    pub fn fill(&mut self, courses: Vec<Course>) {
        self.courses = courses;
        self.loaded = true;
    }

    /// Cache a course found through a direct lookup so repeat locates hit.
    pub fn insert(&mut self, course: Course) {
        if self.find(&course.id).is_none() {
            self.courses.push(course);
        }
    }
}
