use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{
    BatchGenerationStatus, BulkStart, Course, CourseId, CourseModule, CourseOverview,
    CourseService, CurriculumIndex, Lesson, LessonId, LessonRef, ServiceError,
    UpdateLessonRequest,
};

#[derive(Default)]
struct MockState {
    courses: Vec<Course>,
    indexes: HashMap<CourseId, CurriculumIndex>,
    lessons: HashMap<LessonId, Lesson>,
    next_course_id: CourseId,
    next_lesson_id: LessonId,
    calls: Vec<String>,
    errors: HashMap<String, VecDeque<ServiceError>>,
    reorder_payloads: Vec<Vec<CourseId>>,
    status_script: VecDeque<BatchGenerationStatus>,
    bulk_baseline: HashMap<CourseId, usize>,
    derived_ready: HashMap<LessonId, (u32, String)>,
}

/// Mock course service with scriptable failures and bulk status sequences.
///
/// Every operation is recorded by name. `push_error` queues an error for the
/// next call of a given operation; `push_status` scripts the sequence of
/// bulk-status responses, and popping a status materializes the lessons it
/// claims were completed so tracker rebuilds observe them.
pub struct MockCourseService {
    state: Mutex<MockState>,
}

impl Default for MockCourseService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCourseService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_course_id: 1,
                next_lesson_id: 1,
                ..MockState::default()
            }),
        }
    }

    /// Add a course with a curriculum index. Returns the stored course.
    pub fn add_course_with_index(&self, title: &str, index: CurriculumIndex) -> Course {
        let mut state = self.state.lock().unwrap();
        let id = state.next_course_id;
        state.next_course_id += 1;
        let course = Course {
            id,
            title: title.to_string(),
            created_at: Utc::now(),
            display_order: (state.courses.len()) as i64,
            all_lessons_completed: false,
        };
        state.courses.push(course.clone());
        state.indexes.insert(id, index);
        course
    }

    /// Materialize a lesson artifact for an index path.
    pub fn add_lesson(&self, course_id: CourseId, path: &str, completed: bool) -> Lesson {
        let mut state = self.state.lock().unwrap();
        Self::create_lesson(&mut state, course_id, path, completed)
    }

    /// Queue an error for the next call of `op`.
    pub fn push_error(&self, op: &str, error: ServiceError) {
        let mut state = self.state.lock().unwrap();
        state
            .errors
            .entry(op.to_string())
            .or_default()
            .push_back(error);
    }

    /// Append a bulk status response to the script.
    pub fn push_status(&self, status: BatchGenerationStatus) {
        self.state.lock().unwrap().status_script.push_back(status);
    }

    /// Make `get_lesson` report a derived artifact after `polls` more calls.
    pub fn set_derived_ready_after(&self, lesson_id: LessonId, polls: u32, path: &str) {
        self.state
            .lock()
            .unwrap()
            .derived_ready
            .insert(lesson_id, (polls, path.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == op)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn reorder_payloads(&self) -> Vec<Vec<CourseId>> {
        self.state.lock().unwrap().reorder_payloads.clone()
    }

    pub fn lesson_by_path(&self, course_id: CourseId, path: &str) -> Option<Lesson> {
        self.state
            .lock()
            .unwrap()
            .lessons
            .values()
            .find(|l| l.course_id == course_id && l.path_in_index == path)
            .cloned()
    }

    fn begin(&self, op: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op.to_string());
        if let Some(queue) = state.errors.get_mut(op) {
            if let Some(error) = queue.pop_front() {
                return Err(error);
            }
        }
        Ok(())
    }

    fn create_lesson(
        state: &mut MockState,
        course_id: CourseId,
        path: &str,
        completed: bool,
    ) -> Lesson {
        let title = state
            .indexes
            .get(&course_id)
            .and_then(|i| i.find(path))
            .map(|l| l.title.clone())
            .unwrap_or_else(|| path.to_string());
        let id = state.next_lesson_id;
        state.next_lesson_id += 1;
        let lesson = Lesson {
            id,
            course_id,
            title: title.clone(),
            path_in_index: path.to_string(),
            content_markdown: format!("# {title}\n\nGenerated content."),
            user_notes: None,
            is_completed: completed,
            pdf_path: None,
        };
        state.lessons.insert(id, lesson.clone());
        lesson
    }

    fn generated_count(state: &MockState, course_id: CourseId) -> usize {
        state
            .lessons
            .values()
            .filter(|l| l.course_id == course_id)
            .count()
    }

    /// Create the artifacts a popped bulk status claims exist, skipping paths
    /// the status reports as failed.
    fn sync_to_status(state: &mut MockState, course_id: CourseId, status: &BatchGenerationStatus) {
        let baseline = state.bulk_baseline.get(&course_id).copied().unwrap_or(0);
        let desired = baseline + status.completed as usize;
        let failed_paths: HashSet<String> =
            status.errors.iter().map(|e| e.path.clone()).collect();
        let Some(index) = state.indexes.get(&course_id).cloned() else {
            return;
        };
        for lesson_ref in index.lesson_refs() {
            if Self::generated_count(state, course_id) >= desired {
                break;
            }
            if failed_paths.contains(&lesson_ref.path) {
                continue;
            }
            let exists = state
                .lessons
                .values()
                .any(|l| l.course_id == course_id && l.path_in_index == lesson_ref.path);
            if !exists {
                Self::create_lesson(state, course_id, &lesson_ref.path, false);
            }
        }
    }
}

#[async_trait]
impl CourseService for MockCourseService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_course(&self, course_id: CourseId) -> Result<CourseOverview, ServiceError> {
        self.begin("fetch_course")?;
        let state = self.state.lock().unwrap();
        let course = state
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("course {course_id}")))?;
        let index = state
            .indexes
            .get(&course_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("index for course {course_id}")))?;
        Ok(CourseOverview { course, index })
    }

    async fn list_lessons(&self, course_id: CourseId) -> Result<Vec<Lesson>, ServiceError> {
        self.begin("list_lessons")?;
        let state = self.state.lock().unwrap();
        let mut lessons: Vec<Lesson> = state
            .lessons
            .values()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.id);
        Ok(lessons)
    }

    async fn generate_lesson(
        &self,
        course_id: CourseId,
        lesson: &LessonRef,
    ) -> Result<Lesson, ServiceError> {
        self.begin("generate_lesson")?;
        let mut state = self.state.lock().unwrap();
        if !state.courses.iter().any(|c| c.id == course_id) {
            return Err(ServiceError::NotFound(format!("course {course_id}")));
        }
        // Idempotent per (course, path).
        if let Some(existing) = state
            .lessons
            .values()
            .find(|l| l.course_id == course_id && l.path_in_index == lesson.path)
            .cloned()
        {
            return Ok(existing);
        }
        Ok(Self::create_lesson(&mut state, course_id, &lesson.path, false))
    }

    async fn get_lesson(&self, lesson_id: LessonId) -> Result<Lesson, ServiceError> {
        self.begin("get_lesson")?;
        let mut state = self.state.lock().unwrap();
        if let Some((remaining, path)) = state.derived_ready.get(&lesson_id).cloned() {
            if remaining <= 1 {
                state.derived_ready.remove(&lesson_id);
                if let Some(lesson) = state.lessons.get_mut(&lesson_id) {
                    lesson.pdf_path = Some(path);
                }
            } else {
                state.derived_ready.insert(lesson_id, (remaining - 1, path));
            }
        }
        state
            .lessons
            .get(&lesson_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("lesson {lesson_id}")))
    }

    async fn update_lesson(
        &self,
        lesson_id: LessonId,
        update: UpdateLessonRequest,
    ) -> Result<Lesson, ServiceError> {
        self.begin("update_lesson")?;
        let mut state = self.state.lock().unwrap();
        let lesson = state
            .lessons
            .get_mut(&lesson_id)
            .ok_or_else(|| ServiceError::NotFound(format!("lesson {lesson_id}")))?;
        if let Some(notes) = update.user_notes {
            lesson.user_notes = Some(notes);
        }
        if let Some(completed) = update.is_completed {
            lesson.is_completed = completed;
        }
        Ok(lesson.clone())
    }

    async fn regenerate_lesson(
        &self,
        lesson_id: LessonId,
        feedback: &str,
    ) -> Result<Lesson, ServiceError> {
        self.begin("regenerate_lesson")?;
        let mut state = self.state.lock().unwrap();
        let lesson = state
            .lessons
            .get_mut(&lesson_id)
            .ok_or_else(|| ServiceError::NotFound(format!("lesson {lesson_id}")))?;
        lesson.content_markdown = format!(
            "# {}\n\nRevised content (feedback: {feedback}).",
            lesson.title
        );
        // A fresh derived artifact has to be produced for the new content.
        lesson.pdf_path = None;
        Ok(lesson.clone())
    }

    async fn start_bulk_generation(&self, course_id: CourseId) -> Result<BulkStart, ServiceError> {
        self.begin("start_bulk_generation")?;
        let mut state = self.state.lock().unwrap();
        let index = state
            .indexes
            .get(&course_id)
            .ok_or_else(|| ServiceError::NotFound(format!("course {course_id}")))?;
        let total = index.lesson_count();
        let generated = Self::generated_count(&state, course_id);
        state.bulk_baseline.insert(course_id, generated);
        Ok(BulkStart {
            to_generate: total.saturating_sub(generated) as u32,
        })
    }

    async fn bulk_generation_status(
        &self,
        course_id: CourseId,
    ) -> Result<BatchGenerationStatus, ServiceError> {
        self.begin("bulk_generation_status")?;
        let mut state = self.state.lock().unwrap();
        let status = state
            .status_script
            .pop_front()
            .unwrap_or_else(BatchGenerationStatus::default);
        Self::sync_to_status(&mut state, course_id, &status);
        Ok(status)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, ServiceError> {
        self.begin("list_courses")?;
        Ok(self.state.lock().unwrap().courses.clone())
    }

    async fn create_course(&self, topic: &str, _language: &str) -> Result<Course, ServiceError> {
        self.begin("create_course")?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_course_id;
        state.next_course_id += 1;
        let course = Course {
            id,
            title: topic.to_string(),
            created_at: Utc::now(),
            display_order: state.courses.len() as i64,
            all_lessons_completed: false,
        };
        state.courses.push(course.clone());
        let empty = CurriculumIndex::from_modules(Vec::<CourseModule>::new())
            .expect("empty index is valid");
        state.indexes.insert(id, empty);
        Ok(course)
    }

    async fn reorder_courses(&self, order: &[CourseId]) -> Result<(), ServiceError> {
        self.begin("reorder_courses")?;
        let mut state = self.state.lock().unwrap();
        state.reorder_payloads.push(order.to_vec());
        state.courses.sort_by_key(|c| {
            order
                .iter()
                .position(|&id| id == c.id)
                .unwrap_or(usize::MAX)
        });
        for (idx, course) in state.courses.iter_mut().enumerate() {
            course.display_order = idx as i64;
        }
        Ok(())
    }

    async fn rename_course(
        &self,
        course_id: CourseId,
        title: &str,
    ) -> Result<Course, ServiceError> {
        self.begin("rename_course")?;
        let mut state = self.state.lock().unwrap();
        let course = state
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| ServiceError::NotFound(format!("course {course_id}")))?;
        course.title = title.to_string();
        Ok(course.clone())
    }

    async fn delete_course(&self, course_id: CourseId) -> Result<(), ServiceError> {
        self.begin("delete_course")?;
        let mut state = self.state.lock().unwrap();
        if !state.courses.iter().any(|c| c.id == course_id) {
            return Err(ServiceError::NotFound(format!("course {course_id}")));
        }
        state.courses.retain(|c| c.id != course_id);
        state.indexes.remove(&course_id);
        state.lessons.retain(|_, l| l.course_id != course_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_generate_is_idempotent_per_path() {
        let service = MockCourseService::new();
        let course = service.add_course_with_index("Rust", fixtures::sample_index());
        let lesson_ref = fixtures::lesson_ref("Introduction", "m1/l1");

        let first = service.generate_lesson(course.id, &lesson_ref).await.unwrap();
        let second = service.generate_lesson(course.id, &lesson_ref).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(service.call_count("generate_lesson"), 2);
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let service = MockCourseService::new();
        let course = service.add_course_with_index("Rust", fixtures::sample_index());
        service.push_error("list_lessons", ServiceError::Timeout);

        assert!(service.list_lessons(course.id).await.is_err());
        assert!(service.list_lessons(course.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_status_pop_materializes_lessons() {
        let service = MockCourseService::new();
        let course = service.add_course_with_index("Rust", fixtures::sample_index());
        service.push_status(BatchGenerationStatus {
            total: 5,
            completed: 2,
            failed: 0,
            in_progress: true,
            errors: vec![],
        });

        service.start_bulk_generation(course.id).await.unwrap();
        service.bulk_generation_status(course.id).await.unwrap();
        let lessons = service.list_lessons(course.id).await.unwrap();
        assert_eq!(lessons.len(), 2);
    }
}
