//! Data model for the remote course service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-issued course identifier.
pub type CourseId = i64;

/// Server-issued lesson identifier.
pub type LessonId = i64;

/// Errors that can occur talking to the course service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A course as stored by the remote service.
///
/// `display_order` is the user-chosen position in the course list; it is only
/// ever mutated through the reorder coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub all_lessons_completed: bool,
}

/// A curriculum entry: the stable `path` correlates an index slot with its
/// generated lesson artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRef {
    pub title: String,
    pub path: String,
}

/// One module of a curriculum: a title plus an ordered run of lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    pub title: String,
    pub lessons: Vec<LessonRef>,
}

/// The ordered module/lesson outline of a course.
///
/// Immutable once fetched; paths are guaranteed unique within one index
/// (duplicates are rejected at construction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CourseModule>", into = "Vec<CourseModule>")]
pub struct CurriculumIndex {
    modules: Vec<CourseModule>,
}

impl CurriculumIndex {
    /// Build an index, rejecting duplicate lesson paths.
    pub fn from_modules(modules: Vec<CourseModule>) -> Result<Self, ServiceError> {
        let mut seen = std::collections::HashSet::new();
        for module in &modules {
            for lesson in &module.lessons {
                if !seen.insert(lesson.path.as_str()) {
                    return Err(ServiceError::InvalidResponse(format!(
                        "duplicate lesson path in curriculum index: {}",
                        lesson.path
                    )));
                }
            }
        }
        Ok(Self { modules })
    }

    /// Parse the raw `index_json` payload the service stores per course.
    pub fn from_json(raw: &str) -> Result<Self, ServiceError> {
        let modules: Vec<CourseModule> = serde_json::from_str(raw)
            .map_err(|e| ServiceError::InvalidResponse(format!("malformed index: {e}")))?;
        Self::from_modules(modules)
    }

    pub fn modules(&self) -> &[CourseModule] {
        &self.modules
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.lesson_refs().any(|l| l.path == path)
    }

    pub fn find(&self, path: &str) -> Option<&LessonRef> {
        self.lesson_refs().find(|l| l.path == path)
    }

    /// All lessons in curriculum order.
    pub fn lesson_refs(&self) -> impl Iterator<Item = &LessonRef> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }
}

impl TryFrom<Vec<CourseModule>> for CurriculumIndex {
    type Error = ServiceError;

    fn try_from(modules: Vec<CourseModule>) -> Result<Self, Self::Error> {
        Self::from_modules(modules)
    }
}

impl From<CurriculumIndex> for Vec<CourseModule> {
    fn from(index: CurriculumIndex) -> Self {
        index.modules
    }
}

/// A course together with its parsed curriculum index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOverview {
    pub course: Course,
    pub index: CurriculumIndex,
}

/// A generated lesson artifact.
///
/// `pdf_path` is the derived artifact reference: absent at creation and set
/// exactly once by the service after the content exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub course_id: CourseId,
    pub title: String,
    pub path_in_index: String,
    pub content_markdown: String,
    #[serde(default)]
    pub user_notes: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub pdf_path: Option<String>,
}

/// Field update for a lesson. Absent fields keep their current value;
/// engine callers always send `is_completed` explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLessonRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

/// Response to a bulk-generation start request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BulkStart {
    /// Number of lessons the service will generate. Zero means nothing to do.
    pub to_generate: u32,
}

/// One failed lesson inside a bulk run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub path: String,
    pub message: String,
}

/// Coarse-grained status of a server-side bulk generation run.
///
/// `completed + failed` is monotonically non-decreasing while `in_progress`
/// holds; once `in_progress` turns false the status is terminal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchGenerationStatus {
    pub total: u32,
    pub completed: u32,
    pub failed: u32,
    pub in_progress: bool,
    #[serde(default)]
    pub errors: Vec<GenerationFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_module_index() -> Vec<CourseModule> {
        vec![
            CourseModule {
                title: "Basics".to_string(),
                lessons: vec![
                    LessonRef {
                        title: "Intro".to_string(),
                        path: "m1/l1".to_string(),
                    },
                    LessonRef {
                        title: "Setup".to_string(),
                        path: "m1/l2".to_string(),
                    },
                ],
            },
            CourseModule {
                title: "Advanced".to_string(),
                lessons: vec![LessonRef {
                    title: "Deep dive".to_string(),
                    path: "m2/l1".to_string(),
                }],
            },
        ]
    }

    #[test]
    fn test_index_lesson_count_and_lookup() {
        let index = CurriculumIndex::from_modules(two_module_index()).unwrap();
        assert_eq!(index.lesson_count(), 3);
        assert!(index.contains_path("m2/l1"));
        assert!(!index.contains_path("m2/l2"));
        assert_eq!(index.find("m1/l2").unwrap().title, "Setup");
    }

    #[test]
    fn test_index_rejects_duplicate_paths() {
        let mut modules = two_module_index();
        modules[1].lessons.push(LessonRef {
            title: "Dup".to_string(),
            path: "m1/l1".to_string(),
        });
        let err = CurriculumIndex::from_modules(modules).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[test]
    fn test_index_from_json() {
        let raw = r#"[{"title":"M","lessons":[{"title":"L","path":"m/l"}]}]"#;
        let index = CurriculumIndex::from_json(raw).unwrap();
        assert_eq!(index.lesson_count(), 1);
    }

    #[test]
    fn test_index_deserialize_enforces_invariant() {
        let raw = r#"[{"title":"M","lessons":[
            {"title":"A","path":"m/l"},
            {"title":"B","path":"m/l"}
        ]}]"#;
        assert!(CurriculumIndex::from_json(raw).is_err());
    }

    #[test]
    fn test_lesson_serialization_defaults() {
        let json = r##"{
            "id": 7,
            "course_id": 1,
            "title": "Intro",
            "path_in_index": "m1/l1",
            "content_markdown": "# Intro"
        }"##;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert!(!lesson.is_completed);
        assert!(lesson.pdf_path.is_none());
        assert!(lesson.user_notes.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::NotFound("lesson 42".to_string());
        assert_eq!(err.to_string(), "Not found: lesson 42");
        assert_eq!(ServiceError::Timeout.to_string(), "Request timeout");
    }
}
