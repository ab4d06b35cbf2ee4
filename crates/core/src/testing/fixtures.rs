//! Shared test fixtures.

use chrono::Utc;

use crate::api::{Course, CourseId, CourseModule, CurriculumIndex, Lesson, LessonId, LessonRef};

pub fn course(id: CourseId, title: &str) -> Course {
    Course {
        id,
        title: title.to_string(),
        created_at: Utc::now(),
        display_order: 0,
        all_lessons_completed: false,
    }
}

pub fn lesson_ref(title: &str, path: &str) -> LessonRef {
    LessonRef {
        title: title.to_string(),
        path: path.to_string(),
    }
}

/// Two modules, five lessons: m1/l1..l3 and m2/l1..l2.
pub fn sample_index() -> CurriculumIndex {
    CurriculumIndex::from_modules(vec![
        CourseModule {
            title: "Foundations".to_string(),
            lessons: vec![
                lesson_ref("Introduction", "m1/l1"),
                lesson_ref("Core concepts", "m1/l2"),
                lesson_ref("First steps", "m1/l3"),
            ],
        },
        CourseModule {
            title: "Applications".to_string(),
            lessons: vec![
                lesson_ref("Case study", "m2/l1"),
                lesson_ref("Wrap up", "m2/l2"),
            ],
        },
    ])
    .unwrap()
}

pub fn lesson(id: LessonId, course_id: CourseId, path: &str, completed: bool) -> Lesson {
    Lesson {
        id,
        course_id,
        title: format!("Lesson {path}"),
        path_in_index: path.to_string(),
        content_markdown: format!("# Lesson {path}"),
        user_notes: None,
        is_completed: completed,
        pdf_path: None,
    }
}
