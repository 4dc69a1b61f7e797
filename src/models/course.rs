use serde::{Deserialize, Serialize};

/// Publication state of a course. Only `Active` courses appear in the
/// public catalog; the admin view sees all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CourseStatus {
    Active,
    Inactive,
    #[default]
    Draft,
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CourseStatus::Active => "Active",
            CourseStatus::Inactive => "Inactive",
            CourseStatus::Draft => "Draft",
        };
        f.write_str(s)
    }
}

/// A catalog item as the backend serves it. `id` is absent until the server
/// has persisted the course; the client never invents one. Timestamps are
/// carried opaquely and never interpreted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "name")]
    pub title: String,
    pub instructor: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub students: u32,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub owner_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Course {
    pub fn is_public(&self) -> bool {
        self.status == CourseStatus::Active
    }
}

/// Editable fields of the add/edit dialog. Student counts are not editable
/// there, so drafts carry none; the server defaults them to zero.
#[derive(Debug, Clone, Default)]
pub struct CourseDraft {
    pub title: String,
    pub instructor: String,
    pub category: String,
    pub price: f64,
    pub status: CourseStatus,
}

impl CourseDraft {
    /// Wire names of required fields that are empty or invalid, in form
    /// order. Price must be strictly positive on submission.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("name".to_string());
        }
        if self.instructor.trim().is_empty() {
            missing.push("instructor".to_string());
        }
        if self.category.trim().is_empty() {
            missing.push("category".to_string());
        }
        if self.price <= 0.0 {
            missing.push("price".to_string());
        }
        missing
    }

    /// Materializes the draft as a not-yet-persisted course owned by the
    /// given user.
    pub fn into_course(self, owner_id: i64) -> Course {
        Course {
            id: None,
            title: self.title,
            instructor: self.instructor,
            category: self.category,
            price: self.price,
            students: 0,
            status: self.status,
            owner_id,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Aggregates for the admin dashboard stat cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_courses: usize,
    pub active_courses: usize,
    pub total_students: u64,
    pub total_revenue: f64,
}
