use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Teacher,
}

/// A scheduled live class; creating or rescheduling one triggers the
/// notification fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveClass {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub users: Vec<Uuid>,
    pub teacher: Uuid,
}

/// One per-recipient notification row. The batch id correlates every row
/// spawned by a single live-class event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_type: UserType,
    pub title: String,
    pub message: String,
    pub live_class_id: Uuid,
    pub batch_id: Uuid,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn for_student(live_class: &LiveClass, user_id: Uuid, batch_id: Uuid) -> Self {
        Self::build(
            user_id,
            UserType::Student,
            format!("New Live Class Scheduled: {}", live_class.title),
            format!(
                "Join the live class \"{}\" on {}.",
                live_class.title, live_class.start_time
            ),
            live_class,
            batch_id,
        )
    }

    pub fn for_teacher(live_class: &LiveClass, batch_id: Uuid) -> Self {
        Self::build(
            live_class.teacher,
            UserType::Teacher,
            format!("Your Live Class Scheduled: {}", live_class.title),
            format!(
                "You have a live class \"{}\" scheduled on {}.",
                live_class.title, live_class.start_time
            ),
            live_class,
            batch_id,
        )
    }

    fn build(
        user_id: Uuid,
        user_type: UserType,
        title: String,
        message: String,
        live_class: &LiveClass,
        batch_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            user_type,
            title,
            message,
            live_class_id: live_class.id,
            batch_id,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn mark_read(&mut self) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(Utc::now());
        }
    }
}

/// A single push message addressed to one device token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub live_class_id: Uuid,
    pub batch_id: Uuid,
}

impl PushMessage {
    pub fn for_live_class(token: String, live_class: &LiveClass, batch_id: Uuid) -> Self {
        Self {
            token,
            title: format!("Live Class: {}", live_class.title),
            body: format!(
                "A live class \"{}\" is scheduled for {}",
                live_class.title, live_class.start_time
            ),
            live_class_id: live_class.id,
            batch_id,
        }
    }
}

/// Per-message outcome reported by the push gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The gateway reported the token invalid or unregistered; it must be
    /// scrubbed from the directories.
    InvalidToken,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_class() -> LiveClass {
        LiveClass {
            id: Uuid::new_v4(),
            title: "Raga Yaman Basics".to_string(),
            start_time: Utc::now(),
            users: vec![Uuid::new_v4()],
            teacher: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_student_and_teacher_titles_differ() {
        let lc = live_class();
        let batch = Uuid::new_v4();
        let student = Notification::for_student(&lc, lc.users[0], batch);
        let teacher = Notification::for_teacher(&lc, batch);

        assert!(student.title.starts_with("New Live Class Scheduled:"));
        assert!(teacher.title.starts_with("Your Live Class Scheduled:"));
        assert_eq!(student.batch_id, batch);
        assert_eq!(teacher.user_id, lc.teacher);
        assert_eq!(teacher.user_type, UserType::Teacher);
    }

    #[test]
    fn test_mark_read_sets_timestamp_once() {
        let lc = live_class();
        let mut n = Notification::for_student(&lc, lc.users[0], Uuid::new_v4());
        assert!(!n.is_read);
        n.mark_read();
        let first = n.read_at;
        assert!(n.is_read);
        assert!(first.is_some());
        n.mark_read();
        assert_eq!(n.read_at, first);
    }
}
