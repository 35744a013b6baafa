use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentInput {
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_input_validation() {
        let valid = CommentInput {
            task_id: Uuid::new_v4(),
            content: "Looks good".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = CommentInput {
            task_id: Uuid::new_v4(),
            content: String::new(),
        };
        assert!(empty.validate().is_err());
    }
}
