use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::task::Task;

/// Input for creating or updating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub project_name: String,
    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,
    #[validate(length(min = 1, message = "Project description is required"))]
    pub description: String,
}

/// A project. `manager` is the owner and never changes; `team` holds the other members.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub project_name: String,
    pub client_name: String,
    pub description: String,
    pub manager: Uuid,
    pub team: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(input: ProjectInput, manager: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_name: input.project_name.trim().to_string(),
            client_name: input.client_name.trim().to_string(),
            description: input.description.trim().to_string(),
            manager,
            team: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: ProjectInput) {
        self.project_name = input.project_name.trim().to_string();
        self.client_name = input.client_name.trim().to_string();
        self.description = input.description.trim().to_string();
        self.updated_at = Utc::now();
    }

    pub fn is_manager(&self, user_id: Uuid) -> bool {
        self.manager == user_id
    }

    /// Manager or team member; the read scope of a project.
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.is_manager(user_id) || self.team.contains(&user_id)
    }
}

/// A project with its tasks in creation order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> ProjectInput {
        ProjectInput {
            project_name: name.to_string(),
            client_name: "Client".to_string(),
            description: "Description".to_string(),
        }
    }

    #[test]
    fn test_project_validation() {
        assert!(input("Website").validate().is_ok());
        assert!(input("").validate().is_err());
    }

    #[test]
    fn test_membership() {
        let manager = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut project = Project::new(input(" Website "), manager);
        project.team.push(member);

        assert_eq!(project.project_name, "Website");
        assert!(project.is_manager(manager));
        assert!(!project.is_manager(member));
        assert!(project.is_member(member));
        assert!(!project.is_member(Uuid::new_v4()));
    }

    #[test]
    fn test_serializes_camel_case() {
        let project = Project::new(input("Website"), Uuid::new_v4());
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["projectName"], "Website");
        assert_eq!(json["clientName"], "Client");
        assert!(json["team"].as_array().unwrap().is_empty());
    }
}
