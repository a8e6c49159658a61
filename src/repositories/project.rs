// src/repositories/project.rs
use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::CrudRepository;
use crate::error::ApiResult;
use crate::models::{CreateProjectRequest, Project, UpdateProjectRequest};

pub struct ProjectRepository;

#[async_trait]
impl CrudRepository<Project, CreateProjectRequest, UpdateProjectRequest> for ProjectRepository {
    fn table_name(&self) -> &'static str {
        "projects"
    }

    fn entity_name(&self) -> &'static str {
        "Project"
    }

    fn search_fields(&self) -> Vec<&'static str> {
        vec!["name", "location", "manager"]
    }

    fn default_order(&self) -> &'static str {
        "start_date DESC, id ASC"
    }

    async fn create(&self, pool: &SqlitePool, data: CreateProjectRequest) -> ApiResult<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: data.name.trim().to_string(),
            location: data.location.trim().to_string(),
            manager: data.manager.trim().to_string(),
            start_date: data.start_date,
            active: data.active,
        };

        sqlx::query(
            "INSERT INTO projects (id, name, location, manager, start_date, active) VALUES (?, ?, ?, ?, ?, ?)",
        )
            .bind(&project.id)
            .bind(&project.name)
            .bind(&project.location)
            .bind(&project.manager)
            .bind(project.start_date)
            .bind(project.active)
            .execute(pool)
            .await?;

        Ok(project)
    }

    async fn update(&self, pool: &SqlitePool, id: &str, data: UpdateProjectRequest) -> ApiResult<Project> {
        let mut project = self.find(pool, id).await?;
        data.apply_to(&mut project);

        sqlx::query(
            "UPDATE projects SET name = ?, location = ?, manager = ?, start_date = ?, active = ? WHERE id = ?",
        )
            .bind(&project.name)
            .bind(&project.location)
            .bind(&project.manager)
            .bind(project.start_date)
            .bind(project.active)
            .bind(&project.id)
            .execute(pool)
            .await?;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::NaiveDate;

    #[actix_rt::test]
    async fn test_project_deactivate() {
        let pool = test_pool().await;
        let created = ProjectRepository
            .create(&pool, CreateProjectRequest {
                name: "Pipeline survey".into(),
                location: "Sukkur".into(),
                manager: "F. Ali".into(),
                start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                active: true,
            })
            .await
            .unwrap();

        let updated = ProjectRepository
            .update(&pool, &created.id, UpdateProjectRequest { active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(!updated.active);
        assert!(!ProjectRepository.find(&pool, &created.id).await.unwrap().active);
    }
}
