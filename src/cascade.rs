//! Deletion of projects and tasks together with everything that hangs off them.
//!
//! Children are removed before their parent: notes, then tasks, then the project.

use uuid::Uuid;

use crate::store::{Store, StoreResult};

/// Deletes the notes of every task of the project, then its tasks, then the project, as
/// one unit of work.
pub async fn delete_project(store: &dyn Store, project_id: Uuid) -> StoreResult<()> {
    let (removed, notes) = store.delete_project(project_id).await?;
    log::info!(
        "Deleted project {} with {} tasks and {} notes",
        project_id,
        removed,
        notes
    );
    Ok(())
}

/// Deletes the task's notes, then the task.
pub async fn delete_task(store: &dyn Store, task_id: Uuid) -> StoreResult<()> {
    let notes = store.delete_task(task_id).await?;
    log::debug!("Deleted task {} with {} notes", task_id, notes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Note, NoteInput, Project, ProjectInput, Task, TaskInput};
    use crate::store::InMemoryStore;

    async fn seed_task(store: &InMemoryStore, project_id: Uuid, author: Uuid) -> (Task, Note) {
        let task = Task::new(
            TaskInput {
                name: "n".into(),
                description: "d".into(),
            },
            project_id,
        );
        store.insert_task(&task).await.unwrap();
        let note = Note::new(
            NoteInput {
                content: "c".into(),
            },
            task.id,
            author,
        );
        store.insert_note(&note).await.unwrap();
        (task, note)
    }

    fn project(manager: Uuid) -> Project {
        Project::new(
            ProjectInput {
                project_name: "p".into(),
                client_name: "c".into(),
                description: "d".into(),
            },
            manager,
        )
    }

    #[test_log::test(actix_rt::test)]
    async fn test_delete_project_removes_tasks_and_notes() {
        let store = InMemoryStore::new();
        let manager = Uuid::new_v4();
        let doomed = project(manager);
        let kept = project(manager);
        store.insert_project(&doomed).await.unwrap();
        store.insert_project(&kept).await.unwrap();

        let (task_a, note_a) = seed_task(&store, doomed.id, manager).await;
        let (task_b, note_b) = seed_task(&store, doomed.id, manager).await;
        let (kept_task, kept_note) = seed_task(&store, kept.id, manager).await;

        delete_project(&store, doomed.id).await.unwrap();

        assert!(store.find_project(doomed.id).await.unwrap().is_none());
        for id in [task_a.id, task_b.id] {
            assert!(store.find_task(id).await.unwrap().is_none());
        }
        for id in [note_a.id, note_b.id] {
            assert!(store.find_note(id).await.unwrap().is_none());
        }
        assert!(store.find_task(kept_task.id).await.unwrap().is_some());
        assert!(store.find_note(kept_note.id).await.unwrap().is_some());
    }

    #[test_log::test(actix_rt::test)]
    async fn test_delete_task_removes_only_its_notes() {
        let store = InMemoryStore::new();
        let project_id = Uuid::new_v4();
        let author = Uuid::new_v4();
        let (task, note) = seed_task(&store, project_id, author).await;
        let (other_task, other_note) = seed_task(&store, project_id, author).await;

        delete_task(&store, task.id).await.unwrap();

        assert!(store.find_task(task.id).await.unwrap().is_none());
        assert!(store.find_note(note.id).await.unwrap().is_none());
        assert!(store.find_task(other_task.id).await.unwrap().is_some());
        assert!(store.find_note(other_note.id).await.unwrap().is_some());
    }
}
