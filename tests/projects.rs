#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{add_member, bearer, create_project, create_task, seed_user, send, send_json, test_state, uuid_of};
use uptask::store::Store;

#[actix_rt::test]
async fn test_create_and_list_projects() {
    let (store, state) = test_state();
    let app = test_app!(state);
    let (manager, jwt) = seed_user(&store, "Manager", "manager@x.com").await;
    let (_, outsider_jwt) = seed_user(&store, "Outsider", "outsider@x.com").await;

    let project = create_project(&app, &jwt, "  Shop  ").await;
    assert_eq!(project["projectName"], "Shop");
    assert_eq!(project["manager"], manager.id.to_string());
    assert_eq!(project["team"], json!([]));

    let req = test::TestRequest::get()
        .uri("/api/projects")
        .insert_header(bearer(&jwt))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/projects")
        .insert_header(bearer(&outsider_jwt))
        .to_request();
    let (_, body) = send_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_project_validation_and_auth() {
    let (store, state) = test_state();
    let app = test_app!(state);
    let (_, jwt) = seed_user(&store, "Manager", "manager@x.com").await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&jwt))
        .set_json(json!({"projectName": "", "clientName": "c", "description": "d"}))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Project name is required");

    let req = test::TestRequest::get().uri("/api/projects").to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/projects/not-a-uuid")
        .insert_header(bearer(&jwt))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&jwt))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Project not found"}));
}

#[actix_rt::test]
async fn test_project_visibility_and_management() {
    let (store, state) = test_state();
    let app = test_app!(state);
    let (_, manager_jwt) = seed_user(&store, "Manager", "manager@x.com").await;
    let (member, member_jwt) = seed_user(&store, "Member", "member@x.com").await;
    let (_, outsider_jwt) = seed_user(&store, "Outsider", "outsider@x.com").await;

    let project_id = uuid_of(&create_project(&app, &manager_jwt, "Shop").await);
    create_task(&app, &manager_jwt, project_id, "First").await;
    assert_eq!(add_member(&app, &manager_jwt, project_id, member.id).await, StatusCode::OK);

    let uri = format!("/api/projects/{}", project_id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&outsider_jwt))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&member_jwt))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["team"], json!([member.id.to_string()]));

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&member_jwt))
        .set_json(json!({"projectName": "Mine", "clientName": "c", "description": "d"}))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid action"}));

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&member_jwt))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);
    assert!(store.find_project(project_id).await.unwrap().is_some());

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&manager_jwt))
        .set_json(json!({"projectName": "Shop v2", "clientName": "c", "description": "d"}))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projectName"], "Shop v2");
}

#[actix_rt::test]
async fn test_delete_project_cascades() {
    let (store, state) = test_state();
    let app = test_app!(state);
    let (_, jwt) = seed_user(&store, "Manager", "manager@x.com").await;

    let project_id = uuid_of(&create_project(&app, &jwt, "Shop").await);
    let task_id = uuid_of(&create_task(&app, &jwt, project_id, "First").await);
    create_task(&app, &jwt, project_id, "Second").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/projects/{}/tasks/{}/notes", project_id, task_id))
        .insert_header(bearer(&jwt))
        .set_json(json!({"content": "remember"}))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::CREATED);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", project_id))
        .insert_header(bearer(&jwt))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NO_CONTENT);

    assert!(store.find_project(project_id).await.unwrap().is_none());
    assert!(store.tasks_for_project(project_id).await.unwrap().is_empty());
    assert!(store.notes_for_task(task_id).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_team_management() {
    let (store, state) = test_state();
    let app = test_app!(state);
    let (manager, manager_jwt) = seed_user(&store, "Manager", "manager@x.com").await;
    let (member, member_jwt) = seed_user(&store, "Member", "member@x.com").await;

    let project_id = uuid_of(&create_project(&app, &manager_jwt, "Shop").await);

    let req = test::TestRequest::post()
        .uri(&format!("/api/projects/{}/team/find", project_id))
        .insert_header(bearer(&manager_jwt))
        .set_json(json!({"email": "MEMBER@x.com"}))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], member.id.to_string());
    assert!(body.get("password").is_none());

    let req = test::TestRequest::post()
        .uri(&format!("/api/projects/{}/team/find", project_id))
        .insert_header(bearer(&manager_jwt))
        .set_json(json!({"email": "nobody@x.com"}))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);

    assert_eq!(
        add_member(&app, &manager_jwt, project_id, uuid::Uuid::new_v4()).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(add_member(&app, &manager_jwt, project_id, member.id).await, StatusCode::OK);
    assert_eq!(
        add_member(&app, &manager_jwt, project_id, member.id).await,
        StatusCode::CONFLICT
    );
    assert_eq!(
        add_member(&app, &manager_jwt, project_id, manager.id).await,
        StatusCode::CONFLICT
    );
    // Members cannot invite
    assert_eq!(
        add_member(&app, &member_jwt, project_id, manager.id).await,
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}/team", project_id))
        .insert_header(bearer(&member_jwt))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["email"], "member@x.com");

    let remove_uri = format!("/api/projects/{}/team/{}", project_id, member.id);
    let req = test::TestRequest::delete()
        .uri(&remove_uri)
        .insert_header(bearer(&manager_jwt))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&remove_uri)
        .insert_header(bearer(&manager_jwt))
        .to_request();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "The user is not part of the project"}));

    let project = store.find_project(project_id).await.unwrap().unwrap();
    assert!(project.team.is_empty());
}
