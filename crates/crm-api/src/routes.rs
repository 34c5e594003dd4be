//! API routes

use axum::{
    routing::{get, post, put},
    Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{clients, follow_ups, leads, users, work_time};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .nest("/leads", leads_router())
        .nest("/clients", clients_router())
        .route(
            "/lead-follow-ups/:id",
            put(follow_ups::update_lead_follow_up).delete(follow_ups::delete_lead_follow_up),
        )
        .route(
            "/client-follow-ups/:id",
            put(follow_ups::update_client_follow_up).delete(follow_ups::delete_client_follow_up),
        )
        .nest("/users", users_router())
        .nest("/work-time", work_time_router())
}

fn leads_router() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list_leads).post(leads::create_lead))
        .route(
            "/:id",
            get(leads::get_lead)
                .put(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route(
            "/:id/follow-ups",
            get(follow_ups::list_lead_follow_ups).post(follow_ups::create_lead_follow_up),
        )
}

fn clients_router() -> Router<AppState> {
    Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route(
            "/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/:id/follow-ups",
            get(follow_ups::list_client_follow_ups).post(follow_ups::create_client_follow_up),
        )
        .route(
            "/:id/lead-follow-ups",
            get(follow_ups::list_client_lead_follow_ups),
        )
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/me", get(users::current_user))
        .route(
            "/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/:id/password", put(users::change_password))
}

fn work_time_router() -> Router<AppState> {
    Router::new()
        .route("/events", post(work_time::record_event))
        .route("/members/:user_id", get(work_time::member_summary))
}

async fn api_root() -> axum::Json<ApiRoot> {
    axum::Json(ApiRoot {
        name: "CRM RS",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ApiRoot {
    name: &'static str,
    version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use crm_auth::MemoryIdentityProvider;
    use crm_db::UserStore;
    use crm_models::access::{AccessLevel, ModulePermissions};
    use crm_models::modules::LEADS;
    use crm_models::role::Role;
    use crm_models::user::UserAccount;
    use crm_services::{ServiceSettings, Services, Stores};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    const HEADER: &str = "x-user-id";

    struct TestApp {
        router: Router,
        admin: Uuid,
        staff: Uuid,
    }

    async fn app() -> TestApp {
        let stores = Stores::memory();
        let mut admin = UserAccount::new(Uuid::new_v4(), "admin@example.com", Some(Role::Admin));
        admin.full_name = Some("Priya Nair".to_string());
        let mut staff = UserAccount::new(Uuid::new_v4(), "staff@example.com", Some(Role::Staff));
        staff.module_permissions = ModulePermissions::new().with(LEADS, AccessLevel::Read);
        stores.users.insert(&admin).await.unwrap();
        stores.users.insert(&staff).await.unwrap();

        let services = Services::new(
            stores,
            Arc::new(MemoryIdentityProvider::new()),
            ServiceSettings::default(),
        );
        TestApp {
            router: router().with_state(AppState::new(services, HEADER)),
            admin: admin.id,
            staff: staff.id,
        }
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user {
            builder = builder.header(HEADER, id.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn lead_body(name: &str) -> Value {
        json!({ "name": name, "phone": "555-0100", "status": "new" })
    }

    #[tokio::test]
    async fn test_anonymous_request_is_unauthenticated() {
        let app = app().await;
        let (status, body) = send(&app.router, "GET", "/api/leads", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "You must be logged in to view leads");
    }

    #[tokio::test]
    async fn test_unknown_account_rejected() {
        let app = app().await;
        let (status, body) =
            send(&app.router, "GET", "/api/leads", Some(Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unknown or inactive account");
    }

    #[tokio::test]
    async fn test_create_and_list_leads() {
        let app = app().await;
        let (status, created) = send(
            &app.router,
            "POST",
            "/api/leads",
            Some(app.admin),
            Some(lead_body("Asha")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Asha");

        let (status, page) = send(&app.router, "GET", "/api/leads", Some(app.staff), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["totalCount"], 1);
        assert_eq!(page["data"][0]["name"], "Asha");
    }

    #[tokio::test]
    async fn test_missing_lead_fields_unprocessable() {
        let app = app().await;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/leads",
            Some(app.admin),
            Some(json!({ "name": "", "phone": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn test_read_only_grant_cannot_create() {
        let app = app().await;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/leads",
            Some(app.staff),
            Some(lead_body("Asha")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "You do not have permission to create a lead");
    }

    #[tokio::test]
    async fn test_lead_follow_up_sets_next_date() {
        let app = app().await;
        let (_, lead) = send(
            &app.router,
            "POST",
            "/api/leads",
            Some(app.admin),
            Some(lead_body("Asha")),
        )
        .await;
        let lead_id = lead["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app.router,
            "POST",
            &format!("/api/leads/{lead_id}/follow-ups"),
            Some(app.admin),
            Some(json!({ "note": "Call back", "follow_up_date": "2024-05-02" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, lead) = send(
            &app.router,
            "GET",
            &format!("/api/leads/{lead_id}"),
            Some(app.admin),
            None,
        )
        .await;
        assert_eq!(lead["follow_up_date"], "2024-05-02");

        let (status, history) = send(
            &app.router,
            "GET",
            &format!("/api/leads/{lead_id}/follow-ups"),
            Some(app.staff),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["created_by_name"], "Priya Nair");
    }

    #[tokio::test]
    async fn test_current_user() {
        let app = app().await;
        let (status, body) = send(&app.router, "GET", "/api/users/me", Some(app.staff), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "staff@example.com");

        let (status, _) = send(&app.router, "GET", "/api/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_creates_user() {
        let app = app().await;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/users",
            Some(app.admin),
            Some(json!({
                "email": "new@example.com",
                "password": "secret123",
                "full_name": "New Person",
                "role": "staff",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "new@example.com");

        let (status, _) = send(&app.router, "GET", "/api/users", Some(app.staff), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_work_time_roundtrip() {
        let app = app().await;
        for (event_type, at) in [
            ("start", "2024-03-10T09:00:00Z"),
            ("end", "2024-03-10T11:30:00Z"),
        ] {
            let (status, _) = send(
                &app.router,
                "POST",
                "/api/work-time/events",
                Some(app.admin),
                Some(json!({ "event_type": event_type, "occurred_at": at })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, summary) = send(
            &app.router,
            "GET",
            &format!("/api/work-time/members/{}", app.admin),
            Some(app.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_seconds"], 9000);
        assert_eq!(summary["day_breakdown"][0]["date"], "2024-03-10");
    }
}
