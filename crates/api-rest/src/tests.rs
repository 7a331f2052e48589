//! End-to-end tests driving the full router in memory.

use crate::{router, AppState};
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use clinic_core::{CoreConfig, DocumentStore, GoogleTokenVerifier};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "router-test-secret-0123456789";
const GOOGLE_CLIENT_ID: &str = "clinic-web-client";
const GOOGLE_KEY_PEM: &str = include_str!("../../core/test-data/google_test_key.pem");
const GOOGLE_JWKS: &str = include_str!("../../core/test-data/google_test_jwks.json");

fn google_verifier() -> GoogleTokenVerifier {
    let keys: JwkSet = serde_json::from_str(GOOGLE_JWKS).expect("test key set should parse");
    GoogleTokenVerifier::with_keys(GOOGLE_CLIENT_ID, keys)
}

fn google_id_token(aud: &str, sub: &str, email: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("test-key-1".into());
    let claims = json!({
        "sub": sub,
        "aud": aud,
        "iss": "https://accounts.google.com",
        "exp": chrono::Utc::now().timestamp() + 600,
        "email": email,
        "email_verified": true,
        "picture": "https://example.com/a.png",
    });
    let key = EncodingKey::from_rsa_pem(GOOGLE_KEY_PEM.as_bytes()).expect("test key should load");
    jsonwebtoken::encode(&header, &claims, &key).expect("token should sign")
}

struct TestApp {
    app: Router,
    state: AppState,
    _temp_dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_state(|state| state)
    }

    fn with_state(customise: impl FnOnce(AppState) -> AppState) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = Arc::new(
            CoreConfig::new(temp_dir.path().to_path_buf(), SECRET.into(), None)
                .expect("config should be valid")
                .with_bcrypt_cost(4),
        );
        let store = Arc::new(DocumentStore::open(temp_dir.path()).expect("store should open"));
        let state = customise(AppState::new(cfg, store));
        Self {
            app: router(state.clone()),
            state,
            _temp_dir: temp_dir,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, json)
    }

    async fn admin_token(&self) -> String {
        self.state
            .admins
            .create("root", "rootpass1", "Root Admin")
            .expect("admin should be created");
        let (status, body) = self
            .send(
                "POST",
                "/auth/loginAdmin",
                None,
                Some(json!({"username": "root", "password": "rootpass1"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }

    async fn create_clinic(&self, admin: &str, unique_name: &str, owner: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/clinics/create",
            Some(admin),
            Some(json!({
                "displayName": "City Clinic",
                "uniqueName": unique_name,
                "ownerUserName": owner,
                "ownerDisplayName": "J Doe",
                "ownerPassword": "password123",
                "plan": "starter"
            })),
        )
        .await
    }

    async fn staff_token(&self, user_name: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/clinics/login",
                None,
                Some(json!({"userName": user_name, "password": "password123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }

    async fn patient_token(&self, phone: &str) -> (String, Value) {
        let (status, body) = self
            .send(
                "POST",
                "/patients/auth/phone",
                None,
                Some(json!({"phone": phone})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let token = body["data"]["token"].as_str().expect("token").to_string();
        (token, body["data"].clone())
    }

    /// Clinic with one branch, one doctor and one service; returns (staff token, clinic id, service id).
    async fn bookable_clinic(&self) -> (String, String, String) {
        let admin = self.admin_token().await;
        let (status, clinic) = self.create_clinic(&admin, "city-clinic", "jdoe").await;
        assert_eq!(status, StatusCode::CREATED, "{clinic}");
        let clinic_id = clinic["data"]["_id"].as_str().expect("id").to_string();
        let staff = self.staff_token("jdoe").await;

        let (status, branch) = self
            .send(
                "POST",
                "/clinics/my-clinic/branches",
                Some(&staff),
                Some(json!({"name": "Main", "address": "1 Main St", "location": {"lat": 41.3, "lng": 69.2}})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{branch}");
        let branch_id = branch["data"]["_id"].as_str().expect("id").to_string();

        let (status, service) = self
            .send(
                "POST",
                "/clinics/my-clinic/services",
                Some(&staff),
                Some(json!({
                    "name": "Consultation",
                    "durationMinutes": 30,
                    "price": 100.0,
                    "branchIds": [branch_id]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{service}");
        let service_id = service["data"]["_id"].as_str().expect("id").to_string();
        (staff, clinic_id, service_id)
    }
}

#[tokio::test]
async fn test_health_is_wrapped_in_envelope() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["ok"], json!(true));
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_create_clinic_returns_starter_limits() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app.create_clinic(&admin, "city-clinic", "jdoe").await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(
        body["data"]["plan"]["limits"],
        json!({"maxBranches": 1, "maxServices": 5, "maxAdmins": 1})
    );
    assert_eq!(body["data"]["owners"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_duplicate_unique_name_is_conflict() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (status, _) = app.create_clinic(&admin, "city-clinic", "jdoe").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.create_clinic(&admin, "city-clinic", "other").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("CONFLICT"));
}

#[tokio::test]
async fn test_doctor_with_foreign_branch_is_not_found() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.create_clinic(&admin, "city-clinic", "jdoe").await;
    app.create_clinic(&admin, "other-clinic", "asmith").await;
    let staff = app.staff_token("jdoe").await;
    let other_staff = app.staff_token("asmith").await;

    let (status, _) = app
        .send(
            "POST",
            "/clinics/my-clinic/branches",
            Some(&staff),
            Some(json!({"name": "Main", "address": "1 Main St", "location": {"lat": 1.0, "lng": 2.0}})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, foreign) = app
        .send(
            "POST",
            "/clinics/my-clinic/branches",
            Some(&other_staff),
            Some(json!({"name": "Elsewhere", "address": "9 Side St", "location": {"lat": 1.0, "lng": 2.0}})),
        )
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/clinics/my-clinic/doctors",
            Some(&staff),
            Some(json!({
                "fullName": "Dr. Who",
                "username": "drwho",
                "password": "doctorpass",
                "branchId": foreign["data"]["_id"]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_phone_auth_is_idempotent_until_profile_completed() {
    let app = TestApp::new();

    let (_, first) = app.patient_token("+998901234567").await;
    let (token, second) = app.patient_token("+998901234567").await;

    assert_eq!(first["principal"]["_id"], second["principal"]["_id"]);
    assert_eq!(second["needsProfile"], json!(true));

    let (status, body) = app
        .send(
            "POST",
            "/patients/me/complete",
            Some(&token),
            Some(json!({"fullName": "Ali Valiyev"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, third) = app.patient_token("+998901234567").await;
    assert_eq!(third["needsProfile"], json!(false));
    assert_eq!(third["principal"]["_id"], first["principal"]["_id"]);
}

#[tokio::test]
async fn test_patient_cancels_booking_once() {
    let app = TestApp::new();
    let (_, clinic_id, service_id) = app.bookable_clinic().await;
    let (patient, _) = app.patient_token("+998901234567").await;

    let (status, booking) = app
        .send(
            "POST",
            "/bookings",
            Some(&patient),
            Some(json!({
                "clinicId": clinic_id,
                "serviceId": service_id,
                "scheduledDate": "2099-01-15",
                "scheduledTime": "10:30"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");
    assert_eq!(booking["data"]["status"], json!("pending"));
    let cancel_uri = format!("/bookings/{}/cancel", booking["data"]["_id"].as_str().expect("id"));

    let (status, body) = app
        .send(
            "PATCH",
            &cancel_uri,
            Some(&patient),
            Some(json!({"reason": "schedule conflict"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("cancelled"));
    assert_eq!(body["data"]["cancel"]["by"], json!("patient"));
    assert_eq!(body["data"]["cancel"]["reason"], json!("schedule conflict"));

    let (status, _) = app.send("PATCH", &cancel_uri, Some(&patient), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_next_upcoming_is_null_without_bookings() {
    let app = TestApp::new();
    let (patient, _) = app.patient_token("+998901234567").await;

    let (status, body) = app
        .send("GET", "/bookings/next-upcoming", Some(&patient), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_service_doctor_change_moves_backlink() {
    let app = TestApp::new();
    let (staff, _, service_id) = app.bookable_clinic().await;
    let (_, clinic) = app.send("GET", "/clinics/my-clinic", Some(&staff), None).await;
    let branch_id = clinic["data"]["branches"][0]["_id"].clone();

    let mut doctor_ids = Vec::new();
    for username in ["drone", "drtwo"] {
        let (status, doctor) = app
            .send(
                "POST",
                "/clinics/my-clinic/doctors",
                Some(&staff),
                Some(json!({
                    "fullName": "Dr. Test",
                    "username": username,
                    "password": "doctorpass",
                    "branchId": branch_id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{doctor}");
        doctor_ids.push(doctor["data"]["_id"].as_str().expect("id").to_string());
    }
    let service_uri = format!("/clinics/my-clinic/services/{service_id}");

    for ids in [json!([doctor_ids[0]]), json!([doctor_ids[1]])] {
        let (status, body) = app
            .send("PATCH", &service_uri, Some(&staff), Some(json!({"doctorIds": ids})))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (_, clinic) = app.send("GET", "/clinics/my-clinic", Some(&staff), None).await;
    let service_ids_of = |doctor_id: &str| -> Vec<Value> {
        clinic["data"]["doctors"]
            .as_array()
            .expect("doctors")
            .iter()
            .find(|d| d["_id"] == json!(doctor_id))
            .and_then(|d| d["serviceIds"].as_array().cloned())
            .expect("doctor present")
    };
    assert!(service_ids_of(&doctor_ids[0]).is_empty());
    assert_eq!(service_ids_of(&doctor_ids[1]), vec![json!(service_id)]);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/patients/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("UNAUTHORIZED"));
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, _) = app
        .send("GET", "/clinics/my-clinic", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_patient_token_is_forbidden_on_admin_routes() {
    let app = TestApp::new();
    let (patient, _) = app.patient_token("+998901234567").await;

    let (status, body) = app.send("GET", "/clinics", Some(&patient), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!("FORBIDDEN"));
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = TestApp::new();
    let (status, body) = app
        .send("POST", "/patients/auth/phone", None, Some(json!({"phone": 42})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    assert!(body["details"]["body"].is_string());
}

#[tokio::test]
async fn test_invalid_phone_reports_field() {
    let app = TestApp::new();
    let (status, body) = app
        .send("POST", "/patients/auth/phone", None, Some(json!({"phone": "12"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    assert!(body["details"]["phone"].is_string());
}

#[tokio::test]
async fn test_google_sign_in_requires_configuration() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            "POST",
            "/patients/auth/google",
            None,
            Some(json!({"idToken": "anything"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn test_google_sign_in_creates_then_reuses_patient() {
    let app = TestApp::with_state(|state| state.with_google_verifier(google_verifier()));
    let token = google_id_token(GOOGLE_CLIENT_ID, "google-sub-1", "Ada@Example.com");

    let (status, first) = app
        .send("POST", "/patients/auth/google", None, Some(json!({"idToken": token})))
        .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    let patient = &first["data"]["principal"];
    assert_eq!(patient["authType"], json!("google"));
    assert_eq!(patient["email"], json!("ada@example.com"));
    assert_eq!(patient["avatarUrl"], json!("https://example.com/a.png"));
    assert_eq!(first["data"]["needsProfile"], json!(true));

    let (status, second) = app
        .send("POST", "/patients/auth/google", None, Some(json!({"idToken": token})))
        .await;
    assert_eq!(status, StatusCode::OK, "{second}");
    assert_eq!(second["data"]["principal"]["_id"], patient["_id"]);

    let session = first["data"]["token"].as_str().expect("token");
    let (status, me) = app.send("GET", "/patients/me", Some(session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["_id"], patient["_id"]);
}

#[tokio::test]
async fn test_google_token_for_other_client_is_unauthorized() {
    let app = TestApp::with_state(|state| state.with_google_verifier(google_verifier()));
    let token = google_id_token("other-client", "google-sub-1", "ada@example.com");
    let (status, body) = app
        .send("POST", "/patients/auth/google", None, Some(json!({"idToken": token})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("UNAUTHORIZED"));
}

#[tokio::test]
async fn test_disabled_staff_and_doctor_tokens_stop_working() {
    let app = TestApp::new();
    let platform_admin = app.admin_token().await;
    let (_, clinic) = app.create_clinic(&platform_admin, "city-clinic", "jdoe").await;
    let clinic_id = clinic["data"]["_id"].as_str().expect("id").to_string();
    let (status, _) = app
        .send(
            "PATCH",
            &format!("/clinics/{clinic_id}/plan"),
            Some(&platform_admin),
            Some(json!({"plan": "pro"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let owner = app.staff_token("jdoe").await;

    let (status, admin) = app
        .send(
            "POST",
            "/clinics/my-clinic/admins",
            Some(&owner),
            Some(json!({"userName": "frontdesk", "displayName": "Front Desk", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{admin}");
    let admin_token = app.staff_token("frontdesk").await;
    let (status, _) = app.send("GET", "/clinics/my-clinic", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let admin_status_uri = format!(
        "/clinics/my-clinic/admins/{}/status",
        admin["data"]["_id"].as_str().expect("id")
    );
    let (status, _) = app
        .send("PATCH", &admin_status_uri, Some(&owner), Some(json!({"isActive": false})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", "/clinics/my-clinic", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, branch) = app
        .send(
            "POST",
            "/clinics/my-clinic/branches",
            Some(&owner),
            Some(json!({"name": "Main", "address": "1 Main St", "location": {"lat": 41.3, "lng": 69.2}})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{branch}");
    let branch_id = branch["data"]["_id"].as_str().expect("id").to_string();
    let (status, doctor) = app
        .send(
            "POST",
            "/clinics/my-clinic/doctors",
            Some(&owner),
            Some(json!({
                "fullName": "Dr. Who",
                "username": "drwho",
                "password": "doctorpass",
                "branchId": branch_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{doctor}");
    let (status, login) = app
        .send(
            "POST",
            "/clinics/doctors/login",
            None,
            Some(json!({"username": "drwho", "password": "doctorpass"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{login}");
    let doctor_token = login["data"]["token"].as_str().expect("token").to_string();
    let (status, _) = app.send("GET", "/clinics/doctors/me", Some(&doctor_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let doctor_status_uri = format!(
        "/clinics/my-clinic/doctors/{}/status",
        doctor["data"]["_id"].as_str().expect("id")
    );
    let (status, _) = app
        .send("PATCH", &doctor_status_uri, Some(&owner), Some(json!({"isActive": false})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", "/clinics/doctors/me", Some(&doctor_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("PATCH", &format!("/clinics/{clinic_id}/stop"), Some(&platform_admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", "/clinics/my-clinic", Some(&owner), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_directory_hides_stopped_clinics() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, clinic) = app.create_clinic(&admin, "city-clinic", "jdoe").await;

    let (status, body) = app.send("GET", "/public/clinics/city-clinic", None, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let stop_uri = format!("/clinics/{}/stop", clinic["data"]["_id"].as_str().expect("id"));
    let (status, _) = app.send("PATCH", &stop_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send("GET", "/public/clinics/city-clinic", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = app.send("GET", "/public/clinics", None, None).await;
    assert_eq!(list["data"], json!([]));
}

#[tokio::test]
async fn test_clinic_confirms_then_completes_booking() {
    let app = TestApp::new();
    let (staff, clinic_id, service_id) = app.bookable_clinic().await;
    let (patient, _) = app.patient_token("+998901234567").await;
    let (_, booking) = app
        .send(
            "POST",
            "/bookings",
            Some(&patient),
            Some(json!({
                "clinicId": clinic_id,
                "serviceId": service_id,
                "scheduledDate": "2099-03-01",
                "scheduledTime": "09:00"
            })),
        )
        .await;
    let status_uri = format!(
        "/clinics/my-clinic/bookings/{}/status",
        booking["data"]["_id"].as_str().expect("id")
    );

    let (status, _) = app
        .send("PATCH", &status_uri, Some(&staff), Some(json!({"status": "completed"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send("PATCH", &status_uri, Some(&staff), Some(json!({"status": "confirmed"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .send("PATCH", &status_uri, Some(&staff), Some(json!({"status": "completed"})))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["price"], json!(100.0));

    let (_, listed) = app
        .send("GET", "/clinics/my-clinic/bookings?status=completed", Some(&staff), None)
        .await;
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/bookings/{id}/cancel"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer"].is_object());
}
