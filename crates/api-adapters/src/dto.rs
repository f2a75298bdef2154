//! # Wire DTOs
//!
//! Request bodies carry `validator` rules for field shape (lengths, email
//! format). Responses are flat JSON; domain models that already serialize
//! the right way (governance records, pest entries, warnings) are returned
//! as-is.

use chrono::{DateTime, Utc};
use domains::{
    AuditLogEntry, AuditOutcome, Content, ContentKind, ContentStatus, GovernanceRecordPatch,
    GovernanceStatus, NewContent, NewGovernanceRecord, NewPestInfo, NewPreventionScheme,
    NewWarning, PestCategory, PestInfoPatch, Role, User, WarningLevel,
};
use serde::{Deserialize, Serialize};
use services::Registration;
use validator::Validate;

// ── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            email: req.email,
            username: req.username,
            password: req.password,
            role: req.role,
            phone: req.phone,
        }
    }
}

/// OAuth2 password-flow form. `username` carries the email.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self { access_token, token_type: "bearer".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            phone: user.phone,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

// ── Governance ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GovernanceCreateRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub pest_type: String,
    pub found_time: DateTime<Utc>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub location: Option<String>,
    #[serde(default)]
    pub status: GovernanceStatus,
    pub description: Option<String>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
}

impl From<GovernanceCreateRequest> for NewGovernanceRecord {
    fn from(req: GovernanceCreateRequest) -> Self {
        NewGovernanceRecord {
            pest_type: req.pest_type,
            found_time: req.found_time,
            location: req.location,
            status: req.status,
            description: req.description,
            photos: req.photos.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GovernanceUpdateRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub pest_type: Option<String>,
    pub found_time: Option<DateTime<Utc>>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub location: Option<String>,
    pub status: Option<GovernanceStatus>,
    pub description: Option<String>,
    pub photos: Option<Vec<String>>,
}

impl From<GovernanceUpdateRequest> for GovernanceRecordPatch {
    fn from(req: GovernanceUpdateRequest) -> Self {
        GovernanceRecordPatch {
            pest_type: req.pest_type,
            found_time: req.found_time,
            location: req.location,
            status: req.status,
            description: req.description,
            photos: req.photos,
        }
    }
}

// ── Knowledge ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PestCreateRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
    pub category: PestCategory,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub affected_part: Option<String>,
    pub symptom_description: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub peak_season: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub typical_image: Option<String>,
}

impl From<PestCreateRequest> for NewPestInfo {
    fn from(req: PestCreateRequest) -> Self {
        NewPestInfo {
            name: req.name,
            category: req.category,
            affected_part: req.affected_part,
            symptom_description: req.symptom_description,
            peak_season: req.peak_season,
            typical_image: req.typical_image,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PestUpdateRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: Option<String>,
    pub category: Option<PestCategory>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub affected_part: Option<String>,
    pub symptom_description: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub peak_season: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub typical_image: Option<String>,
}

impl From<PestUpdateRequest> for PestInfoPatch {
    fn from(req: PestUpdateRequest) -> Self {
        PestInfoPatch {
            name: req.name,
            category: req.category,
            affected_part: req.affected_part,
            symptom_description: req.symptom_description,
            peak_season: req.peak_season,
            typical_image: req.typical_image,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SchemeCreateRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub pesticide_name: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub recommended_dosage: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub application_time: Option<String>,
    pub operation_spec: Option<String>,
}

impl From<SchemeCreateRequest> for NewPreventionScheme {
    fn from(req: SchemeCreateRequest) -> Self {
        NewPreventionScheme {
            pesticide_name: req.pesticide_name,
            recommended_dosage: req.recommended_dosage,
            application_time: req.application_time,
            operation_spec: req.operation_spec,
        }
    }
}

// ── Community ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContentCreateRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub title: String,
    pub content: String,
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub category: String,
}

impl From<ContentCreateRequest> for NewContent {
    fn from(req: ContentCreateRequest) -> Self {
        NewContent { title: req.title, body: req.content, category: req.category }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: i64,
    pub status: ContentStatus,
    pub views: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Content> for ContentResponse {
    fn from(c: Content) -> Self {
        Self {
            id: c.id,
            title: c.title,
            content: c.body,
            category: c.category,
            author_id: c.author_id,
            status: c.status,
            views: c.views,
            created_at: c.created_at,
        }
    }
}

/// `target_type` stays a string here so an unknown value is reported as a
/// field error on `target_type` rather than a generic body error.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuditRequest {
    pub target_id: i64,
    pub target_type: String,
    pub is_approved: bool,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditResponse {
    pub msg: String,
    pub status: ContentStatus,
}

impl AuditResponse {
    pub fn new(outcome: AuditOutcome, status: ContentStatus) -> Self {
        let verb = match outcome {
            AuditOutcome::Approved => "approved",
            AuditOutcome::Rejected => "rejected",
        };
        Self { msg: format!("audit recorded: {verb}"), status }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogResponse {
    pub id: i64,
    pub target_id: i64,
    pub target_type: ContentKind,
    pub auditor_id: Option<i64>,
    pub result: AuditOutcome,
    pub feedback: Option<String>,
    pub audit_time: DateTime<Utc>,
}

impl From<AuditLogEntry> for AuditLogResponse {
    fn from(e: AuditLogEntry) -> Self {
        Self {
            id: e.id,
            target_id: e.target_id,
            target_type: e.target_kind,
            auditor_id: e.auditor_id,
            result: e.outcome,
            feedback: e.feedback,
            audit_time: e.audit_time,
        }
    }
}

// ── Warnings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WarningCreateRequest {
    #[serde(default)]
    pub level: WarningLevel,
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub affected_scope: String,
    pub prevention_measures: String,
    pub expire_time: DateTime<Utc>,
}

impl From<WarningCreateRequest> for NewWarning {
    fn from(req: WarningCreateRequest) -> Self {
        NewWarning {
            level: req.level,
            affected_scope: req.affected_scope,
            prevention_measures: req.prevention_measures,
            expire_time: req.expire_time,
        }
    }
}

// ── Query strings ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingQuery {
    pub target_type: String,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_rules() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "email": "farmer@x.com",
            "username": "farmer",
            "password": "secret1"
        }))
        .unwrap();
        assert_eq!(req.role, Role::Farmer);
        assert!(req.validate().is_ok());

        let short: RegisterRequest = serde_json::from_value(json!({
            "email": "not-an-email",
            "username": "farmer",
            "password": "12345"
        }))
        .unwrap();
        let errors = short.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn overlong_email_is_rejected() {
        let label = "x".repeat(63);
        let email = format!("{}@{label}.{label}.{label}.com", "a".repeat(64));
        assert!(email.len() > 255);

        let req = RegisterRequest {
            email,
            username: "farmer".into(),
            password: "secret1".into(),
            role: Role::Farmer,
            phone: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn unknown_role_is_a_body_error() {
        let result = serde_json::from_value::<RegisterRequest>(json!({
            "email": "a@x.com", "username": "a", "password": "secret1", "role": "ROOT"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn content_body_is_named_content_on_the_wire() {
        let response = ContentResponse::from(Content {
            id: 1,
            kind: ContentKind::Post,
            title: "t".into(),
            body: "b".into(),
            category: "c".into(),
            author_id: 2,
            status: ContentStatus::Pending,
            views: 0,
            created_at: Utc::now(),
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["content"], "b");
        assert_eq!(value["status"], "PENDING");
        assert!(value.get("body").is_none());
    }

    #[test]
    fn governance_defaults_and_photo_list() {
        let req: GovernanceCreateRequest = serde_json::from_value(json!({
            "pest_type": "aphid",
            "found_time": "2025-04-01T08:00:00Z"
        }))
        .unwrap();
        let new: NewGovernanceRecord = req.into();
        assert_eq!(new.status, GovernanceStatus::InProgress);
        assert!(new.photos.is_empty());
    }

    #[test]
    fn audit_log_uses_target_type_and_result_labels() {
        let value = serde_json::to_value(AuditLogResponse::from(AuditLogEntry {
            id: 1,
            target_id: 4,
            target_kind: ContentKind::Article,
            auditor_id: None,
            outcome: AuditOutcome::Rejected,
            feedback: Some("needs sources".into()),
            audit_time: Utc::now(),
        }))
        .unwrap();
        assert_eq!(value["target_type"], "article");
        assert_eq!(value["result"], "REJECTED");
        assert!(value["auditor_id"].is_null());
    }
}
