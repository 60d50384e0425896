use serde::Serialize;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;
use crate::errors::{AuthError, Field, FieldErrors};
use super::task::NewTask;

// Same pattern the auth service enforces on sign up and sign in
fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

#[derive(Debug, Serialize, Clone)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl SigninForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        if !email_pattern().is_match(&self.email) {
            return Err(AuthError::Invalid("Invalid email format".into()));
        }
        if self.password.is_empty() {
            return Err(AuthError::Invalid("Password is required".into()));
        }
        Ok(())
    }
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        if !email_pattern().is_match(&self.email) {
            return Err(AuthError::Invalid("Invalid email format".into()));
        }
        if self.password.chars().count() < 8 {
            return Err(AuthError::Invalid(
                "Password must be at least 8 characters long".into(),
            ));
        }
        if self.username.chars().count() < 3 {
            return Err(AuthError::Invalid(
                "Username must be at least 3 characters long".into(),
            ));
        }
        Ok(())
    }
}

/// Task form as the user filled it in. Nothing is sent until it validates.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub due_date: String,
    pub assigned_to: String,
}

impl TaskDraft {
    /// Checks every required field and builds the create request body.
    /// All missing fields are reported together.
    pub fn validate(&self, owner_email: Option<&str>) -> Result<NewTask, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert(Field::Name, "Task name is required");
        }
        if self.description.trim().is_empty() {
            errors.insert(Field::Description, "Task description is required");
        }

        let due_date = if self.due_date.trim().is_empty() {
            errors.insert(Field::DueDate, "Due date is required");
            None
        } else {
            let normalized = normalize_due_date(&self.due_date);
            if normalized.is_none() {
                errors.insert(Field::DueDate, "Due date is invalid");
            }
            normalized
        };

        if self.assigned_to.trim().is_empty() {
            errors.insert(Field::AssignedTo, "Assigned user is required");
        }

        let owner_email = owner_email.filter(|email| !email.is_empty());
        if owner_email.is_none() {
            errors.insert(Field::UserEmail, "User email is missing");
        }

        match (due_date, owner_email) {
            (Some(due_date), Some(owner_email)) if errors.is_empty() => Ok(NewTask {
                name: self.name.trim().to_string(),
                description: self.description.trim().to_string(),
                due_date,
                assigned_to: self.assigned_to.trim().to_string(),
                owner_email: owner_email.to_string(),
                status: false,
            }),
            _ => Err(errors),
        }
    }
}

/// Canonical ISO-8601 form of a user-entered due date, in UTC with
/// millisecond precision. Date-only input means midnight UTC.
pub fn normalize_due_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let parsed: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
    {
        Utc.from_utc_datetime(&naive)
    } else {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?)
    };

    Some(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TaskDraft {
        TaskDraft {
            name: "Write report".into(),
            description: "Quarterly numbers".into(),
            due_date: "2024-05-01".into(),
            assigned_to: "bob".into(),
        }
    }

    #[test]
    fn due_dates_normalize_to_utc_millis() {
        assert_eq!(
            normalize_due_date("2024-05-01").as_deref(),
            Some("2024-05-01T00:00:00.000Z")
        );
        assert_eq!(
            normalize_due_date("2024-05-01T09:30").as_deref(),
            Some("2024-05-01T09:30:00.000Z")
        );
        assert_eq!(
            normalize_due_date("2024-05-01T12:00:00+02:00").as_deref(),
            Some("2024-05-01T10:00:00.000Z")
        );
        assert_eq!(normalize_due_date("next tuesday"), None);
        assert_eq!(normalize_due_date("2024-02-30"), None);
    }

    #[test]
    fn valid_draft_becomes_request_body() {
        let body = draft().validate(Some("a@x.com")).unwrap();
        assert_eq!(body.due_date, "2024-05-01T00:00:00.000Z");
        assert_eq!(body.owner_email, "a@x.com");
        assert!(!body.status);
    }

    #[test]
    fn each_missing_field_is_reported_by_name() {
        let cases: [(fn(&mut TaskDraft), Field, &str); 4] = [
            (|d| d.name.clear(), Field::Name, "Task name is required"),
            (|d| d.description = "  ".into(), Field::Description, "Task description is required"),
            (|d| d.due_date.clear(), Field::DueDate, "Due date is required"),
            (|d| d.assigned_to.clear(), Field::AssignedTo, "Assigned user is required"),
        ];

        for (blank, field, message) in cases {
            let mut d = draft();
            blank(&mut d);
            let errors = d.validate(Some("a@x.com")).unwrap_err();
            assert_eq!(errors.len(), 1, "only {} should fail", field);
            assert_eq!(errors.get(field), Some(message));
        }
    }

    #[test]
    fn missing_owner_and_bad_date_collect_together() {
        let mut d = draft();
        d.due_date = "soon".into();
        let errors = d.validate(None).unwrap_err();
        assert_eq!(errors.get(Field::DueDate), Some("Due date is invalid"));
        assert_eq!(errors.get(Field::UserEmail), Some("User email is missing"));
    }

    #[test]
    fn credential_forms_mirror_server_rules() {
        let signin = SigninForm { email: "not-an-email".into(), password: "x".into() };
        assert_eq!(
            signin.validate(),
            Err(AuthError::Invalid("Invalid email format".into()))
        );

        let signup = SignupForm {
            email: "a@x.com".into(),
            username: "al".into(),
            password: "longenough".into(),
        };
        assert_eq!(
            signup.validate(),
            Err(AuthError::Invalid("Username must be at least 3 characters long".into()))
        );

        let signup = SignupForm { password: "short".into(), ..signup };
        assert_eq!(
            signup.validate(),
            Err(AuthError::Invalid("Password must be at least 8 characters long".into()))
        );
    }
}
