use crate::errors::{AuthError, Feedback};
use super::dashboard::Dashboard;

fn auth_feedback(err: AuthError) -> Feedback {
    Feedback::Banner(err.to_string())
}

pub async fn handle_status(dashboard: &Dashboard) -> Result<String, Feedback> {
    if !dashboard.session().check_status().await {
        return Err(Feedback::RedirectToLogin);
    }
    match dashboard.session().user() {
        Some(user) => Ok(format!("Signed in as {} <{}>", user.username, user.email)),
        None => Err(Feedback::RedirectToLogin),
    }
}

pub async fn handle_login(
    dashboard: &Dashboard,
    email: &str,
    password: &str,
) -> Result<String, Feedback> {
    tracing::info!("Login attempt for {}", email);
    let user = dashboard
        .session()
        .sign_in(email, password)
        .await
        .map_err(auth_feedback)?;
    Ok(format!("Welcome back, {}", user.username))
}

pub async fn handle_register(
    dashboard: &Dashboard,
    email: &str,
    username: &str,
    password: &str,
) -> Result<String, Feedback> {
    let user = dashboard
        .session()
        .sign_up(email, username, password)
        .await
        .map_err(auth_feedback)?;
    Ok(format!("Account created, signed in as {}", user.username))
}

pub async fn handle_logout(dashboard: &Dashboard) -> Result<String, Feedback> {
    dashboard.session().logout().await;
    Ok("Signed out".to_string())
}
