use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{NewTask, SigninForm, SignupForm, StatusUpdate, Task, User};
use super::TokenStore;

/// Name of the cookie the auth service issues on sign in.
pub const TOKEN_COOKIE: &str = "token";

/// Remote board API: session endpoints plus the task and user collections.
///
/// Every call except `sign_in`/`sign_up` is credential-bearing; the
/// implementation attaches the session on its own and callers only see
/// whether the server accepted it.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// `GET /api/protected`
    async fn current_user(&self) -> Result<User, ApiError>;

    /// `POST /auth/signin`
    async fn sign_in(&self, form: &SigninForm) -> Result<User, ApiError>;

    /// `POST /auth/signup`
    async fn sign_up(&self, form: &SignupForm) -> Result<User, ApiError>;

    /// `POST /auth/signout`
    async fn sign_out(&self) -> Result<(), ApiError>;

    /// Drops the local credential, in memory and on disk. No request is made.
    async fn forget_credentials(&self) -> Result<(), ApiError>;

    /// `GET /api/tasks`
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    /// `POST /api/tasks`
    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError>;

    /// `PATCH /api/tasks/{id}/status`
    async fn toggle_status(&self, task_id: &str) -> Result<StatusUpdate, ApiError>;

    /// `GET /api/users`
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
}

#[derive(Deserialize)]
struct AuthResponse {
    user: User,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// reqwest-backed [`BoardApi`].
#[derive(Clone)]
pub struct HttpBoardApi {
    inner: Arc<HttpBoardApiInner>,
}

struct HttpBoardApiInner {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    tokens: TokenStore,
}

impl HttpBoardApi {
    /// Builds the client and resumes any session token persisted by an
    /// earlier run.
    pub async fn connect(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.http.timeout())
            .user_agent(config.http.user_agent.clone())
            .build()?;

        let tokens = TokenStore::new(config.session.token_path.clone());
        let token = match tokens.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session token {}: {}", tokens.path().display(), e);
                None
            }
        };
        tracing::debug!("Board API at {} (resumed session: {})", config.api.base_url, token.is_some());

        Ok(Self {
            inner: Arc::new(HttpBoardApiInner {
                client,
                base_url: config.api.base_url.trim_end_matches('/').to_string(),
                token: RwLock::new(token),
                tokens,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    // Attaches the session cookie, sends, and classifies the status.
    // A 401 on a session-bound call means the session is gone; on the
    // credential endpoints it is an ordinary rejection.
    async fn send(&self, builder: RequestBuilder, session_bound: bool) -> Result<Response, ApiError> {
        let builder = match self.inner.token.read().await.as_deref() {
            Some(token) => builder.header(header::COOKIE, format!("{}={}", TOKEN_COOKIE, token)),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url().path());

        if status.is_success() {
            return Ok(response);
        }
        if session_bound && status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&text),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    // Picks the session token out of Set-Cookie and keeps it for later calls.
    async fn remember_session(&self, response: &Response) -> Result<(), ApiError> {
        let issued = response
            .cookies()
            .find(|cookie| cookie.name() == TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string());

        match issued {
            Some(token) if !token.is_empty() => {
                self.inner.tokens.save(&token).await?;
                *self.inner.token.write().await = Some(token);
            }
            Some(_) => self.forget_credentials().await?,
            None => tracing::warn!("Sign in succeeded without a session cookie"),
        }
        Ok(())
    }

    async fn authenticate<F: serde::Serialize + Sync>(&self, path: &str, form: &F) -> Result<User, ApiError> {
        let response = self
            .send(self.inner.client.post(self.url(path)).json(form), false)
            .await?;
        self.remember_session(&response).await?;
        let auth: AuthResponse = Self::decode(response).await?;
        Ok(auth.user)
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn current_user(&self) -> Result<User, ApiError> {
        let response = self.send(self.inner.client.get(self.url("/api/protected")), true).await?;
        Self::decode(response).await
    }

    async fn sign_in(&self, form: &SigninForm) -> Result<User, ApiError> {
        self.authenticate("/auth/signin", form).await
    }

    async fn sign_up(&self, form: &SignupForm) -> Result<User, ApiError> {
        self.authenticate("/auth/signup", form).await
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.send(self.inner.client.post(self.url("/auth/signout")), true).await?;
        Ok(())
    }

    async fn forget_credentials(&self) -> Result<(), ApiError> {
        *self.inner.token.write().await = None;
        self.inner.tokens.clear().await?;
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.send(self.inner.client.get(self.url("/api/tasks")), true).await?;
        // An empty collection comes back as `null`
        let tasks: Option<Vec<Task>> = Self::decode(response).await?;
        Ok(tasks.unwrap_or_default())
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let response = self
            .send(self.inner.client.post(self.url("/api/tasks")).json(task), true)
            .await?;
        Self::decode(response).await
    }

    async fn toggle_status(&self, task_id: &str) -> Result<StatusUpdate, ApiError> {
        let path = format!("/api/tasks/{}/status", urlencoding::encode(task_id));
        let response = self.send(self.inner.client.patch(self.url(&path)), true).await?;
        Self::decode(response).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.send(self.inner.client.get(self.url("/api/users")), true).await?;
        let users: Option<Vec<User>> = Self::decode(response).await?;
        Ok(users.unwrap_or_default())
    }
}

// `{"error": "..."}` is what the API sends; fall back to the raw body.
fn error_message(text: &str) -> String {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(ErrorBody { error: Some(msg), .. }) | Ok(ErrorBody { message: Some(msg), .. }) => msg,
        _ => text.trim().to_string(),
    }
}
