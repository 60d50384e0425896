use tokio::sync::watch;
use tokio::task::JoinHandle;
use crate::services::{SessionState, Transition};

/// Surfaces the client can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
        }
    }
}

/// Performs a redirect. Implemented by whatever owns the screen.
pub trait Navigate: Send + Sync + 'static {
    fn navigate(&self, route: Route);
}

/// Where a session transition sends the user, if anywhere.
pub fn route_for(transition: Transition) -> Option<Route> {
    match transition {
        Transition::SignedIn => Some(Route::Dashboard),
        Transition::SignedOut | Transition::Rejected => Some(Route::Login),
        Transition::Initial | Transition::Restored => None,
    }
}

/// Follows session state and redirects on every transition that calls for
/// it. Runs until the session manager is dropped; a transition published
/// just before that is still delivered.
pub fn spawn_navigator<N: Navigate>(
    mut state: watch::Receiver<SessionState>,
    navigator: N,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let transition = state.borrow_and_update().transition;
            if let Some(route) = route_for(transition) {
                navigator.navigate(route);
            }
        }
    })
}

/// Navigator for headless use: records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigate for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!("Redirecting to {}", route.path());
    }
}
