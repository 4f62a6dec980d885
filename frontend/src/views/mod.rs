pub mod auth;
pub mod components;
pub mod dashboard;

use std::rc::Rc;

use tracing::warn;
use yew::prelude::*;

use crate::config::AppConfig;
use crate::models::SessionUser;
use crate::repository::UserRepository;
use auth::AuthScreen;
use dashboard::DashboardPage;

/// Shared handles provided to every page through a `ContextProvider`.
#[derive(Clone)]
pub struct AppContext {
    pub repo: Rc<UserRepository>,
    pub config: Rc<AppConfig>,
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.repo, &other.repo) && Rc::ptr_eq(&self.config, &other.config)
    }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub context: AppContext,
}

/// Rendered by a page mounted outside the app's context provider.
fn missing_context(page: &str) -> Html {
    warn!(page, "no app context in scope, rendering nothing");
    html! {}
}

fn resolve_session(repo: &UserRepository) -> Option<SessionUser> {
    match repo.current_session() {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "session slot unreadable, showing login");
            None
        }
    }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let session = use_state(|| resolve_session(&props.context.repo));

    let on_authenticated = {
        let session = session.clone();
        Callback::from(move |user: SessionUser| session.set(Some(user)))
    };

    let on_logout = {
        let session = session.clone();
        let repo = props.context.repo.clone();
        Callback::from(move |_: ()| {
            if let Err(err) = repo.end_session() {
                warn!(error = %err, "could not clear session slot");
            }
            session.set(None);
        })
    };

    let page = match &*session {
        Some(user) => html! { <DashboardPage user={user.clone()} on_logout={on_logout} /> },
        None => html! { <AuthScreen on_authenticated={on_authenticated} /> },
    };

    html! {
        <ContextProvider<AppContext> context={props.context.clone()}>
            { page }
        </ContextProvider<AppContext>>
    }
}
