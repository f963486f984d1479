//! Root application component with routing and context providers.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
    hooks::use_navigate,
};

use crate::net::api::{ApiClient, ApiConfig};
use crate::net::transport_gloo::GlooTransport;
use crate::pages::{home::HomePage, login::LoginPage, register::RegisterPage};
use crate::state::auth::AuthState;
use crate::state::session::SessionStore;
use crate::state::storage::LocalTokenStorage;
use crate::util::auth::{GuardDecision, install_route_guard};

/// The browser's session store, shared through context.
pub type AppSession = Arc<SessionStore<GlooTransport, LocalTokenStorage>>;

/// Copy the store's session into the reactive snapshot.
pub fn publish_session(auth: RwSignal<AuthState>, session: &AppSession, loading: bool) {
    auth.set(AuthState::new(session.session(), loading));
}

/// Root application component.
///
/// Provides the session store and its reactive snapshot, and schedules the
/// profile load for a restored session once the first render is done.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let api = Arc::new(ApiClient::new(GlooTransport, ApiConfig::default()));
    let session: AppSession = Arc::new(SessionStore::new(api, LocalTokenStorage));
    let auth = RwSignal::new(AuthState::new(session.session(), session.needs_profile()));

    provide_context(auth);
    provide_context(Arc::clone(&session));

    Effect::new(move |_| {
        if !session.needs_profile() {
            return;
        }
        let session = Arc::clone(&session);
        leptos::task::spawn_local(async move {
            session.fetch_user_info().await;
            publish_session(auth, &session, false);
        });
    });

    view! {
        <Title text="Survey"/>

        <Router>
            <RouteGuard>
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("register") view=RegisterPage/>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("dashboard") view=HomePage/>
                    <Route path=StaticSegment("profile") view=HomePage/>
                    <Route path=StaticSegment("survey") view=HomePage/>
                    <Route path=(StaticSegment("survey"), ParamSegment("slug")) view=HomePage/>
                    <Route path=StaticSegment("admin") view=HomePage/>
                </Routes>
            </RouteGuard>
        </Router>
    }
}

/// Applies the route table's access rules to every navigation. Children
/// render only while the current navigation is allowed.
#[component]
fn RouteGuard(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let decision = install_route_guard(auth, use_navigate());
    view! {
        <Show when=move || decision.get() == GuardDecision::Proceed>
            {children()}
        </Show>
    }
}
