//! Signed-in landing page: who is logged in, and a way out.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::app::{AppSession, publish_session};
use crate::routes;
use crate::state::auth::AuthState;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<AppSession>();
    let navigate = use_navigate();
    let location = use_location();
    let busy = RwSignal::new(false);

    let section = move || {
        let path = location.pathname.get();
        routes::resolve(&path).map_or("home", |route| route.name).replace('-', " ")
    };

    let on_logout = move |_| {
        if busy.get() {
            return;
        }
        busy.set(true);
        let session = session.clone();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            session.logout().await;
            publish_session(auth, &session, false);
            busy.set(false);
            navigate(routes::LOGIN_PATH, NavigateOptions::default());
        });
    };

    view! {
        <div class="home-page">
            <header class="home-page__header">
                <h1>{section}</h1>
                <span class="home-page__user">
                    {move || auth.with(|state| if state.loading { "Loading...".to_owned() } else { state.display_name() })}
                </span>
                <button class="btn" on:click=on_logout disabled=move || busy.get()>
                    "Sign out"
                </button>
            </header>
        </div>
    }
}
