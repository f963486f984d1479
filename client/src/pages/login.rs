//! Login page: email + password, then back to where the user was headed.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::app::{AppSession, publish_session};
use crate::state::auth::AuthState;
use crate::util::forms::validate_login_input;
use crate::util::redirect::{REDIRECT_QUERY_PARAM, sanitize_redirect};

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<AppSession>();
    let navigate = use_navigate();
    let query = use_query_map();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let credentials = match validate_login_input(&email.get(), &password.get()) {
            Ok(credentials) => credentials,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Signing in...".to_owned());

        let session = session.clone();
        let navigate = navigate.clone();
        let return_path = query.with_untracked(|q| q.get(REDIRECT_QUERY_PARAM));
        leptos::task::spawn_local(async move {
            let outcome = session.login(&credentials).await;
            busy.set(false);
            if let Some(error) = outcome.error() {
                info.set(error.to_owned());
                return;
            }

            info.set(String::new());
            password.set(String::new());
            publish_session(auth, &session, session.needs_profile());
            let destination = sanitize_redirect(return_path.as_deref(), "/");
            navigate(&destination, NavigateOptions { replace: true, ..Default::default() });

            if session.needs_profile() {
                session.fetch_user_info().await;
                publish_session(auth, &session, false);
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Survey"</h1>
                <p class="login-card__subtitle">"Sign in"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <a href="/register" class="login-link">"Create an account"</a>
            </div>
        </div>
    }
}
