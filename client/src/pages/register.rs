//! Registration page. A new account signs in through the login page.

use leptos::prelude::*;

use crate::app::AppSession;
use crate::util::forms::validate_register_input;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let session = expect_context::<AppSession>();

    let name = RwSignal::new(String::new());
    let surname = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let request =
            match validate_register_input(&name.get(), &surname.get(), &email.get(), &password.get(), &confirm.get()) {
                Ok(request) => request,
                Err(message) => {
                    info.set(message.to_owned());
                    return;
                }
            };
        busy.set(true);
        info.set("Creating account...".to_owned());

        let session = session.clone();
        leptos::task::spawn_local(async move {
            let outcome = session.register(&request).await;
            busy.set(false);
            match (outcome.message(), outcome.error()) {
                (_, Some(error)) => info.set(error.to_owned()),
                (message, None) => {
                    password.set(String::new());
                    confirm.set(String::new());
                    info.set(message.unwrap_or_default().to_owned());
                }
            }
        });
    };

    let field = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <input
                class="login-input"
                type=kind
                placeholder=label
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Survey"</h1>
                <p class="login-card__subtitle">"Create an account"</p>
                <form class="login-form" on:submit=on_submit>
                    {field("First name", "text", name)}
                    {field("Last name", "text", surname)}
                    {field("you@example.com", "email", email)}
                    {field("Password", "password", password)}
                    {field("Confirm password", "password", confirm)}
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Register"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <a href="/login" class="login-link">"Back to sign in"</a>
            </div>
        </div>
    }
}
