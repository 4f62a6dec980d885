use tracing::warn;
use yew::prelude::*;

use crate::error::StoreError;
use crate::models::SessionUser;
use crate::views::{missing_context, AppContext};

#[derive(Properties, PartialEq)]
pub struct AuthScreenProps {
    pub on_authenticated: Callback<SessionUser>,
}

/// Message shown for a failed sign-in or sign-up; storage faults are logged.
fn auth_error_message(err: &StoreError) -> String {
    match err {
        StoreError::InvalidCredentials | StoreError::AlreadyRegistered(_) => err.to_string(),
        other => {
            warn!(error = %other, "account storage failed");
            "Could not read saved accounts. Please try again.".to_string()
        }
    }
}

#[function_component(AuthScreen)]
pub fn auth_screen(props: &AuthScreenProps) -> Html {
    let context = use_context::<AppContext>();
    let Some(context) = context else {
        return missing_context("auth");
    };
    let is_login = use_state(|| true);
    let name = use_state(|| "".to_string());
    let email = use_state(|| "".to_string());
    let password = use_state(|| "".to_string());
    let confirm_password = use_state(|| "".to_string());
    let error = use_state(|| None::<String>);

    let on_submit = {
        let is_login = is_login.clone();
        let name = name.clone();
        let email = email.clone();
        let password = password.clone();
        let confirm_password = confirm_password.clone();
        let error = error.clone();
        let repo = context.repo.clone();
        let on_authenticated = props.on_authenticated.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let name_val = name.trim().to_string();
            let email_val = email.trim().to_string();
            let password_val = (*password).clone();

            if email_val.is_empty() || password_val.is_empty() {
                error.set(Some("Email and password are required".to_string()));
                return;
            }

            if !*is_login {
                if name_val.is_empty() {
                    error.set(Some("Name is required".to_string()));
                    return;
                }
                if password_val.len() < 8 {
                    error.set(Some("Password must be at least 8 characters".to_string()));
                    return;
                }
                if password_val != *confirm_password {
                    error.set(Some("Passwords do not match".to_string()));
                    return;
                }
            }

            let result = if *is_login {
                repo.authenticate(&email_val, &password_val)
            } else {
                repo.register(&name_val, &email_val, &password_val)
            };

            match result.and_then(|record| repo.start_session(&record)) {
                Ok(session) => {
                    error.set(None);
                    on_authenticated.emit(session);
                }
                Err(err) => error.set(Some(auth_error_message(&err))),
            }
        })
    };

    let toggle_mode = {
        let is_login = is_login.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            is_login.set(!*is_login);
            error.set(None);
        })
    };

    html! {
        <div class="min-h-screen flex items-center justify-center bg-[#050e24]">
            <div class="w-full max-w-md bg-[#0a1735] border border-[#253256] rounded-2xl shadow-lg p-8">
                <div class="text-center mb-6">
                    <h1 class="text-2xl font-bold text-white">{ if *is_login { "Welcome back" } else { "Create account" } }</h1>
                    <p class="text-sm text-gray-400 mt-2">
                        { if *is_login { "Sign in to your portfolio." } else { "Start investing in minutes." } }
                    </p>
                </div>

                <form class="space-y-4" onsubmit={on_submit}>
                    if !*is_login {
                        <div class="space-y-1">
                            <label class="text-sm font-medium text-gray-300">{"Full name"}</label>
                            <input
                                type="text"
                                class="w-full px-4 py-2 bg-[#162040] border border-[#253256] rounded-lg text-white focus:outline-none focus:ring-2 focus:ring-[#f9a826]"
                                value={(*name).clone()}
                                oninput={{
                                    let name = name.clone();
                                    Callback::from(move |e: InputEvent| {
                                        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                        name.set(input.value());
                                    })
                                }}
                            />
                        </div>
                    }
                    <div class="space-y-1">
                        <label class="text-sm font-medium text-gray-300">{"Email"}</label>
                        <input
                            type="email"
                            class="w-full px-4 py-2 bg-[#162040] border border-[#253256] rounded-lg text-white focus:outline-none focus:ring-2 focus:ring-[#f9a826]"
                            value={(*email).clone()}
                            oninput={{
                                let email = email.clone();
                                Callback::from(move |e: InputEvent| {
                                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                    email.set(input.value());
                                })
                            }}
                        />
                    </div>
                    <div class="space-y-1">
                        <label class="text-sm font-medium text-gray-300">{"Password"}</label>
                        <input
                            type="password"
                            class="w-full px-4 py-2 bg-[#162040] border border-[#253256] rounded-lg text-white focus:outline-none focus:ring-2 focus:ring-[#f9a826]"
                            value={(*password).clone()}
                            oninput={{
                                let password = password.clone();
                                Callback::from(move |e: InputEvent| {
                                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                    password.set(input.value());
                                })
                            }}
                        />
                    </div>

                    if !*is_login {
                        <div class="space-y-1">
                            <label class="text-sm font-medium text-gray-300">{"Confirm Password"}</label>
                            <input
                                type="password"
                                class="w-full px-4 py-2 bg-[#162040] border border-[#253256] rounded-lg text-white focus:outline-none focus:ring-2 focus:ring-[#f9a826]"
                                value={(*confirm_password).clone()}
                                oninput={{
                                    let confirm_password = confirm_password.clone();
                                    Callback::from(move |e: InputEvent| {
                                        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                        confirm_password.set(input.value());
                                    })
                                }}
                            />
                        </div>
                    }

                    if let Some(msg) = &*error {
                        <div class="text-sm text-red-500">{ msg.clone() }</div>
                    }

                    <button
                        type="submit"
                        class="w-full bg-[#f9a826] text-black py-2 rounded-lg font-semibold hover:opacity-90 transition-opacity"
                    >
                        { if *is_login { "Login" } else { "Sign up" } }
                    </button>
                </form>

                <div class="mt-6 text-center text-sm text-gray-400">
                    { if *is_login { "No account?" } else { "Already have an account?" } }
                    <button class="ml-2 text-[#f9a826] font-semibold" onclick={toggle_mode}>
                        { if *is_login { "Sign up" } else { "Login" } }
                    </button>
                </div>
            </div>
        </div>
    }
}
