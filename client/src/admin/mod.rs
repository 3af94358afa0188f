mod accounts;
mod online;
mod ranking;
mod schedule;

use std::future::Future;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use weblurk_shared::ApiError;
use weblurk_shared::admin::{Section, login_credentials};
use weblurk_shared::api::AdminAccount;
use weblurk_shared::config::LOGIN_REDIRECT_DELAY_MS;

use crate::api;
use crate::logging;
use crate::notify::{Busy, BusyIndicator, Notifier, ToastView};
use crate::settings::Settings;

/// Handles every admin screen shares.
#[derive(Clone, Copy)]
pub(crate) struct AdminContext {
    pub notifier: Notifier,
    pub busy: Busy,
    pub current: RwSignal<Option<AdminAccount>>,
    pub settings: RwSignal<Settings>,
}

impl AdminContext {
    /// Run `fut` with the loading indicator up.
    pub fn spawn<F>(self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.busy.begin();
        spawn_local(async move {
            fut.await;
            self.busy.end();
        });
    }

    /// Run an action that answers with a message, toast the outcome and
    /// call `after` when it succeeded.
    pub fn act<F, A>(self, fallback: &'static str, fut: F, after: A)
    where
        F: Future<Output = Result<String, ApiError>> + 'static,
        A: FnOnce() + 'static,
    {
        self.spawn(async move {
            if self.notifier.report(fut.await, fallback) {
                after();
            }
        });
    }

    /// Fetch into `target`, toasting failures.
    pub fn load<T, F>(self, target: RwSignal<T>, fallback: &'static str, fut: F)
    where
        T: Send + Sync + 'static,
        F: Future<Output = Result<T, ApiError>> + 'static,
    {
        self.spawn(async move {
            match fut.await {
                Ok(value) => target.set(value),
                Err(e) => self.notifier.api_error(&e, fallback),
            }
        });
    }
}

pub(crate) const BUTTON: &str = "padding: 7px 12px; border-radius: 5px; background: #1a1d2a; border: 1px solid #282c3e; color: #e2e0d8; font-size: 0.8rem; cursor: pointer;";
pub(crate) const BUTTON_WARN: &str = "padding: 5px 10px; border-radius: 5px; background: #2e2612; border: 1px solid #f5c542; color: #f5c542; font-size: 0.75rem; cursor: pointer; margin-right: 4px;";
pub(crate) const BUTTON_DANGER: &str = "padding: 5px 10px; border-radius: 5px; background: #3a1518; border: 1px solid #d64550; color: #f0a0a6; font-size: 0.75rem; cursor: pointer;";
pub(crate) const INPUT: &str = "padding: 8px 12px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 5px; color: #e2e0d8; font-size: 0.85rem; outline: none;";
pub(crate) const TABLE: &str = "width: 100%; border-collapse: collapse; font-size: 0.85rem;";
pub(crate) const TH: &str = "text-align: left; padding: 8px 10px; border-bottom: 1px solid #282c3e; color: #9a9590; font-weight: 500;";
pub(crate) const TD: &str = "padding: 8px 10px; border-bottom: 1px solid #1a1d2a;";
pub(crate) const EMPTY_ROW: &str = "padding: 18px; text-align: center; color: #5a5860;";

pub(crate) fn badge(label: impl Into<String>, bg: &'static str, fg: &'static str) -> impl IntoView {
    let style = format!(
        "display: inline-block; padding: 2px 8px; border-radius: 10px; background: {bg}; color: {fg}; font-size: 0.72rem;"
    );
    view! { <span style=style>{label.into()}</span> }
}

#[component]
pub(crate) fn StatCard(label: &'static str, value: Signal<String>) -> impl IntoView {
    view! {
        <div style="flex: 1; min-width: 140px; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; padding: 12px 14px;">
            <div style="font-size: 0.7rem; text-transform: uppercase; letter-spacing: 0.1em; color: #5a5860;">{label}</div>
            <div style="margin-top: 6px; font-family: 'JetBrains Mono', monospace; font-size: 1.2rem; color: #f5c542;">{move || value.get()}</div>
        </div>
    }
}

fn refresh_session(ctx: AdminContext, checked: RwSignal<bool>) {
    spawn_local(async move {
        match api::check_session().await {
            Ok(session) if session.logado => ctx.current.set(session.admin),
            Ok(_) => ctx.current.set(None),
            Err(e) => {
                tracing::warn!(error = %e, "session check failed");
                ctx.current.set(None);
            }
        }
        checked.set(true);
    });
}

/// Admin console root.
#[component]
pub fn AdminConsole() -> impl IntoView {
    let saved = Settings::load();
    let ctx = AdminContext {
        notifier: Notifier::new(),
        busy: Busy(RwSignal::new(0)),
        current: RwSignal::new(None),
        settings: RwSignal::new(saved),
    };
    provide_context(ctx);
    provide_context(ctx.notifier);
    provide_context(ctx.busy);

    Effect::new(move || {
        let settings = ctx.settings.get();
        logging::set_verbose(settings.verbose_logging);
        settings.save();
    });

    let checked = RwSignal::new(false);
    refresh_session(ctx, checked);

    view! {
        <div style="min-height: 100vh; background: #0c0e17; color: #e2e0d8; font-family: 'Inter', system-ui, sans-serif;">
            <ToastView />
            <BusyIndicator />
            <Show when=move || checked.get()>
                {move || {
                    if ctx.current.get().is_some() {
                        view! { <ConsoleShell /> }.into_any()
                    } else {
                        view! { <LoginScreen checked=checked /> }.into_any()
                    }
                }}
            </Show>
        </div>
    }
}

#[component]
fn LoginScreen(checked: RwSignal<bool>) -> impl IntoView {
    let ctx: AdminContext = expect_context();
    let login = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());

    let submit = move || {
        let credentials =
            match login_credentials(&login.get_untracked(), &password.get_untracked()) {
                Ok(credentials) => credentials,
                Err(e) => {
                    ctx.notifier.api_error(&e, "");
                    return;
                }
            };
        ctx.spawn(async move {
            match api::login(&credentials).await {
                Ok(resp) => {
                    ctx.notifier.success(resp.message);
                    let admin = resp.admin;
                    Timeout::new(LOGIN_REDIRECT_DELAY_MS, move || match admin {
                        Some(admin) => ctx.current.set(Some(admin)),
                        None => refresh_session(ctx, checked),
                    })
                    .forget();
                }
                Err(e) => ctx.notifier.api_error(&e, "Erro ao realizar login"),
            }
        });
    };
    let on_keydown = move |e: web_sys::KeyboardEvent| {
        if e.key() == "Enter" {
            submit();
        }
    };

    view! {
        <div style="display: flex; align-items: center; justify-content: center; min-height: 100vh;">
            <div style="width: 320px; background: #13161f; border: 1px solid #282c3e; border-radius: 8px; padding: 28px;">
                <h1 style="margin: 0 0 18px; font-family: 'Silkscreen', monospace; font-size: 1.1rem; letter-spacing: 0.12em; color: #f5c542;">"WebLurk Admin"</h1>
                <input
                    type="text"
                    placeholder="Login"
                    style=format!("{INPUT} width: 100%; box-sizing: border-box; margin-bottom: 10px;")
                    prop:value=move || login.get()
                    on:input=move |e| login.set(event_target_value(&e))
                    on:keydown=on_keydown
                />
                <input
                    type="password"
                    placeholder="Senha"
                    style=format!("{INPUT} width: 100%; box-sizing: border-box; margin-bottom: 16px;")
                    prop:value=move || password.get()
                    on:input=move |e| password.set(event_target_value(&e))
                    on:keydown=on_keydown
                />
                <button style=format!("{BUTTON} width: 100%;") on:click=move |_| submit()>"Entrar"</button>
            </div>
        </div>
    }
}

#[component]
fn ConsoleShell() -> impl IntoView {
    let ctx: AdminContext = expect_context();
    let section = RwSignal::new(Section::default());

    let logout = move |_| {
        spawn_local(async move {
            match api::logout().await {
                Ok(()) => ctx.notifier.success("Logout realizado com sucesso!"),
                Err(e) => tracing::warn!(error = %e, "logout call failed"),
            }
            ctx.current.set(None);
        });
    };
    let admin_name = move || ctx.current.get().map(|a| a.login).unwrap_or_default();
    let verbose = move || ctx.settings.get().verbose_logging;

    view! {
        <div style="max-width: 1200px; margin: 0 auto; padding: 24px;">
            <header style="display: flex; align-items: center; justify-content: space-between; gap: 12px; flex-wrap: wrap; padding-bottom: 14px; border-bottom: 1px solid #282c3e;">
                <h1 style="margin: 0; font-family: 'Silkscreen', monospace; font-size: 1.1rem; letter-spacing: 0.12em; color: #f5c542;">"WebLurk Admin"</h1>
                <nav style="display: flex; gap: 6px;">
                    {Section::ALL
                        .into_iter()
                        .map(|s| {
                            let style = move || {
                                let border = if section.get() == s { "#f5c542" } else { "#282c3e" };
                                format!("{BUTTON} border-color: {border};")
                            };
                            view! {
                                <button style=style on:click=move |_| section.set(s)>{s.title()}</button>
                            }
                        })
                        .collect_view()}
                </nav>
                <div style="display: flex; align-items: center; gap: 10px; font-size: 0.8rem; color: #9a9590;">
                    <label style="display: flex; align-items: center; gap: 4px; cursor: pointer;">
                        <input
                            type="checkbox"
                            prop:checked=verbose
                            on:change=move |_| ctx.settings.update(|s| s.verbose_logging = !s.verbose_logging)
                        />
                        "Logs detalhados"
                    </label>
                    <span>{admin_name}</span>
                    <button style=BUTTON on:click=logout>"Sair"</button>
                </div>
            </header>
            <main style="margin-top: 20px;">
                {move || match section.get() {
                    Section::Admins => view! { <accounts::AccountsSection /> }.into_any(),
                    Section::Schedule => view! { <schedule::ScheduleSection /> }.into_any(),
                    Section::Ranking => view! { <ranking::RankingSection /> }.into_any(),
                    Section::Online => view! { <online::OnlineSection /> }.into_any(),
                }}
            </main>
        </div>
    }
}
