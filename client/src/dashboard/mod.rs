mod session;

use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use weblurk_shared::schedule::ScheduleSlot;
use weblurk_shared::time_format::format_long_date_br;
use weblurk_shared::{SessionPhase, WindowMode};

use crate::notify::{Notifier, ToastView};
use session::SessionSignals;

struct UnloadBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::Event)>,
}

thread_local! {
    static UNLOAD_BINDING: RefCell<Option<UnloadBinding>> = const { RefCell::new(None) };
}

fn bind_unload() {
    let Some(window) = web_sys::window() else {
        return;
    };
    unbind_unload();
    let handler = Closure::<dyn Fn(web_sys::Event)>::new(move |_e: web_sys::Event| {
        session::close_on_unload();
    });
    if window
        .add_event_listener_with_callback("beforeunload", handler.as_ref().unchecked_ref())
        .is_err()
    {
        return;
    }
    UNLOAD_BINDING.with(|slot| {
        *slot.borrow_mut() = Some(UnloadBinding { window, handler });
    });
}

fn unbind_unload() {
    UNLOAD_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "beforeunload",
                old.handler.as_ref().unchecked_ref(),
            );
        }
    });
}

fn status_text(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Active => "Lurk ativo - Gerando pontos...",
        SessionPhase::Starting => "Iniciando lurk...",
        SessionPhase::Stopped => "Inicie o lurk para acompanhar a agenda",
    }
}

/// Viewer dashboard root.
#[component]
pub fn Dashboard() -> impl IntoView {
    let notifier = Notifier::new();
    provide_context(notifier);
    let signals = SessionSignals::new(notifier);
    provide_context(signals);

    Effect::new(move || {
        session::install(signals);
        bind_unload();
        on_cleanup(|| {
            unbind_unload();
            session::uninstall();
        });
    });

    let today = format_long_date_br(chrono::Local::now().date_naive());

    view! {
        <div style="min-height: 100vh; background: #0c0e17; color: #e2e0d8; font-family: 'Inter', system-ui, sans-serif;">
            <ToastView />
            <div style="max-width: 1100px; margin: 0 auto; padding: 32px 24px;">
                <header style="display: flex; align-items: baseline; justify-content: space-between; margin-bottom: 24px; border-bottom: 1px solid #282c3e; padding-bottom: 16px;">
                    <h1 style="margin: 0; font-family: 'Silkscreen', monospace; font-size: 1.4rem; letter-spacing: 0.12em; color: #f5c542;">"WebLurk"</h1>
                    <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; color: #9a9590;">{today}</span>
                </header>
                <LurkPanel />
                <ScheduleGrid />
            </div>
        </div>
    }
}

#[component]
fn LurkPanel() -> impl IntoView {
    let signals: SessionSignals = expect_context();
    let SessionSignals {
        phase,
        stopping,
        window_mode,
        nickname,
        nick_input,
        ..
    } = signals;

    let on_keydown = move |e: web_sys::KeyboardEvent| {
        if e.key() == "Enter" {
            session::save_nick();
        }
    };
    let on_mode_change = move |e: leptos::ev::Event| {
        let mode = WindowMode::parse(&event_target_value(&e));
        window_mode.set(mode);
        session::change_mode(mode);
    };

    let lurk_disabled = move || {
        nickname.get().is_none() || phase.get() == SessionPhase::Starting || stopping.get()
    };
    let lurk_label = move || {
        if phase.get() == SessionPhase::Active {
            "Finalizar Lurk"
        } else {
            "Iniciar Lurk"
        }
    };
    let lurk_style = move || {
        let (bg, border) = if phase.get() == SessionPhase::Active {
            ("#3a1518", "#d64550")
        } else {
            ("#12301f", "#2f9e5b")
        };
        format!(
            "padding: 10px 20px; border-radius: 6px; background: {bg}; border: 1px solid {border}; color: #e2e0d8; font-size: 0.9rem; cursor: pointer; opacity: {};",
            if lurk_disabled() { "0.5" } else { "1" }
        )
    };

    let status = move || {
        if stopping.get() {
            "Finalizando lurk..."
        } else {
            status_text(phase.get())
        }
    };

    view! {
        <section style="background: #13161f; border: 1px solid #282c3e; border-radius: 8px; padding: 20px; margin-bottom: 24px;">
            <div style="display: flex; gap: 8px; flex-wrap: wrap; align-items: center;">
                <input
                    type="text"
                    placeholder="Nick do seu canal"
                    style="flex: 1; min-width: 200px; padding: 10px 14px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; font-size: 0.9rem; outline: none;"
                    prop:value=move || nick_input.get()
                    on:input=move |e| nick_input.set(event_target_value(&e))
                    on:keydown=on_keydown
                />
                <button
                    style="padding: 10px 16px; border-radius: 6px; background: #1a1d2a; border: 1px solid #f5c542; color: #f5c542; cursor: pointer;"
                    on:click=move |_| session::save_nick()
                >
                    "Salvar Nick"
                </button>
            </div>
            <div style="display: flex; gap: 12px; align-items: center; margin-top: 16px; flex-wrap: wrap;">
                <select
                    on:change=on_mode_change
                    style="padding: 9px 10px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; font-size: 0.85rem;"
                >
                    {WindowMode::ALL
                        .into_iter()
                        .map(|mode| {
                            view! {
                                <option value=mode.as_str() selected=move || window_mode.get() == mode>
                                    {mode.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <button
                    style=lurk_style
                    prop:disabled=lurk_disabled
                    on:click=move |_| session::toggle_lurk()
                >
                    {lurk_label}
                </button>
                <span style="font-size: 0.85rem; color: #9a9590;">{status}</span>
            </div>
        </section>
    }
}

#[component]
fn ScheduleGrid() -> impl IntoView {
    let signals: SessionSignals = expect_context();
    let slots = signals.slots;
    let loading = signals.schedule_loading;

    view! {
        <section>
            <h2 style="font-family: 'Silkscreen', monospace; font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.14em; color: #5a5860; margin: 0 0 12px;">
                "Agenda do dia"
            </h2>
            <Show
                when=move || !loading.get()
                fallback=|| view! { <div style="color: #5a5860; font-size: 0.85rem;">"Carregando agenda..."</div> }
            >
                <div style="display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 10px;">
                    {move || slots.get().into_iter().map(slot_view).collect_view()}
                </div>
            </Show>
        </section>
    }
}

fn slot_view(slot: ScheduleSlot) -> impl IntoView {
    let border = if slot.is_active() { "#f5c542" } else { "#282c3e" };
    let body = match slot.entry {
        Some(entry) => {
            let url = entry.channel_url();
            view! {
                <div style="font-weight: 600; margin-top: 6px;">{entry.channel_name.clone()}</div>
                <a href=url target="_blank" style="display: block; margin-top: 4px; font-size: 0.7rem; color: #6cb4ee; overflow: hidden; text-overflow: ellipsis; white-space: nowrap;">
                    {entry.platform_link_prefix.clone()}
                </a>
            }
            .into_any()
        }
        None => view! {
            <div style="margin-top: 6px; font-size: 0.8rem; color: #5a5860;">"Horário vago"</div>
        }
        .into_any(),
    };
    view! {
        <div style=format!("background: #13161f; border: 1px solid {border}; border-radius: 6px; padding: 12px;")>
            <div style="font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; color: #9a9590;">{slot.label}</div>
            {body}
        </div>
    }
}
