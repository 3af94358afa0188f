use std::cell::RefCell;

use gloo_timers::callback::Interval;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use weblurk_shared::WindowMode;
use weblurk_shared::api::OnlineUserItem;
use weblurk_shared::online::{
    OnlineFilter, OnlineOrder, OnlineRoster, last_activity_label, parse_refresh_interval,
    time_online, user_details,
};
use weblurk_shared::time_format::format_clock_hm;

use super::{AdminContext, BUTTON, BUTTON_WARN, EMPTY_ROW, INPUT, StatCard, TABLE, TD, TH, badge};
use crate::api::{self, Export};
use crate::browser::{alert, confirm, prompt};

thread_local! {
    static AUTO_UPDATE: RefCell<Option<Interval>> = const { RefCell::new(None) };
}

#[derive(Clone, Copy)]
struct OnlineState {
    roster: RwSignal<OnlineRoster>,
    last_update: RwSignal<Option<String>>,
    auto_update: RwSignal<bool>,
}

impl OnlineState {
    async fn fetch(self, ctx: AdminContext) -> bool {
        match api::online_users().await {
            Ok(users) => {
                self.roster.update(|r| r.reload(users));
                self.last_update
                    .set(Some(format_clock_hm(&chrono::Local::now())));
                true
            }
            Err(e) => {
                ctx.notifier.api_error(&e, "Erro ao carregar usuários online");
                false
            }
        }
    }

    fn load(self, ctx: AdminContext) {
        ctx.spawn(async move {
            self.fetch(ctx).await;
        });
    }

    fn start_auto_update(self, ctx: AdminContext) {
        let secs = ctx.settings.get_untracked().online_refresh_secs;
        let interval = Interval::new(secs.saturating_mul(1000), move || {
            spawn_local(async move {
                self.fetch(ctx).await;
            });
        });
        // Replacing the old binding drops and clears its interval.
        AUTO_UPDATE.with(|slot| *slot.borrow_mut() = Some(interval));
        self.auto_update.set(true);
        tracing::debug!(secs, "online auto-update running");
    }

    fn stop_auto_update(self) {
        AUTO_UPDATE.with(|slot| slot.borrow_mut().take());
        self.auto_update.set(false);
    }
}

fn refilter(roster: RwSignal<OnlineRoster>, edit: impl FnOnce(&mut OnlineFilter)) {
    roster.update(|r| {
        let mut filter = r.filter().clone();
        edit(&mut filter);
        r.set_filter(filter);
    });
}

#[component]
pub fn OnlineSection() -> impl IntoView {
    let ctx: AdminContext = expect_context();
    let state = OnlineState {
        roster: RwSignal::new(OnlineRoster::default()),
        last_update: RwSignal::new(None),
        auto_update: RwSignal::new(false),
    };
    let roster = state.roster;
    state.load(ctx);
    on_cleanup(move || {
        AUTO_UPDATE.with(|slot| slot.borrow_mut().take());
    });

    let on_mode = move |e: leptos::ev::Event| {
        let raw = event_target_value(&e);
        let mode = (!raw.is_empty()).then(|| WindowMode::parse(&raw));
        refilter(roster, |f| f.window_mode = mode);
    };
    let on_order = move |e: leptos::ev::Event| {
        let order = OnlineOrder::parse(&event_target_value(&e));
        roster.update(|r| r.set_order(order));
    };

    let refresh = move |_| {
        ctx.spawn(async move {
            if state.fetch(ctx).await {
                ctx.notifier.success("Lista de usuários online atualizada!");
            }
        });
    };
    let toggle_auto = move |_| {
        if state.auto_update.get_untracked() {
            state.stop_auto_update();
            ctx.notifier.success("Auto-update desativado");
        } else {
            state.start_auto_update(ctx);
            let secs = ctx.settings.get_untracked().online_refresh_secs;
            ctx.notifier.success(format!("Auto-update ativado ({secs}s)"));
        }
    };
    let change_interval = move |_| {
        let current = ctx.settings.get_untracked().online_refresh_secs;
        let raw = prompt(
            "Digite o novo intervalo em segundos (mínimo 10):",
            &current.to_string(),
        );
        match parse_refresh_interval(raw.as_deref()) {
            Ok(Some(secs)) => {
                ctx.settings.update(|s| s.online_refresh_secs = secs);
                if state.auto_update.get_untracked() {
                    state.start_auto_update(ctx);
                }
                ctx.notifier
                    .success(format!("Intervalo alterado para {secs} segundos"));
            }
            Ok(None) => {}
            Err(e) => ctx.notifier.api_error(&e, ""),
        }
    };
    let export = move |_| {
        ctx.spawn(async move {
            match api::download(Export::OnlineCsv).await {
                Ok(()) => ctx.notifier.success("Usuários online exportados com sucesso!"),
                Err(e) => ctx.notifier.api_error(&e, "Erro ao exportar usuários online"),
            }
        });
    };

    let stats = Memo::new(move |_| roster.with(|r| r.stats()));

    view! {
        <section>
            <div style="display: flex; align-items: center; justify-content: space-between; margin-bottom: 14px;">
                <h2 style="margin: 0; font-size: 1rem;">"Usuários Online"</h2>
                <span style="font-size: 0.75rem; color: #9a9590;">
                    "Última atualização: "
                    {move || state.last_update.get().unwrap_or_else(|| "-".to_string())}
                    <Show when=move || state.auto_update.get()>
                        {move || format!(" (auto a cada {}s)", ctx.settings.get().online_refresh_secs)}
                    </Show>
                </span>
            </div>
            <div style="display: flex; gap: 10px; flex-wrap: wrap; margin-bottom: 16px;">
                <StatCard label="Online" value=Signal::derive(move || stats.get().total.to_string()) />
                <StatCard label="Pop-Up" value=Signal::derive(move || stats.get().popup.to_string()) />
                <StatCard label="Tab" value=Signal::derive(move || stats.get().tab.to_string()) />
            </div>
            <div style="display: flex; gap: 8px; flex-wrap: wrap; align-items: center; margin-bottom: 16px;">
                <input
                    type="text"
                    placeholder="Buscar canal..."
                    style=INPUT
                    prop:value=move || roster.with(|r| r.filter().search.clone())
                    on:input=move |e| {
                        let search = event_target_value(&e);
                        refilter(roster, |f| f.search = search);
                    }
                />
                <select style=INPUT on:change=on_mode>
                    <option value="">"Todas as janelas"</option>
                    {WindowMode::ALL
                        .into_iter()
                        .map(|mode| view! { <option value=mode.as_str()>{mode.label()}</option> })
                        .collect_view()}
                </select>
                <select style=INPUT on:change=on_order>
                    {OnlineOrder::ALL
                        .into_iter()
                        .map(|order| {
                            view! {
                                <option value=order.as_str() selected=move || roster.with(|r| r.order() == order)>
                                    {order.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <button style=BUTTON on:click=refresh>"Atualizar"</button>
                <button style=BUTTON on:click=toggle_auto>
                    {move || if state.auto_update.get() { "Desativar Auto-Update" } else { "Ativar Auto-Update" }}
                </button>
                <button style=BUTTON on:click=change_interval>"Alterar Intervalo"</button>
                <button style=BUTTON on:click=export>"Exportar CSV"</button>
            </div>
            <table style=TABLE>
                <thead>
                    <tr>
                        <th style=TH>"Canal"</th>
                        <th style=TH>"Pontos"</th>
                        <th style=TH>"Janela"</th>
                        <th style=TH>"Tempo Online"</th>
                        <th style=TH>"Última Atividade"</th>
                        <th style=TH>"Ações"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let users = roster.with(|r| r.view().to_vec());
                        if users.is_empty() {
                            return view! {
                                <tr><td colspan="6" style=EMPTY_ROW>"Nenhum usuário online no momento."</td></tr>
                            }
                            .into_any();
                        }
                        let now = chrono::Utc::now();
                        users
                            .into_iter()
                            .map(|user| online_row(ctx, state, user, now))
                            .collect_view()
                            .into_any()
                    }}
                </tbody>
            </table>
        </section>
    }
}

fn online_row(
    ctx: AdminContext,
    state: OnlineState,
    user: OnlineUserItem,
    now: chrono::DateTime<chrono::Utc>,
) -> impl IntoView {
    let mode = match user.tipo_janela {
        WindowMode::Popup => badge(WindowMode::Popup.label(), "#1a2436", "#6cb4ee").into_any(),
        WindowMode::Tab => badge(WindowMode::Tab.label(), "#2e2612", "#f5c542").into_any(),
    };
    let online_for = time_online(&user, now);
    let last_seen = last_activity_label(&user);

    let disconnect = {
        let nick = user.nick_canal.clone();
        move |_| {
            if !confirm(&format!(
                "Tem certeza que deseja desconectar o usuário \"{nick}\"?"
            )) {
                return;
            }
            let nick = nick.clone();
            ctx.act(
                "Erro ao desconectar usuário",
                async move { api::disconnect_user(&nick).await },
                move || state.load(ctx),
            );
        }
    };
    let details = {
        let nick = user.nick_canal.clone();
        move |_| {
            let text = state
                .roster
                .with_untracked(|r| r.find(&nick).map(|u| user_details(u, chrono::Utc::now())));
            match text {
                Some(text) => alert(&text),
                None => ctx.notifier.error("Usuário não encontrado"),
            }
        }
    };

    view! {
        <tr>
            <td style=format!("{TD} font-weight: 600;")>
                <span style="display: inline-block; width: 8px; height: 8px; border-radius: 50%; background: #2f9e5b; margin-right: 8px;"></span>
                {user.nick_canal.clone()}
            </td>
            <td style=TD>{badge(user.pontos.to_string(), "#1a2436", "#e2e0d8")}</td>
            <td style=TD>{mode}</td>
            <td style=format!("{TD} color: #6fdc9a;")>{online_for}</td>
            <td style=TD>{last_seen}</td>
            <td style=TD>
                <button style=BUTTON_WARN on:click=disconnect>"Desconectar"</button>
                <button style=BUTTON on:click=details>"Detalhes"</button>
            </td>
        </tr>
    }
}
