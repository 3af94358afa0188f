use leptos::prelude::*;

use weblurk_shared::admin::parse_points;
use weblurk_shared::ranking::{RankedRow, SortDirection};
use weblurk_shared::{RankingFilter, RankingList, SortField, WindowMode};

use super::{
    AdminContext, BUTTON, BUTTON_DANGER, BUTTON_WARN, EMPTY_ROW, INPUT, StatCard, TABLE, TD, TH,
    badge,
};
use crate::api::{self, Export};
use crate::browser::{confirm, prompt};

const CLEAR_CONFIRM: &str =
    "Tem certeza que deseja limpar todos os dados do ranking? Esta ação não pode ser desfeita.";

const COLUMNS: [(SortField, &str); 6] = [
    (SortField::Rank, "#"),
    (SortField::Nick, "Canal"),
    (SortField::Points, "Pontos"),
    (SortField::Average, "Média"),
    (SortField::Online, "Status"),
    (SortField::WindowMode, "Janela"),
];

#[derive(Clone, Copy)]
struct RankingState {
    list: RwSignal<RankingList>,
    filter: RwSignal<RankingFilter>,
}

impl RankingState {
    /// A reload shows the whole list again, so the filter controls reset too.
    fn load(self, ctx: AdminContext) {
        ctx.spawn(async move {
            match api::ranking().await {
                Ok(entries) => {
                    self.filter.set(RankingFilter::default());
                    self.list.update(|list| list.reload(entries));
                }
                Err(e) => ctx.notifier.api_error(&e, "Erro ao carregar ranking"),
            }
        });
    }

    fn refilter(self, edit: impl FnOnce(&mut RankingFilter)) {
        self.filter.update(edit);
        let filter = self.filter.get_untracked();
        self.list.update(|list| list.filter(&filter));
    }
}

fn export(ctx: AdminContext, export: Export, done: &'static str) {
    ctx.spawn(async move {
        match api::download(export).await {
            Ok(()) => ctx.notifier.success(done),
            Err(e) => ctx.notifier.api_error(&e, "Erro ao exportar ranking"),
        }
    });
}

#[component]
pub fn RankingSection() -> impl IntoView {
    let ctx: AdminContext = expect_context();
    let state = RankingState {
        list: RwSignal::new(RankingList::default()),
        filter: RwSignal::new(RankingFilter::default()),
    };
    let list = state.list;
    state.load(ctx);

    let on_mode = move |e: leptos::ev::Event| {
        let raw = event_target_value(&e);
        state.refilter(|f| f.window_mode = (!raw.is_empty()).then(|| WindowMode::parse(&raw)));
    };
    let on_online = move |e: leptos::ev::Event| {
        let online = match event_target_value(&e).as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        };
        state.refilter(|f| f.online = online);
    };
    let clear = move |_| {
        if !confirm(CLEAR_CONFIRM) {
            return;
        }
        ctx.act("Erro ao limpar ranking", api::clear_ranking(), move || state.load(ctx));
    };

    let stats = Memo::new(move |_| list.with(|l| l.stats()));
    let window = Memo::new(move |_| list.with(|l| l.page_window()));

    view! {
        <section>
            <h2 style="margin: 0 0 14px; font-size: 1rem;">"Ranking"</h2>
            <div style="display: flex; gap: 10px; flex-wrap: wrap; margin-bottom: 16px;">
                <StatCard label="Usuários" value=Signal::derive(move || stats.get().total_users.to_string()) />
                <StatCard label="Online" value=Signal::derive(move || stats.get().online_users.to_string()) />
                <StatCard label="Pontos totais" value=Signal::derive(move || stats.get().total_points.to_string()) />
                <StatCard label="Média de pontos" value=Signal::derive(move || stats.get().mean_points_label) />
            </div>
            <div style="display: flex; gap: 8px; flex-wrap: wrap; align-items: center; margin-bottom: 16px;">
                <input
                    type="text"
                    placeholder="Buscar canal..."
                    style=INPUT
                    prop:value=move || state.filter.get().search
                    on:input=move |e| {
                        let search = event_target_value(&e);
                        state.refilter(|f| f.search = search);
                    }
                />
                <select style=INPUT on:change=on_mode>
                    <option value="" selected=move || state.filter.get().window_mode.is_none()>"Todas as janelas"</option>
                    {WindowMode::ALL
                        .into_iter()
                        .map(|mode| {
                            view! {
                                <option value=mode.as_str() selected=move || state.filter.get().window_mode == Some(mode)>
                                    {mode.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <select style=INPUT on:change=on_online>
                    <option value="" selected=move || state.filter.get().online.is_none()>"Todos"</option>
                    <option value="true" selected=move || state.filter.get().online == Some(true)>"Online"</option>
                    <option value="false" selected=move || state.filter.get().online == Some(false)>"Offline"</option>
                </select>
                <button style=BUTTON on:click=move |_| export(ctx, Export::RankingXlsx, "Ranking exportado para Excel com sucesso!")>
                    "Exportar Excel"
                </button>
                <button style=BUTTON on:click=move |_| export(ctx, Export::RankingCsv, "Ranking exportado para CSV com sucesso!")>
                    "Exportar CSV"
                </button>
                <button style=BUTTON_DANGER on:click=clear>"Limpar Ranking"</button>
            </div>
            <table style=TABLE>
                <thead>
                    <tr>
                        {COLUMNS
                            .into_iter()
                            .map(|(field, title)| {
                                let arrow = move || {
                                    let (active, direction) = list.with(|l| l.sort_state());
                                    match (active == field, direction) {
                                        (false, _) => "",
                                        (true, SortDirection::Ascending) => " ▲",
                                        (true, SortDirection::Descending) => " ▼",
                                    }
                                };
                                view! {
                                    <th
                                        style=format!("{TH} cursor: pointer; user-select: none;")
                                        on:click=move |_| list.update(|l| l.sort(field))
                                    >
                                        {title}
                                        {arrow}
                                    </th>
                                }
                            })
                            .collect_view()}
                        <th style=TH>"Ações"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let rows = list.with(|l| l.current_page_rows().to_vec());
                        if rows.is_empty() {
                            return view! {
                                <tr><td colspan="7" style=EMPTY_ROW>"Nenhum usuário encontrado no ranking."</td></tr>
                            }
                            .into_any();
                        }
                        rows.into_iter()
                            .map(|row| ranking_row(ctx, state, row))
                            .collect_view()
                            .into_any()
                    }}
                </tbody>
            </table>
            <div style="display: flex; align-items: center; justify-content: space-between; margin-top: 12px; font-size: 0.8rem; color: #9a9590;">
                <span>
                    {move || {
                        let w = window.get();
                        format!("Mostrando {}-{} de {}", w.start, w.end, w.total)
                    }}
                </span>
                <div style="display: flex; gap: 6px;">
                    <button
                        style=BUTTON
                        prop:disabled=move || !list.with(|l| l.has_previous())
                        on:click=move |_| {
                            list.update(|l| {
                                l.previous_page();
                            })
                        }
                    >
                        "Anterior"
                    </button>
                    <button
                        style=BUTTON
                        prop:disabled=move || !list.with(|l| l.has_next())
                        on:click=move |_| {
                            list.update(|l| {
                                l.next_page();
                            })
                        }
                    >
                        "Próximo"
                    </button>
                </div>
            </div>
        </section>
    }
}

fn ranking_row(ctx: AdminContext, state: RankingState, row: RankedRow) -> impl IntoView {
    let rank_style = match row.medal() {
        Some(medal) => format!("{TD} color: {}; font-weight: bold;", medal.color()),
        None => TD.to_string(),
    };
    let crown = (row.rank == 1).then_some("👑 ");
    let status = if row.entry.online {
        badge("● Online", "#12301f", "#6fdc9a").into_any()
    } else {
        badge("● Offline", "#1a1d2a", "#9a9590").into_any()
    };
    let mode = match row.entry.tipo_janela {
        WindowMode::Popup => badge(WindowMode::Popup.label(), "#1a2436", "#6cb4ee").into_any(),
        WindowMode::Tab => badge(WindowMode::Tab.label(), "#2e2612", "#f5c542").into_any(),
    };

    let nick = row.entry.nick_canal.clone();
    let points = row.entry.pontos;
    let edit = {
        let nick = nick.clone();
        move |_| {
            let raw = prompt(&format!("Editar pontos para {nick}:"), &points.to_string());
            match parse_points(raw.as_deref()) {
                Ok(Some(new_points)) => {
                    let nick = nick.clone();
                    ctx.act(
                        "Erro ao editar pontos",
                        async move { api::edit_points(&nick, new_points).await },
                        move || state.load(ctx),
                    );
                }
                Ok(None) => {}
                Err(e) => ctx.notifier.api_error(&e, ""),
            }
        }
    };
    let delete = {
        let nick = nick.clone();
        move |_| {
            if !confirm(&format!(
                "Tem certeza que deseja excluir o usuário \"{nick}\" do ranking?"
            )) {
                return;
            }
            let nick = nick.clone();
            ctx.act(
                "Erro ao excluir usuário",
                async move { api::delete_ranking_user(&nick).await },
                move || state.load(ctx),
            );
        }
    };

    view! {
        <tr>
            <td style=rank_style>{crown}{row.rank}</td>
            <td style=format!("{TD} font-weight: 600;")>{nick}</td>
            <td style=TD>{badge(points.to_string(), "#1a2436", "#e2e0d8")}</td>
            <td style=TD>{format!("{}%", row.average_label())}</td>
            <td style=TD>{status}</td>
            <td style=TD>{mode}</td>
            <td style=TD>
                <button style=BUTTON_WARN on:click=edit>"Editar"</button>
                <button style=BUTTON_DANGER on:click=delete>"Excluir"</button>
            </td>
        </tr>
    }
}
