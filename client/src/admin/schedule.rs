use leptos::html;
use leptos::prelude::*;

use weblurk_shared::admin::validate_upload;
use weblurk_shared::api::ScheduleItem;
use weblurk_shared::schedule::ScheduleStats;
use weblurk_shared::time_format::format_date_br;

use super::{AdminContext, BUTTON, BUTTON_DANGER, EMPTY_ROW, StatCard, TABLE, TD, TH};
use crate::api::{self, Export};
use crate::browser::confirm;

const CLEAR_CONFIRM: &str =
    "Tem certeza que deseja limpar toda a agenda? Esta ação não pode ser desfeita.";

fn load_items(ctx: AdminContext, items: RwSignal<Vec<ScheduleItem>>) {
    ctx.load(items, "Erro ao carregar agenda", api::schedule_items());
}

#[component]
pub fn ScheduleSection() -> impl IntoView {
    let ctx: AdminContext = expect_context();
    let items = RwSignal::new(Vec::<ScheduleItem>::new());
    let file_input = NodeRef::<html::Input>::new();

    load_items(ctx, items);

    let upload = move |_| {
        let file = file_input
            .get_untracked()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        let mime = file.as_ref().map(|f| f.type_());
        if let Err(e) = validate_upload(mime.as_deref()) {
            ctx.notifier.api_error(&e, "");
            return;
        }
        let Some(file) = file else {
            return;
        };
        ctx.act(
            "Erro ao fazer upload do arquivo",
            async move { api::upload_schedule(&file).await },
            move || {
                if let Some(input) = file_input.get_untracked() {
                    input.set_value("");
                }
                load_items(ctx, items);
            },
        );
    };
    let export = move |_| {
        ctx.spawn(async move {
            match api::download(Export::ScheduleXlsx).await {
                Ok(()) => ctx.notifier.success("Agenda exportada com sucesso!"),
                Err(e) => ctx.notifier.api_error(&e, "Erro ao exportar agenda"),
            }
        });
    };
    let clear = move |_| {
        if !confirm(CLEAR_CONFIRM) {
            return;
        }
        ctx.act("Erro ao limpar agenda", api::clear_schedule(), move || {
            load_items(ctx, items)
        });
    };

    let stats = Memo::new(move |_| items.with(|i| ScheduleStats::from_items(i)));

    view! {
        <section>
            <h2 style="margin: 0 0 14px; font-size: 1rem;">"Agenda"</h2>
            <div style="display: flex; gap: 10px; flex-wrap: wrap; margin-bottom: 16px;">
                <StatCard label="Itens" value=Signal::derive(move || stats.get().total_items.to_string()) />
                <StatCard label="Horários ocupados" value=Signal::derive(move || stats.get().filled_hours.to_string()) />
                <StatCard label="Horários vagos" value=Signal::derive(move || stats.get().vacant_hours.to_string()) />
            </div>
            <div style="display: flex; gap: 8px; flex-wrap: wrap; align-items: center; margin-bottom: 16px;">
                <input
                    type="file"
                    accept=".xlsx,.xls,.csv"
                    node_ref=file_input
                    style="font-size: 0.8rem; color: #9a9590;"
                />
                <button style=BUTTON on:click=upload>"Enviar Agenda"</button>
                <button style=BUTTON on:click=export>"Exportar Excel"</button>
                <button style=BUTTON_DANGER on:click=clear>"Limpar Agenda"</button>
            </div>
            <table style=TABLE>
                <thead>
                    <tr>
                        <th style=TH>"Hora"</th>
                        <th style=TH>"Data"</th>
                        <th style=TH>"Canal"</th>
                        <th style=TH>"Link"</th>
                        <th style=TH>"Ações"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let rows = items.get();
                        if rows.is_empty() {
                            return view! {
                                <tr>
                                    <td colspan="5" style=EMPTY_ROW>
                                        "Nenhum item na agenda. Faça upload de um arquivo Excel/CSV."
                                    </td>
                                </tr>
                            }
                            .into_any();
                        }
                        rows.into_iter()
                            .map(|item| schedule_row(ctx, items, item))
                            .collect_view()
                            .into_any()
                    }}
                </tbody>
            </table>
        </section>
    }
}

fn schedule_row(
    ctx: AdminContext,
    items: RwSignal<Vec<ScheduleItem>>,
    item: ScheduleItem,
) -> impl IntoView {
    let date = item
        .data
        .as_deref()
        .and_then(format_date_br)
        .unwrap_or_else(|| "-".to_string());
    let id = item.id;
    let delete = move |_| {
        let Some(id) = id else {
            return;
        };
        if !confirm("Tem certeza que deseja excluir este item da agenda?") {
            return;
        }
        ctx.act(
            "Erro ao excluir item da agenda",
            api::delete_schedule_item(id),
            move || load_items(ctx, items),
        );
    };

    view! {
        <tr>
            <td style=format!("{TD} font-family: 'JetBrains Mono', monospace;")>{item.hora.clone()}</td>
            <td style=TD>{date}</td>
            <td style=TD>{item.nome_canal.clone()}</td>
            <td style=TD>
                <a href=item.link_plataforma.clone() target="_blank" style="color: #6cb4ee;">
                    {item.link_plataforma.clone()}
                </a>
            </td>
            <td style=TD>
                <button style=BUTTON_DANGER prop:disabled=id.is_none() on:click=delete>"Excluir"</button>
            </td>
        </tr>
    }
}
