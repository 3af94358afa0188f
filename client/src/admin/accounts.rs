use leptos::prelude::*;

use weblurk_shared::admin::{AccountActions, account_actions, new_admin_credentials, new_password};
use weblurk_shared::api::AdminAccount;
use weblurk_shared::time_format::format_date_br;

use super::{
    AdminContext, BUTTON, BUTTON_DANGER, BUTTON_WARN, EMPTY_ROW, INPUT, TABLE, TD, TH, badge,
};
use crate::api;
use crate::browser::{confirm, prompt};

fn load_admins(ctx: AdminContext, admins: RwSignal<Vec<AdminAccount>>) {
    ctx.load(admins, "Erro ao carregar administradores", api::list_admins());
}

#[component]
pub fn AccountsSection() -> impl IntoView {
    let ctx: AdminContext = expect_context();
    let admins = RwSignal::new(Vec::<AdminAccount>::new());
    let form_open = RwSignal::new(false);
    let new_login = RwSignal::new(String::new());
    let new_secret = RwSignal::new(String::new());

    load_admins(ctx, admins);

    let create = move || {
        let credentials =
            match new_admin_credentials(&new_login.get_untracked(), &new_secret.get_untracked()) {
                Ok(credentials) => credentials,
                Err(e) => {
                    ctx.notifier.api_error(&e, "");
                    return;
                }
            };
        ctx.act(
            "Erro ao criar administrador",
            async move { api::create_admin(&credentials).await },
            move || {
                new_login.set(String::new());
                new_secret.set(String::new());
                form_open.set(false);
                load_admins(ctx, admins);
            },
        );
    };
    let on_keydown = move |e: web_sys::KeyboardEvent| {
        if e.key() == "Enter" {
            create();
        }
    };

    view! {
        <section>
            <div style="display: flex; align-items: center; justify-content: space-between; margin-bottom: 14px;">
                <h2 style="margin: 0; font-size: 1rem;">"Administradores"</h2>
                <button style=BUTTON on:click=move |_| form_open.update(|open| *open = !*open)>
                    {move || if form_open.get() { "Cancelar" } else { "Novo Administrador" }}
                </button>
            </div>
            <Show when=move || form_open.get()>
                <div style="display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 14px;">
                    <input
                        type="text"
                        placeholder="Login"
                        style=INPUT
                        prop:value=move || new_login.get()
                        on:input=move |e| new_login.set(event_target_value(&e))
                        on:keydown=on_keydown
                    />
                    <input
                        type="password"
                        placeholder="Senha"
                        style=INPUT
                        prop:value=move || new_secret.get()
                        on:input=move |e| new_secret.set(event_target_value(&e))
                        on:keydown=on_keydown
                    />
                    <button style=BUTTON on:click=move |_| create()>"Criar"</button>
                </div>
            </Show>
            <table style=TABLE>
                <thead>
                    <tr>
                        <th style=TH>"ID"</th>
                        <th style=TH>"Login"</th>
                        <th style=TH>"Tipo"</th>
                        <th style=TH>"Criado em"</th>
                        <th style=TH>"Ações"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let rows = admins.get();
                        if rows.is_empty() {
                            return view! {
                                <tr><td colspan="5" style=EMPTY_ROW>"Nenhum administrador encontrado."</td></tr>
                            }
                            .into_any();
                        }
                        let current = ctx.current.get();
                        rows.into_iter()
                            .map(|row| account_row(ctx, admins, row, current.as_ref()))
                            .collect_view()
                            .into_any()
                    }}
                </tbody>
            </table>
        </section>
    }
}

fn account_row(
    ctx: AdminContext,
    admins: RwSignal<Vec<AdminAccount>>,
    row: AdminAccount,
    current: Option<&AdminAccount>,
) -> impl IntoView + use<> {
    let actions = current.map(|current| account_actions(&row, current));
    let role = if row.criador {
        badge("Criador", "#2e2612", "#f5c542").into_any()
    } else {
        badge("Admin", "#1a2436", "#6cb4ee").into_any()
    };
    let created = row
        .data_criacao
        .as_deref()
        .and_then(format_date_br)
        .unwrap_or_else(|| "-".to_string());

    let change_password = move |_| {
        let raw = prompt("Digite a nova senha:", "");
        match new_password(raw.as_deref()) {
            Ok(Some(password)) => ctx.act(
                "Erro ao alterar senha",
                api::change_password(password),
                || {},
            ),
            Ok(None) => {}
            Err(e) => ctx.notifier.api_error(&e, ""),
        }
    };
    let (id, login) = (row.id, row.login.clone());
    let delete = move |_| {
        if !confirm(&format!(
            "Tem certeza que deseja excluir o administrador \"{login}\"?"
        )) {
            return;
        }
        ctx.act("Erro ao excluir administrador", api::delete_admin(id), move || {
            load_admins(ctx, admins)
        });
    };

    let buttons = match actions {
        None | Some(AccountActions::Protected) => view! {
            <span style="font-size: 0.75rem; color: #5a5860;">"Protegido"</span>
        }
        .into_any(),
        Some(AccountActions::Allowed {
            change_password: can_change,
            delete: can_delete,
        }) => view! {
            {can_change.then(|| view! {
                <button style=BUTTON_WARN on:click=change_password>"Alterar Senha"</button>
            })}
            {can_delete.then(|| view! {
                <button style=BUTTON_DANGER on:click=delete>"Excluir"</button>
            })}
        }
        .into_any(),
    };

    view! {
        <tr>
            <td style=TD>{row.id}</td>
            <td style=TD>{row.login.clone()}</td>
            <td style=TD>{role}</td>
            <td style=TD>{created}</td>
            <td style=TD>{buttons}</td>
        </tr>
    }
}
