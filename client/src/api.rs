//! Calls against the WebLurk HTTP API.
//!
//! JSON bodies are decoded whatever the HTTP status, since the server reports
//! failures as `{success: false, message}` on 4xx/5xx as well. Only a request
//! that never completes or a body that does not decode is a transport error.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;

use weblurk_shared::api::{
    Ack, AdminAccount, AdminListResponse, AdminSession, ChangePasswordRequest, Credentials,
    EditPointsRequest, LoginResponse, LurkStatus, NickRequest, OnlineUserItem,
    OnlineUsersResponse, RankingItem, RankingResponse, SaveNickResponse, ScheduleItem,
    ScheduleResponse, StartLurkRequest, accept,
};
use weblurk_shared::config::api_url;
use weblurk_shared::{ApiError, WindowMode};

fn transport(path: &str, detail: String) -> ApiError {
    tracing::warn!(path, %detail, "request failed");
    ApiError::Transport(detail)
}

async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T, ApiError> {
    resp.json::<T>()
        .await
        .map_err(|e| transport(path, format!("parse error: {e}")))
}

async fn send(path: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
    builder
        .send()
        .await
        .map_err(|e| transport(path, format!("fetch error: {e}")))
}

async fn send_request(path: &str, request: Request) -> Result<Response, ApiError> {
    request
        .send()
        .await
        .map_err(|e| transport(path, format!("fetch error: {e}")))
}

async fn get<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    let resp = send(path, Request::get(&api_url(path))).await?;
    decode(path, resp).await
}

async fn with_json<B, T>(path: &str, builder: RequestBuilder, body: &B) -> Result<T, ApiError>
where
    B: Serialize,
    T: DeserializeOwned,
{
    let request = builder
        .json(body)
        .map_err(|e| transport(path, format!("encode error: {e}")))?;
    let resp = send_request(path, request).await?;
    decode(path, resp).await
}

async fn post_json<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> Result<T, ApiError> {
    with_json(path, Request::post(&api_url(path)), body).await
}

async fn put_json<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> Result<T, ApiError> {
    with_json(path, Request::put(&api_url(path)), body).await
}

async fn post_empty<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    let resp = send(path, Request::post(&api_url(path))).await?;
    decode(path, resp).await
}

async fn delete<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    let resp = send(path, Request::delete(&api_url(path))).await?;
    decode(path, resp).await
}

// Viewer

pub async fn save_nick(nick: &str) -> Result<SaveNickResponse, ApiError> {
    let body = NickRequest {
        nick_canal: nick.to_string(),
    };
    accept(post_json::<_, SaveNickResponse>("/salvar-nick", &body).await?)
}

pub async fn start_lurk(mode: WindowMode) -> Result<String, ApiError> {
    let body = StartLurkRequest { tipo_janela: mode };
    post_json::<_, Ack>("/iniciar-lurk", &body).await?.into_result()
}

pub async fn stop_lurk() -> Result<String, ApiError> {
    post_empty::<Ack>("/finalizar-lurk").await?.into_result()
}

pub async fn lurk_status() -> Result<LurkStatus, ApiError> {
    get("/status-lurk").await
}

pub async fn current_schedule() -> Result<Vec<ScheduleItem>, ApiError> {
    Ok(accept(get::<ScheduleResponse>("/agenda-atual").await?)?.agenda)
}

// Admin accounts

pub async fn check_session() -> Result<AdminSession, ApiError> {
    get("/admin/verificar-sessao").await
}

pub async fn login(credentials: &Credentials) -> Result<LoginResponse, ApiError> {
    accept(post_json::<_, LoginResponse>("/admin/login", credentials).await?)
}

pub async fn logout() -> Result<(), ApiError> {
    let path = "/admin/logout";
    send(path, Request::post(&api_url(path))).await.map(|_| ())
}

pub async fn list_admins() -> Result<Vec<AdminAccount>, ApiError> {
    Ok(accept(get::<AdminListResponse>("/admin/listar-admins").await?)?.admins)
}

pub async fn create_admin(credentials: &Credentials) -> Result<String, ApiError> {
    post_json::<_, Ack>("/admin/criar-admin", credentials)
        .await?
        .into_result()
}

pub async fn change_password(new_password: String) -> Result<String, ApiError> {
    let body = ChangePasswordRequest {
        nova_senha: new_password,
    };
    put_json::<_, Ack>("/admin/alterar-senha", &body)
        .await?
        .into_result()
}

pub async fn delete_admin(id: i64) -> Result<String, ApiError> {
    delete::<Ack>(&format!("/admin/excluir-admin/{id}"))
        .await?
        .into_result()
}

// Schedule admin

pub async fn schedule_items() -> Result<Vec<ScheduleItem>, ApiError> {
    Ok(accept(get::<ScheduleResponse>("/agenda/obter-agenda").await?)?.agenda)
}

pub async fn upload_schedule(file: &web_sys::File) -> Result<String, ApiError> {
    let path = "/agenda/upload";
    let form = web_sys::FormData::new()
        .map_err(|e| transport(path, format!("form error: {e:?}")))?;
    form.append_with_blob("file", file)
        .map_err(|e| transport(path, format!("form error: {e:?}")))?;
    let request = Request::post(&api_url(path))
        .body(form)
        .map_err(|e| transport(path, format!("encode error: {e}")))?;
    let resp = send_request(path, request).await?;
    decode::<Ack>(path, resp).await?.into_result()
}

pub async fn clear_schedule() -> Result<String, ApiError> {
    delete::<Ack>("/agenda/limpar-agenda").await?.into_result()
}

pub async fn delete_schedule_item(id: i64) -> Result<String, ApiError> {
    delete::<Ack>(&format!("/agenda/excluir-item/{id}"))
        .await?
        .into_result()
}

// Ranking admin

pub async fn ranking() -> Result<Vec<RankingItem>, ApiError> {
    Ok(accept(get::<RankingResponse>("/ranking/obter-ranking").await?)?.ranking)
}

pub async fn edit_points(nick: &str, points: u64) -> Result<String, ApiError> {
    let body = EditPointsRequest {
        nick_canal: nick.to_string(),
        pontos: points,
    };
    put_json::<_, Ack>("/ranking/editar-pontos", &body)
        .await?
        .into_result()
}

pub async fn delete_ranking_user(nick: &str) -> Result<String, ApiError> {
    let encoded: String = js_sys::encode_uri_component(nick).into();
    delete::<Ack>(&format!("/ranking/excluir-usuario/{encoded}"))
        .await?
        .into_result()
}

pub async fn clear_ranking() -> Result<String, ApiError> {
    delete::<Ack>("/ranking/limpar-dados").await?.into_result()
}

// Online users

pub async fn online_users() -> Result<Vec<OnlineUserItem>, ApiError> {
    Ok(accept(get::<OnlineUsersResponse>("/weblurk/usuarios-online").await?)?.usuarios)
}

pub async fn disconnect_user(nick: &str) -> Result<String, ApiError> {
    let body = NickRequest {
        nick_canal: nick.to_string(),
    };
    post_json::<_, Ack>("/weblurk/desconectar-usuario", &body)
        .await?
        .into_result()
}

/// Server-generated spreadsheets the console can download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Export {
    ScheduleXlsx,
    RankingXlsx,
    RankingCsv,
    OnlineCsv,
}

impl Export {
    fn path(self) -> &'static str {
        match self {
            Self::ScheduleXlsx => "/agenda/exportar-excel",
            Self::RankingXlsx => "/ranking/exportar-excel",
            Self::RankingCsv => "/ranking/exportar-csv",
            Self::OnlineCsv => "/weblurk/exportar-usuarios-online",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::ScheduleXlsx => "agenda_weblurk.xlsx",
            Self::RankingXlsx => "ranking_weblurk.xlsx",
            Self::RankingCsv => "ranking_weblurk.csv",
            Self::OnlineCsv => "usuarios_online_weblurk.csv",
        }
    }
}

/// Fetch an export and hand it to the browser as a file download.
pub async fn download(export: Export) -> Result<(), ApiError> {
    let path = export.path();
    let resp = send(path, Request::get(&api_url(path))).await?;
    if !resp.ok() {
        let ack: Ack = decode(path, resp).await?;
        return Err(ApiError::Rejected(ack.message));
    }
    let bytes = resp
        .binary()
        .await
        .map_err(|e| transport(path, format!("read error: {e}")))?;
    save_bytes(&bytes, export.file_name()).map_err(|detail| transport(path, detail))
}

fn save_bytes(bytes: &[u8], file_name: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let body = document.body().ok_or("no body")?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let blob = web_sys::Blob::new_with_u8_array_sequence(&parts)
        .map_err(|e| format!("blob error: {e:?}"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|e| format!("object url error: {e:?}"))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("dom error: {e:?}"))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "anchor cast failed".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    let _ = body.append_child(&anchor);
    anchor.click();
    anchor.remove();
    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}
