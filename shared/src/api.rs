//! JSON request and response bodies exchanged with the WebLurk API.
//!
//! Field names follow the server's payloads. Every response that carries a
//! `success` flag implements [`ApiResponse`] so callers can turn
//! `success: false` into [`ApiError::Rejected`] in one place.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;
use crate::window_mode::WindowMode;

pub trait ApiResponse {
    fn success(&self) -> bool;
    fn message(&self) -> &str;
}

/// Keep a successful response, or convert it into the server's rejection.
pub fn accept<T: ApiResponse>(response: T) -> Result<T, ApiError> {
    if response.success() {
        Ok(response)
    } else {
        Err(ApiError::Rejected(response.message().to_string()))
    }
}

macro_rules! impl_api_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ApiResponse for $ty {
                fn success(&self) -> bool {
                    self.success
                }

                fn message(&self) -> &str {
                    &self.message
                }
            }
        )+
    };
}

fn mode_or_default<'de, D>(deserializer: D) -> Result<WindowMode, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(WindowMode::from)
        .unwrap_or_default())
}

/// Plain `{success, message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl Ack {
    /// The server message on success, the rejection otherwise.
    pub fn into_result(self) -> Result<String, ApiError> {
        accept(self).map(|ack| ack.message)
    }
}

/// The viewer record the server keeps per channel nickname.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub nick_canal: String,
    #[serde(default, deserialize_with = "mode_or_default")]
    pub tipo_janela: WindowMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NickRequest {
    pub nick_canal: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveNickResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub usuario: Option<ViewerProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartLurkRequest {
    pub tipo_janela: WindowMode,
}

/// Server view of the caller's lurk session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LurkStatus {
    #[serde(default)]
    pub lurk_ativo: bool,
    #[serde(default)]
    pub usuario: Option<ViewerProfile>,
}

/// One row of the day's programming, as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub hora: String,
    #[serde(default)]
    pub data: Option<String>,
    pub nome_canal: String,
    pub link_plataforma: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub agenda: Vec<ScheduleItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingItem {
    #[serde(alias = "espectador")]
    pub nick_canal: String,
    #[serde(default)]
    pub pontos: u64,
    #[serde(default, deserialize_with = "mode_or_default")]
    pub tipo_janela: WindowMode,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub sessoes_lurk: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ranking: Vec<RankingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPointsRequest {
    pub nick_canal: String,
    pub pontos: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineUserItem {
    pub nick_canal: String,
    #[serde(default)]
    pub pontos: u64,
    #[serde(default, deserialize_with = "mode_or_default")]
    pub tipo_janela: WindowMode,
    #[serde(default)]
    pub ultima_atividade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUsersResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "usuarios_online")]
    pub usuarios: Vec<OnlineUserItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub criador: bool,
    #[serde(default)]
    pub data_criacao: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminSession {
    #[serde(default)]
    pub logado: bool,
    #[serde(default)]
    pub admin: Option<AdminAccount>,
}

/// Body of both the login and the create-admin calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub senha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub admin: Option<AdminAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub admins: Vec<AdminAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub nova_senha: String,
}

impl_api_response!(
    Ack,
    SaveNickResponse,
    ScheduleResponse,
    RankingResponse,
    OnlineUsersResponse,
    LoginResponse,
    AdminListResponse,
);
