//! Validation and permission rules behind the admin console forms.

use crate::api::{AdminAccount, Credentials};
use crate::config::MIN_CREDENTIAL_LEN;
use crate::error::ApiError;

pub const MSG_FILL_ALL_FIELDS: &str = "Por favor, preencha todos os campos";
pub const MSG_LOGIN_TOO_SHORT: &str = "Login deve ter pelo menos 3 caracteres";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Senha deve ter pelo menos 3 caracteres";
pub const MSG_SELECT_FILE: &str = "Por favor, selecione um arquivo";
pub const MSG_UNSUPPORTED_FILE: &str = "Formato de arquivo não suportado. Use .xlsx, .xls ou .csv";
pub const MSG_INVALID_POINTS: &str = "Por favor, digite um número válido de pontos";

pub const UPLOAD_MIME_TYPES: [&str; 3] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
];

/// Admin console sections, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Admins,
    Schedule,
    Ranking,
    Online,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Admins,
        Section::Schedule,
        Section::Ranking,
        Section::Online,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Admins => "Administradores",
            Self::Schedule => "Agenda",
            Self::Ranking => "Ranking",
            Self::Online => "Usuários Online",
        }
    }
}

/// What the signed-in admin may do with one account row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountActions {
    /// A creator account seen by someone else.
    Protected,
    Allowed {
        change_password: bool,
        delete: bool,
    },
}

pub fn account_actions(row: &AdminAccount, current: &AdminAccount) -> AccountActions {
    let is_self = row.id == current.id;
    if row.criador {
        return if is_self {
            AccountActions::Allowed {
                change_password: true,
                delete: false,
            }
        } else {
            AccountActions::Protected
        };
    }
    AccountActions::Allowed {
        change_password: true,
        delete: current.criador || is_self,
    }
}

/// Login form: both fields are required, nothing more.
pub fn login_credentials(login: &str, password: &str) -> Result<Credentials, ApiError> {
    let (login, password) = (login.trim(), password.trim());
    if login.is_empty() || password.is_empty() {
        return Err(ApiError::invalid(MSG_FILL_ALL_FIELDS));
    }
    Ok(Credentials {
        login: login.to_string(),
        senha: password.to_string(),
    })
}

/// Create-admin form.
pub fn new_admin_credentials(login: &str, password: &str) -> Result<Credentials, ApiError> {
    let credentials = login_credentials(login, password)?;
    if credentials.login.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ApiError::invalid(MSG_LOGIN_TOO_SHORT));
    }
    if credentials.senha.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ApiError::invalid(MSG_PASSWORD_TOO_SHORT));
    }
    Ok(credentials)
}

/// `Ok(None)` when the password prompt was cancelled or left empty.
pub fn new_password(raw: Option<&str>) -> Result<Option<String>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(password) if password.chars().count() < MIN_CREDENTIAL_LEN => {
            Err(ApiError::invalid(MSG_PASSWORD_TOO_SHORT))
        }
        Some(password) => Ok(Some(password.to_string())),
    }
}

/// `Ok(None)` when the points prompt was cancelled or left empty.
pub fn parse_points(raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(Some)
        .map_err(|_| ApiError::invalid(MSG_INVALID_POINTS))
}

/// Check the picked schedule file before uploading it.
pub fn validate_upload(mime: Option<&str>) -> Result<(), ApiError> {
    let Some(mime) = mime else {
        return Err(ApiError::invalid(MSG_SELECT_FILE));
    };
    if UPLOAD_MIME_TYPES.contains(&mime) {
        Ok(())
    } else {
        Err(ApiError::invalid(MSG_UNSUPPORTED_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i64, creator: bool) -> AdminAccount {
        AdminAccount {
            id,
            login: format!("admin{id}"),
            criador: creator,
            data_criacao: None,
        }
    }

    #[test]
    fn creator_row_is_protected_from_others() {
        let creator = account(1, true);
        let regular = account(2, false);
        assert_eq!(account_actions(&creator, &regular), AccountActions::Protected);
        assert_eq!(
            account_actions(&creator, &creator),
            AccountActions::Allowed {
                change_password: true,
                delete: false
            }
        );
    }

    #[test]
    fn regular_rows_deletable_by_creator_or_self() {
        let creator = account(1, true);
        let me = account(2, false);
        let other = account(3, false);
        let delete = |row: &AdminAccount, current: &AdminAccount| {
            match account_actions(row, current) {
                AccountActions::Allowed { delete, .. } => delete,
                AccountActions::Protected => false,
            }
        };
        assert!(delete(&other, &creator));
        assert!(delete(&me, &me));
        assert!(!delete(&other, &me));
    }

    #[test]
    fn login_requires_both_fields() {
        assert_eq!(
            login_credentials("  ", "x").unwrap_err(),
            ApiError::Invalid(MSG_FILL_ALL_FIELDS.into())
        );
        let creds = login_credentials(" root ", " pw ").unwrap();
        assert_eq!(creds.login, "root");
        assert_eq!(creds.senha, "pw");
    }

    #[test]
    fn new_admin_enforces_minimum_length() {
        assert_eq!(
            new_admin_credentials("ab", "secret").unwrap_err(),
            ApiError::Invalid(MSG_LOGIN_TOO_SHORT.into())
        );
        assert_eq!(
            new_admin_credentials("abc", "pw").unwrap_err(),
            ApiError::Invalid(MSG_PASSWORD_TOO_SHORT.into())
        );
        assert!(new_admin_credentials("abc", "pwd").is_ok());
    }

    #[test]
    fn password_prompt_rules() {
        assert_eq!(new_password(None), Ok(None));
        assert_eq!(new_password(Some("")), Ok(None));
        assert!(new_password(Some("ab")).is_err());
        assert_eq!(new_password(Some("abc")), Ok(Some("abc".into())));
    }

    #[test]
    fn points_must_be_non_negative_integers() {
        assert_eq!(parse_points(None), Ok(None));
        assert_eq!(parse_points(Some("")), Ok(None));
        assert_eq!(parse_points(Some(" 42 ")), Ok(Some(42)));
        assert_eq!(parse_points(Some("0")), Ok(Some(0)));
        assert!(parse_points(Some("-1")).is_err());
        assert!(parse_points(Some("1.5")).is_err());
    }

    #[test]
    fn upload_accepts_spreadsheets_only() {
        assert!(validate_upload(Some("text/csv")).is_ok());
        assert!(validate_upload(Some("application/vnd.ms-excel")).is_ok());
        assert_eq!(
            validate_upload(Some("application/pdf")).unwrap_err(),
            ApiError::Invalid(MSG_UNSUPPORTED_FILE.into())
        );
        assert_eq!(
            validate_upload(None).unwrap_err(),
            ApiError::Invalid(MSG_SELECT_FILE.into())
        );
    }
}
