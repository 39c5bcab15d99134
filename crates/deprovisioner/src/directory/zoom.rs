use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing::debug;

use super::{DeprovisionMode, DirectoryClient, DirectoryError};
use crate::config::ZoomConfig;
use crate::workflows::deprovision::domain::{Account, AccountStatus, Tier};

/// Largest page the v1 `user/list` endpoint will return.
const PAGE_SIZE: usize = 300;

const INVALID_CREDENTIALS: i64 = 124;
const NO_PERMISSION: i64 = 200;
const USER_NOT_FOUND: i64 = 1001;

/// Zoom v1 API client. Every call is a form-encoded POST carrying the API key
/// pair; failures come back as an `error` object in an otherwise successful
/// response.
///
/// Requests run on a private runtime so the workflow can stay synchronous.
pub struct ZoomClient {
    http: reqwest::Client,
    base_url: String,
    credentials: [(&'static str, String); 3],
    mode: DeprovisionMode,
    runtime: Runtime,
}

impl ZoomClient {
    pub fn new(config: &ZoomConfig, mode: DeprovisionMode) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| DirectoryError::Transport(format!("failed to build HTTP client: {err}")))?;
        let runtime = Runtime::new().map_err(|err| DirectoryError::Runtime(err.to_string()))?;

        let mut base_url = config.root_request_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            credentials: [
                ("api_key", config.api_key.clone()),
                ("api_secret", config.api_secret.clone()),
                ("data_type", config.data_type.clone()),
            ],
            mode,
            runtime,
        })
    }

    pub fn mode(&self) -> DeprovisionMode {
        self.mode
    }

    fn post(&self, resource: &str, params: &[(&str, String)]) -> Result<Value, DirectoryError> {
        let url = format!("{}{}", self.base_url, resource);
        let mut form: Vec<(&str, &str)> = self
            .credentials
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        form.extend(params.iter().map(|(key, value)| (*key, value.as_str())));

        debug!(%resource, "zoom request");
        let (status, body) = self.runtime.block_on(async {
            let response = self
                .http
                .post(&url)
                .form(&form)
                .send()
                .await
                .map_err(|err| DirectoryError::Transport(format!("{resource}: {err}")))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|err| DirectoryError::Transport(format!("{resource}: {err}")))?;
            Ok::<_, DirectoryError>((status, text))
        })?;

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(DirectoryError::Auth(format!("{resource}: HTTP {status}")));
        }

        let payload: Value = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(DirectoryError::Transport(format!(
                    "{resource}: HTTP {status}"
                )))
            }
            Err(err) => {
                return Err(DirectoryError::UnexpectedResponse(format!(
                    "{resource}: {err}"
                )))
            }
        };

        if let Some(error) = payload.get("error") {
            let error: ZoomErrorBody = serde_json::from_value(error.clone())
                .map_err(|err| DirectoryError::UnexpectedResponse(format!("{resource}: {err}")))?;
            return Err(error.into_directory_error(params));
        }

        if !status.is_success() {
            return Err(DirectoryError::Transport(format!("{resource}: HTTP {status}")));
        }

        Ok(payload)
    }

    fn list_page(&self, page_size: usize, page_number: u32) -> Result<UserListPage, DirectoryError> {
        let payload = self.post(
            "user/list",
            &[
                ("page_size", page_size.to_string()),
                ("page_number", page_number.to_string()),
            ],
        )?;
        serde_json::from_value(payload)
            .map_err(|err| DirectoryError::UnexpectedResponse(format!("user/list: {err}")))
    }
}

impl std::fmt::Debug for ZoomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoomClient")
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl DirectoryClient for ZoomClient {
    fn authenticate(&self) -> Result<(), DirectoryError> {
        self.list_page(1, 1).map(|_| ())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        let mut accounts = Vec::new();
        let mut page_number = 1u32;

        loop {
            let page = self.list_page(PAGE_SIZE, page_number)?;
            let Some(users) = page.users else {
                break;
            };

            let returned = users.len();
            accounts.extend(users.into_iter().map(ZoomUser::into_account));
            debug!(page_number, returned, "fetched zoom user page");

            let last_page = page.page_count.is_some_and(|count| page_number >= count);
            if returned < PAGE_SIZE || last_page {
                break;
            }
            page_number += 1;
        }

        Ok(accounts)
    }

    fn deprovision(&self, account_id: &str) -> Result<(), DirectoryError> {
        let resource = match self.mode {
            DeprovisionMode::PermanentDelete => "user/permanentdelete",
            DeprovisionMode::Deactivate => "user/deactivate",
        };
        let payload = self.post(resource, &[("id", account_id.to_string())])?;

        match payload.get("id").and_then(Value::as_str) {
            Some(id) if id == account_id => Ok(()),
            other => Err(DirectoryError::UnexpectedResponse(format!(
                "{resource} echoed id {other:?}, expected {account_id}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ZoomErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
}

impl ZoomErrorBody {
    fn into_directory_error(self, params: &[(&str, String)]) -> DirectoryError {
        match self.code {
            INVALID_CREDENTIALS | NO_PERMISSION => DirectoryError::Auth(self.message),
            USER_NOT_FOUND => {
                let subject = params
                    .iter()
                    .find(|(key, _)| *key == "id")
                    .map(|(_, value)| value.clone())
                    .unwrap_or(self.message);
                DirectoryError::NotFound(subject)
            }
            code => DirectoryError::Api {
                code,
                message: self.message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserListPage {
    #[serde(default)]
    page_count: Option<u32>,
    #[serde(default)]
    users: Option<Vec<ZoomUser>>,
}

#[derive(Debug, Deserialize)]
struct ZoomUser {
    id: String,
    email: String,
    #[serde(rename = "type", default)]
    user_type: Option<i64>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    dept: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(rename = "lastClientVersion", default)]
    last_client_version: Option<String>,
    #[serde(rename = "lastLoginTime", default)]
    last_login_time: Option<String>,
    #[serde(default)]
    status: Option<Value>,
}

impl ZoomUser {
    fn into_account(self) -> Account {
        let tier = Tier::from_type_code(self.user_type.unwrap_or_default());
        let status = AccountStatus::from_raw(self.status.as_ref().and_then(Value::as_str));
        let mut account = Account::new(self.id, &self.email, tier, status);
        account.first_name = self.first_name.filter(|value| !value.is_empty());
        account.last_name = self.last_name.filter(|value| !value.is_empty());
        account.department = self.dept.filter(|value| !value.is_empty());
        account.created_at = self.created_at;
        account.last_login_at = self.last_login_time;
        account.client_version = self.last_client_version;
        account
    }
}
