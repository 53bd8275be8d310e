//! Clients API
//!
//! CRUD for practice clients. Deletes are soft: the document stays but reads
//! as NOT_FOUND through the API, and deletion is blocked while the client
//! has open matters.

use axum::extract::{Path, State};
use axum::Json;
use bw_common::{Actor, ApiResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{require_max_len, require_non_empty, require_org, AppState, Caller, CallerIdentity};
use crate::domain::{permissions, Client};
use crate::error::{PlatformError, Result};
use crate::service::EventDraft;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    /// Always present in the envelope, null when unset.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            notes: c.notes,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// Fetch a client, masking soft-deleted and missing alike as NOT_FOUND.
async fn find_visible_client(state: &AppState, org_id: &str, id: &str) -> Result<Client> {
    match state.clients.find_by_id(org_id, id).await? {
        Some(client) if !client.is_deleted() => Ok(client),
        _ => Err(PlatformError::not_found("Client", id)),
    }
}

pub async fn client_create(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    req: CreateClientRequest,
) -> Result<ClientResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::CLIENTS_WRITE))
        .await?;

    require_non_empty("name", &req.name)?;
    require_max_len("name", &req.name, 200)?;
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(PlatformError::validation("email must contain '@'"));
        }
    }

    let mut client = Client::new(org_id, req.name.trim(), &caller.user_id);
    client.email = req.email;
    client.phone = req.phone;
    client.notes = req.notes;

    state.clients.insert(&client).await?;

    state
        .audit
        .log_create(org_id, &caller.user_id, "Client", &client.id)
        .await;
    state
        .events
        .emit_best_effort(
            EventDraft::new(
                org_id,
                "client.created",
                "client",
                &client.id,
                Actor::user(&caller.user_id),
            )
            .with_payload(serde_json::json!({ "name": client.name })),
        )
        .await;

    Ok(client.into())
}

pub async fn client_get(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
) -> Result<ClientResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::CLIENTS_READ))
        .await?;

    Ok(find_visible_client(state, org_id, id).await?.into())
}

pub async fn client_list(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
) -> Result<Vec<ClientResponse>> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::CLIENTS_READ))
        .await?;

    let clients = state.clients.list_active(org_id).await?;
    Ok(clients.into_iter().map(Into::into).collect())
}

pub async fn client_update(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
    req: UpdateClientRequest,
) -> Result<ClientResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::CLIENTS_WRITE))
        .await?;

    let mut client = find_visible_client(state, org_id, id).await?;

    if let Some(name) = req.name {
        require_non_empty("name", &name)?;
        require_max_len("name", &name, 200)?;
        client.name = name.trim().to_string();
    }
    if let Some(email) = req.email {
        if !email.contains('@') {
            return Err(PlatformError::validation("email must contain '@'"));
        }
        client.email = Some(email);
    }
    if let Some(phone) = req.phone {
        client.phone = Some(phone);
    }
    if let Some(notes) = req.notes {
        client.notes = Some(notes);
    }
    client.updated_at = chrono::Utc::now();

    state.clients.update(&client).await?;

    state
        .audit
        .log_update(org_id, &caller.user_id, "Client", &client.id)
        .await;
    state
        .events
        .emit_best_effort(EventDraft::new(
            org_id,
            "client.updated",
            "client",
            &client.id,
            Actor::user(&caller.user_id),
        ))
        .await;

    Ok(client.into())
}

pub async fn client_delete(
    state: &AppState,
    caller: &CallerIdentity,
    org_id: &str,
    id: &str,
) -> Result<DeletedResponse> {
    require_org(org_id)?;
    state
        .entitlements
        .require(&caller.user_id, org_id, None, Some(permissions::CLIENTS_WRITE))
        .await?;

    let mut client = find_visible_client(state, org_id, id).await?;

    let open_matters = state.matters.find_open_by_client(org_id, id).await?;
    if !open_matters.is_empty() {
        return Err(PlatformError::conflict(format!(
            "client has {} open matter(s)",
            open_matters.len()
        )));
    }

    client.soft_delete();
    state.clients.update(&client).await?;

    state
        .audit
        .log_delete(org_id, &caller.user_id, "Client", &client.id)
        .await;
    state
        .events
        .emit_best_effort(EventDraft::new(
            org_id,
            "client.deleted",
            "client",
            &client.id,
            Actor::user(&caller.user_id),
        ))
        .await;

    Ok(DeletedResponse { deleted: true })
}

pub async fn create_client(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
    Json(req): Json<CreateClientRequest>,
) -> Json<ApiResponse<ClientResponse>> {
    Json(client_create(&state, &caller.0, &org_id, req).await.into())
}

pub async fn get_client(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
) -> Json<ApiResponse<ClientResponse>> {
    Json(client_get(&state, &caller.0, &org_id, &id).await.into())
}

pub async fn list_clients(
    State(state): State<AppState>,
    caller: Caller,
    Path(org_id): Path<String>,
) -> Json<ApiResponse<Vec<ClientResponse>>> {
    Json(client_list(&state, &caller.0, &org_id).await.into())
}

pub async fn update_client(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
    Json(req): Json<UpdateClientRequest>,
) -> Json<ApiResponse<ClientResponse>> {
    Json(client_update(&state, &caller.0, &org_id, &id, req).await.into())
}

pub async fn delete_client(
    State(state): State<AppState>,
    caller: Caller,
    Path((org_id, id)): Path<(String, String)>,
) -> Json<ApiResponse<DeletedResponse>> {
    Json(client_delete(&state, &caller.0, &org_id, &id).await.into())
}
