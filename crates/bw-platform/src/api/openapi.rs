//! OpenAPI schema aggregation for the platform DTOs.

use utoipa::OpenApi;

use crate::api::audit_logs::AuditEventResponse;
use crate::api::clients::{ClientResponse, CreateClientRequest, DeletedResponse, UpdateClientRequest};
use crate::api::comments::{AddCommentRequest, CommentResponse};
use crate::api::documents::{DocumentJobResponse, RequestExtractionRequest, SignedUrlResponse};
use crate::api::invitations::{
    AcceptInvitationResponse, CreateInvitationRequest, InvitationResponse,
};
use crate::api::invoices::{CreateInvoiceRequest, InvoiceResponse, RecordPaymentRequest};
use crate::api::matters::{CreateMatterRequest, MatterResponse};
use crate::api::organizations::{CreateOrganizationRequest, OrganizationResponse};
use crate::api::tasks::{CreateTaskRequest, TaskResponse, UpdateTaskStatusRequest};
use crate::api::time_entries::{CreateTimeEntryRequest, TimeEntryResponse};
use crate::domain::{PlanTier, Role, TaskStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Briefwork Platform API",
        description = "Multi-tenant legal practice management"
    ),
    components(schemas(
        AuditEventResponse,
        CreateOrganizationRequest,
        OrganizationResponse,
        CreateClientRequest,
        UpdateClientRequest,
        ClientResponse,
        DeletedResponse,
        CreateMatterRequest,
        MatterResponse,
        AddCommentRequest,
        CommentResponse,
        CreateInvitationRequest,
        InvitationResponse,
        AcceptInvitationResponse,
        CreateInvoiceRequest,
        RecordPaymentRequest,
        InvoiceResponse,
        CreateTimeEntryRequest,
        TimeEntryResponse,
        CreateTaskRequest,
        UpdateTaskStatusRequest,
        TaskResponse,
        RequestExtractionRequest,
        DocumentJobResponse,
        SignedUrlResponse,
        Role,
        PlanTier,
        TaskStatus,
    ))
)]
pub struct PlatformApiDoc;
