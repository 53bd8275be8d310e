//! Document path layout.
//!
//! Tenant data hangs under `organizations/{orgId}/...`; domain events and
//! outbox records live in flat top-level collections so the dispatch
//! processor can scan them without touching any one organization's subtree.

pub const DOMAIN_EVENTS: &str = "domain_events";
pub const OUTBOX: &str = "outbox";
pub const INVITATIONS: &str = "invitations";

pub fn organization(org_id: &str) -> String {
    format!("organizations/{}", org_id)
}

pub fn members(org_id: &str) -> String {
    format!("organizations/{}/members", org_id)
}

pub fn member(org_id: &str, user_id: &str) -> String {
    format!("organizations/{}/members/{}", org_id, user_id)
}

pub fn clients(org_id: &str) -> String {
    format!("organizations/{}/clients", org_id)
}

pub fn client(org_id: &str, id: &str) -> String {
    format!("organizations/{}/clients/{}", org_id, id)
}

pub fn matters(org_id: &str) -> String {
    format!("organizations/{}/matters", org_id)
}

pub fn matter(org_id: &str, id: &str) -> String {
    format!("organizations/{}/matters/{}", org_id, id)
}

pub fn comments(org_id: &str) -> String {
    format!("organizations/{}/comments", org_id)
}

pub fn comment(org_id: &str, id: &str) -> String {
    format!("organizations/{}/comments/{}", org_id, id)
}

pub fn time_entries(org_id: &str) -> String {
    format!("organizations/{}/time_entries", org_id)
}

pub fn time_entry(org_id: &str, id: &str) -> String {
    format!("organizations/{}/time_entries/{}", org_id, id)
}

pub fn invoices(org_id: &str) -> String {
    format!("organizations/{}/invoices", org_id)
}

pub fn invoice(org_id: &str, id: &str) -> String {
    format!("organizations/{}/invoices/{}", org_id, id)
}

pub fn tasks(org_id: &str) -> String {
    format!("organizations/{}/tasks", org_id)
}

pub fn task(org_id: &str, id: &str) -> String {
    format!("organizations/{}/tasks/{}", org_id, id)
}

pub fn document_jobs(org_id: &str) -> String {
    format!("organizations/{}/document_jobs", org_id)
}

pub fn document_job(org_id: &str, id: &str) -> String {
    format!("organizations/{}/document_jobs/{}", org_id, id)
}

pub fn audit_events(org_id: &str) -> String {
    format!("organizations/{}/audit_events", org_id)
}

pub fn audit_event(org_id: &str, id: &str) -> String {
    format!("organizations/{}/audit_events/{}", org_id, id)
}

pub fn domain_event(event_id: &str) -> String {
    format!("domain_events/{}", event_id)
}

pub fn outbox_record(id: &str) -> String {
    format!("outbox/{}", id)
}

pub fn invitation(code: &str) -> String {
    format!("invitations/{}", code)
}
