//! Invoice Entity
//!
//! Invoices are billed from a matter's unbilled time entries. Creation marks
//! the source entries billed and writes the invoice with its line items in
//! one transaction. Payment recording is a transactional read-modify-write
//! so concurrent payments cannot lose updates.

use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Void,
}

impl InvoiceStatus {
    /// draft → sent | void, sent → paid | void. Paid and void are terminal.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Sent)
                | (Self::Draft, Self::Void)
                | (Self::Sent, Self::Paid)
                | (Self::Sent, Self::Void)
        )
    }

    /// Payments apply while the invoice is out for collection. A payment
    /// against an already-paid invoice is clamped, not rejected, so
    /// concurrent settlements converge.
    pub fn accepts_payment(self) -> bool {
        matches!(self, Self::Sent | Self::Paid)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Paid => "PAID",
            Self::Void => "VOID",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub time_entry_id: String,
    pub description: String,
    pub minutes: u32,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub organization_id: String,
    pub matter_id: String,
    pub client_id: String,
    pub status: InvoiceStatus,
    pub line_items: Vec<LineItem>,
    pub total_cents: i64,
    pub paid_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        organization_id: impl Into<String>,
        matter_id: impl Into<String>,
        client_id: impl Into<String>,
        line_items: Vec<LineItem>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let total_cents = line_items.iter().map(|li| li.amount_cents).sum();
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            matter_id: matter_id.into(),
            client_id: client_id.into(),
            status: InvoiceStatus::Draft,
            line_items,
            total_cents,
            paid_cents: 0,
            due_date: None,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a payment. Paid total is clamped to the invoice total and the
    /// status flips to PAID the first time the total is covered. Returns the
    /// amount actually applied.
    pub fn apply_payment(&mut self, amount_cents: i64) -> i64 {
        let before = self.paid_cents;
        self.paid_cents = (self.paid_cents + amount_cents).min(self.total_cents);
        if self.paid_cents >= self.total_cents {
            self.status = InvoiceStatus::Paid;
        }
        self.updated_at = Utc::now();
        self.paid_cents - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice_with_total(total: i64) -> Invoice {
        Invoice::new(
            "org1",
            "m1",
            "c1",
            vec![LineItem {
                time_entry_id: "t1".into(),
                description: "research".into(),
                minutes: 60,
                amount_cents: total,
            }],
            "u1",
        )
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        assert!(InvoiceStatus::Draft.can_transition(InvoiceStatus::Sent));
        assert!(InvoiceStatus::Sent.can_transition(InvoiceStatus::Paid));
        assert!(InvoiceStatus::Sent.can_transition(InvoiceStatus::Void));
        assert!(!InvoiceStatus::Draft.can_transition(InvoiceStatus::Paid));
        assert!(!InvoiceStatus::Paid.can_transition(InvoiceStatus::Sent));
        assert!(!InvoiceStatus::Void.can_transition(InvoiceStatus::Sent));
    }

    #[test]
    fn payment_clamps_to_total_and_flips_status_once() {
        let mut invoice = invoice_with_total(10_000);
        invoice.status = InvoiceStatus::Sent;

        assert_eq!(invoice.apply_payment(6_000), 6_000);
        assert_eq!(invoice.status, InvoiceStatus::Sent);

        assert_eq!(invoice.apply_payment(6_000), 4_000);
        assert_eq!(invoice.paid_cents, 10_000);
        assert_eq!(invoice.status, InvoiceStatus::Paid);

        // Late arrival of a concurrent payment is a no-op.
        assert_eq!(invoice.apply_payment(6_000), 0);
        assert_eq!(invoice.paid_cents, 10_000);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn total_is_the_sum_of_line_items() {
        let invoice = Invoice::new(
            "org1",
            "m1",
            "c1",
            vec![
                LineItem {
                    time_entry_id: "t1".into(),
                    description: "call".into(),
                    minutes: 30,
                    amount_cents: 7_500,
                },
                LineItem {
                    time_entry_id: "t2".into(),
                    description: "drafting".into(),
                    minutes: 90,
                    amount_cents: 22_500,
                },
            ],
            "u1",
        );
        assert_eq!(invoice.total_cents, 30_000);
        assert_eq!(invoice.status, InvoiceStatus::Draft);
    }
}
