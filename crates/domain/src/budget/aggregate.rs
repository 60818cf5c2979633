//! Budget aggregate implementation.

use chrono::{DateTime, Duration, Utc};
use common::{BudgetId, ClientId, ServiceOrderId};
use serde::{Deserialize, Serialize};

use super::{BudgetError, BudgetItem, BudgetStatus, CreateBudget, DeliveryMethod, Money};

/// Budget aggregate root.
///
/// A priced, time-bounded proposal for one service order and one client.
/// Status only changes through the methods below. Expiration is never
/// stored implicitly: it is derived from the generation date and validity
/// period every time it is asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    id: BudgetId,
    status: BudgetStatus,
    total_amount: Money,

    /// Validity period in days.
    validity_period: u32,

    generation_date: DateTime<Utc>,
    sent_date: Option<DateTime<Utc>>,
    approval_date: Option<DateTime<Utc>>,
    rejection_date: Option<DateTime<Utc>>,
    delivery_method: Option<DeliveryMethod>,
    notes: Option<String>,
    service_order_id: ServiceOrderId,
    client_id: ClientId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Persisted form of a budget, used by repositories to rebuild aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub id: BudgetId,
    pub status: BudgetStatus,
    pub total_amount: Money,
    pub validity_period: u32,
    pub generation_date: DateTime<Utc>,
    pub sent_date: Option<DateTime<Utc>>,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_date: Option<DateTime<Utc>>,
    pub delivery_method: Option<DeliveryMethod>,
    pub notes: Option<String>,
    pub service_order_id: ServiceOrderId,
    pub client_id: ClientId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Construction
impl Budget {
    /// Creates a new budget generated now.
    pub fn create(cmd: CreateBudget) -> Self {
        Self::create_at(cmd, Utc::now())
    }

    /// Creates a new budget generated at `now`.
    pub fn create_at(cmd: CreateBudget, now: DateTime<Utc>) -> Self {
        Self {
            id: cmd.budget_id,
            status: cmd.status,
            total_amount: cmd.total_amount.unwrap_or_default(),
            validity_period: cmd.validity_period,
            generation_date: now,
            sent_date: None,
            approval_date: None,
            rejection_date: None,
            delivery_method: cmd.delivery_method,
            notes: cmd.notes,
            service_order_id: cmd.service_order_id,
            client_id: cmd.client_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a budget from persisted fields without running any guard.
    pub fn restore(snapshot: BudgetSnapshot) -> Self {
        Self {
            id: snapshot.id,
            status: snapshot.status,
            total_amount: snapshot.total_amount,
            validity_period: snapshot.validity_period,
            generation_date: snapshot.generation_date,
            sent_date: snapshot.sent_date,
            approval_date: snapshot.approval_date,
            rejection_date: snapshot.rejection_date,
            delivery_method: snapshot.delivery_method,
            notes: snapshot.notes,
            service_order_id: snapshot.service_order_id,
            client_id: snapshot.client_id,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    /// Returns the persisted form of this budget.
    pub fn to_snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            id: self.id.clone(),
            status: self.status,
            total_amount: self.total_amount,
            validity_period: self.validity_period,
            generation_date: self.generation_date,
            sent_date: self.sent_date,
            approval_date: self.approval_date,
            rejection_date: self.rejection_date,
            delivery_method: self.delivery_method,
            notes: self.notes.clone(),
            service_order_id: self.service_order_id.clone(),
            client_id: self.client_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// Query methods
impl Budget {
    pub fn id(&self) -> &BudgetId {
        &self.id
    }

    pub fn status(&self) -> BudgetStatus {
        self.status
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the validity period in days.
    pub fn validity_period(&self) -> u32 {
        self.validity_period
    }

    pub fn generation_date(&self) -> DateTime<Utc> {
        self.generation_date
    }

    pub fn sent_date(&self) -> Option<DateTime<Utc>> {
        self.sent_date
    }

    pub fn approval_date(&self) -> Option<DateTime<Utc>> {
        self.approval_date
    }

    pub fn rejection_date(&self) -> Option<DateTime<Utc>> {
        self.rejection_date
    }

    pub fn delivery_method(&self) -> Option<DeliveryMethod> {
        self.delivery_method
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn service_order_id(&self) -> &ServiceOrderId {
        &self.service_order_id
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the instant the validity period ends.
    ///
    /// A validity period reaching past the representable range never ends.
    pub fn expiration_date(&self) -> DateTime<Utc> {
        Duration::try_days(i64::from(self.validity_period))
            .and_then(|validity| self.generation_date.checked_add_signed(validity))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns true if the budget is past its expiration date now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if `now` is strictly after the expiration date.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_date()
    }
}

// Guarded transitions
impl Budget {
    /// Sends the budget to the client.
    pub fn send(&mut self) -> Result<(), BudgetError> {
        self.send_at(Utc::now())
    }

    /// Sends the budget at `now`. Only allowed from `Generated`.
    pub fn send_at(&mut self, now: DateTime<Utc>) -> Result<(), BudgetError> {
        if !self.status.can_send() {
            return Err(BudgetError::InvalidStatusTransition {
                budget_id: self.id.clone(),
                current: self.status,
                target: BudgetStatus::Sent,
            });
        }

        self.status = BudgetStatus::Sent;
        self.sent_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Approves the budget.
    pub fn approve(&mut self) -> Result<(), BudgetError> {
        self.approve_at(Utc::now())
    }

    /// Approves the budget at `now`.
    ///
    /// An already approved budget reports `AlreadyApproved` even when it has
    /// also expired.
    pub fn approve_at(&mut self, now: DateTime<Utc>) -> Result<(), BudgetError> {
        if self.status == BudgetStatus::Approved {
            return Err(BudgetError::AlreadyApproved {
                budget_id: self.id.clone(),
            });
        }
        self.ensure_not_expired(now)?;

        self.status = BudgetStatus::Approved;
        self.approval_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Rejects the budget.
    pub fn reject(&mut self) -> Result<(), BudgetError> {
        self.reject_at(Utc::now())
    }

    /// Rejects the budget at `now`, with the same check order as `approve_at`.
    pub fn reject_at(&mut self, now: DateTime<Utc>) -> Result<(), BudgetError> {
        if self.status == BudgetStatus::Rejected {
            return Err(BudgetError::AlreadyRejected {
                budget_id: self.id.clone(),
            });
        }
        self.ensure_not_expired(now)?;

        self.status = BudgetStatus::Rejected;
        self.rejection_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Marks the budget as received by the client, whatever its status.
    pub fn mark_as_received(&mut self) {
        self.status = BudgetStatus::Received;
        self.updated_at = Utc::now();
    }

    /// Records an observed expiration so it can be queried, whatever the status.
    pub fn mark_as_expired(&mut self) {
        self.status = BudgetStatus::Expired;
        self.updated_at = Utc::now();
    }

    fn ensure_not_expired(&self, now: DateTime<Utc>) -> Result<(), BudgetError> {
        if self.is_expired_at(now) {
            return Err(BudgetError::Expired {
                budget_id: self.id.clone(),
                expiration_date: self.expiration_date(),
            });
        }
        Ok(())
    }
}

// Totals
impl Budget {
    /// Sums the total price of the given items, saturating on overflow.
    pub fn calculate_total_amount(items: &[BudgetItem]) -> Money {
        items.iter().map(BudgetItem::total_price).sum()
    }

    /// Replaces the total with the sum of the given items.
    pub fn recalculate_total_amount(&mut self, items: &[BudgetItem]) {
        self.total_amount = Self::calculate_total_amount(items);
        self.touch();
    }

    /// Sums the total price of the given items, returning `None` on overflow.
    pub fn checked_total_amount(items: &[BudgetItem]) -> Option<Money> {
        items.iter().try_fold(Money::zero(), |total, item| {
            total.checked_add(item.checked_total_price()?)
        })
    }

    /// Checks that the stored total matches the sum of the given items.
    ///
    /// An item sum that overflows is reported as `TotalOverflow` rather than
    /// compared in clamped form.
    pub fn verify_total(&self, items: &[BudgetItem]) -> Result<(), BudgetError> {
        let calculated =
            Self::checked_total_amount(items).ok_or_else(|| BudgetError::TotalOverflow {
                budget_id: self.id.clone(),
            })?;
        if calculated != self.total_amount {
            return Err(BudgetError::TotalMismatch {
                budget_id: self.id.clone(),
                declared: self.total_amount,
                calculated,
            });
        }
        Ok(())
    }
}

// Unguarded field updates
impl Budget {
    /// Overwrites the status. Writing the current status changes nothing.
    pub fn update_status(&mut self, status: BudgetStatus) {
        if self.status == status {
            return;
        }
        self.status = status;
        self.touch();
    }

    pub fn update_total_amount(&mut self, total: Money) {
        self.total_amount = total;
        self.touch();
    }

    pub fn update_validity_period(&mut self, days: u32) {
        self.validity_period = days;
        self.touch();
    }

    pub fn update_delivery_method(&mut self, method: Option<DeliveryMethod>) {
        self.delivery_method = method;
        self.touch();
    }

    pub fn update_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
