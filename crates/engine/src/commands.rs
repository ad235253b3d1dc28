//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Timestamps are always
//! caller-supplied.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Category, Frequency, Money, PaymentMethod, RecordKind};

/// Create a money-movement record.
#[derive(Clone, Debug)]
pub struct RecordNewCmd {
    pub owner_id: String,
    pub kind: RecordKind,
    pub amount: Money,
    pub category: Category,
    pub payment: Option<PaymentMethod>,
    pub pocket_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecordNewCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        kind: RecordKind,
        amount: Money,
        category: Category,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
            amount,
            category,
            payment: None,
            pocket_id: None,
            note: None,
            created_at,
        }
    }

    #[must_use]
    pub fn payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = Some(payment);
        self
    }

    #[must_use]
    pub fn pocket_id(mut self, pocket_id: Uuid) -> Self {
        self.pocket_id = Some(pocket_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Replace an existing record in place.
///
/// Every content field is written; absent optional fields clear the stored
/// value. `created_at` keeps the original timestamp when `None`.
#[derive(Clone, Debug)]
pub struct RecordUpdateCmd {
    pub owner_id: String,
    pub record_id: Uuid,
    pub kind: RecordKind,
    pub amount: Money,
    pub category: Category,
    pub payment: Option<PaymentMethod>,
    pub pocket_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl RecordUpdateCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        record_id: Uuid,
        kind: RecordKind,
        amount: Money,
        category: Category,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            record_id,
            kind,
            amount,
            category,
            payment: None,
            pocket_id: None,
            note: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = Some(payment);
        self
    }

    #[must_use]
    pub fn pocket_id(mut self, pocket_id: Uuid) -> Self {
        self.pocket_id = Some(pocket_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Move value between two pockets (`None` = the implicit general bucket).
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub owner_id: String,
    pub amount: Money,
    pub from_pocket_id: Option<Uuid>,
    pub to_pocket_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, amount: Money, created_at: DateTime<Utc>) -> Self {
        Self {
            owner_id: owner_id.into(),
            amount,
            from_pocket_id: None,
            to_pocket_id: None,
            note: None,
            created_at,
        }
    }

    #[must_use]
    pub fn from_pocket_id(mut self, pocket_id: Uuid) -> Self {
        self.from_pocket_id = Some(pocket_id);
        self
    }

    #[must_use]
    pub fn to_pocket_id(mut self, pocket_id: Uuid) -> Self {
        self.to_pocket_id = Some(pocket_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Pay down a credit instrument's pending amount.
#[derive(Clone, Debug)]
pub struct PayInstrumentCmd {
    pub owner_id: String,
    pub instrument_id: Uuid,
    pub amount: Money,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PayInstrumentCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        instrument_id: Uuid,
        amount: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            instrument_id,
            amount,
            note: None,
            created_at,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create a shared expense in a room.
#[derive(Clone, Debug)]
pub struct ExpenseNewCmd {
    pub room_id: Uuid,
    pub amount: Money,
    pub payer_id: String,
    /// Participant user id and positive share weight.
    pub shares: Vec<(String, u32)>,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl ExpenseNewCmd {
    #[must_use]
    pub fn new(
        room_id: Uuid,
        amount: Money,
        payer_id: impl Into<String>,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            room_id,
            amount,
            payer_id: payer_id.into(),
            shares: Vec::new(),
            note: None,
            created_by: created_by.into(),
            created_at,
        }
    }

    #[must_use]
    pub fn share(mut self, member_id: impl Into<String>, weight: u32) -> Self {
        self.shares.push((member_id.into(), weight));
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Replace a shared expense in place (creator only).
#[derive(Clone, Debug)]
pub struct ExpenseUpdateCmd {
    pub room_id: Uuid,
    pub expense_id: Uuid,
    pub user_id: String,
    pub amount: Money,
    pub payer_id: String,
    pub shares: Vec<(String, u32)>,
    pub note: Option<String>,
}

impl ExpenseUpdateCmd {
    #[must_use]
    pub fn new(
        room_id: Uuid,
        expense_id: Uuid,
        user_id: impl Into<String>,
        amount: Money,
        payer_id: impl Into<String>,
    ) -> Self {
        Self {
            room_id,
            expense_id,
            user_id: user_id.into(),
            amount,
            payer_id: payer_id.into(),
            shares: Vec::new(),
            note: None,
        }
    }

    #[must_use]
    pub fn share(mut self, member_id: impl Into<String>, weight: u32) -> Self {
        self.shares.push((member_id.into(), weight));
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create a stored recurring rule.
#[derive(Clone, Debug)]
pub struct RuleNewCmd {
    pub owner_id: String,
    pub kind: RecordKind,
    pub amount: Money,
    pub category: Category,
    pub payment: Option<PaymentMethod>,
    pub frequency: Frequency,
    pub day_of_month: u8,
}

impl RuleNewCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        kind: RecordKind,
        amount: Money,
        category: Category,
        frequency: Frequency,
        day_of_month: u8,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
            amount,
            category,
            payment: None,
            frequency,
            day_of_month,
        }
    }

    #[must_use]
    pub fn payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = Some(payment);
        self
    }
}

/// Replace a stored recurring rule in place.
#[derive(Clone, Debug)]
pub struct RuleUpdateCmd {
    pub owner_id: String,
    pub rule_id: Uuid,
    pub kind: RecordKind,
    pub amount: Money,
    pub category: Category,
    pub payment: Option<PaymentMethod>,
    pub frequency: Frequency,
    pub day_of_month: u8,
    pub is_active: bool,
}

impl RuleUpdateCmd {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: impl Into<String>,
        rule_id: Uuid,
        kind: RecordKind,
        amount: Money,
        category: Category,
        frequency: Frequency,
        day_of_month: u8,
        is_active: bool,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            rule_id,
            kind,
            amount,
            category,
            payment: None,
            frequency,
            day_of_month,
            is_active,
        }
    }

    #[must_use]
    pub fn payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = Some(payment);
        self
    }
}
