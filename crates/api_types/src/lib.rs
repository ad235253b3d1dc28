//! Wire types shared by the server and its clients.
//!
//! Amounts travel as signed integer minor units (`*_minor` fields).
//! Payment methods are encoded as `"cash"`, `"debit:<uuid>"` or
//! `"credit:<uuid>"`; an absent value means no instrument information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Income,
    Expense,
}

pub mod record {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordNew {
        pub kind: RecordKind,
        pub amount_minor: i64,
        pub category: String,
        pub payment: Option<String>,
        pub pocket_id: Option<Uuid>,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub created_at: DateTime<FixedOffset>,
    }

    /// Full replace-in-place of a record's content.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordUpdate {
        pub kind: RecordKind,
        pub amount_minor: i64,
        pub category: String,
        pub payment: Option<String>,
        pub pocket_id: Option<Uuid>,
        pub note: Option<String>,
        /// Absent keeps the stored timestamp.
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordList {
        pub pocket_id: Option<Uuid>,
        pub kind: Option<RecordKind>,
        pub include_transfers: Option<bool>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordView {
        pub id: Uuid,
        pub kind: RecordKind,
        pub amount_minor: i64,
        pub category: String,
        pub payment: Option<String>,
        pub pocket_id: Option<Uuid>,
        pub linked_transfer_id: Option<Uuid>,
        pub note: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordListResponse {
        pub records: Vec<RecordView>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub amount_minor: i64,
        /// Absent = the implicit general bucket.
        pub from_pocket_id: Option<Uuid>,
        pub to_pocket_id: Option<Uuid>,
        pub note: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferCreated {
        pub expense_record_id: Uuid,
        pub income_record_id: Uuid,
    }
}

pub mod pocket {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PocketKind {
        General,
        Savings,
        Debt,
        Future,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PocketNew {
        pub name: String,
        pub kind: PocketKind,
        pub goal_minor: Option<i64>,
        pub target_period: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PocketUpdate {
        pub name: Option<String>,
        pub goal_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PocketCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PocketView {
        pub id: Uuid,
        pub name: String,
        pub kind: PocketKind,
        pub goal_minor: Option<i64>,
        pub target_period: Option<String>,
        /// Derived on every read; never stored.
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PocketBalancesResponse {
        pub pockets: Vec<PocketView>,
        /// Records with no (or an unresolvable) pocket reference.
        pub unassigned_minor: i64,
    }
}

pub mod instrument {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InstrumentKind {
        Debit,
        Credit,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstrumentNew {
        pub issuer: String,
        pub kind: InstrumentKind,
        pub last4: String,
        pub display_name: String,
        pub credit_limit_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstrumentUpdate {
        pub display_name: Option<String>,
        pub issuer: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstrumentCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstrumentView {
        pub id: Uuid,
        pub issuer: String,
        pub kind: InstrumentKind,
        pub last4: String,
        pub display_name: String,
        pub credit_limit_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstrumentListResponse {
        pub instruments: Vec<InstrumentView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingView {
        pub instrument_id: Uuid,
        /// Clamped at zero for display.
        pub pending_minor: i64,
        /// Recorded payments exceed recorded purchases.
        pub overpaid: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingListResponse {
        pub pendings: Vec<PendingView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayNew {
        pub amount_minor: i64,
        pub note: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistic {
        pub income_minor: i64,
        pub expense_minor: i64,
        pub balance_minor: i64,
    }
}

pub mod room {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomNew {
        pub name: String,
        pub display_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomCreated {
        pub id: Uuid,
        pub join_code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub user_id: String,
        pub display_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: String,
        pub display_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount_minor: i64,
        pub payer_id: String,
        /// Participant user id -> positive share weight.
        pub shares: Vec<ShareView>,
        pub note: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount_minor: i64,
        pub payer_id: String,
        pub shares: Vec<ShareView>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub member_id: String,
        pub weight: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub payer_id: String,
        pub shares: Vec<ShareView>,
        pub note: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomView {
        pub id: Uuid,
        pub name: String,
        pub join_code: String,
        pub members: Vec<MemberView>,
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetPositionView {
        pub member_id: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetPositionsResponse {
        pub positions: Vec<NetPositionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtView {
        pub from: String,
        pub to: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtsResponse {
        pub debts: Vec<DebtView>,
    }
}

pub mod recurring {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Frequency {
        Daily,
        Weekly,
        Monthly,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleNew {
        pub kind: RecordKind,
        pub amount_minor: i64,
        pub category: String,
        pub payment: Option<String>,
        pub frequency: Frequency,
        pub day_of_month: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleUpdate {
        pub kind: RecordKind,
        pub amount_minor: i64,
        pub category: String,
        pub payment: Option<String>,
        pub frequency: Frequency,
        pub day_of_month: u8,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleView {
        pub id: Uuid,
        pub kind: RecordKind,
        pub amount_minor: i64,
        pub category: String,
        pub payment: Option<String>,
        pub frequency: Frequency,
        pub day_of_month: u8,
        pub is_active: bool,
        pub last_executed_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleListResponse {
        pub rules: Vec<RuleView>,
    }
}
