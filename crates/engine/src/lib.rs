//! Ledger and settlement core.
//!
//! Records are the single source of truth: pockets, instruments and rooms
//! never store derived amounts. Reads fold an immutable snapshot of the
//! record set; writes are atomic batches against the store.

pub use categories::{Category, INSTRUMENT_PAYMENT_LABEL, TRANSFER_LABEL};
pub use classify::counts_against_cash;
pub use commands::{
    ExpenseNewCmd, ExpenseUpdateCmd, PayInstrumentCmd, RecordNewCmd, RecordUpdateCmd, RuleNewCmd,
    RuleUpdateCmd, TransferCmd,
};
pub use error::EngineError;
pub use expenses::SharedExpense;
pub use instruments::{Instrument, InstrumentKind};
pub use ledger::{InstrumentPending, Snapshot, Totals};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, RecordListFilter};
pub use payment::PaymentMethod;
pub use pockets::{Pocket, PocketKind};
pub use records::{Record, RecordKind};
pub use recurring::{Frequency, RecurringRule};
pub use room_members::RoomMember;
pub use rooms::Room;
pub use settle::{Debt, net_positions, pairwise_debts};

mod categories;
mod classify;
mod commands;
mod error;
mod expense_shares;
mod expenses;
mod instruments;
mod ledger;
mod money;
mod ops;
mod payment;
mod pockets;
mod records;
mod recurring;
mod room_members;
mod rooms;
mod settle;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
