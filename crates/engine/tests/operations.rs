use chrono::Utc;
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    Category, Engine, EngineError, ExpenseNewCmd, ExpenseUpdateCmd, Frequency, InstrumentKind,
    Money, PayInstrumentCmd, PaymentMethod, PocketKind, RecordKind, RecordListFilter,
    RecordNewCmd, RecordUpdateCmd, RuleNewCmd, RuleUpdateCmd, TransferCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn income(owner: &str, amount: i64) -> RecordNewCmd {
    RecordNewCmd::new(
        owner,
        RecordKind::Income,
        Money::new(amount),
        Category::parse("Salario"),
        Utc::now(),
    )
    .payment(PaymentMethod::Cash)
}

fn expense(owner: &str, amount: i64, category: &str) -> RecordNewCmd {
    RecordNewCmd::new(
        owner,
        RecordKind::Expense,
        Money::new(amount),
        Category::parse(category),
        Utc::now(),
    )
    .payment(PaymentMethod::Cash)
}

#[tokio::test]
async fn income_and_expense_fold_into_totals() {
    let engine = engine_with_db().await;

    engine.add_record(income("alice", 100_000)).await.unwrap();
    let totals = engine.totals("alice").await.unwrap();
    assert_eq!(totals.balance, Money::new(100_000));

    engine
        .add_record(expense("alice", 30_000, "Mercado"))
        .await
        .unwrap();
    let totals = engine.totals("alice").await.unwrap();
    assert_eq!(totals.income, Money::new(100_000));
    assert_eq!(totals.expense, Money::new(30_000));
    assert_eq!(totals.balance, Money::new(70_000));
}

#[tokio::test]
async fn owners_are_isolated() {
    let engine = engine_with_db().await;

    engine.add_record(income("alice", 100_000)).await.unwrap();
    engine.add_record(income("bob", 5_000)).await.unwrap();

    assert_eq!(
        engine.totals("alice").await.unwrap().balance,
        Money::new(100_000)
    );
    assert_eq!(engine.totals("bob").await.unwrap().balance, Money::new(5_000));
}

#[tokio::test]
async fn add_record_rejects_reserved_categories() {
    let engine = engine_with_db().await;

    let cmd = RecordNewCmd::new(
        "alice",
        RecordKind::Expense,
        Money::new(1_000),
        Category::Transfer,
        Utc::now(),
    );
    assert_eq!(
        engine.add_record(cmd).await.unwrap_err(),
        EngineError::InvalidRecord("category \"transfer\" is reserved".to_string())
    );
}

#[tokio::test]
async fn update_record_replaces_in_place() {
    let engine = engine_with_db().await;

    let record_id = engine
        .add_record(expense("alice", 30_000, "Mercado"))
        .await
        .unwrap();

    engine
        .update_record(RecordUpdateCmd::new(
            "alice",
            record_id,
            RecordKind::Expense,
            Money::new(25_000),
            Category::parse("Mercado"),
        ))
        .await
        .unwrap();

    let records = engine
        .list_records("alice", RecordListFilter::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount, Money::new(25_000));
    // Payment was not re-supplied: the replace cleared it.
    assert_eq!(records[0].payment, None);
}

#[tokio::test]
async fn delete_record_removes_it_from_derivations() {
    let engine = engine_with_db().await;

    let record_id = engine
        .add_record(expense("alice", 30_000, "Mercado"))
        .await
        .unwrap();
    engine.add_record(income("alice", 100_000)).await.unwrap();

    engine.delete_record("alice", record_id).await.unwrap();
    assert_eq!(
        engine.totals("alice").await.unwrap().balance,
        Money::new(100_000)
    );
    assert_eq!(
        engine.delete_record("alice", record_id).await.unwrap_err(),
        EngineError::KeyNotFound("record not exists".to_string())
    );
}

#[tokio::test]
async fn credit_purchase_defers_until_paid() {
    let engine = engine_with_db().await;

    let card = engine
        .new_instrument(
            "alice",
            "Bancolombia",
            InstrumentKind::Credit,
            "4242",
            "Visa",
            Some(Money::new(1_000_000)),
        )
        .await
        .unwrap();

    engine.add_record(income("alice", 100_000)).await.unwrap();
    engine
        .add_record(
            RecordNewCmd::new(
                "alice",
                RecordKind::Expense,
                Money::new(50_000),
                Category::parse("Mercado"),
                Utc::now(),
            )
            .payment(PaymentMethod::Credit(card)),
        )
        .await
        .unwrap();

    // The purchase is deferred: cash untouched, pending accrued.
    assert_eq!(
        engine.totals("alice").await.unwrap().balance,
        Money::new(100_000)
    );
    let pending = engine.pending_of("alice", card).await.unwrap();
    assert_eq!(pending.pending, Money::new(50_000));

    engine
        .pay_instrument(PayInstrumentCmd::new(
            "alice",
            card,
            Money::new(20_000),
            Utc::now(),
        ))
        .await
        .unwrap();

    // The payment reduces pending and cash by the paid amount only.
    let pending = engine.pending_of("alice", card).await.unwrap();
    assert_eq!(pending.pending, Money::new(30_000));
    assert_eq!(
        engine.totals("alice").await.unwrap().balance,
        Money::new(80_000)
    );
}

#[tokio::test]
async fn pay_instrument_rejects_amount_over_pending() {
    let engine = engine_with_db().await;

    let card = engine
        .new_instrument(
            "alice",
            "Bancolombia",
            InstrumentKind::Credit,
            "4242",
            "Visa",
            None,
        )
        .await
        .unwrap();
    engine
        .add_record(
            RecordNewCmd::new(
                "alice",
                RecordKind::Expense,
                Money::new(10_000),
                Category::parse("Mercado"),
                Utc::now(),
            )
            .payment(PaymentMethod::Credit(card)),
        )
        .await
        .unwrap();

    let err = engine
        .pay_instrument(PayInstrumentCmd::new(
            "alice",
            card,
            Money::new(10_001),
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("payment exceeds the instrument's pending amount".to_string())
    );
}

#[tokio::test]
async fn pay_instrument_rejects_debit_instruments() {
    let engine = engine_with_db().await;

    let debit = engine
        .new_instrument(
            "alice",
            "Bancolombia",
            InstrumentKind::Debit,
            "1111",
            "Debito",
            None,
        )
        .await
        .unwrap();

    let err = engine
        .pay_instrument(PayInstrumentCmd::new(
            "alice",
            debit,
            Money::new(1_000),
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInstrument(
            "pending amount is only defined for credit instruments".to_string()
        )
    );
}

#[tokio::test]
async fn deleted_instrument_fails_open() {
    let engine = engine_with_db().await;

    let card = engine
        .new_instrument(
            "alice",
            "Bancolombia",
            InstrumentKind::Credit,
            "4242",
            "Visa",
            None,
        )
        .await
        .unwrap();
    engine.add_record(income("alice", 100_000)).await.unwrap();
    engine
        .add_record(
            RecordNewCmd::new(
                "alice",
                RecordKind::Expense,
                Money::new(50_000),
                Category::parse("Mercado"),
                Utc::now(),
            )
            .payment(PaymentMethod::Credit(card)),
        )
        .await
        .unwrap();

    engine.delete_instrument("alice", card).await.unwrap();

    // Without the instrument the purchase counts against cash again.
    assert_eq!(
        engine.totals("alice").await.unwrap().balance,
        Money::new(50_000)
    );
}

#[tokio::test]
async fn transfer_moves_value_between_pockets() {
    let engine = engine_with_db().await;

    let savings = engine
        .new_pocket("alice", "Ahorros", PocketKind::Savings, None, None)
        .await
        .unwrap();
    engine.add_record(income("alice", 100_000)).await.unwrap();

    engine
        .transfer(
            TransferCmd::new("alice", Money::new(40_000), Utc::now()).to_pocket_id(savings),
        )
        .await
        .unwrap();

    let (balances, unassigned) = engine.pocket_balances("alice").await.unwrap();
    assert_eq!(unassigned, Money::new(60_000));
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].1, Money::new(40_000));

    // Value is conserved: the headline balance never moved.
    assert_eq!(
        engine.totals("alice").await.unwrap().balance,
        Money::new(100_000)
    );
}

#[tokio::test]
async fn transfer_writes_two_linked_records() {
    let engine = engine_with_db().await;

    let savings = engine
        .new_pocket("alice", "Ahorros", PocketKind::Savings, None, None)
        .await
        .unwrap();
    engine.add_record(income("alice", 100_000)).await.unwrap();

    let (out_id, in_id) = engine
        .transfer(
            TransferCmd::new("alice", Money::new(40_000), Utc::now())
                .to_pocket_id(savings)
                .note("mensual"),
        )
        .await
        .unwrap();

    let records = engine
        .list_records("alice", RecordListFilter::default())
        .await
        .unwrap();
    let outgoing = records.iter().find(|r| r.id == out_id).unwrap();
    let incoming = records.iter().find(|r| r.id == in_id).unwrap();

    assert_eq!(outgoing.kind, RecordKind::Expense);
    assert_eq!(incoming.kind, RecordKind::Income);
    assert_eq!(outgoing.amount, incoming.amount);
    assert_eq!(outgoing.linked_transfer_id, Some(in_id));
    assert_eq!(incoming.linked_transfer_id, Some(out_id));
    assert!(outgoing.category.is_transfer());
    assert_eq!(incoming.pocket_id, Some(savings));
    assert_eq!(outgoing.pocket_id, None);
}

#[tokio::test]
async fn transfer_rejects_bad_preconditions() {
    let engine = engine_with_db().await;

    let savings = engine
        .new_pocket("alice", "Ahorros", PocketKind::Savings, None, None)
        .await
        .unwrap();
    let trip = engine
        .new_pocket(
            "alice",
            "Viaje",
            PocketKind::Future,
            None,
            Some("2026-12"),
        )
        .await
        .unwrap();
    engine.add_record(income("alice", 10_000)).await.unwrap();

    let same = TransferCmd::new("alice", Money::new(1_000), Utc::now())
        .from_pocket_id(savings)
        .to_pocket_id(savings);
    assert_eq!(
        engine.transfer(same).await.unwrap_err(),
        EngineError::InvalidPocket("source and destination pockets must differ".to_string())
    );

    let zero = TransferCmd::new("alice", Money::ZERO, Utc::now()).to_pocket_id(savings);
    assert_eq!(
        engine.transfer(zero).await.unwrap_err(),
        EngineError::InvalidAmount("amount must be positive".to_string())
    );

    let broke = TransferCmd::new("alice", Money::new(999_999), Utc::now()).to_pocket_id(savings);
    assert_eq!(
        engine.transfer(broke).await.unwrap_err(),
        EngineError::InsufficientFunds("insufficient funds in source pocket".to_string())
    );

    let into_future = TransferCmd::new("alice", Money::new(1_000), Utc::now()).to_pocket_id(trip);
    assert_eq!(
        engine.transfer(into_future).await.unwrap_err(),
        EngineError::InvalidPocket("future pockets cannot take part in transfers".to_string())
    );

    let nowhere =
        TransferCmd::new("alice", Money::new(1_000), Utc::now()).to_pocket_id(Uuid::new_v4());
    assert_eq!(
        engine.transfer(nowhere).await.unwrap_err(),
        EngineError::KeyNotFound("pocket not exists".to_string())
    );
}

#[tokio::test]
async fn transfer_halves_cannot_be_edited_and_delete_together() {
    let engine = engine_with_db().await;

    let savings = engine
        .new_pocket("alice", "Ahorros", PocketKind::Savings, None, None)
        .await
        .unwrap();
    engine.add_record(income("alice", 100_000)).await.unwrap();
    let (out_id, _in_id) = engine
        .transfer(
            TransferCmd::new("alice", Money::new(40_000), Utc::now()).to_pocket_id(savings),
        )
        .await
        .unwrap();

    let err = engine
        .update_record(RecordUpdateCmd::new(
            "alice",
            out_id,
            RecordKind::Expense,
            Money::new(10_000),
            Category::parse("Mercado"),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidRecord(
            "transfer records cannot be edited; delete the transfer and issue a new one"
                .to_string()
        )
    );

    engine.delete_record("alice", out_id).await.unwrap();
    let records = engine
        .list_records("alice", RecordListFilter::default())
        .await
        .unwrap();
    // Both halves are gone; only the original income remains.
    assert_eq!(records.len(), 1);
    assert_eq!(engine.totals("alice").await.unwrap().balance, Money::new(100_000));
}

#[tokio::test]
async fn deleting_a_pocket_moves_its_records_to_unassigned() {
    let engine = engine_with_db().await;

    let savings = engine
        .new_pocket("alice", "Ahorros", PocketKind::Savings, None, None)
        .await
        .unwrap();
    engine
        .add_record(income("alice", 50_000).pocket_id(savings))
        .await
        .unwrap();

    engine.delete_pocket("alice", savings).await.unwrap();

    let (balances, unassigned) = engine.pocket_balances("alice").await.unwrap();
    assert!(balances.is_empty());
    assert_eq!(unassigned, Money::new(50_000));
}

#[tokio::test]
async fn pocket_names_are_unique_per_owner() {
    let engine = engine_with_db().await;

    engine
        .new_pocket("alice", "Ahorros", PocketKind::Savings, None, None)
        .await
        .unwrap();
    assert_eq!(
        engine
            .new_pocket("alice", "Ahorros", PocketKind::Debt, None, None)
            .await
            .unwrap_err(),
        EngineError::ExistingKey("Ahorros".to_string())
    );
    // A different owner can reuse the name.
    engine
        .new_pocket("bob", "Ahorros", PocketKind::Savings, None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn room_settlement_round_trip() {
    let engine = engine_with_db().await;

    let room = engine.new_room("Piso 3B", "a", "Ana").await.unwrap();
    engine
        .add_room_member(room.id, "b", "Beto", "a")
        .await
        .unwrap();
    engine
        .add_room_member(room.id, "c", "Cata", "a")
        .await
        .unwrap();

    engine
        .new_expense(
            ExpenseNewCmd::new(room.id, Money::new(90_000), "a", "a", Utc::now())
                .share("a", 1)
                .share("b", 1)
                .share("c", 1),
        )
        .await
        .unwrap();

    let debts = engine.room_pairwise_debts(room.id, "a").await.unwrap();
    assert_eq!(debts.len(), 2);
    assert!(
        debts
            .iter()
            .any(|d| d.from == "b" && d.to == "a" && d.amount == Money::new(30_000))
    );
    assert!(
        debts
            .iter()
            .any(|d| d.from == "c" && d.to == "a" && d.amount == Money::new(30_000))
    );

    // A second expense in the opposite direction is not netted away.
    engine
        .new_expense(
            ExpenseNewCmd::new(room.id, Money::new(30_000), "b", "b", Utc::now())
                .share("a", 1)
                .share("b", 1),
        )
        .await
        .unwrap();

    let debts = engine.room_pairwise_debts(room.id, "a").await.unwrap();
    assert!(
        debts
            .iter()
            .any(|d| d.from == "a" && d.to == "b" && d.amount == Money::new(15_000))
    );
    assert!(
        debts
            .iter()
            .any(|d| d.from == "b" && d.to == "a" && d.amount == Money::new(30_000))
    );

    let net = engine.room_net_positions(room.id, "b").await.unwrap();
    assert_eq!(net["a"], Money::new(45_000));
    assert_eq!(net["b"], Money::new(-15_000));
    assert_eq!(net["c"], Money::new(-30_000));
}

#[tokio::test]
async fn room_access_is_member_only() {
    let engine = engine_with_db().await;

    let room = engine.new_room("Piso 3B", "a", "Ana").await.unwrap();

    assert_eq!(
        engine.room_pairwise_debts(room.id, "mallory").await.unwrap_err(),
        EngineError::Forbidden("user is not a member of this room".to_string())
    );
    assert_eq!(
        engine
            .add_room_member(room.id, "b", "Beto", "mallory")
            .await
            .unwrap_err(),
        EngineError::Forbidden("user is not a member of this room".to_string())
    );
}

#[tokio::test]
async fn expense_participants_must_be_members() {
    let engine = engine_with_db().await;

    let room = engine.new_room("Piso 3B", "a", "Ana").await.unwrap();

    let err = engine
        .new_expense(
            ExpenseNewCmd::new(room.id, Money::new(10_000), "a", "a", Utc::now())
                .share("a", 1)
                .share("ghost", 1),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidShare("participant \"ghost\" is not a member of this room".to_string())
    );
}

#[tokio::test]
async fn expense_edits_are_creator_only() {
    let engine = engine_with_db().await;

    let room = engine.new_room("Piso 3B", "a", "Ana").await.unwrap();
    engine
        .add_room_member(room.id, "b", "Beto", "a")
        .await
        .unwrap();

    let expense_id = engine
        .new_expense(
            ExpenseNewCmd::new(room.id, Money::new(10_000), "a", "a", Utc::now())
                .share("a", 1)
                .share("b", 1),
        )
        .await
        .unwrap();

    let err = engine
        .update_expense(
            ExpenseUpdateCmd::new(room.id, expense_id, "b", Money::new(20_000), "a")
                .share("a", 1)
                .share("b", 1),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("only the creator can edit an expense".to_string())
    );

    engine
        .update_expense(
            ExpenseUpdateCmd::new(room.id, expense_id, "a", Money::new(20_000), "a")
                .share("a", 1)
                .share("b", 3),
        )
        .await
        .unwrap();

    let (_, _, expenses) = engine.room_snapshot(room.id, "a").await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, Money::new(20_000));
    assert_eq!(expenses[0].shares["b"], 3);

    assert_eq!(
        engine.delete_expense(room.id, expense_id, "b").await.unwrap_err(),
        EngineError::Forbidden("only the creator can delete an expense".to_string())
    );
    engine.delete_expense(room.id, expense_id, "a").await.unwrap();
    let (_, _, expenses) = engine.room_snapshot(room.id, "a").await.unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn recurring_rules_are_stored_not_executed() {
    let engine = engine_with_db().await;

    let rule_id = engine
        .new_rule(RuleNewCmd::new(
            "alice",
            RecordKind::Expense,
            Money::new(800_000),
            Category::parse("Arriendo"),
            Frequency::Monthly,
            5,
        ))
        .await
        .unwrap();

    let rules = engine.list_rules("alice").await.unwrap();
    assert_eq!(rules.len(), 1);
    assert!(rules[0].is_active);
    assert_eq!(rules[0].last_executed_at, None);

    // Storing a rule never creates records.
    assert!(
        engine
            .list_records("alice", RecordListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );

    engine
        .update_rule(RuleUpdateCmd::new(
            "alice",
            rule_id,
            RecordKind::Expense,
            Money::new(850_000),
            Category::parse("Arriendo"),
            Frequency::Monthly,
            7,
            false,
        ))
        .await
        .unwrap();
    let rules = engine.list_rules("alice").await.unwrap();
    assert_eq!(rules[0].amount, Money::new(850_000));
    assert!(!rules[0].is_active);

    engine.delete_rule("alice", rule_id).await.unwrap();
    assert!(engine.list_rules("alice").await.unwrap().is_empty());
}
