//! End-to-end metering properties: no double-spend under concurrency, the
//! balance/entry-sum invariant, and deliberate non-idempotence.

#![allow(clippy::unwrap_used)]

use leadledger_core::{
    BillableOperation, ChargeOutcome, MeteringGate, NewAccount, STARTING_CREDITS, Storage,
};

async fn account_with(storage: &Storage, email: &str, credits: i64) -> leadledger_core::AccountId {
    storage
        .accounts()
        .create(
            &NewAccount {
                full_name: "Load Tester".into(),
                email: email.into(),
                password: "password123".into(),
                company_name: None,
                industry: None,
                role: None,
            },
            credits,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn concurrent_charges_cannot_double_spend() {
    let storage = Storage::in_memory().await.unwrap();
    let cost = BillableOperation::ContactSearch.cost();
    // Balance covers exactly one charge.
    let id = account_with(&storage, "race@example.com", cost).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let gate = MeteringGate::new(storage.ledger());
            tokio::spawn(async move {
                gate.charge(id, &BillableOperation::ContactSearch, "Contact search")
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut charged = 0;
    let mut denied = 0;
    for task in tasks {
        match task.await.unwrap() {
            ChargeOutcome::Charged { new_balance } => {
                assert_eq!(new_balance, 0);
                charged += 1;
            }
            ChargeOutcome::Denied { available, .. } => {
                assert_eq!(available, 0);
                denied += 1;
            }
        }
    }

    assert_eq!(charged, 1);
    assert_eq!(denied, 7);

    let ledger = storage.ledger();
    assert_eq!(ledger.balance(id).await.unwrap(), 0);
    // One starting credit plus exactly one debit.
    assert_eq!(ledger.transactions(id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn balance_always_equals_entry_sum() {
    let storage = Storage::in_memory().await.unwrap();
    let id = account_with(&storage, "sum@example.com", STARTING_CREDITS).await;
    let gate = MeteringGate::new(storage.ledger());
    let ledger = storage.ledger();

    let operations = [
        BillableOperation::ContactSearch,
        BillableOperation::RevealEmail,
        BillableOperation::GenerateMessage,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport,
        BillableOperation::CrmImport, // denied: balance exhausted by now
    ];

    for op in &operations {
        gate.charge(id, op, "drain").await.unwrap();

        let balance = ledger.balance(id).await.unwrap();
        let sum: i64 = ledger
            .transactions(id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.amount)
            .sum();
        assert_eq!(balance, sum);
        assert!(balance >= 0);
    }
}

#[tokio::test]
async fn replayed_charge_deducts_twice() {
    let storage = Storage::in_memory().await.unwrap();
    let id = account_with(&storage, "replay@example.com", STARTING_CREDITS).await;
    let gate = MeteringGate::new(storage.ledger());

    let op = BillableOperation::RevealEmail;
    let first = gate.charge(id, &op, "Email reveal for contact ID: 7").await.unwrap();
    let second = gate.charge(id, &op, "Email reveal for contact ID: 7").await.unwrap();

    assert_eq!(first, ChargeOutcome::Charged { new_balance: 98 });
    assert_eq!(second, ChargeOutcome::Charged { new_balance: 96 });
}
