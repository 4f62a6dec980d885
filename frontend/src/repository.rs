//! Record store over the browser's key-value slots.
//!
//! Four slots are involved:
//! - `registeredUsers`: every [`UserRecord`], each embedding its own
//!   transactions and investments
//! - `allTransactions`: flat list of every transaction across users
//! - `allInvestments`: flat list of every investment across users (read only here)
//! - `user`: who is signed in
//!
//! Mutations run inside a [`Batch`]. The batch loads the slots an operation
//! touches, lets it edit the decoded copies, then encodes every dirty slot
//! before writing any of them. Nothing is written when the operation or the
//! encoding fails.
//!
//! The session is never rewritten by balance changes. [`UserRepository::current_session`]
//! projects the authoritative record onto the stored session on every read.

use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::currency::REFERENCE_CURRENCY;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    generate_id, same_email, today, Investment, SessionUser, Transaction, TransactionKind,
    TransactionStatus, UserPatch, UserRecord,
};
use crate::storage::{encode_slot, load_slot, KeyValueStore};

pub const USERS_KEY: &str = "registeredUsers";
pub const SESSION_KEY: &str = "user";
pub const TRANSACTIONS_KEY: &str = "allTransactions";
pub const INVESTMENTS_KEY: &str = "allInvestments";

/// Pending edits to the user and flat transaction slots.
struct Batch<'a> {
    store: &'a dyn KeyValueStore,
    users: Option<Vec<UserRecord>>,
    transactions: Option<Vec<Transaction>>,
}

impl<'a> Batch<'a> {
    fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            users: None,
            transactions: None,
        }
    }

    fn users_mut(&mut self) -> StoreResult<&mut Vec<UserRecord>> {
        if self.users.is_none() {
            self.users = Some(load_slot(self.store, USERS_KEY)?.unwrap_or_default());
        }
        Ok(self.users.get_or_insert_with(Vec::new))
    }

    fn transactions_mut(&mut self) -> StoreResult<&mut Vec<Transaction>> {
        if self.transactions.is_none() {
            self.transactions = Some(load_slot(self.store, TRANSACTIONS_KEY)?.unwrap_or_default());
        }
        Ok(self.transactions.get_or_insert_with(Vec::new))
    }

    fn commit(self) -> StoreResult<()> {
        let mut staged = Vec::with_capacity(2);
        if let Some(users) = &self.users {
            staged.push((USERS_KEY, encode_slot(USERS_KEY, users)?));
        }
        if let Some(transactions) = &self.transactions {
            staged.push((TRANSACTIONS_KEY, encode_slot(TRANSACTIONS_KEY, transactions)?));
        }

        for (key, raw) in staged {
            self.store.set_item(key, &raw)?;
        }
        Ok(())
    }
}

fn checked_balance(email: &str, balance: Option<Decimal>) -> StoreResult<Decimal> {
    balance.ok_or_else(|| StoreError::Overflow(email.to_string()))
}

fn find_user_mut<'u>(users: &'u mut [UserRecord], email: &str) -> StoreResult<&'u mut UserRecord> {
    users
        .iter_mut()
        .find(|u| same_email(&u.email, email))
        .ok_or_else(|| StoreError::UserNotFound(email.to_string()))
}

/// Record store accessor
#[derive(Clone)]
pub struct UserRepository {
    store: Rc<dyn KeyValueStore>,
}

impl UserRepository {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn transact<T>(&self, op: impl FnOnce(&mut Batch<'_>) -> StoreResult<T>) -> StoreResult<T> {
        let mut batch = Batch::new(self.store.as_ref());
        let out = op(&mut batch)?;
        batch.commit()?;
        Ok(out)
    }

    // ==================== Users ====================

    pub fn registered_users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(load_slot(self.store.as_ref(), USERS_KEY)?.unwrap_or_default())
    }

    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .registered_users()?
            .into_iter()
            .find(|u| same_email(&u.email, email)))
    }

    /// Inserts a new record or shallow-merges the patch onto the existing one.
    pub fn save_user(&self, patch: UserPatch) -> StoreResult<UserRecord> {
        self.transact(|batch| {
            let users = batch.users_mut()?;
            let saved = match users.iter_mut().find(|u| same_email(&u.email, &patch.email)) {
                Some(existing) => {
                    existing.apply(patch);
                    existing.clone()
                }
                None => {
                    let record = UserRecord::from_patch(patch);
                    users.push(record.clone());
                    record
                }
            };
            debug!(email = %saved.email, "user saved");
            Ok(saved)
        })
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> StoreResult<UserRecord> {
        self.transact(|batch| {
            let users = batch.users_mut()?;
            if users.iter().any(|u| same_email(&u.email, email)) {
                return Err(StoreError::AlreadyRegistered(email.to_string()));
            }
            let record =
                UserRecord::from_patch(UserPatch::new(email).name(name).password(password));
            users.push(record.clone());
            info!(email = %record.email, "user registered");
            Ok(record)
        })
    }

    /// Presence check of the stored credential.
    pub fn authenticate(&self, email: &str, password: &str) -> StoreResult<UserRecord> {
        match self.find_by_email(email)? {
            Some(record) if record.password == password => Ok(record),
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    /// Adds `delta` (possibly negative) to the balance. No floor is applied.
    pub fn update_balance(&self, email: &str, delta: Decimal) -> StoreResult<Decimal> {
        self.transact(|batch| {
            let user = find_user_mut(batch.users_mut()?, email)?;
            let balance = checked_balance(email, user.balance_or_zero().checked_add(delta))?;
            user.balance = Some(balance);
            debug!(email = %user.email, %delta, %balance, "balance adjusted");
            Ok(balance)
        })
    }

    /// Raises a missing or lower balance to `minimum`. `None` when no record matches.
    pub fn ensure_minimum_balance(
        &self,
        email: &str,
        minimum: Decimal,
    ) -> StoreResult<Option<Decimal>> {
        let Some(record) = self.find_by_email(email)? else {
            return Ok(None);
        };
        if record.balance.is_some() && record.balance_or_zero() >= minimum {
            return Ok(record.balance);
        }

        self.transact(|batch| {
            let user = find_user_mut(batch.users_mut()?, email)?;
            user.balance = Some(minimum);
            info!(email = %user.email, %minimum, "balance raised to minimum");
            Ok(Some(minimum))
        })
    }

    pub fn update_status(&self, email: &str, status: &str) -> StoreResult<()> {
        self.transact(|batch| {
            let user = find_user_mut(batch.users_mut()?, email)?;
            user.status = status.to_string();
            info!(email = %user.email, status, "user status updated");
            Ok(())
        })
    }

    /// Appends to the user's embedded list only.
    pub fn add_transaction(&self, email: &str, transaction: Transaction) -> StoreResult<()> {
        self.transact(|batch| {
            let user = find_user_mut(batch.users_mut()?, email)?;
            user.transactions
                .get_or_insert_with(Vec::new)
                .push(transaction);
            Ok(())
        })
    }

    /// Appends to the user's embedded list only.
    pub fn add_investment(&self, email: &str, investment: Investment) -> StoreResult<()> {
        self.transact(|batch| {
            let user = find_user_mut(batch.users_mut()?, email)?;
            user.investments.get_or_insert_with(Vec::new).push(investment);
            Ok(())
        })
    }

    pub fn user_transactions(&self, email: &str) -> StoreResult<Vec<Transaction>> {
        Ok(self
            .find_by_email(email)?
            .and_then(|u| u.transactions)
            .unwrap_or_default())
    }

    pub fn user_investments(&self, email: &str) -> StoreResult<Vec<Investment>> {
        Ok(self
            .find_by_email(email)?
            .and_then(|u| u.investments)
            .unwrap_or_default())
    }

    // ==================== Flat lists ====================

    pub fn all_transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(load_slot(self.store.as_ref(), TRANSACTIONS_KEY)?.unwrap_or_default())
    }

    pub fn all_investments(&self) -> StoreResult<Vec<Investment>> {
        Ok(load_slot(self.store.as_ref(), INVESTMENTS_KEY)?.unwrap_or_default())
    }

    /// Sets the status of a flat-list transaction.
    ///
    /// Moving a deposit to `completed` credits its amount to the owner. The
    /// credit is applied on every such call, including repeats. Completing a
    /// withdrawal does not debit.
    pub fn update_transaction_status(
        &self,
        email: &str,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> StoreResult<Transaction> {
        self.transact(|batch| {
            let transactions = batch.transactions_mut()?;
            let transaction = transactions
                .iter_mut()
                .find(|t| t.id == transaction_id && same_email(&t.user_email, email))
                .ok_or_else(|| StoreError::TransactionNotFound {
                    id: transaction_id.to_string(),
                    email: email.to_string(),
                })?;
            transaction.status = status;
            let updated = transaction.clone();

            if status == TransactionStatus::Completed && updated.kind == TransactionKind::Deposit {
                match find_user_mut(batch.users_mut()?, email) {
                    Ok(user) => {
                        let balance =
                            checked_balance(email, user.balance_or_zero().checked_add(updated.amount))?;
                        user.balance = Some(balance);
                        info!(email = %user.email, id = %updated.id, amount = %updated.amount, "deposit credited");
                    }
                    Err(_) => {
                        warn!(email, id = %updated.id, "deposit owner not registered, balance untouched")
                    }
                }
            }

            debug!(id = %updated.id, status = status.as_str(), "transaction status updated");
            Ok(updated)
        })
    }

    /// Credits `amount` and records a completed deposit in the flat list.
    pub fn add_profit(
        &self,
        email: &str,
        amount: Decimal,
        description: &str,
    ) -> StoreResult<Transaction> {
        self.transact(|batch| {
            let user = find_user_mut(batch.users_mut()?, email)?;
            let balance = checked_balance(email, user.balance_or_zero().checked_add(amount))?;
            user.balance = Some(balance);
            let transaction = synthetic_transaction(user, TransactionKind::Deposit, amount, description);

            batch.transactions_mut()?.push(transaction.clone());
            info!(email, %amount, %balance, "profit credited");
            Ok(transaction)
        })
    }

    /// Debits `amount`, flooring the balance at zero, and records a completed
    /// withdrawal in the flat list.
    pub fn deduct(&self, email: &str, amount: Decimal, description: &str) -> StoreResult<Transaction> {
        self.transact(|batch| {
            let user = find_user_mut(batch.users_mut()?, email)?;
            let balance = checked_balance(email, user.balance_or_zero().checked_sub(amount))?
                .max(Decimal::ZERO);
            user.balance = Some(balance);
            let transaction =
                synthetic_transaction(user, TransactionKind::Withdrawal, amount, description);

            batch.transactions_mut()?.push(transaction.clone());
            info!(email, %amount, %balance, "withdrawal debited");
            Ok(transaction)
        })
    }

    // ==================== Session ====================

    /// The signed-in user, with public fields taken from the matching record.
    pub fn current_session(&self) -> StoreResult<Option<SessionUser>> {
        let Some(stored) = load_slot::<SessionUser>(self.store.as_ref(), SESSION_KEY)? else {
            return Ok(None);
        };
        match self.find_by_email(&stored.email)? {
            Some(record) => Ok(Some(stored.project(&record))),
            None => Ok(Some(stored)),
        }
    }

    pub fn start_session(&self, record: &UserRecord) -> StoreResult<SessionUser> {
        let session = SessionUser::from(record);
        let raw = encode_slot(SESSION_KEY, &session)?;
        self.store.set_item(SESSION_KEY, &raw)?;
        info!(email = %session.email, "session started");
        Ok(session)
    }

    pub fn end_session(&self) -> StoreResult<()> {
        self.store.remove_item(SESSION_KEY)?;
        info!("session ended");
        Ok(())
    }
}

fn synthetic_transaction(
    user: &UserRecord,
    kind: TransactionKind,
    amount: Decimal,
    description: &str,
) -> Transaction {
    Transaction {
        id: generate_id(),
        user_email: user.email.clone(),
        user_name: Some(user.name.clone()),
        kind,
        amount,
        currency: REFERENCE_CURRENCY.to_string(),
        status: TransactionStatus::Completed,
        date: today(),
        method: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvestmentStatus;
    use crate::storage::MemoryStorage;

    fn create_test_repo() -> (Rc<MemoryStorage>, UserRepository) {
        let store = Rc::new(MemoryStorage::new());
        let repo = UserRepository::new(store.clone());
        (store, repo)
    }

    fn create_test_user(repo: &UserRepository, email: &str, balance: i64) -> UserRecord {
        repo.save_user(
            UserPatch::new(email)
                .name("Test User")
                .password("password123")
                .balance(Decimal::from(balance)),
        )
        .unwrap()
    }

    fn create_pending_deposit(
        store: &MemoryStorage,
        id: &str,
        email: &str,
        amount: i64,
    ) -> Transaction {
        let transaction = Transaction {
            id: id.to_string(),
            user_email: email.to_string(),
            user_name: None,
            kind: TransactionKind::Deposit,
            amount: Decimal::from(amount),
            currency: REFERENCE_CURRENCY.to_string(),
            status: TransactionStatus::Pending,
            date: "2024-05-01".to_string(),
            method: "Bitcoin".to_string(),
        };
        let mut all: Vec<Transaction> = load_slot(store, TRANSACTIONS_KEY).unwrap().unwrap_or_default();
        all.push(transaction.clone());
        store
            .set_item(TRANSACTIONS_KEY, &serde_json::to_string(&all).unwrap())
            .unwrap();
        transaction
    }

    fn balance_of(repo: &UserRepository, email: &str) -> Decimal {
        repo.find_by_email(email).unwrap().unwrap().balance_or_zero()
    }

    #[test]
    fn test_empty_store_reads_empty() {
        let (_, repo) = create_test_repo();
        assert!(repo.registered_users().unwrap().is_empty());
        assert!(repo.all_transactions().unwrap().is_empty());
        assert!(repo.all_investments().unwrap().is_empty());
        assert!(repo.current_session().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_users_slot_is_an_error() {
        let (store, repo) = create_test_repo();
        store.set_item(USERS_KEY, "not json").unwrap();

        let err = repo.registered_users().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == USERS_KEY));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_find_by_email_is_case_insensitive() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "A@B.com", 0);

        let found = repo.find_by_email("a@b.com").unwrap().unwrap();
        assert_eq!(found.email, "A@B.com");
        assert!(repo.find_by_email("nobody@b.com").unwrap().is_none());
    }

    #[test]
    fn test_upsert_merges_existing_record() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);

        repo.save_user(UserPatch::new("ANN@example.com").status("suspended"))
            .unwrap();

        let users = repo.registered_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Test User");
        assert_eq!(users[0].password, "password123");
        assert_eq!(users[0].balance, Some(Decimal::from(500)));
        assert_eq!(users[0].status, "suspended");
    }

    #[test]
    fn test_upsert_new_email_appends_one_record() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 0);
        create_test_user(&repo, "bob@example.com", 0);

        let users = repo.registered_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].email, "bob@example.com");
        assert_eq!(users[1].status, "active");
    }

    #[test]
    fn test_upsert_keeps_embedded_lists() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 0);
        let investment = Investment {
            id: "inv-1".to_string(),
            user_email: "ann@example.com".to_string(),
            user_name: None,
            plan: "Starter Plan".to_string(),
            amount: Decimal::from(100),
            profit: Decimal::ZERO,
            duration: "30 days".to_string(),
            start_date: "2024-05-01".to_string(),
            end_date: "2024-05-31".to_string(),
            status: InvestmentStatus::Active,
        };
        repo.add_investment("ann@example.com", investment.clone()).unwrap();

        repo.save_user(UserPatch::new("ann@example.com").name("Ann")).unwrap();

        assert_eq!(repo.user_investments("ann@example.com").unwrap(), vec![investment]);
        assert!(repo.all_investments().unwrap().is_empty());
    }

    #[test]
    fn test_register_and_authenticate() {
        let (_, repo) = create_test_repo();
        repo.register("Ann", "ann@example.com", "password123").unwrap();

        let err = repo.register("Ann", "ANN@example.com", "other").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyRegistered(_)));

        let record = repo.authenticate("Ann@Example.com", "password123").unwrap();
        assert_eq!(record.name, "Ann");
        assert!(matches!(
            repo.authenticate("ann@example.com", "wrong"),
            Err(StoreError::InvalidCredentials)
        ));
        assert!(matches!(
            repo.authenticate("nobody@example.com", "password123"),
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_update_balance_has_no_floor() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);

        let balance = repo
            .update_balance("ann@example.com", Decimal::from(-1_000_000))
            .unwrap();
        assert_eq!(balance, Decimal::from(-999_500));
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(-999_500));
    }

    #[test]
    fn test_deduct_floors_at_zero() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);

        let transaction = repo
            .deduct("ann@example.com", Decimal::from(1_000_000), "Withdrawal")
            .unwrap();
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::ZERO);
        assert_eq!(transaction.kind, TransactionKind::Withdrawal);
        assert_eq!(transaction.status, TransactionStatus::Completed);
        assert_eq!(transaction.amount, Decimal::from(1_000_000));
        assert_eq!(repo.all_transactions().unwrap().len(), 1);
    }

    #[test]
    fn test_update_balance_missing_user() {
        let (store, repo) = create_test_repo();
        let err = repo
            .update_balance("nobody@example.com", Decimal::ONE)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.get_item(USERS_KEY).unwrap(), None);
    }

    #[test]
    fn test_session_follows_balance_changes() {
        let (store, repo) = create_test_repo();
        let ann = create_test_user(&repo, "ann@example.com", 500);
        create_test_user(&repo, "bob@example.com", 700);
        repo.start_session(&ann).unwrap();
        let stored_session = store.get_item(SESSION_KEY).unwrap();

        let balance = repo.update_balance("ANN@example.com", Decimal::from(250)).unwrap();
        let session = repo.current_session().unwrap().unwrap();
        assert_eq!(session.balance, Some(balance));

        repo.update_balance("bob@example.com", Decimal::from(1)).unwrap();
        let session = repo.current_session().unwrap().unwrap();
        assert_eq!(session.email, "ann@example.com");
        assert_eq!(session.balance, Some(Decimal::from(750)));
        assert_eq!(store.get_item(SESSION_KEY).unwrap(), stored_session);
    }

    #[test]
    fn test_session_without_record_uses_snapshot() {
        let (store, repo) = create_test_repo();
        store
            .set_item(SESSION_KEY, r#"{"email":"guest@example.com","name":"Guest","balance":12}"#)
            .unwrap();

        let session = repo.current_session().unwrap().unwrap();
        assert_eq!(session.name, "Guest");
        assert_eq!(session.balance, Some(Decimal::from(12)));

        repo.end_session().unwrap();
        assert!(repo.current_session().unwrap().is_none());
    }

    #[test]
    fn test_add_profit_records_flat_deposit() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);

        let transaction = repo
            .add_profit("Ann@Example.com", Decimal::from(1250), "Investment Profit")
            .unwrap();

        let all = repo.all_transactions().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], transaction);
        assert_eq!(transaction.kind, TransactionKind::Deposit);
        assert_eq!(transaction.status, TransactionStatus::Completed);
        assert_eq!(transaction.amount, Decimal::from(1250));
        assert_eq!(transaction.currency, "USD");
        assert_eq!(transaction.method, "Investment Profit");
        assert_eq!(transaction.user_name.as_deref(), Some("Test User"));
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(1750));
        assert!(repo.user_transactions("ann@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_add_profit_with_corrupt_flat_list_writes_nothing() {
        let (store, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);
        store.set_item(TRANSACTIONS_KEY, "{broken").unwrap();

        let err = repo
            .add_profit("ann@example.com", Decimal::from(1250), "Investment Profit")
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(500));
    }

    #[test]
    fn test_add_transaction_is_structural_only() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);
        let transaction = Transaction {
            id: "t-1".to_string(),
            user_email: "ann@example.com".to_string(),
            user_name: Some("Ann".to_string()),
            kind: TransactionKind::Deposit,
            amount: Decimal::from(300),
            currency: "USD".to_string(),
            status: TransactionStatus::Pending,
            date: "2024-05-01".to_string(),
            method: "Bank transfer".to_string(),
        };

        repo.add_transaction("ann@example.com", transaction.clone()).unwrap();

        assert_eq!(repo.user_transactions("ann@example.com").unwrap(), vec![transaction]);
        assert!(repo.all_transactions().unwrap().is_empty());
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(500));
    }

    #[test]
    fn test_reads_for_unknown_user_are_empty() {
        let (_, repo) = create_test_repo();
        assert!(repo.user_transactions("nobody@example.com").unwrap().is_empty());
        assert!(repo.user_investments("nobody@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_update_status_ignores_case() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "Ann@Example.com", 0);

        repo.update_status("ann@example.com", "suspended").unwrap();
        assert_eq!(
            repo.find_by_email("ann@example.com").unwrap().unwrap().status,
            "suspended"
        );
    }

    #[test]
    fn test_completing_deposit_credits_owner() {
        let (store, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);
        create_pending_deposit(&store, "t-1", "ann@example.com", 25_000);

        let updated = repo
            .update_transaction_status("ann@example.com", "t-1", TransactionStatus::Completed)
            .unwrap();
        assert_eq!(updated.status, TransactionStatus::Completed);
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(25_500));
        assert_eq!(repo.all_transactions().unwrap()[0].status, TransactionStatus::Completed);
    }

    #[test]
    fn test_repeated_completion_credits_each_time() {
        let (store, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 0);
        create_pending_deposit(&store, "t-1", "ann@example.com", 100);

        for _ in 0..2 {
            repo.update_transaction_status("ann@example.com", "t-1", TransactionStatus::Completed)
                .unwrap();
        }
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(200));
    }

    #[test]
    fn test_rejecting_deposit_leaves_balance() {
        let (store, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);
        create_pending_deposit(&store, "t-1", "ann@example.com", 100);

        repo.update_transaction_status("ann@example.com", "t-1", TransactionStatus::Rejected)
            .unwrap();
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(500));
        assert_eq!(repo.all_transactions().unwrap()[0].status, TransactionStatus::Rejected);
    }

    #[test]
    fn test_completing_withdrawal_does_not_debit() {
        let (_, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 500);
        let withdrawal = repo
            .deduct("ann@example.com", Decimal::from(100), "Withdrawal")
            .unwrap();

        repo.update_transaction_status("ann@example.com", &withdrawal.id, TransactionStatus::Completed)
            .unwrap();
        assert_eq!(balance_of(&repo, "ann@example.com"), Decimal::from(400));
    }

    #[test]
    fn test_transaction_status_requires_matching_owner() {
        let (store, repo) = create_test_repo();
        create_test_user(&repo, "ann@example.com", 0);
        create_pending_deposit(&store, "t-1", "ann@example.com", 100);

        let err = repo
            .update_transaction_status("bob@example.com", "t-1", TransactionStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, StoreError::TransactionNotFound { .. }));
        assert_eq!(repo.all_transactions().unwrap()[0].status, TransactionStatus::Pending);
    }

    #[test]
    fn test_completion_with_corrupt_users_keeps_flat_list() {
        let (store, repo) = create_test_repo();
        create_pending_deposit(&store, "t-1", "ann@example.com", 100);
        store.set_item(USERS_KEY, "[{").unwrap();

        assert!(repo
            .update_transaction_status("ann@example.com", "t-1", TransactionStatus::Completed)
            .is_err());
        assert_eq!(repo.all_transactions().unwrap()[0].status, TransactionStatus::Pending);
    }

    #[test]
    fn test_ensure_minimum_balance() {
        let (_, repo) = create_test_repo();
        let minimum = Decimal::from(145_000);
        create_test_user(&repo, "low@example.com", 500);
        create_test_user(&repo, "high@example.com", 200_000);

        assert_eq!(repo.ensure_minimum_balance("LOW@example.com", minimum).unwrap(), Some(minimum));
        assert_eq!(
            repo.ensure_minimum_balance("high@example.com", minimum).unwrap(),
            Some(Decimal::from(200_000))
        );
        assert_eq!(repo.ensure_minimum_balance("nobody@example.com", minimum).unwrap(), None);
        assert_eq!(balance_of(&repo, "low@example.com"), minimum);
    }

    #[test]
    fn test_ensure_minimum_balance_fills_missing_balance() {
        let (store, repo) = create_test_repo();
        store
            .set_item(
                USERS_KEY,
                r#"[{"email":"unset@example.com","name":"Unset","password":"password123","status":"active"}]"#,
            )
            .unwrap();
        let minimum = Decimal::from(145_000);
        assert_eq!(repo.find_by_email("unset@example.com").unwrap().unwrap().balance, None);

        assert_eq!(repo.ensure_minimum_balance("unset@example.com", minimum).unwrap(), Some(minimum));
        assert_eq!(
            repo.find_by_email("unset@example.com").unwrap().unwrap().balance,
            Some(minimum)
        );

        repo.update_balance("unset@example.com", Decimal::from(5)).unwrap();
        assert_eq!(balance_of(&repo, "unset@example.com"), Decimal::from(145_005));
    }

    fn create_huge_balance_user(repo: &UserRepository, email: &str) {
        let huge = Decimal::from_i128_with_scale(6 * 10i128.pow(28), 0);
        repo.save_user(UserPatch::new(email).name("Whale").balance(huge))
            .unwrap();
    }

    #[test]
    fn test_balance_overflow_writes_nothing() {
        let (store, repo) = create_test_repo();
        create_huge_balance_user(&repo, "whale@example.com");
        let users_before = store.get_item(USERS_KEY).unwrap();

        let err = repo
            .update_balance("whale@example.com", Decimal::MAX)
            .unwrap_err();
        assert!(matches!(err, StoreError::Overflow(ref email) if email == "whale@example.com"));

        assert!(matches!(
            repo.add_profit("whale@example.com", Decimal::MAX, "Investment Profit"),
            Err(StoreError::Overflow(_))
        ));
        assert!(matches!(
            repo.deduct("whale@example.com", -Decimal::MAX, "Withdrawal"),
            Err(StoreError::Overflow(_))
        ));

        assert_eq!(store.get_item(USERS_KEY).unwrap(), users_before);
        assert!(repo.all_transactions().unwrap().is_empty());
    }

    #[test]
    fn test_completion_overflow_keeps_deposit_pending() {
        let (store, repo) = create_test_repo();
        create_huge_balance_user(&repo, "whale@example.com");
        let deposit = Transaction {
            amount: Decimal::from_i128_with_scale(3 * 10i128.pow(28), 0),
            ..create_pending_deposit(&store, "t-1", "whale@example.com", 0)
        };
        store
            .set_item(TRANSACTIONS_KEY, &serde_json::to_string(&vec![deposit]).unwrap())
            .unwrap();

        assert!(matches!(
            repo.update_transaction_status("whale@example.com", "t-1", TransactionStatus::Completed),
            Err(StoreError::Overflow(_))
        ));
        assert_eq!(repo.all_transactions().unwrap()[0].status, TransactionStatus::Pending);
    }
}
