//! In-memory [`BudgetStore`] for tests: scripted setup, call counters, sample data.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::OpenConfig;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    Account, BudgetMonth, BudgetMonthCategory, BudgetMonthGroup, Category, CategoryGroup,
    NewTransaction, Payee, Transaction, TransactionPatch,
};
use crate::store::BudgetStore;

#[derive(Debug, Default, Clone)]
pub struct FakeData {
    pub accounts: Vec<Account>,
    pub category_groups: Vec<CategoryGroup>,
    pub payees: Vec<Payee>,
    pub transactions: Vec<Transaction>,
    pub months: HashMap<String, BudgetMonth>,
}

#[derive(Debug, Default)]
struct Script {
    open_delay: Option<Duration>,
    open_failure: Option<String>,
    open_panics: bool,
    load_failure: Option<String>,
}

/// Scriptable fake store. Counters record how often the lifecycle calls ran.
#[derive(Debug, Default)]
pub struct FakeBudgetStore {
    data: Mutex<FakeData>,
    script: Mutex<Script>,
    loaded: Mutex<Option<String>>,
    bank_syncs: Mutex<Vec<Option<String>>>,
    open_calls: AtomicUsize,
    load_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl FakeBudgetStore {
    #[must_use]
    pub fn new(data: FakeData) -> Self {
        Self {
            data: Mutex::new(data),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sample_data() -> Self {
        Self::new(sample_data())
    }

    /// Make `open` sleep before settling.
    #[must_use]
    pub fn with_open_delay(self, delay: Duration) -> Self {
        self.lock_script().open_delay = Some(delay);
        self
    }

    /// Make `open` fail with [`StoreError::Auth`] carrying `message`.
    #[must_use]
    pub fn failing_open(self, message: &str) -> Self {
        self.set_open_failure(Some(message));
        self
    }

    /// Make `open` panic, killing whatever task is running setup.
    #[must_use]
    pub fn panicking_open(self) -> Self {
        self.set_open_panics(true);
        self
    }

    pub fn set_open_panics(&self, panics: bool) {
        self.lock_script().open_panics = panics;
    }

    pub fn set_open_failure(&self, message: Option<&str>) {
        self.lock_script().open_failure = message.map(ToString::to_string);
    }

    pub fn set_load_failure(&self, message: Option<&str>) {
        self.lock_script().load_failure = message.map(ToString::to_string);
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn loaded_budget(&self) -> Option<String> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn bank_syncs(&self) -> Vec<Option<String>> {
        self.bank_syncs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> FakeData {
        self.lock_data().clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_data(&self) -> std::sync::MutexGuard<'_, FakeData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_loaded(&self) -> StoreResult<()> {
        if self.loaded_budget().is_some() {
            Ok(())
        } else {
            Err(StoreError::NotLoaded)
        }
    }
}

fn account_exists(data: &FakeData, account_id: &str) -> StoreResult<()> {
    if data.accounts.iter().any(|a| a.id == account_id) {
        Ok(())
    } else {
        Err(StoreError::NotFound(format!(
            "account '{account_id}' not found"
        )))
    }
}

fn transaction_missing(transaction_id: &str) -> StoreError {
    StoreError::NotFound(format!("transaction '{transaction_id}' not found"))
}

#[async_trait]
impl BudgetStore for FakeBudgetStore {
    async fn open(&self, _config: &OpenConfig) -> StoreResult<()> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, panics, failure) = {
            let script = self.lock_script();
            (
                script.open_delay,
                script.open_panics,
                script.open_failure.clone(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        assert!(!panics, "scripted open panic");
        match failure {
            Some(message) => Err(StoreError::Auth(message)),
            None => Ok(()),
        }
    }

    async fn load_budget(&self, budget_id: &str) -> StoreResult<()> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.lock_script().load_failure.clone() {
            return Err(StoreError::NotFound(message));
        }
        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner) = Some(budget_id.to_string());
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    async fn accounts(&self) -> StoreResult<Vec<Account>> {
        self.ensure_loaded()?;
        Ok(self.lock_data().accounts.clone())
    }

    async fn account_balance(
        &self,
        account_id: &str,
        cutoff: Option<NaiveDate>,
    ) -> StoreResult<i64> {
        self.ensure_loaded()?;
        let data = self.lock_data();
        account_exists(&data, account_id)?;
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .filter(|t| cutoff.is_none_or(|cutoff| t.date <= cutoff))
            .map(|t| t.amount)
            .sum())
    }

    async fn category_groups(&self) -> StoreResult<Vec<CategoryGroup>> {
        self.ensure_loaded()?;
        Ok(self.lock_data().category_groups.clone())
    }

    async fn payees(&self) -> StoreResult<Vec<Payee>> {
        self.ensure_loaded()?;
        Ok(self.lock_data().payees.clone())
    }

    async fn transactions(
        &self,
        account_id: &str,
        since: NaiveDate,
        until: Option<NaiveDate>,
    ) -> StoreResult<Vec<Transaction>> {
        self.ensure_loaded()?;
        let data = self.lock_data();
        account_exists(&data, account_id)?;
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id && t.date >= since)
            .filter(|t| until.is_none_or(|until| t.date <= until))
            .cloned()
            .collect())
    }

    async fn budget_month(&self, month: &str) -> StoreResult<BudgetMonth> {
        self.ensure_loaded()?;
        self.lock_data()
            .months
            .get(month)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("month '{month}' not found")))
    }

    async fn set_budget_amount(
        &self,
        month: &str,
        category_id: &str,
        amount: i64,
    ) -> StoreResult<()> {
        self.ensure_loaded()?;
        let mut data = self.lock_data();
        let budget_month = data
            .months
            .get_mut(month)
            .ok_or_else(|| StoreError::NotFound(format!("month '{month}' not found")))?;
        let category = budget_month
            .category_groups
            .iter_mut()
            .flat_map(|group| group.categories.iter_mut())
            .find(|category| category.id == category_id)
            .ok_or_else(|| StoreError::NotFound(format!("category '{category_id}' not found")))?;
        category.balance += amount - category.budgeted;
        category.budgeted = amount;
        Ok(())
    }

    async fn create_transaction(
        &self,
        account_id: &str,
        transaction: NewTransaction,
    ) -> StoreResult<()> {
        self.ensure_loaded()?;
        let mut data = self.lock_data();
        account_exists(&data, account_id)?;
        data.transactions.push(Transaction {
            id: transaction.id,
            account_id: account_id.to_string(),
            date: transaction.date,
            amount: transaction.amount,
            payee_id: transaction.payee_id,
            category_id: transaction.category_id,
            notes: transaction.notes,
            imported_payee: transaction.payee_name,
            cleared: transaction.cleared,
            transfer_id: None,
            is_parent: false,
            subtransactions: Vec::new(),
        });
        Ok(())
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> StoreResult<()> {
        self.ensure_loaded()?;
        let mut data = self.lock_data();
        let txn = data
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| transaction_missing(transaction_id))?;
        if let Some(date) = patch.date {
            txn.date = date;
        }
        if let Some(amount) = patch.amount {
            txn.amount = amount;
        }
        if patch.payee_id.is_some() {
            txn.payee_id = patch.payee_id;
        }
        if patch.category_id.is_some() {
            txn.category_id = patch.category_id;
        }
        if patch.notes.is_some() {
            txn.notes = patch.notes;
        }
        if let Some(cleared) = patch.cleared {
            txn.cleared = cleared;
        }
        Ok(())
    }

    async fn delete_transaction(&self, transaction_id: &str) -> StoreResult<()> {
        self.ensure_loaded()?;
        let mut data = self.lock_data();
        let before = data.transactions.len();
        data.transactions.retain(|t| t.id != transaction_id);
        if data.transactions.len() == before {
            return Err(transaction_missing(transaction_id));
        }
        Ok(())
    }

    async fn run_bank_sync(&self, account_id: Option<&str>) -> StoreResult<()> {
        self.ensure_loaded()?;
        if let Some(account_id) = account_id {
            account_exists(&self.lock_data(), account_id)?;
        }
        self.bank_syncs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(account_id.map(ToString::to_string));
        Ok(())
    }
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn account(id: &str, name: &str, closed: bool) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
        off_budget: false,
        closed,
    }
}

fn category(id: &str, name: &str, group_id: &str, is_income: bool, hidden: bool) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        group_id: Some(group_id.to_string()),
        is_income,
        hidden,
    }
}

fn payee(id: &str, name: &str, transfer_account_id: Option<&str>) -> Payee {
    Payee {
        id: id.to_string(),
        name: name.to_string(),
        transfer_account_id: transfer_account_id.map(ToString::to_string),
    }
}

fn txn(
    id: &str,
    account_id: &str,
    date: NaiveDate,
    amount: i64,
    payee_id: Option<&str>,
    category_id: Option<&str>,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        account_id: account_id.to_string(),
        date,
        amount,
        payee_id: payee_id.map(ToString::to_string),
        category_id: category_id.map(ToString::to_string),
        notes: None,
        imported_payee: None,
        cleared: false,
        transfer_id: None,
        is_parent: false,
        subtransactions: Vec::new(),
    }
}

fn month_category(id: &str, name: &str, budgeted: i64, spent: i64) -> BudgetMonthCategory {
    BudgetMonthCategory {
        id: id.to_string(),
        name: name.to_string(),
        budgeted,
        spent,
        balance: budgeted + spent,
    }
}

/// A small March 2024 household budget.
///
/// Checking carries salary, rent, groceries, a split purchase, a transfer to
/// savings, a utility bill, and one uncategorized card swipe. The closed
/// "Old Card" account holds a single 2023 purchase.
#[must_use]
pub fn sample_data() -> FakeData {
    let accounts = vec![
        account("acct-checking", "Checking", false),
        account("acct-savings", "Savings", false),
        account("acct-old", "Old Card", true),
    ];

    let category_groups = vec![
        CategoryGroup {
            id: "grp-bills".to_string(),
            name: "Bills".to_string(),
            is_income: false,
            hidden: false,
            categories: vec![
                category("cat-rent", "Rent", "grp-bills", false, false),
                category("cat-utilities", "Utilities", "grp-bills", false, false),
            ],
        },
        CategoryGroup {
            id: "grp-everyday".to_string(),
            name: "Everyday".to_string(),
            is_income: false,
            hidden: false,
            categories: vec![
                category("cat-food", "Food", "grp-everyday", false, false),
                category("cat-fun", "Fun", "grp-everyday", false, false),
                category("cat-hobby", "Old Hobby", "grp-everyday", false, true),
            ],
        },
        CategoryGroup {
            id: "grp-income".to_string(),
            name: "Income".to_string(),
            is_income: true,
            hidden: false,
            categories: vec![category(
                "cat-salary",
                "Salary",
                "grp-income",
                true,
                false,
            )],
        },
    ];

    let payees = vec![
        payee("pay-landlord", "Landlord", None),
        payee("pay-grocer", "Green Grocer", None),
        payee("pay-employer", "Acme Corp", None),
        payee("pay-power", "City Power", None),
        payee("pay-to-savings", "Transfer: Savings", Some("acct-savings")),
        payee(
            "pay-to-checking",
            "Transfer: Checking",
            Some("acct-checking"),
        ),
    ];

    let mut rent = txn(
        "t-rent",
        "acct-checking",
        day(2024, 3, 2),
        -120_000,
        Some("pay-landlord"),
        Some("cat-rent"),
    );
    rent.cleared = true;

    let mut groceries = txn(
        "t-groceries",
        "acct-checking",
        day(2024, 3, 5),
        -8_550,
        Some("pay-grocer"),
        Some("cat-food"),
    );
    groceries.notes = Some("weekly shop".to_string());

    let mut split = txn(
        "t-split",
        "acct-checking",
        day(2024, 3, 10),
        -10_000,
        Some("pay-grocer"),
        None,
    );
    split.is_parent = true;
    split.subtransactions = vec![
        txn(
            "t-split-food",
            "acct-checking",
            day(2024, 3, 10),
            -6_000,
            Some("pay-grocer"),
            Some("cat-food"),
        ),
        txn(
            "t-split-fun",
            "acct-checking",
            day(2024, 3, 10),
            -4_000,
            Some("pay-grocer"),
            Some("cat-fun"),
        ),
    ];

    let mut transfer_out = txn(
        "t-transfer-out",
        "acct-checking",
        day(2024, 3, 12),
        -50_000,
        Some("pay-to-savings"),
        None,
    );
    transfer_out.transfer_id = Some("t-transfer-in".to_string());
    let mut transfer_in = txn(
        "t-transfer-in",
        "acct-savings",
        day(2024, 3, 12),
        50_000,
        Some("pay-to-checking"),
        None,
    );
    transfer_in.transfer_id = Some("t-transfer-out".to_string());

    let mut coffee = txn(
        "t-coffee",
        "acct-checking",
        day(2024, 3, 20),
        -1_999,
        None,
        None,
    );
    coffee.imported_payee = Some("SQ *COFFEE".to_string());

    let transactions = vec![
        txn(
            "t-salary",
            "acct-checking",
            day(2024, 3, 1),
            300_000,
            Some("pay-employer"),
            Some("cat-salary"),
        ),
        rent,
        groceries,
        split,
        transfer_out,
        transfer_in,
        txn(
            "t-power",
            "acct-checking",
            day(2024, 3, 15),
            -6_425,
            Some("pay-power"),
            Some("cat-utilities"),
        ),
        coffee,
        txn(
            "t-feb-groceries",
            "acct-checking",
            day(2024, 2, 25),
            -3_000,
            Some("pay-grocer"),
            Some("cat-food"),
        ),
        txn(
            "t-old-card",
            "acct-old",
            day(2023, 12, 1),
            -4_500,
            Some("pay-grocer"),
            Some("cat-food"),
        ),
    ];

    let march = BudgetMonth {
        month: "2024-03".to_string(),
        to_budget: 20_000,
        total_budgeted: -160_000,
        total_spent: -150_974,
        total_balance: 9_026,
        category_groups: vec![
            BudgetMonthGroup {
                id: "grp-bills".to_string(),
                name: "Bills".to_string(),
                is_income: false,
                hidden: false,
                categories: vec![
                    month_category("cat-rent", "Rent", 120_000, -120_000),
                    month_category("cat-utilities", "Utilities", 10_000, -6_425),
                ],
            },
            BudgetMonthGroup {
                id: "grp-everyday".to_string(),
                name: "Everyday".to_string(),
                is_income: false,
                hidden: false,
                categories: vec![
                    month_category("cat-food", "Food", 25_000, -14_550),
                    month_category("cat-fun", "Fun", 5_000, -4_000),
                    month_category("cat-hobby", "Old Hobby", 0, 0),
                ],
            },
        ],
    };

    let mut months = HashMap::new();
    months.insert(march.month.clone(), march);

    FakeData {
        accounts,
        category_groups,
        payees,
        transactions,
        months,
    }
}
