//! Scripted transport used by the cache and controller tests

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use txfeed_data::{DataError, Employee, Transaction, TransactionsPage};

use crate::source::{SourceError, SourceResult, TransactionSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Employees,
    Page(Option<String>),
    EmployeeTransactions(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Employees,
    Page,
    EmployeeTransactions,
}

impl Call {
    fn kind(&self) -> Kind {
        match self {
            Call::Employees => Kind::Employees,
            Call::Page(_) => Kind::Page,
            Call::EmployeeTransactions(_) => Kind::EmployeeTransactions,
        }
    }
}

pub fn employee(id: &str) -> Employee {
    Employee::new(id, format!("First-{}", id), format!("Last-{}", id))
}

pub fn transaction(n: usize, owner: &str) -> Transaction {
    Transaction {
        id: format!("t{}", n),
        amount: Decimal::new(100 * n as i64 + 1, 2),
        employee: employee(owner),
        merchant: format!("Merchant {}", n),
        date: NaiveDate::from_ymd_opt(2024, 1, 1 + (n % 28) as u32).unwrap(),
        approved: n % 2 == 0,
    }
}

/// Consecutive pages with the given sizes; tokens are "1", "2", ... and
/// the last page has no next token
pub fn pages(sizes: &[usize], owner: &str) -> Vec<TransactionsPage> {
    let mut next_id = 0;
    sizes
        .iter()
        .enumerate()
        .map(|(index, size)| {
            let data = (next_id..next_id + size).map(|n| transaction(n, owner)).collect();
            next_id += size;
            TransactionsPage {
                data,
                next_page: (index + 1 < sizes.len()).then(|| (index + 1).to_string()),
            }
        })
        .collect()
}

#[derive(Default)]
pub struct ScriptedSource {
    employees: Vec<Employee>,
    pages: Vec<TransactionsPage>,
    by_employee: HashMap<String, Vec<Transaction>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Kind>>,
    held: Mutex<HashSet<Kind>>,
    release: Notify,
    delay: AtomicBool,
}

impl ScriptedSource {
    pub fn new(
        employees: Vec<Employee>,
        pages: Vec<TransactionsPage>,
        by_employee: Vec<(&str, Vec<Transaction>)>,
    ) -> Arc<Self> {
        Arc::new(Self {
            employees,
            pages,
            by_employee: by_employee
                .into_iter()
                .map(|(id, list)| (id.to_string(), list))
                .collect(),
            ..Default::default()
        })
    }

    pub fn with_employees(ids: &[&str]) -> Arc<Self> {
        Self::new(ids.iter().map(|id| employee(id)).collect(), vec![], vec![])
    }

    pub fn fail(&self, kind: Kind) {
        self.failing.lock().unwrap().insert(kind);
    }

    pub fn recover(&self, kind: Kind) {
        self.failing.lock().unwrap().remove(&kind);
    }

    /// Calls of `kind` wait for [`release`](Self::release) before answering
    pub fn hold(&self, kind: Kind) {
        self.held.lock().unwrap().insert(kind);
    }

    pub fn unhold(&self, kind: Kind) {
        self.held.lock().unwrap().remove(&kind);
    }

    /// Let one held call answer
    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Make every call yield a few times before answering
    pub fn delay_all(&self) {
        self.delay.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    async fn enter(&self, call: Call) -> SourceResult<()> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);

        if self.delay.load(Ordering::SeqCst) {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
        }

        let held = self.held.lock().unwrap().contains(&kind);
        if held {
            self.release.notified().await;
        }

        let failing = self.failing.lock().unwrap().contains(&kind);
        if failing {
            return Err(SourceError::Transport {
                message: format!("scripted failure for {:?}", kind),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionSource for ScriptedSource {
    async fn fetch_employees(&self) -> SourceResult<Vec<Employee>> {
        self.enter(Call::Employees).await?;
        Ok(self.employees.clone())
    }

    async fn fetch_transactions_page(&self, page: Option<&str>) -> SourceResult<TransactionsPage> {
        self.enter(Call::Page(page.map(str::to_string))).await?;
        let index = page.map_or(Some(0), |token| token.parse::<usize>().ok());
        index
            .and_then(|i| self.pages.get(i).cloned())
            .ok_or_else(|| {
                SourceError::Data(DataError::PageNotFound {
                    token: page.unwrap_or("").to_string(),
                })
            })
    }

    async fn fetch_transactions_for_employee(&self, employee_id: &str) -> SourceResult<Vec<Transaction>> {
        self.enter(Call::EmployeeTransactions(employee_id.to_string())).await?;
        self.by_employee.get(employee_id).cloned().ok_or_else(|| {
            SourceError::Data(DataError::EmployeeNotFound {
                id: employee_id.to_string(),
            })
        })
    }
}
