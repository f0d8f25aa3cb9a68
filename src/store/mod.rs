//! Storage ports for the member registry and the expense ledger.
//!
//! Handlers only see the [`MemberStore`] and [`ItemStore`] traits. Two adapters
//! exist: [`memory`] for a process-local store and [`postgres`] for the durable
//! one. Both serialize mutations so a reader never observes a half-applied
//! write, and both leave state untouched when a call fails.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::StoreError;
use crate::models::{ExpenseItem, Member, Summary};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// All members, oldest first.
    async fn list(&self) -> Result<Vec<Member>, StoreError>;

    async fn insert(&self, member: Member) -> Result<Member, StoreError>;

    /// Returns `false` when no member had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All ledger entries, newest first.
    async fn list(&self) -> Result<Vec<ExpenseItem>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<ExpenseItem>, StoreError>;

    async fn insert(&self, item: ExpenseItem) -> Result<ExpenseItem, StoreError>;

    /// Returns `false` when no entry had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Totals over one consistent view of the ledger.
    async fn summary(&self) -> Result<Summary, StoreError>;
}

/// The two independent collections behind the API.
#[derive(Clone)]
pub struct Stores {
    pub members: Arc<dyn MemberStore>,
    pub items: Arc<dyn ItemStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Stores {
            members: Arc::new(memory::MemoryMemberStore::default()),
            items: Arc::new(memory::MemoryItemStore::default()),
        }
    }

    /// `write_timeout` bounds each write up to, not including, its commit.
    pub fn postgres(pool: Database, write_timeout: Duration) -> Self {
        Stores {
            members: Arc::new(postgres::PgMemberStore::new(pool.clone(), write_timeout)),
            items: Arc::new(postgres::PgItemStore::new(pool, write_timeout)),
        }
    }
}
