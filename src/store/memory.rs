//! Process-local stores. Each collection sits behind its own `RwLock`, giving a
//! single writer per collection; readers always see whole writes.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ItemStore, MemberStore};
use crate::errors::StoreError;
use crate::models::{ExpenseItem, Member, Summary};

#[derive(Debug, Default)]
pub struct MemoryMemberStore {
    members: RwLock<Vec<Member>>,
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn list(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.members.read().await.clone())
    }

    async fn insert(&self, member: Member) -> Result<Member, StoreError> {
        self.members.write().await.push(member.clone());
        Ok(member)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut members = self.members.write().await;
        let before = members.len();
        members.retain(|member| member.id != id);
        Ok(members.len() != before)
    }
}

/// Entries are kept in insertion order and reversed on read.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<ExpenseItem>>,
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<ExpenseItem>, StoreError> {
        Ok(self.items.read().await.iter().rev().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ExpenseItem>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn insert(&self, item: ExpenseItem) -> Result<ExpenseItem, StoreError> {
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        Ok(items.len() != before)
    }

    async fn summary(&self) -> Result<Summary, StoreError> {
        let items = self.items.read().await;
        Summary::from_items(items.iter()).map_err(|err| StoreError::Corrupt(err.to_string()))
    }
}
