//! Collection handles that consult the access checker before every store call.

use tracing::{debug, warn};

use crate::access::{AccessChecker, Operation};
use crate::error::{AppError, AppResult};
use crate::storage::{DocStore, Document, Filter};

/// A collection opened on behalf of one user.
pub struct GuardedCollection<'a> {
    store: &'a DocStore,
    checker: &'a AccessChecker,
    username: &'a str,
    collection: &'a str,
}

impl<'a> GuardedCollection<'a> {
    pub fn new(store: &'a DocStore, checker: &'a AccessChecker, username: &'a str, collection: &'a str) -> Self {
        Self { store, checker, username, collection }
    }

    pub fn name(&self) -> &str { self.collection }
    pub fn username(&self) -> &str { self.username }

    /// `Ok` if the bound user may perform `op` on this collection, otherwise
    /// an `access_denied` error. The store is not touched either way.
    pub fn require(&self, op: Operation) -> AppResult<()> {
        let d = self.checker.check_access(self.username, self.collection, op);
        if d.has_access {
            debug!(target: "partshop::guard", "allow user='{}' op={} coll='{}'", self.username, op, self.collection);
            return Ok(());
        }
        warn!(target: "partshop::guard", "deny user='{}' op={} coll='{}' reason={}", self.username, op, self.collection, d.reason.code());
        Err(AppError::auth(
            "access_denied",
            format!("{} may not {} {}: {}", self.username, op, self.collection, d.reason),
        ))
    }

    pub fn find(&self, filter: &Filter) -> AppResult<Vec<Document>> {
        self.require(Operation::Read)?;
        Ok(self.store.find(self.collection, filter))
    }

    pub fn find_one(&self, filter: &Filter) -> AppResult<Option<Document>> {
        self.require(Operation::Read)?;
        Ok(self.store.find_one(self.collection, filter))
    }

    pub fn find_where<F: Fn(&Document) -> bool>(&self, pred: F) -> AppResult<Vec<Document>> {
        self.require(Operation::Read)?;
        Ok(self.store.find_where(self.collection, pred))
    }

    pub fn count(&self, filter: &Filter) -> AppResult<usize> {
        self.require(Operation::Read)?;
        Ok(self.store.count(self.collection, filter))
    }

    pub fn insert_one(&self, doc: Document) -> AppResult<String> {
        self.require(Operation::Write)?;
        self.store.insert_one(self.collection, doc)
    }

    pub fn insert_many(&self, docs: Vec<Document>) -> AppResult<usize> {
        self.require(Operation::Write)?;
        self.store.insert_many(self.collection, docs)
    }

    pub fn update_one(&self, filter: &Filter, set: Document) -> AppResult<usize> {
        self.require(Operation::Write)?;
        self.store.update_one(self.collection, filter, set)
    }

    pub fn delete_one(&self, filter: &Filter) -> AppResult<usize> {
        self.require(Operation::Delete)?;
        Ok(self.store.delete_one(self.collection, filter))
    }

    pub fn delete_many(&self, filter: &Filter) -> AppResult<usize> {
        self.require(Operation::Delete)?;
        Ok(self.store.delete_many(self.collection, filter))
    }
}
