// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The operation catalog: what a request can actually do.
//!
//! Handlers sit below the invocation semantics and above the file store.
//! Each one pulls its typed parameters, touches the store, and reports
//! content mutations to the subscription registry so registered clients
//! hear about them.

use std::net::SocketAddr;
use std::sync::Arc;

use rfs_core::Clock;
use rfs_wire::{OperationKind, Request, Value};

use crate::error::ServiceError;
use crate::registry::{CallbackSink, Registry};
use crate::store::FileStore;

/// The operation handlers bound to one served root.
pub struct Operations<S, C> {
    store: FileStore,
    registry: Arc<Registry<S, C>>,
    clock: C,
}

impl<S: CallbackSink, C: Clock> Operations<S, C> {
    pub fn new(store: FileStore, registry: Arc<Registry<S, C>>, clock: C) -> Self {
        Self { store, registry, clock }
    }

    /// Run one request. Parameters have already been type-checked against
    /// the catalog by the servicer above.
    pub async fn dispatch(
        &self,
        request: &Request,
        client: SocketAddr,
    ) -> Result<Vec<Value>, ServiceError> {
        match request.kind() {
            OperationKind::Empty => Ok(Vec::new()),
            OperationKind::Read => self.read(request),
            OperationKind::Insert => self.insert(request).await,
            OperationKind::GetAttr => self.get_attr(request),
            OperationKind::ListDir => self.list_dir(request),
            OperationKind::Touch => self.touch(request),
            OperationKind::Register => self.register(request, client),
            OperationKind::Append => self.append(request).await,
            OperationKind::FileUpdated => {
                Err(ServiceError::bad_request("FILE_UPDATED is a callback, not a request"))
            }
        }
    }

    fn read(&self, request: &Request) -> Result<Vec<Value>, ServiceError> {
        let path = request.text_param(0)?;
        let content = self.store.read(path)?;
        Ok(vec![Value::Bytes(content)])
    }

    async fn insert(&self, request: &Request) -> Result<Vec<Value>, ServiceError> {
        let offset = request.i32_param(0)?;
        let path = request.text_param(1)?;
        let data = request.bytes_param(2)?;
        let key = self.store.relative(path)?;
        let mutation = self.store.splice(path, offset, data)?;
        self.registry.notify(&key, mutation.mtime_ms, &mutation.content).await;
        Ok(Vec::new())
    }

    async fn append(&self, request: &Request) -> Result<Vec<Value>, ServiceError> {
        let path = request.text_param(0)?;
        let data = request.bytes_param(1)?;
        let key = self.store.relative(path)?;
        let mutation = self.store.append(path, data)?;
        self.registry.notify(&key, mutation.mtime_ms, &mutation.content).await;
        Ok(Vec::new())
    }

    fn get_attr(&self, request: &Request) -> Result<Vec<Value>, ServiceError> {
        let path = request.text_param(0)?;
        let (mtime_ms, atime_ms) = self.store.attrs(path)?;
        Ok(vec![Value::Int64(mtime_ms), Value::Int64(atime_ms)])
    }

    fn list_dir(&self, request: &Request) -> Result<Vec<Value>, ServiceError> {
        let path = request.text_param(0)?;
        let names = self.store.list(path)?;
        Ok(names.into_iter().map(Value::Text).collect())
    }

    fn touch(&self, request: &Request) -> Result<Vec<Value>, ServiceError> {
        let path = request.text_param(0)?;
        let at = self.store.touch(path, self.clock.epoch_ms())?;
        Ok(vec![Value::Int64(at)])
    }

    fn register(&self, request: &Request, client: SocketAddr) -> Result<Vec<Value>, ServiceError> {
        let interval_ms = request.i32_param(0)?;
        let path = request.text_param(1)?;
        let key = self.store.expect_file(path)?;
        self.registry.register(&key, client, interval_ms)?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
