//! The client session: explicit owner of all mutable client state.
//!
//! Both versioned caches, the request correlator, the revision providers
//! and the settings live here, constructed at session start and passed by
//! handle to whatever needs them. Completion handlers re-check the document
//! revision before caching or delivering a tree; a lost race degrades to
//! "discard and let the next triggered refresh fix it", never to stale data
//! in a cache.

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use dashmap::DashMap;
use lsp_types::Range;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::ast::AstNode;
use crate::cache::{RevisionSource, VersionedCache};
use crate::config::SessionSettings;
use crate::rpc::{RequestCorrelator, RequestId, Transport};
use crate::vfs::{FileId, FileRevisions};

/// Identity of a document open in the editor. Not interchangeable with a
/// file path: a document can exist before it is saved anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edit counters for open documents, bumped by the editor integration on
/// every change. Doubles as the revision source validating the document
/// AST cache.
#[derive(Debug, Default)]
pub struct DocumentRevisions {
    revisions: DashMap<DocumentId, u64>,
}

impl DocumentRevisions {
    pub fn set(
        &self,
        doc: DocumentId,
        revision: u64,
    ) {
        self.revisions.insert(doc, revision);
    }

    pub fn bump(
        &self,
        doc: &DocumentId,
    ) -> u64 {
        let mut entry = self.revisions.entry(doc.clone()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn remove(
        &self,
        doc: &DocumentId,
    ) {
        self.revisions.remove(doc);
    }
}

impl RevisionSource<DocumentId, u64> for DocumentRevisions {
    fn current_revision(
        &self,
        key: &DocumentId,
    ) -> Option<u64> {
        self.revisions.get(key).map(|r| *r)
    }
}

/// The result channel for an AST fetch. `None` means cancelled, stale, or
/// undeliverable; absence of a tree is a normal outcome, not a fault.
pub type AstReceiver = oneshot::Receiver<Option<Arc<AstNode>>>;

struct PendingAstFetch {
    /// Filled in once the transport accepted the request.
    request_id: Option<RequestId>,
    revision: u64,
    waiters: Vec<oneshot::Sender<Option<Arc<AstNode>>>>,
}

pub struct AnalysisSession {
    correlator: Arc<RequestCorrelator>,
    document_revisions: Arc<DocumentRevisions>,
    file_revisions: Arc<FileRevisions>,
    document_asts: Arc<VersionedCache<DocumentId, u64, Arc<AstNode>>>,
    file_asts: Arc<VersionedCache<FileId, SystemTime, Arc<AstNode>>>,
    /// At most one full-document fetch per document is in flight; later
    /// callers queue behind it as waiters.
    pending_document_fetches: Arc<DashMap<DocumentId, PendingAstFetch>>,
    settings: Arc<RwLock<SessionSettings>>,
}

impl AnalysisSession {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            correlator: Arc::new(RequestCorrelator::new(transport)),
            document_revisions: Arc::new(DocumentRevisions::default()),
            file_revisions: Arc::new(FileRevisions),
            document_asts: Arc::new(VersionedCache::new()),
            file_asts: Arc::new(VersionedCache::new()),
            pending_document_fetches: Arc::new(DashMap::new()),
            settings: Arc::new(RwLock::new(SessionSettings::default())),
        }
    }

    pub fn apply_settings(
        &self,
        settings: SessionSettings,
    ) {
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = settings;
    }

    pub fn settings_snapshot(&self) -> SessionSettings {
        self.settings.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn document_revisions(&self) -> &DocumentRevisions {
        &self.document_revisions
    }

    /// Route a response from the transport reader to its waiting caller.
    pub fn complete_response(
        &self,
        id: RequestId,
        response: Value,
    ) {
        self.correlator.complete(id, response);
    }

    /// Register a document and, when it corresponds to a previously queried
    /// file on disk, promote that file's cached AST into the document cache.
    pub fn open_document(
        &self,
        doc: DocumentId,
        path: Option<&Path>,
        revision: u64,
    ) {
        self.document_revisions.set(doc.clone(), revision);
        if let Some(path) = path {
            let key = FileId::from_path(path);
            if let Some((ast, _)) = self.file_asts.take(&key, &*self.file_revisions) {
                debug!("promoting cached AST for {key} into document {doc}");
                self.document_asts.put(doc, revision, ast);
            }
        }
    }

    /// Bump the edit counter. Cached and in-flight ASTs for the old
    /// revision are invalidated lazily, at lookup or completion time.
    pub fn document_changed(
        &self,
        doc: &DocumentId,
    ) -> u64 {
        self.document_revisions.bump(doc)
    }

    pub fn close_document(
        &self,
        doc: &DocumentId,
    ) {
        self.cancel_document_fetch(doc);
        self.document_asts.remove(doc);
        self.document_revisions.remove(doc);
    }

    /// The full-document AST, from cache when the revision still matches,
    /// otherwise via a fetch. If a fetch is already pending the caller
    /// queues behind it instead of issuing a second one.
    pub fn ast_for_document(
        &self,
        doc: &DocumentId,
    ) -> AstReceiver {
        let (tx, rx) = oneshot::channel();

        if let Some(ast) = self.document_asts.get(doc, &*self.document_revisions) {
            let _ = tx.send(Some(ast));
            return rx;
        }
        if let Some(mut pending) = self.pending_document_fetches.get_mut(doc) {
            pending.waiters.push(tx);
            return rx;
        }
        let Some(revision) = self.document_revisions.current_revision(doc) else {
            let _ = tx.send(None);
            return rx;
        };

        self.pending_document_fetches.insert(
            doc.clone(),
            PendingAstFetch {
                request_id: None,
                revision,
                waiters: vec![tx],
            },
        );

        let params = json!({ "textDocument": { "uri": doc.as_str() } });
        let continuation = self.document_fetch_continuation(doc.clone(), revision);
        match self.correlator.send("textDocument/ast", params, continuation) {
            Ok(id) => {
                if let Some(mut pending) = self.pending_document_fetches.get_mut(doc) {
                    pending.request_id = Some(id);
                }
            },
            Err(err) => {
                warn!("AST fetch for {doc} failed to send: {err}");
                if let Some((_, pending)) = self.pending_document_fetches.remove(doc) {
                    for waiter in pending.waiters {
                        let _ = waiter.send(None);
                    }
                }
            },
        }

        rx
    }

    fn document_fetch_continuation(
        &self,
        doc: DocumentId,
        revision: u64,
    ) -> impl FnOnce(Value) + Send + 'static {
        let document_asts = Arc::clone(&self.document_asts);
        let document_revisions = Arc::clone(&self.document_revisions);
        let pending_fetches = Arc::clone(&self.pending_document_fetches);

        move |response: Value| {
            let ast = parse_ast(response);
            let waiters = pending_fetches
                .remove(&doc)
                .map(|(_, pending)| pending.waiters)
                .unwrap_or_default();

            let result = match ast {
                Some(tree) if document_revisions.current_revision(&doc) == Some(revision) => {
                    document_asts.put(doc.clone(), revision, Arc::clone(&tree));
                    Some(tree)
                },
                Some(_) => {
                    debug!("discarding stale AST for {doc}: document changed while fetching");
                    None
                },
                None => None,
            };

            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }
        }
    }

    /// Cancel the pending full-document fetch, if any. Waiters see `None`
    /// synchronously; the remote side is told on a best-effort basis and a
    /// late response is dropped by the correlator.
    pub fn cancel_document_fetch(
        &self,
        doc: &DocumentId,
    ) {
        let Some((_, pending)) = self.pending_document_fetches.remove(doc) else {
            return;
        };
        if let Some(id) = pending.request_id {
            self.correlator.cancel(id);
        }
        for waiter in pending.waiters {
            let _ = waiter.send(None);
        }
    }

    /// Range-scoped AST fetch for a selection or cursor. Exempt from the
    /// single-pending-fetch rule and never cached.
    pub fn ast_in_range(
        &self,
        doc: &DocumentId,
        range: Range,
    ) -> AstReceiver {
        let (tx, rx) = oneshot::channel();
        let params = json!({
            "textDocument": { "uri": doc.as_str() },
            "range": range,
        });
        let sent = self.correlator.send("textDocument/ast", params, move |response| {
            let _ = tx.send(parse_ast(response));
        });
        if let Err(err) = sent {
            warn!("range AST fetch for {doc} failed to send: {err}");
        }
        rx
    }

    /// The AST of a file not open in the editor, cached against its
    /// modification time.
    pub fn ast_for_file(
        &self,
        path: &Path,
    ) -> AstReceiver {
        let (tx, rx) = oneshot::channel();
        let key = FileId::from_path(path);

        if let Some(ast) = self.file_asts.get(&key, &*self.file_revisions) {
            let _ = tx.send(Some(ast));
            return rx;
        }
        let Some(mtime) = self.file_revisions.current_revision(&key) else {
            let _ = tx.send(None);
            return rx;
        };

        let params = json!({ "textDocument": { "uri": format!("file://{key}") } });
        let file_asts = Arc::clone(&self.file_asts);
        let file_revisions = Arc::clone(&self.file_revisions);
        let settings = Arc::clone(&self.settings);
        let sent = self.correlator.send("textDocument/ast", params, move |response| {
            let result = match parse_ast(response) {
                Some(tree) if file_revisions.current_revision(&key) == Some(mtime) => {
                    file_asts.put(key, mtime, Arc::clone(&tree));
                    let max = settings
                        .read()
                        .unwrap_or_else(|e| e.into_inner())
                        .cache
                        .max_external_file_entries;
                    file_asts.trim_to(max);
                    Some(tree)
                },
                Some(_) => {
                    debug!("discarding stale AST for {key}: file changed while fetching");
                    None
                },
                None => None,
            };
            let _ = tx.send(result);
        });
        if let Err(err) = sent {
            warn!("file AST fetch failed to send: {err}");
        }
        rx
    }

    pub fn has_pending_document_fetch(
        &self,
        doc: &DocumentId,
    ) -> bool {
        self.pending_document_fetches.contains_key(doc)
    }

    pub fn pending_request_count(&self) -> usize {
        self.correlator.pending_count()
    }
}

/// A response that fails to deserialize into a structurally valid tree is
/// treated as "no AST", never as an error.
fn parse_ast(response: Value) -> Option<Arc<AstNode>> {
    serde_json::from_value::<AstNode>(response)
        .ok()
        .filter(AstNode::is_valid)
        .map(Arc::new)
}

#[cfg(test)]
#[path = "../tests/src/session_tests.rs"]
mod tests;
