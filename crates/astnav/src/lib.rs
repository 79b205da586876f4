pub mod ast;
pub mod cache;
pub mod config;
pub mod highlight;
pub mod rpc;
pub mod session;
pub mod text_pos;
pub mod usage;
pub mod vfs;

pub use ast::{AstNode, resolve_path, resolve_path_at};
pub use cache::{RevisionSource, VersionedCache};
pub use config::{HighlightingSettings, SessionSettings};
pub use highlight::{DisabledBlock, HighlightStyle, ReconcileResult, Token, reconcile};
pub use rpc::{RequestCorrelator, RequestId, Transport, TransportError};
pub use session::{AnalysisSession, DocumentId, DocumentRevisions};
pub use usage::{UsageTags, classify_usage, has_const_type};
pub use vfs::FileId;
