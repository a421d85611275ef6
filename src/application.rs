// アプリケーション層
// ユースケースを実装し、ドメイン層とアダプター層を仲介する

pub mod context;
pub mod error;
pub mod service;

pub use context::RequestContext;
pub use error::ApplicationError;
