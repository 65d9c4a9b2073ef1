//! 翻訳カタログのエラー定義

use thiserror::Error;

use crate::provider::ProviderError;

/// 翻訳セット・カタログ操作で発生するエラー
#[derive(Error, Debug)]
pub enum TranslationError {
    /// 必須の入力（プロバイダー、カルチャコードなど）が指定されていない
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 必要な設定の前に操作が呼ばれた
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// カルチャが既に登録済み
    #[error("Duplicate key. Culture: {culture}")]
    DuplicateKey { culture: String },

    /// キーコントラクトとキー集合が一致しない
    #[error("Resource does not match key contract: {0}")]
    SchemaMismatch(SchemaMismatch),

    /// プロバイダーによる読み込みに失敗した
    #[error("Failed to initialize translation: {source}")]
    InitializationFailed {
        #[source]
        source: ProviderError,
    },

    /// 未知のキーまたはカルチャ
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// 解放済みオブジェクトへの操作
    #[error("Cannot access a released object. Operation: {operation}")]
    ObjectDisposed { operation: &'static str },
}

impl TranslationError {
    pub(crate) const fn disposed(operation: &'static str) -> Self {
        Self::ObjectDisposed { operation }
    }
}

impl From<ProviderError> for TranslationError {
    fn from(source: ProviderError) -> Self {
        Self::InitializationFailed { source }
    }
}

/// キーコントラクト違反の内訳
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaMismatch {
    #[error("key count mismatch (expected {expected}, found {actual})")]
    CountMismatch { expected: usize, actual: usize },

    #[error("missing keys: {}", .keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    #[error("extra keys: {}", .keys.join(", "))]
    ExtraKeys { keys: Vec<String> },
}
