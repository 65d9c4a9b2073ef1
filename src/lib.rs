//! live-translations
//!
//! 実行中に切り替え可能な翻訳カタログ。カルチャごとの翻訳セットを
//! キーコントラクトで検証して登録し、選択中のカルチャを通知付きで切り替える。

pub mod catalog;
pub mod config;
pub mod error;
pub mod locale;
pub mod provider;
pub mod translation;
pub mod workspace;

mod test_utils;

pub use catalog::{
    BulkReport,
    CultureChanged,
    KeyPolicy,
    TranslationCatalog,
};
pub use error::{
    SchemaMismatch,
    TranslationError,
};
pub use provider::{
    ProviderError,
    Resource,
    TranslationDataProvider,
};
pub use translation::{
    ListenerId,
    PropertyChanged,
    TranslationSet,
};
pub use workspace::{
    LocaleDictionaries,
    LocaleFileFailure,
    WorkspaceError,
    WorkspaceLoader,
};
