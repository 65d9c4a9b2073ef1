//! 翻訳データプロバイダー
//!
//! リソース（形式はプロバイダーごとに異なる）からキー一覧とキー→文字列の
//! マッピングを取り出す。認識できない型のリソースに対しては空の結果を返す。

/// 汎用リソースディクショナリ用プロバイダー
mod dictionary;
/// リソースファイル用プロバイダー
mod resource_file;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

pub use dictionary::{
    ResourceDictionary,
    ResourceDictionaryProvider,
    flatten_json,
};
pub use resource_file::{
    ResourceEntry,
    ResourceFileProvider,
    ResourceReader,
};
use thiserror::Error;

/// プロバイダーに渡す不透明なリソース
pub type Resource = Box<dyn Any + Send>;

/// プロバイダーが読み込みに失敗したときのエラー
#[derive(Error, Debug)]
pub enum ProviderError {
    /// リソースの読み込みに失敗
    #[error("Failed to read resource: {0}")]
    Io(#[from] std::io::Error),

    /// リソースの内容を解析できない
    #[error("Failed to parse resource: {0}")]
    Parse(#[from] serde_json::Error),

    /// 閉じられたリーダーを列挙しようとした
    #[error("Resource reader has been closed")]
    ReaderClosed,

    /// キー一覧にあるキーの値が読み込み結果に含まれない
    #[error("No value for key '{0}'")]
    MissingValue(String),

    /// その他のプロバイダー固有エラー
    #[error("{0}")]
    Other(String),
}

/// リソースから翻訳データを組み立てる
///
/// 実装は次を満たすこと：任意の有効なリソース `r` について
/// `get_keys(r)` と `read_translation_data(r)` のキー集合が一致する。
pub trait TranslationDataProvider: fmt::Debug + Send + Sync {
    /// ログ用のプロバイダー名
    fn name(&self) -> &'static str;

    /// リソースに含まれるキーを順序付きで返す
    ///
    /// # Errors
    /// リソースの列挙に失敗した場合
    fn get_keys(&self, resource: &dyn Any) -> Result<Vec<String>, ProviderError>;

    /// リソースを読み込み、キー→翻訳文字列のマッピングを返す
    ///
    /// # Errors
    /// リソースの列挙に失敗した場合
    fn read_translation_data(
        &self,
        resource: &dyn Any,
    ) -> Result<HashMap<String, String>, ProviderError>;
}
