//! テスト用ユーティリティ
//!
//! 複数のテストモジュールで使用される共通のヘルパーを提供します。
#![cfg(test)]

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use crate::provider::{
    ProviderError,
    ResourceDictionary,
    ResourceDictionaryProvider,
    TranslationDataProvider,
};

/// テスト用の `ResourceDictionary` を作成する
pub(crate) fn dictionary(pairs: &[(&str, &str)]) -> ResourceDictionary {
    pairs.iter().map(|(key, value)| (*key, *value)).collect()
}

/// 常に失敗するプロバイダー
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FailingProvider;

impl TranslationDataProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn get_keys(&self, _resource: &dyn Any) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::Other("resource is corrupt".into()))
    }

    fn read_translation_data(
        &self,
        _resource: &dyn Any,
    ) -> Result<HashMap<String, String>, ProviderError> {
        Err(ProviderError::Other("resource is corrupt".into()))
    }
}

/// 破棄されたときにフラグを立てるリソース
#[derive(Debug)]
pub(crate) struct DropFlag {
    /// 破棄フラグ
    flag: Arc<AtomicBool>,
    /// 実際のリソース
    inner: ResourceDictionary,
}

impl DropFlag {
    pub(crate) fn new(flag: &Arc<AtomicBool>, inner: ResourceDictionary) -> Self {
        Self { flag: Arc::clone(flag), inner }
    }
}

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// `DropFlag` を中身のディクショナリとして読むプロバイダー
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DropFlagProvider;

impl TranslationDataProvider for DropFlagProvider {
    fn name(&self) -> &'static str {
        "drop-flag"
    }

    fn get_keys(&self, resource: &dyn Any) -> Result<Vec<String>, ProviderError> {
        match resource.downcast_ref::<DropFlag>() {
            Some(tracked) => ResourceDictionaryProvider.get_keys(&tracked.inner),
            None => ResourceDictionaryProvider.get_keys(resource),
        }
    }

    fn read_translation_data(
        &self,
        resource: &dyn Any,
    ) -> Result<HashMap<String, String>, ProviderError> {
        match resource.downcast_ref::<DropFlag>() {
            Some(tracked) => ResourceDictionaryProvider.read_translation_data(&tracked.inner),
            None => ResourceDictionaryProvider.read_translation_data(resource),
        }
    }
}
