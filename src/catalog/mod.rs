//! 翻訳カタログ
//!
//! キーコントラクト、データプロバイダー、カルチャ → 翻訳セットの登録簿、
//! 現在選択中のカルチャを保持する。実行中のカルチャ切り替えはここで行う。

/// キーコントラクト検証
mod contract;

use std::fmt;
use std::sync::Arc;

pub use contract::{
    KeyPolicy,
    check_key_contract,
};

use crate::error::TranslationError;
use crate::provider::{
    Resource,
    TranslationDataProvider,
};
use crate::translation::{
    ListenerId,
    TranslationSet,
};

/// カルチャ切り替えの通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultureChanged {
    /// 切り替え前のカルチャ
    pub previous: Option<String>,
    /// 切り替え後のカルチャ
    pub current: String,
}

/// 一括登録の結果
#[derive(Debug, Default)]
pub struct BulkReport {
    /// 登録に成功したカルチャ（登録順）
    pub added: Vec<String>,
    /// 登録に失敗したカルチャとその理由
    pub failed: Vec<(String, TranslationError)>,
}

impl BulkReport {
    /// すべて成功したか
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// カルチャ切り替えの購読者
type CultureListener = Box<dyn FnMut(&CultureChanged) + Send>;

/// 解放前のカタログの状態
#[derive(Default)]
struct CatalogState {
    /// スキーマの基準となる翻訳セット
    key_contract: Option<TranslationSet>,
    /// 全登録で共有するプロバイダー
    data_provider: Option<Arc<dyn TranslationDataProvider>>,
    /// カルチャ → 翻訳セット（登録順）
    translations: Vec<(String, TranslationSet)>,
    /// 現在選択中のカルチャ
    current: Option<String>,
    /// キーコントラクトとの比較方法
    key_policy: KeyPolicy,
    /// カルチャ切り替えの購読者
    listeners: Vec<(ListenerId, CultureListener)>,
    /// 次に払い出す購読者 ID
    next_listener_id: u64,
}

impl CatalogState {
    fn position(&self, culture: &str) -> Option<usize> {
        self.translations.iter().position(|(code, _)| code == culture)
    }

    fn find(&self, culture: &str) -> Option<&TranslationSet> {
        self.translations.iter().find(|(code, _)| code == culture).map(|(_, set)| set)
    }

    fn find_mut(&mut self, culture: &str) -> Option<&mut TranslationSet> {
        self.translations.iter_mut().find(|(code, _)| code == culture).map(|(_, set)| set)
    }

    /// 登録前の共通チェック（コントラクト → 重複 → カルチャコード）
    fn ensure_registrable(&self, culture: &str) -> Result<&TranslationSet, TranslationError> {
        let contract = self.key_contract.as_ref().ok_or_else(|| {
            TranslationError::PreconditionFailed(
                "The key contract must be set before adding any resources".into(),
            )
        })?;

        if self.position(culture).is_some() {
            return Err(TranslationError::DuplicateKey { culture: culture.to_string() });
        }

        if culture.trim().is_empty() {
            return Err(TranslationError::InvalidArgument("culture code is empty".into()));
        }

        Ok(contract)
    }

    fn provider(&self) -> Result<Arc<dyn TranslationDataProvider>, TranslationError> {
        self.data_provider.clone().ok_or_else(|| {
            TranslationError::InvalidArgument("no translation data provider is configured".into())
        })
    }
}

/// 実行中にカルチャを切り替えられる翻訳カタログ
///
/// 作成したすべての翻訳セット（キーコントラクトを含む）を所有し、
/// [`release`](Self::release) でまとめて解放する。
pub struct TranslationCatalog {
    /// `None` は解放済みを表す
    state: Option<CatalogState>,
}

impl fmt::Debug for TranslationCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(state) = &self.state else {
            return f.write_str("TranslationCatalog(released)");
        };
        f.debug_struct("TranslationCatalog")
            .field("key_contract", &state.key_contract)
            .field("data_provider", &state.data_provider)
            .field("cultures", &state.translations.iter().map(|(c, _)| c).collect::<Vec<_>>())
            .field("current", &state.current)
            .field("key_policy", &state.key_policy)
            .finish_non_exhaustive()
    }
}

impl Default for TranslationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationCatalog {
    /// 空のカタログを作成
    #[must_use]
    pub fn new() -> Self {
        Self { state: Some(CatalogState::default()) }
    }

    /// プロバイダーを設定済みのカタログを作成
    #[must_use]
    pub fn with_provider(provider: impl TranslationDataProvider + 'static) -> Self {
        let mut catalog = Self::new();
        if let Some(state) = catalog.state.as_mut() {
            state.data_provider = Some(Arc::new(provider));
        }
        catalog
    }

    fn state(&self, operation: &'static str) -> Result<&CatalogState, TranslationError> {
        self.state.as_ref().ok_or(TranslationError::disposed(operation))
    }

    fn state_mut(&mut self, operation: &'static str) -> Result<&mut CatalogState, TranslationError> {
        self.state.as_mut().ok_or(TranslationError::disposed(operation))
    }

    /// キーコントラクトを設定する
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn set_key_contract(&mut self, contract: TranslationSet) -> Result<(), TranslationError> {
        let state = self.state_mut("set_key_contract")?;
        if let Some(mut previous) = state.key_contract.replace(contract) {
            previous.release();
        }
        Ok(())
    }

    /// 設定済みのプロバイダーでリソースを読み込み、キーコントラクトにする
    ///
    /// # Errors
    /// - プロバイダー未設定: `InvalidArgument`
    /// - 読み込み失敗: `InitializationFailed`
    /// - 解放済み: `ObjectDisposed`
    pub fn set_key_contract_from(&mut self, resource: Resource) -> Result<(), TranslationError> {
        let provider = self.state("set_key_contract_from")?.provider()?;
        let contract = TranslationSet::new(resource, provider.as_ref())?;
        let keys = contract.count()?;
        tracing::debug!(keys, provider = provider.name(), "Key contract loaded");
        self.set_key_contract(contract)
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn key_contract(&self) -> Result<Option<&TranslationSet>, TranslationError> {
        Ok(self.state("key_contract")?.key_contract.as_ref())
    }

    /// データプロバイダーを設定する
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn set_data_provider(
        &mut self,
        provider: impl TranslationDataProvider + 'static,
    ) -> Result<(), TranslationError> {
        self.state_mut("set_data_provider")?.data_provider = Some(Arc::new(provider));
        Ok(())
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn key_policy(&self) -> Result<KeyPolicy, TranslationError> {
        Ok(self.state("key_policy")?.key_policy)
    }

    /// 以降の登録に適用するキーポリシーを設定する
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn set_key_policy(&mut self, policy: KeyPolicy) -> Result<(), TranslationError> {
        self.state_mut("set_key_policy")?.key_policy = policy;
        Ok(())
    }

    /// リソースを検証してカルチャとして登録する
    ///
    /// 失敗した場合、登録簿は変更されない。
    ///
    /// # Errors
    /// - キーコントラクト未設定: `PreconditionFailed`
    /// - カルチャ登録済み: `DuplicateKey`
    /// - カルチャコードが空、プロバイダー未設定: `InvalidArgument`
    /// - 読み込み失敗: `InitializationFailed`
    /// - キー集合の不一致: `SchemaMismatch`
    /// - 解放済み: `ObjectDisposed`
    pub fn try_add(&mut self, culture: &str, resource: Resource) -> Result<(), TranslationError> {
        let state = self.state_mut("add")?;
        let contract = state.ensure_registrable(culture)?;
        let provider = state.provider()?;

        let translation = TranslationSet::new(resource, provider.as_ref())?;

        // 構築済みのセットではなく、リソースから直接キーを取り直して比較する
        let discovered = provider.get_keys(&**translation.resource()?)?;
        check_key_contract(contract.keys()?, &discovered, translation.count()?, state.key_policy)
            .map_err(TranslationError::SchemaMismatch)?;

        state.translations.push((culture.to_string(), translation));
        tracing::debug!(culture, provider = provider.name(), "Registered translation");
        Ok(())
    }

    /// リソースをカルチャとして登録する
    ///
    /// エラーは伝播せずにログへ出し、`false` を返す。1 つのカルチャの失敗で
    /// 他のカルチャの読み込みを止めないためのもの。
    pub fn add(&mut self, culture: &str, resource: Resource) -> bool {
        match self.try_add(culture, resource) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(culture, %error, "Failed to add resource for translation");
                false
            }
        }
    }

    /// 複数のリソースを順に登録する
    ///
    /// 途中で失敗しても、それまでに登録したカルチャは取り消さない。
    pub fn add_bulk<S, I>(&mut self, entries: I) -> BulkReport
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Resource)>,
    {
        let mut report = BulkReport::default();
        for (culture, resource) in entries {
            let culture = culture.into();
            match self.try_add(&culture, resource) {
                Ok(()) => report.added.push(culture),
                Err(error) => {
                    tracing::warn!(
                        culture = %culture,
                        %error,
                        "Failed to add resource for translation"
                    );
                    report.failed.push((culture, error));
                }
            }
        }
        report
    }

    /// キーコントラクトのコピーをカルチャとして登録する
    ///
    /// コントラクト自体は登録簿とは別に保持され続ける。
    ///
    /// # Errors
    /// - キーコントラクト未設定: `PreconditionFailed`
    /// - カルチャ登録済み: `DuplicateKey`
    /// - カルチャコードが空: `InvalidArgument`
    /// - 解放済み: `ObjectDisposed`
    pub fn register_contract_as(&mut self, culture: &str) -> Result<(), TranslationError> {
        let state = self.state_mut("register_contract_as")?;
        let copy = state.ensure_registrable(culture)?.detached_copy()?;
        state.translations.push((culture.to_string(), copy));
        tracing::debug!(culture, "Registered key contract as translation");
        Ok(())
    }

    /// 登録済みの翻訳と現在の選択を破棄する
    ///
    /// キーコントラクトとプロバイダーは保持する。
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn clear(&mut self) -> Result<(), TranslationError> {
        let state = self.state_mut("clear")?;
        state.current = None;
        state.translations.clear();
        Ok(())
    }

    /// 現在の翻訳セット
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn current(&self) -> Result<Option<&TranslationSet>, TranslationError> {
        let state = self.state("current")?;
        Ok(state.current.as_deref().and_then(|culture| state.find(culture)))
    }

    /// 現在の翻訳セット（値の更新用）
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn current_mut(&mut self) -> Result<Option<&mut TranslationSet>, TranslationError> {
        let state = self.state_mut("current_mut")?;
        let Some(culture) = state.current.clone() else {
            return Ok(None);
        };
        Ok(state.find_mut(&culture))
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn current_culture(&self) -> Result<Option<&str>, TranslationError> {
        Ok(self.state("current_culture")?.current.as_deref())
    }

    /// 現在のカルチャを切り替える
    ///
    /// 選択が変わった場合のみ購読者へ通知する。
    ///
    /// # Errors
    /// - 未登録のカルチャ: `KeyNotFound`（選択は変更しない）
    /// - 解放済み: `ObjectDisposed`
    pub fn set_current(&mut self, culture: &str) -> Result<(), TranslationError> {
        let state = self.state_mut("set_current")?;
        if state.position(culture).is_none() {
            return Err(TranslationError::KeyNotFound(culture.to_string()));
        }

        let previous = state.current.replace(culture.to_string());
        if previous.as_deref() == Some(culture) {
            return Ok(());
        }

        tracing::debug!(from = ?previous, to = culture, "Switched culture");
        let event = CultureChanged { previous, current: culture.to_string() };
        for (_, listener) in &mut state.listeners {
            listener(&event);
        }
        Ok(())
    }

    /// カルチャ切り替えの通知を購読する
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn subscribe<F>(&mut self, listener: F) -> Result<ListenerId, TranslationError>
    where
        F: FnMut(&CultureChanged) + Send + 'static,
    {
        let state = self.state_mut("subscribe")?;
        let id = ListenerId::new(state.next_listener_id);
        state.next_listener_id += 1;
        state.listeners.push((id, Box::new(listener)));
        Ok(id)
    }

    /// 購読を解除する。解除できた場合は `true`
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn unsubscribe(&mut self, id: ListenerId) -> Result<bool, TranslationError> {
        let state = self.state_mut("unsubscribe")?;
        let before = state.listeners.len();
        state.listeners.retain(|(listener_id, _)| *listener_id != id);
        Ok(state.listeners.len() != before)
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn get(&self, culture: &str) -> Result<Option<&TranslationSet>, TranslationError> {
        Ok(self.state("get")?.find(culture))
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn contains(&self, culture: &str) -> Result<bool, TranslationError> {
        Ok(self.state("contains")?.position(culture).is_some())
    }

    /// 登録済みカルチャ（登録順）
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn cultures(&self) -> Result<Vec<&str>, TranslationError> {
        Ok(self.state("cultures")?.translations.iter().map(|(code, _)| code.as_str()).collect())
    }

    /// (カルチャ, 翻訳セット) を登録順に列挙する
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn iter(&self) -> Result<impl Iterator<Item = (&str, &TranslationSet)>, TranslationError> {
        Ok(self.state("iter")?.translations.iter().map(|(code, set)| (code.as_str(), set)))
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn len(&self) -> Result<usize, TranslationError> {
        Ok(self.state("len")?.translations.len())
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn is_empty(&self) -> Result<bool, TranslationError> {
        Ok(self.state("is_empty")?.translations.is_empty())
    }

    /// すべての翻訳セットとキーコントラクトを解放し、プロバイダーを切り離す
    ///
    /// 以降の操作はすべて `ObjectDisposed` になる。2 回目以降は何もしない。
    pub fn release(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        let count = state.translations.len();
        for (_, translation) in &mut state.translations {
            translation.release();
        }
        if let Some(contract) = state.key_contract.as_mut() {
            contract.release();
        }
        state.data_provider = None;
        tracing::debug!(count, "Released translation catalog");
    }

    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.state.is_none()
    }
}
