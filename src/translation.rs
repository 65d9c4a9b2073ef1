//! 1 カルチャ分の翻訳セット
//!
//! キー集合は構築時に確定し、以後は値の更新のみを許可する。
//! 値の更新ごとに購読者へ `PropertyChanged` を通知する。

use std::collections::HashMap;
use std::fmt;

use crate::error::TranslationError;
use crate::provider::{
    ProviderError,
    Resource,
    TranslationDataProvider,
};

/// 値が更新されたキーの通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChanged {
    /// 更新されたキー名
    pub name: String,
}

/// 購読解除に使う識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// 値変更の購読者
type Listener = Box<dyn FnMut(&PropertyChanged) + Send>;

/// 解放前の内部状態
struct Contents {
    /// 元のリソース（リソースなしで構築した場合は `None`）
    resource: Option<Resource>,
    /// プロバイダーが返した順序のキー一覧
    keys: Vec<String>,
    /// キー → 翻訳文字列
    values: HashMap<String, String>,
    /// 値変更の購読者
    listeners: Vec<(ListenerId, Listener)>,
    /// 次に払い出す購読者 ID
    next_listener_id: u64,
}

/// キー集合が固定された翻訳文字列テーブル
pub struct TranslationSet {
    /// `None` は解放済みを表す
    contents: Option<Contents>,
}

impl fmt::Debug for TranslationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.contents {
            Some(contents) => f
                .debug_struct("TranslationSet")
                .field("keys", &contents.keys)
                .field("listeners", &contents.listeners.len())
                .finish_non_exhaustive(),
            None => f.write_str("TranslationSet(released)"),
        }
    }
}

impl TranslationSet {
    /// リソースからプロバイダー経由で翻訳セットを構築する
    ///
    /// # Errors
    /// - プロバイダーの読み込みに失敗した場合: `InitializationFailed`
    /// - キー一覧にあるキーの値が無い場合: `InitializationFailed`
    pub fn new(
        resource: Resource,
        provider: &dyn TranslationDataProvider,
    ) -> Result<Self, TranslationError> {
        let (keys, values) = Self::extract(&resource, provider)?;
        tracing::trace!(provider = provider.name(), count = keys.len(), "Built translation set");

        Ok(Self::from_parts(Some(resource), keys, values))
    }

    /// リソースなしでキーと値の組から構築する
    ///
    /// 同じキーが複数回現れた場合は後の値が優先され、位置は最初の出現のまま。
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut keys = Vec::new();
        let mut values = HashMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if values.insert(key.clone(), value.into()).is_none() {
                keys.push(key);
            }
        }

        Self::from_parts(None, keys, values)
    }

    fn from_parts(
        resource: Option<Resource>,
        keys: Vec<String>,
        values: HashMap<String, String>,
    ) -> Self {
        Self {
            contents: Some(Contents {
                resource,
                keys,
                values,
                listeners: Vec::new(),
                next_listener_id: 0,
            }),
        }
    }

    /// キー一覧を取得し、各キーの値を読み込み結果から引く
    fn extract(
        resource: &Resource,
        provider: &dyn TranslationDataProvider,
    ) -> Result<(Vec<String>, HashMap<String, String>), ProviderError> {
        let listed = provider.get_keys(&**resource)?;
        let mut data = provider.read_translation_data(&**resource)?;

        let mut keys = Vec::with_capacity(listed.len());
        let mut values = HashMap::with_capacity(listed.len());
        for key in listed {
            if values.contains_key(&key) {
                continue;
            }
            let value = data.remove(&key).ok_or_else(|| ProviderError::MissingValue(key.clone()))?;
            values.insert(key.clone(), value);
            keys.push(key);
        }

        Ok((keys, values))
    }

    fn contents(&self, operation: &'static str) -> Result<&Contents, TranslationError> {
        self.contents.as_ref().ok_or(TranslationError::disposed(operation))
    }

    fn contents_mut(&mut self, operation: &'static str) -> Result<&mut Contents, TranslationError> {
        self.contents.as_mut().ok_or(TranslationError::disposed(operation))
    }

    /// キー数
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn count(&self) -> Result<usize, TranslationError> {
        Ok(self.contents("count")?.keys.len())
    }

    /// キー一覧（構築時の順序）
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn keys(&self) -> Result<&[String], TranslationError> {
        Ok(&self.contents("keys")?.keys)
    }

    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn contains_key(&self, key: &str) -> Result<bool, TranslationError> {
        Ok(self.contents("contains_key")?.values.contains_key(key))
    }

    /// キーに対応する翻訳を取得する
    ///
    /// # Errors
    /// - キーが存在しない場合: `KeyNotFound`
    /// - 解放済みの場合: `ObjectDisposed`
    pub fn get(&self, key: &str) -> Result<&str, TranslationError> {
        self.contents("get")?
            .values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TranslationError::KeyNotFound(key.to_string()))
    }

    /// キーに対応する翻訳を取得する（存在しなければ `None`）
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn try_get(&self, key: &str) -> Result<Option<&str>, TranslationError> {
        Ok(self.contents("try_get")?.values.get(key).map(String::as_str))
    }

    /// UI バインディング用の名前による参照
    ///
    /// バインディングが壊れていてもエラーにせず `None` を返す。
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn member(&self, name: &str) -> Result<Option<&str>, TranslationError> {
        Ok(self.contents("member")?.values.get(name).map(String::as_str))
    }

    /// 既存キーの値を更新する
    ///
    /// `None` は空文字列として保存する。キーが存在しない場合は何もせず `false`。
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn try_set<V: fmt::Display>(
        &mut self,
        name: &str,
        value: Option<V>,
    ) -> Result<bool, TranslationError> {
        let contents = self.contents_mut("try_set")?;

        // キーの追加はしない
        let Some(slot) = contents.values.get_mut(name) else {
            return Ok(false);
        };
        *slot = value.map(|v| v.to_string()).unwrap_or_default();

        let event = PropertyChanged { name: name.to_string() };
        for (_, listener) in &mut contents.listeners {
            listener(&event);
        }

        Ok(true)
    }

    /// (キー, 値) をキー順に列挙する
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn iter(&self) -> Result<impl Iterator<Item = (&str, &str)>, TranslationError> {
        let contents = self.contents("iter")?;
        Ok(contents.keys.iter().filter_map(move |key| {
            contents.values.get(key).map(|value| (key.as_str(), value.as_str()))
        }))
    }

    /// 値変更の通知を購読する
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn subscribe<F>(&mut self, listener: F) -> Result<ListenerId, TranslationError>
    where
        F: FnMut(&PropertyChanged) + Send + 'static,
    {
        let contents = self.contents_mut("subscribe")?;
        let id = ListenerId(contents.next_listener_id);
        contents.next_listener_id += 1;
        contents.listeners.push((id, Box::new(listener)));
        Ok(id)
    }

    /// 購読を解除する。解除できた場合は `true`
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn unsubscribe(&mut self, id: ListenerId) -> Result<bool, TranslationError> {
        let contents = self.contents_mut("unsubscribe")?;
        let before = contents.listeners.len();
        contents.listeners.retain(|(listener_id, _)| *listener_id != id);
        Ok(contents.listeners.len() != before)
    }

    /// 元のリソースへの参照
    ///
    /// # Errors
    /// - 解放済みの場合: `ObjectDisposed`
    /// - リソースなしで構築した場合: `PreconditionFailed`
    pub fn resource(&self) -> Result<&Resource, TranslationError> {
        self.contents("resource")?.resource.as_ref().ok_or_else(|| {
            TranslationError::PreconditionFailed("Translation set has no backing resource".into())
        })
    }

    /// リソースを持たない独立したコピーを作る
    ///
    /// # Errors
    /// 解放済みの場合 `ObjectDisposed`
    pub fn detached_copy(&self) -> Result<Self, TranslationError> {
        let contents = self.contents("detached_copy")?;
        Ok(Self::from_parts(None, contents.keys.clone(), contents.values.clone()))
    }

    /// リソースと内部データを解放する
    ///
    /// 2 回目以降の呼び出しは何もしない。
    pub fn release(&mut self) {
        if let Some(mut contents) = self.contents.take() {
            // リソースを先に破棄する
            drop(contents.resource.take());
            contents.values.clear();
            contents.keys.clear();
            contents.listeners.clear();
        }
    }

    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.contents.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{
        AtomicBool,
        Ordering,
    };
    use std::sync::{
        Arc,
        Mutex,
    };

    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::provider::{
        ResourceDictionary,
        ResourceDictionaryProvider,
        ResourceFileProvider,
        ResourceReader,
    };
    use crate::test_utils::{
        DropFlag,
        FailingProvider,
        dictionary,
    };

    #[fixture]
    fn abc() -> TranslationSet {
        TranslationSet::new(
            Box::new(dictionary(&[("A", "1"), ("B", "2"), ("C", "3")])),
            &ResourceDictionaryProvider,
        )
        .unwrap()
    }

    #[rstest]
    fn builds_from_provider(abc: TranslationSet) {
        assert_that!(abc.count().unwrap(), eq(3));
        assert_that!(abc.get("B").unwrap(), eq("2"));
        assert_eq!(abc.keys().unwrap(), ["A", "B", "C"]);
    }

    #[rstest]
    fn builds_from_resource_file() {
        let reader = ResourceReader::from_entries([("Title", "Titre"), ("Ok", "D'accord")]);

        let set = TranslationSet::new(Box::new(reader), &ResourceFileProvider).unwrap();

        assert_that!(set.get("Ok").unwrap(), eq("D'accord"));
    }

    #[rstest]
    fn get_unknown_key_fails(abc: TranslationSet) {
        let result = abc.get("Z");

        assert!(matches!(result, Err(TranslationError::KeyNotFound(key)) if key == "Z"));
    }

    #[rstest]
    fn try_get_and_member_do_not_fail(abc: TranslationSet) {
        assert_that!(abc.try_get("A").unwrap(), some(eq("1")));
        assert_that!(abc.try_get("Z").unwrap(), none());
        assert_that!(abc.member("C").unwrap(), some(eq("3")));
        assert_that!(abc.member("Missing").unwrap(), none());
    }

    #[rstest]
    fn provider_failure_is_initialization_failed() {
        let result = TranslationSet::new(Box::new(ResourceDictionary::new()), &FailingProvider);

        assert!(matches!(result, Err(TranslationError::InitializationFailed { .. })));
    }

    #[rstest]
    fn closed_reader_is_initialization_failed() {
        let mut reader = ResourceReader::from_entries([("Title", "Title")]);
        reader.close();

        let result = TranslationSet::new(Box::new(reader), &ResourceFileProvider);

        assert!(matches!(
            result,
            Err(TranslationError::InitializationFailed { source: ProviderError::ReaderClosed })
        ));
    }

    #[rstest]
    fn try_set_updates_existing_key() {
        let mut set = TranslationSet::from_pairs([("Greeting", "Hello")]);

        assert!(set.try_set("Greeting", Some("Hola")).unwrap());
        assert_that!(set.get("Greeting").unwrap(), eq("Hola"));
    }

    #[rstest]
    fn try_set_does_not_grow_keys() {
        let mut set = TranslationSet::from_pairs([("Greeting", "Hello")]);

        assert!(!set.try_set("Farewell", Some("Adios")).unwrap());
        assert!(matches!(set.get("Farewell"), Err(TranslationError::KeyNotFound(_))));
        assert_that!(set.count().unwrap(), eq(1));
    }

    #[rstest]
    fn try_set_none_stores_empty_string() {
        let mut set = TranslationSet::from_pairs([("Greeting", "Hello")]);

        assert!(set.try_set("Greeting", None::<&str>).unwrap());
        assert_that!(set.get("Greeting").unwrap(), eq(""));
    }

    #[rstest]
    fn try_set_coerces_display_values() {
        let mut set = TranslationSet::from_pairs([("MaxItems", "10")]);

        set.try_set("MaxItems", Some(25)).unwrap();

        assert_that!(set.get("MaxItems").unwrap(), eq("25"));
    }

    #[rstest]
    fn try_set_notifies_listeners() {
        let mut set = TranslationSet::from_pairs([("Greeting", "Hello"), ("Title", "Main")]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        set.subscribe(move |event: &PropertyChanged| {
            sink.lock().unwrap().push(event.name.clone());
        })
        .unwrap();

        set.try_set("Title", Some("Accueil")).unwrap();
        set.try_set("Unknown", Some("x")).unwrap();
        set.try_set("Greeting", Some("Bonjour")).unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_that!(seen, elements_are![eq("Title"), eq("Greeting")]);
    }

    #[rstest]
    fn unsubscribe_stops_notifications() {
        let mut set = TranslationSet::from_pairs([("Greeting", "Hello")]);
        let seen = Arc::new(Mutex::new(0_usize));
        let sink = Arc::clone(&seen);
        let id = set.subscribe(move |_: &PropertyChanged| *sink.lock().unwrap() += 1).unwrap();

        set.try_set("Greeting", Some("Hi")).unwrap();
        assert!(set.unsubscribe(id).unwrap());
        set.try_set("Greeting", Some("Hey")).unwrap();

        assert_that!(*seen.lock().unwrap(), eq(1));
        assert!(!set.unsubscribe(id).unwrap());
    }

    #[rstest]
    fn from_pairs_keeps_first_position() {
        let set = TranslationSet::from_pairs([("A", "1"), ("B", "2"), ("A", "3")]);

        assert_eq!(set.keys().unwrap(), ["A", "B"]);
        assert_that!(set.get("A").unwrap(), eq("3"));
    }

    #[rstest]
    fn iter_follows_key_order(abc: TranslationSet) {
        let pairs: Vec<(&str, &str)> = abc.iter().unwrap().collect();

        assert_eq!(pairs, vec![("A", "1"), ("B", "2"), ("C", "3")]);
    }

    #[rstest]
    #[case::count("count")]
    #[case::get("get")]
    #[case::try_get("try_get")]
    #[case::member("member")]
    #[case::try_set("try_set")]
    fn released_set_fails_with_operation_name(mut abc: TranslationSet, #[case] operation: &str) {
        abc.release();

        let error = match operation {
            "count" => abc.count().unwrap_err(),
            "get" => abc.get("A").unwrap_err(),
            "try_get" => abc.try_get("A").unwrap_err(),
            "member" => abc.member("A").unwrap_err(),
            _ => abc.try_set("A", Some("x")).unwrap_err(),
        };

        assert!(abc.is_released());
        assert!(
            matches!(error, TranslationError::ObjectDisposed { operation: op } if op == operation)
        );
    }

    #[rstest]
    fn release_drops_resource() {
        let dropped = Arc::new(AtomicBool::new(false));
        let resource = DropFlag::new(&dropped, dictionary(&[("A", "1")]));
        let mut set = TranslationSet::from_parts(Some(Box::new(resource)), vec![], HashMap::new());

        assert!(!dropped.load(Ordering::SeqCst));
        set.release();

        assert!(dropped.load(Ordering::SeqCst));
        set.release();
        assert!(set.is_released());
    }

    #[rstest]
    fn detached_copy_has_no_resource(abc: TranslationSet) {
        let copy = abc.detached_copy().unwrap();

        assert_that!(copy.count().unwrap(), eq(3));
        assert!(abc.resource().is_ok());
        assert!(matches!(copy.resource(), Err(TranslationError::PreconditionFailed(_))));
    }
}
