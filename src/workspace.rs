//! ワークスペースのロケールファイルからカタログを組み立てる

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use thiserror::Error;

use crate::catalog::{
    BulkReport,
    TranslationCatalog,
};
use crate::config::{
    CatalogSettings,
    ConfigError,
    ConfigManager,
};
use crate::error::TranslationError;
use crate::locale::detect_culture_from_path;
use crate::provider::{
    ProviderError,
    Resource,
    ResourceDictionary,
    ResourceDictionaryProvider,
};

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Invalid locale file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[source] globset::Error),

    #[error("Failed to load locale file {}: {source}", .path.display())]
    LocaleFile {
        path: PathBuf,
        #[source]
        source: ProviderError,
    },

    #[error("No locale file found for contract culture '{0}'")]
    MissingContract(String),

    #[error("The application could not load any translations")]
    NoTranslations,

    #[error("Default culture '{0}' is not registered")]
    UnknownDefaultCulture(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// カルチャ単位で読み込めなかったロケールファイル
#[derive(Debug)]
pub struct LocaleFileFailure {
    pub culture: String,
    pub path: PathBuf,
    pub error: ProviderError,
}

/// カルチャごとにまとめたロケールファイル
#[derive(Debug, Default)]
pub struct LocaleDictionaries {
    /// 読み込みに成功したカルチャ（カルチャコード順）
    pub dictionaries: BTreeMap<String, ResourceDictionary>,
    /// 読み込みに失敗したカルチャ。失敗したカルチャは `dictionaries` に含まれない
    pub failed: Vec<LocaleFileFailure>,
}

/// ワークスペースのロケールファイルを探索・読み込みする
#[derive(Debug, Clone)]
pub struct WorkspaceLoader {
    /// ワークスペースのルートパス
    root: PathBuf,
    /// 読み込み設定
    config: ConfigManager,
}

impl WorkspaceLoader {
    /// # Errors
    /// 設定のバリデーションエラー
    pub fn new(root: PathBuf, settings: CatalogSettings) -> Result<Self, WorkspaceError> {
        Ok(Self { root, config: ConfigManager::with_settings(settings)? })
    }

    /// ワークスペースの設定ファイルを読み込んでローダーを作成
    ///
    /// # Errors
    /// 設定ファイルの読み込み・バリデーションエラー
    pub fn from_workspace(root: &Path) -> Result<Self, WorkspaceError> {
        let mut config = ConfigManager::new();
        config.load_settings(root)?;
        Ok(Self { root: root.to_path_buf(), config })
    }

    #[must_use]
    pub const fn settings(&self) -> &CatalogSettings {
        self.config.get_settings()
    }

    /// 設定ファイルを読み直す。失敗した場合は現在の設定を保持する
    ///
    /// # Errors
    /// 設定ファイルの読み込み・バリデーションエラー
    pub fn reload_settings(&mut self) -> Result<(), WorkspaceError> {
        self.config.load_settings(&self.root)?;
        Ok(())
    }

    /// 設定を差し替える。失敗した場合は現在の設定を保持する
    ///
    /// # Errors
    /// 設定のバリデーションエラー
    pub fn update_settings(&mut self, settings: CatalogSettings) -> Result<(), WorkspaceError> {
        self.config.update_settings(settings)?;
        Ok(())
    }

    /// ロケールファイルを検索する（パス順）
    ///
    /// # Errors
    /// glob パターンが無効な場合
    pub fn find_locale_files(&self) -> Result<Vec<PathBuf>, WorkspaceError> {
        let settings = self.settings();
        let include_set = build_glob_set(&settings.locale_files.include_patterns)?;
        let exclude_set = build_glob_set(&settings.locale_files.exclude_patterns)?;

        let mut found_files = Vec::new();
        for result in WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            // ファイルのみを対象
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();

            // workspace からの相対パスで判定
            let Ok(relative_path) = path.strip_prefix(&self.root) else {
                continue;
            };
            if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
                continue;
            }

            found_files.push(path.to_path_buf());
        }

        found_files.sort();
        Ok(found_files)
    }

    /// ロケールファイルをカルチャごとのディクショナリにまとめる
    ///
    /// カルチャはワークスペースからの相対パスで判定し、判定できないファイルは
    /// 読み飛ばす。同じカルチャのファイルが複数ある場合はマージする。
    /// 1 ファイルでも読み込めなかったカルチャは丸ごと `failed` に回す。
    ///
    /// # Errors
    /// glob パターンが無効な場合
    pub fn load_dictionaries(&self) -> Result<LocaleDictionaries, WorkspaceError> {
        let separator = &self.settings().key_separator;
        let mut loaded = LocaleDictionaries::default();

        for path in self.find_locale_files()? {
            let relative_path = path.strip_prefix(&self.root).unwrap_or(path.as_path());
            let Some(culture) = detect_culture_from_path(relative_path) else {
                tracing::debug!(path = %path.display(), "Skipping file without culture");
                continue;
            };

            if loaded.failed.iter().any(|failure| failure.culture == culture) {
                tracing::debug!(path = %path.display(), culture = %culture, "Skipping failed culture");
                continue;
            }

            match ResourceDictionary::from_path(&path, separator) {
                Ok(dictionary) => {
                    tracing::debug!(
                        path = %path.display(),
                        culture = %culture,
                        keys = dictionary.len(),
                        "Loaded locale file"
                    );
                    loaded.dictionaries.entry(culture).or_default().merge(dictionary);
                }
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        culture = %culture,
                        %error,
                        "Failed to load locale file"
                    );
                    loaded.dictionaries.remove(&culture);
                    loaded.failed.push(LocaleFileFailure { culture, path, error });
                }
            }
        }

        Ok(loaded)
    }

    /// カタログを組み立て、起動時のカルチャを選択する
    ///
    /// # Errors
    /// [`load_catalog_with_report`](Self::load_catalog_with_report) と同じ
    pub fn load_catalog(&self) -> Result<TranslationCatalog, WorkspaceError> {
        self.load_catalog_with_report().map(|(catalog, _)| catalog)
    }

    /// カタログを組み立て、登録できなかったカルチャの一覧とともに返す
    ///
    /// コントラクト以外のカルチャの失敗（読み込み・キー不一致）は警告ログのみで
    /// 続行し、レポートの `failed` に載せる。
    ///
    /// # Errors
    /// - コントラクトのロケールファイルが見つからない・読み込めない
    /// - 登録できたカルチャが無い
    /// - 明示した既定カルチャが登録されていない
    pub fn load_catalog_with_report(
        &self,
    ) -> Result<(TranslationCatalog, BulkReport), WorkspaceError> {
        let settings = self.settings();
        let LocaleDictionaries { mut dictionaries, failed } = self.load_dictionaries()?;

        let mut unreadable = Vec::with_capacity(failed.len());
        for LocaleFileFailure { culture, path, error } in failed {
            if culture == settings.contract_culture {
                return Err(WorkspaceError::LocaleFile { path, source: error });
            }
            unreadable.push((culture, TranslationError::from(error)));
        }

        let contract = dictionaries
            .remove(&settings.contract_culture)
            .ok_or_else(|| WorkspaceError::MissingContract(settings.contract_culture.clone()))?;

        let mut catalog = TranslationCatalog::with_provider(ResourceDictionaryProvider);
        catalog.set_key_policy(settings.key_policy)?;
        catalog.set_key_contract_from(Box::new(contract))?;

        if settings.register_contract {
            catalog.register_contract_as(&settings.contract_culture)?;
        }

        let mut report =
            catalog.add_bulk(dictionaries.into_iter().map(|(culture, dictionary)| {
                let resource: Resource = Box::new(dictionary);
                (culture, resource)
            }));
        report.failed.extend(unreadable);

        if catalog.is_empty()? {
            return Err(WorkspaceError::NoTranslations);
        }

        let startup = settings.startup_culture();
        if catalog.contains(startup)? {
            catalog.set_current(startup)?;
        } else if let Some(default_culture) = &settings.default_culture {
            return Err(WorkspaceError::UnknownDefaultCulture(default_culture.clone()));
        } else {
            let first = catalog.cultures()?.first().map(ToString::to_string);
            if let Some(first) = first {
                tracing::warn!(contract = startup, selected = %first, "Contract culture not registered");
                catalog.set_current(&first)?;
            }
        }

        tracing::info!(
            cultures = catalog.len()?,
            rejected = report.failed.len(),
            current = ?catalog.current_culture()?,
            "Translation catalog loaded"
        );

        Ok((catalog, report))
    }
}

/// パターン一覧から `GlobSet` を構築
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, WorkspaceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| WorkspaceError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(WorkspaceError::GlobSetBuild)
}
