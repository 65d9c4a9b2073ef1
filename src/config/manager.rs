//! 設定管理を行うモジュール

use std::path::Path;

use super::{
    CatalogSettings,
    ConfigError,
    loader,
};

/// 検証済みの設定を保持する
///
/// 読み込み・更新に失敗した場合は直前の設定を保持し続ける。
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定（常にバリデーション済み）
    current_settings: CatalogSettings,
}

impl ConfigManager {
    /// デフォルト設定で作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: CatalogSettings::default() }
    }

    /// 検証済みの設定で作成
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn with_settings(settings: CatalogSettings) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.update_settings(settings)?;
        Ok(manager)
    }

    /// ワークスペースの設定ファイルを読み込む
    ///
    /// 設定ファイルが無い場合はデフォルト設定になる。
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, workspace_root: &Path) -> Result<(), ConfigError> {
        let settings = loader::load_from_workspace(workspace_root)?.unwrap_or_default();
        self.update_settings(settings)?;
        tracing::debug!(root = %workspace_root.display(), "Settings loaded");
        Ok(())
    }

    /// 設定を差し替える
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn update_settings(&mut self, new_settings: CatalogSettings) -> Result<(), ConfigError> {
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;
        tracing::debug!(settings = ?new_settings, "Settings updated");
        self.current_settings = new_settings;
        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &CatalogSettings {
        &self.current_settings
    }
}
