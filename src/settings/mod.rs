//! タイマー設定
//!
//! Flowモードの休憩率（1-50%）を管理する。
//! 状態機械は休憩を計算する時点で毎回値を読み出し、キャッシュしない。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::timer::logic::{
    clamp_break_percent, DEFAULT_FLOW_BREAK_PERCENT, MAX_FLOW_BREAK_PERCENT, MIN_FLOW_BREAK_PERCENT,
};

/// 設定のエラー型
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("設定ファイルの書き込みに失敗しました: {0}")]
    Write(#[source] std::io::Error),
    #[error("設定のシリアライズに失敗しました: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// タイマー設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    /// Flowモードの休憩率（%）: 1-50
    #[serde(deserialize_with = "deserialize_break_percent")]
    pub flow_break_percent: u8,
}

/// 保存値を1-50に丸めて読み込む
///
/// `u8` に収まらない値（300, -5など）や小数も受け付ける。
fn deserialize_break_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    let min = f64::from(MIN_FLOW_BREAK_PERCENT);
    let max = f64::from(MAX_FLOW_BREAK_PERCENT);
    Ok(raw.trunc().clamp(min, max) as u8)
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            flow_break_percent: DEFAULT_FLOW_BREAK_PERCENT,
        }
    }
}

impl TimerSettings {
    /// 範囲外の値を丸めた設定を返す
    pub fn normalized(self) -> Self {
        Self {
            flow_break_percent: clamp_break_percent(self.flow_break_percent),
        }
    }
}

/// 設定の提供元
pub trait SettingsProvider: Send + Sync {
    /// 現在の設定
    fn settings(&self) -> TimerSettings;

    /// Flowモードの休憩率を更新（1-50に丸めた値を保存して返す）
    fn set_flow_break_percent(&self, percent: u8) -> Result<TimerSettings, SettingsError>;

    /// デフォルトに戻す
    fn reset(&self) -> Result<TimerSettings, SettingsError>;

    /// Flowモードの休憩率
    fn flow_break_percent(&self) -> u8 {
        self.settings().flow_break_percent
    }
}

/// メモリ上の設定
#[derive(Debug, Default)]
pub struct MemorySettings {
    inner: Mutex<TimerSettings>,
}

impl MemorySettings {
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            inner: Mutex::new(settings.normalized()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TimerSettings> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SettingsProvider for MemorySettings {
    fn settings(&self) -> TimerSettings {
        *self.lock()
    }

    fn set_flow_break_percent(&self, percent: u8) -> Result<TimerSettings, SettingsError> {
        let mut settings = self.lock();
        settings.flow_break_percent = clamp_break_percent(percent);
        Ok(*settings)
    }

    fn reset(&self) -> Result<TimerSettings, SettingsError> {
        let mut settings = self.lock();
        *settings = TimerSettings::default();
        Ok(*settings)
    }
}

/// JSONファイルに保存する設定
///
/// 読み出しのたびにファイルを読むため、CLIからの変更は
/// 実行中のデーモンにも次の休憩計算から反映される。
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイルから読み込む
    ///
    /// ファイルがない、または壊れている場合はデフォルト値を返す。
    pub fn load(&self) -> TimerSettings {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!("設定ファイルを読み込めません: {:?} ({})", self.path, e);
                return TimerSettings::default();
            }
        };

        match serde_json::from_str::<TimerSettings>(&data) {
            Ok(settings) => settings.normalized(),
            Err(e) => {
                warn!("設定ファイルの解析に失敗しました: {}", e);
                TimerSettings::default()
            }
        }
    }

    fn save(&self, settings: &TimerSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::Write)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json).map_err(SettingsError::Write)?;
        Ok(())
    }
}

impl SettingsProvider for FileSettings {
    fn settings(&self) -> TimerSettings {
        self.load()
    }

    fn set_flow_break_percent(&self, percent: u8) -> Result<TimerSettings, SettingsError> {
        let mut settings = self.load();
        settings.flow_break_percent = clamp_break_percent(percent);
        self.save(&settings)?;
        debug!("Flow休憩率を更新しました: {}%", settings.flow_break_percent);
        Ok(settings)
    }

    fn reset(&self) -> Result<TimerSettings, SettingsError> {
        let settings = TimerSettings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}
