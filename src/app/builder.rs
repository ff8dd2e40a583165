// ランタイム構築 - BuildContext と RuntimeBuilder の定義

use crate::core::{PipelineError, PipelineResult, Runtime};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 実行終了後に呼ばれる後始末処理
pub type Finalizer = Box<dyn FnOnce() -> Result<()> + Send>;

/// 構築時に各 RuntimeBuilder へ渡されるコンテキスト
///
/// 設定ドキュメントへの型付きアクセスとファイナライザーの登録を提供する。
pub struct BuildContext {
    config: Value,
    finalizers: Vec<Finalizer>,
}

impl BuildContext {
    pub(crate) fn new(config: Value) -> Self {
        Self {
            config,
            finalizers: Vec::new(),
        }
    }

    /// 設定ドキュメント全体を `T` として取得
    ///
    /// 設定が与えられていない場合は `T::default()` を返す。
    pub fn config<T>(&self) -> PipelineResult<T>
    where
        T: DeserializeOwned + Default,
    {
        deserialize_or_default(&self.config)
    }

    /// トップレベルの `key` セクションを `T` として取得
    ///
    /// セクションが存在しない場合は `T::default()` を返す。
    pub fn config_section<T>(&self, key: &str) -> PipelineResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.config.get(key) {
            Some(section) => deserialize_or_default(section),
            None => Ok(T::default()),
        }
    }

    /// 生の設定ドキュメント
    pub fn raw_config(&self) -> &Value {
        &self.config
    }

    /// ファイナライザーを登録（登録順に実行される）
    pub fn register_finalizer<F>(&mut self, finalizer: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.finalizers.push(Box::new(finalizer));
    }

    pub fn finalizer_count(&self) -> usize {
        self.finalizers.len()
    }

    pub(crate) fn take_finalizers(&mut self) -> Vec<Finalizer> {
        std::mem::take(&mut self.finalizers)
    }
}

fn deserialize_or_default<T>(value: &Value) -> PipelineResult<T>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    T::deserialize(value).map_err(|source| PipelineError::ConfigParseError { source })
}

/// Runtime を構築するトレイト
pub trait RuntimeBuilder: Send {
    fn build(&self, ctx: &mut BuildContext) -> Result<Box<dyn Runtime>>;
}

/// クロージャを RuntimeBuilder として扱うアダプター
pub struct RuntimeBuilderFn<F>(F);

impl<F> RuntimeBuilderFn<F>
where
    F: Fn(&mut BuildContext) -> Result<Box<dyn Runtime>> + Send,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> RuntimeBuilder for RuntimeBuilderFn<F>
where
    F: Fn(&mut BuildContext) -> Result<Box<dyn Runtime>> + Send,
{
    fn build(&self, ctx: &mut BuildContext) -> Result<Box<dyn Runtime>> {
        (self.0)(ctx)
    }
}
