// src/error.rs
use std::path::PathBuf;

/// クレート全体で使うエラー型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// ファイル読み込みなどの I/O エラー
    #[error("I/O エラー: {0}")]
    Io(#[from] std::io::Error),

    /// pages ディレクトリ走査中のエラー
    #[error("ディレクトリ走査エラー: {0}")]
    Walk(#[from] walkdir::Error),

    /// JSON の入出力エラー
    #[error("JSON エラー: {0}")]
    Json(#[from] serde_json::Error),

    /// ルートツリーがノードの配列として読めない (起動時の致命的エラー)
    #[error("ルートツリーの形式が不正です ({source_name}): {message}")]
    MalformedTree { source_name: String, message: String },

    /// TypeScript の構文解析エラー
    #[error("構文解析エラー {file:?}: {message}")]
    Parse { file: PathBuf, message: String },

    /// メニュー ID の重複
    #[error("メニュー ID '{id}' が重複しています: '{first}' と '{second}'")]
    DuplicateMenuId {
        id: String,
        first: String,
        second: String,
    },

    /// 未知のロゴ識別子 (設定エラー)
    #[error("未知のロゴ識別子です: '{0}'")]
    UnknownLogo(String),

    /// ルートにできないページファイル名
    #[error("ページファイル名が不正です: {0:?}")]
    InvalidPageName(PathBuf),

    /// 必要なファイル・ディレクトリが見つからない
    #[error("{what} が見つかりませんでした (探索起点: {root:?})")]
    NotFound { what: &'static str, root: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
