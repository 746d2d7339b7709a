use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// pages ディレクトリの典型的な配置
const PAGES_CANDIDATES: &[&str] = &["src/pages", "pages", "src/views"];

/// メニュー設定モジュールの典型的な配置
const MENU_CONFIG_CANDIDATES: &[&str] = &[
    "src/configs/index.ts",
    "src/configs/index.js",
    "src/config/index.ts",
];

/// 候補を絶対パス化し、最初に存在するものを返す
fn first_existing(
    project_root: &Path,
    candidates: impl IntoIterator<Item = PathBuf>,
) -> Result<Option<PathBuf>> {
    for cand in candidates {
        let joined = if cand.is_absolute() {
            cand
        } else {
            project_root.join(cand)
        };
        let abs = joined.absolutize()?.to_path_buf();
        if fs::metadata(&abs).is_ok() {
            return Ok(Some(abs));
        }
    }
    Ok(None)
}

/// pages ディレクトリを解決する。
///
/// - `explicit`: `--pages` で指定されたパス (プロジェクトルート相対でも絶対でもよい)
/// - 指定が無ければ `src/pages` → `pages` → `src/views` の順に探す
pub fn resolve_pages_dir(project_root: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = match explicit {
        Some(p) => vec![p.to_path_buf()],
        None => PAGES_CANDIDATES.iter().map(PathBuf::from).collect(),
    };

    match first_existing(project_root, candidates)? {
        Some(dir) if dir.is_dir() => Ok(dir),
        _ => Err(Error::NotFound {
            what: "pages ディレクトリ",
            root: project_root.to_path_buf(),
        }),
    }
}

/// メニュー設定モジュール (configs/index.ts) を解決する
pub fn resolve_menu_config(project_root: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = match explicit {
        Some(p) => vec![p.to_path_buf()],
        None => MENU_CONFIG_CANDIDATES.iter().map(PathBuf::from).collect(),
    };

    first_existing(project_root, candidates)?.ok_or_else(|| Error::NotFound {
        what: "メニュー設定ファイル",
        root: project_root.to_path_buf(),
    })
}
