// src/config.rs
//! フロントエンドの環境変数 (VITE_*) からサーバー設定を組み立てる。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::ComponentRef;

const DEFAULT_API_PATH: &str = "/api";

/// VITE_* 環境変数 (CLI 引数でも上書きできる)
#[derive(Args, Debug, Clone, Default)]
pub struct EnvConfig {
    #[arg(long, env = "VITE_APP_TITLE")]
    pub app_title: Option<String>,

    /// ロゴのアイコン名 (src/components/icon/<名前>.vue)
    #[arg(long, env = "VITE_APP_LOGO")]
    pub app_logo: Option<String>,

    #[arg(long, env = "VITE_APP_VERSION")]
    pub app_version: Option<String>,

    #[arg(long, env = "VITE_FILE_UPLOAD_URL")]
    pub file_upload_url: Option<String>,

    #[arg(long, env = "VITE_SERVER_PATH")]
    pub server_path: Option<String>,

    #[arg(long, env = "VITE_WEBSOCKET_PATH")]
    pub websocket_path: Option<String>,

    /// アップロード URL が相対のときに使うオリジン (例: https://example.com)
    #[arg(long, env = "VITE_SITE_ORIGIN", default_value = "http://localhost")]
    pub site_origin: String,
}

/// 既知のロゴコンポーネントの一覧。起動時に一度だけ作る。
#[derive(Debug, Clone, Default)]
pub struct LogoRegistry {
    logos: BTreeMap<String, ComponentRef>,
}

impl LogoRegistry {
    pub fn new(entries: impl IntoIterator<Item = (String, ComponentRef)>) -> Self {
        LogoRegistry {
            logos: entries.into_iter().collect(),
        }
    }

    /// アイコンディレクトリ直下の `.vue` ファイルを登録する
    pub fn from_icon_dir(icon_dir: &Path, project_root: &Path) -> Result<Self> {
        let mut logos = BTreeMap::new();
        if !icon_dir.is_dir() {
            debug!("アイコンディレクトリがありません: {:?}", icon_dir);
            return Ok(LogoRegistry { logos });
        }

        for entry in fs::read_dir(icon_dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "vue") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let rel = path.strip_prefix(project_root).unwrap_or(&path);
                let component = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                logos.insert(stem.to_string(), ComponentRef(component));
            }
        }
        Ok(LogoRegistry { logos })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.logos.keys().map(String::as_str)
    }

    /// 識別子をコンポーネントに解決する。未指定なら None、未知の識別子はエラー。
    pub fn resolve(&self, identifier: Option<&str>) -> Result<Option<ComponentRef>> {
        match identifier.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(name) => self
                .logos
                .get(name)
                .cloned()
                .map(Some)
                .ok_or_else(|| Error::UnknownLogo(name.to_string())),
        }
    }
}

/// 解決済みのサーバー設定
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub use_token_authorization: bool,
    pub file_upload_url: Option<String>,
    pub app_title: Option<String>,
    pub app_logo: Option<ComponentRef>,
    pub app_version: Option<String>,
    pub server_path: String,
    pub websocket_path: String,
}

/// `http` で始まる URL はそのまま、それ以外は `<origin>/api<url>` にする
pub fn resolve_upload_url(url: &str, origin: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("{}{}{}", origin.trim_end_matches('/'), DEFAULT_API_PATH, url)
    }
}

impl ServerConfig {
    pub fn resolve(env: &EnvConfig, logos: &LogoRegistry) -> Result<Self> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        Ok(ServerConfig {
            base_url: DEFAULT_API_PATH.to_string(),
            use_token_authorization: false,
            file_upload_url: env
                .file_upload_url
                .as_deref()
                .map(|url| resolve_upload_url(url, &env.site_origin)),
            app_title: env.app_title.clone(),
            app_logo: logos.resolve(env.app_logo.as_deref())?,
            app_version: env.app_version.clone(),
            server_path: non_empty(&env.server_path).unwrap_or_else(|| DEFAULT_API_PATH.to_string()),
            websocket_path: non_empty(&env.websocket_path)
                .unwrap_or_else(|| DEFAULT_API_PATH.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> LogoRegistry {
        LogoRegistry::new([(
            "KnowledgeLogo".to_string(),
            ComponentRef::new("src/components/icon/KnowledgeLogo.vue"),
        )])
    }

    #[test]
    fn test_resolve_upload_url() {
        assert_eq!(
            resolve_upload_url("https://cdn.example.com/upload", "http://localhost"),
            "https://cdn.example.com/upload"
        );
        assert_eq!(
            resolve_upload_url("/file/upload", "https://example.com/"),
            "https://example.com/api/file/upload"
        );
    }

    #[test]
    fn test_unknown_logo_is_configuration_error() {
        let err = registry().resolve(Some("Missing")).unwrap_err();
        assert!(matches!(err, Error::UnknownLogo(name) if name == "Missing"));

        assert_eq!(registry().resolve(None).unwrap(), None);
        assert_eq!(registry().resolve(Some("  ")).unwrap(), None);
        assert!(registry().resolve(Some("KnowledgeLogo")).unwrap().is_some());
    }

    #[test]
    fn test_server_config_defaults() {
        let env = EnvConfig {
            app_title: Some("知识库".to_string()),
            file_upload_url: Some("/file/upload".to_string()),
            server_path: Some(String::new()),
            site_origin: "http://localhost:5173".to_string(),
            ..Default::default()
        };

        let config = ServerConfig::resolve(&env, &registry()).unwrap();
        assert_eq!(config.base_url, "/api");
        assert!(!config.use_token_authorization);
        assert_eq!(
            config.file_upload_url.as_deref(),
            Some("http://localhost:5173/api/file/upload")
        );
        assert_eq!(config.server_path, "/api");
        assert_eq!(config.websocket_path, "/api");
        assert_eq!(config.app_logo, None);
    }

    #[test]
    fn test_server_config_rejects_unknown_logo() {
        let env = EnvConfig {
            app_logo: Some("Nope".to_string()),
            ..Default::default()
        };
        assert!(ServerConfig::resolve(&env, &registry()).is_err());
    }

    #[test]
    fn test_registry_from_icon_dir() {
        let temp = tempfile::tempdir().unwrap();
        let icons = temp.path().join("src/components/icon");
        fs::create_dir_all(&icons).unwrap();
        fs::write(icons.join("KnowledgeLogo.vue"), "").unwrap();
        fs::write(icons.join("README.md"), "").unwrap();

        let registry = LogoRegistry::from_icon_dir(&icons, temp.path()).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["KnowledgeLogo"]);
        assert_eq!(
            registry.resolve(Some("KnowledgeLogo")).unwrap(),
            Some(ComponentRef::new("src/components/icon/KnowledgeLogo.vue"))
        );

        let missing = LogoRegistry::from_icon_dir(&temp.path().join("none"), temp.path()).unwrap();
        assert_eq!(missing.names().count(), 0);
    }
}
