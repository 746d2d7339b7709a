// src/menu.rs
//! ヘッダーメニューと管理画面メニューの設定を読み込み、ID の重複を検査する。

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::parser::extract_literals;

pub const DEFAULT_MENU_BINDING: &str = "defaultMenuItems";
pub const ADMIN_MENU_BINDING: &str = "adminMenuItems";

/// ヘッダーのメニュー項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub hide: bool,
}

/// 管理画面サイドバーのメニュー項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminMenuItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub path: String,
    #[serde(default)]
    pub hide: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AdminMenuItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuConfig {
    pub default_menu: Vec<MenuItem>,
    pub admin_menu: Vec<AdminMenuItem>,
}

/// ID が重複したときの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// 最初の重複をエラーにする
    #[default]
    Reject,
    /// 警告を出して両方残す
    Warn,
}

/// 重複した ID と、それを持つ項目の表示名 (宣言順)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: String,
    pub first: String,
    pub second: String,
}

fn take_binding<T: for<'de> Deserialize<'de>>(
    bindings: &mut HashMap<String, Value>,
    name: &str,
) -> Result<Vec<T>> {
    match bindings.remove(name) {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => {
            warn!("{} の定義が見つかりません", name);
            Ok(Vec::new())
        }
    }
}

/// 設定モジュールを AST 解析して MenuConfig を返す
pub fn parse_menu_config(file: &Path) -> Result<MenuConfig> {
    let mut bindings = extract_literals(file, &[DEFAULT_MENU_BINDING, ADMIN_MENU_BINDING])?;

    Ok(MenuConfig {
        default_menu: take_binding(&mut bindings, DEFAULT_MENU_BINDING)?,
        admin_menu: take_binding(&mut bindings, ADMIN_MENU_BINDING)?,
    })
}

fn find_duplicates<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<DuplicateId> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut duplicates = Vec::new();
    for (id, title) in entries {
        if let Some(first) = seen.get(id) {
            duplicates.push(DuplicateId {
                id: id.to_string(),
                first: (*first).to_string(),
                second: title.to_string(),
            });
        } else {
            seen.insert(id, title);
        }
    }
    duplicates
}

impl AdminMenuItem {
    /// 自身と子孫を宣言順に並べる
    fn collect<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        out.push((self.id.as_str(), self.title.as_str()));
        for child in &self.children {
            child.collect(out);
        }
    }
}

impl MenuConfig {
    /// メニューごとに ID の重複を調べる (管理画面メニューは子項目も含む)
    pub fn duplicate_ids(&self) -> Vec<DuplicateId> {
        let mut duplicates =
            find_duplicates(self.default_menu.iter().map(|m| (m.id.as_str(), m.label.as_str())));

        let mut admin = Vec::new();
        for item in &self.admin_menu {
            item.collect(&mut admin);
        }
        duplicates.extend(find_duplicates(admin));
        duplicates
    }

    /// ID は振り直さない。Warn のときは重複一覧を返す
    pub fn validate(&self, policy: DuplicatePolicy) -> Result<Vec<DuplicateId>> {
        let duplicates = self.duplicate_ids();
        match (policy, duplicates.first()) {
            (DuplicatePolicy::Reject, Some(dup)) => Err(Error::DuplicateMenuId {
                id: dup.id.clone(),
                first: dup.first.clone(),
                second: dup.second.clone(),
            }),
            _ => {
                for dup in &duplicates {
                    warn!(
                        "メニュー ID '{}' が重複しています: '{}' と '{}'",
                        dup.id, dup.first, dup.second
                    );
                }
                Ok(duplicates)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const CONFIG_SOURCE: &str = r#"
import type { AdminHeader } from '@/types/factory'
import { defineAsyncComponent } from 'vue';

let VITE_APP_LOGO
try {
  VITE_APP_LOGO = defineAsyncComponent(() => import(`@/components/icon/${import.meta.env.VITE_APP_LOGO}.vue`))
} catch {
  VITE_APP_LOGO = null
}

export const defaultMenuItems: MenuItem[] = [
  { id: 'index', label: 'menu.index', href: '/', icon: null, hide: false },
  { id: 'knowledge', label: '知识库', href: '/user/knowledge', icon: null },
]

export const adminMenuItems: AdminHeader[] = [
  { id: "1", title: "仪表板", icon: "Odometer", path: "/admin/dashboard" },
  {
    id: "5",
    title: "订单管理",
    icon: "ShoppingCart",
    path: "/admin/orders",
    hide: true,
    children: [
      { id: "4-1", title: "订单列表", icon: "List", path: "/admin/orders/list" },
    ],
  },
  { id: "6", title: "文件系统", icon: "FolderChecked", path: "/admin/files" },
  { id: '6', title: 'AI 助手', icon: 'ChatDotRound', path: '/admin/ai', hide: true },
];

const serverConfig = { baseURL: '/api', useTokenAuthorization: false }
export default serverConfig
"#;

    fn write_config(src: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("index.ts");
        fs::write(&file, src).unwrap();
        (temp, file)
    }

    #[test]
    fn test_parse_menu_config() {
        let (_temp, file) = write_config(CONFIG_SOURCE);
        let config = parse_menu_config(&file).unwrap();

        assert_eq!(config.default_menu.len(), 2);
        assert_eq!(config.default_menu[0].icon, None);
        assert!(!config.default_menu[1].hide);

        let ids: Vec<&str> = config.admin_menu.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5", "6", "6"]);
        assert_eq!(config.admin_menu[1].children[0].path, "/admin/orders/list");
        assert!(config.admin_menu[3].hide);
    }

    #[test]
    fn test_duplicate_id_is_rejected_by_default() {
        let (_temp, file) = write_config(CONFIG_SOURCE);
        let config = parse_menu_config(&file).unwrap();

        let err = config.validate(DuplicatePolicy::default()).unwrap_err();
        match err {
            Error::DuplicateMenuId { id, first, second } => {
                assert_eq!(id, "6");
                assert_eq!(first, "文件系统");
                assert_eq!(second, "AI 助手");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_id_is_kept_with_warn_policy() {
        let (_temp, file) = write_config(CONFIG_SOURCE);
        let config = parse_menu_config(&file).unwrap();

        let duplicates = config.validate(DuplicatePolicy::Warn).unwrap();
        assert_eq!(duplicates.len(), 1);
        // 振り直しはしない
        assert_eq!(config.admin_menu[2].id, "6");
        assert_eq!(config.admin_menu[3].id, "6");
    }

    #[test]
    fn test_nested_ids_share_namespace() {
        let config = MenuConfig {
            default_menu: Vec::new(),
            admin_menu: vec![
                AdminMenuItem {
                    id: "4".to_string(),
                    title: "知识管理".to_string(),
                    icon: None,
                    path: "/admin/knowledge".to_string(),
                    hide: false,
                    children: vec![AdminMenuItem {
                        id: "4".to_string(),
                        title: "子项".to_string(),
                        icon: None,
                        path: "/admin/knowledge/sub".to_string(),
                        hide: false,
                        children: Vec::new(),
                    }],
                },
            ],
        };

        assert_eq!(
            config.duplicate_ids(),
            vec![DuplicateId {
                id: "4".to_string(),
                first: "知识管理".to_string(),
                second: "子项".to_string(),
            }]
        );
    }

    #[test]
    fn test_menus_are_checked_separately() {
        let config = MenuConfig {
            default_menu: vec![MenuItem {
                id: "1".to_string(),
                label: "menu.index".to_string(),
                href: "/".to_string(),
                icon: None,
                hide: false,
            }],
            admin_menu: vec![AdminMenuItem {
                id: "1".to_string(),
                title: "仪表板".to_string(),
                icon: Some("Odometer".to_string()),
                path: "/admin/dashboard".to_string(),
                hide: false,
                children: Vec::new(),
            }],
        };

        assert!(config.validate(DuplicatePolicy::Reject).unwrap().is_empty());
    }

    #[test]
    fn test_missing_bindings_yield_empty_menus() {
        let (_temp, file) = write_config("export const other = []");
        let config = parse_menu_config(&file).unwrap();
        assert_eq!(config, MenuConfig::default());
    }
}
