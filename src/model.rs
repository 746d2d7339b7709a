// src/model.rs
use serde::{Deserialize, Serialize};

/// 描画単位 (ページコンポーネント) への参照
/// 例: "src/pages/admin/dashboard.vue"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(pub String);

impl ComponentRef {
    pub fn new(value: impl Into<String>) -> Self {
        ComponentRef(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ディレクトリ構成から発見されたルートツリーのノード
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteNode {
    /// ルートのパスセグメント (例: "/admin", "dashboard", ""(index))
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// ルート名 (例: "/admin/dashboard")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,

    /// 子ルート (children) があれば再帰的に格納
    #[serde(default)]
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    /// path が空文字 (index ページ) かどうか
    pub fn is_index(&self) -> bool {
        self.path.as_deref() == Some("")
    }

    pub fn segment(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }
}

/// 子ルートのパスを親にどうマウントするか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildMount {
    /// 子のパスは親からの相対 (空の基準パスでフラット化したもの)
    #[default]
    Relative,
    /// 子のパスは親の基準パス込みでフラット化済み
    Absolute,
}

/// フラット化された 1 件のルート (絶対パス -> コンポーネント)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRoute {
    /// 正規化済みの絶対パス
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FlatRoute>,

    /// children のマウント方法 (ルーターには渡さない)
    #[serde(skip)]
    pub child_mount: ChildMount,
}

impl FlatRoute {
    pub fn new(path: String, component: Option<ComponentRef>) -> Self {
        FlatRoute {
            path,
            name: None,
            component,
            redirect: None,
            children: Vec::new(),
            child_mount: ChildMount::Relative,
        }
    }
}

/// ルーターに渡す最終的なルートテーブル
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    pub routes: Vec<FlatRoute>,
}
