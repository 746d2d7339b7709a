// src/discovery.rs
//! pages/ ディレクトリを走査して RouteNode ツリーを作る。
//!
//! 規約:
//! - `.vue` ファイルのみがページ
//! - `index.vue` は index ページ (ネスト時は空文字 path、トップレベルでは `/`)
//! - `foo.vue` と `foo/` が並んでいる場合は 1 つのノード (レイアウト + 子ルート) にまとめる
//! - `[id]` は `:id`、`[...all]` は `:all(.*)*`

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::model::{ComponentRef, RouteNode};

const PAGE_EXTENSION: &str = "vue";

/// 走査中に組み立てる中間ノード (キーはファイル名の stem / ディレクトリ名)
#[derive(Debug, Default)]
struct PendingNode {
    key: String,
    name: Option<String>,
    component: Option<ComponentRef>,
    children: Vec<PendingNode>,
}

impl PendingNode {
    fn child_mut(&mut self, key: &str) -> &mut PendingNode {
        let pos = match self.children.iter().position(|c| c.key == key) {
            Some(pos) => pos,
            None => {
                self.children.push(PendingNode {
                    key: key.to_string(),
                    ..Default::default()
                });
                self.children.len() - 1
            }
        };
        &mut self.children[pos]
    }

    fn into_route(self, top_level: bool, file_hint: &Path) -> Result<RouteNode> {
        let segment = if self.key == "index" {
            String::new()
        } else {
            segment_from_name(&self.key).ok_or_else(|| Error::InvalidPageName(file_hint.join(&self.key)))?
        };
        let path = if top_level { format!("/{segment}") } else { segment };

        let children = self
            .children
            .into_iter()
            .map(|c| c.into_route(false, file_hint))
            .collect::<Result<Vec<_>>>()?;

        Ok(RouteNode {
            path: Some(path),
            name: self.name,
            component: self.component,
            children,
        })
    }
}

/// ファイル名 (拡張子なし) をルートのパスセグメントに変換する。
/// 角括弧が閉じていない・空の場合は None。
pub fn segment_from_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find(']')?;
        let param = &after[..end];
        match param.strip_prefix("...") {
            Some(catch_all) if !catch_all.is_empty() => {
                out.push(':');
                out.push_str(catch_all);
                out.push_str("(.*)*");
            }
            None if !param.is_empty() => {
                out.push(':');
                out.push_str(param);
            }
            _ => return None,
        }
        rest = &after[end + 1..];
    }
    if rest.contains(']') {
        return None;
    }
    out.push_str(rest);
    Some(out)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map_or(false, |s| s.starts_with('.'))
}

/// `project_root` 基準の `/` 区切りパスを返す (配下にない場合はそのまま)
fn component_ref(file: &Path, project_root: &Path) -> ComponentRef {
    let rel = file.strip_prefix(project_root).unwrap_or(file);
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    ComponentRef(joined)
}

/// pages ディレクトリを再帰的に走査してルートツリーを返す
pub fn discover_routes(pages_dir: &Path, project_root: &Path) -> Result<Vec<RouteNode>> {
    if !pages_dir.is_dir() {
        return Err(Error::NotFound {
            what: "pages ディレクトリ",
            root: pages_dir.to_path_buf(),
        });
    }

    let mut root = PendingNode::default();
    let mut page_count = 0usize;

    for entry in WalkDir::new(pages_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().map_or(true, |ext| ext != PAGE_EXTENSION)
        {
            continue;
        }

        let rel = path
            .strip_prefix(pages_dir)
            .map_err(|_| Error::InvalidPageName(path.to_path_buf()))?;
        let mut keys: Vec<String> = Vec::new();
        for component in rel.parent().into_iter().flat_map(|p| p.components()) {
            keys.push(component.as_os_str().to_string_lossy().into_owned());
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidPageName(path.to_path_buf()))?;
        keys.push(stem.to_string());

        // ルート名: index は空文字として "/" で連結 (例: "/admin/", "/admin/dashboard")
        let route_name = format!(
            "/{}",
            keys.iter()
                .map(|k| if k == "index" { "" } else { k.as_str() })
                .collect::<Vec<_>>()
                .join("/")
        );

        let mut node = &mut root;
        for key in &keys {
            node = node.child_mut(key);
        }
        node.component = Some(component_ref(path, project_root));
        node.name = Some(route_name);
        page_count += 1;
        debug!("ページ発見: {:?}", rel);
    }

    info!("{} 件のページを発見しました: {:?}", page_count, pages_dir);

    root.children
        .into_iter()
        .map(|c| c.into_route(true, pages_dir))
        .collect()
}

/// 外部の探索ツールが出力した JSON からルートツリーを読み込む
pub fn load_route_tree(json: &str, source_name: &str) -> Result<Vec<RouteNode>> {
    serde_json::from_str(json).map_err(|e| Error::MalformedTree {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

pub fn load_route_tree_file(path: &Path) -> Result<Vec<RouteNode>> {
    let json = fs::read_to_string(path)?;
    load_route_tree(&json, &path.display().to_string())
}
