// src/flatten.rs
//! ネストしたルートツリーをフラットなルート一覧に変換する。
//!
//! - component を持つノード → そのノード自身を fullPath のルートとして残し、children も再帰的に処理
//! - component が無く children を持つノード →
//!     - path が空文字で component を持つ最初の子 (index) を fullPath のルートとして採用
//!     - 残りの子 (空文字 path のものは除く) を再帰的に処理
//! - component も children も無いノード → 無視
//!
//! index の子が持つ children は展開しない (index 自身のコンポーネントだけを fullPath に置く)。

use crate::model::{FlatRoute, RouteNode};

/// 連続する `/` を 1 つにまとめ、末尾の `/` を取り除いた絶対パスを返す。
/// 空になった場合はルート `/` を返す。
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if out.len() > 1 {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// `nodes` を入力順にフラット化する。`base_path` は親までのパス (例: "", "/templates/")。
pub fn flatten_routes(nodes: &[RouteNode], base_path: &str) -> Vec<FlatRoute> {
    flatten_iter(nodes, base_path)
}

/// 参照のイテレータを受け取る版 (フィルタ済みの一覧をそのまま渡せる)
pub fn flatten_iter<'a>(
    nodes: impl IntoIterator<Item = &'a RouteNode>,
    base_path: &str,
) -> Vec<FlatRoute> {
    let nodes: Vec<&RouteNode> = nodes.into_iter().collect();
    let mut out = Vec::new();
    flatten_into(&nodes, base_path, &mut out);
    out
}

fn flatten_into(nodes: &[&RouteNode], base_path: &str, out: &mut Vec<FlatRoute>) {
    for &node in nodes {
        let segment = node.segment();
        // 例: "" | "/user/" | "/templates/card/"
        let full_base = if segment.is_empty() {
            base_path.to_string()
        } else {
            format!("{base_path}{segment}/")
        };

        if let Some(component) = &node.component {
            // 親ルート (レイアウト) として自身を残し、その後ろに子ルートを並べる
            out.push(FlatRoute {
                name: node.name.clone(),
                ..FlatRoute::new(normalize_path(&full_base), Some(component.clone()))
            });
            if !node.children.is_empty() {
                let children: Vec<&RouteNode> = node.children.iter().collect();
                flatten_into(&children, &full_base, out);
            }
            continue;
        }

        if !node.children.is_empty() {
            let index_child = node
                .children
                .iter()
                .find(|c| c.is_index() && c.component.is_some());
            if let Some(index) = index_child {
                out.push(FlatRoute {
                    name: index.name.clone(),
                    ..FlatRoute::new(normalize_path(&full_base), index.component.clone())
                });
            }
            // index (空文字 path) は再帰の対象から外す
            let rest: Vec<&RouteNode> = node.children.iter().filter(|c| !c.is_index()).collect();
            flatten_into(&rest, &full_base, out);
        }

        // component も children も無いノードは捨てる
    }
}
