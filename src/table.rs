// src/table.rs
//! 発見済みのルートツリーから最終的なルートテーブルを組み立てる。
//! 一般ページ / admin 配下 / templates 配下の 3 グループに分け、
//! admin と templates にはそれぞれレイアウトコンポーネントを被せる。

use crate::flatten::{flatten_iter, normalize_path};
use crate::model::{ChildMount, ComponentRef, FlatRoute, RouteNode, RouteTable};
use tracing::{debug, warn};

/// レイアウト (母版) ルートの設定
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub admin_root: String,
    pub admin_layout: ComponentRef,
    pub admin_redirect: String,
    pub templates_root: String,
    /// templates 配下の子ルートをフラット化するときの基準パス
    pub templates_base: String,
    pub templates_layout: ComponentRef,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            admin_root: "/admin".to_string(),
            admin_layout: ComponentRef::new("src/pages/admin/index.vue"),
            admin_redirect: "/admin/dashboard".to_string(),
            templates_root: "/templates".to_string(),
            templates_base: "/templates/".to_string(),
            templates_layout: ComponentRef::new("src/pages/templates/index.vue"),
        }
    }
}

/// 起動時に一度だけ呼ばれ、ルーターに渡すテーブルを返す
pub fn build_routes(discovered: &[RouteNode], options: &LayoutOptions) -> RouteTable {
    let is_root = |node: &RouteNode, root: &str| node.path.as_deref() == Some(root);

    let mut routes = flatten_iter(
        discovered
            .iter()
            .filter(|&r| !is_root(r, &options.admin_root) && !is_root(r, &options.templates_root)),
        "",
    );

    let admin_children = discovered
        .iter()
        .find(|&r| is_root(r, &options.admin_root))
        .map(|root| flatten_iter(&root.children, ""))
        .unwrap_or_default();

    let templates_children = discovered
        .iter()
        .find(|&r| is_root(r, &options.templates_root))
        .map(|root| flatten_iter(&root.children, &options.templates_base))
        .unwrap_or_default();

    debug!(
        "ルート数: 一般 {} / admin {} / templates {}",
        routes.len(),
        admin_children.len(),
        templates_children.len()
    );

    routes.push(FlatRoute {
        redirect: Some(options.admin_redirect.clone()),
        children: admin_children,
        ..FlatRoute::new(
            normalize_path(&options.admin_root),
            Some(options.admin_layout.clone()),
        )
    });
    routes.push(FlatRoute {
        children: templates_children,
        child_mount: ChildMount::Absolute,
        ..FlatRoute::new(
            normalize_path(&options.templates_root),
            Some(options.templates_layout.clone()),
        )
    });

    let table = RouteTable { routes };

    let mounted = table.mounted_paths();
    if !mounted.iter().any(|p| p == &options.admin_redirect) {
        warn!(
            "admin のリダイレクト先 {} に対応するルートがありません",
            options.admin_redirect
        );
    }
    for (i, path) in mounted.iter().enumerate() {
        if mounted[..i].contains(path) {
            // 同じパスが複数ある場合は後から登録されたものがディスパッチ時に勝つ
            debug!("パスが重複しています: {}", path);
        }
    }

    table
}

/// 子ルートのパスを親の下にマウントしたときのパス。
/// Absolute の子 (templates のように基準パス込みでフラット化したもの) はそのまま使う。
fn mount_path(parent: &str, child: &str, mount: ChildMount) -> String {
    match mount {
        ChildMount::Absolute => child.to_string(),
        ChildMount::Relative => normalize_path(&format!("{parent}/{child}")),
    }
}

impl RouteTable {
    /// ディスパッチ可能な (マウント後のパス, ルート) の一覧を登録順で返す
    pub fn mounted(&self) -> Vec<(String, &FlatRoute)> {
        fn walk<'a>(
            routes: &'a [FlatRoute],
            parent: Option<(&str, ChildMount)>,
            out: &mut Vec<(String, &'a FlatRoute)>,
        ) {
            for route in routes {
                let path = match parent {
                    Some((parent, mount)) => mount_path(parent, &route.path, mount),
                    None => route.path.clone(),
                };
                out.push((path.clone(), route));
                walk(&route.children, Some((path.as_str(), route.child_mount)), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.routes, None, &mut out);
        out
    }

    pub fn mounted_paths(&self) -> Vec<String> {
        self.mounted().into_iter().map(|(path, _)| path).collect()
    }

    /// 完全一致でルートを引く。同じパスが複数ある場合は最後に登録されたもの。
    pub fn resolve(&self, path: &str) -> Option<&FlatRoute> {
        let wanted = normalize_path(path);
        self.mounted()
            .into_iter()
            .rev()
            .find(|(p, _)| *p == wanted)
            .map(|(_, route)| route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten_routes;
    use pretty_assertions::assert_eq;

    fn page(path: &str, component: &str) -> RouteNode {
        RouteNode {
            path: Some(path.to_string()),
            component: Some(ComponentRef::new(component)),
            ..Default::default()
        }
    }

    fn dir(path: &str, children: Vec<RouteNode>) -> RouteNode {
        RouteNode {
            path: Some(path.to_string()),
            children,
            ..Default::default()
        }
    }

    fn sample_tree() -> Vec<RouteNode> {
        vec![
            page("/", "Home"),
            dir(
                "/admin",
                vec![page("", "AdminIndex"), page("dashboard", "Dashboard"), page("log", "Log")],
            ),
            dir("/templates", vec![page("", "TplIndex"), page("card", "Card")]),
            dir("/user", vec![page("knowledge", "Knowledge"), page("stats", "Stats")]),
        ]
    }

    #[test]
    fn test_build_routes_groups_in_order() {
        let table = build_routes(&sample_tree(), &LayoutOptions::default());

        let top: Vec<&str> = table.routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            top,
            vec!["/", "/user/knowledge", "/user/stats", "/admin", "/templates"]
        );

        let admin = &table.routes[3];
        assert_eq!(admin.redirect.as_deref(), Some("/admin/dashboard"));
        assert_eq!(
            admin.component.as_ref().map(ComponentRef::as_str),
            Some("src/pages/admin/index.vue")
        );
        let admin_children: Vec<&str> = admin.children.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(admin_children, vec!["/", "/dashboard", "/log"]);

        let templates = &table.routes[4];
        assert_eq!(templates.redirect, None);
        let tpl_children: Vec<&str> = templates.children.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(tpl_children, vec!["/templates", "/templates/card"]);
    }

    #[test]
    fn test_missing_layout_roots_still_produce_layout_routes() {
        let table = build_routes(&[page("/about", "About")], &LayoutOptions::default());

        let top: Vec<&str> = table.routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(top, vec!["/about", "/admin", "/templates"]);
        assert!(table.routes[1].children.is_empty());
        assert!(table.routes[2].children.is_empty());
    }

    #[test]
    fn test_mounted_paths() {
        let table = build_routes(&sample_tree(), &LayoutOptions::default());

        assert_eq!(
            table.mounted_paths(),
            vec![
                "/",
                "/user/knowledge",
                "/user/stats",
                "/admin",
                "/admin",
                "/admin/dashboard",
                "/admin/log",
                "/templates",
                "/templates",
                "/templates/card",
            ]
        );
    }

    #[test]
    fn test_resolve_prefers_last_registered() {
        let table = build_routes(&sample_tree(), &LayoutOptions::default());

        let admin = table.resolve("/admin/").unwrap();
        assert_eq!(admin.component.as_ref().unwrap().as_str(), "AdminIndex");

        let dashboard = table.resolve("/admin/dashboard").unwrap();
        assert_eq!(dashboard.component.as_ref().unwrap().as_str(), "Dashboard");

        assert!(table.resolve("/nowhere").is_none());
    }

    #[test]
    fn test_paths_are_stable_when_flattened_again() {
        let table = build_routes(&sample_tree(), &LayoutOptions::default());

        let as_nodes: Vec<RouteNode> = table
            .routes
            .iter()
            .map(|r| RouteNode {
                path: Some(r.path.clone()),
                component: r.component.clone(),
                ..Default::default()
            })
            .collect();

        let again: Vec<String> = flatten_routes(&as_nodes, "")
            .into_iter()
            .map(|r| r.path)
            .collect();
        let original: Vec<String> = table.routes.iter().map(|r| r.path.clone()).collect();
        assert_eq!(again, original);
    }

    #[test]
    fn test_mount_path() {
        use ChildMount::{Absolute, Relative};
        assert_eq!(mount_path("/admin", "/", Relative), "/admin");
        assert_eq!(mount_path("/admin", "/dashboard", Relative), "/admin/dashboard");
        assert_eq!(mount_path("/admin", "/admin/users", Relative), "/admin/admin/users");
        assert_eq!(mount_path("/templates", "/templates/card", Absolute), "/templates/card");
        assert_eq!(mount_path("/templates", "/templates", Absolute), "/templates");
        assert_eq!(mount_path("/", "/x", Relative), "/x");
    }

    #[test]
    fn test_admin_subdirectory_named_like_root_is_mounted_under_admin() {
        let tree = vec![dir(
            "/admin",
            vec![
                page("dashboard", "Dashboard"),
                dir("admin", vec![page("users", "Users")]),
            ],
        )];
        let table = build_routes(&tree, &LayoutOptions::default());

        assert_eq!(
            table.mounted_paths(),
            vec!["/admin", "/admin/dashboard", "/admin/admin/users", "/templates"]
        );
        let users = table.resolve("/admin/admin/users").unwrap();
        assert_eq!(users.component.as_ref().unwrap().as_str(), "Users");
        assert!(table.resolve("/admin/users").is_none());
    }
}
