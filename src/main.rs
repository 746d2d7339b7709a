// src/main.rs

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use vue_route_table::config::{EnvConfig, LogoRegistry, ServerConfig};
use vue_route_table::discovery::{discover_routes, load_route_tree_file};
use vue_route_table::menu::{parse_menu_config, DuplicatePolicy};
use vue_route_table::navigation::Navigator;
use vue_route_table::resolver::{resolve_menu_config, resolve_pages_dir};
use vue_route_table::{build_routes, LayoutOptions, LoadingOptions, NavigationLoading, RouteTable};

/// CLI 引数定義
#[derive(Parser, Debug)]
#[command(
    name = "vue-route-table",
    version,
    about = "pages ディレクトリからフラットなルートテーブルを組み立てて JSON 出力する CLI ツール"
)]
struct Cli {
    /// デバッグログを出力する
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ルートテーブルを JSON で出力する
    Routes {
        /// 解析対象のプロジェクトルート
        #[arg(short = 'r', long = "project-root", value_name = "DIR", default_value = ".")]
        project_root: PathBuf,

        /// pages ディレクトリ (省略時は src/pages, pages, src/views の順に探す)
        #[arg(long, value_name = "DIR")]
        pages: Option<PathBuf>,

        /// ディレクトリ走査の代わりに、外部ツールが出力したルートツリー JSON を読む
        #[arg(long, value_name = "FILE", conflicts_with = "pages")]
        tree: Option<PathBuf>,

        /// テーブルではなくマウント後のパス一覧を出力する
        #[arg(long)]
        mounted: bool,
    },

    /// メニュー設定を解析・検査して JSON で出力する
    Menu {
        #[arg(short = 'r', long = "project-root", value_name = "DIR", default_value = ".")]
        project_root: PathBuf,

        /// 設定モジュール (省略時は src/configs/index.ts など)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// ID の重複をエラーにせず警告にとどめる
        #[arg(long)]
        allow_duplicate_ids: bool,
    },

    /// VITE_* 環境変数から解決したサーバー設定を出力する
    Config {
        #[arg(short = 'r', long = "project-root", value_name = "DIR", default_value = ".")]
        project_root: PathBuf,

        /// ロゴ用アイコンのディレクトリ (省略時は src/components/icon)
        #[arg(long, value_name = "DIR")]
        icon_dir: Option<PathBuf>,

        #[command(flatten)]
        env: EnvConfig,
    },

    /// 遷移の列を再生してローディング表示の変化を出力する
    Simulate {
        /// 遷移先のパス (指定順に遷移する)
        #[arg(long = "path", value_name = "PATH", required = true)]
        paths: Vec<String>,

        /// 遷移の間隔 (ミリ秒)
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,

        /// 遷移完了から非表示までの遅延 (ミリ秒)
        #[arg(long, default_value_t = 800)]
        hide_delay_ms: u64,

        /// 指定するとルートテーブルに無い遷移先を警告する
        #[arg(short = 'r', long = "project-root", value_name = "DIR")]
        project_root: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct TimelineEvent {
    at_ms: u128,
    active: bool,
    navigating: bool,
    pending_requests: u32,
    text: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Routes {
            project_root,
            pages,
            tree,
            mounted,
        } => {
            let table = load_table(&project_root, pages.as_deref(), tree.as_deref())?;
            let json = if mounted {
                serde_json::to_string_pretty(&table.mounted_paths())?
            } else {
                serde_json::to_string_pretty(&table)?
            };
            println!("{}", json);
        }
        Command::Menu {
            project_root,
            config,
            allow_duplicate_ids,
        } => {
            let project_dir = project_root.canonicalize()?;
            let file = resolve_menu_config(&project_dir, config.as_deref())?;
            info!("解析中: {:?}", file);

            let menu = parse_menu_config(&file)?;
            let policy = if allow_duplicate_ids {
                DuplicatePolicy::Warn
            } else {
                DuplicatePolicy::Reject
            };
            menu.validate(policy)?;
            println!("{}", serde_json::to_string_pretty(&menu)?);
        }
        Command::Config {
            project_root,
            icon_dir,
            env,
        } => {
            let project_dir = project_root.canonicalize()?;
            let icon_dir = icon_dir.unwrap_or_else(|| project_dir.join("src/components/icon"));
            let logos = LogoRegistry::from_icon_dir(&icon_dir, &project_dir)?;
            let config = ServerConfig::resolve(&env, &logos)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Simulate {
            paths,
            interval_ms,
            hide_delay_ms,
            project_root,
        } => {
            let table = match project_root {
                Some(root) => Some(load_table(&root, None, None)?),
                None => None,
            };
            simulate(&paths, interval_ms, hide_delay_ms, table).await?;
        }
    }

    Ok(())
}

/// 起動処理: ルートツリーを取得してテーブルを一度だけ組み立てる
fn load_table(
    project_root: &Path,
    pages: Option<&Path>,
    tree: Option<&Path>,
) -> Result<RouteTable, Box<dyn std::error::Error>> {
    let project_dir = project_root.canonicalize()?; // 絶対化

    let discovered = match tree {
        Some(tree_file) => load_route_tree_file(&project_dir.join(tree_file))?,
        None => {
            let pages_dir = resolve_pages_dir(&project_dir, pages)?;
            info!("解析中: {:?}", pages_dir);
            discover_routes(&pages_dir, &project_dir)?
        }
    };

    Ok(build_routes(&discovered, &LayoutOptions::default()))
}

async fn simulate(
    paths: &[String],
    interval_ms: u64,
    hide_delay_ms: u64,
    table: Option<RouteTable>,
) -> Result<(), Box<dyn std::error::Error>> {
    let loading = NavigationLoading::new(LoadingOptions {
        hide_delay: Duration::from_millis(hide_delay_ms),
        ..Default::default()
    });

    let mut navigator = Navigator::new("/");
    if let Some(table) = table {
        navigator = navigator.with_table(table);
    }
    navigator.register(Arc::new(loading.clone()));

    let started = Instant::now();
    let mut rx = loading.subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let event = TimelineEvent {
                at_ms: started.elapsed().as_millis(),
                active: state.is_active(),
                navigating: state.navigating,
                pending_requests: state.pending_requests,
                text: state.text,
            };
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{}", line);
            }
        }
    });

    for path in paths {
        navigator.push(path);
        tokio::time::sleep(Duration::from_millis(interval_ms)).await;
    }

    // 最後の非表示タイマーが発火するまで待つ
    tokio::time::sleep(Duration::from_millis(hide_delay_ms) + Duration::from_millis(50)).await;
    watcher.abort();

    info!("最終状態: {:?}", loading.snapshot());
    Ok(())
}
