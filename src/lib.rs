// src/lib.rs
//! ファイルベースの pages ツリーから Vue Router 向けのフラットなルートテーブルを組み立て、
//! メニュー設定とサーバー設定を検査し、遷移時のローディング表示を管理する。

pub mod config;
pub mod discovery;
pub mod error;
pub mod flatten;
pub mod loading;
pub mod menu;
pub mod model;
pub mod navigation;
pub mod parser;
pub mod resolver;
pub mod table;

pub use error::{Error, Result};
pub use flatten::{flatten_routes, normalize_path};
pub use loading::{LoadingOptions, LoadingState, NavigationLoading};
pub use model::{ChildMount, ComponentRef, FlatRoute, RouteNode, RouteTable};
pub use table::{build_routes, LayoutOptions};
