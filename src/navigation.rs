// src/navigation.rs
use std::sync::Arc;

use tracing::{info, warn};

use crate::loading::NavigationLoading;
use crate::model::RouteTable;

/// ルーターの前後フック
pub trait NavigationHook: Send + Sync {
    fn before_navigate(&self, to: &str, from: &str);
    fn after_navigate(&self, to: &str, from: &str);
}

impl NavigationHook for NavigationLoading {
    fn before_navigate(&self, to: &str, from: &str) {
        NavigationLoading::before_navigate(self, to, from);
    }

    fn after_navigate(&self, to: &str, from: &str) {
        NavigationLoading::after_navigate(self, to, from);
    }
}

/// 現在のパスを持ち、遷移のたびに登録済みのフックを呼ぶ
pub struct Navigator {
    current: String,
    table: Option<RouteTable>,
    hooks: Vec<Arc<dyn NavigationHook>>,
}

impl Navigator {
    pub fn new(start: impl Into<String>) -> Self {
        Navigator {
            current: start.into(),
            table: None,
            hooks: Vec::new(),
        }
    }

    /// 遷移先がテーブルに無いとき警告するためのルートテーブル
    pub fn with_table(mut self, table: RouteTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn register(&mut self, hook: Arc<dyn NavigationHook>) {
        self.hooks.push(hook);
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// `to` へ遷移する。before フック → 現在パス更新 → after フックの順
    pub fn push(&mut self, to: &str) {
        let from = std::mem::replace(&mut self.current, to.to_string());

        if let Some(table) = &self.table {
            if table.resolve(to).is_none() {
                warn!("遷移先 {} に対応するルートがありません", to);
            }
        }

        for hook in &self.hooks {
            hook.before_navigate(to, &from);
        }
        info!("遷移: {} -> {}", from, to);
        for hook in &self.hooks {
            hook.after_navigate(to, &from);
        }
    }
}
