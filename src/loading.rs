// src/loading.rs
//! ページ遷移とリクエストのローディング表示状態。
//!
//! グローバルなストアではなく、ルーターのフックに明示的に渡すコンテキストとして扱う。
//! 遷移ごとのタイマーは中断可能で、新しい遷移が始まると前の遷移の非表示タイマーは取り消される。
//! tokio ランタイムの中で呼び出すこと。

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// 表示層に渡すローディング状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadingState {
    /// ページ遷移中か
    pub navigating: bool,
    /// 完了していないリクエスト数
    pub pending_requests: u32,
    pub text: String,
    pub show_progress: bool,
}

impl LoadingState {
    pub fn is_active(&self) -> bool {
        self.navigating || self.pending_requests > 0
    }
}

#[derive(Debug, Clone)]
pub struct LoadingOptions {
    /// 遷移開始から表示までの遅延
    pub show_delay: Duration,
    /// 遷移完了から非表示までの遅延
    pub hide_delay: Duration,
    pub navigation_text: String,
    pub request_text: String,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        LoadingOptions {
            show_delay: Duration::ZERO,
            hide_delay: Duration::from_millis(800),
            navigation_text: "page loading".to_string(),
            request_text: "requesting...".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Timers {
    /// before_navigate のたびに進む。古い世代のコールバックは何もしない
    generation: u64,
    /// 現在の世代の非表示が適用済みか。適用後に遅れて届いた表示は捨てる
    settled: bool,
    pending_show: Option<JoinHandle<()>>,
    pending_hide: Option<JoinHandle<()>>,
}

impl Timers {
    fn cancel_all(&mut self) {
        for handle in [self.pending_show.take(), self.pending_hide.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: watch::Sender<LoadingState>,
    timers: Mutex<Timers>,
}

impl Inner {
    fn timers(&self) -> MutexGuard<'_, Timers> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 世代が最新で、まだ非表示が適用されていないときだけ表示する
    fn apply_show(&self, generation: u64, f: impl FnOnce(&mut LoadingState)) {
        let timers = self.timers();
        if timers.generation != generation {
            trace!("古い世代の表示を無視: {} (現在 {})", generation, timers.generation);
            return;
        }
        if timers.settled {
            trace!("非表示の後に届いた表示を無視 (世代 {})", generation);
            return;
        }
        self.state.send_modify(f);
    }

    /// 世代が最新のときだけ非表示にし、同じ世代の表示予約も取り消す
    fn apply_hide(&self, generation: u64) {
        let mut timers = self.timers();
        if timers.generation != generation {
            trace!("古い世代の非表示を無視: {} (現在 {})", generation, timers.generation);
            return;
        }
        timers.settled = true;
        if let Some(show) = timers.pending_show.take() {
            show.abort();
        }
        self.state.send_modify(|state| state.navigating = false);
    }
}

/// ローディング表示のコンテキスト。Clone しても同じ状態を共有する。
#[derive(Debug, Clone)]
pub struct NavigationLoading {
    inner: Arc<Inner>,
    options: Arc<LoadingOptions>,
}

impl NavigationLoading {
    pub fn new(options: LoadingOptions) -> Self {
        let initial = LoadingState {
            navigating: false,
            pending_requests: 0,
            text: options.navigation_text.clone(),
            show_progress: true,
        };
        let (state, _) = watch::channel(initial);
        NavigationLoading {
            inner: Arc::new(Inner {
                state,
                timers: Mutex::new(Timers::default()),
            }),
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &LoadingOptions {
        &self.options
    }

    pub fn snapshot(&self) -> LoadingState {
        self.inner.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().is_active()
    }

    /// 表示層向けの購読ハンドル
    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.inner.state.subscribe()
    }

    /// 遷移開始。別ページへの遷移なら前の遷移のタイマーを取り消し、表示を予約する。
    /// 予約した場合は true。
    pub fn before_navigate(&self, to: &str, from: &str) -> bool {
        if to == from {
            return false;
        }

        let mut timers = self.inner.timers();
        timers.cancel_all();
        timers.generation += 1;
        timers.settled = false;
        let generation = timers.generation;

        let inner = Arc::clone(&self.inner);
        let delay = self.options.show_delay;
        let text = self.options.navigation_text.clone();
        timers.pending_show = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.apply_show(generation, |state| {
                state.navigating = true;
                state.text = text;
                state.show_progress = true;
            });
        }));

        debug!("遷移開始 {} -> {} (世代 {})", from, to, generation);
        true
    }

    /// 遷移完了。別ページへの遷移なら `hide_delay` 後の非表示を予約する。
    /// その前に次の遷移が始まった場合、この非表示は実行されない。
    /// 非表示が先に適用された場合、同じ遷移の表示はもう行われない。
    pub fn after_navigate(&self, to: &str, from: &str) -> bool {
        if to == from {
            return false;
        }

        let mut timers = self.inner.timers();
        if let Some(previous) = timers.pending_hide.take() {
            previous.abort();
        }
        let generation = timers.generation;

        let inner = Arc::clone(&self.inner);
        let delay = self.options.hide_delay;
        timers.pending_hide = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.apply_hide(generation);
        }));

        debug!("遷移完了 {} -> {} (世代 {})", from, to, generation);
        true
    }

    /// リクエスト開始。件数を増やして表示する
    pub fn begin_request(&self, text: Option<&str>) {
        let text = text.unwrap_or(&self.options.request_text).to_string();
        self.inner.state.send_modify(|state| {
            state.pending_requests += 1;
            state.text = text;
        });
    }

    /// リクエスト完了。すべて完了したときだけ非表示になる (件数は 0 未満にならない)
    pub fn end_request(&self) {
        self.inner.state.send_modify(|state| {
            state.pending_requests = state.pending_requests.saturating_sub(1);
        });
    }

    /// エラー時などの強制非表示。予約済みのタイマーもすべて取り消す
    pub fn force_hide(&self) {
        let mut timers = self.inner.timers();
        timers.cancel_all();
        timers.generation += 1;
        self.inner.state.send_modify(|state| {
            state.navigating = false;
            state.pending_requests = 0;
        });
    }

    pub fn set_text(&self, text: &str) {
        self.inner.state.send_modify(|state| state.text = text.to_string());
    }
}
