//! 配置重载通知令牌
//!
//! [`ReloadToken`] 是一次性信号：创建时未触发，[`ReloadToken::on_reload`] 之后永久处于已触发
//! 状态。持有者在观察到一次触发后必须重新获取新的令牌才能继续监听下一次重载。

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

type ChangeCallback = Box<dyn FnOnce() + Send + 'static>;

/// 配置重载令牌
///
/// 克隆得到的是同一个令牌的句柄；只有同一实例的句柄才相等。
#[derive(Clone)]
pub struct ReloadToken {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    state: Mutex<TokenState>,
}

#[derive(Default)]
struct TokenState {
    signaled: bool,
    next_id: u64,
    callbacks: Vec<(u64, ChangeCallback)>,
}

impl ReloadToken {
    /// 创建新的未触发令牌
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                state: Mutex::new(TokenState::default()),
            }),
        }
    }

    /// 令牌是否已触发
    pub fn has_changed(&self) -> bool {
        self.inner.state.lock().signaled
    }

    /// 是否会主动调用已注册的回调
    pub fn active_change_callbacks(&self) -> bool {
        true
    }

    /// 注册变更回调
    ///
    /// 回调在令牌触发时按注册顺序同步调用一次。令牌已触发后再注册的回调永远不会被调用。
    pub fn register_change_callback<F>(&self, callback: F) -> CallbackRegistration
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.signaled {
            return CallbackRegistration::empty();
        }

        let id = state.next_id;
        state.next_id += 1;
        state.callbacks.push((id, Box::new(callback)));

        CallbackRegistration {
            token: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// 触发令牌
    ///
    /// 只有第一次调用生效，之后的调用不做任何事。回调在锁外执行。
    pub fn on_reload(&self) {
        let callbacks = {
            let mut state = self.inner.state.lock();
            if state.signaled {
                return;
            }
            state.signaled = true;
            std::mem::take(&mut state.callbacks)
        };

        debug!("重载令牌已触发，调用 {} 个回调", callbacks.len());
        for (_, callback) in callbacks {
            callback();
        }
    }
}

impl Default for ReloadToken {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ReloadToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ReloadToken {}

impl fmt::Debug for ReloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ReloadToken")
            .field("has_changed", &state.signaled)
            .field("callbacks", &state.callbacks.len())
            .finish()
    }
}

/// 回调注册句柄
///
/// 调用 [`CallbackRegistration::dispose`] 注销回调，可重复调用。丢弃句柄不会注销回调。
#[derive(Debug)]
pub struct CallbackRegistration {
    token: Weak<TokenInner>,
    id: u64,
}

impl CallbackRegistration {
    fn empty() -> Self {
        Self {
            token: Weak::new(),
            id: 0,
        }
    }

    /// 注销回调
    pub fn dispose(&self) {
        if let Some(token) = self.token.upgrade() {
            token
                .state
                .lock()
                .callbacks
                .retain(|(id, _)| *id != self.id);
        }
    }
}
