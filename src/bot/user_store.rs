use std::{
    collections::{HashMap, HashSet},
    sync::RwLock,
};

/// 使用者基本資料，取自 Telegram 訊息的寄件者欄位
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: i64,
    pub full_name: String,
    pub username: Option<String>,
}

/// 使用者名冊。
///
/// 以明確的實例建立後傳入訊息處理流程，不放在模組層級的共享狀態，
/// 測試時每個案例注入乾淨的名冊即可。
/// 讀寫以 `RwLock` 保護；鎖取得失敗時以安全預設值降級，避免 panic。
#[derive(Default)]
pub struct UserStore {
    users: RwLock<HashMap<i64, UserProfile>>,
    active: RwLock<HashSet<i64>>,
}

impl UserStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// 登錄使用者，回傳是否為第一次出現
    pub fn register(&self, chat_id: i64, profile: UserProfile) -> bool {
        match self.users.write() {
            Ok(mut users) => users.insert(chat_id, profile).is_none(),
            Err(_) => false,
        }
    }

    /// 查詢成功後標記為活躍使用者
    pub fn mark_active(&self, chat_id: i64) {
        if let Ok(mut active) = self.active.write() {
            active.insert(chat_id);
        }
    }

    /// 登錄過的使用者數
    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    /// 全部使用者，依 chat id 排序輸出
    pub fn all(&self) -> Vec<(i64, UserProfile)> {
        let mut users = match self.users.read() {
            Ok(users) => users
                .iter()
                .map(|(chat_id, profile)| (*chat_id, profile.clone()))
                .collect::<Vec<_>>(),
            Err(_) => Vec::new(),
        };

        users.sort_by_key(|(chat_id, _)| *chat_id);
        users
    }

    /// 活躍使用者，名冊中查不到的 chat id 直接略過
    pub fn active(&self) -> Vec<(i64, UserProfile)> {
        let active_ids = match self.active.read() {
            Ok(active) => active.iter().copied().collect::<Vec<_>>(),
            Err(_) => Vec::new(),
        };

        let mut users = match self.users.read() {
            Ok(users) => active_ids
                .into_iter()
                .filter_map(|chat_id| {
                    users
                        .get(&chat_id)
                        .map(|profile| (chat_id, profile.clone()))
                })
                .collect::<Vec<_>>(),
            Err(_) => Vec::new(),
        };

        users.sort_by_key(|(chat_id, _)| *chat_id);
        users
    }
}
