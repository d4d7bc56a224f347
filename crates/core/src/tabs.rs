use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::file_ref::FileRef;
use crate::naming::{auto_name, infer_tab_name, is_auto_name};
use crate::observe::{Subscribers, SubscriptionId};

static NEXT_TAB_ID: AtomicU64 = AtomicU64::new(1);

/// 分頁的不透明識別碼。 / Opaque tab identifier, unique for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    fn generate() -> Self {
        let id = NEXT_TAB_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("{id:016x}"))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 單一分頁：名稱與有序的檔案清單。 / A named, ordered collection of file references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: TabId,
    pub name: String,
    pub files: Vec<FileRef>,
}

impl Tab {
    fn new(id: TabId, name: String) -> Self {
        Self {
            id,
            name,
            files: Vec::new(),
        }
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.files.iter().any(|file| file.path == path)
    }

    /// 名稱是否仍為自動產生。 / Whether the tab still carries a generated name.
    pub fn has_auto_name(&self) -> bool {
        is_auto_name(&self.name)
    }

    pub fn total_chars(&self) -> usize {
        self.files.iter().map(|file| file.char_count).sum()
    }
}

/// 分頁移動方向。 / Direction for `move_tab`; `Left` is toward index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Left,
    Right,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown move direction `{0}` (expected `left` or `right`)")]
pub struct ParseDirectionError(String);

impl FromStr for MoveDirection {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// 工作區的完整快照。 / One immutable snapshot of the whole workspace.
///
/// `tabs` is never empty and `active_tab_id` always names one of them; every
/// transition below preserves both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceState {
    tabs: Vec<Tab>,
    active_tab_id: TabId,
}

impl WorkspaceState {
    fn initial() -> Self {
        let id = TabId::generate();
        Self {
            tabs: vec![Tab::new(id.clone(), auto_name(1))],
            active_tab_id: id,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab_id(&self) -> &TabId {
        &self.active_tab_id
    }

    /// 目前啟用的分頁。 / The tab currently in focus.
    pub fn active_tab(&self) -> &Tab {
        self.tab(&self.active_tab_id)
            .unwrap_or_else(|| &self.tabs[0])
    }

    pub fn tab(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == *id)
    }

    pub fn position(&self, id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == *id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// 快照是否符合所有不變量。 / Checks the structural invariants of the snapshot.
    pub fn is_consistent(&self) -> bool {
        !self.tabs.is_empty() && self.tab(&self.active_tab_id).is_some()
    }

    fn with_tab_added(&self, id: TabId) -> Self {
        let mut tabs = self.tabs.clone();
        tabs.push(Tab::new(id.clone(), auto_name(self.tabs.len() + 1)));
        Self {
            tabs,
            active_tab_id: id,
        }
    }

    fn without_tab(&self, id: &TabId) -> Option<Self> {
        if self.tabs.len() <= 1 {
            return None;
        }
        let index = self.position(id)?;
        let mut tabs = self.tabs.clone();
        tabs.remove(index);
        // Previous neighbour takes focus; the first tab hands it to the new first.
        let active_tab_id = if self.active_tab_id == *id {
            tabs[index.saturating_sub(1)].id.clone()
        } else {
            self.active_tab_id.clone()
        };
        Some(Self {
            tabs,
            active_tab_id,
        })
    }

    fn with_active(&self, id: &TabId) -> Option<Self> {
        if self.active_tab_id == *id || self.position(id).is_none() {
            return None;
        }
        Some(Self {
            tabs: self.tabs.clone(),
            active_tab_id: id.clone(),
        })
    }

    fn with_files_added(&self, id: &TabId, incoming: &[FileRef]) -> Option<Self> {
        let index = self.position(id)?;
        let fresh = unseen_files(&self.tabs[index].files, incoming);
        if fresh.is_empty() {
            return None;
        }

        let mut next = self.clone();
        let tab = &mut next.tabs[index];
        if tab.files.is_empty() && tab.has_auto_name() {
            if let Some(name) = infer_tab_name(&fresh) {
                debug!("auto-naming tab {} from {:?} to {:?}", tab.id, tab.name, name);
                tab.name = name;
            }
        }
        tab.files.extend(fresh);
        Some(next)
    }

    fn with_file_removed(&self, id: &TabId, path: &str) -> Option<Self> {
        let index = self.position(id)?;
        if !self.tabs[index].contains_path(path) {
            return None;
        }
        let mut next = self.clone();
        next.tabs[index].files.retain(|file| file.path != path);
        Some(next)
    }

    fn with_files_replaced(&self, id: &TabId, files: Vec<FileRef>) -> Option<Self> {
        let index = self.position(id)?;
        if self.tabs[index].files == files {
            return None;
        }
        let mut next = self.clone();
        next.tabs[index].files = files;
        Some(next)
    }

    fn with_name(&self, id: &TabId, name: String) -> Option<Self> {
        let index = self.position(id)?;
        if self.tabs[index].name == name {
            return None;
        }
        let mut next = self.clone();
        next.tabs[index].name = name;
        Some(next)
    }

    fn with_tab_moved(&self, id: &TabId, direction: MoveDirection) -> Option<Self> {
        let index = self.position(id)?;
        let neighbour = match direction {
            MoveDirection::Left => index.checked_sub(1)?,
            MoveDirection::Right => Some(index + 1).filter(|next| *next < self.tabs.len())?,
        };
        let mut next = self.clone();
        next.tabs.swap(index, neighbour);
        Some(next)
    }

    fn with_tabs_united(&self, target_id: &TabId, source_id: &TabId) -> Option<Self> {
        let source = self.tab(source_id)?;
        let target_index = self.position(target_id)?;
        let fresh = unseen_files(&self.tabs[target_index].files, &source.files);
        if fresh.is_empty() {
            return None;
        }
        let mut next = self.clone();
        next.tabs[target_index].files.extend(fresh);
        Some(next)
    }

    fn with_tabs_reordered(&self, from_id: &TabId, to_id: &TabId) -> Option<Self> {
        let from = self.position(from_id)?;
        let to = self.position(to_id)?;
        if from == to {
            return None;
        }
        let mut next = self.clone();
        let moved = next.tabs.remove(from);
        next.tabs.insert(to, moved);
        Some(next)
    }
}

/// Copies the entries of `incoming` whose path is neither in `existing` nor
/// earlier in `incoming`, keeping their relative order.
fn unseen_files(existing: &[FileRef], incoming: &[FileRef]) -> Vec<FileRef> {
    let mut seen: HashSet<&str> = existing.iter().map(|file| file.path.as_str()).collect();
    incoming
        .iter()
        .filter(|file| seen.insert(file.path.as_str()))
        .cloned()
        .collect()
}

/// 分頁工作區的狀態容器。 / Single-writer container for the tab workspace.
///
/// Each operation computes a fresh snapshot from the current one and installs
/// it whole, then notifies every subscriber. Unknown ids and boundary moves are
/// no-ops: the unchanged snapshot is still published and the call returns
/// `false`. `true` means a new snapshot was installed.
#[derive(Debug)]
pub struct WorkspaceStore {
    state: Arc<WorkspaceState>,
    subscribers: Subscribers<Arc<WorkspaceState>>,
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceStore {
    /// 建立只含 "Tab 1" 的工作區。 / Creates a workspace holding a single empty "Tab 1".
    pub fn new() -> Self {
        Self {
            state: Arc::new(WorkspaceState::initial()),
            subscribers: Subscribers::new(),
        }
    }

    /// 取得目前快照的共享參照。 / Returns a shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<WorkspaceState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn tabs(&self) -> &[Tab] {
        self.state.tabs()
    }

    pub fn active_tab_id(&self) -> &TabId {
        self.state.active_tab_id()
    }

    pub fn active_tab(&self) -> &Tab {
        self.state.active_tab()
    }

    pub fn tab(&self, id: &TabId) -> Option<&Tab> {
        self.state.tab(id)
    }

    /// 訂閱快照；註冊時立即收到目前狀態。 / Subscribes to snapshots, starting with the current one.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Arc<WorkspaceState>) + 'static,
    {
        self.subscribers.subscribe(&self.state, observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// 新增分頁並設為啟用。 / Appends a new auto-named tab and focuses it.
    pub fn add_tab(&mut self) -> TabId {
        let id = TabId::generate();
        let next = self.state.with_tab_added(id.clone());
        self.install("add_tab", Some(next));
        id
    }

    /// 關閉分頁；最後一個分頁不會被關閉。 / Closes a tab; the last remaining tab is kept.
    pub fn close_tab(&mut self, id: &TabId) -> bool {
        let next = self.state.without_tab(id);
        self.install("close_tab", next)
    }

    pub fn set_active_tab(&mut self, id: &TabId) -> bool {
        let next = self.state.with_active(id);
        self.install("set_active_tab", next)
    }

    /// 加入檔案並依路徑去除重複。 / Appends files not already present by path.
    ///
    /// An empty tab that still has a generated name is renamed after the
    /// added files (see [`infer_tab_name`]).
    pub fn add_files_to_tab(&mut self, id: &TabId, files: &[FileRef]) -> bool {
        let next = self.state.with_files_added(id, files);
        self.install("add_files_to_tab", next)
    }

    pub fn remove_file_from_tab(&mut self, id: &TabId, path: &str) -> bool {
        let next = self.state.with_file_removed(id, path);
        self.install("remove_file_from_tab", next)
    }

    /// 整批取代檔案清單。 / Replaces the tab's file list verbatim.
    ///
    /// Bulk replace does not deduplicate by path, unlike
    /// [`add_files_to_tab`](Self::add_files_to_tab) and
    /// [`unite_tabs`](Self::unite_tabs); the caller owns uniqueness here.
    pub fn set_files_for_tab(&mut self, id: &TabId, files: Vec<FileRef>) -> bool {
        let next = self.state.with_files_replaced(id, files);
        self.install("set_files_for_tab", next)
    }

    pub fn rename_tab(&mut self, id: &TabId, name: impl Into<String>) -> bool {
        let next = self.state.with_name(id, name.into());
        self.install("rename_tab", next)
    }

    pub fn move_tab(&mut self, id: &TabId, direction: MoveDirection) -> bool {
        let next = self.state.with_tab_moved(id, direction);
        self.install("move_tab", next)
    }

    /// 將來源分頁的檔案複製併入目標。 / Copies the source tab's new files into the target.
    ///
    /// The source tab stays open and unchanged.
    pub fn unite_tabs(&mut self, target_id: &TabId, source_id: &TabId) -> bool {
        let next = self.state.with_tabs_united(target_id, source_id);
        self.install("unite_tabs", next)
    }

    /// 將分頁移到另一分頁原本的位置。 / Moves `from_id` to the index `to_id` occupies.
    pub fn reorder_tabs(&mut self, from_id: &TabId, to_id: &TabId) -> bool {
        let next = self.state.with_tabs_reordered(from_id, to_id);
        self.install("reorder_tabs", next)
    }

    fn install(&mut self, operation: &str, next: Option<WorkspaceState>) -> bool {
        let changed = match next {
            Some(state) => {
                debug_assert!(state.is_consistent());
                debug!(
                    "{operation}: {} tab(s), active {}",
                    state.len(),
                    state.active_tab_id()
                );
                self.state = Arc::new(state);
                true
            }
            None => {
                debug!("{operation}: no-op");
                false
            }
        };
        self.subscribers.notify(&self.state);
        changed
    }
}
