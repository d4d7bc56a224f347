//! Tab and file collection engine for TextMerger workspaces.
//! TextMerger 工作區的分頁與檔案集合核心。

pub mod file_ref;
pub mod naming;
pub mod observe;
pub mod tabs;

pub use file_ref::FileRef;
pub use naming::{auto_name, infer_tab_name, is_auto_name, AUTO_NAME_PREFIX};
pub use observe::{Subscribers, SubscriptionId};
pub use tabs::{
    MoveDirection, ParseDirectionError, Tab, TabId, WorkspaceState, WorkspaceStore,
};
