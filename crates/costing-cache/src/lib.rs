//! # Costing Cache
//!
//! 顯示層成本快照與失效追蹤
//!
//! 成本數字是推導值，引擎每次讀取都重算；此 crate 提供 CRUD 層
//! 用的顯示快照（列表頁不必每次走完整棵引用圖），並以髒標記
//! 與反向索引維持「進貨或配方一改，受影響的快照就失效」。
//! 引擎本身永不讀取這裡的快照。

pub mod dirty_tracking;
pub mod snapshot;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use snapshot::{CostSnapshotCache, ReverseIndex};
