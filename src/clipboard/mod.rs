//! 剪贴板宿主抽象模块
//!
//! # 设计思路
//!
//! 剪贴板采用“所有权 + 延迟取数”协议：
//! - 所有者声明自己能提供哪些目标（`TargetEntry` 列表），并把自己交给宿主
//! - 其他程序粘贴时，宿主按目标回调 `ClipboardOwner::on_request` 取数据
//! - 被别的所有者取代或被清空时，宿主回调 `on_ownership_lost` 并释放引用
//!
//! # 实现思路
//!
//! - 全部操作在 UI 事件线程上同步完成，所以使用 `Rc` 而非 `Arc`。
//! - 宿主持有所有者的一个强引用，这是所有者在剪贴板期间存活的唯一保证。
//! - 子模块按职责拆分：目标表归 `targets`，数据载体归 `selection`，
//!   具体宿主实现归 `memory`（进程内）与 `desktop`（系统剪贴板）。

pub mod desktop;
pub mod memory;
pub mod selection;
pub mod targets;

use std::rc::Rc;

use crate::error::ClipboardError;
use crate::image_handler::ExportError;

pub use desktop::DesktopClipboard;
pub use memory::MemoryClipboard;
pub use selection::{Payload, SelectionData};
pub use targets::{TargetEntry, TargetKind, TargetList};

/// 剪贴板所有者回调。
pub trait ClipboardOwner {
    /// 宿主请求某个目标的数据，`info` 为注册时该目标携带的编号。
    fn on_request(&self, selection: &mut SelectionData, info: u32) -> Result<(), ExportError>;

    /// 所有权被取代或剪贴板被清空，每次注册至多调用一次。
    fn on_ownership_lost(&self);
}

/// 剪贴板宿主。
pub trait ClipboardHost {
    /// 以 `owner` 身份声明 `targets`。
    ///
    /// 成功时宿主持有 `owner`，并通知之前的所有者失去所有权；
    /// 失败时 `owner` 被直接丢弃。只做一次性写入的宿主（如 `DesktopClipboard`）
    /// 在写入后立即通知并释放 `owner`。
    fn set_with_owner(
        &self,
        targets: &[TargetEntry],
        owner: Rc<dyn ClipboardOwner>,
    ) -> Result<(), ClipboardError>;

    /// 清空剪贴板，通知并释放当前所有者。
    fn clear(&self);
}
