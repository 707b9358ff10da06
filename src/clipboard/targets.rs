//! 剪贴板目标（格式）表
//!
//! # 设计思路
//!
//! 每个目标由“MIME / 原子名”与一个 `info` 编号组成，`info` 标识该目标属于哪一类数据。
//! 宿主在请求数据时只回传 `info`，所有者据此决定提供哪一份数据。
//!
//! # 实现思路
//!
//! - 文本目标沿用 X11 / freedesktop 常见的一组名字，统一以 UTF-8 提供。
//! - URI 列表目标固定为 `text/uri-list`。
//! - 图片目标由导出配置决定，每种可写出的图片类型一个条目。

/// URI 列表目标。
pub const MIME_URI_LIST: &str = "text/uri-list";

/// 文本类目标，顺序即优先级。
const TEXT_TARGETS: &[&str] = &[
    "UTF8_STRING",
    "text/plain;charset=utf-8",
    "text/plain",
    "TEXT",
    "STRING",
];

/// 目标所属的数据类别，数值即注册时的 `info`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Pixbuf = 0,
    Text = 1,
    Uri = 2,
    Xmp = 3,
}

impl TargetKind {
    pub fn info(self) -> u32 {
        self as u32
    }

    pub fn from_info(info: u32) -> Option<Self> {
        match info {
            0 => Some(Self::Pixbuf),
            1 => Some(Self::Text),
            2 => Some(Self::Uri),
            3 => Some(Self::Xmp),
            _ => None,
        }
    }
}

/// 单个注册目标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub target: String,
    pub info: u32,
}

impl TargetEntry {
    pub fn new(target: impl Into<String>, info: u32) -> Self {
        Self {
            target: target.into(),
            info,
        }
    }
}

/// 有序且不重复的目标列表。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    entries: Vec<TargetEntry>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加单个目标；同名目标已存在时忽略。
    pub fn add(&mut self, target: &str, info: u32) {
        if self.contains(target) {
            return;
        }
        self.entries.push(TargetEntry::new(target, info));
    }

    pub fn add_image_targets<S: AsRef<str>>(&mut self, mime_types: &[S], info: u32) {
        for mime in mime_types {
            self.add(mime.as_ref(), info);
        }
    }

    pub fn add_text_targets(&mut self, info: u32) {
        for target in TEXT_TARGETS.iter() {
            self.add(target, info);
        }
    }

    pub fn add_uri_targets(&mut self, info: u32) {
        self.add(MIME_URI_LIST, info);
    }

    pub fn contains(&self, target: &str) -> bool {
        self.find(target).is_some()
    }

    pub fn find(&self, target: &str) -> Option<&TargetEntry> {
        self.entries
            .iter()
            .find(|e| e.target.eq_ignore_ascii_case(target))
    }

    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<TargetEntry> {
        self.entries
    }
}

/// 目标名是否属于文本类。
pub fn is_text_target(target: &str) -> bool {
    TEXT_TARGETS.iter().any(|t| t.eq_ignore_ascii_case(target))
        || target.to_ascii_lowercase().starts_with("text/plain")
}

/// 目标名是否是图片 MIME 类型。
pub fn is_image_target(target: &str) -> bool {
    target.to_ascii_lowercase().starts_with("image/")
}

/// 全部文本目标名，按优先级排列。
pub fn text_targets() -> &'static [&'static str] {
    TEXT_TARGETS
}
