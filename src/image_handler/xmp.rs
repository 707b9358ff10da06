//! # XMP 元数据模块
//!
//! ## 设计思路
//!
//! 元数据导出是可选能力，由 cargo 特性 `xmp` 控制。
//! 关闭时处理器不会从来源读取元数据，其余代码路径完全一致（空对象语义），
//! 因此处理器本身不需要任何条件编译。
//!
//! ## 实现思路
//!
//! - `XmpDocument`：任何可序列化为 RDF/XML 的元数据都可以实现该 trait。
//! - `XmpPacket`：内置的属性模型，按 `x:xmpmeta → rdf:RDF → rdf:Description`
//!   结构输出，可选包裹 `<?xpacket?>`。
//! - `clipboard_document`：拼接 XML 声明头，生成剪贴板上的最终字节。

use std::fmt::Write as _;

/// 剪贴板中元数据目标的 MIME 类型。
pub const MIME_TYPE_XMP: &str = "application/rdf+xml";

/// 元数据文档前缀的 XML 声明。
pub const XMP_XML_HEADER: &str = "<?xml version='1.0' encoding='UTF-8'?>\n";

const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const XPACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

/// 当前构建是否启用了元数据导出。
pub const ENABLED: bool = cfg!(feature = "xmp");

/// 元数据序列化错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmpError {
    #[error("仅支持 UTF-8 编码输出")]
    UnsupportedEncoding,

    #[error("序列化失败：{0}")]
    Serialize(String),
}

/// 序列化选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// 省略 `<?xpacket?>` 包裹。
    pub omit_packet_wrapper: bool,
    /// 以 UTF-8 输出。
    pub encode_utf8: bool,
}

impl SerializeOptions {
    /// 剪贴板导出使用的选项：无包裹、UTF-8。
    pub const CLIPBOARD: Self = Self {
        omit_packet_wrapper: true,
        encode_utf8: true,
    };
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            omit_packet_wrapper: false,
            encode_utf8: true,
        }
    }
}

/// 可序列化为 RDF/XML 的元数据。
pub trait XmpDocument {
    fn serialize(&self, options: SerializeOptions) -> Result<String, XmpError>;
}

/// 单个简单属性。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpProperty {
    pub namespace: String,
    pub prefix: String,
    pub name: String,
    pub value: String,
}

/// 内存中的 XMP 属性集合。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmpPacket {
    properties: Vec<XmpProperty>,
}

impl XmpPacket {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置属性；同一命名空间下的同名属性会被覆盖。
    pub fn set_property(
        &mut self,
        namespace: &str,
        prefix: &str,
        name: &str,
        value: impl Into<String>,
    ) {
        let value = value.into();
        if let Some(existing) = self
            .properties
            .iter_mut()
            .find(|p| p.namespace == namespace && p.name == name)
        {
            existing.value = value;
            return;
        }
        self.properties.push(XmpProperty {
            namespace: namespace.to_string(),
            prefix: prefix.to_string(),
            name: name.to_string(),
            value,
        });
    }

    pub fn property(&self, namespace: &str, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.namespace == namespace && p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn properties(&self) -> &[XmpProperty] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// 按首次出现顺序列出 (前缀, 命名空间)，同一命名空间只声明一次。
    fn namespaces(&self) -> Result<Vec<(&str, &str)>, XmpError> {
        let mut declared: Vec<(&str, &str)> = Vec::new();
        for p in &self.properties {
            if !is_xml_name(&p.prefix) || !is_xml_name(&p.name) {
                return Err(XmpError::Serialize(format!(
                    "非法的属性名：{}:{}",
                    p.prefix, p.name
                )));
            }
            if !is_xml_text(&p.namespace) || !is_xml_text(&p.value) {
                return Err(XmpError::Serialize(format!(
                    "属性 {}:{} 含有 XML 不允许的字符",
                    p.prefix, p.name
                )));
            }
            let bound_prefix = declared
                .iter()
                .find(|(_, ns)| *ns == p.namespace)
                .map(|(prefix, _)| *prefix);
            match bound_prefix {
                Some(prefix) if prefix != p.prefix => {
                    return Err(XmpError::Serialize(format!(
                        "命名空间 {} 的前缀冲突：{} / {}",
                        p.namespace, prefix, p.prefix
                    )));
                }
                Some(_) => {}
                None => {
                    if declared.iter().any(|(prefix, _)| *prefix == p.prefix) {
                        return Err(XmpError::Serialize(format!(
                            "前缀 {} 被绑定到多个命名空间",
                            p.prefix
                        )));
                    }
                    declared.push((p.prefix.as_str(), p.namespace.as_str()));
                }
            }
        }
        Ok(declared)
    }
}

impl XmpDocument for XmpPacket {
    fn serialize(&self, options: SerializeOptions) -> Result<String, XmpError> {
        if !options.encode_utf8 {
            return Err(XmpError::UnsupportedEncoding);
        }

        let namespaces = self.namespaces()?;
        let mut out = String::new();
        // fmt::Write 写入 String 不会失败
        let w = &mut out;

        if !options.omit_packet_wrapper {
            let _ = writeln!(w, "<?xpacket begin=\"\u{feff}\" id=\"{}\"?>", XPACKET_ID);
        }
        let _ = writeln!(w, "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">");
        let _ = writeln!(w, " <rdf:RDF xmlns:rdf=\"{}\">", RDF_NAMESPACE);
        let _ = write!(w, "  <rdf:Description rdf:about=\"\"");
        for (prefix, namespace) in &namespaces {
            let _ = write!(w, "\n    xmlns:{}=\"{}\"", prefix, escape_xml(namespace));
        }
        if self.properties.is_empty() {
            let _ = writeln!(w, "/>");
        } else {
            let _ = writeln!(w, ">");
            for p in &self.properties {
                let _ = writeln!(
                    w,
                    "   <{prefix}:{name}>{value}</{prefix}:{name}>",
                    prefix = p.prefix,
                    name = p.name,
                    value = escape_xml(&p.value)
                );
            }
            let _ = writeln!(w, "  </rdf:Description>");
        }
        let _ = writeln!(w, " </rdf:RDF>");
        let _ = writeln!(w, "</x:xmpmeta>");
        if !options.omit_packet_wrapper {
            let _ = writeln!(w, "<?xpacket end=\"w\"?>");
        }

        Ok(out)
    }
}

/// 生成剪贴板上的元数据字节：XML 声明头 + 无包裹的 UTF-8 文档。
pub fn clipboard_document(doc: &dyn XmpDocument) -> Result<Vec<u8>, XmpError> {
    let body = doc.serialize(SerializeOptions::CLIPBOARD)?;
    let mut xml = String::with_capacity(XMP_XML_HEADER.len() + body.len());
    xml.push_str(XMP_XML_HEADER);
    xml.push_str(&body);
    Ok(xml.into_bytes())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 文本只含 XML 1.0 允许的字符（控制字符中仅允许 `\t`、`\n`、`\r`）。
fn is_xml_text(text: &str) -> bool {
    text.chars().all(|c| match c {
        '\t' | '\n' | '\r' => true,
        '\u{fffe}' | '\u{ffff}' => false,
        c => c >= '\u{20}',
    })
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
